use super::*;

#[test]
fn hex_forms_parse() {
    assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
    assert_eq!(Color::from_hex("0f0").unwrap(), Color::rgb(0, 255, 0));
    assert_eq!(
        Color::from_hex("#10203040").unwrap(),
        Color::rgba(16, 32, 48, 64)
    );
    assert!(Color::from_hex("#12345").is_err());
    assert!(Color::from_hex("#zzzzzz").is_err());
}

#[test]
fn serde_accepts_hex_and_arrays() {
    let c: Color = serde_json::from_str("\"#336699\"").unwrap();
    assert_eq!(c, Color::rgb(0x33, 0x66, 0x99));
    let c: Color = serde_json::from_str("[1,2,3,4]").unwrap();
    assert_eq!(c, Color::rgba(1, 2, 3, 4));
    assert_eq!(
        serde_json::to_string(&Color::rgba(1, 2, 3, 4)).unwrap(),
        "\"#01020304\""
    );
}

#[test]
fn premultiply_rounds() {
    assert_eq!(Color::rgba(255, 0, 0, 128).to_premul_rgba8(), [128, 0, 0, 128]);
    assert_eq!(Color::TRANSPARENT.to_premul_rgba8(), [0, 0, 0, 0]);
}

#[test]
fn scale_alpha_clamps() {
    assert_eq!(Color::WHITE.scale_alpha(0.5).a, 128);
    assert_eq!(Color::WHITE.scale_alpha(3.0).a, 255);
}
