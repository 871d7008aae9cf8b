use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::BUILTIN {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
    assert_eq!(Ease::Custom(|t| t * t).apply(1.0), 1.0);
}

#[test]
fn monotonic_spot_check() {
    for ease in [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
    ] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutCubic.apply(-1.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(3.0), 1.0);
}

#[test]
fn overshooting_curves_leave_unit_range() {
    assert!(Ease::OutBack.apply(0.6) > 1.0);
    assert!(Ease::OutElastic.apply(0.1) > 1.0);
}

#[test]
fn names_are_snake_case() {
    let s = serde_json::to_string(&Ease::InOutCubic).unwrap();
    assert_eq!(s, "\"in_out_cubic\"");
    let e: Ease = serde_json::from_str("\"out_bounce\"").unwrap();
    assert!(matches!(e, Ease::OutBounce));
}
