use super::*;

#[test]
fn garbage_bytes_register_no_family() {
    let err = TextEngine::new(b"definitely not a font".to_vec()).unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));
}

#[test]
fn missing_font_file_names_the_path() {
    let err = TextEngine::from_path(std::path::Path::new("/no/such/face.ttf")).unwrap_err();
    assert!(err.to_string().contains("/no/such/face.ttf"));
}

#[test]
fn brush_copies_color_channels() {
    let brush = TextBrush::from(Color::rgba(1, 2, 3, 4));
    assert_eq!((brush.r, brush.g, brush.b, brush.a), (1, 2, 3, 4));
}
