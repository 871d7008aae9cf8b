use super::*;
use crate::scene::style::Shadow;
use crate::scene::transform::Transform;

const RED: Color = Color::rgb(255, 0, 0);

fn scene() -> Storage {
    let mut s = Storage::new();
    let g = s.insert(
        Element::group()
            .with_name("g")
            .with_transform(Transform::translate(5.0, 5.0)),
    );
    s.add_root(g);
    let c = s.insert(
        Element::shape(Shape::Circle {
            cx: 10.0,
            cy: 10.0,
            r: 4.0,
        })
        .with_style(Style::filled(RED)),
    );
    s.add_child(g, c);
    let top = s.insert(
        Element::shape(Shape::Sector {
            cx: 50.0,
            cy: 50.0,
            r0: 0.0,
            r: 20.0,
            start_angle: 0.0,
            end_angle: 1.0,
            clockwise: true,
        })
        .with_style(Style::filled(RED)),
    );
    s.add_root(top);
    s
}

#[test]
fn paint_mirrors_scene_structure() {
    let s = scene();
    let mut vector = VectorBackend::new(100, 100, 1.0).unwrap();
    let count = vector.paint(&s).unwrap();
    assert_eq!(count.drawn, 2);

    let doc = vector.document().unwrap();
    assert_eq!(doc.children.len(), 2);
    assert!(matches!(&doc.children[0].kind, SvgKind::Group(c) if c.len() == 1));
    assert_eq!(doc.children[0].transform, Affine::translate((5.0, 5.0)));

    let svg = vector.svg_string().unwrap();
    assert!(svg.contains(r#"<g transform="translate(5 5)">"#));
    assert!(svg.contains(r##"<circle cx="10" cy="10" r="4" fill="#ff0000""##));
    assert!(svg.contains(r#"<path d="M70 50A20 20 0 0 1 "#));
}

#[test]
fn standalone_export_carries_background_without_touching_paint() {
    let s = scene();
    let mut vector = VectorBackend::new(100, 100, 1.0).unwrap();
    vector.paint(&s).unwrap();
    let svg = vector.export_svg(&s, Some(Color::WHITE)).unwrap();
    assert!(svg.contains(r##"<rect width="100%" height="100%" fill="#ffffff""##));
    assert!(vector.document().unwrap().background.is_none());
}

#[test]
fn repaint_replaces_document() {
    let mut s = scene();
    let mut vector = VectorBackend::new(100, 100, 1.0).unwrap();
    vector.paint(&s).unwrap();
    let roots = s.roots().to_vec();
    s.remove_root(roots[1]);
    vector.paint(&s).unwrap();
    assert_eq!(vector.document().unwrap().children.len(), 1);
}

#[test]
fn open_shapes_are_never_filled() {
    let mut s = Storage::new();
    let arc = s.insert(
        Element::shape(Shape::Arc {
            cx: 0.0,
            cy: 0.0,
            r: 10.0,
            start_angle: 0.0,
            end_angle: 1.0,
            clockwise: true,
        })
        .with_style(Style {
            fill: Some(RED),
            stroke: Some(Color::BLACK),
            ..Style::default()
        }),
    );
    s.add_root(arc);
    let mut vector = VectorBackend::new(10, 10, 1.0).unwrap();
    vector.paint(&s).unwrap();
    let svg = vector.svg_string().unwrap();
    assert!(svg.contains(r##"fill="none" stroke="#000000""##));
}

#[test]
fn shadow_becomes_filter_reference() {
    let mut s = Storage::new();
    let rect = s.insert(
        Element::shape(Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            radius: 0.0,
        })
        .with_style(Style {
            fill: Some(RED),
            shadow: Some(Shadow {
                blur: 4.0,
                color: Color::BLACK,
                offset_x: 2.0,
                offset_y: 3.0,
            }),
            ..Style::default()
        }),
    );
    s.add_root(rect);
    let mut vector = VectorBackend::new(10, 10, 1.0).unwrap();
    vector.paint(&s).unwrap();
    let svg = vector.svg_string().unwrap();
    assert!(svg.contains(r#"<filter id="shadow-0""#));
    assert!(svg.contains(r#"filter="url(#shadow-0)""#));
}

#[test]
fn export_rasterizes_through_resvg() {
    let mut s = Storage::new();
    let rect = s.insert(
        Element::shape(Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            radius: 0.0,
        })
        .with_style(Style::filled(RED)),
    );
    s.add_root(rect);
    let mut vector = VectorBackend::new(20, 20, 1.0).unwrap();
    let png = vector
        .export_png(
            &s,
            &ExportOptions {
                pixel_ratio: Some(2.0),
                background: Some(Color::WHITE),
            },
        )
        .unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (40, 40));
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(35, 35).0, [255, 255, 255, 255]);
}

#[test]
fn disposed_backend_rejects_work() {
    let s = Storage::new();
    let mut vector = VectorBackend::new(10, 10, 1.0).unwrap();
    vector.dispose();
    assert!(matches!(vector.paint(&s), Err(SceneError::Surface(_))));
    assert!(vector.svg_string().is_err());
    vector.resize(10, 10, 1.0).unwrap();
    assert!(vector.paint(&s).is_ok());
}
