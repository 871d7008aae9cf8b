use super::*;
use crate::foundation::core::Color;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

fn plain() -> Style {
    Style::default()
}

#[test]
fn circle_contains_by_squared_distance() {
    let c = Shape::Circle {
        cx: 50.0,
        cy: 50.0,
        r: 10.0,
    };
    assert!(c.contains(Point::new(50.0, 50.0), &plain()));
    assert!(c.contains(Point::new(60.0, 50.0), &plain()));
    assert!(!c.contains(Point::new(58.0, 58.0), &plain()));
    assert!(!c.contains(Point::new(0.0, 0.0), &plain()));
}

#[test]
fn rect_with_negative_extent_is_normalized() {
    let r = Shape::Rect {
        x: 10.0,
        y: 10.0,
        width: -5.0,
        height: -5.0,
        radius: 0.0,
    };
    assert!(r.contains(Point::new(7.0, 7.0), &plain()));
    assert!(!r.contains(Point::new(11.0, 7.0), &plain()));
}

#[test]
fn line_uses_half_line_width() {
    let l = Shape::Line {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 0.0,
    };
    let style = Style::stroked(Color::BLACK, 4.0);
    assert!(l.contains(Point::new(5.0, 1.9), &style));
    assert!(!l.contains(Point::new(5.0, 2.1), &style));
    assert!(!l.contains(Point::new(12.5, 0.0), &style));
}

#[test]
fn hairlines_keep_a_minimum_hit_width() {
    let l = Shape::Line {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 0.0,
    };
    let hairline = Style::stroked(Color::BLACK, 0.0);
    assert!(l.contains(Point::new(5.0, 1.0), &hairline));
    assert!(l.contains(Point::new(5.0, -MIN_HIT_HALF_WIDTH), &hairline));
    assert!(!l.contains(Point::new(5.0, 2.0), &hairline));

    let zigzag = Shape::Polyline {
        points: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)],
    };
    assert!(zigzag.contains(Point::new(5.0, 6.0), &hairline));
    assert!(!zigzag.contains(Point::new(5.0, 9.0), &hairline));

    let arc = Shape::Arc {
        cx: 0.0,
        cy: 0.0,
        r: 10.0,
        start_angle: 0.0,
        end_angle: FRAC_PI_2,
        clockwise: true,
    };
    assert!(arc.contains(Point::new(11.0, 0.5), &hairline));
    assert!(!arc.contains(Point::new(12.0, 0.5), &hairline));
}

#[test]
fn polygon_uses_even_odd() {
    // A pentagram: the inner pentagon is crossed twice and is outside under even-odd.
    let pts: Vec<Point> = (0..5)
        .map(|i| {
            let a = -FRAC_PI_2 + (i as f64) * 4.0 * std::f64::consts::PI / 5.0;
            Point::new(50.0 + 40.0 * a.cos(), 50.0 + 40.0 * a.sin())
        })
        .collect();
    let star = Shape::Polygon { points: pts };
    assert!(!star.contains(Point::new(50.0, 50.0), &plain()));
    assert!(star.contains(Point::new(50.0, 14.0), &plain()));
}

#[test]
fn sector_band_wraps_through_zero() {
    let s = Shape::Sector {
        cx: 0.0,
        cy: 0.0,
        r0: 5.0,
        r: 10.0,
        start_angle: -FRAC_PI_4,
        end_angle: FRAC_PI_4,
        clockwise: true,
    };
    assert!(s.contains(Point::new(8.0, 0.0), &plain()));
    assert!(s.contains(Point::new(6.0, 1.0), &plain()));
    assert!(!s.contains(Point::new(3.0, 0.0), &plain()), "inside the hole");
    assert!(!s.contains(Point::new(0.0, 8.0), &plain()), "outside the band");
    assert!(!s.contains(Point::new(-8.0, 0.0), &plain()));
}

#[test]
fn anticlockwise_sector_covers_the_complement() {
    let s = Shape::Sector {
        cx: 0.0,
        cy: 0.0,
        r0: 0.0,
        r: 10.0,
        start_angle: -FRAC_PI_4,
        end_angle: FRAC_PI_4,
        clockwise: false,
    };
    assert!(!s.contains(Point::new(8.0, 0.0), &plain()));
    assert!(s.contains(Point::new(-8.0, 0.0), &plain()));
}

#[test]
fn zero_span_sector_contains_nothing_and_has_no_path() {
    let s = Shape::Sector {
        cx: 0.0,
        cy: 0.0,
        r0: 0.0,
        r: 10.0,
        start_angle: 1.0,
        end_angle: 1.0,
        clockwise: true,
    };
    assert!(!s.contains(Point::new(3.0, 3.0), &plain()));
    assert!(s.to_path().is_none());
}

#[test]
fn sweep_and_svg_flags() {
    assert_eq!(arc_sweep(0.0, 7.0, true), std::f64::consts::TAU);
    assert!((arc_sweep(0.0, -FRAC_PI_2, true) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    assert!((arc_sweep(0.0, FRAC_PI_2, false) + 3.0 * FRAC_PI_2).abs() < 1e-12);
    assert_eq!(svg_arc_flags(3.0 * FRAC_PI_2), (1, 1));
    assert_eq!(svg_arc_flags(-FRAC_PI_2), (0, 0));
}

#[test]
fn malformed_geometry_never_contains() {
    let c = Shape::Circle {
        cx: f64::NAN,
        cy: 0.0,
        r: 10.0,
    };
    assert!(!c.is_finite());
    assert!(!c.contains(Point::new(0.0, 0.0), &plain()));

    let p = Shape::Path {
        d: "M 0 0 L oops".to_string(),
    };
    assert!(p.to_path().is_none());
    assert!(!p.contains(Point::new(0.0, 0.0), &plain()));
}

#[test]
fn path_fill_and_stroke_hits() {
    let p = Shape::Path {
        d: "M0,0 L10,0 L10,10 L0,10 Z".to_string(),
    };
    assert!(p.contains(Point::new(5.0, 5.0), &Style::filled(Color::BLACK)));
    let outline = Style::stroked(Color::BLACK, 2.0);
    assert!(!p.contains(Point::new(5.0, 5.0), &outline));
    assert!(p.contains(Point::new(10.5, 5.0), &outline));
}

#[test]
fn merge_ignores_fields_of_other_kinds() {
    let mut c = Shape::Circle {
        cx: 1.0,
        cy: 2.0,
        r: 3.0,
    };
    c.merge(&ShapePatch::new().set("r", 9.0).set("width", 4.0));
    assert_eq!(
        c,
        Shape::Circle {
            cx: 1.0,
            cy: 2.0,
            r: 9.0
        }
    );
    assert_eq!(c.get("r"), Some(9.0));
    assert_eq!(c.get("width"), None);
}

#[test]
fn serde_uses_type_tag() {
    let s: Shape =
        serde_json::from_str(r#"{"type":"sector","cx":1,"cy":2,"r":3,"start_angle":0,"end_angle":1}"#)
            .unwrap();
    assert!(matches!(
        s,
        Shape::Sector {
            r0,
            clockwise: true,
            ..
        } if r0 == 0.0
    ));
}

#[test]
fn text_box_follows_anchors() {
    let style = Style {
        font_size: 10.0,
        text_align: crate::scene::style::TextAlign::Center,
        text_baseline: crate::scene::style::TextBaseline::Middle,
        ..Style::default()
    };
    let b = estimate_text_box(0.0, 0.0, "abcd", &style);
    assert!((b.width() - 24.0).abs() < 1e-9);
    assert!((b.x0 + 12.0).abs() < 1e-9);
    assert!((b.y0 + 5.0).abs() < 1e-9);
}
