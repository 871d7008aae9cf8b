use super::*;
use crate::foundation::core::Point;
use std::f64::consts::FRAC_PI_2;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn identity_is_identity_affine() {
    assert_eq!(Transform::default().local_affine(), Affine::IDENTITY);
}

#[test]
fn scale_happens_before_rotation_around_origin() {
    let t = Transform {
        scale_x: 2.0,
        scale_y: 1.0,
        rotation: FRAC_PI_2,
        origin_x: 10.0,
        origin_y: 10.0,
        ..Transform::default()
    };
    // (11, 10) is one unit right of the origin: scaled to two units, then turned to point down.
    let p = t.local_affine() * Point::new(11.0, 10.0);
    assert!(close(p, Point::new(10.0, 12.0)), "{p:?}");

    // Rotating first and scaling after would land on (10, 11) instead.
    let swapped = Affine::translate((10.0, 10.0))
        * Affine::scale_non_uniform(2.0, 1.0)
        * Affine::rotate(FRAC_PI_2)
        * Affine::translate((-10.0, -10.0));
    assert!(!close(swapped * Point::new(11.0, 10.0), p));
}

#[test]
fn offset_applies_last() {
    let t = Transform {
        x: 5.0,
        y: -3.0,
        scale_x: 3.0,
        scale_y: 3.0,
        ..Transform::default()
    };
    let p = t.local_affine() * Point::new(1.0, 1.0);
    assert!(close(p, Point::new(8.0, 0.0)));
}

#[test]
fn merge_keeps_untouched_fields() {
    let mut t = Transform {
        rotation: 1.0,
        ..Transform::translate(4.0, 5.0)
    };
    t.merge(&TransformPatch::position(7.0, 8.0));
    assert_eq!((t.x, t.y, t.rotation), (7.0, 8.0, 1.0));
}

#[test]
fn named_fields_round_trip() {
    let mut t = Transform::default();
    for (i, f) in TRANSFORM_FIELDS.iter().enumerate() {
        assert!(t.set(f, i as f64));
        assert_eq!(t.get(f), Some(i as f64));
    }
    assert!(!t.set("skew", 1.0));
    assert_eq!(t.get("skew"), None);
}
