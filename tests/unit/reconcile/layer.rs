use super::*;
use crate::animation::ease::Ease;
use crate::foundation::core::Color;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn opts() -> TweenOptions {
    TweenOptions {
        duration: ms(100),
        delay: Duration::ZERO,
        ease: Ease::Linear,
    }
}

fn dot(r: f64) -> MarkTarget {
    MarkTarget::new(
        Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r,
        },
        Style::filled(Color::BLACK),
    )
}

fn setup() -> (Storage, Animator, KeyedLayer<&'static str>) {
    let mut storage = Storage::new();
    let g = storage.insert(Element::group());
    storage.add_root(g);
    (storage, Animator::new(), KeyedLayer::new(g).with_options(opts()))
}

fn settle(storage: &mut Storage, animator: &mut Animator, now: Duration) {
    animator.step_all(storage, now).unwrap();
}

#[test]
fn keyed_update_keeps_identity_and_exit_waits_for_tween() {
    let (mut s, mut a, mut layer) = setup();
    let report = layer
        .sync(&mut s, &mut a, [("A", dot(10.0)), ("B", dot(20.0))], &FadeTransition, ms(0))
        .unwrap();
    assert_eq!(report.entered, vec!["A", "B"]);
    settle(&mut s, &mut a, ms(100));
    let a_node = layer.node(&"A").unwrap();
    let b_node = layer.node(&"B").unwrap();
    assert_eq!(s.get_prop(a_node, "style.opacity"), Some(1.0));

    let report = layer
        .sync(&mut s, &mut a, [("B", dot(30.0)), ("C", dot(5.0))], &FadeTransition, ms(100))
        .unwrap();
    assert_eq!(report.updated, vec!["B"]);
    assert_eq!(report.entered, vec!["C"]);
    assert_eq!(report.exited, vec!["A"]);

    // B keeps its element and tweens from its live radius.
    assert_eq!(layer.node(&"B"), Some(b_node));
    let r_tween = a.tweens_on(b_node, Some("shape.r")).next().unwrap();
    assert_eq!(r_tween.start_value(), Some(20.0));

    // C starts at its entry state.
    let c_node = layer.node(&"C").unwrap();
    assert_eq!(s.get_prop(c_node, "style.opacity"), Some(0.0));
    assert_eq!(s.get_prop(c_node, "shape.r"), Some(5.0));

    // A moved behind the others and is still bound while fading.
    assert_eq!(s.node(layer.parent()).unwrap().children()[0], a_node);
    settle(&mut s, &mut a, ms(150));
    assert!(layer.is_exiting(&"A"));
    assert!(s.get(a_node).is_some());
    assert!((s.get_prop(a_node, "style.opacity").unwrap() - 0.5).abs() < 1e-9);

    settle(&mut s, &mut a, ms(200));
    assert!(s.node(a_node).is_none());
    assert_eq!(layer.prune(&s), vec!["A"]);
    assert_eq!(layer.node(&"A"), None);
    assert_eq!(s.get_prop(b_node, "shape.r"), Some(30.0));
    assert_eq!(layer.live_keys(), vec!["B", "C"]);
}

#[test]
fn exit_stopped_mid_flight_is_destroyed_on_next_sync() {
    let (mut s, mut a, mut layer) = setup();
    layer
        .sync(&mut s, &mut a, [("A", dot(10.0)), ("B", dot(20.0))], &FadeTransition, ms(0))
        .unwrap();
    settle(&mut s, &mut a, ms(100));
    let a_node = layer.node(&"A").unwrap();

    layer
        .sync(&mut s, &mut a, [("B", dot(20.0))], &FadeTransition, ms(100))
        .unwrap();
    settle(&mut s, &mut a, ms(140));
    a.stop_all();
    assert!(s.get(a_node).is_some());
    assert!(layer.is_exiting(&"A"));

    layer
        .sync(&mut s, &mut a, [("B", dot(20.0))], &FadeTransition, ms(150))
        .unwrap();
    settle(&mut s, &mut a, ms(300));
    assert!(s.node(a_node).is_none());
    assert_eq!(layer.node(&"A"), None);
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.live_keys(), vec!["B"]);
}

#[test]
fn running_exit_is_left_alone_by_the_stalled_sweep() {
    let (mut s, mut a, mut layer) = setup();
    layer
        .sync(&mut s, &mut a, [("A", dot(10.0)), ("B", dot(20.0))], &FadeTransition, ms(0))
        .unwrap();
    settle(&mut s, &mut a, ms(100));
    let a_node = layer.node(&"A").unwrap();
    layer
        .sync(&mut s, &mut a, [("B", dot(20.0))], &FadeTransition, ms(100))
        .unwrap();
    settle(&mut s, &mut a, ms(140));
    assert!(layer.finish_stalled_exits(&mut s, &a).is_empty());
    assert!(s.get(a_node).is_some());
    assert!(layer.is_exiting(&"A"));
}

#[test]
fn retarget_mid_flight_starts_from_live_value() {
    let (mut s, mut a, mut layer) = setup();
    layer
        .sync(&mut s, &mut a, [("B", dot(20.0))], &FadeTransition, ms(0))
        .unwrap();
    settle(&mut s, &mut a, ms(100));
    layer
        .sync(&mut s, &mut a, [("B", dot(30.0))], &FadeTransition, ms(100))
        .unwrap();
    settle(&mut s, &mut a, ms(150));
    let b = layer.node(&"B").unwrap();
    let live = s.get_prop(b, "shape.r").unwrap();
    assert!((live - 25.0).abs() < 1e-9);

    layer
        .sync(&mut s, &mut a, [("B", dot(40.0))], &FadeTransition, ms(150))
        .unwrap();
    let tweens: Vec<_> = a.tweens_on(b, Some("shape.r")).collect();
    assert_eq!(tweens.len(), 1);
    assert_eq!(tweens[0].start_value(), Some(live));
    assert_eq!(tweens[0].end_value(), 40.0);
}

#[test]
fn returning_key_revives_exiting_mark() {
    let (mut s, mut a, mut layer) = setup();
    layer
        .sync(&mut s, &mut a, [("A", dot(10.0))], &FadeTransition, ms(0))
        .unwrap();
    settle(&mut s, &mut a, ms(100));
    let node = layer.node(&"A").unwrap();

    let report = layer
        .sync(&mut s, &mut a, Vec::new(), &FadeTransition, ms(100))
        .unwrap();
    assert_eq!(report.exited, vec!["A"]);
    settle(&mut s, &mut a, ms(150));

    let report = layer
        .sync(&mut s, &mut a, [("A", dot(12.0))], &FadeTransition, ms(150))
        .unwrap();
    assert_eq!(report.updated, vec!["A"]);
    assert!(report.entered.is_empty());
    assert_eq!(layer.node(&"A"), Some(node));
    assert!(!layer.is_exiting(&"A"));

    settle(&mut s, &mut a, ms(400));
    assert!(s.get(node).is_some());
    assert_eq!(s.get_prop(node, "style.opacity"), Some(1.0));
    assert_eq!(s.get_prop(node, "shape.r"), Some(12.0));
}

#[test]
fn marks_join_the_index_only_once_attached() {
    let mut s = Storage::new();
    let mut a = Animator::new();
    let g = s.insert(Element::group());
    let mut layer = KeyedLayer::new(g).with_options(opts());
    layer
        .sync(&mut s, &mut a, [(1u32, dot(3.0))], &FadeTransition, ms(0))
        .unwrap();
    let node = layer.node(&1).unwrap();
    assert!(s.get(node).is_none());
    assert!(s.node(node).is_some());

    s.add_root(g);
    assert!(s.get(node).is_some());
}

#[test]
fn non_container_parent_is_rejected() {
    let mut s = Storage::new();
    let mut a = Animator::new();
    let leaf = s.insert(Element::shape(Shape::Circle {
        cx: 0.0,
        cy: 0.0,
        r: 1.0,
    }));
    let mut layer = KeyedLayer::new(leaf);
    let err = layer
        .sync(&mut s, &mut a, [("x", dot(1.0))], &FadeTransition, ms(0))
        .unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));
    assert_eq!(s.len(), 1);
    assert!(layer.is_empty());
}

#[test]
fn clear_removes_everything_at_once() {
    let (mut s, mut a, mut layer) = setup();
    layer
        .sync(&mut s, &mut a, [("A", dot(1.0)), ("B", dot(2.0))], &FadeTransition, ms(0))
        .unwrap();
    layer.clear(&mut s, &mut a);
    assert!(layer.is_empty());
    assert!(a.is_empty());
    assert_eq!(s.len(), 1);
}
