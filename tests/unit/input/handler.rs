use super::*;
use crate::foundation::core::Color;
use crate::render::surface::FixedSurface;
use crate::scene::element::{Attrs, Element};
use crate::scene::shape::Shape;
use crate::scene::style::Style;
use crate::scene::transform::Transform;
use std::cell::RefCell;
use std::rc::Rc;

fn host() -> FixedSurface {
    FixedSurface::new(200.0, 200.0)
}

fn disc(storage: &mut Storage, cx: f64, cy: f64, r: f64) -> NodeId {
    storage.insert(Element::shape(Shape::Circle { cx, cy, r }).with_style(Style::filled(Color::BLACK)))
}

fn kinds(events: &[SceneEvent]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

#[test]
fn overlapping_hit_prefers_later_added_and_silent_falls_through() {
    let mut s = Storage::new();
    let a = disc(&mut s, 50.0, 50.0, 10.0);
    let b = disc(&mut s, 50.0, 50.0, 10.0);
    s.add_root(a);
    s.add_root(b);
    assert_eq!(hit_test(&s, Point::new(50.0, 50.0), None), Some(b));

    s.attr(b, &Attrs::new().silent(true)).unwrap();
    assert_eq!(hit_test(&s, Point::new(50.0, 50.0), None), Some(a));

    s.attr(a, &Attrs::new().z(5)).unwrap();
    s.attr(b, &Attrs::new().silent(false)).unwrap();
    assert_eq!(hit_test(&s, Point::new(50.0, 50.0), None), Some(a));
}

#[test]
fn hit_test_inverts_group_transforms() {
    let mut s = Storage::new();
    let g = s.insert(Element::group().with_transform(Transform::translate(100.0, 100.0)));
    let c = disc(&mut s, 0.0, 0.0, 10.0);
    s.add_root(g);
    s.add_child(g, c);
    assert_eq!(hit_test(&s, Point::new(105.0, 100.0), None), Some(c));
    assert_eq!(hit_test(&s, Point::new(5.0, 0.0), None), None);

    s.attr(g, &Attrs::new().invisible(true)).unwrap();
    assert_eq!(hit_test(&s, Point::new(105.0, 100.0), None), None);
}

#[test]
fn screen_offset_is_subtracted() {
    let mut s = Storage::new();
    let c = disc(&mut s, 10.0, 10.0, 5.0);
    s.add_root(c);
    let mut h = Handler::new();
    let host = host().with_offset(100.0, 100.0);
    let (hit, _) = h.dispatch(&mut s, &host, &PointerInput::mouse(PointerKind::Click, 110.0, 110.0));
    assert_eq!(hit, Some(c));
}

#[test]
fn touch_uses_first_point() {
    let mut s = Storage::new();
    let c = disc(&mut s, 10.0, 10.0, 5.0);
    s.add_root(c);
    let mut h = Handler::new();
    let input = PointerInput::touch(
        PointerKind::Down,
        [Point::new(10.0, 10.0), Point::new(150.0, 150.0)],
    );
    let (hit, _) = h.dispatch(&mut s, &host(), &input);
    assert_eq!(hit, Some(c));
}

#[test]
fn hover_fires_over_and_out_pairs() {
    let mut s = Storage::new();
    let a = disc(&mut s, 20.0, 20.0, 10.0);
    let b = disc(&mut s, 80.0, 20.0, 10.0);
    s.add_root(a);
    s.add_root(b);
    let mut h = Handler::new();

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 20.0, 20.0));
    assert_eq!(kinds(&ev), vec![EventKind::MouseOver, EventKind::MouseMove]);
    assert_eq!(h.hovered(), Some(a));

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 22.0, 20.0));
    assert_eq!(kinds(&ev), vec![EventKind::MouseMove]);

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 80.0, 20.0));
    assert_eq!(
        kinds(&ev),
        vec![EventKind::MouseOut, EventKind::MouseOver, EventKind::MouseMove]
    );
    assert_eq!(ev[0].target, Some(a));
    assert_eq!(ev[1].target, Some(b));

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::touch(PointerKind::Out, []));
    assert_eq!(kinds(&ev), vec![EventKind::MouseOut]);
    assert_eq!(h.hovered(), None);
}

#[test]
fn detached_hover_target_still_gets_mouse_out() {
    let mut s = Storage::new();
    let a = disc(&mut s, 20.0, 20.0, 10.0);
    let b = disc(&mut s, 80.0, 20.0, 10.0);
    s.add_root(a);
    s.add_root(b);
    let outs = Rc::new(RefCell::new(Vec::new()));
    let mut h = Handler::new();
    let sink = Rc::clone(&outs);
    h.on(Some(a), EventKind::MouseOut, move |ev, _| sink.borrow_mut().push(ev.target));

    h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 20.0, 20.0));
    assert_eq!(h.hovered(), Some(a));

    s.remove_root(a);
    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 21.0, 20.0));
    assert_eq!(kinds(&ev), vec![EventKind::MouseOut, EventKind::MouseMove]);
    assert_eq!(ev[0].target, Some(a));
    assert_eq!(*outs.borrow(), vec![Some(a)]);
    assert_eq!(h.hovered(), None);

    // a destroyed target has nobody left to notify
    h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 80.0, 20.0));
    assert_eq!(h.hovered(), Some(b));
    s.destroy(b);
    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 81.0, 20.0));
    assert_eq!(kinds(&ev), vec![EventKind::MouseMove]);
    assert_eq!(h.hovered(), None);
}

#[test]
fn events_bubble_and_stop() {
    let mut s = Storage::new();
    let root = s.insert(Element::group());
    let mid = s.insert(Element::group());
    let leaf = disc(&mut s, 10.0, 10.0, 5.0);
    s.add_root(root);
    s.add_child(root, mid);
    s.add_child(mid, leaf);

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut h = Handler::new();
    for (node, name) in [(leaf, "leaf"), (mid, "mid"), (root, "root")] {
        let log = Rc::clone(&log);
        h.on(Some(node), EventKind::Click, move |ev, _| {
            log.borrow_mut().push((name, ev.target, ev.top_target));
        });
    }
    let surface_log = Rc::clone(&log);
    h.on(None, EventKind::Click, move |ev, _| {
        surface_log.borrow_mut().push(("surface", ev.target, ev.top_target));
    });

    h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Click, 10.0, 10.0));
    assert_eq!(
        *log.borrow(),
        vec![
            ("leaf", Some(leaf), Some(root)),
            ("mid", Some(leaf), Some(root)),
            ("root", Some(leaf), Some(root)),
            ("surface", Some(leaf), Some(root)),
        ]
    );

    log.borrow_mut().clear();
    h.on(Some(mid), EventKind::Click, |ev, _| ev.stop_propagation());
    h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Click, 10.0, 10.0));
    let names: Vec<&str> = log.borrow().iter().map(|e| e.0).collect();
    assert_eq!(names, vec!["leaf", "mid"]);
}

#[test]
fn off_removes_listener() {
    let mut s = Storage::new();
    let c = disc(&mut s, 10.0, 10.0, 5.0);
    s.add_root(c);
    let count = Rc::new(RefCell::new(0));
    let mut h = Handler::new();
    let sink = Rc::clone(&count);
    let id = h.on(Some(c), EventKind::Click, move |_, _| *sink.borrow_mut() += 1);
    h.trigger(&mut s, EventKind::Click, Some(c), Point::ZERO);
    assert!(h.off(id));
    assert!(!h.off(id));
    h.trigger(&mut s, EventKind::Click, Some(c), Point::ZERO);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn listeners_can_mutate_the_scene() {
    let mut s = Storage::new();
    let c = disc(&mut s, 10.0, 10.0, 5.0);
    s.add_root(c);
    let mut h = Handler::new();
    h.on(Some(c), EventKind::MouseOver, |ev, storage| {
        if let Some(t) = ev.target {
            storage.set_prop(t, "style.opacity", 0.5);
        }
    });
    s.clear_dirty();
    h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 10.0, 10.0));
    assert_eq!(s.get_prop(c, "style.opacity"), Some(0.5));
    assert!(s.is_dirty());
}

#[test]
fn drag_moves_offset_and_drops_on_target() {
    let mut s = Storage::new();
    let zone = s.insert(
        Element::shape(Shape::Rect {
            x: 100.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
            radius: 0.0,
        })
        .with_style(Style::filled(Color::WHITE)),
    );
    let knob = s.insert(
        Element::shape(Shape::Circle { cx: 0.0, cy: 0.0, r: 5.0 })
            .with_style(Style::filled(Color::BLACK))
            .with_transform(Transform {
                rotation: 0.0,
                scale_x: 2.0,
                ..Transform::translate(20.0, 20.0)
            })
            .with_draggable(true),
    );
    s.add_root(zone);
    s.add_root(knob);
    let mut h = Handler::new();

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Down, 20.0, 20.0));
    assert_eq!(kinds(&ev), vec![EventKind::MouseDown, EventKind::DragStart]);
    assert_eq!(h.dragging(), Some(knob));

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 60.0, 25.0));
    assert_eq!(kinds(&ev), vec![EventKind::Drag]);
    let t = s.get(knob).unwrap().transform();
    assert_eq!((t.x, t.y, t.scale_x), (60.0, 25.0, 2.0));

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Move, 120.0, 25.0));
    assert_eq!(kinds(&ev), vec![EventKind::Drag, EventKind::DragEnter]);
    assert_eq!(ev[1].target, Some(zone));
    assert_eq!(ev[1].dragged, Some(knob));

    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Up, 120.0, 25.0));
    assert_eq!(
        kinds(&ev),
        vec![EventKind::MouseUp, EventKind::DragEnd, EventKind::Drop]
    );
    assert_eq!(ev[2].target, Some(zone));
    assert_eq!(h.dragging(), None);
}

#[test]
fn pointer_out_ends_drag_without_drop() {
    let mut s = Storage::new();
    let knob = s.insert(
        Element::shape(Shape::Circle { cx: 0.0, cy: 0.0, r: 5.0 })
            .with_style(Style::filled(Color::BLACK))
            .with_draggable(true),
    );
    s.add_root(knob);
    let mut h = Handler::new();
    h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Down, 0.0, 0.0));
    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::touch(PointerKind::Out, []));
    assert_eq!(kinds(&ev), vec![EventKind::DragEnd]);
    assert_eq!(h.dragging(), None);
}

#[test]
fn drag_disabled_switch() {
    let mut s = Storage::new();
    let knob = s.insert(
        Element::shape(Shape::Circle { cx: 0.0, cy: 0.0, r: 5.0 })
            .with_style(Style::filled(Color::BLACK))
            .with_draggable(true),
    );
    s.add_root(knob);
    let mut h = Handler::new();
    h.set_drag_enabled(false);
    let (_, ev) = h.dispatch(&mut s, &host(), &PointerInput::mouse(PointerKind::Down, 0.0, 0.0));
    assert_eq!(kinds(&ev), vec![EventKind::MouseDown]);
}
