use super::*;
use crate::animation::ease::Ease;
use crate::input::event::{EventKind, PointerKind};
use crate::reconcile::layer::FadeTransition;
use crate::scene::element::Element;
use crate::scene::shape::Shape;
use crate::scene::style::Style;
use std::cell::Cell;
use std::rc::Rc;

fn small() -> EngineConfig {
    EngineConfig {
        width: 40,
        height: 30,
        ..EngineConfig::default()
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn circle(e: &mut Engine) -> NodeId {
    e.with_storage(|s| {
        let id = s.insert(
            Element::shape(Shape::Circle {
                cx: 10.0,
                cy: 10.0,
                r: 5.0,
            })
            .with_style(Style::filled(Color::rgb(200, 0, 0))),
        );
        s.add_root(id);
        id
    })
}

#[test]
fn mutations_coalesce_into_one_paint() {
    let mut e = Engine::new(&small()).unwrap();
    let c = circle(&mut e);
    for r in 1..5 {
        e.with_storage(|s| s.set_prop(c, "shape.r", f64::from(r)));
    }
    assert_eq!(e.frames().count(FrameTask::Repaint), 1);
    assert!(e.run_frame(ms(0)));
    assert_eq!(e.painter().stats().paints, 1);
    assert!(!e.has_pending_frame());
    assert!(!e.run_frame(ms(16)));
}

#[test]
fn animation_frames_run_until_the_tween_finishes() {
    let mut e = Engine::new(&small()).unwrap();
    let c = circle(&mut e);
    e.run_frame(ms(0));
    let opts = TweenOptions {
        duration: ms(100),
        delay: Duration::ZERO,
        ease: Ease::Linear,
    };
    e.animate(c, "shape.r", 15.0, opts, ms(0)).unwrap();
    assert_eq!(e.frames().count(FrameTask::Animate), 1);

    assert!(e.run_frame(ms(50)));
    let r = e.storage().get_prop(c, "shape.r").unwrap();
    assert!((r - 10.0).abs() < 1e-9, "r = {r}");
    assert!(e.has_pending_frame());

    e.run_frame(ms(100));
    assert_eq!(e.storage().get_prop(c, "shape.r"), Some(15.0));
    assert!(e.animator().is_empty());
    assert!(!e.has_pending_frame());
}

#[test]
fn paused_animations_stop_requesting_frames() {
    let mut e = Engine::new(&small()).unwrap();
    let c = circle(&mut e);
    e.run_frame(ms(0));
    e.animate(c, "style.opacity", 0.0, TweenOptions::default(), ms(0))
        .unwrap();
    e.pause_animations(ms(10));
    e.run_frame(ms(20));
    assert!(!e.has_pending_frame());
    e.resume_animations(ms(1000));
    assert_eq!(e.frames().count(FrameTask::Animate), 1);
}

#[test]
fn listener_mutations_schedule_a_repaint() {
    let mut e = Engine::new(&small()).unwrap();
    let c = circle(&mut e);
    e.run_frame(ms(0));
    let clicks = Rc::new(Cell::new(0));
    let seen = Rc::clone(&clicks);
    e.handler_mut().on(Some(c), EventKind::Click, move |ev, s| {
        seen.set(seen.get() + 1);
        if let Some(t) = ev.target {
            s.set_prop(t, "style.opacity", 0.5);
        }
    });

    let (hit, _) = e.dispatch(&PointerInput::mouse(PointerKind::Click, 10.0, 10.0));
    assert_eq!(hit, Some(c));
    assert_eq!(clicks.get(), 1);
    assert!(e.has_pending_frame());
    assert!(e.run_frame(ms(16)));

    let (hit, _) = e.dispatch(&PointerInput::mouse(PointerKind::Click, 39.0, 29.0));
    assert_eq!(hit, None);
    assert_eq!(clicks.get(), 1);
}

#[test]
fn host_resize_is_ignored_when_unchanged() {
    let mut e = Engine::new(&small()).unwrap();
    assert!(!e.on_host_resize().unwrap());
    assert!(
        e.replace_host(Box::new(FixedSurface::new(80.0, 60.0)))
            .unwrap()
    );
    assert_eq!((e.painter().width(), e.painter().height()), (80, 60));
    assert!(e.has_pending_frame());
    assert!(!e.on_host_resize().unwrap());
    assert!(
        e.replace_host(Box::new(FixedSurface::new(80.0, 60.0).with_dpr(2.0)))
            .unwrap()
    );
    assert_eq!(e.painter().device_pixel_ratio(), 2.0);
}

#[test]
fn export_falls_back_to_configured_background() {
    let cfg = EngineConfig {
        background: Some(Color::rgb(0, 0, 255)),
        ..small()
    };
    let mut e = Engine::new(&cfg).unwrap();
    circle(&mut e);
    let png = e.export_image(&ExportOptions::default()).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (40, 30));
    assert_eq!(img.get_pixel(39, 29).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(10, 10).0, [200, 0, 0, 255]);
}

#[test]
fn sync_layer_creates_marks_and_schedules_tweens() {
    let mut e = Engine::new(&small()).unwrap();
    let root = e.with_storage(|s| {
        let g = s.insert(Element::group());
        s.add_root(g);
        g
    });
    let mut layer = KeyedLayer::new(root);
    let target = |x: f64| {
        MarkTarget::new(
            Shape::Rect {
                x,
                y: 0.0,
                width: 5.0,
                height: 5.0,
                radius: 0.0,
            },
            Style::filled(Color::BLACK),
        )
    };
    let report = e
        .sync_layer(
            &mut layer,
            [("a", target(0.0)), ("b", target(10.0))],
            &FadeTransition,
            ms(0),
        )
        .unwrap();
    assert_eq!(report.entered, vec!["a", "b"]);
    assert_eq!(e.frames().count(FrameTask::Animate), 1);
    assert_eq!(e.frames().count(FrameTask::Repaint), 1);
}

#[test]
fn disposed_engine_drops_pending_work() {
    let mut e = Engine::new(&small()).unwrap();
    let c = circle(&mut e);
    e.animate(c, "shape.r", 1.0, TweenOptions::default(), ms(0))
        .unwrap();
    e.dispose();
    assert!(!e.has_pending_frame());
    assert!(e.animator().is_empty());
    e.with_storage(|s| s.set_prop(c, "shape.r", 3.0));
    assert!(!e.has_pending_frame());
    assert!(!e.run_frame(ms(16)));
    assert_eq!(e.storage().get_prop(c, "shape.r"), Some(3.0));
}

#[test]
fn missing_font_file_fails_construction() {
    let cfg = EngineConfig {
        font: Some("/nonexistent/font.ttf".into()),
        ..small()
    };
    assert!(Engine::new(&cfg).is_err());
}

#[test]
fn loaded_documents_are_hit_testable() {
    let doc = SceneDoc::from_json_str(
        r##"{
            "width": 40, "height": 30, "background": "#00ff00",
            "nodes": [
                {"name": "dot", "shape": {"type": "circle", "cx": 20, "cy": 15, "r": 5}}
            ]
        }"##,
    )
    .unwrap();
    let mut e = Engine::new(&small()).unwrap();
    let roots = e.load_doc(&doc, None).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(e.hit(Point::new(20.0, 15.0)), Some(roots[0]));
    assert_eq!(e.hit(Point::new(1.0, 1.0)), None);
    assert!(e.has_pending_frame());

    let png = e.export_image(&ExportOptions::default()).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
}
