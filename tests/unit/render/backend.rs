use super::*;
use crate::foundation::core::Point;
use crate::scene::element::Attrs;

#[derive(Default)]
struct Recorder(Vec<String>);

impl SceneVisitor for Recorder {
    fn enter_group(&mut self, el: &Element, _local: Affine, _global: Affine) -> SceneResult<()> {
        self.0.push(format!("<{}", el.name().unwrap_or("?")));
        Ok(())
    }

    fn leave_group(&mut self, el: &Element) -> SceneResult<()> {
        self.0.push(format!("{}>", el.name().unwrap_or("?")));
        Ok(())
    }

    fn shape(&mut self, el: &Element, _shape: &Shape, _local: Affine, global: Affine) -> SceneResult<()> {
        let p = global * Point::ZERO;
        self.0.push(format!("{}@{},{}", el.name().unwrap_or("?"), p.x, p.y));
        Ok(())
    }
}

fn dot(storage: &mut Storage, name: &str) -> NodeId {
    storage.insert(Element::shape(Shape::Circle { cx: 0.0, cy: 0.0, r: 1.0 }).with_name(name))
}

#[test]
fn walks_in_paint_order_with_global_transforms() {
    let mut s = Storage::new();
    let g = s.insert(
        Element::group()
            .with_name("g")
            .with_transform(crate::scene::transform::Transform::translate(10.0, 0.0)),
    );
    let a = dot(&mut s, "a");
    let b = dot(&mut s, "b");
    let top = dot(&mut s, "top");
    s.add_root(top);
    s.add_root(g);
    s.add_child(g, a);
    s.add_child(g, b);
    s.attr(a, &Attrs::new().z(1)).unwrap();
    s.attr(top, &Attrs::new().zlevel(1)).unwrap();

    let mut rec = Recorder::default();
    let count = walk_scene(&s, &mut rec).unwrap();
    assert_eq!(rec.0, vec!["<g", "b@10,0", "a@10,0", "g>", "top@0,0"]);
    assert_eq!(count, DrawCount { drawn: 3, skipped: 0 });
}

#[test]
fn invisible_and_non_finite_are_skipped() {
    let mut s = Storage::new();
    let a = dot(&mut s, "a");
    let b = dot(&mut s, "b");
    let c = dot(&mut s, "c");
    s.add_root(a);
    s.add_root(b);
    s.add_root(c);
    s.attr(a, &Attrs::new().invisible(true)).unwrap();
    s.attr(b, &Attrs::new().set("shape.r", f64::NAN)).unwrap();

    let mut rec = Recorder::default();
    let count = walk_scene(&s, &mut rec).unwrap();
    assert_eq!(rec.0, vec!["c@0,0"]);
    assert_eq!(count, DrawCount { drawn: 1, skipped: 1 });
}
