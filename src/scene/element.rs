use crate::animation::tween::Animatable;
use crate::foundation::core::{Affine, Point, Rect};
use crate::foundation::ids::NodeId;
use crate::scene::shape::{Shape, ShapePatch};
use crate::scene::style::{Style, StylePatch};
use crate::scene::transform::{Transform, TransformPatch};
use smallvec::SmallVec;

/// What an element draws: its own geometry, or an ordered list of children.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Container owning an ordered list of children (paint order = list order for equal z).
    Group(Vec<NodeId>),
    /// Leaf geometry.
    Shape(Shape),
}

/// A node of the scene graph.
///
/// Elements are created detached, handed to [`Storage::insert`](crate::scene::storage::Storage::insert)
/// which assigns the id, and from then on mutated through the storage so dirty flags propagate.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub(crate) id: NodeId,
    pub(crate) name: Option<String>,
    pub(crate) zlevel: i32,
    pub(crate) z: i32,
    pub(crate) style: Style,
    pub(crate) transform: Transform,
    pub(crate) silent: bool,
    pub(crate) invisible: bool,
    pub(crate) draggable: bool,
    pub(crate) kind: ElementKind,
    pub(crate) dirty: bool,
    pub(crate) parent: Option<NodeId>,
}

impl Element {
    fn with_kind(kind: ElementKind) -> Self {
        Self {
            id: NodeId(0),
            name: None,
            zlevel: 0,
            z: 0,
            style: Style::default(),
            transform: Transform::default(),
            silent: false,
            invisible: false,
            draggable: false,
            kind,
            dirty: true,
            parent: None,
        }
    }

    /// A new, empty container.
    pub fn group() -> Self {
        Self::with_kind(ElementKind::Group(Vec::new()))
    }

    /// A new leaf drawing `shape`.
    pub fn shape(shape: Shape) -> Self {
        Self::with_kind(ElementKind::Shape(shape))
    }

    /// Set the style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set both sort keys.
    pub fn with_z(mut self, zlevel: i32, z: i32) -> Self {
        self.zlevel = zlevel;
        self.z = z;
        self
    }

    /// Attach a debug name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Exclude the element from hit-testing.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Allow the pointer to drag the element.
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    /// Exclude the element from painting and hit-testing.
    pub fn with_invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    /// Identifier assigned by the storage.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Debug name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// First-tier sort key.
    pub fn zlevel(&self) -> i32 {
        self.zlevel
    }

    /// Second-tier sort key.
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Paint attributes.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Local transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Geometry for leaves, `None` for containers.
    pub fn shape_ref(&self) -> Option<&Shape> {
        match &self.kind {
            ElementKind::Shape(s) => Some(s),
            ElementKind::Group(_) => None,
        }
    }

    /// Children for containers, empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            ElementKind::Group(c) => c,
            ElementKind::Shape(_) => &[],
        }
    }

    /// Element kind.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Return `true` for containers.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    /// Parent container, set only while attached to one.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Excluded from hit-testing.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Excluded from painting and hit-testing.
    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    /// Can be dragged by the pointer.
    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    /// Needs repaint.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Local transform matrix.
    pub fn local_affine(&self) -> Affine {
        self.transform.local_affine()
    }

    /// Point containment in the element's local space.
    ///
    /// Containers never contain points themselves; their children do.
    pub fn contain_local(&self, p: Point) -> bool {
        match &self.kind {
            ElementKind::Shape(shape) => shape.contains(p, &self.style),
            ElementKind::Group(_) => false,
        }
    }

    /// Local bounding box of a leaf; containers report an empty rect here
    /// (use [`Storage::bounding_rect`](crate::scene::storage::Storage::bounding_rect)).
    pub fn local_bounds(&self) -> Rect {
        match &self.kind {
            ElementKind::Shape(shape) => shape.bounding_rect(&self.style),
            ElementKind::Group(_) => Rect::ZERO,
        }
    }

    /// Apply an attribute patch without touching dirty state.
    pub(crate) fn apply(&mut self, attrs: &Attrs) {
        if let Some(style) = &attrs.style {
            self.style.merge(style);
        }
        if let Some(shape) = &attrs.shape {
            match &mut self.kind {
                ElementKind::Shape(s) => s.merge(shape),
                ElementKind::Group(_) => {
                    tracing::debug!(id = %self.id, "shape patch on a group ignored");
                }
            }
        }
        if let Some(t) = &attrs.transform {
            self.transform.merge(t);
        }
        if let Some(v) = attrs.zlevel {
            self.zlevel = v;
        }
        if let Some(v) = attrs.z {
            self.z = v;
        }
        if let Some(v) = attrs.silent {
            self.silent = v;
        }
        if let Some(v) = attrs.invisible {
            self.invisible = v;
        }
        if let Some(v) = attrs.draggable {
            self.draggable = v;
        }
        for (path, value) in &attrs.values {
            if !self.set_prop(path, *value) {
                tracing::debug!(id = %self.id, path = path.as_str(), "ignoring unknown property");
            }
        }
    }
}

impl Animatable for Element {
    /// Dotted property paths: `x`, `y`, `rotation`, `scale_x`, ... address the transform;
    /// `transform.<f>`, `style.<f>` and `shape.<f>` address the records; `z` and `zlevel`
    /// the sort keys.
    fn get_prop(&self, path: &str) -> Option<f64> {
        match path.split_once('.') {
            Some(("style", f)) => self.style.get(f),
            Some(("shape", f)) => self.shape_ref()?.get(f),
            Some(("transform", f)) => self.transform.get(f),
            Some(_) => None,
            None => match path {
                "z" => Some(f64::from(self.z)),
                "zlevel" => Some(f64::from(self.zlevel)),
                _ => self.transform.get(path),
            },
        }
    }

    fn set_prop(&mut self, path: &str, value: f64) -> bool {
        match path.split_once('.') {
            Some(("style", f)) => self.style.set(f, value),
            Some(("shape", f)) => match &mut self.kind {
                ElementKind::Shape(s) => s.set(f, value),
                ElementKind::Group(_) => false,
            },
            Some(("transform", f)) => self.transform.set(f, value),
            Some(_) => false,
            None => match path {
                "z" => {
                    self.z = value.round() as i32;
                    true
                }
                "zlevel" => {
                    self.zlevel = value.round() as i32;
                    true
                }
                _ => self.transform.set(path, value),
            },
        }
    }
}

/// Attribute patch accepted by [`Storage::attr`](crate::scene::storage::Storage::attr).
///
/// Style, shape and transform patches shallow-merge into the existing records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attrs {
    /// Style fields to merge.
    pub style: Option<StylePatch>,
    /// Shape fields to merge.
    pub shape: Option<ShapePatch>,
    /// Transform fields to merge.
    pub transform: Option<TransformPatch>,
    /// New first-tier sort key.
    pub zlevel: Option<i32>,
    /// New second-tier sort key.
    pub z: Option<i32>,
    /// New silent flag.
    pub silent: Option<bool>,
    /// New invisible flag.
    pub invisible: Option<bool>,
    /// New draggable flag.
    pub draggable: Option<bool>,
    /// Dotted numeric property writes, applied last.
    pub values: SmallVec<[(String, f64); 4]>,
}

impl Attrs {
    /// Empty patch (still marks the element dirty when applied).
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge style fields.
    pub fn style(mut self, patch: StylePatch) -> Self {
        self.style = Some(patch);
        self
    }

    /// Merge shape fields.
    pub fn shape(mut self, patch: ShapePatch) -> Self {
        self.shape = Some(patch);
        self
    }

    /// Merge transform fields.
    pub fn transform(mut self, patch: TransformPatch) -> Self {
        self.transform = Some(patch);
        self
    }

    /// Set the second-tier sort key.
    pub fn z(mut self, z: i32) -> Self {
        self.z = Some(z);
        self
    }

    /// Set the first-tier sort key.
    pub fn zlevel(mut self, zlevel: i32) -> Self {
        self.zlevel = Some(zlevel);
        self
    }

    /// Set the silent flag.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    /// Set the invisible flag.
    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = Some(invisible);
        self
    }

    /// Set the draggable flag.
    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = Some(draggable);
        self
    }

    /// Write a dotted numeric property.
    pub fn set(mut self, path: impl Into<String>, value: f64) -> Self {
        self.values.push((path.into(), value));
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
