use crate::foundation::core::{Affine, Color};
use crate::foundation::error::SceneResult;
use crate::foundation::ids::NodeId;
use crate::scene::element::{Element, ElementKind};
use crate::scene::shape::Shape;
use crate::scene::storage::Storage;

/// Which backend a painter drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// CPU rasterizer producing pixels.
    #[default]
    Raster,
    /// Retained SVG document.
    Vector,
}

/// Options for [`Painter::export_image`](crate::render::painter::Painter::export_image).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExportOptions {
    /// Device pixels per CSS pixel; defaults to the surface's own ratio.
    pub pixel_ratio: Option<f64>,
    /// Color painted under the scene; transparent when `None`.
    pub background: Option<Color>,
}

/// Elements visited by one paint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawCount {
    /// Shapes handed to the backend.
    pub drawn: usize,
    /// Shapes skipped because their geometry was not finite.
    pub skipped: usize,
}

/// Surface a [`Painter`](crate::render::painter::Painter) paints onto.
pub trait PaintBackend {
    fn kind(&self) -> BackendKind;

    /// Reallocate for `width × height` CSS pixels at `dpr` device pixels each.
    fn resize(&mut self, width: u32, height: u32, dpr: f64) -> SceneResult<()>;

    /// Clear the surface and draw every visible root of `storage`.
    fn paint(&mut self, storage: &Storage) -> SceneResult<DrawCount>;

    /// Render `storage` to PNG bytes.
    fn export_png(&mut self, storage: &Storage, opts: &ExportOptions) -> SceneResult<Vec<u8>>;

    /// Release the surface. Later paints fail until the next resize.
    fn dispose(&mut self);
}

/// Callbacks of [`walk_scene`].
pub(crate) trait SceneVisitor {
    /// A visible group is entered; `local` is its own transform, `global` includes ancestors.
    fn enter_group(&mut self, el: &Element, local: Affine, global: Affine) -> SceneResult<()>;
    fn leave_group(&mut self, el: &Element) -> SceneResult<()>;
    fn shape(&mut self, el: &Element, shape: &Shape, local: Affine, global: Affine) -> SceneResult<()>;
}

/// Visit every visible element of `storage` in paint order.
///
/// Roots and siblings are sorted by `(zlevel, z)` with insertion order breaking ties.
/// Invisible elements hide their subtree; shapes with non-finite geometry are skipped.
pub(crate) fn walk_scene(storage: &Storage, visitor: &mut dyn SceneVisitor) -> SceneResult<DrawCount> {
    let mut count = DrawCount::default();
    for root in storage.element_list() {
        walk_node(storage, root, Affine::IDENTITY, visitor, &mut count)?;
    }
    Ok(count)
}

fn walk_node(
    storage: &Storage,
    id: NodeId,
    parent: Affine,
    visitor: &mut dyn SceneVisitor,
    count: &mut DrawCount,
) -> SceneResult<()> {
    let Some(el) = storage.get(id) else {
        return Ok(());
    };
    if el.is_invisible() {
        return Ok(());
    }
    let local = el.local_affine();
    let global = parent * local;
    match el.kind() {
        ElementKind::Group(_) => {
            visitor.enter_group(el, local, global)?;
            for child in storage.sorted_children(id) {
                walk_node(storage, child, global, visitor, count)?;
            }
            visitor.leave_group(el)
        }
        ElementKind::Shape(shape) => {
            if !shape.is_finite() || !local.as_coeffs().iter().all(|c| c.is_finite()) {
                tracing::debug!(%id, kind = shape.kind_name(), "skipping non-finite geometry");
                count.skipped += 1;
                return Ok(());
            }
            count.drawn += 1;
            visitor.shape(el, shape, local, global)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
