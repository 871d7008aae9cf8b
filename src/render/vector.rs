use crate::foundation::core::{Affine, Color};
use crate::foundation::error::{SceneError, SceneResult};
use crate::render::backend::{
    BackendKind, DrawCount, ExportOptions, PaintBackend, SceneVisitor, walk_scene,
};
use crate::render::export::{device_size, encode_png};
use crate::render::svg_doc::{SvgDocument, SvgKind, SvgNode, SvgPaint, arc_path_data, sector_path_data};
use crate::scene::element::Element;
use crate::scene::shape::Shape;
use crate::scene::storage::Storage;
use crate::scene::style::Style;
use std::path::PathBuf;
use std::sync::Arc;

/// Vector backend: keeps the scene as an SVG document.
///
/// Every paint rebuilds the document from the registry; groups become nested `<g>` nodes
/// carrying their local transform, so the output mirrors the scene structure.
pub struct VectorBackend {
    width: u32,
    height: u32,
    dpr: f64,
    doc: Option<SvgDocument>,
    font_bytes: Option<Arc<Vec<u8>>>,
    resources_dir: Option<PathBuf>,
    fontdb: Option<Arc<usvg::fontdb::Database>>,
}

impl VectorBackend {
    pub fn new(width: u32, height: u32, dpr: f64) -> SceneResult<Self> {
        let mut backend = Self {
            width,
            height,
            dpr,
            doc: None,
            font_bytes: None,
            resources_dir: None,
            fontdb: None,
        };
        backend.resize(width, height, dpr)?;
        Ok(backend)
    }

    /// Font registered for PNG export in addition to system fonts.
    pub fn with_font(mut self, font_bytes: Arc<Vec<u8>>) -> Self {
        self.font_bytes = Some(font_bytes);
        self.fontdb = None;
        self
    }

    /// Directory relative image hrefs are resolved against during export.
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    /// Document built by the last paint.
    pub fn document(&self) -> Option<&SvgDocument> {
        self.doc.as_ref()
    }

    /// Serialized document of the last paint.
    pub fn svg_string(&self) -> SceneResult<String> {
        let doc = self
            .doc
            .as_ref()
            .ok_or_else(|| SceneError::surface("vector surface is disposed"))?;
        doc.to_svg_string()
            .map_err(|e| SceneError::render(format!("svg serialization failed: {e}")))
    }

    /// Serialize `storage` as a standalone SVG file with an optional background rect.
    pub fn export_svg(&self, storage: &Storage, background: Option<Color>) -> SceneResult<String> {
        let (doc, _) = self.build(storage, background)?;
        doc.to_svg_string()
            .map_err(|e| SceneError::export(format!("svg serialization failed: {e}")))
    }

    fn build(&self, storage: &Storage, background: Option<Color>) -> SceneResult<(SvgDocument, DrawCount)> {
        let mut visitor = SvgBuilder {
            doc: SvgDocument::new(f64::from(self.width), f64::from(self.height)),
            stack: vec![(Affine::IDENTITY, 1.0, Vec::new())],
        };
        visitor.doc.background = background;
        let count = walk_scene(storage, &mut visitor)?;
        let mut doc = visitor.doc;
        doc.children = visitor
            .stack
            .pop()
            .map(|(_, _, children)| children)
            .unwrap_or_default();
        Ok((doc, count))
    }

    fn fontdb(&mut self) -> Arc<usvg::fontdb::Database> {
        if let Some(db) = &self.fontdb {
            return Arc::clone(db);
        }
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(bytes) = &self.font_bytes {
            db.load_font_data(bytes.as_ref().clone());
        }
        tracing::debug!(faces = db.len(), "loaded fonts for svg export");
        let db = Arc::new(db);
        self.fontdb = Some(Arc::clone(&db));
        db
    }
}

impl PaintBackend for VectorBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vector
    }

    fn resize(&mut self, width: u32, height: u32, dpr: f64) -> SceneResult<()> {
        device_size(width, height, dpr)?;
        self.width = width;
        self.height = height;
        self.dpr = dpr;
        let mut doc = self.doc.take().unwrap_or_default();
        doc.width = f64::from(width);
        doc.height = f64::from(height);
        self.doc = Some(doc);
        Ok(())
    }

    fn paint(&mut self, storage: &Storage) -> SceneResult<DrawCount> {
        if self.doc.is_none() {
            return Err(SceneError::surface("vector surface is disposed"));
        }
        let (doc, count) = self.build(storage, None)?;
        self.doc = Some(doc);
        Ok(count)
    }

    fn export_png(&mut self, storage: &Storage, opts: &ExportOptions) -> SceneResult<Vec<u8>> {
        if self.doc.is_none() {
            return Err(SceneError::surface("vector surface is disposed"));
        }
        let ratio = opts.pixel_ratio.unwrap_or(self.dpr);
        let (w, h) = device_size(self.width, self.height, ratio)?;
        let (doc, _) = self.build(storage, opts.background)?;
        let svg = doc
            .to_svg_string()
            .map_err(|e| SceneError::render(format!("svg serialization failed: {e}")))?;

        let mut usvg_opts = usvg::Options::default();
        usvg_opts.resources_dir = self.resources_dir.clone();
        usvg_opts.fontdb = self.fontdb();
        let tree = usvg::Tree::from_str(&svg, &usvg_opts)
            .map_err(|e| SceneError::export(format!("parse generated svg: {e}")))?;
        let rgba = rasterize_svg_to_premul_rgba8(&tree, u32::from(w), u32::from(h))?;
        encode_png(&rgba, u32::from(w), u32::from(h))
    }

    fn dispose(&mut self) {
        self.doc = None;
    }
}

impl std::fmt::Debug for VectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorBackend")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dpr", &self.dpr)
            .field("disposed", &self.doc.is_none())
            .finish_non_exhaustive()
    }
}

/// Rasterize `tree` to premultiplied RGBA8 at exactly `width × height`.
pub fn rasterize_svg_to_premul_rgba8(tree: &usvg::Tree, width: u32, height: u32) -> SceneResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SceneError::export("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

struct SvgBuilder {
    doc: SvgDocument,
    // Open groups: local transform, opacity, children collected so far.
    stack: Vec<(Affine, f64, Vec<SvgNode>)>,
}

impl SvgBuilder {
    fn push(&mut self, node: SvgNode) {
        if let Some((_, _, children)) = self.stack.last_mut() {
            children.push(node);
        }
    }

    fn paint_for(&mut self, style: &Style, fillable: bool) -> SvgPaint {
        let filter = style
            .shadow
            .filter(|s| s.color.a > 0)
            .map(|s| self.doc.add_shadow(s.offset_x, s.offset_y, s.blur, s.color));
        SvgPaint {
            fill: style.fill.filter(|_| fillable),
            stroke: style.stroke,
            line_width: style.line_width,
            line_dash: style.line_dash.clone(),
            line_dash_offset: style.line_dash_offset,
            line_cap: style.line_cap,
            line_join: style.line_join,
            opacity: style.opacity.clamp(0.0, 1.0),
            filter,
        }
    }
}

impl SceneVisitor for SvgBuilder {
    fn enter_group(&mut self, el: &Element, local: Affine, _global: Affine) -> SceneResult<()> {
        self.stack
            .push((local, el.style().opacity.clamp(0.0, 1.0), Vec::new()));
        Ok(())
    }

    fn leave_group(&mut self, _el: &Element) -> SceneResult<()> {
        let Some((transform, opacity, children)) = self.stack.pop() else {
            return Err(SceneError::render("unbalanced group nesting"));
        };
        let node = SvgNode::new(SvgKind::Group(children))
            .with_transform(transform)
            .with_paint(SvgPaint {
                opacity,
                ..SvgPaint::default()
            });
        self.push(node);
        Ok(())
    }

    fn shape(&mut self, el: &Element, shape: &Shape, local: Affine, _global: Affine) -> SceneResult<()> {
        let style = el.style();
        let kind = match shape {
            Shape::Circle { cx, cy, r } => Some(SvgKind::Circle {
                cx: *cx,
                cy: *cy,
                r: *r,
            }),
            Shape::Rect {
                x,
                y,
                width,
                height,
                radius,
            } => Some(SvgKind::Rect {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                radius: *radius,
            }),
            Shape::Line { x1, y1, x2, y2 } => Some(SvgKind::Line {
                x1: *x1,
                y1: *y1,
                x2: *x2,
                y2: *y2,
            }),
            Shape::Polyline { points } => Some(SvgKind::Polyline(points.clone())),
            Shape::Polygon { points } => Some(SvgKind::Polygon(points.clone())),
            Shape::Path { d } => shape.to_path().map(|_| SvgKind::Path(d.clone())),
            Shape::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                ..
            } => shape.sweep().filter(|s| *s != 0.0).map(|sweep| {
                let (inner, outer) = if r0 <= r { (*r0, *r) } else { (*r, *r0) };
                SvgKind::Path(sector_path_data(*cx, *cy, inner.max(0.0), outer, *start_angle, sweep))
            }),
            Shape::Arc {
                cx,
                cy,
                r,
                start_angle,
                ..
            } => shape
                .sweep()
                .map(|sweep| SvgKind::Path(arc_path_data(*cx, *cy, r.abs(), *start_angle, sweep))),
            Shape::Text { x, y, text } => Some(SvgKind::Text {
                x: *x,
                y: *y,
                text: text.clone(),
                font_size: style.font_size,
                font_family: style.font_family.clone(),
                align: style.text_align,
                baseline: style.text_baseline,
            }),
            Shape::Image {
                x,
                y,
                width,
                height,
                source,
            } => (!source.href.is_empty()).then(|| SvgKind::Image {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                href: source.href.clone(),
            }),
        };
        let Some(kind) = kind else {
            tracing::debug!(id = %el.id(), kind = shape.kind_name(), "shape has no svg form");
            return Ok(());
        };
        let fillable = !matches!(
            shape,
            Shape::Line { .. } | Shape::Polyline { .. } | Shape::Arc { .. }
        );
        let mut paint = self.paint_for(style, fillable);
        if matches!(shape, Shape::Text { .. }) && paint.fill.is_none() {
            paint.fill = Some(Color::BLACK);
        }
        self.push(SvgNode::new(kind).with_transform(local).with_paint(paint));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/vector.rs"]
mod tests;
