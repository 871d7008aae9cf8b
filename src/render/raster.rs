use crate::foundation::core::{Affine, BezPath, Color, Point, Rect};
use crate::foundation::error::{SceneError, SceneResult};
use crate::render::backend::{
    BackendKind, DrawCount, ExportOptions, PaintBackend, SceneVisitor, walk_scene,
};
use crate::render::export::{device_size, encode_png};
use crate::render::text::{TextBrush, TextEngine};
use crate::scene::element::Element;
use crate::scene::shape::{ImageData, Shape, text_box_from_metrics};
use crate::scene::storage::Storage;
use crate::scene::style::{LineCap, LineJoin, Style};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

/// CPU raster backend built on `vello_cpu`.
///
/// Keeps one premultiplied pixmap sized to the device resolution and redraws the whole
/// scene into it on every paint.
pub struct RasterBackend {
    width: u32,
    height: u32,
    dpr: f64,
    surface: Option<CpuSurface>,
    text: Option<TextEngine>,
    font: Option<vello_cpu::peniko::FontData>,
    // Keyed by the `Arc` address; the cached `Arc` keeps that address alive.
    images: HashMap<usize, (Arc<ImageData>, vello_cpu::Image)>,
}

impl RasterBackend {
    /// Allocate a surface of `width × height` CSS pixels at `dpr`.
    pub fn new(width: u32, height: u32, dpr: f64, text: Option<TextEngine>) -> SceneResult<Self> {
        let font = text.as_ref().map(|t| {
            vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(t.font_bytes().as_ref().clone()),
                0,
            )
        });
        let mut backend = Self {
            width,
            height,
            dpr,
            surface: None,
            text,
            font,
            images: HashMap::new(),
        };
        backend.resize(width, height, dpr)?;
        Ok(backend)
    }

    /// Device-pixel size of the current surface.
    pub fn device_size(&self) -> Option<(u16, u16)> {
        self.surface.as_ref().map(|s| (s.width, s.height))
    }

    /// Premultiplied RGBA8 pixels of the last paint.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.surface.as_ref().map(|s| s.pixmap.data_as_u8_slice())
    }

    /// Premultiplied RGBA8 pixel at device coordinates.
    pub fn pixel(&self, x: u16, y: u16) -> Option<[u8; 4]> {
        let s = self.surface.as_ref()?;
        if x >= s.width || y >= s.height {
            return None;
        }
        let i = (usize::from(y) * usize::from(s.width) + usize::from(x)) * 4;
        let px = s.pixmap.data_as_u8_slice().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    fn render_into(
        &mut self,
        storage: &Storage,
        ctx: &mut vello_cpu::RenderContext,
        ratio: f64,
    ) -> SceneResult<DrawCount> {
        let mut visitor = RasterVisitor {
            ctx,
            base: Affine::scale(ratio),
            text: self.text.as_mut(),
            font: self.font.as_ref(),
            images: &mut self.images,
            touched: HashSet::new(),
            layers: Vec::new(),
        };
        let result = walk_scene(storage, &mut visitor);
        let touched = std::mem::take(&mut visitor.touched);
        // Images no longer in the scene release their pixmaps.
        self.images.retain(|key, _| touched.contains(key));
        result
    }

    /// Number of decoded images held between paints.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }
}

impl PaintBackend for RasterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn resize(&mut self, width: u32, height: u32, dpr: f64) -> SceneResult<()> {
        let (w, h) = device_size(width, height, dpr)?;
        self.width = width;
        self.height = height;
        self.dpr = dpr;
        let reuse = matches!(&self.surface, Some(s) if s.width == w && s.height == h);
        if !reuse {
            self.surface = Some(CpuSurface {
                width: w,
                height: h,
                pixmap: vello_cpu::Pixmap::new(w, h),
            });
        }
        Ok(())
    }

    fn paint(&mut self, storage: &Storage) -> SceneResult<DrawCount> {
        let Some(mut surface) = self.surface.take() else {
            return Err(SceneError::surface("raster surface is disposed"));
        };
        clear_pixmap(&mut surface.pixmap, [0, 0, 0, 0]);
        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        let result = self.render_into(storage, &mut ctx, self.dpr);
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);
        self.surface = Some(surface);
        result
    }

    fn export_png(&mut self, storage: &Storage, opts: &ExportOptions) -> SceneResult<Vec<u8>> {
        if self.surface.is_none() {
            return Err(SceneError::surface("raster surface is disposed"));
        }
        let ratio = opts.pixel_ratio.unwrap_or(self.dpr);
        let (w, h) = device_size(self.width, self.height, ratio)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        clear_pixmap(&mut pixmap, [0, 0, 0, 0]);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        if let Some(bg) = opts.background {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(bg));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        }
        self.render_into(storage, &mut ctx, ratio)?;
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        encode_png(pixmap.data_as_u8_slice(), u32::from(w), u32::from(h))
    }

    fn dispose(&mut self) {
        self.surface = None;
        self.images.clear();
    }
}

impl std::fmt::Debug for RasterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBackend")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dpr", &self.dpr)
            .field("device_size", &self.device_size())
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

struct RasterVisitor<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    base: Affine,
    text: Option<&'a mut TextEngine>,
    font: Option<&'a vello_cpu::peniko::FontData>,
    images: &'a mut HashMap<usize, (Arc<ImageData>, vello_cpu::Image)>,
    touched: HashSet<usize>,
    // One entry per entered group: whether it pushed an opacity layer.
    layers: Vec<bool>,
}

impl SceneVisitor for RasterVisitor<'_> {
    fn enter_group(&mut self, el: &Element, _local: Affine, _global: Affine) -> SceneResult<()> {
        let opacity = el.style().opacity.clamp(0.0, 1.0) as f32;
        let layered = opacity < 1.0;
        if layered {
            self.ctx.push_opacity_layer(opacity);
        }
        self.layers.push(layered);
        Ok(())
    }

    fn leave_group(&mut self, _el: &Element) -> SceneResult<()> {
        if self.layers.pop().unwrap_or(false) {
            self.ctx.pop_layer();
        }
        Ok(())
    }

    fn shape(&mut self, el: &Element, shape: &Shape, _local: Affine, global: Affine) -> SceneResult<()> {
        let style = el.style();
        let opacity = style.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            return Ok(());
        }
        let xf = self.base * global;
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        let result = match shape {
            Shape::Text { x, y, text } => self.draw_text(el, Point::new(*x, *y), text, style, xf),
            Shape::Image {
                x,
                y,
                width,
                height,
                source,
            } => {
                let dest = Rect::new(*x, *y, x + width, y + height);
                match &source.pixels {
                    Some(data) => self.draw_image(data, dest, xf),
                    None => {
                        tracing::debug!(id = %el.id(), href = %source.href, "image has no pixels");
                        Ok(())
                    }
                }
            }
            _ => {
                if let Some(path) = shape.to_path() {
                    self.draw_path(shape, &path, style, xf);
                }
                Ok(())
            }
        };
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        result
    }
}

impl RasterVisitor<'_> {
    fn draw_path(&mut self, shape: &Shape, path: &BezPath, style: &Style, xf: Affine) {
        let cpu_path = bezpath_to_cpu(path);
        let fillable = !matches!(
            shape,
            Shape::Line { .. } | Shape::Polyline { .. } | Shape::Arc { .. }
        );
        let fill = style.fill.filter(|_| fillable && style.has_fill());

        if let Some(shadow) = style.shadow.filter(|s| s.color.a > 0) {
            // Offsets are in device space, so the shift happens after the element transform.
            let shifted = Affine::translate((shadow.offset_x, shadow.offset_y)) * xf;
            self.ctx.set_transform(affine_to_cpu(shifted));
            self.ctx.set_paint(color_to_cpu(shadow.color));
            if fill.is_some() {
                self.ctx.fill_path(&cpu_path);
            } else if style.has_stroke() {
                self.ctx.set_stroke(stroke_for(style));
                self.ctx.stroke_path(&cpu_path);
            }
        }

        self.ctx.set_transform(affine_to_cpu(xf));
        if let Some(color) = fill {
            self.ctx.set_paint(color_to_cpu(color));
            self.ctx.fill_path(&cpu_path);
        }
        if let Some(color) = style.stroke.filter(|_| style.has_stroke()) {
            self.ctx.set_stroke(stroke_for(style));
            self.ctx.set_paint(color_to_cpu(color));
            self.ctx.stroke_path(&cpu_path);
        }
    }

    fn draw_text(
        &mut self,
        el: &Element,
        at: Point,
        text: &str,
        style: &Style,
        xf: Affine,
    ) -> SceneResult<()> {
        let (Some(engine), Some(font)) = (self.text.as_deref_mut(), self.font) else {
            tracing::debug!(id = %el.id(), "no font configured; text skipped");
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }
        let color = style.fill.unwrap_or(Color::BLACK);
        let layout = match engine.layout(text, style.font_size as f32, TextBrush::from(color)) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::debug!(id = %el.id(), error = %e, "text layout failed; text skipped");
                return Ok(());
            }
        };
        let bbox = text_box_from_metrics(
            at.x,
            at.y,
            f64::from(layout.width()),
            f64::from(layout.height()),
            style,
        );
        self.ctx
            .set_transform(affine_to_cpu(xf * Affine::translate((bbox.x0, bbox.y0))));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn draw_image(&mut self, data: &Arc<ImageData>, dest: Rect, xf: Affine) -> SceneResult<()> {
        if data.width == 0 || data.height == 0 || dest.width() == 0.0 || dest.height() == 0.0 {
            return Ok(());
        }
        let key = Arc::as_ptr(data) as usize;
        self.touched.insert(key);
        let paint = match self.images.get(&key) {
            Some((_, paint)) => paint.clone(),
            None => {
                let pixmap = image_premul_bytes_to_pixmap(&data.rgba8_premul, data.width, data.height)?;
                let paint = vello_cpu::Image {
                    image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                    sampler: vello_cpu::peniko::ImageSampler::default(),
                };
                self.images.insert(key, (Arc::clone(data), paint.clone()));
                paint
            }
        };
        let w = f64::from(data.width);
        let h = f64::from(data.height);
        let place = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);
        self.ctx.set_transform(affine_to_cpu(xf * place));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        Ok(())
    }
}

fn stroke_for(style: &Style) -> vello_cpu::kurbo::Stroke {
    let cap = match style.line_cap {
        LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
        LineCap::Round => vello_cpu::kurbo::Cap::Round,
        LineCap::Square => vello_cpu::kurbo::Cap::Square,
    };
    let join = match style.line_join {
        LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
        LineJoin::Round => vello_cpu::kurbo::Join::Round,
        LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
    };
    let mut stroke = vello_cpu::kurbo::Stroke::new(style.line_width)
        .with_caps(cap)
        .with_join(join);
    let dashes_valid = !style.line_dash.is_empty()
        && style.line_dash.iter().all(|d| d.is_finite() && *d >= 0.0)
        && style.line_dash.iter().any(|d| *d > 0.0);
    if dashes_valid {
        stroke = stroke.with_dashes(style.line_dash_offset, style.line_dash.iter().copied());
    }
    stroke
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SceneResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SceneError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SceneError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SceneError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
