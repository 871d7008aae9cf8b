use crate::foundation::core::{BezPath, Point, Rect, Vec2, all_finite};
use crate::foundation::error::{SceneError, SceneResult};
use crate::scene::style::{Style, TextAlign, TextBaseline};
use kurbo::{PathEl, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;

/// Tolerance used when flattening curves for hit-testing and arc construction.
pub(crate) const FLATTEN_TOLERANCE: f64 = 0.1;

/// Smallest half-width used when hit-testing stroke-only shapes (lines, polylines, arcs).
pub(crate) const MIN_HIT_HALF_WIDTH: f64 = 1.5;

/// Decoded raster image, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed premultiplied RGBA8 rows.
    pub rgba8_premul: Vec<u8>,
}

impl ImageData {
    /// Decode PNG/JPEG/... bytes through the `image` crate.
    pub fn decode(bytes: &[u8]) -> SceneResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| SceneError::validation(format!("image decode failed: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = (((u16::from(*c) * a) + 127) / 255) as u8;
            }
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: data,
        })
    }
}

/// Image reference carried by [`Shape::Image`].
///
/// `href` is what the vector backend writes; `pixels` is what the raster backend draws.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// URI written into vector output.
    #[serde(default)]
    pub href: String,
    /// Decoded pixels, if the caller has them.
    #[serde(skip)]
    pub pixels: Option<Arc<ImageData>>,
}

/// Kind-specific geometry of a drawable element.
///
/// Angles are radians measured clockwise from the positive x axis (y points down).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Full circle.
    Circle {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius.
        r: f64,
    },
    /// Axis-aligned rectangle with optional corner radius.
    Rect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width (may be negative).
        width: f64,
        /// Height (may be negative).
        height: f64,
        /// Corner radius.
        #[serde(default)]
        radius: f64,
    },
    /// Single segment.
    Line {
        /// Start x.
        x1: f64,
        /// Start y.
        y1: f64,
        /// End x.
        x2: f64,
        /// End y.
        y2: f64,
    },
    /// Open chain of segments.
    Polyline {
        /// Vertices.
        points: Vec<Point>,
    },
    /// Closed polygon.
    Polygon {
        /// Vertices.
        points: Vec<Point>,
    },
    /// SVG path data.
    Path {
        /// Path commands in SVG `d` syntax.
        d: String,
    },
    /// Single line of text.
    Text {
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
        /// Content.
        text: String,
    },
    /// Filled ring sector (pie slice when `r0 == 0`).
    Sector {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Inner radius.
        #[serde(default)]
        r0: f64,
        /// Outer radius.
        r: f64,
        /// Start angle.
        start_angle: f64,
        /// End angle.
        end_angle: f64,
        /// Sweep direction.
        #[serde(default = "default_clockwise")]
        clockwise: bool,
    },
    /// Stroked circular arc.
    Arc {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius.
        r: f64,
        /// Start angle.
        start_angle: f64,
        /// End angle.
        end_angle: f64,
        /// Sweep direction.
        #[serde(default = "default_clockwise")]
        clockwise: bool,
    },
    /// Raster image placed in a rectangle.
    Image {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Image reference.
        #[serde(default)]
        source: ImageSource,
    },
}

fn default_clockwise() -> bool {
    true
}

/// Partial shape update.
///
/// Numeric fields are addressed by name and only apply when the current shape kind has a
/// field of that name. Structured fields apply to the kinds that carry them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePatch {
    /// Named numeric updates, applied in order.
    pub values: SmallVec<[(String, f64); 4]>,
    /// New vertex list (polyline/polygon).
    pub points: Option<Vec<Point>>,
    /// New path data (path).
    pub d: Option<String>,
    /// New text content (text).
    pub text: Option<String>,
    /// New sweep direction (sector/arc).
    pub clockwise: Option<bool>,
    /// New image source (image).
    pub source: Option<ImageSource>,
}

impl ShapePatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named numeric update.
    pub fn set(mut self, field: impl Into<String>, value: f64) -> Self {
        self.values.push((field.into(), value));
        self
    }

    /// Replace the vertex list.
    pub fn points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    /// Replace the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Replace the path data.
    pub fn path_data(mut self, d: impl Into<String>) -> Self {
        self.d = Some(d.into());
        self
    }
}

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid may return TAU itself for tiny negative inputs.
    if a >= TAU { 0.0 } else { a }
}

/// Signed sweep from `start` to `end` in the requested direction.
///
/// A span of at least a full turn yields `±2π`; otherwise the result lies in `(-2π, 2π)`.
pub fn arc_sweep(start: f64, end: f64, clockwise: bool) -> f64 {
    let delta = end - start;
    if delta.abs() >= TAU {
        return if clockwise { TAU } else { -TAU };
    }
    if clockwise {
        delta.rem_euclid(TAU)
    } else {
        -(-delta).rem_euclid(TAU)
    }
}

/// Return `true` when `angle` lies on the arc from `start` sweeping `sweep` radians.
pub fn angle_in_sweep(angle: f64, start: f64, sweep: f64) -> bool {
    if sweep == 0.0 {
        return false;
    }
    if sweep.abs() >= TAU {
        return true;
    }
    // Express the band clockwise so a single normalized interval covers it.
    let (from, to) = if sweep > 0.0 {
        (start, start + sweep)
    } else {
        (start + sweep, start)
    };
    let s = normalize_angle(from);
    let e = normalize_angle(to);
    let a = normalize_angle(angle);
    if e > s {
        a >= s && a <= e
    } else {
        // The band wraps through zero.
        a >= s || a <= e
    }
}

/// Squared distance from `p` to the segment `a..b`.
pub(crate) fn segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return ap.hypot2();
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    let proj = a + ab * t;
    (p - proj).hypot2()
}

fn polyline_hit(points: &[Point], closed: bool, p: Point, half_width: f64) -> bool {
    let limit = half_width * half_width;
    let hit_pair = |a: Point, b: Point| segment_distance_sq(p, a, b) <= limit;
    if points.windows(2).any(|w| hit_pair(w[0], w[1])) {
        return true;
    }
    closed
        && points.len() > 2
        && hit_pair(points[points.len() - 1], points[0])
}

/// Even-odd ray casting.
fn polygon_contains(points: &[Point], p: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn path_stroke_hit(path: &BezPath, p: Point, half_width: f64) -> bool {
    let limit = half_width * half_width;
    let mut hit = false;
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| {
        if hit {
            return;
        }
        match el {
            PathEl::MoveTo(pt) => {
                start = pt;
                last = pt;
            }
            PathEl::LineTo(pt) => {
                hit = segment_distance_sq(p, last, pt) <= limit;
                last = pt;
            }
            PathEl::ClosePath => {
                hit = segment_distance_sq(p, last, start) <= limit;
                last = start;
            }
            _ => {}
        }
    });
    hit
}

/// Approximate single-line text box used where no font is available.
///
/// Width assumes an average advance of `0.6 × font_size` per character.
pub fn estimate_text_box(x: f64, y: f64, text: &str, style: &Style) -> Rect {
    let size = style.font_size.max(0.0);
    let width = text.chars().count() as f64 * size * 0.6;
    text_box_from_metrics(x, y, width, size, style)
}

/// Position a `width × line_height` box according to the style's anchors.
pub fn text_box_from_metrics(x: f64, y: f64, width: f64, line_height: f64, style: &Style) -> Rect {
    let left = match style.text_align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    let top = match style.text_baseline {
        TextBaseline::Top => y,
        TextBaseline::Middle => y - line_height / 2.0,
        TextBaseline::Alphabetic => y - line_height * 0.8,
        TextBaseline::Bottom => y - line_height,
    };
    Rect::new(left, top, left + width, top + line_height)
}

fn circular_arc(center: Point, r: f64, start: f64, sweep: f64) -> kurbo::Arc {
    kurbo::Arc {
        center,
        radii: Vec2::new(r, r),
        start_angle: start,
        sweep_angle: sweep,
        x_rotation: 0.0,
    }
}

/// Build a ring sector outline (outer arc, inner arc back, closed).
pub fn sector_path(center: Point, r0: f64, r: f64, start: f64, sweep: f64) -> BezPath {
    let mut path = BezPath::new();
    let outer = circular_arc(center, r, start, sweep);
    let full = sweep.abs() >= TAU;
    if r0 > 0.0 {
        let inner = circular_arc(center, r0, start + sweep, -sweep);
        path.move_to(center + Vec2::from_angle(start) * r);
        path.extend(outer.append_iter(FLATTEN_TOLERANCE));
        if full {
            path.close_path();
            path.move_to(center + Vec2::from_angle(start + sweep) * r0);
        } else {
            path.line_to(center + Vec2::from_angle(start + sweep) * r0);
        }
        path.extend(inner.append_iter(FLATTEN_TOLERANCE));
        path.close_path();
    } else {
        if full {
            path.move_to(center + Vec2::from_angle(start) * r);
        } else {
            path.move_to(center);
            path.line_to(center + Vec2::from_angle(start) * r);
        }
        path.extend(outer.append_iter(FLATTEN_TOLERANCE));
        path.close_path();
    }
    path
}

/// Build an open arc outline.
pub fn arc_path(center: Point, r: f64, start: f64, sweep: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(center + Vec2::from_angle(start) * r);
    let arc = circular_arc(center, r, start, sweep);
    path.extend(arc.append_iter(FLATTEN_TOLERANCE));
    path
}

/// Parse SVG path data, logging and discarding malformed input.
pub(crate) fn parse_path_data(d: &str) -> Option<BezPath> {
    match BezPath::from_svg(d) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!(error = %e, "invalid path data; element renders nothing");
            None
        }
    }
}

impl Shape {
    /// Lowercase kind name, matching the serialized `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Rect { .. } => "rect",
            Self::Line { .. } => "line",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Path { .. } => "path",
            Self::Text { .. } => "text",
            Self::Sector { .. } => "sector",
            Self::Arc { .. } => "arc",
            Self::Image { .. } => "image",
        }
    }

    /// Numeric fields of this kind with their current values.
    pub fn numeric_fields(&self) -> SmallVec<[(&'static str, f64); 8]> {
        let mut out = SmallVec::new();
        match *self {
            Self::Circle { cx, cy, r } => {
                out.extend([("cx", cx), ("cy", cy), ("r", r)]);
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                radius,
            } => {
                out.extend([
                    ("x", x),
                    ("y", y),
                    ("width", width),
                    ("height", height),
                    ("radius", radius),
                ]);
            }
            Self::Line { x1, y1, x2, y2 } => {
                out.extend([("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2)]);
            }
            Self::Text { x, y, .. } => out.extend([("x", x), ("y", y)]),
            Self::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                end_angle,
                ..
            } => {
                out.extend([
                    ("cx", cx),
                    ("cy", cy),
                    ("r0", r0),
                    ("r", r),
                    ("start_angle", start_angle),
                    ("end_angle", end_angle),
                ]);
            }
            Self::Arc {
                cx,
                cy,
                r,
                start_angle,
                end_angle,
                ..
            } => {
                out.extend([
                    ("cx", cx),
                    ("cy", cy),
                    ("r", r),
                    ("start_angle", start_angle),
                    ("end_angle", end_angle),
                ]);
            }
            Self::Image {
                x,
                y,
                width,
                height,
                ..
            } => {
                out.extend([("x", x), ("y", y), ("width", width), ("height", height)]);
            }
            Self::Polyline { .. } | Self::Polygon { .. } | Self::Path { .. } => {}
        }
        out
    }

    /// Read a numeric field by name.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.numeric_fields()
            .into_iter()
            .find_map(|(name, v)| (name == field).then_some(v))
    }

    /// Write a numeric field by name. Returns `false` when this kind has no such field.
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        let slot = match (self, field) {
            (Self::Circle { cx, .. }, "cx") => cx,
            (Self::Circle { cy, .. }, "cy") => cy,
            (Self::Circle { r, .. }, "r") => r,
            (Self::Rect { x, .. }, "x") => x,
            (Self::Rect { y, .. }, "y") => y,
            (Self::Rect { width, .. }, "width") => width,
            (Self::Rect { height, .. }, "height") => height,
            (Self::Rect { radius, .. }, "radius") => radius,
            (Self::Line { x1, .. }, "x1") => x1,
            (Self::Line { y1, .. }, "y1") => y1,
            (Self::Line { x2, .. }, "x2") => x2,
            (Self::Line { y2, .. }, "y2") => y2,
            (Self::Text { x, .. }, "x") => x,
            (Self::Text { y, .. }, "y") => y,
            (Self::Sector { cx, .. }, "cx") => cx,
            (Self::Sector { cy, .. }, "cy") => cy,
            (Self::Sector { r0, .. }, "r0") => r0,
            (Self::Sector { r, .. }, "r") => r,
            (Self::Sector { start_angle, .. }, "start_angle") => start_angle,
            (Self::Sector { end_angle, .. }, "end_angle") => end_angle,
            (Self::Arc { cx, .. }, "cx") => cx,
            (Self::Arc { cy, .. }, "cy") => cy,
            (Self::Arc { r, .. }, "r") => r,
            (Self::Arc { start_angle, .. }, "start_angle") => start_angle,
            (Self::Arc { end_angle, .. }, "end_angle") => end_angle,
            (Self::Image { x, .. }, "x") => x,
            (Self::Image { y, .. }, "y") => y,
            (Self::Image { width, .. }, "width") => width,
            (Self::Image { height, .. }, "height") => height,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Shallow-merge `patch` into this shape. Fields the kind does not carry are ignored.
    pub fn merge(&mut self, patch: &ShapePatch) {
        let kind = self.kind_name();
        for (field, value) in &patch.values {
            if !self.set(field, *value) {
                tracing::debug!(kind, field = field.as_str(), "ignoring unknown shape field");
            }
        }
        match self {
            Self::Polyline { points } | Self::Polygon { points } => {
                if let Some(p) = &patch.points {
                    points.clone_from(p);
                }
            }
            Self::Path { d } => {
                if let Some(new_d) = &patch.d {
                    d.clone_from(new_d);
                }
            }
            Self::Text { text, .. } => {
                if let Some(t) = &patch.text {
                    text.clone_from(t);
                }
            }
            Self::Sector { clockwise, .. } | Self::Arc { clockwise, .. } => {
                if let Some(c) = patch.clockwise {
                    *clockwise = c;
                }
            }
            Self::Image { source, .. } => {
                if let Some(s) = &patch.source {
                    *source = s.clone();
                }
            }
            _ => {}
        }
    }

    /// Return `true` when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        let numbers: SmallVec<[f64; 8]> = self.numeric_fields().iter().map(|(_, v)| *v).collect();
        if !all_finite(&numbers) {
            return false;
        }
        match self {
            Self::Polyline { points } | Self::Polygon { points } => {
                points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
            }
            _ => true,
        }
    }

    /// Signed sweep of sector/arc shapes.
    pub fn sweep(&self) -> Option<f64> {
        match *self {
            Self::Sector {
                start_angle,
                end_angle,
                clockwise,
                ..
            }
            | Self::Arc {
                start_angle,
                end_angle,
                clockwise,
                ..
            } => Some(arc_sweep(start_angle, end_angle, clockwise)),
            _ => None,
        }
    }

    /// Outline as a Bézier path, for kinds that have one.
    ///
    /// Text and image shapes return `None`; malformed path data is logged and returns `None`.
    pub fn to_path(&self) -> Option<BezPath> {
        match self {
            Self::Circle { cx, cy, r } => {
                Some(kurbo::Circle::new((*cx, *cy), r.abs()).to_path(FLATTEN_TOLERANCE))
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                radius,
            } => {
                let rect = Rect::new(*x, *y, x + width, y + height).abs();
                if *radius > 0.0 {
                    Some(rect.to_rounded_rect(*radius).to_path(FLATTEN_TOLERANCE))
                } else {
                    Some(rect.to_path(FLATTEN_TOLERANCE))
                }
            }
            Self::Line { x1, y1, x2, y2 } => {
                let mut p = BezPath::new();
                p.move_to((*x1, *y1));
                p.line_to((*x2, *y2));
                Some(p)
            }
            Self::Polyline { points } | Self::Polygon { points } => {
                let (first, rest) = points.split_first()?;
                let mut p = BezPath::new();
                p.move_to(*first);
                for pt in rest {
                    p.line_to(*pt);
                }
                if matches!(self, Self::Polygon { .. }) {
                    p.close_path();
                }
                Some(p)
            }
            Self::Path { d } => parse_path_data(d),
            Self::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                ..
            } => {
                let sweep = self.sweep()?;
                if sweep == 0.0 {
                    return None;
                }
                let (inner, outer) = if r0 <= r { (*r0, *r) } else { (*r, *r0) };
                Some(sector_path(
                    Point::new(*cx, *cy),
                    inner.max(0.0),
                    outer,
                    *start_angle,
                    sweep,
                ))
            }
            Self::Arc {
                cx,
                cy,
                r,
                start_angle,
                ..
            } => {
                let sweep = self.sweep()?;
                Some(arc_path(Point::new(*cx, *cy), r.abs(), *start_angle, sweep))
            }
            Self::Text { .. } | Self::Image { .. } => None,
        }
    }

    /// Local-space bounding box of the geometry (stroke width excluded).
    pub fn bounding_rect(&self, style: &Style) -> Rect {
        match self {
            Self::Text { x, y, text } => estimate_text_box(*x, *y, text, style),
            Self::Image {
                x,
                y,
                width,
                height,
                ..
            } => Rect::new(*x, *y, x + width, y + height).abs(),
            Self::Polyline { points } | Self::Polygon { points } => {
                let Some(first) = points.first() else {
                    return Rect::ZERO;
                };
                points
                    .iter()
                    .fold(Rect::from_points(*first, *first), |acc, p| {
                        acc.union_pt(*p)
                    })
            }
            _ => self
                .to_path()
                .map(|p| p.bounding_box())
                .unwrap_or(Rect::ZERO),
        }
    }

    /// Point containment in local space.
    ///
    /// Malformed or non-finite geometry never contains anything.
    pub fn contains(&self, p: Point, style: &Style) -> bool {
        if !self.is_finite() || !p.x.is_finite() || !p.y.is_finite() {
            return false;
        }
        let half_width = (style.line_width / 2.0).max(0.0);
        let stroke_band = style.has_stroke();
        let line_tol = half_width.max(MIN_HIT_HALF_WIDTH);
        match self {
            Self::Circle { cx, cy, r } => {
                let d2 = (p - Point::new(*cx, *cy)).hypot2();
                if d2 <= r * r {
                    return true;
                }
                stroke_band && {
                    let d = d2.sqrt();
                    (d - r.abs()).abs() <= half_width
                }
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                ..
            } => {
                let rect = Rect::new(*x, *y, x + width, y + height).abs();
                let grow = if stroke_band { half_width } else { 0.0 };
                let hit = rect.inflate(grow, grow);
                p.x >= hit.x0 && p.x <= hit.x1 && p.y >= hit.y0 && p.y <= hit.y1
            }
            Self::Line { x1, y1, x2, y2 } => {
                segment_distance_sq(p, Point::new(*x1, *y1), Point::new(*x2, *y2))
                    <= line_tol * line_tol
            }
            Self::Polyline { points } => polyline_hit(points, false, p, line_tol),
            Self::Polygon { points } => {
                polygon_contains(points, p)
                    || (stroke_band && polyline_hit(points, true, p, half_width))
            }
            Self::Path { .. } => {
                let Some(path) = self.to_path() else {
                    return false;
                };
                let test_fill = style.fill.is_some() || !stroke_band;
                (test_fill && path.contains(p))
                    || (stroke_band && path_stroke_hit(&path, p, half_width))
            }
            Self::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                end_angle,
                clockwise,
            } => {
                let (inner, outer) = if r0 <= r { (*r0, *r) } else { (*r, *r0) };
                let d = (p - Point::new(*cx, *cy)).hypot();
                if d < inner || d > outer {
                    return false;
                }
                let angle = (p.y - cy).atan2(p.x - cx);
                angle_in_sweep(angle, *start_angle, arc_sweep(*start_angle, *end_angle, *clockwise))
            }
            Self::Arc {
                cx,
                cy,
                r,
                start_angle,
                end_angle,
                clockwise,
            } => {
                let d = (p - Point::new(*cx, *cy)).hypot();
                if (d - r.abs()).abs() > line_tol {
                    return false;
                }
                let angle = (p.y - cy).atan2(p.x - cx);
                angle_in_sweep(angle, *start_angle, arc_sweep(*start_angle, *end_angle, *clockwise))
            }
            Self::Text { .. } | Self::Image { .. } => {
                let b = self.bounding_rect(style);
                p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
            }
        }
    }
}

/// SVG arc flags `(large_arc, sweep)` for a signed sweep.
pub fn svg_arc_flags(sweep: f64) -> (u8, u8) {
    let large = u8::from(sweep.abs() > PI);
    let dir = u8::from(sweep > 0.0);
    (large, dir)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/shape.rs"]
mod tests;
