use crate::foundation::core::{Affine, Color, Point};
use crate::scene::shape::svg_arc_flags;
use crate::scene::style::{LineCap, LineJoin, TextAlign, TextBaseline};
use smallvec::SmallVec;
use std::f64::consts::TAU;
use std::fmt::{self, Write};

/// Paint attributes shared by every drawable SVG node.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgPaint {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width: f64,
    pub line_dash: SmallVec<[f64; 4]>,
    pub line_dash_offset: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub opacity: f64,
    /// Id of a `<filter>` in the document defs.
    pub filter: Option<String>,
}

impl Default for SvgPaint {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
            line_dash: SmallVec::new(),
            line_dash_offset: 0.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            opacity: 1.0,
            filter: None,
        }
    }
}

/// Drop shadow filter placed in `<defs>`.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgShadow {
    pub id: String,
    pub dx: f64,
    pub dy: f64,
    pub blur: f64,
    pub color: Color,
}

/// Geometry of one SVG node.
#[derive(Clone, Debug, PartialEq)]
pub enum SvgKind {
    Group(Vec<SvgNode>),
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Polyline(Vec<Point>),
    Polygon(Vec<Point>),
    Path(String),
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        font_family: Option<String>,
        align: TextAlign,
        baseline: TextBaseline,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        href: String,
    },
}

/// One node of the retained SVG tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgNode {
    pub transform: Affine,
    pub paint: SvgPaint,
    pub kind: SvgKind,
}

impl SvgNode {
    pub fn new(kind: SvgKind) -> Self {
        Self {
            transform: Affine::IDENTITY,
            paint: SvgPaint::default(),
            kind,
        }
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_paint(mut self, paint: SvgPaint) -> Self {
        self.paint = paint;
        self
    }

    /// Number of drawable (non-group) nodes in this subtree.
    pub fn drawable_count(&self) -> usize {
        match &self.kind {
            SvgKind::Group(children) => children.iter().map(Self::drawable_count).sum(),
            _ => 1,
        }
    }

    fn write_to(&self, out: &mut String, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match &self.kind {
            SvgKind::Group(children) => {
                write!(out, "{indent}<g")?;
                self.write_common(out, false)?;
                if children.is_empty() {
                    return writeln!(out, "/>");
                }
                writeln!(out, ">")?;
                for child in children {
                    child.write_to(out, depth + 1)?;
                }
                writeln!(out, "{indent}</g>")
            }
            SvgKind::Circle { cx, cy, r } => {
                write!(
                    out,
                    r#"{indent}<circle cx="{}" cy="{}" r="{}""#,
                    Num(*cx),
                    Num(*cy),
                    Num(r.abs())
                )?;
                self.write_common(out, true)?;
                writeln!(out, "/>")
            }
            SvgKind::Rect {
                x,
                y,
                width,
                height,
                radius,
            } => {
                let (x0, w) = if *width < 0.0 { (x + width, -width) } else { (*x, *width) };
                let (y0, h) = if *height < 0.0 { (y + height, -height) } else { (*y, *height) };
                write!(
                    out,
                    r#"{indent}<rect x="{}" y="{}" width="{}" height="{}""#,
                    Num(x0),
                    Num(y0),
                    Num(w),
                    Num(h)
                )?;
                if *radius > 0.0 {
                    write!(out, r#" rx="{0}" ry="{0}""#, Num(*radius))?;
                }
                self.write_common(out, true)?;
                writeln!(out, "/>")
            }
            SvgKind::Line { x1, y1, x2, y2 } => {
                write!(
                    out,
                    r#"{indent}<line x1="{}" y1="{}" x2="{}" y2="{}""#,
                    Num(*x1),
                    Num(*y1),
                    Num(*x2),
                    Num(*y2)
                )?;
                self.write_common(out, true)?;
                writeln!(out, "/>")
            }
            SvgKind::Polyline(points) | SvgKind::Polygon(points) => {
                let tag = if matches!(self.kind, SvgKind::Polygon(_)) {
                    "polygon"
                } else {
                    "polyline"
                };
                write!(out, r#"{indent}<{tag} points=""#)?;
                for (i, p) in points.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    write!(out, "{},{}", Num(p.x), Num(p.y))?;
                }
                out.push('"');
                self.write_common(out, true)?;
                writeln!(out, "/>")
            }
            SvgKind::Path(d) => {
                write!(out, r#"{indent}<path d="{}""#, escape(d))?;
                self.write_common(out, true)?;
                writeln!(out, "/>")
            }
            SvgKind::Text {
                x,
                y,
                text,
                font_size,
                font_family,
                align,
                baseline,
            } => {
                write!(
                    out,
                    r#"{indent}<text x="{}" y="{}" font-size="{}""#,
                    Num(*x),
                    Num(*y),
                    Num(*font_size)
                )?;
                if let Some(family) = font_family {
                    write!(out, r#" font-family="{}""#, escape(family))?;
                }
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let baseline = match baseline {
                    TextBaseline::Top => "text-before-edge",
                    TextBaseline::Middle => "central",
                    TextBaseline::Alphabetic => "alphabetic",
                    TextBaseline::Bottom => "text-after-edge",
                };
                write!(
                    out,
                    r#" text-anchor="{anchor}" dominant-baseline="{baseline}""#
                )?;
                self.write_common(out, true)?;
                writeln!(out, ">{}</text>", escape(text))
            }
            SvgKind::Image {
                x,
                y,
                width,
                height,
                href,
            } => {
                write!(
                    out,
                    r#"{indent}<image x="{}" y="{}" width="{}" height="{}" href="{}" preserveAspectRatio="none""#,
                    Num(*x),
                    Num(*y),
                    Num(*width),
                    Num(*height),
                    escape(href)
                )?;
                self.write_common(out, false)?;
                writeln!(out, "/>")
            }
        }
    }

    fn write_common(&self, out: &mut String, with_paint: bool) -> fmt::Result {
        if self.transform != Affine::IDENTITY {
            write!(out, r#" transform="{}""#, AffineAttr(self.transform))?;
        }
        let p = &self.paint;
        if with_paint {
            write_color(out, "fill", p.fill)?;
            if let Some(stroke) = p.stroke.filter(|c| c.a > 0 && p.line_width > 0.0) {
                write_color(out, "stroke", Some(stroke))?;
                write!(out, r#" stroke-width="{}""#, Num(p.line_width))?;
                if !p.line_dash.is_empty() {
                    out.push_str(r#" stroke-dasharray=""#);
                    for (i, d) in p.line_dash.iter().enumerate() {
                        if i > 0 {
                            out.push(' ');
                        }
                        write!(out, "{}", Num(*d))?;
                    }
                    out.push('"');
                    if p.line_dash_offset != 0.0 {
                        write!(out, r#" stroke-dashoffset="{}""#, Num(p.line_dash_offset))?;
                    }
                }
                match p.line_cap {
                    LineCap::Butt => {}
                    LineCap::Round => out.push_str(r#" stroke-linecap="round""#),
                    LineCap::Square => out.push_str(r#" stroke-linecap="square""#),
                }
                match p.line_join {
                    LineJoin::Miter => {}
                    LineJoin::Round => out.push_str(r#" stroke-linejoin="round""#),
                    LineJoin::Bevel => out.push_str(r#" stroke-linejoin="bevel""#),
                }
            }
        }
        if p.opacity < 1.0 {
            write!(out, r#" opacity="{}""#, Num(p.opacity.max(0.0)))?;
        }
        if let Some(id) = &p.filter {
            write!(out, r#" filter="url(#{})""#, escape(id))?;
        }
        Ok(())
    }
}

/// Retained SVG document rebuilt by the vector backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgDocument {
    pub width: f64,
    pub height: f64,
    pub background: Option<Color>,
    pub shadows: Vec<SvgShadow>,
    pub children: Vec<SvgNode>,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Register a shadow filter and return its id; identical shadows share one filter.
    pub fn add_shadow(&mut self, dx: f64, dy: f64, blur: f64, color: Color) -> String {
        if let Some(existing) = self
            .shadows
            .iter()
            .find(|s| s.dx == dx && s.dy == dy && s.blur == blur && s.color == color)
        {
            return existing.id.clone();
        }
        let id = format!("shadow-{}", self.shadows.len());
        self.shadows.push(SvgShadow {
            id: id.clone(),
            dx,
            dy,
            blur,
            color,
        });
        id
    }

    /// Serialize to an SVG string.
    pub fn to_svg_string(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}">"#,
            Num(self.width),
            Num(self.height)
        )?;
        if !self.shadows.is_empty() {
            writeln!(out, "  <defs>")?;
            for s in &self.shadows {
                writeln!(
                    out,
                    r#"    <filter id="{}" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="{}" dy="{}" stdDeviation="{}" flood-color="{}" flood-opacity="{}"/></filter>"#,
                    escape(&s.id),
                    Num(s.dx),
                    Num(s.dy),
                    Num(s.blur / 2.0),
                    s.color.to_hex_rgb(),
                    Num(s.color.alpha_f64())
                )?;
            }
            writeln!(out, "  </defs>")?;
        }
        if let Some(bg) = self.background {
            write!(out, r#"  <rect width="100%" height="100%""#)?;
            write_color(&mut out, "fill", Some(bg))?;
            writeln!(out, "/>")?;
        }
        for child in &self.children {
            child.write_to(&mut out, 1)?;
        }
        writeln!(out, "</svg>")?;
        Ok(out)
    }
}

/// SVG path data for a ring sector, using elliptical arc commands.
pub fn sector_path_data(cx: f64, cy: f64, r0: f64, r: f64, start: f64, sweep: f64) -> String {
    let mut d = String::new();
    let at = |radius: f64, angle: f64| Point::new(cx + radius * angle.cos(), cy + radius * angle.sin());
    if sweep.abs() >= TAU {
        push_circle(&mut d, cx, cy, r, 1);
        if r0 > 0.0 {
            push_circle(&mut d, cx, cy, r0, 0);
        }
        return d;
    }
    let (large, dir) = svg_arc_flags(sweep);
    let end = start + sweep;
    let p0 = at(r, start);
    let p1 = at(r, end);
    let _ = write!(
        d,
        "M{} {}A{} {} 0 {large} {dir} {} {}",
        Num(p0.x),
        Num(p0.y),
        Num(r),
        Num(r),
        Num(p1.x),
        Num(p1.y)
    );
    if r0 > 0.0 {
        let q0 = at(r0, end);
        let q1 = at(r0, start);
        let _ = write!(
            d,
            "L{} {}A{} {} 0 {large} {} {} {}Z",
            Num(q0.x),
            Num(q0.y),
            Num(r0),
            Num(r0),
            1 - dir,
            Num(q1.x),
            Num(q1.y)
        );
    } else {
        let _ = write!(d, "L{} {}Z", Num(cx), Num(cy));
    }
    d
}

/// SVG path data for an open circular arc.
pub fn arc_path_data(cx: f64, cy: f64, r: f64, start: f64, sweep: f64) -> String {
    let mut d = String::new();
    if sweep.abs() >= TAU {
        push_circle(&mut d, cx, cy, r, 1);
        return d;
    }
    let (large, dir) = svg_arc_flags(sweep);
    let end = start + sweep;
    let _ = write!(
        d,
        "M{} {}A{} {} 0 {large} {dir} {} {}",
        Num(cx + r * start.cos()),
        Num(cy + r * start.sin()),
        Num(r),
        Num(r),
        Num(cx + r * end.cos()),
        Num(cy + r * end.sin())
    );
    d
}

// Two half arcs; a single arc with equal endpoints draws nothing.
fn push_circle(d: &mut String, cx: f64, cy: f64, r: f64, dir: u8) {
    let _ = write!(
        d,
        "M{} {}A{r} {r} 0 1 {dir} {} {}A{r} {r} 0 1 {dir} {} {}Z",
        Num(cx + r),
        Num(cy),
        Num(cx - r),
        Num(cy),
        Num(cx + r),
        Num(cy),
        r = Num(r),
    );
}

fn write_color(out: &mut String, attr: &str, color: Option<Color>) -> fmt::Result {
    match color {
        Some(c) if c.a > 0 => {
            write!(out, r#" {attr}="{}""#, c.to_hex_rgb())?;
            if c.a < 255 {
                write!(out, r#" {attr}-opacity="{}""#, Num(c.alpha_f64()))?;
            }
            Ok(())
        }
        _ => write!(out, r#" {attr}="none""#),
    }
}

/// Escape text for use in attribute values and character data.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Compact number: integers without a fraction, others rounded to 4 decimals.
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = if self.0 == 0.0 { 0.0 } else { self.0 };
        if v.fract() == 0.0 && v.abs() < 1e15 {
            return write!(f, "{}", v as i64);
        }
        let s = format!("{v:.4}");
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            return f.write_str("0");
        }
        f.write_str(s)
    }
}

struct AffineAttr(Affine);

impl fmt::Display for AffineAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0.as_coeffs();
        if a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0 {
            write!(f, "translate({} {})", Num(e), Num(g))
        } else {
            write!(
                f,
                "matrix({} {} {} {} {} {})",
                Num(a),
                Num(b),
                Num(c),
                Num(d),
                Num(e),
                Num(g)
            )
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg_doc.rs"]
mod tests;
