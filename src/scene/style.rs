use crate::foundation::core::Color;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Horizontal text anchor relative to the text position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Text starts at `x`.
    #[default]
    Left,
    /// Text is centered on `x`.
    Center,
    /// Text ends at `x`.
    Right,
}

/// Vertical text anchor relative to the text position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    /// `y` is the top of the line box.
    Top,
    /// `y` is the vertical middle of the line box.
    Middle,
    /// `y` is the alphabetic baseline.
    #[default]
    Alphabetic,
    /// `y` is the bottom of the line box.
    Bottom,
}

/// Stroke end cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    /// Flat cap at the endpoint.
    #[default]
    Butt,
    /// Half-disc cap.
    Round,
    /// Half-square cap.
    Square,
}

/// Stroke corner join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

/// Drop shadow parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shadow {
    /// Blur radius in surface units.
    pub blur: f64,
    /// Shadow color.
    pub color: Color,
    /// Horizontal offset.
    pub offset_x: f64,
    /// Vertical offset.
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            blur: 0.0,
            color: Color::rgba(0, 0, 0, 128),
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Paint attributes of an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Fill color; `None` disables filling.
    pub fill: Option<Color>,
    /// Stroke color; `None` disables stroking.
    pub stroke: Option<Color>,
    /// Stroke width.
    pub line_width: f64,
    /// Dash pattern (alternating on/off lengths); empty means solid.
    pub line_dash: SmallVec<[f64; 4]>,
    /// Offset into the dash pattern.
    pub line_dash_offset: f64,
    /// Stroke end cap.
    pub line_cap: LineCap,
    /// Stroke corner join.
    pub line_join: LineJoin,
    /// Whole-element opacity in `[0, 1]`.
    pub opacity: f64,
    /// Optional drop shadow.
    pub shadow: Option<Shadow>,
    /// Font size for text shapes.
    pub font_size: f64,
    /// Font family for text shapes (vector output only; raster uses the configured font).
    pub font_family: Option<String>,
    /// Horizontal text anchor.
    pub text_align: TextAlign,
    /// Vertical text anchor.
    pub text_baseline: TextBaseline,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
            line_dash: SmallVec::new(),
            line_dash_offset: 0.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            opacity: 1.0,
            shadow: None,
            font_size: 12.0,
            font_family: None,
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
        }
    }
}

/// Numeric style fields reachable through `style.<field>` property paths.
pub const STYLE_FIELDS: [&str; 7] = [
    "opacity",
    "line_width",
    "line_dash_offset",
    "font_size",
    "shadow_blur",
    "shadow_offset_x",
    "shadow_offset_y",
];

impl Style {
    /// Style that only fills.
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    /// Style that only strokes.
    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(color),
            line_width: width,
            ..Self::default()
        }
    }

    /// Return `true` when a visible stroke would be drawn.
    pub fn has_stroke(&self) -> bool {
        self.stroke.is_some_and(|c| c.a > 0) && self.line_width > 0.0
    }

    /// Return `true` when a visible fill would be drawn.
    pub fn has_fill(&self) -> bool {
        self.fill.is_some_and(|c| c.a > 0)
    }

    /// Read a numeric field by name.
    pub fn get(&self, field: &str) -> Option<f64> {
        Some(match field {
            "opacity" => self.opacity,
            "line_width" => self.line_width,
            "line_dash_offset" => self.line_dash_offset,
            "font_size" => self.font_size,
            "shadow_blur" => self.shadow.map_or(0.0, |s| s.blur),
            "shadow_offset_x" => self.shadow.map_or(0.0, |s| s.offset_x),
            "shadow_offset_y" => self.shadow.map_or(0.0, |s| s.offset_y),
            _ => return None,
        })
    }

    /// Write a numeric field by name. Returns `false` for unknown fields.
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        match field {
            "opacity" => self.opacity = value,
            "line_width" => self.line_width = value,
            "line_dash_offset" => self.line_dash_offset = value,
            "font_size" => self.font_size = value,
            "shadow_blur" => self.shadow.get_or_insert_with(Shadow::default).blur = value,
            "shadow_offset_x" => {
                self.shadow.get_or_insert_with(Shadow::default).offset_x = value;
            }
            "shadow_offset_y" => {
                self.shadow.get_or_insert_with(Shadow::default).offset_y = value;
            }
            _ => return false,
        }
        true
    }

    /// Shallow-merge the fields present in `patch`.
    pub fn merge(&mut self, patch: &StylePatch) {
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(w) = patch.line_width {
            self.line_width = w;
        }
        if let Some(dash) = &patch.line_dash {
            self.line_dash = dash.clone();
        }
        if let Some(off) = patch.line_dash_offset {
            self.line_dash_offset = off;
        }
        if let Some(cap) = patch.line_cap {
            self.line_cap = cap;
        }
        if let Some(join) = patch.line_join {
            self.line_join = join;
        }
        if let Some(o) = patch.opacity {
            self.opacity = o;
        }
        if let Some(shadow) = patch.shadow {
            self.shadow = shadow;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(family) = &patch.font_family {
            self.font_family = family.clone();
        }
        if let Some(align) = patch.text_align {
            self.text_align = align;
        }
        if let Some(baseline) = patch.text_baseline {
            self.text_baseline = baseline;
        }
    }
}

/// Partial style update; `None` keeps the current value.
///
/// Nullable attributes use `Some(None)` to clear them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    /// Replace or clear the fill.
    pub fill: Option<Option<Color>>,
    /// Replace or clear the stroke.
    pub stroke: Option<Option<Color>>,
    /// New stroke width.
    pub line_width: Option<f64>,
    /// New dash pattern.
    pub line_dash: Option<SmallVec<[f64; 4]>>,
    /// New dash offset.
    pub line_dash_offset: Option<f64>,
    /// New line cap.
    pub line_cap: Option<LineCap>,
    /// New line join.
    pub line_join: Option<LineJoin>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// Replace or clear the shadow.
    pub shadow: Option<Option<Shadow>>,
    /// New font size.
    pub font_size: Option<f64>,
    /// Replace or clear the font family.
    pub font_family: Option<Option<String>>,
    /// New text anchor.
    pub text_align: Option<TextAlign>,
    /// New text baseline.
    pub text_baseline: Option<TextBaseline>,
}

impl StylePatch {
    /// Patch the fill color.
    pub fn fill(color: Color) -> Self {
        Self {
            fill: Some(Some(color)),
            ..Self::default()
        }
    }

    /// Patch the stroke color and width.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(Some(color)),
            line_width: Some(width),
            ..Self::default()
        }
    }

    /// Patch the opacity.
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/style.rs"]
mod tests;
