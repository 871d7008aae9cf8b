use crate::foundation::core::Affine;
use serde::{Deserialize, Serialize};

/// Decomposed local transform of an element.
///
/// Rotation is in radians; positive values turn clockwise in the y-down surface space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation in radians around the origin.
    pub rotation: f64,
    /// Rotation/scale pivot, x.
    pub origin_x: f64,
    /// Rotation/scale pivot, y.
    pub origin_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

/// Field names accepted by [`Transform::get`] and [`Transform::set`].
pub const TRANSFORM_FIELDS: [&str; 7] = [
    "x", "y", "scale_x", "scale_y", "rotation", "origin_x", "origin_y",
];

impl Transform {
    /// A pure offset.
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Return `true` when this transform maps every point onto itself.
    pub fn is_identity(&self) -> bool {
        self.x == 0.0
            && self.y == 0.0
            && self.scale_x == 1.0
            && self.scale_y == 1.0
            && self.rotation == 0.0
    }

    /// Local matrix: translate(x, y), translate(origin), rotate, scale, translate(-origin).
    ///
    /// The order is observable: swapping rotate and scale changes the result for any
    /// element with a non-uniform scale, a rotation and a non-zero origin.
    pub fn local_affine(&self) -> Affine {
        if self.is_identity() {
            return Affine::IDENTITY;
        }
        let origin = (self.origin_x, self.origin_y);
        Affine::translate((self.x, self.y))
            * Affine::translate(origin)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((-self.origin_x, -self.origin_y))
    }

    /// Read one field by name.
    pub fn get(&self, field: &str) -> Option<f64> {
        Some(match field {
            "x" => self.x,
            "y" => self.y,
            "scale_x" => self.scale_x,
            "scale_y" => self.scale_y,
            "rotation" => self.rotation,
            "origin_x" => self.origin_x,
            "origin_y" => self.origin_y,
            _ => return None,
        })
    }

    /// Write one field by name. Returns `false` for unknown fields.
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        let slot = match field {
            "x" => &mut self.x,
            "y" => &mut self.y,
            "scale_x" => &mut self.scale_x,
            "scale_y" => &mut self.scale_y,
            "rotation" => &mut self.rotation,
            "origin_x" => &mut self.origin_x,
            "origin_y" => &mut self.origin_y,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Shallow-merge the fields present in `patch`.
    pub fn merge(&mut self, patch: &TransformPatch) {
        let fields = [
            (&mut self.x, patch.x),
            (&mut self.y, patch.y),
            (&mut self.scale_x, patch.scale_x),
            (&mut self.scale_y, patch.scale_y),
            (&mut self.rotation, patch.rotation),
            (&mut self.origin_x, patch.origin_x),
            (&mut self.origin_y, patch.origin_y),
        ];
        for (slot, value) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Partial transform update; `None` fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformPatch {
    /// New horizontal offset.
    pub x: Option<f64>,
    /// New vertical offset.
    pub y: Option<f64>,
    /// New horizontal scale.
    pub scale_x: Option<f64>,
    /// New vertical scale.
    pub scale_y: Option<f64>,
    /// New rotation (radians).
    pub rotation: Option<f64>,
    /// New pivot x.
    pub origin_x: Option<f64>,
    /// New pivot y.
    pub origin_y: Option<f64>,
}

impl TransformPatch {
    /// Patch that only moves the element.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets both scale factors.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            scale_x: Some(sx),
            scale_y: Some(sy),
            ..Self::default()
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = Some(radians);
        self
    }

    /// Set the pivot.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = Some(x);
        self.origin_y = Some(y);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/transform.rs"]
mod tests;
