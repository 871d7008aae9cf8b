use crate::foundation::core::{Size, Vec2};

/// The host container a painter draws into.
pub trait SurfaceHost {
    /// Size of the host container in CSS pixels.
    fn measured_size(&self) -> Size;
    /// Device pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f64;
    /// Position of the surface's top-left corner in host (screen) coordinates.
    fn screen_offset(&self) -> Vec2;
}

/// A host with fixed geometry, settable by the embedder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedSurface {
    pub size: Size,
    pub dpr: f64,
    pub offset: Vec2,
}

impl FixedSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            dpr: 1.0,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.dpr = dpr;
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }
}

impl SurfaceHost for FixedSurface {
    fn measured_size(&self) -> Size {
        self.size
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    fn screen_offset(&self) -> Vec2 {
        self.offset
    }
}
