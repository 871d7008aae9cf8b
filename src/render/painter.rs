use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::FrameHandle;
use crate::render::backend::{BackendKind, DrawCount, ExportOptions, PaintBackend};
use crate::render::raster::RasterBackend;
use crate::render::scheduler::{FrameQueue, FrameTask};
use crate::render::surface::SurfaceHost;
use crate::render::text::TextEngine;
use crate::render::vector::VectorBackend;
use crate::scene::storage::Storage;

/// Counters of completed paints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Paints that reached the backend.
    pub paints: u64,
    /// Result of the most recent paint.
    pub last: DrawCount,
}

/// Dirty-driven repaint scheduler in front of one backend.
///
/// [`Painter::mark_dirty`] keeps at most one repaint request outstanding on the frame
/// queue; the frame callback [`Painter::on_frame`] clears it and paints.
pub struct Painter {
    backend: Box<dyn PaintBackend>,
    width: u32,
    height: u32,
    dpr: f64,
    pending: Option<FrameHandle>,
    disposed: bool,
    stats: PaintStats,
}

impl Painter {
    /// Build a painter sized to the host's measured size.
    pub fn new(kind: BackendKind, host: &dyn SurfaceHost, text: Option<TextEngine>) -> SceneResult<Self> {
        let (width, height) = measured(host);
        let dpr = host.device_pixel_ratio();
        let backend: Box<dyn PaintBackend> = match kind {
            BackendKind::Raster => Box::new(RasterBackend::new(width, height, dpr, text)?),
            BackendKind::Vector => {
                let mut vector = VectorBackend::new(width, height, dpr)?;
                if let Some(text) = &text {
                    vector = vector.with_font(std::sync::Arc::clone(text.font_bytes()));
                }
                Box::new(vector)
            }
        };
        Ok(Self::with_backend(backend, width, height, dpr))
    }

    /// Wrap an already-sized backend.
    pub fn with_backend(backend: Box<dyn PaintBackend>, width: u32, height: u32, dpr: f64) -> Self {
        Self {
            backend,
            width,
            height,
            dpr,
            pending: None,
            disposed: false,
            stats: PaintStats::default(),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Handle of the outstanding repaint request, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn backend(&self) -> &dyn PaintBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn PaintBackend {
        self.backend.as_mut()
    }

    /// Resize the surface. Unspecified dimensions use the host's measured size.
    ///
    /// The whole scene is repainted afterwards.
    pub fn resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        host: &dyn SurfaceHost,
        storage: &mut Storage,
        frames: &mut FrameQueue,
    ) -> SceneResult<()> {
        if self.disposed {
            return Err(SceneError::surface("painter is disposed"));
        }
        let (mw, mh) = measured(host);
        let width = width.unwrap_or(mw);
        let height = height.unwrap_or(mh);
        let dpr = host.device_pixel_ratio();
        self.backend.resize(width, height, dpr)?;
        tracing::debug!(width, height, dpr, "painter resized");
        self.width = width;
        self.height = height;
        self.dpr = dpr;
        storage.mark_structure_dirty();
        self.mark_dirty(frames);
        Ok(())
    }

    /// Request a repaint on the next frame unless one is already pending.
    pub fn mark_dirty(&mut self, frames: &mut FrameQueue) -> Option<FrameHandle> {
        if self.disposed {
            return None;
        }
        if let Some(handle) = self.pending.filter(|h| frames.is_pending(*h)) {
            return Some(handle);
        }
        let handle = frames.request(FrameTask::Repaint);
        self.pending = Some(handle);
        Some(handle)
    }

    /// Frame callback: clear the pending request and paint.
    pub fn on_frame(&mut self, storage: &mut Storage, frames: &mut FrameQueue) -> SceneResult<bool> {
        if let Some(handle) = self.pending.take() {
            frames.cancel(handle);
        }
        if self.disposed {
            return Ok(false);
        }
        self.paint(storage)
    }

    /// Redraw the scene if anything is dirty. Returns whether the backend painted.
    #[tracing::instrument(level = "debug", skip_all, fields(kind = ?self.backend.kind()))]
    pub fn paint(&mut self, storage: &mut Storage) -> SceneResult<bool> {
        if self.disposed {
            return Err(SceneError::surface("painter is disposed"));
        }
        if !storage.is_dirty() {
            return Ok(false);
        }
        let count = self.backend.paint(storage)?;
        storage.clear_dirty();
        self.stats.paints += 1;
        self.stats.last = count;
        tracing::debug!(drawn = count.drawn, skipped = count.skipped, "painted");
        Ok(true)
    }

    /// Render the current scene to PNG bytes without touching the live surface.
    pub fn export_image(&mut self, storage: &Storage, opts: &ExportOptions) -> SceneResult<Vec<u8>> {
        if self.disposed {
            return Err(SceneError::surface("painter is disposed"));
        }
        self.backend.export_png(storage, opts)
    }

    /// Cancel the pending frame and release the surface. The scene is left untouched.
    pub fn dispose(&mut self, frames: &mut FrameQueue) {
        if let Some(handle) = self.pending.take() {
            frames.cancel(handle);
        }
        self.backend.dispose();
        self.disposed = true;
    }
}

impl std::fmt::Debug for Painter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Painter")
            .field("kind", &self.backend.kind())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dpr", &self.dpr)
            .field("pending", &self.pending)
            .field("disposed", &self.disposed)
            .field("stats", &self.stats)
            .finish()
    }
}

fn measured(host: &dyn SurfaceHost) -> (u32, u32) {
    let size = host.measured_size();
    let px = |v: f64| if v.is_finite() && v > 0.0 { v.round() as u32 } else { 0 };
    (px(size.width), px(size.height))
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
