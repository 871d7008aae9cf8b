//! The facade wiring storage, painter, input handler, animator and frame queue together.

use crate::animation::animator::Animator;
use crate::animation::tween::{Tween, TweenOptions};
use crate::config::EngineConfig;
use crate::foundation::core::{Color, Point, Size};
use crate::foundation::error::SceneResult;
use crate::foundation::ids::{FrameHandle, NodeId, TweenId};
use crate::input::event::{PointerInput, SceneEvent};
use crate::input::handler::{Handler, hit_test};
use crate::reconcile::layer::{KeyedLayer, MarkTarget, MarkTransition, SyncReport};
use crate::render::backend::ExportOptions;
use crate::render::painter::Painter;
use crate::render::scheduler::{FrameQueue, FrameTask};
use crate::render::surface::{FixedSurface, SurfaceHost};
use crate::render::text::TextEngine;
use crate::scene::doc::SceneDoc;
use crate::scene::storage::Storage;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use std::time::Duration;

/// One chart surface: a scene, the painter drawing it, and the machinery that changes it.
///
/// The host calls [`Engine::run_frame`] whenever [`Engine::has_pending_frame`] is true,
/// passing a monotonic timestamp.
pub struct Engine {
    storage: Storage,
    painter: Painter,
    handler: Handler,
    animator: Animator,
    frames: FrameQueue,
    host: Box<dyn SurfaceHost>,
    animate_pending: Option<FrameHandle>,
    applied: (Size, f64),
    background: Option<Color>,
}

impl Engine {
    /// Engine drawing onto a fixed surface of the configured size.
    pub fn new(config: &EngineConfig) -> SceneResult<Self> {
        let host = FixedSurface::new(f64::from(config.width), f64::from(config.height))
            .with_dpr(config.dpr);
        Self::with_host(config, Box::new(host))
    }

    /// Engine sized by `host`; the config's width, height and dpr are ignored.
    pub fn with_host(config: &EngineConfig, host: Box<dyn SurfaceHost>) -> SceneResult<Self> {
        config.validate()?;
        let text = config
            .font
            .as_deref()
            .map(TextEngine::from_path)
            .transpose()?;
        let painter = Painter::new(config.renderer, host.as_ref(), text)?;
        let mut handler = Handler::new();
        handler.set_hover_enabled(config.hover);
        handler.set_drag_enabled(config.drag);
        let applied = (host.measured_size(), host.device_pixel_ratio());
        tracing::debug!(
            renderer = ?config.renderer,
            width = painter.width(),
            height = painter.height(),
            "engine created"
        );
        Ok(Self {
            storage: Storage::new(),
            painter,
            handler,
            animator: Animator::new(),
            frames: FrameQueue::new(),
            host,
            animate_pending: None,
            applied,
            background: config.background,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutate the scene; a repaint is scheduled if anything became dirty.
    pub fn with_storage<R>(&mut self, f: impl FnOnce(&mut Storage) -> R) -> R {
        let out = f(&mut self.storage);
        self.schedule_repaint();
        out
    }

    /// Build `doc` into the scene as new roots. A document background replaces the
    /// configured one.
    pub fn load_doc(&mut self, doc: &SceneDoc, base_dir: Option<&Path>) -> SceneResult<Vec<NodeId>> {
        let roots = self.with_storage(|s| doc.build_into(s, base_dir))?;
        if doc.background.is_some() {
            self.background = doc.background;
        }
        Ok(roots)
    }

    /// Topmost hittable element under surface-local `p`.
    pub fn hit(&self, p: Point) -> Option<NodeId> {
        hit_test(&self.storage, p, None)
    }

    pub fn handler_mut(&mut self) -> &mut Handler {
        &mut self.handler
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn painter(&self) -> &Painter {
        &self.painter
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.frames
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frames.has_pending()
    }

    /// Tween `path` of `node` from its live value to `to`.
    pub fn animate(
        &mut self,
        node: NodeId,
        path: &str,
        to: f64,
        opts: TweenOptions,
        now: Duration,
    ) -> SceneResult<TweenId> {
        let id = self
            .animator
            .animate(&self.storage, node, path, to, opts, now)?;
        self.schedule_animation();
        Ok(id)
    }

    /// Hand a prepared tween to the animator.
    pub fn start_tween(&mut self, tween: Tween, now: Duration) -> SceneResult<TweenId> {
        let id = self.animator.start(tween, &self.storage, now)?;
        self.schedule_animation();
        Ok(id)
    }

    pub fn pause_animations(&mut self, now: Duration) {
        self.animator.pause_all(now);
    }

    pub fn resume_animations(&mut self, now: Duration) {
        self.animator.resume_all(now);
        self.schedule_animation();
    }

    pub fn stop_animations(&mut self) {
        self.animator.stop_all();
    }

    /// Reconcile a keyed layer of this engine's scene and schedule the resulting tweens.
    pub fn sync_layer<K, T>(
        &mut self,
        layer: &mut KeyedLayer<K>,
        targets: impl IntoIterator<Item = (K, MarkTarget)>,
        transition: &T,
        now: Duration,
    ) -> SceneResult<SyncReport<K>>
    where
        K: Eq + Hash + Clone + Debug,
        T: MarkTransition<K> + ?Sized,
    {
        let report = layer.sync(
            &mut self.storage,
            &mut self.animator,
            targets,
            transition,
            now,
        )?;
        self.schedule_animation();
        self.schedule_repaint();
        Ok(report)
    }

    /// Route one host input through the handler.
    pub fn dispatch(&mut self, input: &PointerInput) -> (Option<NodeId>, Vec<SceneEvent>) {
        let out = self
            .handler
            .dispatch(&mut self.storage, self.host.as_ref(), input);
        self.schedule_repaint();
        out
    }

    /// Re-measure the host and resize when its size or pixel ratio changed.
    ///
    /// Returns `false` when nothing changed since the last applied size.
    pub fn on_host_resize(&mut self) -> SceneResult<bool> {
        let current = (self.host.measured_size(), self.host.device_pixel_ratio());
        if current == self.applied {
            return Ok(false);
        }
        self.painter.resize(
            None,
            None,
            self.host.as_ref(),
            &mut self.storage,
            &mut self.frames,
        )?;
        self.applied = current;
        Ok(true)
    }

    /// Swap the host surface and apply its size.
    pub fn replace_host(&mut self, host: Box<dyn SurfaceHost>) -> SceneResult<bool> {
        self.host = host;
        self.on_host_resize()
    }

    /// Run the tasks due at `now`: step tweens, then repaint if anything is dirty.
    ///
    /// Errors are logged, never returned, so a failing frame does not stop the next one.
    #[tracing::instrument(level = "debug", skip(self), fields(queued = self.frames.len()))]
    pub fn run_frame(&mut self, now: Duration) -> bool {
        let due = self.frames.take_due();
        let animate = due.iter().any(|(_, t)| *t == FrameTask::Animate);
        let repaint = due.iter().any(|(_, t)| *t == FrameTask::Repaint);

        if animate {
            self.animate_pending = None;
            if let Err(e) = self.animator.step_all(&mut self.storage, now) {
                tracing::error!(error = %e, "animation step failed");
            }
            self.schedule_animation();
        }

        if !(repaint || self.storage.is_dirty()) {
            return false;
        }
        match self.painter.on_frame(&mut self.storage, &mut self.frames) {
            Ok(painted) => painted,
            Err(e) => {
                tracing::error!(error = %e, "paint failed");
                false
            }
        }
    }

    /// Render the current scene to PNG, using the configured background when none is given.
    pub fn export_image(&mut self, opts: &ExportOptions) -> SceneResult<Vec<u8>> {
        let opts = ExportOptions {
            background: opts.background.or(self.background),
            ..*opts
        };
        self.painter.export_image(&self.storage, &opts)
    }

    /// Release the surface and drop pending work. The scene stays readable.
    pub fn dispose(&mut self) {
        self.animator.stop_all();
        if let Some(h) = self.animate_pending.take() {
            self.frames.cancel(h);
        }
        self.painter.dispose(&mut self.frames);
    }

    fn schedule_repaint(&mut self) {
        if self.storage.is_dirty() {
            self.painter.mark_dirty(&mut self.frames);
        }
    }

    fn schedule_animation(&mut self) {
        if self.painter.is_disposed() || !self.animator.is_animating() {
            return;
        }
        if self.animate_pending.is_some_and(|h| self.frames.is_pending(h)) {
            return;
        }
        self.animate_pending = Some(self.frames.request(FrameTask::Animate));
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("elements", &self.storage.len())
            .field("painter", &self.painter)
            .field("tweens", &self.animator.len())
            .field("queued_frames", &self.frames.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
