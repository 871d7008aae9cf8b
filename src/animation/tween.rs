use crate::animation::ease::Ease;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, TweenId};
use crate::scene::storage::Storage;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Anything a tween can read and write numeric properties on.
pub trait Animatable {
    /// Current value of a dotted numeric property.
    fn get_prop(&self, path: &str) -> Option<f64>;
    /// Write a dotted numeric property. Returns `false` for unknown paths.
    fn set_prop(&mut self, path: &str, value: f64) -> bool;
}

/// What a tween writes to.
#[derive(Clone)]
pub enum TweenTarget {
    /// An element of the storage passed to each step; writes mark it dirty.
    Element(NodeId),
    /// A caller-owned object.
    Object(Rc<RefCell<dyn Animatable>>),
}

impl TweenTarget {
    /// Element id for element targets.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Element(id) => Some(*id),
            Self::Object(_) => None,
        }
    }

    fn read(&self, storage: &Storage, path: &str) -> Option<f64> {
        match self {
            Self::Element(id) => storage.get_prop(*id, path),
            Self::Object(obj) => obj.try_borrow().ok()?.get_prop(path),
        }
    }

    fn write(&self, storage: &mut Storage, path: &str, value: f64) -> SceneResult<()> {
        let written = match self {
            Self::Element(id) => {
                if storage.node(*id).is_none() {
                    return Err(SceneError::animation(format!("tween target {id} no longer exists")));
                }
                storage.set_prop(*id, path, value)
            }
            Self::Object(obj) => obj
                .try_borrow_mut()
                .map_err(|_| SceneError::animation("tween target is already borrowed"))?
                .set_prop(path, value),
        };
        if written {
            Ok(())
        } else {
            Err(SceneError::animation(format!("unknown property '{path}'")))
        }
    }
}

impl fmt::Debug for TweenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(id) => f.debug_tuple("Element").field(id).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Timing of a tween.
#[derive(Clone, Copy, Debug)]
pub struct TweenOptions {
    pub duration: Duration,
    pub delay: Duration,
    pub ease: Ease,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(500),
            delay: Duration::ZERO,
            ease: Ease::OutCubic,
        }
    }
}

/// Lifecycle of a tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenState {
    /// Built but not handed to an animator yet.
    Created,
    /// Advancing on every step.
    Running,
    /// Frozen until resumed.
    Paused,
    /// Reached the end value.
    Done,
    /// Stopped before completion.
    Stopped,
}

/// Outcome of one [`Tween::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Not running, or still inside its delay.
    Idle,
    /// Wrote an intermediate value.
    Advanced(f64),
    /// Wrote the end value.
    Finished,
}

type UpdateFn = Box<dyn FnMut(f64, f64)>;
type DoneFn = Box<dyn FnOnce(&mut Storage)>;

/// Interpolation of one numeric property from its current value to `to`.
pub struct Tween {
    pub(crate) id: TweenId,
    target: TweenTarget,
    path: String,
    from: Option<f64>,
    to: f64,
    opts: TweenOptions,
    started_at: Duration,
    paused_at: Option<Duration>,
    state: TweenState,
    on_update: Option<UpdateFn>,
    on_done: Option<DoneFn>,
}

impl Tween {
    /// Tween `path` on `target` toward `to` with default options.
    pub fn new(target: TweenTarget, path: impl Into<String>, to: f64) -> Self {
        Self {
            id: TweenId(0),
            target,
            path: path.into(),
            from: None,
            to,
            opts: TweenOptions::default(),
            started_at: Duration::ZERO,
            paused_at: None,
            state: TweenState::Created,
            on_update: None,
            on_done: None,
        }
    }

    /// Tween an element property.
    pub fn element(id: NodeId, path: impl Into<String>, to: f64) -> Self {
        Self::new(TweenTarget::Element(id), path, to)
    }

    pub fn options(mut self, opts: TweenOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.opts.duration = duration;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.opts.delay = delay;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.opts.ease = ease;
        self
    }

    /// Start from `from` instead of the target's current value.
    pub fn start_from(mut self, from: f64) -> Self {
        self.from = Some(from);
        self
    }

    /// Called with `(progress, value)` after every write.
    pub fn on_update(mut self, f: impl FnMut(f64, f64) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called once after the end value is written.
    pub fn on_done(mut self, f: impl FnOnce(&mut Storage) + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn target(&self) -> &TweenTarget {
        &self.target
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    /// Start value, known once started.
    pub fn start_value(&self) -> Option<f64> {
        self.from
    }

    pub fn end_value(&self) -> f64 {
        self.to
    }

    /// Capture the start value (unless overridden) and begin timing at `now`.
    pub fn start(&mut self, storage: &Storage, now: Duration) -> SceneResult<()> {
        if self.from.is_none() {
            let current = self.target.read(storage, &self.path).ok_or_else(|| {
                SceneError::animation(format!(
                    "cannot read '{}' on {:?}",
                    self.path, self.target
                ))
            })?;
            self.from = Some(current);
        }
        self.started_at = now;
        self.paused_at = None;
        self.state = TweenState::Running;
        Ok(())
    }

    /// Linear progress in `[0, 1]` at `now`, ignoring pause state.
    pub fn progress_at(&self, now: Duration) -> f64 {
        let begin = self.started_at + self.opts.delay;
        if now < begin {
            return 0.0;
        }
        if self.opts.duration.is_zero() {
            return 1.0;
        }
        ((now - begin).as_secs_f64() / self.opts.duration.as_secs_f64()).min(1.0)
    }

    /// Advance to `now`, writing the interpolated value.
    pub fn step(&mut self, storage: &mut Storage, now: Duration) -> SceneResult<Step> {
        if self.state != TweenState::Running || now < self.started_at + self.opts.delay {
            return Ok(Step::Idle);
        }
        let from = self.from.unwrap_or(self.to);
        let progress = self.progress_at(now);
        let value = if progress >= 1.0 {
            self.to
        } else {
            from + (self.to - from) * self.opts.ease.apply(progress)
        };
        self.target.write(storage, &self.path, value)?;
        if let Some(cb) = self.on_update.as_mut() {
            cb(progress, value);
        }
        if progress < 1.0 {
            return Ok(Step::Advanced(value));
        }
        self.state = TweenState::Done;
        if let Some(done) = self.on_done.take() {
            done(storage);
        }
        Ok(Step::Finished)
    }

    /// Freeze at `now`.
    pub fn pause(&mut self, now: Duration) {
        if self.state == TweenState::Running {
            self.state = TweenState::Paused;
            self.paused_at = Some(now);
        }
    }

    /// Continue from where [`Tween::pause`] left off.
    pub fn resume(&mut self, now: Duration) {
        if self.state != TweenState::Paused {
            return;
        }
        if let Some(paused_at) = self.paused_at.take() {
            self.started_at += now.saturating_sub(paused_at);
        }
        self.state = TweenState::Running;
    }

    /// Drop all future steps without restoring the start value.
    pub fn stop(&mut self) {
        if matches!(self.state, TweenState::Running | TweenState::Paused | TweenState::Created) {
            self.state = TweenState::Stopped;
            self.on_done = None;
        }
    }

    /// Done or stopped.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, TweenState::Done | TweenState::Stopped)
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("path", &self.path)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
