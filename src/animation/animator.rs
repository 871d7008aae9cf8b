use crate::animation::tween::{Step, Tween, TweenOptions, TweenState};
use crate::foundation::error::SceneResult;
use crate::foundation::ids::{IdGen, NodeId, TweenId};
use crate::scene::storage::Storage;
use std::time::Duration;

/// Owner of running tweens.
///
/// Tweens step in insertion order, so when two tweens write the same property of the same
/// target the one started last wins for that frame.
#[derive(Debug, Default)]
pub struct Animator {
    tweens: Vec<Tween>,
    ids: IdGen,
    paused: bool,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `tween` at `now` and take ownership of it.
    ///
    /// If the animator is paused the tween is registered paused.
    pub fn start(&mut self, mut tween: Tween, storage: &Storage, now: Duration) -> SceneResult<TweenId> {
        tween.start(storage, now)?;
        if self.paused {
            tween.pause(now);
        }
        let id = TweenId(self.ids.next());
        tween.id = id;
        self.tweens.push(tween);
        Ok(id)
    }

    /// Tween property `path` of element `node` from its live value to `to`.
    pub fn animate(
        &mut self,
        storage: &Storage,
        node: NodeId,
        path: &str,
        to: f64,
        opts: TweenOptions,
        now: Duration,
    ) -> SceneResult<TweenId> {
        self.start(Tween::element(node, path, to).options(opts), storage, now)
    }

    /// Number of tweens not yet finished.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Return `true` when a step could change something.
    pub fn is_animating(&self) -> bool {
        self.tweens.iter().any(|t| t.state() == TweenState::Running)
    }

    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.iter().find(|t| t.id() == id)
    }

    /// Tweens writing to element `node`, optionally restricted to one property.
    pub fn tweens_on(&self, node: NodeId, path: Option<&str>) -> impl Iterator<Item = &Tween> + '_ {
        let path = path.map(str::to_owned);
        self.tweens.iter().filter(move |t| {
            t.target().node() == Some(node) && path.as_deref().is_none_or(|p| t.path() == p)
        })
    }

    /// Stop one tween. Returns `false` if it already finished.
    pub fn stop(&mut self, id: TweenId) -> bool {
        let Some(pos) = self.tweens.iter().position(|t| t.id() == id) else {
            return false;
        };
        let mut tween = self.tweens.remove(pos);
        tween.stop();
        true
    }

    /// Stop every tween writing to `node` (and `path`, when given).
    pub fn stop_target(&mut self, node: NodeId, path: Option<&str>) -> usize {
        let before = self.tweens.len();
        self.tweens.retain_mut(|t| {
            let hit = t.target().node() == Some(node) && path.is_none_or(|p| t.path() == p);
            if hit {
                t.stop();
            }
            !hit
        });
        before - self.tweens.len()
    }

    pub fn stop_all(&mut self) {
        for t in &mut self.tweens {
            t.stop();
        }
        self.tweens.clear();
    }

    pub fn pause_all(&mut self, now: Duration) {
        self.paused = true;
        for t in &mut self.tweens {
            t.pause(now);
        }
    }

    pub fn resume_all(&mut self, now: Duration) {
        self.paused = false;
        for t in &mut self.tweens {
            t.resume(now);
        }
    }

    /// Advance every tween to `now` and drop the finished ones.
    ///
    /// A tween whose write fails is dropped; the remaining tweens still step and the first
    /// error is returned.
    #[tracing::instrument(level = "trace", skip_all, fields(tweens = self.tweens.len()))]
    pub fn step_all(&mut self, storage: &mut Storage, now: Duration) -> SceneResult<usize> {
        let mut advanced = 0;
        let mut first_err = None;
        for t in &mut self.tweens {
            match t.step(storage, now) {
                Ok(Step::Idle) => {}
                Ok(_) => advanced += 1,
                Err(e) => {
                    tracing::debug!(tween = ?t.id(), error = %e, "tween step failed");
                    t.stop();
                    first_err.get_or_insert(e);
                }
            }
        }
        self.tweens.retain(|t| !t.is_finished());
        match first_err {
            Some(e) => Err(e),
            None => Ok(advanced),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
