use crate::animation::animator::Animator;
use crate::animation::tween::{Tween, TweenOptions};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::NodeId;
use crate::reconcile::diff::diff_keys;
use crate::scene::element::Element;
use crate::scene::shape::Shape;
use crate::scene::storage::Storage;
use crate::scene::style::Style;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

/// Geometry and paint a keyed mark should end up with.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkTarget {
    pub shape: Shape,
    pub style: Style,
}

impl MarkTarget {
    pub fn new(shape: Shape, style: Style) -> Self {
        Self { shape, style }
    }
}

/// Synthetic states a mark enters from and exits to.
pub trait MarkTransition<K> {
    /// State a new mark is created in before tweening to `target`.
    fn enter_state(&self, key: &K, target: &MarkTarget) -> MarkTarget;

    /// State an exiting mark tweens to before it is removed.
    fn exit_state(&self, key: &K, current: &MarkTarget) -> MarkTarget;
}

/// Marks fade in from and out to zero opacity in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct FadeTransition;

impl<K> MarkTransition<K> for FadeTransition {
    fn enter_state(&self, _key: &K, target: &MarkTarget) -> MarkTarget {
        let mut state = target.clone();
        state.style.opacity = 0.0;
        state
    }

    fn exit_state(&self, _key: &K, current: &MarkTarget) -> MarkTarget {
        let mut state = current.clone();
        state.style.opacity = 0.0;
        state
    }
}

/// Keys touched by one [`KeyedLayer::sync`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport<K> {
    pub entered: Vec<K>,
    /// Reused marks, including exiting marks revived by a returning key.
    pub updated: Vec<K>,
    pub exited: Vec<K>,
}

impl<K> Default for SyncReport<K> {
    fn default() -> Self {
        Self {
            entered: Vec::new(),
            updated: Vec::new(),
            exited: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    node: NodeId,
    seq: u64,
    exiting: bool,
}

type Plan = SmallVec<[(String, f64); 8]>;

/// Keyed marks under one container, reconciled against successive data snapshots.
///
/// Updated keys keep their element and tween from its live values; new keys are created
/// in the transition's enter state; missing keys tween to the exit state, move behind
/// the others, and leave the tree and the index once that tween completes.
#[derive(Debug)]
pub struct KeyedLayer<K> {
    parent: NodeId,
    entries: HashMap<K, Entry>,
    seq: u64,
    opts: TweenOptions,
}

impl<K> KeyedLayer<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// A layer adding its marks to the container `parent`.
    pub fn new(parent: NodeId) -> Self {
        Self {
            parent,
            entries: HashMap::new(),
            seq: 0,
            opts: TweenOptions::default(),
        }
    }

    /// Timing used for every enter, update and exit tween.
    pub fn with_options(mut self, opts: TweenOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Element currently bound to `key`, exiting or not.
    pub fn node(&self, key: &K) -> Option<NodeId> {
        self.entries.get(key).map(|e| e.node)
    }

    pub fn is_exiting(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|e| e.exiting)
    }

    /// Keys that are not exiting, in the order they were first bound.
    pub fn live_keys(&self) -> Vec<K> {
        let mut live: Vec<(&K, &Entry)> = self.entries.iter().filter(|(_, e)| !e.exiting).collect();
        live.sort_by_key(|(_, e)| e.seq);
        live.into_iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of bound keys, exiting ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reconcile the layer against `targets`.
    ///
    /// Duplicate keys keep their first target.
    pub fn sync<T>(
        &mut self,
        storage: &mut Storage,
        animator: &mut Animator,
        targets: impl IntoIterator<Item = (K, MarkTarget)>,
        transition: &T,
        now: Duration,
    ) -> SceneResult<SyncReport<K>>
    where
        T: MarkTransition<K> + ?Sized,
    {
        self.prune(storage);
        self.finish_stalled_exits(storage, animator);

        let mut order = Vec::new();
        let mut by_key = HashMap::new();
        for (key, target) in targets {
            if by_key.contains_key(&key) {
                tracing::debug!(?key, "duplicate mark key ignored");
                continue;
            }
            order.push(key.clone());
            by_key.insert(key, target);
        }
        let diff = diff_keys(self.live_keys(), order);
        let mut report = SyncReport::default();

        for key in diff.exit {
            self.begin_exit(&key, storage, animator, transition, now)?;
            report.exited.push(key);
        }

        for key in diff.update {
            let (Some(entry), Some(target)) = (self.entries.get(&key), by_key.get(&key)) else {
                continue;
            };
            self.retarget(entry.node, target, storage, animator, now)?;
            report.updated.push(key);
        }

        for key in diff.enter {
            let Some(target) = by_key.get(&key) else {
                continue;
            };
            if let Some(entry) = self.entries.get_mut(&key).filter(|e| e.exiting) {
                entry.exiting = false;
                let node = entry.node;
                tracing::debug!(?key, %node, "exiting mark revived");
                self.retarget(node, target, storage, animator, now)?;
                report.updated.push(key);
                continue;
            }
            let start = transition.enter_state(&key, target);
            let node = storage.insert(Element::shape(start.shape).with_style(start.style));
            if !storage.add_child(self.parent, node) {
                storage.destroy(node);
                return Err(SceneError::validation(format!(
                    "layer parent {} is not a container",
                    self.parent
                )));
            }
            self.seq += 1;
            self.entries.insert(
                key.clone(),
                Entry {
                    node,
                    seq: self.seq,
                    exiting: false,
                },
            );
            self.retarget(node, target, storage, animator, now)?;
            report.entered.push(key);
        }

        Ok(report)
    }

    /// Drop keys whose element no longer exists, such as exits whose tween completed.
    pub fn prune(&mut self, storage: &Storage) -> Vec<K> {
        let gone: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, e)| storage.node(e.node).is_none())
            .map(|(k, _)| k.clone())
            .collect();
        for k in &gone {
            self.entries.remove(k);
        }
        gone
    }

    /// Destroy exiting marks whose exit tweens were stopped before they completed.
    ///
    /// A stopped tween drops its completion hook, so without this such marks would stay
    /// attached at their partial exit state.
    pub fn finish_stalled_exits(&mut self, storage: &mut Storage, animator: &Animator) -> Vec<K> {
        let stalled: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, e)| e.exiting && animator.tweens_on(e.node, None).next().is_none())
            .map(|(k, _)| k.clone())
            .collect();
        for k in &stalled {
            if let Some(entry) = self.entries.remove(k) {
                tracing::debug!(key = ?k, node = %entry.node, "stalled exit removed");
                storage.destroy(entry.node);
            }
        }
        stalled
    }

    /// Remove every mark immediately, without exit tweens.
    pub fn clear(&mut self, storage: &mut Storage, animator: &mut Animator) {
        for (_, entry) in self.entries.drain() {
            animator.stop_target(entry.node, None);
            storage.destroy(entry.node);
        }
    }

    fn retarget(
        &self,
        node: NodeId,
        target: &MarkTarget,
        storage: &mut Storage,
        animator: &mut Animator,
        now: Duration,
    ) -> SceneResult<()> {
        animator.stop_target(node, None);
        let el = storage
            .node(node)
            .ok_or_else(|| SceneError::validation(format!("unknown element {node}")))?;
        let (staged, plan) = plan_tweens(el.shape_ref(), el.style().opacity, target);

        let mut style = target.style.clone();
        if plan.iter().any(|(p, _)| p == "style.opacity") {
            style.opacity = el.style().opacity;
        }
        storage.replace_shape(node, staged)?;
        storage.replace_style(node, style)?;
        for (path, to) in plan {
            animator.animate(storage, node, &path, to, self.opts, now)?;
        }
        Ok(())
    }

    fn begin_exit<T>(
        &mut self,
        key: &K,
        storage: &mut Storage,
        animator: &mut Animator,
        transition: &T,
        now: Duration,
    ) -> SceneResult<()>
    where
        T: MarkTransition<K> + ?Sized,
    {
        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(());
        };
        entry.exiting = true;
        let node = entry.node;
        animator.stop_target(node, None);

        let current = storage.node(node).and_then(|el| {
            el.shape_ref()
                .map(|shape| MarkTarget::new(shape.clone(), el.style().clone()))
        });
        let Some(current) = current else {
            storage.destroy(node);
            self.entries.remove(key);
            return Ok(());
        };
        let goal = transition.exit_state(key, &current);
        let (_, plan) = plan_tweens(Some(&current.shape), current.style.opacity, &goal);
        storage.move_to_bottom(node);

        if plan.is_empty() {
            storage.destroy(node);
            self.entries.remove(key);
            return Ok(());
        }
        let last = plan.len() - 1;
        for (i, (path, to)) in plan.into_iter().enumerate() {
            let mut tween = Tween::element(node, path, to).options(self.opts);
            if i == last {
                tween = tween.on_done(move |storage: &mut Storage| storage.destroy(node));
            }
            animator.start(tween, storage, now)?;
        }
        Ok(())
    }
}

/// Shape to install now (target geometry with the live values of tweened fields) and the
/// numeric tweens that carry it to `target`.
fn plan_tweens(live: Option<&Shape>, live_opacity: f64, target: &MarkTarget) -> (Shape, Plan) {
    let mut staged = target.shape.clone();
    let mut plan = Plan::new();
    if let Some(live) = live.filter(|s| s.kind_name() == target.shape.kind_name()) {
        for (field, to) in target.shape.numeric_fields() {
            let Some(from) = live.get(field) else {
                continue;
            };
            if from != to && from.is_finite() && to.is_finite() {
                staged.set(field, from);
                plan.push((format!("shape.{field}"), to));
            }
        }
    }
    let to = target.style.opacity;
    if live_opacity != to && live_opacity.is_finite() && to.is_finite() {
        plan.push(("style.opacity".to_owned(), to));
    }
    (staged, plan)
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/layer.rs"]
mod tests;
