//! Opaque identifiers handed out by the scene, handler, animator and frame queue.

use std::fmt;

/// Identifier of an [`Element`](crate::scene::element::Element), unique per [`Storage`](crate::scene::storage::Storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

/// Identifier of an event listener registered on a [`Handler`](crate::input::handler::Handler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Identifier of a tween owned by an [`Animator`](crate::animation::animator::Animator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub(crate) u64);

/// Handle of a task queued on a [`FrameQueue`](crate::render::scheduler::FrameQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub(crate) u64);

impl NodeId {
    /// Raw numeric value, stable for the lifetime of the owning storage.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

/// Monotonic id source. Ids start at 1 so that 0 never names a live object.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdGen(u64);

impl IdGen {
    pub(crate) fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }
}
