use crate::foundation::ids::{FrameHandle, IdGen};

/// Work queued for the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameTask {
    /// Step running tweens.
    Animate,
    /// Repaint dirty content.
    Repaint,
}

/// Queue of "run at the next frame" tasks.
///
/// The host drives it: whenever [`FrameQueue::has_pending`] is true it should call
/// [`Engine::run_frame`](crate::engine::Engine::run_frame) at its next vsync (or timer tick).
#[derive(Debug, Default)]
pub struct FrameQueue {
    ids: IdGen,
    pending: Vec<(FrameHandle, FrameTask)>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` and return a handle that can cancel it.
    pub fn request(&mut self, task: FrameTask) -> FrameHandle {
        let handle = FrameHandle(self.ids.next());
        self.pending.push((handle, task));
        handle
    }

    /// Drop a queued task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of queued tasks of kind `task`.
    pub fn count(&self, task: FrameTask) -> usize {
        self.pending.iter().filter(|(_, t)| *t == task).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every queued task in request order.
    ///
    /// Tasks requested while the returned batch runs land in the next frame.
    pub fn take_due(&mut self) -> Vec<(FrameHandle, FrameTask)> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;
