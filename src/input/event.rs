use crate::foundation::core::Point;
use crate::foundation::ids::NodeId;
use smallvec::SmallVec;

/// Kind of raw pointer input reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// Pointer left the surface.
    Out,
    Click,
    DoubleClick,
    ContextMenu,
    Wheel,
}

/// Raw pointer input in host (screen) coordinates.
///
/// Mouse input carries one point; touch input carries every active touch and only the
/// first one is used.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub points: SmallVec<[Point; 2]>,
    /// Scroll amount for [`PointerKind::Wheel`].
    pub wheel_delta: f64,
}

impl PointerInput {
    /// Single-point input.
    pub fn mouse(kind: PointerKind, x: f64, y: f64) -> Self {
        let mut points = SmallVec::new();
        points.push(Point::new(x, y));
        Self {
            kind,
            points,
            wheel_delta: 0.0,
        }
    }

    /// Multi-touch input.
    pub fn touch(kind: PointerKind, points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            kind,
            points: points.into_iter().collect(),
            wheel_delta: 0.0,
        }
    }

    /// Wheel input at a position.
    pub fn wheel(x: f64, y: f64, delta: f64) -> Self {
        Self {
            wheel_delta: delta,
            ..Self::mouse(PointerKind::Wheel, x, y)
        }
    }

    /// Pointer position in host coordinates (first touch for touch input).
    pub fn position(&self) -> Option<Point> {
        self.points.first().copied()
    }
}

/// Kind of event delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    DoubleClick,
    ContextMenu,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseWheel,
    /// Pointer entered the element.
    MouseOver,
    /// Pointer left the element.
    MouseOut,
    DragStart,
    Drag,
    DragEnd,
    /// A dragged element moved over this element.
    DragEnter,
    /// A dragged element moved within this element.
    DragOver,
    /// A dragged element left this element.
    DragLeave,
    /// A dragged element was released over this element.
    Drop,
}

/// Event delivered to listeners while it bubbles from `target` up the parent chain.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEvent {
    pub kind: EventKind,
    /// Surface-local x.
    pub x: f64,
    /// Surface-local y.
    pub y: f64,
    /// Element the event was fired on; `None` for surface-level events.
    pub target: Option<NodeId>,
    /// Topmost ancestor of `target`.
    pub top_target: Option<NodeId>,
    /// Element whose listeners are currently running.
    pub current: Option<NodeId>,
    /// Element being dragged, for drag-over events.
    pub dragged: Option<NodeId>,
    pub wheel_delta: f64,
    pub(crate) stopped: bool,
}

impl SceneEvent {
    pub(crate) fn new(kind: EventKind, at: Point, target: Option<NodeId>) -> Self {
        Self {
            kind,
            x: at.x,
            y: at.y,
            target,
            top_target: None,
            current: None,
            dragged: None,
            wheel_delta: 0.0,
            stopped: false,
        }
    }

    /// Keep the event from reaching ancestors and surface-level listeners.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}
