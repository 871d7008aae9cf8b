use crate::foundation::core::{Affine, Point};
use crate::foundation::ids::{IdGen, ListenerId, NodeId};
use crate::input::event::{EventKind, PointerInput, PointerKind, SceneEvent};
use crate::render::surface::SurfaceHost;
use crate::scene::element::ElementKind;
use crate::scene::storage::Storage;
use std::fmt;

type ListenerFn = Box<dyn FnMut(&mut SceneEvent, &mut Storage)>;

struct Listener {
    id: ListenerId,
    node: Option<NodeId>,
    kind: EventKind,
    cb: ListenerFn,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        node: NodeId,
        start: Point,
        origin: (f64, f64),
        over: Option<NodeId>,
    },
}

/// Turns host pointer input into element events.
///
/// Tracks the hovered element, runs the drag state machine and bubbles events from the hit
/// element through its ancestors, then to surface-level listeners.
pub struct Handler {
    listeners: Vec<Listener>,
    ids: IdGen,
    hovered: Option<NodeId>,
    drag: DragState,
    hover_enabled: bool,
    drag_enabled: bool,
}

impl Default for Handler {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            ids: IdGen::default(),
            hovered: None,
            drag: DragState::Idle,
            hover_enabled: true,
            drag_enabled: true,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("listeners", &self.listeners.len())
            .field("hovered", &self.hovered)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable hover tracking (`MouseOver`/`MouseOut`).
    pub fn set_hover_enabled(&mut self, enabled: bool) {
        self.hover_enabled = enabled;
        if !enabled {
            self.hovered = None;
        }
    }

    /// Enable or disable dragging of `draggable` elements.
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
        if !enabled {
            self.drag = DragState::Idle;
        }
    }

    /// Currently hovered element.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Element being dragged.
    pub fn dragging(&self) -> Option<NodeId> {
        match self.drag {
            DragState::Dragging { node, .. } => Some(node),
            DragState::Idle => None,
        }
    }

    /// Listen for `kind` on `node`, or on the surface when `node` is `None`.
    ///
    /// Element listeners also see events bubbling up from descendants.
    pub fn on<F>(&mut self, node: Option<NodeId>, kind: EventKind, cb: F) -> ListenerId
    where
        F: FnMut(&mut SceneEvent, &mut Storage) + 'static,
    {
        let id = ListenerId(self.ids.next());
        self.listeners.push(Listener {
            id,
            node,
            kind,
            cb: Box::new(cb),
        });
        id
    }

    /// Remove one listener.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Remove every listener attached to `node`.
    pub fn off_node(&mut self, node: NodeId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.node != Some(node));
        before - self.listeners.len()
    }

    /// Fire `kind` on `target` as if it had been produced by input at `at`.
    pub fn trigger(
        &mut self,
        storage: &mut Storage,
        kind: EventKind,
        target: Option<NodeId>,
        at: Point,
    ) -> SceneEvent {
        self.fire(storage, SceneEvent::new(kind, at, target))
    }

    /// Topmost visible, non-silent element containing `p` (surface-local).
    pub fn find_hover(&self, storage: &Storage, p: Point) -> Option<NodeId> {
        hit_test(storage, p, None)
    }

    /// Process one host input, returning the hit element and every event fired.
    pub fn dispatch(
        &mut self,
        storage: &mut Storage,
        host: &dyn SurfaceHost,
        input: &PointerInput,
    ) -> (Option<NodeId>, Vec<SceneEvent>) {
        let mut fired = Vec::new();
        self.forget_detached(storage, &mut fired);

        if input.kind == PointerKind::Out {
            self.pointer_out(storage, &mut fired);
            return (None, fired);
        }
        let Some(screen) = input.position() else {
            return (None, fired);
        };
        let pos = screen - host.screen_offset();

        if let DragState::Dragging { node, .. } = self.drag {
            match input.kind {
                PointerKind::Move => {
                    self.drag_move(storage, pos, &mut fired);
                    return (Some(node), fired);
                }
                PointerKind::Up => {
                    let hit = hit_test(storage, pos, None);
                    fired.push(self.fire(storage, SceneEvent::new(EventKind::MouseUp, pos, hit)));
                    self.drag_end(storage, pos, true, &mut fired);
                    return (hit, fired);
                }
                _ => {}
            }
        }

        let hit = hit_test(storage, pos, None);
        let kind = match input.kind {
            PointerKind::Down => EventKind::MouseDown,
            PointerKind::Move => EventKind::MouseMove,
            PointerKind::Up => EventKind::MouseUp,
            PointerKind::Click => EventKind::Click,
            PointerKind::DoubleClick => EventKind::DoubleClick,
            PointerKind::ContextMenu => EventKind::ContextMenu,
            PointerKind::Wheel => EventKind::MouseWheel,
            PointerKind::Out => return (None, fired),
        };

        if input.kind == PointerKind::Move {
            self.update_hover(storage, hit, pos, &mut fired);
        }

        let mut ev = SceneEvent::new(kind, pos, hit);
        ev.wheel_delta = input.wheel_delta;
        fired.push(self.fire(storage, ev));

        if input.kind == PointerKind::Down && self.drag_enabled {
            self.drag_start(storage, hit, pos, &mut fired);
        }
        (hit, fired)
    }

    fn update_hover(&mut self, storage: &mut Storage, hit: Option<NodeId>, pos: Point, fired: &mut Vec<SceneEvent>) {
        if !self.hover_enabled || hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            fired.push(self.fire(storage, SceneEvent::new(EventKind::MouseOut, pos, Some(old))));
        }
        if hit.is_some() {
            fired.push(self.fire(storage, SceneEvent::new(EventKind::MouseOver, pos, hit)));
        }
        self.hovered = hit;
    }

    fn pointer_out(&mut self, storage: &mut Storage, fired: &mut Vec<SceneEvent>) {
        let at = Point::new(f64::NAN, f64::NAN);
        if self.dragging().is_some() {
            self.drag_end(storage, at, false, fired);
        }
        if let Some(old) = self.hovered.take() {
            fired.push(self.fire(storage, SceneEvent::new(EventKind::MouseOut, at, Some(old))));
        }
    }

    fn drag_start(&mut self, storage: &mut Storage, hit: Option<NodeId>, pos: Point, fired: &mut Vec<SceneEvent>) {
        let Some(node) = draggable_ancestor(storage, hit) else {
            return;
        };
        let Some(el) = storage.get(node) else {
            return;
        };
        let origin = (el.transform().x, el.transform().y);
        self.drag = DragState::Dragging {
            node,
            start: pos,
            origin,
            over: None,
        };
        tracing::debug!(%node, "drag start");
        fired.push(self.fire(storage, SceneEvent::new(EventKind::DragStart, pos, Some(node))));
    }

    fn drag_move(&mut self, storage: &mut Storage, pos: Point, fired: &mut Vec<SceneEvent>) {
        let DragState::Dragging { node, start, origin, over } = self.drag else {
            return;
        };
        let delta = pos - start;
        storage.set_prop(node, "x", origin.0 + delta.x);
        storage.set_prop(node, "y", origin.1 + delta.y);
        fired.push(self.fire(storage, SceneEvent::new(EventKind::Drag, pos, Some(node))));

        let now_over = hit_test(storage, pos, Some(node));
        if now_over != over {
            if let Some(prev) = over {
                let mut ev = SceneEvent::new(EventKind::DragLeave, pos, Some(prev));
                ev.dragged = Some(node);
                fired.push(self.fire(storage, ev));
            }
            if let Some(next) = now_over {
                let mut ev = SceneEvent::new(EventKind::DragEnter, pos, Some(next));
                ev.dragged = Some(node);
                fired.push(self.fire(storage, ev));
            }
        } else if let Some(cur) = now_over {
            let mut ev = SceneEvent::new(EventKind::DragOver, pos, Some(cur));
            ev.dragged = Some(node);
            fired.push(self.fire(storage, ev));
        }
        if let DragState::Dragging { over, .. } = &mut self.drag {
            *over = now_over;
        }
    }

    fn drag_end(&mut self, storage: &mut Storage, pos: Point, drop: bool, fired: &mut Vec<SceneEvent>) {
        let DragState::Dragging { node, .. } = std::mem::replace(&mut self.drag, DragState::Idle) else {
            return;
        };
        tracing::debug!(%node, "drag end");
        fired.push(self.fire(storage, SceneEvent::new(EventKind::DragEnd, pos, Some(node))));
        if !drop {
            return;
        }
        if let Some(under) = hit_test(storage, pos, Some(node)) {
            let mut ev = SceneEvent::new(EventKind::Drop, pos, Some(under));
            ev.dragged = Some(node);
            fired.push(self.fire(storage, ev));
        }
    }

    /// Drop hover and drag state pointing at elements that left the scene.
    ///
    /// A hovered element that was detached but not destroyed still gets its `MouseOut`.
    fn forget_detached(&mut self, storage: &mut Storage, fired: &mut Vec<SceneEvent>) {
        if let Some(old) = self.hovered.filter(|h| storage.get(*h).is_none()) {
            self.hovered = None;
            if storage.node(old).is_some() {
                let at = Point::new(f64::NAN, f64::NAN);
                fired.push(self.fire(storage, SceneEvent::new(EventKind::MouseOut, at, Some(old))));
            }
        }
        if let DragState::Dragging { node, .. } = self.drag {
            if storage.get(node).is_none() {
                self.drag = DragState::Idle;
            }
        }
    }

    fn fire(&mut self, storage: &mut Storage, mut ev: SceneEvent) -> SceneEvent {
        ev.top_target = ev.target.map(|t| storage.top_ancestor(t));
        let mut cur = ev.target;
        while let Some(node) = cur {
            ev.current = Some(node);
            self.call(Some(node), &mut ev, storage);
            if ev.stopped {
                return ev;
            }
            cur = storage.node(node).and_then(|n| n.parent());
        }
        ev.current = None;
        self.call(None, &mut ev, storage);
        ev
    }

    fn call(&mut self, node: Option<NodeId>, ev: &mut SceneEvent, storage: &mut Storage) {
        let kind = ev.kind;
        for l in self
            .listeners
            .iter_mut()
            .filter(|l| l.node == node && l.kind == kind)
        {
            (l.cb)(ev, storage);
            if ev.stopped {
                break;
            }
        }
    }
}

fn draggable_ancestor(storage: &Storage, hit: Option<NodeId>) -> Option<NodeId> {
    let mut cur = hit;
    while let Some(id) = cur {
        let el = storage.get(id)?;
        if el.is_draggable() {
            return Some(id);
        }
        cur = el.parent();
    }
    None
}

/// Topmost element containing surface-local point `p`, skipping `exclude` and its subtree.
///
/// Roots and children are visited in reverse paint order; silent and invisible elements
/// hide their whole subtree from the test.
pub fn hit_test(storage: &Storage, p: Point, exclude: Option<NodeId>) -> Option<NodeId> {
    storage
        .element_list()
        .into_iter()
        .rev()
        .find_map(|root| hit_node(storage, root, p, Affine::IDENTITY, exclude))
}

fn hit_node(storage: &Storage, id: NodeId, p: Point, parent: Affine, exclude: Option<NodeId>) -> Option<NodeId> {
    let el = storage.get(id)?;
    if el.is_silent() || el.is_invisible() || Some(id) == exclude {
        return None;
    }
    let affine = parent * el.local_affine();
    match el.kind() {
        ElementKind::Group(_) => storage
            .sorted_children(id)
            .into_iter()
            .rev()
            .find_map(|child| hit_node(storage, child, p, affine, exclude)),
        ElementKind::Shape(_) => {
            if affine.determinant().abs() < f64::EPSILON {
                return None;
            }
            let local = affine.inverse() * p;
            el.contain_local(local).then_some(id)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/handler.rs"]
mod tests;
