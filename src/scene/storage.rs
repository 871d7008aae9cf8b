use crate::animation::tween::Animatable;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{IdGen, NodeId};
use crate::scene::element::{Attrs, Element, ElementKind};
use crate::scene::shape::Shape;
use crate::scene::style::Style;
use std::collections::{HashMap, HashSet};

/// Result of a [`Storage::traverse`] callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traverse {
    /// Keep walking.
    Continue,
    /// Skip the remaining siblings of the current recursion frame.
    Stop,
}

/// Arena and registry of scene elements.
///
/// Every element created through [`Storage::insert`] lives here until [`Storage::destroy`].
/// Roots registered with [`Storage::add_root`] and everything reachable from them form the
/// attached set; only attached elements are painted, hit-tested and returned by
/// [`Storage::get`].
#[derive(Debug, Default)]
pub struct Storage {
    nodes: HashMap<NodeId, Element>,
    roots: Vec<NodeId>,
    attached: HashSet<NodeId>,
    structure_dirty: bool,
    ids: IdGen,
}

impl Storage {
    /// An empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a detached element and assign it an id.
    pub fn insert(&mut self, mut element: Element) -> NodeId {
        let id = NodeId(self.ids.next());
        element.id = id;
        element.parent = None;
        element.dirty = true;
        if let ElementKind::Group(children) = &mut element.kind {
            if !children.is_empty() {
                tracing::debug!(%id, "children of a fresh group dropped; use add_child");
                children.clear();
            }
        }
        self.nodes.insert(id, element);
        id
    }

    /// Number of elements in the arena (attached or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` when the arena holds no element.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attached element by id.
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        if self.attached.contains(&id) {
            self.nodes.get(&id)
        } else {
            None
        }
    }

    /// Any element in the arena, attached or not.
    pub fn node(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(&id)
    }

    /// Return `true` when `id` is reachable from a registered root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.attached.contains(&id)
    }

    /// Registered roots in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Ids of every attached element, unordered.
    pub fn attached(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.attached.iter().copied()
    }

    /// Register `id` as a root and index its subtree.
    ///
    /// An element owned by a container is detached from it first. Returns `false` for
    /// unknown ids and for elements that already are roots.
    pub fn add_root(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) || self.roots.contains(&id) {
            return false;
        }
        self.detach_from_parent(id);
        self.roots.push(id);
        self.index_subtree(id);
        self.mark_dirty(id);
        self.structure_dirty = true;
        true
    }

    /// Unregister a root and de-index its subtree. The elements stay in the arena.
    pub fn remove_root(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.roots.iter().position(|r| *r == id) else {
            return false;
        };
        self.roots.remove(pos);
        self.deindex_subtree(id);
        self.structure_dirty = true;
        true
    }

    /// Append `child` to the container `parent`.
    ///
    /// No-op (returns `false`) when `parent` is not a container, when `child == parent`,
    /// or when `child` is an ancestor of `parent`. A child owned elsewhere, or registered
    /// as a root, is detached first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_child(parent, None, child)
    }

    /// Insert `child` into `parent` at `index` (clamped to the child count).
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> bool {
        self.insert_child(parent, Some(index), child)
    }

    fn insert_child(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) -> bool {
        if child == parent || !self.nodes.contains_key(&child) {
            return false;
        }
        match self.nodes.get(&parent) {
            Some(p) if p.is_group() => {}
            _ => return false,
        }
        if self.is_ancestor(child, parent) {
            tracing::debug!(%parent, %child, "add_child would create a cycle; ignored");
            return false;
        }

        if let Some(pos) = self.roots.iter().position(|r| *r == child) {
            self.roots.remove(pos);
            self.structure_dirty = true;
        }
        self.detach_from_parent(child);

        if let Some(ElementKind::Group(children)) = self.nodes.get_mut(&parent).map(|p| &mut p.kind) {
            let at = index.unwrap_or(children.len()).min(children.len());
            children.insert(at, child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }

        if self.attached.contains(&parent) {
            self.index_subtree(child);
        } else {
            self.deindex_subtree(child);
        }
        self.mark_dirty(child);
        true
    }

    /// Remove `child` from `parent`. No-op when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(ElementKind::Group(children)) = self.nodes.get_mut(&parent).map(|p| &mut p.kind) else {
            return false;
        };
        let Some(pos) = children.iter().position(|c| *c == child) else {
            return false;
        };
        children.remove(pos);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = None;
        }
        self.deindex_subtree(child);
        self.mark_dirty(parent);
        true
    }

    /// Detach every child of `parent`, marking it dirty once.
    pub fn remove_all(&mut self, parent: NodeId) {
        let children = match self.nodes.get_mut(&parent).map(|p| &mut p.kind) {
            Some(ElementKind::Group(children)) => std::mem::take(children),
            _ => return,
        };
        for child in children {
            if let Some(c) = self.nodes.get_mut(&child) {
                c.parent = None;
            }
            self.deindex_subtree(child);
        }
        self.mark_dirty(parent);
    }

    /// Move `id` to the front of its parent's child list (or of the root list), so that
    /// it paints below siblings with equal sort keys.
    pub fn move_to_bottom(&mut self, id: NodeId) -> bool {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        let list = match parent {
            Some(p) => match self.nodes.get_mut(&p).map(|n| &mut n.kind) {
                Some(ElementKind::Group(children)) => children,
                _ => return false,
            },
            None => &mut self.roots,
        };
        let Some(pos) = list.iter().position(|c| *c == id) else {
            return false;
        };
        let moved = list.remove(pos);
        list.insert(0, moved);
        match parent {
            Some(p) => self.mark_dirty(p),
            None => self.structure_dirty = true,
        }
        true
    }

    /// Detach `id` and drop it, with its whole subtree, from the arena.
    pub fn destroy(&mut self, id: NodeId) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        self.detach_from_parent(id);
        self.remove_root(id);
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            self.attached.remove(&cur);
            if let Some(el) = self.nodes.remove(&cur) {
                stack.extend_from_slice(el.children());
            }
        }
    }

    /// Depth-first pre-order walk of the subtree rooted at `id`.
    ///
    /// Returning [`Traverse::Stop`] skips the remaining siblings of the frame that produced
    /// it; outer frames continue.
    pub fn traverse<F>(&self, id: NodeId, include_self: bool, cb: &mut F)
    where
        F: FnMut(&Element) -> Traverse,
    {
        let Some(el) = self.nodes.get(&id) else {
            return;
        };
        if include_self && cb(el) == Traverse::Stop {
            return;
        }
        self.traverse_children(el, cb);
    }

    fn traverse_children<F>(&self, el: &Element, cb: &mut F) -> Traverse
    where
        F: FnMut(&Element) -> Traverse,
    {
        for child in el.children() {
            let Some(c) = self.nodes.get(child) else {
                continue;
            };
            if cb(c) == Traverse::Stop {
                return Traverse::Stop;
            }
            self.traverse_children(c, cb);
        }
        Traverse::Continue
    }

    /// Roots in paint order: stable sort by `(zlevel, z)`.
    pub fn element_list(&self) -> Vec<NodeId> {
        self.sorted(&self.roots)
    }

    /// Children of `id` in paint order: stable sort by `(zlevel, z)`.
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.nodes.get(&id) {
            Some(el) => self.sorted(el.children()),
            None => Vec::new(),
        }
    }

    fn sorted(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = ids.iter().copied().filter(|id| self.nodes.contains_key(id)).collect();
        out.sort_by_key(|id| {
            self.nodes
                .get(id)
                .map(|n| (n.zlevel, n.z))
                .unwrap_or_default()
        });
        out
    }

    /// Shallow-merge `attrs` into the element and mark it dirty up to its root.
    pub fn attr(&mut self, id: NodeId, attrs: &Attrs) -> SceneResult<()> {
        let el = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown element {id}")))?;
        el.apply(attrs);
        self.mark_dirty(id);
        Ok(())
    }

    /// Replace the element's geometry wholesale.
    pub fn replace_shape(&mut self, id: NodeId, shape: Shape) -> SceneResult<()> {
        let el = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown element {id}")))?;
        match &mut el.kind {
            ElementKind::Shape(s) => *s = shape,
            ElementKind::Group(_) => {
                return Err(SceneError::validation(format!("{id} is a group and has no shape")));
            }
        }
        self.mark_dirty(id);
        Ok(())
    }

    /// Replace the element's style wholesale.
    pub fn replace_style(&mut self, id: NodeId, style: Style) -> SceneResult<()> {
        let el = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown element {id}")))?;
        el.style = style;
        self.mark_dirty(id);
        Ok(())
    }

    /// Read a dotted numeric property.
    pub fn get_prop(&self, id: NodeId, path: &str) -> Option<f64> {
        self.nodes.get(&id)?.get_prop(path)
    }

    /// Write a dotted numeric property and mark the element dirty.
    pub fn set_prop(&mut self, id: NodeId, path: &str, value: f64) -> bool {
        let written = self
            .nodes
            .get_mut(&id)
            .is_some_and(|el| el.set_prop(path, value));
        if written {
            self.mark_dirty(id);
        }
        written
    }

    /// Mark `id` and every ancestor dirty.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(el) = self.nodes.get_mut(&c) else {
                break;
            };
            el.dirty = true;
            cur = el.parent;
        }
    }

    /// Return `true` when a paint would change the output.
    pub fn is_dirty(&self) -> bool {
        self.structure_dirty
            || self
                .roots
                .iter()
                .any(|r| self.nodes.get(r).is_some_and(|n| n.dirty))
    }

    /// Clear the dirty bit of every attached element. Called at the end of a paint.
    pub fn clear_dirty(&mut self) {
        self.structure_dirty = false;
        for id in &self.attached {
            if let Some(el) = self.nodes.get_mut(id) {
                el.dirty = false;
            }
        }
    }

    /// Force a repaint without touching any element.
    pub fn mark_structure_dirty(&mut self) {
        self.structure_dirty = true;
    }

    /// Product of the local transforms from the root down to `id`.
    pub fn global_transform(&self, id: NodeId) -> Affine {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(el) = self.nodes.get(&c) else {
                break;
            };
            chain.push(el.local_affine());
            cur = el.parent;
        }
        chain
            .into_iter()
            .rev()
            .fold(Affine::IDENTITY, |acc, local| acc * local)
    }

    /// Bounding box of `id` in its own local space (before its transform).
    ///
    /// Containers report the union of their children's boxes mapped through each child's
    /// transform, or an empty rect when they have no children.
    pub fn bounding_rect(&self, id: NodeId) -> Rect {
        let Some(el) = self.nodes.get(&id) else {
            return Rect::ZERO;
        };
        match &el.kind {
            ElementKind::Shape(shape) => shape.bounding_rect(&el.style),
            ElementKind::Group(children) => {
                let mut out: Option<Rect> = None;
                for child in children {
                    let Some(c) = self.nodes.get(child) else {
                        continue;
                    };
                    let rect = c.local_affine().transform_rect_bbox(self.bounding_rect(*child));
                    out = Some(match out {
                        Some(acc) => acc.union(rect),
                        None => rect,
                    });
                }
                out.unwrap_or(Rect::ZERO)
            }
        }
    }

    /// Return `true` when `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.nodes.get(&c).and_then(|n| n.parent);
        }
        false
    }

    /// Topmost ancestor of `id` (itself for roots and detached elements).
    pub fn top_ancestor(&self, id: NodeId) -> NodeId {
        let mut top = id;
        while let Some(p) = self.nodes.get(&top).and_then(|n| n.parent) {
            top = p;
        }
        top
    }

    fn detach_from_parent(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        self.remove_child(parent, id);
    }

    fn index_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(el) = self.nodes.get(&cur) {
                self.attached.insert(cur);
                stack.extend_from_slice(el.children());
            }
        }
    }

    fn deindex_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            self.attached.remove(&cur);
            if let Some(el) = self.nodes.get(&cur) {
                stack.extend_from_slice(el.children());
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/storage.rs"]
mod tests;
