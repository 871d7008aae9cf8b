use crate::foundation::ids::NodeId;
use crate::scene::storage::Storage;
use std::collections::HashMap;

/// Side table of per-element data owned by a chart layer.
///
/// Elements carry no user payload; layers that need scratch state per mark (the datum
/// index, a previous layout) keep it here and prune it against the storage.
#[derive(Clone, Debug)]
pub struct ExtTable<T> {
    rows: HashMap<NodeId, T>,
}

impl<T> Default for ExtTable<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T> ExtTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `id`, returning the previous value.
    pub fn insert(&mut self, id: NodeId, value: T) -> Option<T> {
        self.rows.insert(id, value)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    /// Value for `id`, inserting `T::default()` first if absent.
    pub fn entry_or_default(&mut self, id: NodeId) -> &mut T
    where
        T: Default,
    {
        self.rows.entry(id).or_default()
    }

    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.rows.iter().map(|(id, v)| (*id, v))
    }

    /// Drop rows whose element was destroyed. Returns how many were dropped.
    pub fn prune(&mut self, storage: &Storage) -> usize {
        let before = self.rows.len();
        self.rows.retain(|id, _| storage.node(*id).is_some());
        before - self.rows.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/ext.rs"]
mod tests;
