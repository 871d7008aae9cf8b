use std::collections::HashSet;
use std::hash::Hash;

/// Classification of keys between two data snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDiff<K> {
    /// Keys present in both snapshots, in new order.
    pub update: Vec<K>,
    /// Keys only in the new snapshot, in new order.
    pub enter: Vec<K>,
    /// Keys only in the old snapshot, in old order.
    pub exit: Vec<K>,
}

impl<K> KeyDiff<K> {
    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.enter.is_empty() && self.exit.is_empty()
    }
}

/// Split `old` and `new` key lists into updates, entries and exits.
///
/// Duplicate keys count once, at their first occurrence.
pub fn diff_keys<K, O, N>(old: O, new: N) -> KeyDiff<K>
where
    K: Eq + Hash + Clone,
    O: IntoIterator<Item = K>,
    N: IntoIterator<Item = K>,
{
    let mut old_seen = HashSet::new();
    let old: Vec<K> = old
        .into_iter()
        .filter(|k| old_seen.insert(k.clone()))
        .collect();

    let mut new_seen = HashSet::new();
    let mut update = Vec::new();
    let mut enter = Vec::new();
    for k in new {
        if !new_seen.insert(k.clone()) {
            continue;
        }
        if old_seen.contains(&k) {
            update.push(k);
        } else {
            enter.push(k);
        }
    }
    let exit = old.into_iter().filter(|k| !new_seen.contains(k)).collect();

    KeyDiff {
        update,
        enter,
        exit,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/diff.rs"]
mod tests;
