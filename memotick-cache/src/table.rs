//! The keyed cache table.
//!
//! [`CacheTable`] adapts the external hash table behind the two-operation
//! contract the engine relies on: `get_or_add` (existing entry or
//! value-initialized insert, never fails) and `get_existing` (entry the
//! caller has proven present, loud failure otherwise). The table's probing
//! and resizing strategy is the backing map's concern; nothing here
//! reimplements it.
//!
//! References returned by both operations are exclusive borrows that end at
//! the next call into the table - the borrow checker enforces the transient
//! ownership model structurally, so an unrelated insert can never invalidate
//! a reference a caller is still holding.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Keyed table mapping a composite key to a mutable cache entry.
pub struct CacheTable<K, V> {
    entries: FxHashMap<K, V>,
}

impl<K: Eq + Hash, V> CacheTable<K, V> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        tracing::trace!(capacity, "created cache table");
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Existing entry for `key`, or a value-initialized insert.
    ///
    /// O(1) amortized; allocation-free when the entry already exists.
    #[inline]
    pub fn get_or_add(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entries.entry(key).or_default()
    }

    /// Entry for a key the caller has proven present via program order,
    /// e.g. a miss handler updating the entry it just observed dirty.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent. That is a violated precondition in the
    /// call-site wiring, never ordinary control flow.
    #[inline]
    #[track_caller]
    pub fn get_existing(&mut self, key: K) -> &mut V {
        match self.entries.get_mut(&key) {
            Some(entry) => entry,
            None => panic!("get_existing called for an absent cache key"),
        }
    }

    /// Entry for `key`, if present.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Mutable entry for `key`, if present.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Host-reset only; never called on the hot path.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Eq + Hash, V> Default for CacheTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memotick_core::key::PairKey;

    struct Left;
    struct Right;

    type Key = PairKey<Left, Right>;

    #[test]
    fn test_get_or_add_inserts_default() {
        let mut table: CacheTable<Key, u32> = CacheTable::new();
        let entry = table.get_or_add(Key::from_indices(1, 2));
        assert_eq!(*entry, 0);
        *entry = 42;
        assert_eq!(*table.get_or_add(Key::from_indices(1, 2)), 42);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_existing_returns_inserted_entry() {
        let mut table: CacheTable<Key, u32> = CacheTable::new();
        *table.get_or_add(Key::from_indices(3, 4)) = 7;
        assert_eq!(*table.get_existing(Key::from_indices(3, 4)), 7);
    }

    #[test]
    #[should_panic(expected = "absent cache key")]
    fn test_get_existing_panics_on_absent_key() {
        let mut table: CacheTable<Key, u32> = CacheTable::new();
        table.get_existing(Key::from_indices(9, 9));
    }

    #[test]
    fn test_distinct_keys_store_distinct_entries() {
        let mut table: CacheTable<Key, u32> = CacheTable::new();
        let n = 1000;
        for i in 0..n {
            *table.get_or_add(Key::from_indices(i, i * 31 + 1)) = i as u32;
        }
        assert_eq!(table.len(), n as usize);
        for i in 0..n {
            assert_eq!(
                table.get(&Key::from_indices(i, i * 31 + 1)),
                Some(&(i as u32))
            );
        }
    }

    #[test]
    fn test_clear_empties_the_table() {
        let mut table: CacheTable<Key, u32> = CacheTable::new();
        table.get_or_add(Key::from_indices(1, 1));
        assert!(!table.is_empty());
        table.clear();
        assert!(table.is_empty());
    }
}
