//! Context-local and process-shared store instances.
//!
//! Execution contexts are single-threaded, so the default store variant is
//! partitioned per context instead of locked: each call site declares one
//! [`context_local_store!`] static, and every context lazily creates its own
//! table on first use and reuses it for the context's lifetime. The hot path
//! is a thread-local lookup plus one table probe - no synchronization
//! primitive is ever touched.
//!
//! The [`SharedStore`] variant is the separately addressable process-wide
//! instance for the rare case where one canonical view must be visible
//! across contexts. It is mutex-guarded and intended for read-mostly or
//! externally serialized access; nothing on the hot path should go through
//! it.

use std::cell::RefCell;
use std::hash::Hash;
use std::thread::LocalKey;

use parking_lot::{Mutex, MutexGuard};

use crate::table::CacheTable;

/// The thread-local slot type declared by [`context_local_store!`].
pub type LocalStore<K, V> = LocalKey<RefCell<CacheTable<K, V>>>;

/// Declare one context-local store per call site.
///
/// Each listed static becomes a lazily initialized per-context
/// [`CacheTable`]; access it through [`with_store`].
///
/// # Example
/// ```ignore
/// context_local_store! {
///     static CONDITION_CACHE: PairKey<ActorId, KindId> => ConditionEntry;
/// }
/// ```
#[macro_export]
macro_rules! context_local_store {
    ($($(#[$meta:meta])* $vis:vis static $name:ident : $key:ty => $value:ty;)+) => {
        ::std::thread_local! {
            $(
                $(#[$meta])*
                $vis static $name: ::std::cell::RefCell<$crate::CacheTable<$key, $value>> =
                    ::std::cell::RefCell::new($crate::CacheTable::new());
            )+
        }
    };
}

/// Run `f` against this context's instance of `store`.
///
/// The table is created on first use in the current context and reused for
/// the context's lifetime. `f` receives an exclusive borrow for its
/// duration; call sites must not re-enter the same store from inside `f`
/// (the recompute path of a cached query must not call back into its own
/// cache).
#[inline]
pub fn with_store<K, V, R>(
    store: &'static LocalStore<K, V>,
    f: impl FnOnce(&mut CacheTable<K, V>) -> R,
) -> R
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    store.with(|cell| {
        let mut table = cell.borrow_mut();
        f(&mut table)
    })
}

/// Process-shared store instance.
///
/// One canonical table visible to every context, guarded by a mutex.
/// Restricted to read-mostly or externally serialized access patterns; the
/// context-local variant is the default for everything hot.
pub struct SharedStore<K, V> {
    inner: Mutex<CacheTable<K, V>>,
}

impl<K: Eq + Hash, V> SharedStore<K, V> {
    pub fn new() -> Self {
        tracing::debug!("created shared cache store");
        Self {
            inner: Mutex::new(CacheTable::new()),
        }
    }

    /// Lock the shared table for the duration of the returned guard.
    pub fn lock(&self) -> MutexGuard<'_, CacheTable<K, V>> {
        self.inner.lock()
    }
}

impl<K: Eq + Hash, V> Default for SharedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memotick_core::key::IndexKey;
    use once_cell::sync::Lazy;

    struct Slot;

    context_local_store! {
        static TEST_STORE: IndexKey<Slot> => u32;
    }

    #[test]
    fn test_store_is_reused_within_a_context() {
        with_store(&TEST_STORE, |table| {
            *table.get_or_add(IndexKey::from_index(1)) = 5;
        });
        let (len, value) = with_store(&TEST_STORE, |table| {
            (table.len(), *table.get_or_add(IndexKey::from_index(1)))
        });
        assert_eq!(len, 1);
        assert_eq!(value, 5);
    }

    #[test]
    fn test_contexts_are_partitioned() {
        with_store(&TEST_STORE, |table| {
            *table.get_or_add(IndexKey::from_index(2)) = 9;
        });
        let other_len = std::thread::spawn(|| with_store(&TEST_STORE, |table| table.len()))
            .join()
            .expect("context thread panicked");
        assert_eq!(other_len, 0);
    }

    #[test]
    fn test_shared_store_is_visible_across_contexts() {
        static SHARED: Lazy<SharedStore<IndexKey<Slot>, u32>> = Lazy::new(SharedStore::new);

        *SHARED.lock().get_or_add(IndexKey::from_index(3)) = 11;
        let seen = std::thread::spawn(|| {
            SHARED.lock().get(&IndexKey::from_index(3)).copied()
        })
        .join()
        .expect("context thread panicked");
        assert_eq!(seen, Some(11));
    }
}
