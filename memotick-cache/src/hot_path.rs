//! The call-site integration shape.
//!
//! Every intercepted query follows the same five steps: decide
//! cacheability, build the composite key, fetch-or-create the entry by
//! reference, branch on the staleness check, and either return the embedded
//! result or run the original computation and overwrite the entry in place.
//! Cacheability gating stays at the call site; this helper captures the
//! rest.

use std::hash::Hash;

use crate::entry::Staleness;
use crate::table::CacheTable;

/// Serve `key`'s cached result, or recompute it exactly once.
///
/// On a clean entry, `read` extracts the result with no recomputation. On a
/// dirty entry, `recompute` runs the original query; it must refresh the
/// entry it receives via the entry's update operation before returning, so
/// that the entry is immediately non-dirty and the same call never
/// recomputes twice.
#[inline]
pub fn get_or_refresh<K, E, R>(
    table: &mut CacheTable<K, E>,
    key: K,
    read: impl FnOnce(&E) -> R,
    recompute: impl FnOnce(&mut E) -> R,
) -> R
where
    K: Eq + Hash,
    E: Staleness + Default,
{
    let entry = table.get_or_add(key);
    if entry.is_dirty() {
        let result = recompute(&mut *entry);
        debug_assert!(
            !entry.is_dirty(),
            "recompute must refresh the entry it observed dirty"
        );
        result
    } else {
        read(entry)
    }
}
