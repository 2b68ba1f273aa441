//! Throttled primary-link lookup.
//!
//! The link query walks the whole condition set for the strongest entry,
//! but its answer only matters at a 32-tick granularity, so it gets the
//! deadline-only policy: no counter at all, just a short hold. Structural
//! condition mutations expire the hold early through
//! [`invalidate_link`], wired from the actor's mutators.

use memotick_cache::{context_local_store, with_store, ThrottledEntry};
use memotick_core::config::CacheTuning;
use memotick_core::key::IndexKey;

use crate::world::{Actor, ActorId, KindId};

context_local_store! {
    static LINK_CACHE: IndexKey<ActorId> => ThrottledEntry<Option<KindId>>;
}

/// Kind of the actor's strongest condition, held for the tuning's link
/// period.
pub fn primary_link(actor: &Actor, tuning: &CacheTuning) -> Option<KindId> {
    with_store(&LINK_CACHE, |table| {
        let entry = table.get_or_add(IndexKey::of(&actor.id));
        if entry.is_stale() {
            let strongest = actor
                .conditions
                .items()
                .iter()
                .max_by(|a, b| a.severity.total_cmp(&b.severity))
                .map(|c| c.kind);
            entry.refresh(strongest, tuning.link_hold);
        }
        *entry.value()
    })
}

/// Expire `actor`'s link hold so the next lookup recomputes.
pub(crate) fn invalidate_link(actor: ActorId) {
    with_store(&LINK_CACHE, |table| {
        if let Some(entry) = table.get_mut(&IndexKey::of(&actor)) {
            entry.invalidate();
        }
    });
}
