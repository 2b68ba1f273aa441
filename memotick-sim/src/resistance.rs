//! Cached resistance queries.
//!
//! `with_needed_resistances` tracks the actor's condition set - the needed
//! list is a pure function of current conditions. `resistance_record_exists`
//! is the counter-only shape: it stamps its result with the ledger's
//! watermark and re-judges it against the live counter on every call, with
//! no deadline at all.

use memotick_cache::{
    context_local_store, with_store, Staleness, TrackedEntry, VersionStampedEntry,
};
use memotick_core::config::CacheTuning;
use memotick_core::key::{IndexKey, PairKey};

use crate::world::{Actor, ActorId, KindId, ResistanceRecord};

context_local_store! {
    static NEEDED_CACHE: IndexKey<ActorId> => TrackedEntry<Vec<KindId>>;
    static RECORD_EXISTS_CACHE: PairKey<ActorId, KindId> => VersionStampedEntry<bool>;
}

/// Run `f` over the condition kinds the actor currently needs resistance
/// against, deduplicated in first-seen order.
pub fn with_needed_resistances<R>(
    actor: &Actor,
    tuning: &CacheTuning,
    f: impl FnOnce(&[KindId]) -> R,
) -> R {
    with_store(&NEEDED_CACHE, |table| {
        let entry = table.get_or_add(IndexKey::of(&actor.id));
        if entry.is_dirty() {
            entry.update_with(
                actor.conditions.counter(),
                actor.id.0,
                tuning.refresh_interval,
                |buf| {
                    buf.clear();
                    for condition in actor.conditions.items() {
                        if !buf.contains(&condition.kind) {
                            buf.push(condition.kind);
                        }
                    }
                },
            );
        }
        f(entry.value())
    })
}

/// Whether a resistance record of `kind` exists for `actor`.
///
/// The stamped answer stays valid for as long as the ledger's counter
/// holds still; any ledger mutation forces one rescan.
pub fn resistance_record_exists(actor: &Actor, kind: KindId) -> bool {
    with_store(&RECORD_EXISTS_CACHE, |table| {
        let entry = table.get_or_add(PairKey::of(&actor.id, &kind));
        if entry.is_current(actor.resistances.counter()) {
            return *entry.value();
        }
        let exists = actor.resistances.has_record(kind);
        entry.stamp(actor.resistances.counter(), exists);
        exists
    })
}

/// Add a resistance record unless one already exists. Returns whether a
/// record was added.
///
/// Repeated calls for the same kind are absorbed by the stamped
/// existence entry instead of rescanning the ledger each time.
pub fn try_add_resistance_record(actor: &mut Actor, kind: KindId) -> bool {
    if resistance_record_exists(actor, kind) {
        return false;
    }
    actor.resistances.add_record(ResistanceRecord {
        kind,
        progress: 0.0,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Condition, FactionId};

    fn actor_with_conditions(kinds: &[i32]) -> Actor {
        let mut actor = Actor::new(ActorId(11), FactionId(1));
        for &kind in kinds {
            actor.conditions.add(Condition {
                kind: KindId(kind),
                visible: true,
                severity: 1.0,
            });
        }
        actor
    }

    #[test]
    fn test_needed_resistances_deduplicate_and_track() {
        let tuning = CacheTuning::simulation_defaults();
        let mut actor = actor_with_conditions(&[1, 2, 1, 3]);

        with_needed_resistances(&actor, &tuning, |kinds| {
            assert_eq!(kinds, &[KindId(1), KindId(2), KindId(3)]);
        });

        // The cached list survives repeated calls...
        with_needed_resistances(&actor, &tuning, |kinds| {
            assert_eq!(kinds.len(), 3);
        });

        // ...and one structural mutation refreshes it.
        actor.conditions.add(Condition {
            kind: KindId(4),
            visible: true,
            severity: 1.0,
        });
        with_needed_resistances(&actor, &tuning, |kinds| {
            assert_eq!(kinds, &[KindId(1), KindId(2), KindId(3), KindId(4)]);
        });
    }

    #[test]
    fn test_record_exists_follows_the_ledger() {
        let mut actor = actor_with_conditions(&[1]);

        assert!(!resistance_record_exists(&actor, KindId(1)));
        // Stamped answer, no rescan while the ledger holds still.
        assert!(!resistance_record_exists(&actor, KindId(1)));

        actor.resistances.add_record(ResistanceRecord {
            kind: KindId(1),
            progress: 0.0,
        });
        assert!(resistance_record_exists(&actor, KindId(1)));
    }

    #[test]
    fn test_try_add_is_idempotent() {
        let mut actor = actor_with_conditions(&[1]);

        assert!(try_add_resistance_record(&mut actor, KindId(1)));
        assert!(!try_add_resistance_record(&mut actor, KindId(1)));
        assert_eq!(actor.resistances.records().len(), 1);

        assert!(try_add_resistance_record(&mut actor, KindId(2)));
        assert_eq!(actor.resistances.records().len(), 2);
    }
}
