//! Cached condition lookups.
//!
//! The hottest intercepted queries: find the first condition of a kind,
//! optionally restricted to visible ones, and enumerate an actor's active
//! kinds. Results are keyed by (actor, kind) and tracked against the
//! condition set's change counter, with the staggered long interval as the
//! safety net for property writes the counter never sees.

use memotick_cache::{context_local_store, get_or_refresh, with_store, Staleness, TrackedEntry};
use memotick_core::config::CacheTuning;
use memotick_core::key::{IndexKey, PairKey};

use crate::world::{Actor, ActorId, Condition, KindId};

/// Key tag distinguishing the visible-only store from the base one.
struct VisibleOnly;

type ConditionEntry = TrackedEntry<Option<Condition>>;

/// Entry shape of the visible-only variant.
///
/// Structurally identical to [`ConditionEntry`] - it wraps one - but kept
/// as a distinct shape so the two query variants never share storage.
#[derive(Debug, Clone, Default)]
struct VisibleConditionEntry(ConditionEntry);

impl VisibleConditionEntry {
    fn as_base(&self) -> &ConditionEntry {
        &self.0
    }

    fn as_base_mut(&mut self) -> &mut ConditionEntry {
        &mut self.0
    }
}

impl Staleness for VisibleConditionEntry {
    #[inline]
    fn is_dirty(&self) -> bool {
        self.0.is_dirty()
    }
}

context_local_store! {
    static CONDITION_CACHE: PairKey<ActorId, KindId> => ConditionEntry;
    static VISIBLE_CONDITION_CACHE: PairKey<ActorId, VisibleOnly> => VisibleConditionEntry;
    static ACTIVE_KINDS_CACHE: IndexKey<ActorId> => TrackedEntry<Vec<KindId>>;
}

fn scan(items: &[Condition], kind: KindId, visible_only: bool) -> Option<Condition> {
    items
        .iter()
        .find(|c| c.kind == kind && (!visible_only || c.visible))
        .copied()
}

/// First condition of `kind` on `actor`, optionally restricted to visible
/// conditions.
///
/// Small condition sets are scanned directly - recomputation is cheaper
/// than a lookup below the tuning threshold, and such calls never touch a
/// store. The visible-only variant addresses its own store with a retagged
/// copy of the base key.
pub fn first_condition_of_kind(
    actor: &Actor,
    kind: KindId,
    visible_only: bool,
    tuning: &CacheTuning,
) -> Option<Condition> {
    if actor.conditions.len() < tuning.min_scan_len {
        return scan(actor.conditions.items(), kind, visible_only);
    }

    let key = PairKey::of(&actor.id, &kind);
    if visible_only {
        with_store(&VISIBLE_CONDITION_CACHE, |table| {
            get_or_refresh(
                table,
                key.retag(),
                |entry| *entry.as_base().value(),
                |entry| {
                    let result = scan(actor.conditions.items(), kind, true);
                    entry.as_base_mut().update(
                        actor.conditions.counter(),
                        actor.id.0,
                        tuning.refresh_interval,
                        result,
                    );
                    result
                },
            )
        })
    } else {
        with_store(&CONDITION_CACHE, |table| {
            get_or_refresh(
                table,
                key,
                |entry| *entry.value(),
                |entry| {
                    let result = scan(actor.conditions.items(), kind, false);
                    entry.update(
                        actor.conditions.counter(),
                        actor.id.0,
                        tuning.refresh_interval,
                        result,
                    );
                    result
                },
            )
        })
    }
}

/// Whether `actor` has any condition of `kind`.
pub fn has_condition_of_kind(
    actor: &Actor,
    kind: KindId,
    visible_only: bool,
    tuning: &CacheTuning,
) -> bool {
    first_condition_of_kind(actor, kind, visible_only, tuning).is_some()
}

/// Run `f` over the actor's visible condition kinds.
///
/// A `min_severity` filter bypasses the cache entirely: filtered calls are
/// rare and would otherwise multiply entry shapes. The unfiltered result
/// lives in a unit-keyed entry whose buffer is refilled in place on
/// refresh, so the steady state allocates nothing.
pub fn with_active_kinds<R>(
    actor: &Actor,
    min_severity: Option<f32>,
    tuning: &CacheTuning,
    f: impl FnOnce(&[KindId]) -> R,
) -> R {
    if let Some(threshold) = min_severity {
        let fresh: Vec<KindId> = actor
            .conditions
            .items()
            .iter()
            .filter(|c| c.visible && c.severity >= threshold)
            .map(|c| c.kind)
            .collect();
        return f(&fresh);
    }

    with_store(&ACTIVE_KINDS_CACHE, |table| {
        let entry = table.get_or_add(IndexKey::of(&actor.id));
        if entry.is_dirty() {
            entry.update_with(
                actor.conditions.counter(),
                actor.id.0,
                tuning.refresh_interval,
                |buf| {
                    buf.clear();
                    buf.extend(
                        actor
                            .conditions
                            .items()
                            .iter()
                            .filter(|c| c.visible)
                            .map(|c| c.kind),
                    );
                },
            );
        }
        f(entry.value())
    })
}
