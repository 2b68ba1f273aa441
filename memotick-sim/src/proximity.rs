//! Cached shrine proximity query.
//!
//! The most expensive intercepted query scans every placed structure, so it
//! gets the two-threshold policy: a cheap counter check every early window,
//! the unconditional rescan only at the late deadline. Both deadlines are
//! staggered so factions sharing the map do not all rescan on one tick.

use memotick_cache::{context_local_store, with_store, DualDeadlineEntry, Staleness};
use memotick_core::config::CacheTuning;
use memotick_core::key::IndexKey;

use crate::world::{Actor, FactionId, StructureId, World};

context_local_store! {
    static SHRINE_CACHE: IndexKey<FactionId> => DualDeadlineEntry<Option<StructureId>>;
}

/// The shrine shared by `actor`'s faction, if any.
///
/// Tracked counter: the structure ledger, which moves on placement and
/// removal only. Ownership reassignment is invisible to it - the query
/// filters by owner anyway, so an answer based on stale ownership can
/// survive until the late deadline. That bound is deliberate and pinned by
/// tests; the early window exists to catch the common case (structures
/// appearing or disappearing) almost immediately.
pub fn shared_shrine(world: &World, actor: &Actor, tuning: &CacheTuning) -> Option<StructureId> {
    with_store(&SHRINE_CACHE, |table| {
        let entry = table.get_or_add(IndexKey::of(&actor.faction));
        if !entry.is_dirty() {
            return *entry.value();
        }
        let result = world
            .structures
            .items()
            .iter()
            .find(|s| s.shrine && s.owner == actor.faction)
            .map(|s| s.id);
        entry.update(result, world.structures.counter(), actor.id.0, tuning);
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ActorId, Structure};
    use memotick_core::tick;

    fn shrine(id: i32, owner: i32) -> Structure {
        Structure {
            id: StructureId(id),
            owner: FactionId(owner),
            shrine: true,
            position: (id, id),
        }
    }

    #[test]
    fn test_placement_is_seen_after_the_early_window() {
        let tuning = CacheTuning::simulation_defaults();
        let mut world = World::new();
        let actor = Actor::new(ActorId(9), FactionId(1));

        // Populate the cache with "no shrine".
        assert_eq!(shared_shrine(&world, &actor, &tuning), None);

        // Placement moves the counter, but the policy only consults it
        // once the early threshold is crossed.
        world.structures.add(shrine(1, 1));
        assert_eq!(shared_shrine(&world, &actor, &tuning), None);

        // early_at = 128 + stagger(9, 128) = 137.
        tick::advance_to(136);
        assert_eq!(shared_shrine(&world, &actor, &tuning), None);
        tick::advance_to(137);
        assert_eq!(
            shared_shrine(&world, &actor, &tuning),
            Some(StructureId(1))
        );
    }

    #[test]
    fn test_quiet_counter_holds_until_the_late_deadline() {
        let tuning = CacheTuning::simulation_defaults();
        let mut world = World::new();
        let actor = Actor::new(ActorId(9), FactionId(1));
        world.structures.add(shrine(1, 1));

        assert_eq!(
            shared_shrine(&world, &actor, &tuning),
            Some(StructureId(1))
        );

        // Ownership reassignment does not move the tracked counter: the
        // stale answer survives the early window...
        world.structures.set_owner(StructureId(1), FactionId(2));
        tick::advance_to(1000);
        assert_eq!(
            shared_shrine(&world, &actor, &tuning),
            Some(StructureId(1))
        );

        // ...and is corrected no later than the late deadline
        // (3072 + stagger(9, 2048) = 3081).
        tick::advance_to(3081);
        assert_eq!(shared_shrine(&world, &actor, &tuning), None);
    }

    #[test]
    fn test_removal_is_seen_after_the_early_window() {
        let tuning = CacheTuning::simulation_defaults();
        let mut world = World::new();
        let actor = Actor::new(ActorId(9), FactionId(1));
        world.structures.add(shrine(1, 1));

        assert_eq!(
            shared_shrine(&world, &actor, &tuning),
            Some(StructureId(1))
        );

        world.structures.remove(StructureId(1));
        tick::advance_to(137);
        assert_eq!(shared_shrine(&world, &actor, &tuning), None);
    }

    #[test]
    fn test_factions_do_not_share_entries() {
        let tuning = CacheTuning::simulation_defaults();
        let mut world = World::new();
        let first = Actor::new(ActorId(1), FactionId(1));
        let second = Actor::new(ActorId(2), FactionId(2));
        world.structures.add(shrine(1, 1));
        world.structures.add(shrine(2, 2));

        assert_eq!(
            shared_shrine(&world, &first, &tuning),
            Some(StructureId(1))
        );
        assert_eq!(
            shared_shrine(&world, &second, &tuning),
            Some(StructureId(2))
        );
        let len = with_store(&SHRINE_CACHE, |table| table.len());
        assert_eq!(len, 2);
    }
}
