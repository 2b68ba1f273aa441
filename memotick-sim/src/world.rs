//! Minimal simulation domain.
//!
//! Only the shape of data the cache engine needs is modeled: small-integer
//! identities for key construction, and versioned collections whose change
//! counters drive precise staleness detection. Every structural mutation
//! (insert/remove) moves the owning collection's counter; per-element
//! property writes do not.

use memotick_core::index::CacheIndexed;
use memotick_core::version::ChangeCounter;
use serde::{Deserialize, Serialize};

use crate::links;

/// Identity of a simulated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub i32);

/// Identity of a condition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindId(pub i32);

/// Identity of a placed structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureId(pub i32);

/// Identity of a faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub i32);

impl CacheIndexed for ActorId {
    #[inline]
    fn cache_index(&self) -> i32 {
        self.0
    }
}

impl CacheIndexed for KindId {
    #[inline]
    fn cache_index(&self) -> i32 {
        self.0
    }
}

impl CacheIndexed for StructureId {
    #[inline]
    fn cache_index(&self) -> i32 {
        self.0
    }
}

impl CacheIndexed for FactionId {
    #[inline]
    fn cache_index(&self) -> i32 {
        self.0
    }
}

/// One condition affecting an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub kind: KindId,
    pub visible: bool,
    pub severity: f32,
}

/// Versioned set of an actor's conditions.
#[derive(Debug, Default)]
pub struct ConditionSet {
    items: Vec<Condition>,
    counter: ChangeCounter,
}

impl ConditionSet {
    pub fn items(&self) -> &[Condition] {
        &self.items
    }

    pub fn counter(&self) -> &ChangeCounter {
        &self.counter
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, condition: Condition) {
        self.items.push(condition);
        self.counter.record_change();
    }

    /// Remove every condition of `kind`. Returns whether any was removed.
    pub fn remove_kind(&mut self, kind: KindId) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.kind != kind);
        let removed = self.items.len() != before;
        if removed {
            self.counter.record_change();
        }
        removed
    }

    /// Flip visibility of the first condition of `kind`.
    ///
    /// Visibility is a per-element property, not a structural mutation; it
    /// does not move the change counter.
    pub fn set_visibility(&mut self, kind: KindId, visible: bool) -> bool {
        match self.items.iter_mut().find(|c| c.kind == kind) {
            Some(condition) => {
                condition.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Set severity of the first condition of `kind`. Not a structural
    /// mutation; does not move the change counter.
    pub fn set_severity(&mut self, kind: KindId, severity: f32) -> bool {
        match self.items.iter_mut().find(|c| c.kind == kind) {
            Some(condition) => {
                condition.severity = severity;
                true
            }
            None => false,
        }
    }
}

/// One acquired resistance record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceRecord {
    pub kind: KindId,
    pub progress: f32,
}

/// Versioned ledger of an actor's resistance records.
#[derive(Debug, Default)]
pub struct ResistanceLedger {
    records: Vec<ResistanceRecord>,
    counter: ChangeCounter,
}

impl ResistanceLedger {
    pub fn records(&self) -> &[ResistanceRecord] {
        &self.records
    }

    pub fn counter(&self) -> &ChangeCounter {
        &self.counter
    }

    pub fn add_record(&mut self, record: ResistanceRecord) {
        self.records.push(record);
        self.counter.record_change();
    }

    /// Uncached scan for a record of `kind`.
    pub fn has_record(&self, kind: KindId) -> bool {
        self.records.iter().any(|r| r.kind == kind)
    }
}

/// A simulated actor.
#[derive(Debug)]
pub struct Actor {
    pub id: ActorId,
    pub faction: FactionId,
    pub conditions: ConditionSet,
    pub resistances: ResistanceLedger,
}

impl Actor {
    pub fn new(id: ActorId, faction: FactionId) -> Self {
        Self {
            id,
            faction,
            conditions: ConditionSet::default(),
            resistances: ResistanceLedger::default(),
        }
    }

    /// Add a condition and expire this actor's link throttle, so the next
    /// link lookup recomputes against the changed set.
    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.add(condition);
        links::invalidate_link(self.id);
    }

    /// Remove every condition of `kind`, expiring the link throttle when
    /// anything was removed.
    pub fn remove_conditions_of_kind(&mut self, kind: KindId) -> bool {
        let removed = self.conditions.remove_kind(kind);
        if removed {
            links::invalidate_link(self.id);
        }
        removed
    }
}

/// One placed structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Structure {
    pub id: StructureId,
    pub owner: FactionId,
    pub shrine: bool,
    pub position: (i32, i32),
}

/// Versioned ledger of the map's structures.
#[derive(Debug, Default)]
pub struct StructureLedger {
    items: Vec<Structure>,
    counter: ChangeCounter,
}

impl StructureLedger {
    pub fn items(&self) -> &[Structure] {
        &self.items
    }

    pub fn counter(&self) -> &ChangeCounter {
        &self.counter
    }

    pub fn add(&mut self, structure: Structure) {
        self.items.push(structure);
        self.counter.record_change();
    }

    pub fn remove(&mut self, id: StructureId) -> bool {
        let before = self.items.len();
        self.items.retain(|s| s.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.counter.record_change();
        }
        removed
    }

    /// Reassign a structure's owner.
    ///
    /// Ownership is a per-element property, not a structural mutation; it
    /// does not move the change counter.
    pub fn set_owner(&mut self, id: StructureId, owner: FactionId) -> bool {
        match self.items.iter_mut().find(|s| s.id == id) {
            Some(structure) => {
                structure.owner = owner;
                true
            }
            None => false,
        }
    }
}

/// The simulated world.
#[derive(Debug, Default)]
pub struct World {
    pub structures: StructureLedger,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }
}
