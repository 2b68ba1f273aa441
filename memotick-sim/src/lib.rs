//! Simulation domain and intercepted hot queries.
//!
//! A minimal tick-based simulation - actors with versioned condition sets
//! and resistance ledgers, a map of versioned structures - plus the hot
//! queries an interception layer would redirect into the cache engine. Each
//! query follows the same shape: build a composite key from live arguments,
//! fetch-or-create its entry in a context-local store, branch on the
//! staleness check, and either serve the embedded result or fall through to
//! the original computation and overwrite the entry in place.

pub mod conditions;
pub mod links;
pub mod proximity;
pub mod resistance;
pub mod world;

pub use conditions::{first_condition_of_kind, has_condition_of_kind, with_active_kinds};
pub use links::primary_link;
pub use proximity::shared_shrine;
pub use resistance::{
    resistance_record_exists, try_add_resistance_record, with_needed_resistances,
};
pub use world::{
    Actor, ActorId, Condition, ConditionSet, FactionId, KindId, ResistanceLedger,
    ResistanceRecord, Structure, StructureId, StructureLedger, World,
};
