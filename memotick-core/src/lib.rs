//! memotick core - value types for the composite-key cache engine.
//!
//! Pure value types with no store behavior. The other crates depend on this:
//! tick clock and staggered deadlines, change counters, index extraction,
//! the composite key family, tuning, and error types.

pub mod config;
pub mod error;
pub mod index;
pub mod key;
pub mod tick;
pub mod version;

pub use config::CacheTuning;
pub use error::ConfigError;
pub use index::CacheIndexed;
pub use key::{IndexKey, PairKey, QuadKey, TripleKey};
pub use tick::Tick;
pub use version::{ChangeCounter, NEVER_SEEN};
