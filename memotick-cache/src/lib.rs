//! Keyed cache stores and staleness policies.
//!
//! # Design Philosophy
//!
//! Traditional caches hide their staleness. This engine makes it explicit
//! and cheap: every entry carries enough metadata to self-report staleness
//! in O(1) - a snapshot of an upstream mutation counter for precise
//! detection, and a staggered refresh deadline as a time-boxed safety net
//! for dependencies no counter tracks. Call sites branch on that check and
//! either return the embedded result or fall through to the original
//! computation and overwrite the entry in place.
//!
//! # Store Partitioning
//!
//! Each call site owns one store per (key shape, entry shape) pairing.
//! The default variant is context-local: one lazily created table per
//! execution context, so the hot path never touches a synchronization
//! primitive. A separately addressable mutex-guarded shared variant exists
//! for the rare canonical-view case and stays off the hot path.
//!
//! # Growth
//!
//! Stores grow monotonically: stale entries are overwritten in place, never
//! removed. Growth is bounded by the number of distinct keys ever seen.

pub mod context;
pub mod entry;
pub mod hot_path;
pub mod table;

pub use context::{with_store, LocalStore, SharedStore};
pub use entry::{
    DualDeadlineEntry, Staleness, ThrottledEntry, TrackedEntry, VersionStampedEntry,
};
pub use hot_path::get_or_refresh;
pub use table::CacheTable;
