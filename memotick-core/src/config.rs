//! Engine tuning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tick::{intervals, Tick};

/// Tuning for the cache engine.
///
/// All values are required - no field-level defaults. Hosts either take
/// [`CacheTuning::simulation_defaults`] or build the struct explicitly and
/// run [`CacheTuning::validate`] before wiring call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTuning {
    /// Collections shorter than this are scanned directly; recomputation is
    /// already cheaper than a lookup below it.
    pub min_scan_len: usize,
    /// Refresh period for counter-tracked entries.
    pub refresh_interval: Tick,
    /// Early, counter-gated recheck period for dual-deadline entries.
    pub early_interval: Tick,
    /// Stagger spread applied to the early deadline.
    pub early_spread: Tick,
    /// Late, unconditional refresh period for dual-deadline entries.
    pub late_interval: Tick,
    /// Stagger spread applied to the late deadline.
    pub late_spread: Tick,
    /// Hold period for throttled lookups.
    pub link_hold: Tick,
}

impl CacheTuning {
    /// The intervals the simulation ships with.
    pub fn simulation_defaults() -> Self {
        Self {
            min_scan_len: 5,
            refresh_interval: intervals::LONG,
            early_interval: intervals::PROXIMITY_EARLY,
            early_spread: intervals::PROXIMITY_EARLY_SPREAD,
            late_interval: intervals::PROXIMITY_LATE,
            late_spread: intervals::PROXIMITY_LATE_SPREAD,
            link_hold: intervals::LINK_THROTTLE,
        }
    }

    /// Check the tuning invariants.
    ///
    /// Intervals must be non-zero (a zero period would mark every entry
    /// dirty on the tick it was refreshed), spreads must not exceed their
    /// interval (staggering is load-spreading, small relative to the
    /// period), and the late deadline must sit beyond the early one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval",
                value: 0,
                reason: "must be at least one tick",
            });
        }
        if self.early_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "early_interval",
                value: 0,
                reason: "must be at least one tick",
            });
        }
        if self.link_hold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "link_hold",
                value: 0,
                reason: "must be at least one tick",
            });
        }
        if self.late_interval <= self.early_interval {
            return Err(ConfigError::IncompatibleOptions {
                option_a: "early_interval",
                option_b: "late_interval",
                reason: "the unconditional deadline must sit beyond the counter-gated one",
            });
        }
        if self.early_spread > self.early_interval {
            return Err(ConfigError::InvalidValue {
                field: "early_spread",
                value: self.early_spread,
                reason: "spread must not exceed its interval",
            });
        }
        if self.late_spread > self.late_interval {
            return Err(ConfigError::InvalidValue {
                field: "late_spread",
                value: self.late_spread,
                reason: "spread must not exceed its interval",
            });
        }
        Ok(())
    }
}
