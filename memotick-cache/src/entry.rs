//! Cache entry staleness policies.
//!
//! Every policy is a plain value type following one lifecycle: a
//! default-constructed entry is never valid (sentinel snapshot, expired
//! deadline), it is refreshed exactly once per dirty miss, and stale state
//! is only ever overwritten in place - never removed.
//!
//! The staleness check is the central correctness mechanism and is always
//! evaluated fresh. [`TrackedEntry`] tolerates two independent staleness
//! causes: the tracked upstream collection mutated (detected precisely via
//! its change counter), or some untracked dependency changed (caught only
//! by the staggered refresh deadline, which bounds worst-case staleness to
//! the refresh period). Cheap precise detection for the common case, cheap
//! time-boxing as the safety net for the rest.

use memotick_core::config::CacheTuning;
use memotick_core::tick::{self, Tick};
use memotick_core::version::{ChangeCounter, NEVER_SEEN};

/// Self-contained staleness check.
///
/// Implemented by policies that can judge their own freshness; consumed by
/// [`crate::get_or_refresh`]. Reading the check must not mutate the entry.
pub trait Staleness {
    /// True when the embedded result must be recomputed before use.
    fn is_dirty(&self) -> bool;
}

/// Counter-tracked entry with a staggered refresh deadline.
///
/// Dirty iff the tracked counter moved past the stored snapshot, or the
/// refresh deadline has been reached.
#[derive(Debug, Clone)]
pub struct TrackedEntry<T> {
    value: T,
    source: ChangeCounter,
    seen: u32,
    refresh_at: Tick,
}

impl<T: Default> Default for TrackedEntry<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            source: ChangeCounter::detached(),
            seen: NEVER_SEEN,
            refresh_at: 0,
        }
    }
}

impl<T> TrackedEntry<T> {
    /// The last computed result. Meaningful only when the entry is clean.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Snapshot of the tracked counter at the last refresh.
    pub fn seen_watermark(&self) -> u32 {
        self.seen
    }

    /// Tick at which the entry expires regardless of the counter.
    pub fn refresh_at(&self) -> Tick {
        self.refresh_at
    }

    /// Overwrite the result and re-arm both staleness causes: re-read the
    /// live counter as the new snapshot and schedule the next staggered
    /// deadline `delay` ticks out.
    pub fn update(&mut self, source: &ChangeCounter, stagger_id: i32, delay: Tick, value: T) {
        self.value = value;
        self.rearm(source, stagger_id, delay);
    }

    /// Like [`TrackedEntry::update`], but refills the stored result in
    /// place instead of replacing it - the idiom for collection-shaped
    /// results whose buffer is reused across refreshes.
    pub fn update_with(
        &mut self,
        source: &ChangeCounter,
        stagger_id: i32,
        delay: Tick,
        refill: impl FnOnce(&mut T),
    ) {
        refill(&mut self.value);
        self.rearm(source, stagger_id, delay);
    }

    fn rearm(&mut self, source: &ChangeCounter, stagger_id: i32, delay: Tick) {
        self.source = source.clone();
        self.seen = self.source.watermark();
        self.refresh_at = tick::next_refresh(delay, stagger_id);
    }
}

impl<T> Staleness for TrackedEntry<T> {
    #[inline]
    fn is_dirty(&self) -> bool {
        self.seen != self.source.watermark() || tick::is_past(self.refresh_at)
    }
}

/// Two-threshold entry: an early deadline gated by a structural-change
/// check, and a late unconditional deadline.
///
/// Dirty iff the late deadline has passed, or the early deadline has passed
/// and the tracked counter moved. The counter is consulted only once the
/// early threshold is crossed, so the cheap structural check runs more
/// often than the expensive unconditional refresh while the result stays
/// pinned between the two.
#[derive(Debug, Clone)]
pub struct DualDeadlineEntry<T> {
    value: T,
    source: ChangeCounter,
    seen: u32,
    early_at: Tick,
    late_at: Tick,
}

impl<T: Default> Default for DualDeadlineEntry<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            source: ChangeCounter::detached(),
            seen: NEVER_SEEN,
            early_at: 0,
            late_at: 0,
        }
    }
}

impl<T> DualDeadlineEntry<T> {
    /// Freshly refreshed entry holding `value`, with both deadlines
    /// scheduled from the tuning's proximity intervals and staggered by
    /// `stagger_id`.
    pub fn refreshed(
        value: T,
        source: &ChangeCounter,
        stagger_id: i32,
        tuning: &CacheTuning,
    ) -> Self {
        Self {
            value,
            source: source.clone(),
            seen: source.watermark(),
            early_at: tick::next_refresh_spread(
                tuning.early_interval,
                stagger_id,
                tuning.early_spread,
            ),
            late_at: tick::next_refresh_spread(
                tuning.late_interval,
                stagger_id,
                tuning.late_spread,
            ),
        }
    }

    /// Overwrite in place with a freshly refreshed state.
    pub fn update(
        &mut self,
        value: T,
        source: &ChangeCounter,
        stagger_id: i32,
        tuning: &CacheTuning,
    ) {
        *self = Self::refreshed(value, source, stagger_id, tuning);
    }

    /// The last computed result. Meaningful only when the entry is clean.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Tick at which the counter check starts applying.
    pub fn early_at(&self) -> Tick {
        self.early_at
    }

    /// Tick at which the entry expires unconditionally.
    pub fn late_at(&self) -> Tick {
        self.late_at
    }
}

impl<T> Staleness for DualDeadlineEntry<T> {
    #[inline]
    fn is_dirty(&self) -> bool {
        tick::is_past(self.late_at)
            || (tick::is_past(self.early_at) && self.seen != self.source.watermark())
    }
}

/// Counter-only entry with no deadline.
///
/// Holds a result stamped with the watermark of whichever counter the call
/// site tracks; staleness is judged against a caller-supplied counter on
/// every check, so the entry stores no handle of its own.
#[derive(Debug, Clone)]
pub struct VersionStampedEntry<T> {
    value: T,
    seen: u32,
}

impl<T: Default> Default for VersionStampedEntry<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            seen: NEVER_SEEN,
        }
    }
}

impl<T> VersionStampedEntry<T> {
    /// True while `source` still sits at the stamped watermark.
    #[inline]
    pub fn is_current(&self, source: &ChangeCounter) -> bool {
        self.seen == source.watermark()
    }

    /// Overwrite the result and stamp it with `source`'s current watermark.
    pub fn stamp(&mut self, source: &ChangeCounter, value: T) {
        self.value = value;
        self.seen = source.watermark();
    }

    /// The stamped result. Meaningful only while the entry is current.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Deadline-only entry: the result is held for a fixed number of ticks and
/// recomputed when the hold expires, with no change tracking at all.
#[derive(Debug, Clone)]
pub struct ThrottledEntry<T> {
    value: T,
    valid_until: Tick,
}

impl<T: Default> Default for ThrottledEntry<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
            valid_until: 0,
        }
    }
}

impl<T> ThrottledEntry<T> {
    /// True once the hold period has elapsed.
    #[inline]
    pub fn is_stale(&self) -> bool {
        tick::is_past(self.valid_until)
    }

    /// Overwrite the result and hold it for `hold_for` ticks.
    pub fn refresh(&mut self, value: T, hold_for: Tick) {
        self.value = value;
        self.valid_until = tick::now() + hold_for;
    }

    /// Expire the hold immediately, forcing the next lookup to recompute.
    pub fn invalidate(&mut self) {
        self.valid_until = 0;
    }

    /// The held result. Meaningful only while the hold lasts.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Staleness for ThrottledEntry<T> {
    #[inline]
    fn is_dirty(&self) -> bool {
        self.is_stale()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use memotick_core::tick::{advance_to, now, stagger};
    use proptest::prelude::*;

    proptest! {
        /// Property: with the counter untouched, an entry refreshed at tick
        /// 0 with period `p` first reports dirty at a tick in
        /// [p, p + stagger_max], never before p.
        #[test]
        fn prop_refresh_bounds(period in 1u64..5000, id in any::<i32>()) {
            let counter = ChangeCounter::new();
            let mut entry: TrackedEntry<u8> = TrackedEntry::default();
            entry.update(&counter, id, period, 0);

            let expected = period + stagger(id, period);
            prop_assert_eq!(entry.refresh_at(), now() + expected);
            prop_assert!(expected >= period);

            advance_to(entry.refresh_at() - 1);
            prop_assert!(!entry.is_dirty());
            advance_to(entry.refresh_at());
            prop_assert!(entry.is_dirty());
        }

        /// Property: updating a dirty entry always leaves it immediately
        /// clean at the update tick.
        #[test]
        fn prop_update_restores_validity(
            period in 1u64..5000,
            id in any::<i32>(),
            mutations in 0u8..16,
        ) {
            let counter = ChangeCounter::new();
            let mut entry: TrackedEntry<u8> = TrackedEntry::default();
            prop_assert!(entry.is_dirty());

            for _ in 0..mutations {
                counter.record_change();
            }
            entry.update(&counter, id, period, 1);
            prop_assert!(!entry.is_dirty());
        }
    }
}
