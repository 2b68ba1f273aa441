//! Context-local tick clock and staggered refresh scheduling.
//!
//! The surrounding simulation advances one logical tick at a time, per
//! execution context. Each context owns its clock: reading it is a plain
//! thread-local load, and the host advances it explicitly between simulation
//! steps. Nothing here blocks or synchronizes.
//!
//! Refresh deadlines are staggered per entity so that many entries sharing
//! the same nominal refresh period do not all expire on the same tick. The
//! stagger is deterministic for a given id and spread; it spreads load and
//! nothing else.

use std::cell::Cell;

/// Monotonic simulation tick.
pub type Tick = u64;

/// Canonical refresh intervals, in ticks.
pub mod intervals {
    use super::Tick;

    /// Long refresh interval for counter-tracked entries.
    pub const LONG: Tick = 2000;
    /// Early proximity recheck interval (counter-gated).
    pub const PROXIMITY_EARLY: Tick = 128;
    /// Stagger spread for the early proximity recheck.
    pub const PROXIMITY_EARLY_SPREAD: Tick = 128;
    /// Late proximity refresh interval (unconditional).
    pub const PROXIMITY_LATE: Tick = 3072;
    /// Stagger spread for the late proximity refresh.
    pub const PROXIMITY_LATE_SPREAD: Tick = 2048;
    /// Hold period for throttled link lookups.
    pub const LINK_THROTTLE: Tick = 32;
}

thread_local! {
    static TICKS: Cell<Tick> = const { Cell::new(0) };
}

/// Current tick of this execution context.
#[inline]
pub fn now() -> Tick {
    TICKS.with(Cell::get)
}

/// Advance this context's clock to `tick`.
///
/// # Panics
///
/// Panics if `tick` is behind the current tick. The clock is monotonic;
/// moving it backwards is a host programming error.
pub fn advance_to(tick: Tick) {
    TICKS.with(|cell| {
        assert!(
            tick >= cell.get(),
            "tick clock cannot move backwards ({} -> {})",
            cell.get(),
            tick
        );
        cell.set(tick);
    });
}

/// Advance this context's clock by `delta` ticks.
pub fn advance_by(delta: Tick) {
    TICKS.with(|cell| cell.set(cell.get() + delta));
}

/// True once `tick` has been reached: `now() >= tick`.
#[inline]
pub fn is_past(tick: Tick) -> bool {
    now() >= tick
}

/// Deterministic per-entity offset in `0..spread`.
///
/// Ids are reinterpreted as unsigned so negative ids stagger like any other.
#[inline]
pub fn stagger(id: i32, spread: Tick) -> Tick {
    if spread == 0 {
        0
    } else {
        id as u32 as Tick % spread
    }
}

/// Deadline `delay` ticks from now, staggered by `id` over a spread equal to
/// the delay itself.
#[inline]
pub fn next_refresh(delay: Tick, id: i32) -> Tick {
    next_refresh_spread(delay, id, delay)
}

/// Deadline `delay` ticks from now, staggered by `id` over `spread`.
#[inline]
pub fn next_refresh_spread(delay: Tick, id: i32, spread: Tick) -> Tick {
    now() + delay + stagger(id, spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        assert_eq!(now(), 0);
        assert!(is_past(0));
        assert!(!is_past(1));
    }

    #[test]
    fn test_advance() {
        advance_by(10);
        assert_eq!(now(), 10);
        advance_to(25);
        assert_eq!(now(), 25);
        assert!(is_past(25));
        assert!(!is_past(26));
    }

    #[test]
    #[should_panic(expected = "cannot move backwards")]
    fn test_advance_backwards_panics() {
        advance_to(100);
        advance_to(99);
    }

    #[test]
    fn test_stagger_is_deterministic_and_bounded() {
        for id in [-3, 0, 7, 9, i32::MAX] {
            let a = stagger(id, 128);
            let b = stagger(id, 128);
            assert_eq!(a, b);
            assert!(a < 128);
        }
        assert_eq!(stagger(42, 0), 0);
    }

    #[test]
    fn test_next_refresh_bounds() {
        advance_to(500);
        let deadline = next_refresh(2000, 9);
        assert!(deadline >= 2500);
        assert!(deadline < 4500);
        assert_eq!(deadline, 2500 + stagger(9, 2000));
    }

    #[test]
    fn test_next_refresh_spread() {
        let deadline = next_refresh_spread(3072, 9, 2048);
        assert_eq!(deadline, 3072 + 9);
    }
}
