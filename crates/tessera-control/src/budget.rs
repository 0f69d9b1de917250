//! Clock parameters to controller timeouts.

use std::time::Duration;

/// Per-move budget when the `go` command carries no clock at all.
const DEFAULT_MOVE_BUDGET: Duration = Duration::from_millis(2_000);

/// Assumed moves left in the game when the GUI does not say.
const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Safety margin kept back from the remaining time, in milliseconds.
const OVERHEAD_MS: u64 = 50;

/// Clock information from one `go` command, for the side to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    /// Time left on our clock.
    pub remaining: Option<Duration>,
    /// Our increment per move.
    pub increment: Duration,
    /// Moves until the next time control.
    pub moves_to_go: Option<u32>,
    /// Exact time to spend on this move.
    pub move_time: Option<Duration>,
    /// Search until `stop`.
    pub infinite: bool,
}

/// The three time figures the depth state machine works with.
///
/// | Field    | Used by                                          |
/// |----------|--------------------------------------------------|
/// | `medium` | timeout while probing for a target depth         |
/// | `short`  | timeout while searching to a known target        |
/// | `low`    | below this elapsed time the target is extended   |
///
/// A zero timeout never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeBudget {
    /// Timeout for `ADAPTIVE_WITH_TARGET`.
    pub short: Duration,
    /// Timeout for `ADAPTIVE_NO_TARGET`.
    pub medium: Duration,
    /// Elapsed time under which a reached target is extended.
    pub low: Duration,
}

impl TimeBudget {
    /// No timeouts and no target extension.
    pub const UNLIMITED: TimeBudget = TimeBudget {
        short: Duration::ZERO,
        medium: Duration::ZERO,
        low: Duration::ZERO,
    };

    /// Derive the budget from a per-move allowance `b`:
    /// `short = b`, `medium = 3b/2`, `low = b/4`.
    pub fn from_allowance(allowance: Duration) -> Self {
        let ms = allowance.as_millis() as u64;
        Self {
            short: Duration::from_millis(ms.max(1)),
            medium: Duration::from_millis((ms * 3 / 2).max(1)),
            low: Duration::from_millis(ms / 4),
        }
    }

    /// Budget for one move.
    ///
    /// Priority order:
    /// 1. `infinite` -> [`TimeBudget::UNLIMITED`]
    /// 2. `move_time` -> that allowance
    /// 3. `remaining` -> [`move_allowance`]
    /// 4. nothing -> a fixed default allowance
    pub fn from_clock(clock: &Clock) -> Self {
        if clock.infinite {
            return Self::UNLIMITED;
        }
        if let Some(mt) = clock.move_time {
            return Self::from_allowance(mt);
        }
        if let Some(remaining) = clock.remaining {
            return Self::from_allowance(move_allowance(
                remaining,
                clock.increment,
                clock.moves_to_go,
            ));
        }
        Self::from_allowance(DEFAULT_MOVE_BUDGET)
    }

    /// Whether no timeout will ever fire.
    pub fn is_unlimited(&self) -> bool {
        self.short.is_zero() && self.medium.is_zero()
    }
}

/// Time to spend on one move.
///
/// `usable / moves_to_go + 3/4 * increment`, where `usable` is the remaining
/// time less a small overhead, capped at half of `usable`. Never below 1 ms.
pub fn move_allowance(remaining: Duration, increment: Duration, moves_to_go: Option<u32>) -> Duration {
    let remaining_ms = remaining.as_millis() as u64;
    let usable = remaining_ms.saturating_sub(OVERHEAD_MS).max(1);
    let mtg = moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1) as u64;
    let inc_ms = increment.as_millis() as u64;

    let allowance = (usable / mtg + inc_ms * 3 / 4).min(usable / 2).max(1);
    Duration::from_millis(allowance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowance_without_increment() {
        // usable = 299950, /30 = 9998
        let b = move_allowance(Duration::from_secs(300), Duration::ZERO, None);
        assert_eq!(b, Duration::from_millis(9_998));
    }

    #[test]
    fn allowance_with_increment() {
        // 9998 + 1500
        let b = move_allowance(Duration::from_secs(300), Duration::from_secs(2), None);
        assert_eq!(b, Duration::from_millis(11_498));
    }

    #[test]
    fn allowance_is_capped_at_half_the_clock() {
        let b = move_allowance(Duration::from_millis(1_050), Duration::from_secs(10), Some(1));
        assert_eq!(b, Duration::from_millis(500));
    }

    #[test]
    fn allowance_with_almost_no_time() {
        let b = move_allowance(Duration::from_millis(5), Duration::ZERO, None);
        assert_eq!(b, Duration::from_millis(1));
    }

    #[test]
    fn allowance_with_movestogo() {
        let b = move_allowance(Duration::from_secs(60), Duration::ZERO, Some(10));
        assert_eq!(b, Duration::from_millis(5_995));
    }

    #[test]
    fn budget_shape() {
        let budget = TimeBudget::from_allowance(Duration::from_millis(1_000));
        assert_eq!(budget.short, Duration::from_millis(1_000));
        assert_eq!(budget.medium, Duration::from_millis(1_500));
        assert_eq!(budget.low, Duration::from_millis(250));
        assert!(!budget.is_unlimited());
    }

    #[test]
    fn infinite_wins_over_clock() {
        let clock = Clock {
            remaining: Some(Duration::from_secs(60)),
            infinite: true,
            ..Clock::default()
        };
        assert!(TimeBudget::from_clock(&clock).is_unlimited());
    }

    #[test]
    fn movetime_wins_over_remaining() {
        let clock = Clock {
            remaining: Some(Duration::from_secs(60)),
            move_time: Some(Duration::from_millis(400)),
            ..Clock::default()
        };
        assert_eq!(TimeBudget::from_clock(&clock).short, Duration::from_millis(400));
    }

    #[test]
    fn bare_go_uses_default() {
        let budget = TimeBudget::from_clock(&Clock::default());
        assert_eq!(budget.short, DEFAULT_MOVE_BUDGET);
    }
}
