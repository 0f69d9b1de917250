//! The controller's persistent playing state.

use std::fmt;

use tessera_core::{Board, Move};

/// A forced mate found by a search, replayed move by move while the
/// opponent follows it.
#[derive(Debug, Clone)]
pub struct MatingLine {
    start: Board,
    variation: Vec<Move>,
    /// Plies of `variation` already played, ours and theirs.
    cursor: usize,
    /// Our moves still to play, the mating move included.
    remaining: usize,
    found_at: u8,
}

/// What to do with a mating line on the next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MateStep {
    /// The opponent followed the line; play this move.
    Play(Move),
    /// The opponent played something else.
    Deviated,
    /// Nothing left to play from the line.
    Exhausted,
}

impl MatingLine {
    /// Record a mating `variation` from `start`, found by a search of
    /// depth `found_at`. The first move is considered played immediately.
    pub fn new(start: &Board, variation: Vec<Move>, found_at: u8) -> Self {
        let ours = variation.len().div_ceil(2);
        Self {
            start: start.clone(),
            variation,
            cursor: 1,
            remaining: ours.saturating_sub(1),
            found_at,
        }
    }

    /// The move that opens the mate.
    pub fn first_move(&self) -> Option<Move> {
        self.variation.first().copied()
    }

    /// The whole mating variation from the start position.
    pub fn variation(&self) -> &[Move] {
        &self.variation
    }

    /// Depth of the search that proved the mate.
    pub fn found_at(&self) -> u8 {
        self.found_at
    }

    /// Our moves still to play.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The line from the move played last, onwards.
    pub fn rest(&self) -> &[Move] {
        let from = self.cursor.saturating_sub(1).min(self.variation.len());
        &self.variation[from..]
    }

    /// The position after the first `plies` plies of the line.
    fn position_after(&self, plies: usize) -> Board {
        let mut board = self.start.clone();
        for &mv in &self.variation[..plies] {
            board.play_unchecked(mv);
        }
        board
    }

    /// Decide the next move given the position actually reached.
    ///
    /// The opponent followed the line when `current` is the position the
    /// line predicts after their reply.
    pub fn advance(&mut self, current: &Board) -> MateStep {
        let reply_end = self.cursor + 1;
        if self.remaining == 0 || reply_end >= self.variation.len() {
            return MateStep::Exhausted;
        }
        if self.position_after(reply_end).hash() != current.hash() {
            return MateStep::Deviated;
        }
        let mv = self.variation[reply_end];
        self.cursor = reply_end + 1;
        self.remaining -= 1;
        MateStep::Play(mv)
    }
}

/// Tag-only view of [`PlayingState`], for logging and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    AdaptiveNoTarget,
    AdaptiveWithTarget,
    Fixed,
    FixedWithLooping,
    PlayingOutMateAdaptive,
    PlayingOutMateFixed,
    RepeatingAdaptive,
    RepeatingFixed,
    RepeatingFixedWithLooping,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::AdaptiveNoTarget => "ADAPTIVE_NO_TARGET",
            StateKind::AdaptiveWithTarget => "ADAPTIVE_WITH_TARGET",
            StateKind::Fixed => "FIXED",
            StateKind::FixedWithLooping => "FIXED_WITH_LOOPING",
            StateKind::PlayingOutMateAdaptive => "PLAYING_OUT_MATE_ADAPTIVE",
            StateKind::PlayingOutMateFixed => "PLAYING_OUT_MATE_FIXED",
            StateKind::RepeatingAdaptive => "REPEATING_ADAPTIVE",
            StateKind::RepeatingFixed => "REPEATING_FIXED",
            StateKind::RepeatingFixedWithLooping => "REPEATING_FIXED_WITH_LOOPING",
        };
        f.write_str(name)
    }
}

/// How the controller picks its search depth, carried from move to move.
#[derive(Debug, Clone, Default)]
pub enum PlayingState {
    /// Probe how deep the time budget allows.
    #[default]
    AdaptiveNoTarget,
    /// Search to a known target depth, adjusting it by time.
    AdaptiveWithTarget {
        /// Depth to reach.
        target: u8,
    },
    /// Search 1, 2, 3, then the requested depth.
    Fixed,
    /// Search 1, 2, 3 ... up to `cap`, looking for a lost mate.
    FixedWithLooping {
        /// Depth at which a mate was last found.
        cap: u8,
    },
    /// Replaying a mate, adaptive depth otherwise.
    PlayingOutMateAdaptive(MatingLine),
    /// Replaying a mate, fixed depth otherwise.
    PlayingOutMateFixed(MatingLine),
    /// One re-search avoiding repetitions, then back to adaptive.
    RepeatingAdaptive {
        /// Target to resume with, if one was set.
        target: Option<u8>,
    },
    /// One re-search avoiding repetitions, then back to `Fixed`.
    RepeatingFixed,
    /// One re-search avoiding repetitions, then back to `FixedWithLooping`.
    RepeatingFixedWithLooping {
        /// Cap to resume with.
        cap: u8,
    },
}

impl PlayingState {
    /// The state a new game starts in.
    pub fn initial(fixed: bool) -> Self {
        if fixed {
            PlayingState::Fixed
        } else {
            PlayingState::AdaptiveNoTarget
        }
    }

    /// The tag of this state.
    pub fn kind(&self) -> StateKind {
        match self {
            PlayingState::AdaptiveNoTarget => StateKind::AdaptiveNoTarget,
            PlayingState::AdaptiveWithTarget { .. } => StateKind::AdaptiveWithTarget,
            PlayingState::Fixed => StateKind::Fixed,
            PlayingState::FixedWithLooping { .. } => StateKind::FixedWithLooping,
            PlayingState::PlayingOutMateAdaptive(_) => StateKind::PlayingOutMateAdaptive,
            PlayingState::PlayingOutMateFixed(_) => StateKind::PlayingOutMateFixed,
            PlayingState::RepeatingAdaptive { .. } => StateKind::RepeatingAdaptive,
            PlayingState::RepeatingFixed => StateKind::RepeatingFixed,
            PlayingState::RepeatingFixedWithLooping { .. } => StateKind::RepeatingFixedWithLooping,
        }
    }

    /// Whether depth follows a fixed request in this state.
    pub fn is_fixed(&self) -> bool {
        matches!(
            self,
            PlayingState::Fixed
                | PlayingState::FixedWithLooping { .. }
                | PlayingState::PlayingOutMateFixed(_)
                | PlayingState::RepeatingFixed
                | PlayingState::RepeatingFixedWithLooping { .. }
        )
    }

    /// Whether a repetition-avoiding re-search is pending.
    pub fn is_repeating(&self) -> bool {
        matches!(
            self,
            PlayingState::RepeatingAdaptive { .. }
                | PlayingState::RepeatingFixed
                | PlayingState::RepeatingFixedWithLooping { .. }
        )
    }

    /// The active mating line, if any.
    pub fn mating_line(&self) -> Option<&MatingLine> {
        match self {
            PlayingState::PlayingOutMateAdaptive(line) | PlayingState::PlayingOutMateFixed(line) => {
                Some(line)
            }
            _ => None,
        }
    }

    /// The adaptive target depth, if this state has one.
    pub fn target(&self) -> Option<u8> {
        match self {
            PlayingState::AdaptiveWithTarget { target } => Some(*target),
            PlayingState::RepeatingAdaptive { target } => *target,
            _ => None,
        }
    }

    /// Bring a state carried over from the previous move in line with
    /// whether a fixed depth is requested now.
    ///
    /// A mating line survives the switch; it only changes flavour.
    pub fn reconcile(self, fixed: bool) -> Self {
        match (self, fixed) {
            (PlayingState::PlayingOutMateAdaptive(line), true) => PlayingState::PlayingOutMateFixed(line),
            (PlayingState::PlayingOutMateFixed(line), false) => PlayingState::PlayingOutMateAdaptive(line),
            (state, true) if !state.is_fixed() => PlayingState::Fixed,
            (state, false) if state.is_fixed() => PlayingState::AdaptiveNoTarget,
            (state, _) => state,
        }
    }

    /// The state to fall back to once a mating line is dropped.
    pub fn without_mate(self) -> Self {
        match self {
            PlayingState::PlayingOutMateAdaptive(line) => PlayingState::AdaptiveWithTarget {
                target: line.found_at().max(1),
            },
            PlayingState::PlayingOutMateFixed(line) => PlayingState::FixedWithLooping {
                cap: line.found_at().max(1),
            },
            state => state,
        }
    }

    /// The repeating counterpart of this state.
    pub fn into_repeating(self) -> Self {
        match self {
            PlayingState::AdaptiveNoTarget => PlayingState::RepeatingAdaptive { target: None },
            PlayingState::AdaptiveWithTarget { target } => PlayingState::RepeatingAdaptive {
                target: Some(target),
            },
            PlayingState::Fixed => PlayingState::RepeatingFixed,
            PlayingState::FixedWithLooping { cap } => PlayingState::RepeatingFixedWithLooping { cap },
            state => state,
        }
    }

    /// The non-repeating counterpart of this state.
    pub fn without_repetition(self) -> Self {
        match self {
            PlayingState::RepeatingAdaptive { target: None } => PlayingState::AdaptiveNoTarget,
            PlayingState::RepeatingAdaptive { target: Some(target) } => {
                PlayingState::AdaptiveWithTarget { target }
            }
            PlayingState::RepeatingFixed => PlayingState::Fixed,
            PlayingState::RepeatingFixedWithLooping { cap } => PlayingState::FixedWithLooping { cap },
            state => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    /// Not a real mate; only the bookkeeping matters here.
    fn line() -> MatingLine {
        let variation = vec![mv("e2e4"), mv("e7e5"), mv("d1h5"), mv("b8c6"), mv("f1c4")];
        MatingLine::new(&Board::default(), variation, 5)
    }

    fn after(moves: &[&str]) -> Board {
        let mut board = Board::default();
        for m in moves {
            board.play(mv(m));
        }
        board
    }

    #[test]
    fn mating_line_follows_expected_replies() {
        let mut line = line();
        assert_eq!(line.first_move(), Some(mv("e2e4")));
        assert_eq!(line.remaining(), 2);

        assert_eq!(line.advance(&after(&["e2e4", "e7e5"])), MateStep::Play(mv("d1h5")));
        assert_eq!(line.remaining(), 1);
        assert_eq!(
            line.advance(&after(&["e2e4", "e7e5", "d1h5", "b8c6"])),
            MateStep::Play(mv("f1c4"))
        );
        assert_eq!(line.remaining(), 0);
        assert_eq!(line.advance(&Board::default()), MateStep::Exhausted);
    }

    #[test]
    fn mating_line_detects_deviation() {
        let mut line = line();
        assert_eq!(line.advance(&after(&["e2e4", "c7c5"])), MateStep::Deviated);
    }

    #[test]
    fn reconcile_switches_families() {
        let s = PlayingState::AdaptiveWithTarget { target: 5 }.reconcile(true);
        assert_eq!(s.kind(), StateKind::Fixed);

        let s = PlayingState::FixedWithLooping { cap: 4 }.reconcile(false);
        assert_eq!(s.kind(), StateKind::AdaptiveNoTarget);

        let s = PlayingState::AdaptiveWithTarget { target: 5 }.reconcile(false);
        assert_eq!(s.target(), Some(5));

        let s = PlayingState::PlayingOutMateAdaptive(line()).reconcile(true);
        assert_eq!(s.kind(), StateKind::PlayingOutMateFixed);
        assert!(s.mating_line().is_some());
    }

    #[test]
    fn dropping_a_mate_keeps_its_depth() {
        let s = PlayingState::PlayingOutMateAdaptive(line()).without_mate();
        assert_eq!(s.target(), Some(5));
        let s = PlayingState::PlayingOutMateFixed(line()).without_mate();
        assert!(matches!(s, PlayingState::FixedWithLooping { cap: 5 }));
        assert!(s.mating_line().is_none());
    }

    #[test]
    fn repetition_round_trip() {
        for state in [
            PlayingState::AdaptiveNoTarget,
            PlayingState::AdaptiveWithTarget { target: 4 },
            PlayingState::Fixed,
            PlayingState::FixedWithLooping { cap: 3 },
        ] {
            let kind = state.kind();
            let repeating = state.into_repeating();
            assert!(repeating.is_repeating());
            assert_eq!(repeating.without_repetition().kind(), kind);
        }
    }

    #[test]
    fn names_match_protocol_logs() {
        assert_eq!(StateKind::RepeatingFixedWithLooping.to_string(), "REPEATING_FIXED_WITH_LOOPING");
    }
}
