//! Root moves that would repeat a position.

use tessera_core::{Game, Move, legal_moves};
use tracing::debug;

/// Legal moves from the current position that would repeat an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepetitionSet {
    moves: Vec<Move>,
}

impl RepetitionSet {
    /// The repeating moves, in generation order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Whether `mv` is in the set.
    pub fn contains(&self, mv: Move) -> bool {
        self.moves.contains(&mv)
    }

    /// Number of repeating moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no move repeats.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Take the moves out, for use as an exclusion list.
    pub fn into_moves(self) -> Vec<Move> {
        self.moves
    }
}

/// Collect every legal move whose resulting position has occurred before.
///
/// Each move is tried on a copy of the board; the game record is not
/// touched. Returns `None` when every legal move repeats, since excluding
/// them all would leave nothing to search.
pub fn compute_repeating_moves(game: &Game) -> Option<RepetitionSet> {
    let candidates = legal_moves(game.board());
    let moves: Vec<Move> = candidates
        .iter()
        .copied()
        .filter(|&mv| game.repetitions_after(mv) > 1)
        .collect();

    if moves.len() == candidates.len() {
        debug!(count = moves.len(), "every legal move repeats");
        return None;
    }

    debug!(count = moves.len(), "repeating moves found");
    Some(RepetitionSet { moves })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shuffled_game() -> Game {
        let mut game = Game::starting_position();
        for text in ["g1f3", "g8f6", "f3g1"] {
            game.play_uci(text).unwrap();
        }
        game
    }

    #[test]
    fn knight_retreat_repeats() {
        let game = shuffled_game();
        let set = compute_repeating_moves(&game).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains("f6g8".parse().unwrap()));
    }

    #[test]
    fn only_repeating_moves_are_included() {
        let game = shuffled_game();
        let set = compute_repeating_moves(&game).unwrap();
        for &mv in set.moves() {
            assert!(game.repetitions_after(mv) > 1);
        }
        for mv in legal_moves(game.board()) {
            if !set.contains(mv) {
                assert_eq!(game.repetitions_after(mv), 1);
            }
        }
    }

    #[test]
    fn fresh_game_has_no_repeating_moves() {
        let set = compute_repeating_moves(&Game::starting_position()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn game_record_is_untouched() {
        let game = shuffled_game();
        let before = game.history().to_vec();
        let _ = compute_repeating_moves(&game);
        assert_eq!(game.history(), &before[..]);
    }

    #[test]
    fn all_moves_repeating_abandons_avoidance() {
        // Lone kings shuffling: white king a1, black king h8, white to move
        // with only a1b1 and a1a2 and a1b2 available.
        let mut game = Game::from_fen("7k/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        for text in [
            "a1b1", "h8g8", "b1a1", "g8h8", // back at the start
            "a1a2", "h8g8", "a2a1", "g8h8", // again
            "a1b2", "h8g8", "b2a1", "g8h8", // and again
        ] {
            game.play_uci(text).unwrap();
        }
        assert!(compute_repeating_moves(&game).is_none());
    }
}
