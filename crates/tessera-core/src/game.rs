//! Game record: start position, moves played, and the hash of every
//! position reached so far.

use cozy_chess::{Board, GameStatus, Move};
use tracing::trace;

use crate::error::GameError;
use crate::notation;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// All legal moves in `board`, in generation order.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

/// Whether the side to move is in check.
pub fn is_in_check(board: &Board) -> bool {
    !board.checkers().is_empty()
}

/// Whether the side to move has been checkmated.
pub fn is_checkmate(board: &Board) -> bool {
    board.status() == GameStatus::Won
}

/// A game in progress as described by a `position` command.
///
/// The history holds the hash of every position from the start position up
/// to and including the current one, so a position that occurs twice in the
/// history has been repeated.
#[derive(Debug, Clone)]
pub struct Game {
    start: Board,
    moves: Vec<Move>,
    board: Board,
    history: Vec<u64>,
}

impl Game {
    /// A game with no moves played from `start`.
    pub fn new(start: Board) -> Self {
        let history = vec![start.hash()];
        Self {
            board: start.clone(),
            start,
            moves: Vec::new(),
            history,
        }
    }

    /// A game from the standard starting position.
    pub fn starting_position() -> Self {
        Self::new(Board::default())
    }

    /// A game starting from the position described by `fen`.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let board = Board::from_fen(fen, false).map_err(|_| GameError::InvalidFen {
            fen: fen.to_string(),
        })?;
        Ok(Self::new(board))
    }

    /// Play a legal move, recording it and the resulting position.
    pub fn play(&mut self, mv: Move) -> Result<(), GameError> {
        if !self.board.is_legal(mv) {
            return Err(GameError::IllegalMove {
                text: mv.to_string(),
                fen: self.board.to_string(),
            });
        }
        self.board.play_unchecked(mv);
        self.moves.push(mv);
        self.history.push(self.board.hash());
        trace!(mv = %mv, plies = self.moves.len(), "move recorded");
        Ok(())
    }

    /// Parse a move in standard UCI notation and play it.
    pub fn play_uci(&mut self, text: &str) -> Result<Move, GameError> {
        let mv = notation::parse_terse(&self.board, text)?;
        self.play(mv)?;
        Ok(mv)
    }

    /// The current position.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The position the game started from.
    pub fn start(&self) -> &Board {
        &self.start
    }

    /// Moves played from the start position.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Hashes of every position reached, oldest first.
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// How many times the current position has occurred, including now.
    pub fn repetition_count(&self) -> usize {
        let current = self.board.hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// How many times the position after `mv` would have occurred if `mv`
    /// were played now. The game itself is left untouched.
    ///
    /// `mv` must be legal in the current position.
    pub fn repetitions_after(&self, mv: Move) -> usize {
        let mut next = self.board.clone();
        next.play_unchecked(mv);
        let hash = next.hash();
        1 + self.history.iter().filter(|&&h| h == hash).count()
    }

    /// Whether this game is `earlier` with zero or more moves appended.
    pub fn extends(&self, earlier: &Game) -> bool {
        self.start.hash() == earlier.start.hash() && self.moves.starts_with(&earlier.moves)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::starting_position()
    }
}
