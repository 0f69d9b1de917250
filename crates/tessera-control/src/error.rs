//! Controller errors.

use tessera_core::Move;

/// Failures the controller reports instead of a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// The engine finished without choosing any move.
    #[error("engine produced no move in position {fen}")]
    NoMove {
        /// FEN of the position searched.
        fen: String,
    },

    /// The engine chose a move that is not legal in the position.
    #[error("engine produced illegal move {mv} in position {fen}")]
    IllegalMove {
        /// The offending move, cozy-chess encoding.
        mv: Move,
        /// FEN of the position searched.
        fen: String,
    },
}
