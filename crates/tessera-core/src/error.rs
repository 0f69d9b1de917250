//! Errors raised while building a game record.

/// Errors that can occur while setting up or extending a [`Game`](crate::Game).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A FEN string could not be parsed into a position.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A move string is not syntactically a UCI move.
    #[error("unparseable move: {text}")]
    UnparseableMove {
        /// The text that failed to parse.
        text: String,
    },

    /// A move is well formed but not legal in the current position.
    #[error("illegal move {text} in position {fen}")]
    IllegalMove {
        /// The move as given.
        text: String,
        /// FEN of the position the move was tried in.
        fen: String,
    },
}
