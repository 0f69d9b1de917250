//! Chess rules for tessera: game record, repetition counting and move notation.
//!
//! Move generation and legality come from [`cozy_chess`]; this crate adds the
//! bookkeeping the search controller needs on top of a bare position.

mod error;
mod game;
pub mod notation;

pub use cozy_chess::{Board, Color, GameStatus, Move, Piece, Square};
pub use error::GameError;
pub use game::{Game, STARTING_FEN, is_checkmate, is_in_check, legal_moves};
