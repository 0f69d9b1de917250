//! Move notation.
//!
//! cozy-chess encodes castling as the king capturing its own rook. The
//! protocol speaks standard UCI ("terse") notation, where castling is the
//! king moving two files, so both directions convert here. Natural notation
//! is SAN and is only used for logging.

use cozy_chess::{Board, File, Move, Piece, Square};

use crate::error::GameError;
use crate::game::{is_checkmate, is_in_check, legal_moves};

/// Whether `mv` is a castling move in cozy-chess encoding.
fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.color_on(mv.to) == Some(board.side_to_move())
}

fn file_char(file: File) -> char {
    char::from(b'a' + file as u8)
}

fn rank_char(square: Square) -> char {
    char::from(b'1' + square.rank() as u8)
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

/// Render `mv`, legal in `board`, in standard UCI notation.
pub fn terse(board: &Board, mv: Move) -> String {
    if is_castling(board, mv) {
        let file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
            File::G
        } else {
            File::C
        };
        let to = Square::new(file, mv.from.rank());
        return Move {
            from: mv.from,
            to,
            promotion: None,
        }
        .to_string();
    }
    mv.to_string()
}

/// Parse a standard UCI move and check that it is legal in `board`.
pub fn parse_terse(board: &Board, text: &str) -> Result<Move, GameError> {
    let mv: Move = text
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| GameError::UnparseableMove {
            text: text.to_string(),
        })?;

    if board.is_legal(mv) {
        return Ok(mv);
    }

    // King moving two files: rewrite as the king taking its own rook.
    if board.piece_on(mv.from) == Some(Piece::King) && mv.from.rank() == mv.to.rank() {
        let rights = board.castle_rights(board.side_to_move());
        let rook_file = match mv.to.file() {
            File::G => rights.short,
            File::C => rights.long,
            _ => None,
        };
        if let Some(file) = rook_file {
            let castle = Move {
                from: mv.from,
                to: Square::new(file, mv.from.rank()),
                promotion: None,
            };
            if board.is_legal(castle) {
                return Ok(castle);
            }
        }
    }

    Err(GameError::IllegalMove {
        text: text.to_string(),
        fen: board.to_string(),
    })
}

/// Render a line of moves starting at `board` in UCI notation.
///
/// Stops at the first move that is not legal where it would be played.
pub fn terse_line(board: &Board, moves: &[Move]) -> Vec<String> {
    let mut board = board.clone();
    let mut out = Vec::with_capacity(moves.len());
    for &mv in moves {
        if !board.is_legal(mv) {
            break;
        }
        out.push(terse(&board, mv));
        board.play_unchecked(mv);
    }
    out
}

/// Render `mv`, legal in `board`, in standard algebraic notation.
pub fn natural(board: &Board, mv: Move) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return mv.to_string();
    };

    let mut text = String::new();
    if is_castling(board, mv) {
        if (mv.to.file() as u8) > (mv.from.file() as u8) {
            text.push_str("O-O");
        } else {
            text.push_str("O-O-O");
        }
    } else {
        let capture = board.color_on(mv.to) == Some(!board.side_to_move())
            || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

        if piece == Piece::Pawn {
            if capture {
                text.push(file_char(mv.from.file()));
            }
        } else {
            text.push(piece_letter(piece));
            let rivals: Vec<Square> = legal_moves(board)
                .into_iter()
                .filter(|other| {
                    other.to == mv.to
                        && other.from != mv.from
                        && board.piece_on(other.from) == Some(piece)
                })
                .map(|other| other.from)
                .collect();
            if !rivals.is_empty() {
                if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
                    text.push(file_char(mv.from.file()));
                } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
                    text.push(rank_char(mv.from));
                } else {
                    text.push(file_char(mv.from.file()));
                    text.push(rank_char(mv.from));
                }
            }
        }

        if capture {
            text.push('x');
        }
        text.push_str(&mv.to.to_string());
        if let Some(promotion) = mv.promotion {
            text.push('=');
            text.push(piece_letter(promotion));
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if is_checkmate(&after) {
        text.push('#');
    } else if is_in_check(&after) {
        text.push('+');
    }
    text
}

/// Render a line of moves starting at `board` in standard algebraic notation.
pub fn natural_line(board: &Board, moves: &[Move]) -> String {
    let mut board = board.clone();
    let mut out = Vec::with_capacity(moves.len());
    for &mv in moves {
        if !board.is_legal(mv) {
            break;
        }
        out.push(natural(&board, mv));
        board.play_unchecked(mv);
    }
    out.join(" ")
}
