//! Static evaluation: material plus board control.
//!
//! Both terms are small integers in engine units (a pawn is worth 2) and are
//! returned for a given side, positive when that side is ahead. The search
//! combines them as `4 * material + control`.

use cozy_chess::{
    BitBoard, Board, Color, Piece, get_bishop_moves, get_king_moves, get_knight_moves,
    get_pawn_attacks, get_rook_moves,
};

/// Material values in engine units, indexed like [`Piece::ALL`].
///
/// | Piece  | units |
/// |--------|-------|
/// | Pawn   | 2     |
/// | Knight | 6     |
/// | Bishop | 6     |
/// | Rook   | 10    |
/// | Queen  | 18    |
/// | King   | 0     |
pub const MATERIAL_VALUE: [i32; 6] = [2, 6, 6, 10, 18, 0];

/// Attacked squares are counted per side and the difference is divided by
/// this before it is reported as board control.
const CONTROL_DIVISOR: i32 = 4;

/// Weight of material against board control in the combined score.
pub const MATERIAL_WEIGHT: i32 = 4;

/// Material value of a single piece.
pub fn piece_value(piece: Piece) -> i32 {
    MATERIAL_VALUE[piece as usize]
}

/// Material balance for `side`.
pub fn material(board: &Board, side: Color) -> i32 {
    Piece::ALL
        .iter()
        .map(|&piece| {
            let ours = board.colored_pieces(side, piece).len() as i32;
            let theirs = board.colored_pieces(!side, piece).len() as i32;
            piece_value(piece) * (ours - theirs)
        })
        .sum()
}

/// Every square attacked by at least one piece of `side`.
fn attacked_squares(board: &Board, side: Color) -> BitBoard {
    let occupied = board.occupied();
    let mut attacks = BitBoard::EMPTY;
    for sq in board.colored_pieces(side, Piece::Pawn) {
        attacks |= get_pawn_attacks(sq, side);
    }
    for sq in board.colored_pieces(side, Piece::Knight) {
        attacks |= get_knight_moves(sq);
    }
    for sq in board.colored_pieces(side, Piece::Bishop) {
        attacks |= get_bishop_moves(sq, occupied);
    }
    for sq in board.colored_pieces(side, Piece::Rook) {
        attacks |= get_rook_moves(sq, occupied);
    }
    for sq in board.colored_pieces(side, Piece::Queen) {
        attacks |= get_bishop_moves(sq, occupied) | get_rook_moves(sq, occupied);
    }
    attacks |= get_king_moves(board.king(side));
    attacks
}

/// Board control balance for `side`: the difference in attacked squares,
/// scaled down.
pub fn board_control(board: &Board, side: Color) -> i32 {
    let ours = attacked_squares(board, side).len() as i32;
    let theirs = attacked_squares(board, !side).len() as i32;
    (ours - theirs) / CONTROL_DIVISOR
}

/// Material and board control for `side`, in that order.
pub fn components(board: &Board, side: Color) -> (i32, i32) {
    (material(board, side), board_control(board, side))
}

/// Combined static score for the side to move.
pub fn evaluate(board: &Board) -> i32 {
    let (material, control) = components(board, board.side_to_move());
    MATERIAL_WEIGHT * material + control
}
