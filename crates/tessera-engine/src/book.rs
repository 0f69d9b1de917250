//! A handful of opening replies played without searching.

use tessera_core::{Board, Move};

/// (moves leading to the position, reply), in UCI notation.
const LINES: &[(&[&str], &str)] = &[
    (&[], "e2e4"),
    (&["e2e4"], "e7e5"),
    (&["d2d4"], "d7d5"),
];

/// The book reply for `board`, if it is one of the known positions.
pub(crate) fn book_move(board: &Board) -> Option<Move> {
    let hash = board.hash();
    LINES.iter().find_map(|(line, reply)| {
        let mut known = Board::default();
        for text in line.iter() {
            let mv: Move = text.parse().ok()?;
            known.try_play(mv).ok()?;
        }
        (known.hash() == hash).then(|| reply.parse().ok()).flatten()
    })
}
