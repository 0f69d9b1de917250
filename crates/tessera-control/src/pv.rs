//! Principal variation reconstruction from the engine's trace.
//!
//! The engine never hands over its tree. What it does emit is a mark every
//! time a move becomes the best so far at some level, and the marks come in
//! depth-first order: the whole subtree of a move is traced before the move
//! itself is (re)marked at its own level. Walking the trace backwards and
//! taking the first mark found at level 1, then the first mark before it at
//! level 2, and so on, therefore follows the best reply at every ply.

use tessera_core::{Board, Color, Move, is_checkmate, is_in_check};
use tessera_engine::TraceEvent;

/// Saturation limit of the engine's material term.
pub const MATERIAL_LIMIT: i32 = 30;

/// Saturation limit of the engine's board control term.
pub const CONTROL_LIMIT: i32 = 6;

/// A reconstructed line of best play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pv {
    /// Moves from the search root, root first.
    pub moves: Vec<Move>,
    /// Centipawns from White's point of view.
    pub value: i32,
    /// The plymax of the search that produced this line.
    pub depth: u8,
}

impl Pv {
    /// Whether no analysis is available.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The move to play.
    pub fn first_move(&self) -> Option<Move> {
        self.moves.first().copied()
    }

    /// The value from `side`'s point of view.
    pub fn value_for(&self, side: Color) -> i32 {
        match side {
            Color::White => self.value,
            Color::Black => -self.value,
        }
    }

    /// Whether the line ends with the side to move at `board` mating.
    pub fn mates_for_side_to_move(&self, board: &Board) -> bool {
        matches!(self.mate_in(board), Some(n) if n > 0)
    }

    /// Distance to mate if the line, played from `board`, ends in checkmate.
    ///
    /// Positive: the side to move at `board` delivers mate in that many of
    /// its own moves. Negative: it gets mated after that many of its moves.
    pub fn mate_in(&self, board: &Board) -> Option<i32> {
        if self.moves.is_empty() {
            return None;
        }
        let mut board = board.clone();
        for &mv in &self.moves {
            if !board.is_legal(mv) {
                return None;
            }
            board.play_unchecked(mv);
        }
        if !is_checkmate(&board) {
            return None;
        }
        let plies = self.moves.len() as i32;
        if plies % 2 == 1 {
            Some((plies + 1) / 2)
        } else {
            Some(-(plies / 2))
        }
    }
}

/// Combine the engine's two score terms into centipawns.
///
/// Both terms are clamped to the engine's saturation limits first, so
/// feeding already-clamped values back in changes nothing.
pub fn centipawns(material_delta: i32, board_control_delta: i32) -> i32 {
    let material = material_delta.clamp(-MATERIAL_LIMIT, MATERIAL_LIMIT);
    let control = board_control_delta.clamp(-CONTROL_LIMIT, CONTROL_LIMIT);
    (4 * material + control) * 100 / 8
}

/// One mark kept by the backward scan.
#[derive(Debug, Clone, Copy)]
struct Mark {
    level: u8,
    mv: Move,
    material_delta: i32,
    board_control_delta: i32,
}

/// The chain of final marks at levels 1, 2, 3 ..., root first.
fn backward_scan(events: &[TraceEvent]) -> Vec<Mark> {
    let mut target: u8 = 1;
    let mut marks = Vec::new();
    for event in events.iter().rev() {
        if let TraceEvent::BestMoveSoFar {
            level,
            mv,
            material_delta,
            board_control_delta,
            ..
        } = *event
            && level == target
        {
            marks.push(Mark {
                level,
                mv,
                material_delta,
                board_control_delta,
            });
            target = target.saturating_add(1);
        }
    }
    marks
}

/// Rebuild the principal variation of one invocation.
///
/// `board` is the position the invocation searched and `plymax` its depth.
/// The line is cut at the first move that does not replay legally, then to
/// `plymax` plies, keeping one more when the position after `plymax` plies
/// has the side to move in check (the engine extends such lines). The score
/// comes from the last mark kept.
///
/// An empty result (value 0, depth 0) means the trace held no analysis.
pub fn build_pv(board: &Board, events: &[TraceEvent], plymax: u8) -> Pv {
    let marks = backward_scan(events);

    let mut position = board.clone();
    let mut in_check_after = Vec::with_capacity(marks.len());
    for mark in &marks {
        if !position.is_legal(mark.mv) {
            break;
        }
        position.play_unchecked(mark.mv);
        in_check_after.push(is_in_check(&position));
    }
    let legal = in_check_after.len();

    let horizon = usize::from(plymax.max(1));
    let keep = if legal > horizon && in_check_after[horizon - 1] {
        horizon + 1
    } else {
        legal.min(horizon)
    };

    if keep == 0 {
        return Pv::default();
    }

    let scorer = marks[keep - 1];
    let relative = centipawns(scorer.material_delta, scorer.board_control_delta);
    // Odd levels are played by the side to move at the root.
    let mover = if scorer.level % 2 == 1 {
        board.side_to_move()
    } else {
        !board.side_to_move()
    };
    let value = match mover {
        Color::White => relative,
        Color::Black => -relative,
    };

    Pv {
        moves: marks[..keep].iter().map(|m| m.mv).collect(),
        value,
        depth: plymax,
    }
}
