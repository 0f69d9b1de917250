//! Negamax alpha-beta search that reports its progress as trace events.

use tessera_core::{Board, Move, is_in_check, legal_moves};
use tracing::debug;

use crate::control::SearchControl;
use crate::eval::{components, evaluate, piece_value};
use crate::search::{Invocation, Outcome, SearchEngine, SearchRequest};
use crate::trace::{Trace, TraceEvent};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 20_000;

/// Base score for checkmate (adjusted by level for mate distance).
pub const MATE_SCORE: i32 = 10_000;

/// Returned through the recursion when the abort flag is seen.
struct Aborted;

/// Per-invocation search state.
struct SearchContext<'a> {
    control: &'a SearchControl,
    /// Depth-1 searches ignore the abort flag.
    cancellable: bool,
    excluded: &'a [Move],
    trace: Trace,
    root_best: Option<Move>,
}

/// A plain fixed-depth alpha-beta searcher.
///
/// No transposition table, no quiescence: a node at the horizon is scored
/// statically unless its side to move is in check, in which case the line is
/// extended by one ply (once per line). The trace therefore sometimes holds
/// events one level deeper than `plymax`.
#[derive(Debug, Clone)]
pub struct AlphaBetaEngine {
    #[cfg(feature = "book")]
    use_book: bool,
}

impl AlphaBetaEngine {
    /// Create an engine that consults its opening book when it has one.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "book")]
            use_book: true,
        }
    }

    /// Create an engine that always searches.
    pub fn without_book() -> Self {
        Self {
            #[cfg(feature = "book")]
            use_book: false,
        }
    }

    #[cfg(feature = "book")]
    fn book_move(&self, board: &Board) -> Option<Move> {
        if self.use_book {
            crate::book::book_move(board)
        } else {
            None
        }
    }

    #[cfg(not(feature = "book"))]
    fn book_move(&self, _board: &Board) -> Option<Move> {
        None
    }
}

impl Default for AlphaBetaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine for AlphaBetaEngine {
    fn invoke(&mut self, request: &SearchRequest<'_>, control: &SearchControl) -> Invocation {
        if let Some(mv) = self.book_move(request.board) {
            debug!(mv = %mv, "book move");
            return Invocation {
                trace: Trace::new(),
                best_move: Some(mv),
                outcome: Outcome::Completed,
            };
        }

        let mut ctx = SearchContext {
            control,
            cancellable: request.plymax > 1,
            excluded: request.excluded,
            trace: Trace::new(),
            root_best: None,
        };

        let depth = request.plymax.max(1);
        let outcome = match negamax(request.board, 1, depth, false, -INF, INF, &mut ctx) {
            Ok(score) => {
                debug!(plymax = depth, score, nodes = ctx.trace.nodes(), "search completed");
                Outcome::Completed
            }
            Err(Aborted) => {
                debug!(plymax = depth, nodes = ctx.trace.nodes(), "search aborted");
                Outcome::Aborted
            }
        };

        Invocation {
            trace: ctx.trace,
            best_move: ctx.root_best,
            outcome,
        }
    }
}

/// Order captures and promotions first, most valuable victim first.
fn order_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_key(|mv| {
        let victim = board
            .color_on(mv.to)
            .filter(|&c| c != board.side_to_move())
            .and_then(|_| board.piece_on(mv.to))
            .map_or(0, piece_value);
        let promotion = mv.promotion.map_or(0, piece_value);
        -(victim * 8 + promotion)
    });
}

/// Negamax alpha-beta.
///
/// `level` is the ply of `board` counted from 1 at the root; moves played
/// from here are reported at this level. Returns the score for the side to
/// move.
fn negamax(
    board: &Board,
    level: u8,
    depth: u8,
    extended: bool,
    alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> Result<i32, Aborted> {
    ctx.trace.record(TraceEvent::NodeCreated);

    if ctx.cancellable && ctx.control.is_aborted() {
        return Err(Aborted);
    }

    let mut moves = legal_moves(board);
    if level == 1 && !ctx.excluded.is_empty() {
        moves.retain(|mv| !ctx.excluded.contains(mv));
    }

    // No legal moves: checkmate or stalemate
    if moves.is_empty() {
        return Ok(if is_in_check(board) {
            -(MATE_SCORE - level as i32)
        } else {
            0
        });
    }

    // Horizon: score statically, extending lines that end in check
    let (depth, extended) = if depth == 0 {
        if is_in_check(board) && !extended {
            (1, true)
        } else {
            return Ok(evaluate(board));
        }
    } else {
        (depth, extended)
    };

    order_moves(board, &mut moves);

    let mover = board.side_to_move();
    let mut best_score = -INF;

    for mv in moves {
        let mut child = board.clone();
        child.play_unchecked(mv);
        let score = -negamax(
            &child,
            level + 1,
            depth - 1,
            extended,
            -beta,
            -alpha.max(best_score),
            ctx,
        )?;

        if score > best_score {
            best_score = score;
            let (material_delta, board_control_delta) = components(&child, mover);
            ctx.trace.record(TraceEvent::BestMoveSoFar {
                level,
                mv,
                raw_score: score,
                material_delta,
                board_control_delta,
            });
            if level == 1 {
                ctx.root_best = Some(mv);
            }
        }

        if best_score >= beta {
            break;
        }
    }

    Ok(best_score)
}
