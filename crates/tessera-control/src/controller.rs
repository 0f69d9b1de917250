//! The adaptive search-depth state machine.
//!
//! One [`SearchController`] lives for the whole session. For every `go` it
//! runs the engine at plymax 1, 2, 3 ... and lets the current
//! [`PlayingState`] decide after each iteration whether to go deeper, stop,
//! replay a proven mate, or re-search once without repeating moves.

use std::mem;
use std::time::{Duration, Instant};

use tessera_core::{Board, Game, Move, notation};
use tessera_engine::{SearchControl, SearchEngine, SearchRequest};
use tracing::{debug, error, info};

use crate::budget::TimeBudget;
use crate::deadline::Deadline;
use crate::error::ControlError;
use crate::pv::{Pv, build_pv};
use crate::repetition::{RepetitionSet, compute_repeating_moves};
use crate::state::{MateStep, MatingLine, PlayingState, StateKind};

/// Deepest search the controller will ask for.
pub const MAX_PLYMAX: u8 = 20;

/// Fixed-depth searches run these depths before jumping to the requested one.
const FIXED_WARMUP: u8 = 3;

/// What the protocol asks of one move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveRequest {
    /// Search exactly this deep (1..=20) instead of adapting to the clock.
    pub fixed_depth: Option<u8>,
    /// Timeouts for the adaptive states.
    pub budget: TimeBudget,
    /// Search until stopped.
    pub infinite: bool,
}

/// Score of a reported line, from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns.
    Centipawns(i32),
    /// Mate in this many moves; negative when being mated.
    Mate(i32),
}

/// Progress after one completed iteration.
#[derive(Debug)]
pub struct Report<'a> {
    /// Plymax of the iteration.
    pub depth: u8,
    /// Score of `pv`.
    pub score: Score,
    /// Time since the move started.
    pub elapsed: Duration,
    /// Nodes searched for this move so far.
    pub nodes: u64,
    /// The current line.
    pub pv: &'a Pv,
    /// The position searched.
    pub board: &'a Board,
}

impl Report<'_> {
    /// Nodes per second over the whole move.
    pub fn nps(&self) -> u64 {
        let ms = self.elapsed.as_millis().max(1) as u64;
        self.nodes.saturating_mul(1000) / ms
    }

    /// The line in UCI notation.
    pub fn terse_pv(&self) -> Vec<String> {
        notation::terse_line(self.board, &self.pv.moves)
    }
}

/// The controller's answer for one move.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// The move to play; `None` when no usable move exists.
    pub best_move: Option<Move>,
    /// The line behind the move.
    pub pv: Pv,
    /// Nodes searched for this move.
    pub nodes: u64,
    /// State left behind for the next move.
    pub state: StateKind,
}

/// Drives a [`SearchEngine`] move after move.
#[derive(Debug)]
pub struct SearchController<E> {
    engine: E,
    state: PlayingState,
    last_game: Option<Game>,
}

impl<E: SearchEngine> SearchController<E> {
    /// A controller that starts in `ADAPTIVE_NO_TARGET`.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlayingState::default(),
            last_game: None,
        }
    }

    /// Forget everything about the current game.
    pub fn reset(&mut self) {
        self.state = PlayingState::default();
        self.last_game = None;
    }

    /// The state carried to the next move.
    pub fn state(&self) -> &PlayingState {
        &self.state
    }

    /// The engine being driven.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Choose a move for the current position of `game`.
    ///
    /// `deadline` is armed and cleared as the state machine requires; when
    /// it fires it must set the timeout bit of `control`. `on_report` sees
    /// every completed iteration.
    pub fn choose_move<D, F>(
        &mut self,
        game: &Game,
        request: &MoveRequest,
        control: &SearchControl,
        deadline: &mut D,
        mut on_report: F,
    ) -> Verdict
    where
        D: Deadline + ?Sized,
        F: FnMut(&Report<'_>),
    {
        self.enter(game, request);
        let board = game.board();

        if let Some((mv, rest)) = self.follow_mating_line(board) {
            info!(mv = %notation::terse(board, mv), remaining = rest.len(), "playing out mate");
            deadline.clear();
            return Verdict {
                best_move: Some(mv),
                pv: Pv {
                    moves: rest,
                    value: 0,
                    depth: 0,
                },
                nodes: 0,
                state: self.state.kind(),
            };
        }

        let verdict = self.iterate(game, request, control, deadline, &mut on_report);
        deadline.clear();

        match verdict.best_move {
            Some(mv) => info!(
                mv = %notation::terse(board, mv),
                depth = verdict.pv.depth,
                value = verdict.pv.value_for(board.side_to_move()),
                state = %verdict.state,
                "move chosen"
            ),
            None => error!(fen = %board, "no move to play"),
        }
        verdict
    }

    /// Detect a new game, or reconcile the carried state with the request.
    fn enter(&mut self, game: &Game, request: &MoveRequest) {
        let fixed = request.fixed_depth.is_some();
        let new_game = self
            .last_game
            .as_ref()
            .is_none_or(|previous| !game.extends(previous));

        if new_game {
            debug!(fixed, "new game");
            self.state = PlayingState::initial(fixed);
        } else {
            self.state = mem::take(&mut self.state).reconcile(fixed);
        }
        self.last_game = Some(game.clone());
    }

    /// Play the next move of an active mating line, or drop the line.
    fn follow_mating_line(&mut self, board: &Board) -> Option<(Move, Vec<Move>)> {
        let fixed = self.state.is_fixed();
        let mut line = match mem::take(&mut self.state) {
            PlayingState::PlayingOutMateAdaptive(line) | PlayingState::PlayingOutMateFixed(line) => line,
            other => {
                self.state = other;
                return None;
            }
        };

        let wrap = |line: MatingLine| {
            if fixed {
                PlayingState::PlayingOutMateFixed(line)
            } else {
                PlayingState::PlayingOutMateAdaptive(line)
            }
        };

        match line.advance(board) {
            MateStep::Play(mv) => {
                let rest = line.rest().to_vec();
                self.state = wrap(line);
                Some((mv, rest))
            }
            step => {
                debug!(?step, "mating line dropped");
                self.state = wrap(line).without_mate();
                None
            }
        }
    }

    /// Arm the timeout that belongs to the current state.
    fn arm_deadline<D: Deadline + ?Sized>(&self, request: &MoveRequest, deadline: &mut D) {
        let after = if request.infinite || self.state.is_fixed() {
            Duration::ZERO
        } else if matches!(self.state, PlayingState::AdaptiveNoTarget) {
            request.budget.medium
        } else {
            request.budget.short
        };
        deadline.arm(after);
    }

    /// The iteration loop proper.
    fn iterate<D, F>(
        &mut self,
        game: &Game,
        request: &MoveRequest,
        control: &SearchControl,
        deadline: &mut D,
        on_report: &mut F,
    ) -> Verdict
    where
        D: Deadline + ?Sized,
        F: FnMut(&Report<'_>),
    {
        let board = game.board();
        let side = board.side_to_move();
        let fixed = request.fixed_depth.map(|d| d.clamp(1, MAX_PLYMAX));
        let analysing = request.infinite;
        let started = Instant::now();

        self.arm_deadline(request, deadline);

        let mut plymax: u8 = 1;
        let mut completed: u8 = 0;
        let mut current = Pv::default();
        let mut fallback: Option<Pv> = None;
        let mut excluded: Vec<Move> = Vec::new();
        let mut avoidance_tried = false;
        let mut engine_move: Option<Move> = None;
        let mut nodes: u64 = 0;

        loop {
            let repeating = self.state.is_repeating();
            let search = if repeating {
                SearchRequest::new(board, plymax).excluding(&excluded)
            } else {
                SearchRequest::new(board, plymax)
            };
            let invocation = self.engine.invoke(&search, control);
            nodes += invocation.trace.nodes();
            if !invocation.is_aborted() && invocation.best_move.is_some() {
                engine_move = invocation.best_move;
            }

            let ready = if invocation.is_aborted() {
                debug!(plymax, state = %self.state.kind(), "iteration aborted");
                if repeating {
                    if let Some(saved) = fallback.take() {
                        current = saved;
                    }
                    self.state = mem::take(&mut self.state).without_repetition();
                } else {
                    self.on_abort(plymax, analysing);
                }
                true
            } else {
                let pv = build_pv(board, invocation.trace.events(), plymax);
                if pv.is_empty() && !repeating {
                    // Book move: nothing was searched, take the engine's word.
                    debug!(plymax, "no analysis available");
                    return Verdict {
                        best_move: usable_move(board, invocation.best_move),
                        pv: Pv::default(),
                        nodes,
                        state: self.state.kind(),
                    };
                } else if repeating {
                    let saved = fallback.take().unwrap_or_default();
                    if !pv.is_empty() && pv.value_for(side) > saved.value_for(side) {
                        debug!(
                            before = saved.value_for(side),
                            after = pv.value_for(side),
                            "re-search avoids repetition"
                        );
                        current = pv;
                    } else {
                        debug!("re-search no better, keeping repeating line");
                        current = saved;
                    }
                    self.state = mem::take(&mut self.state).without_repetition();
                    report(on_report, board, &current, started, nodes);
                    true
                } else {
                    completed = plymax;
                    current = pv;
                    report(on_report, board, &current, started, nodes);

                    if current.mates_for_side_to_move(board) {
                        return self.start_mating_line(board, current, plymax, nodes);
                    }
                    self.advance(&mut plymax, fixed, analysing, started.elapsed(), request.budget.low)
                }
            };

            if !ready {
                continue;
            }

            if !avoidance_tried && !self.state.is_repeating() && !control.stop_requested() {
                avoidance_tried = true;
                if let Some(set) = repetition_to_avoid(game, &current) {
                    fallback = Some(current.clone());
                    excluded = set.into_moves();
                    self.state = mem::take(&mut self.state).into_repeating();
                    plymax = completed.saturating_sub(1).max(1);
                    control.clear_timeout();
                    self.arm_deadline(request, deadline);
                    debug!(plymax, excluded = excluded.len(), state = %self.state.kind(), "re-searching");
                    continue;
                }
            }
            break;
        }

        let best_move = usable_move(board, current.first_move().or(engine_move));
        Verdict {
            best_move,
            pv: current,
            nodes,
            state: self.state.kind(),
        }
    }

    /// Apply the abort rule of the current state. The move is always ready
    /// afterwards; the line of the last completed depth stands.
    fn on_abort(&mut self, plymax: u8, analysing: bool) {
        if analysing {
            return;
        }
        let reached = plymax.saturating_sub(1).max(1);
        if let PlayingState::AdaptiveWithTarget { target } = &mut self.state {
            *target = reached;
        } else if matches!(self.state, PlayingState::AdaptiveNoTarget) {
            self.state = PlayingState::AdaptiveWithTarget { target: reached };
        }
    }

    /// Apply the completion rule of the current state: either set the next
    /// plymax and return `false`, or return `true` when the move is ready.
    fn advance(
        &mut self,
        plymax: &mut u8,
        fixed: Option<u8>,
        analysing: bool,
        elapsed: Duration,
        low: Duration,
    ) -> bool {
        let depth = *plymax;

        // Infinite analysis deepens until stopped and leaves the target alone.
        if analysing && !self.state.is_fixed() {
            if depth >= MAX_PLYMAX {
                return true;
            }
            *plymax = depth + 1;
            return false;
        }

        let fixed_depth = fixed.unwrap_or(depth);
        let (state, next) = match mem::take(&mut self.state) {
            PlayingState::AdaptiveNoTarget => {
                if depth >= MAX_PLYMAX {
                    (PlayingState::AdaptiveWithTarget { target: depth }, None)
                } else {
                    (PlayingState::AdaptiveNoTarget, Some(depth + 1))
                }
            }
            PlayingState::AdaptiveWithTarget { target } => {
                if depth < target {
                    (PlayingState::AdaptiveWithTarget { target }, Some(depth + 1))
                } else if elapsed < low && depth < MAX_PLYMAX {
                    debug!(target = depth + 1, ?elapsed, "time to spare, extending target");
                    (PlayingState::AdaptiveWithTarget { target: depth + 1 }, Some(depth + 1))
                } else {
                    (PlayingState::AdaptiveWithTarget { target }, None)
                }
            }
            PlayingState::Fixed => (PlayingState::Fixed, fixed_step(depth, fixed_depth)),
            PlayingState::FixedWithLooping { cap } => {
                if depth < cap.min(fixed_depth) {
                    (PlayingState::FixedWithLooping { cap }, Some(depth + 1))
                } else {
                    debug!(cap, "no mate within cap, back to fixed depth");
                    (PlayingState::Fixed, fixed_step(depth, fixed_depth))
                }
            }
            other => (other, None),
        };
        self.state = state;

        match next {
            Some(next) => {
                *plymax = next;
                false
            }
            None => true,
        }
    }

    /// Record a proven mate and play its first move.
    fn start_mating_line(&mut self, board: &Board, pv: Pv, plymax: u8, nodes: u64) -> Verdict {
        let line = MatingLine::new(board, pv.moves.clone(), plymax);
        info!(
            mate_in = pv.mate_in(board),
            depth = plymax,
            line = %notation::natural_line(board, &pv.moves),
            "forced mate found"
        );
        let best_move = line.first_move();
        self.state = if self.state.is_fixed() {
            PlayingState::PlayingOutMateFixed(line)
        } else {
            PlayingState::PlayingOutMateAdaptive(line)
        };
        Verdict {
            best_move,
            pv,
            nodes,
            state: self.state.kind(),
        }
    }
}

/// The next depth of a fixed-depth search, `None` once `fixed` is reached.
fn fixed_step(depth: u8, fixed: u8) -> Option<u8> {
    if depth >= fixed {
        None
    } else if depth < FIXED_WARMUP {
        Some(depth + 1)
    } else {
        Some(fixed)
    }
}

/// The repetition set to exclude, when the line is winning but its first
/// move would repeat a position.
fn repetition_to_avoid(game: &Game, pv: &Pv) -> Option<RepetitionSet> {
    let board = game.board();
    let mv = pv.first_move()?;
    if pv.value_for(board.side_to_move()) <= 0 || !board.is_legal(mv) {
        return None;
    }
    if game.repetitions_after(mv) <= 1 {
        return None;
    }
    let set = compute_repeating_moves(game);
    if set.is_none() {
        debug!("every move repeats, keeping the repeating move");
    }
    set
}

/// Check a move the engine chose; log and drop it when unusable.
fn usable_move(board: &Board, mv: Option<Move>) -> Option<Move> {
    match validate_move(board, mv) {
        Ok(mv) => Some(mv),
        Err(err) => {
            error!(error = %err, "engine failure");
            None
        }
    }
}

fn validate_move(board: &Board, mv: Option<Move>) -> Result<Move, ControlError> {
    let mv = mv.ok_or_else(|| ControlError::NoMove {
        fen: board.to_string(),
    })?;
    if board.is_legal(mv) {
        Ok(mv)
    } else {
        Err(ControlError::IllegalMove {
            mv,
            fen: board.to_string(),
        })
    }
}

/// Hand one completed iteration to the caller.
fn report<F>(on_report: &mut F, board: &Board, pv: &Pv, started: Instant, nodes: u64)
where
    F: FnMut(&Report<'_>),
{
    let score = match pv.mate_in(board) {
        Some(n) => Score::Mate(n),
        None => Score::Centipawns(pv.value_for(board.side_to_move())),
    };
    debug!(
        depth = pv.depth,
        ?score,
        nodes,
        line = %notation::natural_line(board, &pv.moves),
        "iteration completed"
    );
    on_report(&Report {
        depth: pv.depth,
        score,
        elapsed: started.elapsed(),
        nodes,
        pv,
        board,
    });
}
