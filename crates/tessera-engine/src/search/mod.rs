//! The engine interface and its alpha-beta implementation.

pub mod alpha_beta;

use tessera_core::{Board, Move};

use crate::control::SearchControl;
use crate::trace::Trace;

/// Version of the [`SearchEngine`] contract implemented by this crate.
///
/// Bumped whenever the meaning of trace events or of [`Invocation`] changes.
pub const INTERFACE_VERSION: u32 = 1;

/// One bounded search request.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    /// Position to search from.
    pub board: &'a Board,
    /// Maximum depth in plies.
    pub plymax: u8,
    /// Moves that must not be searched at the root ply.
    pub excluded: &'a [Move],
}

impl<'a> SearchRequest<'a> {
    /// A request with no excluded moves.
    pub fn new(board: &'a Board, plymax: u8) -> Self {
        Self {
            board,
            plymax,
            excluded: &[],
        }
    }

    /// The same request with root moves in `excluded` left out.
    pub fn excluding(mut self, excluded: &'a [Move]) -> Self {
        self.excluded = excluded;
        self
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The search ran to `plymax`.
    Completed,
    /// The abort flag was seen; the trace is partial and must be discarded.
    Aborted,
}

/// Everything one invocation hands back.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Events emitted during the search.
    pub trace: Trace,
    /// The engine's own choice, if it found one.
    pub best_move: Option<Move>,
    /// Whether the search completed.
    pub outcome: Outcome,
}

impl Invocation {
    /// Whether the search was cut short.
    pub fn is_aborted(&self) -> bool {
        self.outcome == Outcome::Aborted
    }
}

/// A move-search core driven by the controller.
///
/// Implementations must:
/// - emit a [`TraceEvent::BestMoveSoFar`](crate::TraceEvent::BestMoveSoFar)
///   whenever a move becomes the best so far at a node, first move included
/// - honour `excluded` at the root ply only
/// - poll `control` and return [`Outcome::Aborted`] once it is set, except
///   when `plymax == 1`, which always runs to completion
pub trait SearchEngine {
    /// Run one search to `request.plymax`.
    fn invoke(&mut self, request: &SearchRequest<'_>, control: &SearchControl) -> Invocation;

    /// The contract version the engine was written against.
    fn interface_version(&self) -> u32 {
        INTERFACE_VERSION
    }
}

impl<E: SearchEngine + ?Sized> SearchEngine for Box<E> {
    fn invoke(&mut self, request: &SearchRequest<'_>, control: &SearchControl) -> Invocation {
        (**self).invoke(request, control)
    }

    fn interface_version(&self) -> u32 {
        (**self).interface_version()
    }
}
