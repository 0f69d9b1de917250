//! The search engine tessera drives, behind a versioned interface.
//!
//! The controller only ever sees [`SearchEngine::invoke`]: a bounded search
//! that returns the trace of events it produced and its own choice of move.
//! [`AlphaBetaEngine`] is the engine shipped with the binary.

#[cfg(feature = "book")]
mod book;
pub mod control;
pub mod eval;
pub mod search;
pub mod trace;

pub use control::SearchControl;
pub use search::alpha_beta::AlphaBetaEngine;
pub use search::{INTERFACE_VERSION, Invocation, Outcome, SearchEngine, SearchRequest};
pub use trace::{Trace, TraceEvent};
