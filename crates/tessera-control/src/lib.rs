//! Search control for tessera: principal-variation reconstruction,
//! repetition avoidance, and the adaptive depth state machine.

pub mod budget;
pub mod controller;
pub mod deadline;
pub mod error;
pub mod pv;
pub mod repetition;
pub mod state;

pub use budget::{Clock, TimeBudget};
pub use controller::{MAX_PLYMAX, MoveRequest, Report, Score, SearchController, Verdict};
pub use deadline::{Deadline, NoDeadline};
pub use error::ControlError;
pub use pv::{Pv, build_pv, centipawns};
pub use repetition::{RepetitionSet, compute_repeating_moves};
pub use state::{MateStep, MatingLine, PlayingState, StateKind};
