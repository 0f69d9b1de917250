//! UCI-like protocol handling for tessera.
//!
//! Three threads cooperate: an input reader that parses lines into
//! [`Command`]s, the [`UciEngine`] processor that executes them one at a time,
//! and a [`Timer`] that aborts searches running past their budget. They share
//! only the [`CommandQueue`] and the search's abort flag.

pub mod command;
pub mod engine;
pub mod error;
pub mod log;
pub mod queue;
pub mod reader;
pub mod timer;

pub use command::{Command, GoParams, UciOption, parse_command};
pub use engine::{EngineConfig, UciEngine};
pub use error::UciError;
pub use log::LogSink;
pub use queue::CommandQueue;
pub use timer::Timer;
