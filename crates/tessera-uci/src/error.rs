//! Protocol errors.

use tessera_core::GameError;

/// Errors that can occur during protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// The position or its move list could not be set up.
    #[error("invalid position: {source}")]
    InvalidPosition {
        /// What the game record rejected.
        #[from]
        source: GameError,
    },

    /// A `go` parameter is missing its value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue {
        /// The parameter name.
        param: String,
    },

    /// A `go` parameter value could not be parsed.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue {
        /// The parameter name.
        param: String,
        /// The offending value.
        value: String,
    },

    /// `setoption` without a `name`.
    #[error("malformed setoption command")]
    MalformedOption,

    /// `setoption` for an option the engine does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name as given.
        name: String,
    },

    /// `setoption` with a value the option does not accept.
    #[error("invalid value for option {name}: {value}")]
    InvalidOptionValue {
        /// The option name.
        name: String,
        /// The offending value.
        value: String,
    },

    /// An I/O error on the protocol streams.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
