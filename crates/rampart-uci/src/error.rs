//! UCI protocol errors.

/// Errors raised while handling UCI input.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command lacked the `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// A FEN string failed to parse.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The offending FEN string.
        fen: String,
    },

    /// A move in the `position` command is not legal in its position.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The offending UCI move string.
        uci_move: String,
    },

    /// A `go` parameter was given without its value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue {
        /// Name of the parameter.
        param: String,
    },

    /// A `go` parameter value failed to parse.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue {
        /// Name of the parameter.
        param: String,
        /// The offending value.
        value: String,
    },

    /// A `setoption` command was malformed or named an unknown option.
    #[error("invalid setoption: {reason}")]
    InvalidOption {
        /// What was wrong with the command.
        reason: String,
    },

    /// Reading from stdin failed.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
