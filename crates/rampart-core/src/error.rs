//! Error types for position parsing and validation.

use thiserror::Error;

/// A square string that is not of the form `[a-h][1-8]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square: {0:?}")]
pub struct ParseSquareError(pub String);

/// Errors raised while parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN has {0} fields, expected at least 4")]
    MissingFields(usize),
    #[error("invalid piece placement: {0}")]
    BadPlacement(String),
    #[error("invalid side to move: {0:?}")]
    BadSideToMove(String),
    #[error("invalid castling field: {0:?}")]
    BadCastling(String),
    #[error("invalid en passant field: {0:?}")]
    BadEnPassant(String),
    #[error("invalid clock field: {0:?}")]
    BadClock(String),
    #[error("illegal position: {0}")]
    IllegalPosition(&'static str),
}
