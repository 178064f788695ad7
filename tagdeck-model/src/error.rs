use thiserror::Error;

/// Errors produced by model constructors and parsers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("hex tag must be {expected} characters, got {actual}")]
    HexLength { expected: usize, actual: usize },
    #[error("invalid hex digit {digit:?} at position {position}")]
    HexDigit { digit: char, position: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
