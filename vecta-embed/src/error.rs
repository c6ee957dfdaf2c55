// vecta-embed - Embedding errors
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use thiserror::Error;
use vecta_core::ValueKind;
use vecta_parser::Diagnostic;

/// Result type for the embedding API.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A value could not be converted into the requested Rust type.
    #[error("expected {expected}, got {got}")]
    Conversion { expected: &'static str, got: ValueKind },

    /// A Number that should have been whole, or did not fit the target.
    #[error("expected {expected}, got {value}")]
    NumberRange { expected: &'static str, value: f64 },

    /// The run halted with a diagnostic (parse, compile or runtime).
    #[error("{0}")]
    Run(Diagnostic),

    /// The run completed but its last statement produced no value.
    #[error("program produced no value")]
    NoValue,

    #[error(transparent)]
    Value(#[from] vecta_core::Error),
}

impl Error {
    pub fn conversion(expected: &'static str, got: ValueKind) -> Self {
        Error::Conversion { expected, got }
    }
}
