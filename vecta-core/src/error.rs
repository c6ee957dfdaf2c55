// vecta-core - Error types for values and builtins
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for value operations and builtin functions.

use thiserror::Error;

use crate::value::ValueKind;

/// Result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the value model and builtins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Operator applied to a pair of kinds it is not defined for.
    #[error("don't know how to compute {lhs} {op} {rhs}")]
    UnsupportedBinary {
        op: &'static str,
        lhs: ValueKind,
        rhs: ValueKind,
    },

    #[error("don't know how to compute {op}{operand}")]
    UnsupportedUnary {
        op: &'static str,
        operand: ValueKind,
    },

    #[error("shape mismatch: {lhs:?} vs {rhs:?}")]
    ShapeMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("index {index} is out of range for {kind} of length {len}")]
    IndexOutOfRange {
        index: f64,
        len: usize,
        kind: ValueKind,
    },

    #[error("index must be a whole number, got {0}")]
    NonIntegralIndex(f64),

    #[error("key {0} not found in map")]
    MissingKey(String),

    #[error("cannot index {container} with {index}")]
    InvalidIndex {
        container: ValueKind,
        index: ValueKind,
    },

    #[error("map keys must be String or Number, got {0}")]
    InvalidMapKey(ValueKind),

    /// Builtin argument of the wrong kind; `arg` locates it in the call.
    #[error("expected {expected} for argument '{param}' of {function}, got {got}")]
    ArgumentType {
        function: &'static str,
        param: &'static str,
        expected: String,
        got: ValueKind,
        arg: usize,
    },

    #[error("missing argument '{param}' for {function}")]
    MissingArgument {
        function: &'static str,
        param: &'static str,
        arg: usize,
    },

    #[error("{function}: {message}")]
    Builtin {
        function: &'static str,
        message: String,
        arg: Option<usize>,
    },

    #[error("range would produce {requested} elements, more than the limit of {limit}")]
    RangeTooLarge { requested: f64, limit: usize },

    #[error("{0}")]
    InvalidValue(String),

    /// A nested function evaluation failed and already reported its error.
    #[error("function evaluation failed")]
    Reported,
}

impl Error {
    /// Create a builtin error that is not tied to a particular argument.
    pub fn builtin(function: &'static str, message: impl Into<String>) -> Self {
        Error::Builtin {
            function,
            message: message.into(),
            arg: None,
        }
    }

    /// Create a builtin error anchored at argument `arg`.
    pub fn builtin_arg(function: &'static str, arg: usize, message: impl Into<String>) -> Self {
        Error::Builtin {
            function,
            message: message.into(),
            arg: Some(arg),
        }
    }

    /// Index of the call argument this error should be reported at, if any.
    pub fn argument_index(&self) -> Option<usize> {
        match self {
            Error::ArgumentType { arg, .. } => Some(*arg),
            Error::Builtin { arg, .. } => *arg,
            _ => None,
        }
    }
}
