// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime errors for the VM.

use thiserror::Error;
use vecta_core::ValueKind;

/// Runtime error during VM execution. Any runtime error halts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Value model or builtin failure.
    #[error(transparent)]
    Value(#[from] vecta_core::Error),

    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    /// A slot exists but nothing was stored in it, e.g. an omitted argument.
    #[error("variable '{0}' has no value")]
    UnsetVariable(String),

    /// An empty block or loop result was used as a value.
    #[error("expression has no value")]
    MissingValue,

    #[error("there is no previous result")]
    NoPreviousResult,

    #[error("stack overflow: more than {0} slots in use")]
    StackOverflow(usize),

    #[error("stack underflow")]
    StackUnderflow,

    #[error("call depth exceeded {0} frames")]
    CallDepthExceeded(usize),

    #[error("program exceeded the limit of {0} steps")]
    StepLimit(u64),

    #[error("{function} takes at most {max} arguments, got {got}")]
    TooManyArguments {
        function: String,
        max: usize,
        got: usize,
    },

    #[error("condition must be a Number, got {0}")]
    NonNumericCondition(ValueKind),

    #[error("functions cannot be evaluated while debugging")]
    EvaluationWhileDebugging,

    #[error("internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Argument whose span should anchor the diagnostic, if the failure
    /// came from checking a builtin's arguments.
    pub fn argument_index(&self) -> Option<usize> {
        match self {
            RuntimeError::Value(e) => e.argument_index(),
            _ => None,
        }
    }

    /// Already recorded by a nested evaluation.
    pub fn is_reported(&self) -> bool {
        matches!(self, RuntimeError::Value(vecta_core::Error::Reported))
    }
}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
