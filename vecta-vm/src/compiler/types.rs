// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared types for the instruction compiler.

use thiserror::Error;
use vecta_parser::{Diagnostic, TextPosition};

/// Error during compilation. Any error halts instruction generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String, position: TextPosition },

    #[error("{name} takes at most {max} arguments, got {got}")]
    TooManyArguments {
        name: String,
        max: usize,
        got: usize,
        position: TextPosition,
    },

    #[error("cannot assign to function '{name}'")]
    AssignToFunction { name: String, position: TextPosition },

    #[error("cannot assign to builtin '{name}'")]
    AssignToBuiltin { name: String, position: TextPosition },

    #[error("cannot assign to a {what}")]
    NotAssignable {
        what: &'static str,
        position: TextPosition,
    },

    #[error("for loop needs range(lo, hi) or rrange(lo, hi)")]
    InvalidLoop { position: TextPosition },

    #[error("internal compiler error: {message}")]
    Internal {
        message: String,
        position: TextPosition,
    },
}

impl CompileError {
    pub fn position(&self) -> TextPosition {
        match self {
            CompileError::UnknownFunction { position, .. }
            | CompileError::TooManyArguments { position, .. }
            | CompileError::AssignToFunction { position, .. }
            | CompileError::AssignToBuiltin { position, .. }
            | CompileError::NotAssignable { position, .. }
            | CompileError::InvalidLoop { position }
            | CompileError::Internal { position, .. } => *position,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.position(), self.to_string())
    }
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
