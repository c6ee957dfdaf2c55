// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Instruction compiler: linearizes the AST into per-function step lists.
//!
//! The compiler operates in two phases per chunk:
//! 1. Analysis: find the variables a body can assign so each gets a slot
//! 2. Code generation: emit steps with backpatched absolute jumps

pub mod analysis;
pub mod codegen;
pub mod types;

pub use codegen::Compiler;
pub use types::{CompileError, Result};

use vecta_parser::ParseResult;

use crate::chunk::Program;

/// Compile a parsed document.
pub fn compile(parse: &ParseResult) -> Result<Program> {
    Compiler::new(parse).compile()
}
