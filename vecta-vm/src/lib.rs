// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Instruction compiler and stepping virtual machine for Vecta.
//!
//! A parsed document is linearized into one step list per function plus
//! one for the top-level statements, then executed by a stack machine that
//! advances a single step at a time so it can be driven by a debugger.

pub mod chunk;
pub mod compiler;
pub mod opcode;
pub mod vm;

pub use chunk::{Chunk, Program, Step};
pub use compiler::{CompileError, compile};
pub use opcode::OpCode;
pub use vm::{
    FrameInfo, Interpreter, RunState, RuntimeError, interpret, start_interpreting, step_program,
};
