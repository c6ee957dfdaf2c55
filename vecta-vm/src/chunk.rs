// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Compiled instruction tapes and the program that owns them.

use std::fmt::Write;
use std::rc::Rc;

use vecta_core::FunctionRef;
use vecta_parser::{ExprId, ParseResult};

use crate::opcode::OpCode;

/// One instruction plus the node it was generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub expr: ExprId,
    pub op: OpCode,
}

/// The instruction tape of one function body or of the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub name: Rc<str>,
    pub steps: Vec<Step>,
    /// Declared parameter names; they occupy the first local slots.
    pub params: Rc<[String]>,
    /// Every name the body can assign, parameters first.
    pub locals: Vec<Rc<str>>,
    /// Largest number of temporaries live at once.
    pub max_depth: usize,
}

impl Chunk {
    pub fn new(name: &str, params: Vec<String>) -> Self {
        Self {
            name: Rc::from(name),
            steps: Vec::new(),
            params: params.into(),
            locals: Vec::new(),
            max_depth: 0,
        }
    }

    /// Append an instruction.
    pub fn emit(&mut self, op: OpCode, expr: ExprId) {
        self.steps.push(Step { expr, op });
    }

    /// Index the next emitted instruction will get (for jump targets).
    pub fn current_offset(&self) -> usize {
        self.steps.len()
    }

    /// Point the jump at `offset` to the next instruction to be emitted.
    pub fn patch_jump(&mut self, offset: usize) {
        let target = self.steps.len();
        match &mut self.steps[offset].op {
            OpCode::Jump(t) | OpCode::JumpIfFalse(t) => *t = target,
            other => debug_assert!(false, "patch_jump called on non-jump: {:?}", other),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }
}

/// Every compiled chunk of a program. Function ids index `chunks`
/// directly; the entry point comes last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub chunks: Vec<Chunk>,
}

impl Program {
    pub fn main_index(&self) -> usize {
        self.chunks.len().saturating_sub(1)
    }

    pub fn main(&self) -> Option<&Chunk> {
        self.chunks.last()
    }

    pub fn function_count(&self) -> usize {
        self.chunks.len().saturating_sub(1)
    }

    /// Function value for user function `id`.
    pub fn function_ref(&self, id: usize) -> Option<FunctionRef> {
        if id >= self.function_count() {
            return None;
        }
        let chunk = &self.chunks[id];
        Some(FunctionRef::User {
            id,
            name: Rc::clone(&chunk.name),
            params: Rc::clone(&chunk.params),
        })
    }

    /// Human-readable listing of every chunk with the source line of each
    /// step.
    pub fn disassemble(&self, parse: &ParseResult) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            let _ = writeln!(
                out,
                "== {}({}) locals={} depth={} ==",
                chunk.name,
                chunk.params.join(", "),
                chunk.local_count(),
                chunk.max_depth
            );
            for (i, step) in chunk.steps.iter().enumerate() {
                let line = parse.ast.node(step.expr).start.line + 1;
                let _ = writeln!(out, "{:04} {:>4}  {}", i, line, step.op);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_jump_is_absolute() {
        let mut chunk = Chunk::new("main", Vec::new());
        chunk.emit(OpCode::PushNumber(1.0), ExprId(0));
        let jump = chunk.current_offset();
        chunk.emit(OpCode::JumpIfFalse(0), ExprId(0));
        chunk.emit(OpCode::PushNumber(2.0), ExprId(0));
        chunk.emit(OpCode::PushNumber(3.0), ExprId(0));
        chunk.patch_jump(jump);
        assert_eq!(chunk.steps[jump].op, OpCode::JumpIfFalse(4));
    }

    #[test]
    fn test_function_ref_excludes_main() {
        let program = Program {
            chunks: vec![
                Chunk::new("f", vec!["x".to_string()]),
                Chunk::new("main", Vec::new()),
            ],
        };
        assert_eq!(program.main_index(), 1);
        assert!(matches!(
            program.function_ref(0),
            Some(FunctionRef::User { id: 0, .. })
        ));
        assert!(program.function_ref(1).is_none());
    }
}
