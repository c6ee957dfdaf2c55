// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Instruction definitions.

use std::fmt;
use std::rc::Rc;

use vecta_core::value::format_number;
use vecta_parser::{BinaryOp, UnaryOp};

/// Instructions for the Vecta VM.
///
/// Instructions operate on the value stack of the current frame. Jump
/// targets are absolute step indices within the same chunk. Depths are
/// counted in temporary slots above the frame's `temp_base`.
#[derive(Debug, Clone, PartialEq)]
pub enum OpCode {
    // =========================================================================
    // Variables
    // =========================================================================
    /// Push the value of a variable (current frame, then global frame).
    LoadVariable(Rc<str>),

    /// Push the previous statement's value: the frame result slot when
    /// `None`, otherwise the block slot at that depth.
    LoadPreviousResult(Option<usize>),

    /// Pop a value into a variable of the current frame, allocating a slot
    /// on first assignment. Pushes the value back when `keep` is set.
    SetVariable { name: Rc<str>, keep: bool },

    /// Pop a step and add it to a loop variable.
    IncrementVariable(Rc<str>),

    // =========================================================================
    // Statements
    // =========================================================================
    /// Pop a top-level statement's value into the frame result slot and
    /// reset the stack to the frame's temporary base.
    EndStatement,

    /// Pop a nested statement's value into the block slot at this depth
    /// and reset the stack to just above it.
    EndNestedStatement(usize),

    /// Push an empty slot: a block result or a callee's result slot.
    ClearLastBlockResult,

    // =========================================================================
    // Operators
    // =========================================================================
    Binary(BinaryOp),
    Unary(UnaryOp),

    // =========================================================================
    // Literals & Collections
    // =========================================================================
    PushNumber(f64),
    PushString(Rc<str>),
    /// Push a user function value by id.
    PushFunction(usize),
    /// Push a builtin function value by id.
    PushBuiltin(usize),
    /// Pop n values, push a list.
    BuildList(usize),
    /// Pop n key/value pairs, push a map.
    BuildMap(usize),
    /// Pop n values, push a matrix one dimension larger.
    BuildVector(usize),

    /// Pop n indices and a container, push `container[i0][i1]...`.
    IndexRead(usize),

    /// Pop a value, `depth` indices and the container; store the updated
    /// container in `name` and push the value.
    IndexWrite { name: Rc<str>, depth: usize },

    // =========================================================================
    // Control Flow
    // =========================================================================
    Jump(usize),

    /// Pop a number and jump when it is zero.
    JumpIfFalse(usize),

    /// Call a user function; its result slot and `argc` arguments are on
    /// the stack.
    CallFunction { id: usize, argc: usize },

    /// Pop `argc` arguments, call a builtin, push its result.
    CallBuiltin { id: usize, argc: usize },

    /// Placeholder that is never executed.
    Invalid,
}

impl OpCode {
    /// Net change in stack depth, or `None` for the statement markers,
    /// which reset the depth instead.
    pub fn stack_effect(&self) -> Option<isize> {
        Some(match self {
            OpCode::LoadVariable(_)
            | OpCode::LoadPreviousResult(_)
            | OpCode::ClearLastBlockResult
            | OpCode::PushNumber(_)
            | OpCode::PushString(_)
            | OpCode::PushFunction(_)
            | OpCode::PushBuiltin(_) => 1,

            OpCode::SetVariable { keep: true, .. }
            | OpCode::Unary(_)
            | OpCode::Jump(_)
            | OpCode::Invalid => 0,

            OpCode::SetVariable { keep: false, .. }
            | OpCode::IncrementVariable(_)
            | OpCode::Binary(_)
            | OpCode::JumpIfFalse(_) => -1,

            OpCode::BuildList(n) | OpCode::BuildVector(n) => 1 - *n as isize,
            OpCode::BuildMap(n) => 1 - 2 * *n as isize,
            OpCode::IndexRead(n) => -(*n as isize),
            OpCode::IndexWrite { depth, .. } => -(*depth as isize) - 1,
            OpCode::CallFunction { argc, .. } => -(*argc as isize),
            OpCode::CallBuiltin { argc, .. } => 1 - *argc as isize,

            OpCode::EndStatement | OpCode::EndNestedStatement(_) => return None,
        })
    }

    /// Jump target, if this is a jump.
    pub fn jump_target(&self) -> Option<usize> {
        match self {
            OpCode::Jump(t) | OpCode::JumpIfFalse(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::LoadVariable(name) => write!(f, "LOAD_VAR {}", name),
            OpCode::LoadPreviousResult(None) => write!(f, "LOAD_PREV frame"),
            OpCode::LoadPreviousResult(Some(d)) => write!(f, "LOAD_PREV +{}", d),
            OpCode::SetVariable { name, keep: true } => write!(f, "SET_VAR {}", name),
            OpCode::SetVariable { name, keep: false } => write!(f, "SET_VAR {} (drop)", name),
            OpCode::IncrementVariable(name) => write!(f, "INCR_VAR {}", name),
            OpCode::EndStatement => write!(f, "END_STMT"),
            OpCode::EndNestedStatement(d) => write!(f, "END_NESTED +{}", d),
            OpCode::ClearLastBlockResult => write!(f, "CLEAR_RESULT"),
            OpCode::Binary(op) => write!(f, "BINARY {}", op),
            OpCode::Unary(op) => write!(f, "UNARY {}", op),
            OpCode::PushNumber(n) => write!(f, "PUSH_NUM {}", format_number(*n)),
            OpCode::PushString(s) => write!(f, "PUSH_STR {:?}", s),
            OpCode::PushFunction(id) => write!(f, "PUSH_FN #{}", id),
            OpCode::PushBuiltin(id) => write!(f, "PUSH_BUILTIN #{}", id),
            OpCode::BuildList(n) => write!(f, "BUILD_LIST {}", n),
            OpCode::BuildMap(n) => write!(f, "BUILD_MAP {}", n),
            OpCode::BuildVector(n) => write!(f, "BUILD_VECTOR {}", n),
            OpCode::IndexRead(n) => write!(f, "INDEX {}", n),
            OpCode::IndexWrite { name, depth } => write!(f, "INDEX_SET {} {}", name, depth),
            OpCode::Jump(t) => write!(f, "JUMP -> {}", t),
            OpCode::JumpIfFalse(t) => write!(f, "JUMP_IF_FALSE -> {}", t),
            OpCode::CallFunction { id, argc } => write!(f, "CALL_FN #{} ({})", id, argc),
            OpCode::CallBuiltin { id, argc } => write!(f, "CALL_BUILTIN #{} ({})", id, argc),
            OpCode::Invalid => write!(f, "INVALID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_effects() {
        assert_eq!(OpCode::BuildMap(2).stack_effect(), Some(-3));
        assert_eq!(OpCode::CallBuiltin { id: 0, argc: 2 }.stack_effect(), Some(-1));
        assert_eq!(OpCode::CallFunction { id: 0, argc: 2 }.stack_effect(), Some(-2));
        assert_eq!(
            OpCode::IndexWrite {
                name: "m".into(),
                depth: 2
            }
            .stack_effect(),
            Some(-3)
        );
        assert_eq!(OpCode::EndStatement.stack_effect(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(OpCode::PushNumber(3.0).to_string(), "PUSH_NUM 3");
        assert_eq!(OpCode::Binary(BinaryOp::Lt).to_string(), "BINARY <");
        assert_eq!(OpCode::JumpIfFalse(7).to_string(), "JUMP_IF_FALSE -> 7");
    }
}
