// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Operator handlers: Binary, Unary.

use vecta_core::ops;
use vecta_parser::{ExprId, ExprKind, UnaryOp};

use crate::opcode::OpCode;
use crate::vm::{Interpreter, Result, RuntimeError};

impl Interpreter {
    /// Execute an operator instruction.
    pub(crate) fn execute_arithmetic(&mut self, op: &OpCode, expr: ExprId) -> Result<()> {
        match op {
            OpCode::Binary(op) => {
                let rhs = self.stack.pop_value()?;
                let lhs = self.stack.pop_value()?;
                let value = ops::binary(*op, &lhs, &rhs)?;
                self.stack.push_value(value)
            }
            OpCode::Unary(UnaryOp::Print) => {
                let value = self.stack.pop_value()?;
                let operand = match self.parse.ast.kind(expr) {
                    ExprKind::Unary { operand, .. } => *operand,
                    _ => expr,
                };
                self.record_print(operand, value.clone());
                self.stack.push_value(value)
            }
            OpCode::Unary(op) => {
                let operand = self.stack.pop_value()?;
                let value = ops::unary(*op, &operand)?;
                self.stack.push_value(value)
            }
            _ => Err(RuntimeError::Internal(format!(
                "execute_arithmetic: unexpected instruction {}",
                op
            ))),
        }
    }
}
