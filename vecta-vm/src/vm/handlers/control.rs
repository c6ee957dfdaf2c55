// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Control flow handlers: statement markers, jumps and calls.

use vecta_core::{Value, registry};
use vecta_parser::ExprId;

use crate::opcode::OpCode;
use crate::vm::{Interpreter, Result, RuntimeError, VmHost};

impl Interpreter {
    /// Execute a control flow instruction.
    pub(crate) fn execute_control(&mut self, op: &OpCode, expr: ExprId) -> Result<()> {
        match op {
            OpCode::EndStatement => {
                let value = self.stack.pop()?;
                let frame = self.frame()?;
                let (base, temp_base) = (frame.base, frame.temp_base);
                self.stack.set(base, value)?;
                self.stack.truncate(temp_base);
                Ok(())
            }
            OpCode::EndNestedStatement(depth) => {
                let value = self.stack.pop()?;
                let slot = self.frame()?.temp_base + depth;
                self.stack.set(slot, value)?;
                self.stack.truncate(slot + 1);
                Ok(())
            }
            OpCode::ClearLastBlockResult => self.stack.push(None),
            OpCode::Jump(target) => {
                self.frame_mut()?.ip = *target;
                Ok(())
            }
            OpCode::JumpIfFalse(target) => match self.stack.pop_value()? {
                Value::Number(n) => {
                    if n == 0.0 {
                        self.frame_mut()?.ip = *target;
                    }
                    Ok(())
                }
                other => Err(RuntimeError::NonNumericCondition(other.kind())),
            },
            OpCode::CallFunction { id, argc } => {
                let base = self
                    .stack
                    .len()
                    .checked_sub(argc + 1)
                    .ok_or(RuntimeError::StackUnderflow)?;
                self.push_frame(*id, base, *argc, expr)
            }
            OpCode::CallBuiltin { id, argc } => {
                let args = self.stack.pop_n(*argc)?;
                let mut host = VmHost {
                    interp: self,
                    call_site: expr,
                };
                let value = registry().call(*id, &mut host, &args)?;
                self.stack.push_value(value)
            }
            _ => Err(RuntimeError::Internal(format!(
                "execute_control: unexpected instruction {}",
                op
            ))),
        }
    }
}
