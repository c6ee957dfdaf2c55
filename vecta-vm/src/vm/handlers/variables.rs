// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Variable handlers: LoadVariable, LoadPreviousResult, SetVariable,
//! IncrementVariable.
//!
//! Names resolve in the innermost frame first and then in the entry
//! frame; there is no other enclosing scope. Stores always go to the
//! innermost frame.

use std::rc::Rc;

use vecta_core::{Value, ops};
use vecta_parser::BinaryOp;

use crate::opcode::OpCode;
use crate::vm::{Interpreter, Result, RuntimeError};

impl Interpreter {
    /// Execute a variable instruction.
    pub(crate) fn execute_variables(&mut self, op: &OpCode) -> Result<()> {
        match op {
            OpCode::LoadVariable(name) => {
                let value = self.load_variable(name)?;
                self.stack.push_value(value)
            }
            OpCode::LoadPreviousResult(depth) => {
                let frame = self.frame()?;
                let slot = match depth {
                    None => frame.base,
                    Some(d) => frame.temp_base + d,
                };
                let value = self
                    .stack
                    .get(slot)?
                    .cloned()
                    .ok_or(RuntimeError::NoPreviousResult)?;
                self.stack.push_value(value)
            }
            OpCode::SetVariable { name, keep } => {
                let value = self.stack.pop_value()?;
                if *keep {
                    self.store_variable(name, value.clone())?;
                    self.stack.push_value(value)
                } else {
                    self.store_variable(name, value)
                }
            }
            OpCode::IncrementVariable(name) => {
                let step = self.stack.pop_value()?;
                let current = self.load_variable(name)?;
                let next = ops::binary(BinaryOp::Add, &current, &step)?;
                self.store_variable(name, next)
            }
            _ => Err(RuntimeError::Internal(format!(
                "execute_variables: unexpected instruction {}",
                op
            ))),
        }
    }

    pub(crate) fn load_variable(&self, name: &str) -> Result<Value> {
        let frame = self.frame()?;
        let slot = frame
            .slot_of(name)
            .or_else(|| self.frames.first().and_then(|global| global.slot_of(name)))
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))?;
        self.stack
            .get(slot)?
            .cloned()
            .ok_or_else(|| RuntimeError::UnsetVariable(name.to_string()))
    }

    /// Store into the innermost frame, giving an unseen name the next free
    /// variable slot.
    pub(crate) fn store_variable(&mut self, name: &Rc<str>, value: Value) -> Result<()> {
        let frame = self.frame_mut()?;
        let slot = match frame.slot_of(name) {
            Some(slot) => slot,
            None => {
                let slot = frame.next_local;
                if slot >= frame.temp_base {
                    return Err(RuntimeError::Internal(format!(
                        "no slot reserved for variable '{}'",
                        name
                    )));
                }
                frame.variables.insert(Rc::clone(name), slot);
                frame.next_local += 1;
                slot
            }
        };
        self.stack.set(slot, Some(value))
    }
}
