// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Collection handlers: BuildList, BuildMap, BuildVector, IndexRead,
//! IndexWrite.

use im::OrdMap;
use vecta_core::value::matrix_from_items;
use vecta_core::{MapKey, Value, index};

use crate::opcode::OpCode;
use crate::vm::{Interpreter, Result, RuntimeError};

impl Interpreter {
    /// Execute a collection instruction.
    pub(crate) fn execute_collections(&mut self, op: &OpCode) -> Result<()> {
        match op {
            OpCode::BuildList(n) => {
                let items = self.stack.pop_n(*n)?;
                self.stack.push_value(Value::List(items.into_iter().collect()))
            }
            OpCode::BuildVector(n) => {
                let items = self.stack.pop_n(*n)?;
                let matrix = matrix_from_items(items)?;
                self.stack.push_value(Value::Matrix(matrix))
            }
            OpCode::BuildMap(n) => {
                let flat = self.stack.pop_n(n * 2)?;
                let mut entries = OrdMap::new();
                let mut pairs = flat.into_iter();
                while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
                    entries.insert(MapKey::from_value(&key)?, value);
                }
                self.stack.push_value(Value::Map(entries))
            }
            OpCode::IndexRead(n) => {
                let indices = self.stack.pop_n(*n)?;
                let mut value = self.stack.pop_value()?;
                for i in &indices {
                    value = index::index(&value, i)?;
                }
                self.stack.push_value(value)
            }
            OpCode::IndexWrite { name, depth } => {
                let value = self.stack.pop_value()?;
                let path = self.stack.pop_n(*depth)?;
                let container = self.stack.pop_value()?;
                let updated = index::assign_path(&container, &path, value.clone())?;
                self.store_variable(name, updated)?;
                self.stack.push_value(value)
            }
            _ => Err(RuntimeError::Internal(format!(
                "execute_collections: unexpected instruction {}",
                op
            ))),
        }
    }
}
