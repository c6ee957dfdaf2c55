// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Value stack for the VM.
//!
//! Slots may be empty: a block or call result slot holds nothing until a
//! statement stores into it, and omitted arguments leave their parameter
//! slot empty.

use vecta_core::Value;

use super::{Result, RuntimeError};

/// The VM's value stack, bounded by the configured capacity.
#[derive(Debug, Clone)]
pub struct ValueStack {
    values: Vec<Option<Value>>,
    capacity: usize,
}

impl ValueStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    /// Push a slot onto the stack.
    #[inline]
    pub fn push(&mut self, value: Option<Value>) -> Result<()> {
        if self.values.len() >= self.capacity {
            return Err(RuntimeError::StackOverflow(self.capacity));
        }
        self.values.push(value);
        Ok(())
    }

    #[inline]
    pub fn push_value(&mut self, value: Value) -> Result<()> {
        self.push(Some(value))
    }

    /// Pop a slot, which may be empty.
    #[inline]
    pub fn pop(&mut self) -> Result<Option<Value>> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pop a slot that must hold a value.
    #[inline]
    pub fn pop_value(&mut self) -> Result<Value> {
        self.pop()?.ok_or(RuntimeError::MissingValue)
    }

    /// Pop n values in push order.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>> {
        if n > self.values.len() {
            return Err(RuntimeError::StackUnderflow);
        }
        let start = self.values.len() - n;
        self.values
            .drain(start..)
            .map(|slot| slot.ok_or(RuntimeError::MissingValue))
            .collect()
    }

    /// Slot at an absolute index.
    #[inline]
    pub fn get(&self, index: usize) -> Result<Option<&Value>> {
        self.values
            .get(index)
            .map(Option::as_ref)
            .ok_or(RuntimeError::StackUnderflow)
    }

    /// Overwrite the slot at an absolute index.
    #[inline]
    pub fn set(&mut self, index: usize, value: Option<Value>) -> Result<()> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(RuntimeError::StackUnderflow)?;
        *slot = value;
        Ok(())
    }

    /// Take the value out of a slot, leaving it empty.
    #[inline]
    pub fn take(&mut self, index: usize) -> Result<Option<Value>> {
        self.values
            .get_mut(index)
            .map(Option::take)
            .ok_or(RuntimeError::StackUnderflow)
    }

    /// Grow with empty slots (or shrink) to exactly `len` slots.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        if len > self.capacity {
            return Err(RuntimeError::StackOverflow(self.capacity));
        }
        self.values.resize(len, None);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn truncate(&mut self, size: usize) {
        self.values.truncate(size);
    }

    pub fn slots(&self) -> &[Option<Value>] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_enforced() {
        let mut stack = ValueStack::new(2);
        stack.push_value(Value::Number(1.0)).unwrap();
        stack.push(None).unwrap();
        assert_eq!(
            stack.push_value(Value::Number(3.0)),
            Err(RuntimeError::StackOverflow(2))
        );
        assert!(stack.resize(3).is_err());
    }

    #[test]
    fn test_empty_slots() {
        let mut stack = ValueStack::new(8);
        stack.resize(3).unwrap();
        assert_eq!(stack.get(1).unwrap(), None);
        stack.set(1, Some(Value::Number(2.0))).unwrap();
        assert_eq!(stack.take(1).unwrap(), Some(Value::Number(2.0)));
        assert_eq!(stack.pop_value(), Err(RuntimeError::MissingValue));
    }

    #[test]
    fn test_pop_n_keeps_order() {
        let mut stack = ValueStack::new(8);
        for i in 0..3 {
            stack.push_value(Value::Number(i as f64)).unwrap();
        }
        let values = stack.pop_n(2).unwrap();
        assert_eq!(values, vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop_n(2), Err(RuntimeError::StackUnderflow));
    }
}
