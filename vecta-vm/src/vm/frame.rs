// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Call frames for the VM.

use std::rc::Rc;

use indexmap::IndexMap;
use vecta_parser::ExprId;

/// A call frame on the VM's call stack.
///
/// Stack layout from `base`: the result slot, one slot per variable the
/// chunk can assign, then temporaries from `temp_base` upward.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Index of the next step in the chunk.
    pub ip: usize,

    /// Index of the chunk being executed.
    pub chunk_index: usize,

    /// Absolute index of the result slot.
    pub base: usize,

    /// Absolute index of the first temporary.
    pub temp_base: usize,

    /// Next variable slot to hand out.
    pub next_local: usize,

    /// Variables assigned so far, by absolute slot.
    pub variables: IndexMap<Rc<str>, usize>,

    /// Call expression that created the frame (none for the entry point).
    pub call_site: Option<ExprId>,

    /// Pushed by a builtin evaluating a function value; unwinding stops
    /// here so the builtin's own frame keeps running.
    pub reentrant: bool,
}

impl CallFrame {
    /// Frame for a chunk whose first `params.len()` slots are already
    /// on the stack above `base`.
    pub fn new(
        chunk_index: usize,
        base: usize,
        params: &[String],
        local_count: usize,
        call_site: Option<ExprId>,
    ) -> Self {
        let variables = params
            .iter()
            .enumerate()
            .map(|(i, p)| (Rc::from(p.as_str()), base + 1 + i))
            .collect();
        Self {
            ip: 0,
            chunk_index,
            base,
            temp_base: base + 1 + local_count,
            next_local: base + 1 + params.len(),
            variables,
            call_site,
            reentrant: false,
        }
    }

    /// Slot of a variable already assigned in this frame.
    #[inline]
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.variables.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let frame = CallFrame::new(0, 4, &["a".to_string(), "b".to_string()], 3, None);
        assert_eq!(frame.slot_of("a"), Some(5));
        assert_eq!(frame.slot_of("b"), Some(6));
        assert_eq!(frame.next_local, 7);
        assert_eq!(frame.temp_base, 8);
        assert_eq!(frame.slot_of("c"), None);
    }
}
