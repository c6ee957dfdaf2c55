// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Instruction handlers, organised by category.

pub mod arithmetic;
pub mod collections;
pub mod control;
pub mod variables;
