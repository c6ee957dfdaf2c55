// vecta-vm - Property-based tests for compiled control flow
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for the compiler and VM.
//!
//! Tests the following properties:
//! - Integer arithmetic through the VM matches Rust's evaluation
//! - A ranged loop runs once per element of the matching `range` call
//! - Every compiled jump targets a step inside its chunk

mod common;

use proptest::prelude::*;
use vecta_core::Value;
use vecta_parser::parse;
use vecta_vm::compile;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arithmetic_matches_host(a in -50i32..50, b in -50i32..50, c in -50i32..50) {
        let source = format!("a = {}\nb = {}\nc = {}\na + b * c - (a - c)", a, b, c);
        let interp = common::run(&source);
        let expected = f64::from(a + b * c - (a - c));
        prop_assert_eq!(interp.result(), Some(&Value::Number(expected)));
    }

    #[test]
    fn loop_count_matches_range(lo in -20i32..20, hi in -20i32..20, step in 1i32..5) {
        let source = format!(
            "n = 0\nfor i in range({lo}, {hi}, {step}) {{\nn = n + 1\n}}\nn == len(range({lo}, {hi}, {step}))"
        );
        let interp = common::run(&source);
        prop_assert_eq!(interp.result(), Some(&Value::Number(1.0)), "{:?}", interp.errors());
    }

    #[test]
    fn jumps_stay_in_bounds(depth in 1usize..6) {
        let mut source = String::from("x = 0\n");
        for level in 0..depth {
            source.push_str(&format!("for i{level} in range(0, 2) {{\nx = x > 1 ? x : x + 1\n"));
        }
        for _ in 0..depth {
            source.push_str("}\n");
        }
        let result = parse(&source);
        prop_assert!(result.errors.is_empty(), "{:?}", result.errors);
        let program = compile(&result).unwrap();
        for chunk in &program.chunks {
            for step in &chunk.steps {
                if let Some(target) = step.op.jump_target() {
                    prop_assert!(target <= chunk.len());
                }
            }
        }
    }
}
