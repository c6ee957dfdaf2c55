// vecta-vm - Error path tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for diagnostics that halt a run:
//! - Compile errors
//! - Type and index errors
//! - Builtin argument errors and their positions
//! - Safety limits

mod common;

use common::{error, expect_error, run, run_with};
use vecta_core::InterpreterConfig;
use vecta_vm::RunState;

// =============================================================================
// Compile errors
// =============================================================================

#[test]
fn parse_errors_prevent_running() {
    let interp = run("x = )\ny = 2");
    assert_eq!(interp.state(), RunState::HaltedError);
    assert_eq!(interp.errors().len(), 1);
    assert_eq!(interp.steps_executed(), 0);
    assert!(interp.result().is_none());
}

#[test]
fn unknown_function() {
    let diagnostic = expect_error("x = 1\ny = foo(x)", "unknown function 'foo'");
    assert_eq!(diagnostic.position.line, 1);
    assert_eq!(diagnostic.position.col, 4);
}

#[test]
fn too_many_builtin_arguments() {
    expect_error("sqrt(1, 2)", "takes at most 1 arguments, got 2");
}

#[test]
fn assigning_to_builtin() {
    expect_error("len = 2", "cannot assign to builtin 'len'");
}

// =============================================================================
// Runtime errors
// =============================================================================

#[test]
fn builtin_argument_type_at_argument() {
    let diagnostic = expect_error("sin(\"x\")", "Number");
    assert!(diagnostic.message.contains("String"));
    assert_eq!(diagnostic.position.col, 4);
}

#[test]
fn second_argument_is_anchored() {
    let diagnostic = expect_error("y = pow(2, \"3\")", "'exponent'");
    assert_eq!(diagnostic.position.col, 11);
}

#[test]
fn missing_builtin_argument_at_call() {
    let diagnostic = expect_error("z = atan2(1)", "missing argument 'x' for atan2");
    assert_eq!(diagnostic.position.col, 4);
}

#[test]
fn unsupported_operator() {
    expect_error("\"a\" + \"b\"", "don't know how to compute String + String");
}

#[test]
fn vector_index_out_of_range() {
    let diagnostic = expect_error("v = #[1, 2]\nv[5]", "out of range");
    assert_eq!(diagnostic.position.line, 1);
}

#[test]
fn missing_map_key() {
    expect_error("d = #{\"a\": 1}\nd[\"b\"]", "not found");
}

#[test]
fn undefined_variable() {
    expect_error("y = x + 1", "undefined variable 'x'");
}

#[test]
fn omitted_parameter_has_no_value() {
    expect_error("f(a, b) {\nb\n}\nf(1)", "variable 'b' has no value");
}

#[test]
fn empty_loop_has_no_value() {
    expect_error("x = for i in range(0, 0) {\ni\n}", "expression has no value");
}

#[test]
fn no_previous_result() {
    expect_error("^", "there is no previous result");
}

#[test]
fn slider_with_nan_bound() {
    let mut interp = run("k = slider(\"k\", 0, 0/0)\nk");
    assert_eq!(interp.state(), RunState::HaltedError);
    assert!(interp.errors()[0].message.contains("bounds must be finite"));
    assert!(!interp.set_input_value("k", 0.5));
}

#[test]
fn range_with_nan_bound() {
    expect_error("r = range(0, 0/0)", "bounds must be numbers");
}

#[test]
fn non_numeric_condition() {
    expect_error("\"s\" ? 1 : 2", "condition must be a Number, got String");
}

#[test]
fn error_inside_sampled_function_is_reported_once() {
    let source = "g(x, y) {\nx + \"s\"\n}\nheatmap(g, interval(0, 1), interval(0, 1))";
    let diagnostic = expect_error(source, "don't know how to compute Number + String");
    assert_eq!(diagnostic.position.line, 1);
}

#[test]
fn error_keeps_earlier_outputs() {
    let interp = run("print(1)\ny = x");
    assert_eq!(interp.state(), RunState::HaltedError);
    assert_eq!(interp.outputs().prints.len(), 1);
}

// =============================================================================
// Safety limits
// =============================================================================

#[test]
fn range_cap() {
    expect_error(
        "r = range(0, 10000000)",
        "range would produce 10000000 elements, more than the limit of 1000000",
    );
}

#[test]
fn step_cap() {
    let config = InterpreterConfig {
        max_steps: 1000,
        ..InterpreterConfig::default()
    };
    let interp = run_with("for i in range(0, 1000000) {\ni\n}", config);
    assert_eq!(interp.state(), RunState::HaltedError);
    assert_eq!(
        interp.errors()[0].message,
        "program exceeded the limit of 1000 steps"
    );
    assert_eq!(interp.steps_executed(), 1001);
}

#[test]
fn call_depth_cap() {
    expect_error("f(n) {\nf(n + 1)\n}\nf(0)", "call depth exceeded 1024 frames");
}

#[test]
fn stack_capacity() {
    let config = InterpreterConfig {
        stack_capacity: 64,
        ..InterpreterConfig::default()
    };
    let interp = run_with("f(n) {\nf(n + 1)\n}\nf(0)", config);
    assert_eq!(interp.state(), RunState::HaltedError);
    assert!(interp.errors()[0].message.contains("stack overflow"));
}

#[test]
fn single_error_per_run() {
    let diagnostic = error("a = 1\nb = a + \"x\"\nc = nope");
    assert!(diagnostic.message.contains("Number + String"));
}
