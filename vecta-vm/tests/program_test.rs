// vecta-vm - End-to-end program tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests that compile and run whole programs:
//! - Operators and precedence
//! - Blocks, loops and the previous result
//! - User functions, recursion and scoping
//! - Collections and indexed assignment
//! - Print log and determinism

mod common;

use common::{eval, run};
use vecta_core::{InterpreterConfig, Value};
use vecta_parser::parse;
use vecta_vm::{RunState, interpret};

// =============================================================================
// Operators
// =============================================================================

#[test]
fn precedence() {
    assert_eq!(eval("1 + 2 * 3"), "7");
    assert_eq!(eval("(1 + 2) * 3"), "9");
    assert_eq!(eval("10 - 4 - 3"), "3");
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(eval("1 < 2 && 2 < 3"), "1");
    assert_eq!(eval("!(1 == 1) || 0"), "0");
}

#[test]
fn ternary() {
    assert_eq!(eval("x = 5\nx > 3 ? \"big\" : \"small\""), "big");
    assert_eq!(eval("x = 1\nx > 3 ? \"big\" : \"small\""), "small");
}

#[test]
fn matrix_equality_is_whole_value() {
    assert_eq!(eval("#[1, 2] == #[1, 3]"), "0");
    assert_eq!(eval("#[1, 2] != #[1, 3]"), "1");
    assert_eq!(eval("#[1, 2] != #[1, 2]"), "0");
}

#[test]
fn broadcasting() {
    assert_eq!(eval("v = #[1, 2, 3]\nv * 2"), "#[2, 4, 6]");
    assert_eq!(eval("[1, 2] + 1"), "[2, 3]");
}

// =============================================================================
// Statements, blocks and loops
// =============================================================================

#[test]
fn previous_result() {
    assert_eq!(eval("3\n^ + 1"), "4");
    assert_eq!(eval("{\n5\n^ * 2\n}"), "10");
}

#[test]
fn semicolon_separated_statements() {
    assert_eq!(eval("a = 2; b = 3; a * b"), "6");
}

#[test]
fn loop_value_is_last_body_value() {
    assert_eq!(eval("for i in range(0, 3) {\ni * 10\n}"), "20");
}

#[test]
fn loop_without_iterations_is_empty() {
    let interp = run("x = 1\nfor i in range(0, 0) {\ni\n}");
    assert_eq!(interp.state(), RunState::HaltedComplete);
    assert!(interp.result().is_none());
    assert_eq!(interp.variable("x"), Some(Value::Number(1.0)));
}

#[test]
fn loop_bound_is_reevaluated() {
    let source = "n = 10\ncount = 0\nfor i in range(0, n) {\nn = n - 1\ncount = count + 1\n}\ncount";
    assert_eq!(eval(source), "5");
}

#[test]
fn descending_loop_with_step() {
    let source = "total = 0\nfor i in rrange(10, 0, -3) {\ntotal = total + i\n}\ntotal";
    // 10 + 7 + 4 + 1
    assert_eq!(eval(source), "22");
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn user_function_call() {
    assert_eq!(eval("double(x) {\nx * 2\n}\ndouble(21)"), "42");
}

#[test]
fn recursion() {
    let source = "fact(n) {\nn <= 1 ? 1 : n * fact(n - 1)\n}\nfact(5)";
    assert_eq!(eval(source), "120");
}

#[test]
fn forward_call() {
    assert_eq!(eval("a(x) {\nb(x) + 1\n}\nb(x) {\nx * 10\n}\na(2)"), "21");
}

#[test]
fn functions_read_globals() {
    assert_eq!(eval("scale = 3\nf(x) {\nx * scale\n}\nf(2)"), "6");
}

#[test]
fn assignment_in_function_is_local() {
    assert_eq!(eval("x = 1\nf() {\nx = 5\nx\n}\nf() + x"), "6");
}

#[test]
fn function_values() {
    assert_eq!(eval("f(a, b) {\na\n}\nf"), "<function f(a, b)>");
    assert_eq!(eval("sin"), "<builtin sin>");
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn nested_indexed_assignment() {
    assert_eq!(eval("m = [[1, 2], [3, 4]]\nm[0][1] = 9\nm"), "[[1, 9], [3, 4]]");
}

#[test]
fn indexed_assignment_value() {
    assert_eq!(eval("m = [0, 0]\nm[1] = 7"), "7");
}

#[test]
fn matrix_rows() {
    assert_eq!(eval("m = #[#[1, 2], #[3, 4]]\nm[1][0]"), "3");
    assert_eq!(eval("m = #[#[1, 2], #[3, 4]]\nm[0] = 0\nm"), "#[[0, 0], [3, 4]]");
}

#[test]
fn maps() {
    assert_eq!(eval("d = #{\"a\": 1, 2: \"b\"}\nd[\"a\"] + len(d)"), "3");
    assert_eq!(eval("d = #{\"a\": 1}\nd[\"b\"] = 2\nkeys(d)"), "[\"a\", \"b\"]");
}

#[test]
fn slicing_with_intervals() {
    assert_eq!(eval("[1, 2, 3, 4][interval(1, 3)]"), "[2, 3]");
}

// =============================================================================
// Outputs and determinism
// =============================================================================

#[test]
fn print_operator_records_source() {
    let interp = run("x = 2\n->>> x");
    let prints = &interp.outputs().prints;
    assert_eq!(prints.len(), 1);
    assert_eq!(prints[0].source, "x");
    assert_eq!(prints[0].value, Value::Number(2.0));
    assert_eq!(interp.result(), Some(&Value::Number(2.0)));
}

#[test]
fn print_builtin_records_argument() {
    let interp = run("print(1 + 1)");
    let prints = &interp.outputs().prints;
    assert_eq!(prints[0].source, "1 + 1");
    assert_eq!(prints[0].position.col, 6);
}

#[test]
fn same_seed_same_run() {
    let source = "xs = [random(), random()]\nplot([0, 1], xs)\nxs";
    let a = run(source);
    let b = run(source);
    assert_eq!(a.result(), b.result());
    assert_eq!(a.outputs().plots, b.outputs().plots);

    let config = InterpreterConfig {
        seed: 7,
        ..InterpreterConfig::default()
    };
    let c = interpret(parse(source), None, config);
    assert_ne!(a.result(), c.result());
}

#[test]
fn heatmap_samples_user_function() {
    let interp = run("g(x, y) {\nx + y\n}\nheatmap(g, interval(0, 1), interval(0, 1))");
    assert_eq!(interp.state(), RunState::HaltedComplete, "{:?}", interp.errors());
    let heatmap = &interp.outputs().plots[&0].heatmaps[0];
    assert_eq!(heatmap.values.len(), 32 * 32);
    assert!((heatmap.values[0] - 1.0 / 32.0).abs() < 1e-12);
    assert_eq!(heatmap.function, "g");
}

#[test]
fn sliders_carry_between_runs() {
    let source = "s = slider(\"k\", 0, 10)\ns * 2";
    let mut first = run(source);
    assert_eq!(first.result(), Some(&Value::Number(0.0)));
    assert!(first.set_input_value("k", 7.0));

    let second = interpret(parse(source), Some(&first), InterpreterConfig::default());
    assert_eq!(second.result(), Some(&Value::Number(14.0)));

    let third = interpret(parse("1"), Some(&second), InterpreterConfig::default());
    assert!(third.outputs().inputs.is_empty());
}
