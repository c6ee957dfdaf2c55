// vecta-vm - Shared helpers for integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

#![allow(dead_code)]

use vecta_core::InterpreterConfig;
use vecta_parser::{Diagnostic, parse};
use vecta_vm::{Interpreter, RunState, interpret, start_interpreting};

pub fn run(source: &str) -> Interpreter {
    interpret(parse(source), None, InterpreterConfig::default())
}

pub fn run_with(source: &str, config: InterpreterConfig) -> Interpreter {
    interpret(parse(source), None, config)
}

pub fn debug(source: &str) -> Interpreter {
    start_interpreting(parse(source), true, None, InterpreterConfig::default())
}

/// Display form of the program's final value.
pub fn eval(source: &str) -> String {
    let interp = run(source);
    assert_eq!(
        interp.state(),
        RunState::HaltedComplete,
        "errors for {:?}: {:?}",
        source,
        interp.errors()
    );
    interp
        .result()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<empty>".to_string())
}

/// The single error a failing program reports.
pub fn error(source: &str) -> Diagnostic {
    let interp = run(source);
    assert_eq!(interp.state(), RunState::HaltedError, "{:?} should fail", source);
    assert_eq!(interp.errors().len(), 1, "{:?}", interp.errors());
    interp.errors()[0].clone()
}

pub fn expect_error(source: &str, pattern: &str) -> Diagnostic {
    let diagnostic = error(source);
    assert!(
        diagnostic.message.contains(pattern),
        "error '{}' should contain '{}' for source: {}",
        diagnostic.message,
        pattern,
        source
    );
    diagnostic
}
