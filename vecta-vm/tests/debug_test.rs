// vecta-vm - Single-step debugging tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for driving the VM one step at a time:
//! - Initial state and stepping to completion
//! - Stack discipline at statement boundaries
//! - Call stack inspection
//! - Re-entrant evaluation being refused while debugging

mod common;

use common::debug;
use vecta_core::Value;
use vecta_vm::{OpCode, RunState, step_program};

fn run_to_end(interp: &mut vecta_vm::Interpreter) -> usize {
    let mut steps = 0;
    while step_program(interp) {
        steps += 1;
    }
    steps
}

#[test]
fn debug_run_waits_for_steps() {
    let mut interp = debug("x = 1 + 2\nx * 2");
    assert_eq!(interp.state(), RunState::Ready);
    assert_eq!(interp.steps_executed(), 0);
    assert!(interp.result().is_none());
    assert_eq!(interp.current_position().map(|p| p.line), Some(0));

    assert!(step_program(&mut interp));
    assert_eq!(interp.state(), RunState::Running);
    assert_eq!(interp.steps_executed(), 1);

    run_to_end(&mut interp);
    assert_eq!(interp.state(), RunState::HaltedComplete);
    assert_eq!(interp.result(), Some(&Value::Number(6.0)));
    assert!(!step_program(&mut interp));
}

#[test]
fn empty_program_completes_immediately() {
    let interp = debug("");
    assert_eq!(interp.state(), RunState::HaltedComplete);
    assert!(interp.result().is_none());
}

#[test]
fn stack_returns_to_temp_base_after_statements() {
    let source = "a = 1 + 2\nb = [a, {\na * 2\n}]\nf(x) {\ny = x * 2\ny + 1\n}\nc = f(b[1])\nc";
    let mut interp = debug(source);
    let mut statements = 0;
    loop {
        let at_end = matches!(
            interp.current_step().map(|s| &s.op),
            Some(OpCode::EndStatement)
        );
        let temp_base = interp.temp_base();
        let depth = interp.call_stack().len();
        if at_end {
            assert_eq!(Some(interp.stack_pointer()), temp_base.map(|t| t + 1));
        }
        let running = step_program(&mut interp);
        if at_end {
            statements += 1;
            // the last statement of a call also returns from it
            if running && interp.call_stack().len() == depth {
                assert_eq!(Some(interp.stack_pointer()), temp_base);
            }
        }
        if !running {
            break;
        }
    }
    assert_eq!(interp.state(), RunState::HaltedComplete);
    assert_eq!(interp.result(), Some(&Value::Number(13.0)));
    // five top-level statements plus two in the function body
    assert_eq!(statements, 7);
}

#[test]
fn call_stack_shows_function_frame() {
    let mut interp = debug("f(x) {\ny = x + 1\ny\n}\nz = f(4)");
    while interp.call_stack().len() < 2 {
        assert!(step_program(&mut interp));
    }
    let frames = interp.call_stack();
    assert_eq!(frames[0].function, "main");
    assert_eq!(frames[1].function, "f");
    assert_eq!(frames[1].ip, 0);
    assert_eq!(
        frames[1].variables,
        vec![("x".to_string(), Some(Value::Number(4.0)))]
    );
    assert_eq!(interp.variable("x"), Some(Value::Number(4.0)));
    assert_eq!(interp.current_position().map(|p| p.line), Some(1));

    run_to_end(&mut interp);
    assert_eq!(interp.variable("z"), Some(Value::Number(5.0)));
    assert_eq!(interp.variable("x"), None);
    assert_eq!(interp.result(), Some(&Value::Number(5.0)));
}

#[test]
fn heatmap_is_not_sampled_while_debugging() {
    let mut interp = debug("g(x, y) {\nx + y\n}\nheatmap(g, interval(0, 1), interval(0, 1))");
    run_to_end(&mut interp);
    assert_eq!(interp.state(), RunState::HaltedComplete);
    assert!(interp.outputs().plots.is_empty());
    assert!(
        interp
            .warnings()
            .iter()
            .any(|w| w.message.contains("not evaluated while debugging"))
    );
}

#[test]
fn evaluation_is_refused_while_debugging() {
    let mut interp = debug("f(x) {\nx\n}\nf(1)");
    let function = interp.program().function_ref(0).unwrap();
    let call_site = interp.parse().statements[1];
    let value = interp.evaluate_function_within_program_with_args(
        call_site,
        &function,
        vec![Value::Number(2.0)],
    );
    assert!(value.is_none());
    assert_eq!(interp.state(), RunState::HaltedError);
    assert!(interp.errors()[0].message.contains("while debugging"));
}

#[test]
fn disassembly_lists_every_chunk() {
    let interp = debug("f(x) {\nx * 2\n}\nf(3)");
    let listing = interp.program().disassemble(interp.parse());
    assert!(listing.contains("== f(x)"));
    assert!(listing.contains("== main()"));
    assert!(listing.contains("CALL_FN #0 (1)"));
}
