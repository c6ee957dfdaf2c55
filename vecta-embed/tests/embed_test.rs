// vecta-embed integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for the vecta-embed embedding API:
//! - Running documents and reading reports
//! - Slider inputs across re-runs
//! - Stepping through a debug run
//! - Value conversions and JSON output

use vecta_embed::{
    Engine, Error, FromValue, InterpreterConfig, IntoValue, RunState, Value, step_program,
};

// =============================================================================
// Running documents
// =============================================================================

mod running {
    use super::*;

    #[test]
    fn report_carries_value_and_prints() {
        let mut engine = Engine::new();
        let report = engine.run("x = 2\n->>> x * 3\nx + 1");
        assert!(report.is_ok());
        assert_eq!(report.value, Some(Value::Number(3.0)));
        assert_eq!(report.outputs.prints.len(), 1);
        assert!(report.steps > 0);
    }

    #[test]
    fn each_run_starts_fresh() {
        let mut engine = Engine::new();
        engine.run("a = 1");
        let report = engine.run("a + 1");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("undefined variable 'a'"));
        assert!(report.value.is_none());
    }

    #[test]
    fn parse_error_has_position() {
        let mut engine = Engine::new();
        let report = engine.run("x = 1\ny = (2 +");
        assert!(!report.is_ok());
        assert_eq!(report.errors[0].position.line, 1);
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn variables_of_completed_run() {
        let mut engine = Engine::new();
        engine.run("total = 0\nfor i in range(1, 5) {\ntotal = total + i\n}");
        assert_eq!(engine.get_as::<f64>("total"), Some(10.0));
        // the loop variable keeps the value that failed the bound check
        assert_eq!(engine.get("i"), Some(Value::Number(5.0)));
        assert_eq!(engine.get("missing"), None);
    }

    #[test]
    fn config_is_applied() {
        let config = InterpreterConfig {
            max_steps: 50,
            ..InterpreterConfig::default()
        };
        let mut engine = Engine::with_config(config);
        let err = engine.eval("for i in range(0, 1000) {\ni\n}").unwrap_err();
        assert!(matches!(err, Error::Run(_)));
        assert!(err.to_string().contains("limit of 50 steps"));
    }
}

// =============================================================================
// Sliders
// =============================================================================

mod sliders {
    use super::*;

    const SOURCE: &str = "speed = slider(\"speed\", 0, 100)\nspeed / 10";

    #[test]
    fn slider_starts_at_low_end() {
        let mut engine = Engine::new();
        let report = engine.run(SOURCE);
        assert_eq!(report.value, Some(Value::Number(0.0)));
        let input = &report.outputs.inputs["speed"];
        assert_eq!(input.step, 1.0);
    }

    #[test]
    fn set_input_survives_rerun() {
        let mut engine = Engine::new();
        engine.run(SOURCE);
        assert!(engine.set_input("speed", 40.0));
        assert_eq!(engine.eval_as::<f64>(SOURCE), Ok(4.0));
        // and again, without touching it
        assert_eq!(engine.eval_as::<f64>(SOURCE), Ok(4.0));
    }

    #[test]
    fn unknown_slider() {
        let mut engine = Engine::new();
        assert!(!engine.set_input("speed", 1.0));
        engine.run(SOURCE);
        assert!(!engine.set_input("other", 1.0));
    }

    #[test]
    fn removed_slider_is_pruned() {
        let mut engine = Engine::new();
        engine.run(SOURCE);
        engine.set_input("speed", 70.0);
        let report = engine.run("1");
        assert!(report.outputs.inputs.is_empty());
        // gone for good
        assert_eq!(engine.eval_as::<f64>(SOURCE), Ok(0.0));
    }

    #[test]
    fn reset_forgets_inputs() {
        let mut engine = Engine::new();
        engine.run(SOURCE);
        engine.set_input("speed", 70.0);
        engine.reset();
        assert!(engine.previous().is_none());
        assert_eq!(engine.eval_as::<f64>(SOURCE), Ok(0.0));
    }
}

// =============================================================================
// Debugging
// =============================================================================

mod debugging {
    use super::*;

    #[test]
    fn debug_run_steps_to_completion() {
        let engine = Engine::new();
        let mut interp = engine.debug("a = 4\nb = a * a\nb - 1");
        assert_eq!(interp.state(), RunState::Ready);
        let mut steps = 0;
        while step_program(&mut interp) {
            steps += 1;
        }
        assert!(steps > 0);
        assert_eq!(interp.state(), RunState::HaltedComplete);
        assert_eq!(interp.result(), Some(&Value::Number(15.0)));
    }

    #[test]
    fn debug_run_sees_carried_sliders() {
        let mut engine = Engine::new();
        engine.run("s = slider(\"s\", 0, 1)");
        engine.set_input("s", 0.5);
        let mut interp = engine.debug("s = slider(\"s\", 0, 1)\ns");
        while step_program(&mut interp) {}
        assert_eq!(interp.result(), Some(&Value::Number(0.5)));
    }
}

// =============================================================================
// Conversions
// =============================================================================

mod conversions {
    use super::*;

    #[test]
    fn numbers_and_strings() {
        let mut engine = Engine::new();
        assert_eq!(engine.eval_as::<f64>("1 / 4"), Ok(0.25));
        assert_eq!(engine.eval_as::<i64>("6 * 7"), Ok(42));
        assert_eq!(engine.eval_as::<String>("\"hi\""), Ok("hi".to_string()));
        assert_eq!(engine.eval_as::<bool>("2 > 1"), Ok(true));
    }

    #[test]
    fn type_mismatch() {
        let mut engine = Engine::new();
        let err = engine.eval_as::<String>("1").unwrap_err();
        assert!(matches!(err, Error::Conversion { expected: "String", .. }));
    }

    #[test]
    fn lists_and_matrices() {
        let mut engine = Engine::new();
        let list: Vec<f64> = engine.eval_as("[1, 2, 3]").unwrap();
        assert_eq!(list, vec![1.0, 2.0, 3.0]);
        let rows: Vec<Vec<f64>> = engine.eval_as("#[#[1, 2], #[3, 4]]").unwrap();
        assert_eq!(rows, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let words: Vec<String> = engine.eval_as("[\"a\", \"b\"]").unwrap();
        assert_eq!(words, vec!["a", "b"]);
    }

    #[test]
    fn into_value_matches_literals() {
        let mut engine = Engine::new();
        let literal = engine.eval("[1, \"x\"]").unwrap();
        let built = vec![1.0f64.into_value(), "x".into_value()].into_value();
        assert_eq!(literal, built);
        assert_eq!(Vec::<Value>::from_value(&built).unwrap().len(), 2);
    }
}

// =============================================================================
// JSON output
// =============================================================================

mod json {
    use super::*;

    #[test]
    fn report_serializes() {
        let mut engine = Engine::new();
        let report = engine.run("plot([0, 1], [2, 3])\nprint(\"done\")");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outputs"]["prints"][0]["value"], "done");
        assert_eq!(json["outputs"]["plots"]["0"]["lines"][0]["ys"][1], 3.0);
        assert!(json["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn matrix_serializes_with_shape() {
        let mut engine = Engine::new();
        let value = engine.eval("#[#[1, 2], #[3, 4]]").unwrap();
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["shape"], serde_json::json!([2, 2]));
        assert_eq!(json["data"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
    }
}
