// vecta-embed - Engine implementation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Engine struct - main entry point for embedding Vecta.

use std::path::Path;

use serde::Serialize;
use tracing::debug;
use vecta_core::{InterpreterConfig, Outputs, Value};
use vecta_parser::{Diagnostic, parse};
use vecta_vm::{Interpreter, RunState, interpret, start_interpreting};

use crate::convert::FromValue;
use crate::error::{Error, Result};

/// What one run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub outputs: Outputs,
    /// Value of the last statement, when the run completed with one.
    pub value: Option<Value>,
    pub steps: u64,
}

impl From<&Interpreter> for RunReport {
    fn from(interp: &Interpreter) -> Self {
        RunReport {
            errors: interp.errors().to_vec(),
            warnings: interp.warnings().to_vec(),
            outputs: interp.outputs().clone(),
            value: interp.result().cloned(),
            steps: interp.steps_executed(),
        }
    }
}

impl RunReport {
    /// True when the run completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The Vecta engine.
///
/// `Engine` re-runs whole documents the way an editor does: every call to
/// [`Engine::run`] starts from scratch, except that slider inputs from the
/// previous run are carried forward.
///
/// **`Engine` is NOT thread-safe.** Values share storage through `Rc`.
///
/// # Example
///
/// ```rust
/// use vecta_embed::Engine;
///
/// let mut engine = Engine::new();
/// let report = engine.run("x = 20\nx + 1");
/// assert!(report.is_ok());
/// assert_eq!(report.value.unwrap().to_string(), "21");
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    config: InterpreterConfig,
    previous: Option<Interpreter>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Engine {
            config,
            previous: None,
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InterpreterConfig {
        &mut self.config
    }

    /// Parse and run `source` to completion, carrying slider inputs from
    /// the previous run. The run is kept as the new previous run.
    pub fn run(&mut self, source: &str) -> RunReport {
        let interp = interpret(parse(source), self.previous.as_ref(), self.config.clone());
        let report = RunReport::from(&interp);
        debug!(
            steps = report.steps,
            errors = report.errors.len(),
            "engine run"
        );
        self.previous = Some(interp);
        report
    }

    /// Run `source` and return its value, or the first diagnostic.
    ///
    /// ```rust
    /// use vecta_embed::Engine;
    ///
    /// let mut engine = Engine::new();
    /// assert!(engine.eval("1 + ").is_err());
    /// assert_eq!(engine.eval("2 * 3").unwrap().to_string(), "6");
    /// ```
    pub fn eval(&mut self, source: &str) -> Result<Value> {
        let mut report = self.run(source);
        if !report.errors.is_empty() {
            return Err(Error::Run(report.errors.swap_remove(0)));
        }
        report.value.ok_or(Error::NoValue)
    }

    /// Run `source` and convert its value.
    pub fn eval_as<T: FromValue>(&mut self, source: &str) -> Result<T> {
        T::from_value(&self.eval(source)?)
    }

    /// Run the contents of a file.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<RunReport> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.run(&source))
    }

    /// Compile `source` for single stepping. Nothing executes until the
    /// caller steps the returned interpreter, and the engine's previous
    /// run is left untouched.
    pub fn debug(&self, source: &str) -> Interpreter {
        start_interpreting(
            parse(source),
            true,
            self.previous.as_ref(),
            self.config.clone(),
        )
    }

    /// Move a slider from the previous run; the next [`Engine::run`] sees
    /// the new value. Returns false if there is no such slider.
    pub fn set_input(&mut self, name: &str, value: f64) -> bool {
        self.previous
            .as_mut()
            .is_some_and(|interp| interp.set_input_value(name, value))
    }

    /// A top-level variable of the previous run, if it completed.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.previous
            .as_ref()
            .filter(|interp| interp.state() == RunState::HaltedComplete)
            .and_then(|interp| interp.variable(name))
    }

    pub fn get_as<T: FromValue>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| T::from_value(&v).ok())
    }

    /// The interpreter of the previous run.
    pub fn previous(&self) -> Option<&Interpreter> {
        self.previous.as_ref()
    }

    /// Forget the previous run, including its slider values.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
