// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Stepping virtual machine.
//!
//! An [`Interpreter`] owns everything one run needs: the parse, the compiled
//! program, the value stack, call frames and the output side-table. It
//! advances one instruction per [`Interpreter::step_program`] call, so a
//! debugger can stop anywhere and inspect the state; a normal run simply
//! steps until the program halts.

pub mod error;
pub mod frame;
pub mod handlers;
pub mod stack;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};
use vecta_core::{
    BuiltinHost, FunctionEvaluator, FunctionRef, InterpreterConfig, Outputs, PrintEntry, Rng,
    Value, registry,
};
use vecta_parser::{Diagnostic, ExprId, ExprKind, ParseResult, TextPosition};

use crate::chunk::{Chunk, Program, Step};
use crate::compiler;
use crate::opcode::OpCode;

pub use error::{Result, RuntimeError};
pub use frame::CallFrame;
pub use stack::ValueStack;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Compiled, no step taken yet.
    Ready,
    Running,
    /// Stopped on an error; see [`Interpreter::errors`].
    HaltedError,
    /// The entry point ran to its end.
    HaltedComplete,
}

/// Snapshot of one call frame for a debugger.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub function: String,
    pub ip: usize,
    /// Position of the next step, if the frame has one left.
    pub position: Option<TextPosition>,
    pub variables: Vec<(String, Option<Value>)>,
}

pub struct Interpreter {
    parse: Rc<ParseResult>,
    program: Rc<Program>,
    config: InterpreterConfig,
    stack: ValueStack,
    frames: Vec<CallFrame>,
    rng: Rng,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    outputs: Outputs,
    debug: bool,
    state: RunState,
    steps_executed: u64,
    result: Option<Value>,
    /// Top-level variable slots, kept once the entry frame returns.
    globals: IndexMap<Rc<str>, usize>,
    /// Node of the step being executed, for diagnostics.
    current: Option<ExprId>,
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("state", &self.state)
            .field("debug", &self.debug)
            .field("steps_executed", &self.steps_executed)
            .field("frames", &self.frames.len())
            .field("stack", &self.stack.len())
            .field("errors", &self.errors)
            .finish()
    }
}

/// Compile `parse` and prepare a run. Unless `debug` is set the program is
/// run to completion before returning. Slider inputs from `previous` are
/// carried into the new run.
pub fn start_interpreting(
    parse: impl Into<Rc<ParseResult>>,
    debug: bool,
    previous: Option<&Interpreter>,
    config: InterpreterConfig,
) -> Interpreter {
    let mut interp = Interpreter::new(parse.into(), debug, previous, config);
    if !debug {
        interp.run();
    }
    interp
}

/// Compile and run `parse` to completion.
pub fn interpret(
    parse: impl Into<Rc<ParseResult>>,
    previous: Option<&Interpreter>,
    config: InterpreterConfig,
) -> Interpreter {
    start_interpreting(parse, false, previous, config)
}

/// Execute one step. Returns whether the program can keep running.
pub fn step_program(interp: &mut Interpreter) -> bool {
    interp.step_program()
}

impl Interpreter {
    fn new(
        parse: Rc<ParseResult>,
        debug: bool,
        previous: Option<&Interpreter>,
        config: InterpreterConfig,
    ) -> Self {
        let outputs = previous
            .map(|p| Outputs::carried_from(&p.outputs))
            .unwrap_or_default();
        let mut interp = Interpreter {
            errors: parse.errors.clone(),
            warnings: parse.warnings.clone(),
            parse,
            program: Rc::new(Program::default()),
            stack: ValueStack::new(config.stack_capacity),
            frames: Vec::new(),
            rng: Rng::new(config.seed),
            config,
            outputs,
            debug,
            state: RunState::Ready,
            steps_executed: 0,
            result: None,
            globals: IndexMap::new(),
            current: None,
        };

        if interp.parse.has_errors() {
            interp.state = RunState::HaltedError;
            return interp;
        }
        match compiler::compile(&interp.parse) {
            Ok(program) => interp.program = Rc::new(program),
            Err(err) => {
                debug!(%err, "compilation failed");
                interp.errors.push(err.to_diagnostic());
                interp.state = RunState::HaltedError;
                return interp;
            }
        }

        if let Err(err) = interp.enter_main() {
            interp.fail(err);
        }
        interp
    }

    fn enter_main(&mut self) -> Result<()> {
        let main = self.program.main_index();
        let local_count = self.program.main().map_or(0, Chunk::local_count);
        let frame = CallFrame::new(main, 0, &[], local_count, None);
        self.stack.resize(frame.temp_base)?;
        self.frames.push(frame);
        self.finish_frames()
    }

    fn run(&mut self) {
        while self.step_program() {}
    }

    /// Execute one step. Returns whether the program can keep running.
    pub fn step_program(&mut self) -> bool {
        match self.state {
            RunState::HaltedError | RunState::HaltedComplete => return false,
            RunState::Ready => self.state = RunState::Running,
            RunState::Running => {}
        }
        if let Err(err) = self.step() {
            self.fail(err);
        }
        self.state == RunState::Running
    }

    fn step(&mut self) -> Result<()> {
        let program = Rc::clone(&self.program);
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Internal("no frame to execute".to_string()))?;
        let step = program
            .chunks
            .get(frame.chunk_index)
            .and_then(|chunk| chunk.steps.get(frame.ip))
            .ok_or_else(|| RuntimeError::Internal("instruction pointer out of range".to_string()))?;
        let ip = frame.ip;
        frame.ip += 1;
        self.current = Some(step.expr);

        self.steps_executed += 1;
        if self.steps_executed > self.config.max_steps {
            warn!(limit = self.config.max_steps, "step limit reached");
            return Err(RuntimeError::StepLimit(self.config.max_steps));
        }

        trace!(ip, op = %step.op, sp = self.stack.len(), "step");
        self.execute(&step.op, step.expr)?;
        self.finish_frames()
    }

    fn execute(&mut self, op: &OpCode, expr: ExprId) -> Result<()> {
        match op {
            OpCode::LoadVariable(_)
            | OpCode::LoadPreviousResult(_)
            | OpCode::SetVariable { .. }
            | OpCode::IncrementVariable(_) => self.execute_variables(op),

            OpCode::EndStatement
            | OpCode::EndNestedStatement(_)
            | OpCode::ClearLastBlockResult
            | OpCode::Jump(_)
            | OpCode::JumpIfFalse(_)
            | OpCode::CallFunction { .. }
            | OpCode::CallBuiltin { .. } => self.execute_control(op, expr),

            OpCode::Binary(_) | OpCode::Unary(_) => self.execute_arithmetic(op, expr),

            OpCode::PushNumber(n) => self.stack.push_value(Value::Number(*n)),
            OpCode::PushString(s) => self.stack.push_value(Value::String(Rc::clone(s))),
            OpCode::PushFunction(id) => {
                let function = self
                    .program
                    .function_ref(*id)
                    .ok_or_else(|| RuntimeError::Internal(format!("no function #{}", id)))?;
                self.stack.push_value(Value::Function(function))
            }
            OpCode::PushBuiltin(id) => {
                let builtin = registry()
                    .get(*id)
                    .ok_or_else(|| RuntimeError::Internal(format!("no builtin #{}", id)))?;
                self.stack.push_value(Value::Function(builtin.function_ref()))
            }

            OpCode::BuildList(_)
            | OpCode::BuildMap(_)
            | OpCode::BuildVector(_)
            | OpCode::IndexRead(_)
            | OpCode::IndexWrite { .. } => self.execute_collections(op),

            OpCode::Invalid => Err(RuntimeError::Internal(
                "invalid instruction".to_string(),
            )),
        }
    }

    // ========================================================================
    // Frames
    // ========================================================================

    pub(crate) fn frame(&self) -> Result<&CallFrame> {
        self.frames
            .last()
            .ok_or_else(|| RuntimeError::Internal("no active frame".to_string()))
    }

    pub(crate) fn frame_mut(&mut self) -> Result<&mut CallFrame> {
        self.frames
            .last_mut()
            .ok_or_else(|| RuntimeError::Internal("no active frame".to_string()))
    }

    /// Push a frame for user function `chunk_index` whose result slot is
    /// at `base`, with `argc` arguments above it.
    pub(crate) fn push_frame(
        &mut self,
        chunk_index: usize,
        base: usize,
        argc: usize,
        call_site: ExprId,
    ) -> Result<()> {
        if self.frames.len() >= self.config.max_call_depth {
            warn!(limit = self.config.max_call_depth, "call depth limit reached");
            return Err(RuntimeError::CallDepthExceeded(self.config.max_call_depth));
        }
        let program = Rc::clone(&self.program);
        let chunk = program
            .chunks
            .get(chunk_index)
            .ok_or_else(|| RuntimeError::Internal(format!("no chunk #{}", chunk_index)))?;
        if argc > chunk.params.len() {
            return Err(RuntimeError::TooManyArguments {
                function: chunk.name.to_string(),
                max: chunk.params.len(),
                got: argc,
            });
        }

        let frame = CallFrame::new(
            chunk_index,
            base,
            &chunk.params,
            chunk.local_count(),
            Some(call_site),
        );
        self.stack.resize(frame.temp_base)?;
        debug!(function = %chunk.name, depth = self.frames.len() + 1, "call");
        self.frames.push(frame);
        Ok(())
    }

    /// Pop every frame that has run off the end of its chunk, leaving its
    /// result in the slot the caller opened. Popping the entry frame
    /// completes the program.
    fn finish_frames(&mut self) -> Result<()> {
        while let Some(frame) = self.frames.last() {
            let len = self.program.chunks.get(frame.chunk_index).map_or(0, Chunk::len);
            if frame.ip < len {
                break;
            }
            let Some(frame) = self.frames.pop() else {
                break;
            };
            let result = self.stack.get(frame.base)?.cloned();

            if self.frames.is_empty() {
                debug!(steps = self.steps_executed, "program complete");
                self.result = result;
                self.globals = frame.variables;
                self.state = RunState::HaltedComplete;
                self.outputs.prune_inputs();
                break;
            }

            self.stack.truncate(frame.base + 1);
            self.stack.set(frame.base, result)?;
            debug!(depth = self.frames.len(), "return");
            if frame.reentrant {
                break;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Errors
    // ========================================================================

    fn fail(&mut self, err: RuntimeError) {
        self.state = RunState::HaltedError;
        if err.is_reported() {
            return;
        }
        let position = self.error_position(&err);
        debug!(%err, %position, "runtime error");
        self.errors.push(Diagnostic::new(position, err.to_string()));
    }

    /// The current step's node, or the offending argument of a builtin call.
    fn error_position(&self, err: &RuntimeError) -> TextPosition {
        let Some(expr) = self.current else {
            return TextPosition::START;
        };
        let ast = &self.parse.ast;
        if let Some(i) = err.argument_index()
            && let ExprKind::Function {
                args, body: None, ..
            } = ast.kind(expr)
            && let Some(arg) = args.get(i)
        {
            return ast.node(*arg).start;
        }
        ast.node(expr).start
    }

    // ========================================================================
    // Re-entrant evaluation
    // ========================================================================

    /// Run `function` with `args` to completion from inside a builtin.
    /// Refused while debugging. On failure the error is recorded, the run
    /// halts and `None` is returned.
    pub fn evaluate_function_within_program_with_args(
        &mut self,
        call_site: ExprId,
        function: &FunctionRef,
        args: Vec<Value>,
    ) -> Option<Value> {
        if self.debug {
            self.current = Some(call_site);
            self.fail(RuntimeError::EvaluationWhileDebugging);
            return None;
        }
        let saved_current = self.current;
        let outcome = self.evaluate(call_site, function, args);
        match outcome {
            Ok(value) => {
                self.current = saved_current;
                Some(value)
            }
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn evaluate(
        &mut self,
        call_site: ExprId,
        function: &FunctionRef,
        args: Vec<Value>,
    ) -> Result<Value> {
        match function {
            FunctionRef::Builtin { id, .. } => {
                let mut host = VmHost {
                    interp: self,
                    call_site,
                };
                Ok(registry().call(*id, &mut host, &args)?)
            }
            FunctionRef::User { id, .. } => {
                let depth = self.frames.len();
                let base = self.stack.len();
                let argc = args.len();
                self.stack.push(None)?;
                for arg in args {
                    self.stack.push_value(arg)?;
                }
                self.push_frame(*id, base, argc, call_site)?;
                self.frame_mut()?.reentrant = true;
                self.finish_frames()?;

                let limit = self.steps_executed.saturating_add(self.config.max_steps);
                while self.frames.len() > depth {
                    if self.steps_executed >= limit {
                        return Err(RuntimeError::StepLimit(self.config.max_steps));
                    }
                    self.step()?;
                }

                let result = self.stack.get(base)?.cloned();
                self.stack.truncate(base);
                result.ok_or(RuntimeError::MissingValue)
            }
        }
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    pub(crate) fn record_print(&mut self, source_node: ExprId, value: Value) {
        let entry = PrintEntry {
            source: self.parse.source_of(source_node).to_string(),
            position: self.parse.ast.node(source_node).start,
            value,
        };
        self.outputs.prints.push(entry);
    }

    /// Move a carried slider. Returns false if no such slider exists.
    pub fn set_input_value(&mut self, name: &str, value: f64) -> bool {
        self.outputs.set_input_value(name, value)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_debugging(&self) -> bool {
        self.debug
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn parse(&self) -> &ParseResult {
        &self.parse
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn steps_executed(&self) -> u64 {
        self.steps_executed
    }

    /// Value of the last top-level statement, once the run is complete.
    pub fn result(&self) -> Option<&Value> {
        match self.state {
            RunState::HaltedComplete => self.result.as_ref(),
            _ => None,
        }
    }

    /// The step the next call to `step_program` will execute.
    pub fn current_step(&self) -> Option<&Step> {
        let frame = self.frames.last()?;
        self.program.chunks.get(frame.chunk_index)?.steps.get(frame.ip)
    }

    /// Source position of the next step.
    pub fn current_position(&self) -> Option<TextPosition> {
        self.current_step()
            .map(|step| self.parse.ast.node(step.expr).start)
    }

    /// Frames from the entry point outwards.
    pub fn call_stack(&self) -> Vec<FrameInfo> {
        self.frames
            .iter()
            .map(|frame| {
                let chunk = self.program.chunks.get(frame.chunk_index);
                let position = chunk
                    .and_then(|c| c.steps.get(frame.ip))
                    .map(|step| self.parse.ast.node(step.expr).start);
                let variables = frame
                    .variables
                    .iter()
                    .map(|(name, slot)| {
                        let value = self.stack.get(*slot).ok().flatten().cloned();
                        (name.to_string(), value)
                    })
                    .collect();
                FrameInfo {
                    function: chunk.map_or_else(String::new, |c| c.name.to_string()),
                    ip: frame.ip,
                    position,
                    variables,
                }
            })
            .collect()
    }

    pub fn stack_slots(&self) -> &[Option<Value>] {
        self.stack.slots()
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack.len()
    }

    /// First temporary slot of the innermost frame.
    pub fn temp_base(&self) -> Option<usize> {
        self.frames.last().map(|frame| frame.temp_base)
    }

    /// Value of a variable visible from the innermost frame.
    pub fn variable(&self, name: &str) -> Option<Value> {
        if self.frames.is_empty() {
            let slot = *self.globals.get(name)?;
            return self.stack.get(slot).ok().flatten().cloned();
        }
        self.load_variable(name).ok()
    }
}

// ============================================================================
// Builtin host
// ============================================================================

/// Capabilities handed to a builtin for the duration of one call.
pub(crate) struct VmHost<'a> {
    pub(crate) interp: &'a mut Interpreter,
    pub(crate) call_site: ExprId,
}

impl VmHost<'_> {
    /// First argument of the call, or the call itself.
    fn subject(&self) -> ExprId {
        match self.interp.parse.ast.kind(self.call_site) {
            ExprKind::Function {
                args, body: None, ..
            } if !args.is_empty() => args[0],
            _ => self.call_site,
        }
    }
}

impl BuiltinHost for VmHost<'_> {
    fn config(&self) -> &InterpreterConfig {
        &self.interp.config
    }

    fn outputs(&mut self) -> &mut Outputs {
        &mut self.interp.outputs
    }

    fn random(&mut self) -> f64 {
        self.interp.rng.next_f64()
    }

    fn record_print(&mut self, value: &Value) {
        let subject = self.subject();
        self.interp.record_print(subject, value.clone());
    }

    fn warn(&mut self, message: String) {
        let position = self.interp.parse.ast.node(self.call_site).start;
        self.interp.warnings.push(Diagnostic::new(position, message));
    }

    fn evaluator(&mut self) -> Option<Box<dyn FunctionEvaluator + '_>> {
        if self.interp.debug {
            return None;
        }
        Some(Box::new(Reentrant {
            interp: &mut *self.interp,
            call_site: self.call_site,
        }))
    }
}

/// Evaluator given to builtins outside debug mode.
struct Reentrant<'a> {
    interp: &'a mut Interpreter,
    call_site: ExprId,
}

impl FunctionEvaluator for Reentrant<'_> {
    fn call_function(
        &mut self,
        function: &FunctionRef,
        args: Vec<Value>,
    ) -> vecta_core::Result<Value> {
        self.interp
            .evaluate_function_within_program_with_args(self.call_site, function, args)
            .ok_or(vecta_core::Error::Reported)
    }
}
