// vecta-core - Builtin function registry
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Native functions exposed to programs.
//!
//! The registry is built once on first use and never changes afterwards.
//! Each [`Builtin`] describes its parameters so that callers can check
//! arity at compile time and argument kinds at call time; every call goes
//! through [`Registry::call`], which performs that check before running the
//! native body.

mod collections;
mod math;
mod outputs;

use std::collections::HashMap;
use std::sync::OnceLock;

use num_traits::ToPrimitive;
use tracing::trace;

use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::output::Outputs;
use crate::value::{FunctionRef, Value, ValueKind};

// ============================================================================
// Host capabilities
// ============================================================================

/// What a builtin may touch while it runs.
pub trait BuiltinHost {
    fn config(&self) -> &InterpreterConfig;

    fn outputs(&mut self) -> &mut Outputs;

    /// Next number from the run's generator, in `[0, 1)`.
    fn random(&mut self) -> f64;

    /// Append `value` to the print log, attributed to the current call.
    fn record_print(&mut self, value: &Value);

    /// Record a warning at the current call.
    fn warn(&mut self, message: String);

    /// Synchronous evaluation of program functions. `None` while the
    /// program is being debugged.
    fn evaluator(&mut self) -> Option<Box<dyn FunctionEvaluator + '_>>;
}

/// Runs a function value to completion on behalf of a builtin.
pub trait FunctionEvaluator {
    /// Call `function` with `args`. A failure inside a user function has
    /// already been recorded and comes back as [`Error::Reported`].
    fn call_function(&mut self, function: &FunctionRef, args: Vec<Value>) -> Result<Value>;
}

// ============================================================================
// Descriptors
// ============================================================================

pub type BuiltinFn = fn(&mut dyn BuiltinHost, &[Value]) -> Result<Value>;

pub(crate) const ANY: &[ValueKind] = &[];
pub(crate) const NUMBER: &[ValueKind] = &[ValueKind::Number];
pub(crate) const NUMERIC: &[ValueKind] = &[ValueKind::Number, ValueKind::Matrix];
pub(crate) const ARRAY: &[ValueKind] = &[ValueKind::Matrix, ValueKind::List];

/// One declared parameter. An empty `kinds` accepts anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kinds: &'static [ValueKind],
    pub optional: bool,
}

pub(crate) const fn req(name: &'static str, kinds: &'static [ValueKind]) -> Param {
    Param {
        name,
        kinds,
        optional: false,
    }
}

pub(crate) const fn opt(name: &'static str, kinds: &'static [ValueKind]) -> Param {
    Param {
        name,
        kinds,
        optional: true,
    }
}

impl Param {
    /// Human readable accepted kinds, e.g. "Number or Matrix".
    pub fn expected(&self) -> String {
        if self.kinds.is_empty() {
            return "any value".to_string();
        }
        self.kinds
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(" or ")
    }

    pub fn accepts(&self, kind: ValueKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

#[derive(Clone)]
pub struct Builtin {
    pub id: usize,
    pub name: &'static str,
    pub params: &'static [Param],
    /// Leading parameters that are not optional.
    pub min_args: usize,
    pub func: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .finish()
    }
}

impl Builtin {
    pub fn max_args(&self) -> usize {
        self.params.len()
    }

    /// Validate supplied arguments against the descriptor. At least
    /// `min_args` are checked, so a missing required argument is reported
    /// by name.
    pub fn check_args(&self, args: &[Value]) -> Result<()> {
        if args.len() > self.params.len() {
            return Err(Error::builtin(
                self.name,
                format!(
                    "takes at most {} arguments, got {}",
                    self.params.len(),
                    args.len()
                ),
            ));
        }
        let checked = args.len().max(self.min_args);
        for (i, param) in self.params.iter().enumerate().take(checked) {
            let Some(arg) = args.get(i) else {
                return Err(Error::MissingArgument {
                    function: self.name,
                    param: param.name,
                    arg: i,
                });
            };
            if !param.accepts(arg.kind()) {
                return Err(Error::ArgumentType {
                    function: self.name,
                    param: param.name,
                    expected: param.expected(),
                    got: arg.kind(),
                    arg: i,
                });
            }
        }
        Ok(())
    }

    pub fn function_ref(&self) -> FunctionRef {
        FunctionRef::Builtin {
            id: self.id,
            name: self.name,
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug)]
pub struct Registry {
    builtins: Vec<Builtin>,
    by_name: HashMap<&'static str, usize>,
}

impl Registry {
    fn build() -> Self {
        let mut registry = Registry {
            builtins: Vec::new(),
            by_name: HashMap::new(),
        };
        math::register(&mut registry);
        collections::register(&mut registry);
        outputs::register(&mut registry);
        registry
    }

    pub(crate) fn add(&mut self, name: &'static str, params: &'static [Param], func: BuiltinFn) {
        let id = self.builtins.len();
        let min_args = params.iter().take_while(|p| !p.optional).count();
        self.builtins.push(Builtin {
            id,
            name,
            params,
            min_args,
            func,
        });
        self.by_name.insert(name, id);
    }

    pub fn lookup(&self, name: &str) -> Option<&Builtin> {
        self.by_name.get(name).map(|id| &self.builtins[*id])
    }

    pub fn get(&self, id: usize) -> Option<&Builtin> {
        self.builtins.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.builtins.iter()
    }

    /// Check `args` and run builtin `id`.
    pub fn call(&self, id: usize, host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
        let builtin = self
            .get(id)
            .ok_or_else(|| Error::InvalidValue(format!("no builtin with id {}", id)))?;
        builtin.check_args(args)?;
        trace!(builtin = builtin.name, argc = args.len(), "calling builtin");
        (builtin.func)(host, args)
    }
}

/// The process-wide builtin registry.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::build)
}

// ============================================================================
// Argument helpers
// ============================================================================

pub(crate) fn number_arg(function: &'static str, args: &[Value], i: usize) -> Result<f64> {
    match args.get(i) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(Error::builtin_arg(
            function,
            i,
            format!("expected Number, got {}", other.kind()),
        )),
        None => Err(Error::builtin(function, format!("missing argument {}", i))),
    }
}

pub(crate) fn optional_number(args: &[Value], i: usize) -> Option<f64> {
    args.get(i).and_then(Value::as_number)
}

pub(crate) fn arg<'a>(function: &'static str, args: &'a [Value], i: usize) -> Result<&'a Value> {
    args.get(i)
        .ok_or_else(|| Error::builtin(function, format!("missing argument {}", i)))
}

/// Optional whole-number slot selector such as a plot index. Defaults to 0.
pub(crate) fn slot_arg(function: &'static str, args: &[Value], i: usize) -> Result<usize> {
    match optional_number(args, i) {
        None => Ok(0),
        Some(n) if n.fract() == 0.0 => n.to_usize().ok_or_else(|| {
            Error::builtin_arg(function, i, "index must not be negative")
        }),
        Some(n) => Err(Error::builtin_arg(
            function,
            i,
            format!("index must be a whole number, got {}", n),
        )),
    }
}


#[cfg(test)]
mod tests {
    use super::test_host::{TestHost, call};
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let sin = registry().lookup("sin").unwrap();
        assert_eq!(sin.min_args, 1);
        assert_eq!(sin.max_args(), 1);
        assert!(registry().lookup("no_such_builtin").is_none());
        assert_eq!(registry().get(sin.id).unwrap().name, "sin");
    }

    #[test]
    fn test_min_args_counts_leading_required() {
        let range = registry().lookup("range").unwrap();
        assert_eq!(range.min_args, 2);
        assert_eq!(range.max_args(), 3);
    }

    #[test]
    fn test_argument_type_names_kinds() {
        let mut host = TestHost::new();
        let err = call(&mut host, "sin", vec![Value::string("x")]).unwrap_err();
        assert_eq!(err.argument_index(), Some(0));
        let message = err.to_string();
        assert!(message.contains("Number"));
        assert!(message.contains("String"));
        assert!(message.contains("'x'"));
    }

    #[test]
    fn test_missing_required_argument() {
        let mut host = TestHost::new();
        let err = call(&mut host, "atan2", vec![Value::Number(1.0)]).unwrap_err();
        assert_eq!(
            err,
            Error::MissingArgument {
                function: "atan2",
                param: "x",
                arg: 1
            }
        );
    }

    #[test]
    fn test_second_argument_is_anchored() {
        let mut host = TestHost::new();
        let err = call(
            &mut host,
            "pow",
            vec![Value::Number(2.0), Value::string("3")],
        )
        .unwrap_err();
        assert_eq!(err.argument_index(), Some(1));
    }

    #[test]
    fn test_any_kind_parameter() {
        let mut host = TestHost::new();
        let s = call(&mut host, "str", vec![Value::Number(3.0)]).unwrap();
        assert_eq!(s, Value::string("3"));
    }
}
