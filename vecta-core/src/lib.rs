// vecta-core - Values, builtins and outputs for the Vecta language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # vecta-core
//!
//! Runtime value model for the Vecta language: tagged values with strided
//! matrices, the operator table, indexing, the builtin registry and the
//! output side-table builtins write into.

pub mod builtins;
pub mod config;
pub mod error;
pub mod index;
pub mod matrix;
pub mod ops;
pub mod output;
pub mod random;
pub mod value;

pub use builtins::{Builtin, BuiltinHost, FunctionEvaluator, Param, Registry, registry};
pub use config::InterpreterConfig;
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use output::{Graph, Heatmap, Image, Line, Outputs, Plot, PrintEntry, SliderInput};
pub use random::Rng;
pub use value::{FunctionRef, MapKey, Value, ValueKind};
