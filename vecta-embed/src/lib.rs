// vecta-embed - Embedding API for Vecta
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # vecta-embed
//!
//! A high-level embedding API for the Vecta expression language.
//!
//! The [`Engine`] runs whole documents and keeps the previous run around so
//! slider inputs survive edits, the way a live editor re-runs a notebook.
//!
//! ## Quick Start
//!
//! ```rust
//! use vecta_embed::Engine;
//!
//! let mut engine = Engine::new();
//! let report = engine.run("v = #[1, 2, 3]\nprint(v * 2)\nlen(v)");
//! assert_eq!(report.outputs.prints[0].value.to_string(), "#[2, 4, 6]");
//! assert_eq!(report.value.unwrap().to_string(), "3");
//! ```
//!
//! ## Sliders
//!
//! ```rust
//! use vecta_embed::Engine;
//!
//! let mut engine = Engine::new();
//! let source = "k = slider(\"k\", 0, 10)\nk * k";
//! engine.run(source);
//! engine.set_input("k", 3.0);
//! let n: f64 = engine.eval_as(source).unwrap();
//! assert_eq!(n, 9.0);
//! ```

mod convert;
mod engine;
mod error;

pub use convert::{FromValue, IntoValue, from_value, to_value};
pub use engine::{Engine, RunReport};
pub use error::{Error, Result};

// Re-export core types for convenience
pub use vecta_core::{InterpreterConfig, Outputs, Value};
pub use vecta_parser::{Diagnostic, TextPosition};
pub use vecta_vm::{Interpreter, RunState, step_program};
