// vecta-parser - Lexer and parser for the Vecta language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # vecta-parser
//!
//! Lexer and parser for the Vecta language.
//! Produces a positioned, arena-allocated AST plus error and warning
//! diagnostics from source code strings.

pub mod ast;
pub mod hierarchy;
pub mod lexer;
pub mod parser;
pub mod position;

pub use ast::{Ast, BinaryOp, ExprId, ExprKind, Node, RangeDirection, UnaryOp};
pub use lexer::{Lexer, SpannedToken, Token};
pub use parser::{ParseResult, Parser, parse};
pub use position::{Diagnostic, TextPosition};
