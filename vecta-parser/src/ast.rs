// vecta-parser - Abstract syntax tree
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arena-allocated abstract syntax tree.
//!
//! Nodes live in an [`Ast`] and refer to each other by [`ExprId`]. Parent
//! links and child lists are filled in after parsing (see
//! [`crate::hierarchy`]); they are non-owning indices into the same arena.

use std::fmt;

use serde::Serialize;

use crate::position::TextPosition;

/// Index of a node in its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ExprId(pub u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength; lower numbers bind tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => 2,
            BinaryOp::And => 3,
            BinaryOp::Or => 4,
            BinaryOp::Mul | BinaryOp::Div => 7,
            BinaryOp::Add | BinaryOp::Sub => 8,
        }
    }

    /// The loosest binary precedence.
    pub const LOOSEST: u8 = 8;

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Whether the operator produces a truth value (1 or 0).
    pub fn is_comparison(self) -> bool {
        self.precedence() == 2
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    /// `->>> expr` records the value in the print log and passes it through.
    Print,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Print => "->>>",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Direction of a ranged for loop, fixed by the range function's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDirection {
    /// `range(lo, hi)`: counts up while `i < hi`.
    Ascending,
    /// `rrange(lo, hi)`: counts down while `i > hi`.
    Descending,
}

impl RangeDirection {
    pub fn from_function_name(name: &str) -> Option<Self> {
        match name {
            "range" => Some(RangeDirection::Ascending),
            "rrange" => Some(RangeDirection::Descending),
            _ => None,
        }
    }

    /// Step used when the loop does not give one.
    pub fn default_step(self) -> f64 {
        match self {
            RangeDirection::Ascending => 1.0,
            RangeDirection::Descending => -1.0,
        }
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    /// `^`: the value of the previous statement.
    PreviousResult,
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Number(f64),
    List(Vec<ExprId>),
    Vector(Vec<ExprId>),
    /// Key/value pairs in source order.
    Map(Vec<(ExprId, ExprId)>),
    String(String),
    Ternary {
        condition: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    Block(Vec<ExprId>),
    /// `target[i][j]`: all chained indices belong to one node.
    Index {
        target: ExprId,
        indices: Vec<ExprId>,
    },
    /// A declaration when `body` is present (its `args` are the parameter
    /// identifiers), otherwise a call.
    Function {
        name: String,
        args: Vec<ExprId>,
        body: Option<ExprId>,
    },
    For {
        variable: String,
        direction: RangeDirection,
        /// The `range(..)`/`rrange(..)` call node.
        range: ExprId,
        body: ExprId,
    },
    Assignment {
        target: ExprId,
        value: ExprId,
    },
}

impl ExprKind {
    /// Child node ids in source order.
    pub fn child_ids(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Identifier(_)
            | ExprKind::PreviousResult
            | ExprKind::Number(_)
            | ExprKind::String(_) => Vec::new(),
            ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::List(items) | ExprKind::Vector(items) | ExprKind::Block(items) => {
                items.clone()
            }
            ExprKind::Map(entries) => entries.iter().flat_map(|(k, v)| [*k, *v]).collect(),
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => vec![*condition, *then_branch, *else_branch],
            ExprKind::Index { target, indices } => {
                let mut ids = vec![*target];
                ids.extend(indices.iter().copied());
                ids
            }
            ExprKind::Function { args, body, .. } => {
                let mut ids = args.clone();
                ids.extend(body.iter().copied());
                ids
            }
            ExprKind::For { range, body, .. } => vec![*range, *body],
            ExprKind::Assignment { target, value } => vec![*target, *value],
        }
    }

    /// Short variant name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Identifier(_) => "identifier",
            ExprKind::PreviousResult => "previous result",
            ExprKind::Binary { .. } => "binary operation",
            ExprKind::Unary { .. } => "unary operation",
            ExprKind::Number(_) => "number",
            ExprKind::List(_) => "list",
            ExprKind::Vector(_) => "vector",
            ExprKind::Map(_) => "map",
            ExprKind::String(_) => "string",
            ExprKind::Ternary { .. } => "conditional",
            ExprKind::Block(_) => "block",
            ExprKind::Index { .. } => "index",
            ExprKind::Function { body: Some(_), .. } => "function declaration",
            ExprKind::Function { body: None, .. } => "function call",
            ExprKind::For { .. } => "for loop",
            ExprKind::Assignment { .. } => "assignment",
        }
    }
}

/// One node in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: ExprKind,
    pub start: TextPosition,
    pub end: TextPosition,
    pub parent: Option<ExprId>,
    pub children: Vec<ExprId>,
}

impl Node {
    /// Whether `byte_offset` falls inside this node's span (end inclusive).
    pub fn contains_offset(&self, byte_offset: usize) -> bool {
        self.start.byte_offset <= byte_offset && byte_offset <= self.end.byte_offset
    }
}

/// Arena holding every node of a parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Ast { nodes: Vec::new() }
    }

    /// Add a node and return its id.
    pub fn push(&mut self, kind: ExprKind, start: TextPosition, end: TextPosition) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            start,
            end,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    #[inline]
    pub fn node(&self, id: ExprId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: ExprId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.nodes[id.index()].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (ExprId(i as u32), n))
    }

    /// Name of an identifier node.
    pub fn identifier(&self, id: ExprId) -> Option<&str> {
        match self.kind(id) {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Parameter names of a function declaration node.
    pub fn parameters(&self, id: ExprId) -> Vec<String> {
        match self.kind(id) {
            ExprKind::Function { args, .. } => args
                .iter()
                .filter_map(|a| self.identifier(*a).map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
