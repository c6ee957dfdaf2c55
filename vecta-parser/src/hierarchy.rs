// vecta-parser - AST parent/child links
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Post-parse pass that links every node to its parent and children, and
//! cursor lookup built on those links.

use tracing::warn;

use crate::ast::{Ast, ExprId};
use crate::position::Diagnostic;

/// Fill in `parent` and `children` for every node in the arena.
///
/// Returns an internal-error diagnostic for each node whose span does not
/// contain its children, or whose children are out of source order.
pub fn link(ast: &mut Ast) -> Vec<Diagnostic> {
    let mut problems = Vec::new();

    for index in 0..ast.len() {
        let id = ExprId(index as u32);
        let children = ast.kind(id).child_ids();
        for child in &children {
            ast.node_mut(*child).parent = Some(id);
        }
        ast.node_mut(id).children = children;
    }

    for (id, node) in ast.iter() {
        let mut previous_start = node.start;
        for child_id in &node.children {
            let child = ast.node(*child_id);
            let contained = node.start <= child.start && child.end <= node.end;
            let ordered = previous_start <= child.start;
            if !contained || !ordered {
                warn!(
                    parent = id.0,
                    child = child_id.0,
                    "AST span invariant violated"
                );
                problems.push(Diagnostic::new(
                    child.start,
                    format!(
                        "internal error: {} is not inside its parent {}",
                        child.kind.describe(),
                        node.kind.describe()
                    ),
                ));
            }
            previous_start = child.start;
        }
    }

    problems
}

/// Innermost node among `roots` (and their descendants) whose span contains
/// `byte_offset`.
pub fn node_at(ast: &Ast, roots: &[ExprId], byte_offset: usize) -> Option<ExprId> {
    let mut current = roots
        .iter()
        .copied()
        .find(|r| ast.node(*r).contains_offset(byte_offset))?;

    while let Some(child) = ast
        .node(current)
        .children
        .iter()
        .copied()
        .find(|c| ast.node(*c).contains_offset(byte_offset))
    {
        current = child;
    }

    Some(current)
}
