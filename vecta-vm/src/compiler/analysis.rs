// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Pre-pass over a body to find the variables it can assign.
//!
//! Every assigned name gets a fixed slot between the frame's result slot
//! and its temporaries, so the VM knows where temporaries begin before the
//! first statement runs. Declarations nested in the body are compiled as
//! their own chunks and are not walked.

use std::rc::Rc;

use indexmap::IndexSet;
use vecta_parser::{Ast, ExprId, ExprKind};

/// Slot names for a body: `params` first, then assigned names in order of
/// first appearance.
pub fn collect_locals(ast: &Ast, params: &[String], body: &[ExprId]) -> Vec<Rc<str>> {
    let mut names: IndexSet<Rc<str>> = params.iter().map(|p| Rc::from(p.as_str())).collect();
    for id in body {
        walk(ast, *id, &mut names);
    }
    names.into_iter().collect()
}

fn walk(ast: &Ast, id: ExprId, names: &mut IndexSet<Rc<str>>) {
    match ast.kind(id) {
        ExprKind::Function { body: Some(_), .. } => return,
        ExprKind::Assignment { target, .. } => {
            if let Some(name) = assigned_root(ast, *target) {
                names.insert(Rc::from(name));
            }
        }
        ExprKind::For { variable, .. } => {
            names.insert(Rc::from(variable.as_str()));
        }
        _ => {}
    }
    for child in ast.kind(id).child_ids() {
        walk(ast, child, names);
    }
}

/// Variable an assignment target writes to: `x` or the root of `x[i][j]`.
pub fn assigned_root(ast: &Ast, target: ExprId) -> Option<&str> {
    match ast.kind(target) {
        ExprKind::Identifier(name) => Some(name),
        ExprKind::Index { target, .. } => ast.identifier(*target),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecta_parser::parse;

    fn locals_of(source: &str) -> Vec<String> {
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        collect_locals(&result.ast, &[], &result.statements)
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    #[test]
    fn test_assignments_in_order() {
        assert_eq!(locals_of("a = 1\nb = 2\na = 3"), vec!["a", "b"]);
    }

    #[test]
    fn test_loop_and_index_targets() {
        let names = locals_of("m = [1, 2]\nfor i in range(0, 2) {\nm[i] = 0\nt = i\n}");
        assert_eq!(names, vec!["m", "i", "t"]);
    }

    #[test]
    fn test_nested_declarations_are_skipped() {
        let names = locals_of("f(x) {\ny = x\n}\nz = f(1)");
        assert_eq!(names, vec!["z"]);
    }

    #[test]
    fn test_params_come_first() {
        let result = parse("y = 1");
        let names = collect_locals(&result.ast, &["p".to_string()], &result.statements);
        assert_eq!(names.len(), 2);
        assert_eq!(&*names[0], "p");
    }
}
