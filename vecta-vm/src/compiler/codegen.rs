// vecta-vm - Instruction compiler and stepping virtual machine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Code generation: turns the AST into one instruction tape per function
//! plus one for the entry point.

use std::rc::Rc;

use tracing::debug;
use vecta_core::registry;
use vecta_parser::{ExprId, ExprKind, ParseResult, RangeDirection};

use super::analysis::collect_locals;
use super::types::{CompileError, Result};
use crate::chunk::{Chunk, Program};
use crate::opcode::OpCode;

/// Compiles a parsed document into a [`Program`].
pub struct Compiler<'a> {
    parse: &'a ParseResult,
}

impl<'a> Compiler<'a> {
    pub fn new(parse: &'a ParseResult) -> Self {
        Compiler { parse }
    }

    /// Compile every declared function, then the top-level statements.
    /// Function ids follow declaration order.
    pub fn compile(&self) -> Result<Program> {
        let mut chunks = Vec::with_capacity(self.parse.functions.len() + 1);
        for (name, decl) in &self.parse.functions {
            chunks.push(self.compile_function(name, *decl)?);
        }
        chunks.push(self.compile_main()?);

        let program = Program { chunks };
        debug!(
            functions = program.function_count(),
            steps = program.chunks.iter().map(Chunk::len).sum::<usize>(),
            "compiled program"
        );
        Ok(program)
    }

    fn compile_function(&self, name: &str, decl: ExprId) -> Result<Chunk> {
        let ast = &self.parse.ast;
        let params = ast.parameters(decl);
        let statements: &[ExprId] = match ast.kind(decl) {
            ExprKind::Function {
                body: Some(body), ..
            } => match ast.kind(*body) {
                ExprKind::Block(statements) => statements,
                _ => return Err(self.internal(decl, "function body is not a block")),
            },
            _ => return Err(self.internal(decl, "not a function declaration")),
        };

        let mut chunk = Chunk::new(name, params);
        chunk.locals = collect_locals(ast, &chunk.params, statements);
        let mut compiler = ChunkCompiler::new(self.parse, chunk);
        compiler.compile_body(statements)?;
        Ok(compiler.finish())
    }

    fn compile_main(&self) -> Result<Chunk> {
        let mut chunk = Chunk::new("main", Vec::new());
        chunk.locals = collect_locals(&self.parse.ast, &[], &self.parse.statements);
        let mut compiler = ChunkCompiler::new(self.parse, chunk);
        compiler.compile_body(&self.parse.statements)?;
        Ok(compiler.finish())
    }

    fn internal(&self, id: ExprId, message: &str) -> CompileError {
        CompileError::Internal {
            message: message.to_string(),
            position: self.parse.ast.node(id).start,
        }
    }
}

/// Emits the steps of a single chunk, tracking how many temporaries are
/// live above the frame's temporary base.
struct ChunkCompiler<'a> {
    parse: &'a ParseResult,
    chunk: Chunk,
    depth: usize,
    /// Depths of the enclosing block result slots, innermost last.
    block_slots: Vec<usize>,
}

impl<'a> ChunkCompiler<'a> {
    fn new(parse: &'a ParseResult, chunk: Chunk) -> Self {
        ChunkCompiler {
            parse,
            chunk,
            depth: 0,
            block_slots: Vec::new(),
        }
    }

    fn finish(self) -> Chunk {
        self.chunk
    }

    // ========================================================================
    // Emission
    // ========================================================================

    fn emit(&mut self, op: OpCode, expr: ExprId) {
        if let Some(effect) = op.stack_effect() {
            self.depth = self.depth.saturating_add_signed(effect);
            self.chunk.max_depth = self.chunk.max_depth.max(self.depth);
        }
        self.chunk.emit(op, expr);
    }

    fn emit_jump(&mut self, op: OpCode, expr: ExprId) -> usize {
        let offset = self.chunk.current_offset();
        self.emit(op, expr);
        offset
    }

    fn position(&self, id: ExprId) -> vecta_parser::TextPosition {
        self.parse.ast.node(id).start
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Frame-level statements: each value lands in the frame result slot.
    fn compile_body(&mut self, statements: &[ExprId]) -> Result<()> {
        for statement in statements {
            self.compile_expr(*statement)?;
            self.emit(OpCode::EndStatement, *statement);
            self.depth = 0;
        }
        Ok(())
    }

    /// A nested block opens a result slot at the current depth; its value
    /// is whatever the last statement left there.
    fn compile_block(&mut self, id: ExprId, statements: &[ExprId]) -> Result<()> {
        let slot = self.depth;
        self.emit(OpCode::ClearLastBlockResult, id);
        self.block_slots.push(slot);
        for statement in statements {
            self.compile_expr(*statement)?;
            self.emit(OpCode::EndNestedStatement(slot), *statement);
            self.depth = slot + 1;
        }
        self.block_slots.pop();
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn compile_expr(&mut self, id: ExprId) -> Result<()> {
        let parse = self.parse;
        match parse.ast.kind(id) {
            ExprKind::Number(n) => self.emit(OpCode::PushNumber(*n), id),
            ExprKind::String(s) => self.emit(OpCode::PushString(Rc::from(s.as_str())), id),
            ExprKind::Identifier(name) => self.compile_identifier(id, name),
            ExprKind::PreviousResult => {
                let slot = self.block_slots.last().copied();
                self.emit(OpCode::LoadPreviousResult(slot), id);
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.compile_expr(*lhs)?;
                self.compile_expr(*rhs)?;
                self.emit(OpCode::Binary(*op), id);
            }
            ExprKind::Unary { op, operand } => {
                self.compile_expr(*operand)?;
                self.emit(OpCode::Unary(*op), id);
            }
            ExprKind::List(items) => {
                for item in items {
                    self.compile_expr(*item)?;
                }
                self.emit(OpCode::BuildList(items.len()), id);
            }
            ExprKind::Vector(items) => {
                for item in items {
                    self.compile_expr(*item)?;
                }
                self.emit(OpCode::BuildVector(items.len()), id);
            }
            ExprKind::Map(entries) => {
                for (key, value) in entries {
                    self.compile_expr(*key)?;
                    self.compile_expr(*value)?;
                }
                self.emit(OpCode::BuildMap(entries.len()), id);
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => self.compile_ternary(id, *condition, *then_branch, *else_branch)?,
            ExprKind::Block(statements) => self.compile_block(id, statements)?,
            ExprKind::Index { target, indices } => {
                self.compile_expr(*target)?;
                for index in indices {
                    self.compile_expr(*index)?;
                }
                self.emit(OpCode::IndexRead(indices.len()), id);
            }
            ExprKind::Function {
                name,
                body: Some(_),
                ..
            } => {
                let fid = self.user_function(name).ok_or_else(|| CompileError::Internal {
                    message: format!("function '{}' was not registered", name),
                    position: self.position(id),
                })?;
                self.emit(OpCode::PushFunction(fid), id);
            }
            ExprKind::Function {
                name,
                args,
                body: None,
            } => self.compile_call(id, name, args)?,
            ExprKind::For {
                variable,
                direction,
                range,
                body,
            } => self.compile_for(id, variable, *direction, *range, *body)?,
            ExprKind::Assignment { target, value } => {
                self.compile_assignment(id, *target, *value)?
            }
        }
        Ok(())
    }

    fn user_function(&self, name: &str) -> Option<usize> {
        self.parse.functions.get_index_of(name)
    }

    fn compile_identifier(&mut self, id: ExprId, name: &str) {
        if let Some(fid) = self.user_function(name) {
            self.emit(OpCode::PushFunction(fid), id);
        } else if let Some(builtin) = registry().lookup(name) {
            self.emit(OpCode::PushBuiltin(builtin.id), id);
        } else {
            self.emit(OpCode::LoadVariable(Rc::from(name)), id);
        }
    }

    fn compile_ternary(
        &mut self,
        id: ExprId,
        condition: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    ) -> Result<()> {
        self.compile_expr(condition)?;
        let else_jump = self.emit_jump(OpCode::JumpIfFalse(0), id);

        let depth = self.depth;
        self.compile_expr(then_branch)?;
        let end_jump = self.emit_jump(OpCode::Jump(0), id);

        self.chunk.patch_jump(else_jump);
        self.depth = depth;
        self.compile_expr(else_branch)?;

        self.chunk.patch_jump(end_jump);
        Ok(())
    }

    /// Calls resolve to a user function first, then to a builtin.
    fn compile_call(&mut self, id: ExprId, name: &str, args: &[ExprId]) -> Result<()> {
        if let Some(fid) = self.user_function(name) {
            let decl = self.parse.functions[fid];
            let max = self.parse.ast.parameters(decl).len();
            if args.len() > max {
                return Err(CompileError::TooManyArguments {
                    name: name.to_string(),
                    max,
                    got: args.len(),
                    position: self.position(id),
                });
            }
            self.emit(OpCode::ClearLastBlockResult, id);
            for arg in args {
                self.compile_expr(*arg)?;
            }
            self.emit(
                OpCode::CallFunction {
                    id: fid,
                    argc: args.len(),
                },
                id,
            );
            return Ok(());
        }

        let Some(builtin) = registry().lookup(name) else {
            return Err(CompileError::UnknownFunction {
                name: name.to_string(),
                position: self.position(id),
            });
        };
        if args.len() > builtin.max_args() {
            return Err(CompileError::TooManyArguments {
                name: name.to_string(),
                max: builtin.max_args(),
                got: args.len(),
                position: self.position(id),
            });
        }
        for arg in args {
            self.compile_expr(*arg)?;
        }
        self.emit(
            OpCode::CallBuiltin {
                id: builtin.id,
                argc: args.len(),
            },
            id,
        );
        Ok(())
    }

    /// `for v in range(lo, hi[, step]) { body }`. The bound and the step
    /// are evaluated again on every iteration.
    fn compile_for(
        &mut self,
        id: ExprId,
        variable: &str,
        direction: RangeDirection,
        range: ExprId,
        body: ExprId,
    ) -> Result<()> {
        let parse = self.parse;
        let args = match parse.ast.kind(range) {
            ExprKind::Function {
                args, body: None, ..
            } if (2..=3).contains(&args.len()) => args,
            _ => {
                return Err(CompileError::InvalidLoop {
                    position: self.position(range),
                });
            }
        };
        let name: Rc<str> = Rc::from(variable);

        self.compile_expr(args[0])?;
        self.emit(
            OpCode::SetVariable {
                name: Rc::clone(&name),
                keep: false,
            },
            id,
        );

        let slot = self.depth;
        self.emit(OpCode::ClearLastBlockResult, id);

        let head = self.chunk.current_offset();
        self.emit(OpCode::LoadVariable(Rc::clone(&name)), range);
        self.compile_expr(args[1])?;
        let compare = match direction {
            RangeDirection::Ascending => vecta_parser::BinaryOp::Lt,
            RangeDirection::Descending => vecta_parser::BinaryOp::Gt,
        };
        self.emit(OpCode::Binary(compare), range);
        let exit = self.emit_jump(OpCode::JumpIfFalse(0), range);

        self.compile_expr(body)?;
        self.emit(OpCode::EndNestedStatement(slot), body);
        self.depth = slot + 1;

        match args.get(2) {
            Some(step) => self.compile_expr(*step)?,
            None => self.emit(OpCode::PushNumber(direction.default_step()), range),
        }
        self.emit(OpCode::IncrementVariable(name), range);
        self.emit(OpCode::Jump(head), id);

        self.chunk.patch_jump(exit);
        Ok(())
    }

    fn compile_assignment(&mut self, id: ExprId, target: ExprId, value: ExprId) -> Result<()> {
        let parse = self.parse;
        match parse.ast.kind(target) {
            ExprKind::Identifier(name) => {
                self.check_assignable(target, name)?;
                self.compile_expr(value)?;
                self.emit(
                    OpCode::SetVariable {
                        name: Rc::from(name.as_str()),
                        keep: true,
                    },
                    id,
                );
            }
            ExprKind::Index {
                target: root,
                indices,
            } => {
                let Some(name) = parse.ast.identifier(*root) else {
                    return Err(CompileError::NotAssignable {
                        what: "computed value",
                        position: self.position(*root),
                    });
                };
                self.check_assignable(*root, name)?;
                let name: Rc<str> = Rc::from(name);
                self.emit(OpCode::LoadVariable(Rc::clone(&name)), *root);
                for index in indices {
                    self.compile_expr(*index)?;
                }
                self.compile_expr(value)?;
                self.emit(
                    OpCode::IndexWrite {
                        name,
                        depth: indices.len(),
                    },
                    id,
                );
            }
            other => {
                return Err(CompileError::NotAssignable {
                    what: other.describe(),
                    position: self.position(target),
                });
            }
        }
        Ok(())
    }

    fn check_assignable(&self, target: ExprId, name: &str) -> Result<()> {
        if self.user_function(name).is_some() {
            return Err(CompileError::AssignToFunction {
                name: name.to_string(),
                position: self.position(target),
            });
        }
        if registry().lookup(name).is_some() {
            return Err(CompileError::AssignToBuiltin {
                name: name.to_string(),
                position: self.position(target),
            });
        }
        Ok(())
    }
}
