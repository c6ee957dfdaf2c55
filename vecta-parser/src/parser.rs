// vecta-parser - Parser for Vecta
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser for Vecta source code.
//!
//! Binary operators are parsed by precedence climbing; prefix operators are
//! right-recursive. Parsing never fails outright: errors are collected as
//! diagnostics and the parser resynchronises at the next line.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Ast, BinaryOp, ExprId, ExprKind, RangeDirection, UnaryOp};
use crate::hierarchy;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::position::{Diagnostic, TextPosition};

/// Everything produced by parsing one document.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The original source text.
    pub text: String,
    pub ast: Ast,
    /// Top-level statements in source order.
    pub statements: Vec<ExprId>,
    /// Declared functions by name, in declaration order.
    pub functions: IndexMap<String, ExprId>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Declaration node of a user function.
    pub fn function(&self, name: &str) -> Option<ExprId> {
        self.functions.get(name).copied()
    }

    /// Source text covered by a node.
    pub fn source_of(&self, id: ExprId) -> &str {
        let node = self.ast.node(id);
        self.text
            .get(node.start.byte_offset..node.end.byte_offset)
            .unwrap_or("")
    }

    /// Innermost node under a cursor at `byte_offset`.
    pub fn node_at(&self, byte_offset: usize) -> Option<ExprId> {
        hierarchy::node_at(&self.ast, &self.statements, byte_offset)
    }
}

/// Parse a whole document.
pub fn parse(text: &str) -> ParseResult {
    Parser::new(text).parse()
}

/// Parser error with position information.
#[derive(Debug, Clone)]
struct ParseError {
    position: TextPosition,
    message: String,
    /// Input ended inside an open construct; parsing stops.
    fatal: bool,
}

impl ParseError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(self.position, self.message)
    }
}

type PResult<T> = Result<T, ParseError>;

/// The parser converts tokens into an [`Ast`].
pub struct Parser<'a> {
    text: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    ast: Ast,
    functions: IndexMap<String, ExprId>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    /// Open list, vector, map and index brackets; newlines are skipped
    /// while this is non-zero.
    literal_depth: usize,
    /// Token index where the current statement began.
    statement_start: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source code.
    pub fn new(text: &'a str) -> Self {
        Parser {
            text,
            tokens: Lexer::new(text).tokenize(),
            pos: 0,
            ast: Ast::new(),
            functions: IndexMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            literal_depth: 0,
            statement_start: 0,
        }
    }

    /// Parse the whole document.
    pub fn parse(mut self) -> ParseResult {
        let mut statements = Vec::new();
        if let Err(fatal) = self.parse_statements(&mut statements, None) {
            self.errors.push(fatal.into_diagnostic());
        }

        let problems = hierarchy::link(&mut self.ast);
        self.errors.extend(problems);
        self.warn_unused_functions();

        debug!(
            statements = statements.len(),
            functions = self.functions.len(),
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "parsed program"
        );

        ParseResult {
            text: self.text.to_string(),
            ast: self.ast,
            statements,
            functions: self.functions,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    // ========================================================================
    // Token navigation
    // ========================================================================

    fn current_index(&self) -> usize {
        let mut i = self.pos;
        if self.literal_depth > 0 {
            while self.tokens[i].token == Token::Newline {
                i += 1;
            }
        }
        i
    }

    fn current(&self) -> &SpannedToken {
        &self.tokens[self.current_index()]
    }

    fn check(&self, token: &Token) -> bool {
        &self.current().token == token
    }

    fn advance(&mut self) -> SpannedToken {
        let i = self.current_index();
        let token = self.tokens[i].clone();
        self.pos = if token.token == Token::Eof { i } else { i + 1 };
        token
    }

    fn error(&self, position: TextPosition, message: impl Into<String>) -> ParseError {
        ParseError {
            position,
            message: message.into(),
            fatal: false,
        }
    }

    fn unexpected(&self) -> ParseError {
        let current = self.current();
        let message = match &current.token {
            Token::Invalid(message) => message.clone(),
            Token::Eof => "unexpected end of input".to_string(),
            Token::Newline => "unexpected end of line".to_string(),
            other => format!("unexpected '{}'", other),
        };
        self.error(current.start, message)
    }

    /// Consume the closing delimiter of a construct opened at `open`.
    fn expect_close(
        &mut self,
        close: Token,
        what: &str,
        open: TextPosition,
    ) -> PResult<SpannedToken> {
        if self.check(&close) {
            return Ok(self.advance());
        }
        let current = self.current();
        if current.token == Token::Eof {
            return Err(ParseError {
                position: open,
                message: format!("unterminated {}", what),
                fatal: true,
            });
        }
        if let Token::Invalid(message) = &current.token {
            return Err(self.error(current.start, message.clone()));
        }
        Err(self.error(
            current.start,
            format!("expected '{}' but found '{}'", close, current.token),
        ))
    }

    /// Skip to the end of the line (or the enclosing block's `}`).
    fn synchronize(&mut self, in_block: bool) {
        self.literal_depth = 0;
        loop {
            match self.current().token {
                Token::Newline | Token::Eof => break,
                Token::RBrace if in_block => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn push(&mut self, kind: ExprKind, start: TextPosition, end: TextPosition) -> ExprId {
        self.ast.push(kind, start, end)
    }

    fn start_of(&self, id: ExprId) -> TextPosition {
        self.ast.node(id).start
    }

    fn end_of(&self, id: ExprId) -> TextPosition {
        self.ast.node(id).end
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse statements until end of input, or until `}` when `block_open`
    /// is the position of an enclosing `{`. Only fatal errors are returned;
    /// everything else is recorded and skipped.
    fn parse_statements(
        &mut self,
        statements: &mut Vec<ExprId>,
        block_open: Option<TextPosition>,
    ) -> PResult<()> {
        let in_block = block_open.is_some();
        // End line of the previous statement, cleared by a separator.
        let mut previous_end_line: Option<usize> = None;

        loop {
            match self.current().token {
                Token::Newline | Token::Semicolon => {
                    self.advance();
                    previous_end_line = None;
                    continue;
                }
                Token::Eof => {
                    return match block_open {
                        Some(open) => Err(ParseError {
                            position: open,
                            message: "unterminated block".to_string(),
                            fatal: true,
                        }),
                        None => Ok(()),
                    };
                }
                Token::RBrace if in_block => return Ok(()),
                _ => {}
            }

            self.statement_start = self.current_index();
            match self.parse_expr() {
                Ok(statement) => {
                    let start = self.start_of(statement);
                    if previous_end_line == Some(start.line) {
                        self.errors.push(Diagnostic::new(
                            start,
                            "multiple statements on the same line",
                        ));
                        self.synchronize(in_block);
                        previous_end_line = None;
                    } else {
                        previous_end_line = Some(self.end_of(statement).line);
                        statements.push(statement);
                    }
                }
                Err(e) if e.fatal => return Err(e),
                Err(e) => {
                    self.errors.push(e.into_diagnostic());
                    self.synchronize(in_block);
                    previous_end_line = None;
                }
            }
        }
    }

    fn parse_block(&mut self) -> PResult<ExprId> {
        let open = self.advance();
        let saved_depth = std::mem::replace(&mut self.literal_depth, 0);
        let saved_start = self.statement_start;

        let mut statements = Vec::new();
        self.parse_statements(&mut statements, Some(open.start))?;
        let close = self.expect_close(Token::RBrace, "block", open.start)?;

        self.literal_depth = saved_depth;
        self.statement_start = saved_start;

        if statements.is_empty() {
            self.warnings
                .push(Diagnostic::new(open.start, "empty block"));
        }
        Ok(self.push(ExprKind::Block(statements), open.start, close.end))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expr(&mut self) -> PResult<ExprId> {
        let condition = self.parse_binary(BinaryOp::LOOSEST)?;
        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance();
        let then_branch = self.parse_expr()?;
        if !self.check(&Token::Colon) {
            let current = self.current();
            return Err(self.error(
                current.start,
                format!("expected ':' but found '{}'", current.token),
            ));
        }
        self.advance();
        let else_branch = self.parse_expr()?;
        let (start, end) = (self.start_of(condition), self.end_of(else_branch));
        Ok(self.push(
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            },
            start,
            end,
        ))
    }

    /// Precedence climbing: only operators binding at least as tightly as
    /// `max_precedence` are consumed here.
    fn parse_binary(&mut self, max_precedence: u8) -> PResult<ExprId> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = binary_op(&self.current().token) {
            let precedence = op.precedence();
            if precedence > max_precedence {
                break;
            }
            self.advance();
            // Left associative: the right operand only takes tighter operators.
            let rhs = self.parse_binary(precedence - 1)?;
            let (start, end) = (self.start_of(lhs), self.end_of(rhs));
            lhs = self.push(ExprKind::Binary { op, lhs, rhs }, start, end);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<ExprId> {
        let op = match self.current().token {
            Token::Bang => UnaryOp::Not,
            Token::Print => UnaryOp::Print,
            Token::Minus => return self.parse_negation(),
            Token::Plus => {
                let plus = self.advance();
                return match self.adjacent_number(&plus) {
                    Some(n) => {
                        let number = self.advance();
                        Ok(self.push(ExprKind::Number(n), plus.start, number.end))
                    }
                    None => Err(self.error(plus.start, "unexpected '+'")),
                };
            }
            _ => return self.parse_postfix(),
        };
        let token = self.advance();
        let operand = self.parse_unary()?;
        let end = self.end_of(operand);
        Ok(self.push(ExprKind::Unary { op, operand }, token.start, end))
    }

    /// `-` folds into an adjacent number literal, otherwise `-x` becomes `0 - x`.
    fn parse_negation(&mut self) -> PResult<ExprId> {
        let minus = self.advance();
        if let Some(n) = self.adjacent_number(&minus) {
            let number = self.advance();
            return Ok(self.push(ExprKind::Number(-n), minus.start, number.end));
        }
        let zero = self.push(ExprKind::Number(0.0), minus.start, minus.end);
        let operand = self.parse_unary()?;
        let end = self.end_of(operand);
        Ok(self.push(
            ExprKind::Binary {
                op: BinaryOp::Sub,
                lhs: zero,
                rhs: operand,
            },
            minus.start,
            end,
        ))
    }

    fn adjacent_number(&self, sign: &SpannedToken) -> Option<f64> {
        let current = self.current();
        match current.token {
            Token::Number(n) if current.start.byte_offset == sign.end.byte_offset => Some(n),
            _ => None,
        }
    }

    /// A primary followed by index brackets and, at statement root, `=`.
    fn parse_postfix(&mut self) -> PResult<ExprId> {
        let first_token = self.current_index();
        let mut expr = self.parse_primary()?;

        if self.check(&Token::LBracket) {
            let mut indices = Vec::new();
            let mut end = self.end_of(expr);
            while self.check(&Token::LBracket) {
                let open = self.advance();
                self.literal_depth += 1;
                indices.push(self.parse_expr()?);
                let close = self.expect_close(Token::RBracket, "index", open.start)?;
                self.literal_depth -= 1;
                end = close.end;
            }
            let start = self.start_of(expr);
            expr = self.push(
                ExprKind::Index {
                    target: expr,
                    indices,
                },
                start,
                end,
            );
        }

        if !self.check(&Token::Assign) {
            return Ok(expr);
        }

        let assign = self.current().start;
        if first_token != self.statement_start {
            return Err(self.error(
                assign,
                "assignment is only allowed at the start of a statement",
            ));
        }
        if !self.is_assignable(expr) {
            return Err(self.error(
                assign,
                format!("cannot assign to a {}", self.ast.kind(expr).describe()),
            ));
        }
        self.advance();
        let value = self.parse_expr()?;
        let (start, end) = (self.start_of(expr), self.end_of(value));
        Ok(self.push(ExprKind::Assignment { target: expr, value }, start, end))
    }

    fn is_assignable(&self, id: ExprId) -> bool {
        match self.ast.kind(id) {
            ExprKind::Identifier(_) => true,
            ExprKind::Index { target, .. } => {
                matches!(self.ast.kind(*target), ExprKind::Identifier(_))
            }
            _ => false,
        }
    }

    fn parse_primary(&mut self) -> PResult<ExprId> {
        let token = self.current().clone();
        match token.token {
            Token::Number(n) => {
                self.advance();
                Ok(self.push(ExprKind::Number(n), token.start, token.end))
            }
            Token::String(s) => {
                self.advance();
                Ok(self.push(ExprKind::String(s), token.start, token.end))
            }
            Token::Caret => {
                self.advance();
                Ok(self.push(ExprKind::PreviousResult, token.start, token.end))
            }
            Token::LParen => {
                self.advance();
                let saved_depth = std::mem::replace(&mut self.literal_depth, 0);
                let inner = self.parse_expr()?;
                self.expect_close(Token::RParen, "parenthesis", token.start)?;
                self.literal_depth = saved_depth;
                Ok(inner)
            }
            Token::LBracket => {
                let (items, end) = self.parse_sequence(Token::RBracket, "list")?;
                Ok(self.push(ExprKind::List(items), token.start, end))
            }
            Token::HashBracket => {
                let (items, end) = self.parse_sequence(Token::RBracket, "vector")?;
                Ok(self.push(ExprKind::Vector(items), token.start, end))
            }
            Token::HashBrace => self.parse_map(),
            Token::LBrace => self.parse_block(),
            Token::For => self.parse_for(),
            Token::Identifier(name) => self.parse_identifier(name),
            _ => Err(self.unexpected()),
        }
    }

    /// Comma separated expressions after an opening bracket, up to `close`.
    fn parse_sequence(
        &mut self,
        close: Token,
        what: &str,
    ) -> PResult<(Vec<ExprId>, TextPosition)> {
        let open = self.advance();
        self.literal_depth += 1;
        let mut items = Vec::new();

        while !self.check(&close) {
            if self.check(&Token::Eof) {
                break;
            }
            items.push(self.parse_expr()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let end = self.expect_close(close, what, open.start)?.end;
        self.literal_depth -= 1;
        Ok((items, end))
    }

    fn parse_map(&mut self) -> PResult<ExprId> {
        let open = self.advance();
        self.literal_depth += 1;
        let mut entries = Vec::new();

        while !self.check(&Token::RBrace) {
            if self.check(&Token::Eof) {
                break;
            }
            let key = self.parse_expr()?;
            if !self.check(&Token::Colon) {
                let current = self.current();
                return Err(self.error(
                    current.start,
                    format!("expected ':' after map key but found '{}'", current.token),
                ));
            }
            self.advance();
            let value = self.parse_expr()?;
            entries.push((key, value));
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let close = self.expect_close(Token::RBrace, "map", open.start)?;
        self.literal_depth -= 1;
        Ok(self.push(ExprKind::Map(entries), open.start, close.end))
    }

    /// Call arguments after the function name: `(a, b)`.
    fn parse_call_args(&mut self) -> PResult<(Vec<ExprId>, TextPosition)> {
        let open = self.advance();
        let saved_depth = std::mem::replace(&mut self.literal_depth, 0);
        let mut args = Vec::new();

        while !self.check(&Token::RParen) {
            if self.check(&Token::Eof) {
                break;
            }
            args.push(self.parse_expr()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let close = self.expect_close(Token::RParen, "call", open.start)?;
        self.literal_depth = saved_depth;
        Ok((args, close.end))
    }

    fn parse_identifier(&mut self, name: String) -> PResult<ExprId> {
        let first_token = self.current_index();
        let token = self.advance();

        if !self.check(&Token::LParen) {
            return Ok(self.push(ExprKind::Identifier(name), token.start, token.end));
        }

        let (args, end) = self.parse_call_args()?;
        if !self.check(&Token::LBrace) {
            return Ok(self.push(
                ExprKind::Function {
                    name,
                    args,
                    body: None,
                },
                token.start,
                end,
            ));
        }

        self.parse_declaration(name, args, token.start, first_token)
    }

    /// `name(params) { body }`; the function is registered once its body closes.
    fn parse_declaration(
        &mut self,
        name: String,
        params: Vec<ExprId>,
        start: TextPosition,
        first_token: usize,
    ) -> PResult<ExprId> {
        if first_token != self.statement_start {
            return Err(self.error(
                start,
                "function declarations must start a statement",
            ));
        }
        let mut seen: Vec<&str> = Vec::new();
        for param in &params {
            match self.ast.identifier(*param) {
                Some(p) if seen.contains(&p) => {
                    return Err(self.error(
                        self.start_of(*param),
                        format!("duplicate parameter '{}'", p),
                    ));
                }
                Some(p) => seen.push(p),
                None => {
                    return Err(self.error(
                        self.start_of(*param),
                        "function parameters must be names",
                    ));
                }
            }
        }

        let body = self.parse_block()?;
        if self.functions.contains_key(&name) {
            return Err(self.error(
                start,
                format!("function '{}' is already declared", name),
            ));
        }

        let end = self.end_of(body);
        let id = self.push(
            ExprKind::Function {
                name: name.clone(),
                args: params,
                body: Some(body),
            },
            start,
            end,
        );
        self.functions.insert(name, id);
        Ok(id)
    }

    /// `for i in range(lo, hi[, step]) { body }`
    fn parse_for(&mut self) -> PResult<ExprId> {
        let for_token = self.advance();

        let variable = match self.current().token.clone() {
            Token::Identifier(name) => {
                self.advance();
                name
            }
            _ => {
                return Err(self.error(
                    self.current().start,
                    "expected a loop variable name after 'for'",
                ));
            }
        };

        if !self.check(&Token::In) {
            let current = self.current();
            return Err(self.error(
                current.start,
                format!("expected 'in' but found '{}'", current.token),
            ));
        }
        self.advance();

        let range_token = self.current().clone();
        let direction = match &range_token.token {
            Token::Identifier(name) => RangeDirection::from_function_name(name),
            _ => None,
        };
        let (Some(direction), Token::Identifier(range_name)) = (direction, range_token.token)
        else {
            return Err(self.error(range_token.start, RANGE_SHAPE));
        };
        self.advance();
        if !self.check(&Token::LParen) {
            return Err(self.error(range_token.start, RANGE_SHAPE));
        }
        let (args, range_end) = self.parse_call_args()?;
        if !(2..=3).contains(&args.len()) {
            return Err(self.error(range_token.start, RANGE_SHAPE));
        }
        if let Some(step) = args.get(2)
            && matches!(self.ast.kind(*step), ExprKind::Number(n) if *n == 0.0)
        {
            self.warnings.push(Diagnostic::new(
                self.start_of(*step),
                "loop step is zero, so the loop never advances",
            ));
        }
        let range = self.push(
            ExprKind::Function {
                name: range_name,
                args,
                body: None,
            },
            range_token.start,
            range_end,
        );

        if !self.check(&Token::LBrace) {
            let current = self.current();
            return Err(self.error(current.start, "expected '{' to start the loop body"));
        }
        let body = self.parse_block()?;
        let end = self.end_of(body);

        Ok(self.push(
            ExprKind::For {
                variable,
                direction,
                range,
                body,
            },
            for_token.start,
            end,
        ))
    }

    fn warn_unused_functions(&mut self) {
        let used: Vec<&str> = self
            .ast
            .iter()
            .filter_map(|(_, node)| match &node.kind {
                ExprKind::Identifier(name) => Some(name.as_str()),
                ExprKind::Function {
                    name, body: None, ..
                } => Some(name.as_str()),
                _ => None,
            })
            .collect();

        let mut unused = Vec::new();
        for (name, decl) in &self.functions {
            if !used.contains(&name.as_str()) {
                unused.push(Diagnostic::new(
                    self.ast.node(*decl).start,
                    format!("function '{}' is never used", name),
                ));
            }
        }
        self.warnings.extend(unused);
    }
}

const RANGE_SHAPE: &str = "for loops need range(lo, hi[, step]) or rrange(lo, hi[, step])";

fn binary_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Eq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::NotEq,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::LtEq,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::GtEq,
        Token::And => BinaryOp::And,
        Token::Or => BinaryOp::Or,
        _ => return None,
    })
}
