// vecta-parser - Lexer for Vecta
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for Vecta source code.
//!
//! Converts a source string into a stream of positioned tokens. The lexer
//! never fails: malformed input becomes a [`Token::Invalid`] carrying the
//! message, and the parser reports it and resynchronises like any other
//! syntax error.

use std::fmt;

use crate::position::TextPosition;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    String(String),
    Identifier(String),

    // Keywords
    For,
    In,

    // Delimiters
    LParen,      // (
    RParen,      // )
    LBracket,    // [
    RBracket,    // ]
    LBrace,      // {
    RBrace,      // }
    HashBracket, // #[
    HashBrace,   // #{

    // Punctuation
    Comma,
    Colon,
    Question,
    Semicolon,
    Assign,

    // Operators
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    And,
    Or,
    Print, // ->>>
    Caret,

    // Special
    Newline,
    Invalid(String),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::For => write!(f, "for"),
            Token::In => write!(f, "in"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::HashBracket => write!(f, "#["),
            Token::HashBrace => write!(f, "#{{"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Question => write!(f, "?"),
            Token::Semicolon => write!(f, ";"),
            Token::Assign => write!(f, "="),
            Token::Eq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Bang => write!(f, "!"),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Print => write!(f, "->>>"),
            Token::Caret => write!(f, "^"),
            Token::Newline => write!(f, "end of line"),
            Token::Invalid(msg) => write!(f, "<{}>", msg),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with the source span it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub start: TextPosition,
    pub end: TextPosition,
}

/// The lexer converts source code into tokens.
pub struct Lexer<'a> {
    source: &'a str,
    pos: TextPosition,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: TextPosition::START,
        }
    }

    /// Get the next token from the source.
    pub fn next_token(&mut self) -> SpannedToken {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let token = match self.peek() {
            None => Token::Eof,
            Some(c) => self.read_token(c),
        };

        SpannedToken {
            token,
            start,
            end: self.pos,
        }
    }

    /// Collect all tokens into a vector, terminated by a single `Eof`.
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    /// Current position of the lexer.
    pub fn position(&self) -> TextPosition {
        self.pos
    }

    fn read_token(&mut self, c: char) -> Token {
        match c {
            '\n' => self.single(Token::Newline),
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            '{' => self.single(Token::LBrace),
            '}' => self.single(Token::RBrace),
            ',' => self.single(Token::Comma),
            ':' => self.single(Token::Colon),
            '?' => self.single(Token::Question),
            ';' => self.single(Token::Semicolon),
            '+' => self.single(Token::Plus),
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '^' => self.single(Token::Caret),
            '=' => self.one_or_two('=', Token::Assign, Token::Eq),
            '!' => self.one_or_two('=', Token::Bang, Token::NotEq),
            '<' => self.one_or_two('=', Token::Lt, Token::LtEq),
            '>' => self.one_or_two('=', Token::Gt, Token::GtEq),
            '&' => self.doubled('&', Token::And),
            '|' => self.doubled('|', Token::Or),
            '-' => {
                if self.source[self.pos.byte_offset..].starts_with("->>>") {
                    for _ in 0..4 {
                        self.advance();
                    }
                    Token::Print
                } else {
                    self.single(Token::Minus)
                }
            }
            '#' => {
                self.advance();
                match self.peek() {
                    Some('[') => self.single(Token::HashBracket),
                    Some('{') => self.single(Token::HashBrace),
                    _ => Token::Invalid("expected '[' or '{' after '#'".to_string()),
                }
            }
            '"' => self.read_string(),
            '0'..='9' => self.read_number(),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            _ if is_identifier_start(c) => self.read_identifier(),
            _ => {
                self.advance();
                Token::Invalid(format!("unexpected character '{}'", c))
            }
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.source[self.pos.byte_offset..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos.byte_offset..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.byte_offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.col = 0;
            self.pos.tab_count = 0;
        } else {
            self.pos.col += 1;
            if c == '\t' {
                self.pos.tab_count += 1;
            }
        }
        Some(c)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn one_or_two(&mut self, second: char, one: Token, two: Token) -> Token {
        self.advance();
        if self.peek() == Some(second) {
            self.advance();
            two
        } else {
            one
        }
    }

    fn doubled(&mut self, c: char, token: Token) -> Token {
        self.advance();
        if self.peek() == Some(c) {
            self.advance();
            token
        } else {
            Token::Invalid(format!("unexpected character '{}', did you mean '{}{}'?", c, c, c))
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c != '\n' && c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self) -> Token {
        self.advance(); // opening quote

        let mut s = String::new();
        let mut bad_escape = None;

        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    break;
                }
                // Unterminated: leave the newline for the parser to resync on.
                Some('\n') | None => {
                    return Token::Invalid("unterminated string".to_string());
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => s.push('\n'),
                        Some('r') => s.push('\r'),
                        Some('b') => s.push('\u{8}'),
                        Some('t') => s.push('\t'),
                        Some('\\') => s.push('\\'),
                        Some('"') => s.push('"'),
                        Some('\n') | None => {
                            return Token::Invalid("unterminated string".to_string());
                        }
                        Some(c) => {
                            bad_escape.get_or_insert(c);
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }

        match bad_escape {
            Some(c) => Token::Invalid(format!("unknown escape sequence '\\{}'", c)),
            None => Token::String(s),
        }
    }

    fn read_number(&mut self) -> Token {
        let mut text = String::new();
        if self.peek() == Some('.') {
            text.push('0');
        } else {
            self.collect_digits(&mut text);
        }

        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            self.collect_digits(&mut text);
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let has_exponent = match self.peek_nth(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                text.push('e');
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    text.push(sign);
                    self.advance();
                }
                self.collect_digits(&mut text);
            }
        }

        match text.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Invalid(format!("invalid number literal '{}'", text)),
        }
    }

    /// Digits with `_` separators; the separators are dropped.
    fn collect_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
            } else if c != '_' {
                break;
            }
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos.byte_offset;
        while self.peek().is_some_and(is_identifier_char) {
            self.advance();
        }
        match &self.source[start..self.pos.byte_offset] {
            "for" => Token::For,
            "in" => Token::In,
            name => Token::Identifier(name.to_string()),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
