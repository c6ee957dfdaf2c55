// vecta-parser - Source positions and diagnostics
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Source positions and diagnostics.

use std::fmt;

use serde::Serialize;

/// A position in the source text.
///
/// `line` and `col` are 0-indexed. `col` counts characters from the start of
/// the line; `tab_count` is how many of those characters were tabs, so the
/// on-screen column can be recovered for any tab width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct TextPosition {
    pub byte_offset: usize,
    pub line: usize,
    pub col: usize,
    pub tab_count: usize,
}

impl TextPosition {
    /// The position at the very start of a document.
    pub const START: TextPosition = TextPosition {
        byte_offset: 0,
        line: 0,
        col: 0,
        tab_count: 0,
    };

    /// Column as displayed with tabs expanded to `tab_width` cells.
    pub fn visual_column(&self, tab_width: usize) -> usize {
        self.col - self.tab_count + self.tab_count * tab_width
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// An error or warning anchored at a source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub position: TextPosition,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: TextPosition, message: impl Into<String>) -> Self {
        Diagnostic {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}
