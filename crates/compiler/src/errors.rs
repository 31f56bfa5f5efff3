// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Error types shared by the grammar registry and the screen compiler.

use serde::Serialize;
use thiserror::Error;

/// A failure to compile a screen. The first one raised aborts compilation of the screen it
/// occurred in; there is no recovery and no aggregation.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("File \"{file}\", line {line}: {message}")]
pub struct ParseError {
    pub file: String,
    /// 1-based physical line in the source file.
    pub line: usize,
    pub message: String,
    /// The text of the offending source line.
    pub line_text: String,
    /// 1-based character column within `line_text`.
    pub column: usize,
}

impl ParseError {
    pub fn new(
        file: &str,
        line: usize,
        message: impl Into<String>,
        line_text: impl Into<String>,
        column: usize,
    ) -> Self {
        Self {
            file: file.to_string(),
            line,
            message: message.into(),
            line_text: line_text.into(),
            column: column.max(1),
        }
    }

    /// The classic plain-text rendering: location and message, then the source line with a
    /// caret under the failing column.
    pub fn report(&self) -> String {
        let mut out = format!("{self}\n");
        if self.line_text.is_empty() {
            return out;
        }
        out.push_str("    ");
        out.push_str(self.line_text.trim_end());
        out.push('\n');
        out.push_str("    ");
        out.push_str(&" ".repeat(self.column - 1));
        out.push('^');
        out.push('\n');
        out
    }
}

/// A misconfigured grammar. These are produced while declaring statements, before any source
/// is parsed, and are expected to abort startup rather than be handled per screen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("keyword argument {keyword:?} is declared more than once for the {statement} statement")]
    DuplicateKeyword { statement: String, keyword: String },
    #[error("statement {0:?} is declared more than once")]
    DuplicateStatement(String),
    #[error("unknown statement {0:?}")]
    UnknownStatement(String),
}
