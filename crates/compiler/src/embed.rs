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

use tracing::trace;

use crate::ast::{Expr, Stmt};
use crate::errors::ParseError;
use crate::host::{HostCompiler, HostSyntaxError, PestHostCompiler};
use crate::lexer::Fragment;
use crate::normalize::shift_line_numbers;

/// Compiles verbatim fragments of screen source with a host compiler, attributing the result and
/// any syntax error to the fragment's place in the screen file.
pub struct Embedder {
    host: Box<dyn HostCompiler>,
}

impl Default for Embedder {
    fn default() -> Self {
        Self::new(Box::new(PestHostCompiler::new()))
    }
}

impl Embedder {
    pub fn new(host: Box<dyn HostCompiler>) -> Self {
        Self { host }
    }

    pub fn compile_expression(
        &self,
        filename: &str,
        fragment: &Fragment,
    ) -> Result<Expr, ParseError> {
        self.host.parse_expression(&fragment.text).map_err(|e| {
            relocate(
                filename,
                fragment,
                e,
                "Syntax error while parsing python expression.",
            )
        })
    }

    /// Compile a block of statements. Line 1 of the fragment is the fragment's own line.
    pub fn compile_block(
        &self,
        filename: &str,
        fragment: &Fragment,
    ) -> Result<Vec<Stmt>, ParseError> {
        let mut body = self.host.parse_block(&fragment.text).map_err(|e| {
            relocate(filename, fragment, e, "Syntax error while parsing python code.")
        })?;
        shift_line_numbers(&mut body, fragment.line - 1);
        Ok(body)
    }
}

fn relocate(
    filename: &str,
    fragment: &Fragment,
    error: HostSyntaxError,
    message: &str,
) -> ParseError {
    trace!(filename, line = fragment.line, error = %error, "host syntax error");
    let line = fragment.line + error.line - 1;
    if error.line == 1 {
        // The first line of a fragment may start mid-line.
        ParseError::new(
            filename,
            line,
            message,
            fragment.source_line.as_str(),
            fragment.column + error.column - 1,
        )
    } else {
        let indentation = " ".repeat(fragment.dedent);
        ParseError::new(
            filename,
            line,
            message,
            format!("{indentation}{}", error.line_text),
            fragment.dedent + error.column,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StmtNode;

    fn fragment(text: &str, line: usize, column: usize, source_line: &str) -> Fragment {
        Fragment {
            text: text.to_string(),
            line,
            column,
            source_line: source_line.to_string(),
            dedent: 0,
        }
    }

    #[test]
    fn test_block_lines_are_shifted() {
        let embedder = Embedder::default();
        let body = embedder
            .compile_block("s.rpy", &fragment("a = 1\n\nb = 2", 10, 5, "a = 1"))
            .unwrap();
        assert_eq!(body.iter().map(|s| s.line).collect::<Vec<_>>(), vec![10, 12]);
        assert!(matches!(body[0].node, StmtNode::Assign { .. }));
    }

    #[test]
    fn test_expression_error_is_relocated() {
        let embedder = Embedder::default();
        let err = embedder
            .compile_expression("s.rpy", &fragment("1 +", 7, 12, "text \"a\" size 1 +"))
            .unwrap_err();
        assert_eq!(err.file, "s.rpy");
        assert_eq!(err.line, 7);
        assert_eq!(err.message, "Syntax error while parsing python expression.");
        assert_eq!(err.line_text, "text \"a\" size 1 +");
        assert!(err.column > 12);
    }

    #[test]
    fn test_block_error_on_later_line() {
        let embedder = Embedder::default();
        let block = Fragment {
            dedent: 4,
            ..fragment("a = 1\nb = = 2", 3, 5, "    a = 1")
        };
        let first = embedder
            .compile_block("s.rpy", &fragment("b = = 2", 3, 5, "    b = = 2"))
            .unwrap_err();
        let err = embedder.compile_block("s.rpy", &block).unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(err.message, "Syntax error while parsing python code.");
        assert_eq!(err.line_text, "    b = = 2");
        assert_eq!(err.column, first.column);
    }
}
