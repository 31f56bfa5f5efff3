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

//! The line-oriented lexer the screen parser runs over.
//!
//! Source is first split into logical lines (a physical line continues while a bracket or string
//! is open, or after a trailing backslash), which are then nested into blocks by indentation.
//! A [`Lexer`] walks one block, one logical line at a time, and offers scanners that pull words,
//! literals and verbatim expression text out of the current line. Where a token ends is decided
//! by the token rules of the host grammar.

use pest::Parser;

use crate::errors::ParseError;
use crate::host::grammar::{HostGrammar, Rule};

/// One logical line of source, with the indented block that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The physical line the logical line starts on.
    pub number: usize,
    pub indent: usize,
    /// Line text without its indentation or comments. Continuation lines are kept, joined by `\n`.
    pub text: String,
    pub block: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    pub number: usize,
    pub indent: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitError {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub line_text: String,
}

/// Split source text into logical lines, dropping blank lines and comments.
pub(crate) fn split_logical_lines(source: &str) -> Result<Vec<LogicalLine>, SplitError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = vec![];
    let mut current: Option<LogicalLine> = None;
    // (char, line, column, line text) of each open bracket, and of an open string.
    let mut brackets: Vec<(char, usize, usize, &str)> = vec![];
    let mut quote: Option<(char, usize, usize, &str)> = None;

    for (index, raw) in source.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let number = index + 1;

        let (mut logical, body, offset) = match current.take() {
            Some(mut logical) => {
                logical.text.push('\n');
                (logical, raw, 0)
            }
            None => {
                let body = raw.trim_start_matches([' ', '\t']);
                if body.is_empty() || body.starts_with('#') {
                    continue;
                }
                let indentation = &raw[..raw.len() - body.len()];
                if let Some(tab) = indentation.find('\t') {
                    return Err(SplitError {
                        line: number,
                        column: tab + 1,
                        message: "tab characters are not allowed in indentation.".to_string(),
                        line_text: raw.to_string(),
                    });
                }
                let logical = LogicalLine {
                    number,
                    indent: indentation.len(),
                    text: String::new(),
                };
                (logical, body, indentation.len())
            }
        };

        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            let column = raw[..offset + i].chars().count() + 1;
            if let Some((q, ..)) = quote {
                logical.text.push(c);
                if c == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        logical.text.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '#' => break,
                '"' | '\'' => quote = Some((c, number, column, raw)),
                '(' | '[' | '{' => brackets.push((c, number, column, raw)),
                ')' | ']' | '}' => {
                    brackets.pop();
                }
                _ => {}
            }
            logical.text.push(c);
        }

        let continued = quote.is_some()
            || !brackets.is_empty()
            || logical.text.trim_end().ends_with('\\');
        if continued {
            current = Some(logical);
            continue;
        }

        let trimmed = logical.text.trim_end().len();
        logical.text.truncate(trimmed);
        if !logical.text.is_empty() {
            lines.push(logical);
        }
    }

    if current.is_some() {
        if let Some((_, line, column, line_text)) = quote.or(brackets.last().copied()) {
            return Err(SplitError {
                line,
                column,
                message: "line is not terminated with a newline. (Check strings and parenthesis.)"
                    .to_string(),
                line_text: line_text.to_string(),
            });
        }
        // A trailing backslash on the last line of the file continues into nothing.
        if let Some(mut logical) = current {
            let text = logical.text.trim_end().trim_end_matches('\\').trim_end().to_string();
            logical.text = text;
            if !logical.text.is_empty() {
                lines.push(logical);
            }
        }
    }

    Ok(lines)
}

/// Split `source` into logical lines and nest them into blocks by indentation.
pub fn group_logical_lines(filename: &str, source: &str) -> Result<Vec<Line>, ParseError> {
    let logical = split_logical_lines(source).map_err(|e| {
        ParseError::new(filename, e.line, e.message, e.line_text, e.column)
    })?;
    let mut position = 0;
    nest(filename, &logical, &mut position, 0)
}

fn nest(
    filename: &str,
    lines: &[LogicalLine],
    position: &mut usize,
    indent: usize,
) -> Result<Vec<Line>, ParseError> {
    let mut block = vec![];
    while let Some(logical) = lines.get(*position) {
        if logical.indent < indent {
            break;
        }
        if logical.indent > indent {
            return Err(indentation_error(filename, logical, "unexpected indent."));
        }
        *position += 1;

        let mut line = Line {
            number: logical.number,
            indent: logical.indent,
            text: logical.text.clone(),
            block: vec![],
        };
        if let Some(next) = lines.get(*position) {
            if next.indent > indent {
                line.block = nest(filename, lines, position, next.indent)?;
                if let Some(after) = lines.get(*position) {
                    if after.indent > indent {
                        return Err(indentation_error(filename, after, "indentation mismatch."));
                    }
                }
            }
        }
        block.push(line);
    }
    Ok(block)
}

fn indentation_error(filename: &str, line: &LogicalLine, message: &str) -> ParseError {
    let first = line.text.split('\n').next().unwrap_or_default();
    ParseError::new(filename, line.number, message, first, 1)
}

/// A snapshot of a lexer's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    line: Option<usize>,
    pos: usize,
}

/// Verbatim source text pulled out of a line, with the location it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    /// Physical line the text starts on.
    pub line: usize,
    /// 1-based column of the first character within `source_line`.
    pub column: usize,
    /// The physical line the text starts on, as it appears in the logical line.
    pub source_line: String,
    /// Columns of indentation removed from the start of every line after the first.
    pub dedent: usize,
}

/// The result of `Lexer::arguments`: a parenthesised call-style argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentInfo {
    /// Positional arguments have no keyword.
    pub arguments: Vec<(Option<String>, Fragment)>,
    /// The `*expr` argument.
    pub extrapos: Option<Fragment>,
    /// The `**expr` argument.
    pub extrakw: Option<Fragment>,
}

pub struct Lexer<'a> {
    filename: &'a str,
    block: &'a [Line],
    /// `None` until the first `advance`; `block.len()` once the block is exhausted.
    line: Option<usize>,
    pos: usize,
    /// Line number reported when the cursor is not on a line of this block.
    parent_number: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(filename: &'a str, block: &'a [Line]) -> Self {
        Self {
            filename,
            block,
            line: None,
            pos: 0,
            parent_number: block.first().map_or(1, |l| l.number),
        }
    }

    pub fn filename(&self) -> &'a str {
        self.filename
    }

    /// Move to the next line of the block. Returns false once the block is exhausted, and keeps
    /// returning false after that.
    pub fn advance(&mut self) -> bool {
        let next = self.line.map_or(0, |l| l + 1).min(self.block.len());
        self.line = Some(next);
        self.pos = 0;
        next < self.block.len()
    }

    fn current(&self) -> Option<&'a Line> {
        self.line.and_then(|l| self.block.get(l))
    }

    /// True once `advance` has moved past the last line.
    pub fn eob(&self) -> bool {
        self.line.is_some_and(|l| l >= self.block.len())
    }

    /// The text of the current logical line.
    pub fn text(&self) -> &'a str {
        self.current().map_or("", |l| l.text.as_str())
    }

    /// The block nested under the current line.
    pub fn block(&self) -> &'a [Line] {
        self.current()
            .map(|l| l.block.as_slice())
            .unwrap_or_default()
    }

    /// The line the current logical line starts on.
    pub fn number(&self) -> usize {
        match self.current() {
            Some(line) => line.number,
            None if self.eob() => self.block.last().map_or(self.parent_number, |l| l.number),
            None => self.parent_number,
        }
    }

    pub fn location(&self) -> (&'a str, usize) {
        (self.filename, self.number())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            line: self.line,
            pos: self.pos,
        }
    }

    pub fn revert(&mut self, checkpoint: Checkpoint) {
        self.line = checkpoint.line;
        self.pos = checkpoint.pos;
    }

    /// A lexer over the block nested under the current line.
    pub fn subblock_lexer(&self) -> Lexer<'a> {
        Lexer {
            filename: self.filename,
            block: self.block(),
            line: None,
            pos: 0,
            parent_number: self.number(),
        }
    }

    /// Physical line, physical line text, and 1-based column of a byte offset into the current
    /// line. The indentation stripped from the first physical line is put back.
    fn locate(&self, pos: usize) -> (usize, String, usize) {
        let text = self.text();
        let pos = pos.min(text.len());
        let before = &text[..pos];
        let start = before.rfind('\n').map_or(0, |i| i + 1);
        let end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
        let mut column = text[start..pos].chars().count() + 1;
        let line = self.number() + before.matches('\n').count();
        if start > 0 {
            return (line, text[start..end].to_string(), column);
        }
        let indent = self.current().map_or(0, |l| l.indent);
        column += indent;
        (line, format!("{}{}", " ".repeat(indent), &text[..end]), column)
    }

    /// Build the error raised at the cursor.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        let (line, line_text, column) = self.locate(self.pos);
        ParseError::new(self.filename, line, message, line_text, column)
    }

    fn fragment(&self, start: usize, end: usize) -> Fragment {
        let (line, source_line, column) = self.locate(start);
        Fragment {
            text: self.text()[start..end].to_string(),
            line,
            column,
            source_line,
            dedent: 0,
        }
    }

    fn peek_at(&self, at: usize) -> Option<char> {
        self.text().get(at..).and_then(|s| s.chars().next())
    }

    fn skip_whitespace_at(&self, mut at: usize) -> usize {
        let bytes = self.text().as_bytes();
        loop {
            match bytes.get(at) {
                Some(b' ' | b'\t' | b'\n') => at += 1,
                Some(b'\\') if bytes.get(at + 1) == Some(&b'\n') => at += 2,
                _ => return at,
            }
        }
    }

    fn skip_whitespace(&mut self) {
        self.pos = self.skip_whitespace_at(self.pos);
    }

    /// True if nothing but whitespace remains on the line.
    pub fn eol(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.text().len()
    }

    /// Consume `literal` if the line continues with it.
    pub fn match_literal(&mut self, literal: &str) -> bool {
        self.skip_whitespace();
        if self.text()[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume the word `keyword` if it is the next word on the line.
    pub fn keyword(&mut self, keyword: &str) -> bool {
        let start = self.pos;
        if self.word().as_deref() == Some(keyword) {
            return true;
        }
        self.pos = start;
        false
    }

    /// The end of the token `rule` matches at `at`. Whitespace the rule skipped after its last
    /// token is not part of the match.
    fn scan(&self, rule: Rule, at: usize) -> Option<usize> {
        let rest = self.text().get(at..)?;
        let token = HostGrammar::parse(rule, rest).ok()?.next()?;
        let matched = token
            .as_str()
            .trim_end_matches(|c: char| c.is_whitespace() || c == '\\');
        (!matched.is_empty()).then_some(at + matched.len())
    }

    /// Consume the token `rule` matches after any whitespace.
    fn token(&mut self, rule: Rule) -> Option<Fragment> {
        self.skip_whitespace();
        let start = self.pos;
        let end = self.scan(rule, start)?;
        self.pos = end;
        Some(self.fragment(start, end))
    }

    pub fn word(&mut self) -> Option<String> {
        self.token(Rule::screen_word).map(|f| f.text)
    }

    /// A word, or the `$` sigil that introduces a one-line python statement.
    pub fn statement_word(&mut self) -> Option<String> {
        if self.match_literal("$") {
            return Some("$".to_string());
        }
        self.word()
    }

    /// A word that is neither a host language keyword nor `use`, `screen` or `python`.
    pub fn name(&mut self) -> Option<String> {
        self.token(Rule::screen_name).map(|f| f.text)
    }

    /// A quoted string literal, quotes and escapes included.
    pub fn string(&mut self) -> Option<Fragment> {
        self.token(Rule::string)
    }

    /// An expression simple enough to be delimited without compiling it: operands made of a
    /// literal, name, or bracketed group with any number of attribute, call and subscript
    /// trailers, joined by binary operators. Stops at the first token that cannot continue the
    /// expression.
    pub fn simple_expression(&mut self) -> Option<Fragment> {
        self.token(Rule::simple_expression)
    }

    /// Text up to the first top-level occurrence of one of `terminators`, or the end of the line.
    fn delimited(&mut self, terminators: &[char]) -> Option<Fragment> {
        self.skip_whitespace();
        let start = self.pos;
        let text = self.text();
        let mut i = start;
        while let Some(c) = self.peek_at(i) {
            if terminators.contains(&c) {
                break;
            }
            i = match c {
                '"' | '\'' => self.scan(Rule::string, i).unwrap_or(text.len()),
                '(' | '[' | '{' => self.scan(Rule::bracketed, i).unwrap_or(text.len()),
                _ => i + c.len_utf8(),
            };
        }
        let end = start + text[start..i].trim_end().len();
        if end == start {
            return None;
        }
        self.pos = end;
        Some(self.fragment(start, end))
    }

    /// A host language expression, running up to a top-level `:` or the end of the line.
    pub fn python_expression(&mut self) -> Option<Fragment> {
        self.delimited(&[':'])
    }

    /// The remainder of the line, verbatim.
    pub fn rest(&mut self) -> Fragment {
        self.skip_whitespace();
        let start = self.pos;
        self.pos = self.text().len();
        self.fragment(start, self.pos)
    }

    /// The text of the block nested under the current line, with indentation made relative to
    /// the block. Blank lines are padded back in, so that line `k` of the text is source line
    /// `first + k - 1`. Continuation lines lose up to the block's indentation as well.
    pub fn python_block(&self) -> Fragment {
        let block = self.block();
        let Some(first) = block.first() else {
            return Fragment {
                text: String::new(),
                line: self.number() + 1,
                column: 1,
                source_line: String::new(),
                dedent: 0,
            };
        };

        fn emit(lines: &[Line], base: usize, text: &mut String, line: &mut usize) {
            for l in lines {
                while *line < l.number {
                    text.push('\n');
                    *line += 1;
                }
                text.push_str(&" ".repeat(l.indent.saturating_sub(base)));
                for (k, physical) in l.text.split('\n').enumerate() {
                    if k > 0 {
                        text.push('\n');
                        *line += 1;
                    }
                    let spaces = physical.len() - physical.trim_start_matches(' ').len();
                    text.push_str(&physical[spaces.min(base)..]);
                }
                emit(&l.block, base, text, line);
            }
        }

        let mut text = String::new();
        let mut line = first.number;
        emit(block, first.indent, &mut text, &mut line);
        Fragment {
            text,
            line: first.number,
            column: first.indent + 1,
            source_line: format!(
                "{}{}",
                " ".repeat(first.indent),
                first.text.split('\n').next().unwrap_or_default()
            ),
            dedent: first.indent,
        }
    }

    fn match_assignment(&mut self) -> bool {
        self.skip_whitespace();
        let rest = &self.text()[self.pos..];
        if rest.starts_with('=') && !rest.starts_with("==") {
            self.pos += 1;
            return true;
        }
        false
    }

    /// A parenthesised argument list such as `(a, b=1, *rest, **kw)`. Returns `None` without
    /// consuming anything if the line does not continue with `(`.
    pub fn arguments(&mut self) -> Result<Option<ArgumentInfo>, ParseError> {
        if !self.match_literal("(") {
            return Ok(None);
        }

        let mut info = ArgumentInfo::default();
        loop {
            if self.match_literal(")") {
                break;
            }

            if self.match_literal("**") {
                info.extrakw = Some(self.require_argument()?);
            } else if self.match_literal("*") {
                info.extrapos = Some(self.require_argument()?);
            } else {
                let start = self.pos;
                let keyword = match self.name() {
                    Some(name) if self.match_assignment() => Some(name),
                    _ => {
                        self.pos = start;
                        None
                    }
                };
                let value = self.require_argument()?;
                info.arguments.push((keyword, value));
            }

            if self.match_literal(")") {
                break;
            }
            self.require_literal(",")?;
        }
        Ok(Some(info))
    }

    fn require_argument(&mut self) -> Result<Fragment, ParseError> {
        self.delimited(&[',', ')'])
            .ok_or_else(|| self.expected("argument"))
    }

    fn expected(&self, what: &str) -> ParseError {
        self.error(format!("expected '{what}' not found."))
    }

    pub fn require_literal(&mut self, literal: &str) -> Result<(), ParseError> {
        if self.match_literal(literal) {
            Ok(())
        } else {
            Err(self.expected(literal))
        }
    }

    pub fn require_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.keyword(keyword) {
            Ok(())
        } else {
            Err(self.expected(keyword))
        }
    }

    pub fn require_word(&mut self) -> Result<String, ParseError> {
        self.word().ok_or_else(|| self.expected("word"))
    }

    pub fn require_name(&mut self) -> Result<String, ParseError> {
        self.name().ok_or_else(|| self.expected("name"))
    }

    pub fn require_simple_expression(&mut self) -> Result<Fragment, ParseError> {
        self.simple_expression()
            .ok_or_else(|| self.expected("simple expression"))
    }

    pub fn require_python_expression(&mut self) -> Result<Fragment, ParseError> {
        self.python_expression()
            .ok_or_else(|| self.expected("python expression"))
    }

    pub fn expect_eol(&mut self) -> Result<(), ParseError> {
        if self.eol() {
            Ok(())
        } else {
            Err(self.error("end of line expected."))
        }
    }

    pub fn expect_block(&self, statement: &str) -> Result<(), ParseError> {
        if self.block().is_empty() {
            return Err(self.error(format!("{statement} expects a non-empty block.")));
        }
        Ok(())
    }

    pub fn expect_noblock(&self, statement: &str) -> Result<(), ParseError> {
        if !self.block().is_empty() {
            return Err(self.error(format!(
                "{statement} does not expect a block. Please check the indentation of the line \
                 after this one."
            )));
        }
        Ok(())
    }
}
