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

//! Statements with bespoke syntax: conditionals, loops, screen inclusion and inline code.

use crate::ast::{Arg, BinaryOp, Expr, Keyword, Stmt, StmtNode, Target};
use crate::errors::ParseError;
use crate::grammar::StatementDefinition;
use crate::lexer::Lexer;
use crate::parse::{StatementParser, USE_SCREEN_FUNCTION};
use crate::paths::{PathLevel, SiblingIndex};

/// One `if`/`elif` arm: its condition, its body, and the line it starts on.
type Arm = (Expr, Vec<Stmt>, usize);

impl StatementParser<'_> {
    /// `if cond:` with any number of `elif cond:` arms and an optional `else:`, read from the
    /// lines following the `if` in the caller's block. Every arm's path is a distinct child of
    /// `name`.
    pub(crate) fn parse_if(
        &self,
        l: &mut Lexer,
        definition: &StatementDefinition,
        name: &str,
    ) -> Result<Vec<Stmt>, ParseError> {
        let level = self.paths.enter_level();
        let mut count = 0;

        let mut arms = vec![self.parse_arm(l, definition, &level, name, &mut count)?];
        let mut orelse = vec![];
        loop {
            let checkpoint = l.checkpoint();
            if !l.advance() {
                l.revert(checkpoint);
                break;
            }
            if l.keyword("elif") {
                arms.push(self.parse_arm(l, definition, &level, name, &mut count)?);
            } else if l.keyword("else") {
                let line = l.number();
                l.require_literal(":")?;
                l.expect_eol()?;
                orelse = self.arm_body(l, definition, &level, name, &mut count, line)?;
                break;
            } else {
                l.revert(checkpoint);
                break;
            }
        }

        let chain = arms
            .into_iter()
            .rev()
            .fold(orelse, |orelse, (condition, body, line)| {
                vec![Stmt::new(
                    StmtNode::If {
                        condition,
                        body,
                        orelse,
                    },
                    line,
                )]
            });
        Ok(chain)
    }

    /// The condition and body of an `if` or `elif` arm; the keyword is already consumed.
    fn parse_arm(
        &self,
        l: &mut Lexer,
        definition: &StatementDefinition,
        level: &PathLevel,
        name: &str,
        count: &mut usize,
    ) -> Result<Arm, ParseError> {
        let line = l.number();
        let fragment = l.require_python_expression()?;
        let condition = self.compile_expression(l, &fragment)?;
        l.require_literal(":")?;
        l.expect_eol()?;
        let body = self.arm_body(l, definition, level, name, count, line)?;
        Ok((condition, body, line))
    }

    fn arm_body(
        &self,
        l: &Lexer,
        definition: &StatementDefinition,
        level: &PathLevel,
        name: &str,
        count: &mut usize,
        line: usize,
    ) -> Result<Vec<Stmt>, ParseError> {
        let mut body = vec![level.bind(name, SiblingIndex::Static(*count), line)];
        body.extend(self.parse_children(l, definition, level.name())?);
        *count += 1;
        Ok(body)
    }

    /// `for pattern in iterable:`. Each iteration gets its own path, indexed by a counter that
    /// is reset before the loop and bumped at the end of every iteration.
    pub(crate) fn parse_for(
        &self,
        l: &mut Lexer,
        definition: &StatementDefinition,
        name: &str,
    ) -> Result<Vec<Stmt>, ParseError> {
        let line = l.number();
        let target = parse_tuple_pattern(l)?;
        l.require_keyword("in")?;
        let fragment = l.require_python_expression()?;
        let iter = self.compile_expression(l, &fragment)?;
        l.require_literal(":")?;
        l.expect_eol()?;

        let counter = self.paths.enter_level();
        let child = self.paths.enter_level();

        let mut body = vec![child.bind(name, SiblingIndex::Counter(counter.name()), line)];
        body.extend(self.parse_children(l, definition, child.name())?);
        body.push(Stmt::new(
            StmtNode::AugAssign {
                target: Target::name(counter.name()),
                op: BinaryOp::Add,
                value: Expr::int(1),
            },
            line,
        ));

        Ok(vec![
            Stmt::assign(Target::name(counter.name()), Expr::int(0), line),
            Stmt::new(StmtNode::For { target, iter, body }, line),
        ])
    }

    /// `use screen_name(key=value, ..., **mapping)`: include another screen, rooted at this
    /// statement's path and sharing the current scope.
    pub(crate) fn parse_use(&self, l: &mut Lexer, name: &str) -> Result<Vec<Stmt>, ParseError> {
        let line = l.number();
        let target = l.require_word()?;

        let root = &self.options.root_path_variable;
        let scope = &self.options.scope_variable;
        let mut keywords = vec![
            Keyword::new(root, Expr::name(name)),
            Keyword::new(scope, Expr::name(scope)),
        ];

        if let Some(arguments) = l.arguments()? {
            if arguments.extrapos.is_some() {
                return Err(l.error("The use statement only takes keyword arguments."));
            }
            for (keyword, fragment) in &arguments.arguments {
                let Some(keyword) = keyword else {
                    return Err(l.error("The use statement only takes keyword arguments."));
                };
                keywords.push(Keyword::new(keyword, self.compile_expression(l, fragment)?));
            }
            if let Some(fragment) = &arguments.extrakw {
                keywords.push(Keyword::splice(self.compile_expression(l, fragment)?));
            }
        }
        l.expect_eol()?;
        l.expect_noblock("use")?;

        Ok(vec![Stmt::expr(
            Expr::call(
                Expr::dotted(USE_SCREEN_FUNCTION),
                vec![Arg::Normal(Expr::str(&target))],
                keywords,
            ),
            line,
        )])
    }

    pub(crate) fn parse_pass(&self, l: &mut Lexer) -> Result<Vec<Stmt>, ParseError> {
        let line = l.number();
        l.expect_eol()?;
        l.expect_noblock("pass")?;
        Ok(vec![Stmt::new(StmtNode::Pass, line)])
    }

    /// `$ statement` on one line, or `python:` followed by an indented block.
    pub(crate) fn parse_python(
        &self,
        l: &mut Lexer,
        one_line: bool,
    ) -> Result<Vec<Stmt>, ParseError> {
        let code = if one_line {
            let code = l.rest();
            l.expect_noblock("one-line python statement")?;
            code
        } else {
            l.require_literal(":")?;
            l.expect_eol()?;
            l.expect_block("python block")?;
            l.python_block()
        };
        self.embedder.compile_block(l.filename(), &code)
    }
}

/// A loop binding: a name, or a comma-separated and possibly parenthesised tuple of patterns.
fn parse_tuple_pattern(l: &mut Lexer) -> Result<Target, ParseError> {
    let mut pattern = vec![];
    let mut is_tuple = false;
    loop {
        let element = if l.match_literal("(") {
            let nested = parse_tuple_pattern(l)?;
            l.require_literal(")")?;
            nested
        } else if let Some(name) = l.name() {
            Target::Name(name)
        } else {
            break;
        };
        pattern.push(element);

        if !l.match_literal(",") {
            break;
        }
        is_tuple = true;
    }

    match pattern.len() {
        0 => Err(l.error("Expected tuple pattern.")),
        1 if !is_tuple => Ok(pattern.remove(0)),
        _ => Ok(Target::Tuple(pattern)),
    }
}
