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

//! The statement parser: a recursive-descent walk over the line tree, driven by the grammar
//! registry, that emits the IR for each statement it recognises.

use std::collections::HashSet;

use tracing::trace;

use crate::ast::{Arg, Expr, Keyword, Stmt};
use crate::embed::Embedder;
use crate::errors::ParseError;
use crate::grammar::{ChildPolicy, Grammar, StatementDefinition, StatementShape};
use crate::lexer::{Fragment, Lexer};
use crate::options::CompileOptions;
use crate::paths::{PathGenerator, SiblingIndex};

/// Closes the container opened by the statement before it.
pub const CLOSE_FUNCTION: &str = "ui.close";
/// Supplies a default container when a single-child statement is given several children.
pub const CHILD_OR_FIXED_FUNCTION: &str = "ui.child_or_fixed";
/// Includes another screen's body.
pub const USE_SCREEN_FUNCTION: &str = "ui.use_screen";

/// State for one top-level compile. The path generator is not shared between compiles.
pub struct StatementParser<'a> {
    pub(crate) grammar: &'a Grammar,
    pub(crate) embedder: &'a Embedder,
    pub(crate) options: &'a CompileOptions,
    pub(crate) paths: PathGenerator,
}

/// Keyword arguments collected for one call statement, from its own line and its block.
#[derive(Default)]
struct KeywordArguments {
    seen: HashSet<String>,
    keywords: Vec<Keyword>,
}

impl<'a> StatementParser<'a> {
    pub fn new(grammar: &'a Grammar, embedder: &'a Embedder, options: &'a CompileOptions) -> Self {
        Self {
            grammar,
            embedder,
            options,
            paths: PathGenerator::new(),
        }
    }

    pub(crate) fn compile_expression(
        &self,
        l: &Lexer,
        fragment: &Fragment,
    ) -> Result<Expr, ParseError> {
        self.embedder.compile_expression(l.filename(), fragment)
    }

    /// Parse the statement at the cursor, addressed by the path variable `name`.
    ///
    /// Returns `Ok(None)` when the line does not start with a statement that may appear under
    /// `parent` (the screen itself when `None`); the cursor is then left wherever the attempt
    /// stopped, and it is up to the caller to revert it.
    pub fn parse_statement(
        &self,
        l: &mut Lexer,
        parent: Option<&StatementDefinition>,
        name: &str,
    ) -> Result<Option<Vec<Stmt>>, ParseError> {
        let Some(word) = l.statement_word() else {
            return Ok(None);
        };
        let Some(definition) = self.grammar.child(parent, &word) else {
            return Ok(None);
        };
        trace!(statement = %word, line = l.number(), "parsing statement");

        let body = match &definition.shape {
            StatementShape::Call { function, children } => {
                self.parse_call(l, definition, function, *children, name)?
            }
            StatementShape::If => self.parse_if(l, definition, name)?,
            StatementShape::For => self.parse_for(l, definition, name)?,
            StatementShape::Use => self.parse_use(l, name)?,
            StatementShape::Pass => self.parse_pass(l)?,
            StatementShape::Python { one_line } => self.parse_python(l, *one_line)?,
        };
        Ok(Some(body))
    }

    /// A call statement: positional arguments, then keyword arguments up to a `:` or the end of
    /// the line, then a block mixing child statements with further keyword lines.
    fn parse_call(
        &self,
        l: &mut Lexer,
        definition: &StatementDefinition,
        function: &Expr,
        policy: ChildPolicy,
        name: &str,
    ) -> Result<Vec<Stmt>, ParseError> {
        let line = l.number();

        let mut args = Vec::with_capacity(definition.positionals.len());
        for _ in &definition.positionals {
            let fragment = l.require_simple_expression()?;
            args.push(Arg::Normal(self.compile_expression(l, &fragment)?));
        }

        let mut keywords = KeywordArguments::default();
        let has_block = loop {
            if l.match_literal(":") {
                l.expect_eol()?;
                l.expect_block(&definition.name)?;
                break true;
            }
            if l.eol() {
                l.expect_noblock(&definition.name)?;
                break false;
            }
            self.parse_keyword(l, definition, &mut keywords)?;
        };

        let mut children = vec![];
        if policy == ChildPolicy::One {
            children.push(Stmt::expr(
                Expr::call(Expr::dotted(CHILD_OR_FIXED_FUNCTION), vec![], vec![]),
                line,
            ));
        }

        if has_block {
            let mut sub = l.subblock_lexer();
            let level = self.paths.enter_level();
            let mut index = 0;
            while sub.advance() {
                let child_line = sub.number();
                let checkpoint = sub.checkpoint();
                let attempt = self.parse_statement(&mut sub, Some(definition), level.name())?;
                if let Some(child) = attempt {
                    children.push(level.bind(name, SiblingIndex::Static(index), child_line));
                    children.extend(child);
                    index += 1;
                    continue;
                }

                trace!(line = child_line, "not a child statement; reading keyword arguments");
                sub.revert(checkpoint);
                while !sub.eol() {
                    self.parse_keyword(&mut sub, definition, &mut keywords)?;
                }
                sub.expect_noblock(&definition.name)?;
            }
        }

        if policy != ChildPolicy::None {
            children.push(Stmt::expr(
                Expr::call(Expr::dotted(CLOSE_FUNCTION), vec![], vec![]),
                line,
            ));
        }

        if !keywords.seen.contains("id") {
            keywords.keywords.push(Keyword::new("id", Expr::name(name)));
        }

        let mut body = vec![Stmt::expr(
            Expr::call(function.clone(), args, keywords.keywords),
            line,
        )];
        body.extend(children);
        Ok(body)
    }

    fn parse_keyword(
        &self,
        l: &mut Lexer,
        definition: &StatementDefinition,
        keywords: &mut KeywordArguments,
    ) -> Result<(), ParseError> {
        let Some(word) = l.word() else {
            return Err(l.error("expected a keyword argument, colon, or end of line."));
        };
        if !definition.accepts_keyword(&word) {
            return Err(l.error(format!(
                "'{word}' is not a keyword argument or valid child for the {} statement.",
                definition.name
            )));
        }
        if !keywords.seen.insert(word.clone()) {
            return Err(l.error(format!(
                "keyword argument '{word}' appears more than once in a {} statement.",
                definition.name
            )));
        }

        let fragment = l.require_simple_expression()?;
        let value = self.compile_expression(l, &fragment)?;
        keywords.keywords.push(Keyword::new(&word, value));
        Ok(())
    }

    /// The block of a control-flow statement: every line must be a child statement, each bound
    /// to its own path under `name`.
    pub(crate) fn parse_children(
        &self,
        l: &Lexer,
        definition: &StatementDefinition,
        name: &str,
    ) -> Result<Vec<Stmt>, ParseError> {
        l.expect_block(&definition.name)?;

        let mut sub = l.subblock_lexer();
        let level = self.paths.enter_level();
        let mut body = vec![];
        let mut index = 0;
        while sub.advance() {
            let line = sub.number();
            let checkpoint = sub.checkpoint();
            let Some(child) = self.parse_statement(&mut sub, Some(definition), level.name())?
            else {
                sub.revert(checkpoint);
                return Err(sub.error("Expected screen language statement."));
            };
            body.push(level.bind(name, SiblingIndex::Static(index), line));
            body.extend(child);
            index += 1;
        }
        Ok(body)
    }
}
