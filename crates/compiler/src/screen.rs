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

//! Top-level compilation: `screen` statements, their metadata, and hand-off of the compiled
//! result to a registry.

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::{Literal, Stmt};
use crate::embed::Embedder;
use crate::errors::{GrammarError, ParseError};
use crate::grammar::Grammar;
use crate::lexer::{Lexer, group_logical_lines};
use crate::normalize::normalize_line_numbers;
use crate::options::CompileOptions;
use crate::parse::StatementParser;
use crate::paths::SiblingIndex;
use crate::statements::standard_grammar;

fn redefined(screen: &str, property: &str, line: usize) {
    warn!(screen, property, line, "screen property redefined; the last value wins");
}

/// A compiled screen: its metadata and the IR that builds it when executed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledScreen {
    pub name: String,
    pub modal: bool,
    pub zorder: i64,
    pub tag: Option<String>,
    pub body: Vec<Stmt>,
    /// File and line of the `screen` statement.
    pub location: (String, usize),
}

/// Where compiled screens are registered for display.
pub trait ScreenRegistry {
    fn define_screen(
        &mut self,
        name: String,
        screen: CompiledScreen,
        modal: bool,
        zorder: i64,
        tag: Option<String>,
    );
}

impl CompiledScreen {
    /// Hand the screen to `registry`, which takes ownership of it.
    pub fn define(self, registry: &mut impl ScreenRegistry) {
        let name = self.name.clone();
        let tag = self.tag.clone();
        let (modal, zorder) = (self.modal, self.zorder);
        registry.define_screen(name, self, modal, zorder, tag);
    }
}

#[derive(Debug, Default)]
struct ScreenMetadata {
    modal: Option<bool>,
    zorder: Option<i64>,
    tag: Option<String>,
}

/// A grammar and host compiler, ready to compile any number of screen files.
pub struct ScreenCompiler {
    grammar: Grammar,
    embedder: Embedder,
    options: CompileOptions,
}

impl ScreenCompiler {
    /// A compiler for the standard statement set.
    pub fn new(options: CompileOptions) -> Result<Self, GrammarError> {
        let grammar = standard_grammar(&options)?;
        Ok(Self::with_grammar(grammar, Embedder::default(), options))
    }

    pub fn with_grammar(grammar: Grammar, embedder: Embedder, options: CompileOptions) -> Self {
        Self {
            grammar,
            embedder,
            options,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile every `screen` statement in `source`.
    pub fn compile_file(
        &self,
        filename: &str,
        source: &str,
    ) -> Result<Vec<CompiledScreen>, ParseError> {
        compile_screens(&self.grammar, &self.embedder, &self.options, filename, source)
    }

    /// Compile one `screen` statement. The lexer is positioned just after the `screen` keyword.
    pub fn compile_screen(&self, l: &mut Lexer) -> Result<CompiledScreen, ParseError> {
        StatementParser::new(&self.grammar, &self.embedder, &self.options).parse_screen(l)
    }
}

/// Compile a file consisting of `screen` statements. The first error aborts the whole file.
pub fn compile_screens(
    grammar: &Grammar,
    embedder: &Embedder,
    options: &CompileOptions,
    filename: &str,
    source: &str,
) -> Result<Vec<CompiledScreen>, ParseError> {
    let lines = group_logical_lines(filename, source)?;
    let mut l = Lexer::new(filename, &lines);
    let mut screens = vec![];
    while l.advance() {
        if !l.keyword("screen") {
            return Err(l.error("expected 'screen' statement."));
        }
        let parser = StatementParser::new(grammar, embedder, options);
        screens.push(parser.parse_screen(&mut l)?);
    }
    Ok(screens)
}

impl StatementParser<'_> {
    pub(crate) fn parse_screen(&self, l: &mut Lexer) -> Result<CompiledScreen, ParseError> {
        let line = l.number();
        let name = l.require_word()?;

        let mut metadata = ScreenMetadata::default();
        while self.parse_metadata(l, &name, &mut metadata)? {}
        l.require_literal(":")?;
        l.expect_eol()?;
        l.expect_block("screen statement")?;

        let root = &self.options.root_path_variable;
        let mut sub = l.subblock_lexer();
        let level = self.paths.enter_level();
        let mut body = vec![];
        let mut index = 0;
        while sub.advance() {
            if self.parse_metadata(&mut sub, &name, &mut metadata)? {
                while self.parse_metadata(&mut sub, &name, &mut metadata)? {}
                sub.expect_eol()?;
                sub.expect_noblock("screen property")?;
                continue;
            }

            let child_line = sub.number();
            let checkpoint = sub.checkpoint();
            let Some(child) = self.parse_statement(&mut sub, None, level.name())? else {
                sub.revert(checkpoint);
                return Err(sub.error("Expected a screen language statement."));
            };
            body.push(level.bind(root, SiblingIndex::Static(index), child_line));
            body.extend(child);
            index += 1;
        }
        drop(level);

        normalize_line_numbers(&mut body, line);
        debug!(screen = %name, line, statements = body.len(), "compiled screen");

        Ok(CompiledScreen {
            name,
            modal: metadata.modal.unwrap_or(false),
            zorder: metadata.zorder.unwrap_or(0),
            tag: metadata.tag,
            body,
            location: (l.filename().to_string(), line),
        })
    }

    /// Consume one `modal`, `zorder` or `tag` clause. Returns false, consuming nothing, if the
    /// line does not continue with one.
    fn parse_metadata(
        &self,
        l: &mut Lexer,
        screen: &str,
        metadata: &mut ScreenMetadata,
    ) -> Result<bool, ParseError> {
        if l.keyword("modal") {
            let value = self.constant(l, "modal")?;
            if metadata.modal.replace(value.is_truthy()).is_some() {
                redefined(screen, "modal", l.number());
            }
        } else if l.keyword("zorder") {
            let zorder = match self.constant(l, "zorder")? {
                Literal::Int(i) => i,
                Literal::Bool(b) => b as i64,
                _ => return Err(l.error("zorder expects an integer.")),
            };
            if metadata.zorder.replace(zorder).is_some() {
                redefined(screen, "zorder", l.number());
            }
        } else if l.keyword("tag") {
            let tag = l.require_word()?;
            if metadata.tag.replace(tag).is_some() {
                redefined(screen, "tag", l.number());
            }
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// A simple expression that must fold to a literal at compile time.
    fn constant(&self, l: &mut Lexer, property: &str) -> Result<Literal, ParseError> {
        let fragment = l.require_simple_expression()?;
        let value = self.compile_expression(l, &fragment)?;
        value
            .constant()
            .ok_or_else(|| l.error(format!("{property} expects a constant value.")))
    }
}
