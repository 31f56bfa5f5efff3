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

#[macro_use]
extern crate pest_derive;

// Intermediate representation
mod ast;
mod normalize;
mod precedence;
mod unparse;

// Source handling
mod embed;
mod host;
mod lexer;

// Grammar and statement parsers
mod control_flow;
mod grammar;
mod parse;
mod paths;
mod screen;
mod statements;

mod diagnostics;
mod errors;
mod options;

mod compile_tests;

pub use crate::ast::{
    Arg, BinaryOp, CompareOp, Expr, Keyword, Literal, Stmt, StmtNode, Target, UnaryOp,
};
pub use crate::diagnostics::{emit_parse_error, render_parse_error};
pub use crate::embed::Embedder;
pub use crate::errors::{GrammarError, ParseError};
pub use crate::grammar::{
    ChildPolicy, Clause, Declaration, EntryKind, Grammar, GrammarBuilder, GrammarEntry,
    StatementDefinition, StatementShape,
};
pub use crate::host::{HostCompiler, HostSyntaxError, PestHostCompiler};
pub use crate::lexer::{ArgumentInfo, Checkpoint, Fragment, Lexer, Line, group_logical_lines};
pub use crate::normalize::{line_numbers, normalize_line_numbers, shift_line_numbers};
pub use crate::options::{CompileOptions, DEFAULT_STYLE_PREFIXES};
pub use crate::parse::{
    CHILD_OR_FIXED_FUNCTION, CLOSE_FUNCTION, StatementParser, USE_SCREEN_FUNCTION,
};
pub use crate::paths::{PathGenerator, PathLevel, SiblingIndex};
pub use crate::screen::{CompiledScreen, ScreenCompiler, ScreenRegistry, compile_screens};
pub use crate::statements::standard_grammar;
pub use crate::unparse::{quote_str, unparse, unparse_expr, unparse_literal};
