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

//! The host expression language embedded in screen source: parses expression and statement
//! text into IR with pest.

use pest::Parser as PestParser;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use thiserror::Error;

use crate::ast::{
    Arg, BinaryOp, CompareOp, Expr, Keyword, Literal, Stmt, StmtNode, Target, UnaryOp,
};
use crate::host::grammar::{HostGrammar, Rule};
use crate::lexer::split_logical_lines;

pub(crate) mod grammar {
    #[derive(Parser)]
    #[grammar = "src/host.pest"]
    pub struct HostGrammar;
}

/// A syntax error in a fragment of host code, located relative to the fragment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (line {line}, column {column})")]
pub struct HostSyntaxError {
    /// 1-based line within the fragment.
    pub line: usize,
    /// 1-based column within `line_text`.
    pub column: usize,
    pub line_text: String,
    pub message: String,
}

impl HostSyntaxError {
    fn from_pest(error: pest::error::Error<Rule>, line_offset: usize) -> Self {
        let (line, column) = match error.line_col {
            LineColLocation::Pos(lc) => lc,
            LineColLocation::Span(start, _) => start,
        };
        Self {
            line: line + line_offset,
            column,
            line_text: error.line().to_string(),
            message: error.variant.message().to_string(),
        }
    }

    fn at(pair: &Pair<Rule>, line_offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = pair.line_col();
        Self {
            line: line + line_offset,
            column,
            line_text: pair.get_input().lines().nth(line - 1).unwrap_or_default().to_string(),
            message: message.into(),
        }
    }
}

/// Compiles host language source text into IR. Implementations treat the text as opaque to the
/// screen grammar.
pub trait HostCompiler {
    fn parse_expression(&self, text: &str) -> Result<Expr, HostSyntaxError>;

    /// Parse a sequence of statements. Statement line numbers are relative to the text, starting
    /// at 1.
    fn parse_block(&self, text: &str) -> Result<Vec<Stmt>, HostSyntaxError>;
}

pub struct PestHostCompiler {
    pratt: PrattParser<Rule>,
}

impl Default for PestHostCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl PestHostCompiler {
    pub fn new() -> Self {
        let pratt = PrattParser::new()
            // Python's precedence, lowest to highest.
            .op(Op::infix(Rule::or_op, Assoc::Left))
            .op(Op::infix(Rule::and_op, Assoc::Left))
            .op(Op::prefix(Rule::not_op))
            // Comparisons do not chain; `a < b < c` is `(a < b) < c`.
            .op(Op::infix(Rule::in_op, Assoc::Left)
                | Op::infix(Rule::not_in, Assoc::Left)
                | Op::infix(Rule::is_op, Assoc::Left)
                | Op::infix(Rule::is_not, Assoc::Left)
                | Op::infix(Rule::eq, Assoc::Left)
                | Op::infix(Rule::neq, Assoc::Left)
                | Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::lte, Assoc::Left)
                | Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::gte, Assoc::Left))
            .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
            .op(Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::floordiv, Assoc::Left)
                | Op::infix(Rule::modulus, Assoc::Left))
            .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos))
            .op(Op::infix(Rule::pow, Assoc::Right));
        Self { pratt }
    }

    fn parse_expr(&self, pair: Pair<Rule>, offset: usize) -> Result<Expr, HostSyntaxError> {
        let malformed = HostSyntaxError::at(&pair, offset, "malformed expression");
        let mut inner = pair.into_inner();
        let Some(first) = inner.next() else {
            return Err(malformed);
        };
        let consequence = self.parse_op_expr(first.into_inner(), offset)?;

        // kw_if ~ condition ~ kw_else ~ alternative
        if inner.next().is_none() {
            return Ok(consequence);
        }
        let (Some(condition), Some(_), Some(alternative)) =
            (inner.next(), inner.next(), inner.next())
        else {
            return Err(malformed);
        };
        Ok(Expr::Cond {
            condition: Box::new(self.parse_op_expr(condition.into_inner(), offset)?),
            consequence: Box::new(consequence),
            alternative: Box::new(self.parse_expr(alternative, offset)?),
        })
    }

    fn parse_op_expr(&self, pairs: Pairs<Rule>, offset: usize) -> Result<Expr, HostSyntaxError> {
        self.pratt
            .map_primary(|primary| self.parse_primary(primary, offset))
            .map_prefix(|op, rhs| {
                let op = match op.as_rule() {
                    Rule::not_op => UnaryOp::Not,
                    Rule::neg => UnaryOp::Neg,
                    _ => UnaryOp::Pos,
                };
                Ok(Expr::Unary(op, Box::new(rhs?)))
            })
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (Box::new(lhs?), Box::new(rhs?));
                let rule = op.as_rule();
                let expr = match rule {
                    Rule::or_op => Expr::Or(lhs, rhs),
                    Rule::and_op => Expr::And(lhs, rhs),
                    _ => match (compare_op(rule), binary_op(rule)) {
                        (Some(op), _) => Expr::Compare(op, lhs, rhs),
                        (None, Some(op)) => Expr::Binary(op, lhs, rhs),
                        (None, None) => {
                            return Err(HostSyntaxError::at(&op, offset, "unknown operator"));
                        }
                    },
                };
                Ok(expr)
            })
            .parse(pairs)
    }

    fn parse_exprs(
        &self,
        pairs: Pairs<Rule>,
        offset: usize,
    ) -> Result<Vec<Expr>, HostSyntaxError> {
        pairs
            .filter(|p| p.as_rule() == Rule::expr)
            .map(|p| self.parse_expr(p, offset))
            .collect()
    }

    fn parse_primary(&self, pair: Pair<Rule>, offset: usize) -> Result<Expr, HostSyntaxError> {
        let mut inner = pair.into_inner();
        let Some(atom) = inner.next() else {
            return Ok(Expr::Value(Literal::None));
        };
        let mut expr = self.parse_atom(atom, offset)?;
        for trailer in inner {
            expr = match trailer.as_rule() {
                Rule::call => {
                    let mut args = vec![];
                    let mut keywords = vec![];
                    for argument in trailer.into_inner() {
                        let rule = argument.as_rule();
                        let mut parts = argument.into_inner();
                        let (first, second) = (parts.next(), parts.next());
                        match (rule, first, second) {
                            (Rule::positional, Some(value), _) => {
                                args.push(Arg::Normal(self.parse_expr(value, offset)?))
                            }
                            (Rule::splat, Some(value), _) => {
                                args.push(Arg::Splice(self.parse_expr(value, offset)?))
                            }
                            (Rule::kwsplat, Some(value), _) => {
                                keywords.push(Keyword::splice(self.parse_expr(value, offset)?))
                            }
                            (Rule::kwarg, Some(name), Some(value)) => keywords.push(Keyword::new(
                                name.as_str(),
                                self.parse_expr(value, offset)?,
                            )),
                            _ => {}
                        }
                    }
                    Expr::call(expr, args, keywords)
                }
                Rule::index => {
                    let index = match trailer.into_inner().next() {
                        Some(slice) if slice.as_rule() == Rule::slice => {
                            self.parse_slice(slice, offset)?
                        }
                        Some(index) => self.parse_expr(index, offset)?,
                        None => Expr::Value(Literal::None),
                    };
                    Expr::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                Rule::attribute => {
                    let attr = trailer.into_inner().as_str().to_string();
                    Expr::Attribute {
                        value: Box::new(expr),
                        attr,
                    }
                }
                _ => return Err(HostSyntaxError::at(&trailer, offset, "unknown trailer")),
            };
        }
        Ok(expr)
    }

    fn parse_slice(&self, pair: Pair<Rule>, offset: usize) -> Result<Expr, HostSyntaxError> {
        let (mut lower, mut upper, mut step) = (None, None, None);
        for bound in pair.into_inner() {
            let rule = bound.as_rule();
            let value = self.parse_exprs(bound.into_inner(), offset)?.pop().map(Box::new);
            match rule {
                Rule::slice_lower => lower = value,
                Rule::slice_upper => upper = value,
                _ => step = value,
            }
        }
        Ok(Expr::Slice { lower, upper, step })
    }

    fn parse_atom(&self, pair: Pair<Rule>, offset: usize) -> Result<Expr, HostSyntaxError> {
        match pair.as_rule() {
            Rule::none => Ok(Expr::Value(Literal::None)),
            Rule::true_lit => Ok(Expr::Value(Literal::Bool(true))),
            Rule::false_lit => Ok(Expr::Value(Literal::Bool(false))),
            Rule::integer => match pair.as_str().parse::<i64>() {
                Ok(int) => Ok(Expr::int(int)),
                Err(e) => Err(HostSyntaxError::at(
                    &pair,
                    offset,
                    format!("invalid integer literal '{}': {e}", pair.as_str()),
                )),
            },
            Rule::float => match pair.as_str().parse::<f64>() {
                Ok(float) => Ok(Expr::Value(Literal::Float(float))),
                Err(e) => Err(HostSyntaxError::at(
                    &pair,
                    offset,
                    format!("invalid float literal '{}': {e}", pair.as_str()),
                )),
            },
            Rule::string => {
                let mut raw = false;
                let mut body = "";
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::string_prefix => raw = part.as_str().contains(['r', 'R']),
                        _ => body = part.as_str(),
                    }
                }
                let value = if raw { body.to_string() } else { unquote_str(body) };
                Ok(Expr::Value(Literal::Str(value)))
            }
            Rule::ident => Ok(Expr::name(pair.as_str())),
            Rule::empty_tuple => Ok(Expr::Tuple(vec![])),
            Rule::tuple => Ok(Expr::Tuple(self.parse_exprs(pair.into_inner(), offset)?)),
            Rule::group => {
                let mut exprs = self.parse_exprs(pair.into_inner(), offset)?;
                Ok(exprs.pop().unwrap_or(Expr::Value(Literal::None)))
            }
            Rule::list => Ok(Expr::List(self.parse_exprs(pair.into_inner(), offset)?)),
            Rule::dict => {
                let mut entries = vec![];
                for entry in pair.into_inner() {
                    let mut kv = self.parse_exprs(entry.into_inner(), offset)?.into_iter();
                    if let (Some(key), Some(value)) = (kv.next(), kv.next()) {
                        entries.push((key, value));
                    }
                }
                Ok(Expr::Dict(entries))
            }
            _ => Err(HostSyntaxError::at(&pair, offset, "unexpected token")),
        }
    }

    /// A `value_list`: one expression, or a tuple when there is a comma.
    fn parse_value_list(&self, pair: Pair<Rule>, offset: usize) -> Result<Expr, HostSyntaxError> {
        let trailing_comma = pair
            .clone()
            .into_inner()
            .any(|p| p.as_rule() == Rule::trailing_comma);
        let mut values = self.parse_exprs(pair.into_inner(), offset)?;
        if values.len() == 1 && !trailing_comma {
            return Ok(values.remove(0));
        }
        Ok(Expr::Tuple(values))
    }

    fn parse_target_list(
        &self,
        pair: Pair<Rule>,
        offset: usize,
    ) -> Result<Target, HostSyntaxError> {
        let error = HostSyntaxError::at(&pair, offset, "cannot assign to expression");
        let mut trailing_comma = false;
        let mut targets = vec![];
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::trailing_comma => trailing_comma = true,
                _ => {
                    let expr = self.parse_primary(part, offset)?;
                    targets.push(Target::from_expr(expr).ok_or_else(|| error.clone())?);
                }
            }
        }
        if targets.len() == 1 && !trailing_comma {
            return Ok(targets.remove(0));
        }
        Ok(Target::Tuple(targets))
    }

    fn parse_statement(&self, pair: Pair<Rule>, offset: usize) -> Result<Stmt, HostSyntaxError> {
        let line = pair.line_col().0 + offset;
        let rule = pair.as_rule();
        let malformed = HostSyntaxError::at(&pair, offset, "malformed statement");
        let mut parts = pair.into_inner();
        let node = match rule {
            Rule::pass_stmt => StmtNode::Pass,
            Rule::expr_stmt => {
                let value = parts.next().ok_or(malformed)?;
                StmtNode::Expr(self.parse_value_list(value, offset)?)
            }
            Rule::assign => {
                let (Some(target), Some(value)) = (parts.next(), parts.next()) else {
                    return Err(malformed);
                };
                StmtNode::Assign {
                    target: self.parse_target_list(target, offset)?,
                    value: self.parse_value_list(value, offset)?,
                }
            }
            Rule::aug_assign => {
                let (Some(target_pair), Some(op), Some(value)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return Err(malformed);
                };
                let target = self.parse_target_list(target_pair.clone(), offset)?;
                if matches!(target, Target::Tuple(_)) {
                    return Err(HostSyntaxError::at(
                        &target_pair,
                        offset,
                        "illegal expression for augmented assignment",
                    ));
                }
                let op = match op.as_str() {
                    "+=" => BinaryOp::Add,
                    "-=" => BinaryOp::Sub,
                    "*=" => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                };
                StmtNode::AugAssign {
                    target,
                    op,
                    value: self.parse_expr(value, offset)?,
                }
            }
            _ => return Err(malformed),
        };
        Ok(Stmt::new(node, line))
    }
}

impl HostCompiler for PestHostCompiler {
    fn parse_expression(&self, text: &str) -> Result<Expr, HostSyntaxError> {
        let mut pairs = HostGrammar::parse(Rule::expression_input, text)
            .map_err(|e| HostSyntaxError::from_pest(e, 0))?;
        let expr = pairs
            .next()
            .and_then(|input| input.into_inner().find(|p| p.as_rule() == Rule::expr));
        match expr {
            Some(expr) => self.parse_expr(expr, 0),
            None => Err(HostSyntaxError {
                line: 1,
                column: 1,
                line_text: text.lines().next().unwrap_or_default().to_string(),
                message: "expected expression".to_string(),
            }),
        }
    }

    fn parse_block(&self, text: &str) -> Result<Vec<Stmt>, HostSyntaxError> {
        let lines = split_logical_lines(text).map_err(|e| HostSyntaxError {
            line: e.line,
            column: e.column,
            line_text: e.line_text,
            message: e.message,
        })?;

        let mut body = vec![];
        for line in lines {
            if line.indent != 0 {
                return Err(HostSyntaxError {
                    line: line.number,
                    column: line.indent + 1,
                    line_text: text.lines().nth(line.number - 1).unwrap_or_default().to_string(),
                    message: "unexpected indent".to_string(),
                });
            }
            let offset = line.number - 1;
            let pairs = HostGrammar::parse(Rule::statements_input, &line.text)
                .map_err(|e| HostSyntaxError::from_pest(e, offset))?;
            for input in pairs {
                for statement in input.into_inner() {
                    if statement.as_rule() == Rule::EOI {
                        continue;
                    }
                    body.push(self.parse_statement(statement, offset)?);
                }
            }
        }
        Ok(body)
    }
}

fn compare_op(rule: Rule) -> Option<CompareOp> {
    let op = match rule {
        Rule::in_op => CompareOp::In,
        Rule::not_in => CompareOp::NotIn,
        Rule::is_op => CompareOp::Is,
        Rule::is_not => CompareOp::IsNot,
        Rule::eq => CompareOp::Eq,
        Rule::neq => CompareOp::NotEq,
        Rule::lt => CompareOp::Lt,
        Rule::lte => CompareOp::LtE,
        Rule::gt => CompareOp::Gt,
        Rule::gte => CompareOp::GtE,
        _ => return None,
    };
    Some(op)
}

fn binary_op(rule: Rule) -> Option<BinaryOp> {
    let op = match rule {
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        Rule::floordiv => BinaryOp::FloorDiv,
        Rule::modulus => BinaryOp::Mod,
        Rule::pow => BinaryOp::Pow,
        _ => return None,
    };
    Some(op)
}

/// Resolve the escapes in the body of a string literal. Unknown escapes are kept verbatim.
pub fn unquote_str(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some('r') => output.push('\r'),
            Some('0') => output.push('\0'),
            Some('\n') => {}
            Some(c @ ('\\' | '\'' | '"')) => output.push(c),
            Some(c) => {
                output.push('\\');
                output.push(c);
            }
            None => output.push('\\'),
        }
    }
    output
}
