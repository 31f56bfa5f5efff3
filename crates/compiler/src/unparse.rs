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

//! Renders IR back to host-language source, for inspection and for the `screenc` text output.

use itertools::Itertools;

use crate::ast::{Arg, BinaryOp, Expr, Keyword, Literal, Stmt, StmtNode, Target};
use crate::precedence::{Precedence, get_precedence};

const INDENT_LEVEL: usize = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        get_precedence(self)
    }
}

/// Render a statement list as source lines, indented four spaces per level.
pub fn unparse(body: &[Stmt]) -> Vec<String> {
    let mut lines = vec![];
    unparse_stmts(body, 0, &mut lines);
    lines
}

fn unparse_stmts(body: &[Stmt], indent: usize, lines: &mut Vec<String>) {
    if body.is_empty() {
        lines.push(format!("{:indent$}pass", ""));
    }
    for stmt in body {
        unparse_stmt(stmt, indent, lines);
    }
}

fn unparse_stmt(stmt: &Stmt, indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    match &stmt.node {
        StmtNode::Expr(expr) => lines.push(format!("{pad}{}", unparse_expr(expr))),
        StmtNode::Assign { target, value } => lines.push(format!(
            "{pad}{} = {}",
            unparse_target(target),
            unparse_expr(value)
        )),
        StmtNode::AugAssign { target, op, value } => lines.push(format!(
            "{pad}{} {op}= {}",
            unparse_target(target),
            unparse_expr(value)
        )),
        StmtNode::If {
            condition,
            body,
            orelse,
        } => {
            lines.push(format!("{pad}if {}:", unparse_expr(condition)));
            unparse_stmts(body, indent + INDENT_LEVEL, lines);

            let mut orelse = orelse;
            loop {
                match orelse.as_slice() {
                    [] => break,
                    [
                        Stmt {
                            node:
                                StmtNode::If {
                                    condition,
                                    body,
                                    orelse: next,
                                },
                            ..
                        },
                    ] => {
                        lines.push(format!("{pad}elif {}:", unparse_expr(condition)));
                        unparse_stmts(body, indent + INDENT_LEVEL, lines);
                        orelse = next;
                    }
                    _ => {
                        lines.push(format!("{pad}else:"));
                        unparse_stmts(orelse, indent + INDENT_LEVEL, lines);
                        break;
                    }
                }
            }
        }
        StmtNode::For { target, iter, body } => {
            lines.push(format!(
                "{pad}for {} in {}:",
                unparse_target(target),
                unparse_expr(iter)
            ));
            unparse_stmts(body, indent + INDENT_LEVEL, lines);
        }
        StmtNode::Pass => lines.push(format!("{pad}pass")),
    }
}

fn unparse_target(target: &Target) -> String {
    match target {
        Target::Name(name) => name.clone(),
        Target::Tuple(elements) => {
            let elements: Vec<_> = elements.iter().map(unparse_target).collect();
            tuple(&elements)
        }
        Target::Attribute { value, attr } => {
            format!("{}.{attr}", operand(value, Precedence::Primary))
        }
        Target::Subscript { value, index } => format!(
            "{}[{}]",
            operand(value, Precedence::Primary),
            unparse_expr(index)
        ),
    }
}

fn tuple(elements: &[String]) -> String {
    match elements {
        [single] => format!("({single},)"),
        _ => format!("({})", elements.join(", ")),
    }
}

/// Render `expr`, parenthesised if it binds less tightly than `min`.
fn operand(expr: &Expr, min: Precedence) -> String {
    unparse_expr_at(expr, min.as_u8())
}

/// The operand one level tighter than `prec`, for the side of an operator that does not
/// associate.
fn tighter(expr: &Expr, prec: u8) -> String {
    let rendered = unparse_expr(expr);
    if expr.precedence() <= prec {
        format!("({rendered})")
    } else {
        rendered
    }
}

pub fn unparse_literal(literal: &Literal) -> String {
    match literal {
        Literal::None => "None".to_string(),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{f:?}"),
        Literal::Str(s) => quote_str(s),
    }
}

/// Quote a string the way the host language reads it back.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unparse_call(function: &Expr, args: &[Arg], keywords: &[Keyword]) -> String {
    let args = args.iter().map(|arg| match arg {
        Arg::Normal(expr) => unparse_expr(expr),
        Arg::Splice(expr) => format!("*{}", unparse_expr(expr)),
    });
    let keywords = keywords.iter().map(|keyword| match &keyword.arg {
        Some(arg) => format!("{arg}={}", unparse_expr(&keyword.value)),
        None => format!("**{}", unparse_expr(&keyword.value)),
    });
    format!(
        "{}({})",
        operand(function, Precedence::Primary),
        args.chain(keywords).join(", ")
    )
}

pub fn unparse_expr(expr: &Expr) -> String {
    let prec = expr.precedence();
    match expr {
        Expr::Value(literal) => unparse_literal(literal),
        Expr::Name(name) => name.clone(),
        Expr::Attribute { value, attr } => {
            format!("{}.{attr}", operand(value, Precedence::Primary))
        }
        Expr::Subscript { value, index } => format!(
            "{}[{}]",
            operand(value, Precedence::Primary),
            unparse_expr(index)
        ),
        Expr::Slice { lower, upper, step } => {
            let bound = |b: &Option<Box<Expr>>| b.as_deref().map(unparse_expr).unwrap_or_default();
            match step {
                Some(step) => format!("{}:{}:{}", bound(lower), bound(upper), unparse_expr(step)),
                None => format!("{}:{}", bound(lower), bound(upper)),
            }
        }
        Expr::Call {
            function,
            args,
            keywords,
        } => unparse_call(function, args, keywords),
        Expr::Tuple(elements) => {
            let elements: Vec<_> = elements.iter().map(unparse_expr).collect();
            tuple(&elements)
        }
        Expr::List(elements) => format!("[{}]", elements.iter().map(unparse_expr).join(", ")),
        Expr::Dict(entries) => {
            let mut entries = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", unparse_expr(k), unparse_expr(v)));
            format!("{{{}}}", entries.join(", "))
        }
        // `**` groups to the right; everything else to the left.
        Expr::Binary(BinaryOp::Pow, left, right) => {
            format!("{} ** {}", tighter(left, prec), unparse_expr_at(right, prec))
        }
        Expr::Binary(op, left, right) => {
            format!("{} {op} {}", unparse_expr_at(left, prec), tighter(right, prec))
        }
        Expr::Compare(op, left, right) => {
            format!("{} {op} {}", tighter(left, prec), tighter(right, prec))
        }
        Expr::And(left, right) => {
            format!("{} and {}", unparse_expr_at(left, prec), tighter(right, prec))
        }
        Expr::Or(left, right) => {
            format!("{} or {}", unparse_expr_at(left, prec), tighter(right, prec))
        }
        Expr::Unary(op, operand) => format!("{op}{}", unparse_expr_at(operand, prec)),
        Expr::Cond {
            condition,
            consequence,
            alternative,
        } => format!(
            "{} if {} else {}",
            tighter(consequence, prec),
            tighter(condition, prec),
            unparse_expr(alternative)
        ),
    }
}

/// Render `expr`, parenthesised if it binds less tightly than the raw precedence `prec`.
fn unparse_expr_at(expr: &Expr, prec: u8) -> String {
    let rendered = unparse_expr(expr);
    if expr.precedence() < prec {
        format!("({rendered})")
    } else {
        rendered
    }
}
