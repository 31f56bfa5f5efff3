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

//! Operator precedence shared by the host expression parser and the unparser.
//! Higher numbers bind more tightly.

use crate::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Cond = 1,           // a if c else b (lowest precedence)
    Or = 2,             // or
    And = 3,            // and
    Not = 4,            // not
    Comparison = 5,     // == != < <= > >= in not in is is not
    Additive = 6,       // + -
    Multiplicative = 7, // * / // %
    Unary = 8,          // - + (prefix operators)
    Power = 9,          // **
    Primary = 10,       // literals, names, calls, subscripts, displays
}

impl Precedence {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Get the precedence for an expression
pub fn get_precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Cond { .. } => Precedence::Cond.as_u8(),
        Expr::Or(_, _) => Precedence::Or.as_u8(),
        Expr::And(_, _) => Precedence::And.as_u8(),
        Expr::Unary(UnaryOp::Not, _) => Precedence::Not.as_u8(),
        Expr::Compare(_, _, _) => Precedence::Comparison.as_u8(),
        Expr::Binary(op, _, _) => match op {
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive.as_u8(),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod => {
                Precedence::Multiplicative.as_u8()
            }
            BinaryOp::Pow => Precedence::Power.as_u8(),
        },
        Expr::Unary(_, _) => Precedence::Unary.as_u8(),
        Expr::Value(_)
        | Expr::Name(_)
        | Expr::Attribute { .. }
        | Expr::Subscript { .. }
        | Expr::Slice { .. }
        | Expr::Call { .. }
        | Expr::Tuple(_)
        | Expr::List(_)
        | Expr::Dict(_) => Precedence::Primary.as_u8(),
    }
}
