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

//! The intermediate representation produced by the screen compiler and by the host expression
//! compiler. A compiled screen body is a list of `Stmt`, executed against a runtime scope.

use serde::Serialize;

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Literal {
    pub fn is_truthy(&self) -> bool {
        match self {
            Literal::None => false,
            Literal::Bool(b) => *b,
            Literal::Int(i) => *i != 0,
            Literal::Float(f) => *f != 0.0,
            Literal::Str(s) => !s.is_empty(),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "//")]
    FloorDiv,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "**")]
    Pow,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, strum::Display)]
pub enum CompareOp {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    LtE,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    GtE,
    #[strum(serialize = "in")]
    In,
    #[strum(serialize = "not in")]
    NotIn,
    #[strum(serialize = "is")]
    Is,
    #[strum(serialize = "is not")]
    IsNot,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Neg,
    #[strum(serialize = "+")]
    Pos,
    #[strum(serialize = "not ")]
    Not,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Arg {
    Normal(Expr),
    /// `*expr`
    Splice(Expr),
}

/// A keyword argument to a call. `arg` is `None` for a `**expr` mapping splice.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

impl Keyword {
    pub fn new(arg: &str, value: Expr) -> Self {
        Self {
            arg: Some(arg.to_string()),
            value,
        }
    }

    pub fn splice(value: Expr) -> Self {
        Self { arg: None, value }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Expr {
    Value(Literal),
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    /// `lower:upper:step`, only found as the index of a subscript.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        function: Box<Expr>,
        args: Vec<Arg>,
        keywords: Vec<Keyword>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cond {
        condition: Box<Expr>,
        consequence: Box<Expr>,
        alternative: Box<Expr>,
    },
}

impl Expr {
    pub fn name(name: &str) -> Self {
        Expr::Name(name.to_string())
    }

    pub fn int(i: i64) -> Self {
        Expr::Value(Literal::Int(i))
    }

    pub fn str(s: &str) -> Self {
        Expr::Value(Literal::Str(s.to_string()))
    }

    /// Build a reference to a dotted name such as `ui.text`.
    pub fn dotted(path: &str) -> Self {
        let mut parts = path.split('.');
        let head = Expr::name(parts.next().unwrap_or_default());
        parts.fold(head, |value, attr| Expr::Attribute {
            value: Box::new(value),
            attr: attr.to_string(),
        })
    }

    pub fn call(function: Expr, args: Vec<Arg>, keywords: Vec<Keyword>) -> Self {
        Expr::Call {
            function: Box::new(function),
            args,
            keywords,
        }
    }

    /// Fold the expression down to a literal, if it consists only of literals and the unary
    /// operators.
    pub fn constant(&self) -> Option<Literal> {
        match self {
            Expr::Value(literal) => Some(literal.clone()),
            Expr::Unary(UnaryOp::Not, operand) => {
                Some(Literal::Bool(!operand.constant()?.is_truthy()))
            }
            Expr::Unary(UnaryOp::Neg, operand) => match operand.constant()? {
                Literal::Int(i) => i.checked_neg().map(Literal::Int),
                Literal::Float(f) => Some(Literal::Float(-f)),
                Literal::Bool(b) => Some(Literal::Int(-(b as i64))),
                _ => None,
            },
            Expr::Unary(UnaryOp::Pos, operand) => match operand.constant()? {
                l @ (Literal::Int(_) | Literal::Float(_)) => Some(l),
                Literal::Bool(b) => Some(Literal::Int(b as i64)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// The left hand side of an assignment, or the binding pattern of a loop.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Target {
    Name(String),
    Tuple(Vec<Target>),
    Attribute { value: Expr, attr: String },
    Subscript { value: Expr, index: Expr },
}

impl Target {
    pub fn name(name: &str) -> Self {
        Target::Name(name.to_string())
    }

    /// Reinterpret an expression as an assignment target, if it has the shape of one.
    pub fn from_expr(expr: Expr) -> Option<Self> {
        match expr {
            Expr::Name(name) => Some(Target::Name(name)),
            Expr::Attribute { value, attr } => Some(Target::Attribute {
                value: *value,
                attr,
            }),
            Expr::Subscript { value, index } => Some(Target::Subscript {
                value: *value,
                index: *index,
            }),
            Expr::Tuple(elements) | Expr::List(elements) => elements
                .into_iter()
                .map(Target::from_expr)
                .collect::<Option<Vec<_>>>()
                .map(Target::Tuple),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Stmt {
    pub node: StmtNode,
    /// 1-based line in the screen's source file this statement is attributed to.
    pub line: usize,
}

impl Stmt {
    pub fn new(node: StmtNode, line: usize) -> Self {
        Stmt { node, line }
    }

    pub fn expr(expr: Expr, line: usize) -> Self {
        Stmt::new(StmtNode::Expr(expr), line)
    }

    pub fn assign(target: Target, value: Expr, line: usize) -> Self {
        Stmt::new(StmtNode::Assign { target, value }, line)
    }

    /// The nested statement lists of this statement, in body order.
    pub fn bodies(&self) -> Vec<&Vec<Stmt>> {
        match &self.node {
            StmtNode::If { body, orelse, .. } => vec![body, orelse],
            StmtNode::For { body, .. } => vec![body],
            _ => vec![],
        }
    }

    pub fn bodies_mut(&mut self) -> Vec<&mut Vec<Stmt>> {
        match &mut self.node {
            StmtNode::If { body, orelse, .. } => vec![body, orelse],
            StmtNode::For { body, .. } => vec![body],
            _ => vec![],
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum StmtNode {
    Expr(Expr),
    Assign {
        target: Target,
        value: Expr,
    },
    AugAssign {
        target: Target,
        op: BinaryOp,
        value: Expr,
    },
    If {
        condition: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Target,
        iter: Expr,
        body: Vec<Stmt>,
    },
    Pass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_builds_attribute_chain() {
        assert_eq!(
            Expr::dotted("ui.text"),
            Expr::Attribute {
                value: Box::new(Expr::name("ui")),
                attr: "text".to_string(),
            }
        );
        assert_eq!(Expr::dotted("pass_"), Expr::name("pass_"));
    }

    #[test]
    fn test_constant_folding() {
        let neg = Expr::Unary(UnaryOp::Neg, Box::new(Expr::int(3)));
        assert_eq!(neg.constant(), Some(Literal::Int(-3)));

        let not = Expr::Unary(UnaryOp::Not, Box::new(Expr::Value(Literal::None)));
        assert_eq!(not.constant(), Some(Literal::Bool(true)));

        assert_eq!(Expr::name("x").constant(), None);
    }

    #[test]
    fn test_target_from_expr() {
        let expr = Expr::Tuple(vec![Expr::name("a"), Expr::List(vec![Expr::name("b")])]);
        assert_eq!(
            Target::from_expr(expr),
            Some(Target::Tuple(vec![
                Target::name("a"),
                Target::Tuple(vec![Target::name("b")])
            ]))
        );
        assert_eq!(Target::from_expr(Expr::int(1)), None);
    }
}
