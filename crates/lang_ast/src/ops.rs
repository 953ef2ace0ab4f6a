use std::fmt;

use rnix::ast::{BinOpKind, UnaryOpKind};

/// Arithmetic operators whose result depends on which numeric (or string/path)
/// operands they receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverloadBinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolBinOp {
    And,
    Or,
    Implication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprBinOp {
    Equal,
    NotEqual,
    Less,
    LessOrEq,
    More,
    MoreOrEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalBinOp {
    Bool(BoolBinOp),
    Expr(ExprBinOp),
    ListConcat,
    AttrUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Overload(OverloadBinOp),
    Normal(NormalBinOp),
}

impl From<BoolBinOp> for NormalBinOp {
    fn from(value: BoolBinOp) -> Self {
        NormalBinOp::Bool(value)
    }
}

impl From<ExprBinOp> for NormalBinOp {
    fn from(value: ExprBinOp) -> Self {
        NormalBinOp::Expr(value)
    }
}

impl From<NormalBinOp> for BinOp {
    fn from(value: NormalBinOp) -> Self {
        BinOp::Normal(value)
    }
}

impl From<OverloadBinOp> for BinOp {
    fn from(value: OverloadBinOp) -> Self {
        BinOp::Overload(value)
    }
}

impl From<BoolBinOp> for BinOp {
    fn from(value: BoolBinOp) -> Self {
        BinOp::Normal(value.into())
    }
}

impl From<ExprBinOp> for BinOp {
    fn from(value: ExprBinOp) -> Self {
        BinOp::Normal(value.into())
    }
}

impl From<BinOpKind> for BinOp {
    fn from(value: BinOpKind) -> Self {
        match value {
            BinOpKind::Concat => NormalBinOp::ListConcat.into(),
            BinOpKind::Update => NormalBinOp::AttrUpdate.into(),

            BinOpKind::Add => OverloadBinOp::Add.into(),
            BinOpKind::Sub => OverloadBinOp::Sub.into(),
            BinOpKind::Mul => OverloadBinOp::Mul.into(),
            BinOpKind::Div => OverloadBinOp::Div.into(),

            BinOpKind::And => BoolBinOp::And.into(),
            BinOpKind::Or => BoolBinOp::Or.into(),
            BinOpKind::Implication => BoolBinOp::Implication.into(),

            BinOpKind::Equal => ExprBinOp::Equal.into(),
            BinOpKind::NotEqual => ExprBinOp::NotEqual.into(),
            BinOpKind::Less => ExprBinOp::Less.into(),
            BinOpKind::LessOrEq => ExprBinOp::LessOrEq.into(),
            BinOpKind::More => ExprBinOp::More.into(),
            BinOpKind::MoreOrEq => ExprBinOp::MoreOrEq.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl From<UnaryOpKind> for UnaryOp {
    fn from(value: UnaryOpKind) -> Self {
        match value {
            UnaryOpKind::Invert => UnaryOp::Not,
            UnaryOpKind::Negate => UnaryOp::Negate,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Overload(OverloadBinOp::Add) => "+",
            BinOp::Overload(OverloadBinOp::Sub) => "-",
            BinOp::Overload(OverloadBinOp::Mul) => "*",
            BinOp::Overload(OverloadBinOp::Div) => "/",
            BinOp::Normal(NormalBinOp::Bool(BoolBinOp::And)) => "&&",
            BinOp::Normal(NormalBinOp::Bool(BoolBinOp::Or)) => "||",
            BinOp::Normal(NormalBinOp::Bool(BoolBinOp::Implication)) => "->",
            BinOp::Normal(NormalBinOp::Expr(ExprBinOp::Equal)) => "==",
            BinOp::Normal(NormalBinOp::Expr(ExprBinOp::NotEqual)) => "!=",
            BinOp::Normal(NormalBinOp::Expr(ExprBinOp::Less)) => "<",
            BinOp::Normal(NormalBinOp::Expr(ExprBinOp::LessOrEq)) => "<=",
            BinOp::Normal(NormalBinOp::Expr(ExprBinOp::More)) => ">",
            BinOp::Normal(NormalBinOp::Expr(ExprBinOp::MoreOrEq)) => ">=",
            BinOp::Normal(NormalBinOp::ListConcat) => "++",
            BinOp::Normal(NormalBinOp::AttrUpdate) => "//",
        };
        f.write_str(s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
            UnaryOp::Negate => f.write_str("-"),
        }
    }
}
