// The lowering in this crate started from the def/lower module of
// https://github.com/oxalica/nil, trimmed down to what type inference walks.

mod ast_utils;
mod lower;
mod ops;

#[cfg(feature = "proptest_support")]
pub mod arbitrary;

#[cfg(test)]
mod tests;

use std::ops::Index;

use la_arena::{Arena, Idx};
use miette::Diagnostic;
use rowan::TextRange;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

pub use lower::lower;
pub use ops::{BinOp, BoolBinOp, ExprBinOp, NormalBinOp, OverloadBinOp, UnaryOp};

pub type ExprId = Idx<Expr>;

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("failed to parse nix source: {0}")]
    #[diagnostic(code(lang_ast::syntax))]
    Syntax(#[from] rnix::parser::ParseError),
}

/// Parse and lower a nix source text. Sources with syntax errors are rejected
/// up front, so every `Expr::Missing` left in the module comes from a construct
/// the lowering does not model.
pub fn parse_module(src: &str) -> Result<(Module, ModuleSourceMap), ParseError> {
    let root = rnix::Root::parse(src).ok()?;
    Ok(lower(root))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    exprs: Arena<Expr>,
    pub entry_expr: ExprId,
}

impl Module {
    pub fn exprs(&self) -> &Arena<Expr> {
        &self.exprs
    }

    pub fn iter_exprs(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs.iter()
    }

    /// The declarations of a module whose entry is a plain attribute set, in
    /// source order. Returns `None` for any other shape (recursive sets, dynamic
    /// keys, `inherit (from)` entries) since those can't be inferred one binding
    /// at a time.
    pub fn top_level_bindings(&self) -> Option<Vec<(SmolStr, ExprId)>> {
        let Expr::AttrSet {
            is_rec: false,
            bindings,
        } = &self[self.entry_expr]
        else {
            return None;
        };

        if !bindings.dynamics.is_empty() {
            return None;
        }

        bindings
            .statics
            .iter()
            .map(|(name, value)| match value {
                BindingValue::Expr(e) | BindingValue::Inherit(e) => Some((name.clone(), *e)),
                BindingValue::InheritFrom(_) => None,
            })
            .collect()
    }
}

impl Index<ExprId> for Module {
    type Output = Expr;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.exprs[index]
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ModuleSourceMap {
    expr_map_rev: FxHashMap<ExprId, TextRange>,
}

impl ModuleSourceMap {
    pub fn range_for_expr(&self, expr: ExprId) -> Option<TextRange> {
        self.expr_map_rev.get(&expr).copied()
    }

    pub(crate) fn insert_expr(&mut self, expr: ExprId, range: TextRange) {
        self.expr_map_rev.insert(expr, range);
    }

    pub fn shrink_to_fit(&mut self) {
        self.expr_map_rev.shrink_to_fit();
    }
}

pub type NixPath = SmolStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Float(ordered_float::OrderedFloat<f64>),
    Integer(i64),
    String(SmolStr),
    Path(NixPath),
    Uri,
}

/// A destructuring lambda parameter: `{ a, b ? 1, ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pat {
    pub fields: Box<[(SmolStr, Option<ExprId>)]>,
    pub ellipsis: bool,
}

pub type Attrpath = Box<[ExprId]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A hole left by a construct the lowering does not model.
    Missing,
    Apply {
        fun: ExprId,
        arg: ExprId,
    },
    IfThenElse {
        cond: ExprId,
        then_body: ExprId,
        else_body: ExprId,
    },
    Literal(Literal),
    Lambda {
        // at least one of these is set; with a pattern `param` is the `@` alias
        param: Option<SmolStr>,
        pat: Option<Pat>,
        body: ExprId,
    },
    LetIn {
        bindings: Bindings,
        body: ExprId,
    },
    List(Box<[ExprId]>),
    BinOp {
        lhs: ExprId,
        rhs: ExprId,
        op: BinOp,
    },
    AttrSet {
        is_rec: bool,
        bindings: Bindings,
    },
    UnaryOp {
        op: UnaryOp,
        expr: ExprId,
    },
    Reference(SmolStr),
    Select {
        set: ExprId,
        attrpath: Attrpath,
        default_expr: Option<ExprId>,
    },
    HasAttr {
        set: ExprId,
        attrpath: Attrpath,
    },
    With {
        env: ExprId,
        body: ExprId,
    },
    Assert {
        cond: ExprId,
        body: ExprId,
    },
    StringInterpolation(Box<[InterpolPart<SmolStr>]>),
    PathInterpolation(Box<[InterpolPart<SmolStr>]>),
}

impl Expr {
    pub fn walk_child_exprs(&self, mut f: impl FnMut(ExprId)) {
        match self {
            Self::Missing | Self::Reference(_) | Self::Literal(_) => {}
            Self::Lambda { pat, body, .. } => {
                if let Some(p) = pat {
                    p.fields
                        .iter()
                        .filter_map(|&(_, default_expr)| default_expr)
                        .for_each(&mut f);
                }
                f(*body);
            }
            Self::UnaryOp { expr, .. } => f(*expr),
            Self::Assert { cond: a, body: b }
            | Self::With { env: a, body: b }
            | Self::BinOp { lhs: a, rhs: b, .. }
            | Self::Apply { fun: a, arg: b } => {
                f(*a);
                f(*b);
            }
            Self::IfThenElse {
                cond,
                then_body,
                else_body,
            } => {
                f(*cond);
                f(*then_body);
                f(*else_body);
            }
            Self::HasAttr { set, attrpath } => {
                f(*set);
                attrpath.iter().copied().for_each(f);
            }
            Self::Select {
                set,
                attrpath,
                default_expr,
            } => {
                f(*set);
                attrpath.iter().copied().for_each(&mut f);
                if let &Some(e) = default_expr {
                    f(e);
                }
            }
            Self::List(xs) => xs.iter().copied().for_each(f),
            Self::LetIn { bindings, body } => {
                bindings.walk_child_exprs(&mut f);
                f(*body);
            }
            Self::AttrSet { bindings, .. } => bindings.walk_child_exprs(f),
            Self::StringInterpolation(parts) | Self::PathInterpolation(parts) => {
                for part in parts.iter() {
                    if let InterpolPart::Interpol(e) = part {
                        f(*e)
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpolPart<T> {
    Literal(T),
    Interpol(ExprId),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bindings {
    /// Static keys in the order they first appear in the source.
    pub statics: Box<[(SmolStr, BindingValue)]>,
    pub inherit_froms: Box<[ExprId]>,
    pub dynamics: Box<[(ExprId, ExprId)]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingValue {
    Expr(ExprId),
    /// `inherit x;`, the expr is a `Reference` resolved outside the binding group.
    Inherit(ExprId),
    /// `inherit (e) x;`, index into `Bindings::inherit_froms`.
    InheritFrom(usize),
}

impl Bindings {
    pub fn walk_child_exprs(&self, mut f: impl FnMut(ExprId)) {
        for (_, value) in self.statics.iter() {
            match value {
                BindingValue::Inherit(e) | BindingValue::Expr(e) => f(*e),
                BindingValue::InheritFrom(_) => {}
            }
        }
        for &e in self.inherit_froms.iter() {
            f(e);
        }
        for &(k, v) in self.dynamics.iter() {
            f(k);
            f(v);
        }
    }

    pub fn get(&self, name: &str) -> Option<BindingValue> {
        self.statics
            .iter()
            .find_map(|(key, value)| (key == name).then_some(*value))
    }

    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.statics.iter().map(|(name, _)| name)
    }
}
