mod assumption;
mod builtins;
mod constraints;
mod env;
mod fresh;
mod generate;
mod infer;
mod operators;
mod solve;
pub mod thunk;
mod unify;
mod walk;


#[cfg(test)]
mod pbt;

use itertools::Itertools;
use lang_ty::{Ty, TypeVar};
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

pub use assumption::Assumptions;
pub use builtins::builtin_env;
pub use constraints::{ActiveTypeVars, Constraint};
pub use env::Env;
pub use generate::Judgment;
pub use infer::{infer_decls, infer_expr, infer_expr_with, infer_top, infer_top_with, DeclError};
pub use operators::{bin_op_signature, unary_op_signature};
pub use solve::SolveLimits;
pub use unify::{bind, unify, unify_many};

/// Why one branch of the solver failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum TypeError {
    #[error("cannot unify {0} with {1}")]
    UnificationFail(Ty, Ty),

    #[error("infinite type: {0} occurs in {1}")]
    InfiniteType(TypeVar, Ty),

    #[error("unbound variables: {}", .0.iter().join(", "))]
    UnboundVariables(Vec<SmolStr>),

    #[error("ambiguous constraints: {}", .0.iter().join(", "))]
    Ambiguous(Vec<Constraint>),

    #[error(
        "cannot unify [{}] with [{}]",
        .0.iter().join(", "),
        .1.iter().join(", ")
    )]
    UnificationMismatch(Vec<Ty>, Vec<Ty>),
}

#[derive(Debug, Error, Diagnostic)]
pub enum InferError {
    #[error("type inference failed: {}", .0.iter().join("; "))]
    #[diagnostic(code(lang_check::type_errors))]
    TypeInferenceErrors(Vec<TypeError>),

    #[error("type inference aborted")]
    #[diagnostic(code(lang_check::aborted))]
    InferenceAborted,

    #[error("evaluation failed: {0}")]
    #[diagnostic(code(lang_check::evaluation))]
    EvaluationError(Box<dyn std::error::Error + Send + Sync>),
}

impl InferError {
    /// Combine two failures. `InferenceAborted` carries no information and
    /// gives way to anything; otherwise the left error is kept.
    pub fn merge(self, other: InferError) -> InferError {
        match (self, other) {
            (InferError::InferenceAborted, other) => other,
            (this, _) => this,
        }
    }

    /// The underlying type errors, if this is a type error at all.
    pub fn type_errors(&self) -> &[TypeError] {
        match self {
            InferError::TypeInferenceErrors(errors) => errors,
            _ => &[],
        }
    }
}
