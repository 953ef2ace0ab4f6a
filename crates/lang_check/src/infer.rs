// ==============================================================================
// Top-Level Driver
// ==============================================================================
//
// One call to `infer_expr` is one inference run: a fresh variable supply and a
// fresh arena of deferred bindings that are dropped when the run ends. The
// environment is the only thing carried from one declaration to the next.

use itertools::Itertools;
use lang_ast::{ExprId, Module};
use lang_ty::{Scheme, Subst, Substitutable, Ty};
use smol_str::SmolStr;
use thiserror::Error;

use crate::constraints::Constraint;
use crate::env::Env;
use crate::fresh::Fresh;
use crate::generate::Judgment;
use crate::solve::{solve, SolveLimits};
use crate::walk::Walker;
use crate::{InferError, TypeError};

/// Infer every principal scheme of `expr`, one per overload resolution that
/// type checks, in the order they were found.
pub fn infer_expr(env: &Env, module: &Module, expr: ExprId) -> Result<Vec<Scheme>, InferError> {
    infer_expr_with(env, module, expr, SolveLimits::default())
}

pub fn infer_expr_with(
    env: &Env,
    module: &Module,
    expr: ExprId,
    limits: SolveLimits,
) -> Result<Vec<Scheme>, InferError> {
    let (ty, substs) = solve_expr(env, module, expr, limits)?;
    Ok(substs
        .iter()
        .map(|subst| Scheme::close_over(ty.apply(subst)))
        .collect())
}

/// The unsolved type of `expr` and the substitution of every solver branch
/// that succeeded. Never returns an empty list.
pub(crate) fn solve_expr(
    env: &Env,
    module: &Module,
    expr: ExprId,
    limits: SolveLimits,
) -> Result<(Ty, Vec<Subst>), InferError> {
    let mut fresh = Fresh::default();
    let Judgment {
        assumptions,
        mut constraints,
        ty,
    } = Walker::new(module, env, &mut fresh).walk(expr)?;

    let unbound: Vec<SmolStr> = assumptions
        .keys()
        .into_iter()
        .filter(|name| !env.contains(name))
        .collect();
    if !unbound.is_empty() {
        return Err(InferError::TypeInferenceErrors(vec![
            TypeError::UnboundVariables(unbound),
        ]));
    }

    // every candidate scheme of a name must hold for every occurrence
    for (name, occurrence) in assumptions.iter() {
        for scheme in env.lookup(name).unwrap_or_default() {
            constraints.push(Constraint::ExpInst(occurrence.clone(), scheme.clone()));
        }
    }

    log::debug!(
        "solving {} constraints over {} type variables",
        constraints.len(),
        fresh.issued()
    );
    let solved = solve(constraints, &mut fresh, limits);

    if solved.substs.is_empty() {
        let errors: Vec<TypeError> = solved.errors.into_iter().unique().collect();
        return Err(if errors.is_empty() {
            InferError::InferenceAborted
        } else {
            InferError::TypeInferenceErrors(errors)
        });
    }

    Ok((ty, solved.substs))
}

/// Infer each declaration in order, each against the environment extended by
/// all declarations before it. Stops at the first failure.
pub fn infer_top(
    env: &Env,
    module: &Module,
    decls: &[(SmolStr, ExprId)],
) -> Result<Env, InferError> {
    infer_top_with(env, module, decls, SolveLimits::default())
}

pub fn infer_top_with(
    env: &Env,
    module: &Module,
    decls: &[(SmolStr, ExprId)],
    limits: SolveLimits,
) -> Result<Env, InferError> {
    infer_decls(env, module, decls, limits).map_err(|err| err.source)
}

/// The top-level declaration `infer_decls` stopped at.
#[derive(Debug, Error)]
#[error("cannot infer `{name}`")]
pub struct DeclError {
    pub name: SmolStr,
    pub expr: ExprId,
    #[source]
    pub source: InferError,
}

/// `infer_top_with`, naming the declaration that failed.
pub fn infer_decls(
    env: &Env,
    module: &Module,
    decls: &[(SmolStr, ExprId)],
    limits: SolveLimits,
) -> Result<Env, DeclError> {
    decls.iter().try_fold(env.clone(), |mut env, (name, expr)| {
        log::debug!("inferring `{name}`");
        let schemes = infer_expr_with(&env, module, *expr, limits).map_err(|source| DeclError {
            name: name.clone(),
            expr: *expr,
            source,
        })?;
        env.extend(name.clone(), schemes);
        Ok(env)
    })
}
