// ==============================================================================
// Constraint Solving
// ==============================================================================
//
// The solver explores a tree. Each node is an accumulated substitution plus
// the constraints still to solve. Solving an `Eq` may branch (see `unify`),
// every other step has exactly one child. Leaves with no constraints left are
// solutions. The tree is walked depth first, children in the order the
// unifier produced them, so solutions come out in overload order.

use std::num::NonZeroUsize;

use lang_ty::{FreeTypeVars, Scheme, Subst, Substitutable};

use crate::constraints::{ActiveTypeVars, Constraint};
use crate::fresh::Fresh;
use crate::unify::unify;
use crate::TypeError;

/// Bounds on how much of the solution tree is explored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveLimits {
    /// Stop after this many solutions. `None` explores the whole tree.
    pub max_solutions: Option<NonZeroUsize>,
}

impl SolveLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn max_solutions(max: NonZeroUsize) -> Self {
        Self {
            max_solutions: Some(max),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Solved {
    /// One final substitution per successful branch, in discovery order.
    pub substs: Vec<Subst>,
    /// Every error a failed branch ran into, in the order they happened.
    pub errors: Vec<TypeError>,
}

struct Node {
    subst: Subst,
    constraints: Vec<Constraint>,
}

pub(crate) fn solve(
    constraints: Vec<Constraint>,
    fresh: &mut Fresh,
    limits: SolveLimits,
) -> Solved {
    let mut solved = Solved::default();
    let mut stack = vec![Node {
        subst: Subst::empty(),
        constraints,
    }];

    while let Some(Node { subst, constraints }) = stack.pop() {
        if constraints.is_empty() {
            solved.substs.push(subst);
            if let Some(max) = limits.max_solutions {
                if solved.substs.len() >= max.get() && !stack.is_empty() {
                    log::warn!(
                        "stopping after {max} solutions, dropping {} unexplored branches",
                        stack.len()
                    );
                    break;
                }
            }
            continue;
        }

        let (constraint, rest) = match next_solvable(constraints) {
            Ok(found) => found,
            Err(remaining) => {
                log::trace!("no solvable constraint among {}", remaining.len());
                solved.errors.push(TypeError::Ambiguous(remaining));
                continue;
            }
        };

        log::trace!("solving {constraint}");
        match constraint {
            Constraint::Eq(t1, t2) => {
                let children: Vec<Node> = unify(&t1, &t2, &mut solved.errors)
                    .into_iter()
                    .map(|su| Node {
                        constraints: rest.iter().map(|c| c.apply(&su)).collect(),
                        subst: su.compose(&subst),
                    })
                    .collect();
                // reversed so the first alternative is popped first
                stack.extend(children.into_iter().rev());
            }
            Constraint::ImpInst(t1, mono, t2) => {
                let generalized = Constraint::ExpInst(t1, Scheme::generalize(&mono, t2));
                stack.push(Node {
                    subst,
                    constraints: prepend(generalized, rest),
                });
            }
            Constraint::ExpInst(t, scheme) => {
                let instance = scheme.instantiate(|| fresh.var());
                stack.push(Node {
                    subst,
                    constraints: prepend(Constraint::Eq(t, instance), rest),
                });
            }
        }
    }

    log::debug!(
        "solver finished with {} solutions and {} errors",
        solved.substs.len(),
        solved.errors.len()
    );
    solved
}

fn prepend(first: Constraint, rest: Vec<Constraint>) -> Vec<Constraint> {
    let mut constraints = Vec::with_capacity(rest.len() + 1);
    constraints.push(first);
    constraints.extend(rest);
    constraints
}

/// Take out the first constraint, in list order, that can be solved now.
/// Hands the list back untouched when none can.
fn next_solvable(
    mut constraints: Vec<Constraint>,
) -> Result<(Constraint, Vec<Constraint>), Vec<Constraint>> {
    let pos = (0..constraints.len()).find(|&i| match &constraints[i] {
        Constraint::Eq(..) | Constraint::ExpInst(..) => true,
        Constraint::ImpInst(_, mono, t2) => {
            let others: Vec<Constraint> = constraints
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| c.clone())
                .collect();
            // nothing t2 would quantify over may still be active elsewhere
            let quantified = &t2.free_type_vars() - mono;
            quantified.is_disjoint(&others.active_type_vars())
        }
    });

    match pos {
        Some(i) => {
            let constraint = constraints.remove(i);
            Ok((constraint, constraints))
        }
        None => Err(constraints),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use lang_ty::{Ty, TypeVar, ty};

    use super::*;

    fn run(constraints: Vec<Constraint>) -> Solved {
        // start above every variable the tests use by hand
        let mut fresh = Fresh::default();
        for _ in 0..100 {
            fresh.var();
        }
        solve(constraints, &mut fresh, SolveLimits::unlimited())
    }

    #[test]
    fn no_constraints_is_one_empty_solution() {
        let solved = run(vec![]);
        assert_eq!(solved.substs, vec![Subst::empty()]);
        assert!(solved.errors.is_empty());
    }

    #[test]
    fn equalities_accumulate() {
        let solved = run(vec![
            Constraint::Eq(ty!(# 0), ty!((# 1) -> (# 1))),
            Constraint::Eq(ty!(# 1), ty!(Int)),
        ]);
        assert_eq!(solved.substs.len(), 1);
        assert_eq!(ty!(# 0).apply(&solved.substs[0]), ty!(Int -> Int));
    }

    #[test]
    fn overloads_give_one_solution_per_branch() {
        let add = Ty::overload([ty!(Int -> Int), ty!(Float -> Float)]);
        let solved = run(vec![Constraint::Eq(ty!((# 0) -> (# 0)), add)]);
        let results: Vec<Ty> = solved.substs.iter().map(|s| ty!(# 0).apply(s)).collect();
        assert_eq!(results, vec![ty!(Int), ty!(Float)]);
    }

    #[test]
    fn failed_branches_are_logged() {
        let sig = Ty::overload([ty!(Int -> Int), ty!(Float -> Float)]);
        let solved = run(vec![
            Constraint::Eq(ty!((# 0) -> (# 0)), sig),
            Constraint::Eq(ty!(# 0), ty!(Float)),
        ]);
        assert_eq!(solved.substs.len(), 1);
        assert_eq!(
            solved.errors,
            vec![TypeError::UnificationFail(ty!(Int), ty!(Float))]
        );
    }

    #[test]
    fn max_solutions_truncates() {
        let sig = Ty::overload([ty!(Int), ty!(Float), ty!(String)]);
        let mut fresh = Fresh::default();
        let solved = solve(
            vec![Constraint::Eq(ty!(# 0), sig)],
            &mut fresh,
            SolveLimits::max_solutions(NonZeroUsize::MIN),
        );
        // the var binds to the whole set, so there is one solution anyway
        assert_eq!(solved.substs.len(), 1);

        let sig = Ty::overload([ty!(Int -> Int), ty!(Float -> Float), ty!(String -> String)]);
        let solved = solve(
            vec![Constraint::Eq(ty!((# 0) -> (# 0)), sig)],
            &mut fresh,
            SolveLimits::max_solutions(NonZeroUsize::new(2).unwrap()),
        );
        assert_eq!(solved.substs.len(), 2);
    }

    #[test]
    fn explicit_instances_are_fresh() {
        let id = Scheme {
            vars: vec![TypeVar(0)],
            ty: ty!((# 0) -> (# 0)),
        };
        let solved = run(vec![
            Constraint::ExpInst(ty!(# 5), id.clone()),
            Constraint::ExpInst(ty!(# 6), id),
            Constraint::Eq(ty!(# 5), ty!(Int -> (# 7))),
            Constraint::Eq(ty!(# 6), ty!(String -> (# 8))),
        ]);
        assert_eq!(solved.substs.len(), 1, "{:?}", solved.errors);
        let su = &solved.substs[0];
        assert_eq!(ty!(# 7).apply(su), ty!(Int));
        assert_eq!(ty!(# 8).apply(su), ty!(String));
    }

    #[test]
    fn implicit_instances_generalize_outside_mono() {
        // #1 is monomorphic, #2 is free to generalize
        let bound = ty!((# 1) -> (# 2));
        let mono = BTreeSet::from([TypeVar(1)]);
        let solved = run(vec![
            Constraint::ImpInst(ty!(# 5), mono.clone(), bound.clone()),
            Constraint::ImpInst(ty!(# 6), mono, bound),
            Constraint::Eq(ty!(# 5), ty!((# 3) -> Int)),
            Constraint::Eq(ty!(# 6), ty!((# 4) -> String)),
        ]);
        assert_eq!(solved.substs.len(), 1, "{:?}", solved.errors);
        let su = &solved.substs[0];
        // both uses share the monomorphic param
        assert_eq!(ty!(# 3).apply(su), ty!(# 4).apply(su));
    }

    #[test]
    fn implicit_instance_waits_for_active_vars() {
        // `#0` is still constrained by the Eq that comes after, so the
        // ImpInst must wait until that is solved
        let solved = run(vec![
            Constraint::ImpInst(ty!(# 1), BTreeSet::new(), ty!(# 0)),
            Constraint::Eq(ty!(# 0), ty!(Int)),
        ]);
        assert_eq!(solved.substs.len(), 1);
        assert_eq!(ty!(# 1).apply(&solved.substs[0]), ty!(Int));
    }

    #[test]
    fn mutually_blocked_instances_are_ambiguous() {
        let cs = vec![
            Constraint::ImpInst(ty!(# 0), BTreeSet::new(), ty!(# 1)),
            Constraint::ImpInst(ty!(# 1), BTreeSet::new(), ty!(# 0)),
        ];
        let solved = run(cs.clone());
        assert!(solved.substs.is_empty());
        assert_eq!(solved.errors, vec![TypeError::Ambiguous(cs)]);
    }
}
