// ==============================================================================
// Unification
// ==============================================================================
//
// Unification may branch: an overload set on either side is tried one
// alternative at a time. `unify` returns the substitution of every branch that
// succeeded, in alternative order, and records the error of every branch that
// failed in `log`. A failed branch contributes nothing; it never aborts its
// siblings.

use lang_ty::{Subst, Substitutable, Ty, TypeVar, is_homogeneous};

use crate::TypeError;

pub fn unify(t1: &Ty, t2: &Ty, log: &mut Vec<TypeError>) -> Vec<Subst> {
    if t1 == t2 {
        return vec![Subst::empty()];
    }

    match (t1, t2) {
        (Ty::TyVar(var), other) | (other, Ty::TyVar(var)) => match bind(*var, other) {
            Ok(subst) => vec![subst],
            Err(err) => fail(log, err),
        },

        (Ty::List(xs), Ty::List(ys)) => {
            if is_homogeneous(xs) && is_homogeneous(ys) {
                match (xs.first(), ys.first()) {
                    (Some(x), Some(y)) => unify(x, y, log),
                    // an empty list fits any list
                    _ => vec![Subst::empty()],
                }
            } else if xs.len() == ys.len() {
                unify_many(xs, ys, log)
            } else {
                fail(log, TypeError::UnificationFail(t1.clone(), t2.clone()))
            }
        }

        (Ty::AttrSet(lhs), Ty::AttrSet(rhs)) => {
            // only field names are checked here, field types are left alone
            let fits = match (lhs.open, rhs.open) {
                (true, true) => true,
                (false, true) => lhs.has_all_keys_of(rhs),
                (true, false) => rhs.has_all_keys_of(lhs),
                (false, false) => lhs.has_all_keys_of(rhs),
            };
            if fits {
                vec![Subst::empty()]
            } else {
                fail(log, TypeError::UnificationFail(t1.clone(), t2.clone()))
            }
        }

        (
            Ty::Lambda {
                param: p1,
                body: b1,
            },
            Ty::Lambda {
                param: p2,
                body: b2,
            },
        ) => unify_many(
            &[(**p1).clone(), (**b1).clone()],
            &[(**p2).clone(), (**b2).clone()],
            log,
        ),

        (Ty::Overload(alts), other) => {
            let mut substs = Vec::new();
            for alt in alts {
                substs.extend(unify(alt, other, log));
            }
            substs
        }
        (other, Ty::Overload(alts)) => {
            let mut substs = Vec::new();
            for alt in alts {
                substs.extend(unify(other, alt, log));
            }
            substs
        }

        _ => fail(log, TypeError::UnificationFail(t1.clone(), t2.clone())),
    }
}

/// Unify pairwise, threading each result into the remaining pairs.
pub fn unify_many(ts1: &[Ty], ts2: &[Ty], log: &mut Vec<TypeError>) -> Vec<Subst> {
    match (ts1.split_first(), ts2.split_first()) {
        (None, None) => vec![Subst::empty()],
        (Some((t1, rest1)), Some((t2, rest2))) => {
            let mut substs = Vec::new();
            for su1 in unify(t1, t2, log) {
                let rest1 = rest1.to_vec().apply(&su1);
                let rest2 = rest2.to_vec().apply(&su1);
                for su2 in unify_many(&rest1, &rest2, log) {
                    substs.push(su2.compose(&su1));
                }
            }
            substs
        }
        _ => fail(
            log,
            TypeError::UnificationMismatch(ts1.to_vec(), ts2.to_vec()),
        ),
    }
}

/// Bind `var` to `ty`, refusing cyclic types.
pub fn bind(var: TypeVar, ty: &Ty) -> Result<Subst, TypeError> {
    if *ty == Ty::TyVar(var) {
        Ok(Subst::empty())
    } else if ty.occurs(var) {
        Err(TypeError::InfiniteType(var, ty.clone()))
    } else {
        Ok(Subst::singleton(var, ty.clone()))
    }
}

fn fail(log: &mut Vec<TypeError>, err: TypeError) -> Vec<Subst> {
    log::trace!("unification branch failed: {err}");
    log.push(err);
    Vec::new()
}
