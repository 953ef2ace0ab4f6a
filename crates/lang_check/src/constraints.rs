use std::collections::BTreeSet;
use std::fmt;

use derive_more::Debug;
use itertools::Itertools;
use lang_ty::{FreeTypeVars, Scheme, Subst, Substitutable, Ty, TypeVar};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The two types must unify.
    #[debug("Eq({_0:?}, {_1:?})")]
    Eq(Ty, Ty),

    /// The type must be an instance of the scheme.
    #[debug("ExpInst({_0:?}, {_1:?})")]
    ExpInst(Ty, Scheme),

    /// `ImpInst(t1, mono, t2)`: `t1` must be an instance of `t2` generalized
    /// over everything except `mono`.
    #[debug("ImpInst({_0:?}, {_1:?}, {_2:?})")]
    ImpInst(Ty, BTreeSet<TypeVar>, Ty),
}

impl Substitutable for Constraint {
    fn apply(&self, subst: &Subst) -> Self {
        match self {
            Constraint::Eq(t1, t2) => Constraint::Eq(t1.apply(subst), t2.apply(subst)),
            Constraint::ExpInst(t, scheme) => {
                Constraint::ExpInst(t.apply(subst), scheme.apply(subst))
            }
            Constraint::ImpInst(t1, mono, t2) => {
                Constraint::ImpInst(t1.apply(subst), mono.apply(subst), t2.apply(subst))
            }
        }
    }
}

/// The variables a constraint can still influence. A let-bound type may only
/// be generalized once none of its would-be quantified variables are active
/// anywhere else.
pub trait ActiveTypeVars {
    fn active_type_vars(&self) -> BTreeSet<TypeVar>;
}

impl ActiveTypeVars for Constraint {
    fn active_type_vars(&self) -> BTreeSet<TypeVar> {
        match self {
            Constraint::Eq(t1, t2) => &t1.free_type_vars() | &t2.free_type_vars(),
            Constraint::ImpInst(t1, mono, t2) => {
                let mono_in_t2 = mono & &t2.free_type_vars();
                &t1.free_type_vars() | &mono_in_t2
            }
            Constraint::ExpInst(t, scheme) => &t.free_type_vars() | &scheme.free_type_vars(),
        }
    }
}

impl ActiveTypeVars for [Constraint] {
    fn active_type_vars(&self) -> BTreeSet<TypeVar> {
        self.iter().flat_map(|c| c.active_type_vars()).collect()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Eq(t1, t2) => write!(f, "{t1} ~ {t2}"),
            Constraint::ExpInst(t, scheme) => write!(f, "{t} <= {scheme}"),
            Constraint::ImpInst(t1, mono, t2) => {
                write!(f, "{t1} <={{{}}} {t2}", mono.iter().join(", "))
            }
        }
    }
}
