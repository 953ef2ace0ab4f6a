use std::collections::BTreeSet;
use std::fmt;

use derive_more::Debug;
use rustc_hash::FxHashMap;

use crate::{FreeTypeVars, Subst, Substitutable, Ty, TypeVar};

/// A polymorphic type: `forall vars. ty`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[debug("Forall({vars:?}, {ty:?})")]
pub struct Scheme {
    pub vars: Vec<TypeVar>,
    pub ty: Ty,
}

impl Scheme {
    /// A scheme that quantifies nothing.
    pub fn mono(ty: Ty) -> Self {
        Self {
            vars: Vec::new(),
            ty,
        }
    }

    /// Quantify over the free variables of `ty` that are not in `excluded`.
    pub fn generalize(excluded: &BTreeSet<TypeVar>, ty: Ty) -> Self {
        let vars = ty
            .free_type_vars()
            .difference(excluded)
            .copied()
            .collect();
        Self { vars, ty }
    }

    /// Generalize over every free variable and rename canonically.
    pub fn close_over(ty: Ty) -> Self {
        Self::generalize(&BTreeSet::new(), ty).normalize()
    }

    /// Rename the quantified variables to `0, 1, 2, ...` in the order they
    /// first appear in the body. Quantified variables the body never mentions
    /// are dropped.
    ///
    /// Panics if the body mentions a variable that is not quantified; closing
    /// over a type never produces such a scheme.
    pub fn normalize(&self) -> Self {
        let order = self.ty.type_vars_in_order();

        let renames: FxHashMap<TypeVar, TypeVar> = order
            .iter()
            .enumerate()
            .map(|(i, var)| {
                assert!(
                    self.vars.contains(var),
                    "type variable {var:?} not in signature of {self:?}"
                );
                (*var, TypeVar(i as u32))
            })
            .collect();

        let subst: Subst = renames
            .iter()
            .map(|(from, to)| (*from, Ty::TyVar(*to)))
            .collect();

        Self {
            vars: (0..order.len() as u32).map(TypeVar).collect(),
            ty: self.ty.apply(&subst),
        }
    }

    /// Replace each quantified variable with a fresh one.
    pub fn instantiate(&self, mut fresh: impl FnMut() -> TypeVar) -> Ty {
        if self.vars.is_empty() {
            return self.ty.clone();
        }
        let subst: Subst = self
            .vars
            .iter()
            .map(|var| (*var, Ty::TyVar(fresh())))
            .collect();
        self.ty.apply(&subst)
    }
}

impl From<Ty> for Scheme {
    fn from(value: Ty) -> Self {
        Scheme::mono(value)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            return write!(f, "{}", self.ty);
        }
        write!(f, "forall")?;
        for var in &self.vars {
            write!(f, " {var}")?;
        }
        write!(f, ". {}", self.ty)
    }
}
