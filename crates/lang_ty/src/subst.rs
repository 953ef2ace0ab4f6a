use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use derive_more::Debug;

use crate::{AttrSetTy, Scheme, Ty, TypeVar};

/// A finite map from type variables to types.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[debug("Subst({_0:?})")]
pub struct Subst(BTreeMap<TypeVar, Ty>);

impl Subst {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(var: TypeVar, ty: Ty) -> Self {
        Self(BTreeMap::from([(var, ty)]))
    }

    pub fn get(&self, var: TypeVar) -> Option<&Ty> {
        self.0.get(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVar, &Ty)> {
        self.0.iter()
    }

    /// `self` after `older`: every type in `older` is rewritten by `self`, then
    /// `self`'s own bindings are added for variables `older` leaves alone.
    pub fn compose(&self, older: &Subst) -> Subst {
        let mut map: BTreeMap<TypeVar, Ty> = older
            .0
            .iter()
            .map(|(var, ty)| (*var, ty.apply(self)))
            .collect();
        for (var, ty) in &self.0 {
            map.entry(*var).or_insert_with(|| ty.clone());
        }
        Subst(map)
    }

    /// The same substitution without bindings for `vars`.
    pub fn without(&self, vars: &[TypeVar]) -> Subst {
        Subst(
            self.0
                .iter()
                .filter(|(var, _)| !vars.contains(var))
                .map(|(var, ty)| (*var, ty.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(TypeVar, Ty)> for Subst {
    fn from_iter<T: IntoIterator<Item = (TypeVar, Ty)>>(iter: T) -> Self {
        Subst(iter.into_iter().collect())
    }
}

impl fmt::Display for Subst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (var, ty)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var} := {ty}")?;
        }
        write!(f, "]")
    }
}

// ==============================================================================
// Substitutable
// ==============================================================================

pub trait Substitutable {
    fn apply(&self, subst: &Subst) -> Self;
}

impl Substitutable for Ty {
    fn apply(&self, subst: &Subst) -> Self {
        if subst.is_empty() {
            return self.clone();
        }

        match self {
            Ty::TyVar(var) => subst.get(*var).cloned().unwrap_or_else(|| self.clone()),
            Ty::Primitive(_) => self.clone(),
            Ty::List(elems) => Ty::List(elems.apply(subst)),
            Ty::Lambda { param, body } => Ty::lambda(param.apply(subst), body.apply(subst)),
            Ty::AttrSet(set) => Ty::AttrSet(AttrSetTy {
                fields: set
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.apply(subst)))
                    .collect(),
                open: set.open,
            }),
            Ty::Overload(alts) => Ty::overload(alts.iter().map(|alt| alt.apply(subst))),
        }
    }
}

impl Substitutable for Vec<Ty> {
    fn apply(&self, subst: &Subst) -> Self {
        self.iter().map(|t| t.apply(subst)).collect()
    }
}

impl Substitutable for Scheme {
    fn apply(&self, subst: &Subst) -> Self {
        // quantified variables are not visible from the outside
        let shielded = subst.without(&self.vars);
        Scheme {
            vars: self.vars.clone(),
            ty: self.ty.apply(&shielded),
        }
    }
}

impl Substitutable for BTreeSet<TypeVar> {
    fn apply(&self, subst: &Subst) -> Self {
        self.iter()
            .flat_map(|var| Ty::TyVar(*var).apply(subst).free_type_vars())
            .collect()
    }
}

// ==============================================================================
// Free type variables
// ==============================================================================

pub trait FreeTypeVars {
    fn free_type_vars(&self) -> BTreeSet<TypeVar>;
}

impl FreeTypeVars for Ty {
    fn free_type_vars(&self) -> BTreeSet<TypeVar> {
        self.type_vars_in_order().into_iter().collect()
    }
}

impl FreeTypeVars for [Ty] {
    fn free_type_vars(&self) -> BTreeSet<TypeVar> {
        self.iter().flat_map(Ty::free_type_vars).collect()
    }
}

impl FreeTypeVars for Vec<Ty> {
    fn free_type_vars(&self) -> BTreeSet<TypeVar> {
        self.as_slice().free_type_vars()
    }
}

impl FreeTypeVars for Scheme {
    fn free_type_vars(&self) -> BTreeSet<TypeVar> {
        let mut free = self.ty.free_type_vars();
        for var in &self.vars {
            free.remove(var);
        }
        free
    }
}

impl FreeTypeVars for BTreeSet<TypeVar> {
    fn free_type_vars(&self) -> BTreeSet<TypeVar> {
        self.clone()
    }
}
