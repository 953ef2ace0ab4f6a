mod attrset;
mod primitive;
mod scheme;
mod subst;

#[cfg(any(test, feature = "proptest_support"))]
pub mod arbitrary;


use std::collections::BTreeSet;
use std::fmt;

pub use attrset::AttrSetTy;
pub use primitive::PrimitiveTy;
pub use scheme::Scheme;
pub use subst::{FreeTypeVars, Subst, Substitutable};

use derive_more::Debug;

/// An inference variable. Only identity matters; the number is whatever the
/// fresh supply handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[debug("#{_0}")]
pub struct TypeVar(pub u32);

impl From<TypeVar> for Ty {
    fn from(value: TypeVar) -> Self {
        Ty::TyVar(value)
    }
}

// the mono type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    #[allow(clippy::enum_variant_names)]
    #[debug("TyVar({_0:?})")]
    TyVar(TypeVar),

    #[debug("{_0:?}")]
    Primitive(PrimitiveTy),

    /// The element types seen where the list was built. Lists are not length
    /// indexed; `[]` doubles as "any list" in operator signatures.
    #[debug("List({_0:?})")]
    List(Vec<Ty>),

    #[debug("Lambda({param:?} -> {body:?})")]
    Lambda { param: Box<Ty>, body: Box<Ty> },

    #[debug("{_0:?}")]
    AttrSet(AttrSetTy),

    /// Alternatives for one position, tried one at a time while solving.
    /// Build with [`Ty::overload`] so sets never nest.
    #[debug("Overload({_0:?})")]
    Overload(Vec<Ty>),
}

impl Ty {
    pub fn lambda(param: impl Into<Ty>, body: impl Into<Ty>) -> Ty {
        Ty::Lambda {
            param: Box::new(param.into()),
            body: Box::new(body.into()),
        }
    }

    /// Build an overload set. Nested sets are flattened, repeated alternatives
    /// dropped, and a single alternative is returned as-is.
    pub fn overload(alternatives: impl IntoIterator<Item = Ty>) -> Ty {
        let mut flat: Vec<Ty> = Vec::new();
        for alt in alternatives {
            match alt {
                Ty::Overload(inner) => {
                    for inner_alt in inner {
                        if !flat.contains(&inner_alt) {
                            flat.push(inner_alt);
                        }
                    }
                }
                alt => {
                    if !flat.contains(&alt) {
                        flat.push(alt);
                    }
                }
            }
        }

        if flat.len() == 1 {
            flat.swap_remove(0)
        } else {
            Ty::Overload(flat)
        }
    }

    /// Does `var` appear anywhere in this type.
    pub fn occurs(&self, var: TypeVar) -> bool {
        match self {
            Ty::TyVar(v) => *v == var,
            Ty::Primitive(_) => false,
            Ty::List(elems) | Ty::Overload(elems) => elems.iter().any(|t| t.occurs(var)),
            Ty::Lambda { param, body } => param.occurs(var) || body.occurs(var),
            Ty::AttrSet(set) => set.fields.values().any(|t| t.occurs(var)),
        }
    }

    /// Free type variables in order of first appearance, deduplicated.
    pub fn type_vars_in_order(&self) -> Vec<TypeVar> {
        let mut result = Vec::new();
        let mut seen = BTreeSet::new();
        self.collect_type_vars(&mut result, &mut seen);
        result
    }

    fn collect_type_vars(&self, result: &mut Vec<TypeVar>, seen: &mut BTreeSet<TypeVar>) {
        match self {
            Ty::TyVar(x) => {
                if seen.insert(*x) {
                    result.push(*x);
                }
            }
            Ty::Primitive(_) => {}
            Ty::Lambda { param, body } => {
                param.collect_type_vars(result, seen);
                body.collect_type_vars(result, seen);
            }
            Ty::List(elems) | Ty::Overload(elems) => {
                for elem in elems {
                    elem.collect_type_vars(result, seen);
                }
            }
            Ty::AttrSet(set) => {
                for v in set.fields.values() {
                    v.collect_type_vars(result, seen);
                }
            }
        }
    }
}

/// All elements are equal to each other. Vacuously true for empty and singleton lists.
pub fn is_homogeneous(elems: &[Ty]) -> bool {
    elems.windows(2).all(|w| w[0] == w[1])
}

#[macro_export]
macro_rules! ty {
    // -- Match on known primitives -----------------------------------------
    (Null) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::Null)
    };
    (Bool) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::Bool)
    };
    (Int) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::Int)
    };
    (Float) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::Float)
    };
    (String) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::String)
    };
    (Path) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::Path)
    };
    (Uri) => {
        $crate::Ty::Primitive($crate::PrimitiveTy::Uri)
    };
    // -- TyVar syntax: # N ---------------------------------------------------
    (# $n:expr) => {
        $crate::Ty::TyVar($crate::TypeVar($n))
    };

    (($($inner:tt)*)) => { $crate::ty!($($inner)*) };
    ([]) => { $crate::Ty::List(::std::vec::Vec::new()) };
    ([$($inner:tt)*]) => { $crate::Ty::List(vec![$crate::ty!($($inner)*)]) };

    ({ $($key:literal : $ty:tt,)* ... }) => {
        $crate::Ty::AttrSet($crate::AttrSetTy::from_internal(
            [
                $(($key, $crate::ty!($ty)),)*
            ],
            true,
        ))
    };

    ({ $($key:literal : $ty:tt),* $(,)? }) => {
        $crate::Ty::AttrSet($crate::AttrSetTy::from_internal(
            [
                $(($key, $crate::ty!($ty)),)*
            ],
            false,
        ))
    };

    ($arg:tt -> $($ret:tt)*) => {
        $crate::Ty::lambda($crate::ty!($arg), $crate::ty!($($ret)*))
    };
}

// ==============================================================================
// Display
// ==============================================================================
//
// Type variables are rendered as lowercase letters (a, b, c, ..., z, a1, b1, ...).
// `->` is right-associative and binds loosest, then `|` for overload sets.

/// Convert a type variable index to a letter-based name: 0→a, 1→b, ..., 25→z, 26→a1, ...
fn tyvar_name(idx: u32) -> String {
    let letter = (b'a' + (idx % 26) as u8) as char;
    let suffix = idx / 26;
    if suffix == 0 {
        letter.to_string()
    } else {
        format!("{letter}{suffix}")
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tyvar_name(self.0))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::TyVar(x) => write!(f, "{x}"),
            Ty::Primitive(p) => write!(f, "{p}"),
            Ty::List(elems) => {
                if is_homogeneous(elems) {
                    return match elems.first() {
                        Some(elem) => write!(f, "[{elem}]"),
                        None => write!(f, "[]"),
                    };
                }
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
            Ty::Lambda { param, body } => {
                let needs_parens = matches!(**param, Ty::Lambda { .. } | Ty::Overload(_));
                if needs_parens {
                    write!(f, "({param}) -> {body}")
                } else {
                    write!(f, "{param} -> {body}")
                }
            }
            Ty::AttrSet(set) => write!(f, "{set}"),
            Ty::Overload(alts) => {
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    if matches!(alt, Ty::Lambda { .. }) {
                        write!(f, "({alt})")?;
                    } else {
                        write!(f, "{alt}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
