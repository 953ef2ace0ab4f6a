use std::collections::BTreeMap;
use std::fmt;

use derive_more::Debug;
use smol_str::SmolStr;

use crate::Ty;

/// A record type. A closed set has exactly `fields`; an open one has at least
/// them and may carry more (row polymorphism without a row variable).
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[debug("AttrSet({fields:?}, open: {open})")]
pub struct AttrSetTy {
    pub fields: BTreeMap<SmolStr, Ty>,
    pub open: bool,
}

impl AttrSetTy {
    pub fn closed(fields: BTreeMap<SmolStr, Ty>) -> Self {
        Self {
            fields,
            open: false,
        }
    }

    pub fn open(fields: BTreeMap<SmolStr, Ty>) -> Self {
        Self { fields, open: true }
    }

    pub fn from_internal<'a>(iter: impl IntoIterator<Item = (&'a str, Ty)>, open: bool) -> Self {
        let fields = iter
            .into_iter()
            .map(|(name, ty)| (SmolStr::from(name), ty))
            .collect();
        Self { fields, open }
    }

    pub fn get(&self, key: &str) -> Option<&Ty> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.fields.keys()
    }

    /// Every field name of `other` is also a field name here. Field types are
    /// not compared.
    pub fn has_all_keys_of(&self, other: &AttrSetTy) -> bool {
        other.keys().all(|k| self.fields.contains_key(k))
    }
}

impl fmt::Display for AttrSetTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return if self.open {
                write!(f, "{{ ... }}")
            } else {
                write!(f, "{{ }}")
            };
        }

        write!(f, "{{ ")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        if self.open {
            write!(f, ", ...")?;
        }
        write!(f, " }}")
    }
}
