use std::collections::BTreeSet;

use derive_more::Debug;
use lang_ty::Ty;
use smol_str::SmolStr;

/// Types observed for each free variable, one entry per occurrence. Resolution
/// is left to whichever binder (or the top-level env) captures the name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[debug("{_0:?}")]
pub struct Assumptions(Vec<(SmolStr, Ty)>);

impl Assumptions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(name: impl Into<SmolStr>, ty: Ty) -> Self {
        Self(vec![(name.into(), ty)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append `other`'s occurrences after ours.
    pub fn merge(mut self, other: Assumptions) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Drop every occurrence of `name`.
    pub fn remove(mut self, name: &str) -> Self {
        self.0.retain(|(n, _)| n != name);
        self
    }

    pub fn remove_all<'a>(self, names: impl IntoIterator<Item = &'a SmolStr>) -> Self {
        names
            .into_iter()
            .fold(self, |this, name| this.remove(name))
    }

    /// The types of every occurrence of `name`, in the order they were recorded.
    pub fn lookup<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Ty> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, ty)| ty)
    }

    /// Every distinct name with at least one occurrence, sorted.
    pub fn keys(&self) -> BTreeSet<SmolStr> {
        self.0.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Ty)> {
        self.0.iter().map(|(n, ty)| (n, ty))
    }
}
