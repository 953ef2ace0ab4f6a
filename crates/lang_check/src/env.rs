use std::collections::BTreeMap;

use lang_ty::Scheme;
use smol_str::SmolStr;

/// The ambient typing environment: every name in scope at the top level with
/// its candidate schemes. A name with several schemes came out of an
/// overloaded inference and is instantiated against all of them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Env(BTreeMap<SmolStr, Vec<Scheme>>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing whatever it was bound to before.
    pub fn extend(&mut self, name: impl Into<SmolStr>, schemes: Vec<Scheme>) {
        self.0.insert(name.into(), schemes);
    }

    pub fn lookup(&self, name: &str) -> Option<&[Scheme]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<Scheme>> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &[Scheme])> {
        self.0.iter().map(|(name, schemes)| (name, schemes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of both environments. Names bound in `other` win.
    pub fn merge(mut self, other: Env) -> Env {
        self.0.extend(other.0);
        self
    }
}

impl FromIterator<(SmolStr, Vec<Scheme>)> for Env {
    fn from_iter<I: IntoIterator<Item = (SmolStr, Vec<Scheme>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use lang_ty::ty;

    use super::*;

    #[test]
    fn extend_replaces() {
        let mut env = Env::new();
        env.extend("x", vec![Scheme::mono(ty!(Int))]);
        env.extend("x", vec![Scheme::mono(ty!(String))]);
        assert_eq!(env.lookup("x"), Some(&[Scheme::mono(ty!(String))][..]));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn merge_prefers_the_right() {
        let left: Env = [
            ("a".into(), vec![Scheme::mono(ty!(Int))]),
            ("b".into(), vec![Scheme::mono(ty!(Int))]),
        ]
        .into_iter()
        .collect();
        let right: Env = [("b".into(), vec![Scheme::mono(ty!(Bool))])]
            .into_iter()
            .collect();

        let env = left.merge(right);
        assert_eq!(env.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(env.lookup("b"), Some(&[Scheme::mono(ty!(Bool))][..]));
    }

    #[test]
    fn remove_unbinds() {
        let mut env = Env::new();
        env.extend("x", vec![]);
        assert!(env.contains("x"));
        assert_eq!(env.remove("x"), Some(vec![]));
        assert!(env.is_empty());
    }
}
