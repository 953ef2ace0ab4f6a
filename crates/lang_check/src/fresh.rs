use lang_ty::{Ty, TypeVar};

/// Hands out type variables for one inference run. Only ever counts up, so a
/// name is never reused even by a solver branch that later fails.
#[derive(Debug, Default)]
pub(crate) struct Fresh {
    next: u32,
}

impl Fresh {
    pub(crate) fn var(&mut self) -> TypeVar {
        let var = TypeVar(self.next);
        self.next += 1;
        var
    }

    pub(crate) fn ty(&mut self) -> Ty {
        Ty::TyVar(self.var())
    }

    pub(crate) fn issued(&self) -> u32 {
        self.next
    }
}
