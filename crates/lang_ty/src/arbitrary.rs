use proptest::{
    prelude::{Arbitrary, BoxedStrategy, Just, Strategy, any, prop, prop_oneof},
    prop_compose,
};
use smol_str::SmolStr;

use crate::{AttrSetTy, PrimitiveTy, Subst, Ty, TypeVar};

#[derive(Debug, Clone, Copy)]
pub struct RecursiveParams {
    pub depth: u32,
    pub desired_size: u32,
    pub expected_branch_size: u32,
    /// Type variables are drawn from `0..max_var`.
    pub max_var: u32,
}

impl Default for RecursiveParams {
    fn default() -> Self {
        Self {
            depth: 4,                // levels deep
            desired_size: 64,        // total nodes
            expected_branch_size: 3, // items per collection
            max_var: 6,
        }
    }
}

fn arb_ty(args: RecursiveParams) -> impl Strategy<Value = Ty> {
    let leaf = prop_oneof![
        any::<PrimitiveTy>().prop_map(Ty::Primitive),
        (0..args.max_var).prop_map(|v| Ty::TyVar(TypeVar(v))),
    ];

    leaf.prop_recursive(
        args.depth,
        args.desired_size,
        args.expected_branch_size,
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Ty::List),
                (inner.clone(), inner.clone()).prop_map(|(param, body)| Ty::lambda(param, body)),
                (
                    prop::collection::btree_map(arb_smol_str_ident(), inner.clone(), 0..4),
                    any::<bool>()
                )
                    .prop_map(|(fields, open)| Ty::AttrSet(AttrSetTy { fields, open }))
            ]
        },
    )
}

prop_compose! {
    // put a 10 char limit on identifiers, should be enough....
    pub fn arb_smol_str_ident()(string in "_pbt_([a-z]|[A-Z]|[0-9]|_){1,10}") -> SmolStr {
        string.into()
    }
}

impl Arbitrary for Ty {
    type Parameters = RecursiveParams;
    type Strategy = BoxedStrategy<Ty>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        arb_ty(args).boxed()
    }
}

/// A substitution over `0..max_var` whose range may mention any variable,
/// including ones it binds.
pub fn arb_subst(args: RecursiveParams) -> impl Strategy<Value = Subst> {
    prop::collection::btree_map((0..args.max_var).prop_map(TypeVar), arb_ty(args), 0..4)
        .prop_map(|map| map.into_iter().collect())
}

pub fn arb_prim() -> impl Strategy<Value = PrimitiveTy> {
    prop_oneof![
        Just(PrimitiveTy::Null),
        Just(PrimitiveTy::Bool),
        Just(PrimitiveTy::Int),
        Just(PrimitiveTy::Float),
        Just(PrimitiveTy::String),
        Just(PrimitiveTy::Path),
    ]
    .boxed()
}

impl Arbitrary for PrimitiveTy {
    type Parameters = ();
    type Strategy = BoxedStrategy<PrimitiveTy>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        arb_prim().boxed()
    }
}
