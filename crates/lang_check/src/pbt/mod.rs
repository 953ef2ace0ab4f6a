// ==============================================================================
// Property-Based Tests for Type Inference
// ==============================================================================
//
// Generates nix source texts whose type is known up front and checks that
// inference agrees, plus a few algebraic properties of the unifier over
// arbitrary types.
//
// Path literals are left out of the generated texts: `./x + ./y` and friends
// resolve through several overload alternatives, which would make the
// expected result depend on the operator table.

use std::collections::HashSet;

use lang_ast::{BinOp, BoolBinOp, ExprBinOp, OverloadBinOp};
use lang_ty::arbitrary::{arb_smol_str_ident, RecursiveParams};
use lang_ty::{FreeTypeVars, PrimitiveTy, Substitutable, Ty, TypeVar};
use proptest::prelude::{
    any, any_with, prop, prop_assert, prop_assert_eq, prop_compose, prop_oneof, proptest,
    BoxedStrategy, Just, ProptestConfig, Strategy,
};

use crate::tests::{display, infer_str, solve_str};
use crate::{unify, TypeError};

type NixTextStr = String;

fn arb_bool_str() -> impl Strategy<Value = NixTextStr> {
    let leaf = any::<bool>().prop_map(|b| b.to_string());

    leaf.prop_recursive(3, 5, 2, |inner| {
        (
            inner.clone(),
            inner.clone(),
            any::<BoolBinOp>().prop_map(|op| BinOp::from(op).to_string()),
        )
            .prop_map(|(l, r, op)| format!("({l}) {op} ({r})"))
    })
}

fn arb_int_str() -> impl Strategy<Value = NixTextStr> {
    let leaf = any::<i32>().prop_map(|i| i.to_string());

    leaf.prop_recursive(3, 5, 2, |inner| {
        (
            inner.clone(),
            inner.clone(),
            any::<OverloadBinOp>().prop_map(|op| BinOp::from(op).to_string()),
        )
            .prop_map(|(l, r, op)| format!("({l}) {op} ({r})"))
    })
}

prop_compose! {
    fn arb_simple_float()(f in -1.0..2.0) -> f64 {
        f
    }
}

fn arb_float_str() -> impl Strategy<Value = NixTextStr> {
    let leaf = arb_simple_float().prop_map(|f| format!("{f:.4}"));

    leaf.prop_recursive(3, 5, 2, |inner| {
        let float_or_int = prop_oneof![inner.clone(), arb_int_str()];

        // at least one float on either side keeps the result a float
        let args = (inner, float_or_int)
            .prop_map(|(float, f_or_int)| vec![float, f_or_int])
            .prop_shuffle();

        (
            args,
            any::<OverloadBinOp>().prop_map(|op| BinOp::from(op).to_string()),
        )
            .prop_map(|(args, op)| format!("({}) {op} ({})", args[0], args[1]))
    })
}

fn arb_str_value() -> impl Strategy<Value = NixTextStr> {
    arb_smol_str_ident().prop_map(|s| format!("''{s}''"))
}

fn prim_text(prim: PrimitiveTy) -> BoxedStrategy<NixTextStr> {
    match prim {
        PrimitiveTy::Bool => arb_bool_str().boxed(),
        PrimitiveTy::Int => arb_int_str().boxed(),
        PrimitiveTy::Float => arb_float_str().boxed(),
        PrimitiveTy::String => arb_str_value().boxed(),
        _ => Just("null".to_string()).boxed(),
    }
}

fn arb_text_prim() -> impl Strategy<Value = PrimitiveTy> {
    prop_oneof![
        Just(PrimitiveTy::Null),
        Just(PrimitiveTy::Bool),
        Just(PrimitiveTy::Int),
        Just(PrimitiveTy::Float),
        Just(PrimitiveTy::String),
    ]
}

fn wrap_in_let(val: NixTextStr) -> impl Strategy<Value = NixTextStr> {
    arb_smol_str_ident().prop_flat_map(move |ident| {
        prop_oneof![
            Just(format!("(let {ident} = ({val}); in {ident})")),
            Just(format!("(let {ident} = a: a; in {ident} ({val}))")),
        ]
    })
}

fn wrap_in_attr(val: NixTextStr) -> impl Strategy<Value = NixTextStr> {
    let key_val_gen = (arb_smol_str_ident(), arb_text_prim().prop_flat_map(prim_text));

    let extra_fields = prop::collection::vec(key_val_gen, 0..5);
    let desired_ident = arb_smol_str_ident();

    (extra_fields, desired_ident).prop_filter_map(
        "Generated duplicate ident",
        move |(mut extra_fields, ident)| {
            extra_fields.push((ident.clone(), val.clone()));

            let all_ident: HashSet<_> = extra_fields.iter().map(|x| x.0.clone()).collect();
            if all_ident.len() != extra_fields.len() {
                return None;
            }

            let inner = extra_fields
                .iter()
                .map(|(key, val)| format!("{key}=({val});"))
                .collect::<Vec<_>>()
                .join(" ");

            Some(format!("(({{{inner}}}).{ident})"))
        },
    )
}

fn wrap_in_with(val: NixTextStr) -> impl Strategy<Value = NixTextStr> {
    arb_smol_str_ident()
        .prop_map(move |ident| format!("(with {{ {ident} = ({val}); }}; {ident})"))
}

/// Rewrites that keep the type of `text`.
fn non_type_modifying_transform(text: NixTextStr) -> impl Strategy<Value = NixTextStr> {
    prop_oneof![
        Just(text.clone()),
        wrap_in_let(text.clone()),
        wrap_in_attr(text.clone()),
        wrap_in_with(text),
    ]
}

fn arb_primitive() -> impl Strategy<Value = (PrimitiveTy, NixTextStr)> {
    arb_text_prim().prop_flat_map(|prim| {
        prim_text(prim)
            .prop_flat_map(non_type_modifying_transform)
            .prop_map(move |text| (prim, text))
    })
}

/// A list of values of one type, possibly empty.
fn arb_homogeneous_list() -> impl Strategy<Value = (PrimitiveTy, usize, NixTextStr)> {
    arb_text_prim().prop_flat_map(|prim| {
        prop::collection::vec(prim_text(prim), 0..4).prop_map(move |elems| {
            let len = elems.len();
            let text = elems
                .iter()
                .map(|elem| format!("({elem})"))
                .collect::<Vec<_>>()
                .join(" ");
            (prim, len, format!("[ {text} ]"))
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256, .. ProptestConfig::default()
    })]

    #[test]
    fn test_primitive_typing((prim, text) in arb_primitive()) {
        let schemes = infer_str(&text).unwrap();
        prop_assert_eq!(display(&schemes), vec![prim.to_string()]);
    }

    #[test]
    fn test_comparisons_are_bool(
        lhs in arb_int_str(),
        rhs in arb_int_str(),
        op in any::<ExprBinOp>(),
    ) {
        let text = format!("({lhs}) {} ({rhs})", BinOp::from(op));
        let schemes = infer_str(&text).unwrap();
        prop_assert_eq!(display(&schemes), vec!["bool".to_string()]);
    }

    #[test]
    fn test_constant_function((prim, text) in arb_primitive()) {
        let schemes = infer_str(&format!("x: {text}")).unwrap();
        prop_assert_eq!(display(&schemes), vec![format!("forall a. a -> {prim}")]);
    }

    #[test]
    fn test_list_typing((prim, len, text) in arb_homogeneous_list()) {
        let schemes = infer_str(&text).unwrap();
        let expected = if len == 0 { "[]".to_string() } else { format!("[{prim}]") };
        prop_assert_eq!(display(&schemes), vec![expected]);
    }

    #[test]
    fn test_solutions_are_idempotent((_prim, text) in arb_primitive(), other in arb_ty()) {
        let src = format!("f: g: {{ a = f ({text}); b = g ({text}); c = x: g x; }}");
        let (ty, substs) = solve_str(&src);
        prop_assert!(!substs.is_empty());
        for subst in &substs {
            for term in [&ty, &other] {
                let once = term.apply(subst);
                prop_assert_eq!(once.apply(subst), once);
            }
        }
    }

    #[test]
    fn test_results_are_closed((_prim, text) in arb_primitive()) {
        let wrapped = format!("f: g: {{ a = f ({text}); b = g; }}");
        for scheme in infer_str(&wrapped).unwrap() {
            prop_assert!(scheme.free_type_vars().is_empty());
            prop_assert_eq!(&scheme, &scheme.normalize());
        }
    }
}

// ==============================================================================
// Unifier
// ==============================================================================

/// A variable no generated type mentions.
const OUTSIDE: TypeVar = TypeVar(1000);

fn arb_ty() -> impl Strategy<Value = Ty> {
    any_with::<Ty>(RecursiveParams::default())
}

proptest! {
    #[test]
    fn test_unify_reflexive(ty in arb_ty()) {
        let mut log = Vec::new();
        prop_assert_eq!(unify(&ty, &ty, &mut log).len(), 1);
        prop_assert!(log.is_empty());
    }

    #[test]
    fn test_binding_a_variable_equates(ty in arb_ty()) {
        let var = Ty::TyVar(OUTSIDE);
        let mut log = Vec::new();
        let substs = unify(&var, &ty, &mut log);
        prop_assert_eq!(substs.len(), 1);
        prop_assert_eq!(var.apply(&substs[0]), ty.apply(&substs[0]));
    }

    #[test]
    fn test_occurs_check(ty in arb_ty()) {
        let var = Ty::TyVar(OUTSIDE);
        let cyclic = Ty::lambda(ty, var.clone());
        let mut log = Vec::new();
        prop_assert!(unify(&var, &cyclic, &mut log).is_empty());
        prop_assert!(matches!(log.as_slice(), [TypeError::InfiniteType(v, _)] if *v == OUTSIDE));
    }
}
