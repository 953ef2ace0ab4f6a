// ==============================================================================
// Judgment Rules
// ==============================================================================
//
// One rule per syntactic form. Each rule receives the judgments of the
// sub-expressions (already generated by the walker) and any fresh variables it
// needs, and builds the judgment of the whole form. Rules never look at scopes
// or the expression tree; that is the walker's job.

use std::collections::BTreeSet;

use lang_ast::{BinOp, UnaryOp};
use lang_ty::{AttrSetTy, PrimitiveTy, Ty, TypeVar};
use smol_str::SmolStr;

use crate::assumption::Assumptions;
use crate::constraints::Constraint;
use crate::operators::{bin_op_signature, unary_op_signature};

/// Free variable assumptions, constraints, and type of one sub-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub assumptions: Assumptions,
    pub constraints: Vec<Constraint>,
    pub ty: Ty,
}

impl Judgment {
    /// A judgment with nothing to resolve and nothing to solve.
    pub fn of_type(ty: impl Into<Ty>) -> Self {
        Self {
            assumptions: Assumptions::empty(),
            constraints: Vec::new(),
            ty: ty.into(),
        }
    }
}

/// Merge the assumptions and constraints of `parts`, in order.
fn combine(parts: impl IntoIterator<Item = Judgment>) -> (Assumptions, Vec<Constraint>) {
    let mut assumptions = Assumptions::empty();
    let mut constraints = Vec::new();
    for part in parts {
        assumptions = assumptions.merge(part.assumptions);
        constraints.extend(part.constraints);
    }
    (assumptions, constraints)
}

/// The parts merged, typed as `ty`.
pub fn merged(parts: impl IntoIterator<Item = Judgment>, ty: Ty) -> Judgment {
    let (assumptions, constraints) = combine(parts);
    Judgment {
        assumptions,
        constraints,
        ty,
    }
}

/// A free variable occurrence, typed `tv` until a binder claims it.
pub fn reference(name: SmolStr, tv: Ty) -> Judgment {
    Judgment {
        assumptions: Assumptions::singleton(name, tv.clone()),
        constraints: Vec::new(),
        ty: tv,
    }
}

pub fn apply(fun: Judgment, arg: Judgment, tv: Ty) -> Judgment {
    let call = Constraint::Eq(fun.ty.clone(), Ty::lambda(arg.ty.clone(), tv.clone()));
    let mut judgment = merged([fun, arg], tv);
    judgment.constraints.push(call);
    judgment
}

/// `x: body` where `x` was given the fresh type `param_ty`.
pub fn lambda(param: &str, param_ty: Ty, body: Judgment) -> Judgment {
    let Judgment {
        assumptions,
        mut constraints,
        ty,
    } = body;

    constraints.extend(
        assumptions
            .lookup(param)
            .map(|occurrence| Constraint::Eq(occurrence.clone(), param_ty.clone())),
    );

    Judgment {
        assumptions: assumptions.remove(param),
        constraints,
        ty: Ty::lambda(param_ty, ty),
    }
}

/// One field of a destructuring pattern.
pub struct PatField {
    pub name: SmolStr,
    pub var: TypeVar,
    pub default: Option<Judgment>,
}

/// `{ a, b ? d, ... } @ alias: body`
pub fn pattern_lambda(
    fields: Vec<PatField>,
    alias: Option<&SmolStr>,
    open: bool,
    body: Judgment,
) -> Judgment {
    let record = Ty::AttrSet(AttrSetTy::from_internal(
        fields
            .iter()
            .map(|field| (field.name.as_str(), Ty::TyVar(field.var))),
        open,
    ));

    let Judgment {
        mut assumptions,
        mut constraints,
        ty,
    } = body;

    let mut names = Vec::with_capacity(fields.len() + 1);
    for field in fields {
        if let Some(default) = field.default {
            constraints.push(Constraint::Eq(default.ty, Ty::TyVar(field.var)));
            assumptions = assumptions.merge(default.assumptions);
            constraints.extend(default.constraints);
        }
        names.push((field.name, Ty::TyVar(field.var)));
    }
    if let Some(alias) = alias {
        names.push((alias.clone(), record.clone()));
    }

    for (name, bound) in &names {
        constraints.extend(
            assumptions
                .lookup(name)
                .map(|occurrence| Constraint::Eq(occurrence.clone(), bound.clone())),
        );
    }

    Judgment {
        assumptions: assumptions.remove_all(names.iter().map(|(name, _)| name)),
        constraints,
        ty: Ty::lambda(record, ty),
    }
}

pub fn if_then_else(cond: Judgment, then_body: Judgment, else_body: Judgment) -> Judgment {
    let checks = [
        Constraint::Eq(cond.ty.clone(), PrimitiveTy::Bool.into()),
        Constraint::Eq(then_body.ty.clone(), else_body.ty.clone()),
    ];
    let ty = then_body.ty.clone();
    let mut judgment = merged([cond, then_body, else_body], ty);
    judgment.constraints.extend(checks);
    judgment
}

pub fn assert(cond: Judgment, body: Judgment) -> Judgment {
    let check = Constraint::Eq(cond.ty.clone(), PrimitiveTy::Bool.into());
    let ty = body.ty.clone();
    let mut judgment = merged([cond, body], ty);
    judgment.constraints.push(check);
    judgment
}

pub fn unary_op(op: UnaryOp, operand: Judgment, tv: Ty) -> Judgment {
    let sig = Constraint::Eq(Ty::lambda(operand.ty.clone(), tv.clone()), unary_op_signature(op));
    let mut judgment = merged([operand], tv);
    judgment.constraints.push(sig);
    judgment
}

/// `tv` is the result type, unused by operators that compare any two values.
pub fn bin_op(op: BinOp, lhs: Judgment, rhs: Judgment, tv: Ty) -> Judgment {
    let Some(sig) = bin_op_signature(op) else {
        return merged([lhs, rhs], PrimitiveTy::Bool.into());
    };
    let call = Ty::lambda(lhs.ty.clone(), Ty::lambda(rhs.ty.clone(), tv.clone()));
    let mut judgment = merged([lhs, rhs], tv);
    judgment.constraints.push(Constraint::Eq(call, sig));
    judgment
}

/// Element types are kept as they are, no homogeneity is forced.
pub fn list(elems: Vec<Judgment>) -> Judgment {
    let tys = elems.iter().map(|elem| elem.ty.clone()).collect();
    merged(elems, Ty::List(tys))
}

/// A record of the static `fields`. `extra` holds judgments that belong to the
/// set without naming a field (dynamic keys, `inherit (e)` sources).
pub fn attrset(fields: Vec<(SmolStr, Judgment)>, extra: Vec<Judgment>, open: bool) -> Judgment {
    let record = AttrSetTy {
        fields: fields
            .iter()
            .map(|(name, value)| (name.clone(), value.ty.clone()))
            .collect(),
        open,
    };
    merged(
        fields.into_iter().map(|(_, value)| value).chain(extra),
        Ty::AttrSet(record),
    )
}

/// `let bound in body`. `group` carries the full judgments of the binding
/// group. Every body occurrence of a bound name becomes an instance of that
/// binding's type generalized outside `mono`.
pub fn let_in(
    bound: Vec<(SmolStr, Ty)>,
    group: Vec<Judgment>,
    body: Judgment,
    mono: &BTreeSet<TypeVar>,
) -> Judgment {
    let Judgment {
        assumptions: body_assumptions,
        constraints: body_constraints,
        ty,
    } = body;

    let mut instances = Vec::new();
    for (name, binding_ty) in &bound {
        instances.extend(body_assumptions.lookup(name).map(|occurrence| {
            Constraint::ImpInst(occurrence.clone(), mono.clone(), binding_ty.clone())
        }));
    }
    let body_assumptions = body_assumptions.remove_all(bound.iter().map(|(name, _)| name));

    let (group_assumptions, mut constraints) = combine(group);
    constraints.extend(body_constraints);
    constraints.extend(instances);

    Judgment {
        assumptions: group_assumptions.merge(body_assumptions),
        constraints,
        ty,
    }
}

#[cfg(test)]
mod tests {
    use lang_ast::{ExprBinOp, OverloadBinOp};
    use lang_ty::ty;

    use super::*;

    fn var(n: u32) -> Ty {
        Ty::TyVar(TypeVar(n))
    }

    #[test]
    fn lambda_ties_every_occurrence() {
        let body = merged(
            [reference("x".into(), var(1)), reference("x".into(), var(2))],
            var(1),
        );
        let judgment = lambda("x", var(0), body);

        assert!(judgment.assumptions.is_empty());
        assert_eq!(
            judgment.constraints,
            vec![
                Constraint::Eq(var(1), var(0)),
                Constraint::Eq(var(2), var(0)),
            ]
        );
        assert_eq!(judgment.ty, ty!((# 0) -> (# 1)));
    }

    #[test]
    fn lambda_keeps_other_names() {
        let body = apply(
            reference("f".into(), var(1)),
            reference("x".into(), var(2)),
            var(3),
        );
        let judgment = lambda("x", var(0), body);
        assert_eq!(judgment.assumptions.keys().into_iter().collect::<Vec<_>>(), ["f"]);
    }

    #[test]
    fn pattern_lambda_builds_record() {
        let fields = vec![
            PatField {
                name: "a".into(),
                var: TypeVar(0),
                default: None,
            },
            PatField {
                name: "b".into(),
                var: TypeVar(1),
                default: Some(Judgment::of_type(PrimitiveTy::Int)),
            },
        ];
        let alias: SmolStr = "args".into();
        let body = merged(
            [
                reference("a".into(), var(2)),
                reference("args".into(), var(3)),
            ],
            var(2),
        );
        let judgment = pattern_lambda(fields, Some(&alias), true, body);

        assert!(judgment.assumptions.is_empty());
        let record = ty!({ "a": (# 0), "b": (# 1), ... });
        assert_eq!(judgment.ty, Ty::lambda(record.clone(), var(2)));
        assert!(judgment
            .constraints
            .contains(&Constraint::Eq(ty!(Int), var(1))));
        assert!(judgment.constraints.contains(&Constraint::Eq(var(2), var(0))));
        assert!(judgment.constraints.contains(&Constraint::Eq(var(3), record)));
    }

    #[test]
    fn equality_needs_no_constraint() {
        let judgment = bin_op(
            ExprBinOp::Equal.into(),
            Judgment::of_type(PrimitiveTy::Int),
            Judgment::of_type(PrimitiveTy::String),
            var(0),
        );
        assert!(judgment.constraints.is_empty());
        assert_eq!(judgment.ty, ty!(Bool));
    }

    #[test]
    fn arithmetic_is_one_overloaded_constraint() {
        let judgment = bin_op(
            OverloadBinOp::Mul.into(),
            Judgment::of_type(PrimitiveTy::Int),
            Judgment::of_type(PrimitiveTy::Float),
            var(0),
        );
        assert_eq!(judgment.ty, var(0));
        let [Constraint::Eq(call, Ty::Overload(_))] = &judgment.constraints[..] else {
            panic!("unexpected constraints {:?}", judgment.constraints);
        };
        assert_eq!(*call, ty!(Int -> Float -> (# 0)));
    }

    #[test]
    fn let_instantiates_body_occurrences() {
        let mono = BTreeSet::from([TypeVar(9)]);
        let group = vec![Judgment {
            assumptions: Assumptions::singleton("outer", var(5)),
            constraints: vec![Constraint::Eq(var(5), var(0))],
            ty: var(0),
        }];
        let body = merged(
            [reference("id".into(), var(1)), reference("id".into(), var(2))],
            var(1),
        );
        let judgment = let_in(vec![("id".into(), var(0))], group, body, &mono);

        assert_eq!(judgment.assumptions.keys().into_iter().collect::<Vec<_>>(), ["outer"]);
        assert_eq!(
            judgment.constraints,
            vec![
                Constraint::Eq(var(5), var(0)),
                Constraint::ImpInst(var(1), mono.clone(), var(0)),
                Constraint::ImpInst(var(2), mono, var(0)),
            ]
        );
    }

    #[test]
    fn attrset_types_static_fields() {
        let judgment = attrset(
            vec![
                ("x".into(), Judgment::of_type(PrimitiveTy::Int)),
                ("y".into(), reference("y".into(), var(0))),
            ],
            vec![],
            false,
        );
        assert_eq!(judgment.ty, ty!({ "x": Int, "y": (# 0) }));
        assert_eq!(judgment.assumptions.len(), 1);
    }
}
