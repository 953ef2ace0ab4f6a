// ==============================================================================
// Operator Dispatch Table
// ==============================================================================
//
// Every operator is typed by equating its synthesized function type with a
// fixed signature. Operators valid at several types get an overload set, so
// the choice between them is made by the solver, not here.

use lang_ast::{BinOp, BoolBinOp, ExprBinOp, NormalBinOp, OverloadBinOp, UnaryOp};
use lang_ty::{PrimitiveTy, Ty, ty};

/// The signature of a binary operator as `lhs -> rhs -> result`, or `None`
/// for `==` and `!=`, which compare any two values.
pub fn bin_op_signature(op: BinOp) -> Option<Ty> {
    let sig = match op {
        BinOp::Overload(OverloadBinOp::Add) => Ty::overload(
            numeric_signatures()
                .into_iter()
                .chain([
                    ty!(String -> String -> String),
                    ty!(Path -> Path -> Path),
                    ty!(Path -> String -> Path),
                    ty!(String -> Path -> String),
                ]),
        ),
        BinOp::Overload(OverloadBinOp::Sub | OverloadBinOp::Mul | OverloadBinOp::Div) => {
            Ty::overload(numeric_signatures())
        }

        BinOp::Normal(NormalBinOp::Expr(
            ExprBinOp::Less | ExprBinOp::LessOrEq | ExprBinOp::More | ExprBinOp::MoreOrEq,
        )) => Ty::overload(
            comparison_signatures()
                .into_iter()
                .chain([ty!(String -> String -> Bool), ty!(Path -> Path -> Bool)]),
        ),
        BinOp::Normal(NormalBinOp::Expr(ExprBinOp::Equal | ExprBinOp::NotEqual)) => {
            return None;
        }

        BinOp::Normal(NormalBinOp::Bool(
            BoolBinOp::And | BoolBinOp::Or | BoolBinOp::Implication,
        )) => ty!(Bool -> Bool -> Bool),

        BinOp::Normal(NormalBinOp::ListConcat) => ty!([] -> [] -> []),
        BinOp::Normal(NormalBinOp::AttrUpdate) => ty!({ ... } -> { ... } -> { ... }),
    };
    Some(sig)
}

/// The signature of a unary operator as `operand -> result`.
pub fn unary_op_signature(op: UnaryOp) -> Ty {
    match op {
        UnaryOp::Not => ty!(Bool -> Bool),
        UnaryOp::Negate => Ty::overload([ty!(Int -> Int), ty!(Float -> Float)]),
    }
}

/// `int`/`float` in either position, `float` wins.
fn numeric_signatures() -> Vec<Ty> {
    numeric_pairs()
        .map(|(lhs, rhs)| {
            let ret = if lhs == PrimitiveTy::Float || rhs == PrimitiveTy::Float {
                PrimitiveTy::Float
            } else {
                PrimitiveTy::Int
            };
            Ty::lambda(lhs, Ty::lambda(rhs, ret))
        })
        .collect()
}

fn comparison_signatures() -> Vec<Ty> {
    numeric_pairs()
        .map(|(lhs, rhs)| Ty::lambda(lhs, Ty::lambda(rhs, PrimitiveTy::Bool)))
        .collect()
}

fn numeric_pairs() -> impl Iterator<Item = (PrimitiveTy, PrimitiveTy)> {
    const NUMS: [PrimitiveTy; 2] = [PrimitiveTy::Int, PrimitiveTy::Float];
    NUMS.into_iter()
        .flat_map(|lhs| NUMS.into_iter().map(move |rhs| (lhs, rhs)))
}
