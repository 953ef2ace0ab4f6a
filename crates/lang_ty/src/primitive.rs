use std::fmt;

use lang_ast::Literal;

use crate::Ty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTy {
    Null,
    Bool,
    Int,
    Float,
    String,
    Path,
    Uri,
}

impl PrimitiveTy {
    pub fn is_number(&self) -> bool {
        matches!(self, PrimitiveTy::Float | PrimitiveTy::Int)
    }
}

impl From<&Literal> for PrimitiveTy {
    fn from(value: &Literal) -> Self {
        match value {
            Literal::Float(_) => PrimitiveTy::Float,
            Literal::Integer(_) => PrimitiveTy::Int,
            Literal::String(_) => PrimitiveTy::String,
            Literal::Path(_) => PrimitiveTy::Path,
            Literal::Uri => PrimitiveTy::Uri,
        }
    }
}

impl From<&Literal> for Ty {
    fn from(value: &Literal) -> Self {
        Ty::Primitive(value.into())
    }
}

impl From<PrimitiveTy> for Ty {
    fn from(value: PrimitiveTy) -> Self {
        Ty::Primitive(value)
    }
}

impl fmt::Display for PrimitiveTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveTy::Null => write!(f, "null"),
            PrimitiveTy::Bool => write!(f, "bool"),
            PrimitiveTy::Int => write!(f, "int"),
            PrimitiveTy::Float => write!(f, "float"),
            PrimitiveTy::String => write!(f, "string"),
            PrimitiveTy::Path => write!(f, "path"),
            PrimitiveTy::Uri => write!(f, "uri"),
        }
    }
}
