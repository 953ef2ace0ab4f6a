use rnix::ast;
use smol_str::SmolStr;

pub fn flatten_paren(expr: ast::Expr) -> Option<ast::Expr> {
    let mut cur = Some(expr);
    while let Some(ast::Expr::Paren(p)) = cur {
        cur = p.expr();
    }
    cur
}

pub(crate) fn name_of_ident(ident: &ast::Ident) -> Option<SmolStr> {
    ident.ident_token().map(|i| i.text().into())
}

/// The contents of a string without interpolations, `None` if it has any.
pub(crate) fn get_str_literal(s: &ast::Str) -> Option<SmolStr> {
    if s.parts()
        .any(|p| matches!(p, ast::InterpolPart::Interpolation(_)))
    {
        return None;
    }

    let lit: String = s
        .normalized_parts()
        .into_iter()
        .filter_map(|part| match part {
            ast::InterpolPart::Literal(lit) => Some(lit),
            ast::InterpolPart::Interpolation(_) => None,
        })
        .collect();

    Some(lit.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Static(Option<SmolStr>),
    Dynamic(Option<ast::Expr>),
}

impl AttrKind {
    /// Classify the dynamic-ness of an `Attr`, by
    /// unwrapping nested parentheses and extracting string literals.
    pub fn of(attr: ast::Attr) -> Self {
        let s = match attr {
            ast::Attr::Ident(ident) => return Self::Static(name_of_ident(&ident)),
            ast::Attr::Str(s) => s,
            ast::Attr::Dynamic(d) => match d.expr().and_then(flatten_paren) {
                Some(ast::Expr::Str(s)) => s,
                e => return Self::Dynamic(e),
            },
        };

        match get_str_literal(&s) {
            Some(lit) => Self::Static(Some(lit)),
            None => Self::Dynamic(Some(ast::Expr::Str(s))),
        }
    }
}
