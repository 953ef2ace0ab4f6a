use indoc::indoc;

use crate::{
    BinOp, BindingValue, Bindings, Expr, InterpolPart, Literal, Module, OverloadBinOp, UnaryOp,
    parse_module,
};

fn parse(src: &str) -> Module {
    let (module, _source_map) = parse_module(src).expect("source should parse");
    module
}

fn entry(module: &Module) -> &Expr {
    &module[module.entry_expr]
}

fn set_bindings(module: &Module, expr: &Expr) -> Bindings {
    match expr {
        Expr::AttrSet { bindings, .. } | Expr::LetIn { bindings, .. } => bindings.clone(),
        other => panic!("expected a binding group, got {other:?} in {module:?}"),
    }
}

fn names(bindings: &Bindings) -> Vec<&str> {
    bindings.names().map(|n| n.as_str()).collect()
}

#[test]
fn syntax_errors_are_rejected() {
    assert!(parse_module("let x = ; in").is_err());
}

#[test]
fn literals() {
    let module = parse("1");
    assert_eq!(entry(&module), &Expr::Literal(Literal::Integer(1)));

    let module = parse("\"hello\"");
    assert_eq!(entry(&module), &Expr::Literal(Literal::String("hello".into())));

    let module = parse("./foo/bar.nix");
    assert_eq!(
        entry(&module),
        &Expr::Literal(Literal::Path("./foo/bar.nix".into()))
    );

    let module = parse("https://nixos.org");
    assert_eq!(entry(&module), &Expr::Literal(Literal::Uri));
}

#[test]
fn parens_are_transparent() {
    let module = parse("((1))");
    assert_eq!(entry(&module), &Expr::Literal(Literal::Integer(1)));
}

#[test]
fn bindings_keep_source_order() {
    let module = parse(indoc! {"
        let
            zeta = 1;
            alpha = 2;
            mid = 3;
        in alpha
    "});
    let bindings = set_bindings(&module, entry(&module));
    assert_eq!(names(&bindings), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn nested_attrpaths_merge_into_one_set() {
    let module = parse(indoc! {"
        {
            a.b = 1;
            a.c = 2;
            a = { d = 3; };
        }
    "});
    let outer = set_bindings(&module, entry(&module));
    assert_eq!(names(&outer), vec!["a"]);

    let Some(BindingValue::Expr(inner)) = outer.get("a") else {
        panic!("a should be a plain binding");
    };
    let inner = set_bindings(&module, &module[inner]);
    assert_eq!(names(&inner), vec!["b", "c", "d"]);
}

#[test]
fn duplicate_bindings_keep_the_first() {
    let module = parse("{ x = 1; x = \"two\"; }");
    let bindings = set_bindings(&module, entry(&module));
    assert_eq!(names(&bindings), vec!["x"]);

    let Some(BindingValue::Expr(x)) = bindings.get("x") else {
        panic!("x should be bound");
    };
    assert_eq!(module[x], Expr::Literal(Literal::Integer(1)));
}

#[test]
fn inherits() {
    let module = parse("let src = { y = 1; }; in { inherit src; inherit (src) y; }");
    let Expr::LetIn { body, .. } = entry(&module) else {
        panic!("expected let");
    };
    let bindings = set_bindings(&module, &module[*body]);

    let Some(BindingValue::Inherit(src)) = bindings.get("src") else {
        panic!("src should be inherited");
    };
    assert_eq!(module[src], Expr::Reference("src".into()));
    assert_eq!(bindings.get("y"), Some(BindingValue::InheritFrom(0)));
    assert_eq!(bindings.inherit_froms.len(), 1);
}

#[test]
fn dynamic_keys() {
    let module = parse("{ ${\"a\" + \"b\"} = 1; \"c\" = 2; }");
    let bindings = set_bindings(&module, entry(&module));
    // a plain string key is static
    assert_eq!(names(&bindings), vec!["c"]);
    assert_eq!(bindings.dynamics.len(), 1);
}

#[test]
fn lambdas() {
    let module = parse("x: x");
    let Expr::Lambda { param, pat, .. } = entry(&module) else {
        panic!("expected lambda");
    };
    assert_eq!(param.as_deref(), Some("x"));
    assert!(pat.is_none());

    let module = parse("{ a, b ? 1, ... }@args: a");
    let Expr::Lambda { param, pat, .. } = entry(&module) else {
        panic!("expected lambda");
    };
    assert_eq!(param.as_deref(), Some("args"));
    let pat = pat.as_ref().expect("pattern lambda");
    assert!(pat.ellipsis);
    let fields: Vec<_> = pat
        .fields
        .iter()
        .map(|(name, default)| (name.as_str(), default.is_some()))
        .collect();
    assert_eq!(fields, vec![("a", false), ("b", true)]);
}

#[test]
fn operators() {
    let module = parse("1 + 2");
    assert!(matches!(
        entry(&module),
        Expr::BinOp {
            op: BinOp::Overload(OverloadBinOp::Add),
            ..
        }
    ));

    let module = parse("!true");
    assert!(matches!(
        entry(&module),
        Expr::UnaryOp {
            op: UnaryOp::Not,
            ..
        }
    ));

    let module = parse("[ 1 ] ++ [ 2 ]");
    let Expr::BinOp { op, .. } = entry(&module) else {
        panic!("expected binop");
    };
    assert_eq!(op.to_string(), "++");
}

#[test]
fn interpolations() {
    let module = parse("\"a${toString 1}b\"");
    let Expr::StringInterpolation(parts) = entry(&module) else {
        panic!("expected string interpolation, got {:?}", entry(&module));
    };
    assert!(matches!(parts[0], InterpolPart::Literal(ref s) if s == "a"));
    assert!(matches!(parts[1], InterpolPart::Interpol(_)));

    let module = parse("./foo/${name}.nix");
    let Expr::PathInterpolation(parts) = entry(&module) else {
        panic!("expected path interpolation, got {:?}", entry(&module));
    };
    assert!(parts.iter().any(|p| matches!(p, InterpolPart::Interpol(_))));
}

#[test]
fn top_level_bindings() {
    let module = parse("{ id = x: x; one = 1; }");
    let decls: Vec<_> = module
        .top_level_bindings()
        .expect("plain set")
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(decls, vec!["id", "one"]);

    assert!(parse("rec { a = 1; }").top_level_bindings().is_none());
    assert!(parse("x: x").top_level_bindings().is_none());
}

#[test]
fn source_map_covers_exprs() {
    let (module, source_map) = parse_module("let x = 1; in x").expect("parses");
    let range = source_map
        .range_for_expr(module.entry_expr)
        .expect("entry has a range");
    assert_eq!(u32::from(range.start()), 0);
}
