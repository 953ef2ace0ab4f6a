use la_arena::Arena;
use rnix::ast::{self, HasEntry};
use rowan::{TextRange, ast::AstNode};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::{
    Attrpath, BindingValue, Bindings, Expr, ExprId, InterpolPart, Literal, Module,
    ModuleSourceMap, Pat,
    ast_utils::{AttrKind, get_str_literal, name_of_ident},
};

struct LowerCtx {
    exprs: Arena<Expr>,
    source_map: ModuleSourceMap,
}

/// Lower a parsed rnix tree into the expression arena. Never fails: anything
/// that can't be represented becomes `Expr::Missing` and is logged.
pub fn lower(root: rnix::Root) -> (Module, ModuleSourceMap) {
    let mut ctx = LowerCtx {
        exprs: Arena::new(),
        source_map: ModuleSourceMap::default(),
    };

    let entry = ctx.lower_expr_opt(root.expr());
    let module = Module {
        exprs: ctx.exprs,
        entry_expr: entry,
    };
    let mut source_map = ctx.source_map;
    source_map.shrink_to_fit();
    (module, source_map)
}

impl LowerCtx {
    fn alloc_expr(&mut self, expr: Expr, range: TextRange) -> ExprId {
        let id = self.exprs.alloc(expr);
        self.source_map.insert_expr(id, range);
        id
    }

    fn lower_expr_opt(&mut self, expr: Option<ast::Expr>) -> ExprId {
        if let Some(expr) = expr {
            return self.lower_expr(expr);
        }
        // Synthetic syntax has no corresponding text.
        self.exprs.alloc(Expr::Missing)
    }

    fn lower_expr(&mut self, rnix_expr: ast::Expr) -> ExprId {
        let range = rnix_expr.syntax().text_range();

        let expr: Expr = match &rnix_expr {
            ast::Expr::Apply(apply) => {
                let fun = self.lower_expr_opt(apply.lambda());
                let arg = self.lower_expr_opt(apply.argument());
                Expr::Apply { fun, arg }
            }
            ast::Expr::IfElse(if_else) => {
                let cond = self.lower_expr_opt(if_else.condition());
                let then_body = self.lower_expr_opt(if_else.body());
                let else_body = self.lower_expr_opt(if_else.else_body());

                Expr::IfThenElse {
                    cond,
                    then_body,
                    else_body,
                }
            }
            ast::Expr::Select(select) => {
                let set = self.lower_expr_opt(select.expr());
                let attrpath = self.lower_attrpath_opt(select.attrpath());
                let default_expr = select.default_expr().map(|e| self.lower_expr(e));

                Expr::Select {
                    set,
                    attrpath,
                    default_expr,
                }
            }
            ast::Expr::With(with) => {
                let env = self.lower_expr_opt(with.namespace());
                let body = self.lower_expr_opt(with.body());
                Expr::With { env, body }
            }
            ast::Expr::HasAttr(has_attr) => {
                let set = self.lower_expr_opt(has_attr.expr());
                let attrpath = self.lower_attrpath_opt(has_attr.attrpath());

                Expr::HasAttr { set, attrpath }
            }
            ast::Expr::Str(s) => return self.lower_string(s),
            ast::Expr::Path(path) => self.lower_path(path),
            ast::Expr::Literal(literal) => match literal.kind() {
                ast::LiteralKind::Float(float) => match float.value() {
                    Ok(val) => Expr::Literal(Literal::Float(ordered_float::OrderedFloat(val))),
                    Err(err) => {
                        log::warn!("invalid float literal {literal}: {err}");
                        Expr::Missing
                    }
                },
                ast::LiteralKind::Integer(integer) => match integer.value() {
                    Ok(val) => Expr::Literal(Literal::Integer(val)),
                    Err(err) => {
                        log::warn!("invalid integer literal {literal}: {err}");
                        Expr::Missing
                    }
                },
                ast::LiteralKind::Uri(_uri) => Expr::Literal(Literal::Uri),
            },
            ast::Expr::Lambda(lambda) => return self.lower_lambda(lambda, range),
            ast::Expr::LetIn(let_in) => {
                let bindings = MergingSet::desugar(self, let_in, false).finish(self);
                let body = self.lower_expr_opt(let_in.body());
                Expr::LetIn { bindings, body }
            }
            ast::Expr::List(list) => {
                let elems = list.items().map(|elem| self.lower_expr(elem));

                Expr::List(elems.collect())
            }
            ast::Expr::BinOp(bin_op) => {
                let lhs = self.lower_expr_opt(bin_op.lhs());
                let rhs = self.lower_expr_opt(bin_op.rhs());

                match bin_op.operator() {
                    Some(op) => Expr::BinOp {
                        lhs,
                        rhs,
                        op: op.into(),
                    },
                    None => {
                        log::warn!("binary operator without an operator token: {bin_op}");
                        Expr::Missing
                    }
                }
            }
            ast::Expr::Paren(paren) => return self.lower_expr_opt(paren.expr()),
            ast::Expr::AttrSet(attr_set) => {
                let is_rec = attr_set.rec_token().is_some();
                let bindings = MergingSet::desugar(self, attr_set, is_rec).finish(self);

                Expr::AttrSet { is_rec, bindings }
            }
            ast::Expr::UnaryOp(unary_op) => {
                let expr = self.lower_expr_opt(unary_op.expr());

                match unary_op.operator() {
                    Some(op) => Expr::UnaryOp {
                        op: op.into(),
                        expr,
                    },
                    None => {
                        log::warn!("unary operator without an operator token: {unary_op}");
                        Expr::Missing
                    }
                }
            }
            ast::Expr::Ident(ident) => match name_of_ident(ident) {
                Some(name) => Expr::Reference(name),
                None => Expr::Missing,
            },
            ast::Expr::Assert(assert) => {
                let cond = self.lower_expr_opt(assert.condition());
                let body = self.lower_expr_opt(assert.body());

                Expr::Assert { cond, body }
            }
            ast::Expr::Error(_error) => Expr::Missing,
            ast::Expr::Root(root) => {
                return self.lower_expr_opt(root.expr());
            }
            ast::Expr::LegacyLet(legacy_let) => {
                log::warn!("legacy `let {{ }}` is not supported: {legacy_let}");
                Expr::Missing
            }
        };

        self.alloc_expr(expr, range)
    }

    fn lower_attrpath_opt(&mut self, attrpath: Option<ast::Attrpath>) -> Attrpath {
        attrpath
            .into_iter()
            .flat_map(|attrpath| attrpath.attrs())
            .map(|attr| self.lower_attr(attr))
            .collect()
    }

    fn lower_attr(&mut self, attr: ast::Attr) -> ExprId {
        match attr {
            ast::Attr::Dynamic(d) => self.lower_expr_opt(d.expr()),
            ast::Attr::Ident(ident) => {
                let range = ident.syntax().text_range();
                let expr = match name_of_ident(&ident) {
                    Some(name) => Expr::Literal(Literal::String(name)),
                    None => Expr::Missing,
                };
                self.alloc_expr(expr, range)
            }
            ast::Attr::Str(s) => self.lower_string(&s),
        }
    }

    fn lower_string(&mut self, s: &ast::Str) -> ExprId {
        let range = s.syntax().text_range();

        let expr = if let Some(lit) = get_str_literal(s) {
            Expr::Literal(Literal::String(lit))
        } else {
            let parts = s
                .normalized_parts()
                .into_iter()
                .map(|p| match p {
                    ast::InterpolPart::Literal(lit) => InterpolPart::Literal(lit.into()),
                    ast::InterpolPart::Interpolation(interpol) => {
                        InterpolPart::Interpol(self.lower_expr_opt(interpol.expr()))
                    }
                })
                .collect();
            Expr::StringInterpolation(parts)
        };
        self.alloc_expr(expr, range)
    }

    fn lower_path(&mut self, path: &ast::Path) -> Expr {
        let has_interpol = path
            .syntax()
            .children()
            .any(|node| ast::Interpol::can_cast(node.kind()));

        if !has_interpol {
            return Expr::Literal(Literal::Path(path.syntax().text().to_string().into()));
        }

        let parts = path
            .syntax()
            .children_with_tokens()
            .filter_map(|elem| match elem {
                rowan::NodeOrToken::Token(tok) => {
                    Some(InterpolPart::Literal(SmolStr::from(tok.text())))
                }
                rowan::NodeOrToken::Node(node) => ast::Interpol::cast(node)
                    .map(|interpol| InterpolPart::Interpol(self.lower_expr_opt(interpol.expr()))),
            })
            .collect();
        Expr::PathInterpolation(parts)
    }

    fn lower_lambda(&mut self, lam: &ast::Lambda, range: TextRange) -> ExprId {
        let (param, pat) = lam.param().map_or((None, None), |param| match param {
            ast::Param::IdentParam(ident_param) => {
                let param = ident_param.ident().and_then(|i| name_of_ident(&i));
                (param, None)
            }
            ast::Param::Pattern(pattern) => {
                let param = pattern
                    .pat_bind()
                    .and_then(|ident_param| ident_param.ident())
                    .and_then(|i| name_of_ident(&i));

                let fields = pattern
                    .pat_entries()
                    .filter_map(|entry| {
                        let Some(name) = entry.ident().and_then(|i| name_of_ident(&i)) else {
                            log::warn!("pattern entry without a name: {entry}");
                            return None;
                        };
                        let default_expr = entry.default().map(|e| self.lower_expr(e));

                        Some((name, default_expr))
                    })
                    .collect();

                let pat = Pat {
                    fields,
                    ellipsis: pattern.ellipsis_token().is_some(),
                };

                (param, Some(pat))
            }
        });
        let body = self.lower_expr_opt(lam.body());

        if param.is_none() && pat.is_none() {
            log::warn!("lambda without a parameter at {range:?}");
            return self.alloc_expr(Expr::Missing, range);
        }
        self.alloc_expr(Expr::Lambda { param, pat, body }, range)
    }
}

/// Collects the entries of a binding group, folding `a.b = 1; a.c = 2;` into
/// nested sets.
#[derive(Debug)]
struct MergingSet {
    range: Option<TextRange>,
    is_rec: bool,
    statics: Vec<(SmolStr, MergingEntry)>,
    static_idx: FxHashMap<SmolStr, usize>,
    inherit_froms: Vec<ExprId>,
    dynamics: Vec<(ExprId, ExprId)>,
}

#[derive(Debug)]
struct MergingEntry {
    /// The RHS if it is an implicit or explicit set.
    set: Option<MergingSet>,
    /// The RHS if it is not merge-able.
    value: Option<BindingValue>,
}

impl MergingSet {
    fn new(range: Option<TextRange>, is_rec: bool) -> Self {
        Self {
            range,
            is_rec,
            statics: Vec::new(),
            static_idx: FxHashMap::default(),
            inherit_froms: Vec::new(),
            dynamics: Vec::new(),
        }
    }

    fn desugar(ctx: &mut LowerCtx, node: &impl HasEntry, is_rec: bool) -> Self {
        let mut this = Self::new(Some(node.syntax().text_range()), is_rec);
        this.merge_bindings(ctx, node);
        this
    }

    fn merge_bindings(&mut self, ctx: &mut LowerCtx, node: &impl HasEntry) {
        for entry in node.entries() {
            match entry {
                ast::Entry::AttrpathValue(apv) => {
                    let attrs: Vec<ast::Attr> = apv
                        .attrpath()
                        .into_iter()
                        .flat_map(|path| path.attrs())
                        .collect();
                    self.merge_attrpath(ctx, &attrs, apv.value());
                }
                ast::Entry::Inherit(inherit) => self.merge_inherit(ctx, inherit),
            }
        }
    }

    fn merge_attrpath(&mut self, ctx: &mut LowerCtx, attrs: &[ast::Attr], value: Option<ast::Expr>) {
        let Some((attr, rest)) = attrs.split_first() else {
            log::warn!("binding without a name");
            let key = ctx.lower_expr_opt(None);
            let value = ctx.lower_expr_opt(value);
            self.dynamics.push((key, value));
            return;
        };

        let range = attr.syntax().text_range();
        match AttrKind::of(attr.clone()) {
            AttrKind::Static(key) => {
                let key = key.unwrap_or_default();
                if rest.is_empty() {
                    self.merge_static_expr(ctx, key, range, value);
                } else if let Some(set) = self.entry_set(key, range) {
                    set.merge_attrpath(ctx, rest, value);
                }
            }
            AttrKind::Dynamic(key_expr) => {
                let key = ctx.lower_expr_opt(key_expr);
                let value = if rest.is_empty() {
                    ctx.lower_expr_opt(value)
                } else {
                    let mut set = MergingSet::new(None, false);
                    set.merge_attrpath(ctx, rest, value);
                    set.finish_expr(ctx)
                };
                self.dynamics.push((key, value));
            }
        }
    }

    /// The nested set stored under `key`, creating it if the key is new.
    fn entry_set(&mut self, key: SmolStr, range: TextRange) -> Option<&mut MergingSet> {
        let idx = match self.static_idx.get(&key) {
            Some(&idx) => idx,
            None => self.push_entry(
                key,
                MergingEntry {
                    set: Some(MergingSet::new(None, false)),
                    value: None,
                },
            ),
        };

        let (key, entry) = &mut self.statics[idx];
        if entry.value.is_some() {
            log::warn!("duplicate binding `{key}` at {range:?}, keeping the first");
            return None;
        }
        entry.set.as_mut()
    }

    fn merge_static_expr(
        &mut self,
        ctx: &mut LowerCtx,
        key: SmolStr,
        range: TextRange,
        value: Option<ast::Expr>,
    ) {
        if let Some(ast::Expr::AttrSet(attr_set)) = &value {
            let is_rec = attr_set.rec_token().is_some();
            if let Some(&idx) = self.static_idx.get(&key) {
                let (_, entry) = &mut self.statics[idx];
                match &mut entry.set {
                    Some(set) if entry.value.is_none() => {
                        set.is_rec |= is_rec;
                        set.range.get_or_insert(attr_set.syntax().text_range());
                        set.merge_bindings(ctx, attr_set);
                    }
                    _ => log::warn!("duplicate binding `{key}` at {range:?}, keeping the first"),
                }
            } else {
                let set = MergingSet::desugar(ctx, attr_set, is_rec);
                self.push_entry(
                    key,
                    MergingEntry {
                        set: Some(set),
                        value: None,
                    },
                );
            }
            return;
        }

        if self.static_idx.contains_key(&key) {
            log::warn!("duplicate binding `{key}` at {range:?}, keeping the first");
            return;
        }
        let e = ctx.lower_expr_opt(value);
        self.push_entry(
            key,
            MergingEntry {
                set: None,
                value: Some(BindingValue::Expr(e)),
            },
        );
    }

    fn merge_inherit(&mut self, ctx: &mut LowerCtx, inherit: ast::Inherit) {
        let from_expr = inherit.from().map(|e| {
            let expr = ctx.lower_expr_opt(e.expr());
            let idx = self.inherit_froms.len();
            self.inherit_froms.push(expr);
            idx
        });

        for attr in inherit.attrs() {
            let range = attr.syntax().text_range();
            let key = match AttrKind::of(attr) {
                AttrKind::Static(key) => key.unwrap_or_default(),
                // `inherit ${expr}` or `inherit (expr) ${expr}` is invalid.
                AttrKind::Dynamic(expr) => {
                    log::warn!("dynamic attribute in inherit at {range:?}");
                    let key = ctx.lower_expr_opt(expr);
                    let value = ctx.lower_expr_opt(None);
                    self.dynamics.push((key, value));
                    continue;
                }
            };

            if self.static_idx.contains_key(&key) {
                log::warn!("duplicate binding `{key}` at {range:?}, keeping the first");
                continue;
            }

            let value = match from_expr {
                Some(i) => BindingValue::InheritFrom(i),
                None => {
                    let ref_expr = ctx.alloc_expr(Expr::Reference(key.clone()), range);
                    BindingValue::Inherit(ref_expr)
                }
            };
            self.push_entry(
                key,
                MergingEntry {
                    set: None,
                    value: Some(value),
                },
            );
        }
    }

    fn push_entry(&mut self, key: SmolStr, entry: MergingEntry) -> usize {
        let idx = self.statics.len();
        self.static_idx.insert(key.clone(), idx);
        self.statics.push((key, entry));
        idx
    }

    fn finish(self, ctx: &mut LowerCtx) -> Bindings {
        Bindings {
            statics: self
                .statics
                .into_iter()
                .map(|(key, entry)| {
                    let value = match (entry.value, entry.set) {
                        (Some(value), _) => value,
                        (None, Some(set)) => BindingValue::Expr(set.finish_expr(ctx)),
                        (None, None) => BindingValue::Expr(ctx.lower_expr_opt(None)),
                    };
                    (key, value)
                })
                .collect(),
            inherit_froms: self.inherit_froms.into(),
            dynamics: self.dynamics.into(),
        }
    }

    fn finish_expr(self, ctx: &mut LowerCtx) -> ExprId {
        let range = self.range;
        let is_rec = self.is_rec;
        let e = Expr::AttrSet {
            is_rec,
            bindings: self.finish(ctx),
        };
        match range {
            Some(range) => ctx.alloc_expr(e, range),
            // Implicit sets produced by merging have no source of their own.
            None => ctx.exprs.alloc(e),
        }
    }
}
