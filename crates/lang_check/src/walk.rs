// ==============================================================================
// Expression Walker
// ==============================================================================
//
// Drives the judgment rules over the expression tree. The walker owns what the
// rules should not see: lexical scopes, the monomorphic set of the enclosing
// lambdas, and the arena of deferred binding values.
//
// Name resolution, first match wins:
//   1. lexical scopes, innermost first. A lambda parameter or let-body name
//      becomes an assumption. A name of the binding group currently being
//      defined forces that binding: within one strongly connected component
//      of the group its type is used directly, a binding from an earlier
//      component is used through an implicit instance.
//      A let-body name whose binding is a record remembers that record, so
//      `s.x` can take the field type through an instance of the binding.
//   2. `true`, `false`, `null`.
//   3. names of the ambient environment, as assumptions. A name with a single
//      record scheme remembers the record the same way.
//   4. enclosing `with` scopes, innermost first. A known field gives its type;
//      inside any `with` an unknown name is a fresh unconstrained variable.
//   5. anything else is an assumption the driver will report as unbound.

use std::collections::BTreeSet;
use std::rc::Rc;

use lang_ast::{Attrpath, BindingValue, Bindings, Expr, ExprId, InterpolPart, Literal, Module, Pat};
use lang_ty::{AttrSetTy, PrimitiveTy, Scheme, Ty, TypeVar};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::assumption::Assumptions;
use crate::constraints::Constraint;
use crate::env::Env;
use crate::fresh::Fresh;
use crate::generate::{self, Judgment, PatField};
use crate::thunk::{Force, ThunkError, ThunkId, Thunks};
use crate::InferError;

enum ScopeKind {
    /// Lambda parameters. Occurrences are collected as assumptions and
    /// resolved by the lambda.
    Params(Vec<SmolStr>),
    /// The body of a `let`. Occurrences are assumptions resolved at the `let`
    /// node, against the monomorphic set of that node.
    LetBody {
        slots: FxHashMap<SmolStr, ThunkId>,
        mono: BTreeSet<TypeVar>,
    },
    /// A `let` or `rec { }` group while its own bindings are being generated.
    Group {
        slots: FxHashMap<SmolStr, ThunkId>,
        mono: BTreeSet<TypeVar>,
        /// The dependency component of every slot of the group.
        components: FxHashMap<ThunkId, usize>,
    },
    /// `with e;` with the fields of `e` when its type is a known record.
    With(Option<(AttrSetTy, Origin)>),
}

/// How a record type seen during generation relates to the expression that
/// uses it.
#[derive(Clone)]
enum Origin {
    /// Generated for this very expression.
    Local,
    /// The type of a `let` binding, used through an implicit instance.
    Let(BTreeSet<TypeVar>),
    /// The body of an environment scheme quantified over these variables.
    Env(Vec<TypeVar>),
}

struct Scope {
    kind: ScopeKind,
    parent: Option<Rc<Scope>>,
}

/// A binding waiting to be generated, with the context it was defined in.
struct Pending {
    scope: Option<Rc<Scope>>,
    mono: BTreeSet<TypeVar>,
    value: PendingValue,
}

enum PendingValue {
    Expr(ExprId),
    /// `inherit (from) name;`
    InheritFrom { from: ThunkId, name: SmolStr },
}

/// The slots of one binding group.
struct Group {
    scope: Rc<Scope>,
    bindings: Vec<(SmolStr, ThunkId)>,
    sources: Vec<ThunkId>,
}

pub(crate) struct Walker<'a> {
    module: &'a Module,
    env: &'a Env,
    fresh: &'a mut Fresh,
    thunks: Thunks<Pending, Judgment>,
    scope: Option<Rc<Scope>>,
    mono: BTreeSet<TypeVar>,
    /// Slots being forced, innermost last.
    forcing: Vec<ThunkId>,
    /// Record types behind the variables given to let-bound and environment
    /// names, so attribute access can see through them.
    known: FxHashMap<TypeVar, (AttrSetTy, Origin)>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(module: &'a Module, env: &'a Env, fresh: &'a mut Fresh) -> Self {
        Self {
            module,
            env,
            fresh,
            thunks: Thunks::default(),
            scope: None,
            mono: BTreeSet::new(),
            forcing: Vec::new(),
            known: FxHashMap::default(),
        }
    }

    pub(crate) fn walk(&mut self, id: ExprId) -> Result<Judgment, InferError> {
        let module = self.module;
        match &module[id] {
            Expr::Missing => Ok(Judgment::of_type(self.fresh.ty())),
            Expr::Literal(lit) => Ok(Judgment::of_type(Ty::from(lit))),
            Expr::Reference(name) => self.reference(name),

            Expr::Apply { fun, arg } => {
                let fun = self.walk(*fun)?;
                let arg = self.walk(*arg)?;
                Ok(generate::apply(fun, arg, self.fresh.ty()))
            }

            Expr::Lambda { param, pat, body } => match (param, pat) {
                (alias, Some(pat)) => self.pattern_lambda(alias.as_ref(), pat, *body),
                (Some(param), None) => {
                    let var = self.fresh.var();
                    let body = self.with_mono([var], |w| {
                        w.with_scope(ScopeKind::Params(vec![param.clone()]), |w| w.walk(*body))
                    })?;
                    Ok(generate::lambda(param, Ty::TyVar(var), body))
                }
                (None, None) => Ok(Judgment::of_type(self.fresh.ty())),
            },

            Expr::IfThenElse {
                cond,
                then_body,
                else_body,
            } => {
                let cond = self.walk(*cond)?;
                let then_body = self.walk(*then_body)?;
                let else_body = self.walk(*else_body)?;
                Ok(generate::if_then_else(cond, then_body, else_body))
            }

            Expr::Assert { cond, body } => {
                let cond = self.walk(*cond)?;
                let body = self.walk(*body)?;
                Ok(generate::assert(cond, body))
            }

            Expr::UnaryOp { op, expr } => {
                let operand = self.walk(*expr)?;
                Ok(generate::unary_op(*op, operand, self.fresh.ty()))
            }

            Expr::BinOp { lhs, rhs, op } => {
                let lhs = self.walk(*lhs)?;
                let rhs = self.walk(*rhs)?;
                Ok(generate::bin_op(*op, lhs, rhs, self.fresh.ty()))
            }

            Expr::List(elems) => {
                let elems = elems
                    .iter()
                    .map(|elem| self.walk(*elem))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(generate::list(elems))
            }

            Expr::AttrSet {
                is_rec: false,
                bindings,
            } => self.attrset(bindings),
            Expr::AttrSet {
                is_rec: true,
                bindings,
            } => self.rec_attrset(bindings),
            Expr::LetIn { bindings, body } => self.let_in(bindings, *body),

            Expr::Select {
                set,
                attrpath,
                default_expr,
            } => self.select(*set, attrpath, *default_expr),

            Expr::HasAttr { set, attrpath } => {
                let mut parts = vec![self.walk(*set)?];
                parts.extend(self.dynamic_attrs(attrpath)?);
                Ok(generate::merged(parts, PrimitiveTy::Bool.into()))
            }

            Expr::With { env, body } => {
                let env = self.walk(*env)?;
                let fields = self.record_of(&env.ty);
                let body = self.with_scope(ScopeKind::With(fields), |w| w.walk(*body))?;
                let ty = body.ty.clone();
                Ok(generate::merged([env, body], ty))
            }

            Expr::StringInterpolation(parts) => self.interpolation(parts, PrimitiveTy::String),
            Expr::PathInterpolation(parts) => self.interpolation(parts, PrimitiveTy::Path),
        }
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    fn reference(&mut self, name: &SmolStr) -> Result<Judgment, InferError> {
        let mut cursor = self.scope.clone();
        while let Some(scope) = cursor {
            match &scope.kind {
                ScopeKind::Params(names) if names.contains(name) => {
                    return Ok(generate::reference(name.clone(), self.fresh.ty()));
                }
                ScopeKind::LetBody { slots, mono } => {
                    if let Some(&slot) = slots.get(name) {
                        let (var, _) = self.let_bound(slot, mono)?;
                        return Ok(generate::reference(name.clone(), Ty::TyVar(var)));
                    }
                }
                ScopeKind::Group {
                    slots,
                    mono,
                    components,
                } => {
                    if let Some(&slot) = slots.get(name) {
                        let owner = self
                            .forcing
                            .iter()
                            .rev()
                            .find(|id| components.contains_key(*id));
                        let recursive = owner
                            .is_some_and(|owner| components.get(owner) == components.get(&slot));
                        if recursive {
                            let forced = self.force(slot)?;
                            return Ok(Judgment::of_type(forced.ty));
                        }

                        let (var, ty) = self.let_bound(slot, mono)?;
                        return Ok(Judgment {
                            assumptions: Assumptions::empty(),
                            constraints: vec![Constraint::ImpInst(
                                Ty::TyVar(var),
                                mono.clone(),
                                ty,
                            )],
                            ty: Ty::TyVar(var),
                        });
                    }
                }
                ScopeKind::Params(_) | ScopeKind::With(_) => {}
            }
            cursor = scope.parent.clone();
        }

        match name.as_str() {
            "true" | "false" => return Ok(Judgment::of_type(PrimitiveTy::Bool)),
            "null" => return Ok(Judgment::of_type(PrimitiveTy::Null)),
            _ => {}
        }

        let env = self.env;
        if let Some(schemes) = env.lookup(name) {
            let var = self.fresh.var();
            if let [Scheme {
                vars,
                ty: Ty::AttrSet(set),
            }] = schemes
            {
                self.known
                    .insert(var, (set.clone(), Origin::Env(vars.clone())));
            }
            return Ok(generate::reference(name.clone(), Ty::TyVar(var)));
        }

        let mut in_with = false;
        let mut cursor = self.scope.clone();
        while let Some(scope) = cursor {
            if let ScopeKind::With(fields) = &scope.kind {
                in_with = true;
                if let Some((set, origin)) = fields {
                    if let Some(ty) = set.get(name) {
                        return Ok(self.instance(ty.clone(), origin));
                    }
                }
            }
            cursor = scope.parent.clone();
        }
        if in_with {
            log::trace!("`{name}` left unknown inside `with`");
            return Ok(Judgment::of_type(self.fresh.ty()));
        }

        Ok(generate::reference(name.clone(), self.fresh.ty()))
    }

    /// A fresh variable for one use of a generalizable binding, plus the
    /// binding's type. A record binding is remembered for attribute access.
    fn let_bound(
        &mut self,
        slot: ThunkId,
        mono: &BTreeSet<TypeVar>,
    ) -> Result<(TypeVar, Ty), InferError> {
        let var = self.fresh.var();
        let ty = self.force(slot)?.ty;
        if let Ty::AttrSet(set) = &ty {
            self.known
                .insert(var, (set.clone(), Origin::Let(mono.clone())));
        }
        Ok((var, ty))
    }

    fn with_scope<T>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> T) -> T {
        let parent = self.scope.take();
        self.scope = Some(Rc::new(Scope {
            kind,
            parent: parent.clone(),
        }));
        let out = f(self);
        self.scope = parent;
        out
    }

    fn with_mono<T>(
        &mut self,
        vars: impl IntoIterator<Item = TypeVar>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.mono.clone();
        self.mono.extend(vars);
        let out = f(self);
        self.mono = saved;
        out
    }

    // ==========================================================================
    // Deferred bindings
    // ==========================================================================

    fn force(&mut self, slot: ThunkId) -> Result<Judgment, InferError> {
        let pending = match self.thunks.start(slot) {
            Ok(Force::Ready(judgment)) => return Ok(judgment),
            Ok(Force::Start(pending)) => pending,
            Err(ThunkError::Loop(_)) => {
                log::debug!("{slot:?} refers to itself, typing it as unknown");
                return Ok(Judgment::of_type(self.fresh.ty()));
            }
            Err(err) => return Err(InferError::EvaluationError(Box::new(err))),
        };

        let outer_scope = std::mem::replace(&mut self.scope, pending.scope);
        let outer_mono = std::mem::replace(&mut self.mono, pending.mono);
        self.forcing.push(slot);
        let result = match pending.value {
            PendingValue::Expr(expr) => self.walk(expr),
            PendingValue::InheritFrom { from, name } => self
                .force(from)
                .map(|source| self.field_of(&source.ty, &name)),
        };
        self.forcing.pop();
        self.scope = outer_scope;
        self.mono = outer_mono;

        let judgment = result?;
        self.thunks
            .finish(slot, judgment.clone())
            .map_err(|err| InferError::EvaluationError(Box::new(err)))?;
        Ok(judgment)
    }

    /// Allocate a slot per binding of the group. Definitions see the group
    /// itself, `inherit x;` sees only the surrounding scope.
    fn defer_group(&mut self, bindings: &Bindings) -> Result<Group, InferError> {
        let outer = self.scope.clone();
        let slots: Vec<(SmolStr, ThunkId)> = bindings
            .names()
            .map(|name| (name.clone(), self.thunks.reserve()))
            .collect();
        let sources: Vec<ThunkId> = bindings
            .inherit_froms
            .iter()
            .map(|_| self.thunks.reserve())
            .collect();

        let scope = Rc::new(Scope {
            kind: ScopeKind::Group {
                slots: slots.iter().cloned().collect(),
                mono: self.mono.clone(),
                components: self.components(bindings, &slots, &sources),
            },
            parent: outer.clone(),
        });
        let pending = |scope: &Option<Rc<Scope>>, mono: &BTreeSet<TypeVar>, value| Pending {
            scope: scope.clone(),
            mono: mono.clone(),
            value,
        };
        let group_scope = Some(scope.clone());

        for (&from, &slot) in bindings.inherit_froms.iter().zip(&sources) {
            self.fill(slot, pending(&group_scope, &self.mono, PendingValue::Expr(from)))?;
        }
        for ((name, value), (_, slot)) in bindings.statics.iter().zip(&slots) {
            let deferred = match *value {
                BindingValue::Expr(expr) => {
                    pending(&group_scope, &self.mono, PendingValue::Expr(expr))
                }
                BindingValue::Inherit(expr) => pending(&outer, &self.mono, PendingValue::Expr(expr)),
                BindingValue::InheritFrom(idx) => {
                    let from = sources.get(idx).copied().ok_or_else(|| {
                        InferError::EvaluationError(
                            format!("`inherit` of `{name}` names a missing source {idx}").into(),
                        )
                    })?;
                    let value = PendingValue::InheritFrom {
                        from,
                        name: name.clone(),
                    };
                    pending(&group_scope, &self.mono, value)
                }
            };
            self.fill(*slot, deferred)?;
        }

        Ok(Group {
            scope,
            bindings: slots,
            sources,
        })
    }

    /// Tarjan components of the group's dependency graph. A binding depends on
    /// every sibling whose name appears anywhere in its definition.
    fn components(
        &self,
        bindings: &Bindings,
        slots: &[(SmolStr, ThunkId)],
        sources: &[ThunkId],
    ) -> FxHashMap<ThunkId, usize> {
        let mut graph: DiGraph<ThunkId, ()> = DiGraph::new();
        let nodes: Vec<_> = slots
            .iter()
            .map(|(_, slot)| *slot)
            .chain(sources.iter().copied())
            .map(|slot| graph.add_node(slot))
            .collect();
        let by_name: FxHashMap<&SmolStr, usize> = slots
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name, i))
            .collect();
        let uses = |expr: ExprId| -> Vec<usize> {
            self.names_used(expr)
                .iter()
                .filter_map(|name| by_name.get(name).copied())
                .collect()
        };

        let mut edges = Vec::new();
        for (i, (_, value)) in bindings.statics.iter().enumerate() {
            match *value {
                BindingValue::Expr(expr) => edges.extend(uses(expr).into_iter().map(|j| (i, j))),
                BindingValue::Inherit(_) => {}
                BindingValue::InheritFrom(idx) => edges.push((i, slots.len() + idx)),
            }
        }
        for (k, &from) in bindings.inherit_froms.iter().enumerate() {
            edges.extend(uses(from).into_iter().map(|j| (slots.len() + k, j)));
        }
        for (from, to) in edges {
            if let (Some(&from), Some(&to)) = (nodes.get(from), nodes.get(to)) {
                graph.add_edge(from, to, ());
            }
        }

        let mut components = FxHashMap::default();
        for (component, members) in tarjan_scc(&graph).into_iter().enumerate() {
            for node in members {
                components.insert(graph[node], component);
            }
        }
        components
    }

    /// Every name referenced anywhere under `expr`, shadowing ignored.
    fn names_used(&self, expr: ExprId) -> FxHashSet<SmolStr> {
        let module = self.module;
        let mut names = FxHashSet::default();
        let mut stack = vec![expr];
        while let Some(id) = stack.pop() {
            if let Expr::Reference(name) = &module[id] {
                names.insert(name.clone());
            }
            module[id].walk_child_exprs(|child| stack.push(child));
        }
        names
    }

    fn fill(&mut self, slot: ThunkId, pending: Pending) -> Result<(), InferError> {
        self.thunks
            .fill(slot, pending)
            .map_err(|err| InferError::EvaluationError(Box::new(err)))
    }

    /// Force every slot of the group. Returns the type of each binding and
    /// every full judgment of the group, each exactly once.
    fn force_group(
        &mut self,
        group: &Group,
    ) -> Result<(Vec<(SmolStr, Ty)>, Vec<Judgment>), InferError> {
        let mut bound = Vec::with_capacity(group.bindings.len());
        let mut judgments = Vec::with_capacity(group.bindings.len() + group.sources.len());
        for (name, slot) in &group.bindings {
            let judgment = self.force(*slot)?;
            bound.push((name.clone(), judgment.ty.clone()));
            judgments.push(judgment);
        }
        for slot in &group.sources {
            judgments.push(self.force(*slot)?);
        }
        Ok((bound, judgments))
    }

    // ==========================================================================
    // Binding forms
    // ==========================================================================

    fn let_in(&mut self, bindings: &Bindings, body: ExprId) -> Result<Judgment, InferError> {
        let group = self.defer_group(bindings)?;
        let dynamics = self.in_scope(Some(group.scope.clone()), |w| w.dynamics(bindings))?;

        let body_scope = ScopeKind::LetBody {
            slots: group.bindings.iter().cloned().collect(),
            mono: self.mono.clone(),
        };
        let body = self.with_scope(body_scope, |w| w.walk(body))?;

        let (bound, mut judgments) = self.force_group(&group)?;
        judgments.extend(dynamics);
        Ok(generate::let_in(bound, judgments, body, &self.mono))
    }

    fn rec_attrset(&mut self, bindings: &Bindings) -> Result<Judgment, InferError> {
        let group = self.defer_group(bindings)?;
        let dynamics = self.in_scope(Some(group.scope.clone()), |w| w.dynamics(bindings))?;
        let (bound, mut judgments) = self.force_group(&group)?;
        judgments.extend(dynamics);

        let record = AttrSetTy {
            fields: bound.into_iter().collect(),
            open: !bindings.dynamics.is_empty(),
        };
        Ok(generate::merged(judgments, Ty::AttrSet(record)))
    }

    fn attrset(&mut self, bindings: &Bindings) -> Result<Judgment, InferError> {
        let sources = bindings
            .inherit_froms
            .iter()
            .map(|from| self.walk(*from))
            .collect::<Result<Vec<_>, _>>()?;

        let mut fields = Vec::with_capacity(bindings.statics.len());
        for (name, value) in bindings.statics.iter() {
            let judgment = match *value {
                BindingValue::Expr(expr) | BindingValue::Inherit(expr) => self.walk(expr)?,
                BindingValue::InheritFrom(idx) => match sources.get(idx) {
                    Some(source) => self.field_of(&source.ty, name),
                    None => Judgment::of_type(self.fresh.ty()),
                },
            };
            fields.push((name.clone(), judgment));
        }

        let mut extra = sources;
        extra.extend(self.dynamics(bindings)?);
        Ok(generate::attrset(fields, extra, !bindings.dynamics.is_empty()))
    }

    fn dynamics(&mut self, bindings: &Bindings) -> Result<Vec<Judgment>, InferError> {
        let mut judgments = Vec::with_capacity(bindings.dynamics.len() * 2);
        for &(key, value) in bindings.dynamics.iter() {
            judgments.push(self.walk(key)?);
            judgments.push(self.walk(value)?);
        }
        Ok(judgments)
    }

    fn in_scope<T>(&mut self, scope: Option<Rc<Scope>>, f: impl FnOnce(&mut Self) -> T) -> T {
        let outer = std::mem::replace(&mut self.scope, scope);
        let out = f(self);
        self.scope = outer;
        out
    }

    fn pattern_lambda(
        &mut self,
        alias: Option<&SmolStr>,
        pat: &Pat,
        body: ExprId,
    ) -> Result<Judgment, InferError> {
        let vars: Vec<TypeVar> = pat.fields.iter().map(|_| self.fresh.var()).collect();
        let mut names: Vec<SmolStr> = pat.fields.iter().map(|(name, _)| name.clone()).collect();
        names.extend(alias.cloned());

        let (defaults, body) = self.with_mono(vars.iter().copied(), |w| {
            w.with_scope(ScopeKind::Params(names), |w| {
                let defaults = pat
                    .fields
                    .iter()
                    .map(|(_, default)| default.map(|expr| w.walk(expr)).transpose())
                    .collect::<Result<Vec<_>, _>>()?;
                let body = w.walk(body)?;
                Ok::<_, InferError>((defaults, body))
            })
        })?;

        let fields = pat
            .fields
            .iter()
            .zip(vars)
            .zip(defaults)
            .map(|(((name, _), var), default)| PatField {
                name: name.clone(),
                var,
                default,
            })
            .collect();
        Ok(generate::pattern_lambda(fields, alias, pat.ellipsis, body))
    }

    // ==========================================================================
    // Attribute access
    // ==========================================================================

    fn select(
        &mut self,
        set: ExprId,
        attrpath: &Attrpath,
        default_expr: Option<ExprId>,
    ) -> Result<Judgment, InferError> {
        let set = self.walk(set)?;
        let (mut current, origin) = match self.record_of(&set.ty) {
            Some((record, origin)) => (Some(Ty::AttrSet(record)), origin),
            None => (None, Origin::Local),
        };
        let mut parts = vec![set];

        let module = self.module;
        for &attr in attrpath.iter() {
            current = match (&module[attr], current) {
                (Expr::Literal(Literal::String(name)), Some(Ty::AttrSet(fields))) => {
                    fields.get(name).cloned()
                }
                (Expr::Literal(Literal::String(_)), _) => None,
                _ => {
                    parts.push(self.walk(attr)?);
                    None
                }
            };
        }

        let default = default_expr.map(|expr| self.walk(expr)).transpose()?;
        let result = match (current, &default) {
            (Some(ty), _) => self.instance(ty, &origin),
            (None, Some(default)) => Judgment::of_type(default.ty.clone()),
            (None, None) => Judgment::of_type(self.fresh.ty()),
        };
        let ty = result.ty.clone();
        parts.extend(default);
        parts.push(result);
        Ok(generate::merged(parts, ty))
    }

    /// Judgments of the interpolated parts of an attribute path.
    fn dynamic_attrs(&mut self, attrpath: &Attrpath) -> Result<Vec<Judgment>, InferError> {
        let module = self.module;
        attrpath
            .iter()
            .filter(|attr| !matches!(module[**attr], Expr::Literal(Literal::String(_))))
            .map(|attr| self.walk(*attr))
            .collect()
    }

    /// The record type behind `ty`, looking through the variables of
    /// let-bound and environment names.
    fn record_of(&self, ty: &Ty) -> Option<(AttrSetTy, Origin)> {
        match ty {
            Ty::AttrSet(set) => Some((set.clone(), Origin::Local)),
            Ty::TyVar(var) => self.known.get(var).cloned(),
            _ => None,
        }
    }

    /// A use of `ty`, a type taken from inside a record of the given origin.
    fn instance(&mut self, ty: Ty, origin: &Origin) -> Judgment {
        let (tv, constraint) = match origin {
            Origin::Local => return Judgment::of_type(ty),
            Origin::Let(mono) => {
                let tv = self.fresh.ty();
                (tv.clone(), Constraint::ImpInst(tv, mono.clone(), ty))
            }
            Origin::Env(vars) => {
                let tv = self.fresh.ty();
                let scheme = Scheme {
                    vars: vars.clone(),
                    ty,
                };
                (tv.clone(), Constraint::ExpInst(tv, scheme))
            }
        };
        Judgment {
            assumptions: Assumptions::empty(),
            constraints: vec![constraint],
            ty: tv,
        }
    }

    /// Field `name` of `set`, or a fresh variable when `set` is not a record
    /// known to have it.
    fn field_of(&mut self, set: &Ty, name: &str) -> Judgment {
        match self.record_of(set) {
            Some((record, origin)) => match record.get(name) {
                Some(ty) => self.instance(ty.clone(), &origin),
                None => Judgment::of_type(self.fresh.ty()),
            },
            None => Judgment::of_type(self.fresh.ty()),
        }
    }

    fn interpolation(
        &mut self,
        parts: &[InterpolPart<SmolStr>],
        ty: PrimitiveTy,
    ) -> Result<Judgment, InferError> {
        let parts = parts
            .iter()
            .filter_map(|part| match part {
                InterpolPart::Interpol(expr) => Some(self.walk(*expr)),
                InterpolPart::Literal(_) => None,
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(generate::merged(parts, ty.into()))
    }
}
