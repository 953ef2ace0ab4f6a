// ==============================================================================
// Inferring a File
// ==============================================================================
//
// A file whose entry is a plain attribute set is inferred one declaration at a
// time, each against the environment extended by the ones before it. Any other
// file is inferred as a single expression.

use std::path::Path;

use lang_ast::{parse_module, ExprId, Module, ModuleSourceMap};
use lang_check::{infer_decls, Env, InferError, SolveLimits};
use lang_ty::Scheme;
use miette::{NamedSource, SourceSpan};
use smol_str::SmolStr;

use crate::CliError;

/// One inferred declaration.
pub struct Declaration {
    pub name: SmolStr,
    pub schemes: Vec<Scheme>,
}

pub fn check_file(
    path: &Path,
    env: &Env,
    limits: SolveLimits,
) -> Result<(Env, Vec<Declaration>), CliError> {
    let src = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (module, source_map) = parse_module(&src).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let decls = module
        .top_level_bindings()
        .unwrap_or_else(|| vec![(file_name(path), module.entry_expr)]);

    let file = FileContext {
        path,
        src: &src,
        module: &module,
        source_map: &source_map,
    };
    file.infer_all(env, &decls, limits)
}

struct FileContext<'a> {
    path: &'a Path,
    src: &'a str,
    module: &'a Module,
    source_map: &'a ModuleSourceMap,
}

impl FileContext<'_> {
    fn infer_all(
        &self,
        env: &Env,
        decls: &[(SmolStr, ExprId)],
        limits: SolveLimits,
    ) -> Result<(Env, Vec<Declaration>), CliError> {
        log::debug!("inferring {} declarations in {}", decls.len(), self.path.display());
        let env = infer_decls(env, self.module, decls, limits)
            .map_err(|err| self.infer_error(&err.name, err.expr, err.source))?;
        let inferred = decls
            .iter()
            .map(|(name, _)| Declaration {
                name: name.clone(),
                schemes: env.lookup(name).map(<[Scheme]>::to_vec).unwrap_or_default(),
            })
            .collect();
        Ok((env, inferred))
    }

    fn infer_error(&self, name: &SmolStr, expr: ExprId, source: InferError) -> CliError {
        let span = self.source_map.range_for_expr(expr).map(|range| {
            SourceSpan::from((usize::from(range.start()), usize::from(range.len())))
        });
        CliError::Infer {
            name: name.clone(),
            src: NamedSource::new(self.path.display().to_string(), self.src.to_string()),
            span,
            source,
        }
    }
}

fn file_name(path: &Path) -> SmolStr {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().as_ref().into())
        .unwrap_or_else(|| "<expr>".into())
}
