mod check;
mod config;

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use lang_check::{builtin_env, Env, InferError, SolveLimits};
use miette::{Diagnostic, NamedSource, SourceSpan};
use smol_str::SmolStr;
use thiserror::Error;

use crate::config::{find_config, load_config, NixtyConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the nix file to infer
    file_path: PathBuf,

    /// Use this nixty.toml instead of searching for one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Infer this file first and make its declarations visible (repeatable)
    #[arg(long = "prelude")]
    preludes: Vec<PathBuf>,

    /// Start from an empty environment instead of the builtins
    #[arg(long)]
    no_builtins: bool,

    /// Stop after this many resolutions per declaration (at least 1)
    #[arg(long)]
    max_solutions: Option<NonZeroUsize>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(nixty::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}", path.display())]
    #[diagnostic(code(nixty::config))]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse {}", path.display())]
    #[diagnostic(code(nixty::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: lang_ast::ParseError,
    },

    #[error("cannot infer a type for `{name}`")]
    #[diagnostic(code(nixty::infer))]
    Infer {
        name: SmolStr,
        #[source_code]
        src: NamedSource<String>,
        #[label("declared here")]
        span: Option<SourceSpan>,
        #[source]
        source: InferError,
    },
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let (config, config_dir) = resolve_config(&args)?;

    let no_builtins = args.no_builtins || config.no_builtins;
    let limits = SolveLimits {
        max_solutions: args.max_solutions.or(config.max_solutions),
    };

    let mut env = if no_builtins {
        Env::new()
    } else {
        builtin_env()
    };

    let mut preludes = config.prelude_paths(&config_dir);
    preludes.extend(args.preludes.iter().cloned());
    for prelude in &preludes {
        log::info!("loading prelude {}", prelude.display());
        let (extended, _) = check::check_file(prelude, &env, limits)?;
        env = extended;
    }

    let (_, decls) = check::check_file(&args.file_path, &env, limits)?;
    for decl in decls {
        for scheme in &decl.schemes {
            println!("{} :: {scheme}", decl.name);
        }
    }

    Ok(())
}

/// The config to use and the directory its relative paths start from.
fn resolve_config(args: &Cli) -> Result<(NixtyConfig, PathBuf), CliError> {
    let start_dir = args
        .file_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_config(start_dir),
    };

    match path {
        Some(path) => {
            log::debug!("using config {}", path.display());
            let config = load_config(&path)?;
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((config, dir))
        }
        None => Ok((NixtyConfig::default(), start_dir.to_path_buf())),
    }
}
