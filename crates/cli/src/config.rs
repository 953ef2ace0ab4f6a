// ==============================================================================
// nixty.toml Configuration
// ==============================================================================
//
// Discovers and loads `nixty.toml` project configuration files.
//
// Example nixty.toml:
//
// ```toml
// prelude = ["./lib.nix"]
// max_solutions = 64
// no_builtins = false
// ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CliError;

pub const CONFIG_FILE: &str = "nixty.toml";

/// Top-level `nixty.toml` configuration.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NixtyConfig {
    /// Files whose top-level declarations seed the environment, in order.
    /// Relative to the directory of `nixty.toml`.
    #[serde(default)]
    pub prelude: Vec<String>,

    /// Stop after this many resolutions per declaration. Must be at least 1.
    #[serde(default)]
    pub max_solutions: Option<NonZeroUsize>,

    /// Start from an empty environment instead of the builtins.
    #[serde(default)]
    pub no_builtins: bool,
}

impl NixtyConfig {
    pub fn prelude_paths(&self, config_dir: &Path) -> Vec<PathBuf> {
        self.prelude.iter().map(|p| config_dir.join(p)).collect()
    }
}

/// Walk up from `start_dir` looking for `nixty.toml`. Returns the first match.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Read and parse a `nixty.toml` file.
pub fn load_config(path: &Path) -> Result<NixtyConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}
