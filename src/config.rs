//! sqlc.yaml configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::catalog::load::read_input;
use crate::error::{Error, Result};

/// File names searched, in order, when the requested config file is missing
pub const CONFIG_FILE_NAMES: &[&str] = &["sqlc.yaml", "sqlc.yml", "sqlc.json"];

/// Root of a sqlc configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sql: Vec<SqlTarget>,
}

/// One `sql` block: where the schema lives, where queries go, which engine
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqlTarget {
    /// Schema source, passed through untouched
    #[serde(default)]
    pub schema: String,
    /// Output directory for the generated query files
    pub queries: PathBuf,
    #[serde(default)]
    pub engine: String,
    /// Query names left out of the generated files
    #[serde(default)]
    pub skip_queries: Vec<String>,
}

impl SqlTarget {
    pub fn skip_queries_set(&self) -> HashSet<String> {
        self.skip_queries.iter().cloned().collect()
    }
}

/// Load a config file, falling back to the standard sqlc file names
/// next to `path` when it does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let requested = path.as_ref();
    let path = resolve_config_path(requested).ok_or_else(|| Error::NotFound {
        path: requested.to_path_buf(),
    })?;

    let data = read_input(&path)?;
    let config: Config = serde_yaml::from_str(&data).map_err(|source| Error::Config {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), targets = config.sql.len(), "Loaded config");
    Ok(config)
}

fn resolve_config_path(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new(""))
    };

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
