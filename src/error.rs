//! Error types for catalog loading, inference and generation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Generator errors.
#[derive(Debug, Error)]
pub enum Error {
    /// An input file (config or catalog) is missing.
    #[error("file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// An input file exists but could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be decoded.
    #[error("failed to decode config {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The catalog file could not be decoded.
    #[error("failed to decode catalog {}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog decoded but breaks a structural invariant.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The output directory could not be created.
    #[error("failed to create output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A per-table output file could not be created or written.
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A foreign key targets a table that is not in the catalog.
    #[error("foreign key {foreign_key} on table {table} references unknown table {target}")]
    UnresolvedReference {
        foreign_key: String,
        table: String,
        target: String,
    },

    /// Two foreign keys of one table infer the same role identifier.
    #[error("foreign keys {first} and {second} on table {table} both infer role {role}")]
    AmbiguousRole {
        table: String,
        role: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
