use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{Catalog, Index, Table, PRIMARY_KEY};
use crate::error::{Error, Result};

/// Read a catalog JSON file, normalize primary keys and check invariants
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let data = read_input(path)?;

    let catalog: Catalog = serde_json::from_str(&data).map_err(|source| Error::Catalog {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = catalog.prepare()?;

    debug!(
        path = %path.display(),
        schemas = catalog.schemas.len(),
        "Loaded catalog"
    );

    Ok(catalog)
}

/// Read an input file, reporting a missing file distinctly
pub(crate) fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

impl Catalog {
    /// Decode a catalog held in memory
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json).map_err(|source| Error::Catalog {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        catalog.prepare()
    }

    fn prepare(mut self) -> Result<Self> {
        for table in self.schemas.iter_mut().flat_map(|s| s.tables.iter_mut()) {
            if let Some(primary_key) = table.primary_key.as_mut() {
                primary_key.name = PRIMARY_KEY.to_string();
                primary_key.unique = true;
            }
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        for schema in &self.schemas {
            let mut names = HashSet::new();
            for table in &schema.tables {
                if !names.insert(table.name.as_str()) {
                    return Err(invalid(format!(
                        "schema {} declares table {} twice",
                        schema.name, table.name
                    )));
                }
                validate_table(table)?;
            }
        }
        Ok(())
    }
}

fn validate_table(table: &Table) -> Result<()> {
    let mut names = HashSet::new();
    for column in &table.columns {
        if !names.insert(column.name.as_str()) {
            return Err(invalid(format!(
                "table {} declares column {} twice",
                table.name, column.name
            )));
        }
    }

    for index in table.primary_key.iter().chain(table.indexes.iter()) {
        validate_index(table, index)?;
    }

    for fk in &table.foreign_keys {
        if fk.columns.is_empty() {
            return Err(invalid(format!(
                "foreign key {} on table {} has no columns",
                fk.name, table.name
            )));
        }
        if fk.columns.len() != fk.references.columns.len() {
            return Err(invalid(format!(
                "foreign key {} on table {} maps {} columns onto {} referenced columns",
                fk.name,
                table.name,
                fk.columns.len(),
                fk.references.columns.len()
            )));
        }
        if let Some(missing) = fk.columns.iter().find(|c| table.get_column(c).is_none()) {
            return Err(invalid(format!(
                "foreign key {} on table {} uses unknown column {}",
                fk.name, table.name, missing
            )));
        }
    }

    Ok(())
}

fn validate_index(table: &Table, index: &Index) -> Result<()> {
    if index.parts.is_empty() {
        return Err(invalid(format!(
            "index {} on table {} has no parts",
            index.name, table.name
        )));
    }
    if let Some(missing) = index.columns().find(|c| table.get_column(c).is_none()) {
        return Err(invalid(format!(
            "index {} on table {} uses unknown column {}",
            index.name, table.name, missing
        )));
    }
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::InvalidCatalog(message)
}
