//! Naming and relationship inference over the catalog.
//!
//! All functions are pure reads; they derive identifiers and SQL fragments
//! from keys, foreign keys and nullability.

use std::fmt;

use crate::catalog::{Catalog, Column, ForeignKey, Index, Table};
use crate::clause::{Argument, ColumnRef, CompositeCondition, Operator};
use crate::error::{Error, Result};
use crate::inflect::{camelize, pluralize, singularize};

/// Suffixes stripped from a foreign key column to get its role, first match wins
const ROLE_SUFFIXES: &[&str] = &["_id", "_fk", "_ref", "_key"];

/// Name of the synthesized keyset pagination argument
pub const PAGE_START: &str = "page_start";

/// Short role name for a foreign key (`author_id -> users` gives `author`)
pub fn table_ref(foreign_key: &ForeignKey) -> &str {
    let column = foreign_key
        .columns
        .first()
        .map(String::as_str)
        .unwrap_or_default();
    let target = foreign_key.references.table.as_str();

    if column
        .strip_prefix(target)
        .is_some_and(|rest| rest.starts_with('_'))
    {
        return target;
    }

    ROLE_SUFFIXES
        .iter()
        .find_map(|suffix| column.strip_suffix(suffix))
        .unwrap_or(column)
}

/// Role names of every foreign key of a table, in declaration order.
///
/// Roles are compared by their singular PascalCase identifier, the form that
/// ends up in query names, so `user_id` and `users_editor` on the same table
/// collide as `User`.
pub fn foreign_key_roles(table: &Table) -> Result<Vec<(&str, &ForeignKey)>> {
    let mut roles: Vec<(&str, &ForeignKey)> = Vec::with_capacity(table.foreign_keys.len());
    let mut identifiers: Vec<String> = Vec::with_capacity(table.foreign_keys.len());

    for foreign_key in &table.foreign_keys {
        let role = table_ref(foreign_key);
        let identifier = Cardinality::One.identifier(role);
        if let Some(position) = identifiers.iter().position(|existing| *existing == identifier) {
            return Err(Error::AmbiguousRole {
                table: table.name.clone(),
                role: identifier,
                first: roles[position].1.name.clone(),
                second: foreign_key.name.clone(),
            });
        }
        identifiers.push(identifier);
        roles.push((role, foreign_key));
    }

    Ok(roles)
}

/// Whether an identifier names one row or many
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    /// Parse the `"one"` / `"many"` tags
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "one" => Some(Cardinality::One),
            "many" => Some(Cardinality::Many),
            _ => None,
        }
    }

    /// Singular or plural PascalCase identifier for a table name
    pub fn identifier(self, name: &str) -> String {
        match self {
            Cardinality::One => camelize(&singularize(name)),
            Cardinality::Many => camelize(&pluralize(name)),
        }
    }
}

/// Identifier for a table name by cardinality tag; unknown tags give `""`
pub fn table_name(name: &str, tag: &str) -> String {
    Cardinality::from_tag(tag)
        .map(|cardinality| cardinality.identifier(name))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
        }
    }
}

/// LEFT when any local column of the foreign key is nullable, INNER otherwise
pub fn join_type(table: &Table, foreign_key: &ForeignKey) -> JoinType {
    if table
        .foreign_key_columns(foreign_key)
        .iter()
        .any(|column| column.nullable)
    {
        JoinType::Left
    } else {
        JoinType::Inner
    }
}

/// `<JOIN TYPE> <target> ON <local.col = target.col AND ...>`
pub fn table_join(catalog: &Catalog, table: &Table, foreign_key: &ForeignKey) -> Result<String> {
    let target = catalog
        .get_table(&foreign_key.references.table)
        .ok_or_else(|| Error::UnresolvedReference {
            foreign_key: foreign_key.name.clone(),
            table: table.name.clone(),
            target: foreign_key.references.table.clone(),
        })?;

    let mut predicate = CompositeCondition::new(Operator::And);
    for (local, remote) in foreign_key.column_pairs() {
        predicate.add_column_ref(
            ColumnRef::new(&table.name, local),
            ColumnRef::new(&target.name, remote),
        );
    }

    Ok(format!(
        "{} {} ON {}",
        join_type(table, foreign_key),
        target.name,
        predicate
    ))
}

/// Query name suffix for lookups through an index (`ByTenantIdAndEmail`).
///
/// The primary key needs no suffix. Expression parts have no textual form
/// and contribute empty segments, so an expression-only index yields `By`.
pub fn by_index(index: &Index) -> String {
    if index.is_primary_key() {
        return String::new();
    }

    let parts: Vec<String> = index
        .parts
        .iter()
        .map(|part| part.column().map(camelize).unwrap_or_default())
        .collect();

    format!("By{}", parts.join("And"))
}

/// Forward keyset pagination predicate on the first primary key column.
///
/// Empty when the table has no primary key column to page by.
pub fn page_start(table: &Table) -> String {
    let Some(first) = table
        .primary_key
        .as_ref()
        .and_then(|primary_key| primary_key.columns().next())
    else {
        return String::new();
    };

    let cursor = Column::nullable(PAGE_START, "text");
    let argument = Argument(&cursor);

    format!("({argument}::text IS NULL OR {first}::text > {argument}::text)")
}
