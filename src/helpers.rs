//! Helper functions bound over a catalog, handed to templates.

use std::collections::HashSet;

use crate::catalog::{Catalog, Column, ForeignKey, Index, Table};
use crate::clause::{Argument, CompositeCondition, Operator};
use crate::error::Result;
use crate::infer;

/// Named helper registry available to a [`Template`](crate::writer::Template)
/// while rendering one table.
#[derive(Debug, Clone, Copy)]
pub struct Helpers<'a> {
    catalog: &'a Catalog,
    skip_queries: &'a HashSet<String>,
}

impl<'a> Helpers<'a> {
    pub fn new(catalog: &'a Catalog, skip_queries: &'a HashSet<String>) -> Self {
        Self {
            catalog,
            skip_queries,
        }
    }

    /// `sqlc.arg(..)` or `sqlc.narg(..)` for a column
    pub fn arg(&self, column: &Column) -> String {
        Argument(column).to_string()
    }

    /// Equality conditions over `columns` joined by `operator`
    pub fn condition<'c>(
        &self,
        columns: impl IntoIterator<Item = &'c Column>,
        operator: Operator,
    ) -> CompositeCondition {
        let mut condition = CompositeCondition::new(operator);
        condition.extend(columns);
        condition
    }

    pub fn table_ref<'f>(&self, foreign_key: &'f ForeignKey) -> &'f str {
        infer::table_ref(foreign_key)
    }

    pub fn foreign_key_roles<'t>(&self, table: &'t Table) -> Result<Vec<(&'t str, &'t ForeignKey)>> {
        infer::foreign_key_roles(table)
    }

    pub fn table_name(&self, name: &str, tag: &str) -> String {
        infer::table_name(name, tag)
    }

    pub fn table_join(&self, table: &Table, foreign_key: &ForeignKey) -> Result<String> {
        infer::table_join(self.catalog, table, foreign_key)
    }

    pub fn by_index(&self, index: &Index) -> String {
        infer::by_index(index)
    }

    pub fn page_start(&self, table: &Table) -> String {
        infer::page_start(table)
    }

    /// True when the query name is configured to be left out
    pub fn is_skipped(&self, query: &str) -> bool {
        self.skip_queries.contains(query)
    }
}
