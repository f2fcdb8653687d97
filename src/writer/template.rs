use std::fmt::Write as _;

use tracing::debug;

use crate::catalog::{Column, Index, Schema, Table};
use crate::clause::{ArgumentCondition, Operator};
use crate::error::Result;
use crate::helpers::Helpers;

/// Data handed to a template for one table
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub engine: &'a str,
    pub schema: &'a Schema,
    pub table: &'a Table,
    pub helpers: Helpers<'a>,
}

/// Renders the query file for one table
pub trait Template {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String>;
}

/// Built-in template producing sqlc CRUD and lookup queries
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTemplate;

impl Template for QueryTemplate {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let table = ctx.table;
        let helpers = ctx.helpers;
        let one = helpers.table_name(&table.name, "one");
        let many = helpers.table_name(&table.name, "many");
        let order = order_by(table);

        let mut file = QueryFile::new(helpers);
        file.header(ctx);

        // Lookups need bindable columns, so expression keys are left out
        let keys: Vec<(&Index, Vec<&Column>)> = table
            .unique_keys()
            .into_iter()
            .filter(|key| !key.has_expressions())
            .map(|key| (key, table.index_columns(key)))
            .collect();

        for (key, columns) in &keys {
            file.query(
                &format!("Get{}{}", one, helpers.by_index(key)),
                "one",
                &format!(
                    "SELECT * FROM {}\nWHERE {};",
                    table.name,
                    helpers.condition(columns.iter().copied(), Operator::And)
                ),
            );
        }

        file.query(&format!("List{}", many), "many", &list_body(ctx));

        for index in table.non_unique_indexes() {
            if index.has_expressions() || covers_foreign_key(table, index) {
                continue;
            }
            let condition = helpers.condition(table.index_columns(index), Operator::And);
            file.query(
                &format!("List{}{}", many, helpers.by_index(index)),
                "many",
                &format!("SELECT * FROM {}\nWHERE {}{};", table.name, condition, order),
            );
        }

        for (role, foreign_key) in helpers.foreign_key_roles(table)? {
            let role = helpers.table_name(role, "one");
            let condition =
                helpers.condition(table.foreign_key_columns(foreign_key), Operator::And);
            file.query(
                &format!("List{}By{}", many, role),
                "many",
                &format!("SELECT * FROM {}\nWHERE {}{};", table.name, condition, order),
            );

            if foreign_key.references.table == table.name {
                continue;
            }
            let join = helpers.table_join(table, foreign_key)?;
            let qualified_order = order_by_qualified(table);
            file.query(
                &format!("List{}With{}", many, role),
                "many",
                &format!(
                    "SELECT sqlc.embed({}), sqlc.embed({}) FROM {}\n{}{};",
                    table.name, foreign_key.references.table, table.name, join, qualified_order
                ),
            );
        }

        if !table.columns.is_empty() {
            let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
            let args: Vec<String> = table.columns.iter().map(|c| helpers.arg(c)).collect();
            file.query(
                &format!("Create{}", one),
                "one",
                &format!(
                    "INSERT INTO {} ({})\nVALUES ({})\nRETURNING *;",
                    table.name,
                    names.join(", "),
                    args.join(", ")
                ),
            );
        }

        let updatable = table.non_primary_key_columns();
        for (key, columns) in &keys {
            let assignments: Vec<String> = updatable
                .iter()
                .filter(|column| !columns.contains(*column))
                .map(|column| ArgumentCondition(column).to_string())
                .collect();
            if assignments.is_empty() {
                continue;
            }
            file.query(
                &format!("Update{}{}", one, helpers.by_index(key)),
                "one",
                &format!(
                    "UPDATE {}\nSET {}\nWHERE {}\nRETURNING *;",
                    table.name,
                    assignments.join(", "),
                    helpers.condition(columns.iter().copied(), Operator::And)
                ),
            );
        }

        for (key, columns) in &keys {
            file.query(
                &format!("Delete{}{}", one, helpers.by_index(key)),
                "exec",
                &format!(
                    "DELETE FROM {}\nWHERE {};",
                    table.name,
                    helpers.condition(columns.iter().copied(), Operator::And)
                ),
            );
        }

        Ok(file.finish())
    }
}

/// Body of the unfiltered list query, paginated when the table has a key.
///
/// The cursor compares keys as text, so the page is sorted as text too.
fn list_body(ctx: &RenderContext<'_>) -> String {
    let table = ctx.table;
    let Some(first) = first_key_column(table) else {
        return format!("SELECT * FROM {};", table.name);
    };

    let page_size = Column::required("page_size", "integer");
    format!(
        "SELECT * FROM {}\nWHERE {}\nORDER BY {}::text\nLIMIT {};",
        table.name,
        ctx.helpers.page_start(table),
        first,
        ctx.helpers.arg(&page_size)
    )
}

/// True when the index columns are exactly a foreign key's local columns,
/// whose lookup is already emitted under the role name
fn covers_foreign_key(table: &Table, index: &Index) -> bool {
    table
        .foreign_keys
        .iter()
        .any(|foreign_key| index.columns().eq(foreign_key.columns.iter().map(String::as_str)))
}

fn first_key_column(table: &Table) -> Option<&str> {
    table
        .primary_key
        .as_ref()
        .and_then(|primary_key| primary_key.columns().next())
}

fn order_by(table: &Table) -> String {
    first_key_column(table)
        .map(|column| format!("\nORDER BY {}", column))
        .unwrap_or_default()
}

fn order_by_qualified(table: &Table) -> String {
    first_key_column(table)
        .map(|column| format!("\nORDER BY {}.{}", table.name, column))
        .unwrap_or_default()
}

/// Accumulates query blocks, dropping the ones configured to be skipped
struct QueryFile<'a> {
    helpers: Helpers<'a>,
    text: String,
}

impl<'a> QueryFile<'a> {
    fn new(helpers: Helpers<'a>) -> Self {
        Self {
            helpers,
            text: String::new(),
        }
    }

    fn header(&mut self, ctx: &RenderContext<'_>) {
        self.text.push_str("-- Code generated by sqlc-gen-queries. DO NOT EDIT.\n");
        let _ = writeln!(self.text, "-- engine: {}", ctx.engine);
        let _ = writeln!(self.text, "-- schema: {}", ctx.schema.name);
        let _ = writeln!(self.text, "-- table: {}", ctx.table.name);
        if !ctx.table.comment.is_empty() {
            let _ = writeln!(self.text, "-- {}", ctx.table.comment);
        }
    }

    fn query(&mut self, name: &str, kind: &str, body: &str) {
        if self.helpers.is_skipped(name) {
            debug!(query = name, "Skipping query");
            return;
        }
        let _ = write!(self.text, "\n-- name: {} :{}\n{}\n", name, kind, body);
    }

    fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::collections::HashSet;

    const SHOP: &str = r#"{
        "schemas": [{
            "name": "public",
            "tables": [
                {
                    "name": "categories",
                    "columns": [
                        {"name": "id", "type": "integer"},
                        {"name": "parent_id", "type": "integer", "null": true},
                        {"name": "slug", "type": "text"}
                    ],
                    "primary_key": {"parts": [{"column": "id"}]},
                    "indexes": [
                        {"name": "uq_slug", "unique": true, "parts": [{"column": "slug"}]},
                        {"name": "uq_lower_slug", "unique": true, "parts": [{"expr": "lower(slug)"}]}
                    ],
                    "foreign_keys": [
                        {"name": "fk_parent", "columns": ["parent_id"], "references": {"table": "categories", "columns": ["id"]}}
                    ]
                },
                {
                    "name": "tags",
                    "columns": [{"name": "label", "type": "text"}]
                },
                {
                    "name": "users",
                    "columns": [{"name": "id", "type": "integer"}],
                    "primary_key": {"parts": [{"column": "id"}]}
                },
                {
                    "name": "articles",
                    "columns": [
                        {"name": "id", "type": "integer"},
                        {"name": "user_id", "type": "integer"},
                        {"name": "title", "type": "text"}
                    ],
                    "primary_key": {"parts": [{"column": "id"}]},
                    "indexes": [
                        {"name": "idx_articles_user_id", "parts": [{"column": "user_id"}]},
                        {"name": "idx_articles_user_title", "parts": [{"column": "user_id"}, {"column": "title"}]}
                    ],
                    "foreign_keys": [
                        {"name": "fk_articles_user", "columns": ["user_id"], "references": {"table": "users", "columns": ["id"]}}
                    ]
                },
                {
                    "name": "drafts",
                    "columns": [
                        {"name": "id", "type": "integer"},
                        {"name": "user_id", "type": "integer"},
                        {"name": "users_editor", "type": "integer", "null": true}
                    ],
                    "primary_key": {"parts": [{"column": "id"}]},
                    "foreign_keys": [
                        {"name": "fk_drafts_user", "columns": ["user_id"], "references": {"table": "users", "columns": ["id"]}},
                        {"name": "fk_drafts_editor", "columns": ["users_editor"], "references": {"table": "users", "columns": ["id"]}}
                    ]
                },
                {
                    "name": "orphans",
                    "columns": [{"name": "id", "type": "integer"}, {"name": "ghost_id", "type": "integer"}],
                    "primary_key": {"parts": [{"column": "id"}]},
                    "foreign_keys": [
                        {"name": "fk_ghost", "columns": ["ghost_id"], "references": {"table": "ghosts", "columns": ["id"]}}
                    ]
                }
            ]
        }]
    }"#;

    fn render(table: &str, skip: &[&str]) -> Result<String> {
        let catalog = Catalog::from_json(SHOP).unwrap();
        let skip: HashSet<String> = skip.iter().map(|s| s.to_string()).collect();
        let schema = &catalog.schemas[0];
        let table = catalog.get_table(table).unwrap();
        let ctx = RenderContext {
            engine: "postgresql",
            schema,
            table,
            helpers: Helpers::new(&catalog, &skip),
        };
        QueryTemplate.render(&ctx)
    }

    fn query_names(text: &str) -> Vec<&str> {
        text.lines()
            .filter_map(|line| line.strip_prefix("-- name: "))
            .map(|line| line.split(' ').next().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_query_names() {
        let text = render("categories", &[]).unwrap();
        assert_eq!(
            query_names(&text),
            vec![
                "GetCategory",
                "GetCategoryBySlug",
                "ListCategories",
                "ListCategoriesByParent",
                "CreateCategory",
                "UpdateCategory",
                "UpdateCategoryBySlug",
                "DeleteCategory",
                "DeleteCategoryBySlug",
            ]
        );
    }

    #[test]
    fn test_self_reference_has_no_join_query() {
        let text = render("categories", &[]).unwrap();
        assert!(!text.contains("JOIN"));
        assert!(text.contains(
            "-- name: ListCategoriesByParent :many\n\
             SELECT * FROM categories\n\
             WHERE parent_id = sqlc.narg(parent_id)\n\
             ORDER BY id;\n"
        ));
    }

    #[test]
    fn test_update_by_unique_key_does_not_set_key() {
        let text = render("categories", &[]).unwrap();
        assert!(text.contains(
            "-- name: UpdateCategoryBySlug :one\n\
             UPDATE categories\n\
             SET parent_id = sqlc.narg(parent_id)\n\
             WHERE slug = sqlc.arg(slug)\n\
             RETURNING *;\n"
        ));
    }

    #[test]
    fn test_table_without_primary_key() {
        let text = render("tags", &[]).unwrap();
        assert_eq!(query_names(&text), vec!["ListTags", "CreateTag"]);
        assert!(text.contains("-- name: ListTags :many\nSELECT * FROM tags;\n"));
        assert!(!text.contains("page_start"));
    }

    #[test]
    fn test_skipped_queries() {
        let text = render("categories", &["DeleteCategory", "CreateCategory", "NoSuchQuery"]).unwrap();
        let names = query_names(&text);
        assert!(!names.contains(&"DeleteCategory"));
        assert!(!names.contains(&"CreateCategory"));
        assert!(names.contains(&"DeleteCategoryBySlug"));
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_unresolved_reference_fails_render() {
        let err = render("orphans", &[]).unwrap_err();
        assert!(matches!(err, crate::Error::UnresolvedReference { .. }));
    }

    #[test]
    fn test_paginated_list_sorts_like_cursor() {
        let text = render("categories", &[]).unwrap();
        assert!(text.contains(
            "-- name: ListCategories :many\n\
             SELECT * FROM categories\n\
             WHERE (sqlc.narg(page_start)::text IS NULL OR id::text > sqlc.narg(page_start)::text)\n\
             ORDER BY id::text\n\
             LIMIT sqlc.arg(page_size);\n"
        ));
    }

    #[test]
    fn test_index_on_foreign_key_columns_is_not_repeated() {
        let text = render("articles", &[]).unwrap();
        assert_eq!(
            query_names(&text),
            vec![
                "GetArticle",
                "ListArticles",
                "ListArticlesByUserIdAndTitle",
                "ListArticlesByUser",
                "ListArticlesWithUser",
                "CreateArticle",
                "UpdateArticle",
                "DeleteArticle",
            ]
        );
    }

    #[test]
    fn test_roles_with_same_identifier_fail_render() {
        let err = render("drafts", &[]).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::AmbiguousRole { ref table, ref role, .. }
                if table == "drafts" && role == "User"
        ));
    }

    #[test]
    fn test_query_names_are_unique() {
        for table in ["categories", "tags", "users", "articles"] {
            let text = render(table, &[]).unwrap();
            let names = query_names(&text);
            let unique: HashSet<&str> = names.iter().copied().collect();
            assert_eq!(unique.len(), names.len(), "duplicate query in {}", table);
        }
    }
}
