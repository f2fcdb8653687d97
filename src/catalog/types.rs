use serde::Deserialize;

/// Name every primary key carries once the catalog is loaded
pub const PRIMARY_KEY: &str = "primary key";

/// Decoded database catalog: every schema, in source order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub schemas: Vec<Schema>,
}

impl Catalog {
    /// Find a table by name across all schemas.
    ///
    /// Table names are only unique within a schema, so the first match in
    /// schema order wins.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.tables.iter())
            .find(|table| table.name == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// Table definition with its keys and relationships
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Stored apart from `indexes`; normalized to [`PRIMARY_KEY`] on load
    #[serde(default)]
    pub primary_key: Option<Index>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Primary key first (if any), then unique indexes in declaration order.
    ///
    /// Keys covering the same columns are not collapsed.
    pub fn unique_keys(&self) -> Vec<&Index> {
        self.primary_key
            .iter()
            .chain(self.indexes.iter().filter(|index| index.unique))
            .collect()
    }

    /// Indexes that are not unique, in declaration order
    pub fn non_unique_indexes(&self) -> Vec<&Index> {
        self.indexes.iter().filter(|index| !index.unique).collect()
    }

    /// Columns not referenced by the primary key, in column order
    pub fn non_primary_key_columns(&self) -> Vec<&Column> {
        let Some(primary_key) = &self.primary_key else {
            return self.columns.iter().collect();
        };

        self.columns
            .iter()
            .filter(|column| !primary_key.columns().any(|name| name == column.name))
            .collect()
    }

    /// Resolve the columns of an index; expression parts are skipped
    pub fn index_columns(&self, index: &Index) -> Vec<&Column> {
        index
            .columns()
            .filter_map(|name| self.get_column(name))
            .collect()
    }

    /// Resolve the local columns of a foreign key
    pub fn foreign_key_columns(&self, foreign_key: &ForeignKey) -> Vec<&Column> {
        foreign_key
            .columns
            .iter()
            .filter_map(|name| self.get_column(name))
            .collect()
    }
}

/// Column definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Column {
    pub name: String,
    /// Raw SQL type, never interpreted
    #[serde(rename = "type", default)]
    pub sql_type: String,
    /// May the column hold SQL NULL
    #[serde(rename = "null", default)]
    pub nullable: bool,
    #[serde(default)]
    pub comment: String,
}

impl Column {
    /// Create a required (non-nullable) column
    pub fn required(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: false,
            comment: String::new(),
        }
    }

    /// Create an optional (nullable) column
    pub fn nullable(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, sql_type)
        }
    }
}

/// Index definition; the primary key uses the same shape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Index {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub parts: Vec<IndexPart>,
}

impl Index {
    pub fn is_primary_key(&self) -> bool {
        self.name == PRIMARY_KEY
    }

    /// Names of the plain column parts, in part order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(IndexPart::column)
    }

    /// True when at least one part is a SQL expression
    pub fn has_expressions(&self) -> bool {
        self.parts.iter().any(|part| part.expr().is_some())
    }
}

/// What an index part covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    Column(String),
    Expr(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawIndexPart")]
pub struct IndexPart {
    pub target: IndexTarget,
    /// Sort direction, informational only
    pub desc: bool,
}

impl IndexPart {
    pub fn column(&self) -> Option<&str> {
        match &self.target {
            IndexTarget::Column(name) => Some(name),
            IndexTarget::Expr(_) => None,
        }
    }

    pub fn expr(&self) -> Option<&str> {
        match &self.target {
            IndexTarget::Expr(expr) => Some(expr),
            IndexTarget::Column(_) => None,
        }
    }
}

/// Wire shape of an index part: `column` and `expr` are mutually exclusive
#[derive(Deserialize)]
struct RawIndexPart {
    #[serde(default)]
    column: Option<String>,
    #[serde(default)]
    expr: Option<String>,
    #[serde(default)]
    desc: bool,
}

impl TryFrom<RawIndexPart> for IndexPart {
    type Error = String;

    fn try_from(raw: RawIndexPart) -> Result<Self, Self::Error> {
        let column = raw.column.filter(|column| !column.is_empty());
        let expr = raw.expr.filter(|expr| !expr.is_empty());

        let target = match (column, expr) {
            (Some(column), None) => IndexTarget::Column(column),
            (None, Some(expr)) => IndexTarget::Expr(expr),
            (Some(column), Some(expr)) => {
                return Err(format!(
                    "index part has both column {:?} and expression {:?}",
                    column, expr
                ))
            }
            (None, None) => return Err("index part has neither column nor expression".into()),
        };

        Ok(Self {
            target,
            desc: raw.desc,
        })
    }
}

/// Foreign key; `columns[i]` pairs with `references.columns[i]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForeignKey {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<String>,
    pub references: References,
}

impl ForeignKey {
    /// Local/referenced column name pairs, positionally matched
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(self.references.columns.iter())
            .map(|(local, remote)| (local.as_str(), remote.as_str()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct References {
    pub table: String,
    pub columns: Vec<String>,
}
