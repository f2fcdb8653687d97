//! SQL fragment builders.
//!
//! Every predicate binds values through [`Argument`], so column nullability
//! alone decides between `sqlc.arg` and `sqlc.narg`.

use std::fmt;

use crate::catalog::Column;

/// Named bind placeholder for a column
#[derive(Debug, Clone, Copy)]
pub struct Argument<'a>(pub &'a Column);

impl fmt::Display for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.nullable {
            write!(f, "sqlc.narg({})", self.0.name)
        } else {
            write!(f, "sqlc.arg({})", self.0.name)
        }
    }
}

/// `<column> = <argument>`
#[derive(Debug, Clone, Copy)]
pub struct ArgumentCondition<'a>(pub &'a Column);

impl fmt::Display for ArgumentCondition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.0.name, Argument(self.0))
    }
}

/// Table-qualified column reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef<'a> {
    pub table: &'a str,
    pub column: &'a str,
}

impl<'a> ColumnRef<'a> {
    pub fn new(table: &'a str, column: &'a str) -> Self {
        Self { table, column }
    }
}

impl fmt::Display for ColumnRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Operator joining the parts of a [`CompositeCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}

/// Ordered list of conditions joined by one operator.
///
/// Renders as the empty string when nothing was added.
#[derive(Debug, Clone)]
pub struct CompositeCondition {
    operator: Operator,
    conditions: Vec<String>,
}

impl CompositeCondition {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            conditions: Vec::new(),
        }
    }

    /// Append `<column> = <argument>`
    pub fn add_column(&mut self, column: &Column) -> &mut Self {
        self.conditions.push(ArgumentCondition(column).to_string());
        self
    }

    /// Append `<left> = <right>` between two qualified columns
    pub fn add_column_ref(&mut self, left: ColumnRef<'_>, right: ColumnRef<'_>) -> &mut Self {
        self.conditions.push(format!("{} = {}", left, right));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}

impl<'a> Extend<&'a Column> for CompositeCondition {
    fn extend<I: IntoIterator<Item = &'a Column>>(&mut self, columns: I) {
        for column in columns {
            self.add_column(column);
        }
    }
}

impl fmt::Display for CompositeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!(" {} ", self.operator);
        f.write_str(&self.conditions.join(&separator))
    }
}
