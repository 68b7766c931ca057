//! Column and row descriptors. These are what a registration layer hands to the engine: the engine
//! builds its row layout from a `TableSchema` and accepts `Row`s conforming to it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{Value, ValueKind};

/// Immutable identity of one field of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub table: String,
    pub name: String,
    pub ordinal: usize,
    /// Key columns must hold a value that is unique across the table's rows.
    #[serde(default)]
    pub key: bool,
    pub kind: ValueKind,
}

/// The ordered columns of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<Column>,
}

/// Name of the derived word-index column backing text column `name`.
pub fn index_column_name(name: &str) -> String { format!("{}_index", name) }

impl TableSchema {
    pub fn build(table: impl Into<String>) -> SchemaBuilder { SchemaBuilder { table: table.into(), columns: Vec::new() } }

    pub fn name(&self) -> &str { &self.table }

    pub fn column(&self, name: &str) -> Option<&Column> { self.columns.iter().find(|c| c.name == name) }

    /// A row for this table with every column at its zero value.
    pub fn row(&self) -> Row { Row::new(self.table.clone(), self.columns.clone()) }

    /// Check that a layout can be built from this schema.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(Error::SchemaError("table name is empty".to_string()));
        }
        if self.columns.is_empty() {
            return Err(Error::SchemaError(format!("table {} has no columns", self.table)));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(Error::SchemaError(format!("column {} of table {} has no name", i, self.table)));
            }
            if column.table != self.table {
                return Err(Error::SchemaError(format!("column {} belongs to table {}, not {}", column.name, column.table, self.table)));
            }
            if column.ordinal != i {
                return Err(Error::SchemaError(format!("column {} has ordinal {} but is at position {}", column.name, column.ordinal, i)));
            }
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::SchemaError(format!("duplicate column {} in table {}", column.name, self.table)));
            }
        }
        Ok(())
    }
}

impl AsRef<str> for TableSchema {
    fn as_ref(&self) -> &str { &self.table }
}

pub struct SchemaBuilder {
    table: String,
    columns: Vec<Column>,
}

impl SchemaBuilder {
    fn push(mut self, name: impl Into<String>, kind: ValueKind, key: bool) -> Self {
        let ordinal = self.columns.len();
        self.columns.push(Column { table: self.table.clone(), name: name.into(), ordinal, key, kind });
        self
    }

    pub fn key(self, name: impl Into<String>, kind: ValueKind) -> Self { self.push(name, kind, true) }

    pub fn column(self, name: impl Into<String>, kind: ValueKind) -> Self { self.push(name, kind, false) }

    /// A searchable text column: the string itself plus its derived word index.
    pub fn text(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let index = index_column_name(&name);
        self.push(name, ValueKind::String, false).push(index, ValueKind::I64, false)
    }

    pub fn finish(self) -> TableSchema { TableSchema { table: self.table, columns: self.columns } }
}

/// One column assignment, as used by inserts (via `Row::apply`) and updates.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self { Self { column: column.into(), value: value.into() } }
}

/// A row descriptor: the table it belongs to, its ordered columns and one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: String,
    columns: Vec<Column>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Self {
        let values = columns.iter().map(|c| c.kind.zero()).collect();
        Self { table: table.into(), columns, values }
    }

    pub(crate) fn from_parts(table: String, columns: Vec<Column>, values: Vec<Value>) -> Self { Self { table, columns, values } }

    pub fn table(&self) -> &str { &self.table }

    pub fn get(&self, column: &str) -> Option<&Value> { self.columns.iter().position(|c| c.name == column).map(|i| &self.values[i]) }

    pub fn columns(&self) -> impl Iterator<Item = (&Column, &Value)> { self.columns.iter().zip(self.values.iter()) }

    /// Set one column. The value must have the column's kind.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let i = self.columns.iter().position(|c| c.name == column).ok_or_else(|| Error::column_not_found(&self.table, column))?;
        let expected = self.columns[i].kind;
        if value.kind() != expected {
            return Err(Error::TypeMismatch { column: column.to_string(), expected, given: value.kind() });
        }
        self.values[i] = value;
        Ok(self)
    }

    pub fn apply(self, assignments: impl IntoIterator<Item = Assignment>) -> Result<Self> {
        assignments.into_iter().try_fold(self, |row, assignment| row.set(&assignment.column, assignment.value))
    }
}
