//! Table storage: a row layout built from a schema plus a growable array of records conforming to
//! it. Storage is owned by the engine's registry and only touched while its lock is held.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::schema::{Column, Row, TableSchema};
use crate::selection::filter::Filterable;
use crate::value::{Value, ValueKind};

/// One stored row: a value slot per layout column, indexed by ordinal.
pub(crate) type Record = Vec<Value>;

#[derive(Debug)]
pub(crate) struct Layout {
    table: String,
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
}

impl Layout {
    pub fn new(schema: &TableSchema) -> Result<Self> {
        schema.validate()?;
        let positions = schema.columns.iter().enumerate().map(|(i, c)| (c.name.clone(), i)).collect();
        Ok(Self { table: schema.table.clone(), columns: schema.columns.clone(), positions })
    }

    pub fn table(&self) -> &str { &self.table }

    pub fn columns(&self) -> &[Column] { &self.columns }

    pub fn column(&self, position: usize) -> &Column { &self.columns[position] }

    pub fn position(&self, column: &str) -> Result<usize> {
        self.positions.get(column).copied().ok_or_else(|| Error::column_not_found(&self.table, column))
    }

    pub fn to_row(&self, record: &[Value]) -> Row { Row::from_parts(self.table.clone(), self.columns.clone(), record.to_vec()) }
}

#[derive(Debug)]
pub(crate) struct Storage {
    pub layout: Layout,
    pub rows: Vec<Record>,
}

/// Fresh identifier for a key column left at its zero value, for the kinds that can carry one.
fn generate_key(kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Uuid => Some(Value::Uuid(Uuid::new_v4())),
        ValueKind::String => Some(Value::String(ulid::Ulid::new().to_string())),
        _ => None,
    }
}

impl Storage {
    pub fn new(layout: Layout) -> Self { Self { layout, rows: Vec::new() } }

    pub fn view(&self, position: usize) -> RecordView<'_> { RecordView { layout: &self.layout, record: &self.rows[position] } }

    /// Build a record for `row` and append it. Nothing is appended if any column fails.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        for (column, _) in row.columns() {
            self.layout.position(&column.name)?;
        }

        let mut record = Vec::with_capacity(self.layout.columns.len());

        for (position, column) in self.layout.columns.iter().enumerate() {
            let value = match row.get(&column.name) {
                Some(value) if value.kind() != column.kind => {
                    return Err(Error::TypeMismatch { column: column.name.clone(), expected: column.kind, given: value.kind() });
                }
                Some(value) => value.clone(),
                None => column.kind.zero(),
            };

            if column.key {
                if value.is_zero() {
                    if let Some(generated) = generate_key(column.kind) {
                        record.push(generated);
                        continue;
                    }
                }
                if self.rows.iter().any(|existing| existing[position] == value) {
                    return Err(Error::DuplicateKey { table: self.layout.table.clone(), column: column.name.clone() });
                }
            }

            record.push(value);
        }

        self.rows.push(record);
        Ok(())
    }

    pub fn empty(&mut self) { self.rows = Vec::new(); }
}

/// Borrowed view of one stored record, readable by column name.
pub(crate) struct RecordView<'a> {
    layout: &'a Layout,
    record: &'a [Value],
}

impl Filterable for RecordView<'_> {
    fn table(&self) -> &str { self.layout.table() }

    fn value(&self, name: &str) -> Option<&Value> { self.layout.positions.get(name).map(|i| &self.record[*i]) }
}

/// Records serialize as a JSON object keyed by column name, in layout order.
impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.len()))?;
        for (column, value) in self.layout.columns.iter().zip(self.record) {
            map.serialize_entry(&column.name, value)?;
        }
        map.end()
    }
}
