use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{Row, TableSchema};
use crate::selection::{Filter, Selection};
use crate::storage::{Layout, Storage};

/// database name -> table name -> storage
pub(crate) type Registry = HashMap<String, HashMap<String, Storage>>;

/// Owner of every table of every database instance. Clones share the same registry.
///
/// One reader/writer lock guards the whole registry: queries take it shared, anything that changes
/// rows or tables takes it exclusively, so a write to one table blocks reads of every other table.
/// The lock is only held for the duration of a single call.
#[derive(Clone, Default)]
pub struct Engine {
    registry: Arc<RwLock<Registry>>,
}

impl Engine {
    pub fn new() -> Self { Self::default() }

    /// A handle to the named database instance. Instances are created lazily by their first `sync`.
    pub fn database(&self, name: impl Into<String>) -> Database { Database { engine: self.clone(), name: name.into() } }

    // mutations are validated before they are applied, so a poisoned registry is still consistent
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Registry> { self.registry.read().unwrap_or_else(PoisonError::into_inner) }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Registry> { self.registry.write().unwrap_or_else(PoisonError::into_inner) }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.read();
        f.debug_struct("Engine").field("databases", &registry.keys().collect::<Vec<_>>()).finish()
    }
}

pub(crate) fn lookup<'a>(registry: &'a Registry, database: &str, table: &str) -> Result<&'a Storage> {
    registry.get(database).and_then(|tables| tables.get(table)).ok_or_else(|| Error::TableNotFound(table.to_string()))
}

pub(crate) fn lookup_mut<'a>(registry: &'a mut Registry, database: &str, table: &str) -> Result<&'a mut Storage> {
    registry.get_mut(database).and_then(|tables| tables.get_mut(table)).ok_or_else(|| Error::TableNotFound(table.to_string()))
}

/// One database instance inside an [`Engine`].
#[derive(Debug, Clone)]
pub struct Database {
    engine: Engine,
    name: String,
}

impl Database {
    pub fn name(&self) -> &str { &self.name }

    pub(crate) fn engine(&self) -> &Engine { &self.engine }

    /// (Re)create a table with an empty row set. Rows stored under an earlier sync of the same
    /// table are discarded, even if the schema is unchanged.
    pub fn sync(&self, schema: &TableSchema) -> Result<()> { self.sync_all([schema]) }

    /// Sync each table in order. Stops at the first schema that cannot be laid out; tables synced
    /// before it stay synced.
    pub fn sync_all<'a>(&self, schemas: impl IntoIterator<Item = &'a TableSchema>) -> Result<()> {
        let mut registry = self.engine.write();
        for schema in schemas {
            let layout = Layout::new(schema)?;
            debug!("sync {}.{} ({} columns)", self.name, schema.table, layout.columns().len());
            registry.entry(self.name.clone()).or_default().insert(schema.table.clone(), Storage::new(layout));
        }
        Ok(())
    }

    pub fn insert(&self, row: &Row) -> Result<()> { self.insert_all([row]) }

    /// Insert each row in order. Stops at the first failure; rows inserted before it stay.
    pub fn insert_all<'a>(&self, rows: impl IntoIterator<Item = &'a Row>) -> Result<()> {
        let mut registry = self.engine.write();
        for row in rows {
            let storage = lookup_mut(&mut registry, &self.name, row.table())?;
            storage.insert(row)?;
            debug!("insert into {}.{} ({} rows)", self.name, row.table(), storage.rows.len());
        }
        Ok(())
    }

    /// Drop a table and its rows. Later operations on it fail with `TableNotFound` until it is
    /// synced again.
    pub fn delete(&self, table: impl AsRef<str>) -> Result<()> { self.delete_all([table]) }

    pub fn delete_all<T: AsRef<str>>(&self, tables: impl IntoIterator<Item = T>) -> Result<()> {
        let mut registry = self.engine.write();
        for table in tables {
            let table = table.as_ref();
            registry.get_mut(&self.name).and_then(|tables| tables.remove(table)).ok_or_else(|| Error::TableNotFound(table.to_string()))?;
            debug!("delete {}.{}", self.name, table);
        }
        Ok(())
    }

    /// Remove every row of a table, keeping its layout.
    pub fn empty(&self, table: impl AsRef<str>) -> Result<()> { self.empty_all([table]) }

    pub fn empty_all<T: AsRef<str>>(&self, tables: impl IntoIterator<Item = T>) -> Result<()> {
        let mut registry = self.engine.write();
        for table in tables {
            let table = table.as_ref();
            lookup_mut(&mut registry, &self.name, table)?.empty();
            debug!("empty {}.{}", self.name, table);
        }
        Ok(())
    }

    /// Names of the synced tables, sorted.
    pub fn tables(&self) -> Vec<String> {
        let registry = self.engine.read();
        let mut tables: Vec<String> = registry.get(&self.name).map(|tables| tables.keys().cloned().collect()).unwrap_or_default();
        tables.sort();
        tables
    }

    /// Schema of a synced table, as its layout was built.
    pub fn schema(&self, table: &str) -> Result<TableSchema> {
        let registry = self.engine.read();
        let layout = &lookup(&registry, &self.name, table)?.layout;
        Ok(TableSchema { table: layout.table().to_string(), columns: layout.columns().to_vec() })
    }

    pub fn search(&self, filter: Filter) -> Selection { Selection::new(self.clone(), filter) }
}
