//! Query execution: filter rows by a condition tree, follow links into other tables, order the
//! kept rows and run one terminal action over them.

pub mod filter;
pub mod sorting;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::engine::{lookup, lookup_mut, Database, Registry};
use crate::error::{Error, Result};
use crate::schema::{Assignment, Row};
use crate::storage::{RecordView, Storage};
use crate::value::Value;

pub use filter::{both, either, evaluate_all, evaluate_condition, switch, Condition, Filterable, Operator};
pub use sorting::Sorter;

/// One end of a link: a column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEnd {
    pub table: String,
    pub column: String,
}

/// Joins the rows of `from.table` to the rows of `to.table` whose `to.column` equals `from.column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linker {
    pub from: LinkEnd,
    pub to: LinkEnd,
}

impl Linker {
    pub fn new(from: (&str, &str), to: (&str, &str)) -> Self {
        Self {
            from: LinkEnd { table: from.0.to_string(), column: from.1.to_string() },
            to: LinkEnd { table: to.0.to_string(), column: to.1.to_string() },
        }
    }
}

/// Describes which rows a selection acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub table: String,
    /// Every condition must hold for a row to be kept.
    pub conditions: Vec<Condition>,
    pub sorters: Vec<Sorter>,
    pub links: Vec<Linker>,
    pub offset: usize,
    /// `1` selects a single row. Anything else is slice mode, with `0` meaning no upper bound.
    pub length: usize,
    pub columns: Vec<String>,
}

impl Filter {
    pub fn on(table: impl Into<String>) -> Self {
        Self { table: table.into(), conditions: Vec::new(), sorters: Vec::new(), links: Vec::new(), offset: 0, length: 1, columns: Vec::new() }
    }

    /// A filter over the source table of `link`, acting on the rows it links to.
    pub fn linked(link: Linker) -> Self {
        let mut filter = Self::on(link.from.table.clone());
        filter.links.push(link);
        filter
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn and(self, condition: Condition) -> Self { self.when(condition) }

    /// Replace the sort cascade with a single sorter.
    pub fn sort_by(mut self, sorter: Sorter) -> Self {
        self.sorters = vec![sorter];
        self
    }

    pub fn then_by(mut self, sorter: Sorter) -> Self {
        self.sorters.push(sorter);
        self
    }

    pub fn link(mut self, link: Linker) -> Self {
        self.links.push(link);
        self
    }

    pub fn slice(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_single(&self) -> bool { self.length == 1 }

    /// The table the terminal action applies to.
    pub fn target_table(&self) -> &str { self.links.last().map(|link| link.to.table.as_str()).unwrap_or(&self.table) }
}

/// Receives the values of one column from `Selection::get`.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    column: String,
    values: Vec<Value>,
}

impl Target {
    pub fn new(column: impl Into<String>) -> Self { Self { column: column.into(), values: Vec::new() } }

    pub fn column(&self) -> &str { &self.column }

    /// The first value received, which is the only one in single-row mode.
    pub fn value(&self) -> Option<&Value> { self.values.first() }

    pub fn values(&self) -> &[Value] { &self.values }

    pub fn into_values(self) -> Vec<Value> { self.values }
}

/// Kept row positions of the table a filter ends up on, in result order.
struct Kept {
    table: String,
    positions: Vec<usize>,
}

/// A filter bound to a database. Each terminal action locks the registry, resolves the kept rows
/// and acts on them before releasing the lock.
#[derive(Debug, Clone)]
pub struct Selection {
    database: Database,
    filter: Filter,
}

impl Selection {
    pub(crate) fn new(database: Database, filter: Filter) -> Self { Self { database, filter } }

    pub fn filter(&self) -> &Filter { &self.filter }

    fn scan(storage: &Storage, conditions: &[Condition]) -> Result<Vec<usize>> {
        let mut positions = Vec::new();
        for position in 0..storage.rows.len() {
            if evaluate_all(&storage.view(position), conditions)? {
                positions.push(position);
            }
        }
        Ok(positions)
    }

    /// Rows of `link.to.table` whose link column matches the link column of a row in `from`.
    fn follow(registry: &Registry, database: &str, link: &Linker, from: &Storage, kept: &[usize]) -> Result<Vec<usize>> {
        let source = from.layout.position(&link.from.column)?;
        let keys: Vec<&Value> = kept.iter().map(|&i| &from.rows[i][source]).collect();

        let to = lookup(registry, database, &link.to.table)?;
        let target = to.layout.position(&link.to.column)?;
        Ok((0..to.rows.len()).filter(|&i| keys.contains(&&to.rows[i][target])).collect())
    }

    fn resolve(&self, registry: &Registry) -> Result<Kept> {
        let database = self.database.name();
        let storage = lookup(registry, database, &self.filter.table)?;
        let mut positions = Self::scan(storage, &self.filter.conditions)?;
        trace!("{}.{}: kept {} of {} rows", database, self.filter.table, positions.len(), storage.rows.len());

        // each visited table with the rows kept in it, most recent last
        let mut visited: Vec<(&str, Vec<usize>)> = vec![(self.filter.table.as_str(), positions)];
        for link in &self.filter.links {
            let from = lookup(registry, database, &link.from.table)?;
            let linked = match visited.iter().rev().find(|(table, _)| *table == link.from.table) {
                Some((_, kept)) => Self::follow(registry, database, link, from, kept)?,
                None => Self::follow(registry, database, link, from, &(0..from.rows.len()).collect::<Vec<_>>())?,
            };
            trace!("{}.{} -> {}.{}: {} rows", link.from.table, link.from.column, link.to.table, link.to.column, linked.len());
            visited.push((link.to.table.as_str(), linked));
        }

        let (table, mut positions) = visited.pop().map(|(table, kept)| (table.to_string(), kept)).unwrap_or_default();
        let storage = lookup(registry, database, &table)?;
        sorting::sort_positions(storage, &mut positions, &self.filter.sorters)?;
        Ok(Kept { table, positions })
    }

    /// Number of kept rows.
    pub fn count(&self) -> Result<usize> {
        let registry = self.database.engine().read();
        Ok(self.resolve(&registry)?.positions.len())
    }

    /// Sum of a numeric column over the kept rows, starting from the column kind's zero. Integer
    /// sums wrap on overflow.
    pub fn sum(&self, column: &str) -> Result<Value> {
        let registry = self.database.engine().read();
        let kept = self.resolve(&registry)?;
        let storage = lookup(&registry, self.database.name(), &kept.table)?;

        let slot = storage.layout.position(column)?;
        let kind = storage.layout.column(slot).kind;
        if !kind.is_numeric() {
            return Err(Error::unsupported(column, kind, "sum"));
        }

        let mut total = kind.zero();
        for &i in &kept.positions {
            total = total.add(&storage.rows[i][slot]).ok_or_else(|| Error::unsupported(column, kind, "sum"))?;
        }
        Ok(total)
    }

    /// Mean of a numeric column over the kept rows, as floating point. NaN when no row is kept,
    /// whatever the column's kind.
    pub fn average(&self, column: &str) -> Result<f64> {
        let registry = self.database.engine().read();
        let kept = self.resolve(&registry)?;
        let storage = lookup(&registry, self.database.name(), &kept.table)?;

        let slot = storage.layout.position(column)?;
        if kept.positions.is_empty() {
            return Ok(f64::NAN);
        }
        let kind = storage.layout.column(slot).kind;
        if !kind.is_numeric() {
            return Err(Error::unsupported(column, kind, "average"));
        }

        let total: f64 = kept.positions.iter().filter_map(|&i| storage.rows[i][slot].as_f64()).sum();
        Ok(total / kept.positions.len() as f64)
    }

    /// Copy the named columns of the kept rows into `targets`, replacing what they held.
    ///
    /// In single-row mode each target receives the value of the first kept row. In slice mode each
    /// receives one value per row of the `offset`/`length` window. Returns the number of rows
    /// copied, or `NotFound` if no row is kept.
    pub fn get(&self, targets: &mut [Target]) -> Result<usize> {
        let registry = self.database.engine().read();
        self.get_from(&registry, targets)
    }

    fn get_from(&self, registry: &Registry, targets: &mut [Target]) -> Result<usize> {
        let kept = self.resolve(registry)?;
        let storage = lookup(registry, self.database.name(), &kept.table)?;

        let slots = targets.iter().map(|target| storage.layout.position(&target.column)).collect::<Result<Vec<_>>>()?;
        if kept.positions.is_empty() {
            return Err(Error::NotFound);
        }

        let window: Vec<usize> = if self.filter.is_single() {
            kept.positions[..1].to_vec()
        } else {
            let length = if self.filter.length == 0 { usize::MAX } else { self.filter.length };
            kept.positions.iter().copied().skip(self.filter.offset).take(length).collect()
        };

        for (target, &slot) in targets.iter_mut().zip(&slots) {
            target.values = window.iter().map(|&i| storage.rows[i][slot].clone()).collect();
        }
        Ok(window.len())
    }

    /// `get` into the filter's declared columns, or every column of the table if none are declared.
    pub fn read(&self) -> Result<Vec<Target>> {
        let registry = self.database.engine().read();
        let mut targets: Vec<Target> = if self.filter.columns.is_empty() {
            let storage = lookup(&registry, self.database.name(), self.filter.target_table())?;
            storage.layout.columns().iter().map(|c| Target::new(c.name.clone())).collect()
        } else {
            self.filter.columns.iter().map(Target::new).collect()
        };
        self.get_from(&registry, &mut targets)?;
        Ok(targets)
    }

    /// Whole kept rows, in result order.
    pub fn rows(&self) -> Result<Vec<Row>> {
        let registry = self.database.engine().read();
        let kept = self.resolve(&registry)?;
        let storage = lookup(&registry, self.database.name(), &kept.table)?;
        Ok(kept.positions.iter().map(|&i| storage.layout.to_row(&storage.rows[i])).collect())
    }

    /// Apply the assignments, in order, to every kept row. Nothing changes unless every assignment
    /// names a column of the table with a value of its kind and no key column would hold a
    /// duplicate afterwards.
    pub fn update(&self, assignments: &[Assignment]) -> Result<usize> {
        let mut registry = self.database.engine().write();
        let kept = self.resolve(&registry)?;
        let storage = lookup_mut(&mut registry, self.database.name(), &kept.table)?;

        let mut slots = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let slot = storage.layout.position(&assignment.column)?;
            let column = storage.layout.column(slot);
            if assignment.value.kind() != column.kind {
                return Err(Error::TypeMismatch { column: column.name.clone(), expected: column.kind, given: assignment.value.kind() });
            }
            if column.key && !kept.positions.is_empty() {
                let taken = kept.positions.len() > 1
                    || storage.rows.iter().enumerate().any(|(i, row)| row[slot] == assignment.value && !kept.positions.contains(&i));
                if taken {
                    return Err(Error::DuplicateKey { table: kept.table.clone(), column: column.name.clone() });
                }
            }
            slots.push(slot);
        }

        for &i in &kept.positions {
            for (assignment, &slot) in assignments.iter().zip(&slots) {
                storage.rows[i][slot] = assignment.value.clone();
            }
        }
        debug!("update {}.{}: {} rows", self.database.name(), kept.table, kept.positions.len());
        Ok(kept.positions.len())
    }

    /// Remove every kept row. Each removed row is replaced by the current last row, so the order
    /// of the remaining rows is not preserved.
    pub fn delete(&self) -> Result<usize> {
        let mut registry = self.database.engine().write();
        let mut kept = self.resolve(&registry)?;
        let storage = lookup_mut(&mut registry, self.database.name(), &kept.table)?;

        kept.positions.sort_unstable_by(|a, b| b.cmp(a));
        for &i in &kept.positions {
            storage.rows.swap_remove(i);
        }
        debug!("delete from {}.{}: {} rows", self.database.name(), kept.table, kept.positions.len());
        Ok(kept.positions.len())
    }

    /// The kept rows as a JSON array of objects keyed by column name.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let registry = self.database.engine().read();
        let kept = self.resolve(&registry)?;
        let storage = lookup(&registry, self.database.name(), &kept.table)?;
        let rows: Vec<RecordView<'_>> = kept.positions.iter().map(|&i| storage.view(i)).collect();
        Ok(serde_json::to_vec(&rows)?)
    }
}

impl Serialize for Selection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let registry = self.database.engine().read();
        let kept = self.resolve(&registry).map_err(serde::ser::Error::custom)?;
        let storage = lookup(&registry, self.database.name(), &kept.table).map_err(serde::ser::Error::custom)?;
        serializer.collect_seq(kept.positions.iter().map(|&i| storage.view(i)))
    }
}
