use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// One level of a sort cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    pub column: String,
    #[serde(default)]
    pub decreasing: bool,
}

impl Sorter {
    pub fn increasing(column: impl Into<String>) -> Self { Self { column: column.into(), decreasing: false } }

    pub fn decreasing(column: impl Into<String>) -> Self { Self { column: column.into(), decreasing: true } }
}

/// Order kept row positions by the sorter cascade. The first sorter is the primary key and each
/// later one only breaks ties left by those before it. Rows equal under every sorter keep their
/// storage order.
pub(crate) fn sort_positions(storage: &Storage, positions: &mut [usize], sorters: &[Sorter]) -> Result<()> {
    if sorters.is_empty() {
        return Ok(());
    }

    let mut slots = Vec::with_capacity(sorters.len());
    for sorter in sorters {
        let slot = storage.layout.position(&sorter.column)?;
        let kind = storage.layout.column(slot).kind;
        if !kind.is_sortable() {
            return Err(Error::unsupported(&sorter.column, kind, "sort"));
        }
        slots.push((slot, sorter.decreasing));
    }

    positions.sort_by(|&a, &b| {
        let (a, b) = (&storage.rows[a], &storage.rows[b]);
        for &(slot, decreasing) in &slots {
            // same column, same kind: compare always yields an ordering here
            let cmp = a[slot].compare(&b[slot]).unwrap_or(Ordering::Equal);
            let cmp = if decreasing { cmp.reverse() } else { cmp };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });

    trace!("sorted {} rows of {} by {} keys", positions.len(), storage.layout.table(), slots.len());
    Ok(())
}
