//! Table Partitioner
//!
//! Splits a table's item list into contiguous, near-equal windows and plans
//! the child table records. Pure: persistence stays with the service.

use crate::db::models::DiningTable;

use super::allocator::{next_suffix, subtable_name};
use super::error::{SeatingError, SeatingResult};

/// Split `items` into exactly `n` contiguous windows of `ceil(len / n)`
/// items; trailing windows may be shorter or empty when `n` exceeds the
/// item count. `n` must be positive.
pub fn partition_items(items: &[String], n: usize) -> Vec<Vec<String>> {
    debug_assert!(n > 0);
    let per_part = items.len().div_ceil(n);
    (0..n)
        .map(|i| {
            let start = (i * per_part).min(items.len());
            let end = ((i + 1) * per_part).min(items.len());
            items[start..end].to_vec()
        })
        .collect()
}

/// Plan `n` unsaved subtables of `parent`, continuing the letter sequence
/// already used by `existing_subtables`.
///
/// Each subtable holds a copy of its window; the parent keeps its items
/// (observed upstream behavior, kept deliberately — see DESIGN.md).
pub fn plan_split(
    parent: &DiningTable,
    existing_subtables: &[DiningTable],
    n: usize,
) -> SeatingResult<Vec<DiningTable>> {
    if n == 0 {
        return Err(SeatingError::Validation(
            "Split count must be a positive integer".to_string(),
        ));
    }
    let parent_id = parent
        .id
        .clone()
        .ok_or_else(|| SeatingError::Validation("Parent table has no id".to_string()))?;

    let start = next_suffix(existing_subtables.iter().map(|t| t.name.as_str()))?;
    let windows = partition_items(&parent.items, n);

    let mut subtables = Vec::with_capacity(n);
    for (i, window) in windows.into_iter().enumerate() {
        let letter = start as usize + i;
        if letter > 'Z' as usize {
            return Err(SeatingError::Validation(
                "Subtable suffixes are exhausted past 'Z'".to_string(),
            ));
        }
        subtables.push(DiningTable {
            id: None,
            name: subtable_name(&parent.name, letter as u8 as char),
            section: parent.section.clone(),
            items: window,
            parent_table: Some(parent_id.clone()),
        });
    }
    Ok(subtables)
}
