//! Decompose nested records into aligned flat rows, and compose them back.
//!
//! # Row layout
//!
//! A parent with groups `G1..Gn` decomposes into `max(1, |G1|, .., |Gn|)` rows.
//! Row `i` carries element `i` of every group that has one; groups that ran out
//! leave the row's slot empty. Row 0 is the parent itself, so the parent's own
//! scalar fields appear exactly once; later rows come from
//! [`Record::clone_empty`] and carry only the key.
//!
//! Nested groups are flattened bottom-up: each child is decomposed into its own
//! run of rows first, and those rows are what gets spread over the parent's rows.
//!
//! ```text
//! Book { name: "a", ages: [1, 2, 10], authors: [ali, reza] }
//!
//!   name | age | author
//!   a    | 1   | ali
//!   a    | 2   | reza
//!   a    | 10  |
//! ```
//!
//! # Grouping
//!
//! Composition relies on rows of one parent being contiguous. Grouping looks
//! only at adjacent keys: `a, b, a` is three groups, never two.

use crate::record::{Group, Record};
use anyhow::{Context, Result};
use tracing::trace;

/// Flatten one record into its rows.
///
/// # Errors
/// Fails if decomposing any nested child fails; no rows are returned then.
pub fn decompose_record<R: Record>(mut parent: R) -> Result<Vec<R>> {
    let groups = R::groups();
    let mut items = Vec::with_capacity(groups.len());
    for group in groups {
        let item = match group {
            Group::Scalar(slot) => slot.decompose(&mut parent),
            Group::Nested(slot) => slot
                .decompose(&mut parent)
                .with_context(|| format!("decompose group `{}`", slot.name()))?,
        };
        items.push(item);
    }

    let row_count = items.iter().map(|item| item.len()).max().unwrap_or(0).max(1);
    for item in &mut items {
        item.fill(&mut parent);
    }

    let mut rows = Vec::with_capacity(row_count);
    rows.push(parent);
    for _ in 1..row_count {
        let mut row = rows[0].clone_empty();
        for item in &mut items {
            item.fill(&mut row);
        }
        rows.push(row);
    }

    trace!(rows = row_count, groups = groups.len(), "decomposed record");
    Ok(rows)
}

/// Flatten every record and concatenate the rows in input order.
///
/// # Errors
/// Stops at the first record that fails to decompose.
pub fn decompose_records<R: Record>(records: impl IntoIterator<Item = R>) -> Result<Vec<R>> {
    let mut rows = Vec::new();
    for (i, record) in records.into_iter().enumerate() {
        let decomposed =
            decompose_record(record).with_context(|| format!("decompose record #{}", i + 1))?;
        rows.extend(decomposed);
    }
    Ok(rows)
}

/// Rebuild one record from rows that all belong to it.
///
/// The first row becomes the result. For every group, the values of all rows
/// whose slot is not empty are collected in order and stored as that group's
/// list; nested children are regrouped by their own key and composed
/// recursively.
///
/// Values are collected with `take_value`, so the first row's single-value
/// columns hold whatever that accessor leaves behind (nothing, for accessors
/// that move the value out).
///
/// Returns `Ok(None)` for an empty input.
///
/// # Errors
/// Fails if composing any nested child fails.
pub fn compose_grouped_records<R: Record>(mut rows: Vec<R>) -> Result<Option<R>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let row_count = rows.len();
    for group in R::groups() {
        match group {
            Group::Scalar(slot) => slot.compose(&mut rows),
            Group::Nested(slot) => slot
                .compose(&mut rows)
                .with_context(|| format!("compose group `{}`", slot.name()))?,
        }
    }

    trace!(rows = row_count, "composed record");
    rows.truncate(1);
    Ok(rows.pop())
}

/// Rebuild one record per run of equal keys, in encounter order.
///
/// # Errors
/// Stops at the first run that fails to compose.
pub fn compose_records<R: Record>(rows: Vec<R>) -> Result<Vec<R>> {
    let runs = group_records_by_key(rows);
    let mut records = Vec::with_capacity(runs.len());
    for (i, run) in runs.into_iter().enumerate() {
        if let Some(record) =
            compose_grouped_records(run).with_context(|| format!("compose record #{}", i + 1))?
        {
            records.push(record);
        }
    }
    Ok(records)
}

/// Split `rows` into runs of consecutive rows with equal keys.
///
/// A run ends exactly where a row's key differs from the previous row's key.
/// Equal keys that are not adjacent end up in separate runs.
pub fn group_records_by_key<R: Record>(rows: Vec<R>) -> Vec<Vec<R>> {
    let mut runs: Vec<Vec<R>> = Vec::new();
    let mut prev: Option<R::Key> = None;
    for row in rows {
        let key = row.key();
        match runs.last_mut() {
            Some(run) if prev.as_ref() == Some(&key) => run.push(row),
            _ => runs.push(vec![row]),
        }
        prev = Some(key);
    }
    runs
}
