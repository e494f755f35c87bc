//! Assertion functions for decomposed rows and composed records.

use crate::engine::{compose_records, decompose_records};
use crate::record::Record;
use std::fmt::Debug;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content, naming the first
/// differing index.
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that decomposing and then composing `records` gives them back.
///
/// # Panics
///
/// Panics if either step fails or the composed records differ.
///
/// # Example
///
/// ```
/// use csvgroup::testing::{assert_round_trip, sample_books};
///
/// assert_round_trip(&sample_books());
/// ```
pub fn assert_round_trip<R: Record + Clone + Debug + PartialEq>(records: &[R]) {
    let rows = match decompose_records(records.to_vec()) {
        Ok(rows) => rows,
        Err(e) => panic!("decompose failed: {e:#}"),
    };
    let row_count = rows.len();
    let composed = match compose_records(rows) {
        Ok(composed) => composed,
        Err(e) => panic!("compose of {row_count} rows failed: {e:#}"),
    };
    assert_collections_equal(&composed, records);
}

/// Assert that every key occupies exactly one contiguous run of `rows`.
///
/// # Panics
///
/// Panics at the first row whose key already closed an earlier run.
pub fn assert_key_runs_contiguous<R: Record + Debug>(rows: &[R]) {
    let mut closed: Vec<R::Key> = Vec::new();
    let mut current: Option<R::Key> = None;
    for (i, row) in rows.iter().enumerate() {
        let key = row.key();
        if current.as_ref() == Some(&key) {
            continue;
        }
        assert!(
            !closed.contains(&key),
            "Row {i} reopens an earlier key run:\n  Row: {row:?}"
        );
        if let Some(prev) = current.replace(key) {
            closed.push(prev);
        }
    }
}
