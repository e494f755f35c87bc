//! Testing utilities for record types built on this crate.
//!
//! - **Fixtures**: [`Book`] and [`Author`], a two-level record pair with both a
//!   scalar and a nested group, plus [`sample_books`]
//! - **Assertions**: round-trip and row-layout checks that panic with the rows
//!   involved when they fail
//!
//! # Quick Start
//!
//! ```
//! use csvgroup::testing::*;
//!
//! assert_round_trip(&sample_books());
//!
//! let rows = csvgroup::decompose_records(sample_books()).unwrap();
//! assert_key_runs_contiguous(&rows);
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
