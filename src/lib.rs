//! # csvgroup
//!
//! Flatten nested records into tabular rows and rebuild them, plus a streaming
//! splitter that finds where one parent's rows end in a flat byte stream.
//!
//! ## Key Features
//!
//! - **Decompose** - turn a record with one-to-many child lists into aligned rows
//!   that share the parent's key
//! - **Compose** - regroup contiguous same-key rows into the original records
//! - **Multi-level nesting** - children may be records with children of their own
//! - **Streaming split** - carve a CSV byte stream into per-parent chunks without
//!   buffering the whole input
//! - **CSV I/O** - Serde + `csv` adapters, with transparent compression
//!
//! ## Quick Start
//!
//! ```rust
//! use csvgroup::testing::sample_books;
//! use csvgroup::{compose_records, decompose_records};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let rows = decompose_records(sample_books())?;
//! assert_eq!(rows.len(), 6); // three rows per book
//!
//! let books = compose_records(rows)?;
//! assert_eq!(books, sample_books());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Record
//!
//! A [`Record`] exposes a grouping key, a static list of [`Group`]s and an empty
//! clone carrying only the key. Each group is a [`Field`] accessor table wrapped
//! in [`Group::Scalar`] (plain child values) or [`Group::Nested`] (child records).
//!
//! ### Row layout
//!
//! A parent decomposes into as many rows as its longest group needs. Row `i`
//! holds element `i` of every group; the parent's own fields appear only on the
//! first row. Rows of a slot that ran out are left empty and are skipped again
//! on composition, which is why [`Field::is_empty`](record::Field) must recognize
//! the empty value.
//!
//! ### Contiguous keys
//!
//! Composition groups rows by *adjacent* equal keys only. Decomposition always
//! writes a parent's rows together; callers that reorder rows must keep them
//! together as well.
//!
//! ### Streaming
//!
//! [`GroupedRowsSplitter`] is an incremental tokenizer over a caller-owned
//! buffer; [`GroupedRows`](scanner::GroupedRows) drives it over any
//! [`Read`](std::io::Read). With the `io-csv` feature,
//! [`read_grouped_csv`](io::csv::read_grouped_csv) decodes and composes each
//! chunk as it arrives:
//!
//! ```rust
//! use csvgroup::io::csv::{GroupedCsvOptions, read_grouped_csv};
//! use csvgroup::testing::{Book, SAMPLE_BOOKS_CSV};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let opts = GroupedCsvOptions::default();
//! let books = read_grouped_csv::<Book, _>(SAMPLE_BOOKS_CSV.as_bytes(), &opts)
//!     .collect::<Result<Vec<_>>>()?;
//! assert_eq!(books.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `io-csv` - CSV adapters in [`io::csv`]
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - codecs for transparent file compression
//!
//! ## Module Overview
//!
//! - [`record`] - Record and group contracts
//! - [`engine`] - Decompose/compose engine
//! - [`splitter`] - Incremental grouped-row tokenizer
//! - [`scanner`] - Reader-driven iterator over grouped-row tokens
//! - [`io`] - CSV adapters and compression
//! - [`testing`] - Fixtures and assertions

pub mod engine;
pub mod io;
pub mod record;
pub mod scanner;
pub mod splitter;
pub mod testing;

pub use engine::{
    compose_grouped_records, compose_records, decompose_record, decompose_records,
    group_records_by_key,
};
pub use record::{DecomposedItem, Field, Group, NestedSlot, Record, ScalarSlot};
pub use scanner::GroupedRows;
pub use splitter::{GroupedRowsSplitter, Split};

#[cfg(feature = "io-csv")]
pub use io::csv::{
    GroupedCsvOptions, open_grouped_csv, read_grouped_csv, read_records_csv, write_records_csv,
};
