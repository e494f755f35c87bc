//! CSV adapters around the decompose/compose engine.
//!
//! This module provides:
//! - **Typed row I/O** with Serde: [`read_csv_vec`] / [`write_csv_vec`] for files,
//!   [`from_csv_reader`] / [`to_csv_writer`] for arbitrary streams
//! - **Record I/O**: [`write_records_csv`] decomposes nested records before
//!   writing, [`read_records_csv`] composes them back after reading
//! - **Streaming**: [`read_grouped_csv`] / [`open_grouped_csv`] yield one composed
//!   record per run of same-key rows without loading the whole input
//!
//! # Design notes
//! - All typed I/O is Serde-backed (`DeserializeOwned`/`Serialize`) and always
//!   uses a header row; the first column must be the record key for streaming.
//! - Nested slots are written as ordinary columns of the flat row type; the
//!   [`Field`](crate::record::Field) accessors map them to child records.
//! - File paths go through [`auto_detect_reader`] / [`auto_detect_writer`], so
//!   `.gz`, `.zst`, `.bz2` and `.xz` files are handled transparently.

use crate::engine::{compose_records, decompose_records};
use crate::io::compression::{auto_detect_reader, auto_detect_writer};
use crate::record::Record;
use crate::scanner::{DEFAULT_MAX_BUFFER_SIZE, GroupedRows};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, create_dir_all};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Options shared by the CSV adapters.
///
/// Deserializable from any Serde format; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupedCsvOptions {
    /// Field delimiter, also used by the splitter to find the key column.
    pub delimiter: u8,
    /// Upper bound for one buffered run of rows when streaming.
    pub max_buffer_size: usize,
}

impl Default for GroupedCsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl GroupedCsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    fn reader<R: Read>(&self, reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(reader)
    }

    fn writer<W: Write>(&self, writer: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_writer(writer)
    }
}

/// Deserialize every row of a headed CSV stream.
///
/// # Errors
/// Returns an error if any row fails to deserialize into `T`; the message
/// names the 1-based row number.
pub fn from_csv_reader<T: DeserializeOwned, R: Read>(
    reader: R,
    opts: &GroupedCsvOptions,
) -> Result<Vec<T>> {
    let mut rdr = opts.reader(reader);
    let mut out = Vec::<T>::new();
    for (i, rec) in rdr.deserialize::<T>().enumerate() {
        let v = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        out.push(v);
    }
    Ok(out)
}

/// Serialize `rows` behind a header row. Returns the number of rows written.
///
/// # Errors
/// Returns an error if any row fails to serialize or the writer fails.
pub fn to_csv_writer<T: Serialize, W: Write>(
    writer: W,
    opts: &GroupedCsvOptions,
    rows: &[T],
) -> Result<usize> {
    let mut wtr = opts.writer(writer);
    for (i, row) in rows.iter().enumerate() {
        wtr.serialize(row)
            .with_context(|| format!("serialize CSV row #{}", i + 1))?;
    }
    wtr.flush().context("flush CSV writer")?;
    Ok(rows.len())
}

/// Serialize `rows` into an in-memory CSV document.
pub fn to_csv_bytes<T: Serialize>(rows: &[T], opts: &GroupedCsvOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(rows.len().saturating_mul(64));
    to_csv_writer(&mut buf, opts, rows)?;
    Ok(buf)
}

/// Deserialize an in-memory CSV document.
pub fn from_csv_bytes<T: DeserializeOwned>(bytes: &[u8], opts: &GroupedCsvOptions) -> Result<Vec<T>> {
    from_csv_reader(bytes, opts)
}

/// Read a CSV file into a typed `Vec<T>`.
///
/// **Compression**: detected from the extension or the leading magic bytes.
///
/// # Errors
/// Returns an error if the file cannot be opened or any row fails to
/// deserialize.
pub fn read_csv_vec<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    opts: &GroupedCsvOptions,
) -> Result<Vec<T>> {
    let path = path.as_ref();
    let rdr = open(path)?;
    from_csv_reader(rdr, opts).with_context(|| format!("read {}", path.display()))
}

/// Write a typed slice to a CSV file, creating parent directories as needed.
///
/// **Compression**: chosen from the file extension (e.g. `.csv.gz`).
///
/// # Returns
/// The number of rows written.
pub fn write_csv_vec<T: Serialize>(
    path: impl AsRef<Path>,
    opts: &GroupedCsvOptions,
    rows: &[T],
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    to_csv_writer(w, opts, rows).with_context(|| format!("write {}", path.display()))
}

/// Decompose `records` and write the flat rows to a CSV file.
///
/// # Returns
/// The number of rows written, which is at least the number of records.
pub fn write_records_csv<R: Record + Serialize>(
    path: impl AsRef<Path>,
    opts: &GroupedCsvOptions,
    records: impl IntoIterator<Item = R>,
) -> Result<usize> {
    let rows = decompose_records(records)?;
    let written = write_csv_vec(&path, opts, &rows)?;
    debug!(rows = written, path = %path.as_ref().display(), "wrote decomposed records");
    Ok(written)
}

/// Read a CSV file of flat rows and compose them into records.
///
/// Rows of one record must be contiguous, as [`write_records_csv`] writes them.
pub fn read_records_csv<R: Record + DeserializeOwned>(
    path: impl AsRef<Path>,
    opts: &GroupedCsvOptions,
) -> Result<Vec<R>> {
    let rows: Vec<R> = read_csv_vec(&path, opts)?;
    let row_count = rows.len();
    let records = compose_records(rows)?;
    debug!(
        rows = row_count,
        records = records.len(),
        path = %path.as_ref().display(),
        "read composed records"
    );
    Ok(records)
}

/// Stream composed records from a grouped CSV source.
///
/// The input is split into runs of rows sharing their first column, each run
/// is decoded on its own and composed, so only one run is held in memory at a
/// time. Every source record is yielded once, in input order.
pub fn read_grouped_csv<R, Rd>(reader: Rd, opts: &GroupedCsvOptions) -> GroupedCsvRecords<Rd, R>
where
    R: Record + DeserializeOwned,
    Rd: Read,
{
    GroupedCsvRecords {
        rows: GroupedRows::new(reader)
            .with_delimiter(opts.delimiter)
            .with_max_buffer_size(opts.max_buffer_size),
        opts: opts.clone(),
        pending: VecDeque::new(),
    }
}

/// [`read_grouped_csv`] over a (possibly compressed) file.
pub fn open_grouped_csv<R: Record + DeserializeOwned>(
    path: impl AsRef<Path>,
    opts: &GroupedCsvOptions,
) -> Result<GroupedCsvRecords<Box<dyn Read>, R>> {
    Ok(read_grouped_csv(open(path.as_ref())?, opts))
}

/// Iterator returned by [`read_grouped_csv`].
///
/// The splitter compares raw text, so one run can hold several records whose
/// quoted keys share a prefix (`"x,y"` and `"x,z"`). Each run is therefore
/// composed by key like [`read_records_csv`] does, and the records are handed
/// out one at a time.
pub struct GroupedCsvRecords<Rd, R> {
    rows: GroupedRows<Rd>,
    opts: GroupedCsvOptions,
    pending: VecDeque<R>,
}

impl<Rd: Read, R: Record + DeserializeOwned> GroupedCsvRecords<Rd, R> {
    fn compose_token(&self, token: &[u8]) -> Result<Vec<R>> {
        let rows: Vec<R> = from_csv_bytes(token, &self.opts)?;
        compose_records(rows)
    }
}

impl<Rd: Read, R: Record + DeserializeOwned> Iterator for GroupedCsvRecords<Rd, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            let token = match self.rows.next()? {
                Ok(token) => token,
                Err(e) => return Some(Err(e)),
            };
            match self.compose_token(&token) {
                Ok(records) => self.pending.extend(records),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    auto_detect_reader(f, path).with_context(|| format!("setup decompression for {}", path.display()))
}
