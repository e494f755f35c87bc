//! Pull-based driver that feeds a byte source through a [`GroupedRowsSplitter`].
//!
//! [`GroupedRows`] owns a growable buffer over any [`Read`]. Each call to
//! `next` asks the splitter for a token, refilling the buffer whenever the
//! splitter needs more data, and yields the token bytes (header + one run of
//! same-key rows).
//!
//! The buffer is bounded by `max_buffer_size`: a single run of rows larger than
//! that is reported as an error instead of being buffered without limit. Since
//! a run only ends once the next row's key has been read, that key counts
//! towards the bound too; the final run may fill the buffer exactly.
//!
//! ```
//! use csvgroup::scanner::GroupedRows;
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = "name,age\na,1\na,2\nb,3\n";
//! let tokens = GroupedRows::new(input.as_bytes()).collect::<anyhow::Result<Vec<_>>>()?;
//! assert_eq!(tokens, vec![b"name,age\na,1\na,2".to_vec(), b"name,age\nb,3".to_vec()]);
//! # Ok(())
//! # }
//! ```

use crate::splitter::{GroupedRowsSplitter, Split};
use anyhow::{Context, Result, bail};
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Default upper bound for buffered, not yet emitted bytes (1 MiB).
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// Iterator over grouped-row tokens read from `R`.
pub struct GroupedRows<R> {
    reader: R,
    splitter: GroupedRowsSplitter,
    buf: Vec<u8>,
    start: usize,
    max_buffer_size: usize,
    eof: bool,
    done: bool,
}

impl<R: Read> GroupedRows<R> {
    /// Scan comma-delimited rows from `reader`.
    pub fn new(reader: R) -> Self {
        Self::with_splitter(reader, GroupedRowsSplitter::new())
    }

    pub fn with_splitter(reader: R, splitter: GroupedRowsSplitter) -> Self {
        Self {
            reader,
            splitter,
            buf: Vec::new(),
            start: 0,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            eof: false,
            done: false,
        }
    }

    /// Use `delimiter` to find each row's key column.
    pub fn with_delimiter(self, delimiter: u8) -> Self {
        Self {
            splitter: GroupedRowsSplitter::with_delimiter(delimiter),
            ..self
        }
    }

    /// Bound the buffer; a run of rows that does not fit is an error.
    pub fn with_max_buffer_size(self, max_buffer_size: usize) -> Self {
        Self {
            max_buffer_size: max_buffer_size.max(1),
            ..self
        }
    }

    /// The header line, once it has been read.
    pub fn header(&self) -> Option<&[u8]> {
        self.splitter.header()
    }

    fn fill(&mut self) -> Result<()> {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
        let filled = self.buf.len();
        if filled >= self.max_buffer_size {
            // A full buffer is fine as long as nothing follows it.
            let mut extra = [0u8; 1];
            if read_retrying(&mut self.reader, &mut extra)? == 0 {
                debug!(buffered = filled, "reached end of grouped rows input");
                self.eof = true;
                return Ok(());
            }
            bail!(
                "grouped rows exceed the maximum buffer size of {} bytes",
                self.max_buffer_size
            );
        }

        let want = (self.max_buffer_size - filled).min(READ_CHUNK);
        self.buf.resize(filled + want, 0);
        let read = match read_retrying(&mut self.reader, &mut self.buf[filled..]) {
            Ok(n) => n,
            Err(e) => {
                self.buf.truncate(filled);
                return Err(e);
            }
        };
        self.buf.truncate(filled + read);

        if read == 0 {
            debug!(buffered = filled, "reached end of grouped rows input");
            self.eof = true;
        }
        Ok(())
    }
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("read grouped rows"),
        }
    }
}

impl<R: Read> Iterator for GroupedRows<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.splitter.split(&self.buf[self.start..], self.eof) {
                Split::Token { advance, token } => {
                    self.start += advance;
                    return Some(Ok(token));
                }
                Split::Skip(n) => self.start += n,
                Split::NeedMore if !self.eof => {
                    if let Err(e) = self.fill() {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
                Split::NeedMore | Split::Done => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
