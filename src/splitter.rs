//! Incremental splitter that carves delimited text into per-key runs of rows.
//!
//! [`GroupedRowsSplitter`] follows the usual refill/extend/finalize contract of
//! an incremental tokenizer: it is handed the bytes buffered so far plus a flag
//! saying whether more can ever arrive, and answers with a [`Split`] telling the
//! caller how many bytes to consume and whether a token was produced.
//!
//! The first line is captured as the header and prefixed onto every token.
//! A token then holds every complete row whose leading column (the text before
//! the first delimiter) equals the one of the row that started it:
//!
//! ```text
//! name,age            token 1:  name,age      token 2:  name,age
//! a,1                           a,1                     b,3
//! a,2                           a,2
//! b,3
//! ```
//!
//! `\r\n` line endings are normalized to `\n` in the header and in tokens. Rows
//! inside a token are separated by `\n`; the last row has no terminator.
//!
//! Keys are compared byte for byte on the raw text, so the splitter knows
//! nothing about quoting. A line without any delimiter is treated as part of the
//! current run.

use tracing::trace;

/// Outcome of one [`GroupedRowsSplitter::split`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    /// Nothing can be decided yet; call again with more data.
    NeedMore,
    /// Consume this many bytes without emitting anything (the header line).
    Skip(usize),
    /// Consume `advance` bytes and emit `token`.
    Token { advance: usize, token: Vec<u8> },
    /// End of input and nothing left to emit.
    Done,
}

/// Stateful grouped-row tokenizer. One instance per input stream.
#[derive(Debug, Clone)]
pub struct GroupedRowsSplitter {
    delimiter: u8,
    header: Option<Vec<u8>>,
    prev: Option<Vec<u8>>,
    /// Offset of the first line not yet compared against `prev`.
    scanned: usize,
}

impl Default for GroupedRowsSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupedRowsSplitter {
    /// A splitter for comma-delimited rows.
    pub fn new() -> Self {
        Self::with_delimiter(b',')
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            header: None,
            prev: None,
            scanned: 0,
        }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// The captured header line, including its `\n`.
    pub fn header(&self) -> Option<&[u8]> {
        self.header.as_deref()
    }

    /// Inspect `data` and decide what to consume and emit.
    ///
    /// `data` must start where the previous call's consumption ended, and after
    /// [`Split::NeedMore`] it must extend the bytes passed before: scanning
    /// resumes where the last call stopped. With `at_eof` set, whatever remains
    /// is emitted as the final token.
    pub fn split(&mut self, data: &[u8], at_eof: bool) -> Split {
        if at_eof && data.is_empty() {
            return Split::Done;
        }

        if self.header.is_none() {
            match find(data, b'\n') {
                Some(end) => {
                    let mut header = drop_cr(&data[..end]).to_vec();
                    header.push(b'\n');
                    trace!(len = header.len(), "captured header");
                    self.header = Some(header);
                    return Split::Skip(end + 1);
                }
                None if at_eof => return self.finish(data),
                None => return Split::NeedMore,
            }
        }

        if self.prev.is_none() {
            let first = find(data, b'\n').map_or(data, |i| &data[..i]);
            if let Some(end) = find(first, self.delimiter) {
                self.prev = Some(drop_cr(&first[..end]).to_vec());
            }
        }

        let mut pos = self.scanned.min(data.len());
        while let Some(end) = find(&data[pos..], b'\n').map(|i| pos + i) {
            let next = &data[end + 1..];
            let line = find(next, b'\n').map_or(next, |i| &next[..i]);
            match find(line, self.delimiter) {
                Some(delim) => {
                    let key = drop_cr(&line[..delim]);
                    if self.prev.as_deref() != Some(key) {
                        self.prev = Some(key.to_vec());
                        self.scanned = 0;
                        let token = self.token(&data[..end]);
                        trace!(advance = end + 1, len = token.len(), "emitting grouped rows");
                        return Split::Token {
                            advance: end + 1,
                            token,
                        };
                    }
                }
                // The key of the next line is not complete yet.
                None if line.len() == next.len() => break,
                None => {}
            }
            pos = end + 1;
        }
        self.scanned = pos;

        if at_eof {
            return self.finish(data);
        }
        Split::NeedMore
    }

    fn finish(&mut self, data: &[u8]) -> Split {
        self.scanned = 0;
        let rows = data.strip_suffix(b"\n").unwrap_or(data);
        let token = self.token(rows);
        trace!(advance = data.len(), len = token.len(), "emitting final rows");
        Split::Token {
            advance: data.len(),
            token,
        }
    }

    fn token(&self, rows: &[u8]) -> Vec<u8> {
        let header = self.header.as_deref().unwrap_or_default();
        let mut token = Vec::with_capacity(header.len() + rows.len());
        token.extend_from_slice(header);
        for (i, &b) in rows.iter().enumerate() {
            if b == b'\r' && rows.get(i + 1).is_none_or(|&next| next == b'\n') {
                continue;
            }
            token.push(b);
        }
        token
    }
}

fn find(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

fn drop_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
