use anyhow::Result;
use csvgroup::{GroupedRows, GroupedRowsSplitter, Split};
use std::io::Read;

const SIX_ROWS: &str = "name,age\na,1\na,2\na,3\nb,4\nb,5\nb,6\n";

fn tokens(input: &[u8]) -> Result<Vec<String>> {
    GroupedRows::new(input)
        .map(|token| token.map(|t| String::from_utf8_lossy(&t).into_owned()))
        .collect()
}

/// Hands out one byte per `read` call.
struct Trickle<'a>(&'a [u8]);

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0.split_first() {
            Some((&b, rest)) if !buf.is_empty() => {
                buf[0] = b;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[test]
fn splits_runs_of_equal_keys() -> Result<()> {
    assert_eq!(
        tokens(SIX_ROWS.as_bytes())?,
        vec!["name,age\na,1\na,2\na,3", "name,age\nb,4\nb,5\nb,6"]
    );
    Ok(())
}

#[test]
fn strips_carriage_returns() -> Result<()> {
    let crlf = SIX_ROWS.replace('\n', "\r\n");
    assert_eq!(
        tokens(crlf.as_bytes())?,
        vec!["name,age\na,1\na,2\na,3", "name,age\nb,4\nb,5\nb,6"]
    );
    Ok(())
}

#[test]
fn trailing_row_without_terminator_is_its_own_token() -> Result<()> {
    assert_eq!(
        tokens(b"name,age\na,1\na,2\nb,3")?,
        vec!["name,age\na,1\na,2", "name,age\nb,3"]
    );
    Ok(())
}

#[test]
fn single_byte_reads_give_the_same_tokens() -> Result<()> {
    let trickled = GroupedRows::new(Trickle(SIX_ROWS.as_bytes()))
        .map(|token| token.map(|t| String::from_utf8_lossy(&t).into_owned()))
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(trickled, tokens(SIX_ROWS.as_bytes())?);
    Ok(())
}

#[test]
fn every_data_line_appears_exactly_once() -> Result<()> {
    let input = "k,v\nx,1\ny,2\ny,3\nx,4\nz,5\nz,6\nz,7\n";
    let all = tokens(input.as_bytes())?;
    assert_eq!(all.len(), 4);
    let lines: Vec<_> = all
        .iter()
        .flat_map(|t| t.lines().skip(1).map(str::to_string).collect::<Vec<_>>())
        .collect();
    let expected: Vec<_> = input.lines().skip(1).map(str::to_string).collect();
    assert_eq!(lines, expected);
    assert!(all.iter().all(|t| t.starts_with("k,v\n")));
    Ok(())
}

#[test]
fn custom_delimiter_selects_the_key_column() -> Result<()> {
    let input = "name;age\na;1\na;2\nb;3\n";
    let out = GroupedRows::new(input.as_bytes())
        .with_delimiter(b';')
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(out, vec![b"name;age\na;1\na;2".to_vec(), b"name;age\nb;3".to_vec()]);
    Ok(())
}

#[test]
fn header_only_input_emits_nothing() -> Result<()> {
    assert!(tokens(b"name,age\n")?.is_empty());
    assert!(tokens(b"")?.is_empty());
    Ok(())
}

#[test]
fn oversized_run_is_an_error() {
    let mut input = String::from("name,age\n");
    for i in 0..100 {
        input.push_str(&format!("same,{i}\n"));
    }
    let result = GroupedRows::new(input.as_bytes())
        .with_max_buffer_size(64)
        .collect::<Result<Vec<_>>>();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("maximum buffer size"), "{err}");
}

#[test]
fn final_run_may_fill_the_buffer_exactly() -> Result<()> {
    // The run "a,1\na,2\n" is exactly eight bytes.
    let out = GroupedRows::new(&b"h\na,1\na,2\n"[..])
        .with_max_buffer_size(8)
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(out, vec![b"h\na,1\na,2".to_vec()]);
    Ok(())
}

#[test]
fn one_byte_over_the_buffer_is_an_error() {
    let result = GroupedRows::new(&b"h\na,1\na,22\n"[..])
        .with_max_buffer_size(8)
        .collect::<Result<Vec<_>>>();
    assert!(result.is_err());
}

// ---------- raw split contract ----------

#[test]
fn header_is_consumed_without_a_token() {
    let mut splitter = GroupedRowsSplitter::new();
    assert_eq!(splitter.split(b"name,age\r\na,1\n", false), Split::Skip(10));
    assert_eq!(splitter.header(), Some(&b"name,age\n"[..]));
}

#[test]
fn partial_header_asks_for_more_data() {
    let mut splitter = GroupedRowsSplitter::new();
    assert_eq!(splitter.split(b"name,a", false), Split::NeedMore);
    assert_eq!(splitter.split(b"name,age\n", false), Split::Skip(9));
    assert_eq!(splitter.split(b"a,1\na,2\nb", false), Split::NeedMore);
    assert_eq!(
        splitter.split(b"a,1\na,2\nb,3\n", false),
        Split::Token {
            advance: 8,
            token: b"name,age\na,1\na,2".to_vec(),
        }
    );
}

#[test]
fn run_boundary_needs_the_next_key() {
    let mut splitter = GroupedRowsSplitter::new();
    assert_eq!(splitter.split(b"h,h\n", false), Split::Skip(4));
    // The next line has started, but its key column is not complete yet.
    assert_eq!(splitter.split(b"a,1\nb", false), Split::NeedMore);
    assert_eq!(
        splitter.split(b"a,1\nb", true),
        Split::Token {
            advance: 5,
            token: b"h,h\na,1\nb".to_vec(),
        }
    );
    assert_eq!(splitter.split(b"", true), Split::Done);
}

#[test]
fn line_without_delimiter_stays_in_the_run() {
    let mut splitter = GroupedRowsSplitter::new();
    assert_eq!(splitter.split(b"h,h\n", false), Split::Skip(4));
    assert_eq!(
        splitter.split(b"a,1\nnote\na,2\nb,3\n", false),
        Split::Token {
            advance: 13,
            token: b"h,h\na,1\nnote\na,2".to_vec(),
        }
    );
    assert_eq!(
        splitter.split(b"b,3\n", true),
        Split::Token {
            advance: 4,
            token: b"h,h\nb,3".to_vec(),
        }
    );
}

#[test]
fn growing_input_resumes_where_the_last_scan_stopped() {
    let input = b"h,h\na,1\na,2\nnote\na,3\nb,4\n";
    let mut splitter = GroupedRowsSplitter::new();
    assert_eq!(splitter.split(input, false), Split::Skip(4));
    let data = &input[4..];

    let mut emitted = None;
    for len in 1..=data.len() {
        match splitter.split(&data[..len], false) {
            Split::NeedMore => continue,
            other => {
                emitted = Some((len, other));
                break;
            }
        }
    }
    assert_eq!(
        emitted,
        Some((
            data.len() - 2,
            Split::Token {
                advance: data.len() - 4,
                token: b"h,h\na,1\na,2\nnote\na,3".to_vec(),
            }
        ))
    );
}
