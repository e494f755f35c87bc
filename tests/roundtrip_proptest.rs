//! Property-based tests for the decompose/compose laws.
//!
//! Generated books have distinct adjacent keys at every level and never use
//! the empty value of a slot as real data, which are the preconditions for a
//! lossless round trip.

use csvgroup::testing::*;
use csvgroup::{compose_records, decompose_record, decompose_records};
use proptest::prelude::*;

fn author_strategy() -> impl Strategy<Value = (Option<u32>, Vec<String>)> {
    (
        proptest::option::of(0u32..1000),
        proptest::collection::vec("[a-z]{1,6}", 0..4),
    )
}

fn book_strategy() -> impl Strategy<Value = Book> {
    (
        "[a-z]{0,5}",
        proptest::collection::vec(any::<u32>(), 0..5),
        proptest::collection::vec(author_strategy(), 0..4),
    )
        .prop_map(|(color, ages, authors)| Book {
            color,
            ages,
            authors: authors
                .into_iter()
                .enumerate()
                .map(|(i, (score, awards))| Author {
                    name: format!("author {i}"),
                    score,
                    awards,
                    ..Author::default()
                })
                .collect(),
            ..Book::default()
        })
}

fn books_strategy() -> impl Strategy<Value = Vec<Book>> {
    proptest::collection::vec(book_strategy(), 0..6).prop_map(|books| {
        books
            .into_iter()
            .enumerate()
            .map(|(i, book)| Book {
                name: format!("book {i}"),
                ..book
            })
            .collect()
    })
}

fn expected_rows(book: &Book) -> usize {
    let author_rows: usize = book.authors.iter().map(|a| a.awards.len().max(1)).sum();
    author_rows.max(book.ages.len()).max(1)
}

proptest! {
    #[test]
    fn compose_inverts_decompose(books in books_strategy()) {
        let rows = decompose_records(books.clone()).unwrap();
        assert_key_runs_contiguous(&rows);
        prop_assert_eq!(compose_records(rows).unwrap(), books);
    }

    #[test]
    fn row_count_matches_longest_group(book in book_strategy()) {
        let expected = expected_rows(&book);
        prop_assert_eq!(decompose_record(book).unwrap().len(), expected);
    }

    #[test]
    fn only_first_row_carries_parent_fields(book in book_strategy()) {
        let color = book.color.clone();
        let rows = decompose_record(book).unwrap();
        prop_assert_eq!(&rows[0].color, &color);
        prop_assert!(rows[1..].iter().all(|r| r.color.is_empty()));
    }
}

#[cfg(feature = "io-csv")]
mod csv_roundtrip {
    use super::*;
    use csvgroup::io::csv::{GroupedCsvOptions, read_grouped_csv, to_csv_bytes};

    proptest! {
        #[test]
        fn streamed_csv_rebuilds_books(books in books_strategy()) {
            let opts = GroupedCsvOptions::default();
            let rows = decompose_records(books.clone()).unwrap();
            let bytes = to_csv_bytes(&rows, &opts).unwrap();
            let read = read_grouped_csv::<Book, _>(bytes.as_slice(), &opts)
                .collect::<anyhow::Result<Vec<_>>>()
                .unwrap();
            prop_assert_eq!(read, books);
        }
    }
}
