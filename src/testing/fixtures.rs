//! Sample nested records for tests and examples.
//!
//! [`Book`] is the flat CSV row type. Besides its own columns it carries one
//! column per group slot: `age` for the scalar `ages` group, and the
//! `author.*` columns for the nested `authors` group. The `authors` accessors
//! assemble an [`Author`] from those columns and spread one back over them.
//!
//! [`Author`] is never written on its own; its `award` field is the single
//! value of its scalar `awards` group, which ends up in the `author.award`
//! column.

use crate::record::{Field, Group, Record};
use serde::{Deserialize, Serialize};
use std::mem::take;

/// A book with a list of ages and a list of authors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    pub color: String,
    pub age: Option<u32>,
    #[serde(rename = "author.name")]
    pub author_name: String,
    #[serde(rename = "author.score")]
    pub author_score: Option<u32>,
    #[serde(rename = "author.award")]
    pub author_award: String,
    #[serde(skip)]
    pub ages: Vec<u32>,
    #[serde(skip)]
    pub authors: Vec<Author>,
}

/// An author of a [`Book`], keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub score: Option<u32>,
    pub award: String,
    pub awards: Vec<String>,
}

impl Author {
    pub fn new(name: &str, score: u32) -> Self {
        Self {
            name: name.to_string(),
            score: Some(score),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_awards(mut self, awards: &[&str]) -> Self {
        self.awards = awards.iter().map(|a| (*a).to_string()).collect();
        self
    }
}

pub static BOOK_AUTHORS: Field<Book, Author> = Field {
    name: "authors",
    take_value: |book| Author {
        name: take(&mut book.author_name),
        score: book.author_score.take(),
        award: take(&mut book.author_award),
        awards: Vec::new(),
    },
    set_value: |book, author| {
        book.author_name = author.name;
        book.author_score = author.score;
        book.author_award = author.award;
    },
    is_empty: |book| book.author_name.is_empty(),
    take_list: |book| take(&mut book.authors),
    set_list: |book, authors| book.authors = authors,
};

pub static BOOK_AGES: Field<Book, u32> = Field {
    name: "ages",
    take_value: |book| book.age.take().unwrap_or_default(),
    set_value: |book, age| book.age = Some(age),
    is_empty: |book| book.age.is_none(),
    take_list: |book| take(&mut book.ages),
    set_list: |book, ages| book.ages = ages,
};

static BOOK_GROUPS: [Group<Book>; 2] = [Group::Nested(&BOOK_AUTHORS), Group::Scalar(&BOOK_AGES)];

impl Record for Book {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn groups() -> &'static [Group<Self>] {
        &BOOK_GROUPS
    }

    fn clone_empty(&self) -> Self {
        Self {
            name: self.name.clone(),
            ..Self::default()
        }
    }
}

pub static AUTHOR_AWARDS: Field<Author, String> = Field {
    name: "awards",
    take_value: |author| take(&mut author.award),
    set_value: |author, award| author.award = award,
    is_empty: |author| author.award.is_empty(),
    take_list: |author| take(&mut author.awards),
    set_list: |author, awards| author.awards = awards,
};

static AUTHOR_GROUPS: [Group<Author>; 1] = [Group::Scalar(&AUTHOR_AWARDS)];

impl Record for Author {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn groups() -> &'static [Group<Self>] {
        &AUTHOR_GROUPS
    }

    fn clone_empty(&self) -> Self {
        Self {
            name: self.name.clone(),
            ..Self::default()
        }
    }
}

/// Two books with three ages and two authors each; one author has awards.
///
/// # Example
///
/// ```
/// use csvgroup::testing::sample_books;
///
/// let books = sample_books();
/// assert_eq!(books.len(), 2);
/// assert_eq!(books[0].authors[0].awards.len(), 2);
/// ```
#[must_use]
pub fn sample_books() -> Vec<Book> {
    vec![
        Book {
            name: "book a".into(),
            color: "white".into(),
            ages: vec![1, 2, 10],
            authors: vec![
                Author::new("ali", 3).with_awards(&["hugo", "nebula"]),
                Author::new("reza", 4),
            ],
            ..Book::default()
        },
        Book {
            name: "book b".into(),
            color: "red".into(),
            ages: vec![2, 4, 6],
            authors: vec![Author::new("John", 5), Author::new("Jessy", 6)],
            ..Book::default()
        },
    ]
}

/// The CSV document [`sample_books`] decomposes into.
pub const SAMPLE_BOOKS_CSV: &str = "\
name,color,age,author.name,author.score,author.award
book a,white,1,ali,3,hugo
book a,,2,ali,,nebula
book a,,10,reza,4,
book b,red,2,John,5,
book b,,4,Jessy,6,
book b,,6,,,
";
