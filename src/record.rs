//! Record and group contracts consumed by the decompose/compose engine.
//!
//! A [`Record`] is any entity that can be flattened into rows: it exposes a
//! grouping key, an ordered list of [`Group`]s (its nested one-to-many slots),
//! and a way to produce an empty sibling that carries only the key.
//!
//! Each group is described by a [`Field`], a table of plain function pointers
//! that address one slot twice over:
//!
//! - the **single value** (`take_value` / `set_value` / `is_empty`), which is the
//!   column a flat row carries for this slot, and
//! - the **list** (`take_list` / `set_list`), which is the nested collection on the
//!   source record.
//!
//! Whether the children of a slot are plain values or records in their own right
//! is decided once, when the group table is written, by wrapping the field in
//! [`Group::Scalar`] or [`Group::Nested`].
//!
//! # Example
//!
//! ```
//! use csvgroup::record::{Field, Group, Record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Order {
//!     id: u32,
//!     sku: Option<String>,
//!     skus: Vec<String>,
//! }
//!
//! static ORDER_SKUS: Field<Order, String> = Field {
//!     name: "skus",
//!     take_value: |order| order.sku.take().unwrap_or_default(),
//!     set_value: |order, sku| order.sku = Some(sku),
//!     is_empty: |order| order.sku.is_none(),
//!     take_list: |order| std::mem::take(&mut order.skus),
//!     set_list: |order, skus| order.skus = skus,
//! };
//!
//! static ORDER_GROUPS: [Group<Order>; 1] = [Group::Scalar(&ORDER_SKUS)];
//!
//! impl Record for Order {
//!     type Key = u32;
//!
//!     fn key(&self) -> u32 {
//!         self.id
//!     }
//!
//!     fn groups() -> &'static [Group<Self>] {
//!         &ORDER_GROUPS
//!     }
//!
//!     fn clone_empty(&self) -> Self {
//!         Order { id: self.id, ..Order::default() }
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let order = Order { id: 7, skus: vec!["a".into(), "b".into()], ..Order::default() };
//! let rows = csvgroup::decompose_record(order)?;
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].sku.as_deref(), Some("b"));
//! # Ok(())
//! # }
//! ```

use crate::engine::{compose_grouped_records, decompose_records, group_records_by_key};
use anyhow::Result;

/// An entity that participates in decomposition and composition.
///
/// Implementations are expected to be plain data: the engine moves values in
/// and out through the [`Field`] accessors and never inspects anything else.
pub trait Record: Sized + 'static {
    /// Grouping key. Rows are considered part of the same parent while
    /// consecutive keys compare equal, so composite keys (tuples, structs with a
    /// derived `PartialEq`) compare field by field.
    type Key: PartialEq;

    fn key(&self) -> Self::Key;

    /// The nested slots of this record type, in decomposition order.
    fn groups() -> &'static [Group<Self>];

    /// A sibling of the same type holding only the key. Used for every row
    /// after the first when a record decomposes into several rows.
    fn clone_empty(&self) -> Self;
}

/// One nested slot on a record of type `R`.
///
/// The variant decides how the slot's children are treated. `Scalar` children
/// are distributed one per row as they are; `Nested` children are records that
/// are flattened first, and whose rows are then distributed one per row.
pub enum Group<R: 'static> {
    Scalar(&'static dyn ScalarSlot<R>),
    Nested(&'static dyn NestedSlot<R>),
}

impl<R: 'static> Group<R> {
    pub fn name(&self) -> &'static str {
        match self {
            Group::Scalar(slot) => slot.name(),
            Group::Nested(slot) => slot.name(),
        }
    }
}

impl<R: 'static> Clone for Group<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: 'static> Copy for Group<R> {}

/// Accessor table for one slot of `R` whose elements have type `V`.
///
/// The single-value and list accessors must address the same slot. Accessors
/// move values out (`take_*`) instead of cloning them; the engine reads every
/// value exactly once.
pub struct Field<R, V> {
    /// Slot name, used in error context and logs.
    pub name: &'static str,
    /// Move the row's single value out of the record.
    pub take_value: fn(&mut R) -> V,
    /// Store one value as the row's single value.
    pub set_value: fn(&mut R, V),
    /// Whether the row carries no value for this slot (a padding row).
    pub is_empty: fn(&R) -> bool,
    /// Move the full child list out of the record.
    pub take_list: fn(&mut R) -> Vec<V>,
    /// Store the full child list on the record.
    pub set_list: fn(&mut R, Vec<V>),
}

impl<R, V> Field<R, V> {
    /// Values of every row that carries one, in row order.
    fn take_present(&self, rows: &mut [R]) -> Vec<V> {
        let mut values = Vec::with_capacity(rows.len());
        for row in rows.iter_mut() {
            if !(self.is_empty)(row) {
                values.push((self.take_value)(row));
            }
        }
        values
    }
}

/// A slot whose children are plain values.
pub trait ScalarSlot<R>: Sync {
    fn name(&self) -> &'static str;

    /// Move the slot's list out of `record` as a column to spread over rows.
    fn decompose(&self, record: &mut R) -> Box<dyn DecomposedItem<R>>;

    /// Gather the non-empty values of `rows` into the list of `rows[0]`.
    fn compose(&self, rows: &mut [R]);
}

/// A slot whose children are records themselves.
///
/// [`Field`] implements this for any child type that is a [`Record`]. Custom
/// implementations can be used for slots whose children need extra work (and
/// may fail) on the way in or out; errors abort the whole decomposition or
/// composition.
pub trait NestedSlot<R>: Sync {
    fn name(&self) -> &'static str;

    /// Flatten every child of `record` and return the concatenated child rows.
    fn decompose(&self, record: &mut R) -> Result<Box<dyn DecomposedItem<R>>>;

    /// Rebuild the children carried by `rows` and store them on `rows[0]`.
    fn compose(&self, rows: &mut [R]) -> Result<()>;
}

impl<R: 'static, V: 'static> ScalarSlot<R> for Field<R, V> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decompose(&self, record: &mut R) -> Box<dyn DecomposedItem<R>> {
        decomposed(self.set_value, (self.take_list)(record))
    }

    fn compose(&self, rows: &mut [R]) {
        let values = self.take_present(rows);
        if let Some(base) = rows.first_mut() {
            (self.set_list)(base, values);
        }
    }
}

impl<R: 'static, C: Record> NestedSlot<R> for Field<R, C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decompose(&self, record: &mut R) -> Result<Box<dyn DecomposedItem<R>>> {
        let children = (self.take_list)(record);
        let rows = decompose_records(children)?;
        Ok(decomposed(self.set_value, rows))
    }

    fn compose(&self, rows: &mut [R]) -> Result<()> {
        let children = self.take_present(rows);
        let mut composed = Vec::new();
        for run in group_records_by_key(children) {
            if let Some(child) = compose_grouped_records(run)? {
                composed.push(child);
            }
        }
        if let Some(base) = rows.first_mut() {
            (self.set_list)(base, composed);
        }
        Ok(())
    }
}

/// The flat values one group contributes across a parent's rows.
///
/// Values are handed out in order, one per row, until the item runs dry.
#[allow(clippy::len_without_is_empty)]
pub trait DecomposedItem<R> {
    /// Number of values, i.e. the number of rows this group needs.
    fn len(&self) -> usize;

    /// Place the next value on `row`. Leaves `row` untouched once exhausted.
    fn fill(&mut self, row: &mut R);
}

/// Wrap `values` as a [`DecomposedItem`] that stores each one with `set`.
pub fn decomposed<R: 'static, V: 'static>(
    set: fn(&mut R, V),
    values: Vec<V>,
) -> Box<dyn DecomposedItem<R>> {
    Box::new(Values {
        len: values.len(),
        set,
        values: values.into_iter(),
    })
}

struct Values<R, V> {
    len: usize,
    set: fn(&mut R, V),
    values: std::vec::IntoIter<V>,
}

impl<R, V> DecomposedItem<R> for Values<R, V> {
    fn len(&self) -> usize {
        self.len
    }

    fn fill(&mut self, row: &mut R) {
        if let Some(value) = self.values.next() {
            (self.set)(row, value);
        }
    }
}
