//! Dense per-type component columns and type-erased access to them.
//!
//! This module implements [`Column<T>`], the dense, index-addressable
//! store holding every value of exactly one component type within one
//! cluster, and [`TypeErasedColumn`], the dynamically-typed interface the
//! rest of the engine uses to manage heterogeneous columns uniformly.
//!
//! # Storage model
//!
//! A column is a flat growable vector. Row `i` of every column in a
//! cluster corresponds to the `i`-th entity in that cluster's entity-id
//! list, so all columns of a cluster share one length at all times outside
//! of an in-progress mutation.
//!
//! # Core operations
//!
//! - **Append**: `push_back` writes a new row at the end.
//! - **Swap**: `swap` exchanges two rows in place. Removal of a row is
//!   expressed as swap-with-last followed by `pop_back`, which keeps the
//!   store dense and runs in `O(1)` regardless of length.
//! - **Deep copy**: `copy` produces an independent column of the same
//!   element type with identical contents.
//!
//! These operations preserve dense packing but do **not** preserve element
//! order.
//!
//! # Type erasure
//!
//! [`TypeErasedColumn`] allows columns to be stored behind trait objects
//! (`Box<dyn TypeErasedColumn>`). It provides:
//!
//! - length queries and the order-destroying mutation primitives,
//! - the element [`TypeId`] and human-readable element type name,
//! - downcasting hooks via `as_any` / `as_any_mut`.
//!
//! Downcasts back to `Column<T>` are not performed at orchestration call
//! sites; they live inside the component registry's per-type operation
//! table and the cluster's typed accessors, where a mismatch surfaces as a
//! [`TypeMismatchError`](crate::engine::error::TypeMismatchError) instead
//! of an invalid cast.

use std::any::{type_name, Any, TypeId};

use crate::engine::error::{ColumnError, PositionOutOfBoundsError};
use crate::engine::types::Index;


/// A type-erased interface over one dense component column.
///
/// Implementations must keep `length()` equal to the number of stored
/// rows and must only report the element type they actually store; the
/// registry relies on both to route row transfers between clusters.
pub trait TypeErasedColumn: Any {
    /// Returns the number of rows stored.
    fn length(&self) -> usize;

    /// Removes the last row. Does nothing on an empty column.
    fn pop_back(&mut self);

    /// Swaps the values at two row indices in place.
    ///
    /// ## Errors
    /// Returns [`ColumnError::Position`] if either index is out of range.
    fn swap(&mut self, left: Index, right: Index) -> Result<(), ColumnError>;

    /// Produces a new column of the same element type with identical
    /// contents.
    fn copy(&self) -> Box<dyn TypeErasedColumn>;

    /// Returns the `TypeId` of the element type stored by this column.
    fn element_type_id(&self) -> TypeId;

    /// Returns the human-readable name of the element type stored.
    fn element_type_name(&self) -> &'static str;

    /// Returns an immutable type-erased reference for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable type-erased reference for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A dense, index-addressable store of values of one component type.
///
/// ## Invariants
/// - Rows are packed contiguously from index 0 with no gaps.
/// - The owning cluster keeps this column's length equal to its entity
///   count at all times outside of an in-progress mutation.
pub struct Column<T> {
    values: Vec<T>,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> Column<T> {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows stored.
    #[inline]
    pub fn length(&self) -> usize {
        self.values.len()
    }

    /// Appends a value as the new last row.
    #[inline]
    pub fn push_back(&mut self, value: T) {
        self.values.push(value);
    }

    /// Returns a shared reference to the row at `index`, or `None` if the
    /// index is out of range.
    #[inline]
    pub fn at(&self, index: Index) -> Option<&T> {
        self.values.get(index as usize)
    }

    /// Returns a mutable reference to the row at `index`, or `None` if the
    /// index is out of range.
    #[inline]
    pub fn at_mut(&mut self, index: Index) -> Option<&mut T> {
        self.values.get_mut(index as usize)
    }

    /// Returns the stored rows as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Returns a raw pointer to the first row.
    ///
    /// Used by view caches; the pointer is valid until the column's row
    /// count next changes.
    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.values.as_mut_ptr()
    }
}

impl<T: Clone + 'static> TypeErasedColumn for Column<T> {
    fn length(&self) -> usize {
        self.values.len()
    }

    fn pop_back(&mut self) {
        self.values.pop();
    }

    fn swap(&mut self, left: Index, right: Index) -> Result<(), ColumnError> {
        let length = self.values.len();
        for index in [left, right] {
            if index as usize >= length {
                return Err(ColumnError::Position(PositionOutOfBoundsError {
                    index,
                    length,
                }));
            }
        }
        self.values.swap(left as usize, right as usize);
        Ok(())
    }

    fn copy(&self) -> Box<dyn TypeErasedColumn> {
        Box::new(Column {
            values: self.values.clone(),
        })
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
