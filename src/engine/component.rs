//! # Component Registry
//!
//! This module provides a global registry that assigns stable
//! `ComponentID` values to Rust component types and exposes the type-erased
//! operation table used for cluster column maintenance.
//!
//! ## Purpose
//! The registry decouples component type information (`TypeId`, name, size,
//! alignment) from runtime storage, enabling clusters to own heterogeneous
//! component columns behind [`TypeErasedColumn`] and to move rows between
//! clusters without knowing element types at the call site.
//!
//! ## Design
//! - A component type is assigned a compact `ComponentID` in
//!   `[0, MAX_COMPONENT_COUNT)` the first time it is referenced anywhere in
//!   the process; ids are never reused and never removed.
//! - At the same moment, a per-id [`ComponentOps`] entry is installed:
//!   a factory producing an empty column of that type, a carry operation
//!   moving one row between two columns, and a copy operation cloning one
//!   row between two columns.
//! - Renaming via [`set_component_name`] affects diagnostics only.
//!
//! ## Invariants
//! - `ComponentID` values are unique and stable for the lifetime of the
//!   process.
//! - A registered component always has a corresponding operation entry.
//! - The operation table is never queried for an id that was not issued by
//!   this registry; every id reaching it came out of [`component_id_of`].
//!
//! ## Concurrency
//! The registry is protected by `RwLock` for concurrent reads and
//! serialized writes. Registration takes the write lock once per type.

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    mem::{align_of, size_of},
    sync::{OnceLock, RwLock},
};

use crate::engine::error::{ColumnError, PositionOutOfBoundsError, TypeMismatchError};
use crate::engine::storage::{Column, TypeErasedColumn};
use crate::engine::types::{ComponentID, Index, MAX_COMPONENT_COUNT};


/// Per-component-type operation table entry.
///
/// Holds the monomorphized functions used to manage columns of one
/// component type through the type-erased interface. The downcast from
/// erased to concrete column form happens inside these functions, never at
/// orchestration call sites.
#[derive(Clone, Copy)]
pub struct ComponentOps {
    /// Constructs a new, empty column for this component type.
    pub create: fn() -> Box<dyn TypeErasedColumn>,

    /// Moves the row at an index out of one column and appends it to
    /// another column of the same type.
    pub carry: fn(Index, &mut dyn TypeErasedColumn, &mut dyn TypeErasedColumn) -> Result<(), ColumnError>,

    /// Clones the row at an index from one column into another column of
    /// the same type without mutating the source.
    pub copy: fn(Index, &dyn TypeErasedColumn, &mut dyn TypeErasedColumn) -> Result<(), ColumnError>,
}

/// Global table of component operations indexed by `ComponentID`.
///
/// ## Invariants
/// - `ops[id]` is `Some` if and only if component `id` is registered.
/// - The table length is always `MAX_COMPONENT_COUNT`.
static COMPONENT_OPS: OnceLock<RwLock<Vec<Option<ComponentOps>>>> = OnceLock::new();

fn component_ops() -> &'static RwLock<Vec<Option<ComponentOps>>> {
    COMPONENT_OPS.get_or_init(|| RwLock::new(vec![None; MAX_COMPONENT_COUNT]))
}

fn new_column<T: Clone + 'static>() -> Box<dyn TypeErasedColumn> {
    Box::new(Column::<T>::default())
}

/// Moves the row at `index` out of `old` and appends it to `destination`.
///
/// The source row is considered vacated afterwards; the caller is expected
/// to drop it via swap-remove once every shared column has been carried.
fn carry_column<T: Clone + 'static>(
    index: Index,
    old: &mut dyn TypeErasedColumn,
    destination: &mut dyn TypeErasedColumn,
) -> Result<(), ColumnError> {
    let found = old.element_type_name();
    let source = old
        .as_any_mut()
        .downcast_mut::<Column<T>>()
        .ok_or(ColumnError::TypeMismatch(TypeMismatchError {
            expected: type_name::<T>(),
            found,
        }))?;

    let length = source.length();
    let value = source
        .at(index)
        .cloned()
        .ok_or(ColumnError::Position(PositionOutOfBoundsError { index, length }))?;

    let found = destination.element_type_name();
    let target = destination
        .as_any_mut()
        .downcast_mut::<Column<T>>()
        .ok_or(ColumnError::TypeMismatch(TypeMismatchError {
            expected: type_name::<T>(),
            found,
        }))?;

    target.push_back(value);
    Ok(())
}

/// Clones the row at `index` from `old` into `destination`, leaving the
/// source untouched.
fn copy_column<T: Clone + 'static>(
    index: Index,
    old: &dyn TypeErasedColumn,
    destination: &mut dyn TypeErasedColumn,
) -> Result<(), ColumnError> {
    let source = old
        .as_any()
        .downcast_ref::<Column<T>>()
        .ok_or(ColumnError::TypeMismatch(TypeMismatchError {
            expected: type_name::<T>(),
            found: old.element_type_name(),
        }))?;

    let length = source.length();
    let value = source
        .at(index)
        .cloned()
        .ok_or(ColumnError::Position(PositionOutOfBoundsError { index, length }))?;

    let found = destination.element_type_name();
    let target = destination
        .as_any_mut()
        .downcast_mut::<Column<T>>()
        .ok_or(ColumnError::TypeMismatch(TypeMismatchError {
            expected: type_name::<T>(),
            found,
        }))?;

    target.push_back(value);
    Ok(())
}

/// Global mapping between Rust component types and compact `ComponentID`
/// values.
///
/// ## Design
/// - `by_type` maps `TypeId -> ComponentID`.
/// - `by_id` stores [`ComponentDesc`] metadata indexed by `ComponentID`.
/// - `next_id` assigns new IDs sequentially until `MAX_COMPONENT_COUNT`.
///
/// ## Invariants
/// - Every entry in `by_type` has a matching `by_id[id]`.
/// - When a component is registered, its operation entry is installed in
///   the same critical section.
struct ComponentRegistry {
    next_id: ComponentID,
    by_type: HashMap<TypeId, ComponentID>,
    by_id: Vec<Option<ComponentDesc>>,
}

static REGISTRY: OnceLock<RwLock<ComponentRegistry>> = OnceLock::new();

fn component_registry() -> &'static RwLock<ComponentRegistry> {
    REGISTRY.get_or_init(|| {
        RwLock::new(ComponentRegistry {
            next_id: 0 as ComponentID,
            by_type: HashMap::new(),
            by_id: vec![None; MAX_COMPONENT_COUNT],
        })
    })
}

impl ComponentRegistry {
    /// Allocates a new `ComponentID`.
    ///
    /// ## Panics
    /// Panics if `MAX_COMPONENT_COUNT` is exceeded.
    fn alloc_id(&mut self) -> ComponentID {
        let component_id = self.next_id;
        assert!(
            (component_id as usize) < MAX_COMPONENT_COUNT,
            "exceeded configured component capacity"
        );
        self.next_id = component_id.wrapping_add(1);
        component_id
    }

    /// Registers component type `T` and returns its assigned `ComponentID`.
    ///
    /// If `T` is already registered, returns the existing ID. Otherwise
    /// allocates a new ID, stores a [`ComponentDesc`], and installs the
    /// operation entry for this type.
    fn register<T: Clone + 'static>(&mut self) -> ComponentID {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return existing;
        }

        let id = self.alloc_id();
        self.by_type.insert(type_id, id);
        self.by_id[id as usize] = Some(ComponentDesc::of::<T>().with_id(id));

        component_ops().write().unwrap()[id as usize] = Some(ComponentOps {
            create: new_column::<T>,
            carry: carry_column::<T>,
            copy: copy_column::<T>,
        });
        id
    }
}

/// Returns the `ComponentID` for type `T`, registering it on first use.
///
/// The assigned id is stable for the process lifetime. Registration also
/// installs the operation entry used to create and maintain columns of
/// `T`, so any id observed by callers is fully usable by the storage
/// layer.
pub fn component_id_of<T: Clone + 'static>() -> ComponentID {
    let type_id = TypeId::of::<T>();
    {
        let registry = component_registry().read().unwrap();
        if let Some(&id) = registry.by_type.get(&type_id) {
            return id;
        }
    }
    let mut registry = component_registry().write().unwrap();
    registry.register::<T>()
}

/// Registers component type `T` in the global registry and returns its
/// `ComponentID`.
///
/// Registration is idempotent; this is a startup-time convenience for
/// callers that want ids assigned in a fixed order rather than on first
/// touch.
pub fn register_component<T: Clone + 'static>() -> ComponentID {
    component_id_of::<T>()
}

/// Returns a copy of the descriptor for `component_id`, if registered.
pub fn component_description(component_id: ComponentID) -> Option<ComponentDesc> {
    let registry = component_registry().read().unwrap();
    registry
        .by_id
        .get(component_id as usize)
        .and_then(|entry| entry.clone())
}

/// Returns the diagnostics name of `component_id`, if registered.
pub fn component_name_of(component_id: ComponentID) -> Option<String> {
    component_description(component_id).map(|description| description.name)
}

/// Renames a registered component for diagnostics output.
///
/// Has no semantic effect; lookups and storage routing are id-based. An
/// unregistered id is ignored.
pub fn set_component_name(component_id: ComponentID, name: &str) {
    let mut registry = component_registry().write().unwrap();
    if let Some(Some(description)) = registry.by_id.get_mut(component_id as usize) {
        description.name = name.to_owned();
    }
}

/// Describes a registered component type.
///
/// ## Fields
/// - `component_id`: The runtime identifier assigned by the registry.
/// - `name`: Diagnostics name, defaulting to the Rust type name.
/// - `type_id`: The runtime `TypeId` for the component.
/// - `size`: `size_of::<T>()` in bytes.
/// - `align`: `align_of::<T>()` in bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentDesc {
    /// Runtime identifier assigned to this component type.
    pub component_id: ComponentID,

    /// Diagnostics name, defaulting to the Rust type name.
    pub name: String,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Size of the component type in bytes.
    pub size: usize,

    /// Alignment of the component type in bytes.
    pub align: usize,
}

impl ComponentDesc {
    /// Constructs a descriptor for type `T` using its `TypeId`, name,
    /// size, and alignment.
    ///
    /// The returned descriptor uses `component_id = 0` and is finalized
    /// via `with_id`.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            component_id: 0,
            name: type_name::<T>().to_owned(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
        }
    }

    /// Returns `true` if this descriptor refers to type `T`.
    #[inline]
    pub fn matches_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns this descriptor with `component_id` set to the provided
    /// value.
    #[inline]
    pub fn with_id(mut self, component_id: ComponentID) -> Self {
        self.component_id = component_id;
        self
    }
}

impl std::fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ComponentDesc {{ id: {}, name: {}, size: {}, align: {} }}",
            self.component_id, self.name, self.size, self.align
        )
    }
}

/// Returns the operation entry for the given `component_id`.
///
/// ## Panics
/// Panics if no entry was registered for this component ID. Every id
/// issued by [`component_id_of`] has one; anything else is a corrupted
/// signature.
fn component_ops_for(component_id: ComponentID) -> ComponentOps {
    component_ops().read().unwrap()[component_id as usize]
        .expect("no operations registered for this component id")
}

/// Creates an empty type-erased column for `component_id`.
///
/// ## Panics
/// Panics if no operation entry exists for the provided ID.
pub fn make_empty_column(component_id: ComponentID) -> Box<dyn TypeErasedColumn> {
    (component_ops_for(component_id).create)()
}

/// Moves the row at `index` out of `old` and appends it to `destination`,
/// both columns storing the component type registered as `component_id`.
///
/// The vacated source row is left to the caller to drop via swap-remove.
pub fn column_carry(
    component_id: ComponentID,
    index: Index,
    old: &mut dyn TypeErasedColumn,
    destination: &mut dyn TypeErasedColumn,
) -> Result<(), ColumnError> {
    (component_ops_for(component_id).carry)(index, old, destination)
}

/// Clones the row at `index` from `old` into `destination` without
/// mutating the source.
pub fn column_copy(
    component_id: ComponentID,
    index: Index,
    old: &dyn TypeErasedColumn,
    destination: &mut dyn TypeErasedColumn,
) -> Result<(), ColumnError> {
    (component_ops_for(component_id).copy)(index, old, destination)
}
