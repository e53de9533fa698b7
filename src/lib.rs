//! # entity_pool
//!
//! In-memory storage engine for tagged composite records: opaque entity
//! ids carry an arbitrary, dynamically-changing set of typed component
//! values, grouped by archetype for columnar iteration.
//!
//! ## Design Goals
//! - Archetype-based storage for cache efficiency
//! - O(1) amortized row removal via swap-remove
//! - Lazy archetype creation, eager destruction of emptied tables
//! - Explicit, checked preconditions on the public surface
//!
//! ## Model
//! Entities are issued by a [`Pool`]. Attaching or detaching a component
//! migrates the entity's row between dense per-archetype tables
//! ([`Cluster`]s); iteration over a component type list walks every
//! matching table with cached column pointers.
//!
//! The engine is single-threaded: callers serialize all mutation, and a
//! view borrows the pool for its whole lifetime so structural changes
//! cannot invalidate it mid-iteration.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core storage types

pub use engine::pool::{
    ComponentBundle,
    Pool,
};

pub use engine::cluster::Cluster;
pub use engine::registry::ClusterRegistry;
pub use engine::entity::EntityDirectory;

pub use engine::component::{
    component_description,
    component_id_of,
    component_name_of,
    register_component,
    set_component_name,
    ComponentDesc,
};

pub use engine::storage::{
    Column,
    TypeErasedColumn,
};

pub use engine::view::{
    ClusterView,
    ComponentSet,
    PoolView,
};

pub use engine::error::{
    ClusterError,
    ColumnError,
    MissingColumnError,
    MissingComponentError,
    PoolError,
    PoolResult,
    PositionOutOfBoundsError,
    TypeMismatchError,
    UnknownEntityError,
};

pub use engine::types::{
    build_signature,
    ClusterID,
    ComponentID,
    EntityID,
    Index,
    Signature,
    MAX_COMPONENT_COUNT,
    SIGNATURE_SIZE,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used storage engine types.
///
/// Import with:
/// ```rust
/// use entity_pool::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        build_signature,
        component_id_of,
        register_component,
        Cluster,
        ClusterView,
        ComponentID,
        EntityID,
        Pool,
        PoolResult,
        PoolView,
        Signature,
    };
}
