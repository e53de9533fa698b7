//! Error types for component storage, cluster maintenance, and pool
//! orchestration.
//!
//! This module declares focused, composable error types used across the
//! storage engine. Each error carries enough context to make failures
//! actionable while remaining small and cheap to pass around or convert
//! into higher-level variants like [`PoolError`].
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode (e.g.
//!   stale entity ids, out-of-range row indices, mismatched column types).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into aggregate
//!   errors.
//! * **Actionability:** Structured fields (offending indices, expected
//!   vs. actual type names) make failures diagnosable without reproducing
//!   the issue.
//!
//! ## Typical flow
//! Low-level column operations return [`ColumnError`]. Cluster maintenance
//! uses `?` to bubble those into [`ClusterError`], and the pool wraps
//! everything into [`PoolError`], which callers can match on for control
//! flow or log with user-readable messages.
//!
//! Every failure in this crate signals a violated caller precondition
//! rather than a recoverable runtime condition; there are no retries.

use std::fmt;

use crate::engine::types::{ComponentID, EntityID, Index};


/// Returned when an operation names an entity id that is not present in
/// the container it was addressed to.
///
/// ### Fields
/// * `entity`: The id that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownEntityError {
    /// The id that failed to resolve.
    pub entity: EntityID,
}

impl fmt::Display for UnknownEntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity id {}", self.entity)
    }
}

impl std::error::Error for UnknownEntityError {}

/// Returned when a component type is accessed on an entity whose current
/// archetype does not include it.
///
/// ### Fields
/// * `entity`: The entity whose archetype was consulted.
/// * `component_id`: The registered id of the missing component type.
/// * `component_name`: Diagnostics name of the missing component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingComponentError {
    /// The entity whose archetype was consulted.
    pub entity: EntityID,

    /// Registered id of the missing component type.
    pub component_id: ComponentID,

    /// Rust type name of the missing component type.
    pub component_name: &'static str,
}

impl fmt::Display for MissingComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entity {} has no component {} (id {})",
            self.entity, self.component_name, self.component_id
        )
    }
}

impl std::error::Error for MissingComponentError {}

/// Returned when a cluster is asked for a component column its signature
/// does not include.
///
/// ### Fields
/// * `component_id`: The registered id of the absent column.
/// * `component_name`: Diagnostics name of the absent component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingColumnError {
    /// Registered id of the absent column.
    pub component_id: ComponentID,

    /// Rust type name of the absent component type.
    pub component_name: &'static str,
}

impl fmt::Display for MissingColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cluster holds no column for component {} (id {})",
            self.component_name, self.component_id
        )
    }
}

impl std::error::Error for MissingColumnError {}

/// Returned when a row index is outside the initialized range of a column.
///
/// ### Fields
/// * `index`: The requested row.
/// * `length`: The column length at the time of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOutOfBoundsError {
    /// The requested row.
    pub index: Index,

    /// Column length at the time of the request.
    pub length: usize,
}

impl fmt::Display for PositionOutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} out of bounds (column length {})",
            self.index, self.length
        )
    }
}

impl std::error::Error for PositionOutOfBoundsError {}

/// Returned when a type-erased column is accessed as the wrong element
/// type.
///
/// ### Fields
/// * `expected`: Type name the caller asked for.
/// * `found`: Type name the column actually stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Type name the caller asked for.
    pub expected: &'static str,

    /// Type name the column actually stores.
    pub found: &'static str,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column type mismatch (expected {}, found {})",
            self.expected, self.found
        )
    }
}

impl std::error::Error for TypeMismatchError {}

/// Failure of a low-level column operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// A row index was outside the initialized range.
    Position(PositionOutOfBoundsError),

    /// A type-erased column was accessed as the wrong element type.
    TypeMismatch(TypeMismatchError),
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::Position(e) => write!(f, "column position error: {e}"),
            ColumnError::TypeMismatch(e) => write!(f, "column type error: {e}"),
        }
    }
}

impl std::error::Error for ColumnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ColumnError::Position(e) => Some(e),
            ColumnError::TypeMismatch(e) => Some(e),
        }
    }
}

impl From<PositionOutOfBoundsError> for ColumnError {
    fn from(error: PositionOutOfBoundsError) -> Self {
        ColumnError::Position(error)
    }
}

impl From<TypeMismatchError> for ColumnError {
    fn from(error: TypeMismatchError) -> Self {
        ColumnError::TypeMismatch(error)
    }
}

/// Failure of a cluster-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterError {
    /// An underlying column operation failed.
    Column(ColumnError),

    /// The addressed entity is not stored in this cluster.
    UnknownEntity(UnknownEntityError),

    /// The cluster's signature does not include the requested column.
    MissingColumn(MissingColumnError),
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterError::Column(e) => write!(f, "cluster storage error: {e}"),
            ClusterError::UnknownEntity(e) => write!(f, "cluster entity error: {e}"),
            ClusterError::MissingColumn(e) => write!(f, "cluster column error: {e}"),
        }
    }
}

impl std::error::Error for ClusterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClusterError::Column(e) => Some(e),
            ClusterError::UnknownEntity(e) => Some(e),
            ClusterError::MissingColumn(e) => Some(e),
        }
    }
}

impl From<ColumnError> for ClusterError {
    fn from(error: ColumnError) -> Self {
        ClusterError::Column(error)
    }
}

impl From<UnknownEntityError> for ClusterError {
    fn from(error: UnknownEntityError) -> Self {
        ClusterError::UnknownEntity(error)
    }
}

impl From<MissingColumnError> for ClusterError {
    fn from(error: MissingColumnError) -> Self {
        ClusterError::MissingColumn(error)
    }
}

/// Failure of a pool-level operation. This is the error type of the public
/// orchestration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The addressed entity was never created or has been destroyed.
    UnknownEntity(UnknownEntityError),

    /// The entity's current archetype does not include the component.
    MissingComponent(MissingComponentError),

    /// A cluster-level operation failed.
    Cluster(ClusterError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::UnknownEntity(e) => write!(f, "pool entity error: {e}"),
            PoolError::MissingComponent(e) => write!(f, "pool component error: {e}"),
            PoolError::Cluster(e) => write!(f, "pool cluster error: {e}"),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::UnknownEntity(e) => Some(e),
            PoolError::MissingComponent(e) => Some(e),
            PoolError::Cluster(e) => Some(e),
        }
    }
}

impl From<UnknownEntityError> for PoolError {
    fn from(error: UnknownEntityError) -> Self {
        PoolError::UnknownEntity(error)
    }
}

impl From<MissingComponentError> for PoolError {
    fn from(error: MissingComponentError) -> Self {
        PoolError::MissingComponent(error)
    }
}

impl From<ClusterError> for PoolError {
    fn from(error: ClusterError) -> Self {
        PoolError::Cluster(error)
    }
}

impl From<ColumnError> for PoolError {
    fn from(error: ColumnError) -> Self {
        PoolError::Cluster(ClusterError::Column(error))
    }
}

/// Result alias for the public pool surface.
pub type PoolResult<T> = Result<T, PoolError>;
