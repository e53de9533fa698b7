//! Typed, filtered iteration over one or many clusters.
//!
//! This module provides read/write iteration over every entity whose
//! archetype contains a requested list of component types, yielding
//! `(EntityID, &mut T1, ..., &mut Tn)` tuples.
//!
//! ## Design goals
//! * **Static type lists:** The requested component types are a tuple type
//!   parameter; the aggregate signature is computed once per view.
//! * **Runtime efficiency:** Each matching cluster is resolved once into a
//!   small cache of raw column pointers plus the entity-id list; per-row
//!   access walks that cache instead of re-resolving types.
//! * **Safety by discipline:** The API enforces access correctness by
//!   construction where it can (distinct type lists, superset matching)
//!   and by documented caller contract where it cannot.
//!
//! ## Execution model
//! 1. Resolve every cluster whose signature is a superset of the
//!    requested set and disjoint from the exclusion set.
//! 2. Cache each cluster's column pointers and entity-id list.
//! 3. Walk rows cluster by cluster, yielding one tuple per entity.
//!
//! A view is lazy, finite, and single-pass; construct a new one to
//! iterate again. An empty match set is not an error and yields nothing.
//!
//! ## Invalidation
//! A cache holds pointers into cluster storage. They remain valid only
//! until the owning cluster's row count changes or the cluster is
//! destroyed. Any attach, detach, or destroy invalidates outstanding
//! views; the borrow on the pool prevents that for pool views, and the
//! borrow on the cluster for cluster views.
//!
//! ## Unsafe code
//! Row fetches dereference the cached pointers. Soundness rests on:
//! * views borrow the pool (or cluster) mutably for their whole lifetime,
//! * every `(column, row)` pair is yielded at most once,
//! * type lists name distinct component types, so no two tuple positions
//!   alias one column (checked at cache construction).

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::engine::cluster::Cluster;
use crate::engine::component::component_id_of;
use crate::engine::error::ClusterError;
use crate::engine::pool::Pool;
use crate::engine::types::{EntityID, Signature};


/// A list of component types iterated together.
///
/// Implemented for tuples of component types up to arity 8. The tuple
/// positions map one-to-one onto the references yielded per row, after
/// the leading entity id.
pub trait ComponentSet {
    /// Cached raw pointers to the first row of each requested column.
    type Columns;

    /// The tuple yielded per row: the entity id followed by one mutable
    /// reference per requested type.
    type Item<'a>;

    /// Returns the combined signature of every type in the set.
    fn signature() -> Signature;

    /// Resolves the requested columns of a cluster into a pointer cache.
    ///
    /// ## Panics
    /// Panics if the type list names the same component type twice; two
    /// tuple positions would otherwise alias one column.
    fn columns(cluster: &mut Cluster) -> Result<Self::Columns, ClusterError>;

    /// Produces the yielded tuple for one row.
    ///
    /// ## Safety
    /// `row` must be below the owning cluster's row count at cache
    /// construction time, the cluster must not have been structurally
    /// mutated since, and no `(column, row)` pair may be fetched twice
    /// while earlier results are still alive.
    unsafe fn fetch<'a>(columns: &Self::Columns, entity: EntityID, row: usize) -> Self::Item<'a>;
}

macro_rules! impl_component_set {
    ($(($type:ident, $index:tt)),+) => {
        impl<$($type: Clone + 'static),+> ComponentSet for ($($type,)+) {
            type Columns = ($(NonNull<$type>,)+);
            type Item<'a> = (EntityID, $(&'a mut $type,)+);

            fn signature() -> Signature {
                let mut signature = Signature::default();
                $(signature.set(component_id_of::<$type>());)+
                signature
            }

            fn columns(cluster: &mut Cluster) -> Result<Self::Columns, ClusterError> {
                let arity = [$($index,)+].len();
                assert!(
                    Self::signature().iter_components().count() == arity,
                    "view type lists must name distinct component types"
                );
                Ok(($(cluster.column_data_mut::<$type>()?,)+))
            }

            unsafe fn fetch<'a>(
                columns: &Self::Columns,
                entity: EntityID,
                row: usize,
            ) -> Self::Item<'a> {
                (entity, $(unsafe { &mut *columns.$index.as_ptr().add(row) },)+)
            }
        }
    };
}

impl_component_set!((A, 0));
impl_component_set!((A, 0), (B, 1));
impl_component_set!((A, 0), (B, 1), (C, 2));
impl_component_set!((A, 0), (B, 1), (C, 2), (D, 3));
impl_component_set!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_component_set!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
impl_component_set!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
impl_component_set!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));

/// One cluster's resolved iteration state: the entity-id list and one
/// data pointer per requested column.
struct ClusterCache<Q: ComponentSet> {
    entities: *const EntityID,
    length: usize,
    columns: Q::Columns,
}

impl<Q: ComponentSet> ClusterCache<Q> {
    fn new(cluster: &mut Cluster) -> Result<Self, ClusterError> {
        let columns = Q::columns(cluster)?;
        let ids = cluster.entities();
        Ok(Self {
            entities: ids.as_ptr(),
            length: ids.len(),
            columns,
        })
    }

    /// ## Safety
    /// `row` must be below `self.length` and the owning cluster must not
    /// have been structurally mutated since cache construction.
    #[inline]
    unsafe fn entity_at(&self, row: usize) -> EntityID {
        unsafe { *self.entities.add(row) }
    }
}

/// Read/write iteration over a single cluster.
///
/// Yields `(EntityID, &mut T1, ...)` for every row of one archetype
/// table. The cluster is borrowed mutably for the lifetime of the view,
/// so no structural mutation can invalidate the cache underneath it.
pub struct ClusterView<'a, Q: ComponentSet> {
    cache: ClusterCache<Q>,
    row: usize,
    _cluster: PhantomData<&'a mut Cluster>,
}

impl<'a, Q: ComponentSet> ClusterView<'a, Q> {
    /// Builds a view over one cluster.
    ///
    /// ## Errors
    /// Returns [`ClusterError::MissingColumn`] if the cluster's signature
    /// does not include every type in `Q`.
    pub fn new(cluster: &'a mut Cluster) -> Result<Self, ClusterError> {
        Ok(Self {
            cache: ClusterCache::new(cluster)?,
            row: 0,
            _cluster: PhantomData,
        })
    }
}

impl<'a, Q: ComponentSet> std::fmt::Debug for ClusterView<'a, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterView")
            .field("row", &self.row)
            .field("length", &self.cache.length)
            .finish_non_exhaustive()
    }
}

impl<'a, Q: ComponentSet> Iterator for ClusterView<'a, Q> {
    type Item = Q::Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.cache.length {
            return None;
        }
        let row = self.row;
        self.row += 1;

        let entity = unsafe { self.cache.entity_at(row) };
        Some(unsafe { Q::fetch(&self.cache.columns, entity, row) })
    }
}

/// Read/write iteration over every cluster matching a type-list query.
///
/// Matching clusters are those whose signature is a superset of `Q`'s
/// types and disjoint from the exclusion signature. The pool is borrowed
/// mutably for the lifetime of the view, so no structural mutation can
/// invalidate the caches underneath it.
pub struct PoolView<'a, Q: ComponentSet> {
    caches: Vec<ClusterCache<Q>>,
    cluster_index: usize,
    row: usize,
    _pool: PhantomData<&'a mut Pool>,
}

impl<'a, Q: ComponentSet> PoolView<'a, Q> {
    /// Builds a view over every matching cluster of the pool.
    ///
    /// Clusters whose signature shares any bit with `without` are
    /// skipped. An empty match set yields an empty sequence.
    pub fn new(pool: &'a mut Pool, without: Signature) -> Self {
        let with = Q::signature();
        let matches = pool.clusters_mut().matching_clusters(&with, &without);

        let mut caches = Vec::with_capacity(matches.len());
        for cluster_id in matches {
            let cluster = pool
                .clusters_mut()
                .cluster_mut(cluster_id)
                .expect("matched cluster is live");
            let cache =
                ClusterCache::new(cluster).expect("matched cluster holds every requested column");
            caches.push(cache);
        }

        Self {
            caches,
            cluster_index: 0,
            row: 0,
            _pool: PhantomData,
        }
    }
}

impl<'a, Q: ComponentSet> Iterator for PoolView<'a, Q> {
    type Item = Q::Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cache = self.caches.get(self.cluster_index)?;
            if self.row < cache.length {
                let row = self.row;
                self.row += 1;

                let entity = unsafe { cache.entity_at(row) };
                return Some(unsafe { Q::fetch(&cache.columns, entity, row) });
            }

            self.cluster_index += 1;
            self.row = 0;
        }
    }
}
