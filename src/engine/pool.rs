//! Top-level orchestration: entity lifecycle, component attach/detach, and
//! migration between archetypes.
//!
//! [`Pool`] owns the entity directory and the cluster registry. Every
//! structural operation follows the same shape: compute the entity's new
//! signature, resolve (or lazily create) the target cluster, carry the
//! component values shared between source and target, push the changed
//! values, drop the vacated source row, repoint the directory, and destroy
//! the source cluster if it just lost its last entity.
//!
//! Reads and writes of individual components never migrate; they delegate
//! to the entity's current cluster.
//!
//! ## Attach semantics
//! Attaching a component type the entity already has overwrites the stored
//! value in place. Bulk attach applies the same rule per type: types
//! already present are excluded from the carry and re-pushed from the
//! provided values, so each row keeps exactly one value per type and ends
//! the operation holding the new ones.
//!
//! ## Discipline
//! All operations are synchronous and single-threaded; the caller
//! serializes mutation. Failures are reported as
//! [`PoolError`](crate::engine::error::PoolError) values and always
//! indicate a violated caller precondition, not a recoverable runtime
//! condition.

use std::any::type_name;

use crate::engine::cluster::Cluster;
use crate::engine::component::component_id_of;
use crate::engine::entity::EntityDirectory;
use crate::engine::error::{
    ClusterError, MissingComponentError, PoolResult, UnknownEntityError,
};
use crate::engine::registry::ClusterRegistry;
use crate::engine::types::{build_signature, ClusterID, EntityID, Signature};
use crate::engine::view::{ComponentSet, PoolView};


/// A group of component values attached to an entity in one migration.
///
/// Implemented for tuples of component types up to arity 8. The aggregate
/// signature is computed once per operation, so attaching N components
/// costs one migration instead of N.
pub trait ComponentBundle {
    /// Returns the combined signature of every type in the bundle.
    ///
    /// ## Panics
    /// Panics if the bundle names the same component type twice; the
    /// row being assembled would otherwise end up with two values in one
    /// column.
    fn signature() -> Signature;

    /// Appends one value per type as the newest row of the cluster.
    fn push_into(self, cluster: &mut Cluster) -> Result<(), ClusterError>;

    /// Overwrites the stored value of every type for an entity already
    /// resident in the cluster.
    fn assign_into(self, cluster: &mut Cluster, entity: EntityID) -> Result<(), ClusterError>;
}

macro_rules! impl_component_bundle {
    ($(($type:ident, $index:tt)),+) => {
        impl<$($type: Clone + 'static),+> ComponentBundle for ($($type,)+) {
            fn signature() -> Signature {
                let mut signature = Signature::default();
                $(signature.set(component_id_of::<$type>());)+

                let arity = [$($index,)+].len();
                assert!(
                    signature.iter_components().count() == arity,
                    "bundles must name distinct component types"
                );
                signature
            }

            fn push_into(self, cluster: &mut Cluster) -> Result<(), ClusterError> {
                $(cluster.push_component(self.$index)?;)+
                Ok(())
            }

            fn assign_into(self, cluster: &mut Cluster, entity: EntityID) -> Result<(), ClusterError> {
                $(cluster.set_component(entity, self.$index)?;)+
                Ok(())
            }
        }
    };
}

impl_component_bundle!((A, 0));
impl_component_bundle!((A, 0), (B, 1));
impl_component_bundle!((A, 0), (B, 1), (C, 2));
impl_component_bundle!((A, 0), (B, 1), (C, 2), (D, 3));
impl_component_bundle!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_component_bundle!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
impl_component_bundle!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
impl_component_bundle!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));

/// In-memory store of tagged composite records.
///
/// Entities are opaque ids; components are typed values attached to them.
/// Entities sharing an identical component set live in one dense
/// [`Cluster`], and changing an entity's component set moves its row
/// between clusters.
pub struct Pool {
    entities: EntityDirectory,
    clusters: ClusterRegistry,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            entities: EntityDirectory::new(),
            clusters: ClusterRegistry::new(),
        }
    }

    /// Issues a fresh entity id. The entity starts without components and
    /// belongs to no cluster.
    pub fn create_entity(&mut self) -> EntityID {
        self.entities.create_entity()
    }

    /// Destroys an entity, dropping its row (if any) and its directory
    /// entry. The id is never reused.
    pub fn destroy_entity(&mut self, entity: EntityID) -> PoolResult<()> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }

        if let Some(cluster_id) = self.entities.cluster_of(entity) {
            let cluster = self
                .clusters
                .cluster_mut(cluster_id)
                .expect("entity directory points at a live cluster");
            cluster.remove_entity(entity)?;
            self.clusters.check_cluster(cluster_id);
        }

        self.entities.remove_entity(entity);
        Ok(())
    }

    /// Attaches a component value to an entity.
    ///
    /// If the entity already has `T`, the stored value is overwritten in
    /// place with no migration. Otherwise the entity's row migrates to the
    /// cluster for its widened signature, carrying every existing
    /// component value along.
    pub fn add_component<T: Clone + 'static>(
        &mut self,
        entity: EntityID,
        component: T,
    ) -> PoolResult<()> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }
        let component_id = component_id_of::<T>();

        match self.entities.cluster_of(entity) {
            Some(source_id) => {
                let source_signature = *self
                    .clusters
                    .cluster(source_id)
                    .expect("entity directory points at a live cluster")
                    .signature();

                if source_signature.has(component_id) {
                    let cluster = self
                        .clusters
                        .cluster_mut(source_id)
                        .expect("entity directory points at a live cluster");
                    return cluster.set_component(entity, component).map_err(Into::into);
                }

                let mut signature = source_signature;
                signature.set(component_id);

                let destination_id = self.clusters.get_cluster(&signature);
                let mut source = self
                    .clusters
                    .take_cluster(source_id)
                    .expect("entity directory points at a live cluster");

                let moved = (|| -> Result<(), ClusterError> {
                    let destination = self
                        .clusters
                        .cluster_mut(destination_id)
                        .expect("freshly resolved cluster is live");
                    source.carry_entity(destination, entity)?;
                    destination.push_component(component)?;
                    source.remove_entity(entity)
                })();

                self.clusters.restore_cluster(source);
                moved?;

                self.entities.set_cluster(entity, Some(destination_id));
                Ok(())
            }
            None => {
                let signature = build_signature(&[component_id]);
                let destination_id = self.clusters.get_cluster(&signature);
                let destination = self
                    .clusters
                    .cluster_mut(destination_id)
                    .expect("freshly resolved cluster is live");

                destination.push_entity(entity);
                destination.push_component(component)?;
                self.entities.set_cluster(entity, Some(destination_id));
                Ok(())
            }
        }
    }

    /// Attaches several component values in one migration.
    ///
    /// The union signature is computed once; the entity's row moves at
    /// most once no matter how many types the bundle names. Types already
    /// present are overwritten rather than duplicated.
    pub fn add_components<B: ComponentBundle>(
        &mut self,
        entity: EntityID,
        bundle: B,
    ) -> PoolResult<()> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }
        let provided = B::signature();

        match self.entities.cluster_of(entity) {
            Some(source_id) => {
                let source_signature = *self
                    .clusters
                    .cluster(source_id)
                    .expect("entity directory points at a live cluster")
                    .signature();

                let mut signature = source_signature;
                signature.merge(&provided);

                if signature == source_signature {
                    let cluster = self
                        .clusters
                        .cluster_mut(source_id)
                        .expect("entity directory points at a live cluster");
                    return bundle.assign_into(cluster, entity).map_err(Into::into);
                }

                let destination_id = self.clusters.get_cluster(&signature);
                let mut source = self
                    .clusters
                    .take_cluster(source_id)
                    .expect("entity directory points at a live cluster");

                let moved = (|| -> Result<(), ClusterError> {
                    let destination = self
                        .clusters
                        .cluster_mut(destination_id)
                        .expect("freshly resolved cluster is live");
                    source.carry_entity_excluding(destination, entity, &provided)?;
                    bundle.push_into(destination)?;
                    source.remove_entity(entity)
                })();

                self.clusters.restore_cluster(source);
                moved?;

                self.entities.set_cluster(entity, Some(destination_id));
                Ok(())
            }
            None => {
                let destination_id = self.clusters.get_cluster(&provided);
                let destination = self
                    .clusters
                    .cluster_mut(destination_id)
                    .expect("freshly resolved cluster is live");

                destination.push_entity(entity);
                bundle.push_into(destination)?;
                self.entities.set_cluster(entity, Some(destination_id));
                Ok(())
            }
        }
    }

    /// Detaches component `T` from an entity.
    ///
    /// If `T` was the entity's last component, the row is dropped and the
    /// entity returns to the no-cluster state; otherwise the row migrates
    /// to the cluster for the narrowed signature.
    ///
    /// ## Errors
    /// Detaching a type the entity does not have is a precondition
    /// violation reported as a [`MissingComponentError`].
    pub fn remove_component<T: Clone + 'static>(&mut self, entity: EntityID) -> PoolResult<()> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }
        let component_id = component_id_of::<T>();

        let source_id = self
            .entities
            .cluster_of(entity)
            .ok_or(MissingComponentError {
                entity,
                component_id,
                component_name: type_name::<T>(),
            })?;

        let source_signature = *self
            .clusters
            .cluster(source_id)
            .expect("entity directory points at a live cluster")
            .signature();

        if !source_signature.has(component_id) {
            return Err(MissingComponentError {
                entity,
                component_id,
                component_name: type_name::<T>(),
            }
            .into());
        }

        let mut signature = source_signature;
        signature.clear(component_id);

        if !signature.any() {
            let cluster = self
                .clusters
                .cluster_mut(source_id)
                .expect("entity directory points at a live cluster");
            cluster.remove_entity(entity)?;
            self.clusters.check_cluster(source_id);
            self.entities.set_cluster(entity, None);
            return Ok(());
        }

        let destination_id = self.clusters.get_cluster(&signature);
        let mut source = self
            .clusters
            .take_cluster(source_id)
            .expect("entity directory points at a live cluster");

        let moved = (|| -> Result<(), ClusterError> {
            let destination = self
                .clusters
                .cluster_mut(destination_id)
                .expect("freshly resolved cluster is live");
            source.carry_entity(destination, entity)?;
            source.remove_entity(entity)
        })();

        self.clusters.restore_cluster(source);
        moved?;

        self.entities.set_cluster(entity, Some(destination_id));
        Ok(())
    }

    /// Returns a shared reference to an entity's value of component `T`.
    pub fn get_component<T: Clone + 'static>(&self, entity: EntityID) -> PoolResult<&T> {
        let cluster_id = self.component_cluster::<T>(entity)?;
        self.clusters
            .cluster(cluster_id)
            .expect("entity directory points at a live cluster")
            .get_component(entity)
            .map_err(Into::into)
    }

    /// Returns a mutable reference to an entity's value of component `T`.
    pub fn get_component_mut<T: Clone + 'static>(
        &mut self,
        entity: EntityID,
    ) -> PoolResult<&mut T> {
        let cluster_id = self.component_cluster::<T>(entity)?;
        self.clusters
            .cluster_mut(cluster_id)
            .expect("entity directory points at a live cluster")
            .get_component_mut(entity)
            .map_err(Into::into)
    }

    /// Overwrites an entity's value of component `T`. Never migrates.
    pub fn set_component<T: Clone + 'static>(
        &mut self,
        entity: EntityID,
        component: T,
    ) -> PoolResult<()> {
        let cluster_id = self.component_cluster::<T>(entity)?;
        self.clusters
            .cluster_mut(cluster_id)
            .expect("entity directory points at a live cluster")
            .set_component(entity, component)
            .map_err(Into::into)
    }

    /// Returns `true` if the entity's current archetype includes `T`.
    pub fn has_component<T: Clone + 'static>(&self, entity: EntityID) -> PoolResult<bool> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }

        Ok(match self.entities.cluster_of(entity) {
            Some(cluster_id) => self
                .clusters
                .cluster(cluster_id)
                .expect("entity directory points at a live cluster")
                .signature()
                .has(component_id_of::<T>()),
            None => false,
        })
    }

    /// Iterates every entity whose archetype contains all of `Q`'s types.
    ///
    /// Yields `(EntityID, &mut T1, ...)` tuples across every matching
    /// cluster. The sequence is lazy, finite, and single-pass; construct a
    /// new view to iterate again.
    pub fn view<Q: ComponentSet>(&mut self) -> PoolView<'_, Q> {
        PoolView::new(self, Signature::default())
    }

    /// [`view`](Pool::view) with an exclusion filter: clusters whose
    /// signature shares any bit with `without` are skipped.
    pub fn view_excluding<Q: ComponentSet>(&mut self, without: Signature) -> PoolView<'_, Q> {
        PoolView::new(self, without)
    }

    /// Returns the id of the entity's current cluster, or `None` while the
    /// entity has no components.
    pub fn cluster_of(&self, entity: EntityID) -> PoolResult<Option<ClusterID>> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }
        Ok(self.entities.cluster_of(entity))
    }

    /// Resolves a cluster id to the live cluster, if it still exists.
    pub fn cluster(&self, cluster_id: ClusterID) -> Option<&Cluster> {
        self.clusters.cluster(cluster_id)
    }

    /// Resolves a cluster id to the live cluster, mutably.
    ///
    /// Structural edits through this reference (pushing or removing rows
    /// directly) bypass the directory and are the caller's responsibility
    /// to keep consistent; component reads and writes are always safe.
    pub fn cluster_mut(&mut self, cluster_id: ClusterID) -> Option<&mut Cluster> {
        self.clusters.cluster_mut(cluster_id)
    }

    /// Returns the ids of every cluster whose signature is a superset of
    /// `with` and disjoint from `without`.
    pub fn matching_clusters(&self, with: &Signature, without: &Signature) -> Vec<ClusterID> {
        self.clusters.matching_clusters(with, without)
    }

    /// Returns the number of live clusters.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Returns the number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are alive.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn clusters_mut(&mut self) -> &mut ClusterRegistry {
        &mut self.clusters
    }

    /// Resolves the cluster holding `entity`'s value of `T`, checking both
    /// the entity and the component precondition.
    fn component_cluster<T: Clone + 'static>(&self, entity: EntityID) -> PoolResult<ClusterID> {
        if !self.entities.contains(entity) {
            return Err(UnknownEntityError { entity }.into());
        }
        let component_id = component_id_of::<T>();

        let cluster_id = self
            .entities
            .cluster_of(entity)
            .ok_or(MissingComponentError {
                entity,
                component_id,
                component_name: type_name::<T>(),
            })?;

        let present = self
            .clusters
            .cluster(cluster_id)
            .expect("entity directory points at a live cluster")
            .signature()
            .has(component_id);

        if !present {
            return Err(MissingComponentError {
                entity,
                component_id,
                component_name: type_name::<T>(),
            }
            .into());
        }

        Ok(cluster_id)
    }
}
