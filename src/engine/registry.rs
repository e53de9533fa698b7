//! Cluster registry: lazy archetype creation and garbage collection.
//!
//! The registry owns every live [`Cluster`] and maintains the invariant
//! that no two clusters share an equal signature. Other subsystems hold
//! [`ClusterID`] handles and resolve them here at the point of use; no
//! reference into the registry's storage is cached across a mutation.

use std::collections::HashMap;

use crate::engine::cluster::Cluster;
use crate::engine::types::{ClusterID, Signature};


/// Owns all clusters, indexed by id and by signature.
pub struct ClusterRegistry {
    by_signature: HashMap<Signature, ClusterID>,
    clusters: HashMap<ClusterID, Cluster>,
    next_id: ClusterID,
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterRegistry {
    /// Creates an empty registry. Cluster ids are issued from 1.
    pub fn new() -> Self {
        Self {
            by_signature: HashMap::new(),
            clusters: HashMap::new(),
            next_id: 1,
        }
    }

    /// Returns the id of the cluster for an exact signature match,
    /// lazily constructing and registering a new empty cluster if none
    /// exists yet.
    pub fn get_cluster(&mut self, signature: &Signature) -> ClusterID {
        if let Some(&id) = self.by_signature.get(signature) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_signature.insert(*signature, id);
        self.clusters.insert(id, Cluster::new(id, *signature));
        id
    }

    /// Resolves a cluster id to the live cluster, if it still exists.
    pub fn cluster(&self, id: ClusterID) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    /// Resolves a cluster id to the live cluster, mutably.
    pub fn cluster_mut(&mut self, id: ClusterID) -> Option<&mut Cluster> {
        self.clusters.get_mut(&id)
    }

    /// Destroys the cluster if it has become empty.
    ///
    /// Called after every row removal so that an archetype table never
    /// outlives its last entity.
    pub fn check_cluster(&mut self, id: ClusterID) {
        let empty = self
            .clusters
            .get(&id)
            .map(Cluster::is_empty)
            .unwrap_or(false);

        if empty {
            if let Some(cluster) = self.clusters.remove(&id) {
                self.by_signature.remove(cluster.signature());
            }
        }
    }

    /// Removes a cluster from the owning store for the duration of a
    /// migration, leaving its signature registered.
    ///
    /// The caller must hand the cluster back through
    /// [`restore_cluster`](ClusterRegistry::restore_cluster) before any
    /// other registry operation can observe it.
    pub(crate) fn take_cluster(&mut self, id: ClusterID) -> Option<Cluster> {
        self.clusters.remove(&id)
    }

    /// Returns a cluster taken with
    /// [`take_cluster`](ClusterRegistry::take_cluster), destroying it
    /// instead if it has become empty.
    pub(crate) fn restore_cluster(&mut self, cluster: Cluster) {
        if cluster.is_empty() {
            self.by_signature.remove(cluster.signature());
        } else {
            self.clusters.insert(cluster.id(), cluster);
        }
    }

    /// Returns every cluster whose signature is a superset of `with` and
    /// shares no bit with `without`.
    ///
    /// Linear scan over all registered clusters; the result is a snapshot
    /// of ids, not references.
    pub fn matching_clusters(&self, with: &Signature, without: &Signature) -> Vec<ClusterID> {
        let mut out = Vec::new();
        for cluster in self.clusters.values() {
            if with.subset_of(cluster.signature()) && !without.intersects(cluster.signature()) {
                out.push(cluster.id());
            }
        }
        out
    }

    /// Returns the number of live clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns `true` if no clusters are registered.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
