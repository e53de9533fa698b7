//! The archetype table: dense columns plus entity bookkeeping.
//!
//! A [`Cluster`] stores every entity that currently has one exact set of
//! component types. It owns one [`TypeErasedColumn`] per component type in
//! its signature, the ordered list of entity ids currently stored, and a
//! map from entity id to row index.
//!
//! ## Invariants
//! - All of a cluster's columns and its entity-id list have equal length
//!   at all times except mid-mutation.
//! - The row index recorded for an entity id is valid while that entity
//!   belongs to this cluster.
//! - The signature exactly reflects the set of allocated columns.
//! - A cluster with zero entities is eligible for destruction and is not
//!   retained by the registry.
//!
//! Row removal uses swap-remove: the last row's data moves into the freed
//! slot and bookkeeping is repaired, which makes removal `O(1)` regardless
//! of table size. This is the defining performance property of the
//! design.

use std::any::type_name;
use std::collections::HashMap;
use std::ptr::NonNull;

use crate::engine::component::{column_carry, column_copy, component_id_of, make_empty_column};
use crate::engine::error::{
    ClusterError, MissingColumnError, PositionOutOfBoundsError, TypeMismatchError,
    UnknownEntityError,
};
use crate::engine::storage::{Column, TypeErasedColumn};
use crate::engine::types::{ClusterID, ComponentID, EntityID, Index, Signature};


/// Stores every entity sharing one exact component signature.
pub struct Cluster {
    id: ClusterID,
    signature: Signature,
    columns: HashMap<ComponentID, Box<dyn TypeErasedColumn>>,
    indices: HashMap<EntityID, Index>,
    ids: Vec<EntityID>,
}

impl Cluster {
    /// Creates an empty cluster for `signature`, allocating one empty
    /// column per component type in the signature.
    ///
    /// Every id set in `signature` must have been issued by the component
    /// registry; the column factories are looked up through it.
    pub fn new(id: ClusterID, signature: Signature) -> Self {
        let mut columns = HashMap::new();
        for component_id in signature.iter_components() {
            columns.insert(component_id, make_empty_column(component_id));
        }

        Self {
            id,
            signature,
            columns,
            indices: HashMap::new(),
            ids: Vec::new(),
        }
    }

    /// Returns the registry-issued identifier of this cluster.
    pub fn id(&self) -> ClusterID {
        self.id
    }

    /// Returns the signature describing this cluster's component set.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the number of entities stored.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no entities are stored.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the ordered entity-id list.
    pub fn entities(&self) -> &[EntityID] {
        &self.ids
    }

    /// Returns `true` if `entity` is stored in this cluster.
    pub fn contains(&self, entity: EntityID) -> bool {
        self.indices.contains_key(&entity)
    }

    /// Returns the row index of `entity`, if stored here.
    pub fn index_of(&self, entity: EntityID) -> Option<Index> {
        self.indices.get(&entity).copied()
    }

    /// Appends `entity` to the entity-id list and records its row index.
    ///
    /// Does not touch the columns; callers push the corresponding
    /// component values separately so that all columns end the mutation at
    /// the same length.
    pub fn push_entity(&mut self, entity: EntityID) {
        let index = self.ids.len() as Index;
        self.indices.insert(entity, index);
        self.ids.push(entity);
    }

    /// Removes the row belonging to `entity` from every column and repairs
    /// the entity bookkeeping.
    ///
    /// ## Behavior
    /// If the entity does not occupy the last row, the last row is swapped
    /// into its slot in every column before the tail row is dropped, and
    /// the displaced entity's index mapping is updated. Runs in `O(1)`
    /// regardless of table size.
    ///
    /// ## Errors
    /// Returns [`ClusterError::UnknownEntity`] if `entity` is not stored
    /// here.
    pub fn remove_entity(&mut self, entity: EntityID) -> Result<(), ClusterError> {
        let entity_index = self
            .indices
            .get(&entity)
            .copied()
            .ok_or(UnknownEntityError { entity })?;

        let last_entity = *self
            .ids
            .last()
            .ok_or(UnknownEntityError { entity })?;
        let last_index = (self.ids.len() - 1) as Index;

        if entity != last_entity {
            for column in self.columns.values_mut() {
                column.swap(entity_index, last_index)?;
                column.pop_back();
            }

            self.indices.insert(last_entity, entity_index);
            self.ids[entity_index as usize] = last_entity;
        } else {
            for column in self.columns.values_mut() {
                column.pop_back();
            }
        }

        self.indices.remove(&entity);
        self.ids.pop();
        Ok(())
    }

    /// Appends a component value as the newest row of its column.
    ///
    /// Pairs with [`push_entity`](Cluster::push_entity): pushing an entity
    /// and then one value per component type of the signature leaves the
    /// cluster consistent.
    ///
    /// ## Errors
    /// Returns [`ClusterError::MissingColumn`] if the signature does not
    /// include `T`.
    pub fn push_component<T: Clone + 'static>(&mut self, component: T) -> Result<(), ClusterError> {
        self.column_mut::<T>()?.push_back(component);
        Ok(())
    }

    /// Returns a shared reference to `entity`'s value of component `T`.
    pub fn get_component<T: Clone + 'static>(&self, entity: EntityID) -> Result<&T, ClusterError> {
        let index = self
            .indices
            .get(&entity)
            .copied()
            .ok_or(UnknownEntityError { entity })?;

        let column = self.column::<T>()?;
        let length = column.length();
        column
            .at(index)
            .ok_or_else(|| PositionOutOfBoundsError { index, length }.into())
            .map_err(ClusterError::Column)
    }

    /// Returns a mutable reference to `entity`'s value of component `T`.
    pub fn get_component_mut<T: Clone + 'static>(
        &mut self,
        entity: EntityID,
    ) -> Result<&mut T, ClusterError> {
        let index = self
            .indices
            .get(&entity)
            .copied()
            .ok_or(UnknownEntityError { entity })?;

        let column = self.column_mut::<T>()?;
        let length = column.length();
        column
            .at_mut(index)
            .ok_or_else(|| PositionOutOfBoundsError { index, length }.into())
            .map_err(ClusterError::Column)
    }

    /// Overwrites `entity`'s value of component `T`.
    pub fn set_component<T: Clone + 'static>(
        &mut self,
        entity: EntityID,
        component: T,
    ) -> Result<(), ClusterError> {
        *self.get_component_mut(entity)? = component;
        Ok(())
    }

    /// Moves `entity`'s row into `destination`, carrying every component
    /// type present in both clusters.
    ///
    /// The entity is appended to the destination and each shared value is
    /// moved through the registry's operation table at the entity's
    /// current row. The caller is responsible for pushing any newly added
    /// component values into the destination and for removing the vacated
    /// row from this cluster afterwards.
    ///
    /// ## Returns
    /// The entity's new row index in `destination`.
    pub fn carry_entity(
        &mut self,
        destination: &mut Cluster,
        entity: EntityID,
    ) -> Result<Index, ClusterError> {
        self.carry_entity_excluding(destination, entity, &Signature::default())
    }

    /// [`carry_entity`](Cluster::carry_entity) with an exclusion set.
    ///
    /// Component types set in `excluded` are not carried even when both
    /// clusters store them; the caller supplies fresh values for those
    /// instead. Used by attach paths that overwrite already-present
    /// components during a migration.
    pub fn carry_entity_excluding(
        &mut self,
        destination: &mut Cluster,
        entity: EntityID,
        excluded: &Signature,
    ) -> Result<Index, ClusterError> {
        let index = self
            .indices
            .get(&entity)
            .copied()
            .ok_or(UnknownEntityError { entity })?;

        destination.push_entity(entity);

        for (&component_id, column) in self.columns.iter_mut() {
            if excluded.has(component_id) {
                continue;
            }
            if let Some(destination_column) = destination.columns.get_mut(&component_id) {
                column_carry(
                    component_id,
                    index,
                    column.as_mut(),
                    destination_column.as_mut(),
                )?;
            }
        }

        Ok((destination.size() - 1) as Index)
    }

    /// Copies the row at `index` into `destination` without mutating this
    /// cluster, registering it there under `entity`.
    ///
    /// Every component type of this cluster must have a column in the
    /// destination; each value is cloned through the registry's operation
    /// table.
    ///
    /// ## Returns
    /// The new row index in `destination`.
    pub fn copy_entity(
        &self,
        destination: &mut Cluster,
        entity: EntityID,
        index: Index,
    ) -> Result<Index, ClusterError> {
        destination.push_entity(entity);

        for (&component_id, column) in self.columns.iter() {
            let destination_column = destination.columns.get_mut(&component_id).ok_or(
                MissingColumnError {
                    component_id,
                    component_name: column.element_type_name(),
                },
            )?;

            column_copy(
                component_id,
                index,
                column.as_ref(),
                destination_column.as_mut(),
            )?;
        }

        Ok((destination.size() - 1) as Index)
    }

    /// Resolves the typed column for `T`.
    fn column<T: Clone + 'static>(&self) -> Result<&Column<T>, ClusterError> {
        let component_id = component_id_of::<T>();
        let column = self
            .columns
            .get(&component_id)
            .ok_or(MissingColumnError {
                component_id,
                component_name: type_name::<T>(),
            })?;

        let found = column.element_type_name();
        column
            .as_any()
            .downcast_ref::<Column<T>>()
            .ok_or_else(|| {
                TypeMismatchError {
                    expected: type_name::<T>(),
                    found,
                }
                .into()
            })
            .map_err(ClusterError::Column)
    }

    /// Resolves the typed column for `T`, mutably.
    fn column_mut<T: Clone + 'static>(&mut self) -> Result<&mut Column<T>, ClusterError> {
        let component_id = component_id_of::<T>();
        let column = self
            .columns
            .get_mut(&component_id)
            .ok_or(MissingColumnError {
                component_id,
                component_name: type_name::<T>(),
            })?;

        let found = column.element_type_name();
        column
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or_else(|| {
                TypeMismatchError {
                    expected: type_name::<T>(),
                    found,
                }
                .into()
            })
            .map_err(ClusterError::Column)
    }

    /// Returns a raw pointer to the first row of `T`'s column.
    ///
    /// Used by view caches. The pointer is valid until the cluster's row
    /// count next changes or the cluster is destroyed.
    pub(crate) fn column_data_mut<T: Clone + 'static>(
        &mut self,
    ) -> Result<NonNull<T>, ClusterError> {
        let column = self.column_mut::<T>()?;
        Ok(NonNull::new(column.as_mut_ptr()).expect("vector storage is never null"))
    }
}
