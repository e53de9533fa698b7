//! Core identifier types, capacity constants, and the `Signature` bitmask.
//!
//! This module defines the small, copyable numeric identifiers shared by
//! every subsystem of the storage engine, together with the fixed-width
//! component bitset used to describe archetypes.
//!
//! ## Design
//!
//! - Entities, clusters, and component types are identified by plain
//!   unsigned integers, issued monotonically and never reused.
//! - An archetype is described by a [`Signature`]: a fixed-size array of
//!   `u64` words with one bit per registered component type.
//! - The word count is a compile-time constant derived from
//!   [`MAX_COMPONENT_COUNT`], so every bulk signature operation walks a
//!   small fixed number of words regardless of how many bits are set.
//!
//! Signatures are value types: they are compared, hashed, and copied by
//! content, and serve directly as map keys in the cluster registry.

use std::hash::{Hash, Hasher};


/// Globally unique entity identifier. Issued from 1; 0 is never handed out.
pub type EntityID = u64;
/// Unique identifier for a cluster (one archetype table).
pub type ClusterID = u64;
/// Unique identifier for a registered component type.
pub type ComponentID = u32;
/// Row index inside a cluster's dense storage.
pub type Index = u32;

/// Maximum number of distinct component types in one process.
pub const MAX_COMPONENT_COUNT: usize = 1024;
/// Number of `u64` words required to represent a full component signature.
pub const SIGNATURE_SIZE: usize = (MAX_COMPONENT_COUNT + 63) / 64;

/// Bitset describing the exact set of component types of one archetype.
///
/// ## Notes
/// All bulk operations iterate every word unconditionally; the capacity is
/// fixed and small, so each operation costs a handful of word reads rather
/// than a data-dependent loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Packed component bitset.
    pub components: [u64; SIGNATURE_SIZE],
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            components: [0u64; SIGNATURE_SIZE],
        }
    }
}

impl Signature {
    /// Sets the bit corresponding to `component_id`.
    #[inline]
    pub fn set(&mut self, component_id: ComponentID) {
        let index = (component_id as usize) / 64;
        let bits = (component_id as usize) % 64;
        self.components[index] |= 1u64 << bits;
    }

    /// Clears the bit corresponding to `component_id`.
    #[inline]
    pub fn clear(&mut self, component_id: ComponentID) {
        let index = (component_id as usize) / 64;
        let bits = (component_id as usize) % 64;
        self.components[index] &= !(1u64 << bits);
    }

    /// Sets or clears the bit corresponding to `component_id`.
    #[inline]
    pub fn set_to(&mut self, component_id: ComponentID, value: bool) {
        if value {
            self.set(component_id);
        } else {
            self.clear(component_id);
        }
    }

    /// Returns `true` if `component_id` is present in this signature.
    #[inline]
    pub fn has(&self, component_id: ComponentID) -> bool {
        let index = (component_id as usize) / 64;
        let bits = (component_id as usize) % 64;
        (self.components[index] >> bits) & 1 == 1
    }

    /// Returns `true` if every bit set in `self` is also set in `other`.
    ///
    /// This is the archetype containment test: a view with required set
    /// `self` matches a cluster whose signature is `other` exactly when
    /// `self.subset_of(other)` holds.
    #[inline]
    pub fn subset_of(&self, other: &Signature) -> bool {
        for (word, other_word) in self.components.iter().zip(other.components.iter()) {
            if (word & other_word) != *word {
                return false;
            }
        }
        true
    }

    /// Returns `true` if the two signatures share at least one set bit.
    ///
    /// Used by exclusion filters: a cluster is rejected when its signature
    /// intersects the filter's `without` set.
    #[inline]
    pub fn intersects(&self, other: &Signature) -> bool {
        for (word, other_word) in self.components.iter().zip(other.components.iter()) {
            if (word & other_word) != 0 {
                return true;
            }
        }
        false
    }

    /// Returns `true` if any bit is set.
    #[inline]
    pub fn any(&self) -> bool {
        self.components.iter().any(|&word| word != 0)
    }

    /// Merges `other` into `self` as a bitwise union.
    #[inline]
    pub fn merge(&mut self, other: &Signature) {
        for (word, other_word) in self.components.iter_mut().zip(other.components.iter()) {
            *word |= other_word;
        }
    }

    /// Folds the signature into a single word for use as a map hash.
    ///
    /// The weighting by word position keeps permuted word contents from
    /// hashing identically. Collisions are broken by equality comparison,
    /// so hash quality only affects bucket distribution.
    #[inline]
    pub fn fold(&self) -> u64 {
        self.components
            .iter()
            .enumerate()
            .fold(0u64, |hash, (index, &word)| {
                hash.wrapping_add((index as u64 + 1).wrapping_mul(word))
            })
    }

    /// Iterates over all component IDs set in this signature.
    pub fn iter_components(&self) -> impl Iterator<Item = ComponentID> + '_ {
        self.components
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let base = word_index * 64;
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let tz = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some((base + tz) as ComponentID)
                })
            })
    }
}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fold());
    }
}

/// Builds a component signature from a list of component IDs.
pub fn build_signature(component_ids: &[ComponentID]) -> Signature {
    let mut signature = Signature::default();
    for &component_id in component_ids {
        signature.set(component_id);
    }
    signature
}
