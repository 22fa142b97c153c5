// This file is part of hitring.
//
// Copyright 2021 Christos Katsakioris
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    entry::RingEntry,
    state::HashRingState,
    types::{Fnv1aHasher, HashRingError, Hasher, Result, Vnid, DEFAULT_VNODES_PER_NODE},
};

/// The consistent hashing ring data structure.
///
/// Users will probably interact with this crate mostly through this type, as it is central to its
/// API.
///
/// All of its state (the ring entries, the set of physical nodes and the hit counters) sits behind
/// a single lock which every method holds for its whole duration; in particular, a lookup and the
/// hit it records happen atomically. In multi-threaded contexts, it needs to be wrapped in
/// [`Arc`][Arc].
///
/// To find out more general information regarding its use, refer to the crate-level documentation.
///
///
///  [Arc]: https://doc.rust-lang.org/std/sync/struct.Arc.html
#[derive(Debug)]
pub struct HashRing<H = Fnv1aHasher>
where
    H: Hasher,
{
    inner: Mutex<HashRingState<H>>,
}

impl<H> Clone for HashRing<H>
where
    H: Hasher,
{
    /// Deep-copies the ring, including its hit counters.
    fn clone(&self) -> Self {
        Self {
            inner: Mutex::new(self.state().clone()),
        }
    }
}

impl HashRing<Fnv1aHasher> {
    /// Create a new [`HashRing<H>`] with the given number of *virtual nodes* per physical node and
    /// initialize it with the provided physical nodes (duplicates among them are ignored).
    ///
    /// The new [`HashRing<H>`] will employ the built-in [`Fnv1aHasher`].
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per physical
    /// node is `0`.
    #[inline]
    pub fn with_nodes<S>(vnodes_per_node: Vnid, nodes: &[S]) -> Result<Self>
    where
        S: AsRef<str>,
    {
        Self::with_hasher_and_nodes(Fnv1aHasher::default(), vnodes_per_node, nodes)
    }

    /// Create a new, empty [`HashRing<H>`] with the given number of *virtual nodes* per physical
    /// node.
    ///
    /// The new [`HashRing<H>`] will employ the built-in [`Fnv1aHasher`].
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per physical
    /// node is `0`.
    #[inline]
    pub fn new(vnodes_per_node: Vnid) -> Result<Self> {
        Self::with_hasher(Fnv1aHasher::default(), vnodes_per_node)
    }
}

impl Default for HashRing<Fnv1aHasher> {
    /// An empty ring with [`DEFAULT_VNODES_PER_NODE`] virtual nodes per physical node.
    fn default() -> Self {
        Self {
            inner: Mutex::new(HashRingState::with_capacity(
                0,
                Fnv1aHasher::default(),
                DEFAULT_VNODES_PER_NODE,
            )),
        }
    }
}

impl<H> HashRing<H>
where
    H: Hasher,
{
    /// Create a new [`HashRing<H>`] with the given number of *virtual nodes* per physical node and
    /// initialize it with the provided physical nodes (duplicates among them are ignored).
    ///
    /// The new [`HashRing<H>`] will employ the provided [`Hasher`] for placing both the virtual
    /// nodes and the looked up keys on the ring.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per physical
    /// node is `0`.
    pub fn with_hasher_and_nodes<S>(hasher: H, vnodes_per_node: Vnid, nodes: &[S]) -> Result<Self>
    where
        S: AsRef<str>,
    {
        if vnodes_per_node == 0 {
            return Err(HashRingError::InvalidConfiguration(vnodes_per_node));
        }
        let mut inner = HashRingState::with_capacity(nodes.len(), hasher, vnodes_per_node);
        for node in nodes {
            inner.insert(node.as_ref());
        }
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Create a new, empty [`HashRing<H>`] with the given number of *virtual nodes* per physical
    /// node, employing the provided [`Hasher`].
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::InvalidConfiguration`] if the number of virtual nodes per physical
    /// node is `0`.
    #[inline]
    pub fn with_hasher(hasher: H, vnodes_per_node: Vnid) -> Result<Self> {
        Self::with_hasher_and_nodes::<&str>(hasher, vnodes_per_node, &[])
    }

    // No method leaves the state half-updated when it panics; a poisoned lock is recovered.
    #[inline]
    fn state(&self) -> MutexGuard<'_, HashRingState<H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of *virtual nodes* each physical node is mapped to on the ring.
    pub fn vnodes_per_node(&self) -> Vnid {
        self.state().vnodes_per_node()
    }

    /// Returns the number of physical nodes that currently populate the consistent hashing ring.
    pub fn len_nodes(&self) -> usize {
        self.state().len_nodes()
    }

    /// Returns the number of *virtual nodes* that currently populate the consistent hashing ring.
    ///
    /// This should always be equal to the result of [`HashRing::len_nodes`] multiplied by
    /// [`HashRing::vnodes_per_node`].
    pub fn len_virtual_nodes(&self) -> usize {
        self.state().len_virtual_nodes()
    }

    /// Returns `true` if no physical node currently populates the ring.
    pub fn is_empty(&self) -> bool {
        self.state().len_nodes() == 0
    }

    /// Returns `true` if the given physical node is currently in the ring.
    pub fn contains_node(&self, physical_node: &str) -> bool {
        self.state().contains_node(physical_node)
    }

    /// Insert the given physical node in the consistent hashing ring, along with all of its
    /// virtual nodes.
    ///
    /// Returns `false`, leaving the ring untouched, if the node is already in the ring.
    pub fn add_physical_node(&self, physical_node: &str) -> bool {
        self.state().insert(physical_node)
    }

    /// Remove the given physical node, along with all of its virtual nodes, from the consistent
    /// hashing ring.
    ///
    /// Returns `false`, leaving the ring untouched, if the node is not in the ring.
    ///
    /// The hits already recorded for the node are kept; they are reported again by
    /// [`HashRing::hits`] if the node is later re-inserted, unless [`HashRing::clear_hits`] is
    /// called in between.
    pub fn remove_physical_node(&self, physical_node: &str) -> bool {
        self.state().remove(physical_node)
    }

    /// Look up in the consistent hashing ring and return a copy of the [`RingEntry`] that the given
    /// `key` should be assigned on, i.e., the first entry whose hash is strictly greater than the
    /// key's, or the first entry of the ring if there is none.
    ///
    /// Every successful lookup counts as one hit for the physical node of the returned entry.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::EmptyRing`] if the consistent hashing ring is currently empty of
    /// physical nodes.
    pub fn entry_for_key(&self, key: &str) -> Result<RingEntry> {
        self.state().entry_for_key(key)
    }

    /// Look up in the consistent hashing ring and return the physical node that the given `key`
    /// should be assigned on.
    ///
    /// Like [`HashRing::entry_for_key`], this records a hit.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::EmptyRing`] if the consistent hashing ring is currently empty of
    /// physical nodes.
    #[inline]
    pub fn physical_node_for_key(&self, key: &str) -> Result<String> {
        self.entry_for_key(key).map(|entry| entry.physical_node)
    }

    /// Look up in the consistent hashing ring and return the label of the virtual node that the
    /// given `key` should be assigned on.
    ///
    /// Like [`HashRing::entry_for_key`], this records a hit.
    ///
    /// # Errors
    ///
    /// Returns [`HashRingError::EmptyRing`] if the consistent hashing ring is currently empty of
    /// physical nodes.
    #[inline]
    pub fn virtual_node_for_key(&self, key: &str) -> Result<String> {
        self.entry_for_key(key).map(|entry| entry.virtual_node)
    }

    /// Returns the number of lookups that resolved to each of the physical nodes currently in the
    /// ring, including `0` for those never hit.
    pub fn hits(&self) -> BTreeMap<String, u64> {
        self.state().hits()
    }

    /// Forgets every hit recorded so far, including those of nodes no longer in the ring.
    pub fn clear_hits(&self) {
        self.state().clear_hits()
    }

    /// Returns a copy of the set of physical nodes currently in the ring.
    pub fn physical_nodes(&self) -> BTreeSet<String> {
        self.state().nodes().clone()
    }

    /// Returns a copy of all [`RingEntry`]s currently in the ring, in ascending order of hash.
    pub fn entries(&self) -> Vec<RingEntry> {
        self.state().entries.clone()
    }
}

impl<H, S> Extend<S> for HashRing<H>
where
    H: Hasher,
    S: AsRef<str>,
{
    /// Extend the [`HashRing<H>`] by the physical nodes provided through the given
    /// [`IntoIterator`]; those already in the ring are skipped.
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        // Exclusive access already; no locking needed.
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        for node in iter {
            inner.insert(node.as_ref());
        }
    }
}

impl<H> Display for HashRing<H>
where
    H: Hasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self.state())
    }
}
