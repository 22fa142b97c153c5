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

use log::{debug, trace, warn};

use crate::{
    entry::{virtual_node_label, RingEntry},
    hits::HitCounter,
    types::{HashRingError, Hasher, Result, Vnid},
};

#[derive(Debug)]
pub(crate) struct HashRingState<H>
where
    H: Hasher,
{
    hasher: H,
    vnodes_per_node: Vnid,
    nodes: BTreeSet<String>,
    // Always sorted by `RingEntry::hash`, ascending.
    pub(crate) entries: Vec<RingEntry>,
    hits: HitCounter,
}

impl<H> Clone for HashRingState<H>
where
    H: Hasher,
{
    fn clone(&self) -> Self {
        Self {
            hasher: H::default(),
            vnodes_per_node: self.vnodes_per_node,
            nodes: self.nodes.clone(),
            entries: self.entries.clone(),
            hits: self.hits.clone(),
        }
    }
}

impl<H> HashRingState<H>
where
    H: Hasher,
{
    #[inline]
    pub(crate) fn with_capacity(capacity: usize, hasher: H, vnodes_per_node: Vnid) -> Self {
        Self {
            hasher,
            vnodes_per_node,
            nodes: BTreeSet::new(),
            entries: Vec::with_capacity(capacity * vnodes_per_node as usize),
            hits: HitCounter::new(),
        }
    }

    /// Places all virtual nodes of the given physical node on the ring, unless it is already
    /// there.
    ///
    /// NOTE: A virtual node whose hash collides with an existing entry is inserted regardless;
    /// the stable sort keeps the older entry first.
    pub(crate) fn insert(&mut self, physical_node: &str) -> bool {
        if self.nodes.contains(physical_node) {
            trace!("node '{}' is already in the ring", physical_node);
            return false;
        }
        self.nodes.insert(physical_node.to_owned());

        let new = self.virtual_nodes_of(physical_node);
        for entry in self.collisions(&new) {
            warn!("vnode '{}' collides with an existing ring position", entry);
        }
        for entry in &new {
            trace!("vnode '{}' has been included in the ring extension", entry);
        }
        self.entries.extend(new);
        // Stable, so that equal hashes keep their insertion order.
        self.entries.sort_by_key(|entry| entry.hash);
        debug!(
            "added node '{}'; ring now holds {} nodes ({} vnodes)",
            physical_node,
            self.len_nodes(),
            self.len_virtual_nodes()
        );
        true
    }

    /// Drops every virtual node of the given physical node from the ring.
    ///
    /// An entry is dropped only if both its hash is one of the node's virtual node hashes and it
    /// belongs to that node, so that a colliding virtual node of some other node survives.
    pub(crate) fn remove(&mut self, physical_node: &str) -> bool {
        if !self.nodes.remove(physical_node) {
            trace!("node '{}' is not in the ring", physical_node);
            return false;
        }

        let hasher = &mut self.hasher;
        let hashes = (0..self.vnodes_per_node)
            .map(|vnid| hasher.digest(&virtual_node_label(physical_node, vnid)))
            .collect::<BTreeSet<_>>();
        // `retain` preserves the relative order, hence no re-sorting is needed.
        self.entries.retain(|entry| {
            !(hashes.contains(&entry.hash) && entry.physical_node == physical_node)
        });
        debug!(
            "removed node '{}'; ring now holds {} nodes ({} vnodes)",
            physical_node,
            self.len_nodes(),
            self.len_virtual_nodes()
        );
        true
    }

    /// Builds (without placing them) all virtual nodes of the given physical node.
    pub(crate) fn virtual_nodes_of(&mut self, physical_node: &str) -> Vec<RingEntry> {
        let hasher = &mut self.hasher;
        (0..self.vnodes_per_node)
            .map(|vnid| RingEntry::new(hasher, physical_node, vnid))
            .collect()
    }

    /// Returns those of the `new` entries whose position is already taken, either by an entry of
    /// the ring or by an earlier one among `new`.
    ///
    /// `new` must not have been placed on the ring yet.
    pub(crate) fn collisions<'a>(&self, new: &'a [RingEntry]) -> Vec<&'a RingEntry> {
        new.iter()
            .enumerate()
            .filter(|(i, entry)| {
                self.has_hash(entry.hash) || new[..*i].iter().any(|prev| prev.hash == entry.hash)
            })
            .map(|(_, entry)| entry)
            .collect()
    }

    // `self.entries` must be sorted.
    #[inline]
    fn has_hash(&self, hash: u32) -> bool {
        self.entries
            .binary_search_by_key(&hash, |entry| entry.hash)
            .is_ok()
    }

    // returns a reference to the actual `RingEntry` in `HashRingState.entries`
    fn successor_of(&mut self, key: &str) -> Result<&RingEntry> {
        // Return an error if the ring is empty...
        if self.entries.is_empty() {
            return Err(HashRingError::EmptyRing);
        }
        // ...otherwise find the first entry strictly past the key's hash, wrapping around to the
        // first one if there is none.
        let hash = self.hasher.digest(key);
        let index = self.entries.partition_point(|entry| entry.hash <= hash) % self.entries.len();
        Ok(&self.entries[index])
    }

    /// Resolves the given key to its successor entry and records a hit for that entry's physical
    /// node.
    pub(crate) fn entry_for_key(&mut self, key: &str) -> Result<RingEntry> {
        let entry = self.successor_of(key)?.clone();
        let count = self.hits.record(&entry.physical_node);
        trace!("key {:?} --> {} (hit #{})", key, entry, count);
        Ok(entry)
    }

    #[inline]
    pub(crate) fn vnodes_per_node(&self) -> Vnid {
        self.vnodes_per_node
    }

    #[inline]
    pub(crate) fn len_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn len_virtual_nodes(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn contains_node(&self, physical_node: &str) -> bool {
        self.nodes.contains(physical_node)
    }

    #[inline]
    pub(crate) fn nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    #[inline]
    pub(crate) fn hits(&self) -> BTreeMap<String, u64> {
        self.hits.project(&self.nodes)
    }

    #[inline]
    pub(crate) fn clear_hits(&mut self) {
        self.hits.clear();
    }
}

impl<H> Display for HashRingState<H>
where
    H: Hasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "HashRingState ({} nodes X {} virtual, {} hits recorded) {{",
            self.len_nodes(),
            self.vnodes_per_node,
            self.hits.total()
        )?;
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "\t- ({:0>6})  {}", i, entry)?
        }
        writeln!(f, "}}")
    }
}
