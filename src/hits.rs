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

use std::collections::{BTreeMap, HashMap};

/// Counts how many lookups resolved to each physical node.
///
/// A node that has never been hit has no slot at all. Slots outlive the removal of their node
/// from the ring; only [`HitCounter::clear`] drops them.
#[derive(Debug, Default, Clone)]
pub(crate) struct HitCounter {
    counts: HashMap<String, u64>,
}

impl HitCounter {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, physical_node: &str) -> u64 {
        // Avoid allocating a new key on every hit of an already known node.
        if let Some(count) = self.counts.get_mut(physical_node) {
            *count += 1;
            return *count;
        }
        self.counts.insert(physical_node.to_owned(), 1);
        1
    }

    #[inline]
    pub(crate) fn get(&self, physical_node: &str) -> u64 {
        self.counts.get(physical_node).copied().unwrap_or(0)
    }

    /// Returns the count of every one of the given nodes, defaulting to `0` for those never hit.
    /// Counts of nodes not among `physical_nodes` are left out.
    pub(crate) fn project<'a, I>(&self, physical_nodes: I) -> BTreeMap<String, u64>
    where
        I: IntoIterator<Item = &'a String>,
    {
        physical_nodes
            .into_iter()
            .map(|node| (node.clone(), self.get(node)))
            .collect()
    }

    #[inline]
    pub(crate) fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}
