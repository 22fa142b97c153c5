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

use std::fmt::{Display, Formatter};

use crate::types::{Hasher, Vnid};

/// Returns the label of the `vnid`-th virtual node of the given physical node, i.e.,
/// `"<physical_node>#VN<vnid>"`.
#[inline]
pub(crate) fn virtual_node_label(physical_node: &str, vnid: Vnid) -> String {
    format!("{}#VN{}", physical_node, vnid)
}

/// RingEntry represents a single virtual node, i.e., one point on the consistent hashing ring.
///
/// Entries handed out by the [`HashRing<H>`] are copies; mutating the ring does not affect them.
///
///
///  [`HashRing<H>`]: crate::HashRing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RingEntry {
    pub(crate) hash: u32,
    pub(crate) virtual_node: String,
    pub(crate) physical_node: String,
    vnid: Vnid,
}

impl RingEntry {
    pub(crate) fn new<H: Hasher>(hasher: &mut H, physical_node: &str, vnid: Vnid) -> Self {
        let virtual_node = virtual_node_label(physical_node, vnid);
        let hash = hasher.digest(&virtual_node);
        RingEntry {
            hash,
            virtual_node,
            physical_node: physical_node.to_owned(),
            vnid,
        }
    }

    /// The position of this entry on the ring.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// The label this entry's position was derived from (`"<physical_node>#VN<vnid>"`).
    #[inline]
    pub fn virtual_node(&self) -> &str {
        &self.virtual_node
    }

    /// The physical node this entry stands for.
    #[inline]
    pub fn physical_node(&self) -> &str {
        &self.physical_node
    }

    /// The index of this virtual node among those of its physical node, i.e., the `<vnid>` of its
    /// label.
    #[inline]
    pub fn vnid(&self) -> Vnid {
        self.vnid
    }
}

impl Display for RingEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:08x} ({} --> {})",
            self.hash, self.virtual_node, self.physical_node
        )
    }
}
