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

//! A consistent hashing ring that deterministically maps string keys onto a dynamic set of
//! physical nodes, while keeping count of how many keys landed on each of them.
//!
//! # Overview
//!
//! Each physical node (any string identifier: a server address, a file path, etc.) is placed on
//! the ring `vnodes_per_node` times, once per *virtual node* labelled `"<node>#VN<i>"`. A key is
//! assigned to the first virtual node whose position is strictly greater than the key's own
//! position, wrapping around to the very first one when there is none.
//!
//! Positions are computed by a [`Hasher`]; the built-in [`Fnv1aHasher`] is a fast,
//! non-cryptographic, 32-bit FNV-1a variant. Alternative implementations based on BLAKE3 and
//! BLAKE2b are available behind the `blake3-hash` and `blake2b-hash` crate features.
//!
//! Every lookup also counts as a *hit* for the physical node it resolved to, so that callers can
//! report how evenly their keys are spread over the nodes (see [`HashRing::hits`]).
//!
//! In multi-threaded contexts, [`HashRing<H>`] should be explicitly wrapped in [`Arc`][Arc].
//!
//! # Example
//!
//! ```rust
//! use hitring::{HashRing, Result};
//!
//! # fn main() -> Result<()> {
//! let ring = HashRing::with_nodes(4, &["img1.jpg", "img2.jpg", "img3.jpg"])?;
//! assert_eq!(ring.len_virtual_nodes(), 12);
//!
//! let first = ring.physical_node_for_key("doc/a/title")?;
//! let again = ring.physical_node_for_key("doc/a/title")?;
//! assert_eq!(first, again);
//!
//! let hits = ring.hits();
//! assert_eq!(hits.len(), 3);
//! assert_eq!(hits[&first], 2);
//! # Ok(())
//! # }
//! ```
//!
//!  [Arc]: https://doc.rust-lang.org/std/sync/struct.Arc.html

#![deny(missing_debug_implementations)]

mod entry;
mod hits;
mod ring;
mod state;
mod types;

pub use crate::entry::RingEntry;
pub use crate::ring::HashRing;
pub use crate::types::{
    Fnv1aHasher, HashRingError, Hasher, Result, Vnid, DEFAULT_VNODES_PER_NODE,
};
#[cfg(any(feature = "blake2b-hash", doc))]
pub use crate::types::Blake2bHasher;
#[cfg(any(feature = "blake3-hash", doc))]
pub use crate::types::Blake3Hasher;
