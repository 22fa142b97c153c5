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

use thiserror::Error;

/// A type for the internal ID of each virtual node of every physical node in the ring.
///
/// This is merely a type alias for `u16` for now.
/// Therefore, each physical node in the [`HashRing<H>`] can be mapped at least once and at most
/// [`u16::MAX`] times on the consistent hashing ring.
///
///
///  [`HashRing<H>`]: crate::HashRing
pub type Vnid = u16;

/// The number of virtual nodes per physical node of a [`HashRing`] created through its `Default`
/// implementation.
///
///
///  [`HashRing`]: crate::HashRing
pub const DEFAULT_VNODES_PER_NODE: Vnid = 12;

/// A custom `Result` type for this crate, combining a return value with a [`HashRingError`].
pub type Result<T> = std::result::Result<T, HashRingError>;

/// An error type returned by calls to the API exposed by this crate.
///
/// Adding an already present node or removing an absent one are not errors; those are reported
/// through the `bool` returned by the respective methods.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashRingError {
    /// The number of virtual nodes per physical node, provided for the construction of the
    /// consistent hashing ring, is invalid (i.e., `0`).
    #[error("Invalid configuration: {0} virtual nodes per physical node")]
    InvalidConfiguration(Vnid),

    /// The consistent hashing ring is currently empty, so no key can be assigned anywhere.
    #[error("HashRing is empty")]
    EmptyRing,
}

/// A trait to be implemented by any type that needs to act as the hash algorithm that places
/// virtual nodes and keys on the ring.
///
/// The ring position space is the full `u32` range.
// NOTE: The `Hasher` must also be `Default` as a means of instantiating it anew when the ring
// state is cloned.
pub trait Hasher: Default {
    /// Given a string, returns its position on the ring.
    fn digest(&mut self, input: &str) -> u32;
}

const FNV_32_PRIME: i32 = 16_777_619;
const FNV_32_OFFSET_BASIS: i32 = 2_166_136_261_u32 as i32;

/// The built-in [`Hasher`]: 32-bit FNV-1a followed by a few shift-add/shift-xor mixing rounds.
///
/// The input is consumed as UTF-16 code units and all arithmetic is signed 32-bit wrapping, with
/// arithmetic right shifts. The result is the absolute value of the final signed state, so
/// positions always fall within `0..=2^31`.
///
/// # Examples
///
/// ```rust
/// use hitring::{Fnv1aHasher, Hasher};
///
/// let mut h = Fnv1aHasher::default();
/// assert_eq!(h.digest(""), 1_494_218_850);
/// assert_eq!(h.digest("a"), 649_470_159);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Fnv1aHasher;

impl Hasher for Fnv1aHasher {
    fn digest(&mut self, input: &str) -> u32 {
        let mut h = input.encode_utf16().fold(FNV_32_OFFSET_BASIS, |h, c| {
            (h ^ i32::from(c)).wrapping_mul(FNV_32_PRIME)
        });
        h = h.wrapping_add(h.wrapping_shl(13));
        h ^= h >> 7;
        h = h.wrapping_add(h.wrapping_shl(3));
        h ^= h >> 17;
        h = h.wrapping_add(h.wrapping_shl(5));
        h.unsigned_abs()
    }
}

/// A [`Hasher`] implementation based on the [BLAKE3][BLAKE3.io] cryptographic hash function, as
/// implemented in the [blake3][blake3] crate; the ring position is taken from the first 4 bytes of
/// the digest.
///
/// To use this `Hasher` implementation in `hitring`, the `blake3-hash` crate feature must be
/// enabled.
///
///  [BLAKE3.io]: https://blake3.io/
///  [blake3]: https://docs.rs/blake3/0.3/blake3/
#[cfg(any(feature = "blake3-hash", doc))]
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

#[cfg(feature = "blake3-hash")]
impl Hasher for Blake3Hasher {
    #[inline]
    fn digest(&mut self, input: &str) -> u32 {
        leading_u32(blake3::hash(input.as_bytes()).as_bytes())
    }
}

/// A [`Hasher`] implementation based on the [BLAKE2b][BLAKE2b] cryptographic hash function, as
/// implemented in the [blake2b_simd][blake2b_simd] crate; the ring position is taken from the first
/// 4 bytes of the digest.
///
/// To use this `Hasher` implementation in `hitring`, the `blake2b-hash` crate feature must be
/// enabled.
///
///  [BLAKE2b]: https://www.blake2.net/
///  [blake2b_simd]: https://docs.rs/blake2b_simd/0.5/blake2b_simd/
#[cfg(any(feature = "blake2b-hash", doc))]
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake2bHasher;

#[cfg(feature = "blake2b-hash")]
impl Hasher for Blake2bHasher {
    #[inline]
    fn digest(&mut self, input: &str) -> u32 {
        leading_u32(blake2b_simd::blake2b(input.as_bytes()).as_bytes())
    }
}

#[cfg(any(feature = "blake3-hash", feature = "blake2b-hash"))]
#[inline]
fn leading_u32(digest: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&digest[..4]);
    u32::from_le_bytes(buf)
}
