//! Fixed-size Bloom filter over identity identifiers (block-list pre-filter).
//!
//! Layout: exactly `FILTER_SIZE_BYTES` bytes, bit `pos` lives at
//! `bits[pos / 8] & (1 << (pos % 8))` (LSB-first within a byte).
//!
//! Positions: SHA-256 of the identifier bytes, then big-endian u32 words
//! `digest[(i % 8) * 4..][..4] % FILTER_BITS` for `i in 0..HASH_COUNT`; the
//! digest is re-hashed every 8 words. Filters serialized elsewhere depend on
//! this exact derivation.
use crate::consts::{FILTER_BITS, FILTER_SIZE_BYTES, HASH_COUNT, WORDS_PER_DIGEST};
use crate::errors::Result;
use crate::identifier::IdentifierInput;
use byteorder::{BigEndian, ByteOrder};
use sha2::{Digest, Sha256};
use std::fmt;

/// Bit positions consulted for `key`. Duplicates are possible.
pub fn hash_positions(key: &[u8]) -> [u32; HASH_COUNT] {
    let mut digest = Sha256::digest(key);
    let mut out = [0u32; HASH_COUNT];
    for (i, slot) in out.iter_mut().enumerate() {
        if i > 0 && i % WORDS_PER_DIGEST == 0 {
            digest = Sha256::digest(digest.as_slice());
        }
        let off = (i % WORDS_PER_DIGEST) * 4;
        *slot = BigEndian::read_u32(&digest[off..off + 4]) % FILTER_BITS;
    }
    out
}

#[derive(Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: Vec<u8>,
    item_count: u64,
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("item_count", &self.item_count)
            .field("fill_ratio", &self.fill_ratio())
            .finish()
    }
}

impl BloomFilter {
    pub const SIZE_BYTES: usize = FILTER_SIZE_BYTES;

    /// All-zero filter.
    pub fn new() -> Self {
        Self { bits: vec![0u8; FILTER_SIZE_BYTES], item_count: 0 }
    }

    /// Copy `data` into a fresh buffer: shorter input is zero-padded, longer is truncated.
    pub fn from_bytes(data: &[u8], item_count: u64) -> Self {
        let mut bits = vec![0u8; FILTER_SIZE_BYTES];
        let n = data.len().min(FILTER_SIZE_BYTES);
        bits[..n].copy_from_slice(&data[..n]);
        Self { bits, item_count }
    }

    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Set the identifier's bits. The count is bumped even if nothing changed.
    pub fn add<'a>(&mut self, id: impl Into<IdentifierInput<'a>>) -> Result<()> {
        let key = id.into().to_bytes()?;
        self.add_bytes(&key);
        Ok(())
    }

    pub fn add_bytes(&mut self, key: &[u8]) {
        for bit in hash_positions(key) {
            let idx = (bit / 8) as usize; let off = (bit & 7) as u8;
            self.bits[idx] |= 1u8 << off;
        }
        self.item_count = self.item_count.saturating_add(1);
    }

    /// `false` means definitely never added; `true` means probably added.
    pub fn might_contain<'a>(&self, id: impl Into<IdentifierInput<'a>>) -> Result<bool> {
        let key = id.into().to_bytes()?;
        Ok(self.might_contain_bytes(&key))
    }

    pub fn might_contain_bytes(&self, key: &[u8]) -> bool {
        hash_positions(key).iter().all(|&bit| {
            let idx = (bit / 8) as usize; let off = (bit & 7) as u8;
            (self.bits[idx] & (1u8 << off)) != 0
        })
    }

    /// `(1 - e^(-k*n/m))^k`; diagnostic only.
    ///
    /// After merges `n` double-counts shared items, so this is an upper bound.
    pub fn estimate_false_positive_rate(&self) -> f64 {
        if self.item_count == 0 {
            return 0.0;
        }
        let k = HASH_COUNT as f64;
        let m = FILTER_BITS as f64;
        let n = self.item_count as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Share of bits currently set.
    pub fn fill_ratio(&self) -> f64 {
        let set: u32 = self.bits.iter().map(|b| b.count_ones()).sum();
        set as f64 / FILTER_BITS as f64
    }

    /// OR `other` into `self`; item counts are summed without deduplication.
    pub fn merge(&mut self, other: &BloomFilter) {
        for (dst, src) in self.bits.iter_mut().zip(other.bits.iter()) {
            *dst |= *src;
        }
        self.item_count = self.item_count.saturating_add(other.item_count);
    }

    /// Union of all `filters` as a new filter; inputs are untouched.
    pub fn merge_all<'a>(filters: impl IntoIterator<Item = &'a BloomFilter>) -> BloomFilter {
        let mut out = BloomFilter::new();
        for f in filters {
            out.merge(f);
        }
        out
    }

    /// Copy of the bit buffer, always `SIZE_BYTES` long.
    pub fn serialize(&self) -> Vec<u8> {
        self.bits.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }
}
