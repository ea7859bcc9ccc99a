// crates/yappr_core/src/consts.rs

/// Size of the serialized filter buffer.
pub const FILTER_SIZE_BYTES: usize = 5_000;
/// Addressable bits in the filter (`FILTER_SIZE_BYTES * 8`).
pub const FILTER_BITS: u32 = 40_000;
/// Bit positions derived per identifier.
pub const HASH_COUNT: usize = 10;

/// Platform-native identity length.
pub const IDENTIFIER_BYTES: usize = 32;

/// Layout version stored next to the encoded payload (the payload itself carries none).
pub const FILTER_VERSION: u32 = 1;

// positions are 4-byte words taken from a 32-byte digest
pub(crate) const WORDS_PER_DIGEST: usize = 8;

const _: () = { assert!(FILTER_SIZE_BYTES * 8 == FILTER_BITS as usize); };
