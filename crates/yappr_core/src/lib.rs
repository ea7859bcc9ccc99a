//! Block-list pre-filtering for the Yappr client: a fixed-size Bloom filter
//! over identity identifiers, its base64 transport codec, and the
//! viewer-scoped block-status cache seeded from authoritative lookups.
pub mod cache;
pub mod codec;
pub mod config;
pub mod consts;
pub mod errors;
pub mod filter;
pub mod identifier;
pub mod lookup;
pub mod platform;
pub mod seeder;
pub mod store;

pub use cache::{BlockCacheHandle, BlockStatusCache};
pub use codec::{from_base64, to_base64};
pub use config::{BlockCacheConfig, SeederConfig, YapprConfig};
pub use errors::{Result, YapprError};
pub use filter::{hash_positions, BloomFilter};
pub use identifier::{Identifier, IdentifierInput};
pub use lookup::{BlockLookup, DocumentBlockLookup};
pub use platform::{BlockDocument, BlockFilterDocument, PlatformDocument};
pub use seeder::{BlockStatusSeeder, SeedReport};
pub use store::{FileFilterStore, FilterStore, MemoryFilterStore, StoredFilter};
