//! Reconciles filter pre-checks and authoritative lookups into the block-status cache.
use crate::cache::{BlockCacheHandle, BlockStatusCache};
use crate::config::SeederConfig;
use crate::errors::Result;
use crate::filter::BloomFilter;
use crate::identifier::Identifier;
use crate::lookup::BlockLookup;
use std::collections::HashMap;
use std::sync::MutexGuard;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Already answered by the cache.
    pub cached: usize,
    /// Eliminated by the filter ("definitely not blocked").
    pub filtered_out: usize,
    pub confirmed_blocked: usize,
    pub confirmed_clear: usize,
}

pub struct BlockStatusSeeder<L: BlockLookup> {
    lookup: L,
    cache: BlockCacheHandle,
    config: SeederConfig,
}

impl<L: BlockLookup> BlockStatusSeeder<L> {
    pub fn new(lookup: L, cache: BlockCacheHandle, config: SeederConfig) -> Self {
        Self { lookup, cache, config }
    }

    pub fn cache(&self) -> &BlockCacheHandle {
        &self.cache
    }

    fn lock(&self) -> MutexGuard<'_, BlockStatusCache> {
        // entries are inserted whole; a poisoned map is still consistent
        self.cache.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Merge an authoritative batch result into `viewer`'s partition.
    pub fn seed_from_lookup(&self, viewer: &Identifier, results: HashMap<Identifier, bool>) -> usize {
        self.lock().seed(viewer, results)
    }

    /// Synchronous read for render paths; `None` means "must query".
    pub fn status(&self, viewer: &Identifier, candidate: &Identifier) -> Option<bool> {
        self.lock().get(viewer, candidate)
    }

    /// Fill the cache for `candidates`: cached entries are skipped, filter
    /// negatives are settled locally and the rest is confirmed in batches.
    ///
    /// A lookup failure is returned as-is; batches seeded before it stay seeded.
    pub fn resolve(
        &self,
        viewer: &Identifier,
        filter: Option<&BloomFilter>,
        candidates: &[Identifier],
    ) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        let mut unique = candidates.to_vec();
        unique.sort_unstable();
        unique.dedup();
        let mut pending = self.lock().unknown_among(viewer, &unique);
        report.cached = unique.len() - pending.len();

        if let Some(f) = filter {
            let (maybe, negatives): (Vec<Identifier>, Vec<Identifier>) = if f.is_empty() {
                (Vec::new(), pending)
            } else {
                pending.into_iter().partition(|c| f.might_contain_bytes(c.as_bytes()))
            };
            report.filtered_out = negatives.len();
            if self.config.seed_filter_negatives && !negatives.is_empty() {
                self.lock().seed(viewer, negatives.into_iter().map(|c| (c, false)));
            }
            pending = maybe;
        }

        for chunk in pending.chunks(self.config.max_batch.max(1)) {
            let mut results = self.lookup.lookup_blocked(viewer, chunk)?;
            // chunk is sorted; answers for ids we never asked about are dropped
            results.retain(|id, _| chunk.binary_search(id).is_ok());
            let blocked = results.values().filter(|b| **b).count();
            report.confirmed_blocked += blocked;
            report.confirmed_clear += results.len() - blocked;
            debug!(viewer = %viewer, batch = chunk.len(), blocked, "authoritative batch seeded");
            self.seed_from_lookup(viewer, results);
        }

        Ok(report)
    }
}
