use crate::config::BlockCacheConfig;
use crate::identifier::Identifier;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub type BlockCacheHandle = Arc<Mutex<BlockStatusCache>>;

#[derive(Debug, Clone, Copy)]
struct Entry {
    blocked: bool,
    at: Instant,
}

/// "Is `candidate` blocked by `viewer`", partitioned by viewer.
///
/// A missing entry means unknown (ask the platform), never "not blocked".
#[derive(Debug, Default)]
pub struct BlockStatusCache {
    ttl: Option<Duration>,
    by_viewer: HashMap<Identifier, HashMap<Identifier, Entry>>,
}

impl BlockStatusCache {
    pub fn new(config: &BlockCacheConfig) -> Self {
        Self { ttl: config.ttl(), by_viewer: HashMap::new() }
    }

    pub fn handle(config: &BlockCacheConfig) -> BlockCacheHandle {
        Arc::new(Mutex::new(Self::new(config)))
    }

    fn fresh(&self, e: &Entry) -> bool {
        match self.ttl {
            Some(ttl) => e.at.elapsed() < ttl,
            None => true,
        }
    }

    /// Merge `entries` into the viewer's partition; existing keys are overwritten,
    /// others are left alone.
    pub fn seed<I>(&mut self, viewer: &Identifier, entries: I) -> usize
    where
        I: IntoIterator<Item = (Identifier, bool)>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return 0;
        }
        let now = Instant::now();
        let part = self.by_viewer.entry(*viewer).or_default();
        let mut n = 0;
        for (candidate, blocked) in entries {
            part.insert(candidate, Entry { blocked, at: now });
            n += 1;
        }
        n
    }

    pub fn get(&self, viewer: &Identifier, candidate: &Identifier) -> Option<bool> {
        let e = self.by_viewer.get(viewer)?.get(candidate)?;
        self.fresh(e).then_some(e.blocked)
    }

    /// Candidates that still need an authoritative answer, in input order.
    pub fn unknown_among(&self, viewer: &Identifier, candidates: &[Identifier]) -> Vec<Identifier> {
        candidates
            .iter()
            .filter(|c| self.get(viewer, c).is_none())
            .copied()
            .collect()
    }

    pub fn invalidate_viewer(&mut self, viewer: &Identifier) -> bool {
        self.by_viewer.remove(viewer).is_some()
    }

    /// Drop entries past their TTL. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let Some(ttl) = self.ttl else { return 0 };
        let mut removed = 0;
        for part in self.by_viewer.values_mut() {
            let before = part.len();
            part.retain(|_, e| e.at.elapsed() < ttl);
            removed += before - part.len();
        }
        self.by_viewer.retain(|_, part| !part.is_empty());
        removed
    }

    pub fn clear(&mut self) {
        self.by_viewer.clear();
    }

    /// Stored entries across all viewers (expired ones included until purged).
    pub fn len(&self) -> usize {
        self.by_viewer.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
