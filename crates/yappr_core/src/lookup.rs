use crate::errors::Result;
use crate::identifier::Identifier;
use crate::platform::BlockDocument;
use std::collections::{HashMap, HashSet};

/// Ground-truth block status source (the platform).
pub trait BlockLookup: Send + Sync {
    /// Status for every candidate in `candidates`, relative to `viewer`.
    fn lookup_blocked(
        &self,
        viewer: &Identifier,
        candidates: &[Identifier],
    ) -> Result<HashMap<Identifier, bool>>;
}

/// Answers from already-fetched block documents.
#[derive(Debug, Default, Clone)]
pub struct DocumentBlockLookup {
    blocked: HashMap<Identifier, HashSet<Identifier>>,
}

impl DocumentBlockLookup {
    pub fn new(docs: impl IntoIterator<Item = BlockDocument>) -> Self {
        let mut blocked: HashMap<Identifier, HashSet<Identifier>> = HashMap::new();
        for d in docs {
            blocked.entry(d.owner_id).or_default().insert(d.blocked_id);
        }
        Self { blocked }
    }

    /// Everything `viewer` blocks.
    pub fn blocked_by(&self, viewer: &Identifier) -> impl Iterator<Item = &Identifier> {
        self.blocked.get(viewer).into_iter().flatten()
    }
}

impl BlockLookup for DocumentBlockLookup {
    fn lookup_blocked(
        &self,
        viewer: &Identifier,
        candidates: &[Identifier],
    ) -> Result<HashMap<Identifier, bool>> {
        let set = self.blocked.get(viewer);
        Ok(candidates
            .iter()
            .map(|c| (*c, set.is_some_and(|s| s.contains(c))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Identifier {
        Identifier::from_bytes([n; 32])
    }

    #[test]
    fn answers_every_candidate() {
        let l = DocumentBlockLookup::new([
            BlockDocument { owner_id: id(1), blocked_id: id(2) },
            BlockDocument { owner_id: id(5), blocked_id: id(3) },
        ]);
        let out = l.lookup_blocked(&id(1), &[id(2), id(3)]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[&id(2)], true);
        assert_eq!(out[&id(3)], false);

        let none = l.lookup_blocked(&id(7), &[id(2)]).unwrap();
        assert_eq!(none[&id(2)], false);
        assert_eq!(l.blocked_by(&id(5)).count(), 1);
    }
}
