use crate::codec::{from_base64, to_base64};
use crate::consts::FILTER_VERSION;
use crate::errors::{Result, YapprError};
use crate::filter::BloomFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cached filter record. The base64 payload carries no header, so version and
/// item count are kept beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFilter {
    pub version: u32,
    pub item_count: u64,
    pub encoded: String,
    #[serde(default)]
    pub saved_at: i64,
}

impl StoredFilter {
    pub fn from_filter(filter: &BloomFilter) -> Self {
        Self {
            version: FILTER_VERSION,
            item_count: filter.item_count(),
            encoded: to_base64(filter),
            saved_at: time::OffsetDateTime::now_utc().unix_timestamp(),
        }
    }

    pub fn into_filter(self) -> Result<BloomFilter> {
        if self.version != FILTER_VERSION {
            return Err(YapprError::UnsupportedFilterVersion {
                found: self.version,
                expected: FILTER_VERSION,
            });
        }
        from_base64(&self.encoded, self.item_count)
    }
}

/// String-oriented key/value cache holding encoded filters.
pub trait FilterStore {
    fn get(&self, key: &str) -> Result<Option<StoredFilter>>;
    fn put(&mut self, key: &str, rec: &StoredFilter) -> Result<()>;
    /// Returns whether something was removed.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

fn check_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if ok && key != "." && key != ".." {
        Ok(())
    } else {
        Err(YapprError::InvalidKey(key.to_string()))
    }
}

/// Load `key` or fall back to an empty filter when the cached entry is absent
/// or unusable. Store I/O failures are still returned.
pub fn load_or_empty<S: FilterStore + ?Sized>(store: &S, key: &str) -> Result<BloomFilter> {
    let Some(rec) = store.get(key)? else {
        debug!(key, "no cached filter");
        return Ok(BloomFilter::new());
    };
    match rec.into_filter() {
        Ok(f) => Ok(f),
        Err(e @ (YapprError::InvalidEncoding(_) | YapprError::UnsupportedFilterVersion { .. })) => {
            warn!(key, error = %e, "cached filter unusable, starting empty");
            Ok(BloomFilter::new())
        }
        Err(e) => Err(e),
    }
}

pub fn save<S: FilterStore + ?Sized>(store: &mut S, key: &str, filter: &BloomFilter) -> Result<()> {
    store.put(key, &StoredFilter::from_filter(filter))
}

#[derive(Debug, Default, Clone)]
pub struct MemoryFilterStore {
    entries: HashMap<String, StoredFilter>,
}

impl MemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FilterStore for MemoryFilterStore {
    fn get(&self, key: &str) -> Result<Option<StoredFilter>> {
        check_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, rec: &StoredFilter) -> Result<()> {
        check_key(key)?;
        self.entries.insert(key.to_string(), rec.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        check_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }
}

/// One `<key>.filter.json` per entry under `dir`, replaced atomically.
pub struct FileFilterStore {
    dir: PathBuf,
}

impl FileFilterStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.filter.json"))
    }

    /// Keys currently present, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for e in fs::read_dir(&self.dir)? {
            let name = e?.file_name();
            if let Some(k) = name.to_string_lossy().strip_suffix(".filter.json") {
                out.push(k.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}

impl FilterStore for FileFilterStore {
    fn get(&self, key: &str) -> Result<Option<StoredFilter>> {
        check_key(key)?;
        let file = match fs::File::open(self.entry_path(key)) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    fn put(&mut self, key: &str, rec: &StoredFilter) -> Result<()> {
        check_key(key)?;
        let mut tmp = tempfile::Builder::new()
            .prefix("yappr_flt_")
            .tempfile_in(&self.dir)?;
        tmp.as_file_mut()
            .write_all(serde_json::to_string_pretty(rec)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.entry_path(key))?;
        debug!(key, items = rec.item_count, "filter persisted");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        check_key(key)?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> BloomFilter {
        let mut f = BloomFilter::new();
        f.add_bytes(b"blocked-1");
        f.add_bytes(b"blocked-2");
        f
    }

    #[test]
    fn record_roundtrip() {
        let f = sample();
        let rec = StoredFilter::from_filter(&f);
        assert_eq!(rec.version, FILTER_VERSION);
        assert_eq!(rec.item_count, 2);
        let back = rec.into_filter().unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut rec = StoredFilter::from_filter(&sample());
        rec.version = FILTER_VERSION + 1;
        assert!(matches!(
            rec.into_filter(),
            Err(YapprError::UnsupportedFilterVersion { .. })
        ));
    }

    #[test]
    fn file_store_persists_across_opens() {
        let tmp = tempdir().unwrap();
        let f = sample();
        {
            let mut store = FileFilterStore::open(tmp.path()).unwrap();
            save(&mut store, "viewer-a", &f).unwrap();
        }
        let store = FileFilterStore::open(tmp.path()).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["viewer-a".to_string()]);
        let back = load_or_empty(&store, "viewer-a").unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn file_store_remove() {
        let tmp = tempdir().unwrap();
        let mut store = FileFilterStore::open(tmp.path()).unwrap();
        save(&mut store, "k", &sample()).unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn entry_deleted_behind_the_store_reads_as_missing() {
        let tmp = tempdir().unwrap();
        let mut store = FileFilterStore::open(tmp.path()).unwrap();
        save(&mut store, "gone", &sample()).unwrap();
        fs::remove_file(tmp.path().join("gone.filter.json")).unwrap();
        assert!(store.get("gone").unwrap().is_none());
        assert!(!store.remove("gone").unwrap());
        assert!(load_or_empty(&store, "gone").unwrap().is_empty());
    }

    #[test]
    fn bad_keys_are_rejected() {
        let mut store = MemoryFilterStore::new();
        for key in ["", "..", "a/b", "x y"] {
            assert!(matches!(
                store.put(key, &StoredFilter::from_filter(&sample())),
                Err(YapprError::InvalidKey(_))
            ));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn unusable_entries_fall_back_to_empty() {
        let mut store = MemoryFilterStore::new();
        let mut rec = StoredFilter::from_filter(&sample());
        rec.encoded = "%%%".into();
        store.put("broken", &rec).unwrap();
        let f = load_or_empty(&store, "broken").unwrap();
        assert!(f.is_empty());

        let missing = load_or_empty(&store, "missing").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn corrupt_json_propagates() {
        let tmp = tempdir().unwrap();
        let store = FileFilterStore::open(tmp.path()).unwrap();
        fs::write(tmp.path().join("bad.filter.json"), b"{ nope").unwrap();
        assert!(matches!(
            load_or_empty(&store, "bad"),
            Err(YapprError::SerdeJson(_))
        ));
    }
}
