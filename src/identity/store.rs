//! Persisted client-side token storage.
//!
//! The console keeps its credentials the way a browser keeps them in local
//! storage: a flat string map under fixed keys. Outside such a context (e.g. a
//! server-side render) there is no storage at all and every read is absent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::AppResult;

pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    /// Write several keys as one unit: either all of them land or none do.
    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
    /// False when running without client-side storage.
    fn is_available(&self) -> bool { true }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self { Self::default() }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> { self.entries.read().get(key).cloned() }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let mut map = self.entries.write();
        for (k, v) in entries {
            map.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// No client-side storage: reads are absent and writes vanish.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedTokenStore;

impl TokenStore for DetachedTokenStore {
    fn get(&self, _key: &str) -> Option<String> { None }
    fn set(&self, _key: &str, _value: &str) -> AppResult<()> { Ok(()) }
    fn set_many(&self, _entries: &[(&str, &str)]) -> AppResult<()> { Ok(()) }
    fn remove(&self, _key: &str) -> AppResult<()> { Ok(()) }
    fn is_available(&self) -> bool { false }
}

/// JSON object on disk, cached in memory. Every write rewrites the whole file
/// through a temp file + rename.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cache = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => match serde_json::from_str::<HashMap<String, String>>(&text) {
                Ok(map) => map,
                Err(e) => {
                    // An unreadable store is treated like an empty one; the next write replaces it.
                    warn!(target: "nyc360::store", "token file {} is not a string map ({}); starting empty", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(target: "nyc360::store", "opened token file {} with {} keys", path.display(), cache.len());
        Ok(Self { path, cache: RwLock::new(cache) })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn flush(&self, map: &HashMap<String, String>) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> { self.cache.read().get(key).cloned() }

    fn set(&self, key: &str, value: &str) -> AppResult<()> { self.set_many(&[(key, value)]) }

    /// One flush for all entries. The cache only changes once the file has.
    fn set_many(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let mut cache = self.cache.write();
        let mut next = cache.clone();
        for (k, v) in entries {
            next.insert(k.to_string(), v.to_string());
        }
        self.flush(&next)?;
        *cache = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut cache = self.cache.write();
        if !cache.contains_key(key) {
            return Ok(());
        }
        let mut next = cache.clone();
        next.remove(key);
        self.flush(&next)?;
        *cache = next;
        Ok(())
    }
}
