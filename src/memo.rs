use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::shots::ShotRecord;

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    computed_at: u64,
}

/// Content-addressed fingerprint of a shot table plus the parameters an
/// analysis was run with. Equal inputs always give equal keys.
pub fn fingerprint<P: Serialize + ?Sized>(
    scope: &str,
    shots: &[ShotRecord],
    params: &P,
) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(scope.as_bytes());
    hasher.update([0u8]);
    hasher.update(serde_json::to_vec(shots).context("serialize shots for fingerprint")?);
    hasher.update([0u8]);
    hasher.update(serde_json::to_vec(params).context("serialize params for fingerprint")?);
    Ok(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

/// Results keyed by fingerprint, stored as JSON. Owned by the caller; pass
/// it wherever memoized results are wanted.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    file: CacheFile,
    path: Option<PathBuf>,
    hits: usize,
    misses: usize,
}

impl AnalysisCache {
    pub fn in_memory() -> Self {
        Self {
            file: CacheFile {
                version: CACHE_VERSION,
                entries: HashMap::new(),
            },
            ..Self::default()
        }
    }

    /// Opens a cache backed by `path`. A missing, unreadable or
    /// version-mismatched file starts empty.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = load_cache_file(&path);
        Self {
            file,
            path: Some(path),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.file.entries.get(key)?;
        match serde_json::from_str(&entry.body) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("dropping unreadable cache entry {key}: {err}");
                None
            }
        }
    }

    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let body = serde_json::to_string(value).context("serialize cache entry")?;
        self.file.entries.insert(
            key.to_string(),
            CacheEntry {
                body,
                computed_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
            },
        );
        Ok(())
    }

    pub fn get_or_compute<T, F>(&mut self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key) {
            self.hits += 1;
            log::debug!("cache hit {key}");
            return Ok(value);
        }
        self.misses += 1;
        let value = compute();
        self.insert(key, &value)?;
        Ok(value)
    }

    /// Writes the cache to its backing file; in-memory caches do nothing.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        save_cache_file(path, &self.file)
    }

    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.file.entries.clear();
    }
}

fn load_cache_file(path: &Path) -> CacheFile {
    let empty = CacheFile {
        version: CACHE_VERSION,
        entries: HashMap::new(),
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return empty;
    };
    match serde_json::from_str::<CacheFile>(&raw) {
        Ok(cache) if cache.version == CACHE_VERSION => cache,
        Ok(_) => {
            log::warn!("cache {} has an old version, starting fresh", path.display());
            empty
        }
        Err(_) => empty,
    }
}

fn save_cache_file(path: &Path, cache: &CacheFile) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("create cache dir {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize analysis cache")?;
    fs::write(&tmp, json).context("write analysis cache")?;
    fs::rename(&tmp, path).context("swap analysis cache")?;
    Ok(())
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
