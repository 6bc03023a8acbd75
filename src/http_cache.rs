use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "fco_pipeline";
const CACHE_FILE: &str = "meta_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Fresh,
    NotModified,
}

pub struct ConditionalCache {
    path: Option<PathBuf>,
    state: Mutex<CacheFile>,
}

impl ConditionalCache {
    pub fn open(path: Option<PathBuf>) -> Self {
        let state = path.as_deref().map(load_cache_file).unwrap_or_default();
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn open_default() -> Self {
        Self::open(app_cache_dir().map(|dir| dir.join(CACHE_FILE)))
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fetch(
        &self,
        client: &Client,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<(String, CacheOutcome)> {
        let cached = self.lock().entries.get(url).cloned();

        let mut req = client.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(entry) = cached.as_ref() {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send().context("request failed")?;
        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            let Some(entry) = cached else {
                return Err(anyhow!("received 304 without cache body"));
            };
            debug!(url, "metadata not modified");
            return Ok((entry.body, CacheOutcome::NotModified));
        }

        let etag = header_string(resp.headers(), ETAG);
        let last_modified = header_string(resp.headers(), LAST_MODIFIED);
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }

        self.store(
            url,
            CacheEntry {
                body: body.clone(),
                etag,
                last_modified,
                fetched_at: Utc::now().timestamp(),
            },
        );
        Ok((body, CacheOutcome::Fresh))
    }

    fn store(&self, url: &str, entry: CacheEntry) {
        let mut guard = self.lock();
        guard.version = CACHE_VERSION;
        guard.entries.insert(url.to_string(), entry);
        if let Some(path) = self.path.as_deref()
            && let Err(err) = save_cache_file(path, &guard)
        {
            warn!(error = %err, "could not persist metadata cache");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheFile> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn header_string(
    headers: &reqwest::header::HeaderMap,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn load_cache_file(path: &Path) -> CacheFile {
    let Ok(raw) = fs::read_to_string(path) else {
        return CacheFile::default();
    };
    let cache = serde_json::from_str::<CacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return CacheFile::default();
    }
    cache
}

fn save_cache_file(path: &Path, cache: &CacheFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize metadata cache")?;
    fs::write(&tmp, json).context("write metadata cache")?;
    fs::rename(&tmp, path).context("swap metadata cache")?;
    Ok(())
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = ConditionalCache::open(Some(path.clone()));
        assert!(cache.is_empty());
        cache.store(
            "https://example.invalid/spid.json",
            CacheEntry {
                body: "[]".to_string(),
                etag: Some("\"abc\"".to_string()),
                last_modified: None,
                fetched_at: 1,
            },
        );
        assert!(path.exists());

        let reopened = ConditionalCache::open(Some(path));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn stale_version_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{"version":0,"entries":{"u":{"body":"x","etag":null,"last_modified":null,"fetched_at":0}}}"#)
            .unwrap();
        assert!(ConditionalCache::open(Some(path)).is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();
        assert!(ConditionalCache::open(Some(path)).is_empty());
    }
}
