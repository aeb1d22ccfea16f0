use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::storage::LocalFileStorage;
use crate::models::GenerationResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_CLEANUP_PROBABILITY: f64 = 0.1;

/// Eviction stops once the cache is at or below this share of its maximum.
const EVICTION_HEADROOM: f64 = 0.8;

/// A cached generation result as stored in `<cache_dir>/<key>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(flatten)]
    pub result: GenerationResult,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at: i64,
    #[serde(default)]
    pub hit: bool,
}

impl CacheEntry {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}

/// When a cleanup pass runs after a write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CleanupSchedule {
    /// Spawn a background pass with the given probability after each write.
    Probabilistic { probability: f64 },
    /// Run a pass to completion after every write.
    Inline,
    /// Only when [`CacheStore::cleanup`] is called.
    Manual,
}

impl Default for CleanupSchedule {
    fn default() -> Self {
        Self::Probabilistic {
            probability: DEFAULT_CLEANUP_PROBABILITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub ttl: Duration,
    pub max_size_bytes: u64,
    pub schedule: CleanupSchedule,
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_TTL,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            schedule: CleanupSchedule::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub memory_entries: usize,
    pub file_entries: usize,
    pub total_size_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub expired_removed: usize,
    pub evicted: usize,
    pub remaining_bytes: u64,
}

struct CacheInner {
    files: LocalFileStorage,
    memory: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_size_bytes: u64,
    schedule: CleanupSchedule,
}

/// Two-tier result cache. The file tier is authoritative; the in-memory map
/// only shadows it for the lifetime of the process. Cheap to clone.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<CacheInner>,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                files: LocalFileStorage::new(config.dir),
                memory: RwLock::new(HashMap::new()),
                ttl: config.ttl,
                max_size_bytes: config.max_size_bytes,
                schedule: config.schedule,
            }),
        }
    }

    pub fn dir(&self) -> &std::path::Path {
        self.inner.files.base_dir()
    }

    /// Looks up `key`, memory first, then disk. Any failure reads as a miss.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = now_ms();
        {
            let mut memory = self.inner.memory.write();
            let expired = match memory.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    return Some(CacheEntry {
                        hit: true,
                        ..entry.clone()
                    });
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                memory.remove(key);
            }
        }

        let bytes = match self.inner.files.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                warn!("cache read for {} failed: {}", key, err);
                return None;
            }
        };
        let entry = match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("cache entry {} is unreadable: {}", key, err);
                return None;
            }
        };
        if entry.is_expired(now) {
            debug!("cache entry {} expired", key);
            return None;
        }

        self.inner
            .memory
            .write()
            .insert(key.to_string(), CacheEntry { hit: false, ..entry.clone() });
        Some(CacheEntry { hit: true, ..entry })
    }

    /// Stores `result` under `key` in both tiers. Persist failures are logged.
    pub async fn set(&self, key: &str, result: &GenerationResult) {
        let ttl_ms = i64::try_from(self.inner.ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            result: result.clone(),
            expires_at: now_ms().saturating_add(ttl_ms),
            hit: false,
        };
        self.inner
            .memory
            .write()
            .insert(key.to_string(), entry.clone());

        match serde_json::to_vec_pretty(&entry) {
            Ok(payload) => {
                if let Err(err) = self.inner.files.put(key, &payload).await {
                    warn!("cache write for {} failed: {}", key, err);
                }
            }
            Err(err) => warn!("cache entry {} could not be serialized: {}", key, err),
        }

        self.after_write().await;
    }

    async fn after_write(&self) {
        match self.inner.schedule {
            CleanupSchedule::Probabilistic { probability } => {
                if fastrand::f64() < probability {
                    let store = self.clone();
                    tokio::spawn(async move {
                        if let Err(err) = store.cleanup().await {
                            warn!("cache cleanup failed: {}", err);
                        }
                    });
                }
            }
            CleanupSchedule::Inline => {
                if let Err(err) = self.cleanup().await {
                    warn!("cache cleanup failed: {}", err);
                }
            }
            CleanupSchedule::Manual => {}
        }
    }

    pub async fn clear(&self) -> Result<usize> {
        self.inner.memory.write().clear();
        self.inner.files.clear().await
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let memory_entries = self.inner.memory.read().len();
        let files = self.inner.files.list().await?;
        Ok(CacheStats {
            memory_entries,
            file_entries: files.len(),
            total_size_bytes: files.iter().map(|file| file.size).sum(),
        })
    }

    /// Drops expired or unreadable entries, then evicts oldest-modified
    /// entries while the cache is over its maximum size.
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        let now = now_ms();
        let mut report = CleanupReport::default();
        let mut live = Vec::new();

        for file in self.inner.files.list().await? {
            let keep = match self.inner.files.get(&file.key).await {
                Ok(Some(bytes)) => serde_json::from_slice::<CacheEntry>(&bytes)
                    .map(|entry| !entry.is_expired(now))
                    .unwrap_or(false),
                Ok(None) => continue,
                Err(err) => {
                    warn!("cache cleanup could not read {}: {}", file.key, err);
                    continue;
                }
            };
            if keep {
                live.push(file);
            } else if let Err(err) = self.inner.files.remove(&file.path).await {
                warn!("cache cleanup could not remove {}: {}", file.key, err);
            } else {
                report.expired_removed += 1;
            }
        }

        let mut total: u64 = live.iter().map(|file| file.size).sum();
        let mut evicted = HashSet::new();
        if total > self.inner.max_size_bytes {
            let target = (self.inner.max_size_bytes as f64 * EVICTION_HEADROOM) as u64;
            live.sort_by_key(|file| file.modified);
            for file in &live {
                if total <= target {
                    break;
                }
                match self.inner.files.remove(&file.path).await {
                    Ok(()) => {
                        total = total.saturating_sub(file.size);
                        evicted.insert(file.key.clone());
                    }
                    Err(err) => warn!("cache eviction of {} failed: {}", file.key, err),
                }
            }
        }
        report.evicted = evicted.len();
        report.remaining_bytes = total;

        self.inner
            .memory
            .write()
            .retain(|key, entry| !entry.is_expired(now) && !evicted.contains(key));

        debug!(
            "cache cleanup removed {} expired, evicted {}, {} bytes remain",
            report.expired_removed, report.evicted, report.remaining_bytes
        );
        Ok(report)
    }
}
