//! In-process cache with Redis command semantics.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// A cache that keeps everything in a process-local map.
///
/// Used when Redis is not configured outside production and as the cache in tests.
/// Expiry is measured with [`tokio::time::Instant`], so tests can move the clock with
/// `tokio::time::advance`. Outages and slow responses can be simulated with
/// [`MemoryCache::set_available`] and [`MemoryCache::set_latency`].
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    available: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        debug!("Using MemoryCache");
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// When `false`, every command fails with [`CacheError::Connection`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Delay applied before every command.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn ready(&self) -> CacheResult<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Connection("memory cache marked unavailable".into()))
        }
    }

    /// Runs `f` against the live (non-expired) entry for `key`.
    fn with_entry<T>(&self, key: &str, f: impl FnOnce(&mut Option<Entry>) -> T) -> T {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let mut slot = entries.remove(key).filter(|e| !e.is_expired(now));
        let out = f(&mut slot);
        if let Some(entry) = slot {
            entries.insert(key.to_string(), entry);
        }
        out
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::Command(format!(
        "WRONGTYPE operation against key {key} holding the wrong kind of value"
    ))
}

/// Resolves Redis-style inclusive `start..=stop` indices against a list length.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len || stop < 0 {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ready().await?;
        self.with_entry(key, |slot| match slot {
            None => Ok(None),
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.ready().await?;
        self.with_entry(key, |slot| {
            *slot = Some(Entry {
                value: Value::Str(value.to_string()),
                expires_at: None,
            });
        });
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, seconds: u64) -> CacheResult<bool> {
        self.ready().await?;
        Ok(self.with_entry(key, |slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(Instant::now() + Duration::from_secs(seconds)),
            });
            true
        }))
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.ready().await?;
        self.with_entry(key, |slot| *slot = None);
        Ok(())
    }

    async fn del_if_eq(&self, key: &str, value: &str) -> CacheResult<bool> {
        self.ready().await?;
        Ok(self.with_entry(key, |slot| {
            let matches = matches!(
                slot,
                Some(Entry { value: Value::Str(current), .. }) if current.as_str() == value
            );
            if matches {
                *slot = None;
            }
            matches
        }))
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        self.ready().await?;
        self.with_entry(key, |slot| match slot {
            None => {
                *slot = Some(Entry {
                    value: Value::Str("1".into()),
                    expires_at: None,
                });
                Ok(1)
            }
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => {
                let current: i64 = s.parse().map_err(|_| CacheError::InvalidValue {
                    key: key.to_string(),
                    reason: "value is not an integer".into(),
                })?;
                let next = current + 1;
                *s = next.to_string();
                Ok(next)
            }
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn expire(&self, key: &str, seconds: u64) -> CacheResult<()> {
        self.ready().await?;
        self.with_entry(key, |slot| {
            if let Some(entry) = slot {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(seconds));
            }
        });
        Ok(())
    }

    async fn rpush(&self, key: &str, value: &str) -> CacheResult<u64> {
        self.ready().await?;
        self.with_entry(key, |slot| {
            let entry = slot.get_or_insert_with(|| Entry {
                value: Value::List(VecDeque::new()),
                expires_at: None,
            });
            match &mut entry.value {
                Value::List(list) => {
                    list.push_back(value.to_string());
                    Ok(list.len() as u64)
                }
                Value::Str(_) => Err(wrong_type(key)),
            }
        })
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        self.ready().await?;
        self.with_entry(key, |slot| match slot {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::List(list),
                ..
            }) => Ok(match resolve_range(list.len(), start, stop) {
                Some((from, to)) => list.range(from..=to).cloned().collect(),
                None => Vec::new(),
            }),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> CacheResult<()> {
        self.ready().await?;
        self.with_entry(key, |slot| {
            let kept = match slot {
                None => return Ok(()),
                Some(Entry {
                    value: Value::List(list),
                    ..
                }) => match resolve_range(list.len(), start, stop) {
                    Some((from, to)) => list.range(from..=to).cloned().collect::<VecDeque<_>>(),
                    None => VecDeque::new(),
                },
                Some(_) => return Err(wrong_type(key)),
            };

            if kept.is_empty() {
                *slot = None;
            } else if let Some(entry) = slot {
                entry.value = Value::List(kept);
            }
            Ok(())
        })
    }

    async fn llen(&self, key: &str) -> CacheResult<u64> {
        self.ready().await?;
        self.with_entry(key, |slot| match slot {
            None => Ok(0),
            Some(Entry {
                value: Value::List(list),
                ..
            }) => Ok(list.len() as u64),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn health_check(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
