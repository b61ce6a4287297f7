//! Drains the analytics queue into the durable store.
//!
//! One pass reads a bounded snapshot from the head of the queue, persists a
//! [`crate::domain::entities::ClickLog`] per valid entry, reconciles each touched
//! link's durable `clicks` with the exact cache counter, and then trims exactly the
//! snapshot length. Entries appended while the pass runs stay queued for the next
//! one. A failure before the trim leaves the whole window in place, so delivery is
//! at least once.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickPayload;
use crate::domain::repositories::{ClickLogRepository, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheService, keys};

/// Default number of queue entries handled per pass.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Lifetime of the single-flight lock; bounds how long a crashed pass blocks others.
pub const LOCK_TTL_SECONDS: u64 = 60;

const INSERT_RETRIES: usize = 2;
const INSERT_RETRY_DELAY_MS: u64 = 50;

/// Counts for one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries in the snapshot, and therefore trimmed.
    pub read: usize,
    /// Entries that produced a click log.
    pub processed: usize,
    /// Malformed entries and entries whose code has no link.
    pub skipped: usize,
    /// Entries that hit a store or cache error.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The queue was empty; nothing was trimmed.
    Empty,
    Synced(SyncReport),
    /// Another pass holds the lock; the queue was not touched.
    AlreadyRunning,
}

enum EntryOutcome {
    Processed,
    Skipped,
}

pub struct AnalyticsSync {
    cache: Arc<dyn CacheService>,
    links: Arc<dyn LinkRepository>,
    click_logs: Arc<dyn ClickLogRepository>,
    batch_size: usize,
}

impl AnalyticsSync {
    pub fn new(
        cache: Arc<dyn CacheService>,
        links: Arc<dyn LinkRepository>,
        click_logs: Arc<dyn ClickLogRepository>,
        batch_size: usize,
    ) -> Self {
        Self {
            cache,
            links,
            click_logs,
            batch_size: batch_size.max(1),
        }
    }

    /// Runs one pass under the single-flight lock.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when the queue cannot be read or trimmed,
    /// in which case nothing was trimmed and the window is retried by the next pass.
    pub async fn sync(&self) -> Result<SyncOutcome, AppError> {
        let token = match self.acquire_lock().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!("Analytics sync already running, skipping");
                return Ok(SyncOutcome::AlreadyRunning);
            }
            Err(e) => {
                error!(error = %e, "Analytics sync failed");
                return Err(e.into());
            }
        };

        let result = self.run_pass().await;

        self.release_lock(&token).await;

        if let Err(e) = &result {
            error!(error = %e, "Analytics sync failed");
        }

        result
    }

    /// Takes the lock under a fresh token. `None` means another pass holds it.
    async fn acquire_lock(&self) -> Result<Option<String>, CacheError> {
        let token = format!("{:016x}", rand::rng().random::<u64>());
        let acquired = self
            .cache
            .set_nx_ex(keys::SYNC_LOCK, &token, LOCK_TTL_SECONDS)
            .await?;

        Ok(acquired.then_some(token))
    }

    /// Releases the lock only if it still carries `token`.
    ///
    /// A pass that outlived the TTL finds another pass's token and leaves it alone.
    async fn release_lock(&self, token: &str) {
        match self.cache.del_if_eq(keys::SYNC_LOCK, token).await {
            Ok(true) => {}
            Ok(false) => warn!("Analytics sync lock expired before release"),
            Err(e) => warn!(error = %e, "Failed to release analytics sync lock"),
        }
    }

    async fn run_pass(&self) -> Result<SyncOutcome, AppError> {
        let stop = self.batch_size as isize - 1;
        let entries = self.cache.lrange(keys::ANALYTICS_QUEUE, 0, stop).await?;

        if entries.is_empty() {
            debug!("Analytics queue empty");
            return Ok(SyncOutcome::Empty);
        }

        let mut report = SyncReport {
            read: entries.len(),
            ..SyncReport::default()
        };

        for raw in &entries {
            match self.process_entry(raw).await {
                Ok(EntryOutcome::Processed) => report.processed += 1,
                Ok(EntryOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(error = %e, "Failed to persist analytics entry");
                }
            }
        }

        self.cache
            .ltrim(keys::ANALYTICS_QUEUE, report.read as isize, -1)
            .await?;

        metrics::counter!("analytics_synced_total").increment(report.processed as u64);
        metrics::counter!("analytics_skipped_total").increment(report.skipped as u64);

        info!(
            read = report.read,
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            trimmed = report.read,
            "Analytics sync pass complete"
        );

        Ok(SyncOutcome::Synced(report))
    }

    async fn process_entry(&self, raw: &str) -> Result<EntryOutcome, AppError> {
        let payload = match ClickPayload::parse(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Skipping malformed analytics entry");
                return Ok(EntryOutcome::Skipped);
            }
        };

        let Some(link) = self.links.find_by_code(&payload.short_code).await? else {
            debug!(short_code = %payload.short_code, "No link for queued click, skipping");
            return Ok(EntryOutcome::Skipped);
        };

        let counter_key = keys::clicks(&payload.short_code);
        let new_log = payload.into_click_log(link.id);

        let strategy = FixedInterval::from_millis(INSERT_RETRY_DELAY_MS).take(INSERT_RETRIES);
        Retry::spawn(strategy, || {
            let click_logs = self.click_logs.clone();
            let new_log = new_log.clone();
            async move { click_logs.create(new_log).await }
        })
        .await?;

        if let Some(raw_count) = self.cache.get(&counter_key).await? {
            match raw_count.parse::<i64>() {
                Ok(count) => self.links.set_clicks(link.id, count).await?,
                Err(_) => {
                    warn!(key = %counter_key, value = %raw_count, "Click counter is not an integer")
                }
            }
        }

        Ok(EntryOutcome::Processed)
    }

    /// Runs [`Self::sync`] every `interval` until the task is aborted.
    ///
    /// The first pass starts after one full interval.
    pub async fn run_periodic(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;

        info!(interval_secs = interval.as_secs(), "Analytics sync scheduler started");

        loop {
            ticker.tick().await;
            // Failures are logged inside sync and retried on the next tick.
            let _ = self.sync().await;
        }
    }
}
