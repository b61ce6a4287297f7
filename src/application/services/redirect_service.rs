//! Short code resolution and click telemetry for the redirect path.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::click_event::{ClickContext, ClickPayload};
use crate::domain::click_sampler::ClickSampler;
use crate::domain::reserved_paths::ReservedPaths;
use crate::infrastructure::cache::{CacheService, keys};
use crate::infrastructure::tasks::TaskSpawner;

/// Default upper bound on the redirect cache lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(250);

/// Resolves short codes from the cache and records hits without delaying the response.
pub struct RedirectService {
    cache: Arc<dyn CacheService>,
    sampler: Arc<ClickSampler>,
    spawner: Arc<dyn TaskSpawner>,
    reserved: Arc<ReservedPaths>,
    lookup_timeout: Duration,
}

impl RedirectService {
    pub fn new(
        cache: Arc<dyn CacheService>,
        sampler: Arc<ClickSampler>,
        spawner: Arc<dyn TaskSpawner>,
        reserved: Arc<ReservedPaths>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            sampler,
            spawner,
            reserved,
            lookup_timeout,
        }
    }

    /// Candidate short code for a request path, if the path can be one.
    pub fn candidate_code<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.reserved.candidate_code(path)
    }

    /// Looks up the destination for `code`.
    ///
    /// Returns `None` on a miss, on a cache error and when the lookup exceeds the
    /// configured timeout. Errors are logged; the caller falls through to normal
    /// routing in every `None` case.
    pub async fn resolve(&self, code: &str) -> Option<String> {
        let key = keys::short_url(code);

        match tokio::time::timeout(self.lookup_timeout, self.cache.get(&key)).await {
            Ok(Ok(Some(url))) => Some(url),
            Ok(Ok(None)) => {
                debug!(short_code = %code, "Short code not in cache");
                None
            }
            Ok(Err(e)) => {
                warn!(short_code = %code, error = %e, "Redirect lookup failed, falling through");
                None
            }
            Err(_) => {
                warn!(
                    short_code = %code,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Redirect lookup timed out, falling through"
                );
                None
            }
        }
    }

    /// Records a resolved hit in the background.
    ///
    /// The sampling decision is made here, per request. The counter increment and,
    /// for sampled hits, payload assembly and enqueue run as one detached task whose
    /// failures are logged and counted but never reach the caller.
    pub fn record_hit(&self, code: &str, context: ClickContext) {
        let sampled = self.sampler.should_sample();
        let timestamp = Utc::now();
        let cache = self.cache.clone();
        let code = code.to_string();

        self.spawner.spawn(Box::pin(async move {
            if let Err(e) = cache.incr(&keys::clicks(&code)).await {
                metrics::counter!("telemetry_failures_total", "step" => "increment").increment(1);
                warn!(short_code = %code, error = %e, "Failed to increment click counter");
            }

            if !sampled {
                return;
            }

            let payload = ClickPayload::assemble(&code, context, timestamp);
            let json = match payload.to_json() {
                Ok(json) => json,
                Err(e) => {
                    metrics::counter!("telemetry_failures_total", "step" => "serialize")
                        .increment(1);
                    warn!(short_code = %code, error = %e, "Failed to serialize click payload");
                    return;
                }
            };

            match cache.rpush(keys::ANALYTICS_QUEUE, &json).await {
                Ok(_) => metrics::counter!("clicks_sampled_total").increment(1),
                Err(e) => {
                    metrics::counter!("telemetry_failures_total", "step" => "enqueue")
                        .increment(1);
                    warn!(short_code = %code, error = %e, "Failed to enqueue sampled click");
                }
            }
        }));
    }
}
