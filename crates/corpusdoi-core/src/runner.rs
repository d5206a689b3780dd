//! Sequential lookup loop.
//!
//! IDs are resolved strictly one at a time. Between consecutive lookups the
//! loop sleeps for the configured pacing delay, whatever the outcome of the
//! previous lookup was. Concurrent requests would break the API's rate limit,
//! so there is no worker pool here.

use crate::lookup::PaperLookup;
use crate::rate_limit::LookupError;
use crate::{Config, CorpusId, ProgressEvent, Resolution, RunReport};

/// Resolve every ID in order and collect the outcomes.
///
/// Per-ID failures are recorded in the report and never abort the run.
pub async fn resolve_all(
    ids: &[CorpusId],
    lookup: &dyn PaperLookup,
    client: &reqwest::Client,
    config: &Config,
    progress: impl Fn(ProgressEvent),
) -> RunReport {
    let total = ids.len();
    let delay = config.request_delay();
    let mut entries = Vec::with_capacity(total);

    for (index, corpus_id) in ids.iter().enumerate() {
        progress(ProgressEvent::Resolving {
            index,
            total,
            corpus_id: corpus_id.clone(),
        });

        let resolution = resolve_one(index, corpus_id, lookup, client, config, &progress).await;
        match &resolution {
            Resolution::Doi(doi) => tracing::debug!(%corpus_id, %doi, "resolved"),
            Resolution::Failed(reason) => {
                tracing::warn!(%corpus_id, backend = lookup.name(), %reason, "lookup failed")
            }
            other => tracing::info!(%corpus_id, outcome = ?other, "no DOI recorded"),
        }

        progress(ProgressEvent::Resolved {
            index,
            total,
            corpus_id: corpus_id.clone(),
            resolution: resolution.clone(),
        });
        entries.push((corpus_id.clone(), resolution));

        if index + 1 < total {
            progress(ProgressEvent::Waiting { delay });
            tokio::time::sleep(delay).await;
        }
    }

    RunReport { entries }
}

/// One lookup, plus up to `max_rate_limit_retries` retries on 429.
async fn resolve_one(
    index: usize,
    corpus_id: &CorpusId,
    lookup: &dyn PaperLookup,
    client: &reqwest::Client,
    config: &Config,
    progress: &impl Fn(ProgressEvent),
) -> Resolution {
    let timeout = config.timeout();
    let mut attempt = 0;

    loop {
        match lookup.lookup(corpus_id, client, timeout).await {
            Err(LookupError::RateLimited { retry_after })
                if attempt < config.max_rate_limit_retries =>
            {
                attempt += 1;
                // Sleeping past the request timeout makes no sense.
                let backoff = retry_after
                    .unwrap_or_else(|| config.request_delay())
                    .min(timeout);
                progress(ProgressEvent::RateLimitRetry {
                    index,
                    corpus_id: corpus_id.clone(),
                    attempt,
                    backoff,
                });
                tokio::time::sleep(backoff).await;
            }
            result => return Resolution::from_lookup(result),
        }
    }
}
