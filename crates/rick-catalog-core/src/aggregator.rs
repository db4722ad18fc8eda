// SPDX-License-Identifier: AGPL-3.0
// Rick Catalog Core - Episode aggregation
//
// Fans out one fetch per episode URL of a character and gathers the results.
// Fetch tasks never touch shared state: each reports exactly once over a
// channel and a single collector loop owns the accumulated episodes and
// failures.

use crate::client::parse_http_url;
use crate::types::{AppError, Episode};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Anything that can resolve an episode reference URL
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn fetch_episode(&self, url: &Url) -> Result<Episode, AppError>;
}

/// A single episode URL that could not be loaded
#[derive(Debug)]
pub struct EpisodeFailure {
    pub url: String,
    pub error: AppError,
}

/// Outcome of loading every episode of one character
#[derive(Debug, Default)]
pub struct EpisodeLoad {
    /// Loaded episodes, in the order their fetches completed
    pub episodes: Vec<Episode>,
    /// Failed fetches, in the order they completed
    pub failures: Vec<EpisodeFailure>,
    /// Number of fetches started
    pub dispatched: usize,
    /// Number of malformed URLs that were never fetched
    pub skipped: usize,
}

impl EpisodeLoad {
    /// The error to report for this load: the first failure that completed
    pub fn error(&self) -> Option<&AppError> {
        self.failures.first().map(|f| &f.error)
    }

    /// Fetches that finished, successfully or not
    pub fn resolved(&self) -> usize {
        self.episodes.len() + self.failures.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.episodes.is_empty() && !self.failures.is_empty()
    }

    /// Episodes ordered by id, for display
    pub fn sorted_by_id(&self) -> Vec<Episode> {
        let mut episodes = self.episodes.clone();
        episodes.sort_by_key(|e| e.id);
        episodes
    }
}

type FetchReport = (String, Result<Episode, AppError>);

/// Fetch every episode URL concurrently and wait for all of them.
///
/// Malformed URLs are skipped. Individual failures do not stop the other
/// fetches. If `cancel` fires before the last fetch reports, outstanding
/// fetches are aborted and `AppError::Cancelled` is returned.
pub async fn load_episodes(
    source: Arc<dyn EpisodeSource>,
    urls: &[String],
    cancel: &CancellationToken,
) -> Result<EpisodeLoad, AppError> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    let mut load = EpisodeLoad::default();
    let mut pending: HashMap<String, usize> = HashMap::new();
    let (report_tx, report_rx) = async_channel::unbounded::<FetchReport>();
    let mut tasks = JoinSet::new();

    for raw in urls {
        let Some(url) = parse_http_url(raw) else {
            tracing::debug!("Skipping malformed episode URL {:?}", raw);
            load.skipped += 1;
            continue;
        };

        *pending.entry(url.to_string()).or_default() += 1;
        load.dispatched += 1;

        let source = source.clone();
        let report_tx = report_tx.clone();
        tasks.spawn(async move {
            let result = source.fetch_episode(&url).await;
            // Receiver is gone only after cancellation
            let _ = report_tx.send((url.to_string(), result)).await;
        });
    }
    drop(report_tx);

    tracing::debug!(
        "Dispatched {} episode fetches, skipped {}",
        load.dispatched,
        load.skipped
    );

    loop {
        let report = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(
                    "Episode load cancelled with {} of {} fetches outstanding",
                    load.dispatched - load.resolved(),
                    load.dispatched
                );
                tasks.abort_all();
                return Err(AppError::Cancelled);
            }
            report = report_rx.recv() => report,
        };

        // Channel closes once every fetch task has dropped its sender
        let Ok((url, result)) = report else {
            break;
        };

        if let Some(count) = pending.get_mut(&url) {
            *count -= 1;
            if *count == 0 {
                pending.remove(&url);
            }
        }

        match result {
            Ok(episode) => load.episodes.push(episode),
            Err(error) => {
                tracing::warn!("Failed to load episode {}: {}", url, error);
                load.failures.push(EpisodeFailure { url, error });
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Episode fetch task failed: {}", e);
        }
    }

    // Tasks that died before reporting still count as resolved failures
    for (url, count) in pending {
        for _ in 0..count {
            load.failures.push(EpisodeFailure {
                url: url.clone(),
                error: AppError::Task(format!("Fetch of {} ended without a result", url)),
            });
        }
    }

    tracing::info!(
        "Loaded {} episodes, {} failed",
        load.episodes.len(),
        load.failures.len()
    );

    Ok(load)
}
