use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicUsize, Ordering},
};

use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::{PlaylistError, Result},
    playlists::TrackProvider,
    types::Track,
};

/// Number of searches allowed in flight at once when nothing else is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Counters describing a successful gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherSummary {
    /// Queries whose search completed.
    pub queries: usize,
    /// Queries with at least one candidate.
    pub resolved: usize,
    /// Candidates across all queries.
    pub matches: usize,
}

/// Drives a [`TrackProvider`] through the gather and push phases.
pub struct Manager {
    provider: Arc<dyn TrackProvider>,
    max_concurrency: usize,
}

impl Manager {
    /// `max_concurrency` caps in-flight searches; zero is treated as one.
    pub fn new(provider: Arc<dyn TrackProvider>, max_concurrency: usize) -> Self {
        Self {
            provider,
            max_concurrency: max_concurrency.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Resolves every query against the provider.
    ///
    /// The provider is set up once, then one task per query is spawned, with
    /// at most `max_concurrency` of them running at the same time. When a
    /// search succeeds, `on_result(slot, query, matches)` is called exactly
    /// once from that task, `slot` being the query's position in `queries`.
    /// `matches` may be empty, which means the query found nothing.
    ///
    /// `on_result` runs concurrently on several worker threads and in any
    /// order, so whatever it mutates must be synchronized on the caller's side
    /// ([`crate::results::ResultSet`] already is).
    ///
    /// The first failed search cancels the remaining work: queries not yet
    /// started are never searched and in-flight searches are dropped. The same
    /// happens when `cancel` is triggered from outside.
    ///
    /// # Errors
    ///
    /// - [`PlaylistError::Setup`] if the handshake fails; no search runs.
    /// - [`PlaylistError::Search`] for the first failed search.
    /// - [`PlaylistError::Cancelled`] if `cancel` fired before every query
    ///   completed.
    /// - [`PlaylistError::NoTracksFound`] if every query came back empty.
    pub async fn gather<F>(
        &self,
        cancel: &CancellationToken,
        queries: Vec<String>,
        on_result: F,
    ) -> Result<GatherSummary>
    where
        F: Fn(usize, &str, &[Track]) + Send + Sync + 'static,
    {
        let provider_name = self.provider.name().to_string();
        info!(
            provider = %provider_name,
            queries = queries.len(),
            max_concurrency = self.max_concurrency,
            "Gather started"
        );

        let setup = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PlaylistError::Cancelled),
            res = self.provider.setup() => res,
        };
        if let Err(source) = setup {
            warn!(provider = %provider_name, error = %source, "Provider setup failed");
            return Err(PlaylistError::Setup {
                provider: provider_name,
                source,
            });
        }

        let total = queries.len();
        let on_result = Arc::new(on_result);
        let completed = Arc::new(AtomicUsize::new(0));
        let resolved = Arc::new(AtomicUsize::new(0));
        let matches = Arc::new(AtomicUsize::new(0));
        let first_error: Arc<OnceLock<PlaylistError>> = Arc::new(OnceLock::new());

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let abort = cancel.child_token();
        let mut tasks = JoinSet::new();

        for (slot, query) in queries.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = abort.cancelled() => {
                    debug!(slot, "Scheduling stopped");
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let provider = Arc::clone(&self.provider);
            let on_result = Arc::clone(&on_result);
            let completed = Arc::clone(&completed);
            let resolved = Arc::clone(&resolved);
            let matches = Arc::clone(&matches);
            let first_error = Arc::clone(&first_error);
            let abort = abort.clone();

            tasks.spawn(async move {
                let _permit = permit;

                let found = tokio::select! {
                    biased;
                    _ = abort.cancelled() => {
                        debug!(slot, query = %query, "Search dropped");
                        return;
                    }
                    res = provider.search_tracks(&query) => res,
                };

                match found {
                    Ok(tracks) => {
                        debug!(slot, query = %query, matches = tracks.len(), "Search finished");
                        completed.fetch_add(1, Ordering::Relaxed);
                        matches.fetch_add(tracks.len(), Ordering::Relaxed);
                        if !tracks.is_empty() {
                            resolved.fetch_add(1, Ordering::Relaxed);
                        }
                        on_result(slot, &query, &tracks);
                    }
                    Err(source) => {
                        warn!(slot, query = %query, error = %source, "Search failed");
                        let _ = first_error.set(PlaylistError::Search {
                            provider: provider.name().to_string(),
                            query,
                            source,
                        });
                        abort.cancel();
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Search task aborted");
                let _ = first_error.set(PlaylistError::Join(e));
                abort.cancel();
            }
        }

        if let Some(err) = Arc::into_inner(first_error).and_then(OnceLock::into_inner) {
            return Err(err);
        }

        let summary = GatherSummary {
            queries: completed.load(Ordering::Relaxed),
            resolved: resolved.load(Ordering::Relaxed),
            matches: matches.load(Ordering::Relaxed),
        };

        // A cancel that lands after the last search finished skipped nothing.
        if summary.queries < total && cancel.is_cancelled() {
            info!(
                provider = %provider_name,
                completed = summary.queries,
                queries = total,
                "Gather cancelled"
            );
            return Err(PlaylistError::Cancelled);
        }

        if summary.matches == 0 {
            info!(provider = %provider_name, "Gather finished without a single match");
            return Err(PlaylistError::NoTracksFound);
        }

        info!(
            provider = %provider_name,
            resolved = summary.resolved,
            matches = summary.matches,
            "Gather finished"
        );

        Ok(summary)
    }

    /// Creates the playlist `name` and fills it with `tracks`, returning its id.
    ///
    /// The two calls are strictly sequential. If populating fails the freshly
    /// created playlist is left empty on the service; nothing is rolled back.
    /// Callers are expected to skip push when there is nothing to add.
    pub async fn push(
        &self,
        cancel: &CancellationToken,
        name: &str,
        tracks: &[String],
    ) -> Result<String> {
        let provider_name = self.provider.name();
        info!(provider = %provider_name, name, tracks = tracks.len(), "Push started");

        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PlaylistError::Cancelled),
            res = self.provider.create_playlist(name) => res,
        };
        let playlist_id = created.map_err(|source| PlaylistError::CreatePlaylist {
            provider: provider_name.to_string(),
            source,
        })?;
        debug!(playlist_id = %playlist_id, "Playlist created");

        let populated = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PlaylistError::Cancelled),
            res = self.provider.populate_playlist(&playlist_id, tracks) => res,
        };
        populated.map_err(|source| PlaylistError::PopulatePlaylist {
            provider: provider_name.to_string(),
            source,
        })?;

        info!(provider = %provider_name, playlist_id = %playlist_id, "Push finished");

        Ok(playlist_id)
    }
}
