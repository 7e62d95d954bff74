use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};
use tubefeed_core::{CatalogClient, CatalogError};

use crate::store::{CacheStore, StoreError, VideoRecord};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("api error: {0}")]
    Api(#[from] CatalogError),
    #[error("cache error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Loading,
    Error(String),
}

#[derive(Debug)]
struct SyncState {
    page_token: Option<String>,
    status: SyncStatus,
    last_triggered_index: usize,
}

/// The stateful coordinator a caller talks to. Owns the continuation
/// token, the three-state status and the load-more high-water mark;
/// all three live behind one mutex that is only ever held for plain
/// field updates, never across an await.
pub struct SyncOrchestrator {
    client: CatalogClient,
    store: CacheStore,
    state: Mutex<SyncState>,
}

impl SyncOrchestrator {
    pub fn new(client: CatalogClient, store: CacheStore) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(SyncState {
                page_token: None,
                status: SyncStatus::Idle,
                last_triggered_index: 0,
            }),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.state().status.clone()
    }

    /// Fetch and merge the next catalog page. A call that arrives while
    /// another fetch is in flight coalesces into a no-op, which also
    /// keeps a stale response from ever overwriting the continuation
    /// token. On failure the token is left untouched and the status
    /// carries the error's message; the following call retries the same
    /// page.
    pub async fn fetch_next_page(&self) -> Result<Vec<VideoRecord>, SyncError> {
        let token = {
            let mut state = self.state();
            if state.status == SyncStatus::Loading {
                debug!("page fetch already in flight, coalescing");
                return Ok(Vec::new());
            }
            state.status = SyncStatus::Loading;
            state.page_token.clone()
        };

        let guard = LoadingGuard::new(&self.state);
        let outcome = self.fetch_and_store(token.as_deref()).await;
        let mut state = guard.disarm();
        match outcome {
            Ok((records, next_token)) => {
                state.page_token = next_token;
                state.status = SyncStatus::Idle;
                Ok(records)
            }
            Err(err) => {
                state.status = SyncStatus::Error(err.to_string());
                Err(err)
            }
        }
    }

    async fn fetch_and_store(
        &self,
        token: Option<&str>,
    ) -> Result<(Vec<VideoRecord>, Option<String>), SyncError> {
        let page = self.client.fetch_page(token).await?;
        let next_token = page.listing.next_page_token.clone();
        let records = self.store.upsert_merge(&page.listing, &page.detail).await?;
        debug!(
            written = records.len(),
            end_of_catalog = next_token.is_none(),
            "page merged"
        );
        Ok((records, next_token))
    }

    /// Edge-triggered scroll threshold: fires a background fetch when
    /// the visible index reaches a non-zero multiple of `threshold` it
    /// has not passed before. Scrolling back and forth inside an
    /// already-triggered band never re-fetches. The fetch runs detached;
    /// its outcome is observable only through the status.
    pub fn maybe_load_more(self: &Arc<Self>, visible_index: usize, threshold: usize) {
        if threshold == 0 || visible_index == 0 || visible_index % threshold != 0 {
            return;
        }
        {
            let mut state = self.state();
            if visible_index <= state.last_triggered_index {
                return;
            }
            state.last_triggered_index = visible_index;
        }
        debug!(visible_index, threshold, "load-more threshold crossed");
        let this = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = this.fetch_next_page().await {
                warn!(error = %err, "background page fetch failed");
            }
        });
    }

    /// Local-first search. Empty text short-circuits to an empty result
    /// with no I/O at all. A local title match is returned without
    /// touching the network; only a cache miss reaches the remote
    /// search, whose results are converted but never persisted.
    /// `NotFound` from the remote side is a successful empty result;
    /// every other failure is recorded in the status and re-thrown.
    pub async fn search(&self, text: &str) -> Result<Vec<VideoRecord>, SyncError> {
        if text.is_empty() {
            self.state().status = SyncStatus::Idle;
            return Ok(Vec::new());
        }

        let local = self.store.search(text).await?;
        if !local.is_empty() {
            debug!(matches = local.len(), "search served from cache");
            self.state().status = SyncStatus::Idle;
            return Ok(local);
        }

        self.state().status = SyncStatus::Loading;
        let guard = LoadingGuard::new(&self.state);
        let outcome = self.client.search(text).await;
        let mut state = guard.disarm();
        match outcome {
            Ok(page) => {
                let records = CacheStore::convert_ephemeral(&page.listing, &page.detail);
                state.status = SyncStatus::Idle;
                Ok(records)
            }
            Err(CatalogError::NotFound) => {
                state.status = SyncStatus::Idle;
                Ok(Vec::new())
            }
            Err(err) => {
                state.status = SyncStatus::Error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub async fn mark_position(&self, video_id: &str, seconds: f64) -> Result<(), SyncError> {
        self.store.mark_position(video_id, seconds).await?;
        Ok(())
    }

    pub async fn set_favorite(&self, video_id: &str, favorite: bool) -> Result<(), SyncError> {
        self.store.set_favorite(video_id, favorite).await?;
        Ok(())
    }

    pub async fn catalog(&self) -> Result<Vec<VideoRecord>, SyncError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn favorites(&self) -> Result<Vec<VideoRecord>, SyncError> {
        Ok(self.store.favorites().await?)
    }

    pub async fn cached_count(&self) -> Result<i64, SyncError> {
        Ok(self.store.count().await?)
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Turns an abandoned in-flight operation into `Error` instead of a
/// status stuck at `Loading`: if the owning future is dropped before
/// `disarm`, the guard records the cancellation.
struct LoadingGuard<'a> {
    state: &'a Mutex<SyncState>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a Mutex<SyncState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) -> MutexGuard<'a, SyncState> {
        self.armed = false;
        let state = self.state;
        state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.status == SyncStatus::Loading {
            state.status = SyncStatus::Error("operation cancelled".to_string());
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
