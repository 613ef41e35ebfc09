//! Content loader - turns document locations into a post index
//!
//! Documents are fetched concurrently, each one either becomes a [`Post`] or
//! is dropped with a warning. The resulting [`PostIndex`] is memoized until
//! [`ContentLoader::invalidate`] is called; concurrent callers share a single
//! in-flight load.

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use super::{DocumentSource, LoadError, Post, PostDefaults};
use crate::index::PostIndex;

/// Observable state of the loader
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Nothing loaded yet
    Idle,
    /// A load is in flight and no snapshot is available
    Loading,
    Loaded(Arc<PostIndex>),
    /// The last load failed and no snapshot is available
    Failed(String),
}

/// Loads posts from a document source
pub struct ContentLoader {
    source: Arc<dyn DocumentSource>,
    defaults: PostDefaults,
    snapshot: ArcSwapOption<PostIndex>,
    last_error: ArcSwapOption<String>,
    /// Held for the duration of a batch
    in_flight: Mutex<()>,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(source: Arc<dyn DocumentSource>, defaults: PostDefaults) -> Self {
        Self {
            source,
            defaults,
            snapshot: ArcSwapOption::empty(),
            last_error: ArcSwapOption::empty(),
            in_flight: Mutex::new(()),
        }
    }

    /// Load all posts, reusing the memoized index when there is one
    ///
    /// Callers arriving while a load is running wait for it and get its
    /// result instead of fetching again. A failed load is not memoized.
    pub async fn load_all(&self, locations: &[String]) -> Result<Arc<PostIndex>, LoadError> {
        self.load_with(|| Ok(locations.to_vec())).await
    }

    /// Like [`ContentLoader::load_all`], resolving the locations inside the
    /// load so a discovery failure is reported through [`LoadState::Failed`]
    pub async fn load_with<F>(&self, locate: F) -> Result<Arc<PostIndex>, LoadError>
    where
        F: FnOnce() -> Result<Vec<String>, LoadError>,
    {
        if let Some(index) = self.snapshot.load_full() {
            return Ok(index);
        }

        let _flight = self.in_flight.lock().await;
        if let Some(index) = self.snapshot.load_full() {
            return Ok(index);
        }

        self.run_batch(locate).await
    }

    /// Load a fresh index and swap it in, keeping the old one readable
    /// until the new one is complete
    pub async fn reload(&self, locations: &[String]) -> Result<Arc<PostIndex>, LoadError> {
        self.reload_with(|| Ok(locations.to_vec())).await
    }

    pub async fn reload_with<F>(&self, locate: F) -> Result<Arc<PostIndex>, LoadError>
    where
        F: FnOnce() -> Result<Vec<String>, LoadError>,
    {
        let _flight = self.in_flight.lock().await;
        self.run_batch(locate).await
    }

    /// Drop the memoized index so the next load fetches again
    pub fn invalidate(&self) {
        self.snapshot.store(None);
        self.last_error.store(None);
    }

    /// The current index, if one has been loaded
    pub fn snapshot(&self) -> Option<Arc<PostIndex>> {
        self.snapshot.load_full()
    }

    pub fn state(&self) -> LoadState {
        if let Some(index) = self.snapshot.load_full() {
            return LoadState::Loaded(index);
        }
        if self.in_flight.try_lock().is_err() {
            return LoadState::Loading;
        }
        match self.last_error.load_full() {
            Some(message) => LoadState::Failed((*message).clone()),
            None => LoadState::Idle,
        }
    }

    async fn run_batch<F>(&self, locate: F) -> Result<Arc<PostIndex>, LoadError>
    where
        F: FnOnce() -> Result<Vec<String>, LoadError>,
    {
        let batch = match locate() {
            Ok(locations) => self
                .fetch_batch(&locations)
                .await
                .map(|posts| (posts, locations.len())),
            Err(e) => Err(e),
        };

        match batch {
            Ok((posts, documents)) => {
                let index = Arc::new(PostIndex::new(posts));
                tracing::info!("Loaded {} posts from {} documents", index.len(), documents);
                self.snapshot.store(Some(Arc::clone(&index)));
                self.last_error.store(None);
                Ok(index)
            }
            Err(e) => {
                tracing::error!("Failed to load posts: {}", e);
                self.last_error.store(Some(Arc::new(e.to_string())));
                Err(e)
            }
        }
    }

    /// Fetch and parse every location without touching the memoized index
    ///
    /// Posts come back in location order; documents that fail to fetch or
    /// validate are skipped.
    pub async fn fetch_batch(&self, locations: &[String]) -> Result<Vec<Post>, LoadError> {
        let mut tasks = JoinSet::new();
        for (order, location) in locations.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let location = location.clone();
            tasks.spawn(async move {
                let fetched = source.fetch(&location).await;
                (order, location, fetched)
            });
        }

        let mut loaded = Vec::with_capacity(locations.len());
        while let Some(joined) = tasks.join_next().await {
            let (order, location, fetched) = joined?;

            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("Failed to fetch post: {}", e);
                    continue;
                }
            };

            match Post::from_document(&location, &raw, &self.defaults) {
                Ok(post) => {
                    tracing::debug!("Loaded post {:?} from {}", post.slug, location);
                    loaded.push((order, post));
                }
                Err(e) => {
                    tracing::warn!("Skipping post {}: {}", location, e);
                }
            }
        }

        loaded.sort_by_key(|(order, _)| *order);
        Ok(loaded.into_iter().map(|(_, post)| post).collect())
    }
}
