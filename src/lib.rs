//! folio: markdown post loader and query index for a personal blog
//!
//! Posts are markdown documents with a `---` delimited front-matter header.
//! They are loaded once into an immutable [`index::PostIndex`] that answers
//! slug, category, tag, search and related-post queries.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod index;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{ContentLoader, DocumentSource, FsSource, HttpSource, LoadError, LoadState};
use index::PostIndex;

/// The main Folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    loader: Arc<ContentLoader>,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);

        let source: Arc<dyn DocumentSource> = match &config.remote_base {
            Some(base) => Arc::new(HttpSource::new(base)?),
            None => Arc::new(FsSource::new(&source_dir)),
        };
        let loader = Arc::new(ContentLoader::new(source, config.post_defaults()));

        Ok(Self {
            config,
            base_dir,
            source_dir,
            loader,
        })
    }

    /// Post locations: the configured list, or the markdown files found in
    /// the posts directory
    pub fn locations(&self) -> Result<Vec<String>, LoadError> {
        if !self.config.posts.is_empty() || self.config.remote_base.is_some() {
            return Ok(self.config.posts.clone());
        }
        FsSource::new(&self.source_dir).discover(&self.config.posts_dir)
    }

    /// The post index, loading it on first use
    pub async fn index(&self) -> Result<Arc<PostIndex>> {
        Ok(self.loader.load_with(|| self.locations()).await?)
    }

    /// Reload all posts and swap in the new index
    pub async fn reload(&self) -> Result<Arc<PostIndex>> {
        Ok(self.loader.reload_with(|| self.locations()).await?)
    }

    /// Drop the loaded index
    pub fn invalidate(&self) {
        self.loader.invalidate();
    }

    pub fn state(&self) -> LoadState {
        self.loader.state()
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, category: &str, tags: &[String]) -> Result<PathBuf> {
        commands::new::create_post(self, title, category, tags)
    }
}
