//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::{PostDefaults, WORDS_PER_MINUTE};
use crate::index::RELATED_LIMIT;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    /// Author used for posts that name none
    pub author: String,

    // Sources
    pub source_dir: String,
    /// Directory under `source_dir` scanned when `posts` is empty
    pub posts_dir: String,
    /// Explicit post locations, relative to `source_dir` or `remote_base`
    #[serde(default)]
    pub posts: Vec<String>,
    /// Fetch posts over HTTP relative to this URL instead of from disk
    pub remote_base: Option<String>,

    // Reading
    pub words_per_minute: usize,
    pub related_limit: usize,

    // Date format (Moment.js style)
    pub date_format: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            author: "Anonymous".to_string(),

            source_dir: "source".to_string(),
            posts_dir: "_posts".to_string(),
            posts: Vec::new(),
            remote_base: None,

            words_per_minute: WORDS_PER_MINUTE,
            related_limit: RELATED_LIMIT,

            date_format: "MMMM D, YYYY".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults applied to every loaded post
    pub fn post_defaults(&self) -> PostDefaults {
        PostDefaults {
            author: self.author.clone(),
            words_per_minute: self.words_per_minute.max(1),
        }
    }
}
