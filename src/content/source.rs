//! Document sources - where raw post text comes from

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FetchError, LoadError};

/// Fetches raw document text by location
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the raw text of one document
    async fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Reads documents from a directory on disk
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover markdown documents under `dir` (relative to the root)
    ///
    /// Locations are returned relative to the root, sorted by path so the
    /// discovery order is stable between runs. Entries that cannot be read
    /// (dangling links, permission errors) are skipped; only an unreadable
    /// `dir` fails the discovery.
    pub fn discover(&self, dir: &str) -> Result<Vec<String>, LoadError> {
        let base = self.root.join(dir);
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut locations = Vec::new();
        for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() == 0 => {
                    return Err(LoadError::Discover {
                        path: base.display().to_string(),
                        source,
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                let relative = path.strip_prefix(&self.root).unwrap_or(path);
                locations.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }

        Ok(locations)
    }
}

#[async_trait]
impl DocumentSource for FsSource {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let path = self.root.join(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                location: location.to_string(),
                source,
            })
    }
}

/// Fetches documents over HTTP relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Url,
}

impl HttpSource {
    /// Create a source for `base`; a trailing slash is added when missing
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&normalized).map_err(|e| FetchError::InvalidUrl {
            location: base.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn url_for(&self, location: &str) -> Result<Url, FetchError> {
        self.base
            .join(location.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidUrl {
                location: location.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let url = self.url_for(location)?;
        let transport = |source| FetchError::Transport {
            location: location.to_string(),
            source,
        };

        let res = self.client.get(url).send().await.map_err(transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        res.text().await.map_err(transport)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_sorted_markdown_only() {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("_posts");
        fs::create_dir_all(posts.join("2024")).unwrap();
        fs::write(posts.join("b.md"), "b").unwrap();
        fs::write(posts.join("a.markdown"), "a").unwrap();
        fs::write(posts.join("2024").join("c.md"), "c").unwrap();
        fs::write(posts.join("image.png"), "png").unwrap();

        let source = FsSource::new(dir.path());
        let found = source.discover("_posts").unwrap();
        assert_eq!(found, vec!["_posts/2024/c.md", "_posts/a.markdown", "_posts/b.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_broken_symlink() {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("a.md"), "a").unwrap();
        std::os::unix::fs::symlink(posts.join("nowhere.md"), posts.join("broken.md")).unwrap();

        let source = FsSource::new(dir.path());
        assert_eq!(source.discover("_posts").unwrap(), vec!["_posts/a.md"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let source = FsSource::new(dir.path());
        assert!(source.discover("_posts").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fs_fetch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.md"), "hello").unwrap();
        let source = FsSource::new(dir.path());

        assert_eq!(source.fetch("hello.md").await.unwrap(), "hello");
        assert!(matches!(
            source.fetch("missing.md").await,
            Err(FetchError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_http_fetch() {
        let app = Router::new()
            .route("/posts/hello.md", get(|| async { "---\ntitle: Hi\n---\nbody" }))
            .route(
                "/posts/broken.md",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = HttpSource::new(&format!("http://{}/posts", addr)).unwrap();
        let text = source.fetch("hello.md").await.unwrap();
        assert!(text.starts_with("---\ntitle: Hi"));

        match source.fetch("broken.md").await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {:?}", other),
        }
        match source.fetch("missing.md").await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_http_invalid_base() {
        assert!(matches!(
            HttpSource::new("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }
}
