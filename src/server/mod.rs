//! JSON query server with optional reload on file changes

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebouncedEvent};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::content::{extract_toc, LoadState, MarkdownRenderer, Post, TocEntry};
use crate::index::{FacetCount, PostFilter, PostIndex};
use crate::Folio;

/// Server state
struct ServerState {
    folio: Folio,
    renderer: MarkdownRenderer,
}

/// Load state as reported by `/api/status`
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum StatusBody {
    Idle,
    Loading,
    Loaded { posts: usize },
    Failed { error: String },
}

/// `/api/status` response: the site title next to the load state
#[derive(Debug, Serialize)]
struct StatusResponse {
    site: String,
    #[serde(flatten)]
    state: StatusBody,
}

impl From<LoadState> for StatusBody {
    fn from(state: LoadState) -> Self {
        match state {
            LoadState::Idle => StatusBody::Idle,
            LoadState::Loading => StatusBody::Loading,
            LoadState::Loaded(index) => StatusBody::Loaded { posts: index.len() },
            LoadState::Failed(error) => StatusBody::Failed { error },
        }
    }
}

/// Errors returned to API clients
#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
            ApiError::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e),
        };
        (status, Json(serde_json::json!({ "error": error }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Unavailable(e.to_string())
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    q: Option<String>,
    category: Option<String>,
    /// Comma-separated tag names
    tags: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> PostFilter {
        let tags = self
            .tags
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        PostFilter {
            query: self.q,
            category: self.category.filter(|c| !c.is_empty()),
            tags,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelatedParams {
    limit: Option<usize>,
}

/// Build the API router
pub fn router(folio: Folio) -> Router {
    let state = Arc::new(ServerState {
        folio,
        renderer: MarkdownRenderer::new(),
    });

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/reload", post(reload_handler))
        .route("/api/posts", get(list_handler))
        .route("/api/posts/:slug", get(post_handler))
        .route("/api/posts/:slug/toc", get(toc_handler))
        .route("/api/posts/:slug/related", get(related_handler))
        .route("/api/posts/:slug/html", get(html_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/categories/:category", get(category_posts_handler))
        .route("/api/tags", get(tags_handler))
        .route("/api/tags/:tag", get(tag_posts_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the query server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    // Load once up front so a broken site fails early
    let index = folio.index().await?;
    tracing::info!("Serving {} posts", index.len());

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {} for changes...", folio.source_dir.display());
        let folio = folio.clone();
        let handle = tokio::runtime::Handle::current();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(folio, handle) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(folio.clone())).await?;

    Ok(())
}

/// Watch the source directory and reload posts on changes
fn watch_and_reload(folio: Folio, handle: tokio::runtime::Handle) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce to avoid reloading on every write of a save
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&folio.source_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", folio.source_dir);

    for result in rx {
        match result {
            Ok(events) => {
                let changed: Vec<_> = events.iter().filter(|e| is_relevant(e)).collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match handle.block_on(folio.reload()) {
                    Ok(index) => tracing::info!("Reloaded {} posts", index.len()),
                    // The previous index keeps being served
                    Err(e) => tracing::error!("Reload failed: {}", e),
                }
            }
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
            }
        }
    }

    Ok(())
}

/// Skip editor and VCS noise
fn is_relevant(event: &DebouncedEvent) -> bool {
    let path = event.path.to_string_lossy();
    !path.contains(".git")
        && !path.contains(".DS_Store")
        && !path.ends_with('~')
        && !path.ends_with(".swp")
}

async fn current_index(state: &ServerState) -> ApiResult<Arc<PostIndex>> {
    Ok(state.folio.index().await?)
}

fn find_post<'a>(index: &'a PostIndex, slug: &str) -> ApiResult<&'a Post> {
    index
        .by_slug(slug)
        .ok_or_else(|| ApiError::NotFound(format!("post {}", slug)))
}

fn owned(posts: Vec<&Post>) -> Json<Vec<Post>> {
    Json(posts.into_iter().cloned().collect())
}

async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        site: state.folio.config.title.clone(),
        state: state.folio.state().into(),
    })
}

async fn reload_handler(State(state): State<Arc<ServerState>>) -> ApiResult<Json<StatusBody>> {
    let index = state.folio.reload().await?;
    Ok(Json(StatusBody::Loaded { posts: index.len() }))
}

async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Post>>> {
    let index = current_index(&state).await?;
    Ok(owned(index.filter(&params.into_filter())))
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Post>> {
    let index = current_index(&state).await?;
    Ok(Json(find_post(&index, &slug)?.clone()))
}

async fn toc_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<TocEntry>>> {
    let index = current_index(&state).await?;
    let post = find_post(&index, &slug)?;
    Ok(Json(extract_toc(&post.content)))
}

async fn related_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Query(params): Query<RelatedParams>,
) -> ApiResult<Json<Vec<Post>>> {
    let index = current_index(&state).await?;
    let post = find_post(&index, &slug)?;
    let limit = params.limit.unwrap_or(state.folio.config.related_limit);
    Ok(owned(index.related(post, limit)))
}

async fn html_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> ApiResult<Html<String>> {
    let index = current_index(&state).await?;
    let post = find_post(&index, &slug)?;
    Ok(Html(state.renderer.render(&post.content)))
}

async fn categories_handler(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Json<Vec<FacetCount>>> {
    let index = current_index(&state).await?;
    Ok(Json(index.category_counts()))
}

async fn category_posts_handler(
    State(state): State<Arc<ServerState>>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let index = current_index(&state).await?;
    Ok(owned(index.by_category(&category)))
}

async fn tags_handler(State(state): State<Arc<ServerState>>) -> ApiResult<Json<Vec<FacetCount>>> {
    let index = current_index(&state).await?;
    Ok(Json(index.tag_counts()))
}

async fn tag_posts_handler(
    State(state): State<Arc<ServerState>>,
    Path(tag): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let index = current_index(&state).await?;
    Ok(owned(index.by_tag(&tag)))
}
