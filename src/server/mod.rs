//! Blog server with on-demand generation and background revalidation
//!
//! Listing pages are served from the public directory and regenerated once
//! they are older than the listing interval. Article pages are generated on
//! first request: the visitor gets the fallback render, which reloads itself
//! until the page exists. Stale article pages are served while they are
//! regenerated in the background.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cache::{self, post_route, CacheDb, RouteStatus, LISTING_ROUTE};
use crate::client::{ContentSource, PrismicClient};
use crate::config::{ClientConfig, RequestContext, PREVIEW_COOKIE};
use crate::content::RenderState;
use crate::generator::{post_output, Generator, PostOutcome};
use crate::helpers::{encode_segment, post_path, url_for};
use crate::Blog;

/// Server state
pub struct ServerState<S: ?Sized> {
    blog: Blog,
    generator: Generator<S>,
    cache: Mutex<CacheDb>,
    in_flight: Mutex<HashSet<String>>,
    /// Client settings used to answer preview requests
    preview: Option<ClientConfig>,
}

impl<S> ServerState<S>
where
    S: ContentSource + ?Sized + 'static,
{
    pub fn new(blog: &Blog, source: Arc<S>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            generator: Generator::new(blog, source)?,
            cache: Mutex::new(CacheDb::load(&blog.base_dir)),
            in_flight: Mutex::new(HashSet::new()),
            preview: None,
        })
    }

    /// Answer requests carrying a preview cookie with live content
    pub fn with_preview(mut self, config: ClientConfig) -> Self {
        self.preview = Some(config);
        self
    }
}

/// What to answer for an article request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostResponse {
    Page(String),
    Fallback(String),
    NotFound(String),
}

impl IntoResponse for PostResponse {
    fn into_response(self) -> Response {
        match self {
            PostResponse::Page(html) | PostResponse::Fallback(html) => Html(html).into_response(),
            PostResponse::NotFound(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        }
    }
}

/// Start the server
pub async fn start<S>(blog: &Blog, source: Arc<S>, ip: &str, port: u16, open: bool) -> Result<()>
where
    S: ContentSource + ?Sized + 'static,
{
    let mut state = ServerState::new(blog, source)?;
    if !blog.config.api_endpoint.is_empty() {
        state = state.with_preview(blog.client_config());
    }
    let state = Arc::new(state);
    state.generator.generate_not_found()?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    tokio::spawn(revalidate_listing(state.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the application router
pub fn router<S>(state: Arc<ServerState<S>>) -> Router
where
    S: ContentSource + ?Sized + 'static,
{
    let public_dir = state.blog.public_dir.clone();
    let static_files = ServeDir::new(&public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(public_dir.join("404.html")));

    Router::new()
        .route("/post/:uid", get(post_handler::<S>))
        .route("/post/:uid/", get(post_handler::<S>))
        .route("/api/posts", get(posts_api_handler::<S>))
        .route("/api/preview", get(preview_handler::<S>))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Regenerate the listing whenever it goes stale
async fn revalidate_listing<S>(state: Arc<ServerState<S>>)
where
    S: ContentSource + ?Sized + 'static,
{
    let interval_secs = state.blog.config.revalidate.listing_secs.max(1);
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;
        let stale = state
            .cache
            .lock()
            .await
            .is_stale(LISTING_ROUTE, interval_secs, cache::now_secs());
        if stale {
            if let Err(e) = refresh_listing(&state).await {
                tracing::error!("Listing revalidation failed: {:#}", e);
            }
        }
    }
}

/// Regenerate the listing pages now
pub async fn refresh_listing<S>(state: &ServerState<S>) -> Result<()>
where
    S: ContentSource + ?Sized + 'static,
{
    state.generator.generate_listing().await?;

    let mut cache = state.cache.lock().await;
    cache.record_generated(LISTING_ROUTE, "index.html", None, cache::now_secs());
    cache.save(&state.blog.base_dir)?;
    tracing::info!("Listing revalidated");
    Ok(())
}

/// Decide how to answer a request for an article
pub async fn serve_post<S>(state: &Arc<ServerState<S>>, uid: &str) -> Result<PostResponse>
where
    S: ContentSource + ?Sized + 'static,
{
    let route = post_route(uid);
    let interval = state.blog.config.revalidate.post_secs;
    let (status, stale) = {
        let cache = state.cache.lock().await;
        (
            cache.get(&route).map(|entry| entry.status),
            cache.is_stale(&route, interval, cache::now_secs()),
        )
    };

    match status {
        Some(RouteStatus::NotFound) => {
            if stale {
                spawn_generation(state.clone(), uid.to_string()).await;
            }
            Ok(PostResponse::NotFound(state.generator.render_not_found()?))
        }
        Some(RouteStatus::Generated) => {
            let path = state.blog.public_dir.join(post_output(uid));
            match tokio::fs::read_to_string(&path).await {
                Ok(html) => {
                    if stale {
                        spawn_generation(state.clone(), uid.to_string()).await;
                    }
                    Ok(PostResponse::Page(html))
                }
                Err(e) => {
                    tracing::warn!("Generated page {:?} unreadable: {}", path, e);
                    spawn_generation(state.clone(), uid.to_string()).await;
                    fallback(state)
                }
            }
        }
        None => {
            spawn_generation(state.clone(), uid.to_string()).await;
            fallback(state)
        }
    }
}

fn fallback<S>(state: &ServerState<S>) -> Result<PostResponse>
where
    S: ContentSource + ?Sized + 'static,
{
    let html = state
        .generator
        .render_article(RenderState::Fallback, None)?;
    Ok(PostResponse::Fallback(html))
}

/// Start generating an article unless a generation is already running
///
/// Returns whether a new generation was started.
pub async fn spawn_generation<S>(state: Arc<ServerState<S>>, uid: String) -> bool
where
    S: ContentSource + ?Sized + 'static,
{
    if !state.in_flight.lock().await.insert(uid.clone()) {
        tracing::debug!("Generation of {} already in flight", uid);
        return false;
    }

    tokio::spawn(async move {
        generate_and_record(&state, &uid).await;
        state.in_flight.lock().await.remove(&uid);
    });

    true
}

async fn generate_and_record<S>(state: &ServerState<S>, uid: &str)
where
    S: ContentSource + ?Sized + 'static,
{
    let route = post_route(uid);
    let result = state.generator.generate_post(uid).await;

    let mut cache = state.cache.lock().await;
    match result {
        Ok(PostOutcome::Generated {
            output_path,
            last_publication_date,
        }) => {
            tracing::info!("Generated {}", route);
            cache.record_generated(&route, &output_path, last_publication_date, cache::now_secs());
        }
        Ok(PostOutcome::NotFound) => {
            tracing::info!("No article for {}", route);
            cache.record_not_found(&route, cache::now_secs());
        }
        Err(e) => {
            tracing::error!("Failed to generate {}: {:#}", route, e);
            return;
        }
    }

    if let Err(e) = cache.save(&state.blog.base_dir) {
        tracing::warn!("Failed to save cache: {}", e);
    }
}

/// Render an article straight from the preview ref in the request cookie
async fn serve_preview<S>(
    state: &ServerState<S>,
    config: &ClientConfig,
    cookie_header: &str,
    uid: &str,
) -> Result<PostResponse>
where
    S: ContentSource + ?Sized + 'static,
{
    let client = PrismicClient::new(
        config
            .clone()
            .with_request(RequestContext::from_cookie_header(cookie_header)),
    )?;

    match state.generator.fetch_post(&client, uid).await? {
        Some(article) => Ok(PostResponse::Page(
            state
                .generator
                .render_article(RenderState::Ready, Some(&article))?,
        )),
        None => Ok(PostResponse::NotFound(state.generator.render_not_found()?)),
    }
}

async fn post_handler<S>(
    State(state): State<Arc<ServerState<S>>>,
    Path(uid): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: ContentSource + ?Sized + 'static,
{
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .filter(|cookies| cookies.contains(PREVIEW_COOKIE));

    let result = match (&state.preview, cookie_header) {
        (Some(config), Some(cookies)) => serve_preview(&state, config, cookies, &uid).await,
        _ => serve_post(&state, &uid).await,
    };

    match result {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve post {}: {:#}", uid, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostsQuery {
    after: Option<String>,
}

/// One listing page as JSON; callers append it to what they already show
async fn posts_api_handler<S>(
    State(state): State<Arc<ServerState<S>>>,
    Query(query): Query<PostsQuery>,
) -> Response
where
    S: ContentSource + ?Sized + 'static,
{
    let config = &state.blog.config;
    let source = state.generator.source();

    let result = match query.after.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => source.get_page(token).await,
        None => {
            source
                .get_by_type(&config.document_type, config.page_size)
                .await
        }
    };

    match result {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => {
            tracing::warn!("Listing request failed: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    token: String,
    uid: Option<String>,
}

/// Start a preview session: store the preview ref and go to the document
async fn preview_handler<S>(
    State(state): State<Arc<ServerState<S>>>,
    Query(query): Query<PreviewQuery>,
) -> Response
where
    S: ContentSource + ?Sized + 'static,
{
    let target = match query.uid.as_deref() {
        Some(uid) => post_path(&state.blog.config, uid),
        None => url_for(&state.blog.config, ""),
    };
    let cookie = format!(
        "{}={}; Path=/; SameSite=Lax",
        PREVIEW_COOKIE,
        encode_segment(&query.token)
    );

    ([(header::SET_COOKIE, cookie)], Redirect::temporary(&target)).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
