//! Development server with live reload
//!
//! Pages are rendered per request straight from the content directory, so
//! an edited file shows up on the next reload without a rebuild.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::Category;
use crate::generator::{Generator, PageStatus, RenderedPage};
use crate::helpers::inject_before_body_end;
use crate::Folio;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
"#;

/// Server state
pub struct ServerState {
    /// Replaced when the config file changes
    generator: RwLock<Arc<Generator>>,
    static_dir: RwLock<PathBuf>,
    /// `config.root` without the trailing slash, empty when serving at `/`
    root_prefix: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(folio: &Folio, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            generator: RwLock::new(Arc::new(dev_generator(folio)?)),
            static_dir: RwLock::new(folio.static_dir.clone()),
            root_prefix: root_prefix(&folio.config.root),
            reload_tx,
            live_reload,
        })
    }

    fn generator(&self) -> Arc<Generator> {
        let guard = self.generator.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    fn static_dir(&self) -> PathBuf {
        self.static_dir
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Swap in a freshly loaded site
    fn reload(&self, folio: &Folio) -> Result<()> {
        let generator = Arc::new(dev_generator(folio)?);
        *self.generator.write().unwrap_or_else(|e| e.into_inner()) = generator;
        *self.static_dir.write().unwrap_or_else(|e| e.into_inner()) = folio.static_dir.clone();
        Ok(())
    }

    /// Wrap rendered HTML, adding the reload script when watching
    fn html(&self, status: StatusCode, html: String) -> Response {
        let html = if self.live_reload {
            inject_before_body_end(&html, LIVE_RELOAD_SCRIPT)
        } else {
            html
        };
        (status, Html(html)).into_response()
    }

    fn error_page(&self, error: &anyhow::Error) -> Response {
        tracing::error!("Failed to render page: {:#}", error);
        match self.generator().render_error(None) {
            Ok(html) => self.html(StatusCode::INTERNAL_SERVER_ERROR, html),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }

    fn not_found_page(&self, category: Option<Category>) -> Response {
        match self.generator().render_not_found(category) {
            Ok(html) => self.html(StatusCode::NOT_FOUND, html),
            Err(e) => self.error_page(&e),
        }
    }
}

fn dev_generator(folio: &Folio) -> Result<Generator> {
    Ok(Generator::new(folio)?.with_error_details(true))
}

/// Normalize `config.root` into a path prefix: `/` -> ``, `/portfolio/` -> `/portfolio`
fn root_prefix(root: &str) -> String {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Build the router serving the site under the configured root
///
/// Changing `root` needs a server restart.
pub fn router(state: Arc<ServerState>) -> Router {
    let prefix = state.root_prefix.clone();

    let mut app = Router::new()
        .route(&format!("{}/", prefix), get(home_handler))
        .route(&format!("{}/projects/:slug", prefix), get(project_handler))
        .route(&format!("{}/projects/:slug/", prefix), get(project_handler))
        .route(&format!("{}/journey/:slug", prefix), get(journey_handler))
        .route(&format!("{}/journey/:slug/", prefix), get(journey_handler))
        .route(&format!("{}/sitemap.xml", prefix), get(sitemap_handler))
        .route("/__livereload", get(livereload_handler));

    if !prefix.is_empty() {
        let home = format!("{}/", prefix);
        app = app
            .route(&prefix, get(home_handler))
            .route("/", get(move || async move { Redirect::temporary(&home) }));
    }

    app.fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(folio, watch)?);
    let app = router(Arc::clone(&state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let folio = folio.clone();
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(folio, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch content, static assets and config, then tell browsers to reload
fn watch_and_reload(mut folio: Folio, state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce to avoid a reload per saved file
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let config_path = folio.config_path();
    for dir in [&folio.content_dir, &folio.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant_change(&e.path))
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if relevant.iter().any(|e| e.path == config_path) {
                    match Folio::new(&folio.base_dir).and_then(|f| state.reload(&f).map(|_| f)) {
                        Ok(reloaded) => {
                            folio = reloaded;
                            tracing::info!("Reloaded {:?}", config_path);
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload config: {:#}", e);
                            continue;
                        }
                    }
                }

                // Nothing is cached, the next request sees the change
                let _ = state.reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Ignore VCS internals, Finder metadata and editor backups
fn is_relevant_change(path: &std::path::Path) -> bool {
    let ignored = path.components().any(|c| {
        let name = c.as_os_str();
        name == ".git" || name == ".DS_Store"
    });
    !ignored && !path.to_string_lossy().ends_with('~')
}

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.generator().render_home() {
        Ok(html) => state.html(StatusCode::OK, html),
        Err(e) => state.error_page(&e),
    }
}

async fn project_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    item_response(&state, Category::Projects, &slug)
}

async fn journey_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    item_response(&state, Category::Journey, &slug)
}

fn item_response(state: &ServerState, category: Category, slug: &str) -> Response {
    match state.generator().render_item_page(category, slug) {
        Ok(RenderedPage { status, html }) => {
            let code = match status {
                PageStatus::Ok => StatusCode::OK,
                PageStatus::NotFound => StatusCode::NOT_FOUND,
                PageStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
            };
            state.html(code, html)
        }
        Err(e) => state.error_page(&e),
    }
}

async fn sitemap_handler(State(state): State<Arc<ServerState>>) -> Response {
    let generator = state.generator();
    if !generator.sitemap_enabled() {
        return state.not_found_page(None);
    }

    match generator.render_sitemap() {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(e) => state.error_page(&e),
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve static assets, or the site-wide 404 page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    // Assets are copied under the root in the built site, and linked either way
    let (mut parts, body) = request.into_parts();
    if let Some(uri) = strip_root(&parts.uri, &state.root_prefix) {
        parts.uri = uri;
    }
    let request = Request::from_parts(parts, body);

    let mut service = ServeDir::new(state.static_dir()).append_index_html_on_directories(false);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            state.not_found_page(None)
        }
        Ok(response) => response.into_response(),
        Err(e) => state.error_page(&anyhow::Error::from(e)),
    }
}

/// The request URI with the root prefix removed, if it carries one
fn strip_root(uri: &Uri, prefix: &str) -> Option<Uri> {
    if prefix.is_empty() {
        return None;
    }
    let rest = uri.path().strip_prefix(prefix)?;
    if !rest.starts_with('/') {
        return None;
    }
    let rebuilt = match uri.query() {
        Some(query) => format!("{}?{}", rest, query),
        None => rest.to_string(),
    };
    rebuilt.parse().ok()
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
