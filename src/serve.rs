//! Development server with live reload.
//!
//! Serves the working tree over HTTP. Every HTML response gets a small
//! client script that listens on a Server-Sent-Events channel:
//!
//! | SSE event | Client reaction |
//! |---|---|
//! | `css` | re-fetch every stylesheet link (cache-busted), no page reload |
//! | `reload` | `location.reload()` |
//!
//! The events come from the session's [`ReloadBus`]. The filesystem
//! watchers run for as long as the server does; Ctrl-C stops both.

use crate::compose::Runner;
use crate::reload::ReloadBus;
use crate::watch::{self, WatchBinding, WatchError};
use async_stream::stream;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use maud::{PreEscaped, html};
use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Route of the live-reload event stream.
pub const LIVERELOAD_PATH: &str = "/__siteforge/livereload";

const CLIENT_JS: &str = r#"(function(){var es=new EventSource("/__siteforge/livereload");es.addEventListener("reload",function(){location.reload()});es.addEventListener("css",function(){document.querySelectorAll('link[rel="stylesheet"]').forEach(function(l){var u=new URL(l.href);u.searchParams.set("livereload",Date.now());l.href=u.toString()})})})();"#;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Everything a develop session needs besides the task runner.
#[derive(Debug, Clone)]
pub struct DevSettings {
    /// Directory served and watched.
    pub root: PathBuf,
    /// `host:port` to listen on.
    pub addr: String,
    pub bindings: Vec<WatchBinding>,
}

#[derive(Clone)]
struct ServeState {
    root: Arc<PathBuf>,
    bus: ReloadBus,
    stop: tokio::sync::watch::Receiver<bool>,
}

/// The live-reload client as a `<script>` element.
pub fn client_script() -> String {
    let markup = html! { script { (PreEscaped(CLIENT_JS)) } };
    markup.into_string()
}

/// Insert the live-reload client before `</body>`, or append it.
pub fn inject_client(document: &str) -> String {
    let script = client_script();
    match document.to_ascii_lowercase().rfind("</body>") {
        Some(at) => {
            let mut out = String::with_capacity(document.len() + script.len());
            out.push_str(&document[..at]);
            out.push_str(&script);
            out.push_str(&document[at..]);
            out
        }
        None => format!("{document}{script}"),
    }
}

fn percent_decode(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = path.get(i + 1..i + 3)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Debug, PartialEq, Eq)]
enum Resolved {
    File(PathBuf),
    Forbidden,
}

/// Map a request path onto the served tree. Directories map to their
/// `index.html`; any `..` segment is refused.
async fn resolve_path(root: &Path, request_path: &str) -> Resolved {
    let decoded = percent_decode(request_path);
    let mut path = root.to_path_buf();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Resolved::Forbidden,
            s => path.push(s),
        }
    }
    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
        path.push("index.html");
    }
    Resolved::File(path)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

async fn serve_file(State(state): State<ServeState>, uri: Uri) -> Response {
    let path = match resolve_path(&state.root, uri.path()).await {
        Resolved::File(path) => path,
        Resolved::Forbidden => return StatusCode::FORBIDDEN.into_response(),
    };
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("{} -> 404 ({e})", uri.path());
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let body = if is_html(&path) {
        inject_client(&String::from_utf8_lossy(&bytes)).into_bytes()
    } else {
        bytes
    };
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        body,
    )
        .into_response()
}

async fn livereload(
    State(state): State<ServeState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let mut rx = state.bus.subscribe();
    let mut stop = state.stop.clone();
    let events = stream! {
        loop {
            let next = tokio::select! {
                received = rx.recv() => Some(received),
                _ = stop.changed() => None,
            };
            match next {
                Some(Ok(event)) => {
                    let name = event.event_name();
                    yield Ok(SseEvent::default().event(name).data(name));
                }
                Some(Err(RecvError::Lagged(skipped))) => {
                    warn!(skipped, "live-reload client lagged behind");
                    continue;
                }
                Some(Err(RecvError::Closed)) | None => break,
            }
        }
    };
    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}

fn router(root: PathBuf, bus: ReloadBus, stop: tokio::sync::watch::Receiver<bool>) -> Router {
    let state = ServeState {
        root: Arc::new(root),
        bus,
        stop,
    };
    Router::new()
        .route(LIVERELOAD_PATH, get(livereload))
        .fallback(serve_file)
        .with_state(state)
}

/// Serve `root` on `listener` until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    root: PathBuf,
    bus: ReloadBus,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServeError> {
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let app = router(root, bus, stop_rx);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            // Ends open live-reload streams so graceful shutdown can finish
            let _ = stop_tx.send(true);
        })
        .await?;
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// Run the dev server and the watchers until Ctrl-C.
pub async fn run_dev_session(settings: DevSettings, runner: Arc<Runner>) -> Result<(), ServeError> {
    let bus = runner.bus().cloned().unwrap_or_default();
    let listener = TcpListener::bind(&settings.addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: settings.addr.clone(),
            source,
        })?;
    info!(
        "serving {} at http://{}",
        settings.root.display(),
        listener.local_addr()?
    );

    let _watcher = watch::spawn(&settings.root, settings.bindings.clone(), runner)?;
    serve_on(listener, settings.root.clone(), bus, ctrl_c()).await
}
