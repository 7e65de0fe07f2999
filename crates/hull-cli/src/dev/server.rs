//! Development server with live reload via Server-Sent Events.
//!
//! Pages are answered through the same scheme resolver the packaged shell
//! uses, so unknown routes fall back to the default entry exactly as they
//! would in production.

use crate::dev::supervisor::{DevServerControl, SupervisorEvent, SupervisorHandle};
use crate::dev::SharedState;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

pub const RELOAD_EVENTS_PATH: &str = "/__hull_reload__";
pub const RELOAD_SCRIPT_PATH: &str = "/__hull_reload__.js";

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");
const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Development server.
pub struct DevServer {
    addr: SocketAddr,
    state: SharedState,
}

impl DevServer {
    pub fn new(addr: SocketAddr, state: SharedState) -> Self {
        Self { addr, state }
    }

    /// Bind and start serving in the background.
    ///
    /// Sends [`SupervisorEvent::ServerListening`] with the bound URL once the
    /// socket is ready, and [`SupervisorEvent::ServerClosed`] when serving
    /// stops for any reason.
    ///
    /// # Errors
    ///
    /// Fails when the address cannot be bound.
    pub async fn spawn(self, events: SupervisorHandle) -> Result<DevServerHandle> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", self.addr, e)))?;
        let local_addr = listener.local_addr()?;
        let url = format!("http://{}", local_addr);

        let app = router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let closed_events = events.clone();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;

            if let Err(e) = &result {
                error!(error = %e, "dev server stopped with error");
            }
            closed_events.send(SupervisorEvent::ServerClosed).await;
            result.map_err(|e| CliError::Server(format!("Server error: {}", e)))
        });

        info!(url = %url, "dev server listening");
        events
            .send(SupervisorEvent::ServerListening { url: url.clone() })
            .await;

        Ok(DevServerHandle {
            url,
            local_addr,
            state: self.state,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Routes: reload stream, reload client, favicon, and the resolver for
/// everything else.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(RELOAD_EVENTS_PATH, get(handle_sse))
        .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
        .route("/favicon.ico", get(handle_favicon))
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Control handle for a running [`DevServer`].
pub struct DevServerHandle {
    url: String,
    local_addr: SocketAddr,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<()>>>,
}

impl DevServerHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }
}

#[async_trait]
impl DevServerControl for DevServerHandle {
    /// Stop accepting connections, end SSE streams and wait for the serve
    /// task. Later calls return immediately.
    async fn close(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        // Open SSE streams would hold graceful shutdown forever.
        self.state.disconnect_all();

        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| CliError::Server(format!("dev server task failed: {}", e)))?,
            None => Ok(()),
        }
    }
}

/// Live-reload event stream; ends when the server closes.
async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    debug!(subscriber = id, clients = state.client_count(), "reload subscriber connected");

    let events = ReceiverStream::new(rx).map(|json| Ok(Event::default().data(json)));
    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("ping"))
}

async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

async fn handle_favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Every other path goes through the scheme resolver.
async fn handle_request(
    State(state): State<SharedState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let resolver = state.resolver();
    let raw_url = scheme_url(resolver.scheme(), &uri);
    let locale = preferred_locale(&headers).unwrap_or_else(|| resolver.locales().default_tag());
    let descriptor = resolver.resolve_url(&raw_url, locale).await;

    let body = match descriptor.read().await {
        Ok(body) => body,
        Err(err) => {
            // Only reachable when the fallback document itself is unreadable.
            error!(url = %raw_url, file = %descriptor.file_url(), error = %err, "asset read failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("cannot read {}: {}", descriptor.file_url(), err),
            )
                .into_response();
        }
    };

    let content_type = descriptor.content_type();
    let body = if state.reload_enabled() && content_type.starts_with("text/html") {
        with_reload_client(body)
    } else {
        body
    };

    let status = StatusCode::from_u16(descriptor.status()).unwrap_or(StatusCode::OK);
    (
        status,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from(body),
    )
        .into_response()
}

/// Rewrite an HTTP request URI as `<scheme>://<path>[?query]`.
fn scheme_url(scheme: &str, uri: &Uri) -> String {
    let path = uri.path().trim_start_matches('/');
    match uri.query() {
        Some(query) => format!("{}://{}?{}", scheme, path, query),
        None => format!("{}://{}", scheme, path),
    }
}

/// First tag of `Accept-Language`, e.g. `zh-CN` from `zh-CN,zh;q=0.9`.
fn preferred_locale(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::ACCEPT_LANGUAGE)?.to_str().ok()?;
    let tag = value.split(',').next()?.split(';').next()?.trim();
    (!tag.is_empty() && tag != "*").then_some(tag)
}

/// Insert the reload client tag before the last `</body>` (any case), or
/// append it when the document has none.
fn with_reload_client(mut html: Vec<u8>) -> Vec<u8> {
    let tag = format!("<script src=\"{}\"></script>\n", RELOAD_SCRIPT_PATH);
    let closing = b"</body>";

    let at = html
        .windows(closing.len())
        .rposition(|window| window.eq_ignore_ascii_case(closing))
        .unwrap_or(html.len());
    html.splice(at..at, tag.into_bytes());
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = r#"<script src="/__hull_reload__.js"></script>"#;

    fn inject(html: &str) -> String {
        String::from_utf8(with_reload_client(html.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_script_goes_before_last_body_close() {
        let html = inject("<html><body><p>&lt;/body&gt;</p></BODY></html>");
        let tag = html.find(TAG).unwrap();
        assert!(tag < html.find("</BODY>").unwrap());
        assert!(html.ends_with("</BODY></html>"));
    }

    #[test]
    fn test_script_appended_without_body() {
        let html = inject("<h1>fragment</h1>");
        assert!(html.starts_with("<h1>fragment</h1><script"));
        assert!(html.trim_end().ends_with(TAG));
    }

    #[test]
    fn test_preferred_locale() {
        let mut headers = HeaderMap::new();
        assert_eq!(preferred_locale(&headers), None);

        headers.insert(header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8".parse().unwrap());
        assert_eq!(preferred_locale(&headers), Some("zh-CN"));

        headers.insert(header::ACCEPT_LANGUAGE, "*".parse().unwrap());
        assert_eq!(preferred_locale(&headers), None);
    }

    #[test]
    fn test_scheme_url_keeps_query() {
        let uri: Uri = "/dist/zh-cn/index.html?x=1".parse().unwrap();
        assert_eq!(scheme_url("app", &uri), "app://dist/zh-cn/index.html?x=1");

        let uri: Uri = "/".parse().unwrap();
        assert_eq!(scheme_url("app", &uri), "app://");
    }
}
