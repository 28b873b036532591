//! HTTP side of the relay
//!
//! Runs on its own thread with a private single-threaded tokio runtime, so the
//! host's tick loop never shares an executor with network I/O. Routes:
//! - `POST /api/send` pushes the raw body into the inbound queue
//! - `GET /api/events?since=<cursor>` returns the outbound log delta as JSON
//! - anything else is looked up in the [`AssetStore`]

use crate::assets::{content_type, AssetStore};
use crate::error::RelayError;
use crate::inbound::InboundSender;
use crate::outbound::OutboundLog;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{debug, error, info, warn};
use serde::Deserialize;
use simrelay_shared::{PollResponse, EVENTS_PATH, SEND_PATH};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

/// How long in-flight requests may keep the listener alive after stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Handles shared by every request handler
#[derive(Clone)]
pub struct TransportState {
    inbound: InboundSender,
    outbound: Arc<OutboundLog>,
    assets: Arc<dyn AssetStore>,
}

impl TransportState {
    pub fn new(
        inbound: InboundSender,
        outbound: Arc<OutboundLog>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            inbound,
            outbound,
            assets,
        }
    }
}

pub fn router(state: TransportState, request_timeout: Duration) -> Router {
    Router::new()
        .route(
            SEND_PATH,
            post(send_message)
                .fallback(serve_asset)
                .layer(DefaultBodyLimit::disable()),
        )
        .route(EVENTS_PATH, get(poll_events).fallback(serve_asset))
        .fallback(serve_asset)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Accepts any body as text; invalid UTF-8 is replaced rather than rejected.
async fn send_message(State(state): State<TransportState>, body: Bytes) -> StatusCode {
    state
        .inbound
        .enqueue(String::from_utf8_lossy(&body).into_owned());
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    since: Option<String>,
}

/// Absent or unparseable cursors read from the start of the log.
fn parse_cursor(query: Option<Query<EventsQuery>>) -> u64 {
    query
        .and_then(|Query(query)| query.since)
        .and_then(|since| since.trim().parse().ok())
        .unwrap_or(0)
}

async fn poll_events(
    State(state): State<TransportState>,
    query: Option<Query<EventsQuery>>,
) -> Json<PollResponse> {
    let cursor = parse_cursor(query);
    Json(state.outbound.read_since(cursor))
}

async fn serve_asset(State(state): State<TransportState>, uri: Uri) -> Response {
    let path = uri.path();
    if path.contains("favicon") {
        return StatusCode::OK.into_response();
    }

    let Some(file) = state.assets.resolve(path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(e) => {
            debug!("Asset {} unavailable ({}): {}", path, file.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Dedicated listener thread serving a [`router`].
pub struct TransportListener {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl TransportListener {
    /// Binds `addr` before returning, so a taken port fails here rather than
    /// on the listener thread.
    pub fn spawn(addr: &str, router: Router) -> Result<Self, RelayError> {
        let bind_error = |source| RelayError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = std::net::TcpListener::bind(addr).map_err(bind_error)?;
        listener.set_nonblocking(true).map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RelayError::Runtime)?;

        let running = Arc::new(AtomicBool::new(true));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let thread = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("simrelay-listener".to_string())
                .spawn(move || {
                    runtime.block_on(serve(listener, router, shutdown_rx));
                    running.store(false, Ordering::SeqCst);
                    info!("Relay listener on {} stopped", local_addr);
                })
                .map_err(RelayError::Spawn)?
        };

        info!("Relay listening on http://{}", local_addr);

        Ok(Self {
            local_addr,
            running,
            shutdown,
            thread: Some(thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops accepting, waits briefly for in-flight requests and joins the thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Err only means the listener already exited.
        let _ = self.shutdown.send(true);

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Relay listener thread panicked");
            }
        }
    }
}

impl Drop for TransportListener {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn stop_requested(mut shutdown: watch::Receiver<bool>) {
    loop {
        let stop = *shutdown.borrow_and_update();
        if stop || shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn serve(listener: std::net::TcpListener, router: Router, shutdown: watch::Receiver<bool>) {
    let listener = match tokio::net::TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to register relay socket: {}", e);
            return;
        }
    };

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(stop_requested(shutdown.clone()))
        .into_future();

    let deadline = async {
        stop_requested(shutdown).await;
        tokio::time::sleep(SHUTDOWN_GRACE).await;
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Relay listener failed: {}", e);
            }
        }
        _ = deadline => {
            warn!("Relay listener still busy after {:?}, dropping open connections", SHUTDOWN_GRACE);
        }
    }
}
