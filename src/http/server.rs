//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with both handlers
//! - Run the replay decision before anything else on every request
//! - Answer plain requests with metadata
//! - Upgrade `/ws` requests into echo sessions
//! - Drain open sessions on shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{EchoConfig, SessionConfig};
use crate::http::response::{metadata_response, replay_response};
use crate::http::websocket::EchoSession;
use crate::identity::{InstanceIdentity, RequestMetadata};
use crate::lifecycle::Shutdown;
use crate::net::SessionTracker;
use crate::observability::metrics;
use crate::routing::{ReplayDecision, ReplayQuery};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<InstanceIdentity>,
    pub session: SessionConfig,
    pub shutdown: Shutdown,
    pub sessions: SessionTracker,
}

/// HTTP server for the echo service.
pub struct HttpServer {
    router: Router,
    config: EchoConfig,
    shutdown: Shutdown,
    sessions: SessionTracker,
}

impl HttpServer {
    /// Create a new HTTP server serving as `identity`.
    pub fn new(config: EchoConfig, identity: InstanceIdentity, shutdown: Shutdown) -> Self {
        let sessions = SessionTracker::new();
        let state = AppState {
            identity: Arc::new(identity),
            session: config.session.clone(),
            shutdown: shutdown.clone(),
            sessions: sessions.clone(),
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            shutdown,
            sessions,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/ws", any(websocket_handler))
            .fallback(metadata_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until shutdown is triggered, then drain sessions.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut signal = self.shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.recv().await })
            .await?;

        let open = self.sessions.active_count();
        if open > 0 {
            tracing::info!(sessions = open, "Waiting for websocket sessions to close");
        }
        if !self
            .sessions
            .wait_for_drain(self.config.session.drain_timeout())
            .await
        {
            tracing::warn!(
                sessions = self.sessions.active_count(),
                "Sessions still open after drain timeout"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Live-session tracker shared with every handler.
    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }
}

/// Replay check shared by both handlers.
fn replay_guard(state: &AppState, query: &ReplayQuery) -> Option<Response> {
    let decision = ReplayDecision::decide(&state.identity, query);
    if decision.is_local() {
        return None;
    }

    tracing::info!(replay = %decision, "Replaying request");
    metrics::record_replay(decision.kind());
    replay_response(&decision)
}

/// Plain request: report who served it.
async fn metadata_handler(
    State(state): State<AppState>,
    replay: ReplayQuery,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = replay_guard(&state, &replay) {
        return response;
    }

    metrics::record_metadata_request();
    metadata_response(&RequestMetadata::build(&state.identity, &headers))
}

/// Upgrade request: replay check first, then hand off to an echo session.
async fn websocket_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    replay: ReplayQuery,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if let Some(response) = replay_guard(&state, &replay) {
        return response;
    }

    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(remote = %remote, error = %rejection, "Websocket upgrade rejected");
            return rejection.into_response();
        }
    };

    let greeting = RequestMetadata::build(&state.identity, &headers).to_json();
    let message_timeout = state.session.message_timeout();
    let shutdown = state.shutdown.subscribe();
    let guard = state.sessions.track();

    ws.on_failed_upgrade(move |e| {
        tracing::warn!(remote = %remote, error = %e, "Websocket upgrade failed");
    })
    .on_upgrade(move |socket| async move {
        EchoSession::new(socket, remote, message_timeout, shutdown, guard)
            .run(greeting)
            .await;
    })
}
