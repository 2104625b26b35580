//! WebSocket echo session.
//!
//! # Responsibilities
//! - Send the request metadata as a greeting right after the upgrade
//! - Echo every text/binary message back with the same type and payload
//! - Bound each message round-trip with its own deadline
//! - Close with a normal-closure status on every exit path
//!
//! # Session States
//! ```text
//! Upgrading → Greeted → { Waiting → Copying → Waiting → ... } → Closed
//!
//! Waiting --(peer normal close)-------------→ Closed (clean)
//! Waiting --(timeout | transport error)-----→ Closed (error, logged)
//! Copying --(write error)-------------------→ Closed (error, logged)
//! any     --(process shutdown)--------------→ Closed (normal close sent)
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: one read-then-write transaction in flight
//! - The deadline is per message, not per session
//! - Ping/pong are answered by the transport and never echoed
//! - Timeouts and transport failures share one log path

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket};
use tokio::time::Instant;

use crate::lifecycle::ShutdownSignal;
use crate::net::SessionGuard;
use crate::observability::metrics;

/// Why a session ended abnormally.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no message received within {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] axum::Error),

    #[error("failed to copy message: {0}")]
    Copy(#[source] axum::Error),

    #[error("connection closed without a close frame")]
    Disconnected,

    #[error("peer closed with status {}", display_code(.code))]
    AbnormalClose { code: Option<u16> },
}

fn display_code(code: &Option<u16>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Peer sent a normal close.
    Clean,
    /// The process is shutting down.
    Shutdown,
    /// Timeout, transport or copy failure.
    Failed,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Shutdown => "shutdown",
            Self::Failed => "error",
        }
    }
}

/// Result of one loop iteration.
enum Step {
    Echoed,
    PeerClosed,
    ShuttingDown,
}

/// An inbound frame worth acting on.
enum Inbound {
    Data(Message),
    NormalClose,
}

/// One upgraded connection running the echo loop.
pub struct EchoSession {
    socket: WebSocket,
    remote: SocketAddr,
    message_timeout: Duration,
    shutdown: ShutdownSignal,
    guard: SessionGuard,
}

impl EchoSession {
    pub fn new(
        socket: WebSocket,
        remote: SocketAddr,
        message_timeout: Duration,
        shutdown: ShutdownSignal,
        guard: SessionGuard,
    ) -> Self {
        Self {
            socket,
            remote,
            message_timeout,
            shutdown,
            guard,
        }
    }

    /// Greet the peer with `greeting`, then echo until the session ends.
    ///
    /// Consumes the session; the socket is dropped on return whatever the outcome.
    pub async fn run(mut self, greeting: String) -> SessionOutcome {
        let session_id = self.guard.id();
        tracing::info!(session_id = %session_id, remote = %self.remote, "New websocket session");
        metrics::session_opened();

        if let Err(e) = self.socket.send(Message::Text(greeting.into())).await {
            tracing::warn!(
                session_id = %session_id,
                remote = %self.remote,
                error = %e,
                "Failed to send greeting"
            );
        }

        let outcome = loop {
            match self.echo_once().await {
                Ok(Step::Echoed) => continue,
                Ok(Step::PeerClosed) => break SessionOutcome::Clean,
                Ok(Step::ShuttingDown) => break SessionOutcome::Shutdown,
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        remote = %self.remote,
                        error = %e,
                        "Failed to echo"
                    );
                    break SessionOutcome::Failed;
                }
            }
        };

        self.close().await;

        metrics::session_closed(outcome.as_str());
        tracing::debug!(session_id = %session_id, outcome = outcome.as_str(), "Session ended");
        outcome
    }

    /// One read-one-message / write-one-message transaction.
    async fn echo_once(&mut self) -> Result<Step, SessionError> {
        let budget = self.message_timeout;
        let deadline = Instant::now() + budget;

        let inbound = tokio::select! {
            _ = self.shutdown.recv() => return Ok(Step::ShuttingDown),
            inbound = receive(&mut self.socket, deadline, budget) => inbound?,
        };

        let message = match inbound {
            Inbound::Data(message) => message,
            Inbound::NormalClose => return Ok(Step::PeerClosed),
        };

        let kind = message_kind(&message);
        tokio::time::timeout_at(deadline, self.socket.send(message))
            .await
            .map_err(|_| SessionError::Timeout(budget))?
            .map_err(SessionError::Copy)?;

        metrics::record_echo(kind);
        Ok(Step::Echoed)
    }

    /// Best-effort normal closure.
    ///
    /// After a peer close this only flushes the transport's pending reply.
    async fn close(&mut self) {
        let frame = CloseFrame {
            code: close_code::NORMAL,
            reason: Utf8Bytes::from_static(""),
        };
        if let Err(e) = self.socket.send(Message::Close(Some(frame))).await {
            tracing::trace!(remote = %self.remote, error = %e, "Close frame not sent");
        }
    }
}

/// Wait for the next text/binary message or close frame, up to `deadline`.
async fn receive(
    socket: &mut WebSocket,
    deadline: Instant,
    budget: Duration,
) -> Result<Inbound, SessionError> {
    loop {
        let next = tokio::time::timeout_at(deadline, socket.recv())
            .await
            .map_err(|_| SessionError::Timeout(budget))?;

        match next {
            None => return Err(SessionError::Disconnected),
            Some(Err(e)) => return Err(SessionError::Transport(e)),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(frame))) => {
                return match frame {
                    Some(frame) if frame.code == close_code::NORMAL => Ok(Inbound::NormalClose),
                    other => Err(SessionError::AbnormalClose {
                        code: other.map(|f| f.code),
                    }),
                };
            }
            Some(Ok(message)) => return Ok(Inbound::Data(message)),
        }
    }
}

fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        _ => "control",
    }
}
