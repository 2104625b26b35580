//! How each way of ending an echo session is classified.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    response::Response,
    routing::any,
    Router,
};
use edge_echo::http::{EchoSession, SessionOutcome};
use edge_echo::lifecycle::Shutdown;
use edge_echo::net::SessionTracker;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

mod common;

use common::{connect, next_message, WsStream};

#[derive(Clone)]
struct OutcomeState {
    message_timeout: Duration,
    shutdown: Shutdown,
    sessions: SessionTracker,
    outcomes: mpsc::UnboundedSender<SessionOutcome>,
}

async fn echo(
    State(state): State<OutcomeState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let signal = state.shutdown.subscribe();
    let guard = state.sessions.track();
    ws.on_upgrade(move |socket| async move {
        let outcome = EchoSession::new(socket, remote, state.message_timeout, signal, guard)
            .run("hello".to_string())
            .await;
        let _ = state.outcomes.send(outcome);
    })
}

struct Harness {
    url: String,
    shutdown: Shutdown,
    outcomes: mpsc::UnboundedReceiver<SessionOutcome>,
}

impl Harness {
    async fn start(message_timeout: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let (tx, outcomes) = mpsc::unbounded_channel();

        let state = OutcomeState {
            message_timeout,
            shutdown: shutdown.clone(),
            sessions: SessionTracker::new(),
            outcomes: tx,
        };
        let app = Router::new()
            .route("/ws", any(echo))
            .with_state(state)
            .into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("ws://{addr}/ws"),
            shutdown,
            outcomes,
        }
    }

    async fn greeted(&self) -> WsStream {
        let mut ws = connect(&self.url, &[]).await;
        assert_eq!(next_message(&mut ws).await, Message::text("hello"));
        ws
    }

    async fn outcome(&mut self) -> SessionOutcome {
        tokio::time::timeout(Duration::from_secs(5), self.outcomes.recv())
            .await
            .expect("session did not end")
            .expect("outcome channel closed")
    }
}

async fn close_with(ws: &mut WsStream, frame: Option<CloseFrame>) {
    ws.close(frame).await.unwrap();
    while let Ok(Some(Ok(_))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await {}
}

#[tokio::test]
async fn normal_close_is_clean() {
    let mut harness = Harness::start(Duration::from_secs(10)).await;
    let mut ws = harness.greeted().await;

    ws.send(Message::text("ping")).await.unwrap();
    assert_eq!(next_message(&mut ws).await, Message::text("ping"));

    close_with(
        &mut ws,
        Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        }),
    )
    .await;

    assert_eq!(harness.outcome().await, SessionOutcome::Clean);
}

#[tokio::test]
async fn going_away_close_is_an_error() {
    let mut harness = Harness::start(Duration::from_secs(10)).await;
    let mut ws = harness.greeted().await;

    close_with(
        &mut ws,
        Some(CloseFrame {
            code: CloseCode::Away,
            reason: "bye".into(),
        }),
    )
    .await;

    assert_eq!(harness.outcome().await, SessionOutcome::Failed);
}

#[tokio::test]
async fn close_without_status_is_an_error() {
    let mut harness = Harness::start(Duration::from_secs(10)).await;
    let mut ws = harness.greeted().await;

    close_with(&mut ws, None).await;

    assert_eq!(harness.outcome().await, SessionOutcome::Failed);
}

#[tokio::test]
async fn silent_client_is_an_error() {
    let mut harness = Harness::start(Duration::from_millis(300)).await;
    let _ws = harness.greeted().await;

    assert_eq!(harness.outcome().await, SessionOutcome::Failed);
}

#[tokio::test]
async fn dropped_connection_is_an_error() {
    let mut harness = Harness::start(Duration::from_secs(10)).await;
    let ws = harness.greeted().await;

    drop(ws);

    assert_eq!(harness.outcome().await, SessionOutcome::Failed);
}

#[tokio::test]
async fn shutdown_is_its_own_outcome() {
    let mut harness = Harness::start(Duration::from_secs(10)).await;
    let mut ws = harness.greeted().await;

    harness.shutdown.trigger();

    match next_message(&mut ws).await {
        Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Normal),
        other => panic!("expected close frame, got {other:?}"),
    }
    assert_eq!(harness.outcome().await, SessionOutcome::Shutdown);
}
