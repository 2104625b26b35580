//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use edge_echo::config::EchoConfig;
use edge_echo::http::HttpServer;
use edge_echo::identity::InstanceIdentity;
use edge_echo::lifecycle::Shutdown;
use edge_echo::net::SessionTracker;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub sessions: SessionTracker,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    #[allow(dead_code)]
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server serving as region `sjc`, instance `abc123`.
#[allow(dead_code)]
pub async fn start_server(config: EchoConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let identity = InstanceIdentity::new("sjc", "abc123-xyz");
    let server = HttpServer::new(config, identity, shutdown.clone());
    let sessions = server.sessions().clone();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    TestServer {
        addr,
        shutdown,
        sessions,
    }
}

/// Open a websocket, optionally sending edge headers.
#[allow(dead_code)]
pub async fn connect(url: &str, headers: &[(&'static str, &'static str)]) -> WsStream {
    let mut request = url.into_client_request().unwrap();
    for (name, value) in headers {
        request
            .headers_mut()
            .insert(*name, value.parse().unwrap());
    }
    let (ws, _) = tokio_tungstenite::connect_async(request)
        .await
        .expect("websocket handshake failed");
    ws
}

/// Next frame from the server, failing the test after five seconds.
#[allow(dead_code)]
pub async fn next_message(ws: &mut WsStream) -> Message {
    tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for a message")
        .expect("stream ended")
        .expect("websocket error")
}
