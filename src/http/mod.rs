//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, replay check)
//!     → request.rs (replay parameters from the query)
//!     → response.rs (409 + fly-replay, or metadata body)
//!     → websocket.rs (greeting, then per-message echo loop)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use server::{AppState, HttpServer};
pub use websocket::{EchoSession, SessionError, SessionOutcome};
