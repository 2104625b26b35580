//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Upgraded websocket connection
//!     → connection.rs (session id, live-session tracking)
//!     → Hand off to the echo loop in http/websocket.rs
//! ```
//!
//! # Design Decisions
//! - Each session owns its connection exclusively; nothing is pooled
//! - Live sessions are counted so shutdown can drain them

pub mod connection;

pub use connection::{SessionGuard, SessionId, SessionTracker};
