//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → listener stops accepting
//!             → every echo session sends a normal close
//!             → main waits for the session tracker to drain
//! ```
//!
//! # Design Decisions
//! - Shutdown has a deadline: open sessions get `drain_timeout_secs`

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
