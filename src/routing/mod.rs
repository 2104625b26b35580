//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (query string)
//!     → replay.rs (compare replay_instance / replay_region with identity)
//!     → Return: Local, or a redirect carried in the fly-replay header
//! ```
//!
//! # Design Decisions
//! - Decision runs before any protocol upgrade is attempted
//! - Deterministic: same identity and query always give the same decision
//! - Redirects are never followed here; the edge router acts on them

pub mod replay;

pub use replay::{ReplayDecision, ReplayQuery, REPLAY_HEADER};
