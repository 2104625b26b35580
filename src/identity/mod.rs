//! Identity and metadata subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     FLY_REGION, FLY_ALLOC_ID
//!     → instance.rs (truncate allocation id)
//!     → InstanceIdentity (immutable, shared via Arc)
//!
//! Per request:
//!     InstanceIdentity + Fly-Request-Id + Fly-Dispatch-Start
//!     → metadata.rs
//!     → RequestMetadata (JSON body or websocket greeting)
//! ```

pub mod instance;
pub mod metadata;

pub use instance::InstanceIdentity;
pub use metadata::RequestMetadata;
