//! Edge Echo Service Library
//!
//! Answers plain HTTP requests with the identity of the instance that
//! served them, upgrades `/ws` to a websocket echo channel, and asks the
//! edge router to replay requests pinned to another instance or region.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::EchoConfig;
pub use http::HttpServer;
pub use identity::InstanceIdentity;
pub use lifecycle::Shutdown;
