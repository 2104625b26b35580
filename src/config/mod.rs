//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT environment override)
//!     → validation.rs (semantic checks)
//!     → EchoConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the service runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, resolve_config, ConfigError};
pub use schema::{EchoConfig, ListenerConfig, LogFormat, ObservabilityConfig, SessionConfig};
pub use validation::ValidationError;
