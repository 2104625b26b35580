//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::EchoConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EchoConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EchoConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides on top of a loaded configuration.
///
/// `lookup` stands in for `std::env::var` so callers can supply a fixed map.
/// An unset or empty `PORT` leaves the bind address alone.
pub fn apply_env_overrides<F>(config: &mut EchoConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(PORT_ENV).filter(|p| !p.is_empty()) {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    validate_config(config).map_err(ConfigError::Validation)
}

/// Build the effective configuration: optional file, then process environment.
pub fn resolve_config(path: Option<&Path>) -> Result<EchoConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => EchoConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn port_env_rewrites_bind_port() {
        let mut config = EchoConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
    }

    #[test]
    fn missing_or_empty_port_keeps_default() {
        let mut config = EchoConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");

        apply_env_overrides(&mut config, env(&[("PORT", "")])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let mut config = EchoConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(p) if p == "http"));
    }

    #[test]
    fn load_config_reads_toml_file() {
        let path = std::env::temp_dir().join(format!("edge-echo-{}.toml", std::process::id()));
        fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:7000\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:7000");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let path = std::env::temp_dir().join(format!("edge-echo-bad-{}.toml", std::process::id()));
        fs::write(&path, "[session]\nmessage_timeout_secs = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));

        fs::remove_file(&path).unwrap();
    }
}
