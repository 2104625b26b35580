//! Replay decision: serve here or ask the edge to re-dispatch.
//!
//! # Responsibilities
//! - Read `replay_instance` / `replay_region` from the query string
//! - Compare them against the local identity
//! - Produce the `fly-replay` header value for redirects
//!
//! # Design Decisions
//! - Instance check runs first, so a caller can pin an exact instance
//!   even inside the right region
//! - Empty parameters behave like absent ones
//! - Pure function of (identity, query); nothing is retained

use std::fmt;

use axum::extract::Query;
use axum::http::Uri;

use crate::identity::InstanceIdentity;

/// Header the edge router reads to re-dispatch a request.
pub const REPLAY_HEADER: &str = "fly-replay";

pub const REPLAY_INSTANCE_PARAM: &str = "replay_instance";
pub const REPLAY_REGION_PARAM: &str = "replay_region";

/// Replay parameters extracted from a request query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayQuery {
    pub instance: Option<String>,
    pub region: Option<String>,
}

impl ReplayQuery {
    /// Parse the replay parameters out of a request URI.
    ///
    /// A malformed query is treated as empty; for repeated keys the first wins.
    pub fn from_uri(uri: &Uri) -> Self {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        Self::from_pairs(pairs)
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                REPLAY_INSTANCE_PARAM if query.instance.is_none() => query.instance = Some(value),
                REPLAY_REGION_PARAM if query.region.is_none() => query.region = Some(value),
                _ => {}
            }
        }
        query
    }
}

/// Where a request should be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayDecision {
    Local,
    RedirectInstance(String),
    RedirectRegion(String),
}

impl ReplayDecision {
    /// Decide whether `query` asks for a different instance or region than `identity`.
    pub fn decide(identity: &InstanceIdentity, query: &ReplayQuery) -> Self {
        if let Some(instance) = differing(query.instance.as_deref(), identity.instance_id()) {
            return Self::RedirectInstance(instance.to_string());
        }
        if let Some(region) = differing(query.region.as_deref(), identity.region()) {
            return Self::RedirectRegion(region.to_string());
        }
        Self::Local
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    /// Value for the replay header, or `None` when served locally.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Local => None,
            redirect => Some(redirect.to_string()),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::RedirectInstance(_) => "instance",
            Self::RedirectRegion(_) => "region",
        }
    }
}

impl fmt::Display for ReplayDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::RedirectInstance(id) => write!(f, "instance={}", id),
            Self::RedirectRegion(id) => write!(f, "region={}", id),
        }
    }
}

fn differing<'a>(requested: Option<&'a str>, local: &str) -> Option<&'a str> {
    requested.filter(|value| !value.is_empty() && *value != local)
}
