//! Per-request metadata record.

use axum::http::HeaderMap;
use serde::Serialize;

use crate::identity::InstanceIdentity;

/// Request id assigned by the edge.
pub const REQUEST_ID_HEADER: &str = "fly-request-id";

/// Time the edge dispatched the request to this instance.
pub const DISPATCH_START_HEADER: &str = "fly-dispatch-start";

/// Metadata reported to clients so they can tell which instance served them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestMetadata {
    pub region: String,
    pub instance: String,
    pub req_id: String,
    pub dispatch: String,
}

impl RequestMetadata {
    /// Combine the process identity with the request-scoped headers.
    pub fn build(identity: &InstanceIdentity, headers: &HeaderMap) -> Self {
        Self {
            region: identity.region().to_string(),
            instance: identity.instance_id().to_string(),
            req_id: header_or_empty(headers, REQUEST_ID_HEADER),
            dispatch: header_or_empty(headers, DISPATCH_START_HEADER),
        }
    }

    /// Indented form used as a plain HTTP body.
    pub fn to_pretty_json(&self) -> String {
        // Serializing a struct of strings cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Single-line form used as the websocket greeting.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Header values are opaque; non-ASCII bytes pass through lossily.
fn header_or_empty(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}
