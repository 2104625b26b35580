//! Response construction.
//!
//! # Responsibilities
//! - Plain metadata body for local requests
//! - 409 Conflict plus `fly-replay` header for redirects
//!
//! # Design Decisions
//! - CR/LF in a replay target become spaces; other control bytes make the
//!   target unusable and the request is answered with 400
//! - The 400 stands in for a `fly-replay` value hyper cannot represent as a
//!   header; such a target would otherwise produce a 409 with no header

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::identity::RequestMetadata;
use crate::routing::{ReplayDecision, REPLAY_HEADER};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Status line text used as an error body, e.g. "Conflict\n".
fn status_body(status: StatusCode) -> String {
    format!("{}\n", status.canonical_reason().unwrap_or_default())
}

fn plain_error(status: StatusCode) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, TEXT_PLAIN),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        status_body(status),
    )
        .into_response()
}

/// Response telling the edge to replay the request elsewhere.
///
/// Returns `None` for a local decision.
pub fn replay_response(decision: &ReplayDecision) -> Option<Response> {
    let target = decision.header_value()?;
    let sanitized = target.replace(['\r', '\n'], " ");

    let Ok(value) = HeaderValue::from_bytes(sanitized.as_bytes()) else {
        tracing::warn!(replay = ?target, "Replay target is not a valid header value");
        return Some(plain_error(StatusCode::BAD_REQUEST));
    };

    let mut response = plain_error(StatusCode::CONFLICT);
    response.headers_mut().insert(REPLAY_HEADER, value);
    Some(response)
}

/// Plain HTTP answer for a request served locally.
pub fn metadata_response(metadata: &RequestMetadata) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        metadata.to_pretty_json(),
    )
        .into_response()
}
