//! Request-side extraction.
//!
//! # Responsibilities
//! - Pull replay parameters out of the query string before any other work
//!
//! # Design Decisions
//! - Extraction never rejects: a malformed query is the same as no query

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::routing::ReplayQuery;

impl<S> FromRequestParts<S> for ReplayQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ReplayQuery::from_uri(&parts.uri))
    }
}
