//! Caller identity extractor.
//!
//! The gateway in front of this service authenticates users and forwards
//! the user ID in the `X-User-Id` header; this extractor surfaces it to
//! handlers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts},
};

use crate::error::ApiError;

/// Header carrying the authenticated user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = HeaderName::from_static(USER_ID_HEADER);
        let value = parts
            .headers
            .get(&header)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        value
            .to_str()
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(CallerId)
            .ok_or_else(|| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))
    }
}
