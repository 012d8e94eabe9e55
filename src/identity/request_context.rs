use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::session::Claims;
use crate::error::AppError;

/// Verified session attached to a request by the access gate.
///
/// Lives in the request extensions, never in headers, so nothing a caller
/// sends can populate it. Handlers take it as an extractor; a request that did
/// not pass the gate has no context and is rejected.
#[derive(Debug, Clone)]
pub struct RequestContext {
    claims: Arc<Claims>,
}

impl RequestContext {
    pub(crate) fn new(claims: Claims) -> Self { Self { claims: Arc::new(claims) } }

    pub fn claims(&self) -> &Claims { &self.claims }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("missing token"))
    }
}
