//! Bearer-token access gate.
//!
//! `require_bearer` is installed as a route layer in front of protected
//! handlers. It rejects with 401 unless the request carries
//! `Authorization: Bearer <token>` and the token verifies; on success the
//! claims are attached as a `RequestContext` extension.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use super::request_context::RequestContext;
use super::session::TokenService;
use crate::error::AppError;

/// Pull the raw token out of an `Authorization: Bearer <token>` header.
///
/// The header must split on single spaces into exactly two parts with the
/// first being `Bearer`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let Some(raw) = headers.get(header::AUTHORIZATION) else {
        return Err(AppError::unauthorized("missing token"));
    };
    let value = raw.to_str().map_err(|_| AppError::unauthorized("malformed token"))?;
    if value.is_empty() {
        return Err(AppError::unauthorized("missing token"));
    }
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(token),
        _ => Err(AppError::unauthorized("malformed token")),
    }
}

pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = extract_bearer(req.headers()).inspect_err(|e| {
            warn!(target: "authgate::gate", path = %req.uri().path(), "rejected: {}", e.message());
        })?;
        tokens.verify(token).inspect_err(|_| {
            warn!(target: "authgate::gate", path = %req.uri().path(), "rejected: token failed verification");
        })?
    };
    req.extensions_mut().insert(RequestContext::new(claims));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        let h = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&h).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_missing_token() {
        let err = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.message(), "missing token");
    }

    #[test]
    fn wrong_shapes_are_malformed() {
        for bad in ["Bearer", "bearer abc", "Basic abc", "Bearer a b", "Bearer  abc", "abc"] {
            let err = extract_bearer(&headers_with(bad)).unwrap_err();
            assert_eq!(err.message(), "malformed token", "for {bad:?}");
            assert_eq!(err.code_str(), "unauthorized");
        }
    }
}
