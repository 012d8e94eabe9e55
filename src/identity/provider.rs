use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::principal::Identity;
use super::session::{SessionToken, TokenService};
use super::store::{SharedIdentityStore, StoreError};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub nik: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub nik: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub identity: Identity,
    pub token: SessionToken,
}

/// Registration and login over an identity store and the token service.
#[derive(Clone)]
pub struct AuthProvider {
    store: SharedIdentityStore,
    tokens: Arc<TokenService>,
}

impl AuthProvider {
    pub fn new(store: SharedIdentityStore, tokens: Arc<TokenService>) -> Self { Self { store, tokens } }

    pub fn tokens(&self) -> &Arc<TokenService> { &self.tokens }

    /// Create an identity. The returned record holds the generated password;
    /// this is the only point at which it is handed out.
    pub fn register(&self, req: &RegisterRequest) -> AppResult<Identity> {
        if req.nik.is_empty() || req.role.is_empty() {
            return Err(AppError::bad_request("nik and role are required"));
        }
        match self.store.create(&req.nik, &req.role) {
            Ok(identity) => {
                info!(target: "authgate::auth", id = identity.id, nik = %identity.nik, role = %identity.role, "identity registered");
                Ok(identity)
            }
            Err(StoreError::AlreadyExists) => {
                warn!(target: "authgate::auth", nik = %req.nik, "registration rejected: already exists");
                Err(StoreError::AlreadyExists.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        if req.nik.is_empty() || req.password.is_empty() {
            return Err(AppError::bad_request("nik and password are required"));
        }
        // Unknown nik and wrong password produce the same error.
        let identity = match self.store.find_by_nik(&req.nik) {
            Ok(identity) if credentials_match(&identity.password, &req.password) => identity,
            _ => {
                warn!(target: "authgate::auth", nik = %req.nik, "login rejected");
                return Err(AppError::unauthorized("invalid credentials"));
            }
        };
        let token = self.tokens.issue(&identity)?;
        info!(target: "authgate::auth", id = identity.id, nik = %identity.nik, "login succeeded");
        Ok(LoginResponse { identity, token })
    }
}

// Constant time over the bytes; only the length comparison may short-circuit.
fn credentials_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{CredentialError, MemoryIdentityStore};
    use axum::http::StatusCode;

    fn provider() -> AuthProvider {
        AuthProvider::new(Arc::new(MemoryIdentityStore::new()), Arc::new(TokenService::new(b"provider-test")))
    }

    fn reg(nik: &str, role: &str) -> RegisterRequest { RegisterRequest { nik: nik.into(), role: role.into() } }

    #[test]
    fn register_then_login_issues_verifiable_token() {
        let p = provider();
        let id = p.register(&reg("123", "user")).unwrap();
        let resp = p.login(&LoginRequest { nik: "123".into(), password: id.password.clone() }).unwrap();
        assert_eq!(resp.identity, id);
        let claims = p.tokens().verify(&resp.token).unwrap();
        assert_eq!((claims.id, claims.nik.as_str(), claims.role.as_str()), (1, "123", "user"));
    }

    #[test]
    fn credentials_match_requires_exact_bytes() {
        assert!(credentials_match("aB3dE9", "aB3dE9"));
        assert!(!credentials_match("aB3dE9", "ab3dE9"));
        assert!(!credentials_match("aB3dE9", "aB3dE"));
        assert!(!credentials_match("aB3dE9", "aB3dE99"));
    }

    #[test]
    fn empty_fields_are_bad_requests() {
        let p = provider();
        assert_eq!(p.register(&reg("", "user")).unwrap_err().http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(p.register(&reg("1", "")).unwrap_err().http_status(), StatusCode::BAD_REQUEST);
        let e = p.login(&LoginRequest { nik: "1".into(), password: String::new() }).unwrap_err();
        assert_eq!(e.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let p = provider();
        p.register(&reg("123", "user")).unwrap();
        assert_eq!(p.register(&reg("123", "user")).unwrap_err().http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn credential_failure_on_register_is_internal_error() {
        let store = MemoryIdentityStore::with_generator(|| Err(CredentialError::Entropy("closed".into())));
        let p = AuthProvider::new(Arc::new(store), Arc::new(TokenService::new(b"provider-test")));
        let e = p.register(&reg("123", "user")).unwrap_err();
        assert_eq!(e.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.body().error, "internal_error");
        let e = p.login(&LoginRequest { nik: "123".into(), password: "aB3dE9".into() }).unwrap_err();
        assert_eq!(e.http_status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_nik_and_wrong_password_are_indistinguishable() {
        let p = provider();
        let id = p.register(&reg("123", "user")).unwrap();
        let wrong = if id.password == "zzzzzz" { "yyyyyy" } else { "zzzzzz" };
        let a = p.login(&LoginRequest { nik: "123".into(), password: wrong.into() }).unwrap_err();
        let b = p.login(&LoginRequest { nik: "999".into(), password: wrong.into() }).unwrap_err();
        assert_eq!(a, b);
        assert_eq!(a.http_status(), StatusCode::UNAUTHORIZED);
    }
}
