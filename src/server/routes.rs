//! JSON handlers for the public API.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::identity::{LoginRequest, RegisterRequest, RequestContext};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterPayload {
    pub nik: String,
    pub role: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub nik: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: u64,
    pub nik: String,
    pub role: String,
    pub password: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: u64,
    pub nik: String,
    pub role: String,
    pub access_token: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: u64,
    pub nik: String,
    pub role: String,
    pub message: String,
}

// Lenient decode: no content-type requirement, missing fields become "".
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "authgate::http", "rejecting body: {e}");
        AppError::bad_request("invalid JSON body")
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".into(), message: "Auth API is running".into() })
}

pub async fn register(State(state): State<AppState>, body: Bytes) -> AppResult<impl IntoResponse> {
    let payload: RegisterPayload = parse_json(&body)?;
    let identity = state.auth.register(&RegisterRequest { nik: payload.nik, role: payload.role })?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: identity.id,
            nik: identity.nik,
            role: identity.role,
            password: identity.password,
            message: "user registered".into(),
        }),
    ))
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> AppResult<Json<LoginResponse>> {
    let payload: LoginPayload = parse_json(&body)?;
    let resp = state.auth.login(&LoginRequest { nik: payload.nik, password: payload.password })?;
    Ok(Json(LoginResponse {
        id: resp.identity.id,
        nik: resp.identity.nik,
        role: resp.identity.role,
        access_token: resp.token,
        message: "login successful".into(),
    }))
}

/// Reports the identity as it was when the token was issued; no store lookup.
pub async fn profile(ctx: RequestContext) -> Json<ProfileResponse> {
    let claims = ctx.claims();
    Json(ProfileResponse {
        id: claims.id,
        nik: claims.nik.clone(),
        role: claims.role.clone(),
        message: "profile retrieved".into(),
    })
}

pub async fn get_only() -> AppError { AppError::method_not_allowed("only GET is accepted") }

pub async fn post_only() -> AppError { AppError::method_not_allowed("only POST is accepted") }

pub async fn not_found() -> AppError { AppError::not_found("no such endpoint") }
