use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use common::{types::Envelope, RequestContext};
use rust_decimal::Decimal;
use serde::Deserialize;
use service::auth::domain::{LoginInput, LoginOutput, RegisterInput};
use service::player::PlayerView;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

#[utoipa::path(post, path = "/api/v1/register", tag = "auth",
    request_body = crate::openapi::RegisterRequestDoc,
    responses(
        (status = 200, description = "Registered", body = crate::openapi::PlayerInfoEnvelope),
        (status = 400, description = "Bad request", body = crate::openapi::ErrorEnvelope),
        (status = 409, description = "Username taken", body = crate::openapi::ErrorEnvelope),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<Envelope<PlayerView>>, ApiError> {
    let Json(req) = payload?;
    required("username", &req.username)?;
    required("password", &req.password)?;
    let input = RegisterInput { username: req.username, password: req.password, balance: req.balance };
    let view = state.auth.register(&ctx, input).await?;
    Ok(Json(Envelope::ok(view)))
}

#[utoipa::path(post, path = "/api/v1/login", tag = "auth",
    request_body = crate::openapi::LoginRequestDoc,
    responses(
        (status = 200, description = "Logged in", body = crate::openapi::LoginEnvelope),
        (status = 400, description = "Bad request", body = crate::openapi::ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorEnvelope),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Envelope<LoginOutput>>, ApiError> {
    let Json(req) = payload?;
    required("username", &req.username)?;
    required("password", &req.password)?;
    let out = state.auth.login(&ctx, LoginInput { username: req.username, password: req.password }).await?;
    Ok(Json(Envelope::ok(out)))
}
