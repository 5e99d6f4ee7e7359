//! Token authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use foodgram_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

/// Obtain an access token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let auth_token = state.user_service.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse { auth_token }))
}

/// Log out by rotating the token, which invalidates the current one.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.user_service.regenerate_token(&user.id).await?;
    tracing::debug!(user_id = %user.id, "Token rotated on logout");

    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token/login", post(login))
        .route("/token/logout", post(logout))
}
