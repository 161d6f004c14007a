//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use quill_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Token request.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Token response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Exchange username and password for the account's bearer token.
async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "Token issued");

    Ok(ApiResponse::ok(TokenResponse {
        id: user.id,
        username: user.username,
        token: user.token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/token", post(token))
}
