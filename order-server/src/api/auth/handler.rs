//! API key handler

use axum::{Json, extract::State, http::HeaderMap};
use shared::response::ApiKeyCheckResponse;

use crate::core::ServerState;

/// Header carrying the key; header names are case-insensitive
pub const API_KEY_HEADER: &str = "apikey";

/// GET /api/auth/api-key
///
/// Always 200; an unset `VALID_API_KEY` authorizes nobody.
pub async fn check_api_key(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Json<ApiKeyCheckResponse> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let is_authorized = is_valid_key(provided, &state.config.valid_api_key);
    if !is_authorized {
        tracing::warn!(has_key = provided.is_some(), "API key rejected");
    }

    Json(ApiKeyCheckResponse { is_authorized })
}

fn is_valid_key(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(key) => !expected.is_empty() && key == expected,
        None => false,
    }
}
