use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{AppState, auth::USER_SESSION_KEY};
use profiles::service::ProfileService;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Shared-password login: credential issuance proper is delegated to the
/// deployment (reverse proxy, managed auth); this endpoint only binds the
/// session to a profile.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if let Some(correct_password) = &state.config.app_password {
        if payload.password != *correct_password {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
    }

    match ProfileService::ensure_profile(&state.db, &payload.email).await {
        Ok(profile) => {
            if session.insert(USER_SESSION_KEY, profile.id).await.is_err() {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
            Json(json!({ "user_id": profile.id })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn logout(session: Session) -> Response {
    let _ = session.flush().await;
    StatusCode::NO_CONTENT.into_response()
}
