use crate::models::{Profile, UpdateProfileRequest};
use crate::service::{ProfileError, ProfileService};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use common::{AppState, auth::CurrentUser};
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ProfileError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ProfileError::NotFound => (StatusCode::NOT_FOUND, "Profile not found".to_string()),
            ProfileError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn profiles_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .with_state(state)
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Profile>, ProfileError> {
    let profile = ProfileService::get_profile(&state.db, user.0).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ProfileError> {
    let profile = ProfileService::update_profile(
        &state.db,
        user.0,
        payload.display_name,
        payload.timezone,
    )
    .await?;

    Ok(Json(profile))
}
