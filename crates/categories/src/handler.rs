use crate::models::{Category, RawCreateCategoryRequest, UpdateCategoryRequest};
use crate::service::{CategoryError, CategoryService};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use common::{AppState, auth::CurrentUser};
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            CategoryError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CategoryError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            CategoryError::NotFound => (StatusCode::NOT_FOUND, "Category not found".to_string()),
            CategoryError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn categories_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
        .with_state(state)
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Category>>, CategoryError> {
    let categories = CategoryService::list_categories(&state.db, user.0).await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RawCreateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    let id = CategoryService::create_category(&state.db, user.0, payload.name).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    CategoryService::update_category(
        &state.db,
        user.0,
        id,
        payload.name,
        payload.color,
        payload.is_active,
    )
    .await?;

    Ok(StatusCode::OK)
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CategoryError> {
    CategoryService::delete_category(&state.db, user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
