use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

pub const USER_SESSION_KEY: &str = "user_id";

/// Identity of the logged-in user, injected into request extensions by
/// [`auth_middleware`]. Every query below the handler layer is scoped by
/// this id.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

pub async fn auth_middleware(session: Session, mut request: Request, next: Next) -> Response {
    let user_id: Option<i64> = session.get(USER_SESSION_KEY).await.unwrap_or(None);

    match user_id {
        Some(id) => {
            request.extensions_mut().insert(CurrentUser(id));
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not authenticated" })),
        )
            .into_response(),
    }
}
