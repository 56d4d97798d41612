use crate::models::{MonthlyAnalysis, MonthlySummary};
use crate::service::{SummaryError, SummaryService};
use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use common::{AppState, auth::CurrentUser};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for SummaryError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            SummaryError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            // A bad stored timezone is a server-side configuration problem;
            // no internal detail leaks to the client
            SummaryError::UnknownTimezone(_) | SummaryError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            SummaryError::AssistantNotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Assistant is not configured".to_string(),
            ),
            SummaryError::Assistant(_) => (
                StatusCode::BAD_GATEWAY,
                "Upstream assistant error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct SummaryParams {
    pub month: Option<String>, // YYYY-MM
}

pub fn summary_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_summary))
        .route("/analysis", get(get_analysis))
        .with_state(state)
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<MonthlySummary>, SummaryError> {
    let summary =
        SummaryService::get_monthly_summary(&state.db, user.0, params.month.as_deref()).await?;
    Ok(Json(summary))
}

async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<MonthlyAnalysis>, SummaryError> {
    let chat = state
        .assistant
        .as_ref()
        .ok_or(SummaryError::AssistantNotConfigured)?;

    let analysis =
        SummaryService::get_monthly_analysis(&state.db, chat, user.0, params.month.as_deref())
            .await?;

    Ok(Json(analysis))
}
