use crate::models::{RawCreateTransactionRequest, Transaction, TransactionWithCategory};
use crate::service::{TransactionError, TransactionService};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use common::{AppState, auth::CurrentUser};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            TransactionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            TransactionError::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_string()),
            TransactionError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

#[derive(Deserialize)]
pub struct RangeParams {
    pub from: String,
    pub to: String,
}

#[derive(Serialize)]
pub struct TransactionView {
    pub id: i64,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub occurred_at: String,
    pub amount: String,
    pub kind: String,
    pub notes: Option<String>,
}

impl From<TransactionWithCategory> for TransactionView {
    fn from(t: TransactionWithCategory) -> Self {
        TransactionView {
            id: t.id,
            category_id: t.category_id,
            category_name: Some(t.category_name),
            occurred_at: t.occurred_at,
            amount: format!("{:.2}", t.amount_cents as f64 / 100.0),
            kind: t.kind.as_str().to_string(),
            notes: t.notes,
        }
    }
}

impl From<Transaction> for TransactionView {
    fn from(t: Transaction) -> Self {
        TransactionView {
            id: t.id,
            category_id: t.category_id,
            category_name: None,
            occurred_at: t.occurred_at,
            amount: format!("{:.2}", t.amount_cents as f64 / 100.0),
            kind: t.kind.as_str().to_string(),
            notes: t.notes,
        }
    }
}

pub fn transactions_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route(
            "/{id}",
            get(get_transaction).put(update_transaction).delete(delete_transaction),
        )
        .with_state(state)
}

fn parse_instant(value: &str, field: &str) -> Result<DateTime<Utc>, TransactionError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TransactionError::InvalidInput(format!("Invalid '{field}', expected RFC 3339")))
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<TransactionView>>, TransactionError> {
    let from = parse_instant(&params.from, "from")?;
    let to = parse_instant(&params.to, "to")?;

    let transactions = TransactionService::list_between(&state.db, user.0, from, to).await?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionView>, TransactionError> {
    let transaction = TransactionService::get_transaction(&state.db, user.0, id).await?;
    Ok(Json(transaction.into()))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RawCreateTransactionRequest>,
) -> Result<impl IntoResponse, TransactionError> {
    let id = TransactionService::create_transaction(
        &state.db,
        user.0,
        payload.category_id,
        payload.occurred_at,
        payload.amount,
        payload.kind,
        payload.notes,
    )
    .await
    .map_err(|e| {
        tracing::error!("create_transaction error: {:?}", e);
        e
    })?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RawCreateTransactionRequest>,
) -> Result<Json<TransactionView>, TransactionError> {
    let transaction = TransactionService::update_transaction(
        &state.db,
        user.0,
        id,
        payload.category_id,
        payload.occurred_at,
        payload.amount,
        payload.kind,
        payload.notes,
    )
    .await?;

    Ok(Json(transaction.into()))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, TransactionError> {
    TransactionService::delete_transaction(&state.db, user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
