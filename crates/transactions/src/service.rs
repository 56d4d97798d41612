use crate::models::{
    CreateTransactionRequest, Transaction, TransactionKind, TransactionWithCategory, format_instant,
};
use crate::repository::TransactionRepository;
use chrono::{DateTime, Utc};
use database::{Database, RepositoryError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Transaction not found")]
    NotFound,
}

impl From<RepositoryError> for TransactionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => TransactionError::NotFound,
            RepositoryError::Infrastructure(e) => TransactionError::Infrastructure(e.to_string()),
            _ => TransactionError::Infrastructure(err.to_string()),
        }
    }
}

pub struct TransactionService;

impl TransactionService {
    #[instrument(skip(db))]
    pub async fn create_transaction(
        db: &Database,
        user_id: i64,
        category_id: i64,
        occurred_at: String,
        amount: f64,
        kind: TransactionKind,
        notes: Option<String>,
    ) -> Result<i64, TransactionError> {
        // The category must exist and belong to the same user
        categories::service::CategoryService::get_category(db, user_id, category_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category for transaction: {:?}", e);
                TransactionError::InvalidInput("Invalid category ID".into())
            })?;

        let req = CreateTransactionRequest::new(category_id, occurred_at, amount, kind, notes)
            .map_err(TransactionError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let id = repo.create(user_id, &req).await?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(id)
    }

    #[instrument(skip(db))]
    pub async fn update_transaction(
        db: &Database,
        user_id: i64,
        id: i64,
        category_id: i64,
        occurred_at: String,
        amount: f64,
        kind: TransactionKind,
        notes: Option<String>,
    ) -> Result<Transaction, TransactionError> {
        categories::service::CategoryService::get_category(db, user_id, category_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category for transaction update: {:?}", e);
                TransactionError::InvalidInput("Invalid category ID".into())
            })?;

        let req = CreateTransactionRequest::new(category_id, occurred_at, amount, kind, notes)
            .map_err(TransactionError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.update(user_id, id, &req).await?;

        let transaction = repo.find_by_id(user_id, id).await?
            .ok_or(TransactionError::NotFound)?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn get_transaction(
        db: &Database,
        user_id: i64,
        id: i64,
    ) -> Result<Transaction, TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transaction = repo.find_by_id(user_id, id).await?
            .ok_or(TransactionError::NotFound)?;

        Ok(transaction)
    }

    /// All of the user's transactions with `occurred_at` in `[start, end)`,
    /// joined with category names.
    #[instrument(skip(db))]
    pub async fn list_between(
        db: &Database,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TransactionWithCategory>, TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transactions = repo
            .list_between(user_id, &format_instant(&start), &format_instant(&end))
            .await?;

        Ok(transactions)
    }

    #[instrument(skip(db))]
    pub async fn delete_transaction(
        db: &Database,
        user_id: i64,
        id: i64,
    ) -> Result<(), TransactionError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.delete(user_id, id).await?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }
}
