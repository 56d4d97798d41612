use crate::models::{CreateTransactionRequest, Transaction, TransactionKind, TransactionWithCategory};
use database::{self, RepositoryError};
use sqlx::FromRow;

fn parse_kind(kind: &str) -> TransactionKind {
    // The CHECK constraint on the column makes this total
    match kind {
        "income" => TransactionKind::Income,
        _ => TransactionKind::Expense,
    }
}

#[derive(FromRow)]
struct TransactionRecord {
    id: i64,
    user_id: i64,
    category_id: i64,
    occurred_at: String,
    amount_cents: i64,
    kind: String,
    notes: Option<String>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        Transaction {
            id: record.id,
            user_id: record.user_id,
            category_id: record.category_id,
            occurred_at: record.occurred_at,
            amount_cents: record.amount_cents,
            kind: parse_kind(&record.kind),
            notes: record.notes,
        }
    }
}

#[derive(FromRow)]
struct JoinedTransactionRecord {
    id: i64,
    category_id: i64,
    category_name: String,
    occurred_at: String,
    amount_cents: i64,
    kind: String,
    notes: Option<String>,
}

impl From<JoinedTransactionRecord> for TransactionWithCategory {
    fn from(record: JoinedTransactionRecord) -> Self {
        TransactionWithCategory {
            id: record.id,
            category_id: record.category_id,
            category_name: record.category_name,
            occurred_at: record.occurred_at,
            amount_cents: record.amount_cents,
            kind: parse_kind(&record.kind),
            notes: record.notes,
        }
    }
}

pub(crate) struct TransactionRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &mut self,
        user_id: i64,
        req: &CreateTransactionRequest,
    ) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (user_id, category_id, occurred_at, amount_cents, kind, notes) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(user_id)
        .bind(req.category_id())
        .bind(req.occurred_at())
        .bind(req.amount_cents())
        .bind(req.kind().as_str())
        .bind(req.notes())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn update(
        &mut self,
        user_id: i64,
        id: i64,
        req: &CreateTransactionRequest,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transactions SET category_id = $1, occurred_at = $2, amount_cents = $3, kind = $4, notes = $5 WHERE id = $6 AND user_id = $7",
        )
        .bind(req.category_id())
        .bind(req.occurred_at())
        .bind(req.amount_cents())
        .bind(req.kind().as_str())
        .bind(req.notes())
        .bind(id)
        .bind(user_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn find_by_id(
        &mut self,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            "SELECT id, user_id, category_id, occurred_at, amount_cents, kind, notes FROM transactions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(|r| r.into()))
    }

    /// Half-open range `[start, end)` on the stored RFC 3339 instants.
    pub async fn list_between(
        &mut self,
        user_id: i64,
        start: &str,
        end: &str,
    ) -> Result<Vec<TransactionWithCategory>, RepositoryError> {
        let records = sqlx::query_as::<_, JoinedTransactionRecord>(
            r#"
            SELECT t.id, t.category_id, c.name AS category_name, t.occurred_at, t.amount_cents, t.kind, t.notes
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1 AND t.occurred_at >= $2 AND t.occurred_at < $3
            ORDER BY t.occurred_at DESC, t.id DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    pub async fn delete(&mut self, user_id: i64, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;

    async fn setup_deps(conn: &mut database::Connection) -> (i64, i64) {
        let user_id: i64 = sqlx::query_scalar("INSERT INTO profiles (email) VALUES ($1) RETURNING id")
            .bind("test@example.com")
            .fetch_one(&mut *conn)
            .await
            .unwrap();

        let cat_id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (user_id, name, color, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind("Food")
        .bind("#000")
        .bind(true)
        .fetch_one(&mut *conn)
        .await
        .unwrap();

        (user_id, cat_id)
    }

    fn expense(cat_id: i64, occurred_at: &str, amount: f64) -> CreateTransactionRequest {
        CreateTransactionRequest::new(
            cat_id,
            occurred_at.to_string(),
            amount,
            TransactionKind::Expense,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_transaction() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let req = CreateTransactionRequest::new(
            cat_id,
            "2026-01-01T10:00:00Z".to_string(),
            10.0,
            TransactionKind::Expense,
            Some("Lunch".into()),
        )
        .unwrap();

        let id = repo.create(user_id, &req).await.unwrap();
        assert!(id > 0);

        let t = repo.find_by_id(user_id, id).await.unwrap().unwrap();
        assert_eq!(t.amount_cents, 1000);
        assert_eq!(t.kind, TransactionKind::Expense);
        assert_eq!(t.notes, Some("Lunch".to_string()));
    }

    #[tokio::test]
    async fn test_list_between_is_half_open() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        // Exactly at the start boundary: included
        repo.create(user_id, &expense(cat_id, "2026-01-01T00:00:00Z", 1.0)).await.unwrap();
        // Inside the range
        repo.create(user_id, &expense(cat_id, "2026-01-15T12:00:00Z", 2.0)).await.unwrap();
        // Exactly at the end boundary: excluded
        repo.create(user_id, &expense(cat_id, "2026-02-01T00:00:00Z", 3.0)).await.unwrap();

        let list = repo
            .list_between(user_id, "2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|t| t.amount_cents != 300));
        assert_eq!(list[0].category_name, "Food");
    }

    #[tokio::test]
    async fn test_list_between_is_scoped_to_user() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let other_id: i64 = sqlx::query_scalar("INSERT INTO profiles (email) VALUES ($1) RETURNING id")
            .bind("other@example.com")
            .fetch_one(uow.connection())
            .await
            .unwrap();

        let mut repo = TransactionRepository::new(uow.connection());
        repo.create(user_id, &expense(cat_id, "2026-01-10T00:00:00Z", 5.0)).await.unwrap();

        let list = repo
            .list_between(other_id, "2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")
            .await
            .unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_update_transaction() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let id = repo
            .create(user_id, &expense(cat_id, "2026-01-01T10:00:00Z", 10.0))
            .await
            .unwrap();

        let update_req = CreateTransactionRequest::new(
            cat_id,
            "2026-01-02T10:00:00Z".to_string(),
            20.0,
            TransactionKind::Income,
            Some("Updated".into()),
        )
        .unwrap();
        repo.update(user_id, id, &update_req).await.unwrap();

        let t = repo.find_by_id(user_id, id).await.unwrap().unwrap();
        assert_eq!(t.amount_cents, 2000);
        assert_eq!(t.kind, TransactionKind::Income);
        assert_eq!(t.occurred_at, "2026-01-02T10:00:00Z");
        assert_eq!(t.notes, Some("Updated".to_string()));
    }

    #[tokio::test]
    async fn test_delete_transaction() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let id = repo
            .create(user_id, &expense(cat_id, "2026-01-01T10:00:00Z", 10.0))
            .await
            .unwrap();

        assert!(repo.find_by_id(user_id, id).await.unwrap().is_some());
        repo.delete(user_id, id).await.unwrap();
        assert!(repo.find_by_id(user_id, id).await.unwrap().is_none());
    }
}
