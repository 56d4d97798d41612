use crate::models::{Category, CreateCategoryRequest};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct CategoryRecord {
    id: i64,
    user_id: i64,
    name: String,
    color: String,
    is_active: bool,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            color: record.color,
            is_active: record.is_active,
        }
    }
}

pub(crate) struct CategoryRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CreateCategoryRequest) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (user_id, name, color, is_active) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(req.user_id)
        .bind(&req.name)
        .bind(&req.color)
        .bind(req.is_active)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn list(&mut self, user_id: i64) -> Result<Vec<Category>, RepositoryError> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, color, is_active FROM categories WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    pub async fn find_by_id(
        &mut self,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, color, is_active FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(|r| r.into()))
    }

    pub async fn update(
        &mut self,
        user_id: i64,
        id: i64,
        name: &str,
        color: Option<&str>,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $1, color = COALESCE($2, color), is_active = $3 WHERE id = $4 AND user_id = $5",
        )
        .bind(name)
        .bind(color)
        .bind(is_active)
        .bind(id)
        .bind(user_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&mut self, user_id: i64, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
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
