use crate::models::Profile;
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct ProfileRecord {
    id: i64,
    email: String,
    display_name: Option<String>,
    timezone: Option<String>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Profile {
            id: record.id,
            email: record.email,
            display_name: record.display_name,
            timezone: record.timezone,
        }
    }
}

pub(crate) struct ProfileRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, email: &str) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO profiles (email) VALUES ($1) RETURNING id",
        )
        .bind(email)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Profile>, RepositoryError> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, email, display_name, timezone FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(|r| r.into()))
    }

    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<Profile>, RepositoryError> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, email, display_name, timezone FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(|r| r.into()))
    }

    pub async fn update(
        &mut self,
        id: i64,
        display_name: Option<&str>,
        timezone: Option<&str>,
    ) -> Result<(), RepositoryError> {
        // Unset fields keep their stored value
        let result = sqlx::query(
            "UPDATE profiles SET display_name = COALESCE($1, display_name), timezone = COALESCE($2, timezone) WHERE id = $3",
        )
        .bind(display_name)
        .bind(timezone)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
