use crate::models::Profile;
use crate::repository::ProfileRepository;
use database::{Database, RepositoryError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Profile not found")]
    NotFound,
}

impl From<RepositoryError> for ProfileError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ProfileError::NotFound,
            RepositoryError::Infrastructure(e) => ProfileError::Infrastructure(e.to_string()),
            _ => ProfileError::Infrastructure(err.to_string()),
        }
    }
}

pub struct ProfileService;

impl ProfileService {
    /// Looks up the profile for `email`, creating it on first login.
    #[instrument(skip(db))]
    pub async fn ensure_profile(db: &Database, email: &str) -> Result<Profile, ProfileError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ProfileError::InvalidInput("Invalid email address".into()));
        }

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = ProfileRepository::new(uow.connection());

        if let Some(profile) = repo.find_by_email(&email).await? {
            return Ok(profile);
        }

        let id = repo.create(&email).await?;
        let profile = repo.find_by_id(id).await?.ok_or(ProfileError::NotFound)?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(profile)
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &Database, user_id: i64) -> Result<Profile, ProfileError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = ProfileRepository::new(uow.connection());

        let profile = repo.find_by_id(user_id).await?.ok_or(ProfileError::NotFound)?;

        Ok(profile)
    }

    /// Stored timezone preference, if any. A missing profile row is not an
    /// error here; callers decide what to fall back to.
    #[instrument(skip(db))]
    pub async fn get_timezone(db: &Database, user_id: i64) -> Result<Option<String>, ProfileError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = ProfileRepository::new(uow.connection());

        let profile = repo.find_by_id(user_id).await?;

        Ok(profile.and_then(|p| p.timezone))
    }

    #[instrument(skip(db))]
    pub async fn update_profile(
        db: &Database,
        user_id: i64,
        display_name: Option<String>,
        timezone: Option<String>,
    ) -> Result<Profile, ProfileError> {
        if let Some(tz) = &timezone {
            if tz.parse::<chrono_tz::Tz>().is_err() {
                return Err(ProfileError::InvalidInput(format!(
                    "Unknown timezone: {tz}"
                )));
            }
        }
        if let Some(name) = &display_name {
            if name.trim().is_empty() {
                return Err(ProfileError::InvalidInput("Display name cannot be empty".into()));
            }
        }

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = ProfileRepository::new(uow.connection());

        repo.update(user_id, display_name.as_deref(), timezone.as_deref()).await?;

        let profile = repo.find_by_id(user_id).await?.ok_or(ProfileError::NotFound)?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(profile)
    }
}
