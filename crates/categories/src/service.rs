use crate::models::{Category, CreateCategoryRequest};
use crate::repository::CategoryRepository;
use database::{Database, RepositoryError};
use rand::seq::SliceRandom;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Category already exists: {0}")]
    Conflict(String),
    #[error("Category not found")]
    NotFound,
}

impl From<RepositoryError> for CategoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => CategoryError::NotFound,
            RepositoryError::UniqueViolation(msg) => CategoryError::Conflict(msg),
            RepositoryError::Infrastructure(e) => CategoryError::Infrastructure(e.to_string()),
            _ => CategoryError::Infrastructure(err.to_string()),
        }
    }
}

pub struct CategoryService;

impl CategoryService {
    fn get_random_pastel_color() -> String {
        let colors = vec![
            "#FFB3BA", "#FFDFBA", "#FFFFBA", "#BAFFC9", "#BAE1FF",
            "#E2F0CB", "#FDFD96", "#FFC3A0", "#FFD1DC", "#D4F0F0",
            "#CCE2CB", "#B6CFB6", "#97C1A9", "#FCB7AF", "#FFDAC1",
            "#E7FFAC", "#FFABAB", "#D5AAFF", "#85E3FF", "#B9F6CA"
        ];
        let mut rng = rand::thread_rng();
        colors.choose(&mut rng).unwrap_or(&"#FFFFFF").to_string()
    }

    #[instrument(skip(db))]
    pub async fn create_category(
        db: &Database,
        user_id: i64,
        name: String,
    ) -> Result<i64, CategoryError> {
        let color = Self::get_random_pastel_color();
        let req = CreateCategoryRequest::new(user_id, name, color)
            .map_err(CategoryError::InvalidInput)?;

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&req).await?;

        uow.commit().await.map_err(RepositoryError::from)?;

        Ok(id)
    }

    #[instrument(skip(db))]
    pub async fn update_category(
        db: &Database,
        user_id: i64,
        id: i64,
        name: String,
        color: Option<String>,
        is_active: bool,
    ) -> Result<(), CategoryError> {
        if name.trim().is_empty() {
            return Err(CategoryError::InvalidInput("Category name cannot be empty".into()));
        }

        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        repo.update(user_id, id, name.trim(), color.as_deref(), is_active).await?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_category(
        db: &Database,
        user_id: i64,
        id: i64,
    ) -> Result<(), CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        repo.delete(user_id, id).await?;

        uow.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_categories(db: &Database, user_id: i64) -> Result<Vec<Category>, CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let categories = repo.list(user_id).await?;

        Ok(categories)
    }

    #[instrument(skip(db))]
    pub async fn get_category(db: &Database, user_id: i64, id: i64) -> Result<Category, CategoryError> {
        let mut uow = db.begin().await.map_err(RepositoryError::from)?;
        let mut repo = CategoryRepository::new(uow.connection());

        let category = repo.find_by_id(user_id, id).await?
            .ok_or(CategoryError::NotFound)?;

        Ok(category)
    }
}
