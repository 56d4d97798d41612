use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateCategoryRequest {
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct RawCreateCategoryRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: String,
    pub color: Option<String>,
    pub is_active: bool,
}

impl CreateCategoryRequest {
    pub fn new(user_id: i64, name: String, color: String) -> Result<Self, String> {
        if name.trim().is_empty() {
            return Err("Category name cannot be empty".to_string());
        }

        Ok(Self {
            user_id,
            name: name.trim().to_string(),
            color,
            is_active: true,
        })
    }
}
