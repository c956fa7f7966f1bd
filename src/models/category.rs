// src/models/category.rs

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'categories' table: the allow-list tests and slides are filed under.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// 'test' or 'slide'.
    pub kind: String,
    /// Only slide categories carry a grade.
    pub grade: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Test,
    Slide,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Test => "test",
            CategoryKind::Slide => "slide",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(CategoryKind::Test),
            "slide" => Ok(CategoryKind::Slide),
            other => Err(format!("unknown category kind '{}'", other)),
        }
    }
}

/// DTO for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name is required."))]
    pub name: String,
    pub kind: CategoryKind,
    #[validate(range(min = 5, max = 8, message = "Grade must be between 5 and 8."))]
    pub grade: Option<i64>,
}

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct CategoryListParams {
    pub kind: Option<CategoryKind>,
}
