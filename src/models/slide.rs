// src/models/slide.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::test_record::validate_url_string;

/// Represents the 'slides' table joined with its category name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Slide {
    pub id: i64,
    pub category_id: i64,
    pub category: String,
    pub grade: i64,
    pub name: String,
    pub link: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSlideRequest {
    pub category_id: i64,
    #[validate(range(min = 5, max = 8, message = "Grade must be between 5 and 8."))]
    pub grade: i64,
    #[validate(length(min = 1, max = 200, message = "Slide name is required."))]
    pub name: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub link: String,
}
