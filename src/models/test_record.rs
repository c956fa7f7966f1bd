// src/models/test_record.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::optik::answer_key::AnswerKeyFormat;

/// Represents the 'tests' table joined with its category name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: i64,
    pub category_id: i64,
    pub category: String,
    pub grade: i64,
    pub name: String,
    pub link: String,
    pub question_count: i64,

    /// Stored verbatim; never sent to students.
    #[serde(skip_serializing)]
    pub answer_key: String,
    #[serde(skip_serializing)]
    pub answer_key_format: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a test.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestRequest {
    pub category_id: i64,
    #[validate(range(min = 5, max = 8, message = "Grade must be between 5 and 8."))]
    pub grade: i64,
    #[validate(length(min = 1, max = 200, message = "Test name is required."))]
    pub name: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub link: String,
    #[validate(range(min = 1, max = 200, message = "Question count must be between 1 and 200."))]
    pub question_count: u32,
    pub answer_key: String,
    #[serde(default)]
    pub answer_key_format: AnswerKeyFormat,
}

/// DTO for checking an answer key while it is being typed.
#[derive(Debug, Deserialize)]
pub struct ValidateAnswerKeyRequest {
    #[serde(default)]
    pub answer_key: String,
    pub question_count: Option<u32>,
    #[serde(default)]
    pub answer_key_format: AnswerKeyFormat,
    /// `true` runs the pre-submit check, where an empty key fails.
    #[serde(default)]
    pub strict: bool,
}

/// Validates that a string is a correctly formatted URL.
pub fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
