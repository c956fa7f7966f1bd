// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::test_record::validate_url_string;

/// Represents the 'exams' table (weekly trial exams).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub grade: i64,
    pub name: String,
    pub question_count: i64,
    pub duration_minutes: i64,
    pub link: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Exam {
    /// The exam closes `duration_minutes` after it was published.
    pub fn closing_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at + chrono::Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(range(min = 5, max = 8, message = "Grade must be between 5 and 8."))]
    pub grade: i64,
    #[validate(length(min = 1, max = 200, message = "Exam name is required."))]
    pub name: String,
    #[validate(range(min = 1, max = 200, message = "Question count must be between 1 and 200."))]
    pub question_count: i64,
    #[validate(range(min = 1, max = 10080, message = "Duration must be between 1 and 10080 minutes."))]
    pub duration_minutes: i64,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub link: String,
}
