// src/optik/store.rs

use async_trait::async_trait;
use sqlx::{SqlitePool, types::Json};

use crate::{error::AppError, models::submission::SubmissionRecord};

use super::recorder::SubmissionStore;

#[async_trait]
impl SubmissionStore for SqlitePool {
    async fn insert_submission(&self, record: &SubmissionRecord) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO submissions (
                user_id, student_key, test_id, test_name, test_category, test_grade, test_link,
                user_email, user_name, question_count, answered_count,
                answers, answers_array, answers_map, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(record.user.uid)
        .bind(&record.student_key)
        .bind(record.test.id)
        .bind(&record.test.name)
        .bind(&record.test.category)
        .bind(record.test.grade)
        .bind(&record.test.link)
        .bind(&record.user.email)
        .bind(&record.user.name)
        .bind(i64::from(record.count))
        .bind(record.answered_count as i64)
        .bind(&record.answers)
        .bind(Json(&record.answers_array))
        .bind(Json(&record.answers_map))
        .bind(record.created_at)
        .fetch_one(self)
        .await
        .map_err(|e| {
            AppError::from_insert(e, format!("Test '{}' was already submitted", record.test.name))
        })?;

        Ok(id)
    }
}
