// src/handlers/dashboard.rs

use std::collections::HashSet;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    config::{Config, GRADES},
    error::AppError,
    models::{
        catalog::DashboardResponse,
        submission::{SolvedTest, StoredSubmission, SubmissionRow},
        user::Identity,
    },
};

use super::{auth::load_profile, catalog::load_grade_catalog};

/// Student home: profile plus every grade's materials, tests flagged as solved.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let profile = load_profile(&pool, &identity, config.partition_casing).await?;

    let solved: HashSet<i64> = fetch_solved(&pool, identity.user_id)
        .await
        .map(|rows| rows.into_iter().map(|s| s.test_id).collect())
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch solved tests: {:?}", e);
            HashSet::new()
        });

    let mut grades = Vec::with_capacity(GRADES.len());
    for grade in GRADES {
        grades.push(load_grade_catalog(&pool, grade, Some(&solved)).await);
    }

    Ok(Json(DashboardResponse { profile, grades }))
}

/// Tests the current student has already submitted.
pub async fn solved_tests(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let solved = fetch_solved(&pool, identity.user_id).await.map_err(|e| {
        tracing::error!("Failed to fetch solved tests: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(solved))
}

/// The current student's submissions, newest first.
pub async fn my_submissions(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, SubmissionRow>(
        r#"
        SELECT id, user_id, student_key, test_id, test_name, test_category, test_grade, test_link,
               user_email, user_name, question_count, answered_count,
               answers, answers_array, answers_map, created_at
        FROM submissions
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(identity.user_id)
    .fetch_all(&pool)
    .await?;

    let submissions: Vec<StoredSubmission> = rows.into_iter().map(Into::into).collect();
    Ok(Json(submissions))
}

async fn fetch_solved(pool: &SqlitePool, user_id: i64) -> Result<Vec<SolvedTest>, sqlx::Error> {
    sqlx::query_as::<_, SolvedTest>(
        r#"
        SELECT test_id, test_name, created_at
        FROM submissions
        WHERE user_id = ?
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
