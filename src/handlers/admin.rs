// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        catalog::StatsResponse,
        category::{Category, CategoryKind, CategoryListParams, CreateCategoryRequest},
        exam::CreateExamRequest,
        slide::CreateSlideRequest,
        test_record::{CreateTestRequest, ValidateAnswerKeyRequest},
        user::CreateStudentRequest,
    },
    optik::answer_key::{self, AnswerKey},
    utils::{
        hash::{generate_temp_password, hash_password},
        html::clean_html,
    },
};

const MIN_PASSWORD_LEN: usize = 6;

/// Returns the number of students and tests.
/// Admin only.
pub async fn stats(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'student'")
        .fetch_one(&pool)
        .await?;
    let tests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tests")
        .fetch_one(&pool)
        .await?;

    Ok(Json(StatsResponse { students, tests }))
}

/// Creates a student account.
///
/// When no password is given a temporary one is generated and returned once,
/// so the administrator can hand it over.
/// Admin only.
pub async fn create_student(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let password = match payload.password.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => generate_temp_password(),
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }

    let email = payload.email.trim().to_lowercase();
    let hashed_password = hash_password(&password)?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password, role, first_name, last_name, created_at)
        VALUES (?, ?, 'student', ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(hashed_password)
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| AppError::from_insert(e, format!("E-mail '{}' is already registered", email)))?;

    tracing::info!(user_id = id, "Student account created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": id,
            "email": email,
            "temporary_password": password,
        })),
    ))
}

/// Generates a temporary password for the student form.
/// Admin only.
pub async fn temp_password() -> impl IntoResponse {
    Json(serde_json::json!({ "password": generate_temp_password() }))
}

/// Lists categories, optionally only one kind.
/// Admin only.
pub async fn list_categories(
    State(pool): State<SqlitePool>,
    Query(params): Query<CategoryListParams>,
) -> Result<impl IntoResponse, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, kind, grade, created_at
        FROM categories
        WHERE (? IS NULL OR kind = ?)
        ORDER BY id
        "#,
    )
    .bind(params.kind.map(CategoryKind::as_str))
    .bind(params.kind.map(CategoryKind::as_str))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list categories: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(categories))
}

/// Adds a category to the allow-list.
/// Admin only.
pub async fn create_category(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = clean_html(&payload.name);
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name is required.".to_string()));
    }

    // Only slide categories are filed per grade.
    let grade = match payload.kind {
        CategoryKind::Slide => Some(payload.grade.ok_or_else(|| {
            AppError::BadRequest("Slide categories need a grade.".to_string())
        })?),
        CategoryKind::Test => None,
    };

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, kind, grade, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, kind, grade, created_at
        "#,
    )
    .bind(&name)
    .bind(payload.kind.as_str())
    .bind(grade)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        let conflict = match grade {
            Some(grade) => format!("Category '{}' already exists for grade {}", name, grade),
            None => format!("Category '{}' already exists", name),
        };
        AppError::from_insert(e, conflict)
    })?;

    tracing::info!(category_id = category.id, kind = %category.kind, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Checks an answer key while it is being typed.
///
/// Non-strict mode lets an empty key pass; strict mode is the pre-submit check.
/// Admin only.
pub async fn validate_answer_key(
    Json(payload): Json<ValidateAnswerKeyRequest>,
) -> impl IntoResponse {
    let result = if payload.strict {
        answer_key::require(
            &payload.answer_key,
            payload.question_count,
            payload.answer_key_format,
        )
    } else {
        answer_key::validate(
            &payload.answer_key,
            payload.question_count,
            payload.answer_key_format,
        )
    };

    Json(result)
}

/// Creates a test under a test category.
/// Admin only.
pub async fn create_test(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let key = AnswerKey::parse(
        &payload.answer_key,
        payload.question_count,
        payload.answer_key_format,
    )?;
    let category = find_category(&pool, payload.category_id, CategoryKind::Test).await?;

    let name = clean_html(&payload.name);
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO tests (category_id, grade, name, link, question_count, answer_key, answer_key_format, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(category.id)
    .bind(payload.grade)
    .bind(&name)
    .bind(payload.link.trim())
    .bind(i64::from(payload.question_count))
    .bind(&key.raw)
    .bind(key.format.as_str())
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create test: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(test_id = id, category = %category.name, "Test created");

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Creates a slide under a slide category filed for the same grade.
/// Admin only.
pub async fn create_slide(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateSlideRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = find_category(&pool, payload.category_id, CategoryKind::Slide).await?;
    if category.grade != Some(payload.grade) {
        return Err(AppError::BadRequest(format!(
            "Category '{}' is not filed under grade {}",
            category.name, payload.grade
        )));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO slides (category_id, grade, name, link, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(category.id)
    .bind(payload.grade)
    .bind(clean_html(&payload.name))
    .bind(payload.link.trim())
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create slide: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Publishes a weekly trial exam.
/// Admin only.
pub async fn create_exam(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO exams (grade, name, question_count, duration_minutes, link, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.grade)
    .bind(clean_html(&payload.name))
    .bind(payload.question_count)
    .bind(payload.duration_minutes)
    .bind(payload.link.trim())
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create exam: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Looks a category up in the allow-list and checks its kind.
async fn find_category(
    pool: &SqlitePool,
    id: i64,
    kind: CategoryKind,
) -> Result<Category, AppError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, kind, grade, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::BadRequest(format!("Unknown category {}", id)))?;

    if category.kind != kind.as_str() {
        return Err(AppError::BadRequest(format!(
            "Category '{}' is not a {} category",
            category.name,
            kind.as_str()
        )));
    }

    Ok(category)
}
