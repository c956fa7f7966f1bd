// src/handlers/optik.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        submission::{SubmissionReceipt, SubmitSheetRequest, TestRef},
        test_record::TestRecord,
        user::Identity,
    },
    optik::{
        recorder::{Recorder, StudentName},
        sheet::{OptikSheet, QuestionRow, SheetContext},
    },
};

use super::auth::load_profile;

/// DTO for opening a sheet with parameters handed over by the previous screen.
#[derive(Debug, Default, Deserialize)]
pub struct OpenSheetRequest {
    #[serde(default)]
    pub state: Option<SheetContext>,
}

#[derive(Debug, Serialize)]
pub struct SheetResponse {
    pub question_count: u32,
    pub rows: Vec<QuestionRow>,
    pub completion_ratio: f64,
    pub context: SheetContext,
}

/// Builds an empty sheet from query-string parameters.
pub async fn open_sheet(Query(query): Query<SheetContext>) -> impl IntoResponse {
    Json(sheet_response(SheetContext::resolve(None, query)))
}

/// Builds an empty sheet; values in the body's `state` win over the query string.
pub async fn open_sheet_with_state(
    Query(query): Query<SheetContext>,
    Json(body): Json<OpenSheetRequest>,
) -> impl IntoResponse {
    Json(sheet_response(SheetContext::resolve(body.state, query)))
}

fn sheet_response(context: SheetContext) -> SheetResponse {
    let sheet = OptikSheet::new(context.question_count());
    SheetResponse {
        question_count: sheet.question_count(),
        rows: sheet.rows(),
        completion_ratio: sheet.completion_ratio(),
        context,
    }
}

/// Records a filled sheet for the current student.
///
/// * The test is looked up by the `id` parameter; its stored question count
///   is authoritative and a differing `count` is rejected.
/// * The student key comes from the `student` parameter when present,
///   otherwise from the profile name.
/// * A second submission for the same test returns 409.
pub async fn submit_sheet(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<SubmitSheetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let context = SheetContext::resolve(req.state, req.query);

    let test_id = context
        .id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::BadRequest("A valid test id is required".to_string()))?;

    let test = sqlx::query_as::<_, TestRecord>(
        r#"
        SELECT t.id, t.category_id, c.name AS category, t.grade, t.name, t.link,
               t.question_count, t.answer_key, t.answer_key_format, t.created_at
        FROM tests t
        JOIN categories c ON c.id = t.category_id
        WHERE t.id = ?
        "#,
    )
    .bind(test_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Test {} not found", test_id)))?;

    let question_count = u32::try_from(test.question_count)
        .map_err(|_| AppError::InternalServerError("Stored question count is invalid".into()))?;
    if context.count.is_some() && context.question_count() != question_count {
        return Err(AppError::BadRequest(format!(
            "Sheet has {} questions but the test has {}",
            context.question_count(),
            question_count
        )));
    }

    let sheet = OptikSheet::from_answers(
        question_count,
        req.answers.iter().map(|(n, letter)| (*n, letter.as_str())),
    )?;

    let profile = load_profile(&pool, &identity, config.partition_casing).await?;
    let student = StudentName {
        display_name: profile.display_name,
        precomputed_key: context.student.clone(),
    };

    let test_ref = TestRef {
        id: test.id,
        name: test.name,
        category: test.category,
        grade: test.grade,
        link: test.link,
    };

    let (id, record) = Recorder::new(&pool, config.partition_casing)
        .submit(
            Some(&identity),
            sheet.selection(),
            question_count,
            test_ref,
            &student,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionReceipt {
            id,
            status: "ok",
            completion_ratio: sheet.completion_ratio(),
            record,
        }),
    ))
}
