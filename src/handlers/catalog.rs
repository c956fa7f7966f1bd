// src/handlers/catalog.rs

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    config::GRADES,
    error::AppError,
    models::{
        catalog::{CatalogParams, CategoryGroup, ExamItem, GradeCatalog, SlideItem, TestItem},
        exam::Exam,
        slide::Slide,
        test_record::TestRecord,
    },
};

/// Public listing of the slides, tests and exams of one grade (default 5).
pub async fn grade_catalog(
    State(pool): State<SqlitePool>,
    Query(params): Query<CatalogParams>,
) -> Result<impl IntoResponse, AppError> {
    let grade = params.grade.unwrap_or(GRADES[0]);
    if !GRADES.contains(&grade) {
        return Err(AppError::BadRequest(format!(
            "Grade must be one of {:?}",
            GRADES
        )));
    }

    Ok(Json(load_grade_catalog(&pool, grade, None).await))
}

/// Collects everything published for `grade`.
///
/// Listing failures are logged and leave that part of the catalog empty.
/// With `solved` set, each test is flagged with whether it was handed in.
pub(crate) async fn load_grade_catalog(
    pool: &SqlitePool,
    grade: i64,
    solved: Option<&HashSet<i64>>,
) -> GradeCatalog {
    let slides = sqlx::query_as::<_, Slide>(
        r#"
        SELECT s.id, s.category_id, c.name AS category, s.grade, s.name, s.link, s.created_at
        FROM slides s
        JOIN categories c ON c.id = s.category_id
        WHERE s.grade = ?
        ORDER BY c.id, s.id
        "#,
    )
    .bind(grade)
    .fetch_all(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch slides for grade {}: {:?}", grade, e);
        Vec::new()
    });

    let tests = sqlx::query_as::<_, TestRecord>(
        r#"
        SELECT t.id, t.category_id, c.name AS category, t.grade, t.name, t.link,
               t.question_count, t.answer_key, t.answer_key_format, t.created_at
        FROM tests t
        JOIN categories c ON c.id = t.category_id
        WHERE t.grade = ?
        ORDER BY c.id, t.id
        "#,
    )
    .bind(grade)
    .fetch_all(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch tests for grade {}: {:?}", grade, e);
        Vec::new()
    });

    let exams = sqlx::query_as::<_, Exam>(
        r#"
        SELECT id, grade, name, question_count, duration_minutes, link, created_at
        FROM exams
        WHERE grade = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(grade)
    .fetch_all(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch exams for grade {}: {:?}", grade, e);
        Vec::new()
    });

    GradeCatalog {
        grade,
        slides: group_by_category(slides.into_iter().map(|s| {
            (
                s.category,
                SlideItem {
                    id: s.id,
                    name: s.name,
                    link: s.link,
                },
            )
        })),
        tests: group_by_category(tests.into_iter().map(|t| {
            (
                t.category,
                TestItem {
                    id: t.id,
                    name: t.name,
                    link: t.link,
                    question_count: t.question_count,
                    solved: solved.map(|set| set.contains(&t.id)),
                },
            )
        })),
        exams: exams
            .into_iter()
            .map(|e| ExamItem {
                closing_at: e.closing_at(),
                id: e.id,
                name: e.name,
                link: e.link,
                question_count: e.question_count,
                duration_minutes: e.duration_minutes,
                created_at: e.created_at,
            })
            .collect(),
    }
}

/// Groups items by category, keeping the order in which categories first appear.
fn group_by_category<T>(rows: impl IntoIterator<Item = (String, T)>) -> Vec<CategoryGroup<T>> {
    let mut groups: Vec<CategoryGroup<T>> = Vec::new();
    for (category, item) in rows {
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.items.push(item),
            None => groups.push(CategoryGroup {
                category,
                items: vec![item],
            }),
        }
    }
    groups
}
