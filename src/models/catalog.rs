// src/models/catalog.rs

//! Read models for the public catalog and the student dashboard.

use serde::{Deserialize, Serialize};

use super::user::MeResponse;

#[derive(Debug, Clone, Serialize)]
pub struct SlideItem {
    pub id: i64,
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestItem {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub question_count: i64,
    /// Set on the dashboard when the current student has handed this test in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamItem {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub question_count: i64,
    pub duration_minutes: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub closing_at: chrono::DateTime<chrono::Utc>,
}

/// Items of one category. Empty groups are never returned.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<T> {
    pub category: String,
    pub items: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct GradeCatalog {
    pub grade: i64,
    pub slides: Vec<CategoryGroup<SlideItem>>,
    pub tests: Vec<CategoryGroup<TestItem>>,
    pub exams: Vec<ExamItem>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub grade: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: MeResponse,
    pub grades: Vec<GradeCatalog>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub students: i64,
    pub tests: i64,
}
