// src/models/submission.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::optik::sheet::{SelectionState, SheetContext};

/// Snapshot of the test a sheet was filled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRef {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub grade: i64,
    pub link: String,
}

/// Snapshot of the student who filled the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub uid: i64,
    pub email: String,
    pub name: String,
}

/// A submission as persisted and returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub test: TestRef,
    pub user: StudentRef,
    /// Normalized key grouping this student's submissions.
    pub student_key: String,
    pub count: u32,
    pub answered_count: usize,
    pub answers: String,
    pub answers_array: Vec<String>,
    pub answers_map: SelectionState,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Row of the 'submissions' table, flattened.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: i64,
    pub user_id: i64,
    pub student_key: String,
    pub test_id: i64,
    pub test_name: String,
    pub test_category: String,
    pub test_grade: i64,
    pub test_link: String,
    pub user_email: String,
    pub user_name: String,
    pub question_count: i64,
    pub answered_count: i64,
    pub answers: String,
    pub answers_array: sqlx::types::Json<Vec<String>>,
    pub answers_map: sqlx::types::Json<SelectionState>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a filled sheet.
#[derive(Debug, Deserialize)]
pub struct SubmitSheetRequest {
    /// Sheet parameters from the query string the sheet was opened with.
    #[serde(default)]
    pub query: SheetContext,
    /// Parameters handed over by the previous screen; these win over `query`.
    #[serde(default)]
    pub state: Option<SheetContext>,
    /// Key: question number, value: picked letter.
    #[serde(default)]
    pub answers: BTreeMap<u32, String>,
}

/// Answer to a successful submit.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: i64,
    pub status: &'static str,
    pub completion_ratio: f64,
    pub record: SubmissionRecord,
}

/// A test the student has already handed in.
#[derive(Debug, Serialize, FromRow)]
pub struct SolvedTest {
    pub test_id: i64,
    pub test_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A stored submission with its assigned id.
#[derive(Debug, Serialize)]
pub struct StoredSubmission {
    pub id: i64,
    #[serde(flatten)]
    pub record: SubmissionRecord,
}

impl From<SubmissionRow> for StoredSubmission {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            record: SubmissionRecord {
                kind: "submission",
                test: TestRef {
                    id: row.test_id,
                    name: row.test_name,
                    category: row.test_category,
                    grade: row.test_grade,
                    link: row.test_link,
                },
                user: StudentRef {
                    uid: row.user_id,
                    email: row.user_email,
                    name: row.user_name,
                },
                student_key: row.student_key,
                count: row.question_count.max(0) as u32,
                answered_count: row.answered_count.max(0) as usize,
                answers: row.answers,
                answers_array: row.answers_array.0,
                answers_map: row.answers_map.0,
                created_at: row.created_at,
            },
        }
    }
}
