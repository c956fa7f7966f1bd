// src/optik/recorder.rs

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        submission::{StudentRef, SubmissionRecord, TestRef},
        user::Identity,
    },
    utils::text::{Casing, resolve_student_key},
};

use super::{encoding::SheetEncoding, sheet::SelectionState};

/// Where finished sheets end up.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persists the record and returns its assigned id.
    ///
    /// A second submission by the same student for the same test must fail
    /// with `AppError::Conflict`.
    async fn insert_submission(&self, record: &SubmissionRecord) -> Result<i64, AppError>;
}

/// How the student is named on the record.
#[derive(Debug, Clone, Default)]
pub struct StudentName {
    pub display_name: String,
    /// Key already normalized by an earlier screen; used in preference to
    /// deriving one from `display_name`.
    pub precomputed_key: Option<String>,
}

/// Turns a filled sheet into a persisted submission.
pub struct Recorder<'a, S: SubmissionStore + ?Sized> {
    store: &'a S,
    casing: Casing,
}

impl<'a, S: SubmissionStore + ?Sized> Recorder<'a, S> {
    pub fn new(store: &'a S, casing: Casing) -> Self {
        Self { store, casing }
    }

    /// Builds the record for `selection` over `1..=question_count` and stores it.
    ///
    /// Without an identity nothing is built and the store is not contacted.
    pub async fn submit(
        &self,
        identity: Option<&Identity>,
        selection: &SelectionState,
        question_count: u32,
        test: TestRef,
        student: &StudentName,
    ) -> Result<(i64, SubmissionRecord), AppError> {
        let identity = identity
            .ok_or_else(|| AppError::AuthError("You must be signed in to submit".to_string()))?;

        let encoding = SheetEncoding::encode(selection, question_count);
        let student_key = resolve_student_key(
            student.precomputed_key.as_deref(),
            &student.display_name,
            self.casing,
        );

        if student_key.key.is_empty() {
            return Err(AppError::BadRequest(
                "Student name does not yield a usable key".to_string(),
            ));
        }
        if student_key.is_foreign() {
            tracing::warn!(
                user_id = identity.user_id,
                key = %student_key.key,
                derived = %student_key.derived,
                "Submission filed under a precomputed student key that differs from the profile name"
            );
        }

        let record = SubmissionRecord {
            kind: "submission",
            test,
            user: StudentRef {
                uid: identity.user_id,
                email: identity.email.clone(),
                name: student.display_name.clone(),
            },
            student_key: student_key.key,
            count: question_count,
            answered_count: encoding.answered_count,
            answers: encoding.answers,
            answers_array: encoding.answers_array,
            answers_map: encoding.answers_map,
            created_at: chrono::Utc::now(),
        };

        let id = self.store.insert_submission(&record).await.map_err(|e| match e {
            AppError::Conflict(_) => e,
            other => {
                tracing::error!("Failed to store submission: {:?}", other);
                AppError::InternalServerError(other.to_string())
            }
        })?;

        tracing::info!(
            submission_id = id,
            user_id = identity.user_id,
            test_id = record.test.id,
            answered = record.answered_count,
            count = record.count,
            "Optik sheet submitted"
        );

        Ok((id, record))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{models::user::Role, optik::sheet::OptikSheet, optik::sheet::Choice};

    #[derive(Default)]
    struct MemoryStore {
        calls: AtomicUsize,
        fail: bool,
        records: Mutex<Vec<SubmissionRecord>>,
    }

    #[async_trait]
    impl SubmissionStore for MemoryStore {
        async fn insert_submission(&self, record: &SubmissionRecord) -> Result<i64, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::InternalServerError("disk full".to_string()));
            }
            let mut records = self.records.lock().unwrap();
            if records
                .iter()
                .any(|r| r.user.uid == record.user.uid && r.test.id == record.test.id)
            {
                return Err(AppError::Conflict("already submitted".to_string()));
            }
            records.push(record.clone());
            Ok(records.len() as i64)
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: 7,
            email: "omer@example.com".to_string(),
            role: Role::Student,
        }
    }

    fn test_ref() -> TestRef {
        TestRef {
            id: 3,
            name: "Deneme 1".to_string(),
            category: "Fen".to_string(),
            grade: 7,
            link: "https://example.com/deneme-1".to_string(),
        }
    }

    fn student() -> StudentName {
        StudentName {
            display_name: "Ömer Faruk".to_string(),
            precomputed_key: None,
        }
    }

    #[tokio::test]
    async fn missing_identity_fails_without_touching_the_store() {
        let store = MemoryStore::default();
        let recorder = Recorder::new(&store, Casing::Turkish);

        let result = recorder
            .submit(None, &SelectionState::new(), 3, test_ref(), &student())
            .await;

        assert!(matches!(result, Err(AppError::AuthError(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn record_carries_all_three_encodings() {
        let store = MemoryStore::default();
        let recorder = Recorder::new(&store, Casing::Turkish);
        let mut sheet = OptikSheet::new(3);
        sheet.select(1, Choice::B).unwrap();
        sheet.select(3, Choice::D).unwrap();

        let (id, record) = recorder
            .submit(Some(&identity()), sheet.selection(), 3, test_ref(), &student())
            .await
            .unwrap();

        assert_eq!(id, 1);
        assert_eq!(record.kind, "submission");
        assert_eq!(record.student_key, "omer_faruk");
        assert_eq!(record.answers, "B-D");
        assert_eq!(record.answers_array, vec!["B", "-", "D"]);
        assert_eq!(&record.answers_map, sheet.selection());
        assert_eq!(record.answered_count, 2);
        assert_eq!(record.user.uid, 7);
    }

    #[tokio::test]
    async fn precomputed_key_is_used_verbatim() {
        let store = MemoryStore::default();
        let recorder = Recorder::new(&store, Casing::Invariant);
        let name = StudentName {
            display_name: "Ömer Faruk".to_string(),
            precomputed_key: Some("OMER_F".to_string()),
        };

        let (_, record) = recorder
            .submit(Some(&identity()), &SelectionState::new(), 2, test_ref(), &name)
            .await
            .unwrap();

        assert_eq!(record.student_key, "omer_f");
    }

    #[tokio::test]
    async fn second_submission_for_same_test_conflicts() {
        let store = MemoryStore::default();
        let recorder = Recorder::new(&store, Casing::Turkish);

        recorder
            .submit(Some(&identity()), &SelectionState::new(), 2, test_ref(), &student())
            .await
            .unwrap();
        let again = recorder
            .submit(Some(&identity()), &SelectionState::new(), 2, test_ref(), &student())
            .await;

        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_internal_error() {
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let recorder = Recorder::new(&store, Casing::Turkish);

        let result = recorder
            .submit(Some(&identity()), &SelectionState::new(), 2, test_ref(), &student())
            .await;

        assert!(matches!(result, Err(AppError::InternalServerError(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
