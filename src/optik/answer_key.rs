// src/optik/answer_key.rs

//! Answer-key grammars and their validation.
//!
//! Two textual encodings are accepted:
//! * compact: `ABCDAB...`, one letter per question in order;
//! * indexed: `1/A, 2/B, 10/C`, explicit question-number/letter pairs.
//!
//! The grammar travels with the key as [`AnswerKeyFormat`] and is persisted
//! next to it; compact is the default.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

static COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-D]+$").expect("compact answer key pattern is valid")
});

static INDEXED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9]+/[A-D](,\s*[0-9]+/[A-D])*$")
        .expect("indexed answer key pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKeyFormat {
    #[default]
    Compact,
    Indexed,
}

impl AnswerKeyFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKeyFormat::Compact => "compact",
            AnswerKeyFormat::Indexed => "indexed",
        }
    }
}

impl std::str::FromStr for AnswerKeyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(AnswerKeyFormat::Compact),
            "indexed" => Ok(AnswerKeyFormat::Indexed),
            other => Err(format!("unknown answer key format '{}'", other)),
        }
    }
}

/// Outcome of a validation pass, shaped for inline field feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    fn pass() -> Self {
        Self { ok: true, message: None }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Soft validation, run while the key is being typed.
///
/// An empty key passes without a message. A compact key must also match
/// `question_count` in length when one is given. Indexed keys are never
/// checked against the question count.
pub fn validate(raw: &str, question_count: Option<u32>, format: AnswerKeyFormat) -> ValidationResult {
    if raw.is_empty() {
        return ValidationResult::pass();
    }

    match format {
        AnswerKeyFormat::Compact => {
            if !COMPACT_RE.is_match(raw) {
                return ValidationResult::fail("Answer key may only contain the letters A-D");
            }
            match question_count {
                Some(count) if raw.len() != count as usize => ValidationResult::fail(format!(
                    "length mismatch: answer key has {} answers but the test has {} questions",
                    raw.len(),
                    count
                )),
                _ => ValidationResult::pass(),
            }
        }
        AnswerKeyFormat::Indexed => {
            if INDEXED_RE.is_match(raw) {
                ValidationResult::pass()
            } else {
                ValidationResult::fail(
                    "Answer key must be comma-separated number/letter pairs such as 1/A, 2/B",
                )
            }
        }
    }
}

/// Hard validation, run before the test is saved: like [`validate`] but an
/// empty key fails.
pub fn require(raw: &str, question_count: Option<u32>, format: AnswerKeyFormat) -> ValidationResult {
    if raw.trim().is_empty() {
        return ValidationResult::fail("Answer key is required");
    }
    validate(raw, question_count, format)
}

/// A key that passed hard validation. The text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKey {
    pub format: AnswerKeyFormat,
    pub raw: String,
}

impl AnswerKey {
    pub fn parse(raw: &str, question_count: u32, format: AnswerKeyFormat) -> Result<Self, AppError> {
        let result = require(raw, Some(question_count), format);
        if !result.ok {
            return Err(AppError::BadRequest(
                result.message.unwrap_or_else(|| "Invalid answer key".to_string()),
            ));
        }

        Ok(Self {
            format,
            raw: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_key_matching_count_is_valid() {
        assert!(validate("ABCD", Some(4), AnswerKeyFormat::Compact).ok);
        assert!(validate("abcd", Some(4), AnswerKeyFormat::Compact).ok);
        assert!(validate("ABCD", None, AnswerKeyFormat::Compact).ok);
    }

    #[test]
    fn compact_key_length_mismatch() {
        let result = validate("ABCD", Some(5), AnswerKeyFormat::Compact);
        assert!(!result.ok);
        assert!(result.message.unwrap().contains("length mismatch"));
    }

    #[test]
    fn compact_key_rejects_foreign_letters_and_separators() {
        for raw in ["ABCE", "AB CD", "A,B", "1234", "ABÇD"] {
            assert!(
                !validate(raw, None, AnswerKeyFormat::Compact).ok,
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn indexed_key_ignores_question_count() {
        for count in [None, Some(1), Some(3), Some(40)] {
            assert!(validate("1/A,2/B,10/C", count, AnswerKeyFormat::Indexed).ok);
        }
        assert!(validate("1/a, 2/b,  3/d", Some(3), AnswerKeyFormat::Indexed).ok);
    }

    #[test]
    fn indexed_key_rejects_malformed_pairs() {
        for raw in ["1/E", "A/1", "1/A,", ",1/A", "1-A", "1/A;2/B", "ABCD"] {
            assert!(
                !validate(raw, None, AnswerKeyFormat::Indexed).ok,
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn empty_key_is_soft_valid_but_hard_invalid() {
        assert_eq!(
            validate("", Some(10), AnswerKeyFormat::Compact),
            ValidationResult { ok: true, message: None }
        );
        assert!(!require("", Some(10), AnswerKeyFormat::Compact).ok);
        assert!(!require("   ", None, AnswerKeyFormat::Indexed).ok);
    }

    #[test]
    fn parse_keeps_text_verbatim() {
        let key = AnswerKey::parse("abCD", 4, AnswerKeyFormat::Compact).unwrap();
        assert_eq!(key.raw, "abCD");
        assert!(matches!(
            AnswerKey::parse("ABC", 4, AnswerKeyFormat::Compact),
            Err(AppError::BadRequest(_))
        ));
    }
}
