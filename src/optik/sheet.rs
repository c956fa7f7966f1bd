// src/optik/sheet.rs

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    config::{DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT},
    error::AppError,
};

/// One of the four bubbles on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn as_char(self) -> char {
        match self {
            Choice::A => 'A',
            Choice::B => 'B',
            Choice::C => 'C',
            Choice::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Choice::A),
            'B' => Some(Choice::B),
            'C' => Some(Choice::C),
            'D' => Some(Choice::D),
            _ => None,
        }
    }
}

impl FromStr for Choice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next().and_then(Choice::from_char), chars.next()) {
            (Some(choice), None) => Ok(choice),
            _ => Err(AppError::BadRequest(format!("'{}' is not one of A, B, C, D", s))),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRow {
    pub number: u32,
    pub options: [Choice; 4],
}

/// Builds the grid of rows for `question_count` questions, numbered from 1.
pub fn build_sheet(question_count: u32) -> Vec<QuestionRow> {
    (1..=question_count)
        .map(|number| QuestionRow {
            number,
            options: Choice::ALL,
        })
        .collect()
}

/// Reads a question count from untrusted input.
///
/// Missing or blank input gives the default of 20. Input that is not a
/// positive number is clamped up to 1, and very large counts are capped.
pub fn clamp_question_count(raw: Option<&str>) -> u32 {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return DEFAULT_QUESTION_COUNT,
    };

    // Leading integer only, so "12.5" and "12 soru" read as 12.
    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let digits_end = raw[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |i| i + sign_len);

    match raw[..digits_end].parse::<i64>() {
        Ok(n) if n >= 1 => n.min(MAX_QUESTION_COUNT as i64) as u32,
        Ok(_) => 1,
        Err(_) if digits_end > sign_len && !raw.starts_with('-') => MAX_QUESTION_COUNT,
        Err(_) => 1,
    }
}

/// Picked letters keyed by question number. Absent entries are unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState(BTreeMap<u32, Choice>);

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, number: u32) -> Option<Choice> {
        self.0.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Choice)> + '_ {
        self.0.iter().map(|(n, c)| (*n, *c))
    }

    fn insert(&mut self, number: u32, choice: Choice) -> Option<Choice> {
        self.0.insert(number, choice)
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(u32, Choice)> for SelectionState {
    fn from_iter<T: IntoIterator<Item = (u32, Choice)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An in-progress sheet. Each row holds at most one pick.
#[derive(Debug, Clone)]
pub struct OptikSheet {
    question_count: u32,
    selection: SelectionState,
    feedback: Option<String>,
}

impl OptikSheet {
    pub fn new(question_count: u32) -> Self {
        Self {
            question_count: question_count.max(1),
            selection: SelectionState::new(),
            feedback: None,
        }
    }

    /// Fills a sheet from raw `question -> letter` answers, rejecting rows
    /// outside the sheet and letters other than A-D.
    pub fn from_answers<'a>(
        question_count: u32,
        answers: impl IntoIterator<Item = (u32, &'a str)>,
    ) -> Result<Self, AppError> {
        let mut sheet = Self::new(question_count);
        for (number, letter) in answers {
            sheet.select(number, letter.parse()?)?;
        }
        Ok(sheet)
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn rows(&self) -> Vec<QuestionRow> {
        build_sheet(self.question_count)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Marks `choice` on row `number`, replacing whatever was marked before.
    /// Returns the replaced choice.
    pub fn select(&mut self, number: u32, choice: Choice) -> Result<Option<Choice>, AppError> {
        if number == 0 || number > self.question_count {
            return Err(AppError::BadRequest(format!(
                "Question {} is outside 1..={}",
                number, self.question_count
            )));
        }
        Ok(self.selection.insert(number, choice))
    }

    pub fn answered_count(&self) -> usize {
        self.selection.len()
    }

    /// Share of answered rows, in `[0, 1]`.
    pub fn completion_ratio(&self) -> f64 {
        self.answered_count() as f64 / self.question_count as f64
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn set_feedback(&mut self, message: impl Into<String>) {
        self.feedback = Some(message.into());
    }

    /// Drops every pick and any feedback message; the question count stays.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.feedback = None;
    }
}

/// Parameters a sheet is opened with. All optional.
///
/// Values arrive as query-string text or as JSON strings or numbers; they are
/// all kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetContext {
    #[serde(default, deserialize_with = "text_or_number")]
    pub count: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub test: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub cat: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub student: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }),
    )
}

impl SheetContext {
    /// Merges navigation state over query-string values, field by field.
    pub fn resolve(state: Option<SheetContext>, query: SheetContext) -> SheetContext {
        let Some(state) = state else {
            return query;
        };

        fn pick(state: Option<String>, query: Option<String>) -> Option<String> {
            state.filter(|v| !v.trim().is_empty()).or(query)
        }

        SheetContext {
            count: pick(state.count, query.count),
            test: pick(state.test, query.test),
            id: pick(state.id, query.id),
            cat: pick(state.cat, query.cat),
            grade: pick(state.grade, query.grade),
            link: pick(state.link, query.link),
            student: pick(state.student, query.student),
        }
    }

    pub fn question_count(&self) -> u32 {
        clamp_question_count(self.count.as_deref())
    }

    pub fn grade(&self) -> Option<i64> {
        self.grade.as_deref().and_then(|g| g.trim().parse().ok())
    }
}
