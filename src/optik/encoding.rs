// src/optik/encoding.rs

//! The three stored forms of a filled sheet.

use serde::Serialize;

use super::sheet::{Choice, SelectionState};

/// Marks an unanswered row in the concatenated form.
pub const PLACEHOLDER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetEncoding {
    /// One character per question, `-` where unanswered.
    pub answers: String,
    /// The same characters as a sequence.
    pub answers_array: Vec<String>,
    /// The selection itself.
    pub answers_map: SelectionState,
    pub answered_count: usize,
}

impl SheetEncoding {
    /// Encodes `selection` over questions `1..=question_count`. Picks outside
    /// that range are not carried into any of the three forms.
    pub fn encode(selection: &SelectionState, question_count: u32) -> Self {
        let answers: String = (1..=question_count)
            .map(|n| selection.get(n).map_or(PLACEHOLDER, Choice::as_char))
            .collect();

        let answers_array = answers.chars().map(String::from).collect();

        let answers_map: SelectionState = selection
            .iter()
            .filter(|(n, _)| (1..=question_count).contains(n))
            .collect();

        Self {
            answered_count: answers_map.len(),
            answers,
            answers_array,
            answers_map,
        }
    }
}

/// Rebuilds the selection from the concatenated form; `-` (or anything that is
/// not A-D) reads as unanswered.
pub fn selection_from_answers(answers: &str) -> SelectionState {
    answers
        .chars()
        .zip(1u32..)
        .filter_map(|(c, n)| Choice::from_char(c).map(|choice| (n, choice)))
        .collect()
}
