// src/utils/text.rs

//! Name handling for students: Turkish-aware casing, accent folding and the
//! derivation of the normalized student key that groups submissions.

use std::str::FromStr;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::config::PARTITION_KEY_MAX_LEN;

/// Lower/upper-casing rules applied to student keys and display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Casing {
    /// Turkish rules: `I ↔ ı`, `İ ↔ i`.
    #[default]
    Turkish,
    /// Plain Unicode case mapping.
    Invariant,
}

impl FromStr for Casing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tr" | "tr-tr" | "turkish" => Ok(Casing::Turkish),
            "invariant" | "none" | "en" => Ok(Casing::Invariant),
            other => Err(format!("unknown casing '{}'", other)),
        }
    }
}

impl Casing {
    pub fn lower(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match (self, c) {
                (Casing::Turkish, 'I') => out.push('ı'),
                (Casing::Turkish, 'İ') => out.push('i'),
                _ => out.extend(c.to_lowercase()),
            }
        }
        out
    }

    pub fn upper(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match (self, c) {
                (Casing::Turkish, 'i') => out.push('İ'),
                (Casing::Turkish, 'ı') => out.push('I'),
                _ => out.extend(c.to_uppercase()),
            }
        }
        out
    }

    /// Capitalizes every word and every hyphen-separated part of a word.
    pub fn title(self, s: &str) -> String {
        s.split_whitespace()
            .map(|word| {
                word.split('-')
                    .map(|part| {
                        let mut chars = part.chars();
                        match chars.next() {
                            Some(first) => {
                                let head = self.upper(&first.to_string());
                                let tail = self.lower(chars.as_str());
                                head + &tail
                            }
                            None => String::new(),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Letters without a canonical decomposition, mapped to their base Latin form.
fn fold_letter(c: char) -> Option<&'static str> {
    Some(match c {
        'ı' | 'İ' => "i",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        _ => return None,
    })
}

/// Reduces accented letters to their base Latin letters.
pub fn strip_accents(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for c in s.chars() {
        match fold_letter(c) {
            Some(base) => folded.push_str(base),
            None => folded.push(c),
        }
    }

    folded.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Derives the student key from a display name.
///
/// Accents are stripped, every run of characters outside `[A-Za-z0-9]` becomes
/// one `_`, edge underscores are trimmed, the result is cut to
/// [`PARTITION_KEY_MAX_LEN`] characters and lower-cased with `casing`.
pub fn partition_key(display_name: &str, casing: Casing) -> String {
    let stripped = strip_accents(display_name);

    let mut collapsed = String::with_capacity(stripped.len());
    let mut in_gap = false;
    for c in stripped.chars() {
        if c.is_ascii_alphanumeric() {
            collapsed.push(c);
            in_gap = false;
        } else if !in_gap {
            collapsed.push('_');
            in_gap = true;
        }
    }

    let truncated: String = collapsed
        .trim_matches('_')
        .chars()
        .take(PARTITION_KEY_MAX_LEN)
        .collect();

    casing.lower(&truncated)
}

/// A student key together with the key derived from the profile name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentKey {
    pub key: String,
    pub derived: String,
}

impl StudentKey {
    /// True when a precomputed key replaced the one the name yields.
    pub fn is_foreign(&self) -> bool {
        self.key != self.derived
    }
}

/// Picks the student key: a non-empty precomputed key wins (lower-cased only),
/// otherwise the key is derived from the display name.
pub fn resolve_student_key(
    precomputed: Option<&str>,
    display_name: &str,
    casing: Casing,
) -> StudentKey {
    let derived = partition_key(display_name, casing);
    let key = match precomputed.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => casing.lower(key),
        None => derived.clone(),
    };
    StudentKey { key, derived }
}

/// Trims a free-text profile field; literal "undefined"/"null" count as empty.
pub fn clean_field(s: &str) -> &str {
    let t = s.trim();
    if t == "undefined" || t == "null" { "" } else { t }
}

/// Builds "First Last" from profile fields, falling back to the local part
/// of the e-mail address.
pub fn display_name(first_name: &str, last_name: &str, email: &str, casing: Casing) -> String {
    let first = casing.title(clean_field(first_name));
    let last = casing.title(clean_field(last_name));
    let full = format!("{} {}", first, last).trim().to_string();

    if !full.is_empty() {
        return full;
    }

    match email.split('@').next().map(str::trim) {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => "unknown".to_string(),
    }
}
