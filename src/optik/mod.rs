// src/optik/mod.rs

//! Optical answer sheets: answer-key grammars, the sheet model, the stored
//! encodings and the recorder that persists finished sheets.

pub mod answer_key;
pub mod encoding;
pub mod recorder;
pub mod sheet;
pub mod store;
