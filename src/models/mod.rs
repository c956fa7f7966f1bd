// src/models/mod.rs

pub mod catalog;
pub mod category;
pub mod exam;
pub mod slide;
pub mod submission;
pub mod test_record;
pub mod user;
