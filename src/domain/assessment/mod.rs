//! Assessment module - schemas for tutor output and their fallbacks.

mod evaluation;
mod quiz;
mod schema;

pub use evaluation::parse_evaluation;
pub use quiz::{parse_quiz, Quiz, QuizItem, QuizOptions, QUIZ_ITEM_COUNT};
pub use schema::SchemaError;
