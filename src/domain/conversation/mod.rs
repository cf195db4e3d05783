//! Conversation module - pure functions that shape model requests and
//! recover structure from model responses.

mod blocks;
mod extractor;
mod formatter;
mod prompts;

pub use blocks::{BlockRole, ContentBlock};
pub use extractor::{extract_json, ExtractionError};
pub use formatter::{block_role, coalesce, format_turns};
pub use prompts::{
    evaluation_instruction, patient_instruction, quiz_instruction, render_actions,
    render_transcript, EVALUATION_TRIGGER, QUIZ_TRIGGER,
};
