//! EncounterEvaluator - RIME scoring of a finished encounter.
//!
//! Renders the rubric from the case ground truth, the transcript and the
//! action log, asks the model for a strict JSON report at low temperature
//! and validates it. Any failure yields the all-zero fallback report, so
//! closing an encounter never blocks on the model.

use std::sync::Arc;

use super::TutorFailure;
use crate::domain::assessment::parse_evaluation;
use crate::domain::clinical::CaseContent;
use crate::domain::conversation::{
    evaluation_instruction, extract_json, ContentBlock, EVALUATION_TRIGGER,
};
use crate::domain::encounter::{EncounterEvaluation, RecordedAction, Turn};
use crate::ports::{AIProvider, GenerationParams, GenerationRequest};

/// Scores encounters through the tutor model.
pub struct EncounterEvaluator {
    ai_provider: Arc<dyn AIProvider>,
}

impl EncounterEvaluator {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    /// Evaluates an encounter. Never fails: degrades to
    /// [`EncounterEvaluation::fallback`].
    pub async fn evaluate(
        &self,
        case: &CaseContent,
        transcript: &[Turn],
        actions: &[RecordedAction],
    ) -> EncounterEvaluation {
        match self.try_evaluate(case, transcript, actions).await {
            Ok(evaluation) => evaluation,
            Err(failure) => {
                tracing::error!(error = %failure, "evaluation failed, using zero report");
                EncounterEvaluation::fallback()
            }
        }
    }

    /// The evaluation without the fallback, for callers that need the cause.
    pub async fn try_evaluate(
        &self,
        case: &CaseContent,
        transcript: &[Turn],
        actions: &[RecordedAction],
    ) -> Result<EncounterEvaluation, TutorFailure> {
        let request = GenerationRequest::new(evaluation_instruction(case, transcript, actions))
            .with_block(ContentBlock::requester(EVALUATION_TRIGGER))
            .with_params(GenerationParams::evaluation());

        let response = self.ai_provider.generate(request).await?;
        tracing::debug!(raw = %response.text, "evaluation model output");

        let value = extract_json(&response.text)?;
        Ok(parse_evaluation(value)?)
    }
}
