//! GenerateAssessmentHandler - adaptive placement quiz.
//!
//! The quiz is conditioned on the learner's profile: output language,
//! specialty domain, study level and objectives. Generation is best-effort:
//! any model, extraction or schema failure returns the static fallback quiz,
//! flagged as degraded.

use std::sync::Arc;

use crate::domain::assessment::{parse_quiz, Quiz, QUIZ_ITEM_COUNT};
use crate::domain::clinical::LearnerProfile;
use crate::domain::conversation::{extract_json, quiz_instruction, ContentBlock, QUIZ_TRIGGER};
use crate::domain::foundation::UserId;
use crate::ports::{AIProvider, GenerationParams, GenerationRequest, LearnerProfileReader};

use super::TutorFailure;

/// Request a quiz for the given learner.
#[derive(Debug, Clone)]
pub struct GenerateAssessmentCommand {
    pub user_id: UserId,
}

impl GenerateAssessmentCommand {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Handler for quiz generation.
pub struct GenerateAssessmentHandler {
    profile_reader: Arc<dyn LearnerProfileReader>,
    ai_provider: Arc<dyn AIProvider>,
}

impl GenerateAssessmentHandler {
    pub fn new(
        profile_reader: Arc<dyn LearnerProfileReader>,
        ai_provider: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            profile_reader,
            ai_provider,
        }
    }

    /// Looks up the learner's profile and generates a quiz from it.
    ///
    /// A missing or unreadable profile falls back to the default profile
    /// (French, "Interne", emergency medicine).
    pub async fn handle(&self, cmd: GenerateAssessmentCommand) -> Quiz {
        let profile = match self.profile_reader.get_learner_profile(&cmd.user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => LearnerProfile::default(),
            Err(error) => {
                tracing::warn!(user_id = %cmd.user_id, error = %error, "profile unavailable, using defaults");
                LearnerProfile::default()
            }
        };
        self.generate(&profile).await
    }

    /// Generates a quiz for an explicit profile. Never fails.
    pub async fn generate(&self, profile: &LearnerProfile) -> Quiz {
        match self.try_generate(profile).await {
            Ok(quiz) => quiz,
            Err(failure) => {
                tracing::warn!(error = %failure, "quiz generation failed, serving fallback");
                Quiz::fallback()
            }
        }
    }

    async fn try_generate(&self, profile: &LearnerProfile) -> Result<Quiz, TutorFailure> {
        let request = GenerationRequest::new(quiz_instruction(profile, QUIZ_ITEM_COUNT))
            .with_block(ContentBlock::requester(QUIZ_TRIGGER))
            .with_params(GenerationParams::quiz());

        let response = self.ai_provider.generate(request).await?;
        tracing::debug!(raw = %response.text, "quiz model output");

        let value = extract_json(&response.text)?;
        Ok(parse_quiz(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::memory::InMemoryProfileReader;
    use crate::domain::clinical::Language;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::{AIError, ResponseFormat};
    use async_trait::async_trait;
    use serde_json::json;

    fn learner() -> UserId {
        UserId::new("learner-1").unwrap()
    }

    fn item(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "category": "Diagnostic",
            "question": "Quel examen en première intention ?",
            "options": {"a": "ECG", "b": "Scanner", "c": "IRM", "d": "Radio"},
            "correct_answer": "a",
            "explanation": "L'ECG est immédiat."
        })
    }

    struct BrokenProfileReader;

    #[async_trait]
    impl LearnerProfileReader for BrokenProfileReader {
        async fn get_learner_profile(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<LearnerProfile>, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "connection refused"))
        }
    }

    fn handler(
        reader: impl LearnerProfileReader + 'static,
        ai: Arc<MockAIProvider>,
    ) -> GenerateAssessmentHandler {
        GenerateAssessmentHandler::new(Arc::new(reader), ai)
    }

    mod profile_conditioning {
        use super::*;

        #[tokio::test]
        async fn english_profile_pins_language_and_specialty() {
            // Given: an English-speaking cardiology resident
            let reader = InMemoryProfileReader::new().with_profile(
                learner(),
                LearnerProfile {
                    language: Language::English,
                    study_level: Some("Résident".to_string()),
                    specialty: Some("Cardiologie interventionnelle".to_string()),
                    objectives: vec!["ECG".to_string(), "SCA".to_string()],
                },
            );
            let ai = Arc::new(MockAIProvider::new().with_response(json!([item("q1")]).to_string()));
            let handler = handler(reader, ai.clone());

            // When
            handler.handle(GenerateAssessmentCommand::new(learner())).await;

            // Then: the instruction carries every profile field
            let request = &ai.get_calls()[0];
            assert!(request.system_instruction.contains("ANGLAIS (English)"));
            assert!(request.system_instruction.contains("Cardiologie"));
            assert!(request.system_instruction.contains("Résident"));
            assert!(request.system_instruction.contains("ECG, SCA"));
            assert!(request.system_instruction.contains("15 questions"));
            assert_eq!(request.blocks[0].text, QUIZ_TRIGGER);
            assert_eq!(request.params.temperature, 0.5);
            assert_eq!(request.params.response_format, ResponseFormat::Json);
        }

        #[tokio::test]
        async fn missing_profile_uses_defaults() {
            let ai = Arc::new(MockAIProvider::new().with_response(json!([item("q1")]).to_string()));
            let handler = handler(InMemoryProfileReader::new(), ai.clone());

            handler.handle(GenerateAssessmentCommand::new(learner())).await;

            let request = &ai.get_calls()[0];
            assert!(request.system_instruction.contains("FRANÇAIS (French)"));
            assert!(request.system_instruction.contains("Interne"));
        }

        #[tokio::test]
        async fn unreadable_profile_still_generates() {
            let ai = Arc::new(MockAIProvider::new().with_response(json!([item("q1")]).to_string()));
            let handler = handler(BrokenProfileReader, ai.clone());

            let quiz = handler.handle(GenerateAssessmentCommand::new(learner())).await;

            assert!(!quiz.degraded);
            assert_eq!(ai.call_count(), 1);
        }
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn returns_generated_items() {
            let raw = json!([item("q1"), item("q2"), item("q3")]).to_string();
            let ai = Arc::new(MockAIProvider::new().with_response(raw));
            let handler = handler(InMemoryProfileReader::new(), ai);

            let quiz = handler.generate(&LearnerProfile::default()).await;

            assert!(!quiz.degraded);
            assert_eq!(quiz.items.len(), 3);
        }

        #[tokio::test]
        async fn array_embedded_in_prose_is_recovered() {
            let raw = format!("Voici le test : {} Bonne chance !", json!([item("q1")]));
            let ai = Arc::new(MockAIProvider::new().with_response(raw));
            let handler = handler(InMemoryProfileReader::new(), ai);

            let quiz = handler.generate(&LearnerProfile::default()).await;
            assert!(!quiz.degraded);
        }
    }

    mod fallback {
        use super::*;

        #[tokio::test]
        async fn model_failure_serves_fallback() {
            let ai = Arc::new(MockAIProvider::new().failing_with(AIError::AuthenticationFailed));
            let handler = handler(InMemoryProfileReader::new(), ai);

            let quiz = handler.generate(&LearnerProfile::default()).await;
            assert_eq!(quiz, Quiz::fallback());
        }

        #[tokio::test]
        async fn object_instead_of_list_serves_fallback() {
            let ai = Arc::new(MockAIProvider::new().with_response(item("q1").to_string()));
            let handler = handler(InMemoryProfileReader::new(), ai);

            let quiz = handler.generate(&LearnerProfile::default()).await;
            assert!(quiz.degraded);
            assert_eq!(quiz.items.len(), 1);
        }

        #[tokio::test]
        async fn empty_list_serves_fallback() {
            let ai = Arc::new(MockAIProvider::new().with_response("[]"));
            let handler = handler(InMemoryProfileReader::new(), ai);

            let quiz = handler.generate(&LearnerProfile::default()).await;
            assert!(quiz.degraded);
        }
    }
}
