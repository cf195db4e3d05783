//! Adaptive placement quiz: item schema, validation and the static fallback.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{json_type, SchemaError};

/// Number of items requested from the tutor.
pub const QUIZ_ITEM_COUNT: usize = 15;

/// The four labelled answer options of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuizOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl QuizOptions {
    pub fn has_label(&self, label: &str) -> bool {
        matches!(label, "a" | "b" | "c" | "d")
    }

    fn labelled(&self) -> [(&'static str, &str); 4] {
        [
            ("a", self.a.as_str()),
            ("b", self.b.as_str()),
            ("c", self.c.as_str()),
            ("d", self.d.as_str()),
        ]
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: String,
    pub category: String,
    pub question: String,
    pub options: QuizOptions,
    pub correct_answer: String,
    pub explanation: String,
}

impl QuizItem {
    fn check(&self) -> Result<(), String> {
        let fields = [
            ("id", &self.id),
            ("category", &self.category),
            ("question", &self.question),
            ("explanation", &self.explanation),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("empty {}", name));
        }
        if let Some((label, _)) = self
            .options
            .labelled()
            .into_iter()
            .find(|(_, text)| text.trim().is_empty())
        {
            return Err(format!("empty option {}", label));
        }
        if !self.options.has_label(&self.correct_answer) {
            return Err(format!(
                "correct_answer '{}' is not one of a, b, c, d",
                self.correct_answer
            ));
        }
        Ok(())
    }
}

/// A generated quiz. `degraded` marks the static fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub items: Vec<QuizItem>,
    pub degraded: bool,
}

impl Quiz {
    /// Deterministic single-item quiz returned when generation fails.
    pub fn fallback() -> Self {
        Self {
            items: vec![QuizItem {
                id: "q1".to_string(),
                category: "Général".to_string(),
                question: "Erreur de Tuteur pour vous proposer le test. Quelle est la conduite à tenir ?"
                    .to_string(),
                options: QuizOptions {
                    a: "Réessayer".to_string(),
                    b: "Attendre".to_string(),
                    c: "Abandonner le test".to_string(),
                    d: "Contacter l'administrateur".to_string(),
                },
                correct_answer: "a".to_string(),
                explanation: "Le générateur de questions est momentanément indisponible.".to_string(),
            }],
            degraded: true,
        }
    }
}

/// Validates an extracted JSON value as a non-empty list of well-formed items.
pub fn parse_quiz(value: Value) -> Result<Quiz, SchemaError> {
    let raw_items = match value {
        Value::Array(raw_items) => raw_items,
        other => {
            return Err(SchemaError::WrongType {
                expected: "array",
                actual: json_type(&other),
            })
        }
    };
    if raw_items.is_empty() {
        return Err(SchemaError::Empty);
    }

    let items = raw_items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let item: QuizItem = serde_json::from_value(raw)
                .map_err(|e| SchemaError::InvalidItem { index, reason: e.to_string() })?;
            item.check()
                .map_err(|reason| SchemaError::InvalidItem { index, reason })?;
            Ok(item)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Quiz {
        items,
        degraded: false,
    })
}
