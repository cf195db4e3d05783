//! RIME competency scoring (Reporter, Interpreter, Manager, Educator).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Lowest score on any axis or in aggregate.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score on any axis or in aggregate.
pub const MAX_SCORE: f64 = 100.0;

/// Key under which the feedback text is stored alongside the axis scores.
pub const FEEDBACK_KEY: &str = "feedback";

/// Feedback attached to the all-zero report when the tutor model fails.
pub const FALLBACK_FEEDBACK: &str =
    "Erreur lors de la génération du rapport par le Tuteur. Veuillez contacter l'administrateur.";

/// One of the four fixed competency axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RimeAxis {
    /// History-taking completeness.
    Reporter,
    /// Appropriateness of the requested work-up.
    Interpreter,
    /// Correctness of final diagnosis and treatment.
    Manager,
    /// Communication quality.
    Educator,
}

impl RimeAxis {
    pub const ALL: [RimeAxis; 4] = [
        RimeAxis::Reporter,
        RimeAxis::Interpreter,
        RimeAxis::Manager,
        RimeAxis::Educator,
    ];

    /// Single-letter key used in model output and persistence.
    pub fn key(&self) -> &'static str {
        match self {
            RimeAxis::Reporter => "R",
            RimeAxis::Interpreter => "I",
            RimeAxis::Manager => "M",
            RimeAxis::Educator => "E",
        }
    }
}

impl fmt::Display for RimeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RimeAxis::Reporter => "Reporter",
            RimeAxis::Interpreter => "Interpreter",
            RimeAxis::Manager => "Manager",
            RimeAxis::Educator => "Educator",
        };
        f.write_str(s)
    }
}

/// Per-axis scores, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RimeScores {
    #[serde(rename = "R")]
    pub reporter: f64,
    #[serde(rename = "I")]
    pub interpreter: f64,
    #[serde(rename = "M")]
    pub manager: f64,
    #[serde(rename = "E")]
    pub educator: f64,
}

impl RimeScores {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: RimeAxis) -> f64 {
        match axis {
            RimeAxis::Reporter => self.reporter,
            RimeAxis::Interpreter => self.interpreter,
            RimeAxis::Manager => self.manager,
            RimeAxis::Educator => self.educator,
        }
    }

    pub fn set(&mut self, axis: RimeAxis, score: f64) {
        match axis {
            RimeAxis::Reporter => self.reporter = score,
            RimeAxis::Interpreter => self.interpreter = score,
            RimeAxis::Manager => self.manager = score,
            RimeAxis::Educator => self.educator = score,
        }
    }

    /// Rejects any axis outside 0–100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for axis in RimeAxis::ALL {
            validate_score(axis.key(), self.get(axis))?;
        }
        Ok(())
    }
}

/// Checks a single score lies within 0–100 and is finite.
pub fn validate_score(field: &str, score: f64) -> Result<(), ValidationError> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, MIN_SCORE, MAX_SCORE, score))
    }
}

/// Persisted per-axis mapping: the four axis keys plus the feedback text
/// under [`FEEDBACK_KEY`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RimeDetails {
    #[serde(flatten)]
    pub scores: RimeScores,
    #[serde(rename = "feedback", default)]
    pub feedback: String,
}

/// Result of the tutor's end-of-encounter assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterEvaluation {
    pub global_score: f64,
    pub rime_details: RimeScores,
    pub feedback_text: String,
    /// True when the model could not produce a valid report and the
    /// all-zero fallback was substituted.
    #[serde(default)]
    pub degraded: bool,
}

impl EncounterEvaluation {
    /// The deterministic all-zero report.
    pub fn fallback() -> Self {
        Self {
            global_score: 0.0,
            rime_details: RimeScores::zero(),
            feedback_text: FALLBACK_FEEDBACK.to_string(),
            degraded: true,
        }
    }

    /// Mapping persisted on the closed encounter.
    pub fn to_details(&self) -> RimeDetails {
        RimeDetails {
            scores: self.rime_details,
            feedback: self.feedback_text.clone(),
        }
    }
}

/// Mastery label shown in encounter history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasteryLevel {
    #[serde(rename = "ACQUISE")]
    Acquired,
    #[serde(rename = "PARTIELLE")]
    Partial,
    #[serde(rename = "NON MAÎTRISE")]
    NotMastered,
}

impl MasteryLevel {
    /// ≥ 80 is acquired, ≥ 50 partial, anything lower not mastered.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MasteryLevel::Acquired
        } else if score >= 50.0 {
            MasteryLevel::Partial
        } else {
            MasteryLevel::NotMastered
        }
    }
}
