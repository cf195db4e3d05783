//! Learner profile and the closed set of specialty domains.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Study level assumed when the profile does not state one.
pub const DEFAULT_STUDY_LEVEL: &str = "Interne";

/// Output language for generated material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    French,
    English,
}

impl Language {
    /// `fr` maps to French; any other code maps to English.
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("fr") {
            Language::French
        } else {
            Language::English
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }

    /// Label used in the tutor instruction.
    pub fn instruction_label(&self) -> &'static str {
        match self {
            Language::French => "FRANÇAIS (French)",
            Language::English => "ANGLAIS (English)",
        }
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Language::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

/// Canonical specialty domains the tutor may be pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialty {
    Cardiology,
    Pulmonology,
    Emergency,
    Neurology,
    Gastroenterology,
    General,
}

impl Specialty {
    /// Maps a free-text specialty to the closed set by substring match,
    /// falling back to emergency medicine.
    pub fn from_free_text(raw: &str) -> Self {
        let s = raw.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| s.contains(n));

        if has(&["cardio", "cœur", "coeur"]) {
            Specialty::Cardiology
        } else if has(&["pneumo", "pulmo", "respir", "poumon"]) {
            Specialty::Pulmonology
        } else if has(&["gastro", "digest", "hépato", "hepato"]) {
            Specialty::Gastroenterology
        } else if has(&["neuro"]) {
            Specialty::Neurology
        } else if has(&["urgen", "emergen", "réa", "critical"]) {
            Specialty::Emergency
        } else if has(&["general", "générale", "generale"]) {
            Specialty::General
        } else {
            Specialty::Emergency
        }
    }

    /// Human label placed in the tutor instruction.
    pub fn label(&self) -> &'static str {
        match self {
            Specialty::Cardiology => "Cardiologie (Cœur, Vaisseaux)",
            Specialty::Pulmonology => "Pneumologie (Poumons, Respiration)",
            Specialty::Emergency => "Médecine d'Urgence (Soins critiques)",
            Specialty::Neurology => "Neurologie (Cerveau, Système nerveux)",
            Specialty::Gastroenterology => "Gastro-entérologie",
            Specialty::General => "Médecine Générale",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only learner profile used to condition quiz generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LearnerProfile {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub study_level: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
}

impl LearnerProfile {
    /// Declared study level, or [`DEFAULT_STUDY_LEVEL`].
    pub fn study_level(&self) -> &str {
        self.study_level
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_STUDY_LEVEL)
    }

    pub fn mapped_specialty(&self) -> Specialty {
        Specialty::from_free_text(self.specialty.as_deref().unwrap_or(""))
    }

    pub fn objectives_joined(&self) -> String {
        self.objectives.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod language {
        use super::*;

        #[test]
        fn only_fr_is_french() {
            assert_eq!(Language::from_code("fr"), Language::French);
            assert_eq!(Language::from_code("FR"), Language::French);
            assert_eq!(Language::from_code("en"), Language::English);
            assert_eq!(Language::from_code("es"), Language::English);
        }

        #[test]
        fn deserializes_from_code() {
            let profile: LearnerProfile = serde_json::from_str(r#"{"language":"en"}"#).unwrap();
            assert_eq!(profile.language, Language::English);
        }

        #[test]
        fn defaults_to_french() {
            let profile: LearnerProfile = serde_json::from_str("{}").unwrap();
            assert_eq!(profile.language, Language::French);
        }
    }

    mod specialty {
        use super::*;

        #[test]
        fn maps_known_tokens() {
            assert_eq!(Specialty::from_free_text("cardiology"), Specialty::Cardiology);
            assert_eq!(Specialty::from_free_text("Pneumologie"), Specialty::Pulmonology);
            assert_eq!(Specialty::from_free_text("pulmonology"), Specialty::Pulmonology);
            assert_eq!(Specialty::from_free_text("Gastro-entérologie"), Specialty::Gastroenterology);
            assert_eq!(Specialty::from_free_text("neurology"), Specialty::Neurology);
            assert_eq!(Specialty::from_free_text("emergency"), Specialty::Emergency);
            assert_eq!(Specialty::from_free_text("general"), Specialty::General);
        }

        #[test]
        fn unknown_falls_back_to_emergency() {
            assert_eq!(Specialty::from_free_text("dermatology"), Specialty::Emergency);
            assert_eq!(Specialty::from_free_text(""), Specialty::Emergency);
            assert!(Specialty::Emergency.label().contains("Urgence"));
        }
    }

    mod profile {
        use super::*;

        #[test]
        fn study_level_defaults_to_interne() {
            assert_eq!(LearnerProfile::default().study_level(), "Interne");
            let blank = LearnerProfile {
                study_level: Some("  ".to_string()),
                ..Default::default()
            };
            assert_eq!(blank.study_level(), "Interne");
        }

        #[test]
        fn objectives_are_comma_joined() {
            let profile = LearnerProfile {
                objectives: vec!["ECG".to_string(), "Dyspnée".to_string()],
                ..Default::default()
            };
            assert_eq!(profile.objectives_joined(), "ECG, Dyspnée");
        }
    }
}
