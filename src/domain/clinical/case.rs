//! Clinical case documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::CaseId;

/// Ground-truth document handed verbatim to the models.
///
/// The few keys the core reads are typed; everything else rides along in
/// `payload` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseContent {
    /// Confirmed diagnosis, when the case records one.
    #[serde(rename = "diagnosticNom", default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl CaseContent {
    /// Builds content from an arbitrary JSON document.
    ///
    /// Non-object documents are kept under a single `document` key so that
    /// nothing is lost.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                serde_json::from_value(Value::Object(map.clone())).unwrap_or(Self {
                    diagnosis: None,
                    payload: map,
                })
            }
            other => {
                let mut payload = Map::new();
                payload.insert("document".to_string(), other);
                Self {
                    diagnosis: None,
                    payload,
                }
            }
        }
    }

    /// The document as JSON, as given to the model.
    pub fn to_value(&self) -> Value {
        let mut map = self.payload.clone();
        if let Some(diagnosis) = &self.diagnosis {
            map.insert("diagnosticNom".to_string(), Value::String(diagnosis.clone()));
        }
        Value::Object(map)
    }

    /// Indented rendering used inside the patient persona instruction.
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Compact rendering used inside the evaluation rubric.
    pub fn to_compact_string(&self) -> String {
        self.to_value().to_string()
    }
}

/// A case in the catalog: display metadata plus its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalCase {
    pub id: CaseId,
    pub title: String,
    pub specialty: String,
    pub content: CaseContent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_and_opaque_keys_survive_roundtrip() {
        let doc = json!({
            "diagnosticNom": "Pneumothorax",
            "sexe": "M",
            "parametresVitaux": {"FC": "110"}
        });
        let content = CaseContent::from_value(doc.clone());
        assert_eq!(content.diagnosis.as_deref(), Some("Pneumothorax"));
        assert_eq!(content.payload["sexe"], "M");
        assert_eq!(content.to_value(), doc);
    }

    #[test]
    fn non_string_diagnosis_stays_opaque() {
        let doc = json!({"diagnosticNom": {"code": "J93"}});
        let content = CaseContent::from_value(doc.clone());
        assert!(content.diagnosis.is_none());
        assert_eq!(content.to_value(), doc);
    }

    #[test]
    fn scalar_document_is_wrapped() {
        let content = CaseContent::from_value(json!("douleur thoracique"));
        assert_eq!(content.to_value(), json!({"document": "douleur thoracique"}));
    }

    #[test]
    fn pretty_rendering_keeps_accents() {
        let content = CaseContent::from_value(json!({"contexteVrai": "Fièvre élevée"}));
        assert!(content.to_pretty_string().contains("Fièvre élevée"));
    }
}
