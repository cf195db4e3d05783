//! Strict parsing of the tutor's RIME report.

use serde_json::{Map, Value};

use super::schema::{json_type, SchemaError};
use crate::domain::encounter::{validate_score, EncounterEvaluation, RimeAxis, RimeScores};

/// Validates a JSON value as a RIME report.
///
/// Requires `global_score`, `rime_details` with exactly the four axis keys,
/// and `feedback_text`. Every score must be a number within 0–100.
pub fn parse_evaluation(value: Value) -> Result<EncounterEvaluation, SchemaError> {
    let obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(SchemaError::WrongType {
                expected: "object",
                actual: json_type(&other),
            })
        }
    };

    let global_score = score_field(&obj, "global_score")?;

    let details = match obj.get("rime_details") {
        Some(Value::Object(details)) => details,
        Some(other) => {
            return Err(SchemaError::InvalidField {
                field: "rime_details".to_string(),
                reason: format!("expected object, got {}", json_type(other)),
            })
        }
        None => return Err(SchemaError::MissingField("rime_details")),
    };
    if details.len() != RimeAxis::ALL.len() {
        return Err(SchemaError::InvalidField {
            field: "rime_details".to_string(),
            reason: format!("expected exactly 4 keys, got {}", details.len()),
        });
    }

    let mut rime_details = RimeScores::zero();
    for axis in RimeAxis::ALL {
        rime_details.set(axis, score_field(details, axis.key())?);
    }

    let feedback_text = match obj.get("feedback_text") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            return Err(SchemaError::InvalidField {
                field: "feedback_text".to_string(),
                reason: format!("expected string, got {}", json_type(other)),
            })
        }
        None => return Err(SchemaError::MissingField("feedback_text")),
    };

    Ok(EncounterEvaluation {
        global_score,
        rime_details,
        feedback_text,
        degraded: false,
    })
}

fn score_field(obj: &Map<String, Value>, key: &'static str) -> Result<f64, SchemaError> {
    let raw = obj.get(key).ok_or(SchemaError::MissingField(key))?;
    let score = raw.as_f64().ok_or_else(|| SchemaError::InvalidField {
        field: key.to_string(),
        reason: format!("expected number, got {}", json_type(raw)),
    })?;
    validate_score(key, score).map_err(|e| SchemaError::InvalidField {
        field: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> Value {
        json!({
            "global_score": 75,
            "rime_details": {"R": 80, "I": 60, "M": 70, "E": 90},
            "feedback_text": "Bonne anamnèse, pense à l'ECG."
        })
    }

    #[test]
    fn accepts_well_formed_report() {
        let evaluation = parse_evaluation(report()).unwrap();
        assert_eq!(evaluation.global_score, 75.0);
        assert_eq!(evaluation.rime_details.get(RimeAxis::Interpreter), 60.0);
        assert_eq!(evaluation.rime_details.get(RimeAxis::Educator), 90.0);
        assert!(!evaluation.degraded);
    }

    #[test]
    fn accepts_fractional_scores() {
        let mut value = report();
        value["global_score"] = json!(72.5);
        assert_eq!(parse_evaluation(value).unwrap().global_score, 72.5);
    }

    #[test]
    fn rejects_missing_axis() {
        let mut value = report();
        value["rime_details"] = json!({"R": 80, "I": 60, "M": 70});
        assert!(parse_evaluation(value).is_err());
    }

    #[test]
    fn rejects_extra_axis_key() {
        let mut value = report();
        value["rime_details"]["X"] = json!(10);
        assert!(parse_evaluation(value).is_err());
    }

    #[test]
    fn rejects_renamed_axis_key() {
        let mut value = report();
        value["rime_details"] = json!({"R": 80, "I": 60, "M": 70, "Educator": 90});
        assert_eq!(
            parse_evaluation(value),
            Err(SchemaError::MissingField("E"))
        );
    }

    #[test]
    fn rejects_out_of_range_score() {
        let mut value = report();
        value["global_score"] = json!(140);
        assert!(parse_evaluation(value).is_err());
    }

    #[test]
    fn rejects_string_score() {
        let mut value = report();
        value["rime_details"]["M"] = json!("70");
        assert!(parse_evaluation(value).is_err());
    }

    #[test]
    fn rejects_missing_feedback() {
        let mut value = report();
        value.as_object_mut().unwrap().remove("feedback_text");
        assert_eq!(
            parse_evaluation(value),
            Err(SchemaError::MissingField("feedback_text"))
        );
    }

    #[test]
    fn rejects_list() {
        assert!(matches!(
            parse_evaluation(json!([1, 2])),
            Err(SchemaError::WrongType { expected: "object", .. })
        ));
    }
}
