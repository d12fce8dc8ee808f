//! JSON Schema validation for analysis policies.
//!
//! Policies are validated against `schema/policy.schema.json`, embedded at
//! compile time and compiled once.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

const POLICY_SCHEMA_JSON: &str = include_str!("../../schema/policy.schema.json");

static POLICY_VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

/// The compiled policy schema, or why it could not be built.
fn policy_validator() -> Result<&'static Validator, String> {
    POLICY_VALIDATOR
        .get_or_init(|| {
            let schema: Value = serde_json::from_str(POLICY_SCHEMA_JSON)
                .map_err(|e| format!("Invalid policy schema JSON: {}", e))?;
            jsonschema::validator_for(&schema)
                .map_err(|e| format!("Failed to compile policy schema: {}", e))
        })
        .as_ref()
        .map_err(String::clone)
}

/// Validate a policy JSON value against the schema.
///
/// Returns every violation as "<message> at <instance path>".
pub fn validate_policy_schema(policy_json: &Value) -> Result<(), Vec<String>> {
    let validator = policy_validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(policy_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schema_compiles() {
        assert!(policy_validator().is_ok());
    }

    #[test]
    fn test_empty_policy_is_valid() {
        assert!(validate_policy_schema(&serde_json::json!({})).is_ok());
    }

    #[test]
    fn test_full_policy_is_valid() {
        let value = serde_json::json!({
            "document_tolerance_secs": 120,
            "future_date_key_markers": ["date", "created"],
            "generic_values": {
                "author": ["admin"],
                "title": ["untitled"]
            },
            "scoring": {
                "weights": { "high": 5, "medium": 2, "low": 1 },
                "suspicious_threshold": 6,
                "caution_threshold": 2
            }
        });
        assert!(validate_policy_schema(&value).is_ok());
    }

    #[test]
    fn test_unknown_key_fails() {
        let result = validate_policy_schema(&serde_json::json!({ "tolerance": 10 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_tolerance_fails() {
        let value = serde_json::json!({ "document_tolerance_secs": -1 });
        let errors = validate_policy_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_empty_marker_fails() {
        let value = serde_json::json!({ "future_date_key_markers": [""] });
        assert!(validate_policy_schema(&value).is_err());
    }
}
