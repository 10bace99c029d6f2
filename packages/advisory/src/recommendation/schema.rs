use jsonschema::Validator;
use serde_json::Value;

use crate::error::{AdvisoryError, Result};

const SCHEMA_JSON: &str = include_str!("../../schema/recommendation.json");

/// Validates model output against the recommendation result JSON schema.
pub struct OutputValidator {
    validator: Validator,
}

impl OutputValidator {
    pub fn new() -> Result<Self> {
        let schema: Value = serde_json::from_str(SCHEMA_JSON)
            .map_err(|e| AdvisoryError::SchemaLoad(e.to_string()))?;

        let validator = Validator::new(&schema)
            .map_err(|e| AdvisoryError::SchemaLoad(format!("failed to compile schema: {e}")))?;

        Ok(Self { validator })
    }

    /// Validate a recommendation JSON value against the schema.
    ///
    /// Returns `Ok(())` if valid, or `Err(SchemaValidation)` with a list of errors.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path().to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AdvisoryError::SchemaValidation { errors })
        }
    }
}
