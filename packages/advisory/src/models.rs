use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdvisoryError, Result};

/// Needs assessment length bounds, matching the intake form contract.
pub const NEEDS_ASSESSMENT_MIN: usize = 20;
pub const NEEDS_ASSESSMENT_MAX: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hospital_size", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HospitalSize {
    Small,
    Medium,
    Large,
}

impl HospitalSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ar_mr_experience", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArMrExperience {
    None,
    Some,
    Extensive,
}

impl ArMrExperience {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Some => "some",
            Self::Extensive => "extensive",
        }
    }
}

/// A hospital needs-assessment submission. Immutable once created;
/// consumed exactly once by the recommendation requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalProfile {
    pub hospital_name: String,
    pub hospital_size: HospitalSize,
    pub specialties: String,
    pub ar_mr_experience: ArMrExperience,
    pub needs_assessment: String,
}

impl HospitalProfile {
    /// Validate field constraints, collecting every violation.
    ///
    /// Enum membership is enforced by the type system at the deserialization
    /// boundary; this checks the free-text bounds.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let name = self.hospital_name.trim();
        if name.is_empty() {
            errors.push("hospitalName: hospital name is required".to_string());
        } else if name.chars().count() < 2 {
            errors.push("hospitalName: hospital name must be at least 2 characters".to_string());
        }

        let specialties = self.specialties.trim();
        if specialties.is_empty() {
            errors.push("specialties: medical specialties are required".to_string());
        } else if specialties.chars().count() < 5 {
            errors.push(
                "specialties: please list at least one specialty (min 5 characters)".to_string(),
            );
        }

        let needs = self.needs_assessment.trim();
        let needs_len = needs.chars().count();
        if needs.is_empty() {
            errors.push("needsAssessment: needs assessment is required".to_string());
        } else if needs_len < NEEDS_ASSESSMENT_MIN {
            errors.push(format!(
                "needsAssessment: needs assessment must be at least {NEEDS_ASSESSMENT_MIN} characters long"
            ));
        } else if needs_len > NEEDS_ASSESSMENT_MAX {
            errors.push(format!(
                "needsAssessment: needs assessment cannot exceed {NEEDS_ASSESSMENT_MAX} characters"
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AdvisoryError::InvalidProfile { errors })
        }
    }
}

/// AI-generated recommendation set for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub roadmap: String,
}

/// A persisted diagnostic submission.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Diagnostic {
    pub id: Uuid,
    pub user_id: String,
    pub hospital_name: String,
    pub hospital_size: HospitalSize,
    pub specialties: String,
    pub ar_mr_experience: ArMrExperience,
    pub needs_assessment: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted recommendation, linked to exactly one diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecommendationRecord {
    pub id: Uuid,
    pub diagnostic_id: Uuid,
    pub summary: String,
    pub recommendations: serde_json::Value,
    pub roadmap: String,
    pub created_at: DateTime<Utc>,
}

/// Identifiers returned after a successful store.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoredSubmission {
    pub diagnostic_id: Uuid,
    pub recommendation_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile() -> HospitalProfile {
        HospitalProfile {
            hospital_name: "City General Hospital".into(),
            hospital_size: HospitalSize::Medium,
            specialties: "cardiology, oncology".into(),
            ar_mr_experience: ArMrExperience::Some,
            needs_assessment: "We want to improve surgical planning with AR overlays.".into(),
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(valid_profile().validate().is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        let mut profile = valid_profile();
        profile.hospital_name = "  ".into();
        let err = profile.validate().expect_err("should fail");
        assert!(err.to_string().contains("hospitalName"));
    }

    #[test]
    fn short_needs_assessment_rejected() {
        let mut profile = valid_profile();
        profile.needs_assessment = "too short".into();
        let err = profile.validate().expect_err("should fail");
        assert!(err.to_string().contains("at least 20 characters"));
    }

    #[test]
    fn long_needs_assessment_rejected() {
        let mut profile = valid_profile();
        profile.needs_assessment = "x".repeat(NEEDS_ASSESSMENT_MAX + 1);
        let err = profile.validate().expect_err("should fail");
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn multiple_violations_all_reported() {
        let profile = HospitalProfile {
            hospital_name: String::new(),
            hospital_size: HospitalSize::Small,
            specialties: "ent".into(),
            ar_mr_experience: ArMrExperience::None,
            needs_assessment: "short".into(),
        };
        match profile.validate() {
            Err(AdvisoryError::InvalidProfile { errors }) => assert_eq!(errors.len(), 3),
            other => panic!("expected InvalidProfile, got {other:?}"),
        }
    }

    #[test]
    fn profile_uses_camel_case_wire_format() {
        let json = serde_json::to_value(valid_profile()).expect("serialize");
        assert!(json.get("hospitalName").is_some());
        assert!(json.get("arMrExperience").is_some());
        assert_eq!(json["hospitalSize"], "medium");
    }

    #[test]
    fn unknown_enum_variant_rejected_on_deserialize() {
        let json = r#"{
            "hospitalName": "Test",
            "hospitalSize": "gigantic",
            "specialties": "cardiology",
            "arMrExperience": "none",
            "needsAssessment": "A needs assessment of sufficient length."
        }"#;
        assert!(serde_json::from_str::<HospitalProfile>(json).is_err());
    }
}
