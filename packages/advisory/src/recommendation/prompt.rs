use crate::models::HospitalProfile;

const SYSTEM_RECOMMENDATION: &str = include_str!("../../prompts/system_recommendation.txt");

/// Build the system prompt for recommendation generation.
pub fn build_system_prompt() -> &'static str {
    SYSTEM_RECOMMENDATION
}

/// Build the user prompt embedding the five profile fields.
pub fn build_recommendation_prompt(profile: &HospitalProfile) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("Hospital Name: {}\n", profile.hospital_name));
    prompt.push_str(&format!(
        "Hospital Size: {}\n",
        profile.hospital_size.as_str()
    ));
    prompt.push_str(&format!("Specialties: {}\n", profile.specialties));
    prompt.push_str(&format!(
        "AR/MR Experience: {}\n",
        profile.ar_mr_experience.as_str()
    ));
    prompt.push_str(&format!(
        "Needs Assessment: {}\n\n",
        profile.needs_assessment
    ));

    prompt.push_str(
        "Provide a summary of your recommendations, a list of specific AR/MR \
         technology recommendations, and a roadmap for implementing the \
         recommended technologies. Return ONLY the JSON object.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArMrExperience, HospitalSize};

    #[test]
    fn system_prompt_not_empty() {
        assert!(!build_system_prompt().is_empty());
    }

    #[test]
    fn prompt_embeds_all_five_fields() {
        let profile = HospitalProfile {
            hospital_name: "St. Olav Clinic".into(),
            hospital_size: HospitalSize::Large,
            specialties: "neurosurgery, radiology".into(),
            ar_mr_experience: ArMrExperience::Extensive,
            needs_assessment: "We want holographic navigation in the OR.".into(),
        };

        let prompt = build_recommendation_prompt(&profile);
        assert!(prompt.contains("St. Olav Clinic"));
        assert!(prompt.contains("large"));
        assert!(prompt.contains("neurosurgery, radiology"));
        assert!(prompt.contains("extensive"));
        assert!(prompt.contains("holographic navigation"));
    }
}
