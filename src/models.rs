use serde::{Deserialize, Serialize};
use std::fmt;

use crate::deserializers::{de_age, de_label_set, de_optional_text};

/// Highest completed education, as offered by the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Diploma,
    Bachelors,
    Masters,
    Other,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high-school",
            EducationLevel::Diploma => "diploma",
            EducationLevel::Bachelors => "bachelors",
            EducationLevel::Masters => "masters",
            EducationLevel::Other => "other",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonalityType {
    Analytical,
    Creative,
    Leadership,
    Supportive,
    Entrepreneurial,
    DetailOriented,
}

impl PersonalityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityType::Analytical => "analytical",
            PersonalityType::Creative => "creative",
            PersonalityType::Leadership => "leadership",
            PersonalityType::Supportive => "supportive",
            PersonalityType::Entrepreneurial => "entrepreneurial",
            PersonalityType::DetailOriented => "detail-oriented",
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intake data submitted by the assessment form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "fullName", alias = "name")]
    pub name: String,
    #[serde(deserialize_with = "de_age")]
    pub age: u32,
    pub education_level: EducationLevel,
    #[serde(default, deserialize_with = "de_label_set")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "de_label_set")]
    pub skills: Vec<String>,
    pub personality_type: PersonalityType,
    #[serde(default, deserialize_with = "de_label_set")]
    pub hobbies: Vec<String>,
    #[serde(default, deserialize_with = "de_optional_text")]
    pub career_goals: String,
}

impl Profile {
    /// Structural checks the form is expected to have done already.
    /// Age range is left to the form.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push("fullName is empty".to_string());
        }
        if self.interests.is_empty() {
            issues.push("interests must not be empty".to_string());
        }
        if self.skills.is_empty() {
            issues.push("skills must not be empty".to_string());
        }
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// Decode the predict route body: the form's `{"assessmentData": {...}}`
    /// envelope, or the profile object on its own.
    pub fn from_request_body(body: &[u8]) -> serde_json::Result<Self> {
        let mut value: serde_json::Value = serde_json::from_slice(body)?;
        match value.get_mut("assessmentData").map(serde_json::Value::take) {
            Some(inner) => serde_json::from_value(inner),
            None => serde_json::from_value(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Course,
    Tutorial,
    Article,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerRecommendation {
    pub career_name: String,
    pub match_score: i64,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub resources: Vec<LearningResource>,
}

/// Decoded model answer, returned to the caller as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub careers: Vec<CareerRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Inbound body for the chat relay
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ava() -> serde_json::Value {
        json!({
            "fullName": "Ava",
            "age": "20",
            "educationLevel": "bachelors",
            "interests": ["technology"],
            "skills": ["coding"],
            "personalityType": "analytical",
            "hobbies": [],
            "careerGoals": ""
        })
    }

    #[test]
    fn test_profile_from_form_payload() {
        let profile: Profile = serde_json::from_value(ava()).unwrap();
        assert_eq!(profile.name, "Ava");
        assert_eq!(profile.age, 20);
        assert_eq!(profile.education_level, EducationLevel::Bachelors);
        assert_eq!(profile.personality_type, PersonalityType::Analytical);
        assert!(profile.hobbies.is_empty());
        assert!(profile.career_goals.is_empty());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_profile_optional_fields_may_be_absent() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Lee",
            "age": 42,
            "educationLevel": "high-school",
            "interests": ["law-policy"],
            "skills": ["writing"],
            "personalityType": "detail-oriented",
            "careerGoals": null
        }))
        .unwrap();
        assert_eq!(profile.education_level, EducationLevel::HighSchool);
        assert_eq!(profile.personality_type, PersonalityType::DetailOriented);
        assert!(profile.hobbies.is_empty());
        assert!(profile.career_goals.is_empty());
    }

    #[test]
    fn test_profile_rejects_unknown_enum() {
        let mut payload = ava();
        payload["educationLevel"] = json!("phd");
        assert!(serde_json::from_value::<Profile>(payload).is_err());
    }

    #[test]
    fn test_validate_reports_all_issues() {
        let mut payload = ava();
        payload["fullName"] = json!("  ");
        payload["interests"] = json!([]);
        payload["skills"] = json!([]);
        let profile: Profile = serde_json::from_value(payload).unwrap();
        let issues = profile.validate().unwrap_err();
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_request_body_envelopes() {
        let wrapped = serde_json::to_vec(&json!({ "assessmentData": ava() })).unwrap();
        assert_eq!(Profile::from_request_body(&wrapped).unwrap().name, "Ava");
        let bare = serde_json::to_vec(&ava()).unwrap();
        assert_eq!(Profile::from_request_body(&bare).unwrap().name, "Ava");
        assert!(Profile::from_request_body(b"not json").is_err());
        assert!(Profile::from_request_body(br#"{"assessmentData": {}}"#).is_err());
    }

    #[test]
    fn test_career_wire_names() {
        let career = CareerRecommendation {
            career_name: "Data Scientist".to_string(),
            match_score: 92,
            reasoning: "Strong analytical fit.".to_string(),
            strengths: vec!["coding".to_string()],
            gaps: vec!["statistics".to_string()],
            resources: vec![LearningResource {
                title: "Intro to ML".to_string(),
                kind: ResourceType::Course,
                url: "https://example.com/ml".to_string(),
            }],
        };
        let v = serde_json::to_value(&career).unwrap();
        assert_eq!(v["careerName"], "Data Scientist");
        assert_eq!(v["matchScore"], 92);
        assert_eq!(v["resources"][0]["type"], "Course");
    }

    #[test]
    fn test_resource_type_is_strict() {
        let res = serde_json::from_value::<LearningResource>(json!({
            "title": "Some book",
            "type": "Book",
            "url": "https://example.com"
        }));
        assert!(res.is_err());
    }
}
