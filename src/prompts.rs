//! Prompt text sent to the chat-completion model.
//!
//! `SYSTEM_PROMPT` carries the only description of the output schema the model
//! ever sees; `extract::decode_prediction` expects exactly these field names.

use crate::models::Profile;

pub const SYSTEM_PROMPT: &str = r#"You are an expert career advisor. Analyze the user's profile and return the top 3 career recommendations.

For each career, provide:
- careerName: The career title
- matchScore: A score from 0-100 indicating fit
- reasoning: 2-3 sentences explaining why this career matches
- strengths: Array of user's strengths relevant to this career
- gaps: Array of skills the user needs to develop
- resources: Array of 3 learning resources (each with title, type, and url)

Return ONLY valid JSON in this exact format:
{
  "careers": [
    {
      "careerName": "string",
      "matchScore": number,
      "reasoning": "string",
      "strengths": ["string"],
      "gaps": ["string"],
      "resources": [
        {"title": "string", "type": "Course|Tutorial|Article|Video", "url": "string"}
      ]
    }
  ]
}"#;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a friendly career guidance assistant. \
Help the user explore careers, study paths and job-search strategy. \
Keep answers concise and practical, use bullet points where they help, \
and say so when a question is outside career guidance.";

/// Render the profile as `Key: value` lines. Hobbies and career goals are
/// left out entirely when empty.
pub fn build_user_prompt(profile: &Profile) -> String {
    let mut lines = vec![
        "Analyze this student profile and recommend 3 ideal careers:".to_string(),
        String::new(),
        format!("Name: {}", profile.name.trim()),
        format!("Age: {}", profile.age),
        format!("Education: {}", profile.education_level),
        format!("Interests: {}", profile.interests.join(", ")),
        format!("Skills: {}", profile.skills.join(", ")),
        format!("Personality: {}", profile.personality_type),
    ];
    if !profile.hobbies.is_empty() {
        lines.push(format!("Hobbies: {}", profile.hobbies.join(", ")));
    }
    let goals = profile.career_goals.trim();
    if !goals.is_empty() {
        lines.push(format!("Career Goals: {goals}"));
    }
    lines.join("\n")
}
