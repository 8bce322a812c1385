//! Turning raw model output into a [`StudyRoadmap`].

use serde_json::{Map, Value};

use super::StudyRoadmap;
use crate::types::Timestamp;

/// Top-level keys every roadmap document must carry.
pub const REQUIRED_KEYS: [&str; 5] = [
    "nextFocusArea",
    "recommendedProblems",
    "studyPlan",
    "weakestTopics",
    "overallRecommendation",
];

/// Base id given to renumbered recommended problems.
const PROBLEM_ID_BASE: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum RoadmapParseError {
    #[error("AI response contained no JSON object")]
    NoJson,

    #[error("AI response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("AI response is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("AI response has an unexpected shape: {0}")]
    Shape(String),
}

/// The JSON object inside `text`, tolerating Markdown code fences and
/// chatter before or after it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse, check, and normalize a roadmap.
///
/// Only the top-level keys are mandatory. Missing or oddly typed nested
/// fields fall back to empty values.
///
/// `userId` and `generatedAt` are always overwritten. Recommended problems
/// are renumbered to `problemId = 1000 + i` and `order = i + 1` because the
/// model cannot know real catalog ids.
pub fn parse_roadmap(
    text: &str,
    user_id: &str,
    generated_at: Timestamp,
) -> Result<StudyRoadmap, RoadmapParseError> {
    let json = extract_json_object(text).ok_or(RoadmapParseError::NoJson)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| RoadmapParseError::InvalidJson(e.to_string()))?;
    let Value::Object(mut doc) = value else {
        return Err(RoadmapParseError::NoJson);
    };

    for key in REQUIRED_KEYS {
        if doc.get(key).map_or(true, Value::is_null) {
            return Err(RoadmapParseError::MissingField(key));
        }
    }

    doc.insert("userId".into(), Value::String(user_id.to_string()));
    doc.insert(
        "generatedAt".into(),
        serde_json::to_value(generated_at).map_err(|e| RoadmapParseError::Shape(e.to_string()))?,
    );
    renumber_problems(&mut doc)?;

    serde_json::from_value(Value::Object(doc)).map_err(|e| RoadmapParseError::Shape(e.to_string()))
}

fn renumber_problems(doc: &mut Map<String, Value>) -> Result<(), RoadmapParseError> {
    let Some(Value::Array(problems)) = doc.get_mut("recommendedProblems") else {
        return Err(RoadmapParseError::Shape(
            "recommendedProblems must be an array".into(),
        ));
    };
    for (i, problem) in problems.iter_mut().enumerate() {
        let Value::Object(fields) = problem else {
            return Err(RoadmapParseError::Shape(format!(
                "recommendedProblems[{i}] must be an object"
            )));
        };
        fields.insert("problemId".into(), Value::from(PROBLEM_ID_BASE + i as u64));
        fields.insert("order".into(), Value::from(i as u64 + 1));
    }
    Ok(())
}
