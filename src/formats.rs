use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum LearnerPath {
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

impl LearnerPath {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            "professional" => Some(Self::Professional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ScriptType {
    #[serde(rename = "Solo Narration")]
    SoloNarration,
    #[serde(rename = "Character Based")]
    CharacterBased,
    Informative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocCreateRequest {
    pub project_id: String,
    pub question_id: String,
    pub topic: String,
    pub course_hours: u32,
    pub learner_path: LearnerPath,
    pub callback_url: Option<String>,
    pub regionality: String,
    pub objective: Vec<String>,
    pub course_subtopics: Vec<String>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRequest {
    pub region: String,
    pub sub_topic: String,
    pub learners_path: LearnerPath,
    pub description: String,
    pub duration: u32,
    pub script_type: ScriptType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptBatchRequest {
    pub scripts: Vec<ScriptRequest>,
}

pub fn split_lines(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split('\n').map(|line| line.to_owned()).collect()
}
