use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::sanitize::{
    as_display_string, as_mapping, as_number, as_sequence, canonical_number, is_truthy,
};

pub const DESCRIPTION_PREVIEW_CHARS: usize = 80;
pub const DEFAULT_SCRIPT_MINUTES: u32 = 5;

const UNTITLED: &str = "Untitled";
const NO_DURATION: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLevel {
    Maintopic,
    Subtopic,
    Subnode,
    Error,
}

impl fmt::Display for RowLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Maintopic => "maintopic",
            Self::Subtopic => "subtopic",
            Self::Subnode => "subnode",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub level: RowLevel,
    pub number: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub difficulty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalDuration {
    Hours(f64),
    NotApplicable,
}

impl TotalDuration {
    fn from_hours(hours: f64) -> Self {
        if hours.is_finite() && hours > 0.0 {
            Self::Hours(hours)
        } else {
            Self::NotApplicable
        }
    }
}

impl fmt::Display for TotalDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hours(hours) => write!(f, "{hours:.1}h"),
            Self::NotApplicable => f.write_str("N/A"),
        }
    }
}

// Bare string sub-nodes get a row but are not counted in `subnodes`.
// Subtopic minutes are read with `as_number`, the same as selector durations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub maintopics: usize,
    pub subtopics: usize,
    pub subnodes: usize,
    pub total_duration: TotalDuration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoData {
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenedToc {
    pub rows: Vec<Row>,
    pub summary: CourseSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data: Option<NoData>,
}

pub fn course_document(response: &Value) -> &Value {
    let map = as_mapping(Some(response));
    if map.contains_key("maintopics_with_subtopics") {
        return response;
    }
    map.get("toc").unwrap_or(response)
}

pub fn authoritative_hours(response: &Value) -> Option<f64> {
    let metadata = as_mapping(as_mapping(Some(response)).get("course_metadata"));
    as_number(metadata.get("course_hours"))
}

fn maintopic_entries(course: &Value) -> &[Value] {
    as_sequence(as_mapping(Some(course)).get("maintopics_with_subtopics"))
}

pub fn flatten_to_rows(course: &Value, authoritative_hours: Option<f64>) -> FlattenedToc {
    let mut rows = Vec::new();
    let mut maintopics = 0usize;
    let mut subtopics = 0usize;
    let mut subnodes = 0usize;
    let mut minutes = 0f64;

    for entry in maintopic_entries(course) {
        let Value::Object(entry) = entry else {
            rows.push(error_row(entry));
            continue;
        };
        maintopics += 1;

        let maintopic = as_mapping(entry.get("maintopic"));
        let main_number = canonical_number(maintopic.get("maintopic_number"));
        rows.push(Row {
            level: RowLevel::Maintopic,
            number: main_number.clone(),
            title: title_or_untitled(maintopic.get("title")),
            description: as_display_string(
                maintopic.get("description"),
                Some(DESCRIPTION_PREVIEW_CHARS),
            ),
            duration: as_display_string(maintopic.get("duration"), None),
            difficulty: as_display_string(maintopic.get("difficulty_level"), None),
        });

        for subtopic in as_sequence(entry.get("subtopics")) {
            let Value::Object(subtopic) = subtopic else {
                rows.push(error_row(subtopic));
                continue;
            };
            subtopics += 1;
            if let Some(m) = as_number(subtopic.get("duration_minutes")) {
                minutes += m;
            }

            let sub_number = canonical_number(subtopic.get("subtopic_number"));
            rows.push(Row {
                level: RowLevel::Subtopic,
                number: composite_number(&main_number, &sub_number),
                title: title_or_untitled(subtopic.get("title")),
                description: as_display_string(
                    subtopic.get("description"),
                    Some(DESCRIPTION_PREVIEW_CHARS),
                ),
                duration: minutes_label(subtopic.get("duration_minutes")),
                difficulty: String::new(),
            });

            for subnode in as_sequence(subtopic.get("subnodes")) {
                let duration = match subnode {
                    Value::Object(map) => {
                        subnodes += 1;
                        minutes_label(map.get("duration_minutes"))
                    }
                    _ => NO_DURATION.to_owned(),
                };
                rows.push(Row {
                    level: RowLevel::Subnode,
                    number: String::new(),
                    title: subnode_title(subnode),
                    description: String::new(),
                    duration,
                    difficulty: String::new(),
                });
            }
        }
    }

    let total_hours = authoritative_hours.unwrap_or(minutes / 60.0);
    let summary = CourseSummary {
        maintopics,
        subtopics,
        subnodes,
        total_duration: TotalDuration::from_hours(total_hours),
    };
    let no_data = (maintopics == 0).then(|| NoData { raw: course.clone() });

    FlattenedToc {
        rows,
        summary,
        no_data,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorDefaults {
    // The script service rejects zero-length scripts.
    pub duration_minutes: u32,
}

impl Default for SelectorDefaults {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_SCRIPT_MINUTES,
        }
    }
}

pub trait SelectorRecord {
    fn full_number(&self) -> &str;
    fn display_name(&self) -> &str;
    fn title(&self) -> &str;
    fn maintopic_title(&self) -> &str;
    fn description(&self) -> &str;
    fn duration(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtopicSelector {
    pub maintopic_number: String,
    pub maintopic_title: String,
    pub subtopic_number: String,
    pub subtopic_title: String,
    pub full_number: String,
    pub display_name: String,
    pub description: String,
    pub duration: u32,
    pub subnodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnodeSelector {
    pub maintopic_number: String,
    pub maintopic_title: String,
    pub subtopic_number: String,
    pub subtopic_title: String,
    pub subnode_title: String,
    pub full_number: String,
    pub display_name: String,
    pub description: String,
    pub duration: u32,
    // 1-based.
    pub subnode_index: usize,
}

impl SelectorRecord for SubtopicSelector {
    fn full_number(&self) -> &str {
        &self.full_number
    }
    fn display_name(&self) -> &str {
        &self.display_name
    }
    fn title(&self) -> &str {
        &self.subtopic_title
    }
    fn maintopic_title(&self) -> &str {
        &self.maintopic_title
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn duration(&self) -> u32 {
        self.duration
    }
}

impl SelectorRecord for SubnodeSelector {
    fn full_number(&self) -> &str {
        &self.full_number
    }
    fn display_name(&self) -> &str {
        &self.display_name
    }
    fn title(&self) -> &str {
        &self.subnode_title
    }
    fn maintopic_title(&self) -> &str {
        &self.maintopic_title
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn duration(&self) -> u32 {
        self.duration
    }
}

pub fn extract_subtopics(course: &Value, defaults: &SelectorDefaults) -> Vec<SubtopicSelector> {
    let mut selectors = Vec::new();

    for entry in maintopic_entries(course) {
        let Value::Object(entry) = entry else {
            continue;
        };
        let maintopic = as_mapping(entry.get("maintopic"));
        let main_number = canonical_number(maintopic.get("maintopic_number"));
        let main_title = as_display_string(maintopic.get("title"), None);

        for subtopic in as_sequence(entry.get("subtopics")) {
            let selector = match subtopic {
                Value::Object(subtopic) => {
                    let sub_number = canonical_number(subtopic.get("subtopic_number"));
                    let title = as_display_string(subtopic.get("title"), None);
                    let full_number = composite_number(&main_number, &sub_number);
                    SubtopicSelector {
                        maintopic_number: main_number.clone(),
                        maintopic_title: main_title.clone(),
                        display_name: subtopic_display_name(&full_number, &sub_number, &title),
                        subtopic_number: sub_number,
                        subtopic_title: title,
                        full_number,
                        description: as_display_string(subtopic.get("description"), None),
                        duration: positive_minutes(subtopic.get("duration_minutes"))
                            .unwrap_or(defaults.duration_minutes),
                        subnodes: as_sequence(subtopic.get("subnodes"))
                            .iter()
                            .map(subnode_title)
                            .collect(),
                    }
                }
                other => {
                    let title = as_display_string(Some(other), None);
                    let full_number = composite_number(&main_number, "");
                    SubtopicSelector {
                        maintopic_number: main_number.clone(),
                        maintopic_title: main_title.clone(),
                        subtopic_number: String::new(),
                        display_name: subtopic_display_name(&full_number, "", &title),
                        subtopic_title: title,
                        full_number,
                        description: String::new(),
                        duration: defaults.duration_minutes,
                        subnodes: Vec::new(),
                    }
                }
            };
            selectors.push(selector);
        }
    }

    selectors
}

pub fn extract_subnodes(course: &Value, defaults: &SelectorDefaults) -> Vec<SubnodeSelector> {
    let mut selectors = Vec::new();

    for entry in maintopic_entries(course) {
        let Value::Object(entry) = entry else {
            continue;
        };
        let maintopic = as_mapping(entry.get("maintopic"));
        let main_number = canonical_number(maintopic.get("maintopic_number"));
        let main_title = as_display_string(maintopic.get("title"), None);

        for subtopic in as_sequence(entry.get("subtopics")) {
            let Value::Object(subtopic) = subtopic else {
                continue;
            };
            let sub_number = canonical_number(subtopic.get("subtopic_number"));
            let sub_title = as_display_string(subtopic.get("title"), None);

            for (idx, subnode) in as_sequence(subtopic.get("subnodes")).iter().enumerate() {
                let subnode_index = idx + 1;
                let title = subnode_title(subnode);
                let full_number = if main_number.is_empty() || sub_number.is_empty() {
                    String::new()
                } else {
                    format!("{main_number}.{sub_number}.{subnode_index}")
                };
                let display_name = if full_number.is_empty() {
                    title.clone()
                } else {
                    format!("{full_number} - {title}")
                };
                let (description, duration) = match subnode {
                    Value::Object(map) => (
                        as_display_string(map.get("description"), None),
                        positive_minutes(map.get("duration_minutes"))
                            .unwrap_or(defaults.duration_minutes),
                    ),
                    _ => (String::new(), defaults.duration_minutes),
                };

                selectors.push(SubnodeSelector {
                    maintopic_number: main_number.clone(),
                    maintopic_title: main_title.clone(),
                    subtopic_number: sub_number.clone(),
                    subtopic_title: sub_title.clone(),
                    subnode_title: title,
                    full_number,
                    display_name,
                    description,
                    duration,
                    subnode_index,
                });
            }
        }
    }

    selectors
}

fn composite_number(main_number: &str, sub_number: &str) -> String {
    format!("{main_number}.{sub_number}")
}

fn subtopic_display_name(full_number: &str, sub_number: &str, title: &str) -> String {
    if sub_number.is_empty() {
        // `full_number` already ends with the separator: "3. Title".
        format!("{full_number} {title}")
    } else {
        format!("{full_number} - {title}")
    }
}

fn title_or_untitled(value: Option<&Value>) -> String {
    let title = as_display_string(value, None);
    if title.is_empty() {
        UNTITLED.to_owned()
    } else {
        title
    }
}

fn minutes_label(value: Option<&Value>) -> String {
    if is_truthy(value) {
        format!("{} min", as_display_string(value, None))
    } else {
        NO_DURATION.to_owned()
    }
}

fn positive_minutes(value: Option<&Value>) -> Option<u32> {
    as_number(value)
        .filter(|m| *m > 0.0)
        .map(|m| m.round().max(1.0) as u32)
}

fn subnode_title(subnode: &Value) -> String {
    if let Value::Object(map) = subnode {
        for key in ["title", "name"] {
            if let Some(value) = map.get(key).filter(|v| is_truthy(Some(v))) {
                return as_display_string(Some(value), None);
            }
        }
    }
    as_display_string(Some(subnode), None)
}

fn error_row(entry: &Value) -> Row {
    Row {
        level: RowLevel::Error,
        number: String::new(),
        title: as_display_string(Some(entry), Some(DESCRIPTION_PREVIEW_CHARS)),
        description: String::new(),
        duration: String::new(),
        difficulty: String::new(),
    }
}
