use std::fmt::Write as _;

use serde_json::Value;

use crate::outline::{
    CourseSummary, Row, RowLevel, SelectorRecord, SubnodeSelector, SubtopicSelector,
};
use crate::sanitize::{as_display_string, as_mapping, as_number, as_sequence, safe_length};

pub const PREVIEW_DESCRIPTION_CHARS: usize = 50;
const NOT_AVAILABLE: &str = "N/A";

pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', pad));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn outline_rows(rows: &[Row]) -> String {
    let cells = rows
        .iter()
        .map(|row| {
            let indent = match row.level {
                RowLevel::Maintopic | RowLevel::Error => "",
                RowLevel::Subtopic => "  ",
                RowLevel::Subnode => "    - ",
            };
            vec![
                row.level.to_string(),
                row.number.clone(),
                format!("{indent}{}", row.title),
                row.duration.clone(),
                row.difficulty.clone(),
                row.description.clone(),
            ]
        })
        .collect::<Vec<_>>();
    table(
        &[
            "Level",
            "Number",
            "Title",
            "Duration",
            "Difficulty",
            "Description",
        ],
        &cells,
    )
}

pub fn summary(summary: &CourseSummary) -> String {
    format!(
        "Course Summary\n\
Maintopics: {}\n\
Subtopics: {}\n\
Subnodes: {}\n\
Total Duration: {}\n",
        summary.maintopics, summary.subtopics, summary.subnodes, summary.total_duration
    )
}

pub fn course_information(response: &Value) -> Option<String> {
    let metadata = as_mapping(as_mapping(Some(response)).get("course_metadata"));
    if metadata.is_empty() {
        return None;
    }
    let field = |key: &str| {
        let text = as_display_string(metadata.get(key), None);
        if text.is_empty() {
            NOT_AVAILABLE.to_owned()
        } else {
            text
        }
    };

    Some(format!(
        "Course Information\n\
Title: {}\n\
Duration: {} hours\n\
Learner Path: {}\n\
Regionality: {}\n\
Objectives: {}\n",
        field("title"),
        field("course_hours"),
        field("learner_path"),
        field("regionality"),
        safe_length(metadata.get("course_objectives")),
    ))
}

pub fn toc_metrics(response: &Value, maintopics: usize) -> String {
    let response = as_mapping(Some(response));
    let cost = as_number(as_mapping(response.get("cost_summary")).get("total_cost_usd"))
        .unwrap_or(0.0);
    let exec_time = as_display_string(response.get("execution_time_s"), None);
    let exec_time = if exec_time.is_empty() {
        "0".to_owned()
    } else {
        exec_time
    };
    format!("Maintopics: {maintopics} | Cost: ${cost:.4} | Execution Time: {exec_time}s\n")
}

pub fn subtopic_selectors(selectors: &[SubtopicSelector]) -> String {
    let cells = selectors
        .iter()
        .map(|s| {
            vec![
                s.full_number.clone(),
                s.subtopic_title.clone(),
                s.maintopic_title.clone(),
                format!("{} min", s.duration),
                s.subnodes.len().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table(
        &["Number", "Title", "Maintopic", "Duration", "Subnodes"],
        &cells,
    )
}

pub fn subnode_selectors(selectors: &[SubnodeSelector]) -> String {
    let cells = selectors
        .iter()
        .map(|s| {
            vec![
                s.full_number.clone(),
                s.subnode_title.clone(),
                s.subtopic_title.clone(),
                format!("{} min", s.duration),
            ]
        })
        .collect::<Vec<_>>();
    table(&["Number", "Title", "Subtopic", "Duration"], &cells)
}

pub fn script_preview<S: SelectorRecord>(selected: &[&S]) -> String {
    let cells = selected
        .iter()
        .map(|s| {
            let description = Value::String(s.description().to_owned());
            vec![
                s.full_number().to_owned(),
                s.title().to_owned(),
                s.maintopic_title().to_owned(),
                format!("{} min", s.duration()),
                as_display_string(Some(&description), Some(PREVIEW_DESCRIPTION_CHARS)),
            ]
        })
        .collect::<Vec<_>>();
    table(
        &["Number", "Title", "Maintopic", "Duration", "Description"],
        &cells,
    )
}

pub fn script_results<S: SelectorRecord>(data: &Value, selected: &[&S]) -> String {
    let data = as_mapping(Some(data));
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Success: {} | Failed: {}",
        as_display_string(data.get("successful"), None),
        as_display_string(data.get("failed"), None),
    );

    let scripts = as_sequence(data.get("scripts"));
    if !scripts.is_empty() {
        out.push_str("\nGenerated Scripts\n");
    }
    for (idx, script) in scripts.iter().enumerate() {
        let script = as_mapping(Some(script));
        let sub_topic = as_display_string(script.get("sub_topic"), None);
        let script_type = as_display_string(script.get("script_type"), None);
        let matching = selected.iter().find(|s| s.title() == sub_topic);

        let _ = match matching {
            Some(s) if !s.full_number().is_empty() => writeln!(
                out,
                "\n{}. [{}] {sub_topic} ({script_type})",
                idx + 1,
                s.full_number()
            ),
            _ => writeln!(out, "\n{}. {sub_topic} ({script_type})", idx + 1),
        };
        out.push_str(as_display_string(script.get("script"), None).trim_end());
        out.push('\n');
    }

    let errors = as_sequence(data.get("errors"));
    if !errors.is_empty() {
        out.push_str("\nErrors\n");
    }
    for error in errors {
        let error = as_mapping(Some(error));
        let sub_topic = as_display_string(error.get("sub_topic"), None);
        let message = as_display_string(error.get("error"), None);
        let _ = writeln!(
            out,
            "{}: {}",
            if sub_topic.is_empty() { "Unknown" } else { sub_topic.as_str() },
            if message.is_empty() { "Unknown error" } else { message.as_str() },
        );
    }

    out
}
