use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;

use crate::cli::{ScriptBatchArgs, ScriptSingleArgs, SelectionLevel};
use crate::formats::{LearnerPath, ScriptBatchRequest, ScriptRequest, ScriptType};
use crate::outline::{
    SelectorDefaults, SelectorRecord, course_document, extract_subnodes, extract_subtopics,
};
use crate::render;
use crate::response_file;
use crate::sanitize::{as_display_string, as_mapping};
use crate::service::{Endpoint, ServiceClient, ServiceConfig, unexpected_status};

#[derive(Debug, Clone)]
pub struct ScriptSettings {
    pub region: String,
    pub learners_path: LearnerPath,
    pub script_type: ScriptType,
}

pub fn script_request<S: SelectorRecord + ?Sized>(
    record: &S,
    settings: &ScriptSettings,
) -> ScriptRequest {
    ScriptRequest {
        region: settings.region.clone(),
        sub_topic: record.title().to_owned(),
        learners_path: settings.learners_path,
        description: description_or_default(record.description(), record.title()),
        duration: record.duration(),
        script_type: settings.script_type,
    }
}

pub fn batch_request<S: SelectorRecord>(
    selected: &[&S],
    settings: &ScriptSettings,
) -> ScriptBatchRequest {
    ScriptBatchRequest {
        scripts: selected
            .iter()
            .map(|record| script_request(*record, settings))
            .collect(),
    }
}

fn description_or_default(description: &str, title: &str) -> String {
    if description.trim().is_empty() {
        format!("Educational content for {title}")
    } else {
        description.to_owned()
    }
}

// Matches come back in document order. An entry of `wanted` that matches
// nothing is an error.
pub fn select<'a, S: SelectorRecord>(
    records: &'a [S],
    wanted: &[String],
) -> anyhow::Result<Vec<&'a S>> {
    let wanted = wanted.iter().map(|w| w.trim()).collect::<HashSet<_>>();
    let matches = |record: &S| {
        wanted.contains(record.full_number()) || wanted.contains(record.display_name())
    };

    for key in &wanted {
        let found = records
            .iter()
            .any(|r| r.full_number() == *key || r.display_name() == *key);
        if !found {
            let available = records
                .iter()
                .take(10)
                .map(|r| r.display_name().to_owned())
                .collect::<Vec<_>>();
            anyhow::bail!("unknown selection {key:?}; available (first 10): {available:?}");
        }
    }

    Ok(records.iter().filter(|r| matches(*r)).collect())
}

pub fn course_learner_path(response: &Value) -> Option<LearnerPath> {
    let metadata = as_mapping(as_mapping(Some(response)).get("course_metadata"));
    LearnerPath::parse(&as_display_string(metadata.get("learner_path"), None))
}

pub async fn batch(args: ScriptBatchArgs, config: ServiceConfig) -> anyhow::Result<()> {
    let response = response_file::read(Path::new(&args.response)).context("read toc response")?;
    let course = course_document(&response);
    let defaults = SelectorDefaults {
        duration_minutes: args.default_duration,
    };
    let settings = ScriptSettings {
        region: args.region.clone(),
        learners_path: args
            .learners_path
            .or_else(|| course_learner_path(&response))
            .unwrap_or(LearnerPath::Professional),
        script_type: args.script_type,
    };

    match args.level {
        SelectionLevel::Subtopic => {
            let records = extract_subtopics(course, &defaults);
            run_batch(&args, &records, &settings, config).await
        }
        SelectionLevel::Subnode => {
            let records = extract_subnodes(course, &defaults);
            run_batch(&args, &records, &settings, config).await
        }
    }
}

async fn run_batch<S: SelectorRecord>(
    args: &ScriptBatchArgs,
    records: &[S],
    settings: &ScriptSettings,
    config: ServiceConfig,
) -> anyhow::Result<()> {
    if records.is_empty() {
        let level = match args.level {
            SelectionLevel::Subtopic => "subtopics",
            SelectionLevel::Subnode => "sub-nodes",
        };
        anyhow::bail!("no {level} found in the TOC; regenerate the TOC");
    }
    tracing::info!(available = records.len(), level = ?args.level, "script batch: selectors");

    let selected = select(records, &args.select).context("select entries")?;
    print!("{}", render::script_preview(&selected));
    println!("Total scripts to generate: {}", selected.len());

    let payload = batch_request(&selected, settings);
    if args.dry_run {
        let json = serde_json::to_string_pretty(&payload).context("serialize batch payload")?;
        println!("{json}");
        return Ok(());
    }

    let client = ServiceClient::new(config)?;
    let reply = client
        .post_json(Endpoint::ScriptBatch, &payload)
        .await
        .context("script batch request")?;
    if reply.status != 200 {
        return Err(unexpected_status("script service", &reply));
    }

    println!("Batch completed in {:.2}s", reply.elapsed.as_secs_f64());
    print!("{}", render::script_results(&reply.data, &selected));
    Ok(())
}

pub async fn single(args: ScriptSingleArgs, config: ServiceConfig) -> anyhow::Result<()> {
    let payload = ScriptRequest {
        description: description_or_default(&args.description, &args.sub_topic),
        region: args.region,
        sub_topic: args.sub_topic,
        learners_path: args.learners_path,
        duration: args.duration,
        script_type: args.script_type,
    };

    let client = ServiceClient::new(config)?;
    let reply = client
        .post_json(Endpoint::ScriptSingle, &payload)
        .await
        .context("script request")?;
    if reply.status != 200 {
        return Err(unexpected_status("script service", &reply));
    }

    let script = as_display_string(as_mapping(Some(&reply.data)).get("script"), None);
    if script.is_empty() {
        let json = serde_json::to_string_pretty(&reply.data).context("serialize script reply")?;
        println!("{json}");
    } else {
        println!("{}", script.trim_end());
    }
    Ok(())
}
