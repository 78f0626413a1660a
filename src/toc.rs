use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{
    CourseForm, OutputFormat, SelectorListArgs, TocCreateArgs, TocShowArgs, TocStartArgs,
    TocUpdateArgs,
};
use crate::formats::{TocCreateRequest, split_lines};
use crate::outline::{
    FlattenedToc, SelectorDefaults, authoritative_hours, course_document, extract_subnodes,
    extract_subtopics, flatten_to_rows,
};
use crate::render;
use crate::response_file;
use crate::sanitize::{as_mapping, safe_length};
use crate::service::{Endpoint, ServiceClient, ServiceConfig, unexpected_status};

pub fn create_request(form: &CourseForm, callback_url: Option<String>) -> TocCreateRequest {
    TocCreateRequest {
        project_id: form.project_id.clone(),
        question_id: form.question_id.clone(),
        topic: form.topic.clone(),
        course_hours: form.course_hours,
        learner_path: form.learner_path,
        callback_url: callback_url.filter(|url| !url.trim().is_empty()),
        regionality: form.regionality.clone(),
        objective: split_lines(&form.objectives),
        course_subtopics: split_lines(&form.subtopics),
        notes: form.notes.clone(),
    }
}

pub async fn create(args: TocCreateArgs, config: ServiceConfig) -> anyhow::Result<()> {
    let payload = create_request(&args.form, None);
    tracing::info!(topic = %payload.topic, course_hours = payload.course_hours, "toc create");

    let client = ServiceClient::new(config)?;
    let reply = client
        .post_json(Endpoint::TocCreateSync, &payload)
        .await
        .context("toc create request")?;
    if reply.status != 200 {
        return Err(unexpected_status("toc service", &reply));
    }

    if let Some(out) = args.out.as_deref() {
        response_file::write(Path::new(out), &reply.data, args.force)?;
    }

    println!(
        "TOC generated successfully in {:.2}s",
        reply.elapsed.as_secs_f64()
    );
    let course = course_document(&reply.data);
    let listed = safe_length(as_mapping(Some(course)).get("maintopics_with_subtopics"));
    print!("{}", render::toc_metrics(&reply.data, listed));
    println!();

    let flattened = flatten_to_rows(course, authoritative_hours(&reply.data));
    print_outline(&reply.data, &flattened)
}

pub async fn start(args: TocStartArgs, config: ServiceConfig) -> anyhow::Result<()> {
    let payload = create_request(&args.form, args.callback_url.clone());
    tracing::info!(
        topic = %payload.topic,
        callback_url = ?payload.callback_url,
        "toc start"
    );

    let client = ServiceClient::new(config)?;
    let reply = client
        .post_json(Endpoint::TocCreate, &payload)
        .await
        .context("toc start request")?;
    if !reply.is_success() {
        return Err(unexpected_status("toc service", &reply));
    }

    if reply.status == 202 {
        println!("TOC generation started (202 Accepted)");
        println!("The service is processing in the background; results go to the callback URL.");
    } else {
        tracing::warn!(status = reply.status, "toc start: expected 202 Accepted");
        println!("Received status code: {}", reply.status);
    }
    print_json(&reply.data)
}

pub async fn update(args: TocUpdateArgs, config: ServiceConfig) -> anyhow::Result<()> {
    let payload = response_file::read(Path::new(&args.payload)).context("read update payload")?;

    let client = ServiceClient::new(config)?;
    let reply = client
        .post_json(Endpoint::TocUpdate, &payload)
        .await
        .context("toc update request")?;
    if reply.status != 200 {
        return Err(unexpected_status("toc service", &reply));
    }

    if let Some(out) = args.out.as_deref() {
        response_file::write(Path::new(out), &reply.data, args.force)?;
    }

    let flattened = flatten_to_rows(
        course_document(&reply.data),
        authoritative_hours(&reply.data),
    );
    if flattened.no_data.is_some() {
        // Updates may answer with a status document rather than a TOC.
        return print_json(&reply.data);
    }
    print_outline(&reply.data, &flattened)
}

pub fn show(args: TocShowArgs) -> anyhow::Result<()> {
    let response = response_file::read(Path::new(&args.response)).context("read toc response")?;
    let hours = args.course_hours.or_else(|| authoritative_hours(&response));
    let flattened = flatten_to_rows(course_document(&response), hours);

    match args.format {
        OutputFormat::Table => print_outline(&response, &flattened),
        format => emit(format, &flattened),
    }
}

pub fn subtopics(args: SelectorListArgs) -> anyhow::Result<()> {
    let response = response_file::read(Path::new(&args.response)).context("read toc response")?;
    let defaults = SelectorDefaults {
        duration_minutes: args.default_duration,
    };
    let selectors = extract_subtopics(course_document(&response), &defaults);
    tracing::debug!(count = selectors.len(), "toc subtopics");

    match args.format {
        OutputFormat::Table => {
            if selectors.is_empty() {
                anyhow::bail!("no subtopics found in the TOC; regenerate the TOC");
            }
            println!("Found {} subtopics", selectors.len());
            print!("{}", render::subtopic_selectors(&selectors));
            Ok(())
        }
        format => emit(format, &selectors),
    }
}

pub fn subnodes(args: SelectorListArgs) -> anyhow::Result<()> {
    let response = response_file::read(Path::new(&args.response)).context("read toc response")?;
    let defaults = SelectorDefaults {
        duration_minutes: args.default_duration,
    };
    let selectors = extract_subnodes(course_document(&response), &defaults);
    tracing::debug!(count = selectors.len(), "toc subnodes");

    match args.format {
        OutputFormat::Table => {
            if selectors.is_empty() {
                anyhow::bail!("no sub-nodes found in the TOC");
            }
            println!("Found {} sub-nodes", selectors.len());
            print!("{}", render::subnode_selectors(&selectors));
            Ok(())
        }
        format => emit(format, &selectors),
    }
}

fn print_outline(response: &Value, flattened: &FlattenedToc) -> anyhow::Result<()> {
    if let Some(info) = render::course_information(response) {
        println!("{info}");
    }

    if let Some(no_data) = &flattened.no_data {
        tracing::warn!(
            error_rows = flattened.rows.len(),
            "no usable main topics in the TOC"
        );
        println!("No TOC data available");
        if !flattened.rows.is_empty() {
            print!("{}", render::outline_rows(&flattened.rows));
        }
        return print_json(&no_data.raw);
    }

    println!("Table of Contents");
    print!("{}", render::outline_rows(&flattened.rows));
    println!();
    print!("{}", render::summary(&flattened.summary));
    Ok(())
}

fn emit<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).context("serialize json output")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value).context("serialize yaml output")?;
            print!("{yaml}");
        }
        OutputFormat::Table => anyhow::bail!("table output is rendered by the caller"),
    }
    Ok(())
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize json output")?;
    println!("{json}");
    Ok(())
}
