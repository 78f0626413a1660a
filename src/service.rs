use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde::Serialize;
use url::Url;

pub const DEFAULT_TOC_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_SCRIPT_URL: &str = "http://127.0.0.1:3001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TocCreateSync,
    TocCreate,
    TocUpdate,
    ScriptBatch,
    ScriptSingle,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::TocCreateSync => "create-course-sync",
            Self::TocCreate => "create-course",
            Self::TocUpdate => "update-toc",
            Self::ScriptBatch => "generate-scripts-batch",
            Self::ScriptSingle => "generate-script",
        }
    }

    pub fn timeout(self) -> Duration {
        match self {
            Self::TocCreateSync | Self::ScriptBatch => Duration::from_secs(300),
            Self::TocCreate | Self::TocUpdate | Self::ScriptSingle => Duration::from_secs(120),
        }
    }

    fn is_toc(self) -> bool {
        matches!(self, Self::TocCreateSync | Self::TocCreate | Self::TocUpdate)
    }
}

pub const TOC_URL_ENV: &str = "COURSEGEN_TOC_URL";
pub const SCRIPT_URL_ENV: &str = "COURSEGEN_SCRIPT_URL";

// Base URLs are validated only when an endpoint is built.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub toc_url: String,
    pub script_url: String,
}

impl ServiceConfig {
    pub fn resolve(toc_url: Option<&str>, script_url: Option<&str>) -> Self {
        Self::new(
            pick_url(toc_url, std::env::var(TOC_URL_ENV).ok(), DEFAULT_TOC_URL),
            pick_url(script_url, std::env::var(SCRIPT_URL_ENV).ok(), DEFAULT_SCRIPT_URL),
        )
    }

    pub fn new(toc_url: impl Into<String>, script_url: impl Into<String>) -> Self {
        Self {
            toc_url: toc_url.into(),
            script_url: script_url.into(),
        }
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> anyhow::Result<String> {
        let base = if endpoint.is_toc() {
            validate_base_url(&self.toc_url).context("toc service url")?
        } else {
            validate_base_url(&self.script_url).context("script service url")?
        };
        Ok(format!("{base}/{}", endpoint.path()))
    }
}

fn pick_url(flag: Option<&str>, env: Option<String>, default: &str) -> String {
    match flag {
        Some(url) => url.to_owned(),
        None => env.unwrap_or_else(|| default.to_owned()),
    }
}

fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("parse url: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("url must be http/https: {raw}");
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

// Bodies that are not JSON are kept as a JSON string.
#[derive(Debug, Clone)]
pub struct ServiceReply {
    pub status: u16,
    pub data: serde_json::Value,
    pub elapsed: Duration,
}

impl ServiceReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self { client, config })
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        payload: &T,
    ) -> anyhow::Result<ServiceReply> {
        let url = self.config.endpoint_url(endpoint)?;
        tracing::info!(endpoint = %url, timeout_s = endpoint.timeout().as_secs(), "POST");

        let started_at = Instant::now();
        let response = self
            .client
            .post(&url)
            .timeout(endpoint.timeout())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .with_context(|| format!("read response body: {url}"))?;
        let elapsed = started_at.elapsed();

        let data = serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::debug!(endpoint = %url, %err, "response body is not json");
            serde_json::Value::String(raw)
        });

        tracing::info!(
            endpoint = %url,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "service replied"
        );

        Ok(ServiceReply {
            status,
            data,
            elapsed,
        })
    }
}

pub fn unexpected_status(what: &str, reply: &ServiceReply) -> anyhow::Error {
    let body = serde_json::to_string_pretty(&reply.data).unwrap_or_else(|_| reply.data.to_string());
    anyhow::anyhow!("{what} returned status {}: {body}", reply.status)
}
