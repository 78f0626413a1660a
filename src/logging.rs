use anyhow::Context as _;

pub const DEFAULT_FILTER: &str = "info";

// Stdout is reserved for command output.
pub fn init() -> anyhow::Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER)
            .context("build default log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("install log subscriber: {err}"))?;

    tracing::trace!(default = DEFAULT_FILTER, "logging ready");
    Ok(())
}
