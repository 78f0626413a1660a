use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;

pub fn read(path: &Path) -> anyhow::Result<Value> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read response: {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse response: {}", path.display()))
}

pub fn write(path: &Path, value: &Value, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("response output already exists: {}", path.display());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create response dir: {}", parent.display()))?;
    }

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let mut data = serde_json::to_vec_pretty(value).context("serialize response json")?;
    data.push(b'\n');
    std::fs::write(&tmp_path, &data)
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        received_at = %chrono::Utc::now().to_rfc3339(),
        "saved response"
    );
    Ok(())
}
