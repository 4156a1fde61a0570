//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

/// Ensure the data directory exists, creating it if needed.
///
/// The question store file lives inside this directory; without it the
/// first save would fail with a confusing I/O error.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    Ok(())
}
