//! Fetching raw media bytes from a URI.
//!
//! Supported schemes: `http://`, `https://`, `file://` and bare filesystem
//! paths. Downloads larger than the caller's cap are rejected without being
//! buffered in full.

use std::path::Path;

use tracing::debug;

use crate::error::{Context, Error, Result};

/// Fetch the bytes behind `uri`, refusing anything larger than `max_bytes`.
pub async fn fetch_bytes(uri: &str, max_bytes: u64) -> Result<Vec<u8>> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        fetch_http(uri, max_bytes).await
    } else if let Some(path) = uri.strip_prefix("file://") {
        fetch_file(Path::new(path), max_bytes).await
    } else if uri.contains("://") {
        Err(Error::invalid_input(format!("unsupported media URI: {uri}")))
    } else {
        fetch_file(Path::new(uri), max_bytes).await
    }
}

async fn fetch_http(url: &str, max_bytes: u64) -> Result<Vec<u8>> {
    let mut response = reqwest::get(url)
        .await
        .map_err(|e| Error::external("media request failed", e))?
        .error_for_status()
        .map_err(|e| Error::external("media request rejected", e))?;

    if let Some(len) = response.content_length()
        && len > max_bytes
    {
        return Err(too_large(len, max_bytes));
    }

    let mut data = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::external("media body read failed", e))?
    {
        data.extend_from_slice(&chunk);
        if data.len() as u64 > max_bytes {
            return Err(too_large(data.len() as u64, max_bytes));
        }
    }

    debug!(url, bytes = data.len(), "downloaded media");
    Ok(data)
}

async fn fetch_file(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if meta.len() > max_bytes {
        return Err(too_large(meta.len(), max_bytes));
    }
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = data.len(), "read media file");
    Ok(data)
}

fn too_large(len: u64, max_bytes: u64) -> Error {
    Error::invalid_input(format!(
        "media is {len} bytes, larger than the {max_bytes} byte limit"
    ))
}
