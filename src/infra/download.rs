// ============================================================
// Layer 6 — Dataset Download
// ============================================================
// Fetches the Wisconsin Diagnostic Breast Cancer table from the
// UCI archive when it is not on disk yet. The file is written
// as-is; the loader understands its header-less layout.

use anyhow::{Context, Result};
use std::{fs, path::Path, time::Duration};

pub const WDBC_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/breast-cancer-wisconsin/wdbc.data";

/// GET `url` and write the body to `dest`, creating parent directories.
pub fn download_dataset(url: &str, dest: &Path) -> Result<()> {
    tracing::info!("Downloading dataset from {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("Cannot build HTTP client")?;

    let body = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Download of '{}' failed", url))?
        .bytes()
        .with_context(|| format!("Cannot read response body from '{}'", url))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    fs::write(dest, &body).with_context(|| format!("Cannot write '{}'", dest.display()))?;

    tracing::info!("Saved {} bytes to '{}'", body.len(), dest.display());
    Ok(())
}

/// Make sure `dest` exists, downloading it only when `download` is set
/// and the file is missing. Returns whether a download happened.
pub fn ensure_dataset(dest: &Path, download: bool) -> Result<bool> {
    if dest.exists() {
        tracing::debug!("Dataset already present at '{}'", dest.display());
        return Ok(false);
    }
    if !download {
        return Ok(false);
    }
    download_dataset(WDBC_URL, dest)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_file_is_not_downloaded() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("wdbc.data");
        fs::write(&path, "1,M,1.0\n").unwrap();
        assert!(!ensure_dataset(&path, true).unwrap());
    }

    #[test]
    fn test_missing_file_without_flag_is_left_alone() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("wdbc.data");
        assert!(!ensure_dataset(&path, false).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_unreachable_host_is_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("wdbc.data");
        assert!(download_dataset("http://127.0.0.1:9/wdbc.data", &path).is_err());
        assert!(!path.exists());
    }
}
