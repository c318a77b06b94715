// src/storage.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

pub const DEFAULT_ATTACHMENT_NAME: &str = "tokyo_covid19.pdf";

/// `YYYYMMDD_<base>`
pub fn dated_filename(date: NaiveDate, base: &str) -> String {
    format!("{}_{base}", date.format("%Y%m%d"))
}

/// Write `bytes` under `dir`, creating it if needed. Files are left in place.
pub async fn save_payload(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(target: "storage", path = %path.display(), bytes = bytes.len(), "saved payload");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_date_stamped() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        assert_eq!(dated_filename(d, DEFAULT_ATTACHMENT_NAME), "20210102_tokyo_covid19.pdf");
    }

    #[tokio::test]
    async fn save_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let path = save_payload(&dir, "x.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }
}
