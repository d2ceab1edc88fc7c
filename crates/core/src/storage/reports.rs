//! Read side of the reports directory: listing and download-name resolution.

use crate::domain::response::download_url;
use crate::error::DownloadError;
use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportInfo {
    pub filename: String,
    pub size: u64,
    pub created: String,
    pub download_url: String,
}

/// A bare `.pdf` file name that cannot escape the reports directory.
/// Hidden names are refused, which also hides in-flight `.pdf.part` files.
pub fn is_safe_report_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && name.to_ascii_lowercase().ends_with(".pdf")
}

/// Lists finished reports, newest first. A missing directory lists as empty.
pub fn list_reports(dir: &Path) -> anyhow::Result<Vec<ReportInfo>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read reports dir {}", dir.display()))
        }
    };

    let mut found: Vec<(SystemTime, ReportInfo)> = Vec::new();
    for entry in entries {
        let entry = entry.context("failed to read reports dir entry")?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        if !is_safe_report_name(&filename) {
            continue;
        }
        let meta = entry
            .metadata()
            .with_context(|| format!("failed to stat {filename}"))?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(UNIX_EPOCH);
        found.push((
            modified,
            ReportInfo {
                created: DateTime::<Local>::from(modified).to_rfc3339(),
                size: meta.len(),
                download_url: download_url(&filename),
                filename,
            },
        ));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.filename.cmp(&a.1.filename)));
    Ok(found.into_iter().map(|(_, info)| info).collect())
}

pub fn resolve_download(dir: &Path, name: &str) -> Result<PathBuf, DownloadError> {
    if !is_safe_report_name(name) {
        return Err(DownloadError::Forbidden);
    }
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DownloadError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.3").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn rejects_unsafe_names() {
        for name in ["../secret.pdf", "a/b.pdf", "a\\b.pdf", "report.txt", ".hidden.pdf", "", "x..pdf"] {
            assert!(!is_safe_report_name(name), "{name}");
        }
        assert!(is_safe_report_name("market_study_20260305_141502_004211.pdf"));
    }

    #[test]
    fn missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_reports(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn lists_newest_first_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "old.pdf", 300);
        touch(dir.path(), "new.pdf", 10);
        touch(dir.path(), "notes.txt", 0);
        touch(dir.path(), ".abc.pdf.part", 0);
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let reports = list_reports(dir.path()).unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["new.pdf", "old.pdf"]);
        assert_eq!(reports[0].size, 8);
        assert_eq!(reports[0].download_url, "/api/download/new.pdf");
        assert!(DateTime::parse_from_rfc3339(&reports[0].created).is_ok());
    }

    #[test]
    fn resolves_existing_reports_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.pdf", 0);

        assert_eq!(resolve_download(dir.path(), "a.pdf").unwrap(), dir.path().join("a.pdf"));
        assert_eq!(resolve_download(dir.path(), "b.pdf"), Err(DownloadError::NotFound));
        assert_eq!(resolve_download(dir.path(), "../a.pdf"), Err(DownloadError::Forbidden));
    }
}
