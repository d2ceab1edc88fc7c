pub mod blocks;
mod layout;
pub mod sections;

use crate::chart::ChartSet;
use crate::domain::product::AnalysisResult;
use crate::error::ReportGenerationError;
use crate::style::Theme;
use crate::time::stamp::report_stamp;
use blocks::ReportPlan;
use chrono::{DateTime, Local, TimeZone};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn report_file_name<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{prefix}_{}.pdf", report_stamp(now))
}

/// Turns an [`AnalysisResult`] plus whatever charts rendered into a PDF file.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    theme: Arc<Theme>,
    prefix: String,
}

impl ReportAssembler {
    pub fn new(theme: Arc<Theme>, prefix: impl Into<String>) -> Self {
        Self {
            theme,
            prefix: prefix.into(),
        }
    }

    pub fn plan(&self, result: &AnalysisResult, charts: &ChartSet) -> ReportPlan {
        sections::plan(result, charts)
    }

    pub fn assemble(
        &self,
        result: &AnalysisResult,
        charts: &ChartSet,
        dir: &Path,
    ) -> Result<PathBuf, ReportGenerationError> {
        self.assemble_at(result, charts, dir, &Local::now())
    }

    /// Writes the report under a name stamped with `now`. The bytes go to a
    /// hidden temp file first and are moved into place without overwriting,
    /// so a reader never sees a partial PDF.
    pub fn assemble_at<Tz: TimeZone>(
        &self,
        result: &AnalysisResult,
        charts: &ChartSet,
        dir: &Path,
        now: &DateTime<Tz>,
    ) -> Result<PathBuf, ReportGenerationError>
    where
        Tz::Offset: std::fmt::Display,
    {
        std::fs::create_dir_all(dir).map_err(ReportGenerationError::Directory)?;

        let name = report_file_name(&self.prefix, now);
        let target = dir.join(&name);
        let rendered = layout::render(&self.plan(result, charts), &self.theme)?;

        let mut part = tempfile::Builder::new()
            .prefix(".")
            .suffix(".pdf.part")
            .tempfile_in(dir)
            .map_err(ReportGenerationError::Write)?;
        part.write_all(&rendered.bytes)
            .map_err(ReportGenerationError::Write)?;
        part.as_file()
            .sync_all()
            .map_err(ReportGenerationError::Write)?;
        part.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                ReportGenerationError::Collision(name.clone())
            } else {
                ReportGenerationError::Write(e.error)
            }
        })?;

        tracing::info!(
            file = %name,
            bytes = rendered.bytes.len(),
            pages = rendered.pages,
            charts = rendered.charts,
            "report written"
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::metrics;
    use crate::time::stamp::is_report_stamp;
    use chrono::{FixedOffset, TimeZone};
    use tempfile::TempDir;

    fn result() -> AnalysisResult {
        AnalysisResult::new(
            "Coffee".into(),
            "05/03/2026".into(),
            vec![
                metrics("Alpha", 22.0, 12.0, 4.4, 6.0),
                metrics("Beta", 11.0, 9.5, 3.8, -2.5),
            ],
            "The coffee sector shows mixed momentum.".into(),
            (1..=6).map(|i| format!("R{i}")).collect(),
        )
        .unwrap()
    }

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 5, 14, 15, 2)
            .unwrap()
    }

    #[test]
    fn file_name_carries_prefix_and_stamp() {
        let name = report_file_name("market_study", &at());
        let stamp = name
            .strip_prefix("market_study_")
            .and_then(|s| s.strip_suffix(".pdf"))
            .unwrap();
        assert!(is_report_stamp(stamp), "{name}");
    }

    #[test]
    fn writes_pdf_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let assembler = ReportAssembler::new(Arc::new(Theme::default()), "market_study");
        let path = assembler
            .assemble_at(&result(), &ChartSet::default(), dir.path(), &at())
            .unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{names:?}");
    }

    #[test]
    fn existing_report_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let assembler = ReportAssembler::new(Arc::new(Theme::default()), "market_study");
        let first = assembler
            .assemble_at(&result(), &ChartSet::default(), dir.path(), &at())
            .unwrap();
        let before = std::fs::read(&first).unwrap();

        let err = assembler
            .assemble_at(&result(), &ChartSet::default(), dir.path(), &at())
            .unwrap_err();
        assert!(matches!(err, ReportGenerationError::Collision(_)));
        assert_eq!(std::fs::read(&first).unwrap(), before);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("reports");
        let assembler = ReportAssembler::new(Arc::new(Theme::default()), "study");
        let path = assembler
            .assemble_at(&result(), &ChartSet::default(), &nested, &at())
            .unwrap();
        assert!(path.is_file());
    }
}
