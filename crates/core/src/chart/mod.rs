mod draw;

use crate::domain::product::AnalysisResult;
use crate::error::ChartRenderError;
use crate::style::Theme;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Share,
    Scatter,
    Growth,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Share, ChartKind::Scatter, ChartKind::Growth];

    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::Share => "share",
            ChartKind::Scatter => "scatter",
            ChartKind::Growth => "growth",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Share => "Market share distribution",
            ChartKind::Scatter => "Price vs. customer satisfaction",
            ChartKind::Growth => "Annual growth rate",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
}

pub fn chart_file_name(scope: &str, kind: ChartKind) -> String {
    format!("chart_{scope}_{}.png", kind.slug())
}

/// Outcome of one render pass: an artifact or a failure per kind, plus every
/// file the pass may have created.
#[derive(Debug, Default)]
pub struct ChartSet {
    outcomes: BTreeMap<ChartKind, Result<ChartArtifact, ChartRenderError>>,
    files: Vec<PathBuf>,
}

impl ChartSet {
    /// Records the outcome for one kind. `file` is the path the renderer wrote
    /// (or tried to write) and is removed by [`ChartSet::cleanup`].
    pub fn record(&mut self, kind: ChartKind, file: PathBuf, outcome: Result<ChartArtifact, ChartRenderError>) {
        if !self.files.contains(&file) {
            self.files.push(file);
        }
        self.outcomes.insert(kind, outcome);
    }

    pub fn outcome(&self, kind: ChartKind) -> Option<&Result<ChartArtifact, ChartRenderError>> {
        self.outcomes.get(&kind)
    }

    pub fn artifact(&self, kind: ChartKind) -> Option<&ChartArtifact> {
        self.outcome(kind).and_then(|r| r.as_ref().ok())
    }

    pub fn rendered(&self) -> impl Iterator<Item = &ChartArtifact> {
        self.outcomes.values().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChartRenderError> {
        self.outcomes.values().filter_map(|r| r.as_ref().err())
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Deletes every known chart file. Missing files are not an error, so
    /// calling this twice is harmless. Returns how many files were removed.
    pub fn cleanup(&self) -> usize {
        let mut removed = 0;
        for file in &self.files {
            match std::fs::remove_file(file) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "failed to remove chart file");
                }
            }
        }
        removed
    }
}

#[derive(Debug, Clone)]
pub struct ChartRenderer {
    theme: Arc<Theme>,
}

impl ChartRenderer {
    pub fn new(theme: Arc<Theme>) -> Self {
        Self { theme }
    }

    /// Renders the three charts for `result` into `dir`. A failing chart is
    /// logged and recorded; the others still render.
    pub fn render(&self, result: &AnalysisResult, dir: &Path, scope: &str) -> ChartSet {
        let mut set = ChartSet::default();
        for kind in ChartKind::ALL {
            let path = dir.join(chart_file_name(scope, kind));
            let outcome = self.render_one(kind, result, &path);
            match &outcome {
                Ok(_) => tracing::debug!(%kind, path = %path.display(), "chart rendered"),
                Err(err) => tracing::warn!(%kind, error = %err.detail, "chart rendering failed; report will omit it"),
            }
            set.record(kind, path, outcome);
        }
        set
    }

    fn render_one(
        &self,
        kind: ChartKind,
        result: &AnalysisResult,
        path: &Path,
    ) -> Result<ChartArtifact, ChartRenderError> {
        let products = result.products();
        let theme = self.theme.as_ref();
        let drawn = catch_unwind(AssertUnwindSafe(|| match kind {
            ChartKind::Share => draw::share(path, products, theme, kind.title()),
            ChartKind::Scatter => draw::scatter(path, products, theme, kind.title()),
            ChartKind::Growth => draw::growth(path, products, theme, kind.title()),
        }));

        let detail = match drawn {
            Ok(Ok(())) if path.is_file() => {
                return Ok(ChartArtifact {
                    kind,
                    path: path.to_path_buf(),
                })
            }
            Ok(Ok(())) => "renderer produced no file".to_string(),
            Ok(Err(err)) => err.to_string(),
            Err(panic) => panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "renderer panicked".to_string()),
        };
        Err(ChartRenderError { kind, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::metrics;
    use tempfile::TempDir;

    fn result() -> AnalysisResult {
        AnalysisResult::new(
            "Retail".into(),
            "05/03/2026".into(),
            vec![
                metrics("Alpha", 30.0, 1200.0, 4.5, 12.0),
                metrics("Beta", 15.0, 400.0, 3.9, -4.0),
                metrics("Gamma", 8.0, 650.0, 4.1, 22.0),
            ],
            "summary".into(),
            (1..=6).map(|i| format!("R{i}")).collect(),
        )
        .unwrap()
    }

    #[test]
    fn file_names_are_scoped() {
        assert_eq!(chart_file_name("abc", ChartKind::Growth), "chart_abc_growth.png");
        assert_ne!(
            chart_file_name("a", ChartKind::Share),
            chart_file_name("b", ChartKind::Share)
        );
    }

    #[test]
    fn render_records_every_kind_and_cleanup_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let renderer = ChartRenderer::new(Arc::new(Theme::default().with_chart_dpi(40)));
        let set = renderer.render(&result(), dir.path(), "req1");

        for kind in ChartKind::ALL {
            match set.outcome(kind).unwrap() {
                Ok(artifact) => assert!(artifact.path.is_file()),
                Err(err) => assert_eq!(err.kind, kind),
            }
        }
        assert_eq!(set.rendered().count() + set.failures().count(), 3);
        assert_eq!(set.files().len(), 3);

        set.cleanup();
        assert_eq!(set.cleanup(), 0);
        assert!(set.files().iter().all(|f| !f.exists()));
    }

    #[test]
    fn cleanup_ignores_missing_files() {
        let dir = TempDir::new().unwrap();
        let mut set = ChartSet::default();
        let path = dir.path().join(chart_file_name("x", ChartKind::Share));
        std::fs::write(&path, b"png").unwrap();
        set.record(
            ChartKind::Share,
            path.clone(),
            Ok(ChartArtifact {
                kind: ChartKind::Share,
                path,
            }),
        );
        set.record(
            ChartKind::Growth,
            dir.path().join(chart_file_name("x", ChartKind::Growth)),
            Err(ChartRenderError {
                kind: ChartKind::Growth,
                detail: "boom".into(),
            }),
        );

        assert_eq!(set.cleanup(), 1);
        assert_eq!(set.cleanup(), 0);
        assert!(set.artifact(ChartKind::Share).is_some());
        assert!(set.artifact(ChartKind::Growth).is_none());
    }
}
