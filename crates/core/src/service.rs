//! End-to-end pipeline shared by the HTTP API and the CLI: validate, synthesize,
//! render charts, assemble the PDF, clean up.

use crate::analysis::{AnalysisRun, MarketAnalyzer};
use crate::chart::ChartRenderer;
use crate::config::Settings;
use crate::domain::request::{AnalyzeRequest, LlmOptions};
use crate::domain::response::{download_url, AnalysisSummary, AnalyzeResponse};
use crate::error::{ReportGenerationError, ServiceError};
use crate::llm::ollama::{OllamaClient, OllamaOptions};
use crate::llm::synth::LlmSynthesizer;
use crate::report::ReportAssembler;
use crate::style::Theme;
use crate::time::stamp;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct AnalysisService {
    settings: Settings,
    renderer: ChartRenderer,
    assembler: ReportAssembler,
    reports_dir: PathBuf,
}

impl AnalysisService {
    pub fn from_settings(settings: &Settings) -> Self {
        let theme = Arc::new(Theme::default().with_chart_dpi(settings.chart_dpi()));
        Self {
            settings: settings.clone(),
            renderer: ChartRenderer::new(theme.clone()),
            assembler: ReportAssembler::new(theme, settings.report_prefix()),
            reports_dir: settings.reports_dir(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Synthesizes the analysis without producing any file.
    pub async fn synthesize(&self, request: AnalyzeRequest) -> Result<AnalysisRun, ServiceError> {
        let request = request.validate()?;
        let analyzer = self.analyzer_for(request.llm.as_ref()).await;
        Ok(analyzer
            .synthesize(&request.products, &request.sector, stamp::today())
            .await?)
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, ServiceError> {
        let run = self.synthesize(request).await?;

        let renderer = self.renderer.clone();
        let assembler = self.assembler.clone();
        let dir = self.reports_dir.clone();
        let result = run.result.clone();
        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, ReportGenerationError> {
            std::fs::create_dir_all(&dir).map_err(ReportGenerationError::Directory)?;
            let scope = uuid::Uuid::new_v4().simple().to_string();
            let charts = renderer.render(&result, &dir, &scope);
            let written = assembler.assemble(&result, &charts, &dir);
            charts.cleanup();
            written
        })
        .await??;

        let pdf_filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(
            file = %pdf_filename,
            sector = %run.result.sector(),
            mode = ?run.mode,
            fallbacks = run.fallbacks,
            "analysis completed"
        );

        Ok(AnalyzeResponse {
            success: true,
            pdf_url: download_url(&pdf_filename),
            pdf_filename,
            analysis: AnalysisSummary::from_result(&run.result, run.mode),
        })
    }

    /// Picks the strategy for one request. The model path is used only when
    /// asked for and when the server and model are both available.
    async fn analyzer_for(&self, llm: Option<&LlmOptions>) -> MarketAnalyzer {
        let wanted = llm.map_or(self.settings.use_llm, |o| o.use_llm);
        if !wanted {
            return MarketAnalyzer::seeded();
        }

        let mut options = OllamaOptions::from_settings(&self.settings);
        if let Some(overrides) = llm {
            options = options.with_overrides(overrides);
        }
        let timeout = options.timeout;
        let client = match OllamaClient::new(options) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "language model client unavailable; using simulation");
                return MarketAnalyzer::seeded();
            }
        };
        if !client.check_connection().await {
            tracing::warn!(host = %client.options().host, "Ollama not reachable; using simulation");
            return MarketAnalyzer::seeded();
        }
        if !client.check_model_exists().await {
            tracing::warn!(model = %client.options().model, "Ollama model unavailable; using simulation");
            return MarketAnalyzer::seeded();
        }

        tracing::info!(model = %client.options().model, "using language model analysis");
        MarketAnalyzer::seeded()
            .with_strategy(Arc::new(LlmSynthesizer::new(Arc::new(client))))
            .with_model_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisMode;
    use crate::error::InvalidInputError;
    use crate::time::stamp::is_report_stamp;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(dir: &Path) -> AnalysisService {
        AnalysisService::from_settings(&Settings {
            reports_dir: Some(dir.to_string_lossy().into_owned()),
            chart_dpi: Some(40),
            ..Settings::default()
        })
    }

    fn request(products: &[&str]) -> AnalyzeRequest {
        AnalyzeRequest {
            products: products.iter().map(|p| p.to_string()).collect(),
            sector: "Test Sector".into(),
            llm: None,
        }
    }

    fn dir_names(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn analyze_writes_report_and_removes_charts() {
        let dir = TempDir::new().unwrap();
        let response = service(dir.path()).analyze(request(&["Alpha", "Beta"])).await.unwrap();

        assert!(response.success);
        assert_eq!(response.pdf_url, format!("/api/download/{}", response.pdf_filename));
        let stamp = response
            .pdf_filename
            .strip_prefix("market_study_")
            .and_then(|s| s.strip_suffix(".pdf"))
            .unwrap();
        assert!(is_report_stamp(stamp));

        let summary = &response.analysis;
        assert_eq!(summary.products_count, 2);
        assert_eq!(summary.products[0].name, "Alpha");
        assert_eq!(summary.products[1].name, "Beta");
        assert!(!summary.summary.is_empty());
        assert_eq!(summary.analysis_mode, AnalysisMode::Simulation);

        assert_eq!(dir_names(dir.path()), [response.pdf_filename.clone()]);
    }

    #[tokio::test]
    async fn invalid_request_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let reports = dir.path().join("reports");
        let err = service(&reports).analyze(request(&["Alpha", "Alpha"])).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidInput(InvalidInputError::DuplicateProduct(_))
        ));
        assert!(!reports.exists());
    }

    #[tokio::test]
    async fn unreachable_model_falls_back_to_simulation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let service = AnalysisService::from_settings(&Settings {
            reports_dir: Some(dir.path().to_string_lossy().into_owned()),
            ollama_host: Some(server.uri()),
            use_llm: true,
            ..Settings::default()
        });
        let run = service.synthesize(request(&["Alpha", "Beta"])).await.unwrap();
        assert_eq!(run.mode, AnalysisMode::Simulation);
        assert_eq!(run.result.products().len(), 2);
    }

    #[tokio::test]
    async fn request_can_opt_out_of_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let service = AnalysisService::from_settings(&Settings {
            reports_dir: Some(dir.path().to_string_lossy().into_owned()),
            ollama_host: Some(server.uri()),
            use_llm: true,
            ..Settings::default()
        });
        let mut req = request(&["Alpha", "Beta"]);
        req.llm = Some(LlmOptions::default());
        let run = service.synthesize(req).await.unwrap();
        assert_eq!(run.mode, AnalysisMode::Simulation);
    }
}
