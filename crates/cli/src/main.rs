use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_study_core::config::Settings;
use market_study_core::domain::request::{AnalyzeRequest, LlmOptions};
use market_study_core::error::ServiceError;
use market_study_core::service::AnalysisService;

#[derive(Debug, Parser)]
#[command(name = "market_study_cli", about = "Generate a comparative market study PDF")]
struct Args {
    /// Market sector the products compete in.
    #[arg(long)]
    sector: String,

    /// Product to analyse. Repeat for each product (2 to 10).
    #[arg(long = "product", required = true)]
    products: Vec<String>,

    /// Output directory. Defaults to REPORTS_DIR or `reports`.
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Ask the Ollama model for the metrics instead of the seeded simulation.
    #[arg(long)]
    use_llm: bool,

    /// Ollama model name; implies --use-llm.
    #[arg(long)]
    model: Option<String>,

    /// Synthesize and print the analysis without writing a report.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn request(&self) -> AnalyzeRequest {
        let llm = (self.use_llm || self.model.is_some()).then(|| LlmOptions {
            use_llm: true,
            model: self.model.clone(),
            ..LlmOptions::default()
        });
        AnalyzeRequest {
            products: self.products.clone(),
            sector: self.sector.clone(),
            llm,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(dir) = &args.reports_dir {
        settings.reports_dir = Some(dir.to_string_lossy().into_owned());
    }
    let service = AnalysisService::from_settings(&settings);
    let request = args.request();

    let output = if args.dry_run {
        let run = service.synthesize(request).await.map_err(report_failure)?;
        tracing::info!(dry_run = true, mode = ?run.mode, fallbacks = run.fallbacks, "analysis synthesized");
        serde_json::json!({
            "analysis_mode": run.mode,
            "fallbacks": run.fallbacks,
            "result": run.result,
        })
    } else {
        let response = service.analyze(request).await.map_err(report_failure)?;
        serde_json::to_value(&response).context("failed to encode response")?
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to encode output")?
    );
    Ok(())
}

fn report_failure(err: ServiceError) -> anyhow::Error {
    let err = anyhow::Error::new(err).context("market study run failed");
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %format!("{err:#}"), "market study run failed");
    err
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_products() {
        let args = Args::try_parse_from([
            "market_study_cli",
            "--sector",
            "Coffee",
            "--product",
            "Alpha",
            "--product",
            "Beta",
        ])
        .unwrap();
        let request = args.request();
        assert_eq!(request.products, ["Alpha", "Beta"]);
        assert!(request.llm.is_none());
    }

    #[test]
    fn model_implies_language_model() {
        let args = Args::try_parse_from([
            "market_study_cli",
            "--sector",
            "Coffee",
            "--product",
            "Alpha",
            "--model",
            "llama3",
        ])
        .unwrap();
        let llm = args.request().llm.unwrap();
        assert!(llm.use_llm);
        assert_eq!(llm.model.as_deref(), Some("llama3"));
    }

    #[test]
    fn product_is_required() {
        assert!(Args::try_parse_from(["market_study_cli", "--sector", "Coffee"]).is_err());
    }
}
