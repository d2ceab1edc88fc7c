pub mod narrative;
pub mod pools;
pub mod seeded;

use crate::domain::product::{AnalysisResult, ProductMetrics};
use crate::domain::request::{validate_products, validate_sector};
use crate::error::{ExternalModelTimeoutError, InvalidInputError};
use crate::time::stamp;
use chrono::NaiveDate;
use pools::{RecommendationStrategy, StaticRecommendations};
use seeded::SeededSynthesizer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Simulation,
    Llm,
}

/// Produces the metrics of one product. Implementations may be slow or fail;
/// the analyzer bounds and recovers every call.
#[async_trait::async_trait]
pub trait ProductSynthesizer: Send + Sync {
    fn mode(&self) -> AnalysisMode;

    async fn synthesize(&self, product: &str, sector: &str) -> anyhow::Result<ProductMetrics>;

    /// Optional narrative summary. `None` means the templated summary is used.
    async fn summarize(
        &self,
        _sector: &str,
        _products: &[ProductMetrics],
    ) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub result: AnalysisResult,
    pub mode: AnalysisMode,
    /// Products whose metrics came from the seeded fallback instead of the strategy.
    pub fallbacks: usize,
}

#[derive(Clone)]
pub struct MarketAnalyzer {
    strategy: Arc<dyn ProductSynthesizer>,
    fallback: SeededSynthesizer,
    recommendations: Arc<dyn RecommendationStrategy>,
    model_timeout: Duration,
}

impl Default for MarketAnalyzer {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MarketAnalyzer {
    pub fn seeded() -> Self {
        let fallback = SeededSynthesizer::default();
        Self {
            strategy: Arc::new(fallback.clone()),
            fallback,
            recommendations: Arc::new(StaticRecommendations::default()),
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ProductSynthesizer>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_recommendations(mut self, recommendations: Arc<dyn RecommendationStrategy>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn mode(&self) -> AnalysisMode {
        self.strategy.mode()
    }

    /// Validates the inputs, then synthesizes one metrics record per product in
    /// input order. Only invalid input fails; strategy failures degrade to the
    /// seeded synthesizer product by product.
    pub async fn synthesize(
        &self,
        products: &[String],
        sector: &str,
        date: NaiveDate,
    ) -> Result<AnalysisRun, InvalidInputError> {
        let products = validate_products(products)?;
        let sector = validate_sector(sector)?;
        let use_model = self.strategy.mode() == AnalysisMode::Llm;

        tracing::info!(%sector, products = products.len(), ?use_model, "synthesizing market analysis");

        let mut metrics = Vec::with_capacity(products.len());
        let mut fallbacks = 0usize;
        for (i, product) in products.iter().enumerate() {
            let m = if use_model {
                match self.from_strategy(product, &sector).await {
                    Some(m) => m,
                    None => {
                        fallbacks += 1;
                        self.fallback.metrics_for(product, &sector)
                    }
                }
            } else {
                self.fallback.metrics_for(product, &sector)
            };
            tracing::debug!(index = i + 1, product = %m.name, share = m.market_share, "product synthesized");
            metrics.push(m);
        }

        let model_used = use_model && fallbacks < metrics.len();
        let model_summary = if model_used {
            self.model_summary(&sector, &metrics).await
        } else {
            None
        };
        let summary =
            model_summary.unwrap_or_else(|| narrative::executive_summary(&sector, &metrics));

        let recommendations = self.recommendations.recommend(&sector, &metrics);
        let result = AnalysisResult::new(
            sector,
            stamp::analysis_date(date),
            metrics,
            summary,
            recommendations,
        )?;

        Ok(AnalysisRun {
            result,
            mode: if model_used {
                AnalysisMode::Llm
            } else {
                AnalysisMode::Simulation
            },
            fallbacks,
        })
    }

    async fn from_strategy(&self, product: &str, sector: &str) -> Option<ProductMetrics> {
        let outcome =
            tokio::time::timeout(self.model_timeout, self.strategy.synthesize(product, sector)).await;
        match outcome {
            Ok(Ok(m)) => match m.validate() {
                Ok(()) if m.name == product => Some(m),
                Ok(()) => {
                    tracing::warn!(%product, returned = %m.name, "model returned metrics for another product; using simulation");
                    None
                }
                Err(err) => {
                    tracing::warn!(%product, error = %err, "model metrics rejected; using simulation");
                    None
                }
            },
            Ok(Err(err)) => {
                tracing::warn!(%product, error = %format!("{err:#}"), "model analysis failed; using simulation");
                None
            }
            Err(_) => {
                let err = ExternalModelTimeoutError {
                    timeout: self.model_timeout,
                };
                tracing::warn!(%product, error = %err, "model analysis timed out; using simulation");
                None
            }
        }
    }

    async fn model_summary(&self, sector: &str, products: &[ProductMetrics]) -> Option<String> {
        let outcome =
            tokio::time::timeout(self.model_timeout, self.strategy.summarize(sector, products)).await;
        match outcome {
            Ok(Ok(Some(s))) if !s.trim().is_empty() => Some(s),
            Ok(Ok(_)) => None,
            Ok(Err(err)) => {
                tracing::warn!(%sector, error = %format!("{err:#}"), "model summary failed; using template");
                None
            }
            Err(_) => {
                let err = ExternalModelTimeoutError {
                    timeout: self.model_timeout,
                };
                tracing::warn!(%sector, error = %err, "model summary timed out; using template");
                None
            }
        }
    }
}
