use crate::analysis::{AnalysisMode, ProductSynthesizer};
use crate::domain::product::ProductMetrics;
use crate::llm::{json, prompts, GenerateInput, LlmClient};
use std::sync::Arc;

/// Asks a language model for each product's metrics and for the summary.
#[derive(Clone)]
pub struct LlmSynthesizer {
    client: Arc<dyn LlmClient>,
}

impl LlmSynthesizer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ProductSynthesizer for LlmSynthesizer {
    fn mode(&self) -> AnalysisMode {
        AnalysisMode::Llm
    }

    async fn synthesize(&self, product: &str, sector: &str) -> anyhow::Result<ProductMetrics> {
        let text = self
            .client
            .generate(GenerateInput {
                system: Some(prompts::system_prompt()),
                prompt: prompts::product_prompt(product, sector),
            })
            .await?;
        json::parse_product_analysis(&text, product, sector)
    }

    async fn summarize(
        &self,
        sector: &str,
        products: &[ProductMetrics],
    ) -> anyhow::Result<Option<String>> {
        let text = self
            .client
            .generate(GenerateInput {
                system: Some(prompts::system_prompt()),
                prompt: prompts::summary_prompt(sector, products),
            })
            .await?;
        Ok(json::clean_summary(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MarketAnalyzer;
    use crate::llm::Provider;
    use chrono::NaiveDate;
    use serde_json::json;

    struct CannedClient;

    #[async_trait::async_trait]
    impl LlmClient for CannedClient {
        fn provider(&self) -> Provider {
            Provider::Ollama
        }

        async fn generate(&self, input: GenerateInput) -> anyhow::Result<String> {
            if input.prompt.contains("executive summary") {
                return Ok("**The Retail sector** is healthy.".to_string());
            }
            if input.prompt.contains("Product: Broken") {
                return Ok("Sorry, I cannot answer.".to_string());
            }
            Ok(json!({
                "market_share": 18.0,
                "price": 640.0,
                "satisfaction": 4.4,
                "growth": 9.5,
                "strengths": ["Brand", "Quality", "Service"],
                "weaknesses": ["Price", "Reach", "Lineup"],
                "opportunities": ["Export", "Online", "Partners"],
                "threats": ["Rivals", "Rules", "Costs"],
            })
            .to_string())
        }
    }

    #[tokio::test]
    async fn parses_model_output_into_metrics() {
        let synth = LlmSynthesizer::new(Arc::new(CannedClient));
        let m = synth.synthesize("Alpha", "Retail").await.unwrap();
        assert_eq!(m.name, "Alpha");
        assert_eq!(m.price, 640.0);
        assert!(m.positioning.contains("Major player"));
    }

    #[tokio::test]
    async fn unparsable_product_falls_back_inside_analyzer() {
        let analyzer = MarketAnalyzer::seeded().with_strategy(Arc::new(LlmSynthesizer::new(Arc::new(CannedClient))));
        let run = analyzer
            .synthesize(
                &["Alpha".to_string(), "Broken".to_string()],
                "Retail",
                NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(run.mode, AnalysisMode::Llm);
        assert_eq!(run.fallbacks, 1);
        assert_eq!(run.result.products()[0].price, 640.0);
        assert_eq!(run.result.summary(), "The Retail sector is healthy.");
    }
}
