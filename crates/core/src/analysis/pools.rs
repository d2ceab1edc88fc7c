use crate::domain::product::{ProductMetrics, RECOMMENDATION_COUNT};
use crate::error::InvalidInputError;

/// Fixed statement pools that seeded SWOT lists are sampled from.
#[derive(Debug, Clone)]
pub struct SwotPools {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SwotPools {
    fn default() -> Self {
        Self {
            strengths: owned(&[
                "Constant technological innovation",
                "Strong brand recognition",
                "Product quality and reliability",
                "Superior customer service",
                "Extensive distribution network",
                "Recognized technical expertise",
                "Robust supply chain",
                "Substantial R&D investment",
            ]),
            weaknesses: owned(&[
                "Premium pricing limits accessibility",
                "Reliance on a few geographic markets",
                "Complex product lineup",
                "High production costs",
                "Long development cycle",
                "Dependence on key suppliers",
                "Limited distribution channels",
            ]),
            opportunities: owned(&[
                "Expansion into emerging markets",
                "Digital transformation of the sector",
                "New customer segments",
                "Strategic partnerships",
                "Disruptive product innovation",
                "Shifting consumer behaviour",
                "Market consolidation",
                "Newly available technologies",
            ]),
            threats: owned(&[
                "Intensifying competition",
                "Stricter regulatory changes",
                "Changing consumer preferences",
                "Global economic instability",
                "Technological disruption",
                "Pressure on margins",
                "Raw material price volatility",
                "Geopolitical risks",
            ]),
        }
    }
}

/// Source of the closing recommendations of a report.
pub trait RecommendationStrategy: Send + Sync {
    fn recommend(&self, sector: &str, products: &[ProductMetrics]) -> Vec<String>;
}

/// The same recommendation list for every sector and product set.
#[derive(Debug, Clone)]
pub struct StaticRecommendations {
    items: Vec<String>,
}

impl StaticRecommendations {
    /// Keeps the first six statements; fewer than six is rejected.
    pub fn new(items: Vec<String>) -> Result<Self, InvalidInputError> {
        let mut items: Vec<String> = items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.len() < RECOMMENDATION_COUNT {
            return Err(InvalidInputError::RecommendationCount {
                expected: RECOMMENDATION_COUNT,
                got: items.len(),
            });
        }
        items.truncate(RECOMMENDATION_COUNT);
        Ok(Self { items })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl Default for StaticRecommendations {
    fn default() -> Self {
        Self {
            items: owned(&[
                "Invest heavily in innovation to keep a competitive edge",
                "Strengthen presence on digital and e-commerce channels",
                "Actively pursue geographic expansion opportunities",
                "Optimize the cost structure to improve operating profitability",
                "Build strategic partnerships across the ecosystem",
                "Improve the customer experience at every touchpoint",
            ]),
        }
    }
}

impl RecommendationStrategy for StaticRecommendations {
    fn recommend(&self, _sector: &str, _products: &[ProductMetrics]) -> Vec<String> {
        self.items.clone()
    }
}
