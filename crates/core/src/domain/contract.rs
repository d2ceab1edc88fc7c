use crate::analysis::narrative;
use crate::domain::product::{
    ListBounds, ProductMetrics, GROWTH_RANGE, MARKET_SHARE_RANGE, MAX_NARRATIVE_LEN,
    MAX_SWOT_ITEM_LEN, MIN_NARRATIVE_LEN, OPPORTUNITIES_BOUNDS, SATISFACTION_RANGE,
    STRENGTHS_BOUNDS, THREATS_BOUNDS, WEAKNESSES_BOUNDS,
};
use anyhow::ensure;
use serde::{Deserialize, Serialize};

const DEFAULT_MARKET_SHARE: f64 = 20.0;
const DEFAULT_PRICE: f64 = 500.0;
const DEFAULT_SATISFACTION: f64 = 4.0;
const DEFAULT_GROWTH: f64 = 10.0;

/// Shape of the JSON object the language model is asked to emit for one product.
/// Every key is optional; numbers fall back to neutral defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmProductAnalysis {
    pub market_share: Option<f64>,
    pub price: Option<f64>,
    pub satisfaction: Option<f64>,
    pub growth: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
    pub positioning: Option<String>,
    pub target_audience: Option<String>,
}

impl LlmProductAnalysis {
    pub fn validate_and_into_metrics(self, name: &str, sector: &str) -> anyhow::Result<ProductMetrics> {
        let name = name.trim().to_string();
        ensure!(!name.is_empty(), "product name must be non-empty");

        let market_share = self.market_share.unwrap_or(DEFAULT_MARKET_SHARE);
        let price = self.price.unwrap_or(DEFAULT_PRICE);
        let satisfaction = self.satisfaction.unwrap_or(DEFAULT_SATISFACTION);
        let growth = self.growth.unwrap_or(DEFAULT_GROWTH);

        ensure!(
            MARKET_SHARE_RANGE.contains(&market_share),
            "market_share out of range: {market_share}"
        );
        ensure!(price.is_finite() && price >= 0.0, "price must be >= 0 (got {price})");
        ensure!(
            SATISFACTION_RANGE.contains(&satisfaction),
            "satisfaction out of range: {satisfaction}"
        );
        ensure!(GROWTH_RANGE.contains(&growth), "growth out of range: {growth}");

        let strengths = clean_list("strengths", self.strengths, STRENGTHS_BOUNDS)?;
        let weaknesses = clean_list("weaknesses", self.weaknesses, WEAKNESSES_BOUNDS)?;
        let opportunities = clean_list("opportunities", self.opportunities, OPPORTUNITIES_BOUNDS)?;
        let threats = clean_list("threats", self.threats, THREATS_BOUNDS)?;

        let positioning = narrative_or(self.positioning, || {
            narrative::positioning(&name, sector, market_share, price)
        });
        let target_audience = narrative_or(self.target_audience, || {
            narrative::target_audience(price, satisfaction, growth)
        });

        Ok(ProductMetrics {
            name,
            market_share,
            price,
            satisfaction,
            growth,
            strengths,
            weaknesses,
            opportunities,
            threats,
            positioning,
            target_audience,
        })
    }
}

fn clean_list(label: &str, items: Vec<String>, bounds: ListBounds) -> anyhow::Result<Vec<String>> {
    let mut cleaned: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| narrative::clip(&s, MAX_SWOT_ITEM_LEN))
        .collect();
    cleaned.truncate(bounds.max);
    ensure!(
        cleaned.len() >= bounds.min,
        "{label} must have at least {} entries (got {})",
        bounds.min,
        cleaned.len()
    );
    Ok(cleaned)
}

fn narrative_or(text: Option<String>, derive: impl FnOnce() -> String) -> String {
    match text.map(|s| s.trim().to_string()) {
        Some(s) if s.chars().count() >= MIN_NARRATIVE_LEN => narrative::clip(&s, MAX_NARRATIVE_LEN),
        _ => derive(),
    }
}
