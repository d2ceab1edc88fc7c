use crate::error::InvalidInputError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

pub const MIN_PRODUCTS: usize = 2;
pub const MAX_PRODUCTS: usize = 10;
pub const MAX_NAME_LEN: usize = 200;
pub const RECOMMENDATION_COUNT: usize = 6;

pub const MARKET_SHARE_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const SATISFACTION_RANGE: RangeInclusive<f64> = 0.0..=5.0;
pub const GROWTH_RANGE: RangeInclusive<f64> = -100.0..=1000.0;

pub const MIN_NARRATIVE_LEN: usize = 10;
pub const MAX_NARRATIVE_LEN: usize = 500;
pub const MAX_SWOT_ITEM_LEN: usize = 100;

/// Allowed number of entries in one SWOT category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListBounds {
    pub min: usize,
    pub max: usize,
}

impl ListBounds {
    pub const fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

pub const STRENGTHS_BOUNDS: ListBounds = ListBounds { min: 3, max: 8 };
pub const WEAKNESSES_BOUNDS: ListBounds = ListBounds { min: 2, max: 7 };
pub const OPPORTUNITIES_BOUNDS: ListBounds = ListBounds { min: 3, max: 8 };
pub const THREATS_BOUNDS: ListBounds = ListBounds { min: 2, max: 7 };

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub name: String,
    pub market_share: f64,
    pub price: f64,
    pub satisfaction: f64,
    pub growth: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub positioning: String,
    pub target_audience: String,
}

impl ProductMetrics {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let fail = |detail: String| InvalidInputError::InvalidMetrics {
            product: self.name.clone(),
            detail,
        };

        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(fail(format!("name must be 1..={MAX_NAME_LEN} characters")));
        }
        if !MARKET_SHARE_RANGE.contains(&self.market_share) {
            return Err(fail(format!("market_share out of range: {}", self.market_share)));
        }
        if !(self.price.is_finite() && self.price >= 0.0) {
            return Err(fail(format!("price must be >= 0 (got {})", self.price)));
        }
        if !SATISFACTION_RANGE.contains(&self.satisfaction) {
            return Err(fail(format!("satisfaction out of range: {}", self.satisfaction)));
        }
        if !GROWTH_RANGE.contains(&self.growth) {
            return Err(fail(format!("growth out of range: {}", self.growth)));
        }

        for (label, list, bounds) in [
            ("strengths", &self.strengths, STRENGTHS_BOUNDS),
            ("weaknesses", &self.weaknesses, WEAKNESSES_BOUNDS),
            ("opportunities", &self.opportunities, OPPORTUNITIES_BOUNDS),
            ("threats", &self.threats, THREATS_BOUNDS),
        ] {
            if !bounds.contains(list.len()) {
                return Err(fail(format!(
                    "{label} must have {}..={} entries (got {})",
                    bounds.min,
                    bounds.max,
                    list.len()
                )));
            }
            if list.iter().any(|s| s.trim().is_empty()) {
                return Err(fail(format!("{label} entries must be non-empty")));
            }
            if let Some(long) = list.iter().find(|s| s.chars().count() > MAX_SWOT_ITEM_LEN) {
                return Err(fail(format!(
                    "{label} entries must be at most {MAX_SWOT_ITEM_LEN} characters (got {})",
                    long.chars().count()
                )));
            }
        }

        for (label, text) in [
            ("positioning", &self.positioning),
            ("target_audience", &self.target_audience),
        ] {
            let len = text.chars().count();
            if !(MIN_NARRATIVE_LEN..=MAX_NARRATIVE_LEN).contains(&len) {
                return Err(fail(format!(
                    "{label} must be {MIN_NARRATIVE_LEN}..={MAX_NARRATIVE_LEN} characters (got {len})"
                )));
            }
        }

        Ok(())
    }
}

/// Means and totals over every product of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateStats {
    pub count: usize,
    pub avg_price: f64,
    pub avg_satisfaction: f64,
    pub avg_growth: f64,
    pub total_share: f64,
}

impl AggregateStats {
    pub fn of(products: &[ProductMetrics]) -> Self {
        let count = products.len();
        let mean = |f: fn(&ProductMetrics) -> f64| {
            if count == 0 {
                0.0
            } else {
                products.iter().map(f).sum::<f64>() / count as f64
            }
        };

        Self {
            count,
            avg_price: mean(|p| p.price),
            avg_satisfaction: mean(|p| p.satisfaction),
            avg_growth: mean(|p| p.growth),
            total_share: products.iter().map(|p| p.market_share).sum(),
        }
    }
}

/// Returns the product with the highest `key`; the earliest product wins ties.
pub fn top_by(products: &[ProductMetrics], key: fn(&ProductMetrics) -> f64) -> Option<&ProductMetrics> {
    products.iter().fold(None, |best: Option<&ProductMetrics>, p| match best {
        Some(b) if key(b) >= key(p) => Some(b),
        _ => Some(p),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    sector: String,
    analysis_date: String,
    products: Vec<ProductMetrics>,
    summary: String,
    recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn new(
        sector: String,
        analysis_date: String,
        products: Vec<ProductMetrics>,
        summary: String,
        recommendations: Vec<String>,
    ) -> Result<Self, InvalidInputError> {
        if products.len() < MIN_PRODUCTS {
            return Err(InvalidInputError::TooFewProducts {
                min: MIN_PRODUCTS,
                got: products.len(),
            });
        }
        if products.len() > MAX_PRODUCTS {
            return Err(InvalidInputError::TooManyProducts {
                max: MAX_PRODUCTS,
                got: products.len(),
            });
        }

        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.name.as_str()) {
                return Err(InvalidInputError::DuplicateProduct(product.name.clone()));
            }
            product.validate()?;
        }

        if sector.trim().is_empty() {
            return Err(InvalidInputError::EmptySector);
        }
        if recommendations.len() != RECOMMENDATION_COUNT {
            return Err(InvalidInputError::RecommendationCount {
                expected: RECOMMENDATION_COUNT,
                got: recommendations.len(),
            });
        }

        Ok(Self {
            sector,
            analysis_date,
            products,
            summary,
            recommendations,
        })
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn analysis_date(&self) -> &str {
        &self.analysis_date
    }

    pub fn products(&self) -> &[ProductMetrics] {
        &self.products
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn stats(&self) -> AggregateStats {
        AggregateStats::of(&self.products)
    }

    pub fn leader(&self) -> Option<&ProductMetrics> {
        top_by(&self.products, |p| p.market_share)
    }

    pub fn best_satisfaction(&self) -> Option<&ProductMetrics> {
        top_by(&self.products, |p| p.satisfaction)
    }

    pub fn best_growth(&self) -> Option<&ProductMetrics> {
        top_by(&self.products, |p| p.growth)
    }
}
