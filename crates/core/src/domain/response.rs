use crate::analysis::AnalysisMode;
use crate::domain::product::AnalysisResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub pdf_filename: String,
    pub pdf_url: String,
    pub analysis: AnalysisSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub sector: String,
    pub date: String,
    pub products_count: usize,
    pub products: Vec<ProductRow>,
    pub summary: String,
    pub analysis_mode: AnalysisMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub name: String,
    pub market_share: f64,
    pub price: f64,
    pub satisfaction: f64,
    pub growth: f64,
}

impl AnalysisSummary {
    pub fn from_result(result: &AnalysisResult, mode: AnalysisMode) -> Self {
        Self {
            sector: result.sector().to_string(),
            date: result.analysis_date().to_string(),
            products_count: result.products().len(),
            products: result
                .products()
                .iter()
                .map(|p| ProductRow {
                    name: p.name.clone(),
                    market_share: p.market_share,
                    price: p.price,
                    satisfaction: p.satisfaction,
                    growth: p.growth,
                })
                .collect(),
            summary: result.summary().to_string(),
            analysis_mode: mode,
        }
    }
}

pub fn download_url(pdf_filename: &str) -> String {
    format!("/api/download/{pdf_filename}")
}
