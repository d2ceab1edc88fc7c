use crate::domain::product::{MAX_NAME_LEN, MAX_PRODUCTS, MIN_PRODUCTS};
use crate::error::InvalidInputError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub products: Vec<String>,
    pub sector: String,
    #[serde(default)]
    pub llm: Option<LlmOptions>,
}

/// Per-request language model settings. Unset fields keep the server defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmOptions {
    #[serde(default)]
    pub use_llm: bool,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl LlmOptions {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(InvalidInputError::InvalidModelOption(format!(
                    "temperature must be between 0 and 2 (got {t})"
                )));
            }
        }
        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(InvalidInputError::InvalidModelOption(format!(
                    "top_p must be between 0 and 1 (got {p})"
                )));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(InvalidInputError::InvalidModelOption(
                "max_tokens must be positive".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(InvalidInputError::InvalidModelOption(
                "timeout_secs must be positive".to_string(),
            ));
        }
        if matches!(self.model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(InvalidInputError::InvalidModelOption(
                "model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub products: Vec<String>,
    pub sector: String,
    pub llm: Option<LlmOptions>,
}

impl AnalyzeRequest {
    pub fn validate(self) -> Result<ValidatedRequest, InvalidInputError> {
        let products = validate_products(&self.products)?;
        let sector = validate_sector(&self.sector)?;
        if let Some(llm) = &self.llm {
            llm.validate()?;
        }
        Ok(ValidatedRequest {
            products,
            sector,
            llm: self.llm,
        })
    }
}

/// Trims names, drops blank entries, then enforces count and uniqueness.
/// Uniqueness is an exact, case-sensitive comparison.
pub fn validate_products(products: &[String]) -> Result<Vec<String>, InvalidInputError> {
    let cleaned: Vec<String> = products
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.len() < MIN_PRODUCTS {
        return Err(InvalidInputError::TooFewProducts {
            min: MIN_PRODUCTS,
            got: cleaned.len(),
        });
    }
    if cleaned.len() > MAX_PRODUCTS {
        return Err(InvalidInputError::TooManyProducts {
            max: MAX_PRODUCTS,
            got: cleaned.len(),
        });
    }

    let mut seen = HashSet::with_capacity(cleaned.len());
    for name in &cleaned {
        if name.chars().count() > MAX_NAME_LEN {
            return Err(InvalidInputError::ProductNameTooLong { max: MAX_NAME_LEN });
        }
        if !seen.insert(name.as_str()) {
            return Err(InvalidInputError::DuplicateProduct(name.clone()));
        }
    }

    Ok(cleaned)
}

pub fn validate_sector(sector: &str) -> Result<String, InvalidInputError> {
    let sector = sector.trim();
    if sector.is_empty() {
        return Err(InvalidInputError::EmptySector);
    }
    if sector.chars().count() > MAX_NAME_LEN {
        return Err(InvalidInputError::SectorTooLong { max: MAX_NAME_LEN });
    }
    Ok(sector.to_string())
}
