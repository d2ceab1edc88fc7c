use crate::domain::contract::LlmProductAnalysis;
use crate::domain::product::ProductMetrics;
use anyhow::Context;

const SUMMARY_MAX_WORDS: usize = 250;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.split_once('\n').map(|(_, rest)| rest) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

pub fn parse_product_analysis(text: &str, product: &str, sector: &str) -> anyhow::Result<ProductMetrics> {
    let json_str = extract_json(text).context("model output contains no JSON object")?;
    let parsed = serde_json::from_str::<LlmProductAnalysis>(&json_str)
        .with_context(|| format!("model output is not valid JSON for the product schema: {json_str}"))?;
    parsed.validate_and_into_metrics(product, sector)
}

/// Normalizes a free-text summary: unwraps a JSON envelope if the model sent one,
/// strips markdown markers, collapses whitespace and caps the word count.
/// Returns `None` when nothing usable is left.
pub fn clean_summary(text: &str) -> Option<String> {
    let mut s = text.trim().to_string();

    if s.starts_with("```") {
        s = s.replace("```json", "").replace("```", "");
        s = s.trim().to_string();
    }
    if s.starts_with('{') && s.ends_with('}') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&s) {
            if let Some(inner) = ["summary", "executive_summary", "text"]
                .iter()
                .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
            {
                s = inner.to_string();
            }
        }
    }

    let s = s
        .replace("**", "")
        .replace("__", "")
        .replace("```", "")
        .replace('`', "");

    let words: Vec<&str> = s.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    if words.len() > SUMMARY_MAX_WORDS {
        let mut capped = words[..SUMMARY_MAX_WORDS].join(" ");
        capped.push_str("...");
        return Some(capped);
    }
    Some(words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "market_share": 22.5,
            "price": 799.0,
            "satisfaction": 4.3,
            "growth": 12.0,
            "strengths": ["Strong brand", "Wide catalogue", "Fast delivery"],
            "weaknesses": ["High price", "Narrow reach"],
            "opportunities": ["New markets", "Partnerships", "Online sales"],
            "threats": ["Competition", "Regulation"],
            "positioning": "Premium challenger focused on design-led products.",
            "target_audience": "Urban professionals who value design."
        })
    }

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "prefix {\"a\":1} suffix";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn parses_product_wrapped_in_prose() {
        let text = format!("Here is the analysis:\n{}\nHope this helps.", product_json());
        let m = parse_product_analysis(&text, "Alpha", "Retail").unwrap();
        assert_eq!(m.name, "Alpha");
        assert_eq!(m.market_share, 22.5);
        assert_eq!(m.weaknesses.len(), 2);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn rejects_non_json_output() {
        assert!(parse_product_analysis("I cannot help with that.", "Alpha", "Retail").is_err());
        assert!(parse_product_analysis("{not json}", "Alpha", "Retail").is_err());
    }

    #[test]
    fn clean_summary_strips_markdown_and_whitespace() {
        let s = clean_summary("  The **Retail** sector\n\n shows `growth`.  ").unwrap();
        assert_eq!(s, "The Retail sector shows growth.");
    }

    #[test]
    fn clean_summary_unwraps_json_envelope() {
        let raw = json!({"summary": "The Retail sector is growing."}).to_string();
        assert_eq!(clean_summary(&raw).unwrap(), "The Retail sector is growing.");
    }

    #[test]
    fn clean_summary_caps_word_count() {
        let long = vec!["word"; 300].join(" ");
        let s = clean_summary(&long).unwrap();
        assert_eq!(s.split_whitespace().count(), 250);
        assert!(s.ends_with("..."));
        assert!(clean_summary("   ").is_none());
    }
}
