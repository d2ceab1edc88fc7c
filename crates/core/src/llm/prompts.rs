use crate::domain::product::ProductMetrics;

pub fn system_prompt() -> String {
    [
        "You are a market analysis and business strategy expert with 15 years of experience.",
        "You give precise, factual and professional analyses grounded in real market data.",
        "Always answer in English and in the requested format (JSON or plain text).",
    ]
    .join("\n")
}

pub fn product_prompt(product: &str, sector: &str) -> String {
    format!(
        "Analyse the following product:\n\
- Product: {product}\n\
- Sector: {sector}\n\n\
Return a JSON object with exactly these keys:\n\
{{\n\
  \"market_share\": <float between 5 and 35>,\n\
  \"price\": <float between 100 and 2000>,\n\
  \"satisfaction\": <float between 3.0 and 4.8>,\n\
  \"growth\": <float between -10 and 40>,\n\
  \"strengths\": [<3-5 short strengths, at most 50 characters each>],\n\
  \"weaknesses\": [<3-4 short weaknesses, at most 50 characters each>],\n\
  \"opportunities\": [<3-5 short opportunities, at most 50 characters each>],\n\
  \"threats\": [<3-4 short threats, at most 50 characters each>],\n\
  \"positioning\": \"<strategic positioning, 100-150 characters>\",\n\
  \"target_audience\": \"<target audience, 100-150 characters>\"\n\
}}\n\n\
Rules:\n\
- Every SWOT item is a short, complete phrase (example: \"High price limits accessibility\").\n\
- Be realistic and base the figures on current market data.\n\
- Reply with the JSON only, no text before or after."
    )
}

pub fn summary_prompt(sector: &str, products: &[ProductMetrics]) -> String {
    let lines = products
        .iter()
        .map(|p| {
            format!(
                "- {}: market share {:.1}%, satisfaction {:.1}/5, growth {:+.1}%",
                p.name, p.market_share, p.satisfaction, p.growth
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write a professional executive summary (150-200 words MAXIMUM) for a market study of \
the {sector} sector.\n\n\
Products analysed:\n{lines}\n\n\
The summary must mention the leader and its market share, the average customer \
satisfaction, and the key trends and opportunities.\n\n\
Do NOT use JSON, code, markdown markers or a title. Write one or two paragraphs of plain \
text and start directly with \"The {sector} sector\"."
    )
}
