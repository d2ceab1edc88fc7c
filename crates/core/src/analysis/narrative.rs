//! Templated prose keyed on metric bands.

use crate::domain::product::{AggregateStats, ProductMetrics, MAX_NARRATIVE_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTier {
    Leader,
    MajorPlayer,
    Challenger,
}

impl MarketTier {
    pub fn from_share(market_share: f64) -> Self {
        if market_share > 25.0 {
            Self::Leader
        } else if market_share > 15.0 {
            Self::MajorPlayer
        } else {
            Self::Challenger
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Leader => "Undisputed leader",
            Self::MajorPlayer => "Major player",
            Self::Challenger => "Strategic challenger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSegment {
    UltraPremium,
    Premium,
    AccessiblePremium,
}

impl PriceSegment {
    pub fn from_price(price: f64) -> Self {
        if price > 1000.0 {
            Self::UltraPremium
        } else if price > 500.0 {
            Self::Premium
        } else {
            Self::AccessiblePremium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::UltraPremium => "ultra-premium",
            Self::Premium => "premium",
            Self::AccessiblePremium => "accessible premium",
        }
    }

    fn audience(self) -> &'static str {
        match self {
            Self::UltraPremium => "high-end customers and business decision makers",
            Self::Premium => "demanding professionals and individuals",
            Self::AccessiblePremium => "informed mainstream buyers and early adopters",
        }
    }
}

pub fn positioning(product: &str, sector: &str, market_share: f64, price: f64) -> String {
    let tier = MarketTier::from_share(market_share);
    let segment = PriceSegment::from_price(price);
    clip(
        &format!(
            "{} in the {} segment of the {sector} sector, {product} stands out through a \
             differentiation strategy built on innovation and quality.",
            tier.label(),
            segment.label(),
        ),
        MAX_NARRATIVE_LEN,
    )
}

pub fn target_audience(price: f64, satisfaction: f64, growth: f64) -> String {
    let audience = PriceSegment::from_price(price).audience();
    let loyalty = if satisfaction > 4.2 { "highly loyal" } else { "loyal" };
    let momentum = if growth > 15.0 {
        "an expanding"
    } else if growth >= 0.0 {
        "a stable"
    } else {
        "a contracting"
    };
    format!(
        "Primarily targets {audience}, with a {loyalty} customer base in {momentum} market \
         and high expectations for quality and innovation."
    )
}

pub fn executive_summary(sector: &str, products: &[ProductMetrics]) -> String {
    let stats = AggregateStats::of(products);

    let dynamic = if stats.avg_growth > 5.0 {
        "positive"
    } else if stats.avg_growth > 0.0 {
        "mixed"
    } else {
        "difficult"
    };
    let perception = if stats.avg_satisfaction > 4.3 {
        "an excellent overall perception"
    } else if stats.avg_satisfaction > 4.0 {
        "a good overall perception"
    } else {
        "a mixed perception"
    };

    let mut out = format!(
        "The {sector} sector shows {dynamic} momentum with average growth of {:.1}%. ",
        stats.avg_growth
    );
    if let Some(leader) = crate::domain::product::top_by(products, |p| p.market_share) {
        out.push_str(&format!(
            "{} leads the market with a {:.1}% share. ",
            leader.name, leader.market_share
        ));
    }
    out.push_str(&format!(
        "Average customer satisfaction stands at {:.1}/5, reflecting {perception}. \
         The {} products analysed account for {:.1}% of the total market, a significant \
         concentration. The analysis points to substantial opportunities in digital \
         transformation, product innovation and geographic expansion.",
        stats.avg_satisfaction, stats.count, stats.total_share
    ));
    out
}

/// Truncates to at most `max` characters, marking the cut with an ellipsis.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::metrics;

    #[test]
    fn tier_and_segment_thresholds_are_strict() {
        assert_eq!(MarketTier::from_share(25.0), MarketTier::MajorPlayer);
        assert_eq!(MarketTier::from_share(25.01), MarketTier::Leader);
        assert_eq!(MarketTier::from_share(15.0), MarketTier::Challenger);
        assert_eq!(PriceSegment::from_price(1000.0), PriceSegment::Premium);
        assert_eq!(PriceSegment::from_price(500.0), PriceSegment::AccessiblePremium);
        assert_eq!(PriceSegment::from_price(1500.0), PriceSegment::UltraPremium);
    }

    #[test]
    fn positioning_mentions_tier_segment_and_names() {
        let text = positioning("Alpha", "Retail", 30.0, 1200.0);
        assert!(text.starts_with("Undisputed leader in the ultra-premium segment"));
        assert!(text.contains("Retail"));
        assert!(text.contains("Alpha"));
    }

    #[test]
    fn target_audience_reflects_bands() {
        let text = target_audience(200.0, 4.5, 20.0);
        assert!(text.contains("early adopters"));
        assert!(text.contains("highly loyal"));
        assert!(text.contains("expanding"));
        assert!(target_audience(200.0, 4.0, -3.0).contains("contracting"));
        assert!(target_audience(200.0, 4.0, 0.0).contains("stable"));
    }

    #[test]
    fn positioning_is_clipped_for_long_inputs() {
        let long = "x".repeat(300);
        let text = positioning(&long, &long, 10.0, 100.0);
        assert_eq!(text.chars().count(), MAX_NARRATIVE_LEN);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn summary_names_leader_and_dynamics() {
        let products = vec![
            metrics("Alpha", 30.0, 500.0, 4.5, 10.0),
            metrics("Beta", 10.0, 900.0, 4.4, 12.0),
        ];
        let text = executive_summary("Retail", &products);
        assert!(text.starts_with("The Retail sector shows positive momentum"));
        assert!(text.contains("Alpha leads the market with a 30.0% share"));
        assert!(text.contains("an excellent overall perception"));
        assert!(text.contains("40.0% of the total market"));
    }
}
