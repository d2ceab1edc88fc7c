use crate::chart::{ChartKind, ChartSet};
use crate::domain::product::{AnalysisResult, ProductMetrics};
use crate::report::blocks::{Block, ReportPlan, Section, SectionKind, SwotGrid, TableBlock, TableKind};
use crate::style::TextRole;

const REPORT_TITLE: &str = "COMPREHENSIVE MARKET STUDY";

/// Orders the report: cover, summary, comparison, charts, one detail section
/// per product in input order, conclusion.
pub fn plan(result: &AnalysisResult, charts: &ChartSet) -> ReportPlan {
    let mut sections = vec![
        cover(result),
        executive_summary(result),
        comparison(result),
        chart_section(charts),
    ];
    sections.extend(
        result
            .products()
            .iter()
            .enumerate()
            .map(|(i, p)| product_detail(i, p)),
    );
    sections.push(conclusion(result));

    ReportPlan {
        title: format!("Market study - {}", result.sector()),
        sections,
    }
}

fn cover(result: &AnalysisResult) -> Section {
    let n = result.products().len();
    Section {
        kind: SectionKind::Cover,
        blocks: vec![
            Block::Spacer(55.0),
            Block::text(TextRole::Title, REPORT_TITLE),
            Block::Spacer(6.0),
            Block::text(TextRole::Title, result.sector().to_uppercase()),
            Block::Spacer(18.0),
            Block::text(TextRole::Heading, format!("Comparative analysis of {n} products")),
            Block::text(
                TextRole::Subheading,
                format!("Report generated on {}", result.analysis_date()),
            ),
            Block::Spacer(35.0),
            Block::text(TextRole::Body, format!("Sector analysed: {}", result.sector())),
            Block::text(TextRole::Body, format!("Number of products: {n}")),
            Block::text(TextRole::Body, format!("Analysis date: {}", result.analysis_date())),
            Block::text(TextRole::Body, "Report type: Full comparative analysis"),
            Block::text(TextRole::Body, format!("Version: {}", env!("CARGO_PKG_VERSION"))),
        ],
    }
}

fn executive_summary(result: &AnalysisResult) -> Section {
    let stats = result.stats();
    let mut rows = vec![
        vec!["Products analysed".to_string(), stats.count.to_string()],
        vec!["Average price".to_string(), format!("{:.2}", stats.avg_price)],
        vec![
            "Average satisfaction".to_string(),
            format!("{:.2}/5", stats.avg_satisfaction),
        ],
        vec!["Average growth".to_string(), format!("{:+.1}%", stats.avg_growth)],
        vec!["Total market share".to_string(), format!("{:.1}%", stats.total_share)],
    ];
    if let Some(leader) = result.leader() {
        rows.push(vec![
            "Top performer (share)".to_string(),
            format!("{} ({:.1}%)", leader.name, leader.market_share),
        ]);
    }

    Section {
        kind: SectionKind::ExecutiveSummary,
        blocks: vec![
            Block::text(TextRole::Heading, "EXECUTIVE SUMMARY"),
            Block::text(TextRole::Body, result.summary()),
            Block::Spacer(6.0),
            Block::text(TextRole::Subheading, "Key statistics"),
            Block::Table(TableBlock {
                kind: TableKind::Stats,
                header: vec!["Indicator".to_string(), "Value".to_string()],
                rows,
                widths: vec![0.6, 0.4],
            }),
        ],
    }
}

fn comparison(result: &AnalysisResult) -> Section {
    let rows = result
        .products()
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                format!("{:.1}%", p.market_share),
                format!("{:.0}", p.price),
                format!("{:.1}/5", p.satisfaction),
                format!("{:+.1}%", p.growth),
            ]
        })
        .collect();

    let mut blocks = vec![
        Block::text(TextRole::Heading, "COMPARATIVE ANALYSIS"),
        Block::Table(TableBlock {
            kind: TableKind::Data,
            header: ["Product", "Market share", "Avg. price", "Satisfaction", "Annual growth"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows,
            widths: vec![0.32, 0.17, 0.17, 0.17, 0.17],
        }),
        Block::Spacer(6.0),
        Block::text(TextRole::Subheading, "Key comparison points"),
    ];

    if let Some(p) = result.leader() {
        blocks.push(Block::text(
            TextRole::Body,
            format!("- Market leader: {} with a {:.1}% share", p.name, p.market_share),
        ));
    }
    if let Some(p) = result.best_satisfaction() {
        blocks.push(Block::text(
            TextRole::Body,
            format!("- Best satisfaction: {} ({:.1}/5)", p.name, p.satisfaction),
        ));
    }
    if let Some(p) = result.best_growth() {
        blocks.push(Block::text(
            TextRole::Body,
            format!("- Strongest growth: {} ({:+.1}%)", p.name, p.growth),
        ));
    }
    blocks.push(Block::text(
        TextRole::Body,
        "- Price positioning and performance vary widely, reflecting diverse market strategies.",
    ));

    Section {
        kind: SectionKind::Comparison,
        blocks,
    }
}

fn chart_section(charts: &ChartSet) -> Section {
    let mut blocks = vec![Block::text(TextRole::Heading, "CHARTS")];

    if charts.rendered().next().is_none() {
        blocks.push(Block::ChartNote {
            kind: None,
            text: "Charts could not be generated for this report.".to_string(),
        });
    } else {
        for kind in ChartKind::ALL {
            match charts.artifact(kind) {
                Some(artifact) => {
                    blocks.push(Block::text(TextRole::Subheading, kind.title()));
                    blocks.push(Block::Chart {
                        kind,
                        path: artifact.path.clone(),
                    });
                    blocks.push(Block::Spacer(6.0));
                }
                None => blocks.push(Block::ChartNote {
                    kind: Some(kind),
                    text: format!("The \"{}\" chart is not available for this report.", kind.title()),
                }),
            }
        }
    }

    Section {
        kind: SectionKind::Charts,
        blocks,
    }
}

fn product_detail(index: usize, p: &ProductMetrics) -> Section {
    Section {
        kind: SectionKind::ProductDetail(index),
        blocks: vec![
            Block::text(TextRole::Heading, format!("DETAILED ANALYSIS: {}", p.name)),
            Block::text(
                TextRole::Emphasis,
                format!(
                    "Market share: {:.1}% | Avg. price: {:.0} | Satisfaction: {:.1}/5 | Growth: {:+.1}%",
                    p.market_share, p.price, p.satisfaction, p.growth
                ),
            ),
            Block::Spacer(4.0),
            Block::Swot(SwotGrid {
                title: "SWOT analysis".into(),
                strengths: p.strengths.clone(),
                weaknesses: p.weaknesses.clone(),
                opportunities: p.opportunities.clone(),
                threats: p.threats.clone(),
            }),
            Block::Spacer(6.0),
            Block::text(TextRole::Subheading, "Positioning and target audience"),
            Block::text(TextRole::Emphasis, "Strategic positioning:"),
            Block::text(TextRole::Body, p.positioning.clone()),
            Block::text(TextRole::Emphasis, "Target audience:"),
            Block::text(TextRole::Body, p.target_audience.clone()),
        ],
    }
}

fn conclusion(result: &AnalysisResult) -> Section {
    let mut blocks = vec![
        Block::text(TextRole::Heading, "CONCLUSION AND RECOMMENDATIONS"),
        Block::text(
            TextRole::Body,
            format!(
                "This comparative market study of the {} sector reveals complex competitive \
                 dynamics and significant strategic opportunities. The detailed analysis of {} \
                 products identifies the strengths, weaknesses and relative positioning of each \
                 player, providing a solid basis for targeted marketing and commercial strategies.",
                result.sector(),
                result.products().len()
            ),
        ),
        Block::Spacer(6.0),
        Block::text(TextRole::Subheading, "Strategic recommendations"),
    ];
    blocks.extend(
        result
            .recommendations()
            .iter()
            .enumerate()
            .map(|(i, rec)| Block::text(TextRole::Body, format!("{}. {rec}", i + 1))),
    );
    blocks.push(Block::Spacer(8.0));
    blocks.push(Block::text(
        TextRole::Note,
        "Note: this analysis is based on current market data and projections. \
         Recommendations should be adapted to the specific context of each organisation.",
    ));

    Section {
        kind: SectionKind::Conclusion,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{chart_file_name, ChartArtifact};
    use crate::domain::product::tests::metrics;
    use crate::error::ChartRenderError;
    use std::path::PathBuf;

    fn result(names: &[&str]) -> AnalysisResult {
        AnalysisResult::new(
            "Test Sector".into(),
            "05/03/2026".into(),
            names
                .iter()
                .enumerate()
                .map(|(i, n)| metrics(n, 5.0 + i as f64, 300.0, 4.0, 3.0))
                .collect(),
            "summary".into(),
            (1..=6).map(|i| format!("R{i}")).collect(),
        )
        .unwrap()
    }

    fn charts(failing: &[ChartKind]) -> ChartSet {
        let mut set = ChartSet::default();
        for kind in ChartKind::ALL {
            let path = PathBuf::from(chart_file_name("t", kind));
            let outcome = if failing.contains(&kind) {
                Err(ChartRenderError {
                    kind,
                    detail: "boom".into(),
                })
            } else {
                Ok(ChartArtifact {
                    kind,
                    path: path.clone(),
                })
            };
            set.record(kind, path, outcome);
        }
        set
    }

    #[test]
    fn comparison_table_has_one_row_per_product_in_order() {
        let plan = plan(&result(&["Alpha", "Beta"]), &charts(&[]));
        let table = plan.comparison_table().unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Alpha");
        assert_eq!(table.rows[1][0], "Beta");
        assert_eq!(table.header.len(), table.widths.len());
    }

    #[test]
    fn sections_follow_fixed_order() {
        let plan = plan(&result(&["Alpha", "Beta"]), &charts(&[]));
        let kinds: Vec<SectionKind> = plan.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SectionKind::Cover,
                SectionKind::ExecutiveSummary,
                SectionKind::Comparison,
                SectionKind::Charts,
                SectionKind::ProductDetail(0),
                SectionKind::ProductDetail(1),
                SectionKind::Conclusion,
            ]
        );
    }

    #[test]
    fn ten_products_give_ten_detail_sections() {
        let names: Vec<String> = (0..10).map(|i| format!("P{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let plan = plan(&result(&refs), &charts(&[]));
        let details: Vec<&Section> = plan.detail_sections().collect();
        assert_eq!(details.len(), 10);
        for (i, section) in details.iter().enumerate() {
            assert_eq!(section.kind, SectionKind::ProductDetail(i));
            assert_eq!(
                section.blocks[0],
                Block::text(TextRole::Heading, format!("DETAILED ANALYSIS: P{i}"))
            );
        }
    }

    #[test]
    fn failed_chart_becomes_note() {
        let plan = plan(&result(&["Alpha", "Beta"]), &charts(&[ChartKind::Scatter]));
        let kinds: Vec<ChartKind> = plan.chart_blocks().map(|(k, _)| k).collect();
        assert_eq!(kinds, [ChartKind::Share, ChartKind::Growth]);
        assert_eq!(plan.chart_notes().count(), 1);
    }

    #[test]
    fn no_charts_gives_single_note() {
        let plan = plan(&result(&["Alpha", "Beta"]), &charts(&ChartKind::ALL));
        assert_eq!(plan.chart_blocks().count(), 0);
        let notes: Vec<&str> = plan.chart_notes().collect();
        assert_eq!(notes, ["Charts could not be generated for this report."]);
    }

    #[test]
    fn conclusion_numbers_recommendations() {
        let plan = plan(&result(&["Alpha", "Beta"]), &charts(&[]));
        let conclusion = plan.section(SectionKind::Conclusion).unwrap();
        assert!(conclusion
            .blocks
            .contains(&Block::text(TextRole::Body, "6. R6")));
    }
}
