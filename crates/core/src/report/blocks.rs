use crate::chart::ChartKind;
use crate::style::TextRole;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Data,
    Stats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub kind: TableKind,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Column widths as fractions of the table width.
    pub widths: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwotGrid {
    /// Heading kept on the same page as the grid.
    pub title: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Vertical gap in millimetres.
    Spacer(f32),
    Text { role: TextRole, text: String },
    Table(TableBlock),
    Chart { kind: ChartKind, path: PathBuf },
    /// Stands in for a chart that is not available.
    ChartNote { kind: Option<ChartKind>, text: String },
    Swot(SwotGrid),
}

impl Block {
    pub fn text(role: TextRole, text: impl Into<String>) -> Self {
        Block::Text {
            role,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Cover,
    ExecutiveSummary,
    Comparison,
    Charts,
    ProductDetail(usize),
    Conclusion,
}

/// A run of blocks that always starts on a fresh page.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub title: String,
    pub sections: Vec<Section>,
}

impl ReportPlan {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn detail_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| matches!(s.kind, SectionKind::ProductDetail(_)))
    }

    pub fn comparison_table(&self) -> Option<&TableBlock> {
        self.section(SectionKind::Comparison)?
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
    }

    pub fn chart_blocks(&self) -> impl Iterator<Item = (ChartKind, &PathBuf)> {
        self.sections.iter().flat_map(|s| {
            s.blocks.iter().filter_map(|b| match b {
                Block::Chart { kind, path } => Some((*kind, path)),
                _ => None,
            })
        })
    }

    pub fn chart_notes(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().flat_map(|s| {
            s.blocks.iter().filter_map(|b| match b {
                Block::ChartNote { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }
}
