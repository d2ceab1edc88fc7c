//! Lays a [`ReportPlan`] out on A4 pages with the built-in Helvetica faces.
//!
//! Every section opens a new page. Table rows and SWOT quadrants are never
//! split across pages; a table that continues on a new page repeats its
//! header row, and a SWOT grid moves whole with its heading when it fits.

use crate::chart::ChartKind;
use crate::error::ReportGenerationError;
use crate::report::blocks::{Block, ReportPlan, SwotGrid, TableBlock, TableKind};
use crate::style::{FontWeight, PageGeometry, Rgb, TableStyle, TextRole, Theme};
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect,
};
use std::path::Path;

const PT_TO_MM: f32 = 25.4 / 72.0;
const CELL_PAD_MM: f32 = 1.8;
const CHART_WIDTH_MM: f32 = 127.0;
const CHART_MAX_HEIGHT_MM: f32 = 95.0;
const SWOT_FONT_PT: f32 = 9.5;
const SWOT_LINE_MM: f32 = SWOT_FONT_PT * 1.3 * PT_TO_MM;
const BLOCK_GAP_MM: f32 = 4.0;

#[derive(Debug)]
pub(crate) struct Rendered {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub charts: usize,
    #[cfg_attr(not(test), allow(dead_code))]
    pub placements: Vec<Placement>,
}

/// What a [`Placement`] holds. Row indices count from zero within their block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(test), allow(dead_code))]
pub(crate) enum Placed {
    TableHeader,
    TableRow(usize),
    SwotTitle,
    SwotRow(usize),
}

/// Page and vertical extent of one unbreakable piece of a block.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(not(test), allow(dead_code))]
pub(crate) struct Placement {
    pub placed: Placed,
    pub page: usize,
    pub top: f32,
    pub bottom: f32,
}

pub(crate) fn render(plan: &ReportPlan, theme: &Theme) -> Result<Rendered, ReportGenerationError> {
    let page = theme.page;
    let (doc, first_page, first_layer) = PdfDocument::new(
        plan.title.clone(),
        Mm(page.width_mm),
        Mm(page.height_mm),
        "content",
    );
    let fonts = Fonts::load(&doc)?;
    let layer = doc.get_page(first_page).get_layer(first_layer);

    let mut writer = PageWriter {
        doc: &doc,
        theme,
        fonts,
        layer,
        cursor: Cursor::new(&page),
        charts: 0,
        placements: Vec::new(),
    };
    for (i, section) in plan.sections.iter().enumerate() {
        if i > 0 {
            writer.new_page();
        }
        for block in &section.blocks {
            writer.block(block);
        }
    }
    let pages = writer.cursor.page;
    let charts = writer.charts;
    let placements = std::mem::take(&mut writer.placements);
    drop(writer);

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ReportGenerationError::Serialize(e.to_string()))?;
    Ok(Rendered {
        bytes,
        pages,
        charts,
        placements,
    })
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, ReportGenerationError> {
        let builtin = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| ReportGenerationError::Serialize(e.to_string()))
        };
        Ok(Self {
            regular: builtin(BuiltinFont::Helvetica)?,
            bold: builtin(BuiltinFont::HelveticaBold)?,
            italic: builtin(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
            FontWeight::Italic => &self.italic,
        }
    }
}

/// Vertical position on the current page, in millimetres from the bottom edge.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    y: f32,
    top: f32,
    bottom: f32,
    page: usize,
}

impl Cursor {
    fn new(page: &PageGeometry) -> Self {
        Self {
            y: page.top_mm(),
            top: page.top_mm(),
            bottom: page.bottom_margin_mm,
            page: 1,
        }
    }

    fn fresh(&self) -> bool {
        self.y >= self.top
    }

    fn capacity(&self) -> f32 {
        self.top - self.bottom
    }

    /// A block taller than what is left moves to the next page, unless the
    /// page is still empty and moving would not help.
    fn needs_break(&self, height: f32) -> bool {
        !self.fresh() && self.y - height < self.bottom
    }

    fn next_page(&mut self) {
        self.page += 1;
        self.y = self.top;
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    fn skip(&mut self, height: f32) {
        self.y = (self.y - height).max(self.bottom);
    }
}

struct CellLayout {
    lines: Vec<Vec<String>>,
    height: f32,
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    theme: &'a Theme,
    fonts: Fonts,
    layer: PdfLayerReference,
    cursor: Cursor,
    charts: usize,
    placements: Vec<Placement>,
}

struct SwotLayout {
    title: Vec<String>,
    title_h: f32,
    quadrants: [[(&'static str, Rgb, Vec<String>); 2]; 2],
    heights: [f32; 2],
}

impl SwotLayout {
    fn new(grid: &SwotGrid, theme: &Theme) -> Self {
        let s = &theme.swot;
        let half = theme.page.content_width_mm() / 2.0;
        let bullets = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .flat_map(|item| wrap(&format!("- {item}"), SWOT_FONT_PT, FontWeight::Regular, half - 2.0 * CELL_PAD_MM))
                .collect()
        };
        let quadrants = [
            [
                ("STRENGTHS", s.strengths, bullets(&grid.strengths)),
                ("WEAKNESSES", s.weaknesses, bullets(&grid.weaknesses)),
            ],
            [
                ("OPPORTUNITIES", s.opportunities, bullets(&grid.opportunities)),
                ("THREATS", s.threats, bullets(&grid.threats)),
            ],
        ];
        let header_h = theme.table.row_height_mm;
        let body_h = |pair: &[(&str, Rgb, Vec<String>); 2]| {
            pair.iter().map(|q| q.2.len()).max().unwrap_or(0) as f32 * SWOT_LINE_MM + 2.0 * CELL_PAD_MM
        };
        let heights = [header_h + body_h(&quadrants[0]), header_h + body_h(&quadrants[1])];

        let style = theme.text(TextRole::Subheading);
        let title = wrap(&grid.title, style.size_pt, style.weight, theme.page.content_width_mm());
        let title_h = (title.len() as f32 * style.leading_pt + style.space_after_pt) * PT_TO_MM;

        Self {
            title,
            title_h,
            quadrants,
            heights,
        }
    }

    fn height(&self) -> f32 {
        self.title_h + self.heights[0] + self.heights[1]
    }
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let page = self.theme.page;
        let (page_idx, layer_idx) = self
            .doc
            .add_page(Mm(page.width_mm), Mm(page.height_mm), "content");
        self.layer = self.doc.get_page(page_idx).get_layer(layer_idx);
        self.cursor.next_page();
    }

    fn ensure(&mut self, height: f32) -> bool {
        if self.cursor.needs_break(height) {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn left(&self) -> f32 {
        self.theme.page.margin_mm
    }

    fn width(&self) -> f32 {
        self.theme.page.content_width_mm()
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Spacer(mm) => self.cursor.skip(*mm),
            Block::Text { role, text } => self.text(*role, text),
            Block::Table(table) => self.table(table),
            Block::Chart { kind, path } => self.chart(*kind, path),
            Block::ChartNote { text, .. } => self.text(TextRole::Note, text),
            Block::Swot(grid) => self.swot(grid),
        }
    }

    fn put_text(&self, text: &str, size_pt: f32, weight: FontWeight, color: Rgb, x: f32, baseline: f32) {
        self.layer.set_fill_color(color.to_pdf());
        self.layer
            .use_text(pdf_text(text), size_pt, Mm(x), Mm(baseline), self.fonts.get(weight));
    }

    fn fill_box(&self, x: f32, y_top: f32, w: f32, h: f32, fill: Rgb, outline: Rgb) {
        self.layer.set_fill_color(fill.to_pdf());
        self.layer.set_outline_color(outline.to_pdf());
        self.layer.set_outline_thickness(0.5);
        self.layer
            .add_rect(Rect::new(Mm(x), Mm(y_top - h), Mm(x + w), Mm(y_top)).with_mode(PaintMode::FillStroke));
    }

    fn text(&mut self, role: TextRole, text: &str) {
        let style = self.theme.text(role);
        let line_h = style.leading_pt * PT_TO_MM;
        let width = self.width();

        for line in wrap(text, style.size_pt, style.weight, width) {
            self.ensure(line_h);
            let x = if style.centered {
                self.left() + ((width - text_width(&line, style.size_pt, style.weight)) / 2.0).max(0.0)
            } else {
                self.left()
            };
            self.cursor.advance(line_h);
            let baseline = self.cursor.y + (line_h - style.size_pt * PT_TO_MM) / 2.0 + 0.5;
            self.put_text(&line, style.size_pt, style.weight, style.color, x, baseline);
        }
        self.cursor.skip(style.space_after_pt * PT_TO_MM);
    }

    fn layout_cells(&self, cells: &[String], widths: &[f32], style: &TableStyle, weight: FontWeight) -> CellLayout {
        let line_h = style.font_size_pt * 1.25 * PT_TO_MM;
        let lines: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| wrap(cell, style.font_size_pt, weight, w - 2.0 * CELL_PAD_MM))
            .collect();
        let most = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
        CellLayout {
            height: (most as f32 * line_h + 2.0 * CELL_PAD_MM).max(style.row_height_mm),
            lines,
        }
    }

    fn place(&mut self, placed: Placed, top: f32) {
        self.placements.push(Placement {
            placed,
            page: self.cursor.page,
            top,
            bottom: self.cursor.y,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row(
        &mut self,
        placed: Placed,
        row: &CellLayout,
        widths: &[f32],
        style: &TableStyle,
        bg: Rgb,
        fg: Rgb,
        weight: FontWeight,
    ) {
        let line_h = style.font_size_pt * 1.25 * PT_TO_MM;
        let top = self.cursor.y;
        let mut x = self.left();
        for (lines, w) in row.lines.iter().zip(widths) {
            self.fill_box(x, top, *w, row.height, bg, style.grid);
            for (k, line) in lines.iter().enumerate() {
                let baseline = top - CELL_PAD_MM - (k as f32 + 1.0) * line_h + line_h * 0.25;
                self.put_text(line, style.font_size_pt, weight, fg, x + CELL_PAD_MM, baseline);
            }
            x += w;
        }
        self.cursor.advance(row.height);
        self.place(placed, top);
    }

    fn table(&mut self, table: &TableBlock) {
        let style = match table.kind {
            TableKind::Data => self.theme.table.clone(),
            TableKind::Stats => self.theme.stats_table.clone(),
        };
        let text_color = self.theme.palette.text;
        let total = self.width();
        let widths: Vec<f32> = table.widths.iter().map(|f| f * total).collect();

        let header = self.layout_cells(&table.header, &widths, &style, FontWeight::Bold);
        let rows: Vec<CellLayout> = table
            .rows
            .iter()
            .map(|r| self.layout_cells(r, &widths, &style, FontWeight::Regular))
            .collect();

        let first = rows.first().map_or(0.0, |r| r.height);
        self.ensure(header.height + first);
        self.draw_row(
            Placed::TableHeader,
            &header,
            &widths,
            &style,
            style.header_bg,
            style.header_fg,
            FontWeight::Bold,
        );

        for (i, row) in rows.iter().enumerate() {
            if self.ensure(row.height) {
                self.draw_row(
                    Placed::TableHeader,
                    &header,
                    &widths,
                    &style,
                    style.header_bg,
                    style.header_fg,
                    FontWeight::Bold,
                );
            }
            self.draw_row(
                Placed::TableRow(i),
                row,
                &widths,
                &style,
                style.row_bg[i % 2],
                text_color,
                FontWeight::Regular,
            );
        }
        self.cursor.skip(BLOCK_GAP_MM);
    }

    fn chart(&mut self, kind: ChartKind, path: &Path) {
        let image = match load_chart(path) {
            Ok(image) => image,
            Err(detail) => {
                tracing::warn!(%kind, path = %path.display(), error = %detail, "chart image could not be embedded");
                self.text(
                    TextRole::Note,
                    &format!("The \"{}\" chart could not be embedded in this report.", kind.title()),
                );
                return;
            }
        };

        let (w_px, h_px) = (image.width() as f32, image.height() as f32);
        let mut w_mm = CHART_WIDTH_MM.min(self.width());
        let mut h_mm = w_mm * h_px / w_px;
        if h_mm > CHART_MAX_HEIGHT_MM {
            w_mm *= CHART_MAX_HEIGHT_MM / h_mm;
            h_mm = CHART_MAX_HEIGHT_MM;
        }

        self.ensure(h_mm);
        self.cursor.advance(h_mm);
        Image::from_dynamic_image(&image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(self.left() + (self.width() - w_mm) / 2.0)),
                translate_y: Some(Mm(self.cursor.y)),
                dpi: Some(w_px * 25.4 / w_mm),
                ..Default::default()
            },
        );
        self.charts += 1;
    }

    fn swot(&mut self, grid: &SwotGrid) {
        let s = self.theme.swot.clone();
        let half = self.width() / 2.0;
        let header_h = self.theme.table.row_height_mm;
        let layout = SwotLayout::new(grid, self.theme);

        if layout.height() <= self.cursor.capacity() {
            self.ensure(layout.height());
        } else {
            self.ensure(layout.title_h + layout.heights[0]);
        }

        let top = self.cursor.y;
        let heading = self.theme.text(TextRole::Subheading);
        for line in &layout.title {
            self.cursor.advance(heading.leading_pt * PT_TO_MM);
            let baseline = self.cursor.y + (heading.leading_pt - heading.size_pt) * PT_TO_MM / 2.0 + 0.5;
            self.put_text(line, heading.size_pt, heading.weight, heading.color, self.left(), baseline);
        }
        self.cursor.skip(heading.space_after_pt * PT_TO_MM);
        self.place(Placed::SwotTitle, top);

        for (r, ((pair, height), bg)) in layout
            .quadrants
            .iter()
            .zip(layout.heights)
            .zip([s.positive_bg, s.negative_bg])
            .enumerate()
        {
            self.ensure(height);
            let top = self.cursor.y;
            for (col, (label, color, lines)) in pair.iter().enumerate() {
                let x = self.left() + col as f32 * half;
                self.fill_box(x, top, half, header_h, *color, *color);
                self.put_text(
                    label,
                    self.theme.table.font_size_pt,
                    FontWeight::Bold,
                    Rgb::WHITE,
                    x + CELL_PAD_MM,
                    top - header_h + CELL_PAD_MM + 0.8,
                );
                self.fill_box(x, top - header_h, half, height - header_h, bg, *color);
                for (k, line) in lines.iter().enumerate() {
                    let baseline = top - header_h - CELL_PAD_MM - (k as f32 + 1.0) * SWOT_LINE_MM + SWOT_LINE_MM * 0.25;
                    self.put_text(
                        line,
                        SWOT_FONT_PT,
                        FontWeight::Regular,
                        self.theme.palette.text,
                        x + CELL_PAD_MM,
                        baseline,
                    );
                }
            }
            self.cursor.advance(height);
            self.place(Placed::SwotRow(r), top);
        }
        self.cursor.skip(BLOCK_GAP_MM);
    }
}

fn load_chart(path: &Path) -> Result<DynamicImage, String> {
    let image = image_crate::open(path).map_err(|e| e.to_string())?;
    if image.width() == 0 || image.height() == 0 {
        return Err("empty image".to_string());
    }
    // Alpha channels are dropped; the PDF side expects plain RGB.
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Text the built-in fonts can encode: typographic punctuation is folded to
/// ASCII and anything outside Latin-1 becomes `?`.
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2022}' => '-',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

/// Helvetica advance width of `c` in thousandths of an em.
fn advance(c: char) -> f32 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'f' | 't' | 'I' | '/' => 278.0,
        'i' | 'j' | 'l' => 222.0,
        'r' | '-' | '(' | ')' => 333.0,
        'm' | 'M' => 833.0,
        'w' => 722.0,
        'W' => 944.0,
        '%' => 889.0,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500.0,
        c if c.is_ascii_uppercase() => 700.0,
        _ => 556.0,
    }
}

/// Estimated rendered width of `text` in millimetres.
pub(crate) fn text_width(text: &str, size_pt: f32, weight: FontWeight) -> f32 {
    let em: f32 = text.chars().map(advance).sum::<f32>() / 1000.0;
    let factor = if weight == FontWeight::Bold { 1.06 } else { 1.0 };
    em * size_pt * PT_TO_MM * factor
}

/// Greedy word wrap to `max_mm`. Words wider than a line are split.
pub(crate) fn wrap(text: &str, size_pt: f32, weight: FontWeight, max_mm: f32) -> Vec<String> {
    let fits = |s: &str| text_width(s, size_pt, weight) <= max_mm;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{chart_file_name, ChartArtifact, ChartSet};
    use crate::domain::contract::LlmProductAnalysis;
    use crate::domain::product::tests::metrics;
    use crate::domain::product::AnalysisResult;
    use crate::error::ChartRenderError;
    use crate::report::blocks::{Section, SectionKind};
    use crate::report::sections::plan;
    use printpdf::image_crate::RgbImage;
    use tempfile::TempDir;

    fn result(n: usize) -> AnalysisResult {
        AnalysisResult::new(
            "Consumer electronics".into(),
            "05/03/2026".into(),
            (0..n)
                .map(|i| metrics(&format!("Product {i}"), 5.0 + i as f64, 300.0 + i as f64, 4.0, 2.0))
                .collect(),
            "A steady market.".into(),
            (1..=6).map(|i| format!("Recommendation {i}")).collect(),
        )
        .unwrap()
    }

    fn png(dir: &Path, kind: ChartKind) -> std::path::PathBuf {
        let path = dir.join(chart_file_name("t", kind));
        RgbImage::from_pixel(60, 42, printpdf::image_crate::Rgb([200, 80, 40]))
            .save(&path)
            .unwrap();
        path
    }

    fn single_section(blocks: Vec<Block>) -> ReportPlan {
        ReportPlan {
            title: "Layout".into(),
            sections: vec![Section {
                kind: SectionKind::Comparison,
                blocks,
            }],
        }
    }

    fn grid(items: impl Fn(&str) -> Vec<String>) -> SwotGrid {
        SwotGrid {
            title: "SWOT analysis".into(),
            strengths: items("Strength"),
            weaknesses: items("Weakness"),
            opportunities: items("Opportunity"),
            threats: items("Threat"),
        }
    }

    fn short_items(label: &str) -> Vec<String> {
        (1..=3).map(|i| format!("{label} {i}")).collect()
    }

    fn assert_on_page(p: &Placement, page: &PageGeometry) {
        assert!(p.top <= page.top_mm() + 0.01, "{p:?}");
        assert!(p.bottom >= page.bottom_margin_mm - 0.01, "{p:?}");
        assert!(p.top > p.bottom, "{p:?}");
    }

    #[test]
    fn wrap_respects_width() {
        let text = "lorem ipsum dolor sit amet ".repeat(20);
        let lines = wrap(&text, 10.0, FontWeight::Regular, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, FontWeight::Regular) <= 60.0, "{line}");
        }
        assert_eq!(lines.join(" "), text.trim());
    }

    #[test]
    fn wrap_splits_long_words() {
        let word = "x".repeat(200);
        let lines = wrap(&word, 10.0, FontWeight::Regular, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap("   ", 10.0, FontWeight::Regular, 50.0).is_empty());
    }

    #[test]
    fn pdf_text_folds_typography() {
        assert_eq!(pdf_text("a \u{2014} \u{201c}b\u{201d} caf\u{e9} \u{4e2d}"), "a - \"b\" caf\u{e9} ?");
    }

    #[test]
    fn cursor_never_places_block_below_margin() {
        let theme = Theme::default();
        let mut cursor = Cursor::new(&theme.page);
        for _ in 0..40 {
            if cursor.needs_break(30.0) {
                cursor.next_page();
            }
            assert!(cursor.y - 30.0 >= cursor.bottom);
            cursor.advance(30.0);
        }
        assert!(cursor.page > 1);
    }

    #[test]
    fn oversized_block_stays_on_empty_page() {
        let theme = Theme::default();
        let cursor = Cursor::new(&theme.page);
        assert!(!cursor.needs_break(cursor.capacity() + 10.0));
    }

    #[test]
    fn renders_pdf_with_available_charts() {
        let dir = TempDir::new().unwrap();
        let mut charts = ChartSet::default();
        for kind in [ChartKind::Share, ChartKind::Growth] {
            let path = png(dir.path(), kind);
            charts.record(kind, path.clone(), Ok(ChartArtifact { kind, path }));
        }
        charts.record(
            ChartKind::Scatter,
            dir.path().join(chart_file_name("t", ChartKind::Scatter)),
            Err(ChartRenderError {
                kind: ChartKind::Scatter,
                detail: "boom".into(),
            }),
        );

        let rendered = render(&plan(&result(3), &charts), &Theme::default()).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.charts, 2);
        assert!(rendered.pages >= 8);
    }

    #[test]
    fn unreadable_chart_degrades_to_note() {
        let dir = TempDir::new().unwrap();
        let mut charts = ChartSet::default();
        let path = dir.path().join("missing.png");
        charts.record(
            ChartKind::Share,
            path.clone(),
            Ok(ChartArtifact {
                kind: ChartKind::Share,
                path,
            }),
        );

        let rendered = render(&plan(&result(2), &charts), &Theme::default()).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.charts, 0);
    }

    #[test]
    fn long_tables_continue_on_new_pages() {
        let mut p = plan(&result(2), &ChartSet::default());
        let table = TableBlock {
            kind: TableKind::Data,
            header: vec!["A".into(), "B".into()],
            rows: (0..80).map(|i| vec![format!("row {i}"), "value".into()]).collect(),
            widths: vec![0.5, 0.5],
        };
        p.sections[1].blocks.push(Block::Table(table));
        let short = render(&plan(&result(2), &ChartSet::default()), &Theme::default()).unwrap();
        let long = render(&p, &Theme::default()).unwrap();
        assert!(long.pages > short.pages);
    }

    #[test]
    fn table_rows_stay_whole_and_header_repeats() {
        let theme = Theme::default();
        let table = TableBlock {
            kind: TableKind::Data,
            header: vec!["Product".into(), "Notes".into()],
            rows: (0..60)
                .map(|i| {
                    let note = if i % 7 == 0 { "wide cell ".repeat(30) } else { "value".into() };
                    vec![format!("Product {i}"), note]
                })
                .collect(),
            widths: vec![0.5, 0.5],
        };
        let rendered = render(&single_section(vec![Block::Table(table)]), &theme).unwrap();
        assert!(rendered.pages > 1);

        let placements = &rendered.placements;
        for p in placements {
            assert_on_page(p, &theme.page);
        }
        let rows: Vec<usize> = placements
            .iter()
            .filter_map(|p| match p.placed {
                Placed::TableRow(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(rows, (0..60).collect::<Vec<_>>());
        for page in 1..=rendered.pages {
            let first = placements.iter().find(|p| p.page == page).unwrap();
            assert_eq!(first.placed, Placed::TableHeader, "page {page}");
        }
    }

    #[test]
    fn swot_grid_moves_whole_to_next_page_with_heading() {
        let theme = Theme::default();
        let swot = grid(short_items);
        let height = SwotLayout::new(&swot, &theme).height();
        let filler = theme.page.top_mm() - theme.page.bottom_margin_mm - height + 5.0;

        let rendered = render(&single_section(vec![Block::Spacer(filler), Block::Swot(swot)]), &theme).unwrap();
        assert_eq!(rendered.pages, 2);
        let placed: Vec<Placed> = rendered.placements.iter().map(|p| p.placed).collect();
        assert_eq!(placed, [Placed::SwotTitle, Placed::SwotRow(0), Placed::SwotRow(1)]);
        assert!(rendered.placements.iter().all(|p| p.page == 2));
        assert!((rendered.placements[0].top - theme.page.top_mm()).abs() < 0.01);
    }

    #[test]
    fn swot_grid_stays_when_it_fits() {
        let theme = Theme::default();
        let swot = grid(short_items);
        let height = SwotLayout::new(&swot, &theme).height();
        let filler = theme.page.top_mm() - theme.page.bottom_margin_mm - height - 1.0;

        let rendered = render(&single_section(vec![Block::Spacer(filler), Block::Swot(swot)]), &theme).unwrap();
        assert_eq!(rendered.pages, 1);
        for p in &rendered.placements {
            assert_eq!(p.page, 1);
            assert_on_page(p, &theme.page);
        }
    }

    #[test]
    fn model_supplied_long_swot_entries_fit_one_page() {
        let theme = Theme::default();
        let long = |label: &str, n: usize| -> Vec<String> {
            (0..n)
                .map(|i| format!("{label} {i} {}", "strong brand loyalty ".repeat(100)))
                .collect()
        };
        let m = LlmProductAnalysis {
            strengths: long("Strength", 8),
            weaknesses: long("Weakness", 7),
            opportunities: long("Opportunity", 8),
            threats: long("Threat", 7),
            ..Default::default()
        }
        .validate_and_into_metrics("Alpha", "Retail")
        .unwrap();
        let swot = SwotGrid {
            title: "SWOT analysis".into(),
            strengths: m.strengths,
            weaknesses: m.weaknesses,
            opportunities: m.opportunities,
            threats: m.threats,
        };

        let height = SwotLayout::new(&swot, &theme).height();
        let capacity = theme.page.top_mm() - theme.page.bottom_margin_mm;
        assert!(height <= capacity, "SWOT grid {height}mm exceeds page capacity {capacity}mm");

        let rendered = render(&single_section(vec![Block::Spacer(40.0), Block::Swot(swot)]), &theme).unwrap();
        let page = rendered.placements[0].page;
        assert_eq!(rendered.placements.len(), 3);
        for p in &rendered.placements {
            assert_eq!(p.page, page);
            assert_on_page(p, &theme.page);
        }
    }
}
