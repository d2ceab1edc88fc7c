//! Palette, text styles and page geometry shared by the chart renderer and the
//! report assembler. Built once and passed around as `Arc<Theme>`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    pub const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    pub fn to_plotters(self) -> plotters::style::RGBColor {
        plotters::style::RGBColor(self.0, self.1, self.2)
    }

    pub fn to_pdf(self) -> printpdf::Color {
        printpdf::Color::Rgb(printpdf::Rgb::new(
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
            None,
        ))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub success: Rgb,
    pub warning: Rgb,
    pub danger: Rgb,
    pub info: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub rule: Rgb,
    pub chart: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::hex(0x4f46e5),
            secondary: Rgb::hex(0x7c3aed),
            success: Rgb::hex(0x10b981),
            warning: Rgb::hex(0xf59e0b),
            danger: Rgb::hex(0xef4444),
            info: Rgb::hex(0x3b82f6),
            text: Rgb::hex(0x1f2937),
            muted: Rgb::hex(0x6b7280),
            rule: Rgb::hex(0xd1d5db),
            chart: vec![
                Rgb::hex(0x4f46e5),
                Rgb::hex(0x7c3aed),
                Rgb::hex(0xec4899),
                Rgb::hex(0xf59e0b),
                Rgb::hex(0x10b981),
                Rgb::hex(0x06b6d4),
            ],
        }
    }
}

impl Palette {
    /// Series color for the `i`-th product, cycling through the chart colors.
    pub fn chart_color(&self, i: usize) -> Rgb {
        if self.chart.is_empty() {
            return self.primary;
        }
        self.chart[i % self.chart.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Title,
    Heading,
    Subheading,
    Body,
    Emphasis,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_pt: f32,
    pub leading_pt: f32,
    pub weight: FontWeight,
    pub color: Rgb,
    pub space_after_pt: f32,
    pub centered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_bg: Rgb,
    pub header_fg: Rgb,
    pub row_bg: [Rgb; 2],
    pub grid: Rgb,
    pub font_size_pt: f32,
    pub row_height_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwotStyle {
    pub strengths: Rgb,
    pub weaknesses: Rgb,
    pub opportunities: Rgb,
    pub threats: Rgb,
    pub positive_bg: Rgb,
    pub negative_bg: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    pub bottom_margin_mm: f32,
}

impl PageGeometry {
    pub fn content_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn top_mm(&self) -> f32 {
        self.height_mm - self.margin_mm
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: u32,
}

impl ChartGeometry {
    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f32).round() as u32,
            (self.height_in * self.dpi as f32).round() as u32,
        )
    }

    /// Converts a size in points (1/72 in) to pixels at this DPI.
    pub fn pt(&self, points: f32) -> u32 {
        (points * self.dpi as f32 / 72.0).round().max(1.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub palette: Palette,
    pub table: TableStyle,
    pub stats_table: TableStyle,
    pub swot: SwotStyle,
    pub page: PageGeometry,
    pub chart: ChartGeometry,
}

impl Default for Theme {
    fn default() -> Self {
        let palette = Palette::default();
        let table = TableStyle {
            header_bg: palette.primary,
            header_fg: Rgb::WHITE,
            row_bg: [Rgb::WHITE, Rgb::hex(0xf9fafb)],
            grid: palette.rule,
            font_size_pt: 10.0,
            row_height_mm: 8.0,
        };
        let stats_table = TableStyle {
            header_bg: palette.secondary,
            row_bg: [Rgb::hex(0xf5f3ff), Rgb::WHITE],
            ..table.clone()
        };
        let swot = SwotStyle {
            strengths: palette.success,
            weaknesses: palette.danger,
            opportunities: palette.info,
            threats: palette.warning,
            positive_bg: Rgb::hex(0xf0fdf4),
            negative_bg: Rgb::hex(0xfef3c7),
        };

        Self {
            table,
            stats_table,
            swot,
            page: PageGeometry {
                width_mm: 210.0,
                height_mm: 297.0,
                margin_mm: 21.2,
                bottom_margin_mm: 14.1,
            },
            chart: ChartGeometry {
                width_in: 10.0,
                height_in: 7.0,
                dpi: 150,
            },
            palette,
        }
    }
}

impl Theme {
    pub fn with_chart_dpi(mut self, dpi: u32) -> Self {
        self.chart.dpi = dpi.max(1);
        self
    }

    pub fn text(&self, role: TextRole) -> TextStyle {
        let p = &self.palette;
        match role {
            TextRole::Title => TextStyle {
                size_pt: 28.0,
                leading_pt: 34.0,
                weight: FontWeight::Bold,
                color: p.primary,
                space_after_pt: 18.0,
                centered: true,
            },
            TextRole::Heading => TextStyle {
                size_pt: 18.0,
                leading_pt: 22.0,
                weight: FontWeight::Bold,
                color: p.primary,
                space_after_pt: 10.0,
                centered: false,
            },
            TextRole::Subheading => TextStyle {
                size_pt: 13.0,
                leading_pt: 16.0,
                weight: FontWeight::Bold,
                color: p.secondary,
                space_after_pt: 6.0,
                centered: false,
            },
            TextRole::Body => TextStyle {
                size_pt: 10.5,
                leading_pt: 14.0,
                weight: FontWeight::Regular,
                color: p.text,
                space_after_pt: 6.0,
                centered: false,
            },
            TextRole::Emphasis => TextStyle {
                size_pt: 11.0,
                leading_pt: 15.0,
                weight: FontWeight::Bold,
                color: p.text,
                space_after_pt: 6.0,
                centered: false,
            },
            TextRole::Note => TextStyle {
                size_pt: 9.0,
                leading_pt: 12.0,
                weight: FontWeight::Italic,
                color: p.muted,
                space_after_pt: 6.0,
                centered: false,
            },
        }
    }
}
