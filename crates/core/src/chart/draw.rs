use crate::domain::product::{AggregateStats, ProductMetrics};
use crate::style::Theme;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::path::Path;

pub(crate) type DrawResult = Result<(), Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";

fn title_style(theme: &Theme) -> TextStyle<'static> {
    (FONT, theme.chart.pt(16.0), FontStyle::Bold)
        .into_font()
        .color(&theme.palette.text.to_plotters())
}

fn label_style(theme: &Theme, size_pt: f32) -> TextStyle<'static> {
    (FONT, theme.chart.pt(size_pt))
        .into_font()
        .color(&theme.palette.text.to_plotters())
}

/// Pie of market shares, one wedge per product in input order, starting at twelve o'clock.
pub(crate) fn share(path: &Path, products: &[ProductMetrics], theme: &Theme, title: &str) -> DrawResult {
    let (w, h) = theme.chart.pixels();
    let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
    root.fill(&WHITE)?;

    let total: f64 = products.iter().map(|p| p.market_share).sum();
    if total <= 0.0 {
        return Err("market shares sum to zero".into());
    }

    root.draw(&Text::new(
        title.to_string(),
        ((w / 2) as i32, theme.chart.pt(24.0) as i32),
        title_style(theme).pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;

    let center = ((w as f64 * 0.38) as i32, (h as f64 * 0.54) as i32);
    let radius = f64::from(w.min(h)) * 0.36;
    let mut start = -90.0_f64;

    for (i, product) in products.iter().enumerate() {
        let sweep = product.market_share / total * 360.0;
        let color = theme.palette.chart_color(i).to_plotters();
        root.draw(&Polygon::new(wedge(center, radius, start, sweep), color.filled()))?;

        let mid = (start + sweep / 2.0).to_radians();
        let at = (
            center.0 + (radius * 0.68 * mid.cos()) as i32,
            center.1 + (radius * 0.68 * mid.sin()) as i32,
        );
        root.draw(&Text::new(
            format!("{:.1}%", product.market_share / total * 100.0),
            at,
            (FONT, theme.chart.pt(11.0), FontStyle::Bold)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        start += sweep;
    }

    let box_px = theme.chart.pt(10.0) as i32;
    let step = theme.chart.pt(18.0) as i32;
    let legend_x = (w as f64 * 0.74) as i32;
    let legend_y = center.1 - step * products.len() as i32 / 2;
    for (i, product) in products.iter().enumerate() {
        let y = legend_y + i as i32 * step;
        root.draw(&Rectangle::new(
            [(legend_x, y), (legend_x + box_px, y + box_px)],
            theme.palette.chart_color(i).to_plotters().filled(),
        ))?;
        root.draw(&Text::new(
            format!("{} ({:.1}%)", product.name, product.market_share),
            (legend_x + box_px * 2, y + box_px / 2),
            label_style(theme, 10.0).pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn wedge(center: (i32, i32), radius: f64, start_deg: f64, sweep_deg: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep_deg.abs() / 2.0).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = (start_deg + sweep_deg * i as f64 / steps as f64).to_radians();
        points.push((
            center.0 + (radius * angle.cos()) as i32,
            center.1 + (radius * angle.sin()) as i32,
        ));
    }
    points
}

fn padded(lo: f64, hi: f64, frac: f64, min_pad: f64) -> (f64, f64) {
    let pad = ((hi - lo) * frac).max(min_pad);
    (lo - pad, hi + pad)
}

fn dashed(from: (f64, f64), to: (f64, f64), dashes: usize) -> Vec<Vec<(f64, f64)>> {
    let segments = dashes * 2;
    (0..segments)
        .step_by(2)
        .map(|k| {
            let a = k as f64 / segments as f64;
            let b = (k + 1) as f64 / segments as f64;
            vec![
                (from.0 + (to.0 - from.0) * a, from.1 + (to.1 - from.1) * a),
                (from.0 + (to.0 - from.0) * b, from.1 + (to.1 - from.1) * b),
            ]
        })
        .collect()
}

/// Price against satisfaction; marker area follows market share.
pub(crate) fn scatter(path: &Path, products: &[ProductMetrics], theme: &Theme, title: &str) -> DrawResult {
    let (w, h) = theme.chart.pixels();
    let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
    root.fill(&WHITE)?;

    let fold = |f: fn(&ProductMetrics) -> f64| {
        products
            .iter()
            .map(f)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    };
    let (price_lo, price_hi) = fold(|p| p.price);
    let (sat_lo, sat_hi) = fold(|p| p.satisfaction);
    let (x_lo, x_hi) = padded(price_lo, price_hi, 0.15, 50.0);
    let (y_lo, y_hi) = padded(sat_lo, sat_hi, 0.2, 0.2);
    let (x_lo, y_lo, y_hi) = (x_lo.max(0.0), y_lo.max(0.0), y_hi.min(5.2));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, title_style(theme))
        .margin(theme.chart.pt(16.0))
        .x_label_area_size(theme.chart.pt(36.0))
        .y_label_area_size(theme.chart.pt(44.0))
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Price")
        .y_desc("Satisfaction (out of 5)")
        .axis_desc_style(label_style(theme, 11.0))
        .label_style(label_style(theme, 9.0))
        .light_line_style(theme.palette.rule.to_plotters().mix(0.3))
        .draw()?;

    let stats = AggregateStats::of(products);
    let guide = theme.palette.muted.to_plotters().stroke_width(2);
    for seg in dashed((stats.avg_price, y_lo), (stats.avg_price, y_hi), 30)
        .into_iter()
        .chain(dashed((x_lo, stats.avg_satisfaction), (x_hi, stats.avg_satisfaction), 40))
    {
        chart.draw_series(std::iter::once(PathElement::new(seg, guide)))?;
    }

    let dpi_scale = theme.chart.dpi as f64 / 72.0;
    for (i, product) in products.iter().enumerate() {
        let color = theme.palette.chart_color(i).to_plotters();
        let radius = ((product.market_share * 30.0 / std::f64::consts::PI).sqrt() * dpi_scale)
            .round()
            .max(3.0) as i32;
        let label = label_style(theme, 10.0).pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(std::iter::once(
                EmptyElement::at((product.price, product.satisfaction))
                    + Circle::new((0, 0), radius, color.mix(0.6).filled())
                    + Circle::new((0, 0), radius, color.stroke_width(2))
                    + Text::new(product.name.clone(), (0, -radius - 4), label),
            ))?
            .label(product.name.clone())
            .legend(move |(x, y)| Circle::new((x, y), 6, color.filled()));
    }

    chart.draw_series(std::iter::once(Text::new(
        "Premium / high quality",
        (x_hi, y_hi),
        (FONT, theme.chart.pt(10.0), FontStyle::Italic)
            .into_font()
            .color(&theme.palette.muted.to_plotters())
            .pos(Pos::new(HPos::Right, VPos::Top)),
    )))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font(label_style(theme, 9.0))
        .background_style(WHITE.mix(0.85))
        .border_style(theme.palette.rule.to_plotters())
        .draw()?;

    root.present()?;
    Ok(())
}

/// Horizontal growth bars, first product at the top.
pub(crate) fn growth(path: &Path, products: &[ProductMetrics], theme: &Theme, title: &str) -> DrawResult {
    let (w, h) = theme.chart.pixels();
    let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = products.len();
    let (g_lo, g_hi) = products
        .iter()
        .map(|p| p.growth)
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let (x_lo, x_hi) = padded(g_lo, g_hi, 0.18, 2.0);

    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    let row_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) if *i < n => names[n - 1 - *i].to_string(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, title_style(theme))
        .margin(theme.chart.pt(16.0))
        .x_label_area_size(theme.chart.pt(36.0))
        .y_label_area_size(theme.chart.pt(90.0))
        .build_cartesian_2d(x_lo..x_hi, (0usize..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Growth (%)")
        .x_label_formatter(&|x| format!("{x:.0}%"))
        .y_label_formatter(&row_label)
        .y_labels(n)
        .axis_desc_style(label_style(theme, 11.0))
        .label_style(label_style(theme, 9.0))
        .light_line_style(theme.palette.rule.to_plotters().mix(0.3))
        .draw()?;

    let bar_margin = theme.chart.pt(6.0);
    for (i, product) in products.iter().enumerate() {
        let row = n - 1 - i;
        let color = if product.growth >= 0.0 {
            theme.palette.success
        } else {
            theme.palette.danger
        }
        .to_plotters();

        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(row)),
                (product.growth, SegmentValue::Exact(row + 1)),
            ],
            color.filled(),
        );
        bar.set_margin(bar_margin, bar_margin, 0, 0);
        chart.draw_series(std::iter::once(bar))?;

        let (dx, anchor) = if product.growth >= 0.0 {
            (6, HPos::Left)
        } else {
            (-6, HPos::Right)
        };
        chart.draw_series(std::iter::once(
            EmptyElement::at((product.growth, SegmentValue::CenterOf(row)))
                + Text::new(
                    format!("{:+.1}%", product.growth),
                    (dx, 0),
                    (FONT, theme.chart.pt(10.0), FontStyle::Bold)
                        .into_font()
                        .color(&theme.palette.text.to_plotters())
                        .pos(Pos::new(anchor, VPos::Center)),
                ),
        ))?;
    }

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, SegmentValue::Exact(0)), (0.0, SegmentValue::Exact(n))],
        BLACK.stroke_width(2),
    )))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedge_starts_at_center_and_spans_sweep() {
        let pts = wedge((100, 100), 50.0, -90.0, 90.0);
        assert_eq!(pts[0], (100, 100));
        assert_eq!(pts[1], (100, 50));
        assert_eq!(*pts.last().unwrap(), (150, 100));
    }

    #[test]
    fn dashed_line_alternates_segments() {
        let segs = dashed((0.0, 0.0), (10.0, 0.0), 5);
        assert_eq!(segs.len(), 5);
        assert_eq!(segs[0], vec![(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(segs[1][0], (2.0, 0.0));
    }

    #[test]
    fn padding_never_collapses_range() {
        assert_eq!(padded(10.0, 10.0, 0.2, 1.0), (9.0, 11.0));
        let (lo, hi) = padded(0.0, 100.0, 0.1, 1.0);
        assert_eq!((lo, hi), (-10.0, 110.0));
    }
}
