use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use error_stack::{Report, ResultExt};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::info;

use crate::error::ChartError;
use crate::indicator::IndicatorSeries;
use crate::model::PriceBar;
use crate::strategy::{RSI_PERIOD, RSI_THRESHOLD};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
const PRICE_PANEL_HEIGHT: u32 = 360;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Renders the alert chart and returns where the image was written.
pub trait ChartRenderer {
    fn render(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        series: &IndicatorSeries,
    ) -> Result<PathBuf, Report<ChartError>>;
}

/// Two stacked panels written as PNG: close with SMA 20/50/200, then RSI(5)
/// with reference lines at 30 and 70.
pub struct PngChartRenderer {
    dir: PathBuf,
}

impl PngChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn chart_path(&self, symbol: &str) -> PathBuf {
        self.dir
            .join(format!("{}_rsi_sma_chart.png", symbol.to_lowercase()))
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        series: &IndicatorSeries,
    ) -> Result<PathBuf, Report<ChartError>> {
        if bars.is_empty() {
            return Err(Report::new(ChartError::EmptySeries));
        }

        std::fs::create_dir_all(&self.dir)
            .change_context(ChartError::CreateDir)
            .attach_with(|| format!("dir: {}", self.dir.display()))?;

        let path = self.chart_path(symbol);
        draw(&path, symbol, bars, series).attach_with(|| format!("path: {}", path.display()))?;

        info!(path = %path.display(), bars = bars.len(), "chart rendered");
        Ok(path)
    }
}

fn draw(
    path: &Path,
    symbol: &str,
    bars: &[PriceBar],
    series: &IndicatorSeries,
) -> Result<(), Report<ChartError>> {
    let first = bars[0].date;
    let mut last = bars[bars.len() - 1].date;
    if last <= first {
        last = first + Duration::days(1);
    }
    let (low, high) = price_bounds(bars, series);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;
    let (upper, lower) = root.split_vertically(PRICE_PANEL_HEIGHT);

    // ── Price panel ───────────────────────────────────────────────────────────
    let mut price = ChartBuilder::on(&upper)
        .caption(format!("{symbol} Price + SMAs"), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(24)
        .y_label_area_size(56)
        .build_cartesian_2d(first..last, low..high)
        .map_err(draw_error)?;

    price
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format("%b %d").to_string())
        .draw()
        .map_err(draw_error)?;

    price
        .draw_series(LineSeries::new(
            bars.iter().map(|b| (b.date, b.close)),
            &BLACK,
        ))
        .map_err(draw_error)?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    let averages = [
        ("SMA 20", &series.sma_20, BLUE),
        ("SMA 50", &series.sma_50, RGBColor(230, 120, 0)),
        ("SMA 200", &series.sma_200, RGBColor(0, 150, 60)),
    ];
    for (label, values, color) in averages {
        let points = defined_points(bars, values);
        if points.is_empty() {
            continue;
        }
        price
            .draw_series(LineSeries::new(points, &color))
            .map_err(draw_error)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    price
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_error)?;

    // ── RSI panel ─────────────────────────────────────────────────────────────
    let mut rsi = ChartBuilder::on(&lower)
        .caption(format!("RSI({RSI_PERIOD})"), ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(24)
        .y_label_area_size(56)
        .build_cartesian_2d(first..last, 0f64..100f64)
        .map_err(draw_error)?;

    rsi.configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|d: &NaiveDate| d.format("%b %d").to_string())
        .draw()
        .map_err(draw_error)?;

    rsi.draw_series(LineSeries::new(
        defined_points(bars, &series.rsi_5),
        &RGBColor(255, 140, 0),
    ))
    .map_err(draw_error)?;

    for (level, color) in [(RSI_OVERBOUGHT, RED), (RSI_THRESHOLD, GREEN)] {
        rsi.draw_series(DashedLineSeries::new(
            vec![(first, level), (last, level)],
            6,
            4,
            color.stroke_width(1),
        ))
        .map_err(draw_error)?;
    }

    root.present().map_err(draw_error)?;
    Ok(())
}

fn draw_error(err: impl std::fmt::Display) -> Report<ChartError> {
    Report::new(ChartError::Draw).attach(err.to_string())
}

fn defined_points(bars: &[PriceBar], values: &[Option<f64>]) -> Vec<(NaiveDate, f64)> {
    bars.iter()
        .zip(values)
        .filter_map(|(b, v)| v.map(|v| (b.date, v)))
        .collect()
}

/// Y range of the price panel: closes and every defined SMA, padded by 5%.
fn price_bounds(bars: &[PriceBar], series: &IndicatorSeries) -> (f64, f64) {
    let values = bars.iter().map(|b| b.close).chain(
        [&series.sma_20, &series.sma_50, &series.sma_200]
            .into_iter()
            .flat_map(|s| s.iter().flatten().copied()),
    );
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((high - low) * 0.05).max(1.0);
    (low - pad, high + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::bars_from_closes;

    #[test]
    fn chart_path_uses_lowercase_symbol() {
        let renderer = PngChartRenderer::new("/tmp/charts");
        assert_eq!(
            renderer.chart_path("AMZN"),
            PathBuf::from("/tmp/charts/amzn_rsi_sma_chart.png")
        );
    }

    #[test]
    fn price_bounds_cover_closes_and_averages() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let bars = bars_from_closes(&closes);
        let series = IndicatorSeries::compute(&bars).unwrap();
        let (low, high) = price_bounds(&bars, &series);
        assert!(low < 100.0);
        assert!(high > 159.0);
    }

    #[test]
    fn price_bounds_flat_series_has_span() {
        let bars = bars_from_closes(&[50.0; 10]);
        let series = IndicatorSeries::compute(&bars).unwrap();
        let (low, high) = price_bounds(&bars, &series);
        assert_eq!((low, high), (49.0, 51.0));
    }

    #[test]
    fn defined_points_skip_warm_up() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        let points = defined_points(&bars, &[None, Some(1.5), Some(2.5)]);
        assert_eq!(points, vec![(bars[1].date, 1.5), (bars[2].date, 2.5)]);
    }

    #[test]
    fn empty_series_is_rejected() {
        let renderer = PngChartRenderer::new(std::env::temp_dir());
        let series = IndicatorSeries::compute(&[]).unwrap();
        assert!(renderer.render("AMZN", &[], &series).is_err());
    }

    /// Needs system fonts for captions. Run with `cargo test -- --ignored`
    #[test]
    #[ignore]
    fn renders_png_to_disk() {
        let dir = std::env::temp_dir().join("swing-notifier-chart-test");
        let renderer = PngChartRenderer::new(&dir);
        let closes: Vec<f64> = (0..63).map(|i| 180.0 + ((i * 7) % 13) as f64).collect();
        let bars = bars_from_closes(&closes);
        let series = IndicatorSeries::compute(&bars).unwrap();
        let path = renderer.render("AMZN", &bars, &series).unwrap();
        assert!(path.exists());
    }
}
