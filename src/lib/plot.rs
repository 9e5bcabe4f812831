use crate::monte_carlo::IntegralEstimate;
use crate::posterior::PosteriorCurve;
use anyhow::{anyhow, bail, Result};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use strum_macros::EnumString;

const PANEL_SIZE: (u32, u32) = (600, 420);
const SWEEP_SIZE: (u32, u32) = (700, 500);
// Strip along the left and bottom edges for the figure-wide axis titles.
const FIGURE_LABEL_SIZE: u32 = 50;

const DEJAVU_SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Makes the embedded font available as "sans-serif", the family every chart here uses.
pub fn register_fonts() -> Result<()> {
    register_font("sans-serif", FontStyle::Normal, DEJAVU_SANS)
        .map_err(|_| anyhow!("Embedded sans-serif font could not be parsed"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow!("Output path {} has no file extension", path.display()))?;
        extension
            .parse::<ImageFormat>()
            .map_err(|_| anyhow!("Unsupported image format: .{} (expected .png or .svg)", extension))
    }
}

/// Every posterior in a grid of `columns` panels per row.
pub fn render_posterior_grid(path: &Path, curves: &[PosteriorCurve], columns: usize) -> Result<()> {
    if curves.is_empty() {
        bail!("No posterior curves to render");
    }
    if columns == 0 {
        bail!("Panel layout needs at least one column");
    }
    let rows = curves.len().div_ceil(columns);
    let size = figure_size(rows, columns)?;
    register_fonts()?;
    match ImageFormat::from_path(path)? {
        ImageFormat::Png => {
            draw_posterior_grid(BitMapBackend::new(path, size).into_drawing_area(), curves, rows, columns)?
        }
        ImageFormat::Svg => {
            draw_posterior_grid(SVGBackend::new(path, size).into_drawing_area(), curves, rows, columns)?
        }
    }
    info!("Saved posterior figure to {}", path.display());
    Ok(())
}

/// Log-log plot of the sweep with min/max bars and the limiting value.
pub fn render_integral_sweep(path: &Path, estimates: &[IntegralEstimate], reference: f64) -> Result<()> {
    if estimates.is_empty() {
        bail!("No integral estimates to render");
    }
    register_fonts()?;
    match ImageFormat::from_path(path)? {
        ImageFormat::Png => {
            draw_integral_sweep(BitMapBackend::new(path, SWEEP_SIZE).into_drawing_area(), estimates, reference)?
        }
        ImageFormat::Svg => {
            draw_integral_sweep(SVGBackend::new(path, SWEEP_SIZE).into_drawing_area(), estimates, reference)?
        }
    }
    info!("Saved integral figure to {}", path.display());
    Ok(())
}

/// Pixel size of a `rows x columns` panel grid plus the axis title strips.
pub fn figure_size(rows: usize, columns: usize) -> Result<(u32, u32)> {
    let extent = |count: usize, panel: u32| {
        u32::try_from(count)
            .ok()?
            .checked_mul(panel)?
            .checked_add(FIGURE_LABEL_SIZE)
    };
    match (extent(columns, PANEL_SIZE.0), extent(rows, PANEL_SIZE.1)) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => bail!("A figure of {} x {} panels is too large to render", rows, columns),
    }
}

// Every other one of `pieces` equal segments of a line, where `interpolate`
// maps a fraction in [0, 1] to a point on it.
fn dashes<F>(pieces: usize, interpolate: F) -> Vec<Vec<(f64, f64)>>
where
    F: Fn(f64) -> (f64, f64),
{
    (0..pieces)
        .step_by(2)
        .map(|i| {
            let from = i as f64 / pieces as f64;
            let to = (i + 1) as f64 / pieces as f64;
            vec![interpolate(from), interpolate(to)]
        })
        .collect()
}

fn draw_posterior_grid<DB>(
    root: DrawingArea<DB, Shift>,
    curves: &[PosteriorCurve],
    rows: usize,
    columns: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (y_title, rest) = root.split_horizontally(FIGURE_LABEL_SIZE);
    let height = rest.dim_in_pixel().1;
    let (panel_area, x_title) = rest.split_vertically(height.saturating_sub(FIGURE_LABEL_SIZE));

    let title_style = TextStyle::from(("sans-serif", 24).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    let (width, height) = x_title.dim_in_pixel();
    x_title.draw_text("Coin bias", &title_style, (width as i32 / 2, height as i32 / 2))?;
    let (width, height) = y_title.dim_in_pixel();
    y_title.draw_text(
        "Posterior distribution of the coin bias",
        &title_style.transform(FontTransform::Rotate270),
        (width as i32 / 2, height as i32 / 2),
    )?;

    let panels = panel_area.split_evenly((rows, columns));
    for (panel, curve) in panels.iter().zip(curves) {
        let top = curve.peak();
        let y_max = if top > 0.0 { top * 1.1 } else { 1.0 };
        let mut chart = ChartBuilder::on(panel)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..1f64, 0f64..y_max)?;
        chart.configure_mesh().draw()?;

        let points: Vec<(f64, f64)> = curve
            .bias
            .iter()
            .copied()
            .zip(curve.density.iter().copied())
            .collect();
        chart.draw_series(AreaSeries::new(points.clone(), 0.0, BLUE.mix(0.5)))?;
        chart
            .draw_series(LineSeries::new(points, BLUE.stroke_width(3)))?
            .label(format!("{} flips", curve.trials))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(3)));
        // Text-only legend entry.
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label(format!("{} heads", curve.successes))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRANSPARENT));

        chart.draw_series(
            dashes(20, |t| (0.5, t * top))
                .into_iter()
                .map(|segment| PathElement::new(segment, BLACK.stroke_width(2))),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    root.present()?;
    Ok(())
}

fn draw_integral_sweep<DB>(
    root: DrawingArea<DB, Shift>,
    estimates: &[IntegralEstimate],
    reference: f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_min = estimates.iter().map(|e| e.upper).fold(f64::INFINITY, f64::min);
    let x_max = estimates.iter().map(|e| e.upper).fold(f64::NEG_INFINITY, f64::max);
    // Log axes: repetitions that underflowed to zero are drawn at the floor.
    let y_floor = estimates
        .iter()
        .flat_map(|e| [e.min, e.mean])
        .chain(std::iter::once(reference))
        .filter(|v| *v > 0.0)
        .fold(f64::INFINITY, f64::min)
        / 2.0;
    let y_ceiling = estimates
        .iter()
        .map(|e| e.max)
        .chain(std::iter::once(reference))
        .fold(f64::NEG_INFINITY, f64::max)
        * 2.0;
    if !y_floor.is_finite() || !y_ceiling.is_finite() {
        bail!("Integral estimates have no positive values to plot on log axes");
    }

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_min / 2.0..x_max * 2.0).log_scale(),
            (y_floor..y_ceiling).log_scale(),
        )?;
    chart.configure_mesh().x_desc("b").y_desc("Integral").draw()?;

    chart.draw_series(
        dashes(30, |t| (x_min * (x_max / x_min).powf(t), reference))
            .into_iter()
            .map(|segment| PathElement::new(segment, RGBColor(128, 128, 128).stroke_width(1))),
    )?;
    chart.draw_series(estimates.iter().map(|e| {
        ErrorBar::new_vertical(
            e.upper,
            e.min.max(y_floor),
            e.mean.max(y_floor),
            e.max.max(y_floor),
            BLACK.stroke_width(1),
            4,
        )
    }))?;
    chart.draw_series(
        estimates
            .iter()
            .map(|e| Circle::new((e.upper, e.mean.max(y_floor)), 4, BLACK.filled())),
    )?;
    root.present()?;
    Ok(())
}
