//! Score Distribution Plot
//!
//! Overlaid, area-normalized histograms of background and signal scores,
//! rendered to SVG.

use crate::ReportError;
use plotters::prelude::*;
use std::path::Path;

/// Histogram bins per class
pub const SCORE_BINS: usize = 60;

const BACKGROUND_COLOR: RGBColor = RGBColor(31, 119, 180);
const SIGNAL_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Normalized histogram heights of `values` over `[lo, hi]`.
fn density(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; bins];
    let width = (hi - lo) / bins as f64;
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let area = values.len() as f64 * width;
    counts.iter().map(|&c| c as f64 / area).collect()
}

/// Draw the background and signal score distributions into `path`.
pub fn plot_score_distribution(
    path: &Path,
    background: &[f64],
    signal: &[f64],
    title: &str,
) -> Result<(), ReportError> {
    if background.is_empty() || signal.is_empty() {
        return Err(ReportError::EmptyPlot);
    }
    draw(path, background, signal, title).map_err(|e| ReportError::Plot(e.to_string()))?;
    tracing::info!(path = %path.display(), "wrote score distribution plot");
    Ok(())
}

fn draw(
    path: &Path,
    background: &[f64],
    signal: &[f64],
    title: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let all = background.iter().chain(signal);
    let mut lo = all.clone().copied().fold(f64::INFINITY, f64::min);
    let mut hi = all.copied().fold(f64::NEG_INFINITY, f64::max);
    if (hi - lo).abs() < 1e-12 {
        lo -= 0.5;
        hi += 0.5;
    }

    let bkg = density(background, lo, hi, SCORE_BINS);
    let sig = density(signal, lo, hi, SCORE_BINS);
    let y_max = bkg.iter().chain(&sig).copied().fold(0.0, f64::max) * 1.1;
    let width = (hi - lo) / SCORE_BINS as f64;

    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("score")
        .y_desc("density")
        .draw()?;

    for (heights, color, label) in [
        (&bkg, BACKGROUND_COLOR, "background"),
        (&sig, SIGNAL_COLOR, "signal"),
    ] {
        chart
            .draw_series(heights.iter().enumerate().map(|(i, &h)| {
                let x0 = lo + i as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, h)], color.mix(0.45).filled())
            }))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_integrates_to_one() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let heights = density(&values, 0.0, 9.9, 10);
        let area: f64 = heights.iter().map(|h| h * 0.99).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_plot_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score_distribution_n10_test.svg");
        let bkg = [0.1, 0.2, 0.25, 0.3];
        let sig = [-0.4, -0.2, 0.0];
        plot_score_distribution(&path, &bkg, &sig, "test").unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_empty_scores_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        assert!(matches!(
            plot_score_distribution(&path, &[], &[1.0], "t"),
            Err(ReportError::EmptyPlot)
        ));
    }
}
