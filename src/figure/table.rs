use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::spec::{Curve, FigureSpec, LegendLoc, Marker, SeriesSpec, Style, TickSpec};
use crate::color::{BLUE, RED};
use crate::error::FigureError;

/// Figure number → settings.
pub type FigureTable = BTreeMap<u32, FigureSpec>;

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

/// The figures whose settings ship with the program.
pub fn builtin() -> FigureTable {
    let mut table = FigureTable::new();
    table.insert(4, sum_rate_vs_power());
    table.insert(5, sum_rate_vs_ris_elements());
    table
}

/// Figure 4: sum rate against transmit power for two system sizes.
fn sum_rate_vs_power() -> FigureSpec {
    let values = [8, 32];
    let colors = [RED, BLUE];
    let markers = [Marker::Circle, Marker::TriangleLeft];

    let series = values
        .iter()
        .zip(colors)
        .zip(markers)
        .map(|((val, color), marker)| SeriesSpec {
            file: format!("{val}.npy"),
            label: format!("M = {val}, N = {val}, K = {val}"),
            color: Some(color.to_string()),
            marker: Some(marker),
        })
        .collect();

    FigureSpec {
        legend_loc: LegendLoc::UpperLeft,
        x_ticks: TickSpec::arange(-20.0, 35.0, 5.0),
        y_ticks: Some(TickSpec::arange(0.0, 40.0, 5.0)),
        x_label: "P_t (dB)".to_string(),
        y_label: "Sum rate (bps/Hz)".to_string(),
        curve: Curve::Raw,
        ..FigureSpec::with_series("sum_rate_power", series)
    }
}

/// Figure 5: sum rate against the number of RIS elements.
fn sum_rate_vs_ris_elements() -> FigureSpec {
    let series = vec![SeriesSpec {
        file: "result.npy".to_string(),
        label: "Proposed DRL Method".to_string(),
        color: Some(RED.to_string()),
        marker: None,
    }];

    FigureSpec {
        legend_loc: LegendLoc::UpperLeft,
        x_ticks: TickSpec::arange(10.0, 210.0, 10.0),
        y_ticks: Some(TickSpec::arange(12.0, 34.0, 2.0)),
        x_label: "Number of elements in RIS".to_string(),
        y_label: "Sum rate (bps/Hz)".to_string(),
        curve: Curve::Raw,
        ..FigureSpec::with_series("sum_rate_ris", series)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A table entry bound to concrete paths and a computed style.
#[derive(Debug, Clone)]
pub struct ResolvedFigure {
    pub number: u32,
    pub spec: FigureSpec,
    pub style: Style,
    /// One path per entry of `spec.series`.
    pub series_paths: Vec<PathBuf>,
}

/// Look up `number` and join its array files onto `results_dir`.
pub fn resolve(
    table: &FigureTable,
    number: u32,
    results_dir: &Path,
) -> Result<ResolvedFigure, FigureError> {
    let spec = table
        .get(&number)
        .cloned()
        .ok_or(FigureError::NotConfigured(number))?;

    if spec.series.is_empty() {
        return Err(FigureError::NoSeries(number));
    }

    let fig_dir = results_dir.join(&spec.dir);
    let series_paths = spec.series.iter().map(|s| fig_dir.join(&s.file)).collect();
    let style = Style::for_figure(number).with_overrides(&spec.style);

    log::debug!("Resolved figure {number}: {spec:?}");

    Ok(ResolvedFigure {
        number,
        spec,
        style,
        series_paths,
    })
}

/// Output file name for a reproduced figure, e.g. `4_reproduced.jpg`.
pub fn save_name(number: u32, ext: &str) -> String {
    format!("{number}_reproduced.{ext}")
}
