use std::path::Path;

use anyhow::Result;

use super::spec::{Curve, LegendLoc, Marker, Style, format_tick};
use super::table::ResolvedFigure;
use crate::color::{Rgb8, generate_palette, parse_color};
use crate::data::reduce::cumulative_average;
use crate::error::FigureError;

// ---------------------------------------------------------------------------
// PreparedFigure – loaded, validated, ready for either renderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PreparedSeries {
    pub label: String,
    pub color: Rgb8,
    pub marker: Option<Marker>,
    pub points: Vec<(f64, f64)>,
}

impl PreparedSeries {
    /// Maximal runs of points with finite coordinates; a NaN ends a run.
    pub fn finite_runs(&self) -> impl Iterator<Item = &[(f64, f64)]> {
        self.points
            .split(|(x, y)| !x.is_finite() || !y.is_finite())
            .filter(|run| !run.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    /// Explicit tick positions; empty means "let the renderer choose".
    pub ticks: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    /// Label for a tick at `value`, if it is one of the explicit ticks.
    pub fn label_at(&self, value: f64) -> Option<&str> {
        let tol = (self.max - self.min).abs() * 1e-9;
        self.ticks
            .iter()
            .position(|&t| (t - value).abs() <= tol)
            .map(|i| self.tick_labels[i].as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PreparedFigure {
    pub number: u32,
    pub series: Vec<PreparedSeries>,
    pub x: Axis,
    pub y: Axis,
    pub legend_loc: LegendLoc,
    pub grid: bool,
    pub style: Style,
}

/// Load every series of `fig` with `load` and turn it into plot points.
pub fn prepare(
    fig: &ResolvedFigure,
    mut load: impl FnMut(&Path) -> Result<Vec<f64>>,
) -> Result<PreparedFigure> {
    let number = fig.number;
    let spec = &fig.spec;

    let x_ticks = spec
        .x_ticks
        .values()
        .ok_or(FigureError::InvalidTicks { figure: number })?;
    let y_ticks = match &spec.y_ticks {
        Some(t) => t.values().ok_or(FigureError::InvalidTicks { figure: number })?,
        None => Vec::new(),
    };

    let x_tick_labels = match &spec.x_tick_labels {
        Some(labels) if labels.len() != x_ticks.len() => {
            return Err(FigureError::TickLabelMismatch {
                figure: number,
                ticks: x_ticks.len(),
                labels: labels.len(),
            }
            .into());
        }
        Some(labels) => labels.clone(),
        None => x_ticks.iter().map(|&t| format_tick(t)).collect(),
    };

    let uncolored = spec.series.iter().filter(|s| s.color.is_none()).count();
    let mut fallback = generate_palette(uncolored).into_iter();
    if uncolored > 0 {
        log::warn!("Figure {number}: {uncolored} series without a colour, using generated palette");
    }

    let mut series = Vec::with_capacity(spec.series.len());
    for (s, path) in spec.series.iter().zip(&fig.series_paths) {
        let values = load(path)?;

        let points: Vec<(f64, f64)> = match spec.curve {
            Curve::Raw => {
                if values.len() != x_ticks.len() {
                    return Err(FigureError::LengthMismatch {
                        figure: number,
                        label: s.label.clone(),
                        expected: x_ticks.len(),
                        actual: values.len(),
                    }
                    .into());
                }
                x_ticks.iter().copied().zip(values).collect()
            }
            Curve::Average => cumulative_average(&values)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i as f64, v))
                .collect(),
        };

        let color = match &s.color {
            Some(c) => parse_color(c).ok_or_else(|| FigureError::InvalidColor {
                figure: number,
                color: c.clone(),
            })?,
            None => fallback.next().unwrap_or_default(),
        };

        series.push(PreparedSeries {
            label: s.label.clone(),
            color,
            marker: s.marker,
            points,
        });
    }

    let xs = series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
    let (x_min, x_max) = axis_limits(xs, &x_ticks);
    let ys = series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
    let (y_min, y_max) = axis_limits(ys, &y_ticks);

    let y_tick_labels = y_ticks.iter().map(|&t| format_tick(t)).collect();

    Ok(PreparedFigure {
        number,
        series,
        x: Axis {
            label: spec.x_label.clone(),
            ticks: x_ticks,
            tick_labels: x_tick_labels,
            min: x_min,
            max: x_max,
        },
        y: Axis {
            label: spec.y_label.clone(),
            ticks: y_ticks,
            tick_labels: y_tick_labels,
            min: y_min,
            max: y_max,
        },
        legend_loc: spec.legend_loc,
        grid: spec.grid,
        style: fig.style,
    })
}

/// Data extent padded by 5% per side, then widened to cover every tick.
pub fn axis_limits(values: impl Iterator<Item = f64>, ticks: &[f64]) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if lo > hi {
        // no finite data
        if ticks.is_empty() {
            return (0.0, 1.0);
        }
    } else if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        lo -= 0.5;
        hi += 0.5;
    } else {
        let pad = (hi - lo) * 0.05;
        lo -= pad;
        hi += pad;
    }

    for &t in ticks {
        lo = lo.min(t);
        hi = hi.max(t);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::spec::{FigureSpec, SeriesSpec, TickSpec};
    use crate::figure::table::{builtin, resolve};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + i as f64).collect()
    }

    #[test]
    fn raw_series_pair_with_x_ticks() {
        let fig = resolve(&builtin(), 4, Path::new("res")).unwrap();
        let prepared = prepare(&fig, |_| Ok(ramp(11))).unwrap();

        assert_eq!(prepared.series.len(), 2);
        assert_eq!(prepared.series[0].points[0], (-20.0, 10.0));
        assert_eq!(prepared.series[0].points[10], (30.0, 20.0));
        assert_eq!(prepared.x.tick_labels[0], "-20");
        // y ticks 0..35 are wider than the data
        assert_eq!(prepared.y.min, 0.0);
        assert_eq!(prepared.y.max, 35.0);
    }

    #[test]
    fn raw_length_mismatch_names_series() {
        let fig = resolve(&builtin(), 5, Path::new("res")).unwrap();
        let err = prepare(&fig, |_| Ok(ramp(7))).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Proposed DRL Method"), "{msg}");
        assert!(msg.contains("7 values"), "{msg}");
        assert!(msg.contains("20 ticks"), "{msg}");
    }

    #[test]
    fn learning_curves_are_averaged_over_steps() {
        let mut table = builtin();
        table.insert(
            6,
            FigureSpec::with_series(
                "learning",
                vec![SeriesSpec {
                    file: "a.npy".into(),
                    label: "A".into(),
                    color: None,
                    marker: None,
                }],
            ),
        );
        let fig = resolve(&table, 6, Path::new("res")).unwrap();
        let prepared = prepare(&fig, |_| Ok(vec![4.0, 0.0, 2.0])).unwrap();

        assert_eq!(
            prepared.series[0].points,
            vec![(0.0, 4.0), (1.0, 2.0), (2.0, 2.0)]
        );
        // default x ticks stretch the axis to 10000 steps
        assert_eq!(prepared.x.max, 10000.0);
        assert!(prepared.y.ticks.is_empty());
    }

    #[test]
    fn bad_color_is_reported() {
        let mut fig = resolve(&builtin(), 5, Path::new("res")).unwrap();
        fig.spec.series[0].color = Some("chartreuse?".into());
        let err = prepare(&fig, |_| Ok(ramp(20))).unwrap_err();
        assert!(err.to_string().contains("chartreuse?"));
    }

    #[test]
    fn tick_label_count_must_match() {
        let mut fig = resolve(&builtin(), 5, Path::new("res")).unwrap();
        fig.spec.x_ticks = TickSpec::List(vec![0.0, 1.0]);
        fig.spec.x_tick_labels = Some(vec!["zero".into()]);
        let err = prepare(&fig, |_| Ok(ramp(2))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FigureError>(),
            Some(FigureError::TickLabelMismatch { ticks: 2, labels: 1, .. })
        ));
    }

    #[test]
    fn fractional_tick_labels_are_rounded() {
        let mut fig = resolve(&builtin(), 5, Path::new("res")).unwrap();
        fig.spec.x_ticks = TickSpec::arange(0.0, 1.0, 0.1);
        let prepared = prepare(&fig, |_| Ok(ramp(10))).unwrap();
        assert_eq!(prepared.x.tick_labels[3], "0.3");
        assert_eq!(prepared.x.tick_labels[9], "0.9");
    }

    #[test]
    fn nan_splits_series_into_runs() {
        let fig = resolve(&builtin(), 5, Path::new("res")).unwrap();
        let mut values = ramp(20);
        values[0] = f64::NAN;
        values[10] = f64::NAN;
        values[11] = f64::NAN;
        let prepared = prepare(&fig, |_| Ok(values.clone())).unwrap();

        let runs: Vec<_> = prepared.series[0].finite_runs().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 9);
        assert_eq!(runs[0][0], (20.0, 11.0));
        assert_eq!(runs[1].len(), 8);
        assert_eq!(runs[1][0], (130.0, 22.0));
    }

    #[test]
    fn loader_errors_propagate() {
        let fig = resolve(&builtin(), 5, Path::new("res")).unwrap();
        let err = prepare(&fig, |p| anyhow::bail!("missing {}", p.display())).unwrap_err();
        assert!(err.to_string().contains("sum_rate_ris"));
    }

    #[test]
    fn limits_pad_and_handle_flat_data() {
        assert_eq!(axis_limits([0.0, 10.0].into_iter(), &[]), (-0.5, 10.5));
        assert_eq!(axis_limits([3.0, 3.0].into_iter(), &[]), (2.5, 3.5));
        assert_eq!(axis_limits(std::iter::empty(), &[]), (0.0, 1.0));
        assert_eq!(axis_limits([f64::NAN].into_iter(), &[1.0, 5.0]), (1.0, 5.0));
    }

    #[test]
    fn label_lookup_by_value() {
        let axis = Axis {
            label: String::new(),
            ticks: vec![0.0, 2000.0],
            tick_labels: vec!["0".into(), "2k".into()],
            min: 0.0,
            max: 2000.0,
        };
        assert_eq!(axis.label_at(2000.0), Some("2k"));
        assert_eq!(axis.label_at(1000.0), None);
    }
}
