use std::ops::RangeInclusive;

use eframe::egui::{self, Ui};
use egui_plot::{Corner, GridInput, GridMark, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::to_egui;
use crate::figure::prepare::Axis;
use crate::figure::spec::{LegendLoc, Marker, format_tick};
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Interactive figure (central panel)
// ---------------------------------------------------------------------------

/// Render the prepared figure with egui_plot.
pub fn figure_plot(ui: &mut Ui, state: &ViewerState) {
    let fig = &state.figure;
    let style = &fig.style;

    let mut plot = Plot::new("figure_plot")
        .legend(Legend::default().position(legend_corner(fig.legend_loc)))
        .x_axis_label(fig.x.label.clone())
        .y_axis_label(fig.y.label.clone())
        .show_grid(fig.grid)
        .include_x(fig.x.min)
        .include_x(fig.x.max)
        .include_y(fig.y.min)
        .include_y(fig.y.max)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if !fig.x.ticks.is_empty() {
        let marks = grid_marks(&fig.x.ticks);
        let axis = fig.x.clone();
        plot = plot
            .x_grid_spacer(move |_input: GridInput| marks.clone())
            .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                axis_text(&axis, mark.value)
            });
    }
    if !fig.y.ticks.is_empty() {
        let marks = grid_marks(&fig.y.ticks);
        let axis = fig.y.clone();
        plot = plot
            .y_grid_spacer(move |_input: GridInput| marks.clone())
            .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                axis_text(&axis, mark.value)
            });
    }

    plot.show(ui, |plot_ui| {
        for s in &fig.series {
            let color = to_egui(s.color);

            // One line per finite run; equal names share a legend entry.
            for run in s.finite_runs() {
                let line = Line::new(plot_points(run))
                    .name(&s.label)
                    .color(color)
                    .width(style.line_width as f32);
                plot_ui.line(line);
            }

            if let Some(marker) = s.marker {
                let finite: Vec<(f64, f64)> = s.finite_runs().flatten().copied().collect();
                let markers = Points::new(plot_points(&finite))
                    .name(&s.label)
                    .shape(marker_shape(marker))
                    .radius((style.marker_size / 2.0) as f32)
                    .filled(true)
                    .color(color);
                plot_ui.points(markers);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Saved image (central panel, second tab)
// ---------------------------------------------------------------------------

pub fn saved_image(ui: &mut Ui, state: &ViewerState) {
    match state.saved_uri() {
        Some(uri) => {
            egui::ScrollArea::both().show(ui, |ui: &mut Ui| {
                ui.add(egui::Image::new(uri).shrink_to_fit());
            });
        }
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("No image saved yet  (File → Save as…)");
            });
        }
    }
}

// -- helpers --

fn plot_points(points: &[(f64, f64)]) -> PlotPoints<'static> {
    points.iter().map(|&(x, y)| [x, y]).collect()
}

/// One grid line per explicit tick; the smallest tick gap sets line strength.
fn grid_marks(ticks: &[f64]) -> Vec<GridMark> {
    let step_size = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    let step_size = if step_size.is_finite() { step_size } else { 1.0 };
    ticks
        .iter()
        .map(|&value| GridMark { value, step_size })
        .collect()
}

fn axis_text(axis: &Axis, value: f64) -> String {
    axis.label_at(value)
        .map(str::to_string)
        .unwrap_or_else(|| format_tick(value))
}

/// egui_plot legends live in a corner; centred locations snap to the
/// nearest one.
fn legend_corner(loc: LegendLoc) -> Corner {
    match loc {
        LegendLoc::UpperLeft | LegendLoc::CenterLeft => Corner::LeftTop,
        LegendLoc::UpperCenter
        | LegendLoc::UpperRight
        | LegendLoc::Center
        | LegendLoc::CenterRight => Corner::RightTop,
        LegendLoc::LowerLeft => Corner::LeftBottom,
        LegendLoc::LowerCenter | LegendLoc::LowerRight => Corner::RightBottom,
    }
}

fn marker_shape(marker: Marker) -> MarkerShape {
    match marker {
        Marker::Point | Marker::Circle => MarkerShape::Circle,
        Marker::Square => MarkerShape::Square,
        Marker::Diamond => MarkerShape::Diamond,
        Marker::TriangleUp => MarkerShape::Up,
        Marker::TriangleDown => MarkerShape::Down,
        Marker::TriangleLeft => MarkerShape::Left,
        Marker::TriangleRight => MarkerShape::Right,
        Marker::Cross => MarkerShape::Cross,
        Marker::Plus => MarkerShape::Plus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_marks_use_smallest_gap() {
        let marks = grid_marks(&[-20.0, -15.0, -10.0]);
        assert_eq!(marks.len(), 3);
        assert!(marks.iter().all(|m| m.step_size == 5.0));
        assert_eq!(grid_marks(&[3.0])[0].step_size, 1.0);
    }

    #[test]
    fn plot_points_keep_order() {
        let pts = plot_points(&[(0.0, 1.0), (2.0, 3.0)]);
        let xy: Vec<_> = pts.points().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(xy, vec![(0.0, 1.0), (2.0, 3.0)]);
    }

    #[test]
    fn legend_corners() {
        assert_eq!(legend_corner(LegendLoc::UpperLeft), Corner::LeftTop);
        assert_eq!(legend_corner(LegendLoc::LowerRight), Corner::RightBottom);
    }

    #[test]
    fn paper_markers_map_to_egui_shapes() {
        assert_eq!(marker_shape(Marker::Circle), MarkerShape::Circle);
        assert_eq!(marker_shape(Marker::TriangleLeft), MarkerShape::Left);
    }
}
