use std::fs::File;
use std::io::BufWriter;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::element::{Drawable, PointCollection};
use plotters::prelude::*;
use plotters_backend::{BackendCoord, DrawingErrorKind};

use crate::color::to_plotters;
use crate::error::FigureError;
use crate::figure::prepare::{Axis, PreparedFigure};
use crate::figure::spec::{LegendLoc, Marker, format_tick};

const JPEG_QUALITY: u8 = 95;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Render `fig` to an image file; the format follows the extension
/// (`.jpg`/`.jpeg` or `.png`).
pub fn save_figure(fig: &PreparedFigure, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .ok()
        .filter(|f| matches!(f, ImageFormat::Jpeg | ImageFormat::Png))
        .ok_or_else(|| FigureError::UnsupportedImage(path.to_path_buf()))?;

    let (w, h) = fig.style.pixel_size();
    let mut buf = vec![255u8; w as usize * h as usize * 3];
    draw(fig, &mut buf, (w, h)).with_context(|| format!("drawing figure {}", fig.number))?;

    let img = RgbImage::from_raw(w, h, buf).context("pixel buffer does not match canvas size")?;
    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))
                .with_context(|| format!("encoding {}", path.display()))?;
        }
        _ => img
            .save_with_format(path, format)
            .with_context(|| format!("writing {}", path.display()))?,
    }

    log::info!("Saved figure {} to {}", fig.number, path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(fig: &PreparedFigure, buf: &mut [u8], size: (u32, u32)) -> Result<()> {
    let style = &fig.style;
    let font_px = style.px(style.font_size);
    let legend_px = style.px(style.legend_font_size);
    let line_px = style.px(style.line_width).round().max(1.0) as u32;
    let marker_px = (style.px(style.marker_size) / 2.0).round().max(2.0) as i32;

    let root = BitMapBackend::with_buffer(buf, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_axis = TickedAxis::new(&fig.x);
    let y_axis = TickedAxis::new(&fig.y);
    let (x_labels, y_labels) = (x_axis.label_hint(), y_axis.label_hint());

    let mut chart = ChartBuilder::on(&root)
        .margin(font_px.max(10.0))
        .x_label_area_size(font_px * 3.0)
        .y_label_area_size(font_px * 4.0)
        .build_cartesian_2d(x_axis, y_axis)?;

    let x_fmt = |v: &f64| tick_text(&fig.x, *v);
    let y_fmt = |v: &f64| tick_text(&fig.y, *v);
    let font = ("sans-serif", font_px).into_font();

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(x_labels)
        .y_labels(y_labels)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc(fig.x.label.as_str())
        .y_desc(fig.y.label.as_str())
        .label_style(font.clone())
        .axis_desc_style(font)
        .light_line_style(WHITE);
    if fig.grid {
        mesh.bold_line_style(BLACK.mix(0.2));
    } else {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    for s in &fig.series {
        let color = to_plotters(s.color);
        let line_style = color.stroke_width(line_px);
        let glyph_style = ShapeStyle {
            color: color.to_rgba(),
            filled: true,
            stroke_width: 2,
        };

        // NaN breaks the line instead of dragging it to the plot edge.
        for run in s.finite_runs() {
            chart.draw_series(LineSeries::new(run.iter().copied(), line_style))?;
        }

        if let Some(marker) = s.marker {
            chart.draw_series(s.finite_runs().flatten().map(|&at| Glyph {
                at,
                marker,
                radius: marker_px,
                style: glyph_style,
            }))?;
        }

        let marker = s.marker;
        chart
            .draw_series(std::iter::empty::<Glyph<(f64, f64)>>())?
            .label(s.label.as_str())
            .legend(move |at| LegendKey {
                at,
                length: 36,
                line: line_style,
                glyph: marker.map(|m| (m, marker_px, glyph_style)),
            });
    }

    chart
        .configure_series_labels()
        .position(label_position(fig.legend_loc))
        .label_font(("sans-serif", legend_px).into_font())
        .legend_area_size(44)
        .margin(font_px.max(10.0) as u32)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.3))
        .draw()?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Axis with explicit ticks
// ---------------------------------------------------------------------------

/// Linear `f64` axis whose key points are the configured ticks, or plotters'
/// own choice when there are none.
struct TickedAxis {
    linear: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(axis: &Axis) -> Self {
        let ticks = axis
            .ticks
            .iter()
            .copied()
            .filter(|t| *t >= axis.min && *t <= axis.max)
            .collect();
        Self {
            linear: (axis.min..axis.max).into(),
            ticks,
        }
    }

    fn label_hint(&self) -> usize {
        if self.ticks.is_empty() {
            10
        } else {
            self.ticks.len()
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.linear.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if self.ticks.is_empty() {
            return self.linear.key_points(hint);
        }
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.linear.range()
    }
}

// ---------------------------------------------------------------------------
// Marker elements
// ---------------------------------------------------------------------------

/// A marker centred on a data point.
struct Glyph<C> {
    at: C,
    marker: Marker,
    radius: i32,
    style: ShapeStyle,
}

impl<'a, C: 'a> PointCollection<'a, C> for &'a Glyph<C> {
    type Point = &'a C;
    type IntoIter = std::iter::Once<&'a C>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.at)
    }
}

impl<C, DB: DrawingBackend> Drawable<DB> for Glyph<C> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut pos: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        match pos.next() {
            Some(at) => draw_marker(backend, at, self.marker, self.radius, &self.style),
            None => Ok(()),
        }
    }
}

/// Legend sample: a short line with the series marker in its middle.
struct LegendKey {
    at: BackendCoord,
    length: i32,
    line: ShapeStyle,
    glyph: Option<(Marker, i32, ShapeStyle)>,
}

impl<'a> PointCollection<'a, BackendCoord> for &'a LegendKey {
    type Point = &'a BackendCoord;
    type IntoIter = std::iter::Once<&'a BackendCoord>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.at)
    }
}

impl<DB: DrawingBackend> Drawable<DB> for LegendKey {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut pos: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let Some((x, y)) = pos.next() else {
            return Ok(());
        };
        backend.draw_line((x, y), (x + self.length, y), &self.line)?;
        match &self.glyph {
            Some((marker, r, style)) => {
                draw_marker(backend, (x + self.length / 2, y), *marker, *r, style)
            }
            None => Ok(()),
        }
    }
}

fn draw_marker<DB: DrawingBackend>(
    backend: &mut DB,
    (x, y): BackendCoord,
    marker: Marker,
    r: i32,
    style: &ShapeStyle,
) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
    let radius = r.max(1) as u32;
    match marker {
        Marker::Point => backend.draw_circle((x, y), (radius / 2).max(1), style, true),
        Marker::Circle => backend.draw_circle((x, y), radius, style, true),
        Marker::Square => backend.draw_rect((x - r, y - r), (x + r, y + r), style, true),
        Marker::Diamond => {
            backend.fill_polygon([(x, y - r), (x + r, y), (x, y + r), (x - r, y)], style)
        }
        Marker::TriangleUp => {
            backend.fill_polygon([(x, y - r), (x + r, y + r), (x - r, y + r)], style)
        }
        Marker::TriangleDown => {
            backend.fill_polygon([(x, y + r), (x + r, y - r), (x - r, y - r)], style)
        }
        Marker::TriangleLeft => {
            backend.fill_polygon([(x - r, y), (x + r, y - r), (x + r, y + r)], style)
        }
        Marker::TriangleRight => {
            backend.fill_polygon([(x + r, y), (x - r, y - r), (x - r, y + r)], style)
        }
        Marker::Cross => {
            backend.draw_line((x - r, y - r), (x + r, y + r), style)?;
            backend.draw_line((x - r, y + r), (x + r, y - r), style)
        }
        Marker::Plus => {
            backend.draw_line((x - r, y), (x + r, y), style)?;
            backend.draw_line((x, y - r), (x, y + r), style)
        }
    }
}

fn label_position(loc: LegendLoc) -> SeriesLabelPosition {
    match loc {
        LegendLoc::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendLoc::UpperCenter => SeriesLabelPosition::UpperMiddle,
        LegendLoc::UpperRight => SeriesLabelPosition::UpperRight,
        LegendLoc::CenterLeft => SeriesLabelPosition::MiddleLeft,
        LegendLoc::Center => SeriesLabelPosition::MiddleMiddle,
        LegendLoc::CenterRight => SeriesLabelPosition::MiddleRight,
        LegendLoc::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendLoc::LowerCenter => SeriesLabelPosition::LowerMiddle,
        LegendLoc::LowerRight => SeriesLabelPosition::LowerRight,
    }
}

fn tick_text(axis: &Axis, v: f64) -> String {
    axis.label_at(v)
        .map(str::to_string)
        .unwrap_or_else(|| format_tick(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED, Rgb8, parse_color};
    use crate::figure::prepare::prepare;
    use crate::figure::table::{builtin, resolve};

    fn axis(ticks: Vec<f64>, min: f64, max: f64) -> Axis {
        let tick_labels = ticks.iter().map(|&t| format_tick(t)).collect();
        Axis {
            label: String::new(),
            ticks,
            tick_labels,
            min,
            max,
        }
    }

    fn figure(number: u32, values: Vec<f64>) -> PreparedFigure {
        let fig = resolve(&builtin(), number, Path::new("res")).unwrap();
        prepare(&fig, |_| Ok(values.clone())).unwrap()
    }

    /// Pixels within `tol` of `color` on every channel.
    fn count_color(img: &RgbImage, color: Rgb8, tol: i16) -> usize {
        img.pixels()
            .filter(|p| {
                (p[0] as i16 - color.red as i16).abs() <= tol
                    && (p[1] as i16 - color.green as i16).abs() <= tol
                    && (p[2] as i16 - color.blue as i16).abs() <= tol
            })
            .count()
    }

    #[test]
    fn explicit_ticks_outside_limits_are_hidden() {
        let ranged = TickedAxis::new(&axis(vec![-5.0, 0.0, 5.0, 50.0], -5.0, 10.0));
        assert_eq!(ranged.key_points(10usize), vec![-5.0, 0.0, 5.0]);
        assert_eq!(ranged.label_hint(), 3);
        assert_eq!(ranged.range(), -5.0..10.0);
    }

    #[test]
    fn axis_without_ticks_picks_its_own() {
        let ranged = TickedAxis::new(&axis(Vec::new(), 0.0, 10.0));
        let points = ranged.key_points(6usize);
        assert!(!points.is_empty() && points.len() <= 6, "{points:?}");
        assert!(points.iter().all(|p| (0.0..=10.0).contains(p)));
        assert_eq!(ranged.map(&0.0, (0, 100)), 0);
        assert_eq!(ranged.map(&10.0, (0, 100)), 100);
    }

    #[test]
    fn tick_text_prefers_configured_labels() {
        let mut a = axis(vec![0.0, 2000.0], 0.0, 2000.0);
        a.tick_labels[1] = "2K".into();
        assert_eq!(tick_text(&a, 2000.0), "2K");
        assert_eq!(tick_text(&a, 0.30000000000000004), "0.3");
    }

    #[test]
    fn legend_locations_map_one_to_one() {
        assert!(matches!(
            label_position(LegendLoc::UpperLeft),
            SeriesLabelPosition::UpperLeft
        ));
        assert!(matches!(
            label_position(LegendLoc::LowerCenter),
            SeriesLabelPosition::LowerMiddle
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_drawing() {
        let prepared = figure(5, (0..20).map(f64::from).collect());
        let err = save_figure(&prepared, Path::new("out.gif")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FigureError>(),
            Some(FigureError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn figure_with_markers_saves_as_png_and_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = figure(4, (0..11).map(|i| 10.0 + i as f64).collect());
        let red = parse_color(RED).unwrap();
        let blue = parse_color(BLUE).unwrap();

        for (name, tol) in [("4_reproduced.png", 0), ("4_reproduced.jpg", 40)] {
            let path = dir.path().join(name);
            save_figure(&prepared, &path).unwrap();

            let img = image::open(&path).unwrap().to_rgb8();
            assert_eq!(img.dimensions(), (1200, 1000), "{name}");
            assert!(count_color(&img, red, tol) > 500, "{name}: red series missing");
            assert!(count_color(&img, blue, tol) > 500, "{name}: blue series missing");
        }
    }

    #[test]
    fn nan_leaves_a_gap_in_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let red = parse_color(RED).unwrap();
        let clean: Vec<f64> = (0..20).map(|i| 12.0 + i as f64).collect();
        let mut gapped = clean.clone();
        gapped[10] = f64::NAN;

        let mut red_pixels = Vec::new();
        for (name, values) in [("clean.png", clean), ("gap.png", gapped)] {
            let path = dir.path().join(name);
            save_figure(&figure(5, values), &path).unwrap();
            let img = image::open(&path).unwrap().to_rgb8();
            red_pixels.push(count_color(&img, red, 0));
        }
        assert!(
            red_pixels[1] < red_pixels[0],
            "gap {} vs clean {}",
            red_pixels[1],
            red_pixels[0]
        );
    }
}
