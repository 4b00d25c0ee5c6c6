use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FigureSpec – one entry of the figure table
// ---------------------------------------------------------------------------

/// Settings for one paper figure. Omitted JSON fields fall back to the
/// learning-curve defaults (steps on x, average rewards on y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    /// Sub-directory of the results directory holding this figure's arrays.
    #[serde(default)]
    pub dir: String,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub legend_loc: LegendLoc,
    #[serde(default = "FigureSpec::default_x_ticks")]
    pub x_ticks: TickSpec,
    /// Text shown at each x tick; defaults to the tick values.
    #[serde(default)]
    pub x_tick_labels: Option<Vec<String>>,
    #[serde(default)]
    pub y_ticks: Option<TickSpec>,
    #[serde(default = "FigureSpec::default_x_label")]
    pub x_label: String,
    #[serde(default = "FigureSpec::default_y_label")]
    pub y_label: String,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default = "FigureSpec::default_grid")]
    pub grid: bool,
    #[serde(default)]
    pub style: StyleOverrides,
}

impl FigureSpec {
    fn default_x_ticks() -> TickSpec {
        TickSpec::List(vec![0.0, 2000.0, 4000.0, 6000.0, 8000.0, 10000.0])
    }
    fn default_x_label() -> String {
        "Steps".to_string()
    }
    fn default_y_label() -> String {
        "Average rewards".to_string()
    }
    fn default_grid() -> bool {
        true
    }

    /// An entry with every optional field at its default.
    pub fn with_series(dir: &str, series: Vec<SeriesSpec>) -> Self {
        FigureSpec {
            dir: dir.to_string(),
            series,
            legend_loc: LegendLoc::default(),
            x_ticks: Self::default_x_ticks(),
            x_tick_labels: None,
            y_ticks: None,
            x_label: Self::default_x_label(),
            y_label: Self::default_y_label(),
            curve: Curve::default(),
            grid: Self::default_grid(),
            style: StyleOverrides::default(),
        }
    }
}

/// One plotted curve: the array file and how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// File name relative to the figure directory.
    pub file: String,
    /// Legend text.
    pub label: String,
    /// `#rrggbb` or a matplotlib letter; a generated colour if absent.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub marker: Option<Marker>,
}

// ---------------------------------------------------------------------------
// Curve transform
// ---------------------------------------------------------------------------

/// How a loaded array becomes a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Curve {
    /// Values plotted against the x ticks, one value per tick.
    Raw,
    /// Per-step rewards, plotted as their running mean against step index.
    #[default]
    Average,
}

// ---------------------------------------------------------------------------
// Markers and legend placement (matplotlib spellings)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    #[serde(rename = ".")]
    Point,
    #[serde(rename = "o")]
    Circle,
    #[serde(rename = "s")]
    Square,
    #[serde(rename = "D")]
    Diamond,
    #[serde(rename = "^")]
    TriangleUp,
    #[serde(rename = "v")]
    TriangleDown,
    #[serde(rename = "<")]
    TriangleLeft,
    #[serde(rename = ">")]
    TriangleRight,
    #[serde(rename = "x")]
    Cross,
    #[serde(rename = "+")]
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendLoc {
    #[serde(rename = "upper left")]
    UpperLeft,
    #[serde(rename = "upper center")]
    UpperCenter,
    #[default]
    #[serde(rename = "upper right", alias = "best")]
    UpperRight,
    #[serde(rename = "center left")]
    CenterLeft,
    #[serde(rename = "center")]
    Center,
    #[serde(rename = "center right", alias = "right")]
    CenterRight,
    #[serde(rename = "lower left")]
    LowerLeft,
    #[serde(rename = "lower center")]
    LowerCenter,
    #[serde(rename = "lower right")]
    LowerRight,
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

/// Explicit tick positions, or a half-open `arange(start, stop, step)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickSpec {
    List(Vec<f64>),
    Range { start: f64, stop: f64, step: f64 },
}

impl TickSpec {
    pub fn arange(start: f64, stop: f64, step: f64) -> Self {
        TickSpec::Range { start, stop, step }
    }

    /// Tick positions, or `None` when the range step is zero or not finite.
    pub fn values(&self) -> Option<Vec<f64>> {
        match self {
            TickSpec::List(v) => Some(v.clone()),
            TickSpec::Range { start, stop, step } => {
                if *step == 0.0 || !step.is_finite() || !start.is_finite() || !stop.is_finite() {
                    return None;
                }
                let n = ((stop - start) / step).ceil().max(0.0) as usize;
                Some((0..n).map(|i| start + i as f64 * step).collect())
            }
        }
    }
}

/// Integers print without a decimal point, like matplotlib tick labels.
pub fn format_tick(v: f64) -> String {
    let v = round_tick(v);
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Strip floating point noise such as `0.30000000000000004`.
fn round_tick(v: f64) -> f64 {
    if v.abs() >= 1e9 {
        return v;
    }
    (v * 1e9).round() / 1e9
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Per-figure overrides of the computed [`Style`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub font_size: Option<f64>,
    pub legend_font_size: Option<f64>,
    pub line_width: Option<f64>,
}

/// Sizes in points, converted to pixels at `dpi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
    pub line_width: f64,
    pub marker_size: f64,
    pub font_size: f64,
    pub legend_font_size: f64,
}

impl Style {
    /// The paper's sizing rules: smaller fonts for figure 5 and smaller
    /// legends for the crowded learning-curve figures.
    pub fn for_figure(number: u32) -> Self {
        Style {
            width_in: 12.0,
            height_in: 10.0,
            dpi: 100.0,
            line_width: 3.0,
            marker_size: 10.0,
            font_size: if number == 5 { 15.0 } else { 25.0 },
            legend_font_size: if matches!(number, 6 | 7 | 10 | 11) {
                15.0
            } else {
                25.0
            },
        }
    }

    pub fn with_overrides(mut self, o: &StyleOverrides) -> Self {
        if let Some(v) = o.font_size {
            self.font_size = v;
        }
        if let Some(v) = o.legend_font_size {
            self.legend_font_size = v;
        }
        if let Some(v) = o.line_width {
            self.line_width = v;
        }
        self
    }

    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round() as u32,
            (self.height_in * self.dpi).round() as u32,
        )
    }

    /// Points to pixels.
    pub fn px(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }
}
