use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Shape;

/// Problems with the contents of a result array file.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("unsupported array file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("array is empty")]
    Empty,

    #[error("array has shape {0}; expected a single axis longer than 1")]
    NotOneDimensional(Shape),

    #[error("shape {shape:?} does not match {len} stored values")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    #[error("nested arrays are ragged at depth {0}")]
    Ragged(usize),

    #[error("'y' list column has {0} rows; expected exactly one")]
    ListRows(usize),

    #[error("unsupported NumPy dtype (expected f64, f32, i64 or i32)")]
    UnsupportedDtype,
}

/// Problems turning a figure table entry into something drawable.
#[derive(Debug, Error)]
pub enum FigureError {
    #[error("figure {0} has no settings; provide them with --config")]
    NotConfigured(u32),

    #[error("figure {0} has no series")]
    NoSeries(u32),

    #[error("figure {figure}: series '{label}' has {actual} values but the x axis has {expected} ticks")]
    LengthMismatch {
        figure: u32,
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("figure {figure}: invalid color '{color}'")]
    InvalidColor { figure: u32, color: String },

    #[error("figure {figure}: invalid tick range (step must be non-zero and finite)")]
    InvalidTicks { figure: u32 },

    #[error("figure {figure}: {ticks} x ticks but {labels} x tick labels")]
    TickLabelMismatch {
        figure: u32,
        ticks: usize,
        labels: usize,
    },

    #[error("cannot render to {0}: unsupported image extension")]
    UnsupportedImage(PathBuf),
}
