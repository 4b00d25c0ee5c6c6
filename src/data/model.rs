use std::fmt;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// NdValues – a dense row-major array as read from disk
// ---------------------------------------------------------------------------

/// A dense, row-major numeric array with its shape, before squeezing.
///
/// Every loader produces one of these so the squeeze rules live in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct NdValues {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl NdValues {
    /// A flat array of `values.len()` elements.
    pub fn flat(values: Vec<f64>) -> Self {
        NdValues {
            shape: vec![values.len()],
            values,
        }
    }

    /// Drop every axis of length 1 and return the remaining values.
    ///
    /// At most one axis may be longer than 1; a scalar (or an array whose
    /// axes are all length 1) becomes a single-element vector.
    pub fn squeeze(self) -> Result<Vec<f64>, LoadError> {
        let expected: usize = self.shape.iter().product();
        if expected != self.values.len() {
            return Err(LoadError::ShapeMismatch {
                shape: self.shape,
                len: self.values.len(),
            });
        }
        if self.values.is_empty() {
            return Err(LoadError::Empty);
        }
        let long_axes = self.shape.iter().filter(|&&d| d > 1).count();
        if long_axes > 1 {
            return Err(LoadError::NotOneDimensional(Shape(self.shape)));
        }
        Ok(self.values)
    }
}

// ---------------------------------------------------------------------------
// Shape – display helper for error messages
// ---------------------------------------------------------------------------

/// Array shape, printed the NumPy way: `(2, 11)`, `(5,)`, `()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(pub Vec<usize>);

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "()"),
            [d] => write!(f, "({d},)"),
            dims => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}
