use nalgebra::{Matrix2, Vector2};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Serializable complex scalar, mirrored out of `num_complex::Complex` so
/// reports do not leak the linear-algebra types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

/// Real parts smaller than this are treated as zero when deciding whether a
/// linearization is a center.
const CENTER_TOLERANCE: f64 = 1e-12;

/// Both (possibly complex-conjugate) eigenvalues of a real 2×2 matrix.
pub fn eigenvalues(matrix: &Matrix2<f64>) -> Vector2<Complex<f64>> {
    matrix.complex_eigenvalues()
}

/// Oscillation period of a center, `2π / |Im λ|`.
///
/// Returns `Some` only when both eigenvalues are purely imaginary (real
/// part zero, nonzero imaginary part), i.e. the linearization is a center.
/// Spirals, saddles and nodes fall through as `None`; no further
/// classification is attempted.
pub fn center_period(eigenvalues: &Vector2<Complex<f64>>) -> Option<f64> {
    let purely_imaginary = eigenvalues
        .iter()
        .all(|lambda| lambda.re.abs() <= CENTER_TOLERANCE && lambda.im != 0.0);
    if !purely_imaginary {
        return None;
    }
    Some(2.0 * std::f64::consts::PI / eigenvalues[0].im.abs())
}
