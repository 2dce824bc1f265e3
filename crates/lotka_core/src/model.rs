use crate::traits::{PredatorPreyModel, VectorField2};
use nalgebra::{Matrix2, Vector2};

/// The classic Lotka-Volterra predator-prey system:
///
/// ```text
/// dx/dt =  a·x − b·x·y
/// dy/dt = −c·y + d·b·x·y
/// ```
///
/// with x the prey population and y the predator population.
#[derive(Debug, Clone, Copy)]
pub struct LotkaVolterra {
    /// Natural growth rate of the prey.
    pub a: f64,
    /// Predation rate.
    pub b: f64,
    /// Natural death rate of the predators.
    pub c: f64,
    /// Conversion efficiency of consumed prey into predators.
    pub d: f64,
}

impl LotkaVolterra {
    /// Coefficients are stored verbatim; no validation is performed.
    /// Degenerate values (e.g. a zero predation rate) surface later as
    /// numerical anomalies, not as construction errors.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }
}

impl VectorField2 for LotkaVolterra {
    fn vector_field(&self, x: &Vector2<f64>, _t: f64) -> Vector2<f64> {
        Vector2::new(
            self.a * x[0] - self.b * x[0] * x[1],
            -self.c * x[1] + self.d * self.b * x[0] * x[1],
        )
    }
}

impl PredatorPreyModel for LotkaVolterra {
    fn jacobian(&self, x: &Vector2<f64>, _t: f64) -> Matrix2<f64> {
        Matrix2::new(
            self.a - self.b * x[1],
            -self.b * x[0],
            self.b * self.d * x[1],
            -self.c + self.b * self.d * x[0],
        )
    }

    fn coexistence_equilibrium(&self) -> Vector2<f64> {
        Vector2::new(self.c / (self.d * self.b), self.a / self.b)
    }
}

/// Lotka-Volterra with logistic self-limitation of the prey: the prey
/// equation gains a −e·x² term, the predator equation is unchanged. With
/// `e = 0` this reduces exactly to [`LotkaVolterra`].
#[derive(Debug, Clone, Copy)]
pub struct SelfLimitedLotkaVolterra {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    /// Self-limitation coefficient of the prey.
    pub e: f64,
}

impl SelfLimitedLotkaVolterra {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64) -> Self {
        Self { a, b, c, d, e }
    }
}

impl VectorField2 for SelfLimitedLotkaVolterra {
    fn vector_field(&self, x: &Vector2<f64>, _t: f64) -> Vector2<f64> {
        Vector2::new(
            self.a * x[0] - self.b * x[0] * x[1] - self.e * x[0] * x[0],
            -self.c * x[1] + self.d * self.b * x[0] * x[1],
        )
    }
}

impl PredatorPreyModel for SelfLimitedLotkaVolterra {
    fn jacobian(&self, x: &Vector2<f64>, _t: f64) -> Matrix2<f64> {
        Matrix2::new(
            self.a - self.b * x[1] - 2.0 * self.e * x[0],
            -self.b * x[0],
            self.b * self.d * x[1],
            -self.c + self.b * self.d * x[0],
        )
    }

    fn coexistence_equilibrium(&self) -> Vector2<f64> {
        // From a − b·y − e·x = 0 with x = c/(d·b).
        Vector2::new(
            self.c / (self.d * self.b),
            (self.a * self.d * self.b - self.e * self.c) / (self.d * self.b * self.b),
        )
    }
}
