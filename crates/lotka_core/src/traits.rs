use nalgebra::{Matrix2, Vector2};

/// A planar vector field f(x, t).
///
/// Every system in this crate is autonomous, so implementations ignore `t`.
/// The parameter is kept anyway so the trait matches the calling convention
/// the ODE integrator expects from a right-hand side.
pub trait VectorField2 {
    /// Evaluates the instantaneous rate of change at state `x` and time `t`.
    fn vector_field(&self, x: &Vector2<f64>, t: f64) -> Vector2<f64>;
}

/// A predator-prey model: the vector field together with its linearization
/// and the closed-form coexistence fixed point.
///
/// State convention: `x[0]` is the prey population, `x[1]` the predator
/// population. Populations are real-valued approximations; nothing forbids
/// an integrator from producing negative values, they are just biologically
/// meaningless.
pub trait PredatorPreyModel: VectorField2 {
    /// The Jacobian of the vector field evaluated at `x`.
    fn jacobian(&self, x: &Vector2<f64>, t: f64) -> Matrix2<f64>;

    /// The non-trivial (coexistence) equilibrium derived algebraically from
    /// the model parameters. Degenerate parameters (zero predation rate or
    /// conversion efficiency) yield infinities/NaNs here rather than an
    /// error.
    fn coexistence_equilibrium(&self) -> Vector2<f64>;
}
