use crate::traits::VectorField2;
use nalgebra::Vector2;
use thiserror::Error;

/// Errors produced by the integrator. NaN/Inf propagation from a degenerate
/// problem is not detected specially; it manifests as repeated step
/// rejection and ends in [`SolverError::StepSizeUnderflow`].
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("time grid must contain at least one sample")]
    EmptyGrid,
    #[error("time grid must be strictly increasing (sample {index} is {value})")]
    NonincreasingGrid { index: usize, value: f64 },
    #[error("step size underflow at t = {t}")]
    StepSizeUnderflow { t: f64 },
    #[error("exceeded {max_steps} steps before reaching the end of the time grid")]
    MaxStepsExceeded { max_steps: usize },
}

/// Adaptive Dormand-Prince 5(4) integrator.
///
/// Steps with the embedded 5th/4th order pair, controls the local error
/// against `atol + rtol·max(|y|, |y_new|)` per component, and clamps steps
/// so the solution lands exactly on every requested output time. The
/// internal step sequence is an implementation detail; callers only see one
/// state per grid sample.
#[derive(Debug, Clone, Copy)]
pub struct Dopri5 {
    pub rtol: f64,
    pub atol: f64,
    /// Budget for internal steps (accepted and rejected) over the whole
    /// grid.
    pub max_steps: usize,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 100_000,
        }
    }
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
// Error estimator is order 4, so the controller exponent is -1/5.
const ERROR_EXPONENT: f64 = -0.2;

impl Dopri5 {
    /// Integrates `field` from `times[0]` with initial state `x0` and
    /// returns one state per grid sample. The first returned state is `x0`
    /// itself, untouched by the solver.
    pub fn solve(
        &self,
        field: &impl VectorField2,
        x0: Vector2<f64>,
        times: &[f64],
    ) -> Result<Vec<Vector2<f64>>, SolverError> {
        validate_grid(times)?;

        let mut states = Vec::with_capacity(times.len());
        states.push(x0);
        if times.len() == 1 {
            return Ok(states);
        }

        let t_end = times[times.len() - 1];
        let mut t = times[0];
        let mut y = x0;
        // FSAL: the last stage of an accepted step is the first stage of
        // the next one.
        let mut f_now = field.vector_field(&y, t);
        let mut dt = self
            .initial_step(field, t, &y, &f_now)
            .min(t_end - t);
        let mut steps = 0usize;

        for &target in &times[1..] {
            while t < target {
                if steps >= self.max_steps {
                    return Err(SolverError::MaxStepsExceeded {
                        max_steps: self.max_steps,
                    });
                }
                steps += 1;

                let clamped = dt >= target - t;
                let h = if clamped { target - t } else { dt };
                let (y_new, f_new, err) = rk_step(field, t, &y, &f_now, h);
                let norm = error_norm(&y, &y_new, &err, self.atol, self.rtol);

                if norm <= 1.0 {
                    t = if clamped { target } else { t + h };
                    y = y_new;
                    f_now = f_new;
                    if !clamped {
                        let factor = if norm == 0.0 {
                            MAX_FACTOR
                        } else {
                            (SAFETY * norm.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
                        };
                        dt *= factor;
                    }
                } else {
                    dt = h * (SAFETY * norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
                    if dt <= f64::EPSILON * t.abs().max(1.0) {
                        return Err(SolverError::StepSizeUnderflow { t });
                    }
                }
            }
            states.push(y);
        }

        Ok(states)
    }

    /// Initial step size guess following Hairer's hinit heuristic: take an
    /// explicit Euler probe, estimate the second derivative, and size the
    /// first step from it.
    fn initial_step(
        &self,
        field: &impl VectorField2,
        t0: f64,
        y0: &Vector2<f64>,
        f0: &Vector2<f64>,
    ) -> f64 {
        let scale = Vector2::new(
            self.atol + self.rtol * y0[0].abs(),
            self.atol + self.rtol * y0[1].abs(),
        );
        let dny = y0.component_div(&scale).norm();
        let dnf = f0.component_div(&scale).norm();

        let h0 = if dnf <= 1e-10 || dny <= 1e-10 {
            1e-6
        } else {
            0.01 * dny / dnf
        };

        let y1 = y0 + f0 * h0;
        let f1 = field.vector_field(&y1, t0 + h0);
        let der2 = (f1 - f0).component_div(&scale).norm() / h0;

        let der12 = der2.max(dnf);
        let h1 = if der12 <= 1e-15 {
            1e-6_f64.max(h0 * 1e-3)
        } else {
            (0.01 / der12).powf(0.2)
        };

        h1.min(100.0 * h0)
    }
}

fn validate_grid(times: &[f64]) -> Result<(), SolverError> {
    if times.is_empty() {
        return Err(SolverError::EmptyGrid);
    }
    for (index, window) in times.windows(2).enumerate() {
        if !(window[1] > window[0]) {
            return Err(SolverError::NonincreasingGrid {
                index: index + 1,
                value: window[1],
            });
        }
    }
    Ok(())
}

/// One Dormand-Prince step of size `h` from `(t, y)` with `k1` already
/// evaluated. Returns the 5th-order solution, the last stage (the next
/// step's `k1`), and the embedded error estimate.
fn rk_step(
    field: &impl VectorField2,
    t: f64,
    y: &Vector2<f64>,
    k1: &Vector2<f64>,
    h: f64,
) -> (Vector2<f64>, Vector2<f64>, Vector2<f64>) {
    // Dormand-Prince 5(4) tableau (Hairer, Norsett & Wanner, table II.5.2).
    let k2 = field.vector_field(&(y + k1 * (h / 5.0)), t + h / 5.0);
    let k3 = field.vector_field(
        &(y + (k1 * (3.0 / 40.0) + k2 * (9.0 / 40.0)) * h),
        t + 3.0 / 10.0 * h,
    );
    let k4 = field.vector_field(
        &(y + (k1 * (44.0 / 45.0) + k2 * (-56.0 / 15.0) + k3 * (32.0 / 9.0)) * h),
        t + 4.0 / 5.0 * h,
    );
    let k5 = field.vector_field(
        &(y + (k1 * (19372.0 / 6561.0)
            + k2 * (-25360.0 / 2187.0)
            + k3 * (64448.0 / 6561.0)
            + k4 * (-212.0 / 729.0))
            * h),
        t + 8.0 / 9.0 * h,
    );
    let k6 = field.vector_field(
        &(y + (k1 * (9017.0 / 3168.0)
            + k2 * (-355.0 / 33.0)
            + k3 * (46732.0 / 5247.0)
            + k4 * (49.0 / 176.0)
            + k5 * (-5103.0 / 18656.0))
            * h),
        t + h,
    );

    let y_new = y
        + (k1 * (35.0 / 384.0)
            + k3 * (500.0 / 1113.0)
            + k4 * (125.0 / 192.0)
            + k5 * (-2187.0 / 6784.0)
            + k6 * (11.0 / 84.0))
            * h;
    let k7 = field.vector_field(&y_new, t + h);

    let err = (k1 * (71.0 / 57600.0)
        + k3 * (-71.0 / 16695.0)
        + k4 * (71.0 / 1920.0)
        + k5 * (-17253.0 / 339200.0)
        + k6 * (22.0 / 525.0)
        + k7 * (-1.0 / 40.0))
        * h;

    (y_new, k7, err)
}

fn error_norm(
    y: &Vector2<f64>,
    y_new: &Vector2<f64>,
    err: &Vector2<f64>,
    atol: f64,
    rtol: f64,
) -> f64 {
    let mut acc = 0.0;
    for i in 0..2 {
        let scale = atol + rtol * y[i].abs().max(y_new[i].abs());
        let ratio = err[i] / scale;
        acc += ratio * ratio;
    }
    (acc / 2.0).sqrt()
}

/// `n` evenly spaced samples from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::{linspace, Dopri5, SolverError};
    use crate::traits::VectorField2;
    use nalgebra::Vector2;

    /// Uncoupled linear system with a closed-form solution, for accuracy
    /// checks.
    struct LinearField {
        rates: Vector2<f64>,
    }

    impl VectorField2 for LinearField {
        fn vector_field(&self, x: &Vector2<f64>, _t: f64) -> Vector2<f64> {
            Vector2::new(self.rates[0] * x[0], self.rates[1] * x[1])
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(
        result: Result<T, SolverError>,
        needle: &str,
    ) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn rejects_empty_grid() {
        let field = LinearField {
            rates: Vector2::new(1.0, 1.0),
        };
        assert_err_contains(
            Dopri5::default().solve(&field, Vector2::new(1.0, 1.0), &[]),
            "at least one sample",
        );
    }

    #[test]
    fn rejects_non_increasing_grid() {
        let field = LinearField {
            rates: Vector2::new(1.0, 1.0),
        };
        assert_err_contains(
            Dopri5::default().solve(&field, Vector2::new(1.0, 1.0), &[0.0, 1.0, 1.0]),
            "strictly increasing",
        );
    }

    #[test]
    fn single_sample_grid_returns_initial_state() {
        let field = LinearField {
            rates: Vector2::new(-1.0, 2.0),
        };
        let x0 = Vector2::new(3.0, 4.0);
        let states = Dopri5::default()
            .solve(&field, x0, &[0.5])
            .expect("solve should succeed");
        assert_eq!(states, vec![x0]);
    }

    #[test]
    fn matches_exponential_solution() {
        let field = LinearField {
            rates: Vector2::new(-1.0, 0.5),
        };
        let x0 = Vector2::new(2.0, 1.0);
        let times = linspace(0.0, 4.0, 41);
        let states = Dopri5::default()
            .solve(&field, x0, &times)
            .expect("solve should succeed");
        assert_eq!(states.len(), times.len());
        assert_eq!(states[0], x0);
        for (t, state) in times.iter().zip(&states) {
            let exact = Vector2::new(2.0 * (-t).exp(), (0.5 * t).exp());
            assert!(
                (state - exact).norm() < 1e-6,
                "t = {t}: got {state:?}, expected {exact:?}"
            );
        }
    }

    #[test]
    fn tight_step_budget_is_reported() {
        let field = LinearField {
            rates: Vector2::new(-1.0, 0.5),
        };
        let solver = Dopri5 {
            max_steps: 2,
            ..Dopri5::default()
        };
        assert_err_contains(
            solver.solve(&field, Vector2::new(2.0, 1.0), &linspace(0.0, 50.0, 3)),
            "exceeded 2 steps",
        );
    }

    #[test]
    fn linspace_hits_both_endpoints() {
        let grid = linspace(0.0, 15.0, 1000);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], 0.0);
        assert!((grid[999] - 15.0).abs() < 1e-12);
        let step = grid[1] - grid[0];
        assert!((step - 15.0 / 999.0).abs() < 1e-15);
    }

    #[test]
    fn linspace_degenerate_lengths() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    }
}
