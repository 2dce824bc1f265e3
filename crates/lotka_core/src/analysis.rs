use crate::{
    solvers::Dopri5,
    stability::{center_period, eigenvalues, ComplexNumber},
    traits::PredatorPreyModel,
};
use anyhow::{Context, Result};
use nalgebra::Vector2;
use serde::Serialize;

/// An integrated trajectory: one `[prey, predator]` state per time sample.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<[f64; 2]>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Prey column, for plotting collaborators.
    pub fn prey(&self) -> Vec<f64> {
        self.states.iter().map(|state| state[0]).collect()
    }

    /// Predator column, for plotting collaborators.
    pub fn predators(&self) -> Vec<f64> {
        self.states.iter().map(|state| state[1]).collect()
    }
}

/// Outcome of a successful analysis run. The eigenvalues and the center
/// period are diagnostics of the linearization at the coexistence
/// equilibrium; the trajectory is the payload.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Coexistence equilibrium the linearization was taken at.
    pub equilibrium: [f64; 2],
    /// Eigenvalues of the Jacobian there, possibly a conjugate pair.
    pub eigenvalues: [ComplexNumber; 2],
    /// `Some` when the equilibrium is a center (purely imaginary pair);
    /// spirals, saddles and nodes are not classified further.
    pub center_period: Option<f64>,
    pub trajectory: Trajectory,
}

/// Couples a predator-prey model with the ODE integrator and runs the
/// equilibrium/stability analysis ahead of integration.
pub struct Simulator<M> {
    model: M,
    solver: Dopri5,
}

impl<M: PredatorPreyModel> Simulator<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            solver: Dopri5::default(),
        }
    }

    pub fn with_solver(model: M, solver: Dopri5) -> Self {
        Self { model, solver }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Analyzes the model and integrates a trajectory from `initial_state`
    /// over `times`.
    ///
    /// Returns `Ok(None)` when the equilibrium validity check is
    /// inconclusive: the vector field is nonzero at *both* the origin and
    /// the algebraic coexistence equilibrium, so neither candidate is a
    /// genuine fixed point. The check is deliberately conservative (a
    /// candidate is rejected only when every component of the field there
    /// is nonzero, compared exactly); it is a sanity gate, not a stability
    /// certificate.
    ///
    /// Grid and integrator failures are errors; other numerical degeneracy
    /// (NaN from meaningless states, singular parameters) propagates as
    /// whatever the underlying arithmetic produces.
    pub fn analyze(
        &self,
        times: &[f64],
        initial_state: Vector2<f64>,
    ) -> Result<Option<SimulationReport>> {
        let origin = Vector2::zeros();
        let coexistence = self.model.coexistence_equilibrium();

        if self.clearly_not_fixed(&origin) && self.clearly_not_fixed(&coexistence) {
            return Ok(None);
        }

        let jacobian = self.model.jacobian(&coexistence, 0.0);
        let eigs = eigenvalues(&jacobian);
        let period = center_period(&eigs);

        let states = self
            .solver
            .solve(&self.model, initial_state, times)
            .context("Failed to integrate the trajectory.")?;

        Ok(Some(SimulationReport {
            equilibrium: [coexistence[0], coexistence[1]],
            eigenvalues: [eigs[0].into(), eigs[1].into()],
            center_period: period,
            trajectory: Trajectory {
                times: times.to_vec(),
                states: states.iter().map(|state| [state[0], state[1]]).collect(),
            },
        }))
    }

    /// True when every component of the field at `candidate` is nonzero,
    /// i.e. the point is demonstrably not an equilibrium. Exact comparison
    /// on purpose; NaN counts as nonzero.
    fn clearly_not_fixed(&self, candidate: &Vector2<f64>) -> bool {
        let rate = self.model.vector_field(candidate, 0.0);
        rate[0] != 0.0 && rate[1] != 0.0
    }
}
