//! The `lotka_core` crate models two-species predator-prey dynamics: the
//! classic Lotka-Volterra equations and a density-limited variant with
//! logistic self-limitation of the prey.
//!
//! Key components:
//! - **Traits**: `VectorField2` (planar vector field) and
//!   `PredatorPreyModel` (field + Jacobian + coexistence equilibrium).
//! - **Models**: `LotkaVolterra` and `SelfLimitedLotkaVolterra`, a closed
//!   set of variants behind the shared trait.
//! - **Solvers**: `Dopri5`, an adaptive Dormand-Prince 5(4) integrator that
//!   samples the solution on a caller-supplied time grid.
//! - **Analysis**: `Simulator`, which validates the equilibria, classifies
//!   local stability from the Jacobian's eigenvalues, and produces a
//!   trajectory from an initial condition.
pub mod analysis;
pub mod model;
pub mod solvers;
pub mod stability;
pub mod traits;
