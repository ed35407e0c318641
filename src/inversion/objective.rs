//! Rotation-correlation objective for one analysis window.
//!
//! For a trial angle `theta` (degrees, wrapped into `[0, 360)`) the
//! horizontal pair is rotated as `north cos(theta) - east sin(theta)` and
//! correlated with the reference. The residual handed to the solver is
//!
//! ```text
//! (1 - r(theta)) + ((prior_r + 1) * (theta - prior_theta))^2
//! ```
//!
//! where the angle difference is the shortest one in degrees and the second
//! term is present only when a continuity prior from the previous window
//! exists. Both terms are non-negative, so minimizing the squared residual
//! minimizes the cost itself.

use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::storage::Owned;
use nalgebra::{Matrix1, Vector1, U1};

use crate::error::{Result, SeismicError};
use crate::math::stats::{angle_difference_degrees, pearson_correlation, wrap_degrees};

/// Converged state of the previous window, used to damp angle jumps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuityPrior {
    /// Previous angle in degrees.
    pub theta: f64,
    /// Previous Pearson correlation, in `[-1, 1]`.
    pub correlation: f64,
}

/// Scalar cost of a rotation angle over one window.
///
/// Also carries the solver's current angle, so it can be handed to
/// [`levenberg_marquardt::LevenbergMarquardt::minimize`] directly.
#[derive(Debug, Clone)]
pub struct CorrelationObjective<'a> {
    north: &'a [f64],
    east: &'a [f64],
    reference: &'a [f64],
    prior: Option<ContinuityPrior>,
    step: f64,
    theta: f64,
}

impl<'a> CorrelationObjective<'a> {
    /// Build the objective for one window, starting at 0 degrees.
    ///
    /// `solver_epsilon` sets the finite-difference step to a quarter of it.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::LengthMismatch`] if the channels differ in length.
    pub fn new(
        north: &'a [f64],
        east: &'a [f64],
        reference: &'a [f64],
        prior: Option<ContinuityPrior>,
        solver_epsilon: f64,
    ) -> Result<Self> {
        if north.len() != east.len() || north.len() != reference.len() {
            return Err(SeismicError::length_mismatch(
                north.len(),
                east.len(),
                reference.len(),
            ));
        }
        Ok(Self {
            north,
            east,
            reference,
            prior,
            step: 0.25 * solver_epsilon,
            theta: 0.0,
        })
    }

    /// Start the solver from `theta` degrees.
    #[must_use]
    pub const fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Current angle in degrees, as last set by the solver (not wrapped).
    #[must_use]
    pub const fn theta(&self) -> f64 {
        self.theta
    }

    /// Continuity prior, if any.
    #[must_use]
    pub const fn prior(&self) -> Option<ContinuityPrior> {
        self.prior
    }

    /// Horizontal pair rotated by `theta` degrees.
    #[must_use]
    pub fn rotate(&self, theta: f64) -> Vec<f64> {
        let (sin, cos) = wrap_degrees(theta).to_radians().sin_cos();
        self.north
            .iter()
            .zip(self.east.iter())
            .map(|(n, e)| n * cos - e * sin)
            .collect()
    }

    /// Pearson correlation of the rotated pair with the reference.
    #[must_use]
    pub fn correlation(&self, theta: f64) -> f64 {
        pearson_correlation(&self.rotate(theta), self.reference)
    }

    /// Cost at `theta` degrees.
    #[must_use]
    pub fn value(&self, theta: f64) -> f64 {
        let mismatch = 1.0 - self.correlation(theta);
        match self.prior {
            Some(prior) => {
                let jump = (prior.correlation + 1.0) * angle_difference_degrees(theta, prior.theta);
                mismatch + jump * jump
            }
            None => mismatch,
        }
    }

    /// Forward finite-difference derivative of [`value`](Self::value), per degree.
    #[must_use]
    pub fn gradient(&self, theta: f64, step: f64) -> f64 {
        (self.value(theta + step) - self.value(theta)) / step
    }
}

impl LeastSquaresProblem<f64, U1, U1> for CorrelationObjective<'_> {
    type ResidualStorage = Owned<f64, U1>;
    type JacobianStorage = Owned<f64, U1, U1>;
    type ParameterStorage = Owned<f64, U1>;

    fn set_params(&mut self, params: &Vector1<f64>) {
        self.theta = params[0];
    }

    fn params(&self) -> Vector1<f64> {
        Vector1::new(self.theta)
    }

    fn residuals(&self) -> Option<Vector1<f64>> {
        let value = self.value(self.theta);
        value.is_finite().then(|| Vector1::new(value))
    }

    fn jacobian(&self) -> Option<Matrix1<f64>> {
        let slope = self.gradient(self.theta, self.step);
        slope.is_finite().then(|| Matrix1::new(slope))
    }
}
