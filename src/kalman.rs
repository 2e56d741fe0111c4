use nalgebra as na;

use crate::error::Error;
use crate::Float;

/// Per-track filter state: mean `[x, y, vx, vy]` and its covariance.
#[derive(Debug, Clone)]
pub struct KalmanState<F: Float> {
    pub mean: na::Vector4<F>,
    pub covariance: na::Matrix4<F>,
}

impl<F: Float> KalmanState<F> {
    #[inline(always)]
    pub fn position(&self) -> na::Point2<F> {
        na::Point2::new(self.mean[0], self.mean[1])
    }

    #[inline(always)]
    pub fn velocity(&self) -> na::Vector2<F> {
        na::Vector2::new(self.mean[2], self.mean[3])
    }
}

/// Constant-velocity filter with unit time step, observing the box center
/// only. One instance serves every track; the per-track part lives in
/// [`KalmanState`].
#[derive(Debug, Clone)]
pub struct KalmanFilter<F: Float> {
    transition: na::Matrix4<F>,
    observation: na::Matrix2x4<F>,
    process_noise: na::Matrix4<F>,
    measurement_noise: na::Matrix2<F>,
    initial_variance: F,
}

impl<F: Float> KalmanFilter<F> {
    pub fn new() -> Self {
        let dt = F::one();
        let o = F::zero();
        let l = F::one();

        let transition = na::Matrix4::new(
            l, o, dt, o, //
            o, l, o, dt, //
            o, o, l, o, //
            o, o, o, l,
        );

        let observation = na::Matrix2x4::new(
            l, o, o, o, //
            o, l, o, o,
        );

        Self {
            transition,
            observation,
            process_noise: na::Matrix4::identity() * F::from_f64(1e-2).unwrap(),
            measurement_noise: na::Matrix2::identity() * F::from_f64(5.0).unwrap(),
            initial_variance: F::from_f64(10.0).unwrap(),
        }
    }

    /// Fresh state from a first measured center: zero velocity, covariance
    /// loose enough for the first correction to dominate.
    pub fn initiate(&self, center: na::Point2<F>) -> KalmanState<F> {
        KalmanState {
            mean: na::Vector4::new(center.x, center.y, F::zero(), F::zero()),
            covariance: na::Matrix4::identity() * self.initial_variance,
        }
    }

    /// Time step: `x <- F x`, `P <- F P Ft + Q`.
    pub fn predict(&self, state: &mut KalmanState<F>) {
        state.mean = self.transition * state.mean;
        state.covariance = self.transition * state.covariance * self.transition.transpose()
            + self.process_noise;
    }

    /// Measurement correction with an observed center. A singular
    /// innovation covariance is an error, never a NaN in the state.
    pub fn update(
        &self,
        state: &mut KalmanState<F>,
        measurement: na::Point2<F>,
    ) -> Result<(), Error> {
        let z = na::Vector2::new(measurement.x, measurement.y);

        let innovation = z - self.observation * state.mean;
        let s = self.observation * state.covariance * self.observation.transpose()
            + self.measurement_noise;

        let s_inv = s
            .try_inverse()
            .ok_or(Error::Numerical("singular innovation covariance"))?;

        let gain = state.covariance * self.observation.transpose() * s_inv;

        state.mean += gain * innovation;
        state.covariance = (na::Matrix4::identity() - gain * self.observation) * state.covariance;

        Ok(())
    }
}

impl<F: Float> Default for KalmanFilter<F> {
    fn default() -> Self {
        Self::new()
    }
}
