use nalgebra as na;

use crate::error::Error;

pub type Measurement = na::SVector<f32, 4>;

type State = na::SVector<f32, 7>;
type StateCov = na::SMatrix<f32, 7, 7>;
type Observation = na::SMatrix<f32, 4, 7>;
type ObservationCov = na::SMatrix<f32, 4, 4>;

/// Recursive estimator over the box motion state
/// [cx, cy, scale, aspect_ratio, vcx, vcy, vscale] with a constant-velocity
/// transition; observes [cx, cy, scale, aspect_ratio].
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    pub x: State,
    p: StateCov,
    f: StateCov,
    h: Observation,
    r: ObservationCov,
    q: StateCov,
}

impl KalmanFilter {
    pub fn new(z: Measurement) -> Self {
        let x = State::from_column_slice(&[z[0], z[1], z[2], z[3], 0.0, 0.0, 0.0]);

        let mut f = StateCov::identity();
        f[(0, 4)] = 1.0;
        f[(1, 5)] = 1.0;
        f[(2, 6)] = 1.0;

        let mut h = Observation::zeros();
        h[(0, 0)] = 1.0;
        h[(1, 1)] = 1.0;
        h[(2, 2)] = 1.0;
        h[(3, 3)] = 1.0;

        // unobserved velocities start out with high uncertainty
        let p = StateCov::from_diagonal(&State::from_column_slice(&[
            10.0, 10.0, 10.0, 10.0, 10000.0, 10000.0, 10000.0,
        ]));
        let r = ObservationCov::from_diagonal(&Measurement::from_column_slice(&[
            1.0, 1.0, 10.0, 10.0,
        ]));
        let q = StateCov::from_diagonal(&State::from_column_slice(&[
            1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001,
        ]));

        Self { x, p, f, h, r, q }
    }

    pub fn predict(&mut self) {
        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    pub fn update(&mut self, z: Measurement) -> Result<(), Error> {
        let y = z - self.h * self.x;
        let s = self.h * self.p * self.h.transpose() + self.r;
        let s_inv = s.try_inverse().ok_or(Error::SingularCovariance)?;
        let k = self.p * self.h.transpose() * s_inv;

        self.x += k * y;
        self.p = (StateCov::identity() - k * self.h) * self.p;

        Ok(())
    }

    #[inline]
    pub fn measurement(&self) -> Measurement {
        self.h * self.x
    }
}
