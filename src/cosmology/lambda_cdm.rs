use serde::{Deserialize, Serialize};

use crate::cosmology::{Cosmology, CosmologyError, SPEED_OF_LIGHT_KM_S};

/// Minimum number of Simpson intervals for the comoving-distance integral
const MIN_INTERVALS: usize = 64;

/// Simpson intervals per unit redshift
const INTERVALS_PER_UNIT_Z: f64 = 256.0;

/// Lambda-CDM cosmology with matter, dark energy and curvature.
///
/// Radiation is neglected. Curvature is `1 - omega_m - omega_lambda`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaCdm {
    /// Hubble constant, km/s/Mpc
    pub h0: f64,

    /// Matter density parameter today
    pub omega_m: f64,

    /// Dark energy density parameter today
    pub omega_lambda: f64,
}

impl LambdaCdm {
    /// General Lambda-CDM.
    ///
    /// `omega_lambda` is restricted to [0, 1], which keeps `E(z)^2` positive for
    /// every redshift.
    ///
    /// # Errors
    ///
    /// Returns `CosmologyError::InvalidParameter` for a non-positive `h0`, a
    /// negative `omega_m`, or `omega_lambda` outside [0, 1].
    pub fn new(h0: f64, omega_m: f64, omega_lambda: f64) -> Result<Self, CosmologyError> {
        if !(h0.is_finite() && h0 > 0.0) {
            return Err(CosmologyError::InvalidParameter(format!(
                "h0 must be > 0, got {h0}"
            )));
        }
        if !(omega_m.is_finite() && omega_m >= 0.0) {
            return Err(CosmologyError::InvalidParameter(format!(
                "omega_m must be >= 0, got {omega_m}"
            )));
        }
        if !(0.0..=1.0).contains(&omega_lambda) {
            return Err(CosmologyError::InvalidParameter(format!(
                "omega_lambda must lie in [0, 1], got {omega_lambda}"
            )));
        }
        Ok(Self {
            h0,
            omega_m,
            omega_lambda,
        })
    }

    /// Spatially flat Lambda-CDM (`omega_lambda = 1 - omega_m`)
    ///
    /// # Errors
    ///
    /// Returns `CosmologyError::InvalidParameter` for a non-positive `h0` or
    /// `omega_m` outside [0, 1].
    pub fn flat(h0: f64, omega_m: f64) -> Result<Self, CosmologyError> {
        if !(0.0..=1.0).contains(&omega_m) {
            return Err(CosmologyError::InvalidParameter(format!(
                "flat cosmology needs omega_m in [0, 1], got {omega_m}"
            )));
        }
        Self::new(h0, omega_m, 1.0 - omega_m)
    }

    #[must_use]
    pub fn omega_k(&self) -> f64 {
        1.0 - self.omega_m - self.omega_lambda
    }

    /// Hubble distance c / H0, in Mpc
    #[must_use]
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / self.h0
    }

    /// Dimensionless Hubble parameter E(z) = H(z) / H0
    #[must_use]
    pub fn efunc(&self, redshift: f64) -> f64 {
        let a = 1.0 + redshift;
        (self.omega_m * a * a * a + self.omega_k() * a * a + self.omega_lambda).sqrt()
    }

    /// Line-of-sight comoving distance, in Mpc
    #[must_use]
    pub fn comoving_distance(&self, redshift: f64) -> f64 {
        if redshift <= 0.0 {
            return 0.0;
        }
        self.hubble_distance() * simpson(|z| 1.0 / self.efunc(z), redshift)
    }
}

impl Cosmology for LambdaCdm {
    fn comoving_transverse_distance(&self, redshift: f64) -> f64 {
        let d_c = self.comoving_distance(redshift);
        let omega_k = self.omega_k();
        if omega_k.abs() < 1e-12 {
            return d_c;
        }
        let d_h = self.hubble_distance();
        let sqrt_k = omega_k.abs().sqrt();
        if omega_k > 0.0 {
            d_h / sqrt_k * (sqrt_k * d_c / d_h).sinh()
        } else {
            d_h / sqrt_k * (sqrt_k * d_c / d_h).sin()
        }
    }
}

/// Composite Simpson integration of `f` over [0, upper]
fn simpson(f: impl Fn(f64) -> f64, upper: f64) -> f64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut intervals = ((upper * INTERVALS_PER_UNIT_Z).ceil() as usize).max(MIN_INTERVALS);
    if intervals % 2 == 1 {
        intervals += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let step = upper / intervals as f64;

    let mut sum = f(0.0) + f(upper);
    for i in 1..intervals {
        #[allow(clippy::cast_precision_loss)]
        let x = step * i as f64;
        sum += if i % 2 == 1 { 4.0 * f(x) } else { 2.0 * f(x) };
    }
    sum * step / 3.0
}
