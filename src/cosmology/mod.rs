//! Distance-redshift relations used by physical matching windows.
//!
//! The matching engine only depends on the [`Cosmology`] trait. This module
//! also ships [`LambdaCdm`], a Lambda-CDM model with optional curvature, and a
//! set of named parameter presets embedded at compile time.
//!
//! ## Example
//!
//! ```rust
//! use cluster_validation::cosmology::{Cosmology, LambdaCdm};
//!
//! let cosmo = LambdaCdm::flat(70.0, 0.3).unwrap();
//! let d_m = cosmo.comoving_transverse_distance(1.0);
//! assert!((d_m - 3303.8).abs() < 1.0);
//! ```

pub mod lambda_cdm;
pub mod presets;

use thiserror::Error;

pub use lambda_cdm::LambdaCdm;
pub use presets::{CosmologyChoice, CosmologyPreset};

/// Speed of light in km/s
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

#[derive(Error, Debug)]
pub enum CosmologyError {
    #[error("Invalid cosmology parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown cosmology preset '{0}'")]
    UnknownPreset(String),

    #[error("Failed to parse cosmology presets: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Distance-redshift relation consumed by the matching engine
pub trait Cosmology: std::fmt::Debug {
    /// Comoving transverse distance to `redshift`, in Mpc
    fn comoving_transverse_distance(&self, redshift: f64) -> f64;
}
