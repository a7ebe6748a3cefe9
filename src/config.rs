//! Analysis configuration.
//!
//! An [`AnalysisConfig`] is an immutable value describing one validation run.
//! It can be written as JSON; every field is optional and falls back to its
//! default:
//!
//! ```json
//! {
//!   "matching": {"delta_zmax": 0.05, "theta_max": 1.0, "theta_max_type": "physical"},
//!   "truth_selection": {"min_halo_mass": 1e14, "cluster_only": true},
//!   "cluster_selection": {"min_richness": 20, "extra": "redshift < 1.0"},
//!   "cosmology": {"kind": "preset", "name": "cosmodc2"},
//!   "cluster_meta": {"redshift_range": {"min": 0.2, "max": 1.0}},
//!   "counting_mode": "bijective"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::catalog::session::{ClusterSelection, TruthSelection};
use crate::core::columns::ColumnNames;
use crate::core::error::AssociationError;
use crate::cosmology::CosmologyChoice;
use crate::matching::engine::MatchParameters;
use crate::statistics::association::CountingMode;
use crate::statistics::footprint::CatalogMeta;
use crate::statistics::report::BinningConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] AssociationError),
}

/// Everything needed to run and report one validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub matching: MatchParameters,
    pub truth_selection: TruthSelection,
    pub cluster_selection: ClusterSelection,
    pub columns: ColumnNames,
    pub cosmology: CosmologyChoice,
    pub cluster_meta: CatalogMeta,
    pub truth_meta: CatalogMeta,
    pub counting_mode: CountingMode,
    pub binning: BinningConfig,
}

impl AnalysisConfig {
    /// Load and validate a JSON config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read,
    /// `ConfigError::Parse` for malformed JSON, or `ConfigError::Invalid` for
    /// out-of-range values.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "loaded analysis config");
        Ok(config)
    }

    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or
    /// `ConfigError::Invalid` for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every threshold and region
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::InvalidParameter` for the first bad value.
    pub fn validate(&self) -> Result<(), AssociationError> {
        self.matching.validate()?;
        if !self.truth_selection.min_halo_mass.is_finite() {
            return Err(AssociationError::invalid("min_halo_mass must be finite"));
        }
        if !self.cluster_selection.min_richness.is_finite() {
            return Err(AssociationError::invalid("min_richness must be finite"));
        }
        self.cluster_meta.validate()?;
        self.truth_meta.validate()
    }
}
