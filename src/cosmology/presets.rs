use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cosmology::{CosmologyError, LambdaCdm};

/// Preset file version for compatibility checking
pub const PRESETS_VERSION: &str = "1.0.0";

/// Name of the preset used when nothing else is configured
pub const DEFAULT_PRESET: &str = "cosmodc2";

/// A named set of cosmological parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmologyPreset {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub h0: f64,

    pub omega_m: f64,

    /// Omitted for flat models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omega_lambda: Option<f64>,
}

impl CosmologyPreset {
    /// Build the cosmology described by this preset
    ///
    /// # Errors
    ///
    /// Returns `CosmologyError::InvalidParameter` for out-of-range parameters.
    pub fn build(&self) -> Result<LambdaCdm, CosmologyError> {
        match self.omega_lambda {
            Some(omega_lambda) => LambdaCdm::new(self.h0, self.omega_m, omega_lambda),
            None => LambdaCdm::flat(self.h0, self.omega_m),
        }
    }
}

/// Serializable preset file format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PresetData {
    version: String,
    cosmologies: Vec<CosmologyPreset>,
}

/// Load the presets embedded at compile time
///
/// # Errors
///
/// Returns `CosmologyError::Parse` if the embedded file is malformed.
pub fn load_embedded() -> Result<Vec<CosmologyPreset>, CosmologyError> {
    // Validated at compile time by build.rs
    const EMBEDDED_PRESETS: &str = include_str!("../../cosmologies/presets.json");
    from_json(EMBEDDED_PRESETS)
}

fn from_json(json: &str) -> Result<Vec<CosmologyPreset>, CosmologyError> {
    let data: PresetData = serde_json::from_str(json)?;

    // Version check (warn but don't fail)
    if data.version != PRESETS_VERSION {
        warn!(
            expected = PRESETS_VERSION,
            found = %data.version,
            "cosmology preset version mismatch"
        );
    }

    Ok(data.cosmologies)
}

/// Look up a preset by name, case-insensitively
///
/// # Errors
///
/// Returns `CosmologyError::UnknownPreset` if no preset has this name.
pub fn find_preset(name: &str) -> Result<CosmologyPreset, CosmologyError> {
    load_embedded()?
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CosmologyError::UnknownPreset(name.to_string()))
}

/// Which cosmology an analysis uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CosmologyChoice {
    Preset {
        name: String,
    },
    Custom {
        h0: f64,
        omega_m: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        omega_lambda: Option<f64>,
    },
}

impl Default for CosmologyChoice {
    fn default() -> Self {
        Self::Preset {
            name: DEFAULT_PRESET.to_string(),
        }
    }
}

impl CosmologyChoice {
    /// Build the chosen cosmology
    ///
    /// # Errors
    ///
    /// Returns `CosmologyError::UnknownPreset` for an unknown preset name or
    /// `CosmologyError::InvalidParameter` for out-of-range parameters.
    pub fn resolve(&self) -> Result<LambdaCdm, CosmologyError> {
        match self {
            Self::Preset { name } => find_preset(name)?.build(),
            Self::Custom {
                h0,
                omega_m,
                omega_lambda,
            } => CosmologyPreset {
                name: "custom".to_string(),
                description: String::new(),
                h0: *h0,
                omega_m: *omega_m,
                omega_lambda: *omega_lambda,
            }
            .build(),
        }
    }
}

impl std::fmt::Display for CosmologyChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preset { name } => write!(f, "{name}"),
            Self::Custom {
                h0,
                omega_m,
                omega_lambda: Some(omega_lambda),
            } => write!(f, "custom (H0={h0}, Om={omega_m}, OL={omega_lambda})"),
            Self::Custom {
                h0,
                omega_m,
                omega_lambda: None,
            } => write!(f, "custom flat (H0={h0}, Om={omega_m})"),
        }
    }
}
