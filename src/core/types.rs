use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::AssociationError;

/// How the transverse window `theta_max` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThetaMaxType {
    /// Sky-projected angular separation, in degrees
    #[default]
    Angular,
    /// Comoving transverse distance at the halo redshift, in Mpc
    Physical,
}

impl ThetaMaxType {
    /// Unit of `theta_max` under this interpretation
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Angular => "deg",
            Self::Physical => "Mpc",
        }
    }
}

impl std::fmt::Display for ThetaMaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Angular => write!(f, "angular"),
            Self::Physical => write!(f, "physical"),
        }
    }
}

impl FromStr for ThetaMaxType {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "angular" => Ok(Self::Angular),
            "physical" => Ok(Self::Physical),
            other => Err(AssociationError::invalid(format!(
                "unsupported theta_max_type '{other}' (expected 'angular' or 'physical')"
            ))),
        }
    }
}

/// Candidate-scoring and bijective-resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Minimize the normalized redshift + transverse distance
    #[default]
    Proximity,
    /// Maximize the probability-weighted count of shared galaxies
    #[serde(alias = "membership-overlap", alias = "membership_overlap")]
    Membership,
}

impl MatchMethod {
    /// Whether the method needs galaxy and member tables
    #[must_use]
    pub fn needs_membership(&self) -> bool {
        matches!(self, Self::Membership)
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proximity => write!(f, "proximity"),
            Self::Membership => write!(f, "membership"),
        }
    }
}

impl FromStr for MatchMethod {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proximity" => Ok(Self::Proximity),
            "membership" | "membership-overlap" | "membership_overlap" => Ok(Self::Membership),
            other => Err(AssociationError::invalid(format!(
                "unsupported match method '{other}' (expected 'proximity' or 'membership')"
            ))),
        }
    }
}
