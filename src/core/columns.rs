use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column names used to read each catalog table.
///
/// Defaults follow the cosmoDC2 truth catalog and the redMaPPer cluster
/// catalog quantity names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub galaxy_id: String,
    pub halo_id: String,
    pub galaxy_ra: String,
    pub galaxy_dec: String,
    pub galaxy_redshift: String,
    pub halo_mass: String,
    pub is_central: String,

    pub cluster_id: String,
    pub cluster_ra: String,
    pub cluster_dec: String,
    pub cluster_redshift: String,
    pub richness: String,

    pub member_cluster_id: String,
    pub member_galaxy_id: String,
    pub member_probability: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            galaxy_id: "galaxy_id".to_string(),
            halo_id: "halo_id".to_string(),
            galaxy_ra: "ra".to_string(),
            galaxy_dec: "dec".to_string(),
            galaxy_redshift: "redshift".to_string(),
            halo_mass: "halo_mass".to_string(),
            is_central: "is_central".to_string(),

            cluster_id: "cluster_id".to_string(),
            cluster_ra: "ra_cen_0".to_string(),
            cluster_dec: "dec_cen_0".to_string(),
            cluster_redshift: "redshift".to_string(),
            richness: "richness".to_string(),

            member_cluster_id: "cluster_id_member".to_string(),
            member_galaxy_id: "id_member".to_string(),
            member_probability: "p_member".to_string(),
        }
    }
}

impl ColumnNames {
    /// Quantities needed from the truth catalog
    #[must_use]
    pub fn truth_quantities(&self) -> BTreeSet<String> {
        [
            &self.galaxy_id,
            &self.halo_id,
            &self.galaxy_ra,
            &self.galaxy_dec,
            &self.galaxy_redshift,
            &self.halo_mass,
            &self.is_central,
        ]
        .into_iter()
        .cloned()
        .collect()
    }

    /// Quantities needed from the cluster catalog
    #[must_use]
    pub fn cluster_quantities(&self) -> BTreeSet<String> {
        [
            &self.cluster_id,
            &self.cluster_ra,
            &self.cluster_dec,
            &self.cluster_redshift,
            &self.richness,
        ]
        .into_iter()
        .cloned()
        .collect()
    }

    /// Quantities needed from the member catalog
    #[must_use]
    pub fn member_quantities(&self) -> BTreeSet<String> {
        [
            &self.member_cluster_id,
            &self.member_galaxy_id,
            &self.member_probability,
        ]
        .into_iter()
        .cloned()
        .collect()
    }
}
