use serde::{Deserialize, Serialize};

use crate::core::columns::ColumnNames;
use crate::core::error::AssociationError;
use crate::core::table::Table;
use crate::utils::validation::{check_non_negative, check_probability, check_sky_position};

/// A detected cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: i64,

    /// Right ascension of the centroid estimate, degrees
    pub ra: f64,

    /// Declination of the centroid estimate, degrees
    pub dec: f64,

    pub redshift: f64,

    /// Detection-catalog mass proxy
    pub richness: f64,
}

impl Cluster {
    pub fn new(id: i64, ra: f64, dec: f64, redshift: f64, richness: f64) -> Self {
        Self {
            id,
            ra,
            dec,
            redshift,
            richness,
        }
    }
}

/// Membership of a galaxy in a detected cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Weak reference to [`Cluster::id`]
    pub cluster_id: i64,

    /// Weak reference to a truth galaxy id
    pub galaxy_id: i64,

    /// Probability in [0, 1]
    pub probability: f64,
}

/// The detected cluster population; indices into `clusters` are the cluster
/// indices used by the match structures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterCatalog {
    pub clusters: Vec<Cluster>,
}

impl ClusterCatalog {
    #[must_use]
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self { clusters }
    }

    /// Read clusters from a columnar table
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if a column is missing, has the
    /// wrong kind, or holds an out-of-range value.
    pub fn from_table(table: &Table, names: &ColumnNames) -> Result<Self, AssociationError> {
        let ids = table.ints(&names.cluster_id)?;
        let ra = table.floats(&names.cluster_ra)?;
        let dec = table.floats(&names.cluster_dec)?;
        let redshift = table.floats(&names.cluster_redshift)?;
        let richness = table.floats(&names.richness)?;

        let mut clusters = Vec::with_capacity(table.num_rows());
        for row in 0..table.num_rows() {
            check_sky_position(&names.cluster_ra, &names.cluster_dec, row, ra[row], dec[row])?;
            check_non_negative(&names.cluster_redshift, row, redshift[row])?;
            check_non_negative(&names.richness, row, richness[row])?;
            clusters.push(Cluster::new(
                ids[row],
                ra[row],
                dec[row],
                redshift[row],
                richness[row],
            ));
        }
        Ok(Self { clusters })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }
}

/// Cluster membership rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberCatalog {
    pub members: Vec<ClusterMember>,
}

impl MemberCatalog {
    #[must_use]
    pub fn new(members: Vec<ClusterMember>) -> Self {
        Self { members }
    }

    /// Read members from a columnar table
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::Schema` if a column is missing, has the
    /// wrong kind, or a probability lies outside [0, 1].
    pub fn from_table(table: &Table, names: &ColumnNames) -> Result<Self, AssociationError> {
        let cluster_ids = table.ints(&names.member_cluster_id)?;
        let galaxy_ids = table.ints(&names.member_galaxy_id)?;
        let probability = table.floats(&names.member_probability)?;

        let mut members = Vec::with_capacity(table.num_rows());
        for row in 0..table.num_rows() {
            check_probability(&names.member_probability, row, probability[row])?;
            members.push(ClusterMember {
                cluster_id: cluster_ids[row],
                galaxy_id: galaxy_ids[row],
                probability: probability[row],
            });
        }
        Ok(Self { members })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterMember> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Column;

    #[test]
    fn test_clusters_from_table() {
        let table = Table::new()
            .with_column("cluster_id", Column::Int(vec![7, 8]))
            .unwrap()
            .with_column("ra_cen_0", Column::Float(vec![10.0, 11.0]))
            .unwrap()
            .with_column("dec_cen_0", Column::Float(vec![-5.0, -6.0]))
            .unwrap()
            .with_column("redshift", Column::Float(vec![0.3, 0.4]))
            .unwrap()
            .with_column("richness", Column::Float(vec![25.0, 40.5]))
            .unwrap();

        let clusters = ClusterCatalog::from_table(&table, &ColumnNames::default()).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.get(1).unwrap().id, 8);
        assert!((clusters.get(1).unwrap().richness - 40.5).abs() < 1e-12);
    }

    #[test]
    fn test_members_reject_bad_probability() {
        let table = Table::new()
            .with_column("cluster_id_member", Column::Int(vec![7, 7]))
            .unwrap()
            .with_column("id_member", Column::Int(vec![10, 11]))
            .unwrap()
            .with_column("p_member", Column::Float(vec![0.9, 1.5]))
            .unwrap();

        let result = MemberCatalog::from_table(&table, &ColumnNames::default());
        assert!(matches!(result, Err(AssociationError::Schema(_))));
    }

    #[test]
    fn test_empty_table_yields_empty_catalog() {
        let table = Table::new()
            .with_column("cluster_id", Column::Int(vec![]))
            .unwrap()
            .with_column("ra_cen_0", Column::Float(vec![]))
            .unwrap()
            .with_column("dec_cen_0", Column::Float(vec![]))
            .unwrap()
            .with_column("redshift", Column::Float(vec![]))
            .unwrap()
            .with_column("richness", Column::Float(vec![]))
            .unwrap();

        let clusters = ClusterCatalog::from_table(&table, &ColumnNames::default()).unwrap();
        assert!(clusters.is_empty());
    }
}
