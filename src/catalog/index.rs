use crate::core::cluster::ClusterCatalog;
use crate::core::halo::HaloCatalog;
use crate::core::types::ThetaMaxType;
use crate::cosmology::Cosmology;
use crate::matching::candidates::MatchCandidate;
use crate::matching::geometry::{angular_separation_deg, transverse_distance_mpc};

/// Slack added to the binary-searched redshift window so that rounding in
/// `z +/- delta_zmax` never drops a pair the exact test would accept
const WINDOW_SLACK: f64 = 1e-9;

/// Cluster indices sorted by redshift
#[derive(Debug, Clone)]
pub struct RedshiftIndex {
    /// (redshift, cluster index), ascending by redshift then index
    entries: Vec<(f64, usize)>,
}

impl RedshiftIndex {
    #[must_use]
    pub fn new(clusters: &ClusterCatalog) -> Self {
        let mut entries: Vec<(f64, usize)> = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.redshift, i))
            .collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        Self { entries }
    }

    /// Cluster indices with redshift in `[lo, hi]`, in redshift order
    pub fn window(&self, lo: f64, hi: f64) -> impl Iterator<Item = usize> + '_ {
        let start = self.entries.partition_point(|(z, _)| *z < lo);
        let end = self.entries.partition_point(|(z, _)| *z <= hi);
        self.entries[start..end.max(start)].iter().map(|&(_, i)| i)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Finds every halo/cluster pair inside the redshift and separation windows
pub struct CandidateFinder<'a> {
    halos: &'a HaloCatalog,
    clusters: &'a ClusterCatalog,
    index: RedshiftIndex,
    cosmology: &'a dyn Cosmology,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(
        halos: &'a HaloCatalog,
        clusters: &'a ClusterCatalog,
        cosmology: &'a dyn Cosmology,
    ) -> Self {
        Self {
            halos,
            clusters,
            index: RedshiftIndex::new(clusters),
            cosmology,
        }
    }

    /// Candidates of a single halo, ordered by cluster index.
    ///
    /// Both window bounds are inclusive.
    #[must_use]
    pub fn candidates_for_halo(
        &self,
        halo_index: usize,
        delta_zmax: f64,
        theta_max: f64,
        theta_max_type: ThetaMaxType,
    ) -> Vec<MatchCandidate> {
        let Some(halo) = self.halos.get(halo_index) else {
            return Vec::new();
        };

        let lo = halo.redshift - delta_zmax - WINDOW_SLACK;
        let hi = halo.redshift + delta_zmax + WINDOW_SLACK;

        // D_M only depends on the halo, so compute it once
        let distance_scale = match theta_max_type {
            ThetaMaxType::Angular => None,
            ThetaMaxType::Physical => {
                Some(self.cosmology.comoving_transverse_distance(halo.redshift))
            }
        };

        let mut found: Vec<MatchCandidate> = self
            .index
            .window(lo, hi)
            .filter_map(|cluster_index| {
                let cluster = self.clusters.get(cluster_index)?;
                let delta_z = (cluster.redshift - halo.redshift).abs();
                if delta_z > delta_zmax {
                    return None;
                }
                let separation_deg =
                    angular_separation_deg(halo.ra, halo.dec, cluster.ra, cluster.dec);
                let transverse_mpc =
                    distance_scale.map(|d_m| transverse_distance_mpc(d_m, separation_deg));
                let within = match transverse_mpc {
                    Some(distance) => distance <= theta_max,
                    None => separation_deg <= theta_max,
                };
                within.then_some(MatchCandidate {
                    halo_index,
                    cluster_index,
                    separation_deg,
                    transverse_mpc,
                    delta_z,
                })
            })
            .collect();

        found.sort_by_key(|c| c.cluster_index);
        found
    }

    /// Candidates of every halo, ordered by (halo index, cluster index)
    #[must_use]
    pub fn find_all(
        &self,
        delta_zmax: f64,
        theta_max: f64,
        theta_max_type: ThetaMaxType,
    ) -> Vec<MatchCandidate> {
        (0..self.halos.len())
            .flat_map(|h| self.candidates_for_halo(h, delta_zmax, theta_max, theta_max_type))
            .collect()
    }
}
