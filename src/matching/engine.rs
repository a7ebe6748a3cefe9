use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::index::CandidateFinder;
use crate::core::cluster::{ClusterCatalog, MemberCatalog};
use crate::core::error::AssociationError;
use crate::core::halo::{GalaxyCatalog, HaloCatalog};
use crate::core::types::{MatchMethod, ThetaMaxType};
use crate::cosmology::Cosmology;
use crate::matching::assignment::{resolve, Assignment};
use crate::matching::candidates::{CandidateTally, MatchCandidate};
use crate::matching::scoring::{MembershipOverlapScore, ProximityScore, ScoringPolicy};
use crate::utils::validation::{check_probability_threshold, check_threshold};

/// Default maximum redshift difference
pub const DEFAULT_DELTA_ZMAX: f64 = 0.05;

/// Default transverse window (degrees for angular windows)
pub const DEFAULT_THETA_MAX: f64 = 0.1;

/// Window and method settings for one association run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParameters {
    /// Maximum |z_cluster - z_halo|
    pub delta_zmax: f64,

    /// Maximum transverse separation, in degrees or Mpc per `theta_max_type`
    pub theta_max: f64,

    pub theta_max_type: ThetaMaxType,

    pub method: MatchMethod,

    /// Members below this probability are ignored by the membership method
    pub min_member_probability: f64,
}

impl Default for MatchParameters {
    fn default() -> Self {
        Self {
            delta_zmax: DEFAULT_DELTA_ZMAX,
            theta_max: DEFAULT_THETA_MAX,
            theta_max_type: ThetaMaxType::default(),
            method: MatchMethod::default(),
            min_member_probability: 0.0,
        }
    }
}

impl MatchParameters {
    /// Check every threshold
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::InvalidParameter` for a negative or
    /// non-finite window, or a membership cut outside [0, 1].
    pub fn validate(&self) -> Result<(), AssociationError> {
        check_threshold("delta_zmax", self.delta_zmax)?;
        check_threshold("theta_max", self.theta_max)?;
        check_probability_threshold("min_member_probability", self.min_member_probability)
    }
}

/// Tables taking part in one association run.
///
/// `galaxies` and `members` are only read by the membership method.
#[derive(Clone, Copy)]
pub struct MatchInputs<'a> {
    pub halos: &'a HaloCatalog,
    pub clusters: &'a ClusterCatalog,
    pub cosmology: &'a dyn Cosmology,
    pub galaxies: Option<&'a GalaxyCatalog>,
    pub members: Option<&'a MemberCatalog>,
}

/// Everything an association run produces.
///
/// Serialized as
///
/// ```json
/// {
///   "method": "proximity",
///   "match_1w": [[0], [], [1, 2]],
///   "match_2w": [[0], [2], [2]],
///   "assignment": [{"halo_index": 0, "cluster_index": 0}],
///   "candidates": [{"halo_index": 0, "cluster_index": 0, "separation_deg": 0.001, "delta_z": 0.002}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub method: MatchMethod,

    /// Candidate clusters of each halo
    pub match_1w: CandidateTally,

    /// Candidate halos of each cluster
    pub match_2w: CandidateTally,

    pub assignment: Assignment,

    /// Every candidate pair, ordered by (halo index, cluster index)
    pub candidates: Vec<MatchCandidate>,
}

impl MatchOutcome {
    /// Split into `(match_1w, match_2w, assignment)`
    #[must_use]
    pub fn into_parts(self) -> (CandidateTally, CandidateTally, Assignment) {
        (self.match_1w, self.match_2w, self.assignment)
    }
}

/// Associates detected clusters with truth halos
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    params: MatchParameters,
}

impl MatchingEngine {
    #[must_use]
    pub fn new(params: MatchParameters) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &MatchParameters {
        &self.params
    }

    /// Find candidates, tally them both ways and resolve a one-to-one
    /// assignment.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::InvalidParameter` for bad thresholds or a
    /// membership run without galaxies and members, and
    /// `AssociationError::EmptyInput` if either catalog is empty.
    pub fn run(&self, inputs: &MatchInputs<'_>) -> Result<MatchOutcome, AssociationError> {
        let params = &self.params;
        params.validate()?;
        if inputs.halos.is_empty() {
            return Err(AssociationError::empty("halo"));
        }
        if inputs.clusters.is_empty() {
            return Err(AssociationError::empty("cluster"));
        }

        let proximity = ProximityScore::new(params.delta_zmax, params.theta_max, params.theta_max_type);
        let policy: Box<dyn ScoringPolicy> = match params.method {
            MatchMethod::Proximity => Box::new(proximity),
            MatchMethod::Membership => {
                let (Some(galaxies), Some(members)) = (inputs.galaxies, inputs.members) else {
                    return Err(AssociationError::invalid(
                        "the membership method needs both galaxy and member tables",
                    ));
                };
                Box::new(MembershipOverlapScore::build(
                    proximity,
                    inputs.halos,
                    inputs.clusters,
                    galaxies,
                    members,
                    params.min_member_probability,
                ))
            }
        };

        let finder = CandidateFinder::new(inputs.halos, inputs.clusters, inputs.cosmology);
        let candidates = finder.find_all(params.delta_zmax, params.theta_max, params.theta_max_type);
        debug!(
            candidates = candidates.len(),
            delta_zmax = params.delta_zmax,
            theta_max = params.theta_max,
            unit = params.theta_max_type.unit(),
            "candidate search finished"
        );

        let match_1w = CandidateTally::from_pairs(
            inputs.halos.len(),
            candidates.iter().map(|c| (c.halo_index, c.cluster_index)),
        );
        let match_2w = CandidateTally::from_pairs(
            inputs.clusters.len(),
            candidates.iter().map(|c| (c.cluster_index, c.halo_index)),
        );

        let assignment = resolve(&candidates, policy.as_ref());
        info!(
            halos = inputs.halos.len(),
            clusters = inputs.clusters.len(),
            candidates = candidates.len(),
            assigned = assignment.len(),
            policy = policy.name(),
            "association complete"
        );

        Ok(MatchOutcome {
            method: params.method,
            match_1w,
            match_2w,
            assignment,
            candidates,
        })
    }
}

/// Run one association with explicit arguments
///
/// # Errors
///
/// See [`MatchingEngine::run`].
#[allow(clippy::too_many_arguments)]
pub fn match_catalogs(
    halos: &HaloCatalog,
    clusters: &ClusterCatalog,
    delta_zmax: f64,
    theta_max: f64,
    theta_max_type: ThetaMaxType,
    method: MatchMethod,
    cosmology: &dyn Cosmology,
    galaxies: Option<&GalaxyCatalog>,
    members: Option<&MemberCatalog>,
) -> Result<(CandidateTally, CandidateTally, Assignment), AssociationError> {
    let params = MatchParameters {
        delta_zmax,
        theta_max,
        theta_max_type,
        method,
        ..MatchParameters::default()
    };
    let inputs = MatchInputs {
        halos,
        clusters,
        cosmology,
        galaxies,
        members,
    };
    Ok(MatchingEngine::new(params).run(&inputs)?.into_parts())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::{Cluster, ClusterMember};
    use crate::core::halo::{Galaxy, Halo};
    use crate::cosmology::LambdaCdm;

    fn cosmo() -> LambdaCdm {
        LambdaCdm::flat(70.0, 0.3).unwrap()
    }

    fn inputs<'a>(
        halos: &'a HaloCatalog,
        clusters: &'a ClusterCatalog,
        cosmology: &'a LambdaCdm,
    ) -> MatchInputs<'a> {
        MatchInputs {
            halos,
            clusters,
            cosmology,
            galaxies: None,
            members: None,
        }
    }

    #[test]
    fn test_parameter_validation_comes_first() {
        let halos = HaloCatalog::default();
        let clusters = ClusterCatalog::default();
        let cosmology = cosmo();
        let engine = MatchingEngine::new(MatchParameters {
            delta_zmax: -0.1,
            ..MatchParameters::default()
        });
        assert!(matches!(
            engine.run(&inputs(&halos, &clusters, &cosmology)),
            Err(AssociationError::InvalidParameter(_))
        ));

        let engine = MatchingEngine::new(MatchParameters {
            theta_max: f64::NAN,
            ..MatchParameters::default()
        });
        assert!(matches!(
            engine.run(&inputs(&halos, &clusters, &cosmology)),
            Err(AssociationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_inputs() {
        let halos = HaloCatalog::new(vec![Halo::new(1, 0.0, 0.0, 0.3, 1e14)]);
        let empty_halos = HaloCatalog::default();
        let clusters = ClusterCatalog::new(vec![Cluster::new(1, 0.0, 0.0, 0.3, 30.0)]);
        let empty_clusters = ClusterCatalog::default();
        let cosmology = cosmo();
        let engine = MatchingEngine::default();

        assert!(matches!(
            engine.run(&inputs(&empty_halos, &clusters, &cosmology)),
            Err(AssociationError::EmptyInput(t)) if t == "halo"
        ));
        assert!(matches!(
            engine.run(&inputs(&halos, &empty_clusters, &cosmology)),
            Err(AssociationError::EmptyInput(t)) if t == "cluster"
        ));
    }

    #[test]
    fn test_membership_requires_tables() {
        let halos = HaloCatalog::new(vec![Halo::new(1, 0.0, 0.0, 0.3, 1e14)]);
        let clusters = ClusterCatalog::new(vec![Cluster::new(1, 0.0, 0.0, 0.3, 30.0)]);
        let cosmology = cosmo();
        let engine = MatchingEngine::new(MatchParameters {
            method: MatchMethod::Membership,
            ..MatchParameters::default()
        });
        assert!(matches!(
            engine.run(&inputs(&halos, &clusters, &cosmology)),
            Err(AssociationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_tallies_and_assignment() {
        // Two halos near one cluster, plus an isolated pair
        let halos = HaloCatalog::new(vec![
            Halo::new(1, 10.0, 0.0, 0.30, 1e14),
            Halo::new(2, 10.02, 0.0, 0.31, 1e14),
            Halo::new(3, 50.0, 0.0, 0.50, 1e14),
        ]);
        let clusters = ClusterCatalog::new(vec![
            Cluster::new(1, 10.01, 0.0, 0.30, 30.0),
            Cluster::new(2, 50.0, 0.01, 0.51, 30.0),
        ]);
        let cosmology = cosmo();
        let outcome = MatchingEngine::default()
            .run(&inputs(&halos, &clusters, &cosmology))
            .unwrap();

        assert_eq!(outcome.match_1w.partners(0), &[0]);
        assert_eq!(outcome.match_1w.partners(1), &[0]);
        assert_eq!(outcome.match_1w.partners(2), &[1]);
        assert_eq!(outcome.match_2w.partners(0), &[0, 1]);
        assert_eq!(outcome.candidates.len(), 3);

        assert_eq!(outcome.assignment.len(), 2);
        assert_eq!(outcome.assignment.halo_for_cluster(0), Some(0));
        assert_eq!(outcome.assignment.halo_for_cluster(1), Some(2));
    }

    #[test]
    fn test_membership_overrides_proximity() {
        let halos = HaloCatalog::new(vec![
            Halo::new(10, 10.0, 0.0, 0.30, 1e14),
            Halo::new(20, 10.05, 0.0, 0.30, 1e14),
        ]);
        let clusters = ClusterCatalog::new(vec![Cluster::new(7, 10.0, 0.0, 0.30, 30.0)]);
        let galaxies = GalaxyCatalog::new(
            [(100, 10), (200, 20), (201, 20)]
                .into_iter()
                .map(|(id, halo_id)| Galaxy {
                    id,
                    halo_id,
                    ra: 10.0,
                    dec: 0.0,
                    redshift: 0.3,
                    halo_mass: 1e14,
                    is_central: false,
                })
                .collect(),
        );
        let members = MemberCatalog::new(
            [100, 200, 201]
                .into_iter()
                .map(|galaxy_id| ClusterMember {
                    cluster_id: 7,
                    galaxy_id,
                    probability: 0.8,
                })
                .collect(),
        );
        let cosmology = cosmo();

        let (_, _, by_distance) = match_catalogs(
            &halos,
            &clusters,
            0.05,
            0.1,
            ThetaMaxType::Angular,
            MatchMethod::Proximity,
            &cosmology,
            None,
            None,
        )
        .unwrap();
        assert_eq!(by_distance.halo_for_cluster(0), Some(0));

        let (_, _, by_members) = match_catalogs(
            &halos,
            &clusters,
            0.05,
            0.1,
            ThetaMaxType::Angular,
            MatchMethod::Membership,
            &cosmology,
            Some(&galaxies),
            Some(&members),
        )
        .unwrap();
        assert_eq!(by_members.halo_for_cluster(0), Some(1));
    }

    #[test]
    fn test_outcome_serializes() {
        let halos = HaloCatalog::new(vec![Halo::new(1, 10.0, 10.0, 0.30, 1e14)]);
        let clusters = ClusterCatalog::new(vec![Cluster::new(1, 10.001, 10.001, 0.302, 30.0)]);
        let cosmology = cosmo();
        let outcome = MatchingEngine::default()
            .run(&inputs(&halos, &clusters, &cosmology))
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["method"], "proximity");
        assert_eq!(json["match_1w"], serde_json::json!([[0]]));
        assert_eq!(json["assignment"][0]["cluster_index"], 0);
    }
}
