use serde::Serialize;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::cluster::{ClusterCatalog, MemberCatalog};
use crate::core::halo::{GalaxyCatalog, HaloCatalog};
use crate::core::types::ThetaMaxType;
use crate::matching::candidates::MatchCandidate;

/// Safely convert usize to f64 for score keys
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Record `id -> row` unless `id` was already seen; returns true for a repeat
fn is_repeat(rows: &mut HashMap<i64, usize>, id: i64, row: usize) -> bool {
    match rows.entry(id) {
        Entry::Occupied(_) => true,
        Entry::Vacant(slot) => {
            slot.insert(row);
            false
        }
    }
}

/// Quality of a candidate pair; higher is better.
///
/// Keys are compared in order, `primary` first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub primary: f64,
    pub secondary: f64,
    pub tertiary: f64,
}

impl PairScore {
    #[must_use]
    pub fn new(primary: f64) -> Self {
        Self {
            primary,
            secondary: 0.0,
            tertiary: 0.0,
        }
    }

    /// Total order on scores, `Greater` meaning `self` is the better pair
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then(self.secondary.total_cmp(&other.secondary))
            .then(self.tertiary.total_cmp(&other.tertiary))
    }
}

/// Ranks competing candidate pairs during bijective resolution
pub trait ScoringPolicy {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    fn score(&self, candidate: &MatchCandidate) -> PairScore;
}

/// Prefers the pair closest in redshift and on the sky
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityScore {
    pub delta_zmax: f64,
    pub theta_max: f64,
    pub theta_max_type: ThetaMaxType,
}

impl ProximityScore {
    #[must_use]
    pub fn new(delta_zmax: f64, theta_max: f64, theta_max_type: ThetaMaxType) -> Self {
        Self {
            delta_zmax,
            theta_max,
            theta_max_type,
        }
    }

    /// Separation and redshift offset, each normalized by its window, combined
    /// in quadrature. A zero-width window contributes nothing.
    #[must_use]
    pub fn distance(&self, candidate: &MatchCandidate) -> f64 {
        let separation = match self.theta_max_type {
            ThetaMaxType::Angular => candidate.separation_deg,
            ThetaMaxType::Physical => candidate.transverse_mpc.unwrap_or(0.0),
        };
        let normalized = |value: f64, window: f64| {
            if window > 0.0 {
                value / window
            } else {
                0.0
            }
        };
        normalized(candidate.delta_z, self.delta_zmax)
            .hypot(normalized(separation, self.theta_max))
    }
}

impl ScoringPolicy for ProximityScore {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn score(&self, candidate: &MatchCandidate) -> PairScore {
        PairScore::new(-self.distance(candidate))
    }
}

/// Shared membership between one halo and one cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SharedMembers {
    /// Sum of membership probabilities over the shared galaxies
    pub probability: f64,
    pub count: usize,
}

/// Prefers the pair sharing the most member galaxies, weighted by membership
/// probability, falling back to proximity
#[derive(Debug, Clone)]
pub struct MembershipOverlapScore {
    proximity: ProximityScore,
    shared: HashMap<(usize, usize), SharedMembers>,
}

impl MembershipOverlapScore {
    /// Tally shared members for every (halo index, cluster index) pair.
    ///
    /// Members whose galaxy or cluster is outside the supplied catalogs, or
    /// whose probability is below `min_probability`, are ignored.
    #[must_use]
    pub fn build(
        proximity: ProximityScore,
        halos: &HaloCatalog,
        clusters: &ClusterCatalog,
        galaxies: &GalaxyCatalog,
        members: &MemberCatalog,
        min_probability: f64,
    ) -> Self {
        // First occurrence wins for repeated ids
        let mut halo_index: HashMap<i64, usize> = HashMap::with_capacity(halos.len());
        for (i, halo) in halos.iter().enumerate() {
            if is_repeat(&mut halo_index, halo.id, i) {
                warn!(halo_id = halo.id, row = i, "duplicate halo id ignored");
            }
        }
        let mut cluster_index: HashMap<i64, usize> = HashMap::with_capacity(clusters.len());
        for (i, cluster) in clusters.iter().enumerate() {
            if is_repeat(&mut cluster_index, cluster.id, i) {
                warn!(cluster_id = cluster.id, row = i, "duplicate cluster id ignored");
            }
        }

        let mut host_halo: HashMap<i64, i64> = HashMap::with_capacity(galaxies.len());
        for galaxy in galaxies.iter() {
            host_halo.entry(galaxy.id).or_insert(galaxy.halo_id);
        }

        let mut shared: HashMap<(usize, usize), SharedMembers> = HashMap::new();
        let mut skipped = 0usize;
        for member in members.iter() {
            if member.probability < min_probability {
                skipped += 1;
                continue;
            }
            let pair = cluster_index.get(&member.cluster_id).and_then(|&c| {
                let halo_id = host_halo.get(&member.galaxy_id)?;
                halo_index.get(halo_id).map(|&h| (h, c))
            });
            if let Some(pair) = pair {
                let entry = shared.entry(pair).or_default();
                entry.probability += member.probability;
                entry.count += 1;
            }
        }

        debug!(
            pairs = shared.len(),
            below_threshold = skipped,
            "tallied shared cluster members"
        );

        Self { proximity, shared }
    }

    /// Shared members of a halo/cluster pair
    #[must_use]
    pub fn shared(&self, halo_index: usize, cluster_index: usize) -> SharedMembers {
        self.shared
            .get(&(halo_index, cluster_index))
            .copied()
            .unwrap_or_default()
    }
}

impl ScoringPolicy for MembershipOverlapScore {
    fn name(&self) -> &'static str {
        "membership"
    }

    fn score(&self, candidate: &MatchCandidate) -> PairScore {
        let shared = self.shared(candidate.halo_index, candidate.cluster_index);
        PairScore {
            primary: shared.probability,
            secondary: count_to_f64(shared.count),
            tertiary: -self.proximity.distance(candidate),
        }
    }
}
