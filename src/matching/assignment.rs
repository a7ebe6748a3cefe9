use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::AssociationError;
use crate::matching::candidates::MatchCandidate;
use crate::matching::scoring::ScoringPolicy;
use crate::utils::validation::compute_signature;

/// One resolved halo/cluster pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignedPair {
    pub halo_index: usize,
    pub cluster_index: usize,
}

/// A one-to-one partial map between halo and cluster indices.
///
/// No halo and no cluster appears in more than one pair; `insert` refuses
/// anything that would break this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AssignedPair>", into = "Vec<AssignedPair>")]
pub struct Assignment {
    halo_to_cluster: BTreeMap<usize, usize>,
    cluster_to_halo: BTreeMap<usize, usize>,
}

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::InvalidParameter` if the halo or the cluster
    /// is already assigned.
    pub fn insert(&mut self, halo_index: usize, cluster_index: usize) -> Result<(), AssociationError> {
        if let Some(c) = self.halo_to_cluster.get(&halo_index) {
            return Err(AssociationError::invalid(format!(
                "halo {halo_index} is already assigned to cluster {c}"
            )));
        }
        if let Some(h) = self.cluster_to_halo.get(&cluster_index) {
            return Err(AssociationError::invalid(format!(
                "cluster {cluster_index} is already assigned to halo {h}"
            )));
        }
        self.halo_to_cluster.insert(halo_index, cluster_index);
        self.cluster_to_halo.insert(cluster_index, halo_index);
        Ok(())
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.halo_to_cluster.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.halo_to_cluster.is_empty()
    }

    #[must_use]
    pub fn cluster_for_halo(&self, halo_index: usize) -> Option<usize> {
        self.halo_to_cluster.get(&halo_index).copied()
    }

    #[must_use]
    pub fn halo_for_cluster(&self, cluster_index: usize) -> Option<usize> {
        self.cluster_to_halo.get(&cluster_index).copied()
    }

    #[must_use]
    pub fn contains_halo(&self, halo_index: usize) -> bool {
        self.halo_to_cluster.contains_key(&halo_index)
    }

    #[must_use]
    pub fn contains_cluster(&self, cluster_index: usize) -> bool {
        self.cluster_to_halo.contains_key(&cluster_index)
    }

    /// Pairs in ascending halo order
    pub fn pairs(&self) -> impl Iterator<Item = AssignedPair> + '_ {
        self.halo_to_cluster
            .iter()
            .map(|(&halo_index, &cluster_index)| AssignedPair {
                halo_index,
                cluster_index,
            })
    }

    /// MD5 over the sorted pair list; equal assignments have equal signatures
    #[must_use]
    pub fn signature(&self) -> String {
        compute_signature(self.halo_to_cluster.iter().map(|(&h, &c)| (h, c)))
    }
}

impl TryFrom<Vec<AssignedPair>> for Assignment {
    type Error = AssociationError;

    fn try_from(pairs: Vec<AssignedPair>) -> Result<Self, Self::Error> {
        let mut assignment = Self::new();
        for pair in pairs {
            assignment.insert(pair.halo_index, pair.cluster_index)?;
        }
        Ok(assignment)
    }
}

impl From<Assignment> for Vec<AssignedPair> {
    fn from(assignment: Assignment) -> Self {
        assignment.pairs().collect()
    }
}

/// Resolve many-to-many candidates into a one-to-one assignment.
///
/// Pairs are visited best score first (ties: lower halo index, then lower
/// cluster index) and accepted while both sides are still free.
#[must_use]
pub fn resolve(candidates: &[MatchCandidate], policy: &dyn ScoringPolicy) -> Assignment {
    let mut ranked: Vec<_> = candidates
        .iter()
        .map(|c| (policy.score(c), c.halo_index, c.cluster_index))
        .collect();
    ranked.sort_by(|a, b| {
        b.0.compare(&a.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut assignment = Assignment::new();
    for (_, halo_index, cluster_index) in ranked {
        if !assignment.contains_halo(halo_index) && !assignment.contains_cluster(cluster_index) {
            // Both sides checked free just above
            let _ = assignment.insert(halo_index, cluster_index);
        }
    }
    assignment
}
