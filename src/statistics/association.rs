use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::core::cluster::ClusterCatalog;
use crate::core::error::AssociationError;
use crate::core::halo::HaloCatalog;
use crate::matching::assignment::Assignment;
use crate::matching::candidates::CandidateTally;
use crate::statistics::footprint::CatalogMeta;

/// Safely convert usize to f64 for fraction calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// A count out of a total, with the ratio precomputed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fraction {
    pub count: usize,
    pub total: usize,
    pub value: f64,
}

impl Fraction {
    /// `count / total`
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::DivideByZero` naming `what` if `total` is zero.
    pub fn new(count: usize, total: usize, what: &str) -> Result<Self, AssociationError> {
        if total == 0 {
            return Err(AssociationError::DivideByZero(format!(
                "{what}: no objects to evaluate"
            )));
        }
        Ok(Self {
            count,
            total,
            value: count_to_f64(count) / count_to_f64(total),
        })
    }

    /// Like [`Fraction::new`], but an empty total is an absence rather than an error
    #[must_use]
    pub fn checked(count: usize, total: usize) -> Option<Self> {
        (total > 0).then(|| Self {
            count,
            total,
            value: count_to_f64(count) / count_to_f64(total),
        })
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({:.1}%)", self.count, self.total, self.value * 100.0)
    }
}

/// Which objects fragmentation and overmerging are counted over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Every object with at least one candidate
    #[default]
    Candidates,
    /// Only objects that ended up in the assignment
    #[serde(alias = "bij")]
    Bijective,
}

impl std::fmt::Display for CountingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Candidates => write!(f, "candidates"),
            Self::Bijective => write!(f, "bijective"),
        }
    }
}

impl FromStr for CountingMode {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "candidates" => Ok(Self::Candidates),
            "bijective" | "bij" => Ok(Self::Bijective),
            other => Err(AssociationError::invalid(format!(
                "unsupported counting mode '{other}' (expected 'candidates' or 'bijective')"
            ))),
        }
    }
}

/// Number of resolved halo/cluster pairs
#[must_use]
pub fn number_of_associations(assignment: &Assignment) -> usize {
    assignment.len()
}

/// Ambiguous objects out of the counted population of one side
fn ambiguity(
    tally: &CandidateTally,
    assigned: impl Iterator<Item = usize>,
    mode: CountingMode,
    what: &str,
) -> Result<Fraction, AssociationError> {
    let (count, total) = match mode {
        CountingMode::Candidates => (tally.num_ambiguous(), tally.num_matched()),
        CountingMode::Bijective => assigned.fold((0, 0), |(count, total), i| {
            (count + usize::from(tally.partners(i).len() > 1), total + 1)
        }),
    };
    Fraction::new(count, total, what)
}

/// Fraction of halos with more than one candidate cluster
///
/// # Errors
///
/// Returns `AssociationError::DivideByZero` if no halo is counted.
pub fn fragmentation(
    match_1w: &CandidateTally,
    assignment: &Assignment,
    mode: CountingMode,
) -> Result<Fraction, AssociationError> {
    ambiguity(
        match_1w,
        assignment.pairs().map(|p| p.halo_index),
        mode,
        "fragmentation",
    )
}

/// Fraction of clusters with more than one candidate halo
///
/// # Errors
///
/// Returns `AssociationError::DivideByZero` if no cluster is counted.
pub fn overmerging(
    match_2w: &CandidateTally,
    assignment: &Assignment,
    mode: CountingMode,
) -> Result<Fraction, AssociationError> {
    ambiguity(
        match_2w,
        assignment.pairs().map(|p| p.cluster_index),
        mode,
        "overmerging",
    )
}

/// Fraction of halos inside both catalogs' regions that are assigned a cluster
///
/// # Errors
///
/// Returns `AssociationError::DivideByZero` if no halo lies inside both regions.
pub fn completeness(
    halos: &HaloCatalog,
    assignment: &Assignment,
    cluster_meta: &CatalogMeta,
    truth_meta: &CatalogMeta,
) -> Result<Fraction, AssociationError> {
    let (count, total) = halos
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            cluster_meta.contains(h.ra, h.dec, h.redshift)
                && truth_meta.contains(h.ra, h.dec, h.redshift)
        })
        .fold((0, 0), |(count, total), (i, _)| {
            (count + usize::from(assignment.contains_halo(i)), total + 1)
        });
    debug!(eligible = total, assigned = count, "completeness");
    Fraction::new(count, total, "completeness")
}

/// Fraction of clusters inside both catalogs' regions that are assigned a halo
///
/// # Errors
///
/// Returns `AssociationError::DivideByZero` if no cluster lies inside both
/// regions.
pub fn purity(
    clusters: &ClusterCatalog,
    assignment: &Assignment,
    cluster_meta: &CatalogMeta,
    truth_meta: &CatalogMeta,
) -> Result<Fraction, AssociationError> {
    let (count, total) = clusters
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            cluster_meta.contains(c.ra, c.dec, c.redshift)
                && truth_meta.contains(c.ra, c.dec, c.redshift)
        })
        .fold((0, 0), |(count, total), (i, _)| {
            (count + usize::from(assignment.contains_cluster(i)), total + 1)
        });
    debug!(eligible = total, assigned = count, "purity");
    Fraction::new(count, total, "purity")
}
