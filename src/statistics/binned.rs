use serde::{Deserialize, Serialize};

use crate::core::cluster::ClusterCatalog;
use crate::core::error::AssociationError;
use crate::core::halo::HaloCatalog;
use crate::matching::assignment::Assignment;
use crate::statistics::association::Fraction;

/// One bin of a binned statistic. `fraction` is `None` for an empty bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinnedFraction {
    pub lower: f64,
    pub upper: f64,
    pub fraction: Option<Fraction>,
}

/// `bins + 1` edges spaced evenly in log10 between `min` and `max`
///
/// # Errors
///
/// Returns `AssociationError::InvalidParameter` unless `0 < min < max` and
/// `bins >= 1`.
pub fn log_spaced_edges(min: f64, max: f64, bins: usize) -> Result<Vec<f64>, AssociationError> {
    if bins == 0 || !min.is_finite() || !max.is_finite() || min <= 0.0 || min >= max {
        return Err(AssociationError::invalid(format!(
            "log-spaced edges need 0 < min < max and at least one bin, got min={min}, max={max}, bins={bins}"
        )));
    }
    let (lo, hi) = (min.log10(), max.log10());
    #[allow(clippy::cast_precision_loss)]
    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..bins)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let exponent = lo + step * i as f64;
            10f64.powf(exponent)
        })
        .collect();
    edges.push(max);
    edges[0] = min;
    Ok(edges)
}

fn check_edges(edges: &[f64]) -> Result<(), AssociationError> {
    if edges.len() < 2 {
        return Err(AssociationError::invalid("bin edges need at least two values"));
    }
    if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AssociationError::invalid(
            "bin edges must be finite and strictly increasing",
        ));
    }
    Ok(())
}

/// Bin index of `value`: bins are half-open `[lo, hi)` except the last,
/// which includes its upper edge
fn bin_of(edges: &[f64], value: f64) -> Option<usize> {
    let last = edges.len() - 1;
    if value < edges[0] || value > edges[last] {
        return None;
    }
    let upper = edges.partition_point(|&e| e <= value);
    Some(upper.saturating_sub(1).min(last - 1))
}

fn binned(
    values: impl Iterator<Item = (f64, bool)>,
    edges: &[f64],
) -> Result<Vec<BinnedFraction>, AssociationError> {
    check_edges(edges)?;
    let mut counts = vec![(0usize, 0usize); edges.len() - 1];
    for (value, assigned) in values {
        if let Some(bin) = bin_of(edges, value) {
            counts[bin].0 += usize::from(assigned);
            counts[bin].1 += 1;
        }
    }
    Ok(edges
        .windows(2)
        .zip(counts)
        .map(|(w, (count, total))| BinnedFraction {
            lower: w[0],
            upper: w[1],
            fraction: Fraction::checked(count, total),
        })
        .collect())
}

/// Completeness in bins of halo mass
///
/// # Errors
///
/// Returns `AssociationError::InvalidParameter` for fewer than two edges or
/// edges that are not strictly increasing.
pub fn binned_completeness(
    halos: &HaloCatalog,
    assignment: &Assignment,
    mass_edges: &[f64],
) -> Result<Vec<BinnedFraction>, AssociationError> {
    binned(
        halos
            .iter()
            .enumerate()
            .map(|(i, h)| (h.mass, assignment.contains_halo(i))),
        mass_edges,
    )
}

/// Purity in bins of cluster richness
///
/// # Errors
///
/// Returns `AssociationError::InvalidParameter` for fewer than two edges or
/// edges that are not strictly increasing.
pub fn binned_purity(
    clusters: &ClusterCatalog,
    assignment: &Assignment,
    richness_edges: &[f64],
) -> Result<Vec<BinnedFraction>, AssociationError> {
    binned(
        clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.richness, assignment.contains_cluster(i))),
        richness_edges,
    )
}
