use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::cluster::ClusterCatalog;
use crate::core::error::AssociationError;
use crate::core::halo::HaloCatalog;
use crate::core::types::MatchMethod;
use crate::matching::engine::MatchOutcome;
use crate::statistics::association::{
    completeness, fragmentation, number_of_associations, overmerging, purity, CountingMode,
    Fraction,
};
use crate::statistics::binned::{binned_completeness, binned_purity, BinnedFraction};
use crate::statistics::footprint::CatalogMeta;

/// Bin edges for the binned statistics; an empty list disables that statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    pub mass_edges: Vec<f64>,
    pub richness_edges: Vec<f64>,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            mass_edges: vec![1e14, 2e14, 5e14, 1e15, 1e16],
            richness_edges: vec![20.0, 30.0, 50.0, 100.0, 1000.0],
        }
    }
}

/// Selection regions and counting options for a report
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub cluster_meta: &'a CatalogMeta,
    pub truth_meta: &'a CatalogMeta,
    pub counting_mode: CountingMode,
    pub binning: &'a BinningConfig,
}

/// Every recovery metric for one association run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub method: MatchMethod,
    pub num_halos: usize,
    pub num_clusters: usize,
    pub num_candidates: usize,
    pub associations: usize,
    pub counting_mode: CountingMode,

    /// `None` when the statistic has an empty denominator; see `undefined`
    pub fragmentation: Option<Fraction>,
    pub overmerging: Option<Fraction>,
    pub completeness: Option<Fraction>,
    pub purity: Option<Fraction>,

    /// Why each missing statistic could not be computed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undefined: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completeness_by_mass: Vec<BinnedFraction>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purity_by_richness: Vec<BinnedFraction>,

    /// MD5 of the sorted assignment pairs
    pub signature: String,
}

impl ValidationReport {
    /// Compute all statistics for an outcome
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::InvalidParameter` for invalid bin edges or
    /// catalog regions. A statistic with nothing to count is left as `None`
    /// and its reason recorded in `undefined`.
    pub fn build(
        halos: &HaloCatalog,
        clusters: &ClusterCatalog,
        outcome: &MatchOutcome,
        context: &ReportContext<'_>,
    ) -> Result<Self, AssociationError> {
        context.cluster_meta.validate()?;
        context.truth_meta.validate()?;

        let assignment = &outcome.assignment;
        let mode = context.counting_mode;

        let completeness_by_mass = if context.binning.mass_edges.is_empty() {
            Vec::new()
        } else {
            binned_completeness(halos, assignment, &context.binning.mass_edges)?
        };
        let purity_by_richness = if context.binning.richness_edges.is_empty() {
            Vec::new()
        } else {
            binned_purity(clusters, assignment, &context.binning.richness_edges)?
        };

        let mut undefined = Vec::new();
        let fragmentation = defined(
            fragmentation(&outcome.match_1w, assignment, mode),
            &mut undefined,
        )?;
        let overmerging = defined(
            overmerging(&outcome.match_2w, assignment, mode),
            &mut undefined,
        )?;
        let completeness = defined(
            completeness(halos, assignment, context.cluster_meta, context.truth_meta),
            &mut undefined,
        )?;
        let purity = defined(
            purity(clusters, assignment, context.cluster_meta, context.truth_meta),
            &mut undefined,
        )?;

        let report = Self {
            method: outcome.method,
            num_halos: halos.len(),
            num_clusters: clusters.len(),
            num_candidates: outcome.candidates.len(),
            associations: number_of_associations(assignment),
            counting_mode: mode,
            fragmentation,
            overmerging,
            completeness,
            purity,
            undefined,
            completeness_by_mass,
            purity_by_richness,
            signature: assignment.signature(),
        };

        info!(
            associations = report.associations,
            completeness = report.completeness.map(|f| f.value),
            purity = report.purity.map(|f| f.value),
            "validation report ready"
        );
        Ok(report)
    }
}

/// Keep a statistic, or record why its denominator was empty
fn defined(
    result: Result<Fraction, AssociationError>,
    undefined: &mut Vec<String>,
) -> Result<Option<Fraction>, AssociationError> {
    match result {
        Ok(fraction) => Ok(Some(fraction)),
        Err(AssociationError::DivideByZero(reason)) => {
            debug!(%reason, "statistic undefined");
            undefined.push(reason);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::Cluster;
    use crate::core::halo::Halo;
    use crate::cosmology::LambdaCdm;
    use crate::matching::engine::{MatchInputs, MatchParameters, MatchingEngine};

    fn report_for(
        halos: &HaloCatalog,
        clusters: &ClusterCatalog,
        params: MatchParameters,
    ) -> (MatchOutcome, ValidationReport) {
        let cosmology = LambdaCdm::flat(70.0, 0.3).unwrap();
        let outcome = MatchingEngine::new(params)
            .run(&MatchInputs {
                halos,
                clusters,
                cosmology: &cosmology,
                galaxies: None,
                members: None,
            })
            .unwrap();

        let unbounded = CatalogMeta::unbounded();
        let binning = BinningConfig::default();
        let report = ValidationReport::build(
            halos,
            clusters,
            &outcome,
            &ReportContext {
                cluster_meta: &unbounded,
                truth_meta: &unbounded,
                counting_mode: CountingMode::Candidates,
                binning: &binning,
            },
        )
        .unwrap();
        (outcome, report)
    }

    #[test]
    fn test_report_for_one_to_one_match() {
        let halos = HaloCatalog::new(vec![
            Halo::new(1, 10.0, 10.0, 0.30, 3e14),
            Halo::new(2, 40.0, -10.0, 0.60, 6e14),
        ]);
        let clusters = ClusterCatalog::new(vec![
            Cluster::new(1, 10.001, 10.001, 0.302, 40.0),
            Cluster::new(2, 40.0, -10.002, 0.598, 80.0),
        ]);
        let (outcome, report) = report_for(
            &halos,
            &clusters,
            MatchParameters {
                delta_zmax: 0.01,
                theta_max: 0.01,
                ..MatchParameters::default()
            },
        );

        assert_eq!(report.associations, 2);
        assert!((report.completeness.unwrap().value - 1.0).abs() < 1e-12);
        assert!((report.purity.unwrap().value - 1.0).abs() < 1e-12);
        assert_eq!(report.fragmentation.unwrap().count, 0);
        assert!(report.undefined.is_empty());
        assert_eq!(report.signature, outcome.assignment.signature());
        assert_eq!(report.completeness_by_mass.len(), 4);
        assert_eq!(report.purity_by_richness.len(), 4);
    }

    #[test]
    fn test_report_without_candidates_keeps_defined_statistics() {
        let halos = HaloCatalog::new(vec![Halo::new(1, 10.0, 10.0, 0.30, 3e14)]);
        let clusters = ClusterCatalog::new(vec![Cluster::new(1, 80.0, 10.0, 0.30, 40.0)]);
        let (outcome, report) = report_for(&halos, &clusters, MatchParameters::default());

        assert!(outcome.candidates.is_empty());
        assert_eq!(report.associations, 0);
        assert_eq!(report.fragmentation, None);
        assert_eq!(report.overmerging, None);
        assert_eq!(report.undefined.len(), 2);
        assert!(report.undefined[0].starts_with("fragmentation"));
        assert!(report.undefined[1].starts_with("overmerging"));

        let completeness = report.completeness.unwrap();
        assert_eq!((completeness.count, completeness.total), (0, 1));
        assert!(completeness.value.abs() < 1e-12);
        let purity = report.purity.unwrap();
        assert_eq!((purity.count, purity.total), (0, 1));

        // Undefined statistics serialize as null
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["fragmentation"].is_null());
        assert_eq!(json["completeness"]["total"], 1);

        assert!(matches!(
            Fraction::new(0, 0, "fragmentation"),
            Err(AssociationError::DivideByZero(_))
        ));
    }
}
