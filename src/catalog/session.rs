//! Memoized catalog selections for an analysis session.
//!
//! Each derived table is cached together with the selection that produced it.
//! A request with a different selection recomputes the table; a request with
//! the same selection returns the cached one. Nothing is invalidated behind
//! the caller's back.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::filter::Filter;
use crate::catalog::store::{CatalogAdapter, CatalogError};
use crate::core::cluster::{ClusterCatalog, MemberCatalog};
use crate::core::columns::ColumnNames;
use crate::core::halo::{GalaxyCatalog, HaloCatalog};
use crate::cosmology::Cosmology;
use crate::matching::engine::{MatchInputs, MatchOutcome, MatchParameters, MatchingEngine};

/// Default lower bound on halo mass for the truth selection
pub const DEFAULT_MIN_HALO_MASS: f64 = 1e14;

/// Default lower bound on cluster richness
pub const DEFAULT_MIN_RICHNESS: f64 = 20.0;

/// A single cached value keyed by the parameters that produced it
#[derive(Debug)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    computations: usize,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value, if it was computed for `key`
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.entry {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        }
    }

    /// Return the value for `key`, computing it if the cached key differs.
    ///
    /// On error the stale entry is dropped.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        let entry = match self.entry.take() {
            Some((k, v)) if k == *key => (k, v),
            _ => {
                self.computations += 1;
                (key.clone(), compute()?)
            }
        };
        let (_, value) = self.entry.insert(entry);
        Ok(value)
    }

    /// Key of the cached value
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(k, _)| k)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// How many times a value has been computed
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Which truth galaxies (and hence halos) enter the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruthSelection {
    pub min_halo_mass: f64,

    /// Restrict the galaxy table to centrals
    pub cluster_only: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Filter>,
}

impl Default for TruthSelection {
    fn default() -> Self {
        Self {
            min_halo_mass: DEFAULT_MIN_HALO_MASS,
            cluster_only: false,
            extra: None,
        }
    }
}

impl TruthSelection {
    /// Catalog filter for this selection
    #[must_use]
    pub fn to_filter(&self, names: &ColumnNames) -> Filter {
        let mut filters = vec![Filter::gt(&names.halo_mass, self.min_halo_mass)];
        if self.cluster_only {
            filters.push(Filter::is(&names.is_central, true));
        }
        filters.extend(self.extra.clone());
        // Never empty: the mass cut is always present
        Filter::all(filters).unwrap_or_else(|| Filter::gt(&names.halo_mass, self.min_halo_mass))
    }
}

/// Which detected clusters enter the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSelection {
    pub min_richness: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Filter>,
}

impl Default for ClusterSelection {
    fn default() -> Self {
        Self {
            min_richness: DEFAULT_MIN_RICHNESS,
            extra: None,
        }
    }
}

impl ClusterSelection {
    /// Catalog filter for this selection
    #[must_use]
    pub fn to_filter(&self, names: &ColumnNames) -> Filter {
        let richness = Filter::gt(&names.richness, self.min_richness);
        match &self.extra {
            Some(extra) => richness.and(extra.clone()),
            None => richness,
        }
    }
}

/// Truth galaxies and the halos derived from them
#[derive(Debug, Clone)]
pub struct TruthData {
    pub galaxies: GalaxyCatalog,
    pub halos: HaloCatalog,
}

/// Counters describing how often each selection was recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStats {
    pub truth_queries: usize,
    pub cluster_queries: usize,
    pub member_queries: usize,
}

/// Everything produced by one association run
#[derive(Debug, Clone)]
pub struct SessionMatch {
    pub truth: Arc<TruthData>,
    pub clusters: Arc<ClusterCatalog>,
    pub members: Option<Arc<MemberCatalog>>,
    pub outcome: MatchOutcome,
}

/// Catalog access for one analysis, with per-table memoization
pub struct ValidationSession<'a> {
    truth: &'a dyn CatalogAdapter,
    detections: &'a dyn CatalogAdapter,
    members: Option<&'a dyn CatalogAdapter>,
    columns: ColumnNames,

    truth_memo: Memo<TruthSelection, Arc<TruthData>>,
    cluster_memo: Memo<ClusterSelection, Arc<ClusterCatalog>>,
    member_memo: Memo<(), Arc<MemberCatalog>>,
}

impl<'a> ValidationSession<'a> {
    pub fn new(
        truth: &'a dyn CatalogAdapter,
        detections: &'a dyn CatalogAdapter,
        columns: ColumnNames,
    ) -> Self {
        Self {
            truth,
            detections,
            members: None,
            columns,
            truth_memo: Memo::new(),
            cluster_memo: Memo::new(),
            member_memo: Memo::new(),
        }
    }

    /// Attach the cluster-membership catalog
    #[must_use]
    pub fn with_members(mut self, members: &'a dyn CatalogAdapter) -> Self {
        self.members = Some(members);
        self
    }

    #[must_use]
    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// Truth galaxies and halos for `selection`
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the query or table conversion fails.
    pub fn truth_data(&mut self, selection: &TruthSelection) -> Result<Arc<TruthData>, CatalogError> {
        let truth = self.truth;
        let columns = &self.columns;
        let data = self.truth_memo.get_or_try_insert_with(selection, || {
            let filter = selection.to_filter(columns);
            debug!(catalog = truth.name(), filter = %filter, "querying truth catalog");
            let table = truth.get_table(&columns.truth_quantities(), Some(&filter))?;
            let galaxies = GalaxyCatalog::from_table(&table, columns)?;
            let halos = galaxies.centrals();
            info!(
                galaxies = galaxies.len(),
                halos = halos.len(),
                "loaded truth selection"
            );
            Ok::<_, CatalogError>(Arc::new(TruthData { galaxies, halos }))
        })?;
        Ok(Arc::clone(data))
    }

    /// Detected clusters for `selection`
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the query or table conversion fails.
    pub fn cluster_data(
        &mut self,
        selection: &ClusterSelection,
    ) -> Result<Arc<ClusterCatalog>, CatalogError> {
        let detections = self.detections;
        let columns = &self.columns;
        let data = self.cluster_memo.get_or_try_insert_with(selection, || {
            let filter = selection.to_filter(columns);
            debug!(catalog = detections.name(), filter = %filter, "querying cluster catalog");
            let table = detections.get_table(&columns.cluster_quantities(), Some(&filter))?;
            let clusters = ClusterCatalog::from_table(&table, columns)?;
            info!(clusters = clusters.len(), "loaded cluster selection");
            Ok::<_, CatalogError>(Arc::new(clusters))
        })?;
        Ok(Arc::clone(data))
    }

    /// Cluster members, or `None` when no member catalog is attached
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the query or table conversion fails.
    pub fn member_data(&mut self) -> Result<Option<Arc<MemberCatalog>>, CatalogError> {
        let Some(members) = self.members else {
            return Ok(None);
        };
        let columns = &self.columns;
        let data = self.member_memo.get_or_try_insert_with(&(), || {
            debug!(catalog = members.name(), "querying member catalog");
            let table = members.get_table(&columns.member_quantities(), None)?;
            let catalog = MemberCatalog::from_table(&table, columns)?;
            info!(members = catalog.len(), "loaded cluster members");
            Ok::<_, CatalogError>(Arc::new(catalog))
        })?;
        Ok(Some(Arc::clone(data)))
    }

    /// Query (or reuse) the selections and run the matching engine.
    ///
    /// Member data is only loaded when the method needs it.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` wrapping any catalog or matching failure.
    pub fn associate(
        &mut self,
        truth_selection: &TruthSelection,
        cluster_selection: &ClusterSelection,
        params: &MatchParameters,
        cosmology: &dyn Cosmology,
    ) -> Result<SessionMatch, CatalogError> {
        let truth = self.truth_data(truth_selection)?;
        let clusters = self.cluster_data(cluster_selection)?;
        let members = if params.method.needs_membership() {
            self.member_data()?
        } else {
            None
        };

        let inputs = MatchInputs {
            halos: &truth.halos,
            clusters: &clusters,
            cosmology,
            galaxies: params
                .method
                .needs_membership()
                .then_some(&truth.galaxies),
            members: members.as_deref(),
        };
        let outcome = MatchingEngine::new(params.clone()).run(&inputs)?;

        Ok(SessionMatch {
            truth,
            clusters,
            members,
            outcome,
        })
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            truth_queries: self.truth_memo.computations(),
            cluster_queries: self.cluster_memo.computations(),
            member_queries: self.member_memo.computations(),
        }
    }
}
