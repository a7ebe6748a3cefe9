//! # cluster-validation
//!
//! A library for validating galaxy cluster catalogs against the true
//! dark-matter halos of a simulated sky.
//!
//! A cluster finder run on a simulated galaxy catalog produces a list of
//! detections. How good is it? Answering that needs an association between
//! detected clusters and true halos, and a handful of statistics over that
//! association.
//!
//! `cluster-validation` does both:
//!
//! ## Features
//!
//! - **Windowed candidates**: Halo/cluster pairs within a redshift window and
//!   an angular (degrees) or physical (comoving Mpc) transverse window
//! - **Bijective resolution**: A one-to-one assignment chosen by proximity or
//!   by probability-weighted shared membership
//! - **Recovery statistics**: Fragmentation, overmerging, completeness and
//!   purity, restricted to the catalogs' common region
//! - **Binned statistics**: Completeness by halo mass and purity by richness
//! - **Catalog access**: Filtered, memoized queries over TSV/CSV catalogs
//!
//! ## Example
//!
//! ```rust
//! use cluster_validation::core::{Cluster, ClusterCatalog, Halo, HaloCatalog};
//! use cluster_validation::cosmology::LambdaCdm;
//! use cluster_validation::matching::{MatchInputs, MatchParameters, MatchingEngine};
//! use cluster_validation::statistics::{completeness, CatalogMeta};
//!
//! let halos = HaloCatalog::new(vec![Halo::new(1, 150.0, 2.0, 0.4, 5e14)]);
//! let clusters = ClusterCatalog::new(vec![Cluster::new(7, 150.01, 2.0, 0.41, 60.0)]);
//! let cosmology = LambdaCdm::flat(70.0, 0.3).unwrap();
//!
//! let outcome = MatchingEngine::new(MatchParameters::default())
//!     .run(&MatchInputs {
//!         halos: &halos,
//!         clusters: &clusters,
//!         cosmology: &cosmology,
//!         galaxies: None,
//!         members: None,
//!     })
//!     .unwrap();
//! assert_eq!(outcome.assignment.cluster_for_halo(0), Some(0));
//!
//! let everywhere = CatalogMeta::unbounded();
//! let c = completeness(&halos, &outcome.assignment, &everywhere, &everywhere).unwrap();
//! assert!((c.value - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog adapters, filters, and memoized sessions
//! - [`core`]: Core data types for halos, clusters, and tables
//! - [`cosmology`]: Distance-redshift relations and presets
//! - [`matching`]: Candidate search and bijective assignment
//! - [`statistics`]: Fragmentation, overmerging, completeness, and purity
//! - [`parsing`]: Delimited-text table parser
//! - [`config`]: Analysis configuration
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod cosmology;
pub mod matching;
pub mod parsing;
pub mod statistics;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::session::ValidationSession;
pub use catalog::store::TableCatalog;
pub use config::AnalysisConfig;
pub use core::types::*;
pub use core::{ClusterCatalog, HaloCatalog};
pub use matching::engine::{match_catalogs, MatchOutcome, MatchParameters, MatchingEngine};
pub use statistics::report::ValidationReport;
