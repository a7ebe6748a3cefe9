//! Catalog access: adapters, filters, and memoized selections.
//!
//! Truth and detection catalogs are flat tables of named quantities. A
//! [`CatalogAdapter`](store::CatalogAdapter) returns the requested quantities
//! for the rows passing an optional [`Filter`](filter::Filter);
//! [`TableCatalog`](store::TableCatalog) implements it over an in-memory table
//! loaded from TSV or CSV (optionally gzip-compressed).
//!
//! ## Filters
//!
//! Filters are typed expression trees. They can be built in code or parsed
//! from the usual string syntax:
//!
//! ```rust
//! use cluster_validation::catalog::filter::Filter;
//!
//! let parsed = Filter::parse("halo_mass > 1e14 & is_central == True").unwrap();
//! let built = Filter::gt("halo_mass", 1e14).and(Filter::is("is_central", true));
//! assert_eq!(parsed, built);
//! ```
//!
//! ## Sessions
//!
//! A [`ValidationSession`](session::ValidationSession) caches the truth,
//! cluster and member tables keyed by the selection that produced them, so
//! repeated runs with unchanged cuts do not query the catalogs again.
//!
//! ```rust,no_run
//! use cluster_validation::catalog::session::{ClusterSelection, TruthSelection, ValidationSession};
//! use cluster_validation::catalog::store::TableCatalog;
//! use cluster_validation::core::ColumnNames;
//! use cluster_validation::cosmology::LambdaCdm;
//! use cluster_validation::matching::MatchParameters;
//! use std::path::Path;
//!
//! let truth = TableCatalog::load_from_file(Path::new("truth.tsv.gz")).unwrap();
//! let clusters = TableCatalog::load_from_file(Path::new("clusters.csv")).unwrap();
//! let mut session = ValidationSession::new(&truth, &clusters, ColumnNames::default());
//!
//! let cosmology = LambdaCdm::flat(70.0, 0.3).unwrap();
//! let result = session
//!     .associate(
//!         &TruthSelection::default(),
//!         &ClusterSelection::default(),
//!         &MatchParameters::default(),
//!         &cosmology,
//!     )
//!     .unwrap();
//! println!("{} pairs", result.outcome.assignment.len());
//! ```

pub mod filter;
pub mod index;
pub mod session;
pub mod store;
