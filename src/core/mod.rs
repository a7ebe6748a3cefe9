//! Core data types for halo/cluster cross-matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Table`]: A columnar snapshot of catalog rows, as returned by a catalog adapter
//! - [`Halo`], [`Galaxy`]: Truth-side objects; halos are the central galaxies
//! - [`Cluster`], [`ClusterMember`]: Detection-side objects
//! - [`ColumnNames`]: Which table columns hold which quantity
//! - [`ThetaMaxType`], [`MatchMethod`]: Matching options
//! - [`AssociationError`]: Errors raised by the matching and statistics engines
//!
//! ## Indices
//!
//! Match structures refer to halos and clusters by their position in the
//! [`HaloCatalog`] and [`ClusterCatalog`] given to the engine, not by catalog id:
//!
//! | Structure | Indexed by | Holds |
//! |-----------|------------|-------|
//! | `match_1w` | halo index | candidate cluster indices |
//! | `match_2w` | cluster index | candidate halo indices |
//! | `assignment` | - | (halo index, cluster index) pairs |

pub mod cluster;
pub mod columns;
pub mod error;
pub mod halo;
pub mod table;
pub mod types;

pub use cluster::{Cluster, ClusterCatalog, ClusterMember, MemberCatalog};
pub use columns::ColumnNames;
pub use error::AssociationError;
pub use halo::{Galaxy, GalaxyCatalog, Halo, HaloCatalog};
pub use table::{Column, ColumnKind, Table, Value};
pub use types::{MatchMethod, ThetaMaxType};
