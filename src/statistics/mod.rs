//! Recovery statistics computed from an association run.
//!
//! - [`fragmentation`] / [`overmerging`]: how often a halo (cluster) has more
//!   than one candidate on the other side
//! - [`completeness`] / [`purity`]: how many halos (clusters) inside both
//!   catalogs' regions were assigned a partner
//! - [`binned_completeness`] / [`binned_purity`]: the same in bins of halo
//!   mass and cluster richness
//! - [`ValidationReport`]: everything above in one serializable value
//!
//! All functions are pure. A statistic with an empty population fails with
//! `AssociationError::DivideByZero`; an empty bin is reported as `None`, and
//! so is an empty statistic inside a [`ValidationReport`].

pub mod association;
pub mod binned;
pub mod footprint;
pub mod report;

pub use association::{
    completeness, fragmentation, number_of_associations, overmerging, purity, CountingMode,
    Fraction,
};
pub use binned::{binned_completeness, binned_purity, log_spaced_edges, BinnedFraction};
pub use footprint::{CatalogMeta, Footprint, RedshiftRange, SkyBox};
pub use report::{BinningConfig, ReportContext, ValidationReport};
