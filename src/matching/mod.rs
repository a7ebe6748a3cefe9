//! Cluster-to-halo association engine.
//!
//! This module provides the core matching functionality:
//!
//! - [`MatchingEngine`]: Main entry point, producing a [`MatchOutcome`]
//! - [`CandidateTally`]: Candidate partners of each halo (`match_1w`) or
//!   cluster (`match_2w`)
//! - [`Assignment`]: The resolved one-to-one halo/cluster pairs
//! - [`ScoringPolicy`]: How competing pairs are ranked
//!
//! ## Matching Algorithm
//!
//! 1. **Candidate search**: clusters are sorted by redshift; for each halo the
//!    clusters within `delta_zmax` are found by binary search and kept when
//!    their separation is within `theta_max` (degrees, or comoving Mpc at the
//!    halo redshift for physical windows). Both bounds are inclusive.
//! 2. **Tallies**: every candidate is recorded from both sides.
//! 3. **Resolution**: candidate pairs are ranked by the scoring policy and
//!    accepted greedily while both sides are still free. Ties fall to the
//!    lowest halo index, then the lowest cluster index.
//!
//! ## Scoring
//!
//! - **Proximity**: quadrature sum of `dz / delta_zmax` and
//!   `separation / theta_max`; smaller wins.
//! - **Membership**: probability-weighted count of member galaxies the
//!   cluster shares with the halo; larger wins, proximity breaks ties.
//!
//! ## Example
//!
//! ```rust
//! use cluster_validation::core::{Cluster, ClusterCatalog, Halo, HaloCatalog};
//! use cluster_validation::cosmology::LambdaCdm;
//! use cluster_validation::matching::{MatchInputs, MatchParameters, MatchingEngine};
//!
//! let halos = HaloCatalog::new(vec![Halo::new(1, 10.0, 10.0, 0.30, 2e14)]);
//! let clusters = ClusterCatalog::new(vec![Cluster::new(1, 10.001, 10.001, 0.302, 40.0)]);
//! let cosmology = LambdaCdm::flat(70.0, 0.3).unwrap();
//!
//! let engine = MatchingEngine::new(MatchParameters {
//!     delta_zmax: 0.01,
//!     theta_max: 0.01,
//!     ..MatchParameters::default()
//! });
//! let outcome = engine
//!     .run(&MatchInputs {
//!         halos: &halos,
//!         clusters: &clusters,
//!         cosmology: &cosmology,
//!         galaxies: None,
//!         members: None,
//!     })
//!     .unwrap();
//!
//! assert_eq!(outcome.assignment.cluster_for_halo(0), Some(0));
//! ```

pub mod assignment;
pub mod candidates;
pub mod engine;
pub mod geometry;
pub mod scoring;

pub use assignment::{AssignedPair, Assignment};
pub use candidates::{CandidateTally, MatchCandidate};
pub use engine::{match_catalogs, MatchInputs, MatchOutcome, MatchParameters, MatchingEngine};
pub use scoring::{MembershipOverlapScore, PairScore, ProximityScore, ScoringPolicy};
