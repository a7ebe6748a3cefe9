//! Command-line interface for cluster-validation.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **validate**: Associate detected clusters with truth halos and report
//!   fragmentation, overmerging, completeness and purity
//! - **inspect**: Show the columns, kinds and row counts of a catalog file
//! - **cosmology**: List the embedded cosmology presets and evaluate distances
//!
//! ## Usage
//!
//! ```text
//! # Angular matching with default windows
//! cluster-validation validate --truth truth.tsv.gz --clusters redmapper.csv
//!
//! # Physical matching within 1 Mpc, JSON output
//! cluster-validation validate --truth truth.tsv.gz --clusters redmapper.csv \
//!     --theta-max 1.0 --theta-max-type physical --format json
//!
//! # Membership matching with an export for plotting
//! cluster-validation validate --truth truth.tsv.gz --clusters redmapper.csv \
//!     --members members.csv --method membership --export matches.json
//!
//! # Which columns does a catalog have?
//! cluster-validation inspect redmapper.csv
//!
//! # Comoving transverse distances under a preset
//! cluster-validation cosmology --preset planck18 0.1 0.5 1.0
//! ```

use clap::{Parser, Subcommand};

pub mod cosmology;
pub mod inspect;
pub mod validate;

#[derive(Parser)]
#[command(name = "cluster-validation")]
#[command(version)]
#[command(about = "Validate galaxy cluster catalogs against simulated truth halos")]
#[command(
    long_about = "cluster-validation associates detected galaxy clusters with the true dark-matter halos of a simulated sky.\n\nCandidates are found within a redshift window and an angular or physical transverse window, resolved into a one-to-one assignment, and summarized as:\n- Fragmentation and overmerging fractions\n- Completeness and purity inside the catalogs' common region\n- Completeness by halo mass and purity by richness"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match clusters to halos and report recovery statistics
    Validate(validate::ValidateArgs),

    /// Show the columns of a catalog file
    Inspect(inspect::InspectArgs),

    /// List cosmology presets or evaluate distances
    Cosmology(cosmology::CosmologyArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
