//! Validate command - associate detected clusters with truth halos and report
//! recovery statistics.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::catalog::filter::Filter;
use crate::catalog::session::{SessionMatch, ValidationSession};
use crate::catalog::store::TableCatalog;
use crate::cli::OutputFormat;
use crate::config::AnalysisConfig;
use crate::core::types::{MatchMethod, ThetaMaxType};
use crate::cosmology::CosmologyChoice;
use crate::statistics::association::{CountingMode, Fraction};
use crate::statistics::binned::BinnedFraction;
use crate::statistics::report::{ReportContext, ValidationReport};

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// Truth galaxy catalog (TSV/CSV, optionally .gz)
    #[arg(long, required = true)]
    pub truth: PathBuf,

    /// Detected cluster catalog (TSV/CSV, optionally .gz)
    #[arg(long, required = true)]
    pub clusters: PathBuf,

    /// Cluster membership catalog, needed by the membership method
    #[arg(long)]
    pub members: Option<PathBuf>,

    /// JSON analysis config; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    // === Matching options ===
    /// Maximum redshift difference between a halo and a cluster
    #[arg(long)]
    pub delta_zmax: Option<f64>,

    /// Maximum transverse separation (degrees, or Mpc with --theta-max-type physical)
    #[arg(long)]
    pub theta_max: Option<f64>,

    /// How --theta-max is interpreted: angular or physical
    #[arg(long)]
    pub theta_max_type: Option<ThetaMaxType>,

    /// Resolution method: proximity or membership
    #[arg(long)]
    pub method: Option<MatchMethod>,

    /// Ignore members below this membership probability
    #[arg(long)]
    pub min_member_probability: Option<f64>,

    // === Selection options ===
    /// Minimum halo mass
    #[arg(long)]
    pub min_halo_mass: Option<f64>,

    /// Minimum cluster richness
    #[arg(long)]
    pub min_richness: Option<f64>,

    /// Only read central galaxies from the truth catalog
    #[arg(long)]
    pub cluster_only: bool,

    /// Extra truth filter, e.g. "redshift < 1.0"
    #[arg(long)]
    pub truth_filter: Option<String>,

    /// Extra cluster filter, e.g. "redshift < 1.0"
    #[arg(long)]
    pub cluster_filter: Option<String>,

    // === Reporting options ===
    /// Cosmology preset name (see the cosmology command)
    #[arg(long)]
    pub cosmology: Option<String>,

    /// Population counted by fragmentation and overmerging: candidates or bijective
    #[arg(long)]
    pub counting_mode: Option<CountingMode>,

    /// Write positions, candidates and the assignment as JSON for plotting
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Execute the validate command
///
/// # Errors
///
/// Returns an error if inputs cannot be read, parameters are invalid, or a
/// statistic cannot be computed.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ValidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)?,
        None => AnalysisConfig::default(),
    };
    let config = apply_overrides(base, &args)?;
    let cosmology = config.cosmology.resolve()?;

    if verbose {
        eprintln!(
            "Matching: delta_zmax={}, theta_max={} {}, method={}, cosmology={}",
            config.matching.delta_zmax,
            config.matching.theta_max,
            config.matching.theta_max_type.unit(),
            config.matching.method,
            config.cosmology,
        );
    }

    let truth = TableCatalog::load_from_file(&args.truth)?;
    let clusters = TableCatalog::load_from_file(&args.clusters)?;
    let members = args
        .members
        .as_deref()
        .map(TableCatalog::load_from_file)
        .transpose()?;

    if verbose {
        eprintln!(
            "Loaded {} truth rows, {} cluster rows{}",
            truth.len(),
            clusters.len(),
            members
                .as_ref()
                .map(|m| format!(", {} member rows", m.len()))
                .unwrap_or_default()
        );
    }

    let mut session = ValidationSession::new(&truth, &clusters, config.columns.clone());
    if let Some(members) = &members {
        session = session.with_members(members);
    }

    let result = session.associate(
        &config.truth_selection,
        &config.cluster_selection,
        &config.matching,
        &cosmology,
    )?;

    let report = ValidationReport::build(
        &result.truth.halos,
        &result.clusters,
        &result.outcome,
        &ReportContext {
            cluster_meta: &config.cluster_meta,
            truth_meta: &config.truth_meta,
            counting_mode: config.counting_mode,
            binning: &config.binning,
        },
    )?;

    if let Some(path) = &args.export {
        write_export(path, &config, &result, &report)?;
        if verbose {
            eprintln!("Wrote match export to {}", path.display());
        }
    }

    match format {
        OutputFormat::Text => print_text_report(&report, &config),
        OutputFormat::Json => print_json_report(&report, &config)?,
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

/// Layer command-line flags over a config
fn apply_overrides(mut config: AnalysisConfig, args: &ValidateArgs) -> anyhow::Result<AnalysisConfig> {
    let matching = &mut config.matching;
    if let Some(v) = args.delta_zmax {
        matching.delta_zmax = v;
    }
    if let Some(v) = args.theta_max {
        matching.theta_max = v;
    }
    if let Some(v) = args.theta_max_type {
        matching.theta_max_type = v;
    }
    if let Some(v) = args.method {
        matching.method = v;
    }
    if let Some(v) = args.min_member_probability {
        matching.min_member_probability = v;
    }

    if let Some(v) = args.min_halo_mass {
        config.truth_selection.min_halo_mass = v;
    }
    if args.cluster_only {
        config.truth_selection.cluster_only = true;
    }
    if let Some(text) = &args.truth_filter {
        config.truth_selection.extra = Some(Filter::parse(text)?);
    }
    if let Some(v) = args.min_richness {
        config.cluster_selection.min_richness = v;
    }
    if let Some(text) = &args.cluster_filter {
        config.cluster_selection.extra = Some(Filter::parse(text)?);
    }

    if let Some(name) = &args.cosmology {
        config.cosmology = CosmologyChoice::Preset { name: name.clone() };
    }
    if let Some(mode) = args.counting_mode {
        config.counting_mode = mode;
    }

    if config.matching.method.needs_membership() && args.members.is_none() {
        anyhow::bail!("--members is required with --method membership");
    }

    config.validate()?;
    Ok(config)
}

fn write_export(
    path: &Path,
    config: &AnalysisConfig,
    result: &SessionMatch,
    report: &ValidationReport,
) -> anyhow::Result<()> {
    let halos: Vec<_> = result
        .truth
        .halos
        .iter()
        .map(|h| {
            serde_json::json!({
                "id": h.id,
                "ra": h.ra,
                "dec": h.dec,
                "redshift": h.redshift,
                "mass": h.mass,
            })
        })
        .collect();
    let clusters: Vec<_> = result
        .clusters
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "ra": c.ra,
                "dec": c.dec,
                "redshift": c.redshift,
                "richness": c.richness,
            })
        })
        .collect();

    let export = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "config": config,
        "halos": halos,
        "clusters": clusters,
        "outcome": result.outcome,
        "report": report,
    });
    std::fs::write(path, serde_json::to_string_pretty(&export)?)?;
    Ok(())
}

fn format_bin(bin: &BinnedFraction) -> String {
    match &bin.fraction {
        Some(f) => format!("[{:.3e}, {:.3e}): {f}", bin.lower, bin.upper),
        None => format!("[{:.3e}, {:.3e}): -", bin.lower, bin.upper),
    }
}

fn format_statistic(fraction: Option<&Fraction>) -> String {
    fraction.map_or_else(|| "undefined".to_string(), ToString::to_string)
}

fn format_value(fraction: Option<&Fraction>) -> String {
    fraction.map_or_else(|| "-".to_string(), |f| format!("{:.4}", f.value))
}

fn print_text_report(report: &ValidationReport, config: &AnalysisConfig) {
    println!("\nCluster validation ({} method)", report.method);
    println!(
        "   Windows: delta_z <= {}, separation <= {} {}",
        config.matching.delta_zmax,
        config.matching.theta_max,
        config.matching.theta_max_type.unit()
    );
    println!(
        "   Inputs: {} halos, {} clusters, {} candidate pairs",
        report.num_halos, report.num_clusters, report.num_candidates
    );

    println!("\n   Bijective associations: {}", report.associations);
    println!(
        "   Fragmentation ({}): {}",
        report.counting_mode,
        format_statistic(report.fragmentation.as_ref())
    );
    println!(
        "   Overmerging ({}): {}",
        report.counting_mode,
        format_statistic(report.overmerging.as_ref())
    );
    println!(
        "   Completeness: {}",
        format_statistic(report.completeness.as_ref())
    );
    println!("   Purity: {}", format_statistic(report.purity.as_ref()));
    for reason in &report.undefined {
        println!("      ({reason})");
    }

    if !report.completeness_by_mass.is_empty() {
        println!("\n   Completeness by halo mass:");
        for bin in &report.completeness_by_mass {
            println!("      {}", format_bin(bin));
        }
    }
    if !report.purity_by_richness.is_empty() {
        println!("\n   Purity by richness:");
        for bin in &report.purity_by_richness {
            println!("      {}", format_bin(bin));
        }
    }

    if !report.signature.is_empty() {
        println!("\n   Assignment signature: {}", report.signature);
    }
}

fn print_json_report(report: &ValidationReport, config: &AnalysisConfig) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "parameters": config.matching,
        "cosmology": config.cosmology,
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_report(report: &ValidationReport) {
    println!(
        "method\thalos\tclusters\tcandidates\tassociations\tcounting_mode\tfragmentation\tovermerging\tcompleteness\tpurity\tsignature"
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        report.method,
        report.num_halos,
        report.num_clusters,
        report.num_candidates,
        report.associations,
        report.counting_mode,
        format_value(report.fragmentation.as_ref()),
        format_value(report.overmerging.as_ref()),
        format_value(report.completeness.as_ref()),
        format_value(report.purity.as_ref()),
        report.signature,
    );
}
