use clap::Args;

use crate::cli::OutputFormat;
use crate::cosmology::presets::{find_preset, load_embedded, DEFAULT_PRESET};
use crate::cosmology::{Cosmology, CosmologyPreset};

/// Arguments for the cosmology command
#[derive(Args)]
pub struct CosmologyArgs {
    /// Preset used for distances
    #[arg(long, default_value = DEFAULT_PRESET)]
    pub preset: String,

    /// Redshifts at which to print the comoving transverse distance; lists
    /// the presets when none are given
    pub redshifts: Vec<f64>,
}

/// Execute the cosmology command
///
/// # Errors
///
/// Returns an error for an unknown preset or a negative redshift.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CosmologyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if args.redshifts.is_empty() {
        let presets = load_embedded()?;
        match format {
            OutputFormat::Text => print_text_presets(&presets, verbose),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&presets)?),
            OutputFormat::Tsv => print_tsv_presets(&presets),
        }
        return Ok(());
    }

    if let Some(z) = args.redshifts.iter().find(|z| !(z.is_finite() && **z >= 0.0)) {
        anyhow::bail!("Redshift must be finite and >= 0, got {z}");
    }

    let preset = find_preset(&args.preset)?;
    let cosmology = preset.build()?;
    let distances: Vec<(f64, f64)> = args
        .redshifts
        .iter()
        .map(|&z| (z, cosmology.comoving_transverse_distance(z)))
        .collect();

    if verbose {
        eprintln!(
            "Using {}: H0={}, Om={}, OL={}",
            preset.name,
            cosmology.h0,
            cosmology.omega_m,
            cosmology.omega_lambda
        );
    }

    match format {
        OutputFormat::Text => {
            println!("\nComoving transverse distance ({})", preset.name);
            for (z, d_m) in &distances {
                println!("   z = {z:<8} D_M = {d_m:.2} Mpc");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "preset": preset,
                "distances": distances.iter().map(|(z, d_m)| {
                    serde_json::json!({"redshift": z, "comoving_transverse_mpc": d_m})
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("redshift\tcomoving_transverse_mpc");
            for (z, d_m) in &distances {
                println!("{z}\t{d_m:.4}");
            }
        }
    }

    Ok(())
}

fn print_text_presets(presets: &[CosmologyPreset], verbose: bool) {
    println!("\nEmbedded cosmologies ({}):", presets.len());
    println!("\n   {:<14} {:>7} {:>8} {:>8}", "Name", "H0", "Om", "OL");
    println!("   {}", "-".repeat(40));
    for preset in presets {
        let omega_lambda = preset.omega_lambda.unwrap_or(1.0 - preset.omega_m);
        let marker = if preset.name == DEFAULT_PRESET { " *" } else { "" };
        println!(
            "   {:<14} {:>7.2} {:>8.4} {:>8.4}{marker}",
            preset.name, preset.h0, preset.omega_m, omega_lambda
        );
        if verbose && !preset.description.is_empty() {
            println!("      {}", preset.description);
        }
    }
    println!("\n   * default");
}

fn print_tsv_presets(presets: &[CosmologyPreset]) {
    println!("name\th0\tomega_m\tomega_lambda\tdescription");
    for preset in presets {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            preset.name,
            preset.h0,
            preset.omega_m,
            preset.omega_lambda.unwrap_or(1.0 - preset.omega_m),
            preset.description
        );
    }
}
