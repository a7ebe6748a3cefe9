use std::path::PathBuf;

use clap::Args;

use crate::catalog::filter::Filter;
use crate::catalog::store::TableCatalog;
use crate::cli::OutputFormat;
use crate::core::table::{Column, ColumnKind, Table};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Catalog file (TSV/CSV, optionally .gz)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Only count rows passing this filter, e.g. "richness > 20"
    #[arg(long)]
    pub filter: Option<String>,
}

/// Summary of one column
struct ColumnSummary {
    name: String,
    kind: ColumnKind,
    min: Option<f64>,
    max: Option<f64>,
}

fn summarize(name: &str, column: &Column, num_rows: usize) -> ColumnSummary {
    let values = (0..num_rows).filter_map(|row| column.value(row).and_then(|v| v.as_f64()));
    let (min, max) = values.fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), v| {
        (
            Some(lo.map_or(v, |lo| lo.min(v))),
            Some(hi.map_or(v, |hi| hi.max(v))),
        )
    });
    ColumnSummary {
        name: name.to_string(),
        kind: column.kind(),
        min,
        max,
    }
}

fn summaries(table: &Table) -> anyhow::Result<Vec<ColumnSummary>> {
    table
        .column_names()
        .map(|name| {
            let column = table.column(name)?;
            Ok::<_, anyhow::Error>(summarize(name, column, table.num_rows()))
        })
        .collect()
}

/// Execute the inspect command
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or the filter is invalid.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: InspectArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = TableCatalog::load_from_file(&args.input)?;
    let table = catalog.table();

    let selected = match &args.filter {
        Some(text) => {
            let filter = Filter::parse(text)?;
            let mask = filter.evaluate(table)?;
            Some(mask.iter().filter(|keep| **keep).count())
        }
        None => None,
    };

    if verbose {
        eprintln!("Read {} rows from {}", table.num_rows(), args.input.display());
    }

    let columns = summaries(table)?;

    match format {
        OutputFormat::Text => print_text(&args, table.num_rows(), selected, &columns),
        OutputFormat::Json => print_json(&args, table.num_rows(), selected, &columns)?,
        OutputFormat::Tsv => print_tsv(&columns),
    }

    Ok(())
}

fn format_range(summary: &ColumnSummary) -> String {
    match (summary.min, summary.max) {
        (Some(min), Some(max)) => format!("{min} .. {max}"),
        _ => "-".to_string(),
    }
}

fn print_text(
    args: &InspectArgs,
    num_rows: usize,
    selected: Option<usize>,
    columns: &[ColumnSummary],
) {
    println!("\n{}", args.input.display());
    println!("   Rows: {num_rows}");
    if let (Some(filter), Some(selected)) = (&args.filter, selected) {
        println!("   Rows passing '{filter}': {selected}");
    }

    println!("\n   {:<24} {:<6} Range", "Column", "Kind");
    println!("   {}", "-".repeat(50));
    for column in columns {
        println!(
            "   {:<24} {:<6} {}",
            column.name,
            column.kind.to_string(),
            format_range(column)
        );
    }
}

fn print_json(
    args: &InspectArgs,
    num_rows: usize,
    selected: Option<usize>,
    columns: &[ColumnSummary],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "path": args.input.display().to_string(),
        "num_rows": num_rows,
        "filter": args.filter,
        "selected_rows": selected,
        "columns": columns.iter().map(|c| {
            serde_json::json!({
                "name": c.name,
                "kind": c.kind,
                "min": c.min,
                "max": c.max,
            })
        }).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(columns: &[ColumnSummary]) {
    println!("name\tkind\tmin\tmax");
    for column in columns {
        println!(
            "{}\t{}\t{}\t{}",
            column.name,
            column.kind,
            column.min.map(|v| v.to_string()).unwrap_or_default(),
            column.max.map(|v| v.to_string()).unwrap_or_default(),
        );
    }
}
