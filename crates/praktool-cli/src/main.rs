//! prak - evaluate lab measurement tables from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use praktool::prelude::*;
use praktool::error_rounding;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "prak")]
#[command(
    author,
    version,
    about = "Evaluate measurement tables with units and error propagation"
)]
struct Cli {
    /// More log output on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a data file, derive columns and print a table
    Show {
        /// Input data file (csv, dat)
        input: PathBuf,

        /// Derived column as `name[unit] = formula`, may be repeated
        #[arg(short, long = "derive", value_name = "DEFINITION")]
        derive: Vec<String>,

        /// Columns to print (default: all)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Uncertainty kinds to show (stat, sys)
        #[arg(short, long, value_delimiter = ',')]
        errors: Vec<UncertaintyKind>,

        /// Digits after the decimal point for plain values
        #[arg(short, long, default_value = "6")]
        precision: usize,

        /// Significant digits of values with errors (LaTeX only)
        #[arg(long)]
        digits: Option<usize>,

        /// Make CODATA constants (c, qe, planck, ...) available in formulas
        #[arg(long)]
        codata: bool,
    },

    /// List the columns of a data file
    Info {
        /// Input data file
        input: PathBuf,
    },

    /// Mean and standard error of the mean of one column
    Mean {
        /// Input data file
        input: PathBuf,

        /// Column name
        column: String,

        /// Significant digits of the mean (default: derived from the error)
        #[arg(long)]
        digits: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Latex,
    Gnuplot,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Show {
            input,
            derive,
            columns,
            format,
            errors,
            precision,
            digits,
            codata,
        } => show(
            &input,
            &derive,
            columns,
            format,
            errors,
            precision,
            digits,
            codata,
        ),
        Commands::Info { input } => show_info(&input),
        Commands::Mean {
            input,
            column,
            digits,
        } => show_mean(&input, &column, digits),
    }
}

fn load(input: &Path, codata: bool) -> Result<Table> {
    let registry = if codata {
        UnitRegistry::si().with_codata()
    } else {
        UnitRegistry::si()
    };
    Table::open_with(input, &ReadOptions::default(), Arc::new(registry))
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

#[allow(clippy::too_many_arguments)]
fn show(
    input: &Path,
    definitions: &[String],
    columns: Vec<String>,
    format: OutputFormat,
    errors: Vec<UncertaintyKind>,
    precision: usize,
    digits: Option<usize>,
    codata: bool,
) -> Result<()> {
    let mut table = load(input, codata)?;

    for definition in definitions {
        table
            .define(definition)
            .with_context(|| format!("Invalid definition '{}'", definition))?;
    }
    if !definitions.is_empty() {
        let stats = table.update_all().context("Failed to update derived columns")?;
        tracing::debug!(
            "Updated {} columns ({} rows)",
            stats.columns_updated,
            stats.rows_computed
        );
    }

    let printer: Box<dyn TablePrinter> = match format {
        OutputFormat::Text => Box::new(
            SimplePrinter::new(columns)
                .precision(precision)
                .header(true)
                .kinds(errors),
        ),
        OutputFormat::Latex => {
            let kinds = if errors.is_empty() {
                UncertaintyKind::ALL.to_vec()
            } else {
                errors
            };
            Box::new(
                LatexPrinter::new(columns)
                    .precision(precision)
                    .digits(digits)
                    .kinds(kinds),
            )
        }
        OutputFormat::Gnuplot => Box::new(
            GnuplotPrinter::new(columns)
                .precision(precision)
                .kinds(errors),
        ),
        OutputFormat::Json => Box::new(JsonPrinter::new(columns).pretty(true)),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    printer.print(&table, &mut out).context("Failed to print table")?;
    out.flush()?;
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let table = load(input, false)?;

    println!("File: {}", input.display());
    println!("Columns: {}", table.len());
    println!();

    for column in table.columns() {
        let attachments: Vec<&str> = column
            .attachment_kinds()
            .into_iter()
            .map(|kind| kind.name())
            .collect();
        println!(
            "  {:<16} [{}] {} ({} rows){}",
            column.name(),
            column.unit_name(),
            column.kind().name(),
            column.len(),
            if attachments.is_empty() {
                String::new()
            } else {
                format!(", errors: {}", attachments.join(", "))
            }
        );
    }

    Ok(())
}

fn show_mean(input: &Path, name: &str, digits: Option<usize>) -> Result<()> {
    let table = load(input, false)?;
    let column = table
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;

    let (mean, sem) = praktool::mean(&column.values())
        .with_context(|| format!("Cannot average column '{}'", name))?;
    let (mean, sem) = error_rounding(mean, sem, digits);
    println!("{} = ({} ± {}) {}", column.name(), mean, sem, column.unit_name());
    Ok(())
}
