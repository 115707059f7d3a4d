//! # stockgrid-cli
//!
//! Command-line host for the stockgrid workbook engine.

mod config;
mod steps;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use std::path::{Path, PathBuf};
use stockgrid_sheet::{import_path, Outcome, Record, Selection, Sheet, Workbook};
use stockgrid_stock::{StockReport, StockStatus};
use tracing_subscriber::EnvFilter;

/// stockgrid - inventory spreadsheets from the command line
#[derive(Parser)]
#[command(name = "stockgrid")]
#[command(author, version, about = "Inventory workbook editor and stock reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/stockgrid/config.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List sheets, their columns and row counts
    Inspect {
        /// Spreadsheet, CSV, TSV or JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the export projection of a sheet
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet name (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output format (json, csv, table)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },
    /// Classify stock levels and summarize a sheet
    Stock {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sheet name (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Minimum stock threshold
        #[arg(long)]
        min: Option<f64>,

        /// Ideal stock level (informational)
        #[arg(long)]
        ideal: Option<f64>,

        /// Maximum stock threshold
        #[arg(long)]
        max: Option<f64>,

        /// Output format (json, csv, table)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },
    /// Apply a JSON edit script to a workbook
    Edit {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON array of steps, inline or as a file path
        #[arg(long)]
        commands: String,

        /// Save the edited workbook as xlsx
        #[arg(short, long, value_name = "XLSX")]
        out: Option<PathBuf>,

        /// Output format for the final export of the active sheet. Only
        /// selected rows are shown if the script selects any.
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },
}

/// Output format for results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match cli.command {
        Commands::Inspect { file } => {
            let book = load_workbook(&file).await?;
            print_inspect(&book);
        }
        Commands::Export { file, sheet, format } => {
            let book = load_workbook(&file).await?;
            let sheet = pick_sheet(&book, sheet.as_deref())?;
            println!("{}", render_sheet(sheet, Selection::All, format)?);
        }
        Commands::Stock {
            file,
            sheet,
            min,
            ideal,
            max,
            format,
        } => {
            let config = Config::load(cli.config.as_deref())?.with_overrides(min, ideal, max)?;
            let book = load_workbook(&file).await?;
            let sheet = pick_sheet(&book, sheet.as_deref())?;
            let records = sheet.export(Selection::All);
            let report = StockReport::build(&records, &config.thresholds, &config.aliases);
            print_report(&report, format)?;
        }
        Commands::Edit {
            file,
            commands,
            out,
            format,
        } => {
            let script = read_script(&commands)?;
            let book = load_workbook(&file).await?;
            let book = run_edit(book, &script)?;
            println!(
                "{}",
                render_sheet(book.active_sheet(), Selection::SelectedOnly, format)?
            );
            if let Some(out) = out {
                book.save_as_xlsx(&out)
                    .with_context(|| format!("Failed to write: {}", out.display()))?;
                println!("{} {}", "Saved".green().bold(), out.display());
            }
        }
    }

    Ok(())
}

/// Import a file off the async runtime and load it into a fresh workbook.
async fn load_workbook(path: &Path) -> Result<Workbook> {
    let owned = path.to_path_buf();
    let sheets = tokio::task::spawn_blocking(move || import_path(&owned))
        .await
        .context("Import task failed")?
        .with_context(|| format!("Failed to import: {}", path.display()))?;

    let mut book = Workbook::new();
    book.replace_with_import(sheets)?;
    Ok(book)
}

/// Get a sheet by name, or the active sheet.
fn pick_sheet<'b>(book: &'b Workbook, name: Option<&str>) -> Result<&'b Sheet> {
    match name {
        Some(name) => Ok(book.sheet_by_name(name)?),
        None => Ok(book.active_sheet()),
    }
}

/// Inline JSON if it looks like an array, otherwise a path to read.
fn read_script(arg: &str) -> Result<String> {
    if arg.trim_start().starts_with('[') {
        Ok(arg.to_string())
    } else {
        std::fs::read_to_string(arg).with_context(|| format!("Failed to read script: {arg}"))
    }
}

/// Run every step in order, printing each outcome. Refused steps do not stop
/// the script.
fn run_edit(mut book: Workbook, script: &str) -> Result<Workbook> {
    let steps = steps::parse_steps(script).context("Invalid edit script")?;

    for (i, step) in steps.iter().enumerate() {
        let command = step.resolve(&book);
        let (next, outcome) = book.apply(&command);
        book = next;

        let label = format!("[{}] {}", i + 1, step.op());
        match &outcome {
            Outcome::Applied => println!("{label}: {}", outcome.to_string().green()),
            Outcome::Rejected(_) => println!("{label}: {}", outcome.to_string().yellow()),
            Outcome::NotFound(_) => println!("{label}: {}", outcome.to_string().red()),
        }
    }

    Ok(book)
}

fn print_inspect(book: &Workbook) {
    for sheet in book.sheets() {
        let marker = if sheet.id() == book.active_sheet_id() {
            " (active)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "{}{marker}: {} rows",
            sheet.name().cyan().bold(),
            sheet.row_count()
        );
        for column in sheet.columns() {
            println!("  {} {}", column.name, format!("[{}]", column.kind).yellow());
        }
    }
}

/// Render a sheet's export in the specified format, without a trailing newline.
fn render_sheet(sheet: &Sheet, selection: Selection, format: OutputFormat) -> Result<String> {
    let out = match format {
        OutputFormat::Json => sheet.to_json_string_pretty(selection)?,
        OutputFormat::Csv => sheet.to_csv_string(selection)?.trim_end().to_string(),
        OutputFormat::Table => {
            let records = sheet.export(selection);
            if records.is_empty() {
                "(empty sheet)".to_string()
            } else {
                render_table(&sheet.export_names(), &records)
            }
        }
    };
    Ok(out)
}

/// Render records as an aligned text table.
fn render_table(names: &[&str], records: &[Record]) -> String {
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            names
                .iter()
                .map(|n| r.get(*n).map(|v| v.as_str()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(n.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(padded_line(names.iter().copied(), &widths));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        out.push(padded_line(row.iter().map(String::as_str), &widths));
    }
    out.join("\n")
}

fn padded_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(v, &w)| format!("{v:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Print a stock report in the specified format.
fn print_report(report: &StockReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => print!("{}", report_csv(report)?),
        OutputFormat::Table => {
            println!(
                "{} {}   {} {}   {} {}",
                "Low:".red().bold(),
                report.low,
                "Correct:".green().bold(),
                report.correct,
                "High:".yellow().bold(),
                report.high
            );
            if report.unclassified > 0 {
                println!("{} {}", "Unclassified:".dimmed(), report.unclassified);
            }
            println!("Total stock: {}", report.total_stock);
            match report.mean_cost {
                Some(cost) => println!("Mean unit cost: {cost:.2}"),
                None => println!("Mean unit cost: -"),
            }
            println!("Inventory value: {:.2}", report.inventory_value);

            for line in &report.lines {
                let status = match line.status {
                    StockStatus::Low => line.status.to_string().red(),
                    StockStatus::Correct => line.status.to_string().green(),
                    StockStatus::High => line.status.to_string().yellow(),
                };
                println!("  {:<24} {:>10} {status}", line.name, line.stock);
            }
        }
    }
    Ok(())
}

/// Report lines as CSV with a `name,stock,cost,status` header.
fn report_csv(report: &StockReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "stock", "cost", "status"])?;
    for line in &report.lines {
        writer.write_record([
            line.name.clone(),
            line.stock.to_string(),
            line.cost.map(|c| c.to_string()).unwrap_or_default(),
            line.status.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to write CSV: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}
