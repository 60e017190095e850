//! gdxtab CLI
//!
//! Command-line access to densification over a JSON database snapshot:
//! - `symbols`: list symbols with kind, dimension and record counts
//! - `catalog`: show one symbol's declared domain list
//! - `table`: densify one symbol and print it as CSV or JSON (scalars print
//!   as a bare number)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use gdxtab_core::{densify, parse_facet, Densified, DomainCatalog};
use gdxtab_model::MemoryDatabase;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gdxtab")]
#[command(
    version,
    about = "Densify sparse exchange-file symbols into indexed tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every symbol in a database snapshot.
    Symbols {
        /// Path to a JSON database snapshot.
        db: PathBuf,
    },

    /// Show a symbol's declared kind and domain list.
    Catalog {
        /// Path to a JSON database snapshot.
        db: PathBuf,
        /// Symbol name (case-insensitive).
        symbol: String,
    },

    /// Densify a symbol and print the result as CSV.
    Table {
        /// Path to a JSON database snapshot.
        db: PathBuf,
        /// Symbol name (case-insensitive).
        symbol: String,
        /// Facet for variables/equations: L, M, LO, UP or SCALE
        /// (case-insensitive; ignored for sets and parameters).
        #[arg(long, default_value = "L")]
        facet: String,
        /// Fill value for combinations with no stored record.
        #[arg(long, default_value_t = 0.0)]
        fill: f64,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Symbols { db } => cmd_symbols(&db),
        Commands::Catalog { db, symbol } => cmd_catalog(&db, &symbol),
        Commands::Table {
            db,
            symbol,
            facet,
            fill,
            output,
        } => cmd_table(&db, &symbol, &facet, fill, output),
    }
}

fn load_db(path: &Path) -> Result<MemoryDatabase> {
    MemoryDatabase::load_json(path)
        .with_context(|| format!("failed to load database snapshot {}", path.display()))
}

fn cmd_symbols(path: &Path) -> Result<()> {
    let db = load_db(path)?;
    for sym in db.iter() {
        println!(
            "{:<24} {:<10} dim={} records={}",
            sym.name.bold(),
            sym.kind.to_string(),
            sym.dimension(),
            sym.records.len()
        );
    }
    Ok(())
}

fn cmd_catalog(path: &Path, symbol: &str) -> Result<()> {
    let db = load_db(path)?;
    let catalog = DomainCatalog::load(&db);
    let kind = catalog.kind(symbol)?;
    let domains = catalog.domains(symbol)?;
    let labels: Vec<&str> = domains.iter().map(|d| d.label()).collect();
    println!("{} {}", symbol.bold(), kind);
    if labels.is_empty() {
        println!("  (scalar)");
    } else {
        println!("  domains: [{}]", labels.join(", "));
    }
    Ok(())
}

fn cmd_table(path: &Path, symbol: &str, facet: &str, fill: f64, output: OutputFormat) -> Result<()> {
    let db = load_db(path)?;
    let catalog = DomainCatalog::load(&db);
    let facet = parse_facet(facet)?;
    let out = densify(&catalog, &db, symbol, facet, fill)
        .with_context(|| format!("failed to densify `{symbol}`"))?;

    match (output, out) {
        (OutputFormat::Json, Densified::Scalar(value)) => {
            println!("{}", serde_json::to_string(&value)?)
        }
        (OutputFormat::Json, Densified::Table(frame)) => {
            println!("{}", serde_json::to_string_pretty(&frame)?)
        }
        (OutputFormat::Csv, Densified::Scalar(value)) => println!("{value}"),
        (OutputFormat::Csv, Densified::Table(frame)) => {
            let mut header: Vec<String> = frame.index().names().to_vec();
            header.push(frame.column().to_string());
            println!("{}", header.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(","));
            for (keys, value) in frame.rows() {
                let mut fields: Vec<String> = keys.iter().map(|k| csv_field(&k.to_string())).collect();
                fields.push(value.to_string());
                println!("{}", fields.join(","));
            }
        }
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
