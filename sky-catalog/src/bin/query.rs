use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sky_catalog::row::write_rows;
use sky_catalog::{CatalogStore, StarRecord, StarSource, TextCatalog};
use sky_core::Hemisphere;
use tracing::Level;

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "query-catalog")]
#[command(about = "Query HYG star catalogs by magnitude and hemisphere")]
struct Cli {
    /// Path to the catalog file
    #[arg(long)]
    catalog: PathBuf,

    /// Treat the catalog as an SQLite database instead of text rows
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    sqlite: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print catalog information
    Info,
    /// List stars brighter than a magnitude limit
    Search {
        /// Exclusive magnitude limit
        #[arg(long, default_value = "5.0")]
        max_mag: f64,
        /// Restrict to one hemisphere (north or south)
        #[arg(long)]
        hemisphere: Option<Hemisphere>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Look up a star by proper name
    Find {
        name: String,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Write the stars brighter than a limit as catalog rows
    Export {
        #[arg(long)]
        max_mag: f64,
        #[arg(long)]
        hemisphere: Option<Hemisphere>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Copy the whole catalog into an SQLite database
    #[cfg(feature = "sqlite")]
    ToSqlite {
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let store = open_store(&cli)?;

    match cli.command {
        Commands::Info => print_info(&store),
        Commands::Search {
            max_mag,
            hemisphere,
            limit,
            format,
        } => {
            let mut results = store.query(max_mag, hemisphere);
            if let Some(limit) = limit {
                results.truncate(limit);
            }
            print_results(&results, &format)?;
        }
        Commands::Find { name, format } => match store.find_by_name(&name) {
            Some(star) => print_results(&[star], &format)?,
            None => anyhow::bail!("No star named '{}' in {}", name, cli.catalog.display()),
        },
        Commands::Export {
            max_mag,
            hemisphere,
            output,
        } => {
            let file = File::create(&output)
                .with_context(|| format!("Cannot create {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            let written = write_rows(&mut writer, store.query(max_mag, hemisphere))?;
            writer.flush()?;
            println!("Wrote {} stars to {}", written, output.display());
        }
        #[cfg(feature = "sqlite")]
        Commands::ToSqlite { output } => {
            let db = sky_catalog::SqliteCatalog::new(&output);
            let written = db
                .write_records(store.records())
                .with_context(|| format!("Cannot write {}", output.display()))?;
            println!("Wrote {} stars to {}", written, output.display());
        }
    }

    Ok(())
}

fn open_store(cli: &Cli) -> anyhow::Result<CatalogStore> {
    let source = catalog_source(cli);
    let (store, report) = CatalogStore::open(source.as_ref())
        .with_context(|| format!("Cannot load catalog {}", cli.catalog.display()))?;
    for err in &report.rejected {
        tracing::debug!("{}", err);
    }
    Ok(store)
}

fn catalog_source(cli: &Cli) -> Box<dyn StarSource> {
    #[cfg(feature = "sqlite")]
    if cli.sqlite {
        return Box::new(sky_catalog::SqliteCatalog::new(&cli.catalog));
    }
    Box::new(TextCatalog::from_path(&cli.catalog))
}

fn print_info(store: &CatalogStore) {
    let visible = store.query(f64::INFINITY, None);
    let north = store.query(f64::INFINITY, Some(Hemisphere::North)).len();
    let south = store.query(f64::INFINITY, Some(Hemisphere::South)).len();
    let unprojectable = store.records().iter().filter(|s| !s.is_projectable()).count();

    println!("Source: {}", store.source().unwrap_or("-"));
    println!("Records: {}", store.len());
    println!("Queryable stars: {}", visible.len());
    println!("  North (dec >= 0): {}", north);
    println!("  South (dec <= 0): {}", south);
    println!("Without position: {}", unprojectable);
    if let Some(brightest) = visible.first() {
        println!(
            "Brightest: {} (mag {:.2})",
            brightest.display_name(),
            brightest.mag.unwrap_or(f64::NAN)
        );
    }
}

fn print_results(results: &[&StarRecord], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(results),
        OutputFormat::Json => print_json(results)?,
        OutputFormat::Csv => print_csv(results)?,
    }
    Ok(())
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

fn print_table(results: &[&StarRecord]) {
    for (i, star) in results.iter().enumerate() {
        println!(
            "{:4}: {:>8} {:<24} RA={:>10}h Dec={:>10}° Mag={:>6} {}",
            i + 1,
            star.id,
            star.display_name(),
            opt(star.ra, 6),
            opt(star.dec, 6),
            opt(star.mag, 2),
            star.con.as_deref().unwrap_or("")
        );
    }

    if results.is_empty() {
        println!("No stars found matching the search criteria.");
    } else {
        println!("\nTotal results: {}", results.len());
    }
}

fn print_json(results: &[&StarRecord]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

fn print_csv(results: &[&StarRecord]) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(std::io::stdout().lock());
    out.write_record(["id", "name", "ra", "dec", "mag", "rarad", "decrad", "con"])?;
    for star in results {
        out.write_record([
            star.id.to_string(),
            star.display_name(),
            opt(star.ra, 6),
            opt(star.dec, 6),
            opt(star.mag, 2),
            opt(star.rarad, 9),
            opt(star.decrad, 9),
            star.con.clone().unwrap_or_default(),
        ])?;
    }
    out.flush()?;
    Ok(())
}
