use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use stock_report::analytics::{generate_detailed_brand_report, generate_summary};
use stock_report::catalog::{BrandMatcher, SharedCatalog};
use stock_report::config::{Config, DEFAULT_CONFIG_PATH};
use stock_report::formatter::{format_or_fallback, format_text};
use stock_report::heuristics::extract_inventory_lines;
use stock_report::report::FormattedStockReport;
use stock_report::source::{self, ExtractionMethod, PdfDocument};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pharma stock report normalizer", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply if it does not exist
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a report (.json, .pdf or text) and print it with brand analytics
    Format { file: PathBuf },
    /// Print the inventory lines found in a report
    Lines { file: PathBuf },
    /// List the brand catalog
    Brands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    let catalog = SharedCatalog::seeded();
    for division in cfg.catalog.divisions.iter().cloned() {
        if let Err(e) = catalog.add_division(division) {
            warn!(error = %e, "Skipping configured division");
        }
    }
    let matcher = BrandMatcher::new(catalog);

    match cli.command {
        Commands::Format { file } => {
            let span = tracing::info_span!("format", file = %file.display());
            let _guard = span.enter();

            let report = load_report(&file, &cfg)?;
            info!(
                company = %report.company.name,
                items = report.summary.total_items,
                "Report formatted"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            println!();
            println!("{}", generate_summary(&report));
            println!("{}", generate_detailed_brand_report(&report, &matcher));
        }
        Commands::Lines { file } => {
            let span = tracing::info_span!("lines", file = %file.display());
            let _guard = span.enter();

            let text = match read_input(&file, &cfg)? {
                Input::Text(text) | Input::Json(text) => text,
            };
            let lines = extract_inventory_lines(&text, cfg.heuristics.max_inventory_lines);
            println!("{}", serde_json::to_string_pretty(&lines)?);
        }
        Commands::Brands => {
            let snapshot = matcher.catalog().snapshot()?;
            for division in snapshot.divisions() {
                println!("{} ({})", division.name, division.id);
                for brand in &division.brands {
                    if brand.aliases.is_empty() {
                        println!("  {}", brand.name);
                    } else {
                        println!("  {} [{}]", brand.name, brand.aliases.join(", "));
                    }
                }
            }
            info!(brands = snapshot.brand_count(), "Catalog listed");
        }
    }

    Ok(())
}

/// What a report file turned out to hold.
enum Input {
    Text(String),
    Json(String),
}

fn read_input(path: &Path, cfg: &Config) -> Result<Input, Box<dyn std::error::Error>> {
    let bytes = source::load_document(path, cfg.source.max_file_mb)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let input = match extension.as_deref() {
        Some("json") => Input::Json(String::from_utf8_lossy(&bytes).into_owned()),
        Some("pdf") => {
            let doc = PdfDocument::from_bytes(&bytes);
            let picked = source::select_content(&doc, cfg.source.min_extraction_chars)?;
            match picked.method {
                ExtractionMethod::Structured => Input::Json(picked.content),
                _ => Input::Text(picked.content),
            }
        }
        _ => Input::Text(String::from_utf8_lossy(&bytes).into_owned()),
    };
    Ok(input)
}

fn load_report(
    path: &Path,
    cfg: &Config,
) -> Result<FormattedStockReport, Box<dyn std::error::Error>> {
    let report = match read_input(path, cfg)? {
        Input::Json(raw) => {
            // malformed JSON still goes through the lenient decoder
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            format_or_fallback(&value)
        }
        Input::Text(text) => format_text(&text),
    };
    Ok(report)
}
