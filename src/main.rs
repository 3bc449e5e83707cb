use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use xtractor::classifier::matching_rule;
use xtractor::{classify_line, Extraction, Extractor, ExtractorConfig, WarningKind};

#[derive(Parser)]
#[command(name = "xtractor", version, about = "Extract the State → LGA → Ward hierarchy from INEC registers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the hierarchy from a PDF, JSON page dump, or text file
    Extract {
        input: PathBuf,

        /// Extractor configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Infer state changes from LGA code resets over the Nigerian state roster
        #[arg(long)]
        infer_states: bool,

        /// Write the hierarchy as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the hierarchy as flat CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the run summary as JSON
        #[arg(long)]
        summary: bool,
    },
    /// Show how individual lines are classified
    Classify {
        #[arg(required = true)]
        lines: Vec<String>,

        /// Extractor configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            config,
            infer_states,
            json,
            csv,
            summary,
        } => {
            let mut config = load_config(config)?;
            if infer_states && !config.infers_states() {
                config = config.with_nigerian_roster();
            }
            run_extract(&input, config, json, csv, summary)
        }
        Commands::Classify { lines, config } => {
            let config = load_config(config)?;
            for line in &lines {
                let event = classify_line(line, &config.classifier);
                let rule = matching_rule(line, &config.classifier).unwrap_or("-");
                match event.detection() {
                    Some(d) => println!(
                        "{:<8} {:<30} code={:<8} rule={}  ← {:?}",
                        event.kind().map_or("?", |k| k.as_str()),
                        d.name,
                        d.code.as_deref().unwrap_or("-"),
                        rule,
                        line
                    ),
                    None => println!("{:<8} {:<30} {:<13} rule={}  ← {:?}", "-", "", "", rule, line),
                }
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ExtractorConfig> {
    match path {
        Some(path) => ExtractorConfig::from_file(&path),
        None => Ok(ExtractorConfig::default()),
    }
}

fn run_extract(
    input: &Path,
    config: ExtractorConfig,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
    print_summary: bool,
) -> Result<()> {
    println!("🗳️  Extracting electoral hierarchy");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("\n📂 Reading {}...", input.display());

    let extraction = Extractor::new(config)
        .extract_file(input)
        .with_context(|| format!("Failed to extract {}", input.display()))?;

    print_stats(&extraction);

    // Export failures do not invalidate the extraction; report each and carry on
    let mut export_failed = false;
    if let Some(path) = json {
        match extraction.write_json(&path) {
            Ok(()) => println!("✓ JSON written to {}", path.display()),
            Err(e) => {
                eprintln!("❌ {}", e);
                export_failed = true;
            }
        }
    }
    if let Some(path) = csv {
        match extraction.write_csv(&path) {
            Ok(()) => println!("✓ CSV written to {}", path.display()),
            Err(e) => {
                eprintln!("❌ {}", e);
                export_failed = true;
            }
        }
    }

    if print_summary {
        println!("\n{}", serde_json::to_string_pretty(&extraction.summary)?);
    }

    if export_failed {
        anyhow::bail!("one or more exports failed");
    }
    Ok(())
}

fn print_stats(extraction: &Extraction) {
    let summary = &extraction.summary;

    println!("✓ {} pages read ({})", summary.pages_read, summary.document.format.name());
    println!("✓ {} lines, {} table rows, {} classified", summary.lines_seen, summary.rows_seen, summary.events_classified);

    println!("\n📊 Hierarchy");
    println!("   States: {}", summary.stats.total_states);
    println!("   LGAs:   {}", summary.stats.total_lgas);
    println!("   Wards:  {}", summary.stats.total_wards);
    println!("   Duplicates discarded: {}", summary.duplicates_discarded);
    println!("   Codes merged:         {}", summary.codes_merged);

    for state in &extraction.hierarchy.states {
        println!("   • {} ({} LGAs, {} wards)", state.name, state.lgas.len(), state.ward_count());
    }

    if !summary.warnings.is_empty() {
        println!("\n⚠️  Warnings: {}", summary.warnings.len());
        println!("   Unreadable pages: {}", summary.count_warnings(WarningKind::PageRead));
        println!("   Orphan records:   {}", summary.count_warnings(WarningKind::OrphanRecord));
        println!("   State inference:  {}", summary.count_warnings(WarningKind::StateInference));
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Extraction complete in {} ms", summary.duration_ms());
}
