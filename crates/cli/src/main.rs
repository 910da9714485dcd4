//! Command-line front end for product analysis.
//!
//! Usage:
//!     cleanlabel scan 0049000028911
//!     cleanlabel analyze product.json --format json
//!     cleanlabel lookup "sodium benzoate"

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cleanlabel_backend_openfoodfacts::{
    parse_product, OpenFoodFactsConfig, OpenFoodFactsSource, ProductSource,
};
use cleanlabel_explain::{
    describe_sodium, explain_flag, explain_sneaky, summarize_result, UNKNOWN_INGREDIENT_MESSAGE,
};
use cleanlabel_intel::lookup_ingredient;
use cleanlabel_model::{AnalysisResult, Impact, Product, ScanOutcome};
use cleanlabel_score::analyze_product;

#[derive(Parser)]
#[command(name = "cleanlabel")]
#[command(about = "Analyze packaged food ingredient lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// OpenFoodFacts product API URL
    #[arg(long, global = true, default_value = "https://world.openfoodfacts.org/api/v2/product")]
    off_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a product by barcode and analyze it
    Scan {
        /// EAN/UPC barcode
        barcode: String,
    },

    /// Analyze a product JSON file (normalized or raw OpenFoodFacts response)
    Analyze {
        /// Path to the JSON file
        path: String,
    },

    /// Look up an ingredient in the knowledge base
    Lookup {
        /// Ingredient name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cleanlabel=debug".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { barcode } => {
            let config = OpenFoodFactsConfig {
                base_url: cli.off_url,
                timeout_secs: cli.timeout_secs,
                ..Default::default()
            };
            let source = OpenFoodFactsSource::new(config)?;
            run_scan(&source, &barcode, cli.format).await?;
        }
        Commands::Analyze { path } => {
            run_analyze(&path, cli.format)?;
        }
        Commands::Lookup { name } => {
            run_lookup(&name, cli.format)?;
        }
    }

    Ok(())
}

async fn run_scan<S: ProductSource>(source: &S, barcode: &str, format: Format) -> Result<()> {
    tracing::info!(source = source.name(), barcode, "Scanning product");

    let outcome = match source.fetch(barcode).await {
        Ok(product) => ScanOutcome::Analyzed(Box::new(analyze_product(&product))),
        Err(e) => {
            tracing::warn!(error = %e, "Product fetch failed");
            ScanOutcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };

    print_outcome(&outcome, format)?;

    if outcome.result().is_none() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_analyze(path: &str, format: Format) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {path}"))?;

    let product = if json.get("product").is_some() {
        let code = json.get("code").and_then(|c| c.as_str()).unwrap_or("unknown");
        parse_product(code, &json)?
    } else {
        serde_json::from_value::<Product>(json).context("Not a product document")?
    };

    let outcome = ScanOutcome::Analyzed(Box::new(analyze_product(&product)));
    print_outcome(&outcome, format)
}

fn run_lookup(name: &str, format: Format) -> Result<()> {
    let record = lookup_ingredient(name);

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    match record {
        Some(record) => {
            println!("{} [{}]", record.name, record.concern_level.label());
            println!("{}", record.definition);
            if !record.why_used.is_empty() {
                println!("\nWhy it's used: {}", record.why_used.join("; "));
            }
            if !record.why_concerned.is_empty() {
                println!("Why it matters: {}", record.why_concerned.join("; "));
            }
            if !record.better_alternatives.is_empty() {
                println!("Better options: {}", record.better_alternatives.join(", "));
            }
            for citation in &record.citations {
                println!("  - {} <{}>", citation.label, citation.url);
            }
        }
        None => {
            println!("{name}: insufficient data");
            println!("{UNKNOWN_INGREDIENT_MESSAGE}");
        }
    }

    Ok(())
}

fn print_outcome(outcome: &ScanOutcome, format: Format) -> Result<()> {
    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        ScanOutcome::Analyzed(result) => print_result(result),
        ScanOutcome::Failed { kind, message } => {
            println!("{}", kind.title());
            println!("{message}");
            if kind.offers_manual_search() {
                println!("Try searching for the product by name instead.");
            }
        }
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) {
    let product = &result.product;
    println!("{} - {} ({})", product.name, product.brand, product.code);
    println!("{}", summarize_result(result));
    println!("---");

    println!("Score: {}", result.score.label());
    for item in &result.breakdown {
        let marker = match item.impact {
            Impact::Positive => '+',
            Impact::Neutral => '~',
            Impact::Negative => '-',
        };
        println!("   {marker} {}", item.label);
    }

    if !result.flags.is_empty() {
        println!("\nFlagged ingredients:");
        for (i, flag) in result.flags.iter().enumerate() {
            let explanation = explain_flag(flag);
            println!("{}. {}", i + 1, explanation.summary);
            println!("   {}", explanation.detail);
        }
    }

    if !result.sneaky.is_empty() {
        println!("\nSneaky ingredients:");
        for sneaky in &result.sneaky {
            let explanation = explain_sneaky(sneaky);
            println!(" * {}", explanation.summary);
            println!("   {}", explanation.detail);
        }
    }

    println!("\nSodium: {}", describe_sodium(result.sodium.as_ref()));

    if !result.alternatives.is_empty() {
        println!("\nBetter alternatives:");
        for alternative in &result.alternatives {
            println!(" * {}: {}", alternative.name, alternative.why);
        }
    }
}
