//! quote-cli: Command-line front end for 3D print quotes.
//!
//! This tool exposes the quote-engine from the command line: inspect a model,
//! list the material catalog, price a model at a chosen size, and write out
//! the centered mesh.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=quote_engine=info` - Basic operation logging
//! - `RUST_LOG=quote_engine=debug` - Scale edits and selections
//! - `RUST_LOG=quote_engine::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Price a model 80 mm wide in white resin
//! quote price bracket.stl --material resin --color Blanco --axis x --value 80
//!
//! # Same, as JSON, with a custom catalog
//! quote --format json --catalog shop.json price bracket.stl -m pla -c Naranja
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use quote_engine::{Axis, Catalog};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{center, info, materials, price};

/// quote - Dimension and price 3D models for printing.
///
/// Load an STL model, resize it, choose a material and color, and get a quote.
#[derive(Parser)]
#[command(name = "quote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Material catalog (JSON) to use instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display model dimensions and statistics
    Info {
        /// Input STL file
        input: PathBuf,

        /// Show mesh volume and surface area
        #[arg(long)]
        detailed: bool,
    },

    /// List materials, rates and colors
    Materials,

    /// Price a model
    Price {
        /// Input STL file
        input: PathBuf,

        /// Material id (see `quote materials`)
        #[arg(long, short)]
        material: String,

        /// Color offered for the material
        #[arg(long, short)]
        color: Option<String>,

        /// Axis whose displayed length is set with --value
        #[arg(long, requires = "value", value_parser = parse_axis)]
        axis: Option<Axis>,

        /// Displayed length of --axis in mm; the other axes follow
        #[arg(long, requires = "axis", conflicts_with = "scale")]
        value: Option<String>,

        /// Uniform scale factor
        #[arg(long)]
        scale: Option<f64>,

        /// Discount code to record with the quote
        #[arg(long)]
        discount: Option<String>,
    },

    /// Write the model centered on the origin
    Center {
        /// Input STL file
        input: PathBuf,

        /// Output STL file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_axis(s: &str) -> std::result::Result<Axis, String> {
    s.parse::<Axis>().map_err(|e| e.to_string())
}

impl Cli {
    /// The catalog in effect: `--catalog` if given, otherwise the built-in one.
    fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("Failed to load catalog from {:?}", path)),
            None => Ok(Catalog::default()),
        }
    }
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "quote_engine=info,quote=info",
            2 => "quote_engine=debug,quote=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input, detailed } => info::run(input, *detailed, &cli),
        Commands::Materials => materials::run(&cli),
        Commands::Price {
            input,
            material,
            color,
            axis,
            value,
            scale,
            discount,
        } => price::run(
            input,
            &price::PriceArgs {
                material,
                color: color.as_deref(),
                resize: match (axis, value, scale) {
                    (Some(axis), Some(value), _) => Some(price::Resize::Dimension(*axis, value)),
                    (_, _, Some(factor)) => Some(price::Resize::Uniform(*factor)),
                    _ => None,
                },
                discount: discount.as_deref(),
            },
            &cli,
        ),
        Commands::Center { input, output } => center::run(input, output, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(quote_err) = e.downcast_ref::<quote_engine::QuoteError>() {
                eprintln!("{}: {}", "Error".red().bold(), quote_err);
                eprintln!("  {}: {}", "Code".cyan(), quote_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    quote_err.recovery_suggestion()
                );
                if let Some(location) = quote_err.location() {
                    eprintln!("  {}: {}", "Location".yellow(), location.display());
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
