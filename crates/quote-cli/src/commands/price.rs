//! quote price command - price a model at a chosen size.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use quote_engine::{Axis, DisplayDimensions, Quote, QuoteSession, QuoteSummary};
use serde::Serialize;
use tracing::info;

use crate::{Cli, OutputFormat, output};

/// How the model should be resized before pricing.
pub enum Resize<'a> {
    /// Set the displayed length of one axis (raw user text).
    Dimension(Axis, &'a str),
    /// Apply a uniform scale factor.
    Uniform(f64),
}

pub struct PriceArgs<'a> {
    pub material: &'a str,
    pub color: Option<&'a str>,
    pub resize: Option<Resize<'a>>,
    pub discount: Option<&'a str>,
}

/// Quote without a color: priced, but not confirmable.
#[derive(Serialize)]
struct DraftQuote {
    file_name: String,
    material_id: String,
    dimensions: DisplayDimensions,
    quote: Quote,
    currency: String,
    missing: Vec<String>,
}

pub fn run(input: &Path, args: &PriceArgs<'_>, cli: &Cli) -> Result<()> {
    let catalog = cli.load_catalog()?;
    let mut session = QuoteSession::new(catalog);

    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read model from {:?}", input))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    session.load(file_name, &bytes)?;

    match args.resize {
        Some(Resize::Dimension(axis, value)) => {
            session.set_dimension_input(axis, value)?;
        }
        Some(Resize::Uniform(factor)) => {
            session.set_uniform_scale(factor)?;
        }
        None => {}
    }

    session.select_material(args.material)?;
    if let Some(color) = args.color {
        session.select_color(color)?;
    }
    if let Some(code) = args.discount {
        session.set_discount_code(code);
    }

    if args.color.is_some() {
        let summary = session.confirm()?;
        info!("Confirmed quote for {}", summary.file_name);
        print_summary(&summary, cli);
    } else {
        let draft = draft(&session).context("Model could not be priced")?;
        print_draft(&draft, cli);
    }

    Ok(())
}

fn draft(session: &QuoteSession) -> Option<DraftQuote> {
    Some(DraftQuote {
        file_name: session.file_name()?.to_string(),
        material_id: session.material()?.id.clone(),
        dimensions: session.display_dimensions()?,
        quote: session.quote()?,
        currency: session.pricing().currency.clone(),
        missing: vec!["color".to_string()],
    })
}

fn print_summary(summary: &QuoteSummary, cli: &Cli) {
    match cli.format {
        OutputFormat::Json => output::print(summary, cli.format, cli.quiet),
        OutputFormat::Text => {
            if cli.quiet {
                return;
            }
            let money = |m| output::format_money(m, &summary.currency);
            let d = &summary.dimensions;

            println!("{}", "Quote".bold().underline());
            println!("  {}: {}", "File".cyan(), summary.file_name);
            println!("  {}: {}", "Material".cyan(), summary.material_name);
            println!("  {}: {}", "Color".cyan(), summary.color);
            println!(
                "  {}: {:.2} x {:.2} x {:.2} {}",
                "Dimensions".cyan(),
                d.x,
                d.y,
                d.z,
                d.unit
            );
            if let Some(code) = &summary.discount_code {
                println!("  {}: {}", "Discount code".cyan(), code);
            }
            println!("  {}: {}", "Item price".cyan(), money(summary.item_price));
            println!("  {}: {}", "Shipping".cyan(), money(summary.shipping_cost));
            println!(
                "  {}: {}",
                "Total".green().bold(),
                money(summary.total).as_str().bold()
            );
        }
    }
}

fn print_draft(draft: &DraftQuote, cli: &Cli) {
    match cli.format {
        OutputFormat::Json => output::print(draft, cli.format, cli.quiet),
        OutputFormat::Text => {
            if cli.quiet {
                return;
            }
            let money = |m| output::format_money(m, &draft.currency);
            let quote = &draft.quote;

            println!("{}", "Draft Quote".bold().underline());
            println!("  {}: {}", "File".cyan(), draft.file_name);
            println!("  {}: {}", "Material".cyan(), draft.material_id);
            println!("  {}: {}", "Dimensions".cyan(), draft.dimensions);
            println!("  {}: {:.2} cm³", "Volume".cyan(), quote.volume_cm3);
            if quote.floor_applied {
                println!(
                    "  {}: {} (minimum price, volume price {})",
                    "Item price".cyan(),
                    money(quote.item_price),
                    money(quote.raw_price)
                );
            } else {
                println!("  {}: {}", "Item price".cyan(), money(quote.item_price));
            }
            println!("  {}: {}", "Shipping".cyan(), money(quote.shipping_cost));
            println!("  {}: {}", "Total".green().bold(), money(quote.total).as_str().bold());
            println!(
                "  {}: choose a color with --color to confirm",
                "Note".yellow()
            );
        }
    }
}
