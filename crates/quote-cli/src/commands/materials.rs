//! quote materials command - list the catalog.

use anyhow::Result;
use colored::Colorize;
use quote_engine::Money;

use crate::{Cli, OutputFormat, output};

pub fn run(cli: &Cli) -> Result<()> {
    let catalog = cli.load_catalog()?;

    match cli.format {
        OutputFormat::Json => {
            output::print(&catalog, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                let pricing = &catalog.pricing;
                println!("{}", "Materials".bold().underline());
                for material in &catalog.materials {
                    println!(
                        "  {} {} - {}",
                        material.id.cyan().bold(),
                        material.name,
                        material.description
                    );
                    println!(
                        "    {}: {} per cm³",
                        "Rate".cyan(),
                        output::format_money(Money::new(material.rate), &pricing.currency)
                    );
                    println!("    {}: {}", "Colors".cyan(), material.colors.join(", "));
                }
                println!();
                println!(
                    "  {}: {}",
                    "Minimum price".cyan(),
                    output::format_money(Money::new(pricing.min_price), &pricing.currency)
                );
                println!(
                    "  {}: {}",
                    "Shipping".cyan(),
                    output::format_money(Money::new(pricing.shipping_cost), &pricing.currency)
                );
            }
        }
    }

    Ok(())
}
