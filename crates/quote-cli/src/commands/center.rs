//! quote center command - write the model centered on the origin.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use quote_engine::{Mesh, normalize};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct CenterResult {
    input: String,
    output: String,
    offset: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(input: &Path, output_path: &Path, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load model from {:?}", input))?;
    let center = mesh.dimensions().center;

    let model = normalize(mesh)?;
    model
        .mesh
        .save(output_path)
        .with_context(|| format!("Failed to save model to {:?}", output_path))?;

    let result = CenterResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        offset: [-center.x, -center.y, -center.z],
        dimensions: [
            model.base_size.x(),
            model.base_size.y(),
            model.base_size.z(),
        ],
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                println!(
                    "{} {} -> {}",
                    "Centered".green().bold(),
                    result.input,
                    result.output
                );
                println!(
                    "  {}: ({:.3}, {:.3}, {:.3})",
                    "Offset".cyan(),
                    result.offset[0],
                    result.offset[1],
                    result.offset[2]
                );
                println!(
                    "  {}: {:.2} x {:.2} x {:.2} mm",
                    "Dimensions".cyan(),
                    result.dimensions[0],
                    result.dimensions[1],
                    result.dimensions[2]
                );
            }
        }
    }

    Ok(())
}
