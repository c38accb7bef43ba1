//! quote info command - display model dimensions.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use quote_engine::{Mesh, normalize};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct ModelInfo {
    path: String,
    vertices: usize,
    faces: usize,
    /// Extents in mm, which are also the base size the model is priced from.
    dimensions: [f64; 3],
    min: [f64; 3],
    max: [f64; 3],
    bounding_volume_cm3: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_cm3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    surface_area_mm2: Option<f64>,
}

pub fn run(input: &Path, detailed: bool, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load model from {:?}", input))?;
    let dims = mesh.dimensions();

    // Fails for flat models, which could not be quoted either
    let model = normalize(mesh)?;

    let info = ModelInfo {
        path: input.display().to_string(),
        vertices: model.mesh.vertex_count(),
        faces: model.mesh.face_count(),
        dimensions: [
            model.base_size.x(),
            model.base_size.y(),
            model.base_size.z(),
        ],
        min: [dims.min.x, dims.min.y, dims.min.z],
        max: [dims.max.x, dims.max.y, dims.max.z],
        bounding_volume_cm3: dims.bounding_volume / 1000.0,
        volume_cm3: detailed.then(|| model.mesh.volume().abs() / 1000.0),
        surface_area_mm2: detailed.then(|| model.mesh.surface_area()),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Model Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Vertices".cyan(), info.vertices);
                println!("  {}: {}", "Faces".cyan(), info.faces);
                println!(
                    "  {}: {:.2} x {:.2} x {:.2} mm",
                    "Dimensions".cyan(),
                    info.dimensions[0],
                    info.dimensions[1],
                    info.dimensions[2]
                );
                println!(
                    "  {}: ({:.2}, {:.2}, {:.2})",
                    "Min bounds".cyan(),
                    info.min[0],
                    info.min[1],
                    info.min[2]
                );
                println!(
                    "  {}: ({:.2}, {:.2}, {:.2})",
                    "Max bounds".cyan(),
                    info.max[0],
                    info.max[1],
                    info.max[2]
                );
                println!(
                    "  {}: {:.2} cm³",
                    "Bounding volume".cyan(),
                    info.bounding_volume_cm3
                );

                if let Some(vol) = info.volume_cm3 {
                    println!("  {}: {:.2} cm³", "Mesh volume".cyan(), vol);
                }
                if let Some(area) = info.surface_area_mm2 {
                    println!("  {}: {:.2} mm²", "Surface area".cyan(), area);
                }
            }
        }
    }

    Ok(())
}
