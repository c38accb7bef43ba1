//! Mesh file I/O for STL (binary and ASCII).

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::error::{QuoteError, QuoteResult};
use crate::tracing_ext::OperationTimer;
use crate::{Mesh, Vertex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                _ => None,
            })
    }
}

/// Load a mesh from disk. Only `.stl` files are accepted.
pub fn load_mesh(path: &Path) -> QuoteResult<Mesh> {
    MeshFormat::from_path(path).ok_or_else(|| QuoteError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!("Loading mesh from {:?}", path);

    let bytes = std::fs::read(path).map_err(|e| QuoteError::io_read(path, e))?;
    load_stl_bytes(&bytes)
}

/// Parse an in-memory STL file (binary or ASCII) into a mesh.
///
/// Fails with [`QuoteError::ParseError`] when the bytes are empty, malformed,
/// or contain no usable triangle. Does not center or otherwise modify the
/// geometry.
pub fn load_stl_bytes(bytes: &[u8]) -> QuoteResult<Mesh> {
    let timer = OperationTimer::new("load_stl");
    let _span = timer.span().enter();

    if bytes.is_empty() {
        return Err(QuoteError::parse_error("file is empty"));
    }

    let mut reader = Cursor::new(bytes);

    // stl_io::read_stl returns an IndexedMesh with vertices and indexed faces
    let stl = stl_io::read_stl(&mut reader).map_err(|e| QuoteError::parse_error(e.to_string()))?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());

    for (index, v) in stl.vertices.iter().enumerate() {
        let [x, y, z] = v.0;
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(QuoteError::parse_error(format!(
                "vertex {} has a non-finite coordinate ({}, {}, {})",
                index, x, y, z
            )));
        }
        mesh.vertices
            .push(Vertex::from_coords(x as f64, y as f64, z as f64));
    }

    let mut skipped = 0usize;
    for face in &stl.faces {
        let [a, b, c] = face.vertices;
        if a >= mesh.vertices.len() || b >= mesh.vertices.len() || c >= mesh.vertices.len() {
            return Err(QuoteError::parse_error(format!(
                "triangle references vertex outside of {} vertices",
                mesh.vertices.len()
            )));
        }

        // Collapsed triangles carry no surface
        if a == b || b == c || a == c {
            skipped += 1;
            continue;
        }
        mesh.faces.push([a as u32, b as u32, c as u32]);
    }

    if skipped > 0 {
        warn!("Skipped {} collapsed triangles", skipped);
    }

    if mesh.is_empty() {
        return Err(QuoteError::parse_error("no triangles recoverable"));
    }

    if let Some((min, max)) = mesh.bounds() {
        let dims = max - min;
        info!(
            "Loaded mesh: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        debug!(
            "Bounding box: [{:.1}, {:.1}, {:.1}] to [{:.1}, {:.1}, {:.1}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );

        let max_dim = dims.x.max(dims.y).max(dims.z);
        if max_dim < 0.1 {
            warn!(
                "Mesh largest dimension is {:.6} mm - may be in meters",
                max_dim
            );
        }
    }

    Ok(mesh)
}

/// Save mesh to STL file (binary format).
pub fn save_stl(mesh: &Mesh, path: &Path) -> QuoteResult<()> {
    info!("Saving mesh to {:?}", path);

    let file = File::create(path).map_err(|e| QuoteError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    write_stl(mesh, &mut writer).map_err(|e| QuoteError::io_write(path, e))?;

    writer.flush().map_err(|e| QuoteError::io_write(path, e))?;

    info!("Saved {} triangles to {:?}", mesh.face_count(), path);

    Ok(())
}

/// Write a mesh as binary STL to any writer.
pub fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|tri| {
            let n = tri.normal().unwrap_or_else(Vector3::zeros);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([tri.v0.x as f32, tri.v0.y as f32, tri.v0.z as f32]),
                    stl_io::Vertex::new([tri.v1.x as f32, tri.v1.y as f32, tri.v1.z as f32]),
                    stl_io::Vertex::new([tri.v2.x as f32, tri.v2.y as f32, tri.v2.z as f32]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}
