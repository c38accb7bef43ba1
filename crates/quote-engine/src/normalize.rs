//! Bounding-box dimensions and model centering.
//!
//! A loaded mesh is translated so that its bounding-box center sits on the
//! origin, and the extents of that box become the model's [`BaseSize`]: the
//! unscaled width, depth and height every later edit and price refers to.
//!
//! # Example
//!
//! ```
//! use quote_engine::{Mesh, Vertex};
//! use quote_engine::normalize::normalize;
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(40.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 20.0, 10.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let model = normalize(mesh).unwrap();
//! assert_eq!(model.base_size.x(), 40.0);
//! assert_eq!(model.base_size.y(), 20.0);
//! assert_eq!(model.base_size.z(), 10.0);
//! ```

use nalgebra::{Point3, Vector3};
use serde::Serialize;
use tracing::{debug, info};

use crate::Mesh;
use crate::error::{QuoteError, QuoteResult};
use crate::scale::Axis;
use crate::tracing_ext::{OperationTimer, log_mesh_stats};

/// Result of dimension extraction.
#[derive(Debug, Clone)]
pub struct Dimensions {
    /// Bounding box minimum point.
    pub min: Point3<f64>,
    /// Bounding box maximum point.
    pub max: Point3<f64>,
    /// Width (X dimension).
    pub width: f64,
    /// Depth (Y dimension).
    pub depth: f64,
    /// Height (Z dimension).
    pub height: f64,
    /// Volume of bounding box.
    pub bounding_volume: f64,
    /// Center of bounding box.
    pub center: Point3<f64>,
}

/// Extract the bounding-box dimensions of a mesh.
pub fn dimensions(mesh: &Mesh) -> Dimensions {
    let Some((min, max)) = mesh.bounds() else {
        return Dimensions {
            min: Point3::origin(),
            max: Point3::origin(),
            width: 0.0,
            depth: 0.0,
            height: 0.0,
            bounding_volume: 0.0,
            center: Point3::origin(),
        };
    };

    let width = max.x - min.x;
    let depth = max.y - min.y;
    let height = max.z - min.z;

    Dimensions {
        min,
        max,
        width,
        depth,
        height,
        bounding_volume: width * depth * height,
        center: nalgebra::center(&min, &max),
    }
}

/// Unscaled extents of a centered model, in millimeters.
///
/// Every component is strictly positive. A `BaseSize` is fixed for the
/// lifetime of the model it was measured from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseSize {
    x: f64,
    y: f64,
    z: f64,
}

impl BaseSize {
    /// Build a base size, rejecting any extent that is not a positive number.
    pub fn new(x: f64, y: f64, z: f64) -> QuoteResult<Self> {
        for (axis, extent) in [(Axis::X, x), (Axis::Y, y), (Axis::Z, z)] {
            if !(extent.is_finite() && extent > 0.0) {
                return Err(QuoteError::degenerate_mesh(axis, extent));
            }
        }
        Ok(Self { x, y, z })
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Extent along one axis.
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// A centered mesh together with the base size measured from it.
#[derive(Debug, Clone)]
pub struct NormalizedModel {
    /// Mesh translated so its bounding-box center is the origin.
    pub mesh: Mesh,
    /// Extents of the centered bounding box.
    pub base_size: BaseSize,
}

/// Center a mesh on the origin and measure its base size.
///
/// Translation only: no rotation or scaling is applied. Fails with
/// [`QuoteError::DegenerateMesh`] when any extent is zero, since such a model
/// has no volume to price.
pub fn normalize(mut mesh: Mesh) -> QuoteResult<NormalizedModel> {
    let timer = OperationTimer::with_mesh("normalize", &mesh);
    let _span = timer.span().enter();

    if mesh.is_empty() {
        return Err(QuoteError::parse_error("mesh has no triangles"));
    }

    let before = dimensions(&mesh);
    debug!(
        "Centering mesh: offset ({:.3}, {:.3}, {:.3})",
        -before.center.x, -before.center.y, -before.center.z
    );
    mesh.translate(-before.center.coords);

    // Extents are measured again after the move so BaseSize describes the
    // mesh exactly as the renderer will receive it.
    let after = dimensions(&mesh);
    let base_size = BaseSize::new(after.width, after.depth, after.height)?;

    info!(
        "Normalized model: {:.2} x {:.2} x {:.2} mm",
        base_size.x, base_size.y, base_size.z
    );
    log_mesh_stats(&mesh, "normalized");

    Ok(NormalizedModel { mesh, base_size })
}
