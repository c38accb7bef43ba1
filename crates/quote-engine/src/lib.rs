//! Dimensioning and pricing of 3D print jobs.
//!
//! This crate turns an uploaded triangle mesh into a priced print quote:
//! it measures the model, lets the user resize it, and prices the result by
//! bounding volume, material and a fixed shipping charge.
//!
//! # Features
//!
//! - **Loading**: Parse binary and ASCII STL from a file or from raw bytes
//! - **Normalization**: Center the model at the origin and record its base size
//! - **Scaling**: Resize by typing one displayed dimension; the others follow
//! - **Pricing**: Volume-based item price with a floor, plus flat shipping
//! - **Summaries**: Freeze a complete configuration for confirmation or export
//!
//! # Units
//!
//! **All lengths are millimeters.** Mesh coordinates are taken as-is, without
//! any unit detection. Prices are computed from volumes in cubic centimeters
//! (`mm³ / 1000`) and expressed in the catalog's single currency.
//!
//! # Pricing Rule
//!
//! ```text
//! volume_cm3 = x * y * z / 1000      (displayed, rounded dimensions)
//! item_price = max(volume_cm3 * rate, min_price)
//! total      = item_price + shipping_cost
//! ```
//!
//! Pricing uses the *bounding box*, not the enclosed volume of the mesh.
//!
//! # Quick Start
//!
//! ```no_run
//! use quote_engine::{Axis, Catalog, QuoteSession};
//!
//! let bytes = std::fs::read("bracket.stl").unwrap();
//!
//! let mut session = QuoteSession::new(Catalog::default());
//! session.load("bracket.stl", &bytes).unwrap();
//!
//! // Make it 80 mm wide; depth and height follow
//! session.set_dimension(Axis::X, 80.0).unwrap();
//! session.select_material("pla").unwrap();
//! session.select_color("Naranja").unwrap();
//!
//! println!("Total: {:.0}", session.grand_total().amount());
//! let summary = session.confirm().unwrap();
//! println!("{}", summary.to_json().unwrap());
//! ```
//!
//! # Lower-level API
//!
//! Each step is also available on its own:
//!
//! ```no_run
//! use quote_engine::{Catalog, Mesh, ScaleController, normalize, price};
//!
//! let mesh = Mesh::load("bracket.stl").unwrap();
//! let model = normalize(mesh).unwrap();
//!
//! let mut scale = ScaleController::new(model.base_size);
//! scale.set_uniform_scale(1.5).unwrap();
//!
//! let catalog = Catalog::default();
//! let quote = price(
//!     &scale.display_dimensions(),
//!     catalog.material("resin"),
//!     &catalog.pricing,
//! );
//! println!("{:?}", quote);
//! ```

mod error;
pub mod tracing_ext;
mod types;

pub mod catalog;
pub mod io;
pub mod normalize;
pub mod pricing;
pub mod scale;
pub mod session;
pub mod summary;

pub use error::{ConfigField, ErrorCode, QuoteError, QuoteResult, RecoverySuggestion};
pub use types::{Mesh, Triangle, Vertex};

pub use io::{MeshFormat, load_mesh, load_stl_bytes, save_stl, write_stl};

pub use catalog::{Catalog, Material, PricingParams};
pub use normalize::{BaseSize, Dimensions, NormalizedModel, dimensions, normalize};
pub use pricing::{Money, Quote, apply_discount, normalize_discount_code, price};
pub use scale::{Axis, DisplayDimensions, ScaleController, ScaleState};
pub use session::{
    LoadOutcome, LoadState, LoadTicket, PreparedModel, QuoteSession, prepare_model,
};
pub use summary::{QuoteSummary, SummaryDimensions, SummaryInput, build_summary};

pub use tracing_ext::{
    OperationTimer, log_mesh_stats, log_perf_section, log_quote, log_rejected_edit,
};

// Convenience methods on Mesh
impl Mesh {
    /// Load a mesh from a file. Only STL is accepted.
    pub fn load(path: impl AsRef<std::path::Path>) -> QuoteResult<Self> {
        io::load_mesh(path.as_ref())
    }

    /// Save the mesh as binary STL.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> QuoteResult<()> {
        io::save_stl(self, path.as_ref())
    }

    /// Measure the axis-aligned bounding box.
    pub fn dimensions(&self) -> Dimensions {
        normalize::dimensions(self)
    }
}
