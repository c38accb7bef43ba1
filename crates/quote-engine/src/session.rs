//! One user's quoting session.
//!
//! The session owns every piece of mutable state (loaded model, scale,
//! material, color, discount code) and derives dimensions and prices from it
//! on every read. Several sessions can live side by side; none of them share
//! state.
//!
//! # Loading
//!
//! Parsing a model can be slow, so loading is split in three steps:
//!
//! 1. [`QuoteSession::begin_load`] hands out a [`LoadTicket`] and drops the
//!    current model. Until the load completes the session reports no model.
//! 2. [`prepare_model`] does the parsing and centering. It touches no session
//!    state and can run on any thread.
//! 3. [`QuoteSession::complete_load`] installs the result, but only if its
//!    ticket is the newest one handed out. Results of superseded loads are
//!    dropped.
//!
//! [`QuoteSession::load`] runs all three steps in place.
//!
//! ```no_run
//! use quote_engine::{Catalog, QuoteSession};
//!
//! let bytes = std::fs::read("bracket.stl").unwrap();
//! let mut session = QuoteSession::new(Catalog::default());
//! session.load("bracket.stl", &bytes).unwrap();
//! session.select_material("resin").unwrap();
//! session.select_color("Blanco").unwrap();
//! session.set_dimension(quote_engine::Axis::X, 80.0).unwrap();
//!
//! let summary = session.confirm().unwrap();
//! println!("{}", summary);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::Mesh;
use crate::catalog::{Catalog, Material, PricingParams};
use crate::error::{ConfigField, QuoteError, QuoteResult};
use crate::io::load_stl_bytes;
use crate::normalize::{BaseSize, NormalizedModel, normalize};
use crate::pricing::{Money, Quote, apply_discount, normalize_discount_code, price};
use crate::scale::{Axis, DisplayDimensions, ScaleController, ScaleState};
use crate::summary::{QuoteSummary, SummaryInput, build_summary};
use crate::tracing_ext::{log_perf_section, log_quote};

/// A parsed and centered model, ready to be installed into a session.
#[derive(Debug, Clone)]
pub struct PreparedModel {
    pub file_name: String,
    pub model: NormalizedModel,
}

/// Parse STL bytes and center the result.
///
/// Pure: no session is involved, so this can run off the interaction thread.
pub fn prepare_model(file_name: impl Into<String>, bytes: &[u8]) -> QuoteResult<PreparedModel> {
    let file_name = file_name.into();
    let mesh = load_stl_bytes(bytes)?;
    let model = normalize(mesh)?;
    Ok(PreparedModel { file_name, model })
}

/// Identifies one load request. Only the newest ticket can install a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The model is now the session's model.
    Installed,
    /// A newer load started in the meantime; the result was discarded.
    Superseded,
}

/// Whether a model is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Loaded,
}

#[derive(Debug)]
struct LoadedModel {
    file_name: String,
    mesh: Mesh,
    scale: ScaleController,
}

/// Explicit state holder for one quote.
#[derive(Debug)]
pub struct QuoteSession {
    catalog: Catalog,
    model: Option<LoadedModel>,
    latest_ticket: u64,
    pending: bool,
    material_id: Option<String>,
    color: Option<String>,
    discount_code: Option<String>,
}

impl QuoteSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            model: None,
            latest_ticket: 0,
            pending: false,
            material_id: None,
            color: None,
            discount_code: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pricing(&self) -> &PricingParams {
        &self.catalog.pricing
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start a new load, superseding any load still in flight.
    ///
    /// The current model is dropped immediately so no reader can observe a
    /// base size that does not belong to the newest request.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        self.pending = true;
        self.model = None;
        debug!("Load {} started", self.latest_ticket);
        LoadTicket(self.latest_ticket)
    }

    /// Finish the load identified by `ticket`.
    ///
    /// A stale ticket is ignored and reported as [`LoadOutcome::Superseded`],
    /// whatever its result. For the newest ticket, a successful result replaces
    /// the model and resets scale, material and color; a failed one leaves the
    /// session with no model and no configuration and returns the error.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: QuoteResult<PreparedModel>,
    ) -> QuoteResult<LoadOutcome> {
        if ticket.0 != self.latest_ticket || !self.pending {
            warn!(
                "Ignoring result of load {} (latest is {})",
                ticket.0, self.latest_ticket
            );
            return Ok(LoadOutcome::Superseded);
        }
        self.pending = false;

        let prepared = match result {
            Ok(prepared) => prepared,
            Err(e) => {
                self.material_id = None;
                self.color = None;
                return Err(e);
            }
        };
        let NormalizedModel { mesh, base_size } = prepared.model;

        info!(
            "Installed {:?}: {:.2} x {:.2} x {:.2} mm",
            prepared.file_name,
            base_size.x(),
            base_size.y(),
            base_size.z()
        );

        let decimals = self.catalog.pricing.display_decimals;
        self.model = Some(LoadedModel {
            file_name: prepared.file_name,
            mesh,
            scale: ScaleController::with_precision(base_size, decimals),
        });
        self.material_id = None;
        self.color = None;

        Ok(LoadOutcome::Installed)
    }

    /// Load and install a model synchronously.
    ///
    /// The file is parsed before anything is touched, so a failure keeps the
    /// current model and its configuration.
    pub fn load(&mut self, file_name: impl Into<String>, bytes: &[u8]) -> QuoteResult<()> {
        let prepared = prepare_model(file_name, bytes).inspect_err(|e| {
            warn!("Load rejected, keeping current model: {}", e);
        })?;
        let ticket = self.begin_load();
        self.complete_load(ticket, Ok(prepared)).map(|_| ())
    }

    pub fn load_state(&self) -> LoadState {
        if self.pending {
            LoadState::Loading
        } else if self.model.is_some() {
            LoadState::Loaded
        } else {
            LoadState::Empty
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.file_name.as_str())
    }

    /// The centered mesh, for a renderer.
    pub fn centered_mesh(&self) -> Option<&Mesh> {
        self.model.as_ref().map(|m| &m.mesh)
    }

    pub fn base_size(&self) -> Option<BaseSize> {
        self.model.as_ref().map(|m| m.scale.base_size())
    }

    // ------------------------------------------------------------------
    // Scale
    // ------------------------------------------------------------------

    fn scale_mut(&mut self) -> QuoteResult<&mut ScaleController> {
        self.model
            .as_mut()
            .map(|m| &mut m.scale)
            .ok_or(QuoteError::NoModelLoaded)
    }

    pub fn scale_state(&self) -> Option<ScaleState> {
        self.model.as_ref().map(|m| m.scale.state())
    }

    /// Per-axis scale factors for the renderer's transform.
    pub fn scale_vector(&self) -> Option<Vector3<f64>> {
        self.scale_state().map(|s| s.as_vector())
    }

    pub fn set_dimension(&mut self, axis: Axis, value: f64) -> QuoteResult<ScaleState> {
        self.scale_mut()?.set_dimension(axis, value)
    }

    pub fn set_dimension_input(&mut self, axis: Axis, input: &str) -> QuoteResult<ScaleState> {
        self.scale_mut()?.set_dimension_input(axis, input)
    }

    pub fn set_uniform_scale(&mut self, factor: f64) -> QuoteResult<ScaleState> {
        self.scale_mut()?.set_uniform_scale(factor)
    }

    pub fn display_dimensions(&self) -> Option<DisplayDimensions> {
        self.model.as_ref().map(|m| m.scale.display_dimensions())
    }

    // ------------------------------------------------------------------
    // Material, color, discount
    // ------------------------------------------------------------------

    /// Select a material by id. Any chosen color is cleared.
    pub fn select_material(&mut self, id: &str) -> QuoteResult<&Material> {
        let material = self.catalog.find_material(id)?;
        debug!("Material selected: {}", material.id);
        self.material_id = Some(material.id.clone());
        self.color = None;
        Ok(material)
    }

    pub fn material(&self) -> Option<&Material> {
        self.material_id
            .as_deref()
            .and_then(|id| self.catalog.material(id))
    }

    /// Select one of the current material's colors.
    pub fn select_color(&mut self, color: &str) -> QuoteResult<()> {
        let material = self
            .material()
            .ok_or_else(|| QuoteError::IncompleteConfiguration {
                missing: vec![ConfigField::Material],
            })?;
        if !material.has_color(color) {
            return Err(QuoteError::UnknownColor {
                material: material.id.clone(),
                color: color.to_string(),
                available: material.colors.clone(),
            });
        }
        debug!("Color selected: {}", color);
        self.color = Some(color.to_string());
        Ok(())
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Record a discount code. Codes are accepted but do not change prices.
    pub fn set_discount_code(&mut self, code: &str) {
        self.discount_code = normalize_discount_code(code);
    }

    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    /// Current quote, or `None` while no model or material is chosen.
    pub fn quote(&self) -> Option<Quote> {
        let _perf = log_perf_section("quote");
        let dims = self.display_dimensions()?;
        let material = self.material()?;
        let quote = price(&dims, Some(material), &self.catalog.pricing)?;
        let quote = apply_discount(quote, self.discount_code());
        log_quote(&dims, &material.id, &quote);
        Some(quote)
    }

    /// Amount to show as the grand total; zero while unpriced.
    pub fn grand_total(&self) -> Money {
        self.quote().map_or(Money::ZERO, |q| q.total)
    }

    /// Freeze the current configuration into a summary.
    pub fn confirm(&self) -> QuoteResult<QuoteSummary> {
        let generated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.confirm_at(generated_at)
    }

    /// Like [`confirm`](Self::confirm) with an explicit timestamp.
    pub fn confirm_at(&self, generated_at: u64) -> QuoteResult<QuoteSummary> {
        let quote = self.quote();
        let dims = self
            .display_dimensions()
            .unwrap_or(DisplayDimensions::new(0.0, 0.0, 0.0));

        let summary = build_summary(SummaryInput {
            file_name: self.file_name(),
            material: self.material(),
            color: self.color(),
            dimensions: dims,
            quote: quote.as_ref(),
            currency: &self.catalog.pricing.currency,
            discount_code: self.discount_code(),
            generated_at,
        })?;

        info!(
            "Quote confirmed: {} in {} ({}), total {:.2} {}",
            summary.file_name,
            summary.material_name,
            summary.color,
            summary.total.amount(),
            summary.currency
        );
        Ok(summary)
    }
}

impl Default for QuoteSession {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use crate::io::write_stl;

    fn box_stl(w: f64, d: f64, h: f64) -> Vec<u8> {
        let mut mesh = Mesh::new();
        for (x, y, z) in [
            (0.0, 0.0, 0.0),
            (w, 0.0, 0.0),
            (w, d, 0.0),
            (0.0, d, 0.0),
            (0.0, 0.0, h),
            (w, 0.0, h),
            (w, d, h),
            (0.0, d, h),
        ] {
            mesh.vertices.push(Vertex::from_coords(x, y, z));
        }
        mesh.faces.extend([
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ]);
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_fresh_session_is_empty() {
        let session = QuoteSession::default();
        assert_eq!(session.load_state(), LoadState::Empty);
        assert!(session.base_size().is_none());
        assert!(session.quote().is_none());
        assert_eq!(session.grand_total(), Money::ZERO);
        assert!(matches!(
            session.confirm().unwrap_err(),
            QuoteError::IncompleteConfiguration { .. }
        ));
    }

    #[test]
    fn test_scale_requires_model() {
        let mut session = QuoteSession::default();
        assert!(matches!(
            session.set_dimension(Axis::X, 10.0).unwrap_err(),
            QuoteError::NoModelLoaded
        ));
    }

    #[test]
    fn test_selecting_material_clears_color() {
        let mut session = QuoteSession::default();
        session.load("part.stl", &box_stl(40.0, 20.0, 10.0)).unwrap();
        session.select_material("resin").unwrap();
        session.select_color("Negro").unwrap();
        assert_eq!(session.color(), Some("Negro"));

        session.select_material("pla").unwrap();
        assert_eq!(session.color(), None);
    }

    #[test]
    fn test_color_must_belong_to_material() {
        let mut session = QuoteSession::default();
        assert!(matches!(
            session.select_color("Negro").unwrap_err(),
            QuoteError::IncompleteConfiguration { .. }
        ));

        session.select_material("pla").unwrap();
        let err = session.select_color("Negro").unwrap_err();
        assert!(matches!(err, QuoteError::UnknownColor { .. }));
        assert_eq!(session.color(), None);
    }

    #[test]
    fn test_unknown_material_keeps_selection() {
        let mut session = QuoteSession::default();
        session.select_material("resin").unwrap();
        session.select_color("Blanco").unwrap();

        assert!(session.select_material("titanium").is_err());
        assert_eq!(session.material().map(|m| m.id.as_str()), Some("resin"));
        assert_eq!(session.color(), Some("Blanco"));
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut session = QuoteSession::default();
        let first = session.begin_load();
        let second = session.begin_load();
        assert_eq!(session.load_state(), LoadState::Loading);
        assert!(session.base_size().is_none());

        let outcome = session
            .complete_load(second, prepare_model("new.stl", &box_stl(10.0, 10.0, 10.0)))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Installed);

        let outcome = session
            .complete_load(first, prepare_model("old.stl", &box_stl(40.0, 20.0, 10.0)))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(session.file_name(), Some("new.stl"));
        assert_eq!(session.base_size().unwrap().x(), 10.0);
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut session = QuoteSession::default();
        let first = session.begin_load();
        let second = session.begin_load();

        let outcome = session
            .complete_load(first, Err(QuoteError::parse_error("broken")))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(session.load_state(), LoadState::Loading);

        session
            .complete_load(second, prepare_model("ok.stl", &box_stl(1.0, 2.0, 3.0)))
            .unwrap();
        assert_eq!(session.load_state(), LoadState::Loaded);
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let mut session = QuoteSession::default();
        session.load("good.stl", &box_stl(40.0, 20.0, 10.0)).unwrap();
        session.select_material("resin").unwrap();
        session.select_color("Negro").unwrap();

        let err = session.load("bad.stl", b"garbage").unwrap_err();
        assert!(err.requires_new_file());
        assert_eq!(session.load_state(), LoadState::Loaded);
        assert_eq!(session.file_name(), Some("good.stl"));

        let dims = session.display_dimensions().unwrap();
        assert_eq!((dims.x, dims.y, dims.z), (40.0, 20.0, 10.0));
        assert_eq!(session.material().map(|m| m.id.as_str()), Some("resin"));
        assert_eq!(session.color(), Some("Negro"));
        assert!(session.confirm().is_ok());
    }

    #[test]
    fn test_failed_background_load_clears_configuration() {
        let mut session = QuoteSession::default();
        session.load("good.stl", &box_stl(40.0, 20.0, 10.0)).unwrap();
        session.select_material("resin").unwrap();
        session.select_color("Negro").unwrap();

        let ticket = session.begin_load();
        let err = session
            .complete_load(ticket, prepare_model("bad.stl", b"garbage"))
            .unwrap_err();
        assert!(err.requires_new_file());
        assert_eq!(session.load_state(), LoadState::Empty);
        assert!(session.display_dimensions().is_none());
        assert!(session.material().is_none());
        assert!(session.color().is_none());
        assert!(session.quote().is_none());
    }

    #[test]
    fn test_load_on_worker_thread() {
        let mut session = QuoteSession::default();
        let ticket = session.begin_load();
        let bytes = box_stl(40.0, 20.0, 10.0);

        let handle = std::thread::spawn(move || prepare_model("worker.stl", &bytes));
        let result = handle.join().unwrap();

        assert_eq!(
            session.complete_load(ticket, result).unwrap(),
            LoadOutcome::Installed
        );
        assert_eq!(
            session.display_dimensions(),
            Some(DisplayDimensions::new(40.0, 20.0, 10.0))
        );
    }

    #[test]
    fn test_discount_code_does_not_change_price() {
        let mut session = QuoteSession::default();
        session.load("part.stl", &box_stl(100.0, 100.0, 100.0)).unwrap();
        session.select_material("resin").unwrap();
        let before = session.quote().unwrap();

        session.set_discount_code(" spring ");
        assert_eq!(session.discount_code(), Some("SPRING"));
        assert_eq!(session.quote().unwrap(), before);

        session.select_color("Blanco").unwrap();
        let summary = session.confirm_at(42).unwrap();
        assert_eq!(summary.discount_code.as_deref(), Some("SPRING"));
        assert_eq!(summary.total.amount(), 64990.0);
    }
}
