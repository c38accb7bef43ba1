//! Tracing extensions for quote operations.
//!
//! Enable output by installing a subscriber in the application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=quote_engine=debug for intermediate values
//! // RUST_LOG=quote_engine::timing=debug for operation timing
//! ```
//!
//! # Log Levels
//!
//! - **INFO**: models loaded, quotes confirmed, timing
//! - **WARN**: rejected edits, superseded loads, suspicious model sizes
//! - **DEBUG**: bounding boxes, scale factors, volumes and prices
//! - **TRACE**: performance sections

use std::time::Instant;
use tracing::{Span, debug, info, trace, warn};

use crate::Mesh;
use crate::pricing::Quote;
use crate::scale::DisplayDimensions;

/// A performance timer that logs duration on drop.
///
/// ```rust,ignore
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("quote_operation", operation = name);
        debug!(target: "quote_engine::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer that also records the mesh size.
    pub fn with_mesh(name: &'static str, mesh: &Mesh) -> Self {
        let span = tracing::info_span!(
            "quote_operation",
            operation = name,
            faces = mesh.face_count(),
            vertices = mesh.vertex_count()
        );
        debug!(
            target: "quote_engine::timing",
            operation = name,
            faces = mesh.face_count(),
            vertices = mesh.vertex_count(),
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "quote_engine::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let (min_bounds, max_bounds) = mesh.bounds().unwrap_or_default();
    let dims = max_bounds - min_bounds;

    debug!(
        target: "quote_engine::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}

/// Log a freshly derived quote.
pub fn log_quote(dims: &DisplayDimensions, material_id: &str, quote: &Quote) {
    debug!(
        target: "quote_engine::pricing",
        material = material_id,
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        volume_cm3 = quote.volume_cm3,
        raw_price = quote.raw_price.amount(),
        item_price = quote.item_price.amount(),
        floor_applied = quote.floor_applied,
        total = quote.total.amount(),
        "Quote derived"
    );
}

/// Log an edit that was rejected and left the session untouched.
pub fn log_rejected_edit(operation: &str, input: &str, reason: &str) {
    warn!(
        target: "quote_engine::scale",
        operation = operation,
        input = input,
        reason = reason,
        "Edit rejected, keeping previous scale"
    );
}

/// Log a performance-critical section.
///
/// Returns a guard that logs when dropped.
#[must_use]
pub fn log_perf_section(name: &'static str) -> impl Drop {
    struct PerfGuard {
        name: &'static str,
        start: Instant,
    }
    impl Drop for PerfGuard {
        fn drop(&mut self) {
            let elapsed = self.start.elapsed();
            trace!(
                target: "quote_engine::perf",
                section = self.name,
                elapsed_us = elapsed.as_micros(),
                "Performance section completed"
            );
        }
    }
    PerfGuard {
        name,
        start: Instant::now(),
    }
}
