//! Scale state and user-visible dimensions.
//!
//! Displayed dimensions are always `BaseSize × factor`. Editing the displayed
//! length of any axis derives a new factor from that axis and applies it to
//! all three (the aspect ratio stays locked). Per-axis stretching is not
//! offered.
//!
//! Rejected edits never touch the current state.

use std::str::FromStr;

use nalgebra::Vector3;
use serde::Serialize;
use tracing::debug;

use crate::error::{QuoteError, QuoteResult};
use crate::normalize::BaseSize;
use crate::tracing_ext::log_rejected_edit;

/// Decimal places used for displayed dimensions unless configured otherwise.
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 2;

/// Upper bound on configurable display precision.
pub const MAX_DISPLAY_DECIMALS: u32 = 6;

/// One of the three model axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(QuoteError::invalid_scale_input(s, "axis must be x, y or z")),
        }
    }
}

/// Uniform scale factor applied to every axis of the base size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleState {
    factor: f64,
}

impl ScaleState {
    /// The unscaled state.
    pub const IDENTITY: ScaleState = ScaleState { factor: 1.0 };

    /// Create a scale state. The factor must be finite and positive.
    pub fn uniform(factor: f64) -> QuoteResult<Self> {
        if !factor.is_finite() {
            return Err(QuoteError::invalid_scale_input(
                factor.to_string(),
                "scale factor must be a finite number",
            ));
        }
        if factor <= 0.0 {
            return Err(QuoteError::invalid_scale_input(
                factor.to_string(),
                "scale factor must be positive",
            ));
        }
        Ok(Self { factor })
    }

    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Per-axis factors, as consumed by a renderer's scale transform.
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::repeat(self.factor)
    }
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Dimensions shown to the user, in millimeters, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayDimensions {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DisplayDimensions {
    /// Unit every displayed length is expressed in.
    pub const UNIT: &'static str = "mm";

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Whether every component is a positive, finite length.
    pub fn is_positive(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Bounding volume in cubic millimeters.
    pub fn volume_mm3(&self) -> f64 {
        self.x * self.y * self.z
    }
}

impl std::fmt::Display for DisplayDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} x {:.2} x {:.2} {}",
            self.x,
            self.y,
            self.z,
            Self::UNIT
        )
    }
}

/// Round half away from zero to the given number of decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Owns the scale of one model and projects it onto displayed dimensions.
#[derive(Debug, Clone)]
pub struct ScaleController {
    base_size: BaseSize,
    state: ScaleState,
    display_decimals: u32,
}

impl ScaleController {
    /// Start at the identity scale for a freshly measured model.
    pub fn new(base_size: BaseSize) -> Self {
        Self::with_precision(base_size, DEFAULT_DISPLAY_DECIMALS)
    }

    pub fn with_precision(base_size: BaseSize, display_decimals: u32) -> Self {
        Self {
            base_size,
            state: ScaleState::IDENTITY,
            display_decimals: display_decimals.min(MAX_DISPLAY_DECIMALS),
        }
    }

    #[inline]
    pub fn base_size(&self) -> BaseSize {
        self.base_size
    }

    #[inline]
    pub fn state(&self) -> ScaleState {
        self.state
    }

    /// Set the displayed length of one axis; all axes follow proportionally.
    pub fn set_dimension(&mut self, axis: Axis, new_value: f64) -> QuoteResult<ScaleState> {
        if !new_value.is_finite() || new_value <= 0.0 {
            let reason = "dimension must be a positive number";
            log_rejected_edit("set_dimension", &new_value.to_string(), reason);
            return Err(QuoteError::invalid_scale_input(new_value.to_string(), reason));
        }

        let base = self.base_size.get(axis);
        if base <= 0.0 {
            let reason = "model has no extent on this axis";
            log_rejected_edit("set_dimension", &new_value.to_string(), reason);
            return Err(QuoteError::invalid_scale_input(new_value.to_string(), reason));
        }

        let state = ScaleState::uniform(new_value / base)?;
        self.check_scaled_size(state, "set_dimension", &new_value.to_string())?;
        debug!(
            "Axis {} set to {:.3} mm: factor {:.6} -> {:.6}",
            axis, new_value, self.state.factor, state.factor
        );
        self.state = state;
        Ok(state)
    }

    /// Parse raw user text and apply it as the displayed length of `axis`.
    pub fn set_dimension_input(&mut self, axis: Axis, input: &str) -> QuoteResult<ScaleState> {
        match input.trim().parse::<f64>() {
            Ok(value) => self.set_dimension(axis, value),
            Err(_) => {
                let reason = "not a number";
                log_rejected_edit("set_dimension_input", input, reason);
                Err(QuoteError::invalid_scale_input(input, reason))
            }
        }
    }

    /// Set the uniform factor directly, as a global scale slider would.
    pub fn set_uniform_scale(&mut self, factor: f64) -> QuoteResult<ScaleState> {
        let state = ScaleState::uniform(factor).inspect_err(|e| {
            log_rejected_edit("set_uniform_scale", &factor.to_string(), &e.to_string());
        })?;
        self.check_scaled_size(state, "set_uniform_scale", &factor.to_string())?;
        debug!("Uniform scale: {:.6} -> {:.6}", self.state.factor, factor);
        self.state = state;
        Ok(state)
    }

    /// Scaled extents and their volume must stay representable.
    fn check_scaled_size(
        &self,
        state: ScaleState,
        operation: &str,
        input: &str,
    ) -> QuoteResult<()> {
        let dims = self.project(state);
        if [dims.x, dims.y, dims.z, dims.volume_mm3()]
            .iter()
            .all(|v| v.is_finite())
        {
            return Ok(());
        }
        let reason = "scaled size is too large";
        log_rejected_edit(operation, input, reason);
        Err(QuoteError::invalid_scale_input(input, reason))
    }

    /// Return to the unscaled state.
    pub fn reset(&mut self) {
        self.state = ScaleState::IDENTITY;
    }

    /// `BaseSize × factor`, rounded for display. Does not modify any state.
    pub fn display_dimensions(&self) -> DisplayDimensions {
        self.project(self.state)
    }

    fn project(&self, state: ScaleState) -> DisplayDimensions {
        let scaled = self.base_size.as_vector() * state.factor;
        DisplayDimensions::new(
            round_to(scaled.x, self.display_decimals),
            round_to(scaled.y, self.display_decimals),
            round_to(scaled.z, self.display_decimals),
        )
    }
}
