//! Error types for the quote engine with rich diagnostics.
//!
//! Every failure in this crate is recoverable: the session stays in its
//! previous valid state and the error is handed back to the caller.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `QUOTE-XXXX`:
//! - `QUOTE-1xxx`: I/O and parsing errors (reading, writing, decoding STL)
//! - `QUOTE-2xxx`: Geometry errors (degenerate bounding volume)
//! - `QUOTE-3xxx`: Configuration errors (scale input, selections, finalization)
//! - `QUOTE-4xxx`: Catalog errors (malformed pricing configuration)
//!
//! # Example
//!
//! ```
//! use quote_engine::{Axis, QuoteError, ErrorCode};
//!
//! let err = QuoteError::degenerate_mesh(Axis::Z, 0.0);
//! assert_eq!(err.code(), ErrorCode::DegenerateMesh);
//! assert_eq!(err.code().as_str(), "QUOTE-2001");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::scale::Axis;

/// Result type alias for quote engine operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O and parsing (1xxx)
    /// QUOTE-1001: Failed to read file
    IoRead = 1001,
    /// QUOTE-1002: Failed to write file
    IoWrite = 1002,
    /// QUOTE-1003: Bytes are not a recognizable triangle mesh
    ParseError = 1003,
    /// QUOTE-1004: File extension is not a supported mesh format
    UnsupportedFormat = 1004,

    // Geometry (2xxx)
    /// QUOTE-2001: Bounding box has no positive extent on some axis
    DegenerateMesh = 2001,

    // Configuration (3xxx)
    /// QUOTE-3001: Rejected dimension or scale edit
    InvalidScaleInput = 3001,
    /// QUOTE-3002: Operation requires a loaded model
    NoModelLoaded = 3002,
    /// QUOTE-3003: File, material or color missing at confirmation
    IncompleteConfiguration = 3003,
    /// QUOTE-3004: Material id not in the catalog
    UnknownMaterial = 3004,
    /// QUOTE-3005: Color not offered for the selected material
    UnknownColor = 3005,

    // Catalog (4xxx)
    /// QUOTE-4001: Catalog file is malformed or inconsistent
    InvalidCatalog = 4001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `QUOTE-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "QUOTE-1001",
            ErrorCode::IoWrite => "QUOTE-1002",
            ErrorCode::ParseError => "QUOTE-1003",
            ErrorCode::UnsupportedFormat => "QUOTE-1004",
            ErrorCode::DegenerateMesh => "QUOTE-2001",
            ErrorCode::InvalidScaleInput => "QUOTE-3001",
            ErrorCode::NoModelLoaded => "QUOTE-3002",
            ErrorCode::IncompleteConfiguration => "QUOTE-3003",
            ErrorCode::UnknownMaterial => "QUOTE-3004",
            ErrorCode::UnknownColor => "QUOTE-3005",
            ErrorCode::InvalidCatalog => "QUOTE-4001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields that must be filled in before a quote can be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    File,
    Material,
    Color,
}

impl ConfigField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::File => "file",
            ConfigField::Material => "material",
            ConfigField::Color => "color",
        }
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recovery suggestions for quote errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Pick a different model file.
    ChooseAnotherFile { reason: String },
    /// Re-export the model from the original software.
    ReexportFile { format: Option<String> },
    /// Check the file system.
    CheckPath { checks: Vec<String> },
    /// Enter a different value.
    EnterPositiveValue,
    /// Fill in the listed fields.
    CompleteFields { fields: Vec<String> },
    /// Choose one of the listed options.
    ChooseFrom { options: Vec<String> },
    /// Fix the catalog file.
    FixCatalog { details: String },
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ChooseAnotherFile { reason } => {
                write!(f, "Choose another model file ({})", reason)
            }
            RecoverySuggestion::ReexportFile { format } => {
                if let Some(fmt) = format {
                    write!(
                        f,
                        "Try re-exporting the model as {} from the original software",
                        fmt
                    )
                } else {
                    write!(f, "Try re-exporting the model from the original software")
                }
            }
            RecoverySuggestion::CheckPath { checks } => {
                write!(f, "Check: {}", checks.join(", "))
            }
            RecoverySuggestion::EnterPositiveValue => {
                write!(f, "Enter a positive number")
            }
            RecoverySuggestion::CompleteFields { fields } => {
                write!(f, "Please complete: {}", fields.join(", "))
            }
            RecoverySuggestion::ChooseFrom { options } => {
                if options.is_empty() {
                    write!(f, "No options are available")
                } else {
                    write!(f, "Choose one of: {}", options.join(", "))
                }
            }
            RecoverySuggestion::FixCatalog { details } => {
                write!(f, "Fix the catalog file: {}", details)
            }
        }
    }
}

/// Errors that can occur while loading, scaling, pricing or confirming a model.
#[derive(Debug, Error, Diagnostic)]
pub enum QuoteError {
    /// Error reading from a file.
    #[error("failed to read {path}")]
    #[diagnostic(
        code(quote::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write {path}")]
    #[diagnostic(
        code(quote::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes could not be decoded into at least one triangle.
    #[error("failed to parse mesh: {details}")]
    #[diagnostic(
        code(quote::parse::error),
        help("The file may be corrupted or not an STL file. Try re-exporting it as binary STL.")
    )]
    ParseError { details: String },

    /// Unsupported file format.
    #[error("unsupported model format: {extension:?}")]
    #[diagnostic(
        code(quote::format::unsupported),
        help("Only STL files (.stl, binary or ASCII) can be quoted")
    )]
    UnsupportedFormat { extension: Option<String> },

    /// The model has no positive extent along an axis.
    #[error("model is degenerate: {axis} extent is {extent}")]
    #[diagnostic(
        code(quote::geometry::degenerate),
        help("Pricing needs a model with positive width, depth and height")
    )]
    DegenerateMesh { axis: Axis, extent: f64 },

    /// A dimension or scale edit was rejected.
    #[error("invalid scale input {input:?}: {reason}")]
    #[diagnostic(
        code(quote::config::scale_input),
        help("Dimensions and scale factors must be positive numbers")
    )]
    InvalidScaleInput { input: String, reason: String },

    /// A model-dependent operation was called before a model was loaded.
    #[error("no model loaded")]
    #[diagnostic(code(quote::config::no_model), help("Upload an STL file first"))]
    NoModelLoaded,

    /// Confirmation was attempted with missing fields.
    #[error("incomplete configuration: missing {}", join_fields(.missing))]
    #[diagnostic(
        code(quote::config::incomplete),
        help("Please complete all fields (file, material and color)")
    )]
    IncompleteConfiguration { missing: Vec<ConfigField> },

    /// Material id not present in the catalog.
    #[error("unknown material {id:?}")]
    #[diagnostic(
        code(quote::config::material),
        help("Run `quote materials` to list the available materials")
    )]
    UnknownMaterial { id: String, available: Vec<String> },

    /// Color not offered for the selected material.
    #[error("color {color:?} is not available for material {material:?}")]
    #[diagnostic(
        code(quote::config::color),
        help("Colors depend on the material; run `quote materials` to list them")
    )]
    UnknownColor {
        material: String,
        color: String,
        available: Vec<String>,
    },

    /// Catalog configuration could not be used.
    #[error("invalid catalog: {details}")]
    #[diagnostic(
        code(quote::catalog::invalid),
        help("See the default catalog printed by `quote materials --format json`")
    )]
    InvalidCatalog { details: String },
}

fn join_fields(fields: &[ConfigField]) -> String {
    fields
        .iter()
        .map(ConfigField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl QuoteError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            QuoteError::IoRead { .. } => ErrorCode::IoRead,
            QuoteError::IoWrite { .. } => ErrorCode::IoWrite,
            QuoteError::ParseError { .. } => ErrorCode::ParseError,
            QuoteError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            QuoteError::DegenerateMesh { .. } => ErrorCode::DegenerateMesh,
            QuoteError::InvalidScaleInput { .. } => ErrorCode::InvalidScaleInput,
            QuoteError::NoModelLoaded => ErrorCode::NoModelLoaded,
            QuoteError::IncompleteConfiguration { .. } => ErrorCode::IncompleteConfiguration,
            QuoteError::UnknownMaterial { .. } => ErrorCode::UnknownMaterial,
            QuoteError::UnknownColor { .. } => ErrorCode::UnknownColor,
            QuoteError::InvalidCatalog { .. } => ErrorCode::InvalidCatalog,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            QuoteError::IoRead { .. } => RecoverySuggestion::CheckPath {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            QuoteError::IoWrite { .. } => RecoverySuggestion::CheckPath {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            QuoteError::ParseError { .. } => RecoverySuggestion::ReexportFile {
                format: Some("binary STL".into()),
            },
            QuoteError::UnsupportedFormat { .. } => RecoverySuggestion::ChooseAnotherFile {
                reason: "only .stl files are supported".into(),
            },
            QuoteError::DegenerateMesh { axis, .. } => RecoverySuggestion::ChooseAnotherFile {
                reason: format!("the model is flat along {}", axis),
            },
            QuoteError::InvalidScaleInput { .. } => RecoverySuggestion::EnterPositiveValue,
            QuoteError::NoModelLoaded => RecoverySuggestion::CompleteFields {
                fields: vec![ConfigField::File.to_string()],
            },
            QuoteError::IncompleteConfiguration { missing } => {
                RecoverySuggestion::CompleteFields {
                    fields: missing.iter().map(ToString::to_string).collect(),
                }
            }
            QuoteError::UnknownMaterial { available, .. } => RecoverySuggestion::ChooseFrom {
                options: available.clone(),
            },
            QuoteError::UnknownColor { available, .. } => RecoverySuggestion::ChooseFrom {
                options: available.clone(),
            },
            QuoteError::InvalidCatalog { details } => RecoverySuggestion::FixCatalog {
                details: details.clone(),
            },
        }
    }

    /// Returns the file the error refers to, if any.
    pub fn location(&self) -> Option<&std::path::Path> {
        match self {
            QuoteError::IoRead { path, .. } | QuoteError::IoWrite { path, .. } => Some(path),
            _ => None,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QuoteError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QuoteError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(details: impl Into<String>) -> Self {
        QuoteError::ParseError {
            details: details.into(),
        }
    }

    /// Create a DegenerateMesh error.
    pub fn degenerate_mesh(axis: Axis, extent: f64) -> Self {
        QuoteError::DegenerateMesh { axis, extent }
    }

    /// Create an InvalidScaleInput error.
    pub fn invalid_scale_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::InvalidScaleInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidCatalog error.
    pub fn invalid_catalog(details: impl Into<String>) -> Self {
        QuoteError::InvalidCatalog {
            details: details.into(),
        }
    }

    /// Whether this error means the user has to pick another model file.
    pub fn requires_new_file(&self) -> bool {
        matches!(
            self,
            QuoteError::ParseError { .. }
                | QuoteError::UnsupportedFormat { .. }
                | QuoteError::DegenerateMesh { .. }
        )
    }
}
