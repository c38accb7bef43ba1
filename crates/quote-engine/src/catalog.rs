//! Materials, colors and pricing constants.
//!
//! The catalog is plain configuration: which materials can be ordered, what
//! each costs per cubic centimeter, which colors each is offered in, and the
//! fixed price floor and shipping charge. [`Catalog::default`] holds the
//! built-in offer; a JSON file with the same shape can replace it.
//!
//! ```
//! use quote_engine::Catalog;
//!
//! let catalog = Catalog::from_json_str(r#"{
//!     "pricing": { "min_price": 1000, "shipping_cost": 0, "currency": "EUR" },
//!     "materials": [
//!         { "id": "nylon", "name": "Nylon", "rate": 12.5, "colors": ["Black"] }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(catalog.material("nylon").unwrap().rate, 12.5);
//! assert_eq!(catalog.pricing.display_decimals, 2);
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{QuoteError, QuoteResult};
use crate::scale::{DEFAULT_DISPLAY_DECIMALS, MAX_DISPLAY_DECIMALS};

/// Fixed pricing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingParams {
    /// No job is quoted below this item price.
    pub min_price: f64,

    /// Flat shipping charge added to every order.
    pub shipping_cost: f64,

    /// ISO 4217 code of the single currency all amounts are in.
    pub currency: String,

    /// Decimal places displayed dimensions are rounded to.
    pub display_decimals: u32,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            min_price: 5000.0,
            shipping_cost: 4990.0,
            currency: "CLP".to_string(),
            display_decimals: DEFAULT_DISPLAY_DECIMALS,
        }
    }
}

/// A printable material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Stable identifier used for selection.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Price per cubic centimeter of displayed bounding volume.
    pub rate: f64,

    /// Colors this material is offered in.
    pub colors: Vec<String>,
}

impl Material {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        rate: f64,
        colors: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            rate,
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Whether `color` is offered for this material (exact match).
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }
}

/// Everything a quote can be configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub pricing: PricingParams,

    pub materials: Vec<Material>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            pricing: PricingParams::default(),
            materials: vec![
                Material::new(
                    "resin",
                    "Resina",
                    "Alta precisión",
                    60.0,
                    &[
                        "Gris Estándar",
                        "Blanco",
                        "Negro",
                        "Transparente",
                        "Azul Dental",
                    ],
                ),
                Material::new(
                    "pla",
                    "Plástico (PLA)",
                    "Resistente",
                    25.0,
                    &[
                        "Blanco Mate",
                        "Negro Carbón",
                        "Rojo Fuego",
                        "Azul Eléctrico",
                        "Naranja",
                    ],
                ),
            ],
        }
    }
}

impl Catalog {
    /// Parse and validate a JSON catalog.
    pub fn from_json_str(json: &str) -> QuoteResult<Self> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| QuoteError::invalid_catalog(e.to_string()))?;
        catalog.validate()?;
        debug!("Parsed catalog with {} materials", catalog.materials.len());
        Ok(catalog)
    }

    /// Read, parse and validate a JSON catalog file.
    pub fn load(path: &Path) -> QuoteResult<Self> {
        info!("Loading catalog from {:?}", path);
        let json = std::fs::read_to_string(path).map_err(|e| QuoteError::io_read(path, e))?;
        Self::from_json_str(&json)
    }

    /// Check the catalog for inconsistencies that would break pricing.
    pub fn validate(&self) -> QuoteResult<()> {
        let pricing = &self.pricing;
        if !(pricing.min_price.is_finite() && pricing.min_price >= 0.0) {
            return Err(QuoteError::invalid_catalog(format!(
                "min_price must be a non-negative number, got {}",
                pricing.min_price
            )));
        }
        if !(pricing.shipping_cost.is_finite() && pricing.shipping_cost >= 0.0) {
            return Err(QuoteError::invalid_catalog(format!(
                "shipping_cost must be a non-negative number, got {}",
                pricing.shipping_cost
            )));
        }
        if pricing.currency.trim().is_empty() {
            return Err(QuoteError::invalid_catalog("currency must not be empty"));
        }
        if pricing.display_decimals > MAX_DISPLAY_DECIMALS {
            return Err(QuoteError::invalid_catalog(format!(
                "display_decimals must be at most {}, got {}",
                MAX_DISPLAY_DECIMALS, pricing.display_decimals
            )));
        }
        if self.materials.is_empty() {
            return Err(QuoteError::invalid_catalog("at least one material is required"));
        }

        let mut seen = HashSet::new();
        for material in &self.materials {
            if material.id.trim().is_empty() {
                return Err(QuoteError::invalid_catalog("material id must not be empty"));
            }
            if !seen.insert(material.id.as_str()) {
                return Err(QuoteError::invalid_catalog(format!(
                    "duplicate material id {:?}",
                    material.id
                )));
            }
            if !(material.rate.is_finite() && material.rate >= 0.0) {
                return Err(QuoteError::invalid_catalog(format!(
                    "material {:?} has invalid rate {}",
                    material.id, material.rate
                )));
            }
            if material.colors.is_empty() {
                return Err(QuoteError::invalid_catalog(format!(
                    "material {:?} has no colors",
                    material.id
                )));
            }
        }
        Ok(())
    }

    /// Look up a material by id.
    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Look up a material by id, failing with the list of known ids.
    pub fn find_material(&self, id: &str) -> QuoteResult<&Material> {
        self.material(id).ok_or_else(|| QuoteError::UnknownMaterial {
            id: id.to_string(),
            available: self.material_ids(),
        })
    }

    pub fn material_ids(&self) -> Vec<String> {
        self.materials.iter().map(|m| m.id.clone()).collect()
    }
}
