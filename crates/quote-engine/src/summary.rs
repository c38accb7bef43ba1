//! Frozen quote summaries for confirmation and export.

use serde::Serialize;

use crate::catalog::Material;
use crate::error::{ConfigField, QuoteError, QuoteResult};
use crate::pricing::{Money, Quote};
use crate::scale::DisplayDimensions;

/// Displayed dimensions together with their unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryDimensions {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub unit: &'static str,
}

impl From<DisplayDimensions> for SummaryDimensions {
    fn from(dims: DisplayDimensions) -> Self {
        Self {
            x: dims.x,
            y: dims.y,
            z: dims.z,
            unit: DisplayDimensions::UNIT,
        }
    }
}

/// An immutable snapshot of a confirmed configuration.
///
/// This record is the only input an exporter receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSummary {
    pub file_name: String,
    pub material_id: String,
    pub material_name: String,
    pub color: String,
    pub dimensions: SummaryDimensions,
    pub item_price: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    /// Seconds since the Unix epoch.
    pub generated_at: u64,
}

/// Everything a summary is built from.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub file_name: Option<&'a str>,
    pub material: Option<&'a Material>,
    pub color: Option<&'a str>,
    pub dimensions: DisplayDimensions,
    pub quote: Option<&'a Quote>,
    pub currency: &'a str,
    pub discount_code: Option<&'a str>,
    pub generated_at: u64,
}

/// Validate a configuration and freeze it into a [`QuoteSummary`].
///
/// Fails with [`QuoteError::IncompleteConfiguration`] listing every missing
/// field when the file, material or color is absent, and with
/// [`QuoteError::InvalidScaleInput`] when the displayed size cannot be priced.
pub fn build_summary(input: SummaryInput<'_>) -> QuoteResult<QuoteSummary> {
    let mut missing = Vec::new();
    if input.file_name.is_none_or(|name| name.trim().is_empty()) {
        missing.push(ConfigField::File);
    }
    if input.material.is_none() {
        missing.push(ConfigField::Material);
    }
    if input.color.is_none_or(|color| color.trim().is_empty()) {
        missing.push(ConfigField::Color);
    }

    let (Some(file_name), Some(material), Some(color), true) = (
        input.file_name,
        input.material,
        input.color,
        missing.is_empty(),
    ) else {
        return Err(QuoteError::IncompleteConfiguration { missing });
    };

    let quote = input.quote.ok_or_else(|| {
        QuoteError::invalid_scale_input(input.dimensions.to_string(), "size cannot be priced")
    })?;

    Ok(QuoteSummary {
        file_name: file_name.to_string(),
        material_id: material.id.clone(),
        material_name: material.name.clone(),
        color: color.to_string(),
        dimensions: input.dimensions.into(),
        item_price: quote.item_price,
        shipping_cost: quote.shipping_cost,
        total: quote.total,
        currency: input.currency.to_string(),
        discount_code: input.discount_code.map(str::to_string),
        generated_at: input.generated_at,
    })
}

impl QuoteSummary {
    /// Serialize for the export collaborator.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for QuoteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "File:       {}", self.file_name)?;
        writeln!(f, "Material:   {}", self.material_name)?;
        writeln!(f, "Color:      {}", self.color)?;
        writeln!(
            f,
            "Dimensions: {:.2} x {:.2} x {:.2} {}",
            self.dimensions.x, self.dimensions.y, self.dimensions.z, self.dimensions.unit
        )?;
        if let Some(code) = &self.discount_code {
            writeln!(f, "Discount:   {}", code)?;
        }
        writeln!(
            f,
            "Item price: {:.2} {}",
            self.item_price.amount(),
            self.currency
        )?;
        writeln!(
            f,
            "Shipping:   {:.2} {}",
            self.shipping_cost.amount(),
            self.currency
        )?;
        write!(f, "Total:      {:.2} {}", self.total.amount(), self.currency)
    }
}
