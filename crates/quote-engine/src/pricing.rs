//! Volumetric pricing.
//!
//! The item price is the displayed bounding volume in cubic centimeters times
//! the material rate, never below the configured floor. Shipping is a flat
//! charge on top. Quotes are pure functions of their inputs and are recomputed
//! on demand rather than cached.

use std::ops::Add;

use serde::Serialize;

use crate::catalog::{Material, PricingParams};
use crate::scale::DisplayDimensions;

/// Cubic millimeters per cubic centimeter.
pub const MM3_PER_CM3: f64 = 1000.0;

/// A non-negative amount in the catalog's single currency.
///
/// Locale formatting is left to the presentation layer; this value is what
/// every computation uses.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Money(f64);

impl Money {
    pub const ZERO: Money = Money(0.0);

    /// Wrap an amount; negative or non-finite amounts become zero.
    pub fn new(amount: f64) -> Self {
        if amount.is_finite() && amount > 0.0 {
            Money(amount)
        } else {
            Money::ZERO
        }
    }

    #[inline]
    pub fn amount(&self) -> f64 {
        self.0
    }

    /// The larger of two amounts.
    pub fn max(self, other: Money) -> Money {
        if other.0 > self.0 { other } else { self }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

/// Price breakdown for one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    /// Displayed bounding volume in cubic centimeters.
    pub volume_cm3: f64,
    /// `volume_cm3 × rate` before the floor.
    pub raw_price: Money,
    /// Price of the piece after the floor.
    pub item_price: Money,
    /// Flat shipping charge.
    pub shipping_cost: Money,
    /// `item_price + shipping_cost`.
    pub total: Money,
    /// Whether the floor raised the price.
    pub floor_applied: bool,
}

/// Price a configuration.
///
/// Returns `None` while the configuration is incomplete: no material chosen,
/// or some displayed dimension not positive. That is a normal state, not an
/// error. A size whose price cannot be represented also yields `None`.
pub fn price(
    dims: &DisplayDimensions,
    material: Option<&Material>,
    params: &PricingParams,
) -> Option<Quote> {
    let material = material?;
    if !dims.is_positive() {
        return None;
    }

    let volume_cm3 = dims.volume_mm3() / MM3_PER_CM3;
    let raw_amount = volume_cm3 * material.rate;
    if !raw_amount.is_finite() {
        return None;
    }

    let raw_price = Money::new(raw_amount);
    let min_price = Money::new(params.min_price);
    let item_price = raw_price.max(min_price);
    let shipping_cost = Money::new(params.shipping_cost);
    let total = item_price + shipping_cost;
    if !total.amount().is_finite() {
        return None;
    }

    Some(Quote {
        volume_cm3,
        raw_price,
        item_price,
        shipping_cost,
        total,
        floor_applied: raw_price < min_price,
    })
}

/// Normalize a discount code as typed: trimmed, upper-cased, empty means none.
pub fn normalize_discount_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_uppercase())
    }
}

/// Adjust a quote for a discount code.
///
/// No discount rules exist yet, so every code leaves the quote unchanged.
pub fn apply_discount(quote: Quote, _code: Option<&str>) -> Quote {
    quote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn resin() -> Material {
        Catalog::default().material("resin").cloned().unwrap()
    }

    #[test]
    fn test_small_part_hits_floor() {
        let dims = DisplayDimensions::new(40.0, 20.0, 10.0);
        let quote = price(&dims, Some(&resin()), &PricingParams::default()).unwrap();

        assert_eq!(quote.volume_cm3, 8.0);
        assert_eq!(quote.raw_price.amount(), 480.0);
        assert_eq!(quote.item_price.amount(), 5000.0);
        assert!(quote.floor_applied);
        assert_eq!(quote.shipping_cost.amount(), 4990.0);
        assert_eq!(quote.total.amount(), 9990.0);
    }

    #[test]
    fn test_large_part_above_floor() {
        let dims = DisplayDimensions::new(100.0, 100.0, 100.0);
        let quote = price(&dims, Some(&resin()), &PricingParams::default()).unwrap();

        assert_eq!(quote.volume_cm3, 1000.0);
        assert_eq!(quote.item_price.amount(), 60000.0);
        assert!(!quote.floor_applied);
        assert_eq!(quote.total.amount(), 64990.0);
    }

    #[test]
    fn test_incomplete_configuration_has_no_quote() {
        let params = PricingParams::default();
        let dims = DisplayDimensions::new(10.0, 10.0, 10.0);
        assert!(price(&dims, None, &params).is_none());

        let flat = DisplayDimensions::new(10.0, 0.0, 10.0);
        assert!(price(&flat, Some(&resin()), &params).is_none());
    }

    #[test]
    fn test_unrepresentable_price_is_not_floored() {
        let params = PricingParams::default();
        let huge = DisplayDimensions::new(1e120, 5e119, 2.5e119);
        assert!(price(&huge, Some(&resin()), &params).is_none());

        let big = DisplayDimensions::new(1e100, 5e99, 2.5e99);
        let quote = price(&big, Some(&resin()), &params).unwrap();
        assert!(quote.item_price.amount() > params.min_price);
        assert!(!quote.floor_applied);
    }

    #[test]
    fn test_custom_params() {
        let params = PricingParams {
            min_price: 0.0,
            shipping_cost: 0.0,
            ..PricingParams::default()
        };
        let dims = DisplayDimensions::new(10.0, 10.0, 10.0);
        let quote = price(&dims, Some(&resin()), &params).unwrap();
        assert_eq!(quote.item_price.amount(), 60.0);
        assert_eq!(quote.total.amount(), 60.0);
    }

    #[test]
    fn test_money_never_negative() {
        assert_eq!(Money::new(-3.0), Money::ZERO);
        assert_eq!(Money::new(f64::NAN), Money::ZERO);
        assert_eq!((Money::new(2.5) + Money::new(1.5)).amount(), 4.0);
    }

    #[test]
    fn test_discount_code_is_inert() {
        assert_eq!(normalize_discount_code("  promo10 "), Some("PROMO10".into()));
        assert_eq!(normalize_discount_code("   "), None);

        let dims = DisplayDimensions::new(40.0, 20.0, 10.0);
        let quote = price(&dims, Some(&resin()), &PricingParams::default()).unwrap();
        assert_eq!(apply_discount(quote, Some("PROMO10")), quote);
    }
}
