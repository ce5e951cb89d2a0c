//! # Pricing Engine
//!
//! A pure computation from priced lines plus an optional coupon to a [`Quote`]. Carts call it
//! before persisting every mutation and checkout calls it again against live prices, so the
//! amount charged never depends on a cart's saved totals.
//!
//! The final amount is `subtotal - discount + shipping + tax`, with tax taken on the
//! undiscounted subtotal. Existing receipts depend on that arithmetic order.

use crate::error::{Classify, ErrorKind};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rounds a monetary amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),
}

impl Classify for PricingError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// One line as the engine sees it: a live unit price and a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl PricedLine {
    pub fn new(unit_price: Decimal, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    pub fn total(&self) -> Decimal {
        round_money(self.unit_price * Decimal::from(self.quantity))
    }
}

/// Derived monetary breakdown of a set of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Decimal,
    /// Total item count; every unit weighs one.
    pub total_weight: u32,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub final_amount: Decimal,
}

impl Quote {
    /// `final_amount == subtotal - discount + shipping + tax`
    pub fn reconciles(&self) -> bool {
        self.final_amount == self.subtotal - self.discount + self.shipping + self.tax
    }
}

/// Shipping, tax and coupon parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPolicy {
    pub shipping_base: Decimal,
    pub shipping_per_unit: Decimal,
    /// Percentage, e.g. `18` for 18%.
    pub tax_rate: Decimal,
    /// Normalized code to discount percentage.
    coupons: BTreeMap<String, Decimal>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(
            Decimal::from(50),
            Decimal::from(20),
            Decimal::from(18),
            [
                ("SAVE10", Decimal::from(10)),
                ("SAVE20", Decimal::from(20)),
                ("WELCOME15", Decimal::from(15)),
            ],
        )
    }
}

impl PricingPolicy {
    pub fn new<I, S>(
        shipping_base: Decimal,
        shipping_per_unit: Decimal,
        tax_rate: Decimal,
        coupons: I,
    ) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        Self {
            shipping_base,
            shipping_per_unit,
            tax_rate,
            coupons: coupons
                .into_iter()
                .map(|(code, pct)| (normalize_coupon(code.as_ref()), pct))
                .collect(),
        }
    }

    /// Looks up a coupon, ignoring case and surrounding whitespace.
    pub fn coupon_percentage(&self, code: &str) -> Option<Decimal> {
        self.coupons.get(&normalize_coupon(code)).copied()
    }

    /// Checks a coupon and returns its canonical spelling.
    pub fn validate_coupon(&self, code: &str) -> Result<String, PricingError> {
        let normalized = normalize_coupon(code);
        if self.coupons.contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(PricingError::InvalidCoupon(code.trim().to_string()))
        }
    }

    pub fn coupons(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.coupons.iter().map(|(code, pct)| (code.as_str(), *pct))
    }

    /// Flat base for the first unit, a fixed increment for each unit beyond it.
    pub fn shipping_for(&self, weight: u32) -> Decimal {
        match weight {
            0 => Decimal::ZERO,
            w => self.shipping_base + self.shipping_per_unit * Decimal::from(w - 1),
        }
    }

    pub fn quote(&self, lines: &[PricedLine], coupon: Option<&str>) -> Result<Quote, PricingError> {
        let discount_pct = match coupon {
            Some(code) => self
                .coupon_percentage(code)
                .ok_or_else(|| PricingError::InvalidCoupon(code.trim().to_string()))?,
            None => Decimal::ZERO,
        };

        let subtotal: Decimal = lines.iter().map(PricedLine::total).sum();
        let total_weight = lines
            .iter()
            .fold(0u32, |weight, line| weight.saturating_add(line.quantity));
        let hundred = Decimal::ONE_HUNDRED;

        let discount = round_money(subtotal * discount_pct / hundred);
        let shipping = round_money(self.shipping_for(total_weight));
        let tax = round_money(subtotal * self.tax_rate / hundred);
        let final_amount = subtotal - discount + shipping + tax;

        Ok(Quote {
            subtotal,
            total_weight,
            discount,
            shipping,
            tax,
            final_amount,
        })
    }
}

pub fn normalize_coupon(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
