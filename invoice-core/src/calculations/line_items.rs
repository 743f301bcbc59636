//! Line items: the rows of an estimate or invoice.
//!
//! A line item carries a quantity, a unit rate and an optional per-item tax
//! rate expressed in percent. When the tax rate is absent the caller-wide
//! default applies; resolving that default goes through
//! [`LineItem::effective_tax_rate`] so the substitution rule lives in exactly
//! one place.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use invoice_core::calculations::{DEFAULT_TAX_RATE, LineItem};
//!
//! let consulting = LineItem::new("Consulting", dec!(2.5), dec!(40));
//! let exempt = LineItem::new("Permit fee", dec!(1), dec!(50)).with_tax_rate(dec!(0));
//!
//! assert_eq!(consulting.amount(), Ok(dec!(100)));
//! assert_eq!(consulting.effective_tax_rate(DEFAULT_TAX_RATE), dec!(13));
//! assert!(!exempt.is_taxable(DEFAULT_TAX_RATE));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::ONE_HUNDRED;

/// The regional sales-tax rate (in percent) applied to items without their own rate.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(13, 0, 0, false, 0);

/// Reasons a single line item is rejected before any arithmetic happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// Quantities count units of work or goods and cannot be negative.
    #[error("quantity must be non-negative, got {0}")]
    NegativeQuantity(Decimal),

    /// Tax rates are percentages in the inclusive range [0, 100].
    #[error("tax rate must be between 0 and 100, got {0}")]
    TaxRateOutOfRange(Decimal),

    /// `quantity * rate` does not fit in a decimal.
    #[error("amount of {quantity} x {rate} is out of range")]
    AmountOutOfRange { quantity: Decimal, rate: Decimal },

    /// A binary floating-point input was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// One row of a quote or bill.
///
/// `description` and `unit` travel with the item for persistence and display
/// but play no part in any calculation. There is no `amount`
/// field: the amount is always derived from `quantity * rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Free-text description shown on the document.
    #[serde(default)]
    pub description: String,

    /// Number of units billed. May be fractional (e.g. 2.5 hours).
    pub quantity: Decimal,

    /// Optional unit label such as `"hr"` or `"sq ft"`.
    #[serde(default)]
    pub unit: Option<String>,

    /// Unit price. Negative values represent discount lines.
    pub rate: Decimal,

    /// Per-item tax rate in percent, or `None` to use the default.
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
}

impl LineItem {
    /// Creates a line item with no unit and no explicit tax rate.
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit: None,
            rate,
            tax_rate: None,
        }
    }

    /// Sets an explicit tax rate (in percent), overriding the default.
    pub fn with_tax_rate(
        mut self,
        tax_rate: Decimal,
    ) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    /// Sets the unit label.
    pub fn with_unit(
        mut self,
        unit: impl Into<String>,
    ) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builds a line item from binary floating-point inputs.
    ///
    /// Values coming from JSON or spreadsheets are often `f64`; NaN and
    /// infinities are rejected here so they never reach a persisted total.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::NonFinite`] naming the first non-finite field.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use invoice_core::calculations::{LineItem, LineItemError};
    ///
    /// let item = LineItem::try_from_f64("Labour", 2.5, 40.0, Some(13.0)).unwrap();
    /// assert_eq!(item.amount(), Ok(Decimal::from(100)));
    ///
    /// let err = LineItem::try_from_f64("Labour", f64::NAN, 40.0, None).unwrap_err();
    /// assert_eq!(err, LineItemError::NonFinite { field: "quantity" });
    /// ```
    pub fn try_from_f64(
        description: impl Into<String>,
        quantity: f64,
        rate: f64,
        tax_rate: Option<f64>,
    ) -> Result<Self, LineItemError> {
        let quantity = finite_decimal("quantity", quantity)?;
        let rate = finite_decimal("rate", rate)?;
        let tax_rate = tax_rate
            .map(|value| finite_decimal("tax_rate", value))
            .transpose()?;

        Ok(Self {
            description: description.into(),
            quantity,
            unit: None,
            rate,
            tax_rate,
        })
    }

    /// The line amount, `quantity * rate`, at full precision.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::AmountOutOfRange`] when the product overflows.
    pub fn amount(&self) -> Result<Decimal, LineItemError> {
        self.quantity
            .checked_mul(self.rate)
            .ok_or(LineItemError::AmountOutOfRange {
                quantity: self.quantity,
                rate: self.rate,
            })
    }

    /// The item's own tax rate if present, otherwise `default_tax_rate`.
    pub fn effective_tax_rate(
        &self,
        default_tax_rate: Decimal,
    ) -> Decimal {
        self.tax_rate.unwrap_or(default_tax_rate)
    }

    /// Whether the item falls in the taxable partition (effective rate > 0).
    pub fn is_taxable(
        &self,
        default_tax_rate: Decimal,
    ) -> bool {
        self.effective_tax_rate(default_tax_rate) > Decimal::ZERO
    }

    /// Checks the business rules the calculator relies on.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError`] if:
    /// - `quantity` is negative
    /// - the effective tax rate is not in [0, 100]
    /// - `quantity * rate` overflows
    pub fn validate(
        &self,
        default_tax_rate: Decimal,
    ) -> Result<(), LineItemError> {
        if self.quantity < Decimal::ZERO {
            return Err(LineItemError::NegativeQuantity(self.quantity));
        }
        let tax_rate = self.effective_tax_rate(default_tax_rate);
        if !is_valid_tax_rate(tax_rate) {
            return Err(LineItemError::TaxRateOutOfRange(tax_rate));
        }
        self.amount().map(|_| ())
    }
}

/// Whether `rate` is a usable percentage in [0, 100].
pub fn is_valid_tax_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= ONE_HUNDRED
}

fn finite_decimal(
    field: &'static str,
    value: f64,
) -> Result<Decimal, LineItemError> {
    if !value.is_finite() {
        return Err(LineItemError::NonFinite { field });
    }
    Decimal::try_from(value).map_err(|_| LineItemError::NonFinite { field })
}
