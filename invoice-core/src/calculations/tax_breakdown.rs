//! Tax breakdown calculation for estimate and invoice line items.
//!
//! This module derives the authoritative monetary fields of a document from
//! its line items. It runs whenever line items change: on creation, on edit,
//! when a template is applied and when an estimate is converted to an
//! invoice.
//!
//! # Calculation
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Resolve each item's effective tax rate (own rate, else default) |
//! | 2    | Amount = quantity × rate |
//! | 3    | Taxable if effective rate > 0, exempt if it is 0 |
//! | 4    | Taxable subtotal / exempt subtotal = sum of amounts per partition |
//! | 5    | Total tax = Σ taxable amount × rate / 100 |
//! | 6    | Subtotal = taxable + exempt; total = subtotal + total tax |
//!
//! All accumulation happens at full decimal precision. Rounding to cents is
//! done once, by [`TaxBreakdown::rounded`], when the result is persisted or
//! shown.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use invoice_core::calculations::{LineItem, TaxCalculator, TaxCalculatorConfig};
//!
//! let calculator = TaxCalculator::new(TaxCalculatorConfig::default());
//!
//! let items = vec![
//!     LineItem::new("Labour", dec!(1), dec!(100)).with_tax_rate(dec!(13)),
//!     LineItem::new("Permit", dec!(1), dec!(50)).with_tax_rate(dec!(0)),
//! ];
//!
//! let breakdown = calculator.calculate(&items).unwrap();
//!
//! assert_eq!(breakdown.taxable_subtotal, dec!(100));
//! assert_eq!(breakdown.exempt_subtotal, dec!(50));
//! assert_eq!(breakdown.subtotal, dec!(150));
//! assert_eq!(breakdown.total_tax, dec!(13));
//! assert_eq!(breakdown.total, dec!(163));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{percent_of, round_half_up};
use crate::calculations::line_items::{
    DEFAULT_TAX_RATE, LineItem, LineItemError, is_valid_tax_rate,
};

/// Errors that can occur during a tax breakdown calculation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxCalculationError {
    /// The configured default tax rate is not a percentage in [0, 100].
    #[error("default tax rate must be between 0 and 100, got {0}")]
    InvalidDefaultTaxRate(Decimal),

    /// A line item violated the calculator's input contract.
    #[error("invalid line item at position {index}: {source}")]
    InvalidLineItem {
        index: usize,
        #[source]
        source: LineItemError,
    },

    /// A running total left the representable decimal range.
    #[error("totals overflow at line item {index}")]
    Overflow { index: usize },
}

/// Configuration parameters for the tax calculator.
///
/// The default tax rate is a policy of the calling business, not something
/// the calculator stores on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculatorConfig {
    /// Tax rate (in percent) for items that do not carry their own.
    pub default_tax_rate: Decimal,
}

impl Default for TaxCalculatorConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl TaxCalculatorConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalculationError::InvalidDefaultTaxRate`] if the default
    /// tax rate is not in [0, 100].
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use invoice_core::calculations::{TaxCalculationError, TaxCalculatorConfig};
    ///
    /// let config = TaxCalculatorConfig { default_tax_rate: dec!(-1) };
    ///
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(TaxCalculationError::InvalidDefaultTaxRate(dec!(-1)))
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), TaxCalculationError> {
        if !is_valid_tax_rate(self.default_tax_rate) {
            return Err(TaxCalculationError::InvalidDefaultTaxRate(
                self.default_tax_rate,
            ));
        }
        Ok(())
    }
}

/// Totals derived from a list of line items.
///
/// Always satisfies `subtotal == taxable_subtotal + exempt_subtotal` and
/// `total == subtotal + total_tax`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Sum of amounts over items whose effective tax rate is greater than zero.
    pub taxable_subtotal: Decimal,

    /// Sum of amounts over items whose effective tax rate is zero.
    pub exempt_subtotal: Decimal,

    /// Sum of all item amounts before tax.
    pub subtotal: Decimal,

    /// Sum over taxable items of amount × rate / 100.
    pub total_tax: Decimal,

    /// Subtotal plus total tax: the billable amount.
    pub total: Decimal,
}

impl TaxBreakdown {
    /// Builds a breakdown from its three independent components.
    pub fn from_parts(
        taxable_subtotal: Decimal,
        exempt_subtotal: Decimal,
        total_tax: Decimal,
    ) -> Self {
        let subtotal = taxable_subtotal + exempt_subtotal;
        Self {
            taxable_subtotal,
            exempt_subtotal,
            subtotal,
            total_tax,
            total: subtotal + total_tax,
        }
    }

    /// Like [`TaxBreakdown::from_parts`], but `None` when the subtotal or
    /// total does not fit in a [`Decimal`].
    pub fn checked_from_parts(
        taxable_subtotal: Decimal,
        exempt_subtotal: Decimal,
        total_tax: Decimal,
    ) -> Option<Self> {
        let subtotal = taxable_subtotal.checked_add(exempt_subtotal)?;
        Some(Self {
            taxable_subtotal,
            exempt_subtotal,
            subtotal,
            total_tax,
            total: subtotal.checked_add(total_tax)?,
        })
    }

    /// Returns the breakdown rounded to cents for persistence or display.
    ///
    /// The taxable subtotal, exempt subtotal and total tax are rounded
    /// half-up individually; subtotal and total are then re-derived from the
    /// rounded parts so the record keeps its invariants.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use invoice_core::calculations::TaxBreakdown;
    ///
    /// let exact = TaxBreakdown::from_parts(dec!(99.975), dec!(0.004), dec!(12.99675));
    /// let rounded = exact.rounded();
    ///
    /// assert_eq!(rounded.taxable_subtotal, dec!(99.98));
    /// assert_eq!(rounded.exempt_subtotal, dec!(0.00));
    /// assert_eq!(rounded.total_tax, dec!(13.00));
    /// assert_eq!(rounded.total, dec!(112.98));
    /// ```
    pub fn rounded(&self) -> Self {
        Self::from_parts(
            round_half_up(self.taxable_subtotal),
            round_half_up(self.exempt_subtotal),
            round_half_up(self.total_tax),
        )
    }

    /// Whether every field is zero.
    pub fn is_zero(&self) -> bool {
        self.taxable_subtotal.is_zero()
            && self.exempt_subtotal.is_zero()
            && self.total_tax.is_zero()
    }
}

/// Calculator for document tax breakdowns.
///
/// Stateless apart from its configuration, so a single instance can be
/// shared freely across threads and call sites.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use invoice_core::calculations::{LineItem, TaxCalculator, TaxCalculatorConfig};
///
/// let calculator = TaxCalculator::new(TaxCalculatorConfig { default_tax_rate: dec!(13) });
///
/// // No per-item rate: the 13% default applies
/// let breakdown = calculator
///     .calculate(&[LineItem::new("Install", dec!(1), dec!(200))])
///     .unwrap();
///
/// assert_eq!(breakdown.total_tax, dec!(26));
/// assert_eq!(breakdown.total, dec!(226));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxCalculator {
    config: TaxCalculatorConfig,
}

impl TaxCalculator {
    /// Creates a new calculator with the given configuration.
    pub fn new(config: TaxCalculatorConfig) -> Self {
        Self { config }
    }

    /// Calculates the tax breakdown for `items`.
    ///
    /// Every item is validated before any arithmetic happens, so a rejected
    /// list never produces a partial result. The returned breakdown is at
    /// full precision; call [`TaxBreakdown::rounded`] before persisting it.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalculationError`] if:
    /// - the configured default tax rate is not in [0, 100]
    /// - any item has a negative quantity
    /// - any item's effective tax rate is not in [0, 100]
    /// - any item's amount, or a running total, does not fit in a decimal
    pub fn calculate(
        &self,
        items: &[LineItem],
    ) -> Result<TaxBreakdown, TaxCalculationError> {
        self.config.validate()?;
        self.validate_items(items)?;

        let default_tax_rate = self.config.default_tax_rate;
        let mut taxable_subtotal = Decimal::ZERO;
        let mut exempt_subtotal = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;

        for (index, item) in items.iter().enumerate() {
            let amount = self.line_amount(index, item)?;
            let tax_rate = item.effective_tax_rate(default_tax_rate);
            let overflow = || TaxCalculationError::Overflow { index };

            if tax_rate.is_zero() {
                exempt_subtotal = exempt_subtotal.checked_add(amount).ok_or_else(overflow)?;
            } else {
                taxable_subtotal = taxable_subtotal.checked_add(amount).ok_or_else(overflow)?;
                let tax = percent_of(amount, tax_rate).ok_or_else(overflow)?;
                total_tax = total_tax.checked_add(tax).ok_or_else(overflow)?;
            }
        }

        let last = items.len().saturating_sub(1);
        let breakdown = TaxBreakdown::checked_from_parts(taxable_subtotal, exempt_subtotal, total_tax)
            .ok_or(TaxCalculationError::Overflow { index: last })?;

        debug!(
            items = items.len(),
            taxable_subtotal = %breakdown.taxable_subtotal,
            exempt_subtotal = %breakdown.exempt_subtotal,
            total_tax = %breakdown.total_tax,
            total = %breakdown.total,
            "calculated tax breakdown"
        );

        Ok(breakdown)
    }

    fn validate_items(
        &self,
        items: &[LineItem],
    ) -> Result<(), TaxCalculationError> {
        items.iter().enumerate().try_for_each(|(index, item)| {
            item.validate(self.config.default_tax_rate)
                .map_err(|source| TaxCalculationError::InvalidLineItem { index, source })
        })
    }

    /// Computes one item's amount, flagging discount lines.
    fn line_amount(
        &self,
        index: usize,
        item: &LineItem,
    ) -> Result<Decimal, TaxCalculationError> {
        let amount = item
            .amount()
            .map_err(|source| TaxCalculationError::InvalidLineItem { index, source })?;
        if amount < Decimal::ZERO {
            warn!(
                index,
                quantity = %item.quantity,
                rate = %item.rate,
                amount = %amount,
                "Line item amount is negative; treating it as a discount"
            );
        }
        Ok(amount)
    }
}

/// Calculates the tax breakdown for `items` with the given default tax rate.
///
/// Shorthand for `TaxCalculator::new(TaxCalculatorConfig { default_tax_rate }).calculate(items)`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use invoice_core::calculations::{LineItem, calculate_tax_from_line_items};
///
/// let breakdown = calculate_tax_from_line_items(
///     &[LineItem::new("Paint", dec!(2), dec!(50)).with_tax_rate(dec!(0))],
///     dec!(13),
/// ).unwrap();
///
/// assert_eq!(breakdown.exempt_subtotal, dec!(100));
/// assert_eq!(breakdown.total, dec!(100));
/// ```
pub fn calculate_tax_from_line_items(
    items: &[LineItem],
    default_tax_rate: Decimal,
) -> Result<TaxBreakdown, TaxCalculationError> {
    TaxCalculator::new(TaxCalculatorConfig { default_tax_rate }).calculate(items)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn calculator() -> TaxCalculator {
        TaxCalculator::new(TaxCalculatorConfig::default())
    }

    fn item(
        quantity: Decimal,
        rate: Decimal,
        tax_rate: Option<Decimal>,
    ) -> LineItem {
        LineItem {
            description: "test item".to_string(),
            quantity,
            unit: None,
            rate,
            tax_rate,
        }
    }

    /// Log sink shared between a test and the subscriber it installs.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Routes WARN and above on this thread into the returned sink.
    fn capture_warnings() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    // =========================================================================
    // TaxCalculatorConfig::validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_default_config() {
        assert_eq!(TaxCalculatorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_zero_default_rate() {
        let config = TaxCalculatorConfig {
            default_tax_rate: dec!(0),
        };

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_default_rate_above_one_hundred() {
        let config = TaxCalculatorConfig {
            default_tax_rate: dec!(101),
        };

        assert_eq!(
            config.validate(),
            Err(TaxCalculationError::InvalidDefaultTaxRate(dec!(101)))
        );
    }

    // =========================================================================
    // Worked scenarios
    // =========================================================================

    #[test]
    fn single_taxable_item() {
        let result = calculator()
            .calculate(&[item(dec!(1), dec!(100), Some(dec!(13)))])
            .unwrap();

        assert_eq!(
            result,
            TaxBreakdown {
                taxable_subtotal: dec!(100),
                exempt_subtotal: dec!(0),
                subtotal: dec!(100),
                total_tax: dec!(13),
                total: dec!(113),
            }
        );
    }

    #[test]
    fn single_exempt_item() {
        let result = calculator()
            .calculate(&[item(dec!(2), dec!(50), Some(dec!(0)))])
            .unwrap();

        assert_eq!(
            result,
            TaxBreakdown {
                taxable_subtotal: dec!(0),
                exempt_subtotal: dec!(100),
                subtotal: dec!(100),
                total_tax: dec!(0),
                total: dec!(100),
            }
        );
    }

    #[test]
    fn mixed_taxable_and_exempt_items() {
        let result = calculator()
            .calculate(&[
                item(dec!(1), dec!(100), Some(dec!(13))),
                item(dec!(1), dec!(50), Some(dec!(0))),
            ])
            .unwrap();

        assert_eq!(
            result,
            TaxBreakdown {
                taxable_subtotal: dec!(100),
                exempt_subtotal: dec!(50),
                subtotal: dec!(150),
                total_tax: dec!(13),
                total: dec!(163),
            }
        );
    }

    #[test]
    fn missing_tax_rate_uses_default() {
        let result = calculator()
            .calculate(&[item(dec!(1), dec!(200), None)])
            .unwrap();

        assert_eq!(result.taxable_subtotal, dec!(200));
        assert_eq!(result.exempt_subtotal, dec!(0));
        assert_eq!(result.total_tax, dec!(26));
        assert_eq!(result.total, dec!(226));
    }

    #[test]
    fn empty_list_yields_zero_breakdown() {
        let result = calculator().calculate(&[]).unwrap();

        assert_eq!(result, TaxBreakdown::default());
        assert!(result.is_zero());
    }

    #[test]
    fn fractional_quantity() {
        let result = calculator()
            .calculate(&[item(dec!(2.5), dec!(40), Some(dec!(13)))])
            .unwrap();

        assert_eq!(result.subtotal, dec!(100));
        assert_eq!(result.total_tax, dec!(13));
        assert_eq!(result.total, dec!(113));
    }

    #[test]
    fn zero_default_moves_unrated_items_to_exempt() {
        let calculator = TaxCalculator::new(TaxCalculatorConfig {
            default_tax_rate: dec!(0),
        });

        let result = calculator
            .calculate(&[
                item(dec!(1), dec!(80), None),
                item(dec!(1), dec!(20), Some(dec!(5))),
            ])
            .unwrap();

        assert_eq!(result.taxable_subtotal, dec!(20));
        assert_eq!(result.exempt_subtotal, dec!(80));
        assert_eq!(result.total_tax, dec!(1));
    }

    #[test]
    fn multiple_rates_accumulate_independently() {
        let result = calculator()
            .calculate(&[
                item(dec!(1), dec!(100), Some(dec!(5))),
                item(dec!(1), dec!(100), Some(dec!(13))),
                item(dec!(1), dec!(100), Some(dec!(14.975))),
            ])
            .unwrap();

        assert_eq!(result.taxable_subtotal, dec!(300));
        assert_eq!(result.total_tax, dec!(32.975));
        assert_eq!(result.total, dec!(332.975));
    }

    #[test]
    fn accumulation_keeps_sub_cent_precision() {
        // Three items each worth 0.333.. in tax; rounding per item would lose a cent.
        let items: Vec<_> = (0..3)
            .map(|_| item(dec!(1), dec!(2.5641), Some(dec!(13))))
            .collect();

        let result = calculator().calculate(&items).unwrap();

        assert_eq!(result.total_tax, dec!(0.999999));
        assert_eq!(result.rounded().total_tax, dec!(1.00));
    }

    #[test]
    fn supplied_amount_is_never_trusted() {
        // LineItem has no amount field; a changed rate always changes the total.
        let mut line = item(dec!(3), dec!(10), Some(dec!(0)));
        let before = calculator().calculate(std::slice::from_ref(&line)).unwrap();
        line.rate = dec!(11);
        let after = calculator().calculate(std::slice::from_ref(&line)).unwrap();

        assert_eq!(before.subtotal, dec!(30));
        assert_eq!(after.subtotal, dec!(33));
    }

    #[test]
    fn discount_line_reduces_totals() {
        let (logs, _guard) = capture_warnings();

        let result = calculator()
            .calculate(&[
                item(dec!(1), dec!(200), Some(dec!(13))),
                item(dec!(1), dec!(-50), Some(dec!(13))),
            ])
            .unwrap();

        assert_eq!(result.taxable_subtotal, dec!(150));
        assert_eq!(result.total_tax, dec!(19.5));
        assert_eq!(result.total, dec!(169.5));
        let logs = logs.contents();
        assert!(logs.contains("treating it as a discount"), "{logs}");
        assert!(logs.contains("index=1"), "{logs}");
        assert_eq!(logs.matches("WARN").count(), 1, "{logs}");
    }

    #[test]
    fn positive_lines_log_no_warning() {
        let (logs, _guard) = capture_warnings();

        calculator()
            .calculate(&[item(dec!(1), dec!(200), None)])
            .unwrap();

        assert_eq!(logs.contents(), "");
    }

    // =========================================================================
    // Overflow
    // =========================================================================

    #[test]
    fn oversized_amount_is_rejected_not_panicking() {
        let result = calculate_tax_from_line_items(
            &[item(Decimal::MAX, dec!(2), Some(dec!(0)))],
            dec!(13),
        );

        assert_eq!(
            result,
            Err(TaxCalculationError::InvalidLineItem {
                index: 0,
                source: LineItemError::AmountOutOfRange {
                    quantity: Decimal::MAX,
                    rate: dec!(2),
                },
            })
        );
    }

    #[test]
    fn full_rate_tax_on_huge_amount_fits() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);

        let result = calculate_tax_from_line_items(&[item(huge, dec!(1), Some(dec!(100)))], dec!(13))
            .unwrap();

        assert_eq!(result.taxable_subtotal, huge);
        assert_eq!(result.total_tax, huge);
        assert_eq!(result.total, huge * dec!(2));
    }

    #[test]
    fn subtotal_overflow_names_the_item() {
        let result = calculator().calculate(&[
            item(dec!(1), Decimal::MAX, Some(dec!(0))),
            item(dec!(1), dec!(10), Some(dec!(0))),
            item(dec!(1), Decimal::MAX, Some(dec!(0))),
        ]);

        assert_eq!(result, Err(TaxCalculationError::Overflow { index: 1 }));
    }

    #[test]
    fn total_overflow_after_adding_tax_is_an_error() {
        // Each partition fits alone; their sum does not.
        let result = calculator().calculate(&[
            item(dec!(1), Decimal::MAX, Some(dec!(0))),
            item(dec!(1), dec!(100), Some(dec!(13))),
        ]);

        assert_eq!(result, Err(TaxCalculationError::Overflow { index: 1 }));
    }

    #[test]
    fn calculation_is_repeatable() {
        let items = vec![
            item(dec!(1.333), dec!(17.77), Some(dec!(13))),
            item(dec!(7), dec!(0.99), None),
            item(dec!(2), dec!(45), Some(dec!(0))),
        ];

        let first = calculator().calculate(&items).unwrap();
        let second = calculator().calculate(&items).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.rounded(), first.rounded().rounded());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn rejects_negative_quantity_with_position() {
        let result = calculator().calculate(&[
            item(dec!(1), dec!(10), None),
            item(dec!(-2), dec!(10), None),
        ]);

        assert_eq!(
            result,
            Err(TaxCalculationError::InvalidLineItem {
                index: 1,
                source: LineItemError::NegativeQuantity(dec!(-2)),
            })
        );
    }

    #[test]
    fn rejects_out_of_range_item_tax_rate() {
        let result = calculator().calculate(&[item(dec!(1), dec!(10), Some(dec!(-13)))]);

        assert_eq!(
            result,
            Err(TaxCalculationError::InvalidLineItem {
                index: 0,
                source: LineItemError::TaxRateOutOfRange(dec!(-13)),
            })
        );
    }

    #[test]
    fn rejects_invalid_default_even_for_empty_list() {
        let calculator = TaxCalculator::new(TaxCalculatorConfig {
            default_tax_rate: dec!(-1),
        });

        assert_eq!(
            calculator.calculate(&[]),
            Err(TaxCalculationError::InvalidDefaultTaxRate(dec!(-1)))
        );
    }

    #[test]
    fn invalid_default_rejected_even_when_items_carry_rates() {
        let result = calculate_tax_from_line_items(
            &[item(dec!(1), dec!(10), Some(dec!(13)))],
            dec!(150),
        );

        assert_eq!(
            result,
            Err(TaxCalculationError::InvalidDefaultTaxRate(dec!(150)))
        );
    }

    #[test]
    fn error_message_names_position() {
        let err = calculator()
            .calculate(&[item(dec!(-1), dec!(1), None)])
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid line item at position 0: quantity must be non-negative, got -1"
        );
    }

    // =========================================================================
    // Rounding
    // =========================================================================

    #[test]
    fn rounded_keeps_invariants() {
        let exact = TaxBreakdown::from_parts(dec!(10.005), dec!(10.005), dec!(1.30065));

        let rounded = exact.rounded();

        assert_eq!(rounded.taxable_subtotal, dec!(10.01));
        assert_eq!(rounded.exempt_subtotal, dec!(10.01));
        assert_eq!(rounded.subtotal, dec!(20.02));
        assert_eq!(rounded.total_tax, dec!(1.30));
        assert_eq!(rounded.total, dec!(21.32));
    }

    #[test]
    fn from_parts_derives_subtotal_and_total() {
        let breakdown = TaxBreakdown::from_parts(dec!(100), dec!(50), dec!(13));

        assert_eq!(breakdown.subtotal, dec!(150));
        assert_eq!(breakdown.total, dec!(163));
    }
}
