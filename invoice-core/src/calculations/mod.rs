//! Monetary calculations for estimates and invoices.
//!
//! This module provides the line-item tax engine used whenever a document's
//! line items change, plus the balance and late-fee math applied to invoices
//! once payments start arriving.

pub mod balance;
pub mod common;
pub mod line_items;
pub mod tax_breakdown;

pub use balance::{BalanceOverflow, LateFeeAssessment, PaymentSummary};
pub use line_items::{DEFAULT_TAX_RATE, LineItem, LineItemError};
pub use tax_breakdown::{
    TaxBreakdown, TaxCalculationError, TaxCalculator, TaxCalculatorConfig,
    calculate_tax_from_line_items,
};
