//! Invoice balance and late-fee calculations.
//!
//! Once an invoice's totals are fixed by the tax engine, two things can still
//! move its balance: payments and late fees. Both are derived here from the
//! stored invoice so the service layer only has to persist the result.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{percent_of, round_half_up};
use crate::models::{Invoice, InvoiceStatus};

/// An invoice balance that does not fit in a [`Decimal`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invoice balance is out of range")]
pub struct BalanceOverflow;

/// Balance derived from the payments recorded against an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSummary {
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub status: InvoiceStatus,
}

impl PaymentSummary {
    /// Sums `payments` and derives the amount due and payment status.
    ///
    /// # Arguments
    ///
    /// * `total` - The invoice's persisted total
    /// * `late_fee_amount` - Any late fee already accrued
    /// * `payments` - Amounts of every payment recorded against the invoice
    /// * `current_status` - The invoice's status before this change
    ///
    /// # Returns
    ///
    /// - `Paid` once the payments cover total plus late fee
    /// - `Partial` when something, but not everything, has been paid
    /// - otherwise the current status, except that `Paid` and `Partial`
    ///   fall back to `Sent` once the payments behind them are gone
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use invoice_core::calculations::PaymentSummary;
    /// use invoice_core::InvoiceStatus;
    ///
    /// let summary = PaymentSummary::from_payments(
    ///     dec!(113.00),
    ///     dec!(0),
    ///     [dec!(50.00), dec!(13.00)],
    ///     InvoiceStatus::Sent,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(summary.amount_paid, dec!(63.00));
    /// assert_eq!(summary.amount_due, dec!(50.00));
    /// assert_eq!(summary.status, InvoiceStatus::Partial);
    /// ```
    pub fn from_payments(
        total: Decimal,
        late_fee_amount: Decimal,
        payments: impl IntoIterator<Item = Decimal>,
        current_status: InvoiceStatus,
    ) -> Result<Self, BalanceOverflow> {
        let amount_paid = payments
            .into_iter()
            .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
            .ok_or(BalanceOverflow)?;
        let billable = total.checked_add(late_fee_amount).ok_or(BalanceOverflow)?;

        let status = if amount_paid > Decimal::ZERO && amount_paid >= billable {
            InvoiceStatus::Paid
        } else if amount_paid > Decimal::ZERO {
            InvoiceStatus::Partial
        } else if current_status.is_payment_driven() {
            InvoiceStatus::Sent
        } else {
            current_status
        };

        Ok(Self {
            amount_paid,
            amount_due: billable.checked_sub(amount_paid).ok_or(BalanceOverflow)?,
            status,
        })
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// Result of checking an invoice against its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateFeeAssessment {
    pub days_overdue: i64,
    pub late_fee_amount: Decimal,
    pub amount_due: Decimal,
    pub status: InvoiceStatus,
}

impl LateFeeAssessment {
    /// Assesses the late fee owed on `invoice` as of `today`.
    ///
    /// The fee is `total × late_fee_rate / 100 × days_overdue`, rounded to
    /// cents. Invoices that are no longer overdue have their fee reset and
    /// leave the `Overdue` status. Draft and paid invoices are returned
    /// unchanged, as is any invoice whose payments already cover the amount
    /// billed, whatever its status says.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::{NaiveDate, Utc};
    /// use rust_decimal_macros::dec;
    /// use invoice_core::calculations::{LateFeeAssessment, TaxBreakdown};
    /// use invoice_core::{Invoice, InvoiceStatus};
    ///
    /// let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let invoice = Invoice {
    ///     id: 1,
    ///     invoice_number: "INV-000001".into(),
    ///     estimate_id: None,
    ///     client_name: "Acme".into(),
    ///     status: InvoiceStatus::Sent,
    ///     issue_date: due,
    ///     due_date: due,
    ///     notes: None,
    ///     totals: TaxBreakdown::from_parts(dec!(1000), dec!(0), dec!(130)),
    ///     late_fee_rate: dec!(0.1),
    ///     late_fee_amount: dec!(0),
    ///     amount_paid: dec!(0),
    ///     amount_due: dec!(1130),
    ///     paid_at: None,
    ///     line_items: vec![],
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    ///
    /// let assessment = LateFeeAssessment::assess(&invoice, due + chrono::Days::new(10)).unwrap();
    ///
    /// assert_eq!(assessment.days_overdue, 10);
    /// assert_eq!(assessment.late_fee_amount, dec!(11.30));
    /// assert_eq!(assessment.amount_due, dec!(1141.30));
    /// assert_eq!(assessment.status, InvoiceStatus::Overdue);
    /// ```
    pub fn assess(
        invoice: &Invoice,
        today: NaiveDate,
    ) -> Result<Self, BalanceOverflow> {
        if !invoice.status.accrues_late_fees() || invoice.is_settled() {
            return Ok(Self::unchanged(invoice));
        }

        let days_overdue = invoice.days_overdue(today);

        if days_overdue == 0 {
            let status = match invoice.status {
                InvoiceStatus::Overdue if invoice.amount_paid > Decimal::ZERO => {
                    InvoiceStatus::Partial
                }
                InvoiceStatus::Overdue => InvoiceStatus::Sent,
                other => other,
            };
            return Ok(Self {
                days_overdue,
                late_fee_amount: Decimal::ZERO,
                amount_due: invoice
                    .totals
                    .total
                    .checked_sub(invoice.amount_paid)
                    .ok_or(BalanceOverflow)?,
                status,
            });
        }

        let late_fee_amount = percent_of(invoice.totals.total, invoice.late_fee_rate)
            .and_then(|daily_fee| daily_fee.checked_mul(Decimal::from(days_overdue)))
            .map(round_half_up)
            .ok_or(BalanceOverflow)?;
        let amount_due = invoice
            .totals
            .total
            .checked_add(late_fee_amount)
            .and_then(|billable| billable.checked_sub(invoice.amount_paid))
            .ok_or(BalanceOverflow)?;

        debug!(
            invoice_id = invoice.id,
            days_overdue,
            late_fee_amount = %late_fee_amount,
            "assessed late fee"
        );

        Ok(Self {
            days_overdue,
            late_fee_amount,
            amount_due,
            status: InvoiceStatus::Overdue,
        })
    }

    fn unchanged(invoice: &Invoice) -> Self {
        Self {
            days_overdue: 0,
            late_fee_amount: invoice.late_fee_amount,
            amount_due: invoice.amount_due,
            status: invoice.status,
        }
    }

    /// Whether applying this assessment would change the stored invoice.
    pub fn differs_from(
        &self,
        invoice: &Invoice,
    ) -> bool {
        self.late_fee_amount != invoice.late_fee_amount
            || self.amount_due != invoice.amount_due
            || self.status != invoice.status
    }
}
