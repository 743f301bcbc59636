use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{LineItem, TaxBreakdown};
use crate::models::{DocumentLineItem, InvoiceStatus, NewDocumentLineItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub estimate_id: Option<i64>,
    pub client_name: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,

    // Calculated values, rounded to cents
    pub totals: TaxBreakdown,

    // Late fee policy (percent of total per day overdue) and accrued fee
    pub late_fee_rate: Decimal,
    pub late_fee_amount: Decimal,

    // Balance
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub paid_at: Option<DateTime<Utc>>,

    pub line_items: Vec<DocumentLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Total plus any accrued late fee, or `None` if that overflows.
    pub fn billable(&self) -> Option<Decimal> {
        self.totals.total.checked_add(self.late_fee_amount)
    }

    /// Whether recorded payments cover everything billed, regardless of the
    /// stored status.
    pub fn is_settled(&self) -> bool {
        self.amount_paid > Decimal::ZERO
            && self
                .billable()
                .is_some_and(|billable| self.amount_paid >= billable)
    }

    /// Whole days past the due date, or zero if not yet due.
    pub fn days_overdue(
        &self,
        today: NaiveDate,
    ) -> i64 {
        (today - self.due_date).num_days().max(0)
    }

    pub fn balance(&self) -> InvoiceBalance {
        InvoiceBalance {
            status: self.status,
            late_fee_amount: self.late_fee_amount,
            amount_paid: self.amount_paid,
            amount_due: self.amount_due,
            paid_at: self.paid_at,
        }
    }
}

/// What a user enters when creating or editing an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceContent {
    pub client_name: String,
    /// Defaults to today.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    /// Defaults to the issue date plus the configured payment terms.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub late_fee_rate: Option<Decimal>,
    pub line_items: Vec<LineItem>,
}

/// The payment-dependent part of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBalance {
    pub status: InvoiceStatus,
    pub late_fee_amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub paid_at: Option<DateTime<Utc>>,
}

impl InvoiceBalance {
    /// Balance of a freshly created invoice: nothing paid, no fee.
    pub fn unpaid(
        status: InvoiceStatus,
        total: Decimal,
    ) -> Self {
        Self {
            status,
            late_fee_amount: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            amount_due: total,
            paid_at: None,
        }
    }
}

/// For creating or replacing invoices (no id, number or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub estimate_id: Option<i64>,
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub totals: TaxBreakdown,
    pub late_fee_rate: Decimal,
    pub balance: InvoiceBalance,
    pub line_items: Vec<NewDocumentLineItem>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn invoice(
        total: Decimal,
        late_fee_amount: Decimal,
        amount_paid: Decimal,
    ) -> Invoice {
        let day = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let now = Utc::now();
        Invoice {
            id: 1,
            invoice_number: "INV-000001".to_string(),
            estimate_id: None,
            client_name: "Northwind".to_string(),
            status: InvoiceStatus::Sent,
            issue_date: day,
            due_date: day,
            notes: None,
            totals: TaxBreakdown::from_parts(total, dec!(0), dec!(0)),
            late_fee_rate: dec!(0),
            late_fee_amount,
            amount_paid,
            amount_due: dec!(0),
            paid_at: None,
            line_items: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn billable_includes_late_fee() {
        assert_eq!(invoice(dec!(113), dec!(5.65), dec!(0)).billable(), Some(dec!(118.65)));
        assert_eq!(invoice(Decimal::MAX, dec!(1), dec!(0)).billable(), None);
    }

    #[test]
    fn settled_once_payments_cover_fee_too() {
        assert!(!invoice(dec!(113), dec!(5.65), dec!(113)).is_settled());
        assert!(invoice(dec!(113), dec!(5.65), dec!(118.65)).is_settled());
        assert!(invoice(dec!(113), dec!(0), dec!(150)).is_settled());
    }

    #[test]
    fn zero_total_without_payments_is_not_settled() {
        assert!(!invoice(dec!(0), dec!(0), dec!(0)).is_settled());
    }
}
