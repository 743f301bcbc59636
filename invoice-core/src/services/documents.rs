//! Estimate and invoice workflows.
//!
//! Every path that changes a document's line items goes through
//! [`DocumentService`], which recalculates totals with the tax engine and
//! persists the rounded result together with the resolved line items. The
//! calculator's output is the only source of a document's monetary fields.

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::calculations::{
    BalanceOverflow, DEFAULT_TAX_RATE, LateFeeAssessment, LineItem, PaymentSummary, TaxBreakdown,
    TaxCalculationError, TaxCalculator, TaxCalculatorConfig,
};
use crate::db::repository::{InvoiceRepository, RepositoryError};
use crate::models::{
    Estimate, EstimateContent, EstimateStatus, Invoice, InvoiceBalance, InvoiceContent,
    InvoiceStatus, NewDocumentLineItem, NewEstimate, NewInvoice, NewPayment, Payment,
    resolve_line_items,
};

/// Number of days between issue date and due date unless configured otherwise.
pub const DEFAULT_PAYMENT_TERMS_DAYS: u32 = 30;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Calculation(#[from] TaxCalculationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Balance(#[from] BalanceOverflow),

    #[error("payment amount must be positive, got {0}")]
    InvalidPayment(Decimal),

    #[error("invoice status '{}' follows from payments; record or delete a payment instead", .0.as_str())]
    PaymentDrivenStatus(InvoiceStatus),

    #[error("invoice {0} is fully paid; delete a payment before changing its status")]
    SettledInvoice(i64),
}

/// Business defaults applied when a document does not specify its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub default_tax_rate: Decimal,
    pub payment_terms_days: u32,
    /// Percent of the invoice total charged per day overdue.
    pub late_fee_rate: Decimal,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: DEFAULT_TAX_RATE,
            payment_terms_days: DEFAULT_PAYMENT_TERMS_DAYS,
            late_fee_rate: Decimal::ZERO,
        }
    }
}

pub struct DocumentService<'a> {
    repo: &'a dyn InvoiceRepository,
    config: ServiceConfig,
    calculator: TaxCalculator,
}

impl<'a> DocumentService<'a> {
    pub fn new(
        repo: &'a dyn InvoiceRepository,
        config: ServiceConfig,
    ) -> Self {
        let calculator = TaxCalculator::new(TaxCalculatorConfig {
            default_tax_rate: config.default_tax_rate,
        });
        Self {
            repo,
            config,
            calculator,
        }
    }

    /// Calculates totals for `items` without persisting anything.
    ///
    /// The result is rounded to cents, exactly as it would be stored.
    pub fn preview_totals(
        &self,
        items: &[LineItem],
    ) -> Result<TaxBreakdown, ServiceError> {
        Ok(self.calculator.calculate(items)?.rounded())
    }

    /// Recalculates `items` and resolves them for storage.
    fn price(
        &self,
        items: &[LineItem],
    ) -> Result<(TaxBreakdown, Vec<NewDocumentLineItem>), ServiceError> {
        let totals = self.preview_totals(items)?;
        let line_items = resolve_line_items(items, self.config.default_tax_rate)?;
        Ok((totals, line_items))
    }

    // =========================================================================
    // Estimates
    // =========================================================================

    pub async fn create_estimate(
        &self,
        content: &EstimateContent,
    ) -> Result<Estimate, ServiceError> {
        let (totals, line_items) = self.price(&content.line_items)?;

        let estimate = self
            .repo
            .create_estimate(&NewEstimate {
                client_name: content.client_name.clone(),
                status: EstimateStatus::Draft,
                valid_until: content.valid_until,
                notes: content.notes.clone(),
                totals,
                line_items,
            })
            .await?;

        info!(
            estimate_id = estimate.id,
            number = %estimate.estimate_number,
            total = %estimate.totals.total,
            "created estimate"
        );
        Ok(estimate)
    }

    /// Replaces an estimate's content and line items, keeping its status.
    pub async fn update_estimate(
        &self,
        id: i64,
        content: &EstimateContent,
    ) -> Result<Estimate, ServiceError> {
        let existing = self.repo.get_estimate(id).await?;
        let (totals, line_items) = self.price(&content.line_items)?;

        let estimate = self
            .repo
            .update_estimate(
                id,
                &NewEstimate {
                    client_name: content.client_name.clone(),
                    status: existing.status,
                    valid_until: content.valid_until,
                    notes: content.notes.clone(),
                    totals,
                    line_items,
                },
            )
            .await?;

        info!(estimate_id = id, total = %estimate.totals.total, "updated estimate");
        Ok(estimate)
    }

    pub async fn get_estimate(
        &self,
        id: i64,
    ) -> Result<Estimate, ServiceError> {
        Ok(self.repo.get_estimate(id).await?)
    }

    pub async fn list_estimates(
        &self,
        status: Option<EstimateStatus>,
    ) -> Result<Vec<Estimate>, ServiceError> {
        Ok(self.repo.list_estimates(status).await?)
    }

    pub async fn set_estimate_status(
        &self,
        id: i64,
        status: EstimateStatus,
    ) -> Result<(), ServiceError> {
        self.repo.update_estimate_status(id, status).await?;
        info!(estimate_id = id, status = status.as_str(), "estimate status changed");
        Ok(())
    }

    pub async fn delete_estimate(
        &self,
        id: i64,
    ) -> Result<(), ServiceError> {
        self.repo.delete_estimate(id).await?;
        info!(estimate_id = id, "deleted estimate");
        Ok(())
    }

    /// Marks open estimates whose `valid_until` is before `today` as expired
    /// and returns the ones that changed.
    ///
    /// Estimates without a `valid_until` never expire.
    pub async fn expire_estimates(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Estimate>, ServiceError> {
        let mut expired = Vec::new();

        for estimate in self.repo.list_estimates(None).await? {
            if !estimate.has_lapsed(today) {
                continue;
            }
            self.repo
                .update_estimate_status(estimate.id, EstimateStatus::Expired)
                .await?;
            expired.push(self.repo.get_estimate(estimate.id).await?);
        }

        info!(%today, expired = expired.len(), "expired estimates");
        Ok(expired)
    }

    /// Creates a draft invoice from an estimate's stored line items.
    ///
    /// Totals are recalculated rather than copied, so the invoice always
    /// reflects its own line items. The estimate itself is left unchanged.
    pub async fn convert_estimate_to_invoice(
        &self,
        estimate_id: i64,
        today: NaiveDate,
    ) -> Result<Invoice, ServiceError> {
        let estimate = self.repo.get_estimate(estimate_id).await?;
        let totals = self.preview_totals(&estimate.calculator_items())?;

        if totals != estimate.totals {
            warn!(
                estimate_id,
                stored_total = %estimate.totals.total,
                recalculated_total = %totals.total,
                "Stored estimate totals differ from its line items; using recalculated totals"
            );
        }

        let invoice = self
            .repo
            .create_invoice(&NewInvoice {
                estimate_id: Some(estimate.id),
                client_name: estimate.client_name.clone(),
                issue_date: today,
                due_date: self.due_date_from(today),
                notes: estimate.notes.clone(),
                totals,
                late_fee_rate: self.config.late_fee_rate,
                balance: InvoiceBalance::unpaid(InvoiceStatus::Draft, totals.total),
                line_items: estimate
                    .line_items
                    .iter()
                    .map(NewDocumentLineItem::from)
                    .collect(),
            })
            .await?;

        info!(
            estimate_id,
            invoice_id = invoice.id,
            number = %invoice.invoice_number,
            "converted estimate to invoice"
        );
        Ok(invoice)
    }

    // =========================================================================
    // Invoices
    // =========================================================================

    pub async fn create_invoice(
        &self,
        content: &InvoiceContent,
        today: NaiveDate,
    ) -> Result<Invoice, ServiceError> {
        let (totals, line_items) = self.price(&content.line_items)?;
        let issue_date = content.issue_date.unwrap_or(today);

        let invoice = self
            .repo
            .create_invoice(&NewInvoice {
                estimate_id: None,
                client_name: content.client_name.clone(),
                issue_date,
                due_date: content
                    .due_date
                    .unwrap_or_else(|| self.due_date_from(issue_date)),
                notes: content.notes.clone(),
                totals,
                late_fee_rate: content.late_fee_rate.unwrap_or(self.config.late_fee_rate),
                balance: InvoiceBalance::unpaid(InvoiceStatus::Draft, totals.total),
                line_items,
            })
            .await?;

        info!(
            invoice_id = invoice.id,
            number = %invoice.invoice_number,
            total = %invoice.totals.total,
            "created invoice"
        );
        Ok(invoice)
    }

    /// Replaces an invoice's content and line items.
    ///
    /// The amount due is recomputed from the new total, the late fee and
    /// every payment already recorded, so editing a partly paid invoice can
    /// move it between `Partial` and `Paid`. An accrued late fee is
    /// reassessed as of `today` against the new total and due date.
    pub async fn update_invoice(
        &self,
        id: i64,
        content: &InvoiceContent,
        today: NaiveDate,
    ) -> Result<Invoice, ServiceError> {
        let existing = self.repo.get_invoice(id).await?;
        let (totals, line_items) = self.price(&content.line_items)?;
        let payments = self.repo.list_payments(id).await?;

        let mut revised = existing.clone();
        revised.client_name = content.client_name.clone();
        revised.issue_date = content.issue_date.unwrap_or(existing.issue_date);
        revised.due_date = content.due_date.unwrap_or(existing.due_date);
        revised.notes = content.notes.clone();
        revised.totals = totals;
        revised.late_fee_rate = content.late_fee_rate.unwrap_or(existing.late_fee_rate);

        if revised.status == InvoiceStatus::Overdue || !revised.late_fee_amount.is_zero() {
            let assessment = LateFeeAssessment::assess(&revised, today)?;
            revised.late_fee_amount = assessment.late_fee_amount;
            revised.status = assessment.status;
        }

        let summary = PaymentSummary::from_payments(
            totals.total,
            revised.late_fee_amount,
            payments.iter().map(|p| p.amount),
            revised.status,
        )?;

        let invoice = self
            .repo
            .update_invoice(
                id,
                &NewInvoice {
                    estimate_id: revised.estimate_id,
                    balance: balance_from(&summary, &revised),
                    client_name: revised.client_name,
                    issue_date: revised.issue_date,
                    due_date: revised.due_date,
                    notes: revised.notes,
                    totals,
                    late_fee_rate: revised.late_fee_rate,
                    line_items,
                },
            )
            .await?;

        info!(
            invoice_id = id,
            total = %invoice.totals.total,
            amount_due = %invoice.amount_due,
            "updated invoice"
        );
        Ok(invoice)
    }

    pub async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<Invoice, ServiceError> {
        Ok(self.repo.get_invoice(id).await?)
    }

    pub async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, ServiceError> {
        Ok(self.repo.list_invoices(status).await?)
    }

    /// Sets a user-controlled status such as `Sent`.
    ///
    /// # Errors
    ///
    /// * `Partial` and `Paid` are derived from payments and are rejected with
    ///   [`ServiceError::PaymentDrivenStatus`].
    /// * An invoice whose payments cover everything billed keeps its `Paid`
    ///   status; changing it fails with [`ServiceError::SettledInvoice`].
    pub async fn set_invoice_status(
        &self,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<(), ServiceError> {
        if status.is_payment_driven() {
            return Err(ServiceError::PaymentDrivenStatus(status));
        }
        if self.repo.get_invoice(id).await?.is_settled() {
            return Err(ServiceError::SettledInvoice(id));
        }
        self.repo.update_invoice_status(id, status).await?;
        info!(invoice_id = id, status = status.as_str(), "invoice status changed");
        Ok(())
    }

    pub async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), ServiceError> {
        self.repo.delete_invoice(id).await?;
        info!(invoice_id = id, "deleted invoice");
        Ok(())
    }

    // =========================================================================
    // Payments and late fees
    // =========================================================================

    /// Records a payment and returns it with the invoice's new balance.
    pub async fn record_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<(Payment, Invoice), ServiceError> {
        if payment.amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidPayment(payment.amount));
        }

        let invoice = self.repo.get_invoice(payment.invoice_id).await?;
        let existing = self.repo.list_payments(invoice.id).await?;
        PaymentSummary::from_payments(
            invoice.totals.total,
            invoice.late_fee_amount,
            existing.iter().map(|p| p.amount).chain([payment.amount]),
            invoice.status,
        )?;

        let recorded = self.repo.add_payment(payment).await?;
        let invoice = self.refresh_balance(payment.invoice_id).await?;

        info!(
            invoice_id = invoice.id,
            payment_id = recorded.id,
            amount = %recorded.amount,
            status = invoice.status.as_str(),
            "recorded payment"
        );
        Ok((recorded, invoice))
    }

    /// Deletes a payment and returns the invoice with its balance restored.
    pub async fn delete_payment(
        &self,
        payment_id: i64,
    ) -> Result<Invoice, ServiceError> {
        let payment = self.repo.get_payment(payment_id).await?;
        self.repo.delete_payment(payment_id).await?;
        let invoice = self.refresh_balance(payment.invoice_id).await?;

        info!(
            invoice_id = invoice.id,
            payment_id,
            status = invoice.status.as_str(),
            "deleted payment"
        );
        Ok(invoice)
    }

    pub async fn list_payments(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<Payment>, ServiceError> {
        self.repo.get_invoice(invoice_id).await?;
        Ok(self.repo.list_payments(invoice_id).await?)
    }

    /// Applies late fees as of `today` and returns every invoice that changed.
    pub async fn assess_late_fees(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Invoice>, ServiceError> {
        let mut changed = Vec::new();

        for invoice in self.repo.list_invoices(None).await? {
            let assessment = LateFeeAssessment::assess(&invoice, today)?;
            if !assessment.differs_from(&invoice) {
                continue;
            }

            let balance = InvoiceBalance {
                status: assessment.status,
                late_fee_amount: assessment.late_fee_amount,
                amount_due: assessment.amount_due,
                ..invoice.balance()
            };
            self.repo.update_invoice_balance(invoice.id, &balance).await?;
            changed.push(self.repo.get_invoice(invoice.id).await?);
        }

        info!(%today, updated = changed.len(), "assessed late fees");
        Ok(changed)
    }

    async fn refresh_balance(
        &self,
        invoice_id: i64,
    ) -> Result<Invoice, ServiceError> {
        let invoice = self.repo.get_invoice(invoice_id).await?;
        let payments = self.repo.list_payments(invoice_id).await?;

        let summary = PaymentSummary::from_payments(
            invoice.totals.total,
            invoice.late_fee_amount,
            payments.iter().map(|p| p.amount),
            invoice.status,
        )?;

        self.repo
            .update_invoice_balance(invoice_id, &balance_from(&summary, &invoice))
            .await?;
        Ok(self.repo.get_invoice(invoice_id).await?)
    }

    fn due_date_from(
        &self,
        issue_date: NaiveDate,
    ) -> NaiveDate {
        issue_date
            .checked_add_days(Days::new(u64::from(self.config.payment_terms_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Builds the stored balance for `summary`, stamping `paid_at` the first time
/// an invoice becomes paid and clearing it when it no longer is.
fn balance_from(
    summary: &PaymentSummary,
    invoice: &Invoice,
) -> InvoiceBalance {
    let paid_at = if summary.is_paid() {
        invoice.paid_at.or_else(|| Some(Utc::now()))
    } else {
        None
    };

    InvoiceBalance {
        status: summary.status,
        late_fee_amount: invoice.late_fee_amount,
        amount_paid: summary.amount_paid,
        amount_due: summary.amount_due,
        paid_at,
    }
}
