//! A process-local repository backend.
//!
//! Nothing survives the process. It backs quick `totals`-style sessions and
//! gives the service layer a storage implementation that needs no database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{InvoiceRepository, RepositoryError};
use crate::models::{
    DocumentLineItem, ESTIMATE_PREFIX, Estimate, EstimateStatus, INVOICE_PREFIX, Invoice,
    InvoiceBalance, InvoiceStatus, NewDocumentLineItem, NewEstimate, NewInvoice, NewPayment,
    Payment, format_document_number,
};

#[derive(Debug, Default)]
struct State {
    estimates: Vec<Estimate>,
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
    last_estimate_id: i64,
    last_invoice_id: i64,
    last_payment_id: i64,
    last_line_item_id: i64,
}

impl State {
    fn line_items(
        &mut self,
        items: &[NewDocumentLineItem],
    ) -> Vec<DocumentLineItem> {
        items
            .iter()
            .map(|item| {
                self.last_line_item_id += 1;
                DocumentLineItem {
                    id: self.last_line_item_id,
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit: item.unit.clone(),
                    rate: item.rate,
                    amount: item.amount,
                    tax_rate: item.tax_rate,
                    sort_order: item.sort_order,
                }
            })
            .collect()
    }

    fn estimate_mut(
        &mut self,
        id: i64,
    ) -> Result<&mut Estimate, RepositoryError> {
        self.estimates
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepositoryError::NotFound)
    }

    fn invoice_mut(
        &mut self,
        id: i64,
    ) -> Result<&mut Invoice, RepositoryError> {
        self.invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Repository that keeps every record in memory behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::Database(format!("state lock poisoned: {e}")))
    }
}

#[async_trait]
impl InvoiceRepository for MemoryRepository {
    async fn create_estimate(
        &self,
        estimate: &NewEstimate,
    ) -> Result<Estimate, RepositoryError> {
        let mut state = self.state()?;
        state.last_estimate_id += 1;
        let id = state.last_estimate_id;
        let now = Utc::now();
        let line_items = state.line_items(&estimate.line_items);

        let created = Estimate {
            id,
            estimate_number: format_document_number(ESTIMATE_PREFIX, id),
            client_name: estimate.client_name.clone(),
            status: estimate.status,
            valid_until: estimate.valid_until,
            notes: estimate.notes.clone(),
            totals: estimate.totals,
            line_items,
            created_at: now,
            updated_at: now,
        };
        state.estimates.push(created.clone());
        Ok(created)
    }

    async fn get_estimate(
        &self,
        id: i64,
    ) -> Result<Estimate, RepositoryError> {
        self.state()?.estimate_mut(id).map(|e| e.clone())
    }

    async fn list_estimates(
        &self,
        status: Option<EstimateStatus>,
    ) -> Result<Vec<Estimate>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .estimates
            .iter()
            .rev()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .cloned()
            .collect())
    }

    async fn update_estimate(
        &self,
        id: i64,
        estimate: &NewEstimate,
    ) -> Result<Estimate, RepositoryError> {
        let mut state = self.state()?;
        state.estimate_mut(id)?;
        let line_items = state.line_items(&estimate.line_items);

        let existing = state.estimate_mut(id)?;
        existing.client_name = estimate.client_name.clone();
        existing.status = estimate.status;
        existing.valid_until = estimate.valid_until;
        existing.notes = estimate.notes.clone();
        existing.totals = estimate.totals;
        existing.line_items = line_items;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn update_estimate_status(
        &self,
        id: i64,
        status: EstimateStatus,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let existing = state.estimate_mut(id)?;
        existing.status = status;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_estimate(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.estimate_mut(id)?;
        state.estimates.retain(|e| e.id != id);
        for invoice in state.invoices.iter_mut().filter(|i| i.estimate_id == Some(id)) {
            invoice.estimate_id = None;
        }
        Ok(())
    }

    async fn create_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let mut state = self.state()?;
        state.last_invoice_id += 1;
        let id = state.last_invoice_id;
        let now = Utc::now();
        let line_items = state.line_items(&invoice.line_items);

        let created = Invoice {
            id,
            invoice_number: format_document_number(INVOICE_PREFIX, id),
            estimate_id: invoice.estimate_id,
            client_name: invoice.client_name.clone(),
            status: invoice.balance.status,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            notes: invoice.notes.clone(),
            totals: invoice.totals,
            late_fee_rate: invoice.late_fee_rate,
            late_fee_amount: invoice.balance.late_fee_amount,
            amount_paid: invoice.balance.amount_paid,
            amount_due: invoice.balance.amount_due,
            paid_at: invoice.balance.paid_at,
            line_items,
            created_at: now,
            updated_at: now,
        };
        state.invoices.push(created.clone());
        Ok(created)
    }

    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<Invoice, RepositoryError> {
        self.state()?.invoice_mut(id).map(|i| i.clone())
    }

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .invoices
            .iter()
            .rev()
            .filter(|i| status.is_none_or(|s| i.status == s))
            .cloned()
            .collect())
    }

    async fn update_invoice(
        &self,
        id: i64,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let mut state = self.state()?;
        state.invoice_mut(id)?;
        let line_items = state.line_items(&invoice.line_items);

        let existing = state.invoice_mut(id)?;
        existing.estimate_id = invoice.estimate_id;
        existing.client_name = invoice.client_name.clone();
        existing.issue_date = invoice.issue_date;
        existing.due_date = invoice.due_date;
        existing.notes = invoice.notes.clone();
        existing.totals = invoice.totals;
        existing.late_fee_rate = invoice.late_fee_rate;
        existing.line_items = line_items;
        apply_balance(existing, &invoice.balance);
        Ok(existing.clone())
    }

    async fn update_invoice_status(
        &self,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let existing = state.invoice_mut(id)?;
        existing.status = status;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn update_invoice_balance(
        &self,
        id: i64,
        balance: &InvoiceBalance,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        apply_balance(state.invoice_mut(id)?, balance);
        Ok(())
    }

    async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.invoice_mut(id)?;
        state.invoices.retain(|i| i.id != id);
        state.payments.retain(|p| p.invoice_id != id);
        Ok(())
    }

    async fn add_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<Payment, RepositoryError> {
        let mut state = self.state()?;
        state.invoice_mut(payment.invoice_id)?;
        state.last_payment_id += 1;

        let created = Payment {
            id: state.last_payment_id,
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            payment_method: payment.payment_method.clone(),
            payment_date: payment.payment_date,
            notes: payment.notes.clone(),
            transaction_id: payment.transaction_id.clone(),
            created_at: Utc::now(),
        };
        state.payments.push(created.clone());
        Ok(created)
    }

    async fn get_payment(
        &self,
        id: i64,
    ) -> Result<Payment, RepositoryError> {
        self.state()?
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_payments(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<Payment>, RepositoryError> {
        Ok(self
            .state()?
            .payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn delete_payment(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let before = state.payments.len();
        state.payments.retain(|p| p.id != id);
        if state.payments.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn apply_balance(
    invoice: &mut Invoice,
    balance: &InvoiceBalance,
) {
    invoice.status = balance.status;
    invoice.late_fee_amount = balance.late_fee_amount;
    invoice.amount_paid = balance.amount_paid;
    invoice.amount_due = balance.amount_due;
    invoice.paid_at = balance.paid_at;
    invoice.updated_at = Utc::now();
}

/// Registers the in-memory backend under the name `memory`.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError> {
        Ok(Box::new(MemoryRepository::new()))
    }
}
