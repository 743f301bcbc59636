use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Estimate, EstimateStatus, Invoice, InvoiceBalance, InvoiceStatus, NewEstimate, NewInvoice,
    NewPayment, Payment,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for estimates, invoices and payments.
///
/// Every write of a document replaces its header and line items together;
/// implementations must make that atomic. Document numbers are assigned by
/// the repository on creation.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    // Estimates
    async fn create_estimate(
        &self,
        estimate: &NewEstimate,
    ) -> Result<Estimate, RepositoryError>;

    async fn get_estimate(&self, id: i64) -> Result<Estimate, RepositoryError>;

    async fn list_estimates(
        &self,
        status: Option<EstimateStatus>,
    ) -> Result<Vec<Estimate>, RepositoryError>;

    async fn update_estimate(
        &self,
        id: i64,
        estimate: &NewEstimate,
    ) -> Result<Estimate, RepositoryError>;

    async fn update_estimate_status(
        &self,
        id: i64,
        status: EstimateStatus,
    ) -> Result<(), RepositoryError>;

    async fn delete_estimate(&self, id: i64) -> Result<(), RepositoryError>;

    // Invoices
    async fn create_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError>;

    async fn get_invoice(&self, id: i64) -> Result<Invoice, RepositoryError>;

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, RepositoryError>;

    async fn update_invoice(
        &self,
        id: i64,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError>;

    async fn update_invoice_status(
        &self,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<(), RepositoryError>;

    async fn update_invoice_balance(
        &self,
        id: i64,
        balance: &InvoiceBalance,
    ) -> Result<(), RepositoryError>;

    async fn delete_invoice(&self, id: i64) -> Result<(), RepositoryError>;

    // Payments
    async fn add_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<Payment, RepositoryError>;

    async fn get_payment(&self, id: i64) -> Result<Payment, RepositoryError>;

    async fn list_payments(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<Payment>, RepositoryError>;

    async fn delete_payment(&self, id: i64) -> Result<(), RepositoryError>;
}
