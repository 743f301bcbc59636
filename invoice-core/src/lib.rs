pub mod calculations;
pub mod db;
pub mod models;
pub mod services;

pub use calculations::{
    BalanceOverflow, DEFAULT_TAX_RATE, LateFeeAssessment, LineItem, LineItemError, PaymentSummary, TaxBreakdown,
    TaxCalculationError, TaxCalculator, TaxCalculatorConfig, calculate_tax_from_line_items,
};
pub use db::{
    DbConfig, InvoiceRepository, MemoryRepository, MemoryRepositoryFactory, RepositoryError,
    RepositoryFactory, RepositoryRegistry,
};
pub use models::*;
pub use services::{DocumentService, ServiceConfig, ServiceError};
