//! Workflows that tie the calculator to storage.

pub mod documents;

pub use documents::{DocumentService, ServiceConfig, ServiceError};
