use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{InvoiceRepository, RepositoryError};

/// Which storage backend to open, and how.
///
/// `backend` selects a registered [`RepositoryFactory`] by name;
/// `connection_string` is handed to that factory untouched.
///
/// | backend    | connection_string                              |
/// |------------|------------------------------------------------|
/// | `sqlite`   | `invoices.db`, `sqlite:invoices.db`, `:memory:`|
/// | `memory`   | ignored                                        |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens repositories for one storage backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Returns a repository ready for use. Schema setup such as migrations
    /// happens here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError>;
}

/// Backend factories keyed by name.
///
/// Binaries register every backend they link at startup and then open
/// whichever one the configuration names.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory, replacing any earlier one with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the backend named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no such backend is
    ///   registered; the message lists the ones that are.
    /// * Whatever the selected factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        factory.create(config).await
    }
}
