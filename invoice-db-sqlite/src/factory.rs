use async_trait::async_trait;
use tracing::info;

use invoice_core::db::repository::{InvoiceRepository, RepositoryError};
use invoice_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Opens [`SqliteRepository`] instances for the `"sqlite"` backend.
///
/// The connection string may be a file path (created when missing), a
/// `sqlite:` URL, or `:memory:`. Migrations are applied on every open.
///
/// ```rust,no_run
/// use invoice_core::db::RepositoryRegistry;
/// use invoice_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError> {
        let target = config.connection_string.as_str();
        let repo = SqliteRepository::connect(target)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(database = target, "opened sqlite repository");
        Ok(Box::new(repo))
    }
}
