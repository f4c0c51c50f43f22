use async_trait::async_trait;
use folha_core::db::repository::{PayrollRepository, RepositoryError};
use folha_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Turns a connection string into a sqlx URL.
///
/// `:memory:` and anything already starting with `sqlite:` pass through;
/// a bare path becomes a read-write-create file URL.
fn database_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite://{path}?mode=rwc"),
    }
}

/// [`RepositoryFactory`] for the `"sqlite"` backend.
///
/// ```rust,no_run
/// use folha_core::db::RepositoryRegistry;
/// use folha_db_sqlite::SqliteRepositoryFactory;
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
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&database_url(&config.connection_string))
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use folha_core::TaxTableConfig;
    use folha_core::db::{DbConfig, RepositoryFactory, RepositoryRegistry};
    use pretty_assertions::assert_eq;

    use super::{SqliteRepositoryFactory, database_url};

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn database_url_mapping() {
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
        assert_eq!(database_url("sqlite://folha.db"), "sqlite://folha.db");
        assert_eq!(database_url("data/folha.db"), "sqlite://data/folha.db?mode=rwc");
    }

    #[tokio::test]
    async fn creates_in_memory_repository_through_registry() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(SqliteRepositoryFactory));

        let repo = registry
            .create(&DbConfig::default())
            .await
            .expect("in-memory repository should open");

        repo.save_tax_table_config(&TaxTableConfig::default())
            .await
            .expect("migrated schema should accept a snapshot");
        assert_eq!(
            repo.get_tax_table_config().await,
            Ok(TaxTableConfig::default())
        );
    }
}
