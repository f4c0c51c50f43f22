use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{PayrollRepository, RepositoryError};

/// Which backend to open and how to reach it.
///
/// `connection_string` is handed to the backend's factory as-is.
///
/// | backend    | connection_string examples                    |
/// |------------|-----------------------------------------------|
/// | `sqlite`   | `folha.db`, `:memory:`, `sqlite://folha.db`   |
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

/// Opens repositories for one backend. Backend crates export one of these.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase backend identifier, matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Connects and returns a repository ready for use, migrations applied.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError>;
}

/// Routes a [`DbConfig`] to the factory registered for its backend.
///
/// The CLI registers every backend it links once at startup and opens the
/// payroll store through [`RepositoryRegistry::create`].
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] when no factory is registered for
    /// `config.backend`; otherwise whatever that factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            let known: Vec<_> = self.factories.keys().copied().collect();
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {}",
                config.backend,
                known.join(", ")
            )));
        };

        debug!(backend = %config.backend, "Opening payroll repository");
        factory.create(config).await
    }
}
