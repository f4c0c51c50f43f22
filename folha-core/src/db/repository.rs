use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewPayrollRecord, PayrollRecord, TaxTableConfig};

#[derive(Debug, Error, PartialEq, Eq)]
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

#[async_trait]
pub trait PayrollRepository: Send + Sync {
    // Tax table snapshot
    /// Returns [`RepositoryError::NotFound`] until a snapshot has been saved.
    async fn get_tax_table_config(&self) -> Result<TaxTableConfig, RepositoryError>;

    /// Replaces the stored snapshot, brackets included.
    async fn save_tax_table_config(
        &self,
        config: &TaxTableConfig,
    ) -> Result<(), RepositoryError>;

    // Payroll records
    async fn create_record(
        &self,
        record: NewPayrollRecord,
    ) -> Result<PayrollRecord, RepositoryError>;

    async fn get_record(
        &self,
        id: i64,
    ) -> Result<PayrollRecord, RepositoryError>;

    async fn update_record(
        &self,
        record: &PayrollRecord,
    ) -> Result<(), RepositoryError>;

    async fn delete_record(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// Records ordered by period then employee name, optionally narrowed to
    /// one month and/or year.
    async fn list_records(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError>;
}
