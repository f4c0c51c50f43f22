use std::io::Read;

use folha_core::{PayrollRepository, RepositoryError, TaxBracket, TaxTable, TaxTableConfig};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown table '{0}' (expected 'inss' or 'irrf')")]
    UnknownTable(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the bracket CSV.
///
/// - `table`: `inss` or `irrf`
/// - `limit`: upper limit of the bracket, empty for unbounded
/// - `rate`: marginal rate as a fraction (`0.075` for 7.5%)
/// - `deduction`: fixed IRRF deduction, empty or `0` for INSS rows
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub table: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub limit: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub deduction: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Reads INSS/IRRF bracket tables from CSV and stores them as part of the
/// persisted [`TaxTableConfig`] snapshot.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse bracket records from a CSV reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Replaces every table named in `records` with the rows given for it.
    ///
    /// Rows keep their file order within a table. Tables not mentioned are
    /// left as they are in `config`.
    pub fn merge(
        mut config: TaxTableConfig,
        records: &[TaxBracketRecord],
    ) -> Result<TaxTableConfig, TaxTableLoaderError> {
        let mut social_security: Option<Vec<TaxBracket>> = None;
        let mut income_tax: Option<Vec<TaxBracket>> = None;

        for record in records {
            let table = TaxTable::parse(&record.table)
                .ok_or_else(|| TaxTableLoaderError::UnknownTable(record.table.clone()))?;
            let bracket = TaxBracket::new(
                record.limit,
                record.rate,
                record.deduction.unwrap_or(Decimal::ZERO),
            );
            let slot = match table {
                TaxTable::SocialSecurity => &mut social_security,
                TaxTable::IncomeTax => &mut income_tax,
            };
            slot.get_or_insert_with(Vec::new).push(bracket);
        }

        for (table, brackets) in [
            (TaxTable::SocialSecurity, social_security),
            (TaxTable::IncomeTax, income_tax),
        ] {
            if let Some(brackets) = brackets {
                debug!(%table, count = brackets.len(), "Replacing bracket table");
                config.set_brackets(table, brackets);
            }
        }

        Ok(config)
    }

    /// Merge `records` into the stored configuration and save it back.
    ///
    /// When nothing has been saved yet the built-in defaults are the
    /// starting point. Loading the same file twice yields the same snapshot.
    /// Returns the configuration that was saved.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[TaxBracketRecord],
    ) -> Result<TaxTableConfig, TaxTableLoaderError> {
        let current = match repo.get_tax_table_config().await {
            Ok(config) => config,
            Err(RepositoryError::NotFound) => TaxTableConfig::default(),
            Err(e) => return Err(e.into()),
        };

        let merged = Self::merge(current, records)?;
        repo.save_tax_table_config(&merged).await?;
        info!(rows = records.len(), "Saved bracket tables");

        Ok(merged)
    }
}
