//! TOML overrides for [`TaxTableConfig`].
//!
//! Any subset of fields may be given; the rest keep their defaults.
//!
//! ```toml
//! minimum_wage = "1518.00"
//! additional_pay_policy = "cumulative"
//!
//! [[income_tax_brackets]]
//! limit = "2428.80"
//! rate = "0"
//! deduction = "0"
//!
//! [[income_tax_brackets]]
//! rate = "0.275"
//! deduction = "908.73"
//! ```
//!
//! Amounts are quoted so they reach `Decimal` without a float round-trip;
//! bare TOML numbers are accepted too.
use std::path::Path;

use folha_core::{PayrollRepository, RepositoryError, TaxTableConfig};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot read stored tax tables: {0}")]
    Repository(#[from] RepositoryError),
}

/// Parse a TOML document into a full configuration.
pub fn parse_config(input: &str) -> Result<TaxTableConfig, ConfigError> {
    Ok(toml::from_str(input)?)
}

/// Read and parse a TOML config file.
pub fn load_config_file(path: &Path) -> Result<TaxTableConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&contents)?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// The configuration a run should use.
///
/// An explicit file wins; otherwise the snapshot saved in the repository;
/// otherwise the built-in defaults.
pub async fn resolve_config<R: PayrollRepository + ?Sized>(
    repo: &R,
    path: Option<&Path>,
) -> Result<TaxTableConfig, ConfigError> {
    if let Some(path) = path {
        return load_config_file(path);
    }
    match repo.get_tax_table_config().await {
        Ok(config) => Ok(config),
        Err(RepositoryError::NotFound) => {
            debug!("No stored tax tables, using defaults");
            Ok(TaxTableConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Logs a warning when `config` would make a withholding degrade to zero.
///
/// Returns whether the configuration passed validation.
pub fn warn_if_invalid(config: &TaxTableConfig) -> bool {
    match config.validate() {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "Tax table configuration is invalid; affected withholdings will be zero");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use folha_core::{AdditionalPayPolicy, TaxBracket};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(
            parse_config("").expect("empty TOML is valid"),
            TaxTableConfig::default()
        );
    }

    #[test]
    fn scalar_overrides_keep_other_defaults() {
        let config = parse_config(
            r#"
minimum_wage = "1518.00"
additional_pay_policy = "cumulative"
"#,
        )
        .expect("should parse");

        assert_eq!(config.minimum_wage, dec!(1518.00));
        assert_eq!(config.additional_pay_policy, AdditionalPayPolicy::Cumulative);
        assert_eq!(
            config.social_security_brackets,
            TaxTableConfig::default().social_security_brackets
        );
    }

    #[test]
    fn bracket_tables_replace_defaults() {
        let config = parse_config(
            r#"
[[income_tax_brackets]]
limit = "2428.80"
rate = "0"

[[income_tax_brackets]]
rate = "0.275"
deduction = "908.73"
"#,
        )
        .expect("should parse");

        assert_eq!(
            config.income_tax_brackets,
            vec![
                TaxBracket::new(Some(dec!(2428.80)), dec!(0), dec!(0)),
                TaxBracket::new(None, dec!(0.275), dec!(908.73)),
            ]
        );
    }

    #[test]
    fn ceiling_can_be_overridden() {
        let config = parse_config(r#"social_security_ceiling = "8157.41""#).expect("should parse");

        assert_eq!(config.social_security_ceiling, Some(dec!(8157.41)));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = parse_config(r#"additional_pay_policy = "both""#).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config_file(Path::new("/nonexistent/folha.toml")).unwrap_err();

        let ConfigError::Io { path, .. } = err else {
            panic!("Expected Io error, got {err:?}");
        };
        assert!(path.contains("folha.toml"));
    }
}
