//! CSV loader for monthly variable entries.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter and unknown
//! columns are ignored. Every column except `employee_name` is optional.
//!
//! | Column | Notes |
//! |-----------------|----------------------------------------------------------|
//! | `employee_name` | required, alias `nome` |
//! | `registration` | alias `matricula`, kept as text (`0042` stays `0042`) |
//! | `role` | alias `cargo` |
//! | `month` | 1-12, alias `mes`; empty means "use the CLI period" |
//! | `year` | alias `ano`; empty means "use the CLI period" |
//! | anything else | a [`VariableEntryForm`] field or its Portuguese alias |
//!
//! Amount cells accept `2000`, `2000.50` and `2.000,50`. Empty or
//! unreadable amounts count as zero; flags accept `sim`/`nao`, `x`, `1`/`0`.
//!
//! ```csv
//! employee_name,registration,role,salario_base,he50_qtd,dsr_ativo,vt_ativo,vale_transporte_total
//! Ana Souza,0042,Analista,"2.000,00",10,sim,sim,180
//! ```
use std::path::Path;

use folha_core::{EmployeeVariableEntry, NewPayrollRecord, PayrollTotals, VariableEntryForm};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading an entries CSV.
#[derive(Debug, Error)]
pub enum EntryCsvError {
    /// The header line could not be read.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A data row is structurally broken (wrong column count, bad quoting).
    /// `row` is 1-based, header excluded.
    #[error("CSV parse error on row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("row {row} has no employee_name")]
    MissingEmployee { row: usize },

    #[error("row {row} has invalid {column} '{value}'")]
    InvalidPeriod {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdentityColumns {
    #[serde(alias = "nome")]
    employee_name: String,
    #[serde(alias = "matricula")]
    registration: String,
    #[serde(alias = "cargo")]
    role: String,
    #[serde(alias = "mes")]
    month: String,
    #[serde(alias = "ano")]
    year: String,
}

/// One employee's line of the entries file, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    /// 1-based data row, for messages.
    pub row: usize,
    pub employee_name: String,
    pub registration: String,
    pub role: String,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub entry: EmployeeVariableEntry,
}

impl EntryRow {
    /// The record to persist, with the row's own period taking precedence
    /// over the fallback.
    pub fn to_new_record(
        &self,
        month: u32,
        year: i32,
    ) -> NewPayrollRecord {
        NewPayrollRecord {
            employee_name: self.employee_name.clone(),
            registration: self.registration.clone(),
            role: self.role.clone(),
            month: self.month.unwrap_or(month),
            year: self.year.unwrap_or(year),
            entry: self.entry.clone(),
            totals: PayrollTotals::default(),
        }
    }
}

fn parse_month(
    raw: &str,
    row: usize,
) -> Result<Option<u32>, EntryCsvError> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(Some(m)),
        _ => Err(EntryCsvError::InvalidPeriod {
            row,
            column: "month",
            value: raw.to_string(),
        }),
    }
}

fn parse_year(
    raw: &str,
    row: usize,
) -> Result<Option<i32>, EntryCsvError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i32>()
        .map(Some)
        .map_err(|_| EntryCsvError::InvalidPeriod {
            row,
            column: "year",
            value: raw.to_string(),
        })
}

/// Parse CSV text into entry rows, in file order.
///
/// # Errors
///
/// * [`EntryCsvError::Parse`] / [`EntryCsvError::Row`] for malformed CSV.
/// * [`EntryCsvError::MissingEmployee`] when a row has an empty name.
/// * [`EntryCsvError::InvalidPeriod`] for a month outside 1-12 or a
///   non-numeric year.
pub fn load_from_str(input: &str) -> Result<Vec<EntryRow>, EntryCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result.map_err(|source| EntryCsvError::Row { row, source })?;

        let identity: IdentityColumns = record
            .deserialize(Some(&headers))
            .map_err(|source| EntryCsvError::Row { row, source })?;
        let form: VariableEntryForm = record
            .deserialize(Some(&headers))
            .map_err(|source| EntryCsvError::Row { row, source })?;

        if identity.employee_name.is_empty() {
            return Err(EntryCsvError::MissingEmployee { row });
        }

        rows.push(EntryRow {
            row,
            month: parse_month(&identity.month, row)?,
            year: parse_year(&identity.year, row)?,
            employee_name: identity.employee_name,
            registration: identity.registration,
            role: identity.role,
            entry: form.normalize(),
        });
    }

    debug!(rows = rows.len(), "Parsed entries CSV");
    Ok(rows)
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<EntryRow>, EntryCsvError> {
    let contents = std::fs::read_to_string(path).map_err(|source| EntryCsvError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use folha_core::HazardTier;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // -----------------------------------------------------------------------
    // Fixtures
    // -----------------------------------------------------------------------
    const MINIMAL_CSV: &str = "\
employee_name,base_salary
Ana Souza,2000.00
";

    const PORTUGUESE_CSV: &str = "\
nome,matricula,cargo,salario_base,he50_qtd,dsr_ativo,insalubridade_grau,vt_ativo,vale_transporte_total,dependentes_qtd
Ana Souza,0042,Analista,\"2.000,00\",10,sim,medio,x,180,2
Bruno Lima,0043,Operador,1500,,nao,,,,
";

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------
    #[test]
    fn test_minimal_csv() {
        let rows = load_from_str(MINIMAL_CSV).expect("should parse minimal CSV");

        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.row, 1);
        assert_eq!(r.employee_name, "Ana Souza");
        assert_eq!(r.registration, "");
        assert_eq!(r.month, None);
        assert_eq!(r.entry.base_salary, dec!(2000.00));
        assert_eq!(r.entry.overtime_50_hours, dec!(0));
    }

    #[test]
    fn test_portuguese_headers_and_amounts() {
        let rows = load_from_str(PORTUGUESE_CSV).expect("should parse");

        let ana = &rows[0];
        assert_eq!(ana.registration, "0042");
        assert_eq!(ana.role, "Analista");
        assert_eq!(ana.entry.base_salary, dec!(2000.00));
        assert_eq!(ana.entry.overtime_50_hours, dec!(10));
        assert!(ana.entry.weekly_rest);
        assert_eq!(ana.entry.hazard_tier, HazardTier::Medium);
        assert!(ana.entry.transit_benefit);
        assert_eq!(ana.entry.transit_cost, dec!(180));
        assert_eq!(ana.entry.dependents, 2);
    }

    #[test]
    fn test_empty_cells_are_zero() {
        let rows = load_from_str(PORTUGUESE_CSV).expect("should parse");

        let bruno = &rows[1];
        assert_eq!(bruno.entry.base_salary, dec!(1500));
        assert_eq!(bruno.entry.overtime_50_hours, dec!(0));
        assert!(!bruno.entry.weekly_rest);
        assert_eq!(bruno.entry.hazard_tier, HazardTier::None);
        assert!(!bruno.entry.transit_benefit);
        assert_eq!(bruno.entry.dependents, 0);
    }

    #[test]
    fn test_unreadable_and_negative_amounts_are_zero() {
        let csv = "employee_name,base_salary,bonuses\nAna,abc,-50\n";
        let rows = load_from_str(csv).expect("should parse");

        assert_eq!(rows[0].entry.base_salary, dec!(0));
        assert_eq!(rows[0].entry.bonuses, dec!(0));
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        let csv = "employee_name,departamento,base_salary\nAna,TI,3000\n";
        let rows = load_from_str(csv).expect("should parse");

        assert_eq!(rows[0].entry.base_salary, dec!(3000));
    }

    #[test]
    fn test_header_only_is_empty() {
        let rows = load_from_str("employee_name,base_salary\n").expect("header-only CSV is valid");
        assert!(rows.is_empty());
    }

    // -----------------------------------------------------------------------
    // Period columns
    // -----------------------------------------------------------------------
    #[test]
    fn test_row_period_overrides_fallback() {
        let csv = "employee_name,mes,ano,base_salary\nAna,3,2024,2000\nBruno,,,1500\n";
        let rows = load_from_str(csv).expect("should parse");

        let ana = rows[0].to_new_record(1, 2025);
        assert_eq!((ana.month, ana.year), (3, 2024));

        let bruno = rows[1].to_new_record(1, 2025);
        assert_eq!((bruno.month, bruno.year), (1, 2025));
    }

    #[test]
    fn test_invalid_month_reports_row() {
        let csv = "employee_name,month\nAna,1\nBruno,13\n";
        let err = load_from_str(csv).unwrap_err();

        match err {
            EntryCsvError::InvalidPeriod { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "month");
                assert_eq!(value, "13");
            }
            other => panic!("expected InvalidPeriod, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_year() {
        let csv = "employee_name,year\nAna,vinte\n";
        let err = load_from_str(csv).unwrap_err();

        assert!(matches!(
            err,
            EntryCsvError::InvalidPeriod { row: 1, column: "year", .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_missing_employee_name() {
        let csv = "employee_name,base_salary\nAna,1000\n,2000\n";
        let err = load_from_str(csv).unwrap_err();

        assert!(matches!(err, EntryCsvError::MissingEmployee { row: 2 }));
    }

    #[test]
    fn test_ragged_row_reports_row() {
        let csv = "employee_name,base_salary\nAna,1000,extra\n";
        let err = load_from_str(csv).unwrap_err();

        assert!(matches!(err, EntryCsvError::Row { row: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_from_file(Path::new("/nonexistent/entries.csv")).unwrap_err();

        assert!(matches!(err, EntryCsvError::Io { .. }));
    }
}
