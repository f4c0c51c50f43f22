use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folha_core::{
    AdditionalPayPolicy, EmployeeVariableEntry, NewPayrollRecord, PayrollRecord,
    PayrollRepository, PayrollStatus, PayrollTotals, RepositoryError, TaxBracket, TaxTable,
    TaxTableConfig,
};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url` (a sqlx URL such as `sqlite://folha.db`).
    ///
    /// An in-memory database lives only as long as its connection, so those
    /// get a single-connection pool.
    pub async fn new(database_url: &str) -> Result<Self> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_bracket(row: &SqliteRow) -> Result<TaxBracket, RepositoryError> {
    Ok(TaxBracket {
        limit: get_optional_decimal(row, "upper_limit")?,
        rate: get_decimal(row, "rate")?,
        deduction: get_decimal(row, "deduction")?,
    })
}

fn row_to_payroll_record(row: &SqliteRow) -> Result<PayrollRecord, RepositoryError> {
    let month: i64 = row.try_get("month").map_err(db_err)?;
    let entry: String = row.try_get("entry").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;

    Ok(PayrollRecord {
        id: row.try_get("id").map_err(db_err)?,
        employee_name: row.try_get("employee_name").map_err(db_err)?,
        registration: row.try_get("registration").map_err(db_err)?,
        role: row.try_get("role").map_err(db_err)?,
        month: u32::try_from(month)
            .map_err(|_| RepositoryError::Database(format!("Invalid month: {month}")))?,
        year: row.try_get("year").map_err(db_err)?,
        entry: serde_json::from_str::<EmployeeVariableEntry>(&entry)
            .map_err(|e| RepositoryError::Database(format!("Invalid entry document: {e}")))?,
        totals: PayrollTotals {
            total_earnings: get_decimal(row, "total_earnings")?,
            total_deductions: get_decimal(row, "total_deductions")?,
            net_pay: get_decimal(row, "net_pay")?,
            social_security_withheld: get_decimal(row, "social_security_withheld")?,
            income_tax_withheld: get_decimal(row, "income_tax_withheld")?,
            severance_fund_contribution: get_decimal(row, "severance_fund_contribution")?,
        },
        status: PayrollStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Database(format!("Invalid status: {status}")))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

fn entry_to_json(entry: &EmployeeVariableEntry) -> Result<String, RepositoryError> {
    serde_json::to_string(entry)
        .map_err(|e| RepositoryError::Database(format!("Failed to encode entry: {e}")))
}

const RECORD_COLUMNS: &str = "id, employee_name, registration, role, month, year, entry,
    total_earnings, total_deductions, net_pay, social_security_withheld,
    income_tax_withheld, severance_fund_contribution, status, created_at, updated_at";

#[async_trait]
impl PayrollRepository for SqliteRepository {
    async fn get_tax_table_config(&self) -> Result<TaxTableConfig, RepositoryError> {
        let row = sqlx::query(
            "SELECT severance_fund_rate, employer_social_security_rate,
                    work_accident_insurance_rate, social_security_ceiling, minimum_wage,
                    family_allowance_ceiling, family_allowance_per_dependent,
                    income_tax_dependent_deduction, additional_pay_policy
             FROM tax_table_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        let policy: String = row.try_get("additional_pay_policy").map_err(db_err)?;

        let mut config = TaxTableConfig {
            social_security_brackets: Vec::new(),
            income_tax_brackets: Vec::new(),
            severance_fund_rate: get_decimal(&row, "severance_fund_rate")?,
            employer_social_security_rate: get_decimal(&row, "employer_social_security_rate")?,
            work_accident_insurance_rate: get_decimal(&row, "work_accident_insurance_rate")?,
            social_security_ceiling: get_optional_decimal(&row, "social_security_ceiling")?,
            minimum_wage: get_decimal(&row, "minimum_wage")?,
            family_allowance_ceiling: get_decimal(&row, "family_allowance_ceiling")?,
            family_allowance_per_dependent: get_decimal(&row, "family_allowance_per_dependent")?,
            income_tax_dependent_deduction: get_decimal(&row, "income_tax_dependent_deduction")?,
            additional_pay_policy: AdditionalPayPolicy::parse(&policy).ok_or_else(|| {
                RepositoryError::Database(format!("Invalid additional pay policy: {policy}"))
            })?,
        };

        for table in [TaxTable::SocialSecurity, TaxTable::IncomeTax] {
            let rows = sqlx::query(
                "SELECT upper_limit, rate, deduction FROM tax_brackets
                 WHERE table_kind = ? ORDER BY position",
            )
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            let brackets = rows
                .iter()
                .map(row_to_bracket)
                .collect::<Result<Vec<_>, _>>()?;
            config.set_brackets(table, brackets);
        }

        Ok(config)
    }

    async fn save_tax_table_config(
        &self,
        config: &TaxTableConfig,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT OR REPLACE INTO tax_table_config (
                id, severance_fund_rate, employer_social_security_rate,
                work_accident_insurance_rate, social_security_ceiling, minimum_wage,
                family_allowance_ceiling, family_allowance_per_dependent,
                income_tax_dependent_deduction, additional_pay_policy, updated_at
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(decimal_to_text(config.severance_fund_rate))
        .bind(decimal_to_text(config.employer_social_security_rate))
        .bind(decimal_to_text(config.work_accident_insurance_rate))
        .bind(config.social_security_ceiling.map(decimal_to_text))
        .bind(decimal_to_text(config.minimum_wage))
        .bind(decimal_to_text(config.family_allowance_ceiling))
        .bind(decimal_to_text(config.family_allowance_per_dependent))
        .bind(decimal_to_text(config.income_tax_dependent_deduction))
        .bind(config.additional_pay_policy.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM tax_brackets")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        for table in [TaxTable::SocialSecurity, TaxTable::IncomeTax] {
            for (position, bracket) in config.brackets(table).iter().enumerate() {
                sqlx::query(
                    "INSERT INTO tax_brackets (table_kind, position, upper_limit, rate, deduction)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(table.as_str())
                .bind(position as i64)
                .bind(bracket.limit.map(decimal_to_text))
                .bind(decimal_to_text(bracket.rate))
                .bind(decimal_to_text(bracket.deduction))
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            }
        }

        tx.commit().await.map_err(db_err)?;

        info!(
            inss_brackets = config.social_security_brackets.len(),
            irrf_brackets = config.income_tax_brackets.len(),
            "Saved tax table snapshot"
        );
        Ok(())
    }

    async fn create_record(
        &self,
        record: NewPayrollRecord,
    ) -> Result<PayrollRecord, RepositoryError> {
        let now = Utc::now();
        let totals = &record.totals;

        let result = sqlx::query(
            "INSERT INTO payroll_records (
                employee_name, registration, role, month, year, entry,
                total_earnings, total_deductions, net_pay,
                social_security_withheld, income_tax_withheld,
                severance_fund_contribution, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.employee_name)
        .bind(&record.registration)
        .bind(&record.role)
        .bind(i64::from(record.month))
        .bind(record.year)
        .bind(entry_to_json(&record.entry)?)
        .bind(decimal_to_text(totals.total_earnings))
        .bind(decimal_to_text(totals.total_deductions))
        .bind(decimal_to_text(totals.net_pay))
        .bind(decimal_to_text(totals.social_security_withheld))
        .bind(decimal_to_text(totals.income_tax_withheld))
        .bind(decimal_to_text(totals.severance_fund_contribution))
        .bind(PayrollStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(id, employee = %record.employee_name, "Created payroll record");
        self.get_record(id).await
    }

    async fn get_record(
        &self,
        id: i64,
    ) -> Result<PayrollRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM payroll_records WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_payroll_record(&row)
    }

    async fn update_record(
        &self,
        record: &PayrollRecord,
    ) -> Result<(), RepositoryError> {
        let totals = &record.totals;

        let result = sqlx::query(
            "UPDATE payroll_records SET
                employee_name = ?, registration = ?, role = ?, month = ?, year = ?,
                entry = ?, total_earnings = ?, total_deductions = ?, net_pay = ?,
                social_security_withheld = ?, income_tax_withheld = ?,
                severance_fund_contribution = ?, status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&record.employee_name)
        .bind(&record.registration)
        .bind(&record.role)
        .bind(i64::from(record.month))
        .bind(record.year)
        .bind(entry_to_json(&record.entry)?)
        .bind(decimal_to_text(totals.total_earnings))
        .bind(decimal_to_text(totals.total_deductions))
        .bind(decimal_to_text(totals.net_pay))
        .bind(decimal_to_text(totals.social_security_withheld))
        .bind(decimal_to_text(totals.income_tax_withheld))
        .bind(decimal_to_text(totals.severance_fund_contribution))
        .bind(record.status.as_str())
        .bind(Utc::now())
        .bind(record.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_record(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM payroll_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_records(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM payroll_records
             WHERE (?1 IS NULL OR month = ?1) AND (?2 IS NULL OR year = ?2)
             ORDER BY year, month, employee_name"
        ))
        .bind(month.map(i64::from))
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_payroll_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use folha_core::PayrollCalculator;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn new_record(
        name: &str,
        month: u32,
        year: i32,
    ) -> NewPayrollRecord {
        NewPayrollRecord {
            employee_name: name.to_string(),
            registration: format!("{name}-001"),
            role: "Auxiliar".to_string(),
            month,
            year,
            entry: EmployeeVariableEntry {
                base_salary: dec!(2000),
                overtime_50_hours: dec!(10),
                weekly_rest: true,
                ..Default::default()
            },
            totals: PayrollTotals::default(),
        }
    }

    // =========================================================================
    // Tax table snapshot
    // =========================================================================

    #[tokio::test]
    async fn get_tax_table_config_not_found_before_save() {
        let repo = setup_test_db().await;

        assert_eq!(
            repo.get_tax_table_config().await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn tax_table_config_round_trips() {
        let repo = setup_test_db().await;
        let config = TaxTableConfig::default();

        repo.save_tax_table_config(&config)
            .await
            .expect("Should save config");
        let loaded = repo
            .get_tax_table_config()
            .await
            .expect("Should load config");

        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let repo = setup_test_db().await;
        repo.save_tax_table_config(&TaxTableConfig::default())
            .await
            .expect("Should save defaults");

        let mut changed = TaxTableConfig {
            social_security_ceiling: None,
            additional_pay_policy: AdditionalPayPolicy::Cumulative,
            minimum_wage: dec!(1518.00),
            ..Default::default()
        };
        changed.set_brackets(
            TaxTable::IncomeTax,
            vec![TaxBracket::new(None, dec!(0.10), dec!(0))],
        );
        repo.save_tax_table_config(&changed)
            .await
            .expect("Should save changed config");

        let loaded = repo
            .get_tax_table_config()
            .await
            .expect("Should load config");

        assert_eq!(loaded, changed);
        assert_eq!(loaded.income_tax_brackets.len(), 1);
    }

    #[tokio::test]
    async fn brackets_stored_as_text_keep_scale() {
        let repo = setup_test_db().await;
        repo.save_tax_table_config(&TaxTableConfig::default())
            .await
            .expect("Should save config");

        let rate: String = sqlx::query(
            "SELECT rate FROM tax_brackets WHERE table_kind = 'inss' AND position = 0",
        )
        .fetch_one(repo.pool())
        .await
        .expect("Should fetch rate")
        .get("rate");

        assert_eq!(rate, "0.075");
    }

    // =========================================================================
    // Payroll records
    // =========================================================================

    #[tokio::test]
    async fn create_and_get_record() {
        let repo = setup_test_db().await;

        let created = repo
            .create_record(new_record("Ana", 3, 2024))
            .await
            .expect("Should create record");
        let fetched = repo.get_record(created.id).await.expect("Should get record");

        assert_eq!(fetched, created);
        assert_eq!(fetched.status, PayrollStatus::Pending);
        assert_eq!(fetched.totals, PayrollTotals::default());
        assert_eq!(fetched.entry.overtime_50_hours, dec!(10));
    }

    #[tokio::test]
    async fn get_missing_record_is_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_record(42).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn update_record_persists_applied_totals() {
        let repo = setup_test_db().await;
        let config = TaxTableConfig::default();
        let mut record = repo
            .create_record(new_record("Ana", 3, 2024))
            .await
            .expect("Should create record");

        let breakdown = PayrollCalculator::new(&config).calculate(&record.entry);
        record.apply(&breakdown);
        record.status = PayrollStatus::Paid;
        repo.update_record(&record)
            .await
            .expect("Should update record");

        let fetched = repo.get_record(record.id).await.expect("Should get record");

        assert_eq!(fetched.totals.total_earnings, dec!(2159.09));
        assert_eq!(fetched.totals.social_security_withheld, dec!(173.14));
        assert_eq!(fetched.totals.net_pay, dec!(1985.95));
        assert_eq!(fetched.totals.severance_fund_contribution, dec!(172.73));
        assert_eq!(fetched.status, PayrollStatus::Paid);
        assert!(fetched.updated_at >= record.updated_at);
    }

    #[tokio::test]
    async fn create_record_stores_totals_in_the_same_insert() {
        let repo = setup_test_db().await;
        let config = TaxTableConfig::default();
        let mut new = new_record("Ana", 3, 2024);
        let breakdown = PayrollCalculator::new(&config).calculate(&new.entry);
        new.apply(&breakdown);

        let created = repo.create_record(new).await.expect("Should create record");

        assert_eq!(created.totals.net_pay, dec!(1985.95));
        assert_eq!(created.totals.severance_fund_contribution, dec!(172.73));
        let listed = repo
            .list_records(Some(3), Some(2024))
            .await
            .expect("Should list records");
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn mark_paid_persists_status() {
        let repo = setup_test_db().await;
        let mut record = repo
            .create_record(new_record("Ana", 3, 2024))
            .await
            .expect("Should create record");

        assert!(record.mark_paid());
        repo.update_record(&record)
            .await
            .expect("Should update record");

        let fetched = repo.get_record(record.id).await.expect("Should get record");
        assert_eq!(fetched.status, PayrollStatus::Paid);
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let repo = setup_test_db().await;
        let mut record = repo
            .create_record(new_record("Ana", 3, 2024))
            .await
            .expect("Should create record");
        record.id = 999;

        assert_eq!(
            repo.update_record(&record).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_record() {
        let repo = setup_test_db().await;
        let created = repo
            .create_record(new_record("Ana", 3, 2024))
            .await
            .expect("Should create record");

        repo.delete_record(created.id)
            .await
            .expect("Should delete record");

        assert_eq!(
            repo.get_record(created.id).await,
            Err(RepositoryError::NotFound)
        );
        assert_eq!(
            repo.delete_record(created.id).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn list_records_filters_by_period() {
        let repo = setup_test_db().await;
        for (name, month, year) in [
            ("Carla", 3, 2024),
            ("Ana", 3, 2024),
            ("Bruno", 4, 2024),
            ("Davi", 3, 2023),
        ] {
            repo.create_record(new_record(name, month, year))
                .await
                .expect("Should create record");
        }

        let all = repo.list_records(None, None).await.expect("Should list all");
        let march_2024 = repo
            .list_records(Some(3), Some(2024))
            .await
            .expect("Should list March 2024");
        let any_march = repo
            .list_records(Some(3), None)
            .await
            .expect("Should list March");
        let in_2024 = repo
            .list_records(None, Some(2024))
            .await
            .expect("Should list 2024");

        assert_eq!(all.len(), 4);
        assert_eq!(
            march_2024
                .iter()
                .map(|r| r.employee_name.as_str())
                .collect::<Vec<_>>(),
            vec!["Ana", "Carla"]
        );
        assert_eq!(any_march.len(), 3);
        assert_eq!(in_2024.len(), 3);
        assert_eq!(all[0].employee_name, "Davi");
    }
}
