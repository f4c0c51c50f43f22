use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::{Parser, Subcommand};
use folha_core::db::{DbConfig, RepositoryRegistry};
use folha_core::{
    NewPayrollRecord, PayrollBreakdown, PayrollCalculator, PayrollRecord, PayrollRepository,
    PayrollStatus, PayrollTotals, Payslip,
};
use folha_data::{TaxTableLoader, entries, logging, resolve_config, warn_if_invalid};
use folha_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

/// Brazilian payroll calculator.
///
/// Reads monthly variable entries, computes earnings, INSS, IRRF and
/// benefit deductions, and prints a payslip per employee.
#[derive(Debug, Parser)]
#[command(name = "folha", version, about, long_about = None)]
struct Cli {
    /// Database backend to use.
    #[arg(long, global = true, default_value = "sqlite")]
    backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `folha.db`) or `:memory:`.
    #[arg(short, long, global = true, default_value = "folha.db")]
    database: String,

    /// TOML file overriding the stored tax tables.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate payslips for every row of an entries CSV.
    Calculate {
        /// Entries CSV, one employee per row.
        #[arg(short, long)]
        entries: PathBuf,

        /// Month for rows without their own (defaults to the current month).
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year for rows without their own (defaults to the current year).
        #[arg(short, long)]
        year: Option<i32>,

        /// Store each row as a payroll record with its calculated totals.
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Print the payslips and breakdowns as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Load INSS/IRRF bracket tables from a CSV into the database.
    LoadBrackets {
        /// CSV with columns table,limit,rate,deduction.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the effective configuration as TOML.
    ShowConfig,

    /// List stored payroll records.
    List {
        #[arg(short, long)]
        month: Option<u32>,

        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Recalculate and print the payslip of a stored record.
    Show {
        /// Record id, as printed by `list`.
        id: i64,
    },

    /// Mark a stored record as paid.
    MarkPaid {
        /// Record id, as printed by `list`.
        id: i64,
    },
}

fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// A record that is only displayed, never stored.
fn preview_record(
    new: NewPayrollRecord,
    breakdown: &PayrollBreakdown,
) -> PayrollRecord {
    let now = Utc::now();
    PayrollRecord {
        id: 0,
        employee_name: new.employee_name,
        registration: new.registration,
        role: new.role,
        month: new.month,
        year: new.year,
        entry: new.entry,
        totals: PayrollTotals::from(breakdown),
        status: PayrollStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

fn print_payslip(
    payslip: &Payslip,
    breakdown: &PayrollBreakdown,
    json: bool,
) -> Result<()> {
    if json {
        let doc = serde_json::json!({ "payslip": payslip, "breakdown": breakdown });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{payslip}");
    }
    Ok(())
}

async fn calculate(
    repo: &dyn PayrollRepository,
    cli: &Cli,
    entries_path: &Path,
    period: (Option<u32>, Option<i32>),
    save: bool,
    json: bool,
) -> Result<()> {
    let config = resolve_config(repo, cli.config.as_deref()).await?;
    warn_if_invalid(&config);
    let calculator = PayrollCalculator::new(&config);

    let today = Local::now().date_naive();
    let month = period.0.unwrap_or_else(|| today.month());
    let year = period.1.unwrap_or_else(|| today.year());

    let rows = entries::load_from_file(entries_path)
        .with_context(|| format!("Failed to load entries from {}", entries_path.display()))?;
    info!(rows = rows.len(), month, year, "Calculating payroll");

    for row in &rows {
        let mut new = row.to_new_record(month, year);
        let breakdown = calculator.calculate(&new.entry);
        debug!(
            row = row.row,
            employee = %row.employee_name,
            net_pay = %breakdown.net_pay,
            "Calculated"
        );

        let record = if save {
            new.apply(&breakdown);
            let record = repo
                .create_record(new)
                .await
                .with_context(|| format!("Failed to store row {}", row.row))?;
            info!(id = record.id, employee = %record.employee_name, "Saved payroll record");
            record
        } else {
            preview_record(new, &breakdown)
        };

        print_payslip(&Payslip::build(&record, &breakdown), &breakdown, json)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let db_config = DbConfig {
        backend: cli.backend.clone(),
        connection_string: cli.database.clone(),
    };
    debug!("connecting to {} backend", db_config.backend);
    let repo = build_registry()
        .create(&db_config)
        .await
        .with_context(|| format!("Failed to open database {}", db_config.connection_string))?;

    match &cli.command {
        Command::Calculate {
            entries,
            month,
            year,
            save,
            json,
        } => calculate(&*repo, &cli, entries, (*month, *year), *save, *json).await?,

        Command::LoadBrackets { file } => {
            let reader = File::open(file)
                .with_context(|| format!("Failed to open CSV file: {}", file.display()))?;
            let records = TaxTableLoader::parse(reader).context("Failed to parse CSV")?;
            info!("Parsed {} bracket rows", records.len());

            let saved = TaxTableLoader::load(&*repo, &records)
                .await
                .context("Failed to load brackets into database")?;
            warn_if_invalid(&saved);
            info!("Done");
        }

        Command::ShowConfig => {
            let config = resolve_config(&*repo, cli.config.as_deref()).await?;
            warn_if_invalid(&config);
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Command::List { month, year } => {
            let records = repo.list_records(*month, *year).await?;
            for r in &records {
                println!(
                    "{:>5}  {:02}/{}  {:<30}  {:<8}  {:>12}  {}",
                    r.id,
                    r.month,
                    r.year,
                    r.employee_name,
                    r.registration,
                    format!("{:.2}", r.totals.net_pay),
                    r.status.as_str()
                );
            }
            info!("{} record(s)", records.len());
        }

        Command::Show { id } => {
            let record = repo
                .get_record(*id)
                .await
                .with_context(|| format!("No payroll record with id {id}"))?;
            let config = resolve_config(&*repo, cli.config.as_deref()).await?;
            warn_if_invalid(&config);
            let breakdown = PayrollCalculator::new(&config).calculate(&record.entry);
            println!("{}", Payslip::build(&record, &breakdown));
        }

        Command::MarkPaid { id } => {
            let mut record = repo
                .get_record(*id)
                .await
                .with_context(|| format!("No payroll record with id {id}"))?;
            if record.mark_paid() {
                repo.update_record(&record).await?;
                info!(id, employee = %record.employee_name, "Marked as paid");
            } else {
                info!(id, "Already paid");
            }
        }
    }

    Ok(())
}
