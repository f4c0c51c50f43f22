mod hazard_tier;
mod payroll_breakdown;
mod payroll_record;
mod tax_bracket;
mod tax_table_config;
mod variable_entry;

pub use hazard_tier::HazardTier;
pub use payroll_breakdown::PayrollBreakdown;
pub use payroll_record::{NewPayrollRecord, PayrollRecord, PayrollStatus, PayrollTotals};
pub use tax_bracket::TaxBracket;
pub use tax_table_config::{AdditionalPayPolicy, TaxTable, TaxTableConfig, TaxTableConfigError};
pub use variable_entry::{EmployeeVariableEntry, MAX_AMOUNT, VariableEntryForm};
