use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{EmployeeVariableEntry, PayrollBreakdown};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollStatus {
    #[default]
    Pending,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// The six figures stored back on a payroll record after calculating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    pub total_earnings: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
    pub social_security_withheld: Decimal,
    pub income_tax_withheld: Decimal,
    pub severance_fund_contribution: Decimal,
}

impl From<&PayrollBreakdown> for PayrollTotals {
    fn from(breakdown: &PayrollBreakdown) -> Self {
        Self {
            total_earnings: breakdown.total_earnings,
            total_deductions: breakdown.total_deductions,
            net_pay: breakdown.net_pay,
            social_security_withheld: breakdown.social_security_withheld,
            income_tax_withheld: breakdown.income_tax_withheld,
            severance_fund_contribution: breakdown.severance_fund_contribution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: i64,

    // Employee
    pub employee_name: String,
    pub registration: String,
    pub role: String,

    // Period
    pub month: u32,
    pub year: i32,

    pub entry: EmployeeVariableEntry,

    // Calculated values, zero until the first calculation is applied
    pub totals: PayrollTotals,

    pub status: PayrollStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Stores a calculation result on the record.
    pub fn apply(
        &mut self,
        breakdown: &PayrollBreakdown,
    ) {
        self.totals = PayrollTotals::from(breakdown);
    }

    /// Closes the record for its period. Paying twice is a no-op.
    pub fn mark_paid(&mut self) -> bool {
        let changed = self.status != PayrollStatus::Paid;
        self.status = PayrollStatus::Paid;
        changed
    }
}

/// For creating new records (no id or timestamps).
///
/// Totals are written in the same insert as the entry, so apply the
/// calculation before creating the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayrollRecord {
    pub employee_name: String,
    pub registration: String,
    pub role: String,
    pub month: u32,
    pub year: i32,
    pub entry: EmployeeVariableEntry,
    #[serde(default)]
    pub totals: PayrollTotals,
}

impl NewPayrollRecord {
    pub fn apply(
        &mut self,
        breakdown: &PayrollBreakdown,
    ) {
        self.totals = PayrollTotals::from(breakdown);
    }
}
