//! Monthly payroll calculation (folha de pagamento).
//!
//! Turns one employee's [`EmployeeVariableEntry`] into a
//! [`PayrollBreakdown`] under a given [`TaxTableConfig`].
//!
//! # Calculation Order
//!
//! | Step | Line | Rule |
//! |------|------|------|
//! | 1 | Hourly rate | base salary / 220 |
//! | 2 | Overtime | hourly × 1.5 × hours, hourly × 2.0 × hours |
//! | 3 | DSR | overtime / 6, when enabled |
//! | 4 | Night premium | hourly × 0.2 × night hours |
//! | 5 | Hazard / danger | minimum wage × grade, base × 0.3, combined per policy |
//! | 6 | Seniority | base × percent / 100 |
//! | 7 | Family allowance | dependents × amount, base at or under the ceiling |
//! | 8 | Total earnings | sum of the above plus commissions, bonuses, awards, housing |
//! | 9 | INSS base | total earnings − housing − family allowance |
//! | 10 | INSS | cumulative slabs over the base, capped at the ceiling |
//! | 11 | IRRF base | INSS base − INSS − dependents − alimony |
//! | 12 | IRRF | single lookup over the IRRF base |
//! | 13 | Deductions | transit (6% cap), benefits, absences, lateness, advance, loan, alimony, other |
//! | 14 | Net pay | total earnings − total deductions |
//! | 15 | Employer | FGTS, employer INSS, RAT over the INSS base |
//!
//! Every step runs at full precision; the breakdown is rounded to centavos
//! once at the end.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use folha_core::calculations::PayrollCalculator;
//! use folha_core::{EmployeeVariableEntry, TaxTableConfig};
//!
//! let config = TaxTableConfig::default();
//! let entry = EmployeeVariableEntry {
//!     base_salary: dec!(2000),
//!     overtime_50_hours: dec!(10),
//!     weekly_rest: true,
//!     ..Default::default()
//! };
//!
//! let breakdown = PayrollCalculator::new(&config).calculate(&entry);
//!
//! assert_eq!(breakdown.total_earnings, dec!(2159.09));
//! assert_eq!(breakdown.social_security_withheld, dec!(173.14));
//! assert_eq!(breakdown.net_pay, dec!(1985.95));
//! ```

use rust_decimal::Decimal;

use crate::calculations::brackets::BracketMode;
use crate::calculations::{deductions, earnings};
use crate::models::{EmployeeVariableEntry, PayrollBreakdown, TaxTable, TaxTableConfig};

/// Payroll calculator bound to one configuration snapshot.
///
/// Holds no state besides the borrowed config, so a single calculator can
/// be shared across threads and reused for every employee in a period.
#[derive(Debug, Clone, Copy)]
pub struct PayrollCalculator<'a> {
    config: &'a TaxTableConfig,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(config: &'a TaxTableConfig) -> Self {
        Self { config }
    }

    /// Calculates the full breakdown for `entry`.
    ///
    /// Never fails. A malformed bracket table withholds nothing for that
    /// table; call [`TaxTableConfig::validate`] beforehand to detect it.
    pub fn calculate(
        &self,
        entry: &EmployeeVariableEntry,
    ) -> PayrollBreakdown {
        let base = entry.base_salary;

        // Hourly rate
        let hourly_rate = earnings::hourly_rate(base);

        // Overtime and DSR reflection
        let overtime_at_50 = earnings::overtime_at_50(hourly_rate, entry.overtime_50_hours);
        let overtime_at_100 = earnings::overtime_at_100(hourly_rate, entry.overtime_100_hours);
        let weekly_rest_compensation =
            earnings::weekly_rest_compensation(overtime_at_50 + overtime_at_100, entry.weekly_rest);

        // Night premium
        let night_shift_premium = earnings::night_shift_premium(hourly_rate, entry.night_hours);

        // Hazard and danger pay
        let (hazard_pay_amount, danger_pay_amount) = earnings::combine_additional_pay(
            earnings::hazard_pay(entry.hazard_tier, self.config.minimum_wage),
            earnings::danger_pay(base, entry.danger_pay),
            self.config.additional_pay_policy,
        );

        // Seniority and family allowance
        let seniority_amount = earnings::seniority_amount(base, entry.seniority_percent);
        let family_allowance = earnings::family_allowance(base, entry.dependents, self.config);

        let total_earnings = base
            + overtime_at_50
            + overtime_at_100
            + weekly_rest_compensation
            + night_shift_premium
            + entry.commissions
            + entry.bonuses
            + entry.awards
            + hazard_pay_amount
            + danger_pay_amount
            + seniority_amount
            + entry.housing_allowance
            + family_allowance;

        // INSS
        let social_security_base = deductions::social_security_base(
            total_earnings,
            entry.housing_allowance,
            family_allowance,
        );
        let social_security_withheld = self.withheld(
            TaxTable::SocialSecurity,
            deductions::contribution_base(
                social_security_base,
                self.config.social_security_ceiling,
            ),
        );

        // IRRF
        let dependents_deduction =
            Decimal::from(entry.dependents) * self.config.income_tax_dependent_deduction;
        let income_tax_base = deductions::income_tax_base(
            social_security_base,
            social_security_withheld,
            dependents_deduction,
            entry.alimony,
        );
        let income_tax_withheld = self.withheld(TaxTable::IncomeTax, income_tax_base);

        // Other deductions
        let transit_deduction =
            deductions::transit_deduction(base, entry.transit_cost, entry.transit_benefit);
        let absence_deduction = deductions::absence_deduction(base, entry.absence_days);
        let lateness_deduction = deductions::lateness_deduction(hourly_rate, entry.lateness_hours);

        // Employer contributions
        let severance_fund_contribution = social_security_base * self.config.severance_fund_rate;
        let employer_social_security =
            social_security_base * self.config.employer_social_security_rate;
        let work_accident_insurance =
            social_security_base * self.config.work_accident_insurance_rate;

        PayrollBreakdown {
            hourly_rate,
            base_salary: base,
            overtime_at_50,
            overtime_at_100,
            weekly_rest_compensation,
            night_shift_premium,
            commissions: entry.commissions,
            bonuses: entry.bonuses,
            awards: entry.awards,
            hazard_pay_amount,
            danger_pay_amount,
            seniority_amount,
            housing_allowance: entry.housing_allowance,
            family_allowance,
            social_security_base,
            social_security_withheld,
            dependents_deduction,
            income_tax_base,
            income_tax_withheld,
            transit_deduction,
            meal_deduction: entry.meal,
            food_deduction: entry.food,
            health_plan_deduction: entry.health_plan,
            dependents_health_plan_deduction: entry.dependents_health_plan,
            pharmacy_deduction: entry.pharmacy,
            absence_deduction,
            lateness_deduction,
            salary_advance: entry.salary_advance,
            payroll_loan: entry.payroll_loan,
            alimony: entry.alimony,
            other_deductions: entry.other_deductions,
            severance_fund_contribution,
            employer_social_security,
            work_accident_insurance,
            ..Default::default()
        }
        .finalize()
    }

    fn withheld(
        &self,
        table: TaxTable,
        base: Decimal,
    ) -> Decimal {
        BracketMode::for_table(table).withheld(base, self.config.brackets(table))
    }
}
