use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

/// Result of a payroll calculation for one employee and period.
///
/// Produced by [`PayrollCalculator`](crate::calculations::PayrollCalculator).
/// All amounts are in reais, rounded to centavos, except `hourly_rate`
/// which keeps four decimal places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    pub hourly_rate: Decimal,

    // Earnings (proventos)
    pub base_salary: Decimal,
    pub overtime_at_50: Decimal,
    pub overtime_at_100: Decimal,
    pub weekly_rest_compensation: Decimal,
    pub night_shift_premium: Decimal,
    pub commissions: Decimal,
    pub bonuses: Decimal,
    pub awards: Decimal,
    pub hazard_pay_amount: Decimal,
    pub danger_pay_amount: Decimal,
    pub seniority_amount: Decimal,
    pub housing_allowance: Decimal,
    pub family_allowance: Decimal,
    pub total_earnings: Decimal,

    // Withholding
    pub social_security_base: Decimal,
    pub social_security_withheld: Decimal,
    pub dependents_deduction: Decimal,
    pub income_tax_base: Decimal,
    pub income_tax_withheld: Decimal,

    // Deductions (descontos)
    pub transit_deduction: Decimal,
    pub meal_deduction: Decimal,
    pub food_deduction: Decimal,
    pub health_plan_deduction: Decimal,
    pub dependents_health_plan_deduction: Decimal,
    pub pharmacy_deduction: Decimal,
    pub absence_deduction: Decimal,
    pub lateness_deduction: Decimal,
    pub salary_advance: Decimal,
    pub payroll_loan: Decimal,
    pub alimony: Decimal,
    pub other_deductions: Decimal,
    pub total_deductions: Decimal,

    pub net_pay: Decimal,

    // Employer side, never taken from net pay
    pub severance_fund_contribution: Decimal,
    pub employer_social_security: Decimal,
    pub work_accident_insurance: Decimal,
    pub employer_burden: Decimal,
}

impl PayrollBreakdown {
    /// Rounds every amount to centavos and recomputes the totals from the
    /// rounded lines, so the payslip adds up to the cent.
    pub(crate) fn finalize(mut self) -> Self {
        self.hourly_rate = self.hourly_rate.round_dp(4);

        for field in [
            &mut self.base_salary,
            &mut self.overtime_at_50,
            &mut self.overtime_at_100,
            &mut self.weekly_rest_compensation,
            &mut self.night_shift_premium,
            &mut self.commissions,
            &mut self.bonuses,
            &mut self.awards,
            &mut self.hazard_pay_amount,
            &mut self.danger_pay_amount,
            &mut self.seniority_amount,
            &mut self.housing_allowance,
            &mut self.family_allowance,
            &mut self.social_security_base,
            &mut self.social_security_withheld,
            &mut self.dependents_deduction,
            &mut self.income_tax_base,
            &mut self.income_tax_withheld,
            &mut self.transit_deduction,
            &mut self.meal_deduction,
            &mut self.food_deduction,
            &mut self.health_plan_deduction,
            &mut self.dependents_health_plan_deduction,
            &mut self.pharmacy_deduction,
            &mut self.absence_deduction,
            &mut self.lateness_deduction,
            &mut self.salary_advance,
            &mut self.payroll_loan,
            &mut self.alimony,
            &mut self.other_deductions,
            &mut self.severance_fund_contribution,
            &mut self.employer_social_security,
            &mut self.work_accident_insurance,
        ] {
            *field = round_half_up(*field);
        }

        self.total_earnings = self.earning_lines().iter().sum();
        self.total_deductions = self.deduction_lines().iter().sum();
        self.net_pay = self.total_earnings - self.total_deductions;
        self.employer_burden = self.severance_fund_contribution
            + self.employer_social_security
            + self.work_accident_insurance;

        self
    }

    fn earning_lines(&self) -> [Decimal; 13] {
        [
            self.base_salary,
            self.overtime_at_50,
            self.overtime_at_100,
            self.weekly_rest_compensation,
            self.night_shift_premium,
            self.commissions,
            self.bonuses,
            self.awards,
            self.hazard_pay_amount,
            self.danger_pay_amount,
            self.seniority_amount,
            self.housing_allowance,
            self.family_allowance,
        ]
    }

    fn deduction_lines(&self) -> [Decimal; 14] {
        [
            self.social_security_withheld,
            self.income_tax_withheld,
            self.transit_deduction,
            self.meal_deduction,
            self.food_deduction,
            self.health_plan_deduction,
            self.dependents_health_plan_deduction,
            self.pharmacy_deduction,
            self.absence_deduction,
            self.lateness_deduction,
            self.salary_advance,
            self.payroll_loan,
            self.alimony,
            self.other_deductions,
        ]
    }
}
