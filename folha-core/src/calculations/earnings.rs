//! Earnings (proventos) formulas.
//!
//! Each function computes one earnings line at full precision. Rounding is
//! left to the breakdown.

use rust_decimal::Decimal;

use crate::models::{AdditionalPayPolicy, HazardTier, TaxTableConfig};

/// Standard monthly working hours (44h week).
pub const MONTHLY_HOURS: Decimal = Decimal::from_parts(220, 0, 0, false, 0);

/// Working days per week that the weekly rest reflects over.
const WORKING_DAYS_PER_REST_DAY: Decimal = Decimal::from_parts(6, 0, 0, false, 0);

const OVERTIME_50_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
const OVERTIME_100_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
const NIGHT_PREMIUM_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
const DANGER_PAY_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

pub fn hourly_rate(base_salary: Decimal) -> Decimal {
    base_salary / MONTHLY_HOURS
}

pub fn overtime_at_50(
    hourly_rate: Decimal,
    hours: Decimal,
) -> Decimal {
    hourly_rate * OVERTIME_50_MULTIPLIER * hours
}

pub fn overtime_at_100(
    hourly_rate: Decimal,
    hours: Decimal,
) -> Decimal {
    hourly_rate * OVERTIME_100_MULTIPLIER * hours
}

/// DSR reflection: one sixth of the overtime paid, when enabled.
pub fn weekly_rest_compensation(
    overtime: Decimal,
    enabled: bool,
) -> Decimal {
    if enabled {
        overtime / WORKING_DAYS_PER_REST_DAY
    } else {
        Decimal::ZERO
    }
}

/// 20% of the hourly rate per night hour.
pub fn night_shift_premium(
    hourly_rate: Decimal,
    night_hours: Decimal,
) -> Decimal {
    hourly_rate * NIGHT_PREMIUM_RATE * night_hours
}

pub fn seniority_amount(
    base_salary: Decimal,
    seniority_percent: Decimal,
) -> Decimal {
    base_salary * seniority_percent / Decimal::ONE_HUNDRED
}

/// Salário-família. Paid per dependent only while the base salary is at or
/// below the ceiling; one centavo above it pays nothing.
pub fn family_allowance(
    base_salary: Decimal,
    dependents: u32,
    config: &TaxTableConfig,
) -> Decimal {
    if base_salary <= config.family_allowance_ceiling {
        Decimal::from(dependents) * config.family_allowance_per_dependent
    } else {
        Decimal::ZERO
    }
}

/// Insalubridade, a share of the minimum wage by grade.
pub fn hazard_pay(
    tier: HazardTier,
    minimum_wage: Decimal,
) -> Decimal {
    minimum_wage * tier.rate()
}

/// Periculosidade, 30% of base salary.
pub fn danger_pay(
    base_salary: Decimal,
    enabled: bool,
) -> Decimal {
    if enabled {
        base_salary * DANGER_PAY_RATE
    } else {
        Decimal::ZERO
    }
}

/// Applies `policy` to a (hazard, danger) pair.
///
/// Under [`AdditionalPayPolicy::MoreFavorable`] the smaller premium is
/// zeroed. On a tie danger pay is kept.
pub fn combine_additional_pay(
    hazard: Decimal,
    danger: Decimal,
    policy: AdditionalPayPolicy,
) -> (Decimal, Decimal) {
    match policy {
        AdditionalPayPolicy::Cumulative => (hazard, danger),
        AdditionalPayPolicy::MoreFavorable if hazard > danger => (hazard, Decimal::ZERO),
        AdditionalPayPolicy::MoreFavorable if danger > Decimal::ZERO => (Decimal::ZERO, danger),
        AdditionalPayPolicy::MoreFavorable => (hazard, danger),
    }
}
