//! Deductions (descontos) formulas and withholding bases.

use rust_decimal::Decimal;

use crate::calculations::common::non_negative;

/// Employee share cap for the transit benefit: 6% of base salary.
const TRANSIT_CAP_RATE: Decimal = Decimal::from_parts(6, 0, 0, false, 2);

/// Days in the commercial month used for absence discounts.
const COMMERCIAL_MONTH_DAYS: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Vale-transporte. The employee pays the lesser of the actual cost and 6%
/// of base salary; the employer covers the rest.
pub fn transit_deduction(
    base_salary: Decimal,
    cost: Decimal,
    enabled: bool,
) -> Decimal {
    if enabled {
        cost.min(base_salary * TRANSIT_CAP_RATE)
    } else {
        Decimal::ZERO
    }
}

pub fn absence_deduction(
    base_salary: Decimal,
    absence_days: Decimal,
) -> Decimal {
    base_salary / COMMERCIAL_MONTH_DAYS * absence_days
}

pub fn lateness_deduction(
    hourly_rate: Decimal,
    lateness_hours: Decimal,
) -> Decimal {
    hourly_rate * lateness_hours
}

/// INSS base: earnings minus the lines outside social security (housing
/// allowance and family allowance).
pub fn social_security_base(
    total_earnings: Decimal,
    housing_allowance: Decimal,
    family_allowance: Decimal,
) -> Decimal {
    non_negative(total_earnings - housing_allowance - family_allowance)
}

/// The part of the INSS base that contributions are charged on.
pub fn contribution_base(
    social_security_base: Decimal,
    ceiling: Option<Decimal>,
) -> Decimal {
    match ceiling {
        Some(ceiling) => social_security_base.min(ceiling),
        None => social_security_base,
    }
}

/// IRRF base after INSS, dependents and court-ordered alimony.
pub fn income_tax_base(
    social_security_base: Decimal,
    social_security_withheld: Decimal,
    dependents_deduction: Decimal,
    alimony: Decimal,
) -> Decimal {
    non_negative(
        social_security_base - social_security_withheld - dependents_deduction - alimony,
    )
}
