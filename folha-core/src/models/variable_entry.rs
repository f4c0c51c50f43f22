use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::non_negative;
use crate::input::{deserialize_lenient_decimal, deserialize_lenient_flag};
use crate::models::HazardTier;

/// One employee's inputs for one pay period.
///
/// Every amount is non-negative and present. Build one from raw form data
/// with [`VariableEntryForm::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeVariableEntry {
    pub base_salary: Decimal,

    // Hours and premiums
    pub overtime_50_hours: Decimal,
    pub overtime_100_hours: Decimal,
    /// Pay the weekly-rest reflection (DSR) on overtime.
    pub weekly_rest: bool,
    pub night_hours: Decimal,
    pub hazard_tier: HazardTier,
    pub danger_pay: bool,

    // Other earnings
    pub commissions: Decimal,
    pub bonuses: Decimal,
    pub awards: Decimal,
    /// Seniority bonus (ATS) as a percentage of base salary, e.g. `5` for 5%.
    pub seniority_percent: Decimal,
    /// Clergy housing allowance. Paid, but outside the INSS base.
    pub housing_allowance: Decimal,
    pub dependents: u32,

    // Attendance
    pub absence_days: Decimal,
    pub lateness_hours: Decimal,

    // Benefits withheld from pay
    pub transit_benefit: bool,
    /// Monthly cost of the transit benefit, before the 6% cap.
    pub transit_cost: Decimal,
    pub meal: Decimal,
    pub food: Decimal,
    pub pharmacy: Decimal,
    pub health_plan: Decimal,
    pub dependents_health_plan: Decimal,

    /// Recorded on the entry but not withheld from pay.
    pub life_insurance: Decimal,

    pub salary_advance: Decimal,
    pub payroll_loan: Decimal,
    pub alimony: Decimal,
    pub other_deductions: Decimal,

    /// Recorded on the entry but not withheld from pay.
    pub other_copayments: Decimal,
}

/// Raw variable-entry data as typed into a form or a CSV row.
///
/// Every field is optional and forgiving: numbers may arrive as JSON
/// numbers or as text in either `1234.56` or `1.234,56` form, and anything
/// unreadable is treated as missing. Field names also accept the Portuguese
/// spellings used by existing spreadsheets (`salario_base`, `he50_qtd`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableEntryForm {
    #[serde(alias = "salario_base", deserialize_with = "deserialize_lenient_decimal")]
    pub base_salary: Option<Decimal>,
    #[serde(alias = "he50_qtd", deserialize_with = "deserialize_lenient_decimal")]
    pub overtime_50_hours: Option<Decimal>,
    #[serde(alias = "he100_qtd", deserialize_with = "deserialize_lenient_decimal")]
    pub overtime_100_hours: Option<Decimal>,
    #[serde(alias = "dsr_ativo", deserialize_with = "deserialize_lenient_flag")]
    pub weekly_rest: Option<bool>,
    #[serde(alias = "adic_noturno_qtd", deserialize_with = "deserialize_lenient_decimal")]
    pub night_hours: Option<Decimal>,
    #[serde(alias = "insalubridade_grau")]
    pub hazard_tier: Option<String>,
    #[serde(alias = "periculosidade_ativo", deserialize_with = "deserialize_lenient_flag")]
    pub danger_pay: Option<bool>,
    #[serde(alias = "comissoes", deserialize_with = "deserialize_lenient_decimal")]
    pub commissions: Option<Decimal>,
    #[serde(alias = "gratificacoes", deserialize_with = "deserialize_lenient_decimal")]
    pub bonuses: Option<Decimal>,
    #[serde(alias = "premios", deserialize_with = "deserialize_lenient_decimal")]
    pub awards: Option<Decimal>,
    #[serde(alias = "ats_percentual", deserialize_with = "deserialize_lenient_decimal")]
    pub seniority_percent: Option<Decimal>,
    #[serde(alias = "auxilio_moradia", deserialize_with = "deserialize_lenient_decimal")]
    pub housing_allowance: Option<Decimal>,
    #[serde(alias = "dependentes_qtd", deserialize_with = "deserialize_lenient_decimal")]
    pub dependents: Option<Decimal>,
    #[serde(alias = "faltas", deserialize_with = "deserialize_lenient_decimal")]
    pub absence_days: Option<Decimal>,
    #[serde(alias = "atrasos", deserialize_with = "deserialize_lenient_decimal")]
    pub lateness_hours: Option<Decimal>,
    #[serde(alias = "vt_ativo", deserialize_with = "deserialize_lenient_flag")]
    pub transit_benefit: Option<bool>,
    #[serde(alias = "vale_transporte_total", deserialize_with = "deserialize_lenient_decimal")]
    pub transit_cost: Option<Decimal>,
    #[serde(alias = "vale_refeicao", deserialize_with = "deserialize_lenient_decimal")]
    pub meal: Option<Decimal>,
    #[serde(alias = "vale_alimentacao", deserialize_with = "deserialize_lenient_decimal")]
    pub food: Option<Decimal>,
    #[serde(alias = "vale_farmacia", deserialize_with = "deserialize_lenient_decimal")]
    pub pharmacy: Option<Decimal>,
    #[serde(alias = "plano_saude_colaborador", deserialize_with = "deserialize_lenient_decimal")]
    pub health_plan: Option<Decimal>,
    #[serde(alias = "plano_saude_dependentes", deserialize_with = "deserialize_lenient_decimal")]
    pub dependents_health_plan: Option<Decimal>,
    #[serde(alias = "seguro_vida", deserialize_with = "deserialize_lenient_decimal")]
    pub life_insurance: Option<Decimal>,
    #[serde(alias = "adiantamento", deserialize_with = "deserialize_lenient_decimal")]
    pub salary_advance: Option<Decimal>,
    #[serde(alias = "consignado", deserialize_with = "deserialize_lenient_decimal")]
    pub payroll_loan: Option<Decimal>,
    #[serde(alias = "pensao_alimenticia", deserialize_with = "deserialize_lenient_decimal")]
    pub alimony: Option<Decimal>,
    #[serde(alias = "outros_descontos", deserialize_with = "deserialize_lenient_decimal")]
    pub other_deductions: Option<Decimal>,
    #[serde(alias = "coparticipacoes", deserialize_with = "deserialize_lenient_decimal")]
    pub other_copayments: Option<Decimal>,
}

/// Largest amount, hour count or percentage a form field may carry.
///
/// Keeps every product and sum the calculator forms well inside
/// `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn amount(
    field: &'static str,
    value: Option<Decimal>,
) -> Decimal {
    let value = non_negative(value.unwrap_or(Decimal::ZERO));
    if value > MAX_AMOUNT {
        debug!(field, %value, "Amount out of range, treating as 0");
        return Decimal::ZERO;
    }
    value
}

impl VariableEntryForm {
    /// Turns the form into a fully defaulted entry.
    ///
    /// Missing and negative amounts become zero, as do amounts above
    /// [`MAX_AMOUNT`]. Flags default to off, an unknown hazard grade becomes
    /// [`HazardTier::None`] and a fractional dependents count is truncated.
    pub fn normalize(&self) -> EmployeeVariableEntry {
        let hazard_tier = match self.hazard_tier.as_deref() {
            None => HazardTier::None,
            Some(raw) => HazardTier::parse(raw).unwrap_or_else(|| {
                debug!(value = %raw, "Unknown hazard grade, treating as NONE");
                HazardTier::None
            }),
        };

        let dependents = amount("dependents", self.dependents)
            .trunc()
            .to_u32()
            .unwrap_or_else(|| {
                debug!(value = ?self.dependents, "Dependents count out of range, treating as 0");
                0
            });

        EmployeeVariableEntry {
            base_salary: amount("base_salary", self.base_salary),
            overtime_50_hours: amount("overtime_50_hours", self.overtime_50_hours),
            overtime_100_hours: amount("overtime_100_hours", self.overtime_100_hours),
            weekly_rest: self.weekly_rest.unwrap_or(false),
            night_hours: amount("night_hours", self.night_hours),
            hazard_tier,
            danger_pay: self.danger_pay.unwrap_or(false),
            commissions: amount("commissions", self.commissions),
            bonuses: amount("bonuses", self.bonuses),
            awards: amount("awards", self.awards),
            seniority_percent: amount("seniority_percent", self.seniority_percent),
            housing_allowance: amount("housing_allowance", self.housing_allowance),
            dependents,
            absence_days: amount("absence_days", self.absence_days),
            lateness_hours: amount("lateness_hours", self.lateness_hours),
            transit_benefit: self.transit_benefit.unwrap_or(false),
            transit_cost: amount("transit_cost", self.transit_cost),
            meal: amount("meal", self.meal),
            food: amount("food", self.food),
            pharmacy: amount("pharmacy", self.pharmacy),
            health_plan: amount("health_plan", self.health_plan),
            dependents_health_plan: amount("dependents_health_plan", self.dependents_health_plan),
            life_insurance: amount("life_insurance", self.life_insurance),
            salary_advance: amount("salary_advance", self.salary_advance),
            payroll_loan: amount("payroll_loan", self.payroll_loan),
            alimony: amount("alimony", self.alimony),
            other_deductions: amount("other_deductions", self.other_deductions),
            other_copayments: amount("other_copayments", self.other_copayments),
        }
    }
}

impl From<VariableEntryForm> for EmployeeVariableEntry {
    fn from(form: VariableEntryForm) -> Self {
        form.normalize()
    }
}
