//! Payslip (holerite) line items.
//!
//! [`Payslip::build`] lays a [`PayrollBreakdown`] out as the coded lines of
//! a Brazilian pay stub. `Display` renders it as fixed-width text.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{EmployeeVariableEntry, HazardTier, PayrollBreakdown, PayrollRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayslipLine {
    pub code: &'static str,
    pub description: &'static str,
    /// Quantity or basis shown in the reference column (`30D`, `10.00H`, `5%`).
    pub reference: String,
    pub earning: Decimal,
    pub deduction: Decimal,
}

impl PayslipLine {
    fn earning(
        code: &'static str,
        description: &'static str,
        reference: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            code,
            description,
            reference: reference.into(),
            earning: amount,
            deduction: Decimal::ZERO,
        }
    }

    fn deduction(
        code: &'static str,
        description: &'static str,
        reference: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            code,
            description,
            reference: reference.into(),
            earning: Decimal::ZERO,
            deduction: amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payslip {
    pub employee_name: String,
    pub registration: String,
    pub role: String,
    pub month: u32,
    pub year: i32,
    pub lines: Vec<PayslipLine>,
    pub total_earnings: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
    pub social_security_base: Decimal,
    pub severance_fund_contribution: Decimal,
    pub income_tax_base: Decimal,
}

impl Payslip {
    /// Builds the payslip for `record` from an already calculated breakdown.
    ///
    /// Base salary and INSS always appear; every other line only when its
    /// amount is non-zero.
    pub fn build(
        record: &PayrollRecord,
        breakdown: &PayrollBreakdown,
    ) -> Self {
        let entry = &record.entry;
        let b = breakdown;
        let mut lines = vec![PayslipLine::earning(
            "001",
            "SALARIO BASE",
            "30D",
            b.base_salary,
        )];

        let optional_earnings = [
            PayslipLine::earning(
                "002",
                "HORAS EXTRAS 50%",
                hours(entry.overtime_50_hours),
                b.overtime_at_50,
            ),
            PayslipLine::earning(
                "003",
                "HORAS EXTRAS 100%",
                hours(entry.overtime_100_hours),
                b.overtime_at_100,
            ),
            PayslipLine::earning("004", "DSR S/ HORAS EXTRAS", "", b.weekly_rest_compensation),
            PayslipLine::earning(
                "005",
                "ADICIONAL NOTURNO",
                hours(entry.night_hours),
                b.night_shift_premium,
            ),
            PayslipLine::earning(
                "010",
                "ADICIONAL TEMPO SERVICO",
                percent(entry.seniority_percent),
                b.seniority_amount,
            ),
            PayslipLine::earning(
                "020",
                "INSALUBRIDADE",
                hazard_reference(entry),
                b.hazard_pay_amount,
            ),
            PayslipLine::earning("021", "PERICULOSIDADE", "30%", b.danger_pay_amount),
            PayslipLine::earning("030", "COMISSOES", "", b.commissions),
            PayslipLine::earning("031", "GRATIFICACOES", "", b.bonuses),
            PayslipLine::earning("032", "PREMIOS", "", b.awards),
            PayslipLine::earning("080", "AUXILIO MORADIA", "FIXO", b.housing_allowance),
            PayslipLine::earning(
                "090",
                "SALARIO FAMILIA",
                entry.dependents.to_string(),
                b.family_allowance,
            ),
        ];
        lines.extend(optional_earnings.into_iter().filter(|l| !l.earning.is_zero()));

        lines.push(PayslipLine::deduction(
            "901",
            "INSS",
            "VAR",
            b.social_security_withheld,
        ));

        let optional_deductions = [
            PayslipLine::deduction("902", "IRRF", "VAR", b.income_tax_withheld),
            PayslipLine::deduction("910", "FALTAS", days(entry.absence_days), b.absence_deduction),
            PayslipLine::deduction(
                "911",
                "ATRASOS",
                hours(entry.lateness_hours),
                b.lateness_deduction,
            ),
            PayslipLine::deduction("920", "VALE TRANSPORTE", "6%", b.transit_deduction),
            PayslipLine::deduction("930", "ADIANTAMENTO", "", b.salary_advance),
            PayslipLine::deduction("931", "EMPRESTIMO CONSIGNADO", "PARC", b.payroll_loan),
            PayslipLine::deduction("940", "PENSAO ALIMENTICIA", "", b.alimony),
            PayslipLine::deduction("950", "PLANO DE SAUDE", "PARC", b.health_plan_deduction),
            PayslipLine::deduction(
                "951",
                "PLANO DE SAUDE DEPENDENTES",
                "PARC",
                b.dependents_health_plan_deduction,
            ),
            PayslipLine::deduction("960", "VALE FARMACIA", "", b.pharmacy_deduction),
            PayslipLine::deduction("970", "VALE ALIMENTACAO", "", b.food_deduction),
            PayslipLine::deduction("971", "VALE REFEICAO", "", b.meal_deduction),
            PayslipLine::deduction("990", "OUTROS DESCONTOS", "", b.other_deductions),
        ];
        lines.extend(optional_deductions.into_iter().filter(|l| !l.deduction.is_zero()));

        Self {
            employee_name: record.employee_name.clone(),
            registration: record.registration.clone(),
            role: record.role.clone(),
            month: record.month,
            year: record.year,
            lines,
            total_earnings: b.total_earnings,
            total_deductions: b.total_deductions,
            net_pay: b.net_pay,
            social_security_base: b.social_security_base,
            severance_fund_contribution: b.severance_fund_contribution,
            income_tax_base: b.income_tax_base,
        }
    }
}

fn hours(value: Decimal) -> String {
    format!("{value:.2}H")
}

fn days(value: Decimal) -> String {
    format!("{}D", value.normalize())
}

fn percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

fn hazard_reference(entry: &EmployeeVariableEntry) -> String {
    match entry.hazard_tier {
        HazardTier::None => String::new(),
        tier => percent(tier.rate() * Decimal::ONE_HUNDRED),
    }
}

fn amount_column(value: Decimal) -> String {
    if value.is_zero() {
        String::new()
    } else {
        format!("{value:.2}")
    }
}

const RULE_WIDTH: usize = 78;

impl fmt::Display for Payslip {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(
            f,
            "{:<60}{:>18}",
            "RECIBO DE PAGAMENTO DE SALARIO",
            format!("{:02}/{}", self.month, self.year)
        )?;
        writeln!(
            f,
            "{:<40}{:<20}{:>18}",
            self.employee_name,
            format!("MATRICULA {}", self.registration),
            self.role
        )?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<5}{:<33}{:>10}{:>15}{:>15}",
            "COD", "DESCRICAO", "REF", "PROVENTOS", "DESCONTOS"
        )?;
        writeln!(f, "{rule}")?;

        for line in &self.lines {
            writeln!(
                f,
                "{:<5}{:<33}{:>10}{:>15}{:>15}",
                line.code,
                line.description,
                line.reference,
                amount_column(line.earning),
                amount_column(line.deduction)
            )?;
        }

        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<48}{:>15}{:>15}",
            "TOTAIS",
            format!("{:.2}", self.total_earnings),
            format!("{:.2}", self.total_deductions)
        )?;
        writeln!(
            f,
            "{:<63}{:>15}",
            "VALOR LIQUIDO",
            format!("{:.2}", self.net_pay)
        )?;
        writeln!(f, "{rule}")?;
        write!(
            f,
            "BASE INSS {:.2}   FGTS DO MES {:.2}   BASE IRRF {:.2}",
            self.social_security_base, self.severance_fund_contribution, self.income_tax_base
        )
    }
}
