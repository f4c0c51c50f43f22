use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::brackets::{BracketTableError, check_structure};
use crate::models::TaxBracket;

/// Which of the two withholding tables a bracket list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxTable {
    /// INSS, evaluated as cumulative slabs.
    #[serde(rename = "inss")]
    SocialSecurity,
    /// IRRF, evaluated by single lookup with a fixed deduction.
    #[serde(rename = "irrf")]
    IncomeTax,
}

impl TaxTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SocialSecurity => "inss",
            Self::IncomeTax => "irrf",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inss" | "social_security" => Some(Self::SocialSecurity),
            "irrf" | "income_tax" => Some(Self::IncomeTax),
            _ => None,
        }
    }
}

impl fmt::Display for TaxTable {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hazard pay (insalubridade) and danger pay (periculosidade) combine
/// when an employee qualifies for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalPayPolicy {
    /// Only the larger of the two premiums is paid.
    #[default]
    MoreFavorable,
    /// Both premiums are paid in full.
    Cumulative,
}

impl AdditionalPayPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoreFavorable => "more_favorable",
            Self::Cumulative => "cumulative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "more_favorable" => Some(Self::MoreFavorable),
            "cumulative" => Some(Self::Cumulative),
            _ => None,
        }
    }
}

/// Errors reported by [`TaxTableConfig::validate`].
///
/// The calculator never returns these: a malformed table simply withholds
/// nothing. Validation exists so the caller can warn before that happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTableConfigError {
    #[error("{table} table is malformed: {source}")]
    MalformedTable {
        table: TaxTable,
        #[source]
        source: BracketTableError,
    },

    #[error("{table} bracket {index} has rate {rate} outside [0, 1]")]
    RateOutOfRange {
        table: TaxTable,
        index: usize,
        rate: Decimal,
    },

    #[error("{table} bracket {index} has a lower rate than the bracket before it")]
    DecreasingRate { table: TaxTable, index: usize },

    #[error("{table} bracket {index} has negative deduction {deduction}")]
    NegativeDeduction {
        table: TaxTable,
        index: usize,
        deduction: Decimal,
    },

    #[error("{name} must be between 0 and 1, got {rate}")]
    InvalidFlatRate { name: &'static str, rate: Decimal },

    #[error("{name} must be non-negative, got {amount}")]
    NegativeAmount { name: &'static str, amount: Decimal },
}

/// Withholding tables and statutory parameters for one pay period.
///
/// Every field has a default (2024 values), so a partial document such as a
/// TOML override file deserializes into a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxTableConfig {
    /// INSS slabs, ascending by limit.
    pub social_security_brackets: Vec<TaxBracket>,

    /// IRRF brackets, ascending by limit.
    pub income_tax_brackets: Vec<TaxBracket>,

    /// FGTS deposit rate, applied to the INSS base.
    pub severance_fund_rate: Decimal,

    /// Employer INSS share (cota patronal).
    pub employer_social_security_rate: Decimal,

    /// Work-accident insurance rate (RAT).
    pub work_accident_insurance_rate: Decimal,

    /// INSS contribution ceiling. The INSS base is capped here before the
    /// slabs are applied; `None` leaves the base uncapped.
    pub social_security_ceiling: Option<Decimal>,

    /// National minimum wage, the base for hazard pay.
    pub minimum_wage: Decimal,

    /// Highest base salary that still receives the family allowance.
    pub family_allowance_ceiling: Decimal,

    /// Family allowance (salário-família) per dependent.
    pub family_allowance_per_dependent: Decimal,

    /// IRRF base reduction per dependent.
    pub income_tax_dependent_deduction: Decimal,

    pub additional_pay_policy: AdditionalPayPolicy,
}

impl Default for TaxTableConfig {
    fn default() -> Self {
        Self {
            social_security_brackets: vec![
                TaxBracket::slab(Decimal::new(141200, 2), Decimal::new(75, 3)),
                TaxBracket::slab(Decimal::new(266668, 2), Decimal::new(9, 2)),
                TaxBracket::slab(Decimal::new(400003, 2), Decimal::new(12, 2)),
                TaxBracket::slab(Decimal::new(778602, 2), Decimal::new(14, 2)),
            ],
            income_tax_brackets: vec![
                TaxBracket::new(Some(Decimal::new(225920, 2)), Decimal::ZERO, Decimal::ZERO),
                TaxBracket::new(
                    Some(Decimal::new(282665, 2)),
                    Decimal::new(75, 3),
                    Decimal::new(16944, 2),
                ),
                TaxBracket::new(
                    Some(Decimal::new(375105, 2)),
                    Decimal::new(15, 2),
                    Decimal::new(38144, 2),
                ),
                TaxBracket::new(
                    Some(Decimal::new(466468, 2)),
                    Decimal::new(225, 3),
                    Decimal::new(66277, 2),
                ),
                TaxBracket::new(None, Decimal::new(275, 3), Decimal::new(89600, 2)),
            ],
            severance_fund_rate: Decimal::new(8, 2),
            employer_social_security_rate: Decimal::new(20, 2),
            work_accident_insurance_rate: Decimal::new(2, 2),
            social_security_ceiling: Some(Decimal::new(778602, 2)),
            minimum_wage: Decimal::new(141200, 2),
            family_allowance_ceiling: Decimal::new(181926, 2),
            family_allowance_per_dependent: Decimal::new(6215, 2),
            income_tax_dependent_deduction: Decimal::new(18959, 2),
            additional_pay_policy: AdditionalPayPolicy::MoreFavorable,
        }
    }
}

impl TaxTableConfig {
    /// The bracket list for `table`.
    pub fn brackets(
        &self,
        table: TaxTable,
    ) -> &[TaxBracket] {
        match table {
            TaxTable::SocialSecurity => &self.social_security_brackets,
            TaxTable::IncomeTax => &self.income_tax_brackets,
        }
    }

    /// Replaces the bracket list for `table`.
    pub fn set_brackets(
        &mut self,
        table: TaxTable,
        brackets: Vec<TaxBracket>,
    ) {
        match table {
            TaxTable::SocialSecurity => self.social_security_brackets = brackets,
            TaxTable::IncomeTax => self.income_tax_brackets = brackets,
        }
    }

    /// Checks the configuration for anything that would make a withholding
    /// silently degrade or produce nonsense.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxTableConfigError`] found, tables first and
    /// flat parameters after.
    pub fn validate(&self) -> Result<(), TaxTableConfigError> {
        for table in [TaxTable::SocialSecurity, TaxTable::IncomeTax] {
            validate_table(table, self.brackets(table))?;
        }

        for (name, rate) in [
            ("severance_fund_rate", self.severance_fund_rate),
            (
                "employer_social_security_rate",
                self.employer_social_security_rate,
            ),
            (
                "work_accident_insurance_rate",
                self.work_accident_insurance_rate,
            ),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(TaxTableConfigError::InvalidFlatRate { name, rate });
            }
        }

        let ceiling = self.social_security_ceiling.unwrap_or(Decimal::ZERO);
        for (name, amount) in [
            ("social_security_ceiling", ceiling),
            ("minimum_wage", self.minimum_wage),
            ("family_allowance_ceiling", self.family_allowance_ceiling),
            (
                "family_allowance_per_dependent",
                self.family_allowance_per_dependent,
            ),
            (
                "income_tax_dependent_deduction",
                self.income_tax_dependent_deduction,
            ),
        ] {
            if amount < Decimal::ZERO {
                return Err(TaxTableConfigError::NegativeAmount { name, amount });
            }
        }

        Ok(())
    }
}

fn validate_table(
    table: TaxTable,
    brackets: &[TaxBracket],
) -> Result<(), TaxTableConfigError> {
    check_structure(brackets)
        .map_err(|source| TaxTableConfigError::MalformedTable { table, source })?;

    let mut previous_rate = Decimal::ZERO;
    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(TaxTableConfigError::RateOutOfRange {
                table,
                index,
                rate: bracket.rate,
            });
        }
        if bracket.rate < previous_rate {
            return Err(TaxTableConfigError::DecreasingRate { table, index });
        }
        if bracket.deduction < Decimal::ZERO {
            return Err(TaxTableConfigError::NegativeDeduction {
                table,
                index,
                deduction: bracket.deduction,
            });
        }
        previous_rate = bracket.rate;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(TaxTableConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_tables_have_expected_shape() {
        let config = TaxTableConfig::default();

        assert_eq!(config.social_security_brackets.len(), 4);
        assert_eq!(config.income_tax_brackets.len(), 5);
        assert_eq!(config.social_security_brackets[0].limit, Some(dec!(1412.00)));
        assert_eq!(config.income_tax_brackets[4].limit, None);
        assert_eq!(config.income_tax_brackets[4].deduction, dec!(896.00));
    }

    #[test]
    fn validate_rejects_empty_table() {
        let mut config = TaxTableConfig::default();
        config.income_tax_brackets.clear();

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::MalformedTable {
                table: TaxTable::IncomeTax,
                source: BracketTableError::Empty,
            })
        );
    }

    #[test]
    fn validate_rejects_unsorted_limits() {
        let mut config = TaxTableConfig::default();
        config.social_security_brackets.swap(0, 1);

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::MalformedTable {
                table: TaxTable::SocialSecurity,
                source: BracketTableError::Unsorted { index: 1 },
            })
        );
    }

    #[test]
    fn validate_rejects_decreasing_rate() {
        let mut config = TaxTableConfig::default();
        config.social_security_brackets[2].rate = dec!(0.05);

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::DecreasingRate {
                table: TaxTable::SocialSecurity,
                index: 2,
            })
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut config = TaxTableConfig::default();
        config.income_tax_brackets[4].rate = dec!(27.5);

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::RateOutOfRange {
                table: TaxTable::IncomeTax,
                index: 4,
                rate: dec!(27.5),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_deduction() {
        let mut config = TaxTableConfig::default();
        config.income_tax_brackets[1].deduction = dec!(-1);

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::NegativeDeduction {
                table: TaxTable::IncomeTax,
                index: 1,
                deduction: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_flat_rate_out_of_range() {
        let mut config = TaxTableConfig::default();
        config.severance_fund_rate = dec!(8);

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::InvalidFlatRate {
                name: "severance_fund_rate",
                rate: dec!(8),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_minimum_wage() {
        let mut config = TaxTableConfig::default();
        config.minimum_wage = dec!(-1412);

        assert_eq!(
            config.validate(),
            Err(TaxTableConfigError::NegativeAmount {
                name: "minimum_wage",
                amount: dec!(-1412),
            })
        );
    }

    #[test]
    fn set_brackets_replaces_only_named_table() {
        let mut config = TaxTableConfig::default();
        let replacement = vec![TaxBracket::new(None, dec!(0.11), dec!(0))];

        config.set_brackets(TaxTable::SocialSecurity, replacement.clone());

        assert_eq!(config.brackets(TaxTable::SocialSecurity), replacement.as_slice());
        assert_eq!(
            config.income_tax_brackets,
            TaxTableConfig::default().income_tax_brackets
        );
    }

    #[test]
    fn tax_table_parse_accepts_both_spellings() {
        assert_eq!(TaxTable::parse("INSS"), Some(TaxTable::SocialSecurity));
        assert_eq!(TaxTable::parse("income_tax"), Some(TaxTable::IncomeTax));
        assert_eq!(TaxTable::parse("iss"), None);
    }
}
