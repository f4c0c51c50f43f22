//! Progressive bracket evaluation.
//!
//! Brazilian payroll withholds against two kinds of progressive table:
//!
//! | Mode | Used for | Rule |
//! |------|----------|------|
//! | [`BracketMode::CumulativeSlabs`] | INSS | each slice of the base is taxed at its own bracket's rate, slices summed |
//! | [`BracketMode::SingleLookup`] | IRRF | the whole base is taxed at one bracket's rate, minus that bracket's fixed deduction |
//!
//! Both evaluators are total: a negative base is treated as zero, and a
//! table that is empty or structurally broken withholds nothing. Use
//! [`check_structure`] (or
//! [`TaxTableConfig::validate`](crate::models::TaxTableConfig::validate)) to
//! find out why a table is being ignored.
//!
//! Results are unrounded.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use folha_core::calculations::brackets::{cumulative_slabs, single_lookup};
//! use folha_core::TaxTableConfig;
//!
//! let config = TaxTableConfig::default();
//!
//! // 1412.00 at 7.5% plus 588.00 at 9%
//! assert_eq!(
//!     cumulative_slabs(dec!(2000), &config.social_security_brackets),
//!     dec!(158.82)
//! );
//!
//! // 3000.00 falls in the 15% bracket, deduction 381.44
//! assert_eq!(
//!     single_lookup(dec!(3000), &config.income_tax_brackets),
//!     dec!(68.56)
//! );
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::non_negative;
use crate::models::{TaxBracket, TaxTable};

/// Structural problems that make a bracket table unusable.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("table has no brackets")]
    Empty,

    #[error("bracket {index} does not have a higher limit than the bracket before it")]
    Unsorted { index: usize },

    #[error("bracket {index} has no limit but is not the last bracket")]
    MissingLimit { index: usize },
}

/// Checks that `brackets` can be evaluated.
///
/// Every bracket except the last needs a limit, and those limits must be
/// strictly ascending. The last bracket's limit is never looked at.
pub fn check_structure(brackets: &[TaxBracket]) -> Result<(), BracketTableError> {
    let Some((_, bounded)) = brackets.split_last() else {
        return Err(BracketTableError::Empty);
    };

    let mut previous: Option<Decimal> = None;
    for (index, bracket) in bounded.iter().enumerate() {
        let Some(limit) = bracket.limit else {
            return Err(BracketTableError::MissingLimit { index });
        };
        if previous.is_some_and(|p| limit <= p) {
            return Err(BracketTableError::Unsorted { index });
        }
        previous = Some(limit);
    }

    Ok(())
}

/// How a bracket table turns a base into a withheld amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketMode {
    CumulativeSlabs,
    SingleLookup,
}

impl BracketMode {
    /// The statutory mode for each table.
    pub fn for_table(table: TaxTable) -> Self {
        match table {
            TaxTable::SocialSecurity => Self::CumulativeSlabs,
            TaxTable::IncomeTax => Self::SingleLookup,
        }
    }

    pub fn withheld(
        self,
        base: Decimal,
        brackets: &[TaxBracket],
    ) -> Decimal {
        match self {
            Self::CumulativeSlabs => cumulative_slabs(base, brackets),
            Self::SingleLookup => single_lookup(base, brackets),
        }
    }
}

/// Sums `slice * rate` over consecutive slices of `base`.
///
/// The slice for a bracket is the part of the base between the previous
/// limit and this one. The last bracket takes whatever remains.
pub fn cumulative_slabs(
    base: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if check_structure(brackets).is_err() {
        return Decimal::ZERO;
    }

    let last = brackets.len() - 1;
    let mut remaining = non_negative(base);
    let mut previous_limit = Decimal::ZERO;
    let mut withheld = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let slice = match bracket.limit {
            Some(limit) if index < last => {
                let width = non_negative(limit - previous_limit);
                previous_limit = limit;
                remaining.min(width)
            }
            _ => remaining,
        };

        withheld += slice * bracket.rate;
        remaining -= slice;
    }

    withheld
}

/// Applies the first bracket whose limit covers `base`.
///
/// Returns `base * rate - deduction`, floored at zero.
pub fn single_lookup(
    base: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if check_structure(brackets).is_err() {
        return Decimal::ZERO;
    }

    let base = non_negative(base);
    let last = brackets.len() - 1;
    let bracket = brackets
        .iter()
        .enumerate()
        .find(|(index, b)| *index == last || b.limit.is_some_and(|limit| limit >= base))
        .map(|(_, b)| b);

    match bracket {
        Some(b) => non_negative(base * b.rate - b.deduction),
        None => Decimal::ZERO,
    }
}
