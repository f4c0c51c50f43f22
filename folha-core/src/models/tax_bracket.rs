use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a progressive withholding table.
///
/// `limit` is the upper income boundary of the bracket. The evaluator treats
/// the last bracket of a table as unbounded whatever its `limit` says, so the
/// top bracket is usually written with `limit: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    #[serde(default)]
    pub limit: Option<Decimal>,
    pub rate: Decimal,
    /// Fixed amount subtracted after applying `rate` (income tax only).
    #[serde(default)]
    pub deduction: Decimal,
}

impl TaxBracket {
    pub fn new(
        limit: Option<Decimal>,
        rate: Decimal,
        deduction: Decimal,
    ) -> Self {
        Self {
            limit,
            rate,
            deduction,
        }
    }

    /// A bounded bracket with no fixed deduction, as used by INSS slabs.
    pub fn slab(
        limit: Decimal,
        rate: Decimal,
    ) -> Self {
        Self::new(Some(limit), rate, Decimal::ZERO)
    }
}
