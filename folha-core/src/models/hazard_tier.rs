use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unhealthy-conditions premium grade (insalubridade).
///
/// The premium is a fraction of the minimum wage, not of the employee's
/// own salary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardTier {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl HazardTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Accepts the wire names case-insensitively, plus the Portuguese grade
    /// names used on paper forms (`minimo`, `medio`, `maximo`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" | "NENHUM" => Some(Self::None),
            "LOW" | "MINIMO" => Some(Self::Low),
            "MEDIUM" | "MEDIO" => Some(Self::Medium),
            "HIGH" | "MAXIMO" => Some(Self::High),
            _ => None,
        }
    }

    /// Share of the minimum wage paid for this grade.
    pub fn rate(&self) -> Decimal {
        match self {
            Self::None => Decimal::ZERO,
            Self::Low => Decimal::new(10, 2),
            Self::Medium => Decimal::new(20, 2),
            Self::High => Decimal::new(40, 2),
        }
    }
}
