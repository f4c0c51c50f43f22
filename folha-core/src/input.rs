//! Lenient parsing for values typed into payroll forms.
//!
//! Form fields arrive as free text or loosely typed JSON. Anything that
//! cannot be read as a number becomes "absent" here, and absent values
//! become zero when the form is normalized into an
//! [`EmployeeVariableEntry`](crate::models::EmployeeVariableEntry).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserializer;
use serde::de::{self, Visitor};

/// Parses a currency amount written either way round.
///
/// Both `1,234.56` and the Brazilian `1.234,56` are accepted. When only a
/// comma is present it is taken as the decimal separator (`150,5`). An
/// optional `R$` prefix and surrounding whitespace are ignored.
///
/// Returns `None` for empty input or anything that does not parse.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use folha_core::input::parse_amount;
///
/// assert_eq!(parse_amount("1.234,56"), Some(dec!(1234.56)));
/// assert_eq!(parse_amount("1,234.56"), Some(dec!(1234.56)));
/// assert_eq!(parse_amount("R$ 62,15"), Some(dec!(62.15)));
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim().trim_start_matches("R$").trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => trimmed.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => trimmed.replace(',', ""),
        (Some(_), None) => trimmed.replace(',', "."),
        _ => trimmed.to_string(),
    };

    Decimal::from_str(&normalized).ok()
}

/// Parses a yes/no form value.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "sim" | "s" | "x" => Some(true),
        "false" | "0" | "no" | "n" | "nao" | "não" | "" => Some(false),
        _ => None,
    }
}

struct LenientDecimal;

impl<'de> Visitor<'de> for LenientDecimal {
    type Value = Option<Decimal>;

    fn expecting(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("a number or numeric text")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(
        self,
        _v: bool,
    ) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E: de::Error>(
        self,
        v: i64,
    ) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(
        self,
        v: u64,
    ) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    // Shortest round-trip text keeps 1819.26 as 1819.26; NaN and infinities
    // do not parse and fall out as None.
    fn visit_f64<E: de::Error>(
        self,
        v: f64,
    ) -> Result<Self::Value, E> {
        Ok(Decimal::from_str(&v.to_string()).ok())
    }

    fn visit_str<E: de::Error>(
        self,
        v: &str,
    ) -> Result<Self::Value, E> {
        Ok(parse_amount(v))
    }
}

/// `deserialize_with` helper: any number, numeric string, or nothing.
///
/// Unparseable values deserialize to `None` instead of failing the record.
pub fn deserialize_lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(LenientDecimal)
}

struct LenientFlag;

impl<'de> Visitor<'de> for LenientFlag {
    type Value = Option<bool>;

    fn expecting(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("a boolean or yes/no text")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(
        self,
        v: bool,
    ) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(
        self,
        v: i64,
    ) -> Result<Self::Value, E> {
        Ok(Some(v != 0))
    }

    fn visit_u64<E: de::Error>(
        self,
        v: u64,
    ) -> Result<Self::Value, E> {
        Ok(Some(v != 0))
    }

    fn visit_f64<E: de::Error>(
        self,
        v: f64,
    ) -> Result<Self::Value, E> {
        Ok(Some(v != 0.0 && !v.is_nan()))
    }

    fn visit_str<E: de::Error>(
        self,
        v: &str,
    ) -> Result<Self::Value, E> {
        Ok(parse_flag(v))
    }
}

/// `deserialize_with` helper for checkbox-style fields.
pub fn deserialize_lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(LenientFlag)
}
