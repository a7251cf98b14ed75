//! Parsing and classifying monetary amounts.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::Error;

/// Whether a transaction is a deposit ("in") or a withdrawal ("out").
///
/// The direction of a stored transaction is never stored, it is derived from
/// the sign of its amount with [Direction::of].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    #[default]
    Out,
}

impl Direction {
    /// Positive amounts are deposits, everything else is a withdrawal.
    pub fn of(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Direction::In
        } else {
            Direction::Out
        }
    }

    /// Parse "in" or "out", ignoring case and surrounding whitespace.
    /// Anything else, including an empty string, gives [Direction::Out].
    pub fn parse_or_default(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "in" => Direction::In,
            _ => Direction::Out,
        }
    }

    /// Force the sign of `amount` to match this direction.
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            Direction::In => amount.abs(),
            Direction::Out => -amount.abs(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse user input such as "150,00", "1 234,50" or "1,234.50" as a decimal.
///
/// Whitespace is ignored. A lone comma is treated as the decimal separator,
/// while a comma together with a dot is treated as a thousands separator.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let normalized = if compact.contains('.') {
        compact.replace(',', "")
    } else {
        compact.replace(',', ".")
    };

    Decimal::from_str(&normalized).ok()
}

/// Parse the amount of a transaction and force its sign to match `direction`.
///
/// The result is rounded to two decimals.
///
/// # Errors
/// Returns [Error::MissingAmount] if `text` is blank and
/// [Error::InvalidAmount] if it is not a number.
pub fn parse_amount(text: &str, direction: Direction) -> Result<Decimal, Error> {
    if text.trim().is_empty() {
        return Err(Error::MissingAmount);
    }

    let amount = parse_decimal(text).ok_or_else(|| Error::InvalidAmount(text.to_owned()))?;

    Ok(direction.apply(amount.round_dp(2)))
}

/// Parse an optional opening or closing balance, where blank means no balance.
///
/// # Errors
/// Returns [Error::InvalidBalance] if `text` is not blank and not a number.
pub fn parse_balance(text: &str) -> Result<Option<Decimal>, Error> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    parse_decimal(text)
        .map(|balance| Some(balance.round_dp(2)))
        .ok_or_else(|| Error::InvalidBalance(text.to_owned()))
}

/// Read a decimal stored as TEXT from column `index`.
pub fn decimal_from_row(row: &rusqlite::Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(error))
    })
}

/// Read an optional decimal stored as TEXT from column `index`.
pub fn optional_decimal_from_row(
    row: &rusqlite::Row,
    index: usize,
) -> Result<Option<Decimal>, rusqlite::Error> {
    let text: Option<String> = row.get(index)?;

    text.map(|text| {
        Decimal::from_str(&text).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::Error;

    use super::{Direction, parse_amount, parse_balance};

    #[test]
    fn decimal_comma_deposit_is_positive() {
        let amount = parse_amount("150,00", Direction::In).unwrap();

        assert_eq!(amount, Decimal::new(15000, 2));
        assert_eq!(Direction::of(amount), Direction::In);
    }

    #[test]
    fn withdrawal_is_negative() {
        let amount = parse_amount("75", Direction::Out).unwrap();

        assert_eq!(amount, Decimal::new(-7500, 2));
        assert_eq!(Direction::of(amount), Direction::Out);
    }

    #[test]
    fn direction_overrides_typed_sign() {
        assert_eq!(
            parse_amount("-20", Direction::In).unwrap(),
            Decimal::new(20, 0)
        );
        assert_eq!(
            parse_amount("-20", Direction::Out).unwrap(),
            Decimal::new(-20, 0)
        );
    }

    #[test]
    fn accepts_thousands_separators() {
        assert_eq!(
            parse_amount("1 234,50", Direction::In).unwrap(),
            Decimal::new(123450, 2)
        );
        assert_eq!(
            parse_amount("1,234.50", Direction::In).unwrap(),
            Decimal::new(123450, 2)
        );
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(
            parse_amount("10,005", Direction::In).unwrap().scale(),
            2
        );
    }

    #[test]
    fn blank_amount_is_missing() {
        assert_eq!(parse_amount("  ", Direction::In), Err(Error::MissingAmount));
    }

    #[test]
    fn text_amount_is_invalid() {
        assert_eq!(
            parse_amount("tusen", Direction::Out),
            Err(Error::InvalidAmount("tusen".to_owned()))
        );
    }

    #[test]
    fn zero_is_classified_as_out() {
        assert_eq!(Direction::of(Decimal::ZERO), Direction::Out);
    }

    #[test]
    fn unknown_direction_defaults_to_out() {
        assert_eq!(Direction::parse_or_default("IN"), Direction::In);
        assert_eq!(Direction::parse_or_default(""), Direction::Out);
        assert_eq!(Direction::parse_or_default("sideways"), Direction::Out);
    }

    #[test]
    fn blank_balance_is_none() {
        assert_eq!(parse_balance(""), Ok(None));
        assert_eq!(parse_balance("99,5"), Ok(Some(Decimal::new(995, 1))));
        assert_eq!(
            parse_balance("x"),
            Err(Error::InvalidBalance("x".to_owned()))
        );
    }
}
