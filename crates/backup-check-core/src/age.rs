//! Age expression parsing.
//!
//! An age expression is an integer magnitude with an optional unit letter:
//! `M` (minutes), `H` (hours), `D` (days) or `W` (weeks). Without a unit
//! the magnitude is read as hours, so `"1D"` and `"24"` are equivalent.

use crate::{Error, Result};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Unit of an age expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    Minute,
    Hour,
    Day,
    Week,
}

impl AgeUnit {
    /// Unit for a trailing letter, if it is one of the recognized ones.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(AgeUnit::Minute),
            'H' => Some(AgeUnit::Hour),
            'D' => Some(AgeUnit::Day),
            'W' => Some(AgeUnit::Week),
            _ => None,
        }
    }

    /// Number of seconds in one unit.
    pub fn seconds(self) -> u64 {
        match self {
            AgeUnit::Minute => MINUTE,
            AgeUnit::Hour => HOUR,
            AgeUnit::Day => DAY,
            AgeUnit::Week => WEEK,
        }
    }
}

/// Convert an age expression to seconds.
///
/// Fails with [`Error::Config`] when the unit letter is unknown, the
/// magnitude is not a non-negative integer, or the result overflows.
pub fn parse_age(expr: &str) -> Result<u64> {
    let expr = expr.trim();
    let last = expr
        .chars()
        .last()
        .ok_or_else(|| Error::Config("age expression is empty".to_string()))?;

    let (magnitude, unit) = if last.is_ascii_alphabetic() {
        let unit = AgeUnit::from_letter(last).ok_or_else(|| {
            Error::Config(format!("unknown unit `{}` in age expression `{}`", last, expr))
        })?;
        (&expr[..expr.len() - 1], unit)
    } else {
        (expr, AgeUnit::Hour)
    };

    let magnitude: u64 = magnitude.trim().parse().map_err(|_| {
        Error::Config(format!(
            "age expression `{}` does not start with a whole number",
            expr
        ))
    })?;

    magnitude
        .checked_mul(unit.seconds())
        .ok_or_else(|| Error::Config(format!("age expression `{}` is too large", expr)))
}
