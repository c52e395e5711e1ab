//! Type-erased values handed to configured rules.
//!
//! Rules are loaded at runtime and cannot be generic over the member type, so
//! every member is viewed through [`RuleInput`] before a rule sees it.

use crate::config::{TargetType, ValueTypeHint};
use crate::error::RuleConfigurationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// Borrowed view of a value as a configured rule sees it.
#[derive(Clone, Copy)]
pub enum RuleInput<'a> {
    Text(&'a str),
    Integer(i128),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// A collection, seen through its length.
    Collection(usize),
    /// An entity exposing members by name, for member comparisons.
    Record(&'a dyn RuleRecord),
    Absent,
}

impl<'a> RuleInput<'a> {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleInput::Text(_) => "text",
            RuleInput::Integer(_) => "integer",
            RuleInput::Decimal(_) => "decimal",
            RuleInput::Boolean(_) => "boolean",
            RuleInput::Date(_) => "date",
            RuleInput::DateTime(_) => "date-time",
            RuleInput::Collection(_) => "collection",
            RuleInput::Record(_) => "record",
            RuleInput::Absent => "absent",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RuleInput::Absent)
    }

    /// Order two inputs of compatible kinds.
    ///
    /// Integers and decimals compare numerically, dates compare with
    /// date-times at midnight, collections compare by length. Anything else
    /// is incomparable.
    pub fn compare(&self, other: &RuleInput<'_>) -> Option<Ordering> {
        use RuleInput::*;

        match (*self, *other) {
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(&b)),
            (Integer(a), Decimal(b)) => (a as f64).partial_cmp(&b),
            (Decimal(a), Integer(b)) => a.partial_cmp(&(b as f64)),
            (Decimal(a), Decimal(b)) => a.partial_cmp(&b),
            (Boolean(a), Boolean(b)) => Some(a.cmp(&b)),
            (Date(a), Date(b)) => Some(a.cmp(&b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(&b)),
            (Date(a), DateTime(b)) => a.and_hms_opt(0, 0, 0).map(|a| a.cmp(&b)),
            (DateTime(a), Date(b)) => b.and_hms_opt(0, 0, 0).map(|b| a.cmp(&b)),
            (Collection(a), Collection(b)) => Some(a.cmp(&b)),
            (Collection(a), Integer(b)) => Some((a as i128).cmp(&b)),
            _ => None,
        }
    }
}

impl fmt::Debug for RuleInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleInput::Record(_) => f.write_str("Record(..)"),
            RuleInput::Absent => f.write_str("Absent"),
            other => write!(f, "{}({})", other.kind(), other),
        }
    }
}

impl fmt::Display for RuleInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleInput::Text(value) => f.write_str(value),
            RuleInput::Integer(value) => write!(f, "{value}"),
            RuleInput::Decimal(value) => write!(f, "{value}"),
            RuleInput::Boolean(value) => write!(f, "{value}"),
            RuleInput::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            RuleInput::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S")),
            RuleInput::Collection(len) => write!(f, "{len}"),
            RuleInput::Record(_) | RuleInput::Absent => Ok(()),
        }
    }
}

/// An entity whose members can be read by name.
///
/// Implemented by entities that take part in `MemberComparison` rules.
///
/// ```rust
/// use validated_rules::{RuleInput, RuleRecord, RuleValue};
///
/// struct Booking {
///     start: i64,
///     end: i64,
/// }
///
/// impl RuleRecord for Booking {
///     fn member(&self, name: &str) -> Option<RuleInput<'_>> {
///         match name {
///             "start" => Some(self.start.rule_input()),
///             "end" => Some(self.end.rule_input()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait RuleRecord: Sync {
    fn member(&self, name: &str) -> Option<RuleInput<'_>>;
}

/// A member type that configured rules can inspect.
pub trait RuleValue: Sync {
    /// Which rules apply: item rules, or collection rules for sequences.
    const TARGET: TargetType = TargetType::Item;

    fn rule_input(&self) -> RuleInput<'_>;
}

impl RuleValue for str {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Text(self)
    }
}

impl RuleValue for String {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Text(self)
    }
}

impl RuleValue for bool {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Boolean(*self)
    }
}

macro_rules! integer_rule_value {
    ($($ty:ty),*) => {
        $(
            impl RuleValue for $ty {
                fn rule_input(&self) -> RuleInput<'_> {
                    RuleInput::Integer(i128::from(*self))
                }
            }
        )*
    };
}

integer_rule_value!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl RuleValue for usize {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Integer(*self as i128)
    }
}

impl RuleValue for isize {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Integer(*self as i128)
    }
}

impl RuleValue for f32 {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Decimal(f64::from(*self))
    }
}

impl RuleValue for f64 {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Decimal(*self)
    }
}

impl RuleValue for NaiveDate {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Date(*self)
    }
}

impl RuleValue for NaiveDateTime {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::DateTime(*self)
    }
}

impl RuleValue for DateTime<Utc> {
    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::DateTime(self.naive_utc())
    }
}

impl<T: RuleValue> RuleValue for Option<T> {
    const TARGET: TargetType = T::TARGET;

    fn rule_input(&self) -> RuleInput<'_> {
        match self {
            Some(value) => value.rule_input(),
            None => RuleInput::Absent,
        }
    }
}

impl<T: Sync> RuleValue for [T] {
    const TARGET: TargetType = TargetType::Collection;

    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Collection(self.len())
    }
}

impl<T: Sync> RuleValue for Vec<T> {
    const TARGET: TargetType = TargetType::Collection;

    fn rule_input(&self) -> RuleInput<'_> {
        RuleInput::Collection(self.len())
    }
}

/// Owned value parsed from a rule's string payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Integer(i128),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

impl Literal {
    /// Parse `raw` as the hinted type. `Unspecified` tries integer, decimal,
    /// date, date-time and boolean in that order and falls back to text.
    pub fn parse(raw: &str, hint: ValueTypeHint) -> Result<Self, RuleConfigurationError> {
        let trimmed = raw.trim();
        match hint {
            ValueTypeHint::Text => Ok(Literal::Text(raw.to_string())),
            ValueTypeHint::Integer => trimmed
                .parse()
                .map(Literal::Integer)
                .map_err(|_| RuleConfigurationError::literal(raw, "an integer")),
            ValueTypeHint::Decimal => parse_decimal(trimmed)
                .map(Literal::Decimal)
                .ok_or_else(|| RuleConfigurationError::literal(raw, "a decimal")),
            ValueTypeHint::Boolean => trimmed
                .parse()
                .map(Literal::Boolean)
                .map_err(|_| RuleConfigurationError::literal(raw, "a boolean")),
            ValueTypeHint::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(Literal::Date)
                .map_err(|_| RuleConfigurationError::literal(raw, "a date")),
            ValueTypeHint::DateTime => parse_date_time(trimmed)
                .map(Literal::DateTime)
                .ok_or_else(|| RuleConfigurationError::literal(raw, "a date-time")),
            ValueTypeHint::Unspecified => Ok(Self::infer(raw)),
        }
    }

    fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse() {
            return Literal::Integer(value);
        }
        if let Some(value) = parse_decimal(trimmed) {
            return Literal::Decimal(value);
        }
        if let Ok(value) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Literal::Date(value);
        }
        if let Some(value) = parse_date_time(trimmed) {
            return Literal::DateTime(value);
        }
        if let Ok(value) = trimmed.parse() {
            return Literal::Boolean(value);
        }
        Literal::Text(raw.to_string())
    }

    /// Parse `raw` into the same kind as `like`, for literals whose type is
    /// only known once a value arrives.
    pub fn parse_like(raw: &str, like: &RuleInput<'_>) -> Result<Self, RuleConfigurationError> {
        match like {
            RuleInput::Text(_) => Ok(Literal::Text(raw.to_string())),
            RuleInput::Integer(_) | RuleInput::Collection(_) => {
                Self::parse(raw, ValueTypeHint::Integer)
                    .or_else(|_| Self::parse(raw, ValueTypeHint::Decimal))
            }
            RuleInput::Decimal(_) => Self::parse(raw, ValueTypeHint::Decimal),
            RuleInput::Boolean(_) => Self::parse(raw, ValueTypeHint::Boolean),
            RuleInput::Date(_) => Self::parse(raw, ValueTypeHint::Date)
                .or_else(|_| Self::parse(raw, ValueTypeHint::DateTime)),
            RuleInput::DateTime(_) => Self::parse(raw, ValueTypeHint::DateTime)
                .or_else(|_| Self::parse(raw, ValueTypeHint::Date)),
            RuleInput::Record(_) | RuleInput::Absent => {
                Err(RuleConfigurationError::literal(raw, "a comparable value"))
            }
        }
    }

    pub fn as_input(&self) -> RuleInput<'_> {
        match self {
            Literal::Text(value) => RuleInput::Text(value),
            Literal::Integer(value) => RuleInput::Integer(*value),
            Literal::Decimal(value) => RuleInput::Decimal(*value),
            Literal::Boolean(value) => RuleInput::Boolean(*value),
            Literal::Date(value) => RuleInput::Date(*value),
            Literal::DateTime(value) => RuleInput::DateTime(*value),
        }
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
