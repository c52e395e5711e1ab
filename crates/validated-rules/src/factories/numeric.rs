//! Numeric rules: inclusive range and decimal precision/scale.

use super::{CheckValidator, RuleCheck, RuleValidatorFactory};
use crate::config::{rule_types, ValidationRuleConfig};
use crate::error::RuleConfigurationError;
use crate::input::{Literal, RuleInput};
use crate::validator::SharedRuleValidator;
use std::cmp::Ordering;

/// `Range`: value within `minValue..=maxValue`.
///
/// Bounds are parsed once, as `valueTypeHint` says, so the same rule type
/// covers integers, decimals, dates and text.
pub struct RangeFactory;

struct RangeCheck {
    min: Option<Literal>,
    max: Option<Literal>,
}

impl RangeCheck {
    fn order(value: &RuleInput<'_>, bound: &Literal) -> Result<Ordering, RuleConfigurationError> {
        value
            .compare(&bound.as_input())
            .ok_or_else(|| RuleConfigurationError::unsupported(rule_types::RANGE, value.kind()))
    }
}

impl RuleCheck for RangeCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        if let Some(min) = &self.min {
            if Self::order(&value, min)? == Ordering::Less {
                return Ok(false);
            }
        }
        if let Some(max) = &self.max {
            if Self::order(&value, max)? == Ordering::Greater {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl RuleValidatorFactory for RangeFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let parse = |raw: &Option<String>| {
            raw.as_deref()
                .map(|raw| Literal::parse(raw, config.value_type_hint))
                .transpose()
        };
        let min = parse(&config.min_value)?;
        let max = parse(&config.max_value)?;

        match (&min, &max) {
            (None, None) => {
                return Err(RuleConfigurationError::missing(
                    &config.rule_type,
                    "a minimum or maximum value",
                ))
            }
            (Some(low), Some(high))
                if low.as_input().compare(&high.as_input()) == Some(Ordering::Greater) =>
            {
                return Err(RuleConfigurationError::InvalidLiteral {
                    literal: format!(
                        "{}..{}",
                        config.min_value.as_deref().unwrap_or_default(),
                        config.max_value.as_deref().unwrap_or_default()
                    ),
                    expected: "a range with min <= max",
                })
            }
            _ => {}
        }

        Ok(CheckValidator::shared(config, RangeCheck { min, max }))
    }
}

/// Key in `additionalInfo` holding the total number of significant digits.
pub const PRECISION_KEY: &str = "Precision";

/// Key in `additionalInfo` holding the number of digits after the point.
pub const SCALE_KEY: &str = "Scale";

/// `PrecisionScale`: fits a `decimal(precision, scale)` column.
pub struct PrecisionScaleFactory;

struct PrecisionScaleCheck {
    precision: usize,
    scale: usize,
}

/// Significant digits before and after the decimal point.
fn digit_counts(text: &str) -> Option<(usize, usize)> {
    let unsigned = text.trim().trim_start_matches(['+', '-']);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !is_digits(integer) || !is_digits(fraction) {
        return None;
    }
    Some((
        integer.trim_start_matches('0').len(),
        fraction.trim_end_matches('0').len(),
    ))
}

impl RuleCheck for PrecisionScaleCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        let text = match value {
            RuleInput::Integer(n) => n.to_string(),
            RuleInput::Decimal(n) => n.to_string(),
            RuleInput::Text(text) => text.to_string(),
            other => {
                return Err(RuleConfigurationError::unsupported(
                    rule_types::PRECISION_SCALE,
                    other.kind(),
                ))
            }
        };
        Ok(digit_counts(&text).map_or(false, |(integer, fraction)| {
            fraction <= self.scale && integer <= self.precision - self.scale
        }))
    }
}

impl RuleValidatorFactory for PrecisionScaleFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let read = |key: &'static str| -> Result<usize, RuleConfigurationError> {
            let raw = config
                .additional_info
                .get(key)
                .ok_or_else(|| RuleConfigurationError::missing(&config.rule_type, key))?;
            raw.trim()
                .parse()
                .map_err(|_| RuleConfigurationError::literal(raw, "a digit count"))
        };
        let precision = read(PRECISION_KEY)?;
        let scale = read(SCALE_KEY)?;
        if precision == 0 || scale > precision {
            return Err(RuleConfigurationError::InvalidLiteral {
                literal: format!("{precision},{scale}"),
                expected: "a precision of at least 1 and a scale no larger than it",
            });
        }
        Ok(CheckValidator::shared(config, PrecisionScaleCheck { precision, scale }))
    }
}
