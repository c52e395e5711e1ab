//! Comparison rules: against a fixed value and between two members.

use super::{CheckValidator, RuleCheck, RuleValidatorFactory};
use crate::config::{rule_types, CompareType, ValidationRuleConfig, ValueTypeHint};
use crate::error::RuleConfigurationError;
use crate::input::{Literal, RuleInput};
use crate::validator::SharedRuleValidator;

fn compare_type(config: &ValidationRuleConfig) -> Result<CompareType, RuleConfigurationError> {
    config
        .compare_type
        .ok_or_else(|| RuleConfigurationError::missing(&config.rule_type, "a compare type"))
}

fn relate(
    rule_type: &str,
    compare_type: CompareType,
    left: &RuleInput<'_>,
    right: &RuleInput<'_>,
) -> Result<bool, RuleConfigurationError> {
    left.compare(right)
        .map(|ordering| compare_type.holds(ordering))
        .ok_or_else(|| RuleConfigurationError::unsupported(rule_type, left.kind()))
}

/// Where the right-hand operand of a `CompareToValue` rule comes from.
enum Operand {
    /// Parsed at creation from a hinted `compareValue`.
    Parsed(Literal),
    /// Unhinted `compareValue`, parsed to match each value.
    Raw(String),
    /// No `compareValue`: the caller's comparison value.
    Supplied,
}

/// `CompareToValue`: relate the value to `compareValue`, or to the
/// comparison value passed alongside it when none is configured.
pub struct CompareToValueFactory;

struct CompareToValueCheck {
    compare_type: CompareType,
    operand: Operand,
}

impl RuleCheck for CompareToValueCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        let rule_type = rule_types::COMPARE_TO_VALUE;
        match &self.operand {
            Operand::Parsed(literal) => {
                relate(rule_type, self.compare_type, &value, &literal.as_input())
            }
            Operand::Raw(raw) => {
                let literal = Literal::parse_like(raw, &value)?;
                relate(rule_type, self.compare_type, &value, &literal.as_input())
            }
            Operand::Supplied => match compare_to {
                Some(other) if !other.is_absent() => {
                    relate(rule_type, self.compare_type, &value, &other)
                }
                _ => Err(RuleConfigurationError::missing(rule_type, "a value to compare to")),
            },
        }
    }
}

impl RuleValidatorFactory for CompareToValueFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let compare_type = compare_type(config)?;
        let operand = match (&config.compare_value, config.value_type_hint) {
            (None, _) => Operand::Supplied,
            (Some(raw), ValueTypeHint::Unspecified) => Operand::Raw(raw.clone()),
            (Some(raw), hint) => Operand::Parsed(Literal::parse(raw, hint)?),
        };
        Ok(CheckValidator::shared(
            config,
            CompareToValueCheck {
                compare_type,
                operand,
            },
        ))
    }
}

/// `MemberComparison`: relate `propertyName` to `comparePropertyName` on
/// the same entity.
///
/// The validated value must be a [`Record`](RuleInput::Record). When either
/// member is absent the rule passes.
pub struct MemberComparisonFactory;

struct MemberComparisonCheck {
    property_name: String,
    compare_property_name: String,
    compare_type: CompareType,
}

impl RuleCheck for MemberComparisonCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        let rule_type = rule_types::MEMBER_COMPARISON;
        let RuleInput::Record(record) = value else {
            return Err(RuleConfigurationError::unsupported(rule_type, value.kind()));
        };
        let read = |name: &str| {
            record
                .member(name)
                .ok_or_else(|| RuleConfigurationError::UnknownMember(name.to_string()))
        };
        let left = read(&self.property_name)?;
        let right = read(&self.compare_property_name)?;
        if left.is_absent() || right.is_absent() {
            return Ok(true);
        }
        relate(rule_type, self.compare_type, &left, &right)
    }
}

impl RuleValidatorFactory for MemberComparisonFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let compare_type = compare_type(config)?;
        let compare_property_name = config
            .compare_property_name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                RuleConfigurationError::missing(&config.rule_type, "a compare property name")
            })?;
        Ok(CheckValidator::shared(
            config,
            MemberComparisonCheck {
                property_name: config.property_name.clone(),
                compare_property_name,
                compare_type,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;
    use crate::input::{RuleRecord, RuleValue};
    use chrono::NaiveDate;
    use validated_core::Cause;

    #[tokio::test]
    async fn hinted_compare_value() {
        let rule = ValidationRuleConfig::new("Person", "age", rule_types::COMPARE_TO_VALUE, "{DisplayName} must be at least {CompareToValue}")
            .with_display_name("Age")
            .with_value_type(ValueTypeHint::Integer)
            .with_compare_value("18", CompareType::GreaterThanOrEqual);

        assert!(run(&CompareToValueFactory, &rule, RuleInput::Integer(18), None).await.unwrap().is_empty());
        let failures = run(&CompareToValueFactory, &rule, RuleInput::Integer(17), None).await.unwrap();
        assert_eq!(failures[0].failure_message, "Age must be at least 18");
    }

    #[tokio::test]
    async fn unhinted_compare_value_follows_the_input() {
        let rule = ValidationRuleConfig::new("Account", "status", rule_types::COMPARE_TO_VALUE, "closed")
            .with_compare_value("closed", CompareType::NotEqual);
        assert!(run(&CompareToValueFactory, &rule, RuleInput::Text("open"), None).await.unwrap().is_empty());
        assert_eq!(run(&CompareToValueFactory, &rule, RuleInput::Text("closed"), None).await.unwrap().len(), 1);

        let day = ValidationRuleConfig::new("Booking", "day", rule_types::COMPARE_TO_VALUE, "too early")
            .with_compare_value("2024-01-01", CompareType::GreaterThan);
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(run(&CompareToValueFactory, &day, RuleInput::Date(date), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn supplied_compare_value() {
        let rule = ValidationRuleConfig::new("Range", "upper", rule_types::COMPARE_TO_VALUE, "{ValidatedValue} must exceed {CompareToValue}")
            .with_compare_type(CompareType::GreaterThan);

        let failures = run(&CompareToValueFactory, &rule, RuleInput::Integer(3), Some(RuleInput::Integer(5)))
            .await
            .unwrap();
        assert_eq!(failures[0].failure_message, "3 must exceed 5");

        let failures = run(&CompareToValueFactory, &rule, RuleInput::Integer(3), None).await.unwrap();
        assert_eq!(failures[0].cause, Cause::RuleConfigError);
    }

    #[test]
    fn compare_type_is_required() {
        let rule = ValidationRuleConfig::new("Person", "age", rule_types::COMPARE_TO_VALUE, "m");
        assert!(matches!(
            CompareToValueFactory.create_from_configuration(&rule).err(),
            Some(RuleConfigurationError::MissingPayload { .. })
        ));
    }

    struct Booking {
        start: NaiveDate,
        end: Option<NaiveDate>,
    }

    impl RuleRecord for Booking {
        fn member(&self, name: &str) -> Option<RuleInput<'_>> {
            match name {
                "start" => Some(self.start.rule_input()),
                "end" => Some(self.end.rule_input()),
                _ => None,
            }
        }
    }

    fn end_after_start() -> ValidationRuleConfig {
        ValidationRuleConfig::new("Booking", "end", rule_types::MEMBER_COMPARISON, "{DisplayName} must be after {ComparePropertyName}")
            .with_display_name("End")
            .with_compare_property("start", CompareType::GreaterThan)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn member_comparison_reads_both_members() {
        let rule = end_after_start();
        let ok = Booking { start: day(1), end: Some(day(3)) };
        let bad = Booking { start: day(3), end: Some(day(1)) };
        let open = Booking { start: day(3), end: None };

        assert!(run(&MemberComparisonFactory, &rule, RuleInput::Record(&ok), None).await.unwrap().is_empty());
        let failures = run(&MemberComparisonFactory, &rule, RuleInput::Record(&bad), None).await.unwrap();
        assert_eq!(failures[0].failure_message, "End must be after start");
        assert!(run(&MemberComparisonFactory, &rule, RuleInput::Record(&open), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_member_is_a_config_error() {
        let rule = end_after_start().with_compare_property("begin", CompareType::GreaterThan);
        let booking = Booking { start: day(1), end: Some(day(3)) };
        let failures = run(&MemberComparisonFactory, &rule, RuleInput::Record(&booking), None)
            .await
            .unwrap();
        assert_eq!(failures[0].cause, Cause::RuleConfigError);
    }
}
