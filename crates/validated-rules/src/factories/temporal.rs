//! Dates relative to today.

use super::{CheckValidator, RuleCheck, RuleValidatorFactory};
use crate::config::{rule_types, ValidationRuleConfig};
use crate::error::RuleConfigurationError;
use crate::input::RuleInput;
use crate::validator::SharedRuleValidator;
use chrono::{Days, Months, NaiveDate, Utc};
use std::str::FromStr;

/// Key in `additionalInfo` naming the unit of the offsets.
pub const ROLLING_UNIT_KEY: &str = "RollingUnit";

/// Unit of a rolling-date offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RollingUnit {
    #[default]
    Days,
    Months,
    Years,
}

impl FromStr for RollingUnit {
    type Err = RuleConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(RollingUnit::Days),
            "month" | "months" => Ok(RollingUnit::Months),
            "year" | "years" => Ok(RollingUnit::Years),
            _ => Err(RuleConfigurationError::literal(s, "Days, Months or Years")),
        }
    }
}

impl RollingUnit {
    /// `date` moved by `offset` units, `None` when out of range.
    pub fn shift(self, date: NaiveDate, offset: i64) -> Option<NaiveDate> {
        let magnitude = offset.unsigned_abs();
        match self {
            RollingUnit::Days => {
                let days = Days::new(magnitude);
                if offset < 0 {
                    date.checked_sub_days(days)
                } else {
                    date.checked_add_days(days)
                }
            }
            RollingUnit::Months | RollingUnit::Years => {
                let factor = if self == RollingUnit::Years { 12 } else { 1 };
                let months = magnitude
                    .checked_mul(factor)
                    .and_then(|m| u32::try_from(m).ok())
                    .map(Months::new)?;
                if offset < 0 {
                    date.checked_sub_months(months)
                } else {
                    date.checked_add_months(months)
                }
            }
        }
    }
}

/// `RollingDate`: a date within `today + minValue ..= today + maxValue`,
/// offsets counted in `RollingUnit` (days by default).
///
/// "Date of birth at least 18 years ago" is `maxValue = -18` with
/// `RollingUnit = Years`.
pub struct RollingDateFactory;

struct RollingDateCheck {
    min: Option<i64>,
    max: Option<i64>,
    unit: RollingUnit,
}

impl RollingDateCheck {
    fn bound(&self, today: NaiveDate, offset: i64) -> Result<NaiveDate, RuleConfigurationError> {
        self.unit
            .shift(today, offset)
            .ok_or_else(|| RuleConfigurationError::literal(&offset.to_string(), "an offset within the calendar"))
    }
}

impl RuleCheck for RollingDateCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        let date = match value {
            RuleInput::Date(date) => date,
            RuleInput::DateTime(date_time) => date_time.date(),
            other => {
                return Err(RuleConfigurationError::unsupported(
                    rule_types::ROLLING_DATE,
                    other.kind(),
                ))
            }
        };
        let today = Utc::now().date_naive();
        if let Some(min) = self.min {
            if date < self.bound(today, min)? {
                return Ok(false);
            }
        }
        if let Some(max) = self.max {
            if date > self.bound(today, max)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl RuleValidatorFactory for RollingDateFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let offset = |raw: &Option<String>| -> Result<Option<i64>, RuleConfigurationError> {
            raw.as_deref()
                .map(|raw| {
                    raw.trim()
                        .parse::<i64>()
                        .map_err(|_| RuleConfigurationError::literal(raw, "a whole-number offset"))
                })
                .transpose()
        };
        let min = offset(&config.min_value)?;
        let max = offset(&config.max_value)?;
        match (min, max) {
            (None, None) => {
                return Err(RuleConfigurationError::missing(
                    &config.rule_type,
                    "a minimum or maximum offset",
                ))
            }
            (Some(low), Some(high)) if low > high => {
                return Err(RuleConfigurationError::InvalidLiteral {
                    literal: format!("{low}..{high}"),
                    expected: "offsets with min <= max",
                })
            }
            _ => {}
        }
        let unit = config
            .additional_info
            .get(ROLLING_UNIT_KEY)
            .map(|raw| raw.parse::<RollingUnit>())
            .transpose()?
            .unwrap_or_default();
        Ok(CheckValidator::shared(config, RollingDateCheck { min, max, unit }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn shifting() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            RollingUnit::Months.shift(date, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            RollingUnit::Years.shift(date, -1),
            NaiveDate::from_ymd_opt(2023, 1, 31)
        );
        assert_eq!(
            RollingUnit::Days.shift(date, -31),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(RollingUnit::Years.shift(date, i64::MAX), None);
    }

    #[test]
    fn unit_parsing() {
        assert_eq!("Years".parse::<RollingUnit>(), Ok(RollingUnit::Years));
        assert_eq!("day".parse::<RollingUnit>(), Ok(RollingUnit::Days));
        assert!("fortnights".parse::<RollingUnit>().is_err());
    }

    #[tokio::test]
    async fn next_thirty_days() {
        let rule = ValidationRuleConfig::new("Booking", "arrival", rule_types::ROLLING_DATE, "{DisplayName} must be within 30 days")
            .with_display_name("Arrival")
            .with_min_value("0")
            .with_max_value("30");
        let inside = today() + Days::new(10);
        let past = today() - Days::new(1);
        let far = today() + Days::new(31);

        assert!(run(&RollingDateFactory, &rule, RuleInput::Date(inside), None).await.unwrap().is_empty());
        assert_eq!(run(&RollingDateFactory, &rule, RuleInput::Date(past), None).await.unwrap().len(), 1);
        let failures = run(&RollingDateFactory, &rule, RuleInput::Date(far), None).await.unwrap();
        assert_eq!(failures[0].failure_message, "Arrival must be within 30 days");
    }

    #[tokio::test]
    async fn adult_date_of_birth() {
        let rule = ValidationRuleConfig::new("Person", "born", rule_types::ROLLING_DATE, "must be an adult")
            .with_max_value("-18")
            .with_info(ROLLING_UNIT_KEY, "Years");
        let adult = RollingUnit::Years.shift(today(), -30).unwrap();
        let child = RollingUnit::Years.shift(today(), -10).unwrap();

        assert!(run(&RollingDateFactory, &rule, RuleInput::Date(adult), None).await.unwrap().is_empty());
        assert_eq!(run(&RollingDateFactory, &rule, RuleInput::Date(child), None).await.unwrap().len(), 1);
    }

    #[test]
    fn configuration_errors() {
        let base = ValidationRuleConfig::new("Person", "born", rule_types::ROLLING_DATE, "m");
        assert!(RollingDateFactory.create_from_configuration(&base).is_err());
        assert!(RollingDateFactory
            .create_from_configuration(&base.clone().with_min_value("soon"))
            .is_err());
        assert!(RollingDateFactory
            .create_from_configuration(&base.clone().with_min_value("5").with_max_value("1"))
            .is_err());
        assert!(RollingDateFactory
            .create_from_configuration(&base.with_min_value("1").with_info(ROLLING_UNIT_KEY, "weeks"))
            .is_err());
    }
}
