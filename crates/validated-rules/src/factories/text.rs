//! Text rules: pattern, length and URL format.

use super::{length_bounds, within_length, CheckValidator, RuleCheck, RuleValidatorFactory};
use crate::config::{rule_types, ValidationRuleConfig};
use crate::error::RuleConfigurationError;
use crate::input::RuleInput;
use crate::validator::SharedRuleValidator;
use regex::Regex;

/// `Regex`: the text must match `pattern`; anchor it to match the whole value.
pub struct RegexFactory;

struct RegexCheck {
    regex: Regex,
}

impl RuleCheck for RegexCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        match value {
            RuleInput::Text(text) => Ok(self.regex.is_match(text)),
            other => Err(RuleConfigurationError::unsupported(rule_types::REGEX, other.kind())),
        }
    }
}

impl RuleValidatorFactory for RegexFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let pattern = config
            .pattern
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
            .ok_or_else(|| RuleConfigurationError::missing(&config.rule_type, "a pattern"))?;
        let regex = Regex::new(pattern).map_err(|e| RuleConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(CheckValidator::shared(config, RegexCheck { regex }))
    }
}

/// `StringLength`: character count within `minLength..=maxLength`.
pub struct StringLengthFactory;

struct StringLengthCheck {
    min: Option<usize>,
    max: Option<usize>,
}

impl RuleCheck for StringLengthCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        match value {
            RuleInput::Text(text) => Ok(within_length(text.chars().count(), self.min, self.max)),
            other => Err(RuleConfigurationError::unsupported(
                rule_types::STRING_LENGTH,
                other.kind(),
            )),
        }
    }
}

impl RuleValidatorFactory for StringLengthFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let (min, max) = length_bounds(config)?;
        Ok(CheckValidator::shared(config, StringLengthCheck { min, max }))
    }
}

/// Key in `additionalInfo` listing accepted URL schemes, comma separated.
pub const ALLOWED_SCHEMES_KEY: &str = "AllowedSchemes";

const DEFAULT_SCHEMES: [&str; 2] = ["http", "https"];

/// `UrlFormat`: an absolute URL with a host and an allowed scheme.
pub struct UrlFormatFactory;

struct UrlFormatCheck {
    schemes: Vec<String>,
}

impl RuleCheck for UrlFormatCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        match value {
            RuleInput::Text(text) => Ok(url::Url::parse(text).map_or(false, |url| {
                url.host().is_some() && self.schemes.iter().any(|s| s == url.scheme())
            })),
            other => Err(RuleConfigurationError::unsupported(
                rule_types::URL_FORMAT,
                other.kind(),
            )),
        }
    }
}

impl RuleValidatorFactory for UrlFormatFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let schemes: Vec<String> = match config.additional_info.get(ALLOWED_SCHEMES_KEY) {
            Some(list) => list
                .split(',')
                .map(|scheme| scheme.trim().to_ascii_lowercase())
                .filter(|scheme| !scheme.is_empty())
                .collect(),
            None => DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
        };
        if schemes.is_empty() {
            return Err(RuleConfigurationError::missing(
                &config.rule_type,
                "at least one allowed scheme",
            ));
        }
        Ok(CheckValidator::shared(config, UrlFormatCheck { schemes }))
    }
}
