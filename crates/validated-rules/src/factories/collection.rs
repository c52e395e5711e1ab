//! Collection rules.

use super::{length_bounds, within_length, CheckValidator, RuleCheck, RuleValidatorFactory};
use crate::config::{rule_types, ValidationRuleConfig};
use crate::error::RuleConfigurationError;
use crate::input::RuleInput;
use crate::validator::SharedRuleValidator;

/// `CollectionLength`: element count within `minLength..=maxLength`.
pub struct CollectionLengthFactory;

struct CollectionLengthCheck {
    min: Option<usize>,
    max: Option<usize>,
}

impl RuleCheck for CollectionLengthCheck {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError> {
        match value {
            RuleInput::Collection(len) => Ok(within_length(len, self.min, self.max)),
            other => Err(RuleConfigurationError::unsupported(
                rule_types::COLLECTION_LENGTH,
                other.kind(),
            )),
        }
    }
}

impl RuleValidatorFactory for CollectionLengthFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        let (min, max) = length_bounds(config)?;
        Ok(CheckValidator::shared(config, CollectionLengthCheck { min, max }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;
    use crate::config::TargetType;
    use validated_core::Cause;

    fn lines_rule() -> ValidationRuleConfig {
        ValidationRuleConfig::new("Order", "lines", rule_types::COLLECTION_LENGTH, "{DisplayName} needs {MinLength} to {MaxLength} entries")
            .with_display_name("Order lines")
            .with_length(Some(1), Some(3))
            .with_target(TargetType::Collection)
    }

    #[tokio::test]
    async fn counts_elements() {
        let rule = lines_rule();
        assert!(run(&CollectionLengthFactory, &rule, RuleInput::Collection(2), None).await.unwrap().is_empty());

        let failures = run(&CollectionLengthFactory, &rule, RuleInput::Collection(0), None).await.unwrap();
        assert_eq!(failures[0].failure_message, "Order lines needs 1 to 3 entries");
        assert_eq!(run(&CollectionLengthFactory, &rule, RuleInput::Collection(4), None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_collection_is_a_config_error() {
        let failures = run(&CollectionLengthFactory, &lines_rule(), RuleInput::Text("abc"), None)
            .await
            .unwrap();
        assert_eq!(failures[0].cause, Cause::RuleConfigError);
    }
}
