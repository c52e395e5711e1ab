//! Placeholder substitution for already-resolved failure messages.

use std::fmt::Display;

/// Well-known placeholder names.
pub mod placeholders {
    pub const PROPERTY_NAME: &str = "PropertyName";
    pub const DISPLAY_NAME: &str = "DisplayName";
    pub const VALIDATED_VALUE: &str = "ValidatedValue";
    pub const COMPARE_TO_VALUE: &str = "CompareToValue";
    pub const COMPARE_PROPERTY_NAME: &str = "ComparePropertyName";
    pub const MIN_LENGTH: &str = "MinLength";
    pub const MAX_LENGTH: &str = "MaxLength";
    pub const MIN_VALUE: &str = "MinValue";
    pub const MAX_VALUE: &str = "MaxValue";
    pub const PATTERN: &str = "Pattern";
}

/// A failure message with `{Name}` placeholders.
///
/// ```rust
/// use validated_core::MessageTemplate;
///
/// let text = MessageTemplate::new("{DisplayName} must be at least {MinLength} characters")
///     .param("DisplayName", "User name")
///     .param("MinLength", 3)
///     .render();
/// assert_eq!(text, "User name must be at least 3 characters");
/// ```
#[derive(Debug, Clone)]
pub struct MessageTemplate<'t> {
    template: &'t str,
    params: Vec<(&'static str, String)>,
}

impl<'t> MessageTemplate<'t> {
    pub fn new(template: &'t str) -> Self {
        Self {
            template,
            params: Vec::new(),
        }
    }

    /// Add a placeholder value.
    pub fn param(mut self, key: &'static str, value: impl Display) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// Add a placeholder value only when present.
    pub fn param_opt(self, key: &'static str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Replace every known placeholder. Unknown placeholders are left as-is.
    pub fn render(&self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in &self.params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }
}
