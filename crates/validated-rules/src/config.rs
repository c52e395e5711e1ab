//! Declarative rule configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Tenant id whose rules apply when no tenant-specific variant exists.
pub const DEFAULT_TENANT_ID: &str = "ALL";

/// Culture id whose rules apply when no culture-specific variant exists.
pub const DEFAULT_CULTURE_ID: &str = "en-GB";

/// Rule-type tags understood by the built-in factories.
pub mod rule_types {
    pub const REGEX: &str = "Regex";
    pub const STRING_LENGTH: &str = "StringLength";
    pub const RANGE: &str = "Range";
    pub const COLLECTION_LENGTH: &str = "CollectionLength";
    pub const COMPARE_TO_VALUE: &str = "CompareToValue";
    pub const MEMBER_COMPARISON: &str = "MemberComparison";
    pub const ROLLING_DATE: &str = "RollingDate";
    pub const URL_FORMAT: &str = "UrlFormat";
    pub const PRECISION_SCALE: &str = "PrecisionScale";
}

/// Whether a rule checks each item or the collection itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Item,
    Collection,
}

/// Relation required between a value and what it is compared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareType {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareType {
    /// Whether `value.cmp(other) == ordering` satisfies the relation.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareType::Equal => ordering == Ordering::Equal,
            CompareType::NotEqual => ordering != Ordering::Equal,
            CompareType::GreaterThan => ordering == Ordering::Greater,
            CompareType::GreaterThanOrEqual => ordering != Ordering::Less,
            CompareType::LessThan => ordering == Ordering::Less,
            CompareType::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CompareType::Equal => "equal to",
            CompareType::NotEqual => "not equal to",
            CompareType::GreaterThan => "greater than",
            CompareType::GreaterThanOrEqual => "greater than or equal to",
            CompareType::LessThan => "less than",
            CompareType::LessThanOrEqual => "less than or equal to",
        };
        f.write_str(text)
    }
}

/// How bound and compare literals in a rule are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTypeHint {
    /// Infer from the literal (integer, decimal, date, date-time, boolean, text).
    #[default]
    Unspecified,
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
}

/// Revision of a rule. Ordered by major, minor, patch, then creation time.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub created_at: DateTime<Utc>,
}

impl ValidationVersion {
    pub fn new(major: u32, minor: u32, patch: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            major,
            minor,
            patch,
            created_at,
        }
    }
}

impl fmt::Display for ValidationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

fn default_culture_id() -> String {
    DEFAULT_CULTURE_ID.to_string()
}

/// One rule instance for one member of one type, scoped by tenant, culture
/// and version.
///
/// ## Example
///
/// ```rust
/// use validated_rules::{rule_types, ValidationRuleConfig};
///
/// let rule = ValidationRuleConfig::new("Person", "name", rule_types::STRING_LENGTH, "{DisplayName} must be 2-50 characters")
///     .with_display_name("Name")
///     .with_length(Some(2), Some(50))
///     .for_tenant("ACME", "en-US");
///
/// assert_eq!(rule.tenant_id, "ACME");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRuleConfig {
    pub type_full_name: String,
    pub property_name: String,
    pub display_name: String,
    pub rule_type: String,
    #[serde(default)]
    pub value_type_hint: ValueTypeHint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub failure_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_type: Option<CompareType>,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    #[serde(default = "default_culture_id")]
    pub culture_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: BTreeMap<String, String>,
    #[serde(default)]
    pub version: ValidationVersion,
}

impl ValidationRuleConfig {
    /// Rule for the default tenant and culture, version 0.0.0.
    pub fn new(
        type_full_name: impl Into<String>,
        property_name: impl Into<String>,
        rule_type: impl Into<String>,
        failure_message: impl Into<String>,
    ) -> Self {
        let property_name = property_name.into();
        Self {
            type_full_name: type_full_name.into(),
            display_name: property_name.clone(),
            property_name,
            rule_type: rule_type.into(),
            value_type_hint: ValueTypeHint::Unspecified,
            pattern: None,
            failure_message: failure_message.into(),
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            compare_value: None,
            compare_property_name: None,
            compare_type: None,
            target_type: TargetType::Item,
            tenant_id: default_tenant_id(),
            culture_id: default_culture_id(),
            additional_info: BTreeMap::new(),
            version: ValidationVersion::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_value_type(mut self, hint: ValueTypeHint) -> Self {
        self.value_type_hint = hint;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_min_value(mut self, min: impl Into<String>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn with_max_value(mut self, max: impl Into<String>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    pub fn with_compare_value(mut self, value: impl Into<String>, compare_type: CompareType) -> Self {
        self.compare_value = Some(value.into());
        self.compare_type = Some(compare_type);
        self
    }

    pub fn with_compare_property(
        mut self,
        property_name: impl Into<String>,
        compare_type: CompareType,
    ) -> Self {
        self.compare_property_name = Some(property_name.into());
        self.compare_type = Some(compare_type);
        self
    }

    pub fn with_compare_type(mut self, compare_type: CompareType) -> Self {
        self.compare_type = Some(compare_type);
        self
    }

    pub fn with_target(mut self, target: TargetType) -> Self {
        self.target_type = target;
        self
    }

    pub fn for_tenant(mut self, tenant_id: impl Into<String>, culture_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self.culture_id = culture_id.into();
        self
    }

    pub fn with_version(mut self, version: ValidationVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }

    /// What this rule checks, independent of tenant, culture and version.
    pub fn identity(&self) -> RuleIdentity<'_> {
        RuleIdentity {
            rule_type: &self.rule_type,
            pattern: self.pattern.as_deref(),
            min_length: self.min_length,
            max_length: self.max_length,
            min_value: self.min_value.as_deref(),
            max_value: self.max_value.as_deref(),
            compare_value: self.compare_value.as_deref(),
            compare_property_name: self.compare_property_name.as_deref(),
            compare_type: self.compare_type,
        }
    }
}

/// Parse a JSON array of rule configurations, as exported by a rule store.
pub fn parse_rule_pool(json: &str) -> Result<Vec<ValidationRuleConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Grouping key: configs with equal identities are variants of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleIdentity<'a> {
    pub rule_type: &'a str,
    pub pattern: Option<&'a str>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<&'a str>,
    pub max_value: Option<&'a str>,
    pub compare_value: Option<&'a str>,
    pub compare_property_name: Option<&'a str>,
    pub compare_type: Option<CompareType>,
}
