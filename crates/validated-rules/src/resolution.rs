//! Selection of the applicable rule variants for one member.
//!
//! Candidates are filtered to the requested type, member and scope, grouped by
//! [`RuleIdentity`], narrowed to the latest version of each group, and then
//! resolved to one config per group by tenant/culture precedence:
//!
//! 1. requested tenant, requested culture
//! 2. requested tenant, default culture
//! 3. default tenant, default culture
//!
//! A group with no match in any tier does not apply and is dropped.
//!
//! Culture ids compare ASCII case-insensitively (`en-gb` matches `en-GB`), as
//! language tags do. Tenant ids are opaque keys and must match exactly.

use crate::config::{
    rule_types, RuleIdentity, TargetType, ValidationRuleConfig, DEFAULT_CULTURE_ID,
    DEFAULT_TENANT_ID,
};
use std::collections::HashMap;
use tracing::debug;

/// Which rules a resolution request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Value rules for an item or a whole collection.
    Value(TargetType),
    /// `MemberComparison` rules, evaluated against the owning entity.
    Comparison,
}

/// The member and audience a set of rules is resolved for.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'r> {
    pub type_name: &'r str,
    pub property_name: &'r str,
    pub tenant_id: &'r str,
    pub culture_id: &'r str,
    pub scope: RuleScope,
}

impl<'r> ResolutionRequest<'r> {
    pub fn new(
        type_name: &'r str,
        property_name: &'r str,
        tenant_id: &'r str,
        culture_id: &'r str,
        scope: RuleScope,
    ) -> Self {
        Self {
            type_name,
            property_name,
            tenant_id,
            culture_id,
            scope,
        }
    }

    fn matches(&self, rule: &ValidationRuleConfig) -> bool {
        if rule.type_full_name != self.type_name || rule.property_name != self.property_name {
            return false;
        }
        let comparison = rule.rule_type == rule_types::MEMBER_COMPARISON;
        match self.scope {
            RuleScope::Comparison => comparison,
            RuleScope::Value(target) => !comparison && rule.target_type == target,
        }
    }
}

fn same_culture(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Pick the variant for the requested tenant and culture.
fn by_precedence<'c>(
    variants: &[&'c ValidationRuleConfig],
    tenant_id: &str,
    culture_id: &str,
) -> Option<&'c ValidationRuleConfig> {
    let tier = |tenant: &str, culture: &str| {
        variants
            .iter()
            .copied()
            .find(|rule| rule.tenant_id == tenant && same_culture(&rule.culture_id, culture))
    };
    tier(tenant_id, culture_id)
        .or_else(|| tier(tenant_id, DEFAULT_CULTURE_ID))
        .or_else(|| tier(DEFAULT_TENANT_ID, DEFAULT_CULTURE_ID))
}

/// Select the configs that apply to `request`, one per rule identity, in the
/// order each identity first appears in `rules`.
///
/// Tenant ids must match exactly; culture ids match ignoring ASCII case.
pub fn select_rules<'c>(
    rules: &'c [ValidationRuleConfig],
    request: &ResolutionRequest<'_>,
) -> Vec<&'c ValidationRuleConfig> {
    let mut index: HashMap<RuleIdentity<'c>, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'c ValidationRuleConfig>> = Vec::new();

    for rule in rules.iter().filter(|rule| request.matches(rule)) {
        match index.get(&rule.identity()) {
            Some(&slot) => groups[slot].push(rule),
            None => {
                index.insert(rule.identity(), groups.len());
                groups.push(vec![rule]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|group| {
            let latest = group.iter().map(|rule| &rule.version).max()?;
            let newest: Vec<_> = group
                .iter()
                .copied()
                .filter(|rule| &rule.version == latest)
                .collect();
            let selected = by_precedence(&newest, request.tenant_id, request.culture_id);
            if selected.is_none() {
                debug!(
                    type_name = request.type_name,
                    property_name = request.property_name,
                    rule_type = %group[0].rule_type,
                    version = %latest,
                    tenant_id = request.tenant_id,
                    culture_id = request.culture_id,
                    "no tenant/culture variant applies; rule skipped"
                );
            }
            selected
        })
        .collect()
}
