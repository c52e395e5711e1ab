//! Rule resolution benchmarks
//!
//! Measures tenant/culture selection and validator materialization over rule
//! pools of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use validated_rules::{
    rule_types, select_rules, ResolutionRequest, RuleScope, TargetType, ValidationRuleConfig,
    ValidatorFactoryProvider,
};

const TENANTS: [&str; 4] = ["ALL", "ACME", "GLOBEX", "INITECH"];
const CULTURES: [&str; 3] = ["en-GB", "fr-FR", "de-DE"];

/// A pool with one rule per (type, property) for every tenant/culture pair.
fn rule_pool(types: usize, properties: usize) -> Vec<ValidationRuleConfig> {
    let mut rules = Vec::new();
    for t in 0..types {
        for p in 0..properties {
            for tenant in TENANTS {
                for culture in CULTURES {
                    rules.push(
                        ValidationRuleConfig::new(
                            format!("Type{t}"),
                            format!("field{p}"),
                            rule_types::STRING_LENGTH,
                            "{DisplayName} must be {MinLength}-{MaxLength} characters",
                        )
                        .with_length(Some(1), Some(64))
                        .for_tenant(tenant, culture),
                    );
                }
            }
        }
    }
    rules
}

fn bench_select_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_rules");

    for types in [1, 10, 100] {
        let rules = rule_pool(types, 10);
        group.bench_with_input(BenchmarkId::new("exact_match", rules.len()), &rules, |b, rules| {
            let request = ResolutionRequest::new(
                "Type0",
                "field5",
                "ACME",
                "fr-FR",
                RuleScope::Value(TargetType::Item),
            );
            b.iter(|| select_rules(black_box(rules), black_box(&request)))
        });
        group.bench_with_input(BenchmarkId::new("fallback", rules.len()), &rules, |b, rules| {
            let request = ResolutionRequest::new(
                "Type0",
                "field5",
                "UMBRELLA",
                "es-ES",
                RuleScope::Value(TargetType::Item),
            );
            b.iter(|| select_rules(black_box(rules), black_box(&request)))
        });
    }

    group.finish();
}

fn bench_create_validator(c: &mut Criterion) {
    let provider = ValidatorFactoryProvider::new();
    let rules = rule_pool(10, 10);

    c.bench_function("create_validator", |b| {
        b.iter(|| {
            provider.create_validator::<str>(
                black_box(&rules),
                "Type3",
                "field7",
                "GLOBEX",
                "de-DE",
            )
        })
    });
}

fn bench_parse_rule_pool(c: &mut Criterion) {
    let json = serde_json::to_string(&rule_pool(10, 10)).unwrap_or_default();

    c.bench_function("parse_rule_pool", |b| {
        b.iter(|| validated_rules::parse_rule_pool(black_box(&json)))
    });
}

criterion_group!(
    benches,
    bench_select_rules,
    bench_create_validator,
    bench_parse_rule_pool,
);
criterion_main!(benches);
