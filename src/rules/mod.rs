pub mod builtin;
pub mod declared;
pub mod finding;
pub mod policy;

use std::collections::{HashMap, HashSet};

use crate::error::{Result, SentinelError};
use crate::fact::{Fact, FactKind};

pub use finding::{Category, Finding, RuleMetadata, Severity};

/// A rule judges facts and produces findings.
///
/// Rules declare which fact kinds they apply to; the engine only calls
/// `check` with facts of those kinds. `check` receives the whole bundle
/// alongside the current fact so a rule can correlate across facts
/// without a second API.
pub trait Rule: Send + Sync {
    /// Metadata about this rule (id, name, severity, category).
    fn metadata(&self) -> RuleMetadata;

    /// Fact kinds this rule wants to see.
    fn applies_to(&self) -> &[FactKind];

    /// Judge one fact. May return zero or more findings; an `Err` is
    /// recovered by the engine, it never aborts the evaluation.
    fn check(&self, fact: &Fact, bundle: &[Fact]) -> Result<Vec<Finding>>;
}

struct Registered {
    meta: RuleMetadata,
    rule: Box<dyn Rule>,
}

/// The findings engine: an append-only rule registry indexed by fact
/// kind, plus one pure operation over it.
///
/// `evaluate` takes `&self` and touches no interior mutable state, so a
/// shared engine may serve concurrent callers once registration is done;
/// `register` takes `&mut self`, which serializes registration before
/// the engine is shared.
pub struct Engine {
    rules: Vec<Registered>,
    index: HashMap<FactKind, Vec<usize>>,
}

impl Engine {
    /// Create an engine with no rules registered.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create an engine with all built-in rules registered.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine
            .register_all(builtin::all_rules())
            .expect("built-in rule ids are unique");
        engine
    }

    /// Add a rule to the registry.
    ///
    /// Fails with `DuplicateRule` if the id is already taken; the
    /// registry is left unchanged in that case.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        let meta = rule.metadata();
        if self.rules.iter().any(|r| r.meta.id == meta.id) {
            return Err(SentinelError::DuplicateRule { rule_id: meta.id });
        }
        let idx = self.rules.len();
        for kind in rule.applies_to() {
            self.index.entry(*kind).or_default().push(idx);
        }
        self.rules.push(Registered { meta, rule });
        Ok(())
    }

    pub fn register_all(
        &mut self,
        rules: impl IntoIterator<Item = Box<dyn Rule>>,
    ) -> Result<()> {
        for rule in rules {
            self.register(rule)?;
        }
        Ok(())
    }

    /// Evaluate a fact bundle against every applicable registered rule.
    ///
    /// Pure in (facts, registry): same inputs always yield the same
    /// findings in the same order. Findings are sorted by descending
    /// severity, then by rule registration order; ties within one rule
    /// keep fact order. Empty facts or no matching rules yield an empty
    /// vec, which is the normal "no vulnerabilities detected" outcome.
    pub fn evaluate(&self, facts: &[Fact]) -> Vec<Finding> {
        let mut matched: Vec<(usize, Finding)> = Vec::new();
        let mut failed: HashSet<usize> = HashSet::new();

        for fact in facts {
            let Some(rule_idxs) = self.index.get(&fact.kind()) else {
                continue;
            };
            for &idx in rule_idxs {
                let entry = &self.rules[idx];
                match entry.rule.check(fact, facts) {
                    Ok(findings) => {
                        matched.extend(findings.into_iter().map(|f| (idx, f)));
                    }
                    Err(err) => {
                        tracing::warn!(
                            rule_id = %entry.meta.id,
                            error = %err,
                            "rule failed during evaluation, continuing"
                        );
                        // One failure finding per rule per evaluation.
                        if failed.insert(idx) {
                            matched.push((idx, Self::failure_finding(&entry.meta, fact, &err)));
                        }
                    }
                }
            }
        }

        matched.sort_by(|a, b| b.1.severity.cmp(&a.1.severity).then(a.0.cmp(&b.0)));
        matched.into_iter().map(|(_, f)| f).collect()
    }

    fn failure_finding(meta: &RuleMetadata, fact: &Fact, err: &SentinelError) -> Finding {
        Finding {
            rule_id: meta.id.clone(),
            rule_name: meta.name.clone(),
            severity: Severity::Info,
            category: meta.category,
            message: format!("rule evaluation failed: {err}"),
            evidence: vec![fact.clone()],
            remediation: None,
        }
    }

    /// List metadata for all registered rules, in registration order.
    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|r| r.meta.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Fires once for every fact of its kind.
    struct StaticRule {
        id: &'static str,
        severity: Severity,
        kinds: Vec<FactKind>,
    }

    impl Rule for StaticRule {
        fn metadata(&self) -> RuleMetadata {
            RuleMetadata {
                id: self.id.into(),
                name: self.id.into(),
                description: "test rule".into(),
                severity: self.severity,
                category: Category::Network,
            }
        }

        fn applies_to(&self) -> &[FactKind] {
            &self.kinds
        }

        fn check(&self, fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
            Ok(vec![Finding {
                rule_id: self.id.into(),
                rule_name: self.id.into(),
                severity: self.severity,
                category: Category::Network,
                message: format!("{} matched", self.id),
                evidence: vec![fact.clone()],
                remediation: None,
            }])
        }
    }

    /// Always errors, regardless of input.
    struct BrokenRule;

    impl Rule for BrokenRule {
        fn metadata(&self) -> RuleMetadata {
            RuleMetadata {
                id: "broken".into(),
                name: "Broken".into(),
                description: "always fails".into(),
                severity: Severity::Critical,
                category: Category::Network,
            }
        }

        fn applies_to(&self) -> &[FactKind] {
            &[FactKind::OpenPort]
        }

        fn check(&self, _fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
            Err(SentinelError::Internal("synthetic failure".into()))
        }
    }

    fn port_fact(port: u16, service: &str) -> Fact {
        Fact::OpenPort {
            port,
            service: service.into(),
        }
    }

    fn static_rule(id: &'static str, severity: Severity, kind: FactKind) -> Box<dyn Rule> {
        Box::new(StaticRule {
            id,
            severity,
            kinds: vec![kind],
        })
    }

    #[test]
    fn empty_facts_yield_empty_findings() {
        let mut engine = Engine::empty();
        engine
            .register(static_rule("r1", Severity::Critical, FactKind::OpenPort))
            .unwrap();
        assert_eq!(engine.evaluate(&[]), vec![]);
    }

    #[test]
    fn facts_without_applicable_rules_yield_empty_findings() {
        let mut engine = Engine::empty();
        engine
            .register(static_rule("r1", Severity::Critical, FactKind::BucketAcl))
            .unwrap();
        let facts = vec![port_fact(22, "ssh")];
        assert_eq!(engine.evaluate(&facts), vec![]);
    }

    #[test]
    fn ordering_is_severity_desc_then_registration_order() {
        let mut engine = Engine::empty();
        engine
            .register(static_rule("info-rule", Severity::Info, FactKind::OpenPort))
            .unwrap();
        engine
            .register(static_rule(
                "crit-rule",
                Severity::Critical,
                FactKind::HttpHeaderMissing,
            ))
            .unwrap();
        engine
            .register(static_rule("warn-rule", Severity::Warning, FactKind::BucketAcl))
            .unwrap();

        let facts = vec![
            port_fact(22, "ssh"),
            Fact::HttpHeaderMissing {
                header: "X-Frame-Options".into(),
            },
            Fact::BucketAcl {
                bucket: "finance".into(),
                public: true,
            },
        ];
        let ids: Vec<String> = engine
            .evaluate(&facts)
            .into_iter()
            .map(|f| f.rule_id)
            .collect();
        assert_eq!(ids, vec!["crit-rule", "warn-rule", "info-rule"]);
    }

    #[test]
    fn same_severity_keeps_registration_order() {
        let mut engine = Engine::empty();
        engine
            .register(static_rule("bucket-rule", Severity::Warning, FactKind::BucketAcl))
            .unwrap();
        engine
            .register(static_rule("port-rule", Severity::Warning, FactKind::OpenPort))
            .unwrap();

        // The open_port fact comes first in the bundle, but the bucket
        // rule was registered first and wins the tie-break.
        let facts = vec![
            port_fact(22, "ssh"),
            Fact::BucketAcl {
                bucket: "finance".into(),
                public: true,
            },
        ];
        let ids: Vec<String> = engine
            .evaluate(&facts)
            .into_iter()
            .map(|f| f.rule_id)
            .collect();
        assert_eq!(ids, vec!["bucket-rule", "port-rule"]);
    }

    #[test]
    fn broken_rule_degrades_to_one_info_finding() {
        let mut engine = Engine::empty();
        engine.register(Box::new(BrokenRule)).unwrap();
        engine
            .register(static_rule("ok-rule", Severity::Warning, FactKind::OpenPort))
            .unwrap();

        // Two open ports: the broken rule fails on both but surfaces
        // exactly once; the healthy rule fires per fact.
        let facts = vec![port_fact(22, "ssh"), port_fact(23, "telnet")];
        let findings = engine.evaluate(&facts);
        assert_eq!(findings.len(), 3);

        let broken: Vec<&Finding> = findings.iter().filter(|f| f.rule_id == "broken").collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].severity, Severity::Info);
        assert!(broken[0].message.contains("rule evaluation failed"));

        let ok_count = findings.iter().filter(|f| f.rule_id == "ok-rule").count();
        assert_eq!(ok_count, 2);
    }

    #[test]
    fn duplicate_registration_is_rejected_and_registry_unchanged() {
        let mut engine = Engine::empty();
        engine
            .register(static_rule("dup", Severity::Critical, FactKind::OpenPort))
            .unwrap();
        let err = engine
            .register(static_rule("dup", Severity::Info, FactKind::BucketAcl))
            .unwrap_err();
        assert!(matches!(
            err,
            SentinelError::DuplicateRule { ref rule_id } if rule_id == "dup"
        ));
        assert_eq!(engine.len(), 1);

        // The first registration still evaluates with its own severity.
        let findings = engine.evaluate(&[port_fact(22, "ssh")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn evaluate_is_idempotent() {
        let mut engine = Engine::empty();
        engine
            .register(static_rule("r1", Severity::Critical, FactKind::OpenPort))
            .unwrap();
        engine
            .register(static_rule("r2", Severity::Info, FactKind::ServiceBanner))
            .unwrap();

        let facts = vec![
            port_fact(22, "ssh"),
            Fact::ServiceBanner {
                port: 22,
                banner: "OpenSSH_8.9".into(),
            },
            port_fact(80, "http"),
        ];
        assert_eq!(engine.evaluate(&facts), engine.evaluate(&facts));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_fact() -> impl Strategy<Value = Fact> {
            prop_oneof![
                (any::<u16>(), "[a-z]{2,8}").prop_map(|(port, service)| Fact::OpenPort {
                    port,
                    service,
                }),
                (any::<u16>(), "[ -~]{0,24}").prop_map(|(port, banner)| Fact::ServiceBanner {
                    port,
                    banner,
                }),
                "[A-Za-z-]{1,20}".prop_map(|header| Fact::HttpHeaderMissing { header }),
                ("[a-z0-9-]{1,12}", any::<bool>()).prop_map(|(bucket, public)| Fact::BucketAcl {
                    bucket,
                    public,
                }),
            ]
        }

        proptest! {
            #[test]
            fn evaluation_is_deterministic(facts in proptest::collection::vec(arb_fact(), 0..32)) {
                let engine = Engine::new();
                let first = engine.evaluate(&facts);
                let second = engine.evaluate(&facts);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn findings_are_sorted_by_severity(facts in proptest::collection::vec(arb_fact(), 0..32)) {
                let engine = Engine::new();
                let findings = engine.evaluate(&facts);
                for pair in findings.windows(2) {
                    prop_assert!(pair[0].severity >= pair[1].severity);
                }
            }
        }
    }
}
