use crate::error::Result;
use crate::fact::{Fact, FactKind};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};

/// Hardening headers whose absence is worth reporting. Compared
/// case-insensitively, as header names are on the wire.
const HARDENING_HEADERS: &[&str] = &[
    "x-frame-options",
    "content-security-policy",
    "strict-transport-security",
    "x-content-type-options",
];

/// SENTINEL-004: Missing Security Header
pub struct MissingHeaderRule;

impl Rule for MissingHeaderRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SENTINEL-004".into(),
            name: "Missing Security Header".into(),
            description: "HTTP response lacks a standard hardening header".into(),
            severity: Severity::Warning,
            category: Category::Web,
        }
    }

    fn applies_to(&self) -> &[FactKind] {
        &[FactKind::HttpHeaderMissing]
    }

    fn check(&self, fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
        let Fact::HttpHeaderMissing { header } = fact else {
            return Ok(vec![]);
        };
        let header_lower = header.to_lowercase();
        if !HARDENING_HEADERS.contains(&header_lower.as_str()) {
            return Ok(vec![]);
        }
        Ok(vec![Finding {
            rule_id: "SENTINEL-004".into(),
            rule_name: "Missing Security Header".into(),
            severity: Severity::Warning,
            category: Category::Web,
            message: format!("Response is missing the '{header}' header"),
            evidence: vec![fact.clone()],
            remediation: Some(format!("Set '{header}' on all responses at the server or proxy.")),
        }])
    }
}
