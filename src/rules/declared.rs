//! Rules declared in `sentinel.toml` rather than compiled in.
//!
//! Each `[[rules]]` table names one fact kind and the predicate fields
//! that apply to it; the declaration is compiled into a `DeclaredRule`
//! at startup and registered after the built-ins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentinelError};
use crate::fact::{Fact, FactKind};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};

/// TOML schema for one declared rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredRuleSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub applies_to: String,
    pub severity: String,
    #[serde(default)]
    pub category: Option<String>,
    pub message: String,
    #[serde(default)]
    pub remediation: Option<String>,

    /// Predicate fields; which ones are honored depends on `applies_to`.
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
}

/// A declared rule compiled and ready to register.
#[derive(Debug)]
pub struct DeclaredRule {
    meta: RuleMetadata,
    kinds: [FactKind; 1],
    ports: Vec<u16>,
    services: Vec<String>,
    headers: Vec<String>,
    pattern: Option<Regex>,
    public: Option<bool>,
    message: String,
    remediation: Option<String>,
}

impl DeclaredRuleSpec {
    /// Validate the declaration and compile it into a registrable rule.
    pub fn compile(&self) -> Result<DeclaredRule> {
        let invalid = |message: String| SentinelError::InvalidRule {
            rule_id: self.id.clone(),
            message,
        };

        let kind = FactKind::from_str_lenient(&self.applies_to)
            .ok_or_else(|| invalid(format!("unknown fact kind '{}'", self.applies_to)))?;
        let severity = Severity::from_str_lenient(&self.severity)
            .ok_or_else(|| invalid(format!("unknown severity '{}'", self.severity)))?;
        let category = match &self.category {
            Some(s) => Category::from_str_lenient(s)
                .ok_or_else(|| invalid(format!("unknown category '{s}'")))?,
            None => default_category(kind),
        };

        let pattern = self
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| invalid(format!("bad pattern: {e}")))?;

        // The declaration must carry at least one predicate the kind
        // can be tested against.
        match kind {
            FactKind::OpenPort => {
                if self.ports.is_empty() && self.services.is_empty() {
                    return Err(invalid("open_port rule needs 'ports' or 'services'".into()));
                }
            }
            FactKind::ServiceBanner => {
                if pattern.is_none() {
                    return Err(invalid("service_banner rule needs 'pattern'".into()));
                }
            }
            FactKind::HttpHeaderMissing | FactKind::HttpHeader => {
                if self.headers.is_empty() {
                    return Err(invalid("header rule needs 'headers'".into()));
                }
            }
            FactKind::BucketAcl => {
                if self.public.is_none() {
                    return Err(invalid("bucket_acl rule needs 'public'".into()));
                }
            }
        }

        Ok(DeclaredRule {
            meta: RuleMetadata {
                id: self.id.clone(),
                name: self.name.clone().unwrap_or_else(|| self.id.clone()),
                description: self.description.clone(),
                severity,
                category,
            },
            kinds: [kind],
            ports: self.ports.clone(),
            services: self.services.iter().map(|s| s.to_lowercase()).collect(),
            headers: self.headers.iter().map(|h| h.to_lowercase()).collect(),
            pattern,
            public: self.public,
            message: self.message.clone(),
            remediation: self.remediation.clone(),
        })
    }
}

fn default_category(kind: FactKind) -> Category {
    match kind {
        FactKind::OpenPort | FactKind::ServiceBanner => Category::Network,
        FactKind::HttpHeaderMissing | FactKind::HttpHeader => Category::Web,
        FactKind::BucketAcl => Category::Cloud,
    }
}

impl DeclaredRule {
    fn matches(&self, fact: &Fact) -> bool {
        match fact {
            Fact::OpenPort { port, service } => {
                let port_ok = self.ports.is_empty() || self.ports.contains(port);
                let service_ok =
                    self.services.is_empty() || self.services.contains(&service.to_lowercase());
                port_ok && service_ok
            }
            Fact::ServiceBanner { banner, .. } => self
                .pattern
                .as_ref()
                .map(|p| p.is_match(banner))
                .unwrap_or(false),
            Fact::HttpHeaderMissing { header } => self.headers.contains(&header.to_lowercase()),
            Fact::HttpHeader { header, value } => {
                self.headers.contains(&header.to_lowercase())
                    && self
                        .pattern
                        .as_ref()
                        .map(|p| p.is_match(value))
                        .unwrap_or(true)
            }
            Fact::BucketAcl { public, .. } => self.public == Some(*public),
        }
    }
}

impl Rule for DeclaredRule {
    fn metadata(&self) -> RuleMetadata {
        self.meta.clone()
    }

    fn applies_to(&self) -> &[FactKind] {
        &self.kinds
    }

    fn check(&self, fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
        if !self.matches(fact) {
            return Ok(vec![]);
        }
        Ok(vec![Finding {
            rule_id: self.meta.id.clone(),
            rule_name: self.meta.name.clone(),
            severity: self.meta.severity,
            category: self.meta.category,
            message: self.message.clone(),
            evidence: vec![fact.clone()],
            remediation: self.remediation.clone(),
        }])
    }
}
