use crate::error::Result;
use crate::fact::{Fact, FactKind};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};

const CLEARTEXT_SERVICES: &[&str] = &["ftp", "telnet", "http", "pop3", "imap", "smtp"];

/// SENTINEL-002: Cleartext Service
///
/// Flags services that carry credentials or content unencrypted.
/// Matches on the reported service name, not the port number, so a
/// plain HTTP listener on 8080 is still caught.
pub struct PlaintextServiceRule;

impl Rule for PlaintextServiceRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SENTINEL-002".into(),
            name: "Cleartext Service".into(),
            description: "Unencrypted protocol exposed (FTP, Telnet, HTTP, POP3, IMAP, SMTP)"
                .into(),
            severity: Severity::Warning,
            category: Category::Network,
        }
    }

    fn applies_to(&self) -> &[FactKind] {
        &[FactKind::OpenPort]
    }

    fn check(&self, fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
        let Fact::OpenPort { port, service } = fact else {
            return Ok(vec![]);
        };
        let service_lower = service.to_lowercase();
        if !CLEARTEXT_SERVICES.contains(&service_lower.as_str()) {
            return Ok(vec![]);
        }
        Ok(vec![Finding {
            rule_id: "SENTINEL-002".into(),
            rule_name: "Cleartext Service".into(),
            severity: Severity::Warning,
            category: Category::Network,
            message: format!("Service '{service}' on port {port} transmits in cleartext"),
            evidence: vec![fact.clone()],
            remediation: Some(
                "Replace with the TLS-wrapped equivalent (SFTP, SSH, HTTPS, \
                 POP3S, IMAPS, SMTPS) or tunnel the service."
                    .into(),
            ),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_http_on_any_port() {
        let fact = Fact::OpenPort {
            port: 8080,
            service: "HTTP".into(),
        };
        let findings = PlaintextServiceRule.check(&fact, &[fact.clone()]).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn passes_https() {
        let fact = Fact::OpenPort {
            port: 443,
            service: "https".into(),
        };
        let findings = PlaintextServiceRule.check(&fact, &[fact.clone()]).unwrap();
        assert!(findings.is_empty());
    }
}
