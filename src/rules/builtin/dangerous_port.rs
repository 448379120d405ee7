use crate::error::Result;
use crate::fact::{Fact, FactKind};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};

/// Ports that should never face the open network: remote shells and
/// remote desktop protocols.
const DANGEROUS_PORTS: &[u16] = &[21, 22, 23, 3389, 5900];

/// SENTINEL-001: Dangerous Port Exposed
///
/// Flags open ports on the remote-access list. Fires once per
/// dangerous port found in the bundle.
pub struct DangerousPortRule;

impl Rule for DangerousPortRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SENTINEL-001".into(),
            name: "Dangerous Port Exposed".into(),
            description: "Remote-access port (FTP, SSH, Telnet, RDP, VNC) open to the network"
                .into(),
            severity: Severity::Critical,
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
        if !DANGEROUS_PORTS.contains(port) {
            return Ok(vec![]);
        }
        Ok(vec![Finding {
            rule_id: "SENTINEL-001".into(),
            rule_name: "Dangerous Port Exposed".into(),
            severity: Severity::Critical,
            category: Category::Network,
            message: format!("Port {port} ({service}) is open and reachable"),
            evidence: vec![fact.clone()],
            remediation: Some(
                "Close the port or restrict it to a management network; \
                 prefer key-based access behind a bastion for remote shells."
                    .into(),
            ),
        }])
    }
}
