use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::fact::{Fact, FactKind};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};

/// Product name followed by a dotted version, e.g. "OpenSSH_8.9p1" or
/// "Apache/2.4.52".
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][\w.-]*[/_ ]v?\d+\.\d+[\w.-]*").unwrap());

/// SENTINEL-003: Service Version Disclosure
///
/// Flags banners that leak a product version string, which lets an
/// attacker pick exploits without probing.
pub struct BannerDisclosureRule;

impl Rule for BannerDisclosureRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SENTINEL-003".into(),
            name: "Service Version Disclosure".into(),
            description: "Service banner reveals a product version".into(),
            severity: Severity::Info,
            category: Category::Network,
        }
    }

    fn applies_to(&self) -> &[FactKind] {
        &[FactKind::ServiceBanner]
    }

    fn check(&self, fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
        let Fact::ServiceBanner { port, banner } = fact else {
            return Ok(vec![]);
        };
        let Some(version) = VERSION_PATTERN.find(banner) else {
            return Ok(vec![]);
        };
        Ok(vec![Finding {
            rule_id: "SENTINEL-003".into(),
            rule_name: "Service Version Disclosure".into(),
            severity: Severity::Info,
            category: Category::Network,
            message: format!(
                "Banner on port {port} discloses '{}'",
                version.as_str()
            ),
            evidence: vec![fact.clone()],
            remediation: Some("Suppress or genericize the service banner.".into()),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(port: u16, banner: &str) -> Fact {
        Fact::ServiceBanner {
            port,
            banner: banner.into(),
        }
    }

    #[test]
    fn flags_openssh_banner() {
        let fact = banner(22, "SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.1");
        let findings = BannerDisclosureRule.check(&fact, &[fact.clone()]).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("OpenSSH_8.9p1"));
    }

    #[test]
    fn flags_apache_slash_version() {
        let fact = banner(80, "Server: Apache/2.4.52 (Ubuntu)");
        let findings = BannerDisclosureRule.check(&fact, &[fact.clone()]).unwrap();
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn passes_versionless_banner() {
        let fact = banner(25, "220 mail ready");
        let findings = BannerDisclosureRule.check(&fact, &[fact.clone()]).unwrap();
        assert!(findings.is_empty());
    }
}
