use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::declared::DeclaredRuleSpec;
use crate::rules::policy::Policy;

/// Top-level configuration from `sentinel.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    /// Extra rules declared in config, registered after the built-ins.
    #[serde(default)]
    pub rules: Vec<DeclaredRuleSpec>,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# Sentinel configuration

[policy]
# Minimum severity to fail the assessment (info, warning, critical).
fail_on = "critical"

# Rule IDs to ignore entirely.
# ignore_rules = ["SENTINEL-003"]

# Per-rule severity overrides.
# [policy.overrides]
# "SENTINEL-002" = "info"

# Extra rules, registered after the built-ins. Each rule names the
# fact kind it applies to and the predicate fields for that kind.
# [[rules]]
# id = "db-port-exposed"
# name = "Database Port Exposed"
# applies_to = "open_port"
# severity = "critical"
# message = "A database port is reachable from the scan origin"
# ports = [3306, 5432, 6379, 27017]
"#
    }
}
