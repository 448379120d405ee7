use crate::error::Result;
use crate::rules::{Finding, Severity};

use serde_json::{json, Value};
use uuid::Uuid;

/// Render findings as SARIF 2.1.0.
///
/// Produces a self-contained SARIF log compatible with GitHub Code
/// Scanning and other SARIF consumers. Findings have no source
/// location; the triggering facts travel in result properties.
pub fn render(findings: &[Finding], target: &str) -> Result<String> {
    let rules: Vec<Value> = findings
        .iter()
        .map(|f| &f.rule_id)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .filter_map(|rule_id| findings.iter().find(|f| &f.rule_id == rule_id))
        .map(|finding| {
            json!({
                "id": finding.rule_id,
                "name": finding.rule_name,
                "shortDescription": { "text": finding.rule_name },
                "defaultConfiguration": {
                    "level": severity_to_sarif_level(finding.severity),
                },
                "properties": {
                    "tags": [finding.category.to_string()],
                },
            })
        })
        .collect();

    let results: Vec<Value> = findings
        .iter()
        .map(|f| {
            let mut result = json!({
                "ruleId": f.rule_id,
                "level": severity_to_sarif_level(f.severity),
                "message": { "text": f.message },
                "properties": {
                    "evidence": serde_json::to_value(&f.evidence)?,
                },
            });

            if let Some(remediation) = &f.remediation {
                result["fixes"] = json!([{
                    "description": { "text": remediation },
                }]);
            }

            Ok(result)
        })
        .collect::<Result<_>>()?;

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "Sentinel",
                    "informationUri": "https://github.com/sentinel-sec/sentinel",
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "results": results,
            "automationDetails": {
                "id": format!("sentinel/{}", target),
                "guid": Uuid::new_v4().to_string(),
            },
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}
