use crate::rules::policy::PolicyVerdict;
use crate::rules::{Finding, Severity};

/// Render findings as console text. Findings arrive already ordered by
/// the engine (severity desc, registration order); rendering preserves
/// that order.
pub fn render(findings: &[Finding], verdict: &PolicyVerdict, target: &str) -> String {
    let mut output = String::new();

    if findings.is_empty() {
        output.push_str(&format!("\n  {target}: No vulnerabilities detected.\n\n"));
        return output;
    }

    output.push_str(&format!(
        "\n  {} finding(s) for {}:\n\n",
        findings.len(),
        target
    ));

    for finding in findings {
        let severity_tag = match finding.severity {
            Severity::Critical => "[CRITICAL]",
            Severity::Warning => "[WARNING] ",
            Severity::Info => "[INFO]    ",
        };

        output.push_str(&format!(
            "  {} {} ({}) {}\n",
            severity_tag, finding.rule_id, finding.category, finding.message
        ));
        if let Some(remediation) = &finding.remediation {
            output.push_str(&format!("           fix: {}\n", remediation));
        }
        output.push('\n');
    }

    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n\n",
        status,
        verdict.fail_threshold,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}
