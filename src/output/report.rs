use chrono::Local;

use crate::rules::policy::PolicyVerdict;
use crate::rules::Finding;

/// Render the plain-text intelligence report: a dated summary with one
/// numbered line per finding, prefixed by its check module.
pub fn render(findings: &[Finding], verdict: &PolicyVerdict, target: &str) -> String {
    let mut output = String::new();

    output.push_str("SECURITY REPORT\n");
    output.push_str(&format!("Target: {target}\n"));
    output.push_str(&format!("Date: {}\n", Local::now().format("%Y-%m-%d")));
    output.push_str(&format!(
        "Status: {}\n\n",
        if verdict.pass { "SECURE" } else { "VULNERABLE" }
    ));

    if findings.is_empty() {
        output.push_str("No vulnerabilities detected.\n");
        return output;
    }

    for (i, finding) in findings.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}: {} [{}]\n",
            i + 1,
            finding.category,
            finding.message,
            finding.severity
        ));
    }

    output.push_str(&format!(
        "\n{} finding(s), highest severity: {}\n",
        verdict.effective_findings,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}
