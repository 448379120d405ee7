pub mod console;
pub mod json;
pub mod report;
pub mod sarif;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::policy::PolicyVerdict;
use crate::rules::Finding;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Sarif,
    Report,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            "report" => Some(Self::Report),
            _ => None,
        }
    }
}

/// Render findings into the specified format.
pub fn render(
    findings: &[Finding],
    verdict: &PolicyVerdict,
    format: OutputFormat,
    target: &str,
) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(findings, verdict, target)),
        OutputFormat::Json => json::render(findings, verdict, target),
        OutputFormat::Sarif => sarif::render(findings, target),
        OutputFormat::Report => Ok(report::render(findings, verdict, target)),
    }
}
