//! Sentinel — rule-based security findings engine.
//!
//! Network, cloud, and web checks under one evaluation contract:
//! scanners produce fact bundles, the engine judges them against a
//! registered rule set, renderers present the ordered findings.
//!
//! # Quick Start
//!
//! ```
//! use sentinel::fact::{Fact, FactBundle};
//! use sentinel::{assess, AssessOptions};
//!
//! let mut bundle = FactBundle::new("10.0.0.5");
//! bundle.facts.push(Fact::OpenPort { port: 22, service: "ssh".into() });
//!
//! let assessment = assess(&bundle, &AssessOptions::default()).unwrap();
//! println!("Pass: {}, Findings: {}", assessment.verdict.pass, assessment.findings.len());
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod fact;
pub mod output;
pub mod rules;
pub mod scanner;

use config::Config;
use error::Result;
use fact::FactBundle;
use output::OutputFormat;
use rules::policy::PolicyVerdict;
use rules::{Engine, Finding};

/// Options for an assessment invocation.
#[derive(Debug, Clone)]
pub struct AssessOptions {
    /// Path to config file (defaults to `sentinel.toml` in the working
    /// directory).
    pub config_path: Option<std::path::PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for the fail_on threshold.
    pub fail_on_override: Option<rules::Severity>,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            fail_on_override: None,
        }
    }
}

/// Complete assessment of one fact bundle.
#[derive(Debug)]
pub struct Assessment {
    pub target: String,
    pub findings: Vec<Finding>,
    pub verdict: PolicyVerdict,
}

/// Build the engine from config: built-in rules first, then any rules
/// declared in config, in declaration order.
///
/// Fails fast on a duplicate or invalid declaration so rule-set
/// mistakes surface at startup, not mid-assessment.
pub fn build_engine(config: &Config) -> Result<Engine> {
    let mut engine = Engine::new();
    for spec in &config.rules {
        engine.register(Box::new(spec.compile()?))?;
    }
    tracing::debug!(rules = engine.len(), "engine ready");
    Ok(engine)
}

/// Run a complete assessment: load config, build the rule set,
/// evaluate the bundle, apply policy.
pub fn assess(bundle: &FactBundle, options: &AssessOptions) -> Result<Assessment> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("sentinel.toml"));
    let mut config = Config::load(&config_path)?;

    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }

    let engine = build_engine(&config)?;
    let all_findings = engine.evaluate(&bundle.facts);

    let effective_findings = config.policy.apply(&all_findings);
    let verdict = config.policy.evaluate(&all_findings);

    Ok(Assessment {
        target: bundle.target.clone(),
        findings: effective_findings,
        verdict,
    })
}

/// Render an assessment in the specified format.
pub fn render_report(assessment: &Assessment, format: OutputFormat) -> Result<String> {
    output::render(
        &assessment.findings,
        &assessment.verdict,
        format,
        &assessment.target,
    )
}
