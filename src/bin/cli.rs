use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sentinel::command::Command;
use sentinel::config::Config;
use sentinel::error::SentinelError;
use sentinel::output::OutputFormat;
use sentinel::rules::Severity;
use sentinel::scanner::{self, RecordedScanner, Scanner};
use sentinel::AssessOptions;

#[derive(Parser)]
#[command(
    name = "sentinel",
    about = "Rule-based security findings engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a recorded fact bundle against the rule set
    Evaluate {
        /// Path to the fact bundle JSON file
        facts: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif, report)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (info, warning, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Parse an analyst console command and run it against a recorded
    /// fact bundle
    Analyze {
        /// The command line, e.g. "scan 10.0.0.5" or "cloud audit prod-env"
        input: String,

        /// Path to the fact bundle JSON file serving the scan
        #[arg(long)]
        facts: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, sarif, report)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (info, warning, critical)
        #[arg(long)]
        fail_on: Option<String>,
    },

    /// List all available rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,

        /// Config file path (declared rules are listed too)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Generate a starter sentinel.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            facts,
            config,
            format,
            fail_on,
            output,
        } => cmd_evaluate(facts, config, format, fail_on, output),
        Commands::Analyze {
            input,
            facts,
            config,
            format,
            fail_on,
        } => cmd_analyze(input, facts, config, format, fail_on),
        Commands::ListRules { format, config } => cmd_list_rules(format, config),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn parse_format(format_str: &str) -> OutputFormat {
    OutputFormat::from_str_lenient(format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    })
}

fn parse_fail_on(fail_on_str: Option<String>) -> Option<Severity> {
    fail_on_str.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    })
}

fn cmd_evaluate(
    facts: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    fail_on_str: Option<String>,
    output_path: Option<PathBuf>,
) -> Result<i32, SentinelError> {
    let format = parse_format(&format_str);
    let options = AssessOptions {
        config_path: config,
        format,
        fail_on_override: parse_fail_on(fail_on_str),
    };

    let bundle = scanner::load_bundle(&facts)?;
    let assessment = sentinel::assess(&bundle, &options)?;
    let rendered = sentinel::render_report(&assessment, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = findings above threshold
    Ok(if assessment.verdict.pass { 0 } else { 1 })
}

fn cmd_analyze(
    input: String,
    facts: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    fail_on_str: Option<String>,
) -> Result<i32, SentinelError> {
    let command = Command::parse(&input);
    let (Some(capability), Some(target)) = (command.capability(), command.target()) else {
        eprintln!(
            "Unknown command '{}'. Try 'scan <target>', 'cloud audit <profile>', \
             or 'web inspect <url>'.",
            input
        );
        return Ok(2);
    };

    let scanners: Vec<Box<dyn Scanner>> = vec![Box::new(RecordedScanner::new(capability, facts))];
    let bundle = scanner::scanner_for(&scanners, capability)?.produce_facts(&target)?;

    let format = parse_format(&format_str);
    let options = AssessOptions {
        config_path: config,
        format,
        fail_on_override: parse_fail_on(fail_on_str),
    };

    let assessment = sentinel::assess(&bundle, &options)?;
    let rendered = sentinel::render_report(&assessment, format)?;
    print!("{}", rendered);

    Ok(if assessment.verdict.pass { 0 } else { 1 })
}

fn cmd_list_rules(format_str: String, config: Option<PathBuf>) -> Result<i32, SentinelError> {
    let config = Config::load(&config.unwrap_or_else(|| PathBuf::from("sentinel.toml")))?;
    let engine = sentinel::build_engine(&config)?;
    let rules = engine.list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<14} {:<30} {:<10} CATEGORY",
                "ID", "NAME", "SEVERITY"
            );
            println!("{}", "-".repeat(70));
            for rule in &rules {
                println!(
                    "{:<14} {:<30} {:<10} {}",
                    rule.id,
                    rule.name,
                    rule.severity.to_string(),
                    rule.category,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, SentinelError> {
    let path = PathBuf::from("sentinel.toml");

    if path.exists() && !force {
        eprintln!("sentinel.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created sentinel.toml");

    Ok(0)
}
