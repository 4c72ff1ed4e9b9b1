//! citeaudit - citation audit and verification CLI
//!
//! ## Commands
//!
//! - `audit`: run the full pipeline over an extracted-citations JSON file
//! - `rules`: print the style rule table
//! - `observe`: scan a plain-text file for style violations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use citeaudit_core::{
    detect_styles_in_text, AuditConfig, AuditReport, AuditRequest, CitationAuditor, CitationFlag,
    CitationStyle, PatternObserver, StyleRuleConfig, StyleRuleRegistry,
};

#[derive(Parser)]
#[command(name = "citeaudit")]
#[command(version = citeaudit_core::VERSION)]
#[command(about = "Citation audit and verification", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit an extracted document (AuditRequest JSON) against live registries
    Audit {
        /// Path to the AuditRequest JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long, env = "CITEAUDIT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the style rule table as JSON
    Rules {
        /// Only this style (aliases accepted)
        #[arg(short, long)]
        style: Option<String>,

        /// TOML configuration file (for `rules_path`)
        #[arg(short, long, env = "CITEAUDIT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Scan a plain-text file for inline style violations
    Observe {
        /// Declared citation style
        #[arg(short, long)]
        style: String,

        /// Plain-text document to scan
        #[arg(short, long)]
        text: PathBuf,

        /// TOML configuration file (for `rules_path`)
        #[arg(short, long, env = "CITEAUDIT_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    citeaudit_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Audit {
            input,
            output,
            config,
        } => cmd_audit(&input, output.as_deref(), config.as_deref()).await,
        Commands::Rules { style, config } => cmd_rules(style.as_deref(), config.as_deref()),
        Commands::Observe {
            style,
            text,
            config,
        } => cmd_observe(&style, &text, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<AuditConfig> {
    let config = AuditConfig::load_or_default(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to build default config".to_string(),
    })?;
    Ok(config)
}

fn read_request(path: &Path) -> Result<AuditRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a valid audit request", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn run_audit(auditor: &CitationAuditor, input: &Path) -> Result<AuditReport> {
    let request = read_request(input)?;
    let report = auditor.audit(&request).await.context("Audit rejected")?;
    Ok(report)
}

async fn cmd_audit(input: &Path, output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let auditor = CitationAuditor::from_config(&config).context("Failed to set up providers")?;
    let report = run_audit(&auditor, input).await?;
    info!(
        audit_id = %report.audit_id,
        total_score = report.integrity_index.total_score,
        flags = report.flags.len(),
        "audit complete"
    );
    write_json(&report, output)
}

fn rules_table<'a>(registry: &'a StyleRuleRegistry, style: Option<&str>) -> Vec<&'a StyleRuleConfig> {
    match style {
        Some(id) => vec![registry.get_rules(id)],
        None => registry.styles().collect(),
    }
}

fn cmd_rules(style: Option<&str>, config: Option<&Path>) -> Result<()> {
    let registry = load_config(config)?
        .rule_registry()
        .context("Failed to load style rules")?;
    write_json(&rules_table(&registry, style), None)
}

#[derive(Debug, Serialize)]
struct ObserveOutput {
    style: CitationStyle,
    flags: Vec<CitationFlag>,
    detected_styles: Vec<CitationStyle>,
}

fn observe_text(registry: Arc<StyleRuleRegistry>, style: &str, text: &str) -> ObserveOutput {
    let style = registry.resolve_style(style);
    let observer = PatternObserver::new(registry);
    let mut flags = observer.observe(text, style);
    flags.extend(observer.detect_mixed_styles(text));
    ObserveOutput {
        style,
        flags,
        detected_styles: detect_styles_in_text(text),
    }
}

fn cmd_observe(style: &str, text_path: &Path, config: Option<&Path>) -> Result<()> {
    let registry = load_config(config)?
        .rule_registry()
        .context("Failed to load style rules")?;
    let text = std::fs::read_to_string(text_path)
        .with_context(|| format!("Failed to read {}", text_path.display()))?;
    write_json(&observe_text(Arc::new(registry), style, &text), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeaudit_core::{ExistenceStatus, ExternalVerificationService, VerificationConfig};
    use scholar_registry::fakes::{StaticRegistry, StaticSearch};
    use scholar_registry::SearchAggregator;
    use std::time::Duration;

    fn offline_auditor() -> CitationAuditor {
        let verifier = ExternalVerificationService::new(
            Arc::new(StaticRegistry::new()),
            SearchAggregator::new(
                vec![Arc::new(StaticSearch::new("openalex", vec![]))],
                Duration::from_secs(1),
            ),
            VerificationConfig::default(),
        );
        CitationAuditor::new(Arc::new(StyleRuleRegistry::builtin()), verifier)
    }

    #[test]
    fn test_cli_parses_audit_command() {
        let cli = Cli::try_parse_from([
            "citeaudit", "--json", "audit", "--input", "req.json", "--output", "out.json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Audit { input, output, .. } => {
                assert_eq!(input, PathBuf::from("req.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected audit command"),
        }
    }

    #[tokio::test]
    async fn test_run_audit_reads_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("request.json");
        std::fs::write(
            &input,
            r#"{
                "style": "ieee",
                "inline_patterns": [
                    {"pattern_type": "author_year", "text": "(Jones, 2019a)", "start": 10, "end": 24}
                ],
                "reference_list": null
            }"#,
        )
        .unwrap();

        let report = run_audit(&offline_auditor(), &input).await.unwrap();

        assert_eq!(report.flags.len(), 1);
        assert_eq!(report.verification_results[0].existence, ExistenceStatus::NotFound);

        let out = dir.path().join("report.json");
        write_json(&report, Some(&out)).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["style"], "ieee");
        assert_eq!(written["integrity_index"]["reference_score"], 0.0);
    }

    #[tokio::test]
    async fn test_run_audit_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        std::fs::write(&input, "{ not json").unwrap();

        let err = run_audit(&offline_auditor(), &input).await.unwrap_err();
        assert!(format!("{err:#}").contains("not a valid audit request"));
    }

    #[test]
    fn test_rules_table_filters_by_style() {
        let registry = StyleRuleRegistry::builtin();
        assert_eq!(rules_table(&registry, None).len(), 4);
        let only = rules_table(&registry, Some("Chicago"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].style, CitationStyle::Chicago);
    }

    #[test]
    fn test_observe_text_combines_flags_and_detection() {
        let out = observe_text(
            Arc::new(StyleRuleRegistry::builtin()),
            "ieee",
            "Prior work [1] disagrees with (Smith, 2020).",
        );
        assert_eq!(out.style, CitationStyle::Ieee);
        assert_eq!(out.flags.len(), 2);
        assert_eq!(out.detected_styles, vec![CitationStyle::Apa, CitationStyle::Ieee]);
    }
}
