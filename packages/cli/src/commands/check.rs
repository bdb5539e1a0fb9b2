use super::{display_path, editor_for, read_value, resolve_inputs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_model::Serializer;
use folio_schema::Violation;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Document file or directory (defaults to the source directory)
    pub input: Option<PathBuf>,

    /// Print each violation's layer and rule
    #[arg(short, long)]
    pub verbose: bool,

    /// Report as text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Result of checking one document
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub violations: Vec<Violation>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.violations.is_empty()
    }
}

/// Validate documents against the configured schema
pub fn check_files(files: &[PathBuf], config: &Config, cwd: &str) -> Result<Vec<FileReport>> {
    let serializer = Serializer::new(config.editor.serializer);
    let mut reports = Vec::new();

    for file in files {
        let name = display_path(file, cwd);
        let report = match read_value(file, &serializer) {
            Ok(value) => {
                let editor = editor_for(value, config)?;
                let violations = editor.schema().validate_all(editor.document());
                tracing::debug!(file = %name, violations = violations.len(), "checked");
                FileReport {
                    file: name,
                    error: None,
                    violations,
                }
            }
            Err(e) => FileReport {
                file: name,
                error: Some(format!("{:#}", e)),
                violations: Vec::new(),
            },
        };
        reports.push(report);
    }

    Ok(reports)
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let files = resolve_inputs(args.input.as_ref(), &config, cwd)?;
    let reports = check_files(&files, &config, cwd)?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
        "text" => print_text(&reports, args.verbose),
        other => anyhow::bail!("Invalid format: {}. Use: text or json", other),
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} document(s) failed the schema check", failed, reports.len());
    }
    Ok(())
}

fn print_text(reports: &[FileReport], verbose: bool) {
    println!("{}", "🔍 Checking documents...".bright_blue().bold());
    println!();

    for report in reports {
        if let Some(error) = &report.error {
            println!("  {} {}", "✗".red(), report.file);
            println!("    {}", error.red());
            continue;
        }
        if report.violations.is_empty() {
            println!("  {} {}", "✓".green(), report.file);
            continue;
        }
        println!("  {} {}", "✗".red(), report.file);
        for violation in &report.violations {
            println!("    {} {}", "•".yellow(), violation);
            if verbose {
                println!(
                    "      {}",
                    format!("layer: {}, rule: {}", violation.layer, violation.rule).dimmed()
                );
            }
        }
    }

    let ok = reports.iter().filter(|r| r.is_ok()).count();
    println!();
    println!(
        "{} {} passed, {} failed",
        "📊".bright_white(),
        ok.to_string().green(),
        (reports.len() - ok).to_string().red()
    );
}
