mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, check, convert, init, normalize, ApplyArgs, CheckArgs, ConvertArgs, InitArgs,
    NormalizeArgs,
};
use tracing_subscriber::EnvFilter;

/// Folio CLI - check, normalize and edit folio documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new folio project
    Init(InitArgs),

    /// Validate documents against the schema
    Check(CheckArgs),

    /// Repair documents that break the schema
    Normalize(NormalizeArgs),

    /// Apply a list of operations to a document
    Apply(ApplyArgs),

    /// Convert between plain text and documents
    Convert(ConvertArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Check(args) => check(args, &cwd),
                Command::Normalize(args) => normalize(args, &cwd),
                Command::Apply(args) => apply(args, &cwd),
                Command::Convert(args) => convert(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
