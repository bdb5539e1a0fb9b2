use super::{display_path, read_value, write_value, DOCUMENT_SUFFIX};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_model::{plain, Serializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// A plain-text file to import, or a document to export as plain text
    pub input: PathBuf,

    /// Output file (defaults to the input with its extension swapped)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Block type for imported lines (defaults to the configured block)
    #[arg(short, long)]
    pub block: Option<String>,
}

/// Conversion direction, picked from the input file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Import,
    Export,
}

fn direction(input: &Path) -> Direction {
    if input.to_string_lossy().ends_with(DOCUMENT_SUFFIX) {
        Direction::Export
    } else {
        Direction::Import
    }
}

fn default_output(input: &Path, direction: Direction) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = match direction {
        Direction::Export => name.trim_end_matches(DOCUMENT_SUFFIX).to_string(),
        Direction::Import => input
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or(name),
    };
    let file_name = match direction {
        Direction::Export => format!("{}.txt", stem),
        Direction::Import => format!("{}{}", stem, DOCUMENT_SUFFIX),
    };
    input.with_file_name(file_name)
}

pub fn convert(args: ConvertArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let serializer = Serializer::new(config.editor.serializer);
    let input = PathBuf::from(cwd).join(&args.input);
    let direction = direction(&input);
    let output = match args.output {
        Some(output) => PathBuf::from(cwd).join(output),
        None => default_output(&input, direction),
    };

    match direction {
        Direction::Import => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let block = args.block.as_deref().unwrap_or(&config.editor.default_block);
            let value = plain::deserialize(&text, block);
            write_value(&output, &value, &serializer)?;
        }
        Direction::Export => {
            let value = read_value(&input, &serializer)?;
            std::fs::write(&output, plain::serialize(&value.document))
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
    }

    println!(
        "  {} {} → {}",
        "✓".green(),
        display_path(&input, cwd),
        display_path(&output, cwd)
    );
    Ok(())
}
