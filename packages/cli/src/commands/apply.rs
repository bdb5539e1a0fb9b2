use super::{display_path, editor_for, read_value, write_value};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::Operation;
use folio_model::{plain, Serializer};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document to edit
    pub document: PathBuf,

    /// JSON array of operations
    pub operations: PathBuf,

    /// Where to write the result (defaults to editing in place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Undo the operations again and check the document is restored
    #[arg(long)]
    pub verify_undo: bool,

    /// Print the resulting document as plain text
    #[arg(short, long)]
    pub print: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let serializer = Serializer::new(config.editor.serializer);
    let document = PathBuf::from(cwd).join(&args.document);
    let operations_path = PathBuf::from(cwd).join(&args.operations);

    let value = read_value(&document, &serializer)?;
    let source = std::fs::read_to_string(&operations_path)
        .with_context(|| format!("Failed to read {}", operations_path.display()))?;
    let operations: Vec<Operation> = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse {}", operations_path.display()))?;
    let count = operations.len();

    let mut editor = editor_for(value, &config)?;
    let before = editor.value().clone();
    editor.edit(|change| change.apply_operations(operations))?;
    tracing::info!(operations = count, "applied");

    println!(
        "  {} Applied {} operation(s) to {}",
        "✓".green(),
        count,
        display_path(&document, cwd)
    );

    if args.verify_undo {
        let after = editor.value().clone();
        while editor.undo()? {}
        if !editor.document().content_eq(&before.document) {
            anyhow::bail!("Undo did not restore the original document");
        }
        while editor.redo()? {}
        if !editor.value().content_eq(&after) {
            anyhow::bail!("Redo did not restore the edited document");
        }
        println!("  {} Undo and redo round-trip", "✓".green());
    }

    let output = args
        .output
        .map(|output| PathBuf::from(cwd).join(output))
        .unwrap_or(document);
    write_value(&output, editor.value(), &serializer)?;
    println!("  {} Wrote {}", "✓".green(), display_path(&output, cwd));

    if args.print {
        println!();
        println!("{}", plain::serialize(editor.document()));
    }

    Ok(())
}
