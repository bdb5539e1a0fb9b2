use super::{display_path, editor_for, read_value, resolve_inputs, write_value};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_model::Serializer;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Document file or directory (defaults to the source directory)
    pub input: Option<PathBuf>,

    /// Write normalized documents back in place
    #[arg(short, long)]
    pub write: bool,

    /// Print normalized documents instead of writing them
    #[arg(long, conflicts_with = "write")]
    pub stdout: bool,
}

pub fn normalize(args: NormalizeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let serializer = Serializer::new(config.editor.serializer);
    let files = resolve_inputs(args.input.as_ref(), &config, cwd)?;

    if !args.stdout {
        println!("{}", "🧹 Normalizing documents...".bright_blue().bold());
        println!();
    }

    let mut changed = 0;
    let mut errors = 0;

    for file in &files {
        let name = display_path(file, cwd);
        let result = read_value(file, &serializer).and_then(|value| {
            let mut editor = editor_for(value.clone(), &config)?;
            editor.normalize_document()?;
            let is_changed = !editor.value().content_eq(&value);
            Ok((editor, is_changed))
        });

        match result {
            Ok((editor, is_changed)) => {
                if args.stdout {
                    println!("{}", serializer.to_string(editor.value())?);
                    continue;
                }
                if !is_changed {
                    println!("  {} {}", "✓".green(), name);
                    continue;
                }
                changed += 1;
                if args.write {
                    write_value(file, editor.value(), &serializer)?;
                    println!("  {} {} {}", "✎".yellow(), name, "(normalized)".dimmed());
                } else {
                    println!("  {} {} {}", "!".yellow(), name, "(needs normalizing)".dimmed());
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("  {} {}: {:#}", "✗".red(), name, e);
            }
        }
    }

    if !args.stdout {
        println!();
        println!(
            "{} {} document(s), {} changed, {} error(s)",
            "📊".bright_white(),
            files.len(),
            changed.to_string().yellow(),
            errors.to_string().red()
        );
        if changed > 0 && !args.write {
            println!("Run with --write to save the changes");
        }
    }

    if errors > 0 {
        anyhow::bail!("Failed to normalize {} document(s)", errors);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_utils::*;

    #[test]
    fn test_normalize_writes_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "docs/a.folio.json", UNNORMALIZED_DOCUMENT);

        normalize(
            NormalizeArgs {
                input: None,
                write: false,
                stdout: false,
            },
            &cwd(&dir),
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), UNNORMALIZED_DOCUMENT);

        normalize(
            NormalizeArgs {
                input: Some(PathBuf::from("docs/a.folio.json")),
                write: true,
                stdout: false,
            },
            &cwd(&dir),
        )
        .unwrap();
        let value = read_value(&file, &Serializer::default()).unwrap();
        let block = &value.document.nodes()[0];
        assert_eq!(block.nodes().len(), 1);
        assert_eq!(block.text(), "hello");
    }

    #[test]
    fn test_unreadable_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/a.folio.json", "[]");
        let result = normalize(
            NormalizeArgs {
                input: None,
                write: true,
                stdout: false,
            },
            &cwd(&dir),
        );
        assert!(result.is_err());
    }
}
