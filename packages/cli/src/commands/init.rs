use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_editor::DEFAULT_CONFIG_NAME;
use folio_model::{plain, Serializer};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory scanned for documents
    #[arg(short, long, default_value = "docs")]
    pub src_dir: String,

    /// Block type new blocks default to
    #[arg(short, long, default_value = "paragraph")]
    pub default_block: String,

    /// Replace an existing folio.json
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Refuse to clobber an existing config
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing folio project...".bright_blue().bold());

    // Document directory
    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let mut config = Config::default();
    config.src_dir = args.src_dir.clone();
    config.editor.default_block = args.default_block.clone();

    // Seed one sample document
    let example_file = src_dir.join("example.folio.json");
    if !example_file.exists() {
        let value = plain::deserialize(
            "Welcome to folio.\nEach line becomes a block.",
            &config.editor.default_block,
        );
        let json = Serializer::new(config.editor.serializer).to_string(&value)?;
        fs::write(&example_file, json)?;
        println!("  {} Created example.folio.json", "✓".green());
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/example.folio.json", args.src_dir);
    println!("  2. Run: folio check");
    println!("  3. Run: folio normalize --write");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_utils::cwd;

    fn args(force: bool) -> InitArgs {
        InitArgs {
            src_dir: "docs".to_string(),
            default_block: "line".to_string(),
            force,
        }
    }

    #[test]
    fn test_init_writes_config_and_example() {
        let dir = tempfile::tempdir().unwrap();
        init(args(false), &cwd(&dir)).unwrap();

        let config = Config::load(&cwd(&dir)).unwrap();
        assert_eq!(config.src_dir, "docs");
        assert_eq!(config.editor.default_block, "line");

        let example = dir.path().join("docs/example.folio.json");
        let source = fs::read_to_string(example).unwrap();
        let value = Serializer::default().from_str(&source).unwrap();
        assert_eq!(value.document.nodes().len(), 2);
        assert_eq!(value.document.nodes()[0].node_type(), Some("line"));
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "srcDir": "mine" }"#).unwrap();

        init(args(false), &cwd(&dir)).unwrap();
        assert_eq!(Config::load(&cwd(&dir)).unwrap().src_dir, "mine");

        init(args(true), &cwd(&dir)).unwrap();
        assert_eq!(Config::load(&cwd(&dir)).unwrap().src_dir, "docs");
    }
}
