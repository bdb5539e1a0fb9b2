pub mod apply;
pub mod check;
pub mod convert;
pub mod init;
pub mod normalize;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use convert::{convert, ConvertArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, NormalizeArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use folio_editor::Editor;
use folio_model::{Serializer, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of document files
pub const DOCUMENT_SUFFIX: &str = ".folio.json";

/// Find all document files in a directory
pub fn find_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(DOCUMENT_SUFFIX))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Documents named by `input` (a file or a directory), or every document
/// under the configured source directory
pub fn resolve_inputs(input: Option<&PathBuf>, config: &Config, cwd: &str) -> Result<Vec<PathBuf>> {
    let input = match input {
        Some(input) if input.is_absolute() => input.clone(),
        Some(input) => PathBuf::from(cwd).join(input),
        None => config.get_src_dir(cwd),
    };

    if input.is_file() {
        Ok(vec![input])
    } else if input.is_dir() {
        Ok(find_documents(&input))
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display())
    }
}

pub fn read_value(path: &Path, serializer: &Serializer) -> Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serializer
        .from_str(&source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value)
}

pub fn write_value(path: &Path, value: &Value, serializer: &Serializer) -> Result<()> {
    let json = serializer.to_string(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Editor for `value` set up from the project config
pub fn editor_for(value: Value, config: &Config) -> Result<Editor> {
    Ok(Editor::with_config(value, config.editor.clone())?)
}

/// Path relative to `cwd` for display
pub fn display_path(path: &Path, cwd: &str) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;

    #[test]
    fn test_find_documents_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.folio.json", VALID_DOCUMENT);
        write(dir.path(), "nested/b.folio.json", VALID_DOCUMENT);
        write(dir.path(), "notes.txt", "hello");
        write(dir.path(), "folio.config.json", "{}");

        let files = find_documents(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.folio.json"));
        assert!(files[1].ends_with("nested/b.folio.json"));
    }

    #[test]
    fn test_resolve_inputs_defaults_to_src_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/a.folio.json", VALID_DOCUMENT);
        let files = resolve_inputs(None, &Config::default(), &cwd(&dir)).unwrap();
        assert_eq!(files.len(), 1);

        let missing = resolve_inputs(Some(&PathBuf::from("nope")), &Config::default(), &cwd(&dir));
        assert!(missing.is_err());
    }
}
