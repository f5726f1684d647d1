//! Discovery Module
//!
//! Recursively scans a directory for design files: `.svg` markup is parsed,
//! `.json` holds one serialized file record or an array of them. Files that
//! cannot be read or parsed are reported and skipped.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::document::LibraryFile;
use crate::parse::parse_svg_document;
use crate::validate::{CompilerWarning, WARN_DISCOVERY};

#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<LibraryFile>,
    pub warnings: Vec<CompilerWarning>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonRecord {
    Many(Vec<LibraryFile>),
    One(LibraryFile),
}

/// Candidate files in file-name order, so discovery is reproducible.
fn find_design_files(dir: &Path, warnings: &mut Vec<CompilerWarning>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warnings.push(CompilerWarning::new(WARN_DISCOVERY, e.to_string()));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("json") => {
                files.push(path.to_path_buf())
            }
            _ => {}
        }
    }

    files
}

fn display_name(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn load_file(base: &Path, path: &Path) -> Result<Vec<LibraryFile>, String> {
    let source = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    let name = display_name(base, path);

    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        return parse_svg_document(&source, &name)
            .map(|file| vec![file])
            .map_err(|e| e.message);
    }

    match serde_json::from_str::<JsonRecord>(&source) {
        Ok(JsonRecord::Many(files)) => Ok(files),
        Ok(JsonRecord::One(file)) => Ok(vec![file]),
        Err(e) => Err(format!("Invalid file record: {}", e)),
    }
}

/// Loads every design file below `dir`. A missing directory yields nothing.
pub fn discover_library_files(dir: &Path) -> Discovered {
    let mut discovered = Discovered::default();
    if !dir.exists() {
        log::warn!("discovery directory {:?} does not exist", dir);
        return discovered;
    }

    for path in find_design_files(dir, &mut discovered.warnings) {
        match load_file(dir, &path) {
            Ok(files) => discovered.files.extend(files),
            Err(message) => {
                let warning = CompilerWarning::new(WARN_DISCOVERY, message)
                    .in_file(display_name(dir, &path));
                log::warn!("{}", warning);
                discovered.warnings.push(warning);
            }
        }
    }

    log::info!(
        "discovered {} design files in {:?}",
        discovered.files.len(),
        dir
    );
    discovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discovers_svg_and_json_in_name_order() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("b.svg"),
            r#"<svg><rect id="chip" width="20" height="10"/></svg>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"name": "cards", "structure": {"components": []}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("nested").join("c.svg"),
            r#"<svg><circle id="dot" r="3"/></svg>"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let discovered = discover_library_files(dir.path());
        let names: Vec<&str> = discovered.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["cards", "b.svg", "nested/c.svg"]);
        assert!(discovered.warnings.is_empty());
    }

    #[test]
    fn test_broken_files_are_skipped_with_warning() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("empty.svg"), "<p>no drawing</p>").unwrap();
        fs::write(
            dir.path().join("many.json"),
            r#"[{"name": "one"}, {"name": "two"}]"#,
        )
        .unwrap();

        let discovered = discover_library_files(dir.path());
        assert_eq!(discovered.files.len(), 2);
        assert_eq!(discovered.warnings.len(), 2);
        assert!(discovered.warnings.iter().all(|w| w.code == WARN_DISCOVERY));
        assert_eq!(discovered.warnings[0].file.as_deref(), Some("broken.json"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let discovered = discover_library_files(Path::new("/definitely/not/here"));
        assert!(discovered.files.is_empty());
    }
}
