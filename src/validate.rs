//! Diagnostics for the component compiler.
//!
//! Fatal problems end a run as a [`CompilerError`]; everything else is a
//! [`CompilerWarning`] recorded on the run and logged, and processing
//! continues with the affected node left as it was.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::LibraryFile;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_NO_FILES: &str = "SVGC-E001";
pub const ERR_INTERNAL: &str = "SVGC-E002";
pub const ERR_PARSE: &str = "SVGC-E003";
pub const ERR_INVALID_INPUT: &str = "SVGC-E004";

pub const WARN_MISSING_STRUCTURE: &str = "SVGC-W001";
pub const WARN_MISSING_ELEMENT: &str = "SVGC-W002";
pub const WARN_MALFORMED_NUMBER: &str = "SVGC-W003";
pub const WARN_UNSUPPORTED_TAG: &str = "SVGC-W004";
pub const WARN_DUPLICATE_ID: &str = "SVGC-W005";
pub const WARN_HOST_CALL: &str = "SVGC-W006";
pub const WARN_DISCOVERY: &str = "SVGC-W007";

fn describe(code: &str) -> &'static str {
    match code {
        ERR_NO_FILES => "A run needs at least one file.",
        ERR_INTERNAL => "An unrecoverable fault escaped a compile pass.",
        ERR_PARSE => "Source markup could not be parsed.",
        ERR_INVALID_INPUT => "Input JSON does not match the expected shape.",
        WARN_MISSING_STRUCTURE => "Files without a component structure are skipped.",
        WARN_MISSING_ELEMENT => "Component entries without an element are skipped.",
        WARN_MALFORMED_NUMBER => "Malformed numeric attributes fall back to their default.",
        WARN_UNSUPPORTED_TAG => "Elements with unsupported tags are not materialized.",
        WARN_DUPLICATE_ID => "The first node registered under an id answers id lookups.",
        WARN_HOST_CALL => "A failed host call leaves the node in its last applied state.",
        WARN_DISCOVERY => "Unreadable files found during discovery are skipped.",
        _ => "Unknown diagnostic.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub message: String,
    pub file: Option<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            file: None,
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn guarantee(&self) -> &'static str {
        describe(&self.code)
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "[{}] {} ({})", self.code, self.message, file),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER WARNING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerWarning {
    pub code: String,
    pub message: String,
    pub file: Option<String>,
    pub node: Option<String>,
}

impl CompilerWarning {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            file: None,
            node: None,
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn at_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn guarantee(&self) -> &'static str {
        describe(&self.code)
    }
}

impl fmt::Display for CompilerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(node) = &self.node {
            write!(f, " at '{}'", node)?;
        }
        if let Some(file) = &self.file {
            write!(f, " in {}", file)?;
        }
        Ok(())
    }
}

/// Collects warnings for one run and mirrors each one to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<CompilerWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: CompilerWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn as_slice(&self) -> &[CompilerWarning] {
        &self.warnings
    }

    pub fn into_vec(self) -> Vec<CompilerWarning> {
        self.warnings
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Rejects runs that cannot produce anything and reports files that will be
/// skipped. Per-entry problems are reported by the classification pass.
pub fn validate_files(
    files: &[LibraryFile],
    diagnostics: &mut Diagnostics,
) -> Result<(), CompilerError> {
    if files.is_empty() {
        return Err(CompilerError::new(
            ERR_NO_FILES,
            "No SVG files provided for processing",
        ));
    }

    for file in files {
        let has_components = file
            .structure
            .as_ref()
            .map(|s| !s.components.is_empty())
            .unwrap_or(false);
        if !has_components {
            diagnostics.warn(
                CompilerWarning::new(
                    WARN_MISSING_STRUCTURE,
                    "file has no structure data or an empty components array",
                )
                .in_file(&file.name),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ComponentEntry, ElementNode, FileStructure};

    #[test]
    fn test_empty_run_is_fatal() {
        let mut diagnostics = Diagnostics::new();
        let err = validate_files(&[], &mut diagnostics).unwrap_err();
        assert_eq!(err.code, ERR_NO_FILES);
        assert!(err.to_string().contains("No SVG files"));
    }

    #[test]
    fn test_file_without_structure_warns() {
        let files = vec![
            LibraryFile {
                name: "empty.svg".to_string(),
                structure: None,
            },
            LibraryFile {
                name: "ok.svg".to_string(),
                structure: Some(FileStructure {
                    components: vec![ComponentEntry {
                        id: None,
                        element: Some(ElementNode::new("rect")),
                    }],
                }),
            },
        ];
        let mut diagnostics = Diagnostics::new();
        validate_files(&files, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.as_slice()[0].code, WARN_MISSING_STRUCTURE);
        assert_eq!(diagnostics.as_slice()[0].file.as_deref(), Some("empty.svg"));
    }

    #[test]
    fn test_warning_display() {
        let warning = CompilerWarning::new(WARN_MALFORMED_NUMBER, "width 'abc' is not a number")
            .at_node("btn")
            .in_file("a.svg");
        assert_eq!(
            warning.to_string(),
            "[SVGC-W003] width 'abc' is not a number at 'btn' in a.svg"
        );
        assert!(warning.guarantee().contains("default"));
    }
}
