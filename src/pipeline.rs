//! Pipeline Module
//!
//! The single run boundary. Passes run in a fixed order on a private
//! [`CompileContext`]:
//!
//! 1. validate input files
//! 2. classify every id'd node
//! 3. group atoms by signature
//! 4. extract design tokens
//! 5. emit the command stream
//! 6. assemble components, summarize, fingerprint
//!
//! Anything unrecoverable, including a panic inside a pass, ends the run as
//! `{success: false, error}`.

use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::classify::classify_files;
use crate::component::{assemble_components, ComponentArtifact};
use crate::context::CompileContext;
use crate::document::{LibraryFile, Settings};
use crate::emit::{emit_library, CreationCommand};
use crate::finalize::{compute_fingerprint, summarize, CompileSummary};
use crate::signature::group_duplicates;
use crate::tokens::{extract_tokens, TokenTable};
use crate::validate::{
    validate_files, CompilerError, CompilerWarning, Diagnostics, ERR_INTERNAL, ERR_INVALID_INPUT,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(flatten)]
    pub summary: Option<CompileSummary>,
    pub commands: Vec<CreationCommand>,
    pub components: Vec<ComponentArtifact>,
    pub tokens: TokenTable,
    pub warnings: Vec<CompilerWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl CompileOutput {
    pub fn failure(error: CompilerError) -> Self {
        log::error!("{}", error);
        Self {
            success: false,
            error: Some(error.message),
            error_code: Some(error.code),
            summary: None,
            commands: Vec::new(),
            components: Vec::new(),
            tokens: TokenTable::default(),
            warnings: Vec::new(),
            fingerprint: None,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "compile pass panicked".to_string()
    }
}

fn run(files: &[LibraryFile], settings: &Settings) -> Result<CompileOutput, CompilerError> {
    let mut diagnostics = Diagnostics::new();
    validate_files(files, &mut diagnostics)?;

    let mut ctx = CompileContext::new();
    let sources = classify_files(files, &mut ctx, &mut diagnostics);

    let (groups, group_of_atom) = group_duplicates(&ctx.atoms);
    ctx.set_groups(groups, group_of_atom);

    if settings.generate_tokens {
        ctx.tokens = extract_tokens(&ctx.atoms);
    }

    let emission = emit_library(files, &sources, &ctx, settings, &mut diagnostics);
    let components = assemble_components(&ctx, &emission, settings);
    let summary = summarize(&ctx, &components, &ctx.tokens);

    let fingerprint = compute_fingerprint(&emission.commands, &components, &ctx.tokens)
        .map_err(|e| CompilerError::new(ERR_INTERNAL, format!("Failed to fingerprint output: {}", e)))?;

    log::info!(
        "compiled {} files: {} commands, {} components, {} warnings",
        files.len(),
        emission.commands.len(),
        components.len(),
        diagnostics.len()
    );

    Ok(CompileOutput {
        success: true,
        error: None,
        error_code: None,
        summary: Some(summary),
        commands: emission.commands,
        components,
        tokens: std::mem::take(&mut ctx.tokens),
        warnings: diagnostics.into_vec(),
        fingerprint: Some(fingerprint),
    })
}

/// Compiles a file collection into a component library.
pub fn compile_library(files: &[LibraryFile], settings: &Settings) -> CompileOutput {
    match panic::catch_unwind(AssertUnwindSafe(|| run(files, settings))) {
        Ok(Ok(output)) => output,
        Ok(Err(error)) => CompileOutput::failure(error),
        Err(payload) => CompileOutput::failure(CompilerError::new(
            ERR_INTERNAL,
            panic_message(payload),
        )),
    }
}

/// JSON boundary used by JS hosts. A blank settings string means defaults.
/// Always returns a serialized [`CompileOutput`].
pub fn compile_library_json(files_json: &str, settings_json: &str) -> String {
    let output = match parse_request(files_json, settings_json) {
        Ok((files, settings)) => compile_library(&files, &settings),
        Err(error) => CompileOutput::failure(error),
    };
    serde_json::to_string(&output).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"error":"Failed to serialize output: {}"}}"#,
            e.to_string().replace('"', "'")
        )
    })
}

fn parse_request(
    files_json: &str,
    settings_json: &str,
) -> Result<(Vec<LibraryFile>, Settings), CompilerError> {
    let files: Vec<LibraryFile> = serde_json::from_str(files_json).map_err(|e| {
        CompilerError::new(ERR_INVALID_INPUT, format!("Invalid files JSON: {}", e))
    })?;
    let settings = if settings_json.trim().is_empty() {
        Settings::default()
    } else {
        serde_json::from_str(settings_json).map_err(|e| {
            CompilerError::new(ERR_INVALID_INPUT, format!("Invalid settings JSON: {}", e))
        })?
    };
    Ok((files, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ERR_NO_FILES;

    #[test]
    fn test_empty_file_list_fails() {
        let output = compile_library(&[], &Settings::default());
        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("No SVG files provided for processing"));
        assert_eq!(output.error_code.as_deref(), Some(ERR_NO_FILES));
        assert!(output.commands.is_empty());
    }

    #[test]
    fn test_json_boundary() {
        let files = r##"[{"name": "a.svg", "structure": {"components": [
            {"element": {"tag": "rect", "id": "chip", "attributes": {"width": "20", "height": "10", "fill": "#fff"}}}
        ]}}]"##;
        let value: serde_json::Value =
            serde_json::from_str(&compile_library_json(files, "")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["atomsCreated"], 1);
        assert_eq!(value["tokensExtracted"], 3);
        assert_eq!(value["tokens"]["colors"]["color-white"], "#fff");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_panic_payloads_become_messages() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(7_u8)), "compile pass panicked");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let value: serde_json::Value =
            serde_json::from_str(&compile_library_json("{", "{}")).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["errorCode"], ERR_INVALID_INPUT);
        assert!(value.get("atomsCreated").is_none());
    }
}
