//! Finalize Module
//!
//! Run summary counts and the determinism fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::component::ComponentArtifact;
use crate::context::{CompileContext, Tier};
use crate::emit::CreationCommand;
use crate::tokens::TokenTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileSummary {
    /// Atom components, one per duplicate group.
    pub atoms_created: usize,
    pub molecules_created: usize,
    pub organisms_created: usize,
    pub tokens_extracted: usize,
    /// Groups with more than one member.
    pub duplicate_groups: usize,
}

pub fn summarize(
    ctx: &CompileContext,
    components: &[ComponentArtifact],
    tokens: &TokenTable,
) -> CompileSummary {
    CompileSummary {
        atoms_created: components.len(),
        molecules_created: ctx.count_tier(Tier::Molecule),
        organisms_created: ctx.count_tier(Tier::Organism),
        tokens_extracted: tokens.len(),
        duplicate_groups: ctx.groups.iter().filter(|g| g.is_duplicate()).count(),
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    commands: &'a [CreationCommand],
    components: &'a [ComponentArtifact],
    tokens: &'a TokenTable,
}

/// SHA-256 hex digest over the serialized outputs. Identical input yields an
/// identical fingerprint.
pub fn compute_fingerprint(
    commands: &[CreationCommand],
    components: &[ComponentArtifact],
    tokens: &TokenTable,
) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_vec(&FingerprintInput {
        commands,
        components,
        tokens,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&payload);
    Ok(format!("{:x}", hasher.finalize()))
}
