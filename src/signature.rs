//! Signature & Deduplication Module
//!
//! Structurally identical atoms share a signature and are grouped so that one
//! component plus variants is emitted for them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::context::AtomDescriptor;

/// Field separator. Raw string fields escape it, numeric fields never contain it.
pub const SIGNATURE_DELIMITER: char = '|';

pub(crate) fn escape_raw(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || c == SIGNATURE_DELIMITER {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Canonical number text. `-0` and `0` are the same key.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Deterministic key over shape kind, size, raw paints, corner radius and
/// font size.
pub fn signature(atom: &AtomDescriptor) -> String {
    let fields = [
        atom.shape_kind.as_str().to_string(),
        format_number(atom.geometry.width),
        format_number(atom.geometry.height),
        escape_raw(atom.style.fill.as_deref().unwrap_or("")),
        escape_raw(atom.style.stroke.as_deref().unwrap_or("")),
        format_number(atom.style.corner_radius),
        format_number(atom.style.font_size),
    ];
    fields.join(&SIGNATURE_DELIMITER.to_string())
}

/// Atoms sharing a signature, in first-seen order. Members are indices into
/// the context's atom arena; the first one is canonical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub signature: String,
    pub members: Vec<usize>,
}

impl DuplicateGroup {
    pub fn canonical(&self) -> usize {
        self.members[0]
    }

    pub fn variants(&self) -> &[usize] {
        &self.members[1..]
    }

    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }
}

/// Single pass grouping. Returns the groups plus, for every atom, the index
/// of the group it landed in.
pub fn group_duplicates(atoms: &[AtomDescriptor]) -> (Vec<DuplicateGroup>, Vec<usize>) {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut by_signature: HashMap<String, usize> = HashMap::new();
    let mut group_of_atom = Vec::with_capacity(atoms.len());

    for (index, atom) in atoms.iter().enumerate() {
        let key = signature(atom);
        let group = match by_signature.get(&key) {
            Some(&group) => {
                groups[group].members.push(index);
                group
            }
            None => {
                let group = groups.len();
                by_signature.insert(key.clone(), group);
                groups.push(DuplicateGroup {
                    signature: key,
                    members: vec![index],
                });
                group
            }
        };
        group_of_atom.push(group);
    }

    log::debug!(
        "grouped {} atoms into {} signatures",
        atoms.len(),
        groups.len()
    );
    (groups, group_of_atom)
}
