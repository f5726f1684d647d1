//! Per-run compile state.
//!
//! One [`CompileContext`] is created per run and threaded explicitly through
//! every pass. Descriptors live in arena vectors and are addressed by index;
//! id maps only answer lookups for emission.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geometry::GeometryBox;
use crate::signature::DuplicateGroup;
use crate::style::StyleRecord;
use crate::tokens::TokenTable;

// ═══════════════════════════════════════════════════════════════════════════════
// DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Atomic-design tier of a classified node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Atom,
    Molecule,
    Organism,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Atom => "atom",
            Tier::Molecule => "molecule",
            Tier::Organism => "organism",
        }
    }

    pub fn folder_name(&self) -> &'static str {
        match self {
            Tier::Atom => "Atoms",
            Tier::Molecule => "Molecules",
            Tier::Organism => "Organisms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
    Text,
    Path,
    Unknown,
}

impl ShapeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rect" => Some(ShapeKind::Rectangle),
            "circle" => Some(ShapeKind::Circle),
            "ellipse" => Some(ShapeKind::Ellipse),
            "text" => Some(ShapeKind::Text),
            "path" => Some(ShapeKind::Path),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Text => "text",
            ShapeKind::Path => "path",
            ShapeKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomDescriptor {
    pub id: String,
    pub shape_kind: ShapeKind,
    pub geometry: GeometryBox,
    pub style: StyleRecord,
    pub source_file: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeDescriptor {
    pub id: String,
    pub tier: Tier,
    pub children: Vec<String>,
    pub source_file: String,
}

/// What an id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Atom(usize),
    Composite(usize),
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct CompileContext {
    pub atoms: Vec<AtomDescriptor>,
    pub composites: Vec<CompositeDescriptor>,
    pub groups: Vec<DuplicateGroup>,
    pub tokens: TokenTable,
    ids: HashMap<String, Classified>,
    group_of_atom: Vec<usize>,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an atom. Returns `false` when the id was already taken; the
    /// atom is still stored but lookups keep answering with the first one.
    pub fn register_atom(&mut self, atom: AtomDescriptor) -> bool {
        let index = self.atoms.len();
        let fresh = self.claim_id(&atom.id, Classified::Atom(index));
        self.atoms.push(atom);
        fresh
    }

    pub fn register_composite(&mut self, composite: CompositeDescriptor) -> bool {
        let index = self.composites.len();
        let fresh = self.claim_id(&composite.id, Classified::Composite(index));
        self.composites.push(composite);
        fresh
    }

    fn claim_id(&mut self, id: &str, entry: Classified) -> bool {
        if self.ids.contains_key(id) {
            return false;
        }
        self.ids.insert(id.to_string(), entry);
        true
    }

    pub fn lookup(&self, id: &str) -> Option<Classified> {
        self.ids.get(id).copied()
    }

    pub fn tier_of(&self, id: &str) -> Option<Tier> {
        match self.lookup(id)? {
            Classified::Atom(_) => Some(Tier::Atom),
            Classified::Composite(i) => Some(self.composites[i].tier),
        }
    }

    pub fn set_groups(&mut self, groups: Vec<DuplicateGroup>, group_of_atom: Vec<usize>) {
        self.groups = groups;
        self.group_of_atom = group_of_atom;
    }

    /// Duplicate group index of the atom at `atom_index`.
    pub fn group_of(&self, atom_index: usize) -> Option<usize> {
        self.group_of_atom.get(atom_index).copied()
    }

    pub fn count_tier(&self, tier: Tier) -> usize {
        match tier {
            Tier::Atom => self.atoms.len(),
            _ => self.composites.iter().filter(|c| c.tier == tier).count(),
        }
    }
}
