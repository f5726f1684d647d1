//! Atomic-design classification.
//!
//! Every node with an explicit id is classified by how many classified
//! nodes sit directly beneath it. Id-less nodes are pass-through content:
//! they are never classified themselves, and the classified nodes under
//! them count as immediate children of the nearest classified ancestor.

use crate::context::{AtomDescriptor, CompileContext, CompositeDescriptor, ShapeKind, Tier};
use crate::document::{ElementNode, LibraryFile, MalformedAttribute};
use crate::geometry::{
    circle_bounds, ellipse_bounds, estimate_path_bounds, line_endpoints, rect_bounds, text_bounds,
    GeometryBox,
};
use crate::style::StyleRecord;
use crate::validate::{CompilerWarning, Diagnostics, WARN_DUPLICATE_ID, WARN_MISSING_ELEMENT};

/// Size used for a path whose data yields no bounds.
pub const PATH_FALLBACK_SIZE: (f64, f64) = (100.0, 50.0);

/// Tier for a count of immediate classified children.
pub fn tier(classified_child_count: usize) -> Tier {
    match classified_child_count {
        0 => Tier::Atom,
        1..=4 => Tier::Molecule,
        _ => Tier::Organism,
    }
}

pub fn is_primitive_tag(tag: &str) -> bool {
    matches!(
        tag,
        "rect" | "circle" | "ellipse" | "text" | "path" | "line"
    )
}

/// Concatenated, trimmed text of a node and its descendants.
pub fn deep_text(node: &ElementNode) -> Option<String> {
    fn collect(node: &ElementNode, out: &mut String) {
        if let Some(text) = &node.text {
            if !out.is_empty() && !text.trim().is_empty() {
                out.push(' ');
            }
            out.push_str(text.trim());
        }
        for child in &node.children {
            collect(child, out);
        }
    }
    let mut out = String::new();
    collect(node, &mut out);
    let trimmed = out.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn first_primitive(node: &ElementNode) -> Option<&ElementNode> {
    if is_primitive_tag(&node.tag_name()) {
        return Some(node);
    }
    node.children.iter().find_map(first_primitive)
}

/// Geometry of a primitive node as the classifier and emitter both see it.
pub fn primitive_geometry(
    node: &ElementNode,
    malformed: &mut Vec<MalformedAttribute>,
) -> GeometryBox {
    let attrs = &node.attributes;
    match node.tag_name().as_str() {
        "rect" => rect_bounds(attrs, malformed),
        "circle" => circle_bounds(attrs, malformed),
        "ellipse" => ellipse_bounds(attrs, malformed),
        "text" => text_bounds(attrs, malformed),
        "line" => {
            let (x1, y1, x2, y2) = line_endpoints(attrs, malformed);
            GeometryBox::from_corners(x1, y1, x2, y2)
        }
        "path" => attrs
            .get("d")
            .and_then(estimate_path_bounds)
            .unwrap_or(GeometryBox::new(
                0.0,
                0.0,
                PATH_FALLBACK_SIZE.0,
                PATH_FALLBACK_SIZE.1,
            )),
        _ => GeometryBox::default(),
    }
}

/// Builds the descriptor of a classified atom from its shape source: the
/// node itself when it is a primitive, else its first primitive descendant.
/// Malformed values are left to the emission pass to report.
pub fn describe_atom(id: &str, node: &ElementNode, source_file: &str) -> AtomDescriptor {
    match first_primitive(node) {
        Some(shape) => {
            let tag = shape.tag_name();
            let mut malformed = Vec::new();
            AtomDescriptor {
                id: id.to_string(),
                shape_kind: ShapeKind::from_tag(&tag).unwrap_or(ShapeKind::Unknown),
                geometry: primitive_geometry(shape, &mut malformed),
                style: StyleRecord::resolve(&tag, &shape.attributes, &mut malformed),
                source_file: source_file.to_string(),
                text: if tag == "text" { deep_text(shape) } else { None },
            }
        }
        None => AtomDescriptor {
            id: id.to_string(),
            shape_kind: ShapeKind::Unknown,
            geometry: GeometryBox::default(),
            style: StyleRecord::resolve(&node.tag_name(), &node.attributes, &mut Vec::new()),
            source_file: source_file.to_string(),
            text: None,
        },
    }
}

/// Source node of every registered atom, parallel to the atom arena.
pub type AtomSources<'f> = Vec<&'f ElementNode>;

struct Classifier<'a, 'f> {
    ctx: &'a mut CompileContext,
    diagnostics: &'a mut Diagnostics,
    sources: &'a mut AtomSources<'f>,
    file: &'a str,
}

impl<'f> Classifier<'_, 'f> {
    /// Returns the ids of the classified nodes at the top of this subtree.
    fn visit(&mut self, node: &'f ElementNode, id_override: Option<&str>) -> Vec<String> {
        let id = node.explicit_id().or(id_override).map(str::to_string);

        let frontier: Vec<String> = node
            .children
            .iter()
            .flat_map(|child| self.visit(child, None))
            .collect();

        let Some(id) = id else {
            return frontier;
        };

        let fresh = match tier(frontier.len()) {
            Tier::Atom => {
                self.sources.push(node);
                self.ctx.register_atom(describe_atom(&id, node, self.file))
            }
            composite_tier => self.ctx.register_composite(CompositeDescriptor {
                id: id.clone(),
                tier: composite_tier,
                children: frontier,
                source_file: self.file.to_string(),
            }),
        };
        if !fresh {
            self.diagnostics.warn(
                CompilerWarning::new(WARN_DUPLICATE_ID, "id is already registered")
                    .at_node(&id)
                    .in_file(self.file),
            );
        }

        vec![id]
    }
}

/// Classification pass over every file, in input order. Atoms are
/// registered post-order, so a subtree's atoms precede its composites.
pub fn classify_files<'f>(
    files: &'f [LibraryFile],
    ctx: &mut CompileContext,
    diagnostics: &mut Diagnostics,
) -> AtomSources<'f> {
    let mut sources = Vec::new();
    for file in files {
        let Some(structure) = &file.structure else {
            continue;
        };
        for entry in &structure.components {
            let Some(element) = &entry.element else {
                let mut warning =
                    CompilerWarning::new(WARN_MISSING_ELEMENT, "component entry has no element")
                        .in_file(&file.name);
                if let Some(id) = entry.root_id() {
                    warning = warning.at_node(id);
                }
                diagnostics.warn(warning);
                continue;
            };
            let mut classifier = Classifier {
                ctx: &mut *ctx,
                diagnostics: &mut *diagnostics,
                sources: &mut sources,
                file: &file.name,
            };
            classifier.visit(element, entry.root_id());
        }
    }

    log::info!(
        "classified {} atoms, {} molecules, {} organisms",
        ctx.count_tier(Tier::Atom),
        ctx.count_tier(Tier::Molecule),
        ctx.count_tier(Tier::Organism)
    );
    sources
}
