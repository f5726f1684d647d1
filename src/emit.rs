//! Scene Graph Emitter
//!
//! One linear depth-first walk that turns classified trees into an ordered
//! [`CreationCommand`] stream for the host. Node ids are handed out in
//! emission order, so `NodeId(n)` is always created by `commands[n]`.

use serde::{Deserialize, Serialize};

use crate::classify::{deep_text, primitive_geometry, AtomSources};
use crate::context::{Classified, CompileContext, Tier};
use crate::document::{ElementNode, LibraryFile, MalformedAttribute, Settings};
use crate::geometry::{
    auto_fit, circle_bounds, ellipse_bounds, line_endpoints, parse_translate, rect_bounds,
    text_bounds, GeometryBox,
};
use crate::style::{
    font_style_for_weight, font_weight_value, resolve_color, resolve_font, ColorRGB,
    StyleRecord, TextAlign,
};
use crate::validate::{CompilerWarning, Diagnostics, WARN_MALFORMED_NUMBER, WARN_UNSUPPORTED_TAG};

/// Size a freshly created container has before auto-fit.
pub const DEFAULT_CONTAINER_SIZE: f64 = 100.0;
pub const FOLDER_SPACING: f64 = 20.0;
pub const FOLDER_PADDING: f64 = 20.0;
pub const DEFAULT_ITEM_SPACING: f64 = 8.0;
pub const DEFAULT_TEXT: &str = "Text";
const DEFAULT_TEXT_FILL: &str = "#000000";

/// Non-visual elements that are dropped without a warning.
const IGNORED_TAGS: &[&str] = &["defs", "desc", "metadata", "style", "title"];

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAxis {
    Horizontal,
    Vertical,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Padding {
    pub const fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandKind {
    #[serde(rename_all = "camelCase")]
    CreateFrame {
        layout: LayoutAxis,
        item_spacing: f64,
        padding: Padding,
    },
    /// Rectangles, and bounding-box placeholders for paths.
    #[serde(rename_all = "camelCase")]
    CreateRect {
        fill: Option<ColorRGB>,
        stroke: Option<ColorRGB>,
        stroke_width: Option<f64>,
        corner_radius: f64,
        placeholder: bool,
    },
    #[serde(rename_all = "camelCase")]
    CreateEllipse {
        fill: Option<ColorRGB>,
        stroke: Option<ColorRGB>,
        stroke_width: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    CreateText {
        characters: String,
        font_family: String,
        font_style: String,
        font_weight: u16,
        font_size: f64,
        align: TextAlign,
        fill: ColorRGB,
    },
    #[serde(rename_all = "camelCase")]
    CreateLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Option<ColorRGB>,
        stroke_width: Option<f64>,
    },
    /// Instance of an atom component, optionally a named variant of it.
    #[serde(rename_all = "camelCase")]
    CreateGroupRef {
        component: String,
        variant: Option<String>,
    },
}

impl CommandKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            CommandKind::CreateFrame { .. } => "CreateFrame",
            CommandKind::CreateRect { .. } => "CreateRect",
            CommandKind::CreateEllipse { .. } => "CreateEllipse",
            CommandKind::CreateText { .. } => "CreateText",
            CommandKind::CreateLine { .. } => "CreateLine",
            CommandKind::CreateGroupRef { .. } => "CreateGroupRef",
        }
    }
}

/// One instruction to materialize a visual node. `parent: None` targets the
/// host's current page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationCommand {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub geometry: GeometryBox,
    #[serde(flatten)]
    pub kind: CommandKind,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYOUT INFERENCE
// ═══════════════════════════════════════════════════════════════════════════════

fn layout_from_explicit(value: &str) -> Option<LayoutAxis> {
    match value.trim().to_ascii_lowercase().as_str() {
        "flex-row" | "row" | "horizontal" => Some(LayoutAxis::Horizontal),
        "flex-column" | "column" | "vertical" => Some(LayoutAxis::Vertical),
        "grid" | "none" => Some(LayoutAxis::None),
        _ => None,
    }
}

fn layout_from_class(class: &str) -> Option<LayoutAxis> {
    let class = class.to_ascii_lowercase();
    if class.contains("flex-row") || class.contains("horizontal") {
        Some(LayoutAxis::Horizontal)
    } else if class.contains("flex-column") || class.contains("vertical") {
        Some(LayoutAxis::Vertical)
    } else if class.contains("flex") || class.contains("layout") {
        Some(LayoutAxis::Horizontal)
    } else {
        None
    }
}

fn layout_from_id(id: &str) -> Option<LayoutAxis> {
    let id = id.to_ascii_lowercase();
    if id.contains("row") || id.contains("horizontal") {
        Some(LayoutAxis::Horizontal)
    } else if id.contains("column") || id.contains("vertical") {
        Some(LayoutAxis::Vertical)
    } else if ["header", "footer", "nav"].iter().any(|k| id.contains(k)) {
        Some(LayoutAxis::Horizontal)
    } else {
        None
    }
}

/// Layout axis of a group. The first rule that matches wins: explicit
/// `data-layout`, then class keywords, then id keywords, then vertical.
pub fn infer_layout_axis(node: &ElementNode) -> LayoutAxis {
    node.attributes
        .get("data-layout")
        .and_then(layout_from_explicit)
        .or_else(|| node.attributes.get("class").and_then(layout_from_class))
        .or_else(|| node.explicit_id().and_then(layout_from_id))
        .unwrap_or(LayoutAxis::Vertical)
}

/// Spacing values keep only their numeric characters: `"12px"` reads as 12.
pub fn parse_spacing(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn auto_layout(node: &ElementNode, axis: LayoutAxis) -> (f64, Padding) {
    if axis == LayoutAxis::None {
        return (0.0, Padding::default());
    }
    let read = |name: &str, default: f64| {
        node.attributes
            .get(name)
            .and_then(parse_spacing)
            .unwrap_or(default)
    };
    (
        read("data-spacing", DEFAULT_ITEM_SPACING),
        Padding {
            left: read("data-padding-left", 0.0),
            right: read("data-padding-right", 0.0),
            top: read("data-padding-top", 0.0),
            bottom: read("data-padding-bottom", 0.0),
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// EMITTER
// ═══════════════════════════════════════════════════════════════════════════════

/// The command stream plus what the assembler needs to find in it.
#[derive(Debug, Clone, Default)]
pub struct Emission {
    pub commands: Vec<CreationCommand>,
    /// Node of each duplicate group's canonical atom, by group index.
    pub canonical_nodes: Vec<Option<NodeId>>,
    pub folders: Vec<(Tier, NodeId)>,
}

impl Emission {
    pub fn command(&self, node: NodeId) -> Option<&CreationCommand> {
        self.commands.get(node.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Atom content: every node is drawn as-is.
    Plain,
    /// Composite content: id'd descendants become instances or containers.
    Composite,
}

struct Emitter<'a> {
    ctx: &'a CompileContext,
    settings: &'a Settings,
    diagnostics: &'a mut Diagnostics,
    commands: Vec<CreationCommand>,
    canonical_nodes: Vec<Option<NodeId>>,
    file: String,
}

impl Emitter<'_> {
    fn push(
        &mut self,
        parent: Option<NodeId>,
        name: String,
        geometry: GeometryBox,
        kind: CommandKind,
    ) -> NodeId {
        let node = NodeId(self.commands.len() as u32);
        self.commands.push(CreationCommand {
            node,
            parent,
            name,
            geometry,
            kind,
        });
        node
    }

    fn report_malformed(&mut self, malformed: Vec<MalformedAttribute>, name: &str) {
        for attr in malformed {
            self.diagnostics.warn(
                CompilerWarning::new(WARN_MALFORMED_NUMBER, attr.to_string())
                    .at_node(name)
                    .in_file(&self.file),
            );
        }
    }

    fn emit_node(
        &mut self,
        node: &ElementNode,
        parent: Option<NodeId>,
        name: Option<&str>,
        mode: Mode,
    ) -> Option<NodeId> {
        let tag = node.tag_name();
        let name = name
            .or_else(|| node.explicit_id())
            .unwrap_or(tag.as_str())
            .to_string();

        match tag.as_str() {
            "g" | "svg" => Some(self.emit_container(node, parent, name, mode)),
            "rect" | "path" | "circle" | "ellipse" | "text" | "line" => {
                Some(self.emit_primitive(node, &tag, parent, name))
            }
            other if IGNORED_TAGS.contains(&other) => None,
            other => {
                self.report_unsupported(other, &name);
                None
            }
        }
    }

    fn report_unsupported(&mut self, tag: &str, name: &str) {
        self.diagnostics.warn(
            CompilerWarning::new(
                WARN_UNSUPPORTED_TAG,
                format!("unsupported element <{}> skipped", tag),
            )
            .at_node(name)
            .in_file(&self.file),
        );
    }

    /// Variant atoms are folded into their group's component and never
    /// emitted. Their source still gets the warnings emission would raise.
    fn report_folded(&mut self, node: &ElementNode, name: &str) {
        let tag = node.tag_name();
        match tag.as_str() {
            "g" | "svg" => {
                for child in &node.children {
                    let child_tag = child.tag_name();
                    let child_name = child.explicit_id().unwrap_or(child_tag.as_str());
                    self.report_folded(child, child_name);
                }
            }
            "rect" | "path" | "circle" | "ellipse" | "text" | "line" => {
                let mut malformed = Vec::new();
                StyleRecord::resolve(&tag, &node.attributes, &mut malformed);
                primitive_geometry(node, &mut malformed);
                self.report_malformed(malformed, name);
            }
            other if IGNORED_TAGS.contains(&other) => {}
            other => self.report_unsupported(other, name),
        }
    }

    fn emit_container(
        &mut self,
        node: &ElementNode,
        parent: Option<NodeId>,
        name: String,
        mode: Mode,
    ) -> NodeId {
        let (x, y) = node
            .attributes
            .get("transform")
            .and_then(parse_translate)
            .unwrap_or((0.0, 0.0));
        let layout = infer_layout_axis(node);
        let (item_spacing, padding) = auto_layout(node, layout);
        let frame = self.push(
            parent,
            name,
            GeometryBox::new(x, y, DEFAULT_CONTAINER_SIZE, DEFAULT_CONTAINER_SIZE),
            CommandKind::CreateFrame {
                layout,
                item_spacing,
                padding,
            },
        );

        let children = self.emit_children(node, frame, mode);
        self.fit(frame, &children);
        frame
    }

    fn emit_children(&mut self, node: &ElementNode, parent: NodeId, mode: Mode) -> Vec<NodeId> {
        let mut emitted = Vec::new();
        for child in &node.children {
            let created = match (mode, child.explicit_id()) {
                (Mode::Composite, Some(id)) => match self.ctx.lookup(id) {
                    Some(Classified::Atom(index)) => self.emit_instance(child, id, index, parent),
                    Some(Classified::Composite(_)) => {
                        self.emit_node(child, Some(parent), None, Mode::Composite)
                    }
                    None => None,
                },
                _ => self.emit_node(child, Some(parent), None, mode),
            };
            emitted.extend(created);
        }
        emitted
    }

    /// Post-order auto-fit of a container over its direct children.
    fn fit(&mut self, container: NodeId, children: &[NodeId]) {
        let mut boxes: Vec<GeometryBox> = children
            .iter()
            .map(|c| self.commands[c.index()].geometry)
            .collect();
        let mut frame_box = self.commands[container.index()].geometry;
        if !auto_fit(&mut frame_box, &mut boxes) {
            return;
        }
        self.commands[container.index()].geometry = frame_box;
        for (child, fitted) in children.iter().zip(boxes) {
            self.commands[child.index()].geometry = fitted;
        }
    }

    fn emit_primitive(
        &mut self,
        node: &ElementNode,
        tag: &str,
        parent: Option<NodeId>,
        name: String,
    ) -> NodeId {
        let attrs = &node.attributes;
        let mut malformed = Vec::new();
        let style = StyleRecord::resolve(tag, attrs, &mut malformed);
        let fill = style.paint_fill().map(resolve_color);
        let stroke = style.paint_stroke().map(resolve_color);
        let stroke_width = stroke.and(style.stroke_width);

        let (geometry, kind) = match tag {
            "rect" => (
                rect_bounds(attrs, &mut malformed),
                CommandKind::CreateRect {
                    fill,
                    stroke,
                    stroke_width,
                    corner_radius: style.corner_radius,
                    placeholder: false,
                },
            ),
            "path" => (
                primitive_geometry(node, &mut malformed),
                CommandKind::CreateRect {
                    fill,
                    stroke,
                    stroke_width,
                    corner_radius: 0.0,
                    placeholder: true,
                },
            ),
            "circle" | "ellipse" => (
                if tag == "circle" {
                    circle_bounds(attrs, &mut malformed)
                } else {
                    ellipse_bounds(attrs, &mut malformed)
                },
                CommandKind::CreateEllipse {
                    fill,
                    stroke,
                    stroke_width,
                },
            ),
            "line" => {
                let (x1, y1, x2, y2) = line_endpoints(attrs, &mut malformed);
                (
                    GeometryBox::from_corners(x1, y1, x2, y2),
                    CommandKind::CreateLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        stroke,
                        stroke_width,
                    },
                )
            }
            _ => {
                let weight = font_weight_value(&style.font_weight);
                (
                    text_bounds(attrs, &mut malformed),
                    CommandKind::CreateText {
                        characters: deep_text(node).unwrap_or_else(|| DEFAULT_TEXT.to_string()),
                        font_family: resolve_font(&style.font_family),
                        font_style: font_style_for_weight(weight).to_string(),
                        font_weight: weight,
                        font_size: style.font_size,
                        align: style.text_align,
                        fill: resolve_color(style.paint_fill().unwrap_or(DEFAULT_TEXT_FILL)),
                    },
                )
            }
        };

        self.report_malformed(malformed, &name);
        self.push(parent, name, geometry, kind)
    }

    /// Reference to the component built from the atom's duplicate group.
    /// Atoms whose component was never emitted are skipped.
    fn emit_instance(
        &mut self,
        node: &ElementNode,
        id: &str,
        atom_index: usize,
        parent: NodeId,
    ) -> Option<NodeId> {
        let group_index = self.ctx.group_of(atom_index)?;
        let group = &self.ctx.groups[group_index];
        let canonical = group.canonical();
        let component_node = self.canonical_nodes.get(group_index).copied().flatten()?;
        let size = self.commands[component_node.index()].geometry;

        let (x, y) = match node.tag_name().as_str() {
            "g" | "svg" => node
                .attributes
                .get("transform")
                .and_then(parse_translate)
                .unwrap_or((0.0, 0.0)),
            _ => {
                let own = primitive_geometry(node, &mut Vec::new());
                (own.x, own.y)
            }
        };
        let variant = (self.settings.create_variants && atom_index != canonical)
            .then(|| id.to_string());
        let component = self.ctx.atoms[canonical].id.clone();

        Some(self.push(
            Some(parent),
            format!("{}-instance", id),
            GeometryBox::new(x, y, size.width, size.height),
            CommandKind::CreateGroupRef { component, variant },
        ))
    }
}

fn folder_parent(folders: &[(Tier, NodeId)], tier: Tier) -> Option<NodeId> {
    folders
        .iter()
        .find(|(t, _)| *t == tier)
        .map(|(_, node)| *node)
}

/// Emission pass. Order: tier folders, canonical atoms in group order, then
/// every entry root that is not an atom, in input order.
pub fn emit_library(
    files: &[LibraryFile],
    sources: &AtomSources<'_>,
    ctx: &CompileContext,
    settings: &Settings,
    diagnostics: &mut Diagnostics,
) -> Emission {
    let mut emitter = Emitter {
        ctx,
        settings,
        diagnostics,
        commands: Vec::new(),
        canonical_nodes: Vec::with_capacity(ctx.groups.len()),
        file: String::new(),
    };

    let mut folders = Vec::new();
    if settings.organize_folders {
        for tier in [Tier::Atom, Tier::Molecule, Tier::Organism] {
            let node = emitter.push(
                None,
                tier.folder_name().to_string(),
                GeometryBox::new(0.0, 0.0, DEFAULT_CONTAINER_SIZE, DEFAULT_CONTAINER_SIZE),
                CommandKind::CreateFrame {
                    layout: LayoutAxis::Vertical,
                    item_spacing: FOLDER_SPACING,
                    padding: Padding::uniform(FOLDER_PADDING),
                },
            );
            folders.push((tier, node));
        }
    }

    let atoms_folder = folder_parent(&folders, Tier::Atom);
    for group in &ctx.groups {
        let canonical = group.canonical();
        let atom = &ctx.atoms[canonical];
        emitter.file = atom.source_file.clone();
        let node = sources
            .get(canonical)
            .and_then(|source| emitter.emit_node(source, atoms_folder, Some(&atom.id), Mode::Plain));
        emitter.canonical_nodes.push(node);
    }
    for group in &ctx.groups {
        for &member in group.variants() {
            let atom = &ctx.atoms[member];
            if let Some(source) = sources.get(member) {
                emitter.file = atom.source_file.clone();
                emitter.report_folded(source, &atom.id);
            }
        }
    }

    for file in files {
        let Some(structure) = &file.structure else {
            continue;
        };
        emitter.file = file.name.clone();
        for entry in &structure.components {
            let Some(element) = &entry.element else {
                continue;
            };
            let root_id = entry.root_id();
            let parent = match root_id.and_then(|id| ctx.lookup(id)) {
                Some(Classified::Atom(_)) => continue,
                Some(Classified::Composite(index)) => {
                    folder_parent(&folders, ctx.composites[index].tier)
                }
                None => None,
            };
            emitter.emit_node(element, parent, root_id, Mode::Composite);
        }
    }

    log::debug!(
        "emitted {} commands for {} components",
        emitter.commands.len(),
        emitter.canonical_nodes.iter().flatten().count()
    );

    Emission {
        commands: emitter.commands,
        canonical_nodes: emitter.canonical_nodes,
        folders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_files;
    use crate::document::{ComponentEntry, FileStructure};
    use crate::signature::group_duplicates;

    fn library(elements: Vec<ElementNode>) -> Vec<LibraryFile> {
        vec![LibraryFile {
            name: "ui.svg".to_string(),
            structure: Some(FileStructure {
                components: elements
                    .into_iter()
                    .map(|e| ComponentEntry {
                        id: None,
                        element: Some(e),
                    })
                    .collect(),
            }),
        }]
    }

    fn run(files: &[LibraryFile], settings: &Settings) -> (Emission, Diagnostics) {
        let mut ctx = CompileContext::new();
        let mut diagnostics = Diagnostics::new();
        let sources = classify_files(files, &mut ctx, &mut diagnostics);
        let (groups, group_of) = group_duplicates(&ctx.atoms);
        ctx.set_groups(groups, group_of);
        let emission = emit_library(files, &sources, &ctx, settings, &mut diagnostics);
        (emission, diagnostics)
    }

    fn rect(id: &str, x: &str) -> ElementNode {
        ElementNode::new("rect")
            .with_id(id)
            .with_attr("x", x)
            .with_attr("width", "40")
            .with_attr("height", "20")
            .with_attr("fill", "#ff0000")
    }

    #[test]
    fn test_layout_inference_priority() {
        let by_class = ElementNode::new("g").with_attr("class", "flex-row");
        assert_eq!(infer_layout_axis(&by_class), LayoutAxis::Horizontal);

        let by_id = ElementNode::new("g").with_id("header");
        assert_eq!(infer_layout_axis(&by_id), LayoutAxis::Horizontal);

        assert_eq!(infer_layout_axis(&ElementNode::new("g")), LayoutAxis::Vertical);

        // Explicit attribute beats a conflicting class; class beats id.
        let explicit = ElementNode::new("g")
            .with_id("nav")
            .with_attr("class", "horizontal")
            .with_attr("data-layout", "flex-column");
        assert_eq!(infer_layout_axis(&explicit), LayoutAxis::Vertical);
        let class_first = ElementNode::new("g")
            .with_id("row")
            .with_attr("class", "vertical");
        assert_eq!(infer_layout_axis(&class_first), LayoutAxis::Vertical);

        let grid = ElementNode::new("g").with_attr("data-layout", "grid");
        assert_eq!(infer_layout_axis(&grid), LayoutAxis::None);
    }

    #[test]
    fn test_spacing_strips_units() {
        assert_eq!(parse_spacing("12px"), Some(12.0));
        assert_eq!(parse_spacing("auto"), None);
        let node = ElementNode::new("g")
            .with_attr("data-spacing", "16px")
            .with_attr("data-padding-left", "4");
        let (spacing, padding) = auto_layout(&node, LayoutAxis::Horizontal);
        assert_eq!(spacing, 16.0);
        assert_eq!(padding.left, 4.0);
        assert_eq!(padding.top, 0.0);
        assert_eq!(auto_layout(&node, LayoutAxis::None).0, 0.0);
    }

    #[test]
    fn test_molecule_children_become_instances() {
        let card = ElementNode::new("g")
            .with_id("card-row")
            .with_child(rect("first", "0"))
            .with_child(rect("second", "60"));
        let files = library(vec![card]);
        let (emission, diagnostics) = run(&files, &Settings::default());
        assert!(diagnostics.is_empty());

        let kinds: Vec<&str> = emission.commands.iter().map(|c| c.kind.type_name()).collect();
        assert_eq!(
            kinds,
            vec!["CreateRect", "CreateFrame", "CreateGroupRef", "CreateGroupRef"]
        );
        assert_eq!(emission.canonical_nodes, vec![Some(NodeId(0))]);

        let refs: Vec<_> = emission.commands[2..].iter().collect();
        assert_eq!(refs[0].name, "first-instance");
        assert_eq!(refs[0].parent, Some(NodeId(1)));
        assert_eq!(
            refs[1].kind,
            CommandKind::CreateGroupRef {
                component: "first".to_string(),
                variant: Some("second".to_string()),
            }
        );

        // Frame fitted around both instances: 100 wide (0..100) + padding.
        let frame = &emission.commands[1];
        assert_eq!(frame.geometry.width, 140.0);
        assert_eq!(frame.geometry.height, 60.0);
        assert_eq!(refs[1].geometry.x, 80.0);
        assert_eq!(frame.kind, CommandKind::CreateFrame {
            layout: LayoutAxis::Horizontal,
            item_spacing: DEFAULT_ITEM_SPACING,
            padding: Padding::default(),
        });
    }

    #[test]
    fn test_variants_disabled_still_references_canonical() {
        let card = ElementNode::new("g")
            .with_id("card")
            .with_child(rect("first", "0"))
            .with_child(rect("second", "60"));
        let settings = Settings {
            create_variants: false,
            ..Settings::default()
        };
        let (emission, _) = run(&library(vec![card]), &settings);
        assert_eq!(
            emission.commands[3].kind,
            CommandKind::CreateGroupRef {
                component: "first".to_string(),
                variant: None,
            }
        );
    }

    #[test]
    fn test_folders_and_root_placement() {
        let mut organism = ElementNode::new("g").with_id("dashboard");
        for i in 0..5 {
            organism = organism.with_child(
                ElementNode::new("circle")
                    .with_id(&format!("dot-{i}"))
                    .with_attr("r", &format!("{}", i + 1)),
            );
        }
        let settings = Settings {
            organize_folders: true,
            ..Settings::default()
        };
        let (emission, _) = run(&library(vec![organism]), &settings);

        let names: Vec<&str> = emission.commands[..3].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Atoms", "Molecules", "Organisms"]);
        assert_eq!(emission.commands[3].parent, Some(NodeId(0)));
        let root = emission
            .commands
            .iter()
            .find(|c| c.name == "dashboard")
            .unwrap();
        assert_eq!(root.parent, Some(NodeId(2)));
    }

    #[test]
    fn test_text_and_path_commands() {
        let text = ElementNode::new("text")
            .with_attr("font-family", "Helvetica Neue")
            .with_attr("font-weight", "bold")
            .with_attr("text-anchor", "middle")
            .with_text("Sign in");
        let path = ElementNode::new("path").with_attr("d", "M0 0 L30 0 L30 10");
        let group = ElementNode::new("g").with_child(text).with_child(path);
        let (emission, _) = run(&library(vec![group]), &Settings::default());

        match &emission.commands[1].kind {
            CommandKind::CreateText {
                characters,
                font_family,
                font_style,
                font_weight,
                align,
                fill,
                ..
            } => {
                assert_eq!(characters, "Sign in");
                assert_eq!(font_family, "Arial");
                assert_eq!(font_style, "Bold");
                assert_eq!(*font_weight, 700);
                assert_eq!(*align, TextAlign::Center);
                assert_eq!(*fill, ColorRGB::BLACK);
            }
            other => panic!("expected text, got {:?}", other),
        }
        match &emission.commands[2].kind {
            CommandKind::CreateRect { placeholder, .. } => assert!(*placeholder),
            other => panic!("expected placeholder, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_and_malformed_warn() {
        let group = ElementNode::new("g")
            .with_child(ElementNode::new("foreignObject"))
            .with_child(ElementNode::new("title").with_text("ignored"))
            .with_child(ElementNode::new("rect").with_attr("width", "wide"));
        let (emission, diagnostics) = run(&library(vec![group]), &Settings::default());

        assert_eq!(emission.commands.len(), 2);
        let codes: Vec<&str> = diagnostics.as_slice().iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, vec![WARN_UNSUPPORTED_TAG, WARN_MALFORMED_NUMBER]);
        assert_eq!(emission.commands[1].geometry.width, 100.0);
    }

    #[test]
    fn test_translate_positions_groups() {
        let group = ElementNode::new("g")
            .with_attr("transform", "translate(30, 40) rotate(45)")
            .with_child(ElementNode::new("rect"));
        let (emission, _) = run(&library(vec![group]), &Settings::default());
        assert_eq!(emission.commands[0].geometry.x, 30.0);
        assert_eq!(emission.commands[0].geometry.y, 40.0);
    }

    #[test]
    fn test_command_json_is_tagged() {
        let command = CreationCommand {
            node: NodeId(3),
            parent: None,
            name: "dot".to_string(),
            geometry: GeometryBox::new(0.0, 0.0, 2.0, 2.0),
            kind: CommandKind::CreateEllipse {
                fill: None,
                stroke: None,
                stroke_width: None,
            },
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["type"], "CreateEllipse");
        assert_eq!(value["node"], 3);
        assert!(value["strokeWidth"].is_null());
    }
}
