//! Host Collaborator Module
//!
//! [`SceneHost`] is the contract of the design tool that owns the scene
//! graph. [`materialize`] replays a command stream against it, treating every
//! host call as an independent step: a failed call is recorded as a warning
//! and the node keeps whatever was applied before it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::component::ComponentArtifact;
use crate::emit::{CommandKind, CreationCommand, LayoutAxis, NodeId, Padding};
use crate::style::{ColorRGB, TextAlign};
use crate::validate::{CompilerWarning, Diagnostics, WARN_HOST_CALL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub operation: String,
    pub message: String,
}

impl HostError {
    pub fn new(operation: &str, message: impl Into<String>) -> Self {
        Self {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for HostError {}

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Rectangle,
    Ellipse,
    Text,
    Line,
}

/// Operations the host design tool provides. `parent: None` in
/// [`SceneHost::append_child`] means the current page.
pub trait SceneHost {
    fn create_container(&mut self) -> HostResult<HostHandle>;
    fn create_primitive(&mut self, kind: PrimitiveKind) -> HostResult<HostHandle>;
    fn append_child(&mut self, parent: Option<HostHandle>, child: HostHandle) -> HostResult<()>;
    fn set_name(&mut self, node: HostHandle, name: &str) -> HostResult<()>;
    fn set_position(&mut self, node: HostHandle, x: f64, y: f64) -> HostResult<()>;
    fn resize(&mut self, node: HostHandle, width: f64, height: f64) -> HostResult<()>;
    fn set_fill(&mut self, node: HostHandle, color: ColorRGB) -> HostResult<()>;
    fn set_stroke(&mut self, node: HostHandle, color: ColorRGB, width: f64) -> HostResult<()>;
    fn set_corner_radius(&mut self, node: HostHandle, radius: f64) -> HostResult<()>;
    fn set_layout(
        &mut self,
        node: HostHandle,
        axis: LayoutAxis,
        item_spacing: f64,
        padding: Padding,
    ) -> HostResult<()>;
    fn load_font(&mut self, family: &str, style: &str) -> HostResult<()>;
    fn set_font(&mut self, node: HostHandle, family: &str, style: &str) -> HostResult<()>;
    fn set_characters(&mut self, node: HostHandle, characters: &str) -> HostResult<()>;
    fn set_font_size(&mut self, node: HostHandle, size: f64) -> HostResult<()>;
    fn set_text_align(&mut self, node: HostHandle, align: TextAlign) -> HostResult<()>;
    fn create_component_from_node(&mut self, node: HostHandle) -> HostResult<HostHandle>;
    fn create_variant_of(&mut self, component: HostHandle, name: &str) -> HostResult<HostHandle>;
    fn create_instance(&mut self, component: HostHandle) -> HostResult<HostHandle>;
    fn set_description(&mut self, component: HostHandle, description: &str) -> HostResult<()>;
    fn remove_node(&mut self, node: HostHandle) -> HostResult<()>;
}

/// Outcome of one materialization.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializeReport {
    pub nodes: BTreeMap<NodeId, HostHandle>,
    pub components: BTreeMap<String, HostHandle>,
    pub variants_created: usize,
    /// Created but never attached, therefore removed again.
    pub removed: Vec<NodeId>,
    /// Not materialized because they or an ancestor failed.
    pub skipped: Vec<NodeId>,
    pub warnings: Vec<CompilerWarning>,
}

struct Materializer<'h, 'c> {
    host: &'h mut (dyn SceneHost + 'h),
    artifacts: HashMap<&'c str, &'c ComponentArtifact>,
    components: HashMap<String, Option<HostHandle>>,
    variants: HashMap<(String, String), HostHandle>,
    fonts: HashMap<(String, String), bool>,
    failed: HashSet<NodeId>,
    report: MaterializeReport,
    diagnostics: Diagnostics,
}

impl<'h, 'c> Materializer<'h, 'c> {
    fn step<T>(
        &mut self,
        node: &str,
        call: impl FnOnce(&mut (dyn SceneHost + 'h)) -> HostResult<T>,
    ) -> Option<T> {
        match call(&mut *self.host) {
            Ok(value) => Some(value),
            Err(err) => {
                self.diagnostics
                    .warn(CompilerWarning::new(WARN_HOST_CALL, err.to_string()).at_node(node));
                None
            }
        }
    }

    /// Loads a font once per (family, style); later calls reuse the outcome.
    fn ensure_font(&mut self, node: &str, family: &str, style: &str) -> bool {
        let key = (family.to_string(), style.to_string());
        if let Some(&loaded) = self.fonts.get(&key) {
            return loaded;
        }
        let loaded = self.step(node, |h| h.load_font(family, style)).is_some();
        self.fonts.insert(key, loaded);
        loaded
    }

    /// Creates the component (and its variants) on first use. A failed
    /// attempt is not retried.
    fn ensure_component(&mut self, id: &str) -> Option<HostHandle> {
        if let Some(created) = self.components.get(id) {
            return *created;
        }
        let artifact = *self.artifacts.get(id)?;
        let handle = match self.report.nodes.get(&artifact.node).copied() {
            Some(node) => self.step(id, |h| h.create_component_from_node(node)),
            None => {
                self.diagnostics.warn(
                    CompilerWarning::new(WARN_HOST_CALL, "component source node was not created")
                        .at_node(id),
                );
                None
            }
        };
        self.components.insert(id.to_string(), handle);

        let component = handle?;
        self.report.components.insert(id.to_string(), component);
        if let Some(description) = &artifact.description {
            self.step(id, |h| h.set_description(component, description));
        }
        for variant in &artifact.variants {
            if let Some(v) = self.step(&variant.name, |h| h.create_variant_of(component, &variant.name)) {
                self.variants
                    .insert((id.to_string(), variant.name.clone()), v);
                self.report.variants_created += 1;
            }
        }
        Some(component)
    }

    fn create(&mut self, command: &CreationCommand) -> Option<HostHandle> {
        let name = command.name.as_str();
        match &command.kind {
            CommandKind::CreateFrame { .. } => self.step(name, |h| h.create_container()),
            CommandKind::CreateRect { .. } => {
                self.step(name, |h| h.create_primitive(PrimitiveKind::Rectangle))
            }
            CommandKind::CreateEllipse { .. } => {
                self.step(name, |h| h.create_primitive(PrimitiveKind::Ellipse))
            }
            CommandKind::CreateText { .. } => {
                self.step(name, |h| h.create_primitive(PrimitiveKind::Text))
            }
            CommandKind::CreateLine { .. } => {
                self.step(name, |h| h.create_primitive(PrimitiveKind::Line))
            }
            CommandKind::CreateGroupRef { component, variant } => {
                let base = self.ensure_component(component)?;
                let source = variant
                    .as_ref()
                    .and_then(|v| self.variants.get(&(component.clone(), v.clone())).copied())
                    .unwrap_or(base);
                self.step(name, |h| h.create_instance(source))
            }
        }
    }

    fn apply_paint(
        &mut self,
        name: &str,
        node: HostHandle,
        fill: Option<ColorRGB>,
        stroke: Option<ColorRGB>,
        stroke_width: Option<f64>,
    ) {
        if let Some(color) = fill {
            self.step(name, |h| h.set_fill(node, color));
        }
        if let Some(color) = stroke {
            self.step(name, |h| h.set_stroke(node, color, stroke_width.unwrap_or(1.0)));
        }
    }

    fn apply(&mut self, command: &CreationCommand, node: HostHandle) {
        let name = command.name.as_str();
        let g = command.geometry;

        self.step(name, |h| h.set_name(node, name));
        self.step(name, |h| h.set_position(node, g.x, g.y));
        self.step(name, |h| h.resize(node, g.width, g.height));

        match &command.kind {
            CommandKind::CreateFrame {
                layout,
                item_spacing,
                padding,
            } => {
                self.step(name, |h| h.set_layout(node, *layout, *item_spacing, *padding));
            }
            CommandKind::CreateRect {
                fill,
                stroke,
                stroke_width,
                corner_radius,
                ..
            } => {
                self.apply_paint(name, node, *fill, *stroke, *stroke_width);
                if *corner_radius > 0.0 {
                    self.step(name, |h| h.set_corner_radius(node, *corner_radius));
                }
            }
            CommandKind::CreateEllipse {
                fill,
                stroke,
                stroke_width,
            } => self.apply_paint(name, node, *fill, *stroke, *stroke_width),
            CommandKind::CreateLine {
                stroke,
                stroke_width,
                ..
            } => self.apply_paint(name, node, None, *stroke, *stroke_width),
            CommandKind::CreateText {
                characters,
                font_family,
                font_style,
                font_size,
                align,
                fill,
                ..
            } => {
                if self.ensure_font(name, font_family, font_style) {
                    self.step(name, |h| h.set_font(node, font_family, font_style));
                }
                self.step(name, |h| h.set_characters(node, characters));
                self.step(name, |h| h.set_font_size(node, *font_size));
                self.step(name, |h| h.set_text_align(node, *align));
                self.step(name, |h| h.set_fill(node, *fill));
            }
            CommandKind::CreateGroupRef { .. } => {}
        }
    }

    fn run(&mut self, command: &CreationCommand) {
        if let Some(parent) = command.parent {
            if self.failed.contains(&parent) || !self.report.nodes.contains_key(&parent) {
                self.failed.insert(command.node);
                self.report.skipped.push(command.node);
                return;
            }
        }

        let Some(node) = self.create(command) else {
            self.failed.insert(command.node);
            self.report.skipped.push(command.node);
            return;
        };
        self.apply(command, node);

        let parent = command
            .parent
            .and_then(|p| self.report.nodes.get(&p).copied());
        if self
            .step(&command.name, |h| h.append_child(parent, node))
            .is_none()
        {
            self.step(&command.name, |h| h.remove_node(node));
            self.failed.insert(command.node);
            self.report.removed.push(command.node);
            return;
        }
        self.report.nodes.insert(command.node, node);
    }
}

/// Replays `commands` against `host` in order, then creates every component
/// not already created for an instance.
pub fn materialize(
    commands: &[CreationCommand],
    components: &[ComponentArtifact],
    host: &mut dyn SceneHost,
) -> MaterializeReport {
    let mut materializer = Materializer {
        host,
        artifacts: components.iter().map(|a| (a.id.as_str(), a)).collect(),
        components: HashMap::new(),
        variants: HashMap::new(),
        fonts: HashMap::new(),
        failed: HashSet::new(),
        report: MaterializeReport::default(),
        diagnostics: Diagnostics::new(),
    };

    for command in commands {
        materializer.run(command);
    }
    for artifact in components {
        materializer.ensure_component(&artifact.id);
    }

    let mut report = materializer.report;
    report.warnings = materializer.diagnostics.into_vec();
    log::info!(
        "materialized {} nodes and {} components with {} warnings",
        report.nodes.len(),
        report.components.len(),
        report.warnings.len()
    );
    report
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Host double that records every call and fails the named operations.
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub calls: Vec<String>,
        pub fail: HashSet<&'static str>,
        next: u64,
    }

    impl RecordingHost {
        pub fn failing(ops: &[&'static str]) -> Self {
            Self {
                fail: ops.iter().copied().collect(),
                ..Self::default()
            }
        }

        pub fn count(&self, op: &str) -> usize {
            self.calls.iter().filter(|c| c.split(' ').next() == Some(op)).count()
        }

        fn record(&mut self, op: &'static str, detail: String) -> HostResult<()> {
            self.calls.push(format!("{} {}", op, detail).trim_end().to_string());
            if self.fail.contains(op) {
                return Err(HostError::new(op, "injected failure"));
            }
            Ok(())
        }

        fn handle(&mut self, op: &'static str, detail: String) -> HostResult<HostHandle> {
            self.record(op, detail)?;
            self.next += 1;
            Ok(HostHandle(self.next))
        }
    }

    impl SceneHost for RecordingHost {
        fn create_container(&mut self) -> HostResult<HostHandle> {
            self.handle("create_container", String::new())
        }
        fn create_primitive(&mut self, kind: PrimitiveKind) -> HostResult<HostHandle> {
            self.handle("create_primitive", format!("{:?}", kind))
        }
        fn append_child(&mut self, parent: Option<HostHandle>, child: HostHandle) -> HostResult<()> {
            self.record("append_child", format!("{:?} {}", parent.map(|p| p.0), child.0))
        }
        fn set_name(&mut self, node: HostHandle, name: &str) -> HostResult<()> {
            self.record("set_name", format!("{} {}", node.0, name))
        }
        fn set_position(&mut self, node: HostHandle, x: f64, y: f64) -> HostResult<()> {
            self.record("set_position", format!("{} {} {}", node.0, x, y))
        }
        fn resize(&mut self, node: HostHandle, width: f64, height: f64) -> HostResult<()> {
            self.record("resize", format!("{} {} {}", node.0, width, height))
        }
        fn set_fill(&mut self, node: HostHandle, _color: ColorRGB) -> HostResult<()> {
            self.record("set_fill", node.0.to_string())
        }
        fn set_stroke(&mut self, node: HostHandle, _color: ColorRGB, width: f64) -> HostResult<()> {
            self.record("set_stroke", format!("{} {}", node.0, width))
        }
        fn set_corner_radius(&mut self, node: HostHandle, radius: f64) -> HostResult<()> {
            self.record("set_corner_radius", format!("{} {}", node.0, radius))
        }
        fn set_layout(
            &mut self,
            node: HostHandle,
            axis: LayoutAxis,
            _item_spacing: f64,
            _padding: Padding,
        ) -> HostResult<()> {
            self.record("set_layout", format!("{} {:?}", node.0, axis))
        }
        fn load_font(&mut self, family: &str, style: &str) -> HostResult<()> {
            self.record("load_font", format!("{} {}", family, style))
        }
        fn set_font(&mut self, node: HostHandle, family: &str, style: &str) -> HostResult<()> {
            self.record("set_font", format!("{} {} {}", node.0, family, style))
        }
        fn set_characters(&mut self, node: HostHandle, characters: &str) -> HostResult<()> {
            self.record("set_characters", format!("{} {}", node.0, characters))
        }
        fn set_font_size(&mut self, node: HostHandle, size: f64) -> HostResult<()> {
            self.record("set_font_size", format!("{} {}", node.0, size))
        }
        fn set_text_align(&mut self, node: HostHandle, align: TextAlign) -> HostResult<()> {
            self.record("set_text_align", format!("{} {:?}", node.0, align))
        }
        fn create_component_from_node(&mut self, node: HostHandle) -> HostResult<HostHandle> {
            self.handle("create_component_from_node", node.0.to_string())
        }
        fn create_variant_of(&mut self, component: HostHandle, name: &str) -> HostResult<HostHandle> {
            self.handle("create_variant_of", format!("{} {}", component.0, name))
        }
        fn create_instance(&mut self, component: HostHandle) -> HostResult<HostHandle> {
            self.handle("create_instance", component.0.to_string())
        }
        fn set_description(&mut self, component: HostHandle, description: &str) -> HostResult<()> {
            self.record("set_description", format!("{} {}", component.0, description))
        }
        fn remove_node(&mut self, node: HostHandle) -> HostResult<()> {
            self.record("remove_node", node.0.to_string())
        }
    }
}
