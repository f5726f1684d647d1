use serde::{Deserialize, Serialize};

use crate::context::{CompileContext, Tier};
use crate::document::Settings;
use crate::emit::{Emission, NodeId};
use crate::geometry::GeometryBox;
use crate::style::StyleRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Source id of the duplicate member.
    pub name: String,
    pub source_file: String,
}

/// One reusable component per duplicate group, built from the canonical atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentArtifact {
    pub id: String,
    pub tier: Tier,
    pub signature: String,
    /// Box of the canonical node after emission and auto-fit.
    pub geometry: GeometryBox,
    pub style: StyleRecord,
    /// Emitted node the host turns into the component.
    pub node: NodeId,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub description: Option<String>,
    pub source_file: String,
}

/// `primary-button_large` reads as `primary button large`.
pub fn humanize_id(id: &str) -> String {
    id.split(|c: char| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn describe_component(artifact: &ComponentArtifact) -> String {
    format!(
        "{} component: {}. Variants: {}. Source: {}",
        capitalize(artifact.tier.as_str()),
        humanize_id(&artifact.id),
        artifact.variants.len(),
        artifact.source_file
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds one artifact per duplicate group whose canonical node was emitted,
/// in group order. Members after the first become variants when
/// `create_variants` is on.
pub fn assemble_components(
    ctx: &CompileContext,
    emission: &Emission,
    settings: &Settings,
) -> Vec<ComponentArtifact> {
    let mut artifacts = Vec::with_capacity(ctx.groups.len());

    for (group, node) in ctx.groups.iter().zip(&emission.canonical_nodes) {
        let Some(node) = *node else {
            log::debug!("group '{}' has no emitted node", group.signature);
            continue;
        };
        let Some(command) = emission.command(node) else {
            continue;
        };
        let canonical = &ctx.atoms[group.canonical()];

        let variants = if settings.create_variants {
            group
                .variants()
                .iter()
                .map(|&member| Variant {
                    name: ctx.atoms[member].id.clone(),
                    source_file: ctx.atoms[member].source_file.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut artifact = ComponentArtifact {
            id: canonical.id.clone(),
            tier: Tier::Atom,
            signature: group.signature.clone(),
            geometry: command.geometry,
            style: canonical.style.clone(),
            node,
            variants,
            description: None,
            source_file: canonical.source_file.clone(),
        };
        if settings.add_documentation {
            artifact.description = Some(describe_component(&artifact));
        }
        artifacts.push(artifact);
    }

    log::info!("assembled {} components", artifacts.len());
    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_files;
    use crate::document::{ComponentEntry, ElementNode, FileStructure, LibraryFile};
    use crate::emit::emit_library;
    use crate::signature::group_duplicates;
    use crate::validate::Diagnostics;

    fn assemble(settings: &Settings) -> Vec<ComponentArtifact> {
        let files = vec![LibraryFile {
            name: "buttons.svg".to_string(),
            structure: Some(FileStructure {
                components: vec![ComponentEntry {
                    id: None,
                    element: Some(
                        ElementNode::new("g")
                            .with_id("toolbar")
                            .with_child(
                                ElementNode::new("rect")
                                    .with_id("primary-button")
                                    .with_attr("width", "80")
                                    .with_attr("height", "32"),
                            )
                            .with_child(
                                ElementNode::new("rect")
                                    .with_id("secondary-button")
                                    .with_attr("x", "90")
                                    .with_attr("width", "80")
                                    .with_attr("height", "32"),
                            )
                            .with_child(
                                ElementNode::new("circle")
                                    .with_id("status")
                                    .with_attr("r", "4"),
                            ),
                    ),
                }],
            }),
        }];
        let mut ctx = CompileContext::new();
        let mut diagnostics = Diagnostics::new();
        let sources = classify_files(&files, &mut ctx, &mut diagnostics);
        let (groups, group_of) = group_duplicates(&ctx.atoms);
        ctx.set_groups(groups, group_of);
        let emission = emit_library(&files, &sources, &ctx, settings, &mut diagnostics);
        assemble_components(&ctx, &emission, settings)
    }

    #[test]
    fn test_duplicates_become_variants() {
        let artifacts = assemble(&Settings::default());
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].id, "primary-button");
        assert_eq!(artifacts[0].variants.len(), 1);
        assert_eq!(artifacts[0].variants[0].name, "secondary-button");
        assert_eq!(artifacts[0].geometry.width, 80.0);
        assert_eq!(artifacts[1].id, "status");
        assert!(artifacts[1].variants.is_empty());
        assert!(artifacts[0].description.is_none());
    }

    #[test]
    fn test_variants_off_and_documentation() {
        let settings = Settings {
            create_variants: false,
            add_documentation: true,
            ..Settings::default()
        };
        let artifacts = assemble(&settings);
        assert!(artifacts[0].variants.is_empty());
        assert_eq!(
            artifacts[0].description.as_deref(),
            Some("Atom component: primary button. Variants: 0. Source: buttons.svg")
        );
    }

    #[test]
    fn test_humanize_id() {
        assert_eq!(humanize_id("nav-bar_item"), "nav bar item");
        assert_eq!(humanize_id("--x"), "x");
    }
}
