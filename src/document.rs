//! Input model for the component compiler.
//!
//! A run receives a list of [`LibraryFile`]s, each carrying component entries
//! rooted at an [`ElementNode`]. Nodes are read-only for the whole run.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// ELEMENT TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    #[serde(alias = "tagName")]
    pub tag: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub children: Vec<ElementNode>,
    #[serde(default, alias = "textContent")]
    pub text: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl ElementNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// The explicit id of the node: the `id` field, else the `id` attribute.
    /// Blank ids count as absent.
    pub fn explicit_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.attributes.get("id"))
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn tag_name(&self) -> String {
        self.tag.to_lowercase()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILES & SETTINGS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFile {
    pub name: String,
    #[serde(default)]
    pub structure: Option<FileStructure>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStructure {
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub element: Option<ElementNode>,
}

impl ComponentEntry {
    /// Id of the entry's root: the root element's own id, else the entry id.
    pub fn root_id(&self) -> Option<&str> {
        self.element
            .as_ref()
            .and_then(ElementNode::explicit_id)
            .or_else(|| self.id.as_deref().map(str::trim).filter(|id| !id.is_empty()))
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub organize_folders: bool,
    #[serde(default = "default_true")]
    pub create_variants: bool,
    #[serde(default)]
    pub add_documentation: bool,
    #[serde(default = "default_true")]
    pub generate_tokens: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organize_folders: false,
            create_variants: true,
            add_documentation: false,
            generate_tokens: true,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPED ATTRIBUTE ACCESS
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    /// Leading decimal number, the part of `"12.5px"` that counts.
    static ref LEADING_NUMBER_RE: Regex =
        Regex::new(r"^\s*[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").unwrap();
}

/// Default used when a numeric attribute is absent or malformed.
///
/// | attribute | default |
/// |-----------|---------|
/// | `x`, `y`, `cx`, `cy`, `x1`, `y1`, `y2` | 0 |
/// | `x2` | 100 |
/// | `width` | 100 |
/// | `height` | 50 |
/// | `r`, `rx`, `ry` | 10 |
/// | `stroke-width` | 1 |
/// | `font-size` | 12 |
/// | `data-spacing` | 8 |
/// | `data-padding-*` | 0 |
///
/// Anything else defaults to 0.
pub fn numeric_default(name: &str) -> f64 {
    match name {
        "x2" | "width" => 100.0,
        "height" => 50.0,
        "r" | "rx" | "ry" => 10.0,
        "stroke-width" => 1.0,
        "font-size" => 12.0,
        "data-spacing" => 8.0,
        _ => 0.0,
    }
}

/// A numeric attribute that was present but had no leading number.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedAttribute {
    pub name: String,
    pub raw: String,
    pub fallback: f64,
}

impl fmt::Display for MalformedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attribute '{}' has malformed value '{}', using {}",
            self.name, self.raw, self.fallback
        )
    }
}

/// Parses the leading decimal number of a value, like a lenient float read.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    LEADING_NUMBER_RE
        .find(raw)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// String-to-string attribute mapping with typed accessors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// First present, non-blank value among `names`.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .find(|value| !value.trim().is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Numeric attribute with its documented default.
    ///
    /// Absent values yield the default. Present values without a leading
    /// number yield `Err` carrying the default to use instead.
    pub fn number(&self, name: &str) -> Result<f64, MalformedAttribute> {
        self.number_or(name, numeric_default(name))
    }

    pub fn number_or(&self, name: &str, default: f64) -> Result<f64, MalformedAttribute> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => parse_leading_number(raw).ok_or_else(|| MalformedAttribute {
                name: name.to_string(),
                raw: raw.to_string(),
                fallback: default,
            }),
        }
    }

    /// Numeric attribute when present and well-formed, `None` otherwise.
    pub fn optional_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(parse_leading_number)
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_defaults_and_leniency() {
        let node = ElementNode::new("rect")
            .with_attr("width", "120px")
            .with_attr("height", "tall");

        assert_eq!(node.attributes.number("width"), Ok(120.0));
        assert_eq!(node.attributes.number("x"), Ok(0.0));
        let err = node.attributes.number("height").unwrap_err();
        assert_eq!(err.fallback, 50.0);
        assert_eq!(err.raw, "tall");
        assert_eq!(node.attributes.optional_number("height"), None);
    }

    #[test]
    fn test_explicit_id_prefers_field() {
        let node = ElementNode::new("g").with_attr("id", "from-attr");
        assert_eq!(node.explicit_id(), Some("from-attr"));

        let node = node.with_id("from-field");
        assert_eq!(node.explicit_id(), Some("from-field"));

        let blank = ElementNode::new("g").with_id("  ");
        assert_eq!(blank.explicit_id(), None);
    }

    #[test]
    fn test_deserialize_original_shape() {
        let json = r##"{
            "name": "card.svg",
            "structure": {
                "components": [
                    {
                        "id": "card",
                        "element": {
                            "tagName": "g",
                            "attributes": { "class": "atom" },
                            "children": [
                                { "tagName": "text", "attributes": {}, "children": [], "textContent": "Hi" }
                            ]
                        }
                    }
                ]
            }
        }"##;
        let file: LibraryFile = serde_json::from_str(json).unwrap();
        let entry = &file.structure.unwrap().components[0];
        assert_eq!(entry.root_id(), Some("card"));
        let element = entry.element.as_ref().unwrap();
        assert_eq!(element.tag, "g");
        assert_eq!(element.children[0].text.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.create_variants);
        assert!(!settings.organize_folders);
    }
}
