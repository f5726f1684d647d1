//! Design Token Module
//!
//! Aggregates colors, typography, spacing and radii from the classified atoms
//! into a named token table. Names are handed out in first-encounter order,
//! so extraction must run over atoms in arena order.

use lazy_static::lazy_static;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};

use crate::context::{AtomDescriptor, ShapeKind};
use crate::signature::{escape_raw, format_number};
use crate::style::is_none_paint;

lazy_static! {
    /// Canonical names for well-known hex spellings.
    static ref CANONICAL_HEX: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("#000", "black");
        m.insert("#000000", "black");
        m.insert("#fff", "white");
        m.insert("#ffffff", "white");
        m.insert("#f00", "red");
        m.insert("#ff0000", "red");
        m.insert("#00ff00", "green");
        m.insert("#0000ff", "blue");
        m.insert("#ffff00", "yellow");
        m.insert("#00ffff", "cyan");
        m.insert("#ff00ff", "magenta");
        m.insert("#808080", "gray");
        m
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenCategory {
    Color,
    Typography,
    Spacing,
    Radius,
}

impl TokenCategory {
    fn prefix(&self) -> &'static str {
        match self {
            TokenCategory::Color => "color",
            TokenCategory::Typography => "font",
            TokenCategory::Spacing => "spacing",
            TokenCategory::Radius => "radius",
        }
    }

    fn document_type(&self) -> &'static str {
        match self {
            TokenCategory::Color => "color",
            TokenCategory::Typography => "typography",
            TokenCategory::Spacing => "spacing",
            TokenCategory::Radius => "borderRadius",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyValue {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    Color(String),
    Typography(TypographyValue),
    Dimension(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignToken {
    pub category: TokenCategory,
    pub name: String,
    pub value: TokenValue,
}

/// Per-category tokens, each list in first-encounter order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenTable {
    pub colors: Vec<DesignToken>,
    pub typography: Vec<DesignToken>,
    pub spacing: Vec<DesignToken>,
    pub border_radius: Vec<DesignToken>,
}

impl TokenTable {
    pub fn len(&self) -> usize {
        self.colors.len() + self.typography.len() + self.spacing.len() + self.border_radius.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn categories(&self) -> [(&'static str, &[DesignToken]); 4] {
        [
            ("colors", &self.colors),
            ("typography", &self.typography),
            ("spacing", &self.spacing),
            ("borderRadius", &self.border_radius),
        ]
    }

    /// Flat token-exchange document: `{category: {name: {value, type}}}`,
    /// pretty printed, keys in first-encounter order.
    pub fn to_token_document(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&TokenDocument(self))
    }
}

struct OrderedTokens<'a>(&'a [DesignToken]);

impl Serialize for OrderedTokens<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|t| (&t.name, &t.value)))
    }
}

impl Serialize for TokenTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TokenTable", 4)?;
        state.serialize_field("colors", &OrderedTokens(&self.colors))?;
        state.serialize_field("typography", &OrderedTokens(&self.typography))?;
        state.serialize_field("spacing", &OrderedTokens(&self.spacing))?;
        state.serialize_field("borderRadius", &OrderedTokens(&self.border_radius))?;
        state.end()
    }
}

#[derive(Serialize)]
struct DocumentEntry<'a> {
    value: &'a TokenValue,
    #[serde(rename = "type")]
    kind: &'static str,
}

struct DocumentCategory<'a>(&'a [DesignToken]);

impl Serialize for DocumentCategory<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for token in self.0 {
            map.serialize_entry(
                &token.name,
                &DocumentEntry {
                    value: &token.value,
                    kind: token.category.document_type(),
                },
            )?;
        }
        map.end()
    }
}

struct TokenDocument<'a>(&'a TokenTable);

impl Serialize for TokenDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .categories()
                .into_iter()
                .map(|(key, tokens)| (key, DocumentCategory(tokens))),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════════

/// One category being filled. `seen` is keyed by the raw encountered value.
struct Collector {
    category: TokenCategory,
    tokens: Vec<DesignToken>,
    seen: HashSet<String>,
    names: HashSet<String>,
}

impl Collector {
    fn new(category: TokenCategory) -> Self {
        Self {
            category,
            tokens: Vec::new(),
            seen: HashSet::new(),
            names: HashSet::new(),
        }
    }

    fn add(&mut self, key: String, preferred_name: Option<String>, value: TokenValue) {
        if !self.seen.insert(key) {
            return;
        }
        let ordinal = format!("{}-{}", self.category.prefix(), self.tokens.len() + 1);
        let name = preferred_name
            .filter(|n| !self.names.contains(n))
            .unwrap_or(ordinal);
        self.names.insert(name.clone());
        self.tokens.push(DesignToken {
            category: self.category,
            name,
            value,
        });
    }
}

fn canonical_color_name(raw: &str) -> Option<String> {
    CANONICAL_HEX
        .get(raw.trim().to_ascii_lowercase().as_str())
        .map(|name| format!("color-{}", name))
}

pub fn extract_tokens(atoms: &[AtomDescriptor]) -> TokenTable {
    let mut colors = Collector::new(TokenCategory::Color);
    let mut typography = Collector::new(TokenCategory::Typography);
    let mut spacing = Collector::new(TokenCategory::Spacing);
    let mut radius = Collector::new(TokenCategory::Radius);

    for atom in atoms {
        for paint in [&atom.style.fill, &atom.style.stroke].into_iter().flatten() {
            if is_none_paint(paint) {
                continue;
            }
            colors.add(
                paint.clone(),
                canonical_color_name(paint),
                TokenValue::Color(paint.clone()),
            );
        }

        if atom.shape_kind == ShapeKind::Text {
            let style = &atom.style;
            typography.add(
                format!(
                    "{}|{}|{}",
                    escape_raw(&style.font_family),
                    format_number(style.font_size),
                    escape_raw(&style.font_weight)
                ),
                None,
                TokenValue::Typography(TypographyValue {
                    font_family: style.font_family.clone(),
                    font_size: style.font_size,
                    font_weight: style.font_weight.clone(),
                }),
            );
        }

        for dimension in [atom.geometry.width, atom.geometry.height] {
            if dimension != 0.0 {
                spacing.add(format_number(dimension), None, TokenValue::Dimension(dimension));
            }
        }

        let corner = atom.style.corner_radius;
        if corner != 0.0 {
            radius.add(format_number(corner), None, TokenValue::Dimension(corner));
        }
    }

    let table = TokenTable {
        colors: colors.tokens,
        typography: typography.tokens,
        spacing: spacing.tokens,
        border_radius: radius.tokens,
    };
    log::info!("extracted {} design tokens", table.len());
    table
}
