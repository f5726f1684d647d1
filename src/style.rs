//! Style & color resolution.
//!
//! Turns inline `style` strings and presentation attributes into a
//! [`StyleRecord`], and raw color / font strings into host-ready values.
//! Nothing here fails: unparseable colors resolve to opaque black and
//! unknown font families to Arial.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::document::{parse_leading_number, Attributes, MalformedAttribute};

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP TABLES
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref NAMED_COLORS: HashMap<&'static str, ColorRGB> = {
        let mut m = HashMap::new();
        m.insert("black", ColorRGB::new(0.0, 0.0, 0.0));
        m.insert("white", ColorRGB::new(1.0, 1.0, 1.0));
        m.insert("red", ColorRGB::new(1.0, 0.0, 0.0));
        m.insert("green", ColorRGB::new(0.0, 1.0, 0.0));
        m.insert("blue", ColorRGB::new(0.0, 0.0, 1.0));
        m.insert("yellow", ColorRGB::new(1.0, 1.0, 0.0));
        m.insert("cyan", ColorRGB::new(0.0, 1.0, 1.0));
        m.insert("magenta", ColorRGB::new(1.0, 0.0, 1.0));
        m.insert("gray", ColorRGB::new(0.5, 0.5, 0.5));
        m.insert("grey", ColorRGB::new(0.5, 0.5, 0.5));
        m
    };

    /// Families the host ships, keyed by the primary family of a font stack.
    static ref FONT_SUBSTITUTIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("Arial", "Arial");
        m.insert("Helvetica", "Arial");
        m.insert("Helvetica Neue", "Arial");
        m.insert("Times New Roman", "Times New Roman");
        m.insert("Times", "Times New Roman");
        m.insert("Courier New", "Courier New");
        m.insert("Courier", "Courier New");
        m.insert("Verdana", "Arial");
        m.insert("Georgia", "Arial");
        m.insert("Palatino", "Arial");
        m.insert("Garamond", "Arial");
        m.insert("Bookman", "Arial");
        m.insert("Comic Sans MS", "Arial");
        m.insert("Trebuchet MS", "Arial");
        m.insert("Arial Black", "Arial");
        m.insert("Impact", "Arial");
        m
    };

    static ref CHANNEL_RE: Regex = Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)").unwrap();
}

pub const FALLBACK_FONT: &str = "Arial";

// ═══════════════════════════════════════════════════════════════════════════════
// COLOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Opaque color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRGB {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ColorRGB {
    pub const BLACK: ColorRGB = ColorRGB {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// Color as parsed, before the alpha channel is dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedColor {
    pub rgb: ColorRGB,
    pub alpha: Option<f64>,
}

fn hex_pair(s: &str) -> Option<f64> {
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(s, 16).ok().map(|v| f64::from(v) / 255.0)
}

fn parse_hex(hex: &str) -> Option<ColorRGB> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let doubled: Vec<String> = hex.chars().map(|c| format!("{c}{c}")).collect();
            Some(ColorRGB::new(
                hex_pair(&doubled[0])?,
                hex_pair(&doubled[1])?,
                hex_pair(&doubled[2])?,
            ))
        }
        6 => Some(ColorRGB::new(
            hex_pair(&hex[0..2])?,
            hex_pair(&hex[2..4])?,
            hex_pair(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_functional(value: &str) -> Option<ParsedColor> {
    let open = value.find('(')?;
    let channels: Vec<f64> = CHANNEL_RE
        .find_iter(&value[open..])
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if channels.len() < 3 {
        return None;
    }
    let channel = |v: f64| (v / 255.0).clamp(0.0, 1.0);
    Some(ParsedColor {
        rgb: ColorRGB::new(channel(channels[0]), channel(channels[1]), channel(channels[2])),
        alpha: channels.get(3).copied(),
    })
}

/// Full parse of a color string, keeping alpha when one was given.
pub fn parse_color(value: &str) -> Option<ParsedColor> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).map(|rgb| ParsedColor { rgb, alpha: None });
    }

    let lower = value.to_ascii_lowercase();
    if lower.starts_with("rgba(") || lower.starts_with("rgb(") {
        return parse_functional(&lower);
    }

    NAMED_COLORS
        .get(lower.as_str())
        .map(|rgb| ParsedColor { rgb: *rgb, alpha: None })
}

/// Resolves a color string to RGB, falling back to opaque black.
///
/// `rgba(...)` alpha is parsed and dropped: the host fill takes RGB only.
pub fn resolve_color(value: &str) -> ColorRGB {
    parse_color(value)
        .map(|parsed| parsed.rgb)
        .unwrap_or(ColorRGB::BLACK)
}

/// True for values that mean "no paint".
pub fn is_none_paint(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("none")
}

// ═══════════════════════════════════════════════════════════════════════════════
// INLINE STYLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Splits `a: b; c: d` into declarations. Declarations without a `:` or with
/// an empty side are dropped; later declarations win.
pub fn parse_inline_style(text: &str) -> BTreeMap<String, String> {
    let mut declarations = BTreeMap::new();
    for declaration in text.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        declarations.insert(property.to_ascii_lowercase(), value.to_string());
    }
    declarations
}

// ═══════════════════════════════════════════════════════════════════════════════
// FONTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps a CSS font stack to a family the host can load.
pub fn resolve_font(family: &str) -> String {
    let primary = family
        .split(',')
        .next()
        .unwrap_or("")
        .replace(['"', '\''], "");
    FONT_SUBSTITUTIONS
        .get(primary.trim())
        .copied()
        .unwrap_or(FALLBACK_FONT)
        .to_string()
}

/// Numeric weight for a CSS weight keyword or number.
pub fn font_weight_value(weight: &str) -> u16 {
    match weight.trim().to_ascii_lowercase().as_str() {
        "bold" | "700" => 700,
        "light" | "300" => 300,
        _ => 400,
    }
}

/// Font style name the host expects for a numeric weight.
pub fn font_style_for_weight(weight: u16) -> &'static str {
    match weight {
        700 => "Bold",
        300 => "Light",
        _ => "Regular",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// From an SVG `text-anchor` (or CSS `text-align`) value.
    pub fn from_anchor(anchor: &str) -> Self {
        match anchor.trim().to_ascii_lowercase().as_str() {
            "middle" | "center" => TextAlign::Center,
            "end" | "right" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STYLE RECORD
// ═══════════════════════════════════════════════════════════════════════════════

pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_FONT_WEIGHT: &str = "normal";

/// Resolved presentation of one element. Paint values stay raw strings so
/// that signatures and color tokens see exactly what the source said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub corner_radius: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub text_align: TextAlign,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: None,
            corner_radius: 0.0,
            font_size: DEFAULT_FONT_SIZE,
            font_family: FALLBACK_FONT.to_string(),
            font_weight: DEFAULT_FONT_WEIGHT.to_string(),
            text_align: TextAlign::Left,
        }
    }
}

impl StyleRecord {
    /// Presentation attributes win over inline style declarations.
    /// Malformed numeric values are reported through `malformed` and replaced
    /// by their defaults. Only `rect` reads `rx`/`ry` as a corner radius;
    /// on other shapes they are geometry.
    pub fn resolve(
        tag: &str,
        attrs: &Attributes,
        malformed: &mut Vec<MalformedAttribute>,
    ) -> Self {
        let inline = attrs.get("style").map(parse_inline_style).unwrap_or_default();
        let lookup = |name: &str| -> Option<String> {
            attrs
                .first_of(&[name])
                .map(str::to_string)
                .or_else(|| inline.get(name).cloned())
        };

        let mut number = |name: &str, default: f64| -> Option<f64> {
            let raw = lookup(name)?;
            match parse_leading_number(&raw) {
                Some(v) => Some(v),
                None => {
                    malformed.push(MalformedAttribute {
                        name: name.to_string(),
                        raw,
                        fallback: default,
                    });
                    Some(default)
                }
            }
        };

        let stroke_width = number("stroke-width", 1.0);
        let corner_radius = if tag == "rect" {
            number("rx", 0.0)
                .filter(|v| *v != 0.0)
                .or_else(|| number("ry", 0.0))
                .unwrap_or(0.0)
        } else {
            0.0
        };
        let font_size = number("font-size", DEFAULT_FONT_SIZE).unwrap_or(DEFAULT_FONT_SIZE);

        Self {
            fill: lookup("fill"),
            stroke: lookup("stroke"),
            stroke_width,
            corner_radius,
            font_size,
            font_family: lookup("font-family").unwrap_or_else(|| FALLBACK_FONT.to_string()),
            font_weight: lookup("font-weight").unwrap_or_else(|| DEFAULT_FONT_WEIGHT.to_string()),
            text_align: lookup("text-anchor")
                .or_else(|| inline.get("text-align").cloned())
                .map(|a| TextAlign::from_anchor(&a))
                .unwrap_or(TextAlign::Left),
        }
    }

    /// Fill that should actually be painted.
    pub fn paint_fill(&self) -> Option<&str> {
        self.fill.as_deref().filter(|f| !is_none_paint(f))
    }

    pub fn paint_stroke(&self) -> Option<&str> {
        self.stroke.as_deref().filter(|s| !is_none_paint(s))
    }
}
