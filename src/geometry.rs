//! Geometry estimation: primitive bounds, approximate path bounds, and the
//! post-order auto-fit applied to containers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{Attributes, MalformedAttribute};

lazy_static! {
    /// One path command letter followed by its argument run.
    static ref PATH_COMMAND_RE: Regex =
        Regex::new(r"[MmLlHhVvCcSsQqTtAaZz][^MmLlHhVvCcSsQqTtAaZz]*").unwrap();

    static ref PATH_NUMBER_RE: Regex =
        Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").unwrap();

    static ref TRANSLATE_RE: Regex =
        Regex::new(r"translate\(\s*([^,\s)]+)(?:\s*,\s*|\s+)([^)\s]+)\s*\)").unwrap();
}

/// Padding added on every side when a container is fitted to its children.
pub const AUTO_FIT_PADDING: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl GeometryBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanning two corners in any order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRIMITIVE BOUNDS
// ═══════════════════════════════════════════════════════════════════════════════

fn read(attrs: &Attributes, name: &str, malformed: &mut Vec<MalformedAttribute>) -> f64 {
    attrs.number(name).unwrap_or_else(|err| {
        let fallback = err.fallback;
        malformed.push(err);
        fallback
    })
}

pub fn rect_bounds(attrs: &Attributes, malformed: &mut Vec<MalformedAttribute>) -> GeometryBox {
    GeometryBox::new(
        read(attrs, "x", malformed),
        read(attrs, "y", malformed),
        read(attrs, "width", malformed).max(0.0),
        read(attrs, "height", malformed).max(0.0),
    )
}

pub fn circle_bounds(attrs: &Attributes, malformed: &mut Vec<MalformedAttribute>) -> GeometryBox {
    let r = read(attrs, "r", malformed).max(0.0);
    let cx = read(attrs, "cx", malformed);
    let cy = read(attrs, "cy", malformed);
    GeometryBox::new(cx - r, cy - r, 2.0 * r, 2.0 * r)
}

pub fn ellipse_bounds(attrs: &Attributes, malformed: &mut Vec<MalformedAttribute>) -> GeometryBox {
    let rx = read(attrs, "rx", malformed).max(0.0);
    let ry = read(attrs, "ry", malformed).max(0.0);
    let cx = read(attrs, "cx", malformed);
    let cy = read(attrs, "cy", malformed);
    GeometryBox::new(cx - rx, cy - ry, 2.0 * rx, 2.0 * ry)
}

/// Line endpoints `(x1, y1, x2, y2)`.
pub fn line_endpoints(
    attrs: &Attributes,
    malformed: &mut Vec<MalformedAttribute>,
) -> (f64, f64, f64, f64) {
    (
        read(attrs, "x1", malformed),
        read(attrs, "y1", malformed),
        read(attrs, "x2", malformed),
        read(attrs, "y2", malformed),
    )
}

/// Text anchor box. Text has no intrinsic size here; an explicit
/// `width`/`height` is honoured, otherwise the box is zero-sized.
pub fn text_bounds(attrs: &Attributes, malformed: &mut Vec<MalformedAttribute>) -> GeometryBox {
    GeometryBox::new(
        read(attrs, "x", malformed),
        read(attrs, "y", malformed),
        attrs.optional_number("width").unwrap_or(0.0).max(0.0),
        attrs.optional_number("height").unwrap_or(0.0).max(0.0),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// PATH BOUNDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct Extents {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extents {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include_x(&mut self, x: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
    }

    fn include_y(&mut self, y: f64) {
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    fn include(&mut self, x: f64, y: f64) {
        self.include_x(x);
        self.include_y(y);
    }

    fn to_box(self) -> Option<GeometryBox> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        finite.then(|| {
            GeometryBox::new(
                self.min_x,
                self.min_y,
                self.max_x - self.min_x,
                self.max_y - self.min_y,
            )
        })
    }
}

/// Approximate bounding box of SVG path data.
///
/// Only `M`, `L`, `H`, `V` and `C` move the bounds; `C` includes both
/// control points, so curves are over-approximated. `S`, `Q`, `T`, `A` and
/// `Z` are tokenized but contribute nothing. Lowercase commands are read
/// as absolute coordinates. Returns `None` when no coordinate was seen on
/// either axis.
pub fn estimate_path_bounds(d: &str) -> Option<GeometryBox> {
    let mut extents = Extents::empty();
    let mut current = (0.0_f64, 0.0_f64);

    for command in PATH_COMMAND_RE.find_iter(d) {
        let text = command.as_str();
        let letter = text.chars().next().unwrap_or('Z').to_ascii_uppercase();
        let args: Vec<f64> = PATH_NUMBER_RE
            .find_iter(&text[1..])
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .collect();

        match letter {
            'M' | 'L' => {
                for pair in args.chunks_exact(2) {
                    current = (pair[0], pair[1]);
                    extents.include(current.0, current.1);
                }
            }
            'H' => {
                for &x in &args {
                    extents.include_x(x);
                    current.0 = x;
                }
            }
            'V' => {
                for &y in &args {
                    extents.include_y(y);
                    current.1 = y;
                }
            }
            'C' => {
                for segment in args.chunks_exact(6) {
                    for point in segment.chunks_exact(2) {
                        extents.include(point[0], point[1]);
                    }
                    current = (segment[4], segment[5]);
                }
            }
            _ => {}
        }
    }

    log::trace!("path bounds ended at current point {:?}", current);
    extents.to_box()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM
// ═══════════════════════════════════════════════════════════════════════════════

/// Offset of a `translate(x, y)` inside a transform list. Rotation, scale and
/// matrix forms are ignored.
pub fn parse_translate(transform: &str) -> Option<(f64, f64)> {
    let caps = TRANSLATE_RE.captures(transform)?;
    let x = crate::document::parse_leading_number(caps.get(1)?.as_str())?;
    let y = crate::document::parse_leading_number(caps.get(2)?.as_str())?;
    Some((x, y))
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUTO-FIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Resizes `container` to the extents of `children` plus
/// [`AUTO_FIT_PADDING`] on each side, and moves every child so the top-left
/// extent sits at the padding offset. The container keeps its position.
///
/// Must run after all children are placed. Returns `false` and leaves
/// everything untouched when there are no children.
pub fn auto_fit(container: &mut GeometryBox, children: &mut [GeometryBox]) -> bool {
    let mut extents = Extents::empty();
    for child in children.iter() {
        extents.include(child.x, child.y);
        extents.include(child.right(), child.bottom());
    }
    let Some(bounds) = extents.to_box() else {
        return false;
    };

    container.width = bounds.width + AUTO_FIT_PADDING * 2.0;
    container.height = bounds.height + AUTO_FIT_PADDING * 2.0;
    for child in children.iter_mut() {
        child.x = child.x - bounds.x + AUTO_FIT_PADDING;
        child.y = child.y - bounds.y + AUTO_FIT_PADDING;
    }
    true
}
