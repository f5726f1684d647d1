//! Parse Module
//!
//! SVG markup → [`LibraryFile`]. The markup goes through html5ever, which
//! places an inline `<svg>` in the SVG namespace, keeps self-closing shapes
//! and restores SVG tag/attribute casing. Each direct element child of the
//! root `<svg>` becomes one component entry.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::document::{Attributes, ComponentEntry, ElementNode, FileStructure, LibraryFile};
use crate::validate::{CompilerError, ERR_PARSE};

fn find_svg_root(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if (&*name.local).eq_ignore_ascii_case("svg") {
            return Some(handle.clone());
        }
    }
    handle.children.borrow().iter().find_map(find_svg_root)
}

/// Whitespace-collapsed text of every text node below `handle`.
fn dom_text(handle: &Handle) -> Option<String> {
    fn collect(handle: &Handle, out: &mut String) {
        for child in handle.children.borrow().iter() {
            match &child.data {
                NodeData::Text { contents } => {
                    out.push(' ');
                    out.push_str(&contents.borrow());
                }
                NodeData::Element { .. } => collect(child, out),
                _ => {}
            }
        }
    }
    let mut raw = String::new();
    collect(handle, &mut raw);
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Converts an element; anything that is not an element yields `None`.
fn convert_element(handle: &Handle) -> Option<ElementNode> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };
    let tag = name.local.to_string();
    let attributes: Attributes = attrs
        .borrow()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect();

    // Text content, including any <tspan> runs, is flattened onto <text>.
    if tag.eq_ignore_ascii_case("text") {
        return Some(ElementNode {
            tag,
            attributes,
            children: Vec::new(),
            text: dom_text(handle),
            id: None,
        });
    }

    let children = handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_element)
        .collect();
    Some(ElementNode {
        tag,
        attributes,
        children,
        text: None,
        id: None,
    })
}

/// Parses SVG markup into a library file named `name`.
pub fn parse_svg_document(source: &str, name: &str) -> Result<LibraryFile, CompilerError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut source.as_bytes())
        .map_err(|e| {
            CompilerError::new(ERR_PARSE, format!("Failed to parse SVG: {}", e)).in_file(name)
        })?;

    let root = find_svg_root(&dom.document).ok_or_else(|| {
        CompilerError::new(ERR_PARSE, "document has no <svg> root element").in_file(name)
    })?;

    let components: Vec<ComponentEntry> = root
        .children
        .borrow()
        .iter()
        .filter_map(convert_element)
        .map(|element| ComponentEntry {
            id: None,
            element: Some(element),
        })
        .collect();

    log::debug!("parsed {} top-level elements from {}", components.len(), name);

    Ok(LibraryFile {
        name: name.to_string(),
        structure: Some(FileStructure { components }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTONS: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 200">
  <!-- primary actions -->
  <g id="toolbar" class="flex-row" transform="translate(10, 10)">
    <rect id="primary" width="80" height="32" rx="6" fill="#007AFF"/>
    <text id="label" x="12" y="20" font-size="14">Save <tspan>draft</tspan></text>
  </g>
  <circle id="dot" cx="5" cy="5" r="5"/>
</svg>"##;

    #[test]
    fn test_top_level_children_become_entries() {
        let file = parse_svg_document(BUTTONS, "buttons.svg").unwrap();
        assert_eq!(file.name, "buttons.svg");
        let entries = file.structure.unwrap().components;
        assert_eq!(entries.len(), 2);

        let toolbar = entries[0].element.as_ref().unwrap();
        assert_eq!(toolbar.tag, "g");
        assert_eq!(toolbar.explicit_id(), Some("toolbar"));
        assert_eq!(toolbar.attributes.get("transform"), Some("translate(10, 10)"));
        assert_eq!(toolbar.children.len(), 2);
        assert_eq!(toolbar.children[0].attributes.get("rx"), Some("6"));

        let label = &toolbar.children[1];
        assert_eq!(label.text.as_deref(), Some("Save draft"));
        assert!(label.children.is_empty());

        assert_eq!(entries[1].root_id(), Some("dot"));
    }

    #[test]
    fn test_missing_svg_root_is_a_parse_error() {
        let err = parse_svg_document("<div>not a drawing</div>", "page.html").unwrap_err();
        assert_eq!(err.code, ERR_PARSE);
        assert_eq!(err.file.as_deref(), Some("page.html"));
    }

    #[test]
    fn test_svg_casing_survives() {
        let source = r#"<svg><foreignObject id="embed" width="10"/></svg>"#;
        let file = parse_svg_document(source, "x.svg").unwrap();
        let entries = file.structure.unwrap().components;
        assert_eq!(entries[0].element.as_ref().unwrap().tag, "foreignObject");
    }
}
