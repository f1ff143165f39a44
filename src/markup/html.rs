/*!
 * Front-ends that turn editor output into `RichTextNode` trees.
 *
 * The translator itself never parses text; callers pick a parser that
 * matches the format their editor produces.
 */

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Node};
use std::path::Path;

use super::RichTextNode;

/// Deepest element nesting kept by `HtmlParser`; deeper content is
/// attached to the element at this depth
pub const MAX_NESTING_DEPTH: usize = 512;

/// Produces a rich-text tree from a serialized document
pub trait RichTextParser {
    /// Parse `source` into a tree rooted at a single node
    fn parse(&self, source: &str) -> Result<RichTextNode>;
}

/// Parses HTML fragments as emitted by rich-text editors
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Convert `element`, found at nesting `depth` (the root is at depth 1)
    fn convert_element(element: ElementRef<'_>, depth: usize) -> RichTextNode {
        if depth >= MAX_NESTING_DEPTH {
            return RichTextNode::element(element.value().name(), Self::flatten_descendants(element));
        }

        let mut children = Vec::new();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => children.push(RichTextNode::text(&**text)),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        children.push(Self::convert_element(child, depth + 1));
                    }
                }
                _ => {}
            }
        }

        RichTextNode::element(element.value().name(), children)
    }

    /// Text and line breaks below `element`, in document order
    fn flatten_descendants(element: ElementRef<'_>) -> Vec<RichTextNode> {
        element
            .descendants()
            .skip(1)
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some(RichTextNode::text(&**text)),
                Node::Element(child) if child.name().eq_ignore_ascii_case("br") => Some(RichTextNode::line_break()),
                _ => None,
            })
            .collect()
    }
}

impl RichTextParser for HtmlParser {
    fn parse(&self, source: &str) -> Result<RichTextNode> {
        let fragment = Html::parse_fragment(source);
        Ok(Self::convert_element(fragment.root_element(), 1))
    }
}

/// Reads a tree that was already serialized as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTreeParser;

impl RichTextParser for JsonTreeParser {
    fn parse(&self, source: &str) -> Result<RichTextNode> {
        serde_json::from_str(source).context("Failed to parse rich-text JSON tree")
    }
}

/// Load a message file: a JSON tree for `.json` files, HTML otherwise
pub fn load_message(path: &Path) -> Result<RichTextNode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read message file: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        JsonTreeParser.parse(&source)
    } else {
        HtmlParser::new().parse(&source)
    }
}
