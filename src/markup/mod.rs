/*!
 * Rich-text to inline markup conversion.
 *
 * The messaging platform renders plain text with inline markers
 * (`*bold*`, `_italic_`, `~strike~`). This module provides:
 * - `RichTextNode`: the document tree produced by an editor
 * - `FormatCode`: the tag to delimiter table
 * - `translator`: the tree to markup conversion
 * - `html`: an HTML front-end producing `RichTextNode` trees
 */

use serde::{Deserialize, Serialize};

pub mod html;
pub mod translator;

pub use html::{load_message, HtmlParser, JsonTreeParser, RichTextParser, MAX_NESTING_DEPTH};
pub use translator::translate;

/// A node of a rich-text document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RichTextNode {
    /// Literal text
    Text {
        /// Text content, emitted unchanged
        content: String,
    },
    /// A tagged element with ordered children
    Element {
        /// Tag name (e.g. "p", "strong", "br")
        tag: String,
        /// Child nodes in document order
        #[serde(default)]
        children: Vec<RichTextNode>,
    },
}

impl RichTextNode {
    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }

    /// Create an element node
    pub fn element(tag: impl Into<String>, children: Vec<RichTextNode>) -> Self {
        Self::Element { tag: tag.into(), children }
    }

    /// Create an element with a single text child
    pub fn wrap_text(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self::element(tag, vec![Self::text(content)])
    }

    /// Create a line-break element
    pub fn line_break() -> Self {
        Self::element("br", Vec::new())
    }
}

// Dropping is iterative so that deeply nested trees cannot exhaust the stack
impl Drop for RichTextNode {
    fn drop(&mut self) {
        let Self::Element { children, .. } = self else {
            return;
        };

        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let Self::Element { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

/// Inline formatting understood by the messaging platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCode {
    Bold,
    Italic,
    Strikethrough,
}

impl FormatCode {
    /// Look up the format code for an element tag, ignoring case
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "b" | "strong" => Some(Self::Bold),
            "i" | "em" => Some(Self::Italic),
            "strike" | "s" | "del" => Some(Self::Strikethrough),
            _ => None,
        }
    }

    /// Delimiter placed on both sides of the formatted text
    pub fn delimiter(&self) -> char {
        match self {
            Self::Bold => '*',
            Self::Italic => '_',
            Self::Strikethrough => '~',
        }
    }
}
