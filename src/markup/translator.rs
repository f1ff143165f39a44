/*!
 * Conversion of rich-text trees into the platform's inline markup.
 *
 * The conversion walks the tree in document order with an explicit work
 * stack, so arbitrarily deep trees never exhaust the call stack. The only
 * traversal state, the kind of the last block emitted, is owned by the walk
 * and updated as blocks close so that sibling paragraphs can be separated
 * by a blank line.
 *
 * Known limitation: delimiter characters already present in text nodes
 * (`*`, `_`, `~`) are emitted as-is and will be interpreted as formatting
 * by the receiving client.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::{FormatCode, RichTextNode};

/// Three or more consecutive newlines
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Block-level context carried between siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LastBlock {
    #[default]
    None,
    Paragraph,
}

/// How a closed element turns its rendered children into output
#[derive(Debug, Clone, Copy)]
enum Closing {
    Paragraph,
    Format(char),
    Transparent,
}

impl Closing {
    fn for_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("p") {
            return Self::Paragraph;
        }
        match FormatCode::from_tag(tag) {
            Some(code) => Self::Format(code.delimiter()),
            None => Self::Transparent,
        }
    }
}

enum Step<'a> {
    Visit(&'a RichTextNode),
    Close(Closing),
}

/// Translate a rich-text tree into platform markup.
///
/// Never fails: unknown tags are dropped and their children kept.
pub fn translate(root: &RichTextNode) -> String {
    let raw = render(root);
    EXCESS_NEWLINES.replace_all(&raw, "\n\n").trim().to_string()
}

fn render(root: &RichTextNode) -> String {
    let mut output = String::new();
    // One buffer per element whose children are still being rendered
    let mut open: Vec<String> = Vec::new();
    let mut steps = vec![Step::Visit(root)];
    let mut last = LastBlock::default();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(RichTextNode::Text { content }) => {
                open.last_mut().unwrap_or(&mut output).push_str(content);
            }
            Step::Visit(RichTextNode::Element { tag, children }) => {
                if tag.eq_ignore_ascii_case("br") {
                    open.last_mut().unwrap_or(&mut output).push('\n');
                    continue;
                }
                open.push(String::new());
                steps.push(Step::Close(Closing::for_tag(tag)));
                steps.extend(children.iter().rev().map(Step::Visit));
            }
            Step::Close(closing) => {
                let inner = open.pop().unwrap_or_default();
                let target = open.last_mut().unwrap_or(&mut output);

                match closing {
                    Closing::Paragraph => {
                        if last == LastBlock::Paragraph {
                            target.push('\n');
                        }
                        target.push_str(inner.trim());
                        target.push('\n');
                        last = LastBlock::Paragraph;
                    }
                    Closing::Format(delimiter) => {
                        target.push(delimiter);
                        target.push_str(&inner);
                        target.push(delimiter);
                    }
                    Closing::Transparent => target.push_str(&inner),
                }
            }
        }
    }

    output
}
