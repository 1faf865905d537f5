/// Feed document decoder.
///
/// The three feeds return small XML documents produced by the reservoir's
/// data service. The documents are not schema-validated here: every field
/// read has a safe default so one missing or malformed field never aborts
/// decoding of the rest. See `fixtures.rs` for annotated examples.
///
/// Only structural problems (unbalanced tags, no root element, stray text
/// outside the root) reject a document. `Document::parse` returns `None`
/// for those and callers treat it as absence, not data.

use quick_xml::events::Event;
use quick_xml::Reader;

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

/// One element: its tag name, its own text content, and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text directly inside this element, surrounding whitespace trimmed.
    pub fn own_text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First descendant element with the given tag, in document order.
    /// The node itself is not considered.
    pub fn find(&self, name: &str) -> Option<&Node> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendant elements with the given tag, in document order.
    /// Matches are not searched for nested matches of the same tag.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Node>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            } else {
                child.collect_descendants(name, found);
            }
        }
    }
}

impl AsRef<Node> for Node {
    fn as_ref(&self) -> &Node {
        self
    }
}

/// A successfully parsed feed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
}

impl AsRef<Node> for Document {
    fn as_ref(&self) -> &Node {
        &self.root
    }
}

impl Document {
    /// Parses a raw feed body. Returns `None` for anything that is not a
    /// single well-formed element tree.
    pub fn parse(raw: &str) -> Option<Document> {
        let mut reader = Reader::from_str(raw);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut open: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    if root.is_some() && open.is_empty() {
                        return None; // second root element
                    }
                    let name = String::from_utf8(start.name().as_ref().to_vec()).ok()?;
                    open.push(Node::new(name));
                }
                Ok(Event::Empty(start)) => {
                    let name = String::from_utf8(start.name().as_ref().to_vec()).ok()?;
                    attach(Node::new(name), &mut open, &mut root)?;
                }
                Ok(Event::End(_)) => {
                    let node = open.pop()?;
                    attach(node, &mut open, &mut root)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape().ok()?;
                    match open.last_mut() {
                        Some(node) => node.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return None, // stray text outside the root
                    }
                }
                Ok(Event::CData(data)) => {
                    let node = open.last_mut()?;
                    node.text.push_str(std::str::from_utf8(&data).ok()?);
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(_) => return None,
            }
        }

        if !open.is_empty() {
            return None; // unclosed element at end of input
        }
        root.map(|root| Document { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// Attaches a closed element to its parent, or makes it the root.
fn attach(node: Node, open: &mut [Node], root: &mut Option<Node>) -> Option<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return None, // second root element
    }
    Some(())
}

// ---------------------------------------------------------------------------
// Field accessors
// ---------------------------------------------------------------------------

/// Text of the first `field` element under `node`, or `""` if absent.
pub fn text<N: AsRef<Node> + ?Sized>(node: &N, field: &str) -> String {
    node.as_ref()
        .find(field)
        .map(|n| n.own_text().to_string())
        .unwrap_or_default()
}

/// `text()` parsed as a number, or `0.0` if absent or not a finite number.
pub fn number<N: AsRef<Node> + ?Sized>(node: &N, field: &str) -> f64 {
    text(node, field)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// `None` when the field is absent or blank, otherwise `number()`.
pub fn optional_number<N: AsRef<Node> + ?Sized>(node: &N, field: &str) -> Option<f64> {
    if text(node, field).is_empty() {
        None
    } else {
        Some(number(node, field))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
