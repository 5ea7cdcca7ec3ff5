//! Typed document tree.
//!
//! A deliberately small model: elements with attributes and children, plus
//! text nodes. Just enough structure to locate a post by attribute, replace
//! it in place, or prepend a new one to a container.

use std::fmt;

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Returns the contained element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

/// An element: tag name, attributes in source order, child nodes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Tags rendered without a closing tag, per the HTML void element list.
pub(crate) const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

impl Element {
    /// Create an empty element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of the first attribute with the given name, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            attr.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Insert a node as the first child.
    pub fn prepend_child(&mut self, node: Node) {
        self.children.insert(0, node);
    }

    /// Depth-first search for the first descendant element carrying the
    /// given attribute value. Document order, so "first" matches what a
    /// selector query against the live tree would return.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.attribute(name) == Some(value) {
                    return Some(el);
                }
                if let Some(found) = el.find_by_attribute(name, value) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Replace the first descendant element carrying the given attribute
    /// value with `replacement`, keeping its position among its siblings.
    /// Returns false if no descendant matched.
    pub fn replace_by_attribute(&mut self, name: &str, value: &str, replacement: Element) -> bool {
        self.replace_inner(name, value, &mut Some(replacement))
    }

    fn replace_inner(&mut self, name: &str, value: &str, replacement: &mut Option<Element>) -> bool {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if el.attribute(name) == Some(value) {
                    // take() is safe: we return immediately after the swap
                    *child = Node::Element(replacement.take().unwrap_or_default());
                    return true;
                }
                if el.replace_inner(name, value, replacement) {
                    return true;
                }
            }
        }
        false
    }

    /// Render the element and its subtree back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            match child {
                Node::Element(el) => el.write_html(out),
                Node::Text(text) => out.push_str(&escape_html(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Escape text for inclusion in markup.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            c => result.push(c),
        }
    }
    result
}
