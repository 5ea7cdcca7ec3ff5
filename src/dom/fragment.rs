//! HTML fragment parsing with a checked single-root precondition.
//!
//! Post content arrives over the wire as a markup string. Splicing it into
//! the tree is only well-defined when it parses to exactly one root element,
//! so that is enforced here rather than assumed. The parser is a small
//! hand-rolled tokenizer covering the markup the backend actually renders:
//! nested elements, quoted/unquoted attributes, void and self-closing tags,
//! comments, and the basic character entities.

use super::node::{Element, Node, VOID_TAGS};

/// Result type for fragment parsing.
pub type FragmentResult<T> = Result<T, FragmentError>;

/// Why a markup string cannot be used as a drop-in post node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    /// Nothing but whitespace.
    #[error("fragment is empty")]
    Empty,

    /// More than one top-level element.
    #[error("fragment has {0} root elements, expected exactly one")]
    MultipleRoots(usize),

    /// Non-whitespace text outside the root element.
    #[error("fragment has text outside its root element")]
    TextOutsideRoot,

    /// An element was still open at the end of input.
    #[error("unclosed <{0}> element")]
    Unclosed(String),

    /// A closing tag did not match the open element.
    #[error("mismatched closing tag </{found}>, expected </{expected}>")]
    Mismatched { expected: String, found: String },

    /// Syntax the tokenizer cannot make sense of.
    #[error("malformed markup at byte {0}")]
    Malformed(usize),
}

/// Parse a markup fragment, requiring exactly one root element.
///
/// Whitespace-only text around the root is tolerated and dropped; anything
/// else at the top level is an error.
pub fn parse_fragment(input: &str) -> FragmentResult<Element> {
    let mut parser = Parser { input, pos: 0 };
    let nodes = parser.parse_children(None)?;

    let mut roots = Vec::new();
    for node in nodes {
        match node {
            Node::Element(el) => roots.push(el),
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Text(_) => return Err(FragmentError::TextOutsideRoot),
        }
    }

    match roots.len() {
        0 => Err(FragmentError::Empty),
        1 => Ok(roots.pop().unwrap_or_default()),
        n => Err(FragmentError::MultipleRoots(n)),
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    /// Parse child nodes until the matching close tag (or end of input when
    /// parsing the top level).
    fn parse_children(&mut self, enclosing: Option<&str>) -> FragmentResult<Vec<Node>> {
        let mut children = Vec::new();
        loop {
            if self.rest().is_empty() {
                return match enclosing {
                    Some(tag) => Err(FragmentError::Unclosed(tag.to_string())),
                    None => Ok(children),
                };
            }

            if self.eat("<!--") {
                match self.rest().find("-->") {
                    Some(end) => self.pos += end + 3,
                    None => return Err(FragmentError::Malformed(self.pos)),
                }
                continue;
            }

            if self.eat("</") {
                let tag = self.parse_name()?;
                self.skip_whitespace();
                if !self.eat(">") {
                    return Err(FragmentError::Malformed(self.pos));
                }
                return match enclosing {
                    Some(open) if tag.eq_ignore_ascii_case(open) => Ok(children),
                    Some(open) => Err(FragmentError::Mismatched {
                        expected: open.to_string(),
                        found: tag,
                    }),
                    // A stray close tag at the top level has no matching open
                    None => Err(FragmentError::Mismatched {
                        expected: String::new(),
                        found: tag,
                    }),
                };
            }

            if self.peek() == Some('<') {
                children.push(Node::Element(self.parse_element()?));
            } else {
                children.push(Node::Text(self.parse_text()));
            }
        }
    }

    fn parse_element(&mut self) -> FragmentResult<Element> {
        debug_assert_eq!(self.peek(), Some('<'));
        self.bump();
        let tag = self.parse_name()?;
        let mut element = Element::new(tag.to_ascii_lowercase());

        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return Ok(element);
            }
            if self.eat(">") {
                break;
            }
            let (name, value) = self.parse_attribute()?;
            element.attributes.push((name, value));
        }

        if VOID_TAGS.contains(&element.tag.as_str()) {
            return Ok(element);
        }

        element.children = self.parse_children(Some(&element.tag))?;
        Ok(element)
    }

    fn parse_name(&mut self) -> FragmentResult<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
        {
            self.bump();
        }
        if self.pos == start {
            return Err(FragmentError::Malformed(self.pos));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_attribute(&mut self) -> FragmentResult<(String, String)> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        if !self.eat("=") {
            // Boolean attribute
            return Ok((name.to_ascii_lowercase(), String::new()));
        }
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                match self.rest().find(quote) {
                    Some(end) => {
                        self.pos += end + quote.len_utf8();
                        decode_entities(&self.input[start..self.pos - 1])
                    }
                    None => return Err(FragmentError::Malformed(start)),
                }
            }
            Some(_) => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/')
                {
                    self.bump();
                }
                decode_entities(&self.input[start..self.pos])
            }
            None => return Err(FragmentError::Malformed(self.pos)),
        };

        Ok((name.to_ascii_lowercase(), value))
    }

    fn parse_text(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '<') {
            self.bump();
        }
        decode_entities(&self.input[start..self.pos])
    }
}

/// Decode the character entities the backend's renderer emits.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find('&') {
        result.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let Some(end) = rest.find(';') else {
            result.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix('#')
                .and_then(|num| {
                    if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        num.parse().ok()
                    }
                })
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}
