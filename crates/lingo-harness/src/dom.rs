#![forbid(unsafe_code)]

//! Minimal in-memory DOM.
//!
//! Just enough of a document model to observe what directives write:
//! elements with attributes, text nodes, a fragment parser for markup
//! assignments, and `textContent`/`innerHTML` style readers.
//!
//! The fragment parser accepts well-formed tags and character
//! references. Anything it cannot read as a tag stays text. It does not
//! implement HTML tree-construction rules; unmatched close tags are
//! dropped and open elements are closed at the end of input.
//!
//! Serialization escapes through `v_htmlescape`, so markup produced by the
//! same escaper serializes back unchanged.

use std::cell::{Cell, RefCell};
use std::fmt::Write as _;

use lingo_runtime::Element;
use v_htmlescape::escape;

/// A DOM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(ElementNode),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl ElementNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of the attribute `name`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Node {
    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    fn serialize(&self, out: &mut String) {
        match self {
            Self::Text(text) => {
                let _ = write!(out, "{}", escape(text));
            }
            Self::Element(el) => {
                let _ = write!(out, "<{}", el.tag);
                for (name, value) in &el.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value));
                }
                out.push('>');
                serialize_children(&el.children, out);
                if !is_void(&el.tag) {
                    let _ = write!(out, "</{}>", el.tag);
                }
            }
        }
    }

    /// Elements in document order, this node included.
    pub fn elements(&self) -> Vec<&ElementNode> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a ElementNode>) {
        if let Self::Element(el) = self {
            out.push(el);
            for child in &el.children {
                child.collect_elements(out);
            }
        }
    }
}

fn serialize_children(children: &[Node], out: &mut String) {
    for child in children {
        child.serialize(out);
    }
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "wbr"
    )
}

/// Serialize `children` as `innerHTML` would.
#[must_use]
pub fn serialize(children: &[Node]) -> String {
    let mut out = String::new();
    serialize_children(children, &mut out);
    out
}

// ── Fragment parsing ────────────────────────────────────────────────

/// Parse a markup fragment into nodes.
#[must_use]
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let mut stack: Vec<ElementNode> = Vec::new();
    let mut root: Vec<Node> = Vec::new();
    let mut text = String::new();
    let mut rest = html;

    fn children<'a>(stack: &'a mut [ElementNode], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
        match stack.last_mut() {
            Some(open) => &mut open.children,
            None => root,
        }
    }

    fn flush(text: &mut String, stack: &mut [ElementNode], root: &mut Vec<Node>) {
        if !text.is_empty() {
            let decoded = decode_entities(text);
            children(stack, root).push(Node::Text(decoded));
            text.clear();
        }
    }

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        rest = &rest[lt..];
        match read_tag(rest) {
            Some((Tag::Open { name, attrs, self_closing }, len)) => {
                flush(&mut text, &mut stack, &mut root);
                let element = ElementNode {
                    tag: name,
                    attrs,
                    children: Vec::new(),
                };
                if self_closing || is_void(&element.tag) {
                    children(&mut stack, &mut root).push(Node::Element(element));
                } else {
                    stack.push(element);
                }
                rest = &rest[len..];
            }
            Some((Tag::Close { name }, len)) => {
                flush(&mut text, &mut stack, &mut root);
                if let Some(depth) = stack.iter().rposition(|el| el.tag == name) {
                    while stack.len() > depth {
                        close_top(&mut stack, &mut root);
                    }
                }
                rest = &rest[len..];
            }
            None => {
                text.push('<');
                rest = &rest[1..];
            }
        }
    }
    text.push_str(rest);
    flush(&mut text, &mut stack, &mut root);
    while !stack.is_empty() {
        close_top(&mut stack, &mut root);
    }
    root
}

fn close_top(stack: &mut Vec<ElementNode>, root: &mut Vec<Node>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(done)),
            None => root.push(Node::Element(done)),
        }
    }
}

enum Tag {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

/// Read a tag at the start of `input` (which begins with `<`).
/// Returns the tag and its byte length.
fn read_tag(input: &str) -> Option<(Tag, usize)> {
    let end = input.find('>')?;
    let inner = &input[1..end];
    let len = end + 1;

    if let Some(name) = inner.strip_prefix('/') {
        let name = name.trim();
        return is_name(name).then(|| {
            (
                Tag::Close {
                    name: name.to_ascii_lowercase(),
                },
                len,
            )
        });
    }

    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(inner) => (inner, true),
        None => (inner, false),
    };
    let name_len = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = &inner[..name_len];
    if !is_name(name) {
        return None;
    }
    let attrs = read_attrs(&inner[name_len..])?;
    Some((
        Tag::Open {
            name: name.to_ascii_lowercase(),
            attrs,
            self_closing,
        },
        len,
    ))
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn read_attrs(mut rest: &str) -> Option<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Some(attrs);
        }
        let name_len = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        if name.is_empty() {
            return None;
        }
        rest = rest[name_len..].trim_start();
        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let quote = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'')?;
            let body = &after_eq[1..];
            let close = body.find(quote)?;
            rest = &body[close + 1..];
            decode_entities(&body[..close])
        } else {
            String::new()
        };
        attrs.push((name.to_ascii_lowercase(), value));
    }
}

/// Decode named (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`)
/// and numeric (`&#39;`, `&#x2f;`) character references. Anything else is
/// kept as written.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi + 1)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

// ── Bound elements ──────────────────────────────────────────────────

/// An element directives write into.
///
/// Counts writes so tests can assert on redundant renders.
#[derive(Debug)]
pub struct DomElement {
    tag: String,
    children: RefCell<Vec<Node>>,
    writes: Cell<u64>,
}

impl DomElement {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            children: RefCell::new(Vec::new()),
            writes: Cell::new(0),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn text_content(&self) -> String {
        self.children
            .borrow()
            .iter()
            .map(Node::text_content)
            .collect()
    }

    #[must_use]
    pub fn inner_html(&self) -> String {
        serialize(&self.children.borrow())
    }

    /// Snapshot of the child nodes.
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        self.children.borrow().clone()
    }

    /// Number of writes since creation.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.get()
    }

    /// The first descendant element with `tag`.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<ElementNode> {
        self.children
            .borrow()
            .iter()
            .flat_map(Node::elements)
            .find(|el| el.tag == tag)
            .cloned()
    }

    fn replace(&self, children: Vec<Node>) {
        *self.children.borrow_mut() = children;
        self.writes.set(self.writes.get() + 1);
    }
}

impl Element for DomElement {
    fn set_text_content(&self, text: &str) {
        let children = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::Text(text.to_owned())]
        };
        self.replace(children);
    }

    fn set_inner_html(&self, html: &str) {
        self.replace(parse_fragment(html));
    }
}
