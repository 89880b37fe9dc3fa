//! Lossless mutable XML element tree.
//!
//! Parts are parsed once into an [`XmlDocument`], edited in place, and written
//! back. Everything the editor does not touch (declarations, comments,
//! processing instructions, attribute quoting, entity references in text)
//! is kept as the raw source slice so that re-serialization reproduces it.
use crate::common::error::{Error, Result};
use crate::common::xml::escape::{escape_xml, unescape_xml};
use quick_xml::Reader;
use quick_xml::events::Event;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, stored escaped exactly as it appears in the source.
    Text(String),
    /// Comment, CDATA, processing instruction or declaration, stored raw.
    Other(String),
}

/// An XML element with raw (escaped) attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// Written as `<x/>` when it still has no children.
    self_closing: bool,
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    bom: bool,
    prolog: Vec<Node>,
    pub root: Element,
    epilog: Vec<Node>,
}

/// Return the part of a qualified name after the prefix.
#[inline]
pub fn local_name(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

fn to_string(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| Error::XmlError(format!("invalid UTF-8 in XML: {}", e)))
}

impl XmlDocument {
    /// Parse a complete XML part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let bom = bytes.starts_with(UTF8_BOM);
        let input = if bom { &bytes[UTF8_BOM.len()..] } else { bytes };

        let mut reader = Reader::from_reader(input);
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let end = reader.buffer_position() as usize;
            let raw = &input[start..end.min(input.len())];

            match event {
                Event::Start(e) => {
                    stack.push(Element::from_start(&e, false)?);
                },
                Event::Empty(e) => {
                    let elem = Element::from_start(&e, true)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(elem)),
                        None => Self::set_root(&mut root, elem)?,
                    }
                },
                Event::End(_) => {
                    let elem = stack
                        .pop()
                        .ok_or_else(|| Error::XmlError("unbalanced end tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(elem)),
                        None => Self::set_root(&mut root, elem)?,
                    }
                },
                Event::Text(_) | Event::GeneralRef(_) => {
                    let raw = to_string(raw)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_raw_text(raw),
                        None if root.is_none() => prolog.push(Node::Other(raw)),
                        None => epilog.push(Node::Other(raw)),
                    }
                },
                Event::Eof => break,
                _ => {
                    let node = Node::Other(to_string(raw)?);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None if root.is_none() => prolog.push(node),
                        None => epilog.push(node),
                    }
                },
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlError("unexpected end of document".to_string()));
        }
        let root = root.ok_or_else(|| Error::XmlError("document has no root element".to_string()))?;

        Ok(Self {
            bom,
            prolog,
            root,
            epilog,
        })
    }

    fn set_root(slot: &mut Option<Element>, elem: Element) -> Result<()> {
        if slot.is_some() {
            return Err(Error::XmlError("multiple root elements".to_string()));
        }
        *slot = Some(elem);
        Ok(())
    }

    /// Serialize back to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(4096);
        for node in &self.prolog {
            write_node(node, &mut out);
        }
        self.root.write_to(&mut out);
        for node in &self.epilog {
            write_node(node, &mut out);
        }
        let mut bytes = Vec::with_capacity(out.len() + 3);
        if self.bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(out.as_bytes());
        bytes
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(e) => e.write_to(out),
        Node::Text(raw) | Node::Other(raw) => out.push_str(raw),
    }
}

impl Element {
    /// Create an empty element with the given qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`Element::set_text`].
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    fn from_start(e: &quick_xml::events::BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let name = to_string(e.name().as_ref())?;
        let mut attrs = Vec::new();
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|e| Error::XmlError(e.to_string()))?;
            attrs.push((to_string(attr.key.as_ref())?, to_string(&attr.value)?));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
            self_closing,
        })
    }

    fn push_raw_text(&mut self, raw: String) {
        if let Some(Node::Text(prev)) = self.children.last_mut() {
            prev.push_str(&raw);
        } else {
            self.children.push(Node::Text(raw));
        }
    }

    /// Local part of this element's name.
    #[inline]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix of this element's name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    /// Unescaped value of the attribute with exactly this qualified name.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| unescape_xml(v))
    }

    /// All attributes as (qualified name, raw value) pairs.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set an attribute, escaping the value. Existing attributes keep their position.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = escape_xml(value);
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = escaped,
            None => self.attrs.push((name.to_string(), escaped)),
        }
    }

    /// Remove an attribute; returns true when it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(k, _)| k != name);
        before != self.attrs.len()
    }

    /// Iterate over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate mutably over child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Walk a path of local names through first-matching children.
    pub fn path(&self, locals: &[&str]) -> Option<&Element> {
        locals.iter().try_fold(self, |elem, local| elem.child(local))
    }

    pub fn path_mut(&mut self, locals: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in locals {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// Number of child elements with the given local name.
    pub fn count_named(&self, local: &str) -> usize {
        self.children_named(local).count()
    }

    /// Index into `children` of the `nth` child element with the given local name.
    pub fn position_named(&self, local: &str, nth: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, Node::Element(e) if e.local_name() == local))
            .nth(nth)
            .map(|(i, _)| i)
    }

    /// Mutable access to the `nth` child element with the given local name.
    pub fn nth_named_mut(&mut self, local: &str, nth: usize) -> Option<&mut Element> {
        self.elements_mut().filter(|e| e.local_name() == local).nth(nth)
    }

    /// Depth-first search for the first descendant with the given local name.
    pub fn find(&self, local: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find(local) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        for child in self.elements_mut() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find_mut(local) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order.
    pub fn find_all<'a>(&'a self, local: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(local, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, local: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.local_name() == local {
                found.push(child);
            }
            child.collect_named(local, found);
        }
    }

    /// Apply `f` to every descendant with the given local name.
    pub fn for_each_named_mut(&mut self, local: &str, f: &mut dyn FnMut(&mut Element)) {
        for child in self.elements_mut() {
            if child.local_name() == local {
                f(child);
            }
            child.for_each_named_mut(local, f);
        }
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert a child element at a position in `children`.
    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Insert a child element before the first child whose local name is in
    /// `before`, or append if none is present. Keeps schema ordering intact.
    /// Returns the index in `children` the element landed at.
    pub fn insert_before(&mut self, child: Element, before: &[&str]) -> usize {
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if before.contains(&e.local_name())))
            .unwrap_or(self.children.len());
        self.children.insert(pos, Node::Element(child));
        pos
    }

    /// Remove child elements with the given local name; returns how many went.
    pub fn remove_named(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.local_name() == local));
        before - self.children.len()
    }

    /// Remove the child node at `index` in `children`.
    pub fn remove_at(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Return the child with the local name, creating it with `make` when absent.
    pub fn ensure_child(
        &mut self,
        local: &str,
        make: impl FnOnce() -> Element,
        before: &[&str],
    ) -> &mut Element {
        let idx = match self.position_named(local, 0) {
            Some(i) => i,
            None => self.insert_before(make(), before),
        };
        match &mut self.children[idx] {
            Node::Element(e) => e,
            _ => unreachable!("index points at an element"),
        }
    }

    /// Unescaped direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(raw) => Some(unescape_xml(raw)),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single escaped text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(escape_xml(text)));
        }
    }

    /// Serialize this element.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            // Raw values from single-quoted source may carry a literal '"'.
            let quote = if v.contains('"') { '\'' } else { '"' };
            out.push('=');
            out.push(quote);
            out.push_str(v);
            out.push(quote);
        }
        if self.children.is_empty() && self.self_closing {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}
