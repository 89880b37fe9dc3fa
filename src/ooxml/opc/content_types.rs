//! The `[Content_Types].xml` part.
//!
//! Maps part names to content types through `Override` entries (exact part
//! name) and `Default` entries (by extension). Adding a new media part with an
//! extension the template has never used requires a new `Default` entry, or
//! PowerPoint will refuse to open the file.
use crate::common::xml::{Element, XmlDocument};
use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::packuri::PackURI;

#[derive(Debug, Clone)]
pub struct ContentTypes {
    doc: XmlDocument,
}

impl ContentTypes {
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: XmlDocument::parse(xml)?,
        })
    }

    /// Content type of a part: its `Override`, else the `Default` for its extension.
    pub fn content_type_for(&self, partname: &PackURI) -> Option<String> {
        let root = &self.doc.root;
        root.children_named("Override")
            .find(|o| {
                o.attr("PartName")
                    .is_some_and(|p| p.eq_ignore_ascii_case(partname.as_str()))
            })
            .and_then(|o| o.attr("ContentType"))
            .or_else(|| self.default_for(partname.ext()))
    }

    /// Content type registered for an extension, if any.
    pub fn default_for(&self, ext: &str) -> Option<String> {
        self.doc
            .root
            .children_named("Default")
            .find(|d| d.attr("Extension").is_some_and(|e| e.eq_ignore_ascii_case(ext)))
            .and_then(|d| d.attr("ContentType"))
    }

    /// Register `content_type` for `ext` unless the extension already has a Default.
    ///
    /// Returns true when an entry was added.
    pub fn ensure_default(&mut self, ext: &str, content_type: &str) -> bool {
        if self.default_for(ext).is_some() {
            return false;
        }
        let name = match self.doc.root.prefix() {
            Some(prefix) => format!("{}:Default", prefix),
            None => "Default".to_string(),
        };
        let entry = Element::new(name)
            .with_attr("Extension", &ext.to_ascii_lowercase())
            .with_attr("ContentType", content_type);
        self.doc.root.insert_before(entry, &["Override"]);
        true
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.doc.to_bytes()
    }
}
