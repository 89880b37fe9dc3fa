//! Namespace prefixes in use by a slide part.
//!
//! Templates produced by PowerPoint use `a:`, `p:` and `r:`, but other
//! producers are free to choose their own prefixes. New elements must be
//! written with whatever prefix the part's root element declares.
use crate::common::xml::Element;
use crate::ooxml::opc::constants::namespace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    a: String,
    p: String,
    r: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            a: "a".to_string(),
            p: "p".to_string(),
            r: "r".to_string(),
        }
    }
}

impl Namespaces {
    /// Read prefix declarations from a part's root element.
    ///
    /// An empty prefix means the namespace is the default namespace.
    pub fn detect(root: &Element) -> Self {
        let mut ns = Self::default();
        for (key, value) in root.attrs() {
            let prefix = match key.strip_prefix("xmlns") {
                Some("") => "",
                Some(rest) => match rest.strip_prefix(':') {
                    Some(p) => p,
                    None => continue,
                },
                None => continue,
            };
            match value {
                namespace::DML_MAIN => ns.a = prefix.to_string(),
                namespace::PML_MAIN => ns.p = prefix.to_string(),
                namespace::OFC_RELATIONSHIPS => ns.r = prefix.to_string(),
                _ => {},
            }
        }
        ns
    }

    /// Declare the relationships namespace on `root` when it is missing.
    pub fn ensure_r(&mut self, root: &mut Element) {
        let declared = root
            .attrs()
            .any(|(k, v)| k.starts_with("xmlns:") && v == namespace::OFC_RELATIONSHIPS);
        if !declared {
            root.set_attr("xmlns:r", namespace::OFC_RELATIONSHIPS);
            self.r = "r".to_string();
        }
    }

    fn qualify(prefix: &str, local: &str) -> String {
        if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", prefix, local)
        }
    }

    /// DrawingML element name.
    pub fn a(&self, local: &str) -> String {
        Self::qualify(&self.a, local)
    }

    /// PresentationML element name.
    pub fn p(&self, local: &str) -> String {
        Self::qualify(&self.p, local)
    }

    /// Relationships-namespace attribute name (attributes never use the default namespace).
    pub fn r(&self, local: &str) -> String {
        Self::qualify(&self.r, local)
    }
}
