//! XML helpers shared by the package and slide layers.

pub mod escape;
pub mod tree;

pub use escape::{escape_xml, unescape_xml};
pub use tree::{Element, Node, XmlDocument, local_name};
