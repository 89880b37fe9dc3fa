/// Base shape types for PowerPoint presentations.
use crate::common::RGBColor;
use crate::common::xml::Element;
use crate::ooxml::pptx::namespaces::Namespaces;

/// Shape type enumeration.
///
/// Indicates what kind of top-level element of `p:spTree` this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    /// An auto shape, text box or placeholder (p:sp); always has a text frame
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table (p:graphicFrame with a:tbl)
    Table,
    /// A graphic frame holding a chart, diagram or OLE object
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Unknown or unsupported shape type
    Unknown,
}

impl ShapeType {
    /// Classify a child element of `p:spTree`.
    pub fn of(elem: &Element) -> Self {
        match elem.local_name() {
            "sp" => Self::Shape,
            "pic" => Self::Picture,
            "graphicFrame" if elem.find("tbl").is_some() => Self::Table,
            "graphicFrame" => Self::GraphicFrame,
            "grpSp" => Self::GroupShape,
            "cxnSp" => Self::Connector,
            _ => Self::Unknown,
        }
    }

    /// Whether the shape carries a text frame that can be written to.
    #[inline]
    pub fn has_text_frame(&self) -> bool {
        matches!(self, Self::Shape)
    }
}

/// A top-level shape on a slide, addressed by its position in `p:spTree`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Index into the `children` of `p:spTree`
    pub(crate) index: usize,
    pub shape_type: ShapeType,
    /// Value of `cNvPr@name`, empty when absent
    pub name: String,
}

/// Name of a shape from its non-visual properties (`p:nvSpPr/p:cNvPr@name` and siblings).
pub fn shape_name(elem: &Element) -> Option<String> {
    elem.elements()
        .find(|e| e.local_name().starts_with("nv") && e.local_name().ends_with("Pr"))
        .and_then(|nv| nv.child("cNvPr"))
        .and_then(|c| c.attr("name"))
}

// Fill choices of CT_ShapeProperties and CT_TextCharacterProperties.
const FILL_ELEMENTS: &[&str] = &["noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill"];

// Elements that follow the fill in CT_ShapeProperties.
const AFTER_SHAPE_FILL: &[&str] = &["ln", "effectLst", "effectDag", "scene3d", "sp3d", "extLst"];

/// `<a:solidFill><a:srgbClr val="RRGGBB"/></a:solidFill>`
pub fn solid_fill(color: RGBColor, ns: &Namespaces) -> Element {
    Element::new(ns.a("solidFill"))
        .with_child(Element::new(ns.a("srgbClr")).with_attr("val", &color.to_hex()))
}

/// Replace any fill in a properties element with a solid colour placed in schema order.
pub(crate) fn replace_fill(props: &mut Element, fill: Element, after: &[&str]) {
    for name in FILL_ELEMENTS {
        props.remove_named(name);
    }
    props.insert_before(fill, after);
}

/// Give a shape a solid background fill. Returns false for shapes without shape properties.
pub fn set_solid_fill(shape: &mut Element, color: RGBColor, ns: &Namespaces) -> bool {
    let props_name = match ShapeType::of(shape) {
        ShapeType::Shape | ShapeType::Picture | ShapeType::Connector => "spPr",
        ShapeType::GroupShape => "grpSpPr",
        _ => return false,
    };
    let Some(props) = shape.child_mut(props_name) else {
        return false;
    };
    replace_fill(props, solid_fill(color, ns), AFTER_SHAPE_FILL);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlDocument;

    fn parse(xml: &str) -> Element {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    #[test]
    fn test_shape_type_and_name() {
        let sp = parse(r#"<p:sp xmlns:p="p"><p:nvSpPr><p:cNvPr id="4" name="Header1"/></p:nvSpPr></p:sp>"#);
        assert_eq!(ShapeType::of(&sp), ShapeType::Shape);
        assert_eq!(shape_name(&sp).as_deref(), Some("Header1"));

        let frame = parse(
            r#"<p:graphicFrame xmlns:p="p" xmlns:a="a"><p:nvGraphicFramePr><p:cNvPr id="5" name="Table 4"/></p:nvGraphicFramePr><a:graphic><a:graphicData><a:tbl/></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        assert_eq!(ShapeType::of(&frame), ShapeType::Table);
        assert_eq!(shape_name(&frame).as_deref(), Some("Table 4"));
    }

    #[test]
    fn test_set_solid_fill_replaces_existing() {
        let mut sp = parse(
            r#"<p:sp xmlns:p="p" xmlns:a="a"><p:spPr><a:prstGeom prst="rect"/><a:noFill/><a:ln/></p:spPr></p:sp>"#,
        );
        let ns = Namespaces::default();
        assert!(set_solid_fill(&mut sp, RGBColor::new(0x12, 0x34, 0x56), &ns));
        assert_eq!(
            sp.child("spPr").unwrap().to_xml(),
            r#"<p:spPr><a:prstGeom prst="rect"/><a:solidFill><a:srgbClr val="123456"/></a:solidFill><a:ln/></p:spPr>"#
        );
    }
}
