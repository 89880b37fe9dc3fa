/// Picture shapes (`p:pic`) and their image reference.
use crate::common::xml::{Element, Node};
use crate::ooxml::pptx::namespaces::Namespaces;

// a:ext uri carrying an SVG alternative of the raster image.
const SVG_BLIP_EXT: &str = "{96DAC541-7B7A-43D3-8B79-37D633B846F1}";

/// The `a:blip` of a picture.
pub fn blip(pic: &Element) -> Option<&Element> {
    pic.path(&["blipFill", "blip"])
}

/// Relationship id of the embedded image.
pub fn embedded_r_id(pic: &Element, ns: &Namespaces) -> Option<String> {
    blip(pic)?.attr(&ns.r("embed"))
}

/// Point the picture at another image relationship.
///
/// Crop, stretch, effects and geometry are left untouched. Any SVG
/// alternative and any external link are dropped because they would still
/// show the old image.
pub fn repoint(pic: &mut Element, r_id: &str, ns: &Namespaces) -> bool {
    let Some(blip) = pic.path_mut(&["blipFill", "blip"]) else {
        return false;
    };
    blip.set_attr(&ns.r("embed"), r_id);
    blip.remove_attr(&ns.r("link"));

    if let Some(ext_lst) = blip.child_mut("extLst") {
        let svg_idx = ext_lst.children.iter().position(|n| match n {
            Node::Element(e) => {
                e.local_name() == "ext" && e.attr("uri").as_deref() == Some(SVG_BLIP_EXT)
            },
            _ => false,
        });
        if let Some(i) = svg_idx {
            ext_lst.remove_at(i);
        }
        if ext_lst.count_named("ext") == 0 {
            blip.remove_named("extLst");
        }
    }
    true
}
