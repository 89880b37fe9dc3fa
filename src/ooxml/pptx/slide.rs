//! Editing a single slide part in place.
//!
//! A [`SlideEditor`] parses one slide and its relationships, exposes the
//! slide's top-level shapes as [`Region`]s, and applies edits to them. Nothing
//! is written to the package until [`SlideEditor::commit`].
use crate::common::RGBColor;
use crate::common::error::{Error, Result};
use crate::common::xml::{Element, Node, XmlDocument};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::pptx::namespaces::Namespaces;
use crate::ooxml::pptx::shapes::base::{Region, ShapeType, set_solid_fill, shape_name};
use crate::ooxml::pptx::shapes::picture;
use crate::ooxml::pptx::shapes::table::{Table, TableFill};
use crate::ooxml::pptx::shapes::textframe::{Paragraphs, RunStyle, TextFrame, frame_text};
use tracing::debug;

/// Handle to one region of the slide being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

/// The mutable document object for one slide.
pub struct SlideEditor<'a> {
    opc: &'a mut OpcPackage,
    partname: PackURI,
    slide_number: u32,
    doc: XmlDocument,
    rels: Relationships,
    ns: Namespaces,
    regions: Vec<Region>,
    rels_dirty: bool,
}

impl std::fmt::Debug for SlideEditor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideEditor")
            .field("partname", &self.partname)
            .field("slide_number", &self.slide_number)
            .field("regions", &self.regions)
            .finish()
    }
}

impl<'a> SlideEditor<'a> {
    pub(crate) fn open(opc: &'a mut OpcPackage, partname: PackURI, slide_number: u32) -> Result<Self> {
        let doc = XmlDocument::parse(opc.require_part(&partname)?)?;
        let rels = opc.rels_for(&partname)?;
        let ns = Namespaces::detect(&doc.root);

        let sp_tree = doc
            .root
            .path(&["cSld", "spTree"])
            .ok_or_else(|| Error::InvalidFormat(format!("{} has no p:spTree", partname)))?;
        let regions = sp_tree
            .children
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match node {
                Node::Element(e) if !matches!(e.local_name(), "nvGrpSpPr" | "grpSpPr" | "extLst") => {
                    Some(Region {
                        index,
                        shape_type: ShapeType::of(e),
                        name: shape_name(e).unwrap_or_default(),
                    })
                },
                _ => None,
            })
            .collect();

        Ok(Self {
            opc,
            partname,
            slide_number,
            doc,
            rels,
            ns,
            regions,
            rels_dirty: false,
        })
    }

    /// 1-based number of the slide in presentation order.
    #[inline]
    pub fn slide_number(&self) -> u32 {
        self.slide_number
    }

    /// Top-level shapes in document order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.0]
    }

    /// First region, in document order, whose type passes `accept` and whose name passes `matches`.
    ///
    /// Several regions may match; the first one wins and the rest are only logged.
    pub fn find(
        &self,
        accept: impl Fn(ShapeType) -> bool,
        matches: impl Fn(&str) -> bool,
    ) -> Option<RegionId> {
        let hits = self.find_all(accept, matches);
        let first = *hits.first()?;
        if hits.len() > 1 {
            debug!(
                slide = self.slide_number,
                chosen = %self.regions[first.0].name,
                others = ?hits[1..].iter().map(|id| &self.regions[id.0].name).collect::<Vec<_>>(),
                "ambiguous region name; first match wins"
            );
        }
        Some(first)
    }

    /// Every matching region in document order.
    pub fn find_all(
        &self,
        accept: impl Fn(ShapeType) -> bool,
        matches: impl Fn(&str) -> bool,
    ) -> Vec<RegionId> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| accept(r.shape_type) && matches(&r.name))
            .map(|(i, _)| RegionId(i))
            .collect()
    }

    fn sp_tree_mut(doc: &mut XmlDocument) -> Result<&mut Element> {
        doc.root
            .path_mut(&["cSld", "spTree"])
            .ok_or_else(|| Error::InvalidFormat("slide has no p:spTree".to_string()))
    }

    fn shape(&self, id: RegionId) -> Option<&Element> {
        let index = self.regions.get(id.0)?.index;
        match self.doc.root.path(&["cSld", "spTree"])?.children.get(index)? {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The shape element and the namespace prefixes, borrowed together.
    fn shape_mut(&mut self, id: RegionId) -> Result<(&mut Element, &Namespaces)> {
        let index = self
            .regions
            .get(id.0)
            .map(|r| r.index)
            .ok_or_else(|| Error::ComponentNotFound(format!("region #{}", id.0)))?;
        let sp_tree = Self::sp_tree_mut(&mut self.doc)?;
        match sp_tree.children.get_mut(index) {
            Some(Node::Element(e)) => Ok((e, &self.ns)),
            _ => Err(Error::ComponentNotFound(format!("region #{}", id.0))),
        }
    }

    /// Current text of a shape, paragraphs joined by newlines.
    pub fn text(&self, id: RegionId) -> String {
        self.shape(id)
            .and_then(|s| s.child("txBody"))
            .map(frame_text)
            .unwrap_or_default()
    }

    /// Replace the text of a text shape.
    pub fn set_text(&mut self, id: RegionId, text: &str) -> Result<()> {
        let (shape, ns) = self.shape_mut(id)?;
        TextFrame::of_shape(shape, ns).set_text(text);
        debug!(slide = self.slide_number, region = %self.regions[id.0].name, "text replaced");
        Ok(())
    }

    /// Style the runs of a text shape.
    pub fn style_text(&mut self, id: RegionId, which: Paragraphs, style: &RunStyle) -> Result<usize> {
        let (shape, ns) = self.shape_mut(id)?;
        Ok(TextFrame::of_shape(shape, ns).style_runs(which, style))
    }

    /// Make every run of a text shape a hyperlink to `url`.
    pub fn link_text(&mut self, id: RegionId, url: &str) -> Result<()> {
        let r_id = self.rels.get_or_add_ext_rel(rt::HYPERLINK, url);
        self.rels_dirty = true;
        self.ns.ensure_r(&mut self.doc.root);
        let (shape, ns) = self.shape_mut(id)?;
        TextFrame::of_shape(shape, ns).link_runs(&r_id);
        Ok(())
    }

    /// Fill a shape's background with a solid colour. Returns false when the shape has no fill.
    pub fn fill_shape(&mut self, id: RegionId, color: RGBColor) -> Result<bool> {
        let (shape, ns) = self.shape_mut(id)?;
        Ok(set_solid_fill(shape, color, ns))
    }

    /// Write rows into the table held by a graphic frame.
    pub fn fill_table(&mut self, id: RegionId, data: &[Vec<String>]) -> Result<TableFill> {
        let (frame, ns) = self.shape_mut(id)?;
        let mut table = Table::of_frame(frame, ns)
            .ok_or_else(|| Error::ComponentNotFound("a:tbl in graphic frame".to_string()))?;
        Ok(table.fill(data))
    }

    /// Style every cell of one table row.
    pub fn style_table_row(&mut self, id: RegionId, row: usize, style: &RunStyle) -> Result<usize> {
        let (frame, ns) = self.shape_mut(id)?;
        Ok(Table::of_frame(frame, ns).map_or(0, |mut t| t.style_row(row, style)))
    }

    /// Text of a table cell.
    pub fn table_cell_text(&mut self, id: RegionId, row: usize, col: usize) -> Option<String> {
        let (frame, ns) = self.shape_mut(id).ok()?;
        Table::of_frame(frame, ns)?.cell_text(row, col)
    }

    /// Replace the image shown by a picture shape, keeping the shape itself.
    ///
    /// The image is stored as a new media part; the old part is left for any
    /// other slide that shares it, and the old relationship is removed once
    /// nothing on this slide refers to it.
    pub fn replace_picture(&mut self, id: RegionId, image: &[u8]) -> Result<PackURI> {
        let format = ImageFormat::detect_from_bytes(image)
            .ok_or_else(|| Error::Validation("image data is not PNG, JPEG, GIF, BMP, TIFF or WebP".to_string()))?;

        let old_r_id = {
            let pic = self
                .shape(id)
                .filter(|s| ShapeType::of(s) == ShapeType::Picture)
                .ok_or_else(|| Error::Validation(format!("region '{}' is not a picture", self.regions[id.0].name)))?;
            picture::embedded_r_id(pic, &self.ns)
        };

        let media = self.opc.next_partname("/ppt/media/image", format.extension());
        self.opc.set_part(&media, image.to_vec());
        let mut content_types = self.opc.content_types()?;
        if content_types.ensure_default(format.extension(), format.mime_type()) {
            self.opc.set_content_types(&content_types);
        }

        let r_id = self
            .rels
            .get_or_add(rt::IMAGE, &media.relative_ref(self.partname.base_uri()));
        self.rels_dirty = true;
        self.ns.ensure_r(&mut self.doc.root);

        let (pic, ns) = self.shape_mut(id)?;
        if !picture::repoint(pic, &r_id, ns) {
            return Err(Error::InvalidFormat("picture has no a:blip".to_string()));
        }

        if let Some(old) = old_r_id
            && !self.references(&old)
        {
            self.rels.remove(&old);
        }

        debug!(slide = self.slide_number, region = %self.regions[id.0].name, media = %media, "picture replaced");
        Ok(media)
    }

    /// Whether any relationship-namespace attribute in the slide refers to `r_id`.
    fn references(&self, r_id: &str) -> bool {
        let prefix = self.ns.r("");
        fn walk(elem: &Element, prefix: &str, r_id: &str) -> bool {
            elem.attrs().any(|(k, v)| k.starts_with(prefix) && v == r_id)
                || elem.elements().any(|c| walk(c, prefix, r_id))
        }
        walk(&self.doc.root, &prefix, r_id)
    }

    /// Write the slide, and its relationships when they changed, back to the package.
    pub fn commit(self) -> Result<()> {
        self.opc.set_part(&self.partname, self.doc.to_bytes());
        if self.rels_dirty {
            self.opc.set_rels(&self.partname, &self.rels);
        }
        Ok(())
    }
}
