//! Package implementation for PowerPoint presentations.
use crate::common::error::{Error, Result};
use crate::common::xml::XmlDocument;
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::namespaces::Namespaces;
use crate::ooxml::pptx::slide::SlideEditor;

/// A PowerPoint (.pptx) package.
///
/// Wraps an OPC package and resolves the presentation's slide order, which
/// comes from `p:sldIdLst` in the main part and not from part names.
///
/// # Examples
///
/// ```rust,no_run
/// use deckfill::ooxml::pptx::Package;
///
/// let bytes = std::fs::read("deck.pptx")?;
/// let pkg = Package::open(&bytes)?;
/// println!("Presentation has {} slides", pkg.slide_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    opc: OpcPackage,
    /// Slide part names in presentation order.
    slides: Vec<PackURI>,
}

impl Package {
    /// Parse a .pptx package from its bytes.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let opc = OpcPackage::from_bytes(bytes)?;
        let main = opc
            .main_document_partname()
            .map_err(|e| Error::ComponentNotFound(format!("main presentation part: {}", e)))?;

        // Support regular, macro-enabled, template and show presentations
        let content_type = opc.content_types()?.content_type_for(&main).unwrap_or_default();
        if ![
            ct::PML_PRESENTATION_MAIN,
            ct::PML_PRES_MACRO_MAIN,
            ct::PML_TEMPLATE_MAIN,
            ct::PML_SLIDESHOW_MAIN,
        ]
        .contains(&content_type.as_str())
        {
            return Err(Error::InvalidFormat(format!(
                "main part {} has content type '{}', not a presentation",
                main, content_type
            )));
        }

        let slides = Self::slide_order(&opc, &main)?;
        Ok(Self { opc, slides })
    }

    fn slide_order(opc: &OpcPackage, main: &PackURI) -> Result<Vec<PackURI>> {
        let doc = XmlDocument::parse(opc.require_part(main)?)?;
        let rels = opc.rels_for(main)?;
        let ns = Namespaces::detect(&doc.root);
        let r_id_attr = ns.r("id");

        let Some(list) = doc.root.child("sldIdLst") else {
            return Ok(Vec::new());
        };

        let mut slides = Vec::new();
        for sld_id in list.children_named("sldId") {
            let r_id = sld_id
                .attr(&r_id_attr)
                .ok_or_else(|| Error::InvalidFormat("p:sldId without r:id".to_string()))?;
            let rel = rels.get(&r_id).ok_or_else(|| {
                Error::ComponentNotFound(format!("slide relationship {} of {}", r_id, main))
            })?;
            if rel.reltype() != rt::SLIDE {
                return Err(Error::InvalidFormat(format!(
                    "{} in p:sldIdLst is not a slide relationship",
                    r_id
                )));
            }
            slides.push(rel.target_partname()?);
        }
        Ok(slides)
    }

    /// Number of slides in the presentation.
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Part name of the slide with 1-based number `slide_number`.
    pub fn slide_partname(&self, slide_number: u32) -> Result<&PackURI> {
        (slide_number as usize)
            .checked_sub(1)
            .and_then(|index| self.slides.get(index))
            .ok_or(Error::SlideNotFound {
                slide_number,
                slide_count: self.slides.len(),
            })
    }

    /// Open the slide with 1-based number `slide_number` for editing.
    pub fn slide_editor(&mut self, slide_number: u32) -> Result<SlideEditor<'_>> {
        let partname = self.slide_partname(slide_number)?.clone();
        SlideEditor::open(&mut self.opc, partname, slide_number)
    }

    /// The underlying OPC package.
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    /// Serialize the presentation back to .pptx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }
}
