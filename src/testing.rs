//! In-memory `.pptx` fixtures for unit tests.
use crate::common::xml::{XmlDocument, escape_xml};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::pptx::Package;
use crate::ooxml::pptx::shapes::base::shape_name;
use crate::ooxml::pptx::shapes::textframe::frame_text;
use crate::mutate::SlideType;
use serde_json::{Value, json};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const NS_DECLS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const SLIDE_LAYOUT_RT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

/// Smallest byte string the format sniffer accepts as PNG.
pub(crate) const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

struct SlideFixture {
    shapes: Vec<String>,
    rels: Vec<(String, String, String)>,
}

/// Builds a minimal but well-formed presentation package.
pub(crate) struct PptxBuilder {
    slides: Vec<SlideFixture>,
    media: Vec<(String, Vec<u8>)>,
    reverse: bool,
    main_content_type: String,
}

impl PptxBuilder {
    pub(crate) fn new() -> Self {
        Self {
            slides: Vec::new(),
            media: Vec::new(),
            reverse: false,
            main_content_type: ct::PML_PRESENTATION_MAIN.to_string(),
        }
    }

    /// Add a slide holding the given top-level shapes.
    pub(crate) fn slide(self, shapes: Vec<String>) -> Self {
        self.slide_with_rels(shapes, Vec::new())
    }

    /// Add a slide with extra relationships `(rId, type, target)`; rId1 is the layout.
    pub(crate) fn slide_with_rels(mut self, shapes: Vec<String>, rels: Vec<(&str, &str, &str)>) -> Self {
        let rels = rels
            .into_iter()
            .map(|(id, ty, target)| (id.to_string(), ty.to_string(), target.to_string()))
            .collect();
        self.slides.push(SlideFixture { shapes, rels });
        self
    }

    /// Add a part under `ppt/media/`.
    pub(crate) fn media(mut self, name: &str, data: Vec<u8>) -> Self {
        self.media.push((name.to_string(), data));
        self
    }

    /// List slides in `p:sldIdLst` in reverse of their part numbering.
    pub(crate) fn reverse_order(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub(crate) fn main_content_type(mut self, content_type: &str) -> Self {
        self.main_content_type = content_type.to_string();
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();

        let mut types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>"#,
        );
        types.push_str(&format!(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{}"/>"#,
            self.main_content_type
        ));
        for i in 1..=self.slides.len() {
            types.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
                i,
                ct::PML_SLIDE
            ));
        }
        types.push_str("</Types>");
        files.push(("[Content_Types].xml".to_string(), types.into_bytes()));

        files.push((
            "_rels/.rels".to_string(),
            rels_xml(&[("rId1", rt::OFFICE_DOCUMENT, "ppt/presentation.xml")]).into_bytes(),
        ));

        let mut order: Vec<usize> = (1..=self.slides.len()).collect();
        if self.reverse {
            order.reverse();
        }
        let sld_ids: String = order
            .iter()
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 1))
            .collect();
        files.push((
            "ppt/presentation.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#,
                NS_DECLS, sld_ids
            )
            .into_bytes(),
        ));

        let targets: Vec<(String, String)> = (1..=self.slides.len())
            .map(|i| (format!("rId{}", i + 1), format!("slides/slide{}.xml", i)))
            .collect();
        let pres_rels: Vec<(&str, &str, &str)> = targets
            .iter()
            .map(|(id, target)| (id.as_str(), rt::SLIDE, target.as_str()))
            .collect();
        files.push(("ppt/_rels/presentation.xml.rels".to_string(), rels_xml(&pres_rels).into_bytes()));

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            files.push((
                format!("ppt/slides/slide{}.xml", n),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                    NS_DECLS,
                    slide.shapes.concat()
                )
                .into_bytes(),
            ));
            let mut rels = vec![("rId1", SLIDE_LAYOUT_RT, "../slideLayouts/slideLayout1.xml")];
            rels.extend(slide.rels.iter().map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str())));
            files.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), rels_xml(&rels).into_bytes()));
        }

        files.push((
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            format!(r#"<p:sldLayout {}/>"#, NS_DECLS).into_bytes(),
        ));
        for (name, data) in &self.media {
            files.push((format!("ppt/media/{}", name), data.clone()));
        }

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in files {
            zip.start_file(name, options).unwrap();
            zip.write_all(&data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

fn rels_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, ty, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id,
            ty,
            escape_xml(target)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn nv_pr(tag: &str, id: u32, name: &str, extra: &str) -> String {
    format!(
        r#"<p:nv{tag}Pr><p:cNvPr id="{id}" name="{}"/><p:cNv{tag}Pr/>{extra}<p:nvPr/></p:nv{tag}Pr>"#,
        escape_xml(name)
    )
}

/// A text box whose lines become paragraphs with template run formatting.
pub(crate) fn text_shape(id: u32, name: &str, text: &str) -> String {
    let paras: String = text
        .split('\n')
        .map(|line| {
            format!(
                r#"<a:p><a:pPr algn="l"/><a:r><a:rPr lang="en-US" sz="1800" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                escape_xml(line)
            )
        })
        .collect();
    format!(
        r#"<p:sp>{}<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="1000" cy="500"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        nv_pr("Sp", id, name, ""),
        paras
    )
}

/// A picture shape showing the image behind relationship `r_id`.
pub(crate) fn picture_shape(id: u32, name: &str, r_id: &str) -> String {
    format!(
        r#"<p:pic>{}<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="300" cy="200"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        nv_pr("Pic", id, name, ""),
        r_id
    )
}

/// A graphic frame holding a `rows` x `cols` table with cells "r{i}c{j}".
pub(crate) fn table_shape(id: u32, name: &str, rows: usize, cols: usize) -> String {
    let grid: String = (0..cols).map(|_| r#"<a:gridCol w="1000"/>"#).collect();
    let body: String = (0..rows)
        .map(|r| {
            let cells: String = (0..cols)
                .map(|c| {
                    format!(
                        r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>r{}c{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>"#,
                        r, c
                    )
                })
                .collect();
            format!(r#"<a:tr h="370840">{}</a:tr>"#, cells)
        })
        .collect();
    format!(
        r#"<p:graphicFrame>{}<p:xfrm><a:off x="0" y="0"/><a:ext cx="1000" cy="1000"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1"/><a:tblGrid>{}</a:tblGrid>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        nv_pr("GraphicFrame", id, name, ""),
        grid,
        body
    )
}

/// A group shape wrapping other shapes.
pub(crate) fn group_shape(id: u32, name: &str, inner: Vec<String>) -> String {
    format!(
        r#"<p:grpSp>{}<p:grpSpPr/>{}</p:grpSp>"#,
        nv_pr("GrpSp", id, name, ""),
        inner.concat()
    )
}

/// Raw XML of a slide part.
pub(crate) fn slide_xml(pptx: &[u8], slide_number: u32) -> Vec<u8> {
    let pkg = Package::open(pptx).unwrap();
    let partname = pkg.slide_partname(slide_number).unwrap().clone();
    pkg.opc().part(&partname).unwrap().to_vec()
}

/// Serialized XML of the top-level shape with exactly this name.
pub(crate) fn shape_xml(pptx: &[u8], slide_number: u32, name: &str) -> Option<String> {
    let doc = XmlDocument::parse(&slide_xml(pptx, slide_number)).unwrap();
    doc.root
        .path(&["cSld", "spTree"])?
        .elements()
        .find(|e| shape_name(e).as_deref() == Some(name))
        .map(|e| e.to_xml())
}

/// Text of the top-level shape with exactly this name.
pub(crate) fn shape_text(pptx: &[u8], slide_number: u32, name: &str) -> Option<String> {
    let doc = XmlDocument::parse(&slide_xml(pptx, slide_number)).unwrap();
    let shape = doc
        .root
        .path(&["cSld", "spTree"])?
        .elements()
        .find(|e| shape_name(e).as_deref() == Some(name))?;
    Some(shape.child("txBody").map(frame_text).unwrap_or_default())
}

/// Smallest record of each slide type carrying every required field.
pub(crate) fn minimal_record(ty: SlideType, slide_number: u32) -> Value {
    match ty {
        SlideType::Points => json!({"slide_number": slide_number, "header": "h", "description": "d"}),
        SlideType::ImageText => json!({"slide_number": slide_number, "title": "t", "text": "x"}),
        SlideType::Table => json!({"slide_number": slide_number, "title": "t", "table_data": [["a"]]}),
        SlideType::Phases => json!({
            "slide_number": slide_number,
            "title": "t",
            "phases": [{"name": "p", "description": "d"}],
        }),
        SlideType::Statistics => json!({
            "slide_number": slide_number,
            "title": "t",
            "stat_data": [{"label": "l", "value": 1}],
        }),
        SlideType::People => json!({
            "slide_number": slide_number,
            "title": "t",
            "names": ["Ada"],
            "designations": ["CTO"],
            "descriptions": ["Engines"],
        }),
        SlideType::Cover => json!({"slide_number": slide_number, "title": "t", "company_name": "c"}),
        SlideType::Contact => {
            json!({"slide_number": slide_number, "title": "t", "website_link": "https://x.test"})
        },
        SlideType::Images => json!({"slide_number": slide_number, "title": "t"}),
    }
}

/// Initialise a tracing subscriber that writes through the test harness.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
