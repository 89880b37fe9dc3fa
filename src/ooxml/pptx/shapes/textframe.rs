/// Text frames (`p:txBody` / `a:txBody`) and their runs.
use crate::common::RGBColor;
use crate::common::xml::Element;
use crate::ooxml::pptx::namespaces::Namespaces;
use crate::ooxml::pptx::shapes::base::{replace_fill, solid_fill};

// Children of CT_TextCharacterProperties that come after the fill.
const AFTER_RUN_FILL: &[&str] = &[
    "effectLst",
    "effectDag",
    "highlight",
    "uLnTx",
    "uLn",
    "uFillTx",
    "uFill",
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// Character formatting applied to every run of the selected paragraphs.
///
/// Absent fields leave the run's existing (template) formatting alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStyle {
    pub color: Option<RGBColor>,
    /// Size in points
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl RunStyle {
    pub fn color(color: Option<RGBColor>) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: Some(true),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Option<RGBColor>) -> Self {
        self.color = color.or(self.color);
        self
    }

    pub fn with_size(mut self, size: Option<u32>) -> Self {
        self.size = size.or(self.size);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, r_pr: &mut Element, ns: &Namespaces) {
        if let Some(color) = self.color {
            replace_fill(r_pr, solid_fill(color, ns), AFTER_RUN_FILL);
        }
        if let Some(size) = self.size {
            r_pr.set_attr("sz", &(size * 100).to_string());
        }
        if let Some(bold) = self.bold {
            r_pr.set_attr("b", if bold { "1" } else { "0" });
        }
        if let Some(italic) = self.italic {
            r_pr.set_attr("i", if italic { "1" } else { "0" });
        }
    }
}

/// Which paragraphs of a text frame a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paragraphs {
    All,
    Nth(usize),
}

/// Text of each paragraph in a text body, with `a:br` as a vertical tab.
pub fn paragraph_texts(tx_body: &Element) -> Vec<String> {
    tx_body
        .children_named("p")
        .map(|p| {
            let mut text = String::new();
            for child in p.elements() {
                match child.local_name() {
                    "r" | "fld" => {
                        if let Some(t) = child.child("t") {
                            text.push_str(&t.text());
                        }
                    },
                    "br" => text.push('\u{b}'),
                    _ => {},
                }
            }
            text
        })
        .collect()
}

/// All text of a text body, paragraphs joined by newlines.
pub fn frame_text(tx_body: &Element) -> String {
    paragraph_texts(tx_body).join("\n")
}

/// A writable view of one text body.
pub struct TextFrame<'a> {
    tx_body: &'a mut Element,
    ns: &'a Namespaces,
}

impl<'a> TextFrame<'a> {
    pub fn new(tx_body: &'a mut Element, ns: &'a Namespaces) -> Self {
        Self { tx_body, ns }
    }

    /// The `p:txBody` of a `p:sp`, created with an empty paragraph when missing.
    pub fn of_shape(shape: &'a mut Element, ns: &'a Namespaces) -> Self {
        let tx_body = shape.ensure_child("txBody", || empty_body(ns.p("txBody"), ns), &["extLst"]);
        Self { tx_body, ns }
    }

    /// The `a:txBody` of a table cell, created when missing.
    pub fn of_cell(tc: &'a mut Element, ns: &'a Namespaces) -> Self {
        let tx_body = tc.ensure_child(
            "txBody",
            || empty_body(ns.a("txBody"), ns),
            &["tcPr", "extLst"],
        );
        Self { tx_body, ns }
    }

    pub fn text(&self) -> String {
        frame_text(self.tx_body)
    }

    /// Replace the text with one paragraph per line, one run per paragraph.
    ///
    /// The first paragraph's `a:pPr` and `a:endParaRPr` and the first run's
    /// `a:rPr` are reused for every new paragraph, so a region keeps its
    /// template alignment, font, size and colour unless a style overrides them.
    pub fn set_text(&mut self, text: &str) {
        let ns = self.ns;
        let first_p = self.tx_body.child("p");
        let p_pr = first_p.and_then(|p| p.child("pPr")).cloned();
        let end_rpr = first_p.and_then(|p| p.child("endParaRPr")).cloned();
        let r_pr = self
            .tx_body
            .children_named("p")
            .flat_map(|p| p.children_named("r"))
            .find_map(|r| r.child("rPr"))
            .cloned()
            .or_else(|| {
                end_rpr.as_ref().map(|e| {
                    let mut r = e.clone();
                    r.name = ns.a("rPr");
                    r
                })
            })
            .map(|mut r| {
                // Spell-check and dirty flags belong to the old text.
                r.remove_attr("err");
                r.remove_attr("dirty");
                r
            });

        self.tx_body.remove_named("p");
        for line in text.split('\n') {
            let mut p = Element::new(ns.a("p"));
            if let Some(p_pr) = &p_pr {
                p.push(p_pr.clone());
            }
            if !line.is_empty() {
                let mut run = Element::new(ns.a("r"));
                if let Some(r_pr) = &r_pr {
                    run.push(r_pr.clone());
                }
                run.push(Element::new(ns.a("t")).with_text(line));
                p.push(run);
            }
            if let Some(end_rpr) = &end_rpr {
                p.push(end_rpr.clone());
            }
            self.tx_body.insert_before(p, &["extLst"]);
        }
    }

    /// Apply a style to every run of the selected paragraphs. Returns the number of runs touched.
    pub fn style_runs(&mut self, which: Paragraphs, style: &RunStyle) -> usize {
        if style.is_empty() {
            return 0;
        }
        let ns = self.ns;
        let mut touched = 0;
        for (i, p) in self
            .tx_body
            .elements_mut()
            .filter(|e| e.local_name() == "p")
            .enumerate()
        {
            if let Paragraphs::Nth(n) = which
                && n != i
            {
                continue;
            }
            for run in p.elements_mut().filter(|e| e.local_name() == "r") {
                let r_pr = run.ensure_child("rPr", || Element::new(ns.a("rPr")), &["t"]);
                style.apply(r_pr, ns);
                touched += 1;
            }
        }
        touched
    }

    /// Attach a click hyperlink (by relationship id) to every run.
    pub fn link_runs(&mut self, r_id: &str) -> usize {
        let ns = self.ns;
        let r_id_attr = ns.r("id");
        let mut touched = 0;
        for p in self.tx_body.elements_mut().filter(|e| e.local_name() == "p") {
            for run in p.elements_mut().filter(|e| e.local_name() == "r") {
                let r_pr = run.ensure_child("rPr", || Element::new(ns.a("rPr")), &["t"]);
                r_pr.remove_named("hlinkClick");
                r_pr.insert_before(
                    Element::new(ns.a("hlinkClick")).with_attr(&r_id_attr, r_id),
                    &["hlinkMouseOver", "rtl", "extLst"],
                );
                touched += 1;
            }
        }
        touched
    }
}

fn empty_body(name: String, ns: &Namespaces) -> Element {
    Element::new(name)
        .with_child(Element::new(ns.a("bodyPr")))
        .with_child(Element::new(ns.a("lstStyle")))
        .with_child(Element::new(ns.a("p")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlDocument;

    const BODY: &str = r#"<p:txBody xmlns:p="p" xmlns:a="a"><a:bodyPr/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="2400" dirty="0" err="1"><a:latin typeface="Arial"/></a:rPr><a:t>Overview</a:t></a:r><a:endParaRPr lang="en-US"/></a:p><a:p><a:r><a:t>second</a:t></a:r></a:p></p:txBody>"#;

    fn body() -> Element {
        XmlDocument::parse(BODY.as_bytes()).unwrap().root
    }

    #[test]
    fn test_set_text_reuses_template_properties() {
        let mut tx = body();
        let ns = Namespaces::default();
        let mut frame = TextFrame::new(&mut tx, &ns);
        frame.set_text("Q4 Results\nR&D");
        assert_eq!(frame.text(), "Q4 Results\nR&D");
        assert_eq!(
            tx.to_xml(),
            concat!(
                r#"<p:txBody xmlns:p="p" xmlns:a="a"><a:bodyPr/><a:lstStyle/>"#,
                r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="2400"><a:latin typeface="Arial"/></a:rPr><a:t>Q4 Results</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#,
                r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="2400"><a:latin typeface="Arial"/></a:rPr><a:t>R&amp;D</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#,
                r#"</p:txBody>"#
            )
        );
    }

    #[test]
    fn test_empty_line_has_no_run() {
        let mut tx = body();
        let ns = Namespaces::default();
        TextFrame::new(&mut tx, &ns).set_text("");
        assert_eq!(tx.count_named("p"), 1);
        assert!(tx.find("r").is_none());
    }

    #[test]
    fn test_style_runs_nth_paragraph() {
        let mut tx = body();
        let ns = Namespaces::default();
        let mut frame = TextFrame::new(&mut tx, &ns);
        let style = RunStyle::bold()
            .with_color(RGBColor::parse("#FF0000").ok())
            .with_size(Some(18));
        assert_eq!(frame.style_runs(Paragraphs::Nth(1), &style), 1);

        let second = tx.nth_named_mut("p", 1).unwrap();
        assert_eq!(
            second.to_xml(),
            r#"<a:p><a:r><a:rPr sz="1800" b="1"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:rPr><a:t>second</a:t></a:r></a:p>"#
        );
    }

    #[test]
    fn test_color_goes_before_latin() {
        let mut tx = body();
        let ns = Namespaces::default();
        let green = RunStyle::color(RGBColor::parse("#00FF00").ok());
        TextFrame::new(&mut tx, &ns).style_runs(Paragraphs::Nth(0), &green);
        let r_pr = tx.find("rPr").unwrap();
        let names: Vec<_> = r_pr.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(names, ["solidFill", "latin"]);
    }

    #[test]
    fn test_link_runs() {
        let mut tx = body();
        let ns = Namespaces::default();
        assert_eq!(TextFrame::new(&mut tx, &ns).link_runs("rId7"), 2);
        assert_eq!(tx.find_all("hlinkClick").len(), 2);
        assert_eq!(tx.find("hlinkClick").unwrap().attr("r:id").as_deref(), Some("rId7"));
    }

    #[test]
    fn test_of_shape_creates_body() {
        let mut sp = XmlDocument::parse(br#"<p:sp xmlns:p="p"><p:spPr/></p:sp>"#).unwrap().root;
        let ns = Namespaces::default();
        TextFrame::of_shape(&mut sp, &ns).set_text("hi");
        assert_eq!(
            sp.to_xml(),
            r#"<p:sp xmlns:p="p"><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>hi</a:t></a:r></a:p></p:txBody></p:sp>"#
        );
    }
}
