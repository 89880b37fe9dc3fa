/// Tables inside graphic frames (`p:graphicFrame/a:graphic/a:graphicData/a:tbl`).
use crate::common::xml::Element;
use crate::ooxml::pptx::namespaces::Namespaces;
use crate::ooxml::pptx::shapes::textframe::{Paragraphs, RunStyle, TextFrame, frame_text};

/// How much of the supplied data fitted into the template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFill {
    pub rows_written: usize,
    pub cols_written: usize,
    pub table_rows: usize,
    pub table_cols: usize,
    /// True when data rows or columns fell outside the table
    pub truncated: bool,
}

/// A writable view of one `a:tbl`.
pub struct Table<'a> {
    tbl: &'a mut Element,
    ns: &'a Namespaces,
}

impl<'a> Table<'a> {
    /// The table inside a graphic frame, if it holds one.
    pub fn of_frame(frame: &'a mut Element, ns: &'a Namespaces) -> Option<Self> {
        let tbl = frame.find_mut("tbl")?;
        Some(Self { tbl, ns })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.tbl.count_named("tr")
    }

    /// Number of grid columns.
    pub fn cols(&self) -> usize {
        match self.tbl.child("tblGrid") {
            Some(grid) => grid.count_named("gridCol"),
            None => self
                .tbl
                .children_named("tr")
                .map(|tr| tr.count_named("tc"))
                .max()
                .unwrap_or(0),
        }
    }

    /// Text of the cell at (row, col).
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        let tr = self.tbl.children_named("tr").nth(row)?;
        let tc = tr.children_named("tc").nth(col)?;
        Some(tc.child("txBody").map(frame_text).unwrap_or_default())
    }

    /// Write `data` cell by cell from the top-left corner.
    ///
    /// The table never grows; rows and columns beyond its grid are dropped.
    pub fn fill(&mut self, data: &[Vec<String>]) -> TableFill {
        let table_rows = self.rows();
        let table_cols = self.cols();
        let ns = self.ns;
        let mut rows_written = 0;
        let mut cols_written = 0;
        let mut truncated = data.len() > table_rows;

        for (tr, row_data) in self
            .tbl
            .elements_mut()
            .filter(|e| e.local_name() == "tr")
            .zip(data)
        {
            let mut cols = 0;
            for (tc, value) in tr.elements_mut().filter(|e| e.local_name() == "tc").zip(row_data) {
                TextFrame::of_cell(tc, ns).set_text(value);
                cols += 1;
            }
            truncated |= row_data.len() > cols;
            cols_written = cols_written.max(cols);
            rows_written += 1;
        }

        TableFill {
            rows_written,
            cols_written,
            table_rows,
            table_cols,
            truncated,
        }
    }

    /// Apply a run style to every cell of one row.
    pub fn style_row(&mut self, row: usize, style: &RunStyle) -> usize {
        let ns = self.ns;
        let Some(tr) = self.tbl.nth_named_mut("tr", row) else {
            return 0;
        };
        tr.elements_mut()
            .filter(|e| e.local_name() == "tc")
            .map(|tc| TextFrame::of_cell(tc, ns).style_runs(Paragraphs::All, style))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RGBColor;
    use crate::common::xml::XmlDocument;

    const FRAME: &str = r#"<p:graphicFrame xmlns:p="p" xmlns:a="a"><a:graphic><a:graphicData><a:tbl><a:tblGrid><a:gridCol w="1"/><a:gridCol w="1"/></a:tblGrid><a:tr><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>A</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc><a:tc><a:tcPr/></a:tc></a:tr><a:tr><a:tc><a:tcPr/></a:tc><a:tc><a:tcPr/></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_fill_exact_fit() {
        let mut frame = XmlDocument::parse(FRAME.as_bytes()).unwrap().root;
        let ns = Namespaces::default();
        let mut table = Table::of_frame(&mut frame, &ns).unwrap();
        let fill = table.fill(&rows(&[&["Region", "Revenue"], &["EMEA", "1.2M"]]));
        assert!(!fill.truncated);
        assert_eq!((fill.rows_written, fill.cols_written), (2, 2));
        assert_eq!(table.cell_text(0, 0).as_deref(), Some("Region"));
        assert_eq!(table.cell_text(1, 1).as_deref(), Some("1.2M"));
        // Cell bodies are created before a:tcPr.
        let tc = frame.find_all("tc")[3];
        let names: Vec<_> = tc.elements().map(|e| e.local_name()).collect();
        assert_eq!(names, ["txBody", "tcPr"]);
    }

    #[test]
    fn test_fill_truncates() {
        let mut frame = XmlDocument::parse(FRAME.as_bytes()).unwrap().root;
        let ns = Namespaces::default();
        let mut table = Table::of_frame(&mut frame, &ns).unwrap();
        let fill = table.fill(&rows(&[&["a", "b", "c"], &["d", "e", "f"], &["g", "h", "i"]]));
        assert!(fill.truncated);
        assert_eq!((fill.table_rows, fill.table_cols), (2, 2));
        assert_eq!(table.cell_text(1, 1).as_deref(), Some("e"));
    }

    #[test]
    fn test_style_row() {
        let mut frame = XmlDocument::parse(FRAME.as_bytes()).unwrap().root;
        let ns = Namespaces::default();
        let mut table = Table::of_frame(&mut frame, &ns).unwrap();
        table.fill(&rows(&[&["h1", "h2"], &["x", "y"]]));
        let style = RunStyle::bold().with_color(Some(RGBColor::new(255, 255, 255)));
        assert_eq!(table.style_row(0, &style), 2);
        assert_eq!(frame.find_all("srgbClr").len(), 2);
    }
}
