//! Title and a table filled row by row.
use crate::common::RGBColor;
use crate::common::error::{Error, Result};
use crate::mutate::data::{optional_color, require_text, scalar_rows, yes};
use crate::mutate::regions::{Need, has, locate, put_text, table_kind};
use crate::mutate::{SlideMutator, SlideType, StepContext, Warning};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::RunStyle;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TableSlide {
    pub slide_number: u32,
    pub title: String,
    #[serde(deserialize_with = "scalar_rows")]
    pub table_data: Vec<Vec<String>>,
    /// Treat the first data row as a header
    #[serde(default = "yes")]
    pub header_row: bool,
    #[serde(default, deserialize_with = "optional_color")]
    pub header_color: Option<RGBColor>,
}

impl SlideMutator for TableSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Table
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")?;
        let width = match self.table_data.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(Error::Validation("table_data must have at least one non-empty row".to_string())),
        };
        if let Some((i, row)) = self.table_data.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::Validation(format!(
                "table_data row {} has {} cells, expected {}",
                i,
                row.len(),
                width
            )));
        }
        Ok(())
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        // Table slides match titles by substring only.
        put_text(slide, ctx, "title", Need::Required, |n| has(n, "title"), &self.title, &RunStyle::default())?;

        let Some(id) = locate(slide, ctx, "table", Need::Required, table_kind, |_| true) else {
            return Ok(());
        };
        let fill = slide.fill_table(id, &self.table_data)?;
        if fill.truncated {
            ctx.warn(Warning::TableTruncated {
                slide_number: ctx.slide_number(),
                rows_written: fill.rows_written,
                cols_written: fill.cols_written,
                rows_supplied: self.table_data.len(),
                cols_supplied: self.table_data[0].len(),
            });
        }
        if self.header_row && self.header_color.is_some() {
            let style = RunStyle {
                bold: Some(true),
                ..RunStyle::color(self.header_color)
            };
            slide.style_table_row(id, 0, &style)?;
        }
        Ok(())
    }
}
