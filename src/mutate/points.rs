//! Header, description and bullet points.
use crate::common::RGBColor;
use crate::common::error::Result;
use crate::mutate::data::{check_font_size, optional_color, present, require_text, scalar_text};
use crate::mutate::regions::{Need, has, locate, put_first_picture, put_text, text_kind};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::{Paragraphs, RunStyle};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Point {
    #[serde(default, deserialize_with = "scalar_text")]
    pub text: String,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<RGBColor>,
    #[serde(default)]
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointsSlide {
    pub slide_number: u32,
    pub header: String,
    pub description: String,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default, deserialize_with = "optional_color")]
    pub header_color: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub description_color: Option<RGBColor>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PointsSlide {
    fn bullets(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("• {}", p.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SlideMutator for PointsSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Points
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.header, "header")?;
        require_text(&self.description, "description")?;
        self.points
            .iter()
            .try_for_each(|p| check_font_size(p.font_size, "points[].font_size"))
    }

    fn image_urls(&self) -> Vec<&str> {
        present(&self.image_url).into_iter().collect()
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        put_text(
            slide,
            ctx,
            "header",
            Need::Required,
            |n| has(n, "header"),
            &self.header,
            &RunStyle::color(self.header_color),
        )?;
        put_text(
            slide,
            ctx,
            "description",
            Need::Required,
            |n| has(n, "description"),
            &self.description,
            &RunStyle::color(self.description_color),
        )?;

        if let Some(url) = present(&self.image_url) {
            put_first_picture(slide, ctx, "image", |n| has(n, "image"), url)?;
        }

        if !self.points.is_empty() {
            let found = locate(
                slide,
                ctx,
                "points",
                Need::Optional,
                text_kind,
                |n| n.starts_with("Description1_BG") || has(n, "points"),
            );
            if let Some(id) = found {
                slide.set_text(id, &self.bullets())?;
                for (i, point) in self.points.iter().enumerate() {
                    let style = RunStyle::color(point.color).with_size(point.font_size);
                    if !style.is_empty() {
                        slide.style_text(id, Paragraphs::Nth(i), &style)?;
                    }
                }
            }
        }
        Ok(())
    }
}
