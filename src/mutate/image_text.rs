//! Title and body text beside an image.
use crate::common::RGBColor;
use crate::common::error::Result;
use crate::mutate::data::{optional_color, present, require_text};
use crate::mutate::regions::{Need, has, has_any, put_first_picture, put_text};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::RunStyle;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ImageTextSlide {
    pub slide_number: u32,
    pub title: String,
    pub text: String,
    #[serde(default, deserialize_with = "optional_color")]
    pub title_color: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub text_color: Option<RGBColor>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SlideMutator for ImageTextSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::ImageText
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")?;
        require_text(&self.text, "text")
    }

    fn image_urls(&self) -> Vec<&str> {
        present(&self.image_url).into_iter().collect()
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        // P100 and S100 are the placeholder names of the stock image-and-text layout.
        put_text(
            slide,
            ctx,
            "title",
            Need::Required,
            |n| n == "P100" || has(n, "title"),
            &self.title,
            &RunStyle::color(self.title_color),
        )?;
        put_text(
            slide,
            ctx,
            "text",
            Need::Required,
            |n| n == "S100" || has(n, "text"),
            &self.text,
            &RunStyle::color(self.text_color),
        )?;
        if let Some(url) = present(&self.image_url) {
            put_first_picture(slide, ctx, "image", |n| has_any(n, &["image", "picture"]), url)?;
        }
        Ok(())
    }
}
