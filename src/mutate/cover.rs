//! Title slide.
use crate::common::error::Result;
use crate::mutate::data::{Palette, require_text, string_list};
use crate::mutate::regions::{Need, fill_all, has, has_any, is_background, is_title, put_pictures, put_text};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::RunStyle;
use serde::Deserialize;

fn default_subtitle() -> String {
    "Generated via Template Flow".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverSlide {
    pub slide_number: u32,
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    pub company_name: String,
    /// Image URLs, matched in order to the logo and picture regions
    #[serde(default, deserialize_with = "string_list")]
    pub image: Vec<String>,
    #[serde(default)]
    pub colors: Palette,
}

impl SlideMutator for CoverSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Cover
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")?;
        require_text(&self.company_name, "company_name")
    }

    fn image_urls(&self) -> Vec<&str> {
        self.image.iter().map(String::as_str).filter(|u| !u.is_empty()).collect()
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        put_text(
            slide,
            ctx,
            "title",
            Need::Required,
            is_title,
            &self.title,
            &RunStyle::color(self.colors.primary),
        )?;
        if !self.subtitle.is_empty() {
            put_text(
                slide,
                ctx,
                "subtitle",
                Need::Optional,
                |n| has(n, "subtitle"),
                &self.subtitle,
                &RunStyle::color(self.colors.secondary),
            )?;
        }
        put_text(
            slide,
            ctx,
            "company",
            Need::Required,
            |n| has(n, "company"),
            &self.company_name,
            &RunStyle::default(),
        )?;
        if !self.image.is_empty() {
            put_pictures(slide, ctx, "image", |n| has_any(n, &["image", "logo", "picture"]), &self.image)?;
        }
        if let Some(color) = self.colors.background {
            fill_all(slide, ctx, "background", is_background, color)?;
        }
        Ok(())
    }
}
