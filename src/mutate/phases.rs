//! A timeline of phases.
use crate::common::RGBColor;
use crate::common::error::Result;
use crate::mutate::data::{optional_color, present, require_text, scalar_text};
use crate::mutate::regions::{Need, fill_all, has, has_any, is_title, put_first_picture, put_text};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::{Paragraphs, RunStyle};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Phase {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<RGBColor>,
}

impl Phase {
    /// `name`, `description` and an optional `Status:` line.
    fn text(&self) -> String {
        match present(&self.status) {
            Some(status) => format!("{}\n{}\nStatus: {}", self.name, self.description, status),
            None => format!("{}\n{}", self.name, self.description),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhasesSlide {
    pub slide_number: u32,
    pub title: String,
    pub phases: Vec<Phase>,
    #[serde(default, deserialize_with = "optional_color")]
    pub timeline_color: Option<RGBColor>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SlideMutator for PhasesSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Phases
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")
    }

    fn image_urls(&self) -> Vec<&str> {
        present(&self.image_url).into_iter().collect()
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        put_text(slide, ctx, "title", Need::Required, is_title, &self.title, &RunStyle::default())?;

        for (i, phase) in self.phases.iter().enumerate() {
            let key = format!("phase{}", i + 1);
            let found = put_text(
                slide,
                ctx,
                &key,
                Need::Optional,
                |n| has(n, &key),
                &phase.text(),
                &RunStyle::color(phase.color),
            )?;
            if let Some(id) = found {
                slide.style_text(id, Paragraphs::Nth(0), &RunStyle::bold())?;
            }
        }

        if let Some(color) = self.timeline_color {
            fill_all(slide, ctx, "timeline", |n| has_any(n, &["timeline", "arrow"]), color)?;
        }
        if let Some(url) = present(&self.image_url) {
            put_first_picture(slide, ctx, "image", |n| has_any(n, &["image", "picture"]), url)?;
        }
        Ok(())
    }
}
