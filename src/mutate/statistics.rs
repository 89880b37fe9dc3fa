//! Labelled figures.
use crate::common::RGBColor;
use crate::common::error::Result;
use crate::mutate::data::{check_font_size, optional_color, present, require_text, scalar_text};
use crate::mutate::regions::{
    Need, fill_all, has, has_any, is_background, is_title, put_first_picture, put_text, text_kind,
};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::{Paragraphs, RunStyle};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Stat {
    #[serde(default, deserialize_with = "scalar_text")]
    pub label: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: String,
    #[serde(default, deserialize_with = "optional_color")]
    pub color: Option<RGBColor>,
    #[serde(default)]
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsSlide {
    pub slide_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stat_data: Vec<Stat>,
    #[serde(default, deserialize_with = "optional_color")]
    pub title_color: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub description_color: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub background_color: Option<RGBColor>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl StatisticsSlide {
    /// One stat into a combined `stat{n}` region, or separate `label{n}` and `value{n}` regions.
    fn put_stat(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>, n: usize, stat: &Stat) -> Result<()> {
        let combined = format!("stat{}", n);
        if let Some(id) = slide.find(text_kind, |name| has(name, &combined)) {
            slide.set_text(id, &format!("{}\n{}", stat.label, stat.value))?;
            let style = RunStyle::color(stat.color).with_size(stat.font_size);
            if !style.is_empty() {
                slide.style_text(id, Paragraphs::All, &style)?;
            }
            slide.style_text(id, Paragraphs::Nth(1), &RunStyle::bold())?;
            return Ok(());
        }

        let label = format!("label{}", n);
        put_text(
            slide,
            ctx,
            &label,
            Need::Optional,
            |name| has(name, &label),
            &stat.label,
            &RunStyle::color(stat.color),
        )?;
        let value = format!("value{}", n);
        let value_style = RunStyle {
            bold: stat.color.map(|_| true),
            ..RunStyle::color(stat.color).with_size(stat.font_size)
        };
        put_text(
            slide,
            ctx,
            &value,
            Need::Optional,
            |name| has(name, &value),
            &stat.value,
            &value_style,
        )?;
        Ok(())
    }
}

impl SlideMutator for StatisticsSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Statistics
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")?;
        self.stat_data
            .iter()
            .try_for_each(|s| check_font_size(s.font_size, "stat_data[].font_size"))
    }

    fn image_urls(&self) -> Vec<&str> {
        present(&self.image_url).into_iter().collect()
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        put_text(
            slide,
            ctx,
            "title",
            Need::Required,
            is_title,
            &self.title,
            &RunStyle::color(self.title_color),
        )?;
        if let Some(description) = present(&self.description) {
            put_text(
                slide,
                ctx,
                "description",
                Need::Optional,
                |n| has(n, "description"),
                description,
                &RunStyle::color(self.description_color),
            )?;
        }
        for (i, stat) in self.stat_data.iter().enumerate() {
            self.put_stat(slide, ctx, i + 1, stat)?;
        }
        if let Some(color) = self.background_color {
            fill_all(slide, ctx, "background", is_background, color)?;
        }
        if let Some(url) = present(&self.image_url) {
            put_first_picture(slide, ctx, "image", |n| has_any(n, &["image", "picture"]), url)?;
        }
        Ok(())
    }
}
