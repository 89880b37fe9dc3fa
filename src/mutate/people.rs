//! Team members.
use crate::common::RGBColor;
use crate::common::error::Result;
use crate::mutate::data::{nth_or_empty, optional_color, present, require_text};
use crate::mutate::regions::{
    Need, fill_all, has, has_any, is_background, is_title, put_first_picture, put_text, text_kind,
};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::{Paragraphs, RunStyle};
use serde::Deserialize;

/// Designations and descriptions are parallel to `names` and padded with empty strings.
#[derive(Debug, Clone, Deserialize)]
pub struct PeopleSlide {
    pub slide_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub names: Vec<String>,
    pub designations: Vec<String>,
    pub descriptions: Vec<String>,
    #[serde(default, deserialize_with = "optional_color")]
    pub title_color: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub description_color: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub background_color: Option<RGBColor>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PeopleSlide {
    fn put_person(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>, i: usize) -> Result<()> {
        let n = i + 1;
        let name = &self.names[i];
        let designation = nth_or_empty(&self.designations, i);
        let description = nth_or_empty(&self.descriptions, i);

        let combined = format!("person{}", n);
        if let Some(id) = slide.find(text_kind, |r| has(r, &combined)) {
            let mut text = format!("{}\n{}", name, designation);
            if !description.is_empty() {
                text.push('\n');
                text.push_str(description);
            }
            slide.set_text(id, &text)?;
            slide.style_text(id, Paragraphs::Nth(0), &RunStyle::bold())?;
            slide.style_text(id, Paragraphs::Nth(1), &RunStyle::italic())?;
            return Ok(());
        }

        let name_key = format!("name{}", n);
        put_text(slide, ctx, &name_key, Need::Optional, |r| has(r, &name_key), name, &RunStyle::bold())?;
        if !designation.is_empty() {
            let key = format!("designation{}", n);
            put_text(slide, ctx, &key, Need::Optional, |r| has(r, &key), designation, &RunStyle::italic())?;
        }
        if !description.is_empty() {
            let key = format!("description{}", n);
            let short = format!("desc{}", n);
            put_text(
                slide,
                ctx,
                &key,
                Need::Optional,
                |r| has_any(r, &[key.as_str(), short.as_str()]),
                description,
                &RunStyle::default(),
            )?;
        }
        Ok(())
    }
}

impl SlideMutator for PeopleSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::People
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
        for i in 0..self.names.len() {
            self.put_person(slide, ctx, i)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate::{Assets, Document, mutate};
    use crate::testing::{PptxBuilder, shape_text, shape_xml, text_shape};
    use serde_json::json;

    #[test]
    fn test_combined_person_regions() {
        let input = PptxBuilder::new()
            .slide(vec![
                text_shape(2, "Team Title", "Team"),
                text_shape(3, "Person1", "a\nb"),
                text_shape(4, "Person2", "c\nd"),
            ])
            .build();
        let step = SlideType::People
            .parse_data(json!({
                "slide_number": 1,
                "title": "Leadership",
                "names": ["Ada", "Grace"],
                "designations": ["CEO"],
                "descriptions": ["Founder"],
            }))
            .unwrap();
        let out = mutate(Document::new(input), step.as_ref(), &Assets::default()).unwrap();
        let bytes = out.document.as_bytes();

        assert_eq!(shape_text(bytes, 1, "Person1").as_deref(), Some("Ada\nCEO\nFounder"));
        assert_eq!(shape_text(bytes, 1, "Person2").as_deref(), Some("Grace\n"));
        let first = shape_xml(bytes, 1, "Person1").unwrap();
        assert_eq!(first.matches(r#"b="1""#).count(), 1);
        assert_eq!(first.matches(r#"i="1""#).count(), 1);
    }

    #[test]
    fn test_null_list_entries_rejected() {
        let err = SlideType::People
            .parse_data(json!({
                "slide_number": 1,
                "title": "t",
                "names": ["Ada", null],
                "designations": [],
                "descriptions": [],
            }))
            .unwrap_err();
        assert_eq!(err.kind(), crate::common::ErrorKind::Validation);
    }

    #[test]
    fn test_separate_regions() {
        let input = PptxBuilder::new()
            .slide(vec![
                text_shape(2, "Title", "Team"),
                text_shape(3, "Name1", "n"),
                text_shape(4, "Designation1", "d"),
                text_shape(5, "Desc1", "x"),
            ])
            .build();
        let step = SlideType::People
            .parse_data(json!({
                "slide_number": 1,
                "title": "Team",
                "names": ["Linus"],
                "designations": ["Maintainer"],
                "descriptions": ["Kernel"],
            }))
            .unwrap();
        let out = mutate(Document::new(input), step.as_ref(), &Assets::default()).unwrap();
        let bytes = out.document.as_bytes();

        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
        assert_eq!(shape_text(bytes, 1, "Name1").as_deref(), Some("Linus"));
        assert_eq!(shape_text(bytes, 1, "Designation1").as_deref(), Some("Maintainer"));
        assert_eq!(shape_text(bytes, 1, "Desc1").as_deref(), Some("Kernel"));
        assert!(shape_xml(bytes, 1, "Designation1").unwrap().contains(r#"i="1""#));
    }
}
