//! Closing slide with contact details.
use crate::common::error::Result;
use crate::mutate::data::{Palette, require_text, string_list};
use crate::mutate::regions::{
    Need, fill_all, has, has_any, is_background, is_title, put_pictures, put_text, text_kind,
};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::{Paragraphs, RunStyle};
use serde::Deserialize;

/// Empty link fields leave their regions untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactSlide {
    pub slide_number: u32,
    pub title: String,
    #[serde(default)]
    pub website_link: String,
    #[serde(default)]
    pub linkedin_link: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default, deserialize_with = "string_list")]
    pub image: Vec<String>,
    #[serde(default)]
    pub colors: Palette,
}

impl ContactSlide {
    fn put_link(
        slide: &mut SlideEditor<'_>,
        ctx: &mut StepContext<'_>,
        region: &str,
        need: Need,
        matches: impl Fn(&str) -> bool,
        text: &str,
        url: &str,
    ) -> Result<()> {
        if let Some(id) = put_text(slide, ctx, region, need, matches, text, &RunStyle::default())? {
            slide.link_text(id, url)?;
        }
        Ok(())
    }
}

impl SlideMutator for ContactSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Contact
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")?;
        require_text(&self.website_link, "website_link")
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
        Self::put_link(
            slide,
            ctx,
            "website",
            Need::Required,
            |n| has_any(n, &["website", "web"]),
            &self.website_link,
            &self.website_link,
        )?;
        if !self.linkedin_link.is_empty() {
            Self::put_link(
                slide,
                ctx,
                "linkedin",
                Need::Optional,
                |n| has(n, "linkedin"),
                &self.linkedin_link,
                &self.linkedin_link,
            )?;
        }
        if !self.contact_email.is_empty() {
            Self::put_link(
                slide,
                ctx,
                "email",
                Need::Optional,
                |n| has_any(n, &["email", "mail"]),
                &self.contact_email,
                &format!("mailto:{}", self.contact_email),
            )?;
        }
        if !self.contact_phone.is_empty() {
            put_text(
                slide,
                ctx,
                "phone",
                Need::Optional,
                |n| has_any(n, &["phone", "tel"]),
                &self.contact_phone,
                &RunStyle::default(),
            )?;
        }
        if !self.image.is_empty() {
            put_pictures(slide, ctx, "image", |n| has_any(n, &["image", "qr", "picture"]), &self.image)?;
        }

        if let Some(color) = self.colors.text {
            for id in slide.find_all(text_kind, |n| !has(n, "title")) {
                slide.style_text(id, Paragraphs::All, &RunStyle::color(Some(color)))?;
            }
        }
        if let Some(color) = self.colors.background {
            fill_all(slide, ctx, "background", is_background, color)?;
        }
        Ok(())
    }
}
