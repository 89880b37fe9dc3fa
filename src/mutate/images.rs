//! Image gallery.
use crate::common::error::Result;
use crate::mutate::data::{nth_or_empty, require_text, string_list};
use crate::mutate::regions::{Need, has, has_any, is_title, put_first_picture, put_text};
use crate::mutate::{SlideMutator, SlideType, StepContext};
use crate::ooxml::pptx::SlideEditor;
use crate::ooxml::pptx::shapes::RunStyle;
use serde::Deserialize;

/// `headers` and `descriptions` are parallel to `images`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesSlide {
    pub slide_number: u32,
    pub title: String,
    #[serde(default, deserialize_with = "string_list")]
    pub headers: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub descriptions: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,
}

impl SlideMutator for ImagesSlide {
    fn slide_type(&self) -> SlideType {
        SlideType::Images
    }

    fn slide_number(&self) -> u32 {
        self.slide_number
    }

    fn validate(&self) -> Result<()> {
        require_text(&self.title, "title")
    }

    fn image_urls(&self) -> Vec<&str> {
        self.images.iter().map(String::as_str).filter(|u| !u.is_empty()).collect()
    }

    fn apply(&self, slide: &mut SlideEditor<'_>, ctx: &mut StepContext<'_>) -> Result<()> {
        put_text(slide, ctx, "title", Need::Required, is_title, &self.title, &RunStyle::default())?;

        for (i, url) in self.images.iter().enumerate() {
            let n = i + 1;
            if !url.is_empty() {
                let image = format!("image{}", n);
                let picture = format!("picture{}", n);
                put_first_picture(
                    slide,
                    ctx,
                    &image,
                    |r| has_any(r, &[image.as_str(), picture.as_str()]),
                    url,
                )?;
            }

            let header = nth_or_empty(&self.headers, i);
            if !header.is_empty() {
                let key = format!("header{}", n);
                put_text(slide, ctx, &key, Need::Optional, |r| has(r, &key), header, &RunStyle::bold())?;
            }
            let description = nth_or_empty(&self.descriptions, i);
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
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate::{Assets, Document, Warning, mutate};
    use crate::ooxml::opc::constants::relationship_type as rt;
    use crate::testing::{PNG_BYTES, PptxBuilder, picture_shape, shape_text, shape_xml, text_shape};
    use serde_json::json;

    fn template() -> Vec<u8> {
        PptxBuilder::new()
            .slide_with_rels(
                vec![
                    text_shape(2, "Gallery Title", "Gallery"),
                    picture_shape(3, "Image1", "rId2"),
                    text_shape(4, "Header1", "h1"),
                    text_shape(5, "Description1", "d1"),
                    picture_shape(6, "Picture2", "rId2"),
                    text_shape(7, "Header2", "h2"),
                    text_shape(8, "Desc2", "d2"),
                ],
                vec![("rId2", rt::IMAGE, "../media/image1.png")],
            )
            .media("image1.png", PNG_BYTES.to_vec())
            .build()
    }

    #[test]
    fn test_gallery_items() {
        let mut assets = Assets::default();
        assets.insert("https://cdn.example.com/a.png", Ok(PNG_BYTES.to_vec()));
        assets.insert("https://cdn.example.com/b.png", Ok(PNG_BYTES.to_vec()));
        let step = SlideType::Images
            .parse_data(json!({
                "slide_number": 1,
                "title": "Projects",
                "images": ["https://cdn.example.com/a.png", "https://cdn.example.com/b.png"],
                "headers": ["Bridge", ""],
                "descriptions": ["Steel", "Glass"],
            }))
            .unwrap();
        let out = mutate(Document::new(template()), step.as_ref(), &assets).unwrap();
        let bytes = out.document.as_bytes();

        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
        assert_eq!(shape_text(bytes, 1, "Gallery Title").as_deref(), Some("Projects"));
        assert_eq!(shape_text(bytes, 1, "Header1").as_deref(), Some("Bridge"));
        assert_eq!(shape_text(bytes, 1, "Header2").as_deref(), Some("h2"));
        assert_eq!(shape_text(bytes, 1, "Description1").as_deref(), Some("Steel"));
        assert_eq!(shape_text(bytes, 1, "Desc2").as_deref(), Some("Glass"));
        assert!(!shape_xml(bytes, 1, "Image1").unwrap().contains(r#"r:embed="rId2""#));
        assert!(!shape_xml(bytes, 1, "Picture2").unwrap().contains(r#"r:embed="rId2""#));
    }

    #[test]
    fn test_missing_gallery_slot_is_warning() {
        let step = SlideType::Images
            .parse_data(json!({"slide_number": 1, "title": "t", "headers": ["a", "b", "c"], "images": ["", "", ""]}))
            .unwrap();
        let out = mutate(Document::new(template()), step.as_ref(), &Assets::default()).unwrap();
        assert_eq!(
            out.warnings,
            vec![Warning::RegionNotFound {
                slide_number: 1,
                region: "header3".to_string()
            }]
        );
    }
}
