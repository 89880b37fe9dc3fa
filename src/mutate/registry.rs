//! The closed set of slide types and their tags.
use crate::common::error::{Error, Result};
use crate::mutate::SlideMutator;
use crate::mutate::{
    contact::ContactSlide, cover::CoverSlide, image_text::ImageTextSlide, images::ImagesSlide, people::PeopleSlide,
    phases::PhasesSlide, points::PointsSlide, statistics::StatisticsSlide, table::TableSlide,
};
use phf::phf_map;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Slide types a template can be filled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideType {
    Points,
    ImageText,
    Table,
    Phases,
    Statistics,
    People,
    Cover,
    Contact,
    Images,
}

/// Perfect hash map from request tags to slide types.
static TAGS: phf::Map<&'static str, SlideType> = phf_map! {
    "points" => SlideType::Points,
    "image_text" => SlideType::ImageText,
    "table" => SlideType::Table,
    "phases" => SlideType::Phases,
    "statistics" => SlideType::Statistics,
    "people" => SlideType::People,
    "cover" => SlideType::Cover,
    "contact" => SlideType::Contact,
    "images" => SlideType::Images,
};

/// Resolve a request tag. Unknown tags fail before any document is touched.
pub fn dispatch(tag: &str) -> Result<SlideType> {
    TAGS.get(tag).copied().ok_or_else(|| Error::UnknownType(tag.to_string()))
}

fn parse<T>(value: Value) -> Result<Box<dyn SlideMutator>>
where
    T: SlideMutator + DeserializeOwned + 'static,
{
    let record: T = serde_json::from_value(value)?;
    record.validate()?;
    Ok(Box::new(record))
}

impl SlideType {
    pub const ALL: [SlideType; 9] = [
        SlideType::Points,
        SlideType::ImageText,
        SlideType::Table,
        SlideType::Phases,
        SlideType::Statistics,
        SlideType::People,
        SlideType::Cover,
        SlideType::Contact,
        SlideType::Images,
    ];

    /// The request tag for this type.
    pub fn tag(&self) -> &'static str {
        self.info().tag
    }

    pub fn info(&self) -> &'static TypeInfo {
        &CATALOGUE[*self as usize]
    }

    /// Decode and validate a slide data record for this type.
    ///
    /// Unknown fields are ignored; missing required fields, malformed colours
    /// and out-of-range sizes are validation errors.
    pub fn parse_data(&self, value: Value) -> Result<Box<dyn SlideMutator>> {
        match self {
            SlideType::Points => parse::<PointsSlide>(value),
            SlideType::ImageText => parse::<ImageTextSlide>(value),
            SlideType::Table => parse::<TableSlide>(value),
            SlideType::Phases => parse::<PhasesSlide>(value),
            SlideType::Statistics => parse::<StatisticsSlide>(value),
            SlideType::People => parse::<PeopleSlide>(value),
            SlideType::Cover => parse::<CoverSlide>(value),
            SlideType::Contact => parse::<ContactSlide>(value),
            SlideType::Images => parse::<ImagesSlide>(value),
        }
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What a slide type expects from its data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub tag: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

// Indexed by `SlideType as usize`.
static CATALOGUE: [TypeInfo; 9] = [
    TypeInfo {
        tag: "points",
        description: "Header, description and a bullet list with per-item colour and size",
        required: &["slide_number", "header", "description"],
        optional: &["points", "header_color", "description_color", "image_url"],
    },
    TypeInfo {
        tag: "image_text",
        description: "Title and body text beside an image",
        required: &["slide_number", "title", "text"],
        optional: &["title_color", "text_color", "image_url"],
    },
    TypeInfo {
        tag: "table",
        description: "Title and a table filled row by row",
        required: &["slide_number", "title", "table_data"],
        optional: &["header_row", "header_color"],
    },
    TypeInfo {
        tag: "phases",
        description: "Timeline of named phases with status and colour",
        required: &["slide_number", "title", "phases"],
        optional: &["timeline_color", "image_url"],
    },
    TypeInfo {
        tag: "statistics",
        description: "Labelled figures with optional colour and size",
        required: &["slide_number", "title", "stat_data"],
        optional: &[
            "description",
            "title_color",
            "description_color",
            "background_color",
            "image_url",
        ],
    },
    TypeInfo {
        tag: "people",
        description: "Team members with designation and description",
        required: &["slide_number", "title", "names", "designations", "descriptions"],
        optional: &[
            "description",
            "title_color",
            "description_color",
            "background_color",
            "image_url",
        ],
    },
    TypeInfo {
        tag: "cover",
        description: "Title slide with subtitle, company name, logos and palette",
        required: &["slide_number", "title", "company_name"],
        optional: &["subtitle", "image", "colors"],
    },
    TypeInfo {
        tag: "contact",
        description: "Closing slide with links, email, phone and images",
        required: &["slide_number", "title", "website_link"],
        optional: &["linkedin_link", "contact_email", "contact_phone", "image", "colors"],
    },
    TypeInfo {
        tag: "images",
        description: "Gallery of images with headers and descriptions",
        required: &["slide_number", "title"],
        optional: &["headers", "descriptions", "images"],
    },
];

/// Every supported slide type with its fields.
pub fn catalogue() -> &'static [TypeInfo] {
    &CATALOGUE
}

/// `{ "slide_type": <tag>, "slide_data": { ... } }`
#[derive(Debug, Clone, Deserialize)]
pub struct MutationRequest {
    pub slide_type: String,
    #[serde(default)]
    pub slide_data: Value,
}

impl MutationRequest {
    pub fn new(slide_type: impl Into<String>, slide_data: Value) -> Self {
        Self {
            slide_type: slide_type.into(),
            slide_data,
        }
    }

    /// Dispatch the tag and decode the record.
    pub fn into_mutator(self) -> Result<Box<dyn SlideMutator>> {
        dispatch(&self.slide_type)?.parse_data(self.slide_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorKind;
    use crate::testing::minimal_record;
    use serde_json::json;

    #[test]
    fn test_dispatch_known_tags() {
        for ty in SlideType::ALL {
            assert_eq!(dispatch(ty.tag()).unwrap(), ty);
            assert_eq!(ty.info().tag, ty.to_string());
        }
    }

    #[test]
    fn test_dispatch_unknown_tag() {
        let err = dispatch("graphs").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownType);
        assert!(dispatch("Points").is_err());
    }

    #[test]
    fn test_catalogue_lists_every_type() {
        assert_eq!(catalogue().len(), SlideType::ALL.len());
        assert_eq!(SlideType::Table.info().required, &["slide_number", "title", "table_data"]);
        for ty in SlideType::ALL {
            assert_eq!(ty.info().required[0], "slide_number", "{}", ty);
        }
    }

    #[test]
    fn test_every_required_field_is_enforced() {
        for ty in SlideType::ALL {
            assert!(ty.parse_data(minimal_record(ty, 1)).is_ok(), "{} minimal record", ty);
            for field in ty.info().required {
                let mut data = minimal_record(ty, 1);
                data.as_object_mut().unwrap().remove(*field);
                let err = ty.parse_data(data).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Validation, "{} without {}", ty, field);
            }
        }
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let mutator = SlideType::Statistics.parse_data(minimal_record(SlideType::Statistics, 1)).unwrap();
        assert_eq!(mutator.slide_number(), 1);
        assert!(mutator.image_urls().is_empty());
    }

    #[test]
    fn test_request_with_unknown_fields() {
        let request: MutationRequest = serde_json::from_value(json!({
            "slide_type": "image_text",
            "slide_data": {"slide_number": 3, "title": "t", "text": "x", "slide_name": "ignored"},
        }))
        .unwrap();
        let mutator = request.into_mutator().unwrap();
        assert_eq!(mutator.slide_type(), SlideType::ImageText);
        assert_eq!(mutator.slide_number(), 3);
    }

    #[test]
    fn test_missing_required_field_is_validation_error() {
        let err = SlideType::Points.parse_data(json!({"header": "h"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
