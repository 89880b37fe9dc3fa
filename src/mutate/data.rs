// Serde helpers and field rules shared by the slide data records.
use crate::common::RGBColor;
use crate::common::error::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Largest size PowerPoint accepts for a run, in points.
const MAX_FONT_SIZE: u32 = 4000;

pub(crate) fn yes() -> bool {
    true
}

/// `null` and `""` mean "keep the template colour".
pub(crate) fn optional_color<'de, D>(deserializer: D) -> std::result::Result<Option<RGBColor>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => RGBColor::parse(&s).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn scalar_to_text(value: Value) -> std::result::Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected text or number, found {}", other)),
    }
}

/// Text that callers may also send as a number (`"value": 95`).
pub(crate) fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_text(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

/// Rows of table cells, each cell text or a number.
pub(crate) fn scalar_rows<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Vec<Value>>::deserialize(deserializer)?
        .into_iter()
        .map(|row| row.into_iter().map(scalar_to_text).collect())
        .collect::<std::result::Result<_, _>>()
        .map_err(serde::de::Error::custom)
}

/// A list of strings where `null` stands for an empty list.
pub(crate) fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An optional text field counts only when it is non-empty.
#[inline]
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Item `i` of a parallel list, empty past its end.
#[inline]
pub(crate) fn nth_or_empty(list: &[String], i: usize) -> &str {
    list.get(i).map(String::as_str).unwrap_or("")
}

pub(crate) fn check_font_size(size: Option<u32>, field: &str) -> Result<()> {
    match size {
        Some(pt) if pt == 0 || pt > MAX_FONT_SIZE => Err(Error::Validation(format!(
            "{} must be between 1 and {} points, got {}",
            field, MAX_FONT_SIZE, pt
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Colour scheme carried by cover and contact slides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Palette {
    #[serde(default, deserialize_with = "optional_color")]
    pub primary: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub secondary: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub text: Option<RGBColor>,
    #[serde(default, deserialize_with = "optional_color")]
    pub background: Option<RGBColor>,
}
