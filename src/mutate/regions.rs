// Region lookup and the edits every slide type shares.
//
// Names match case-insensitively by substring over the slide's top-level
// shapes, first match in document order.
use crate::common::RGBColor;
use crate::common::error::{Error, Result};
use crate::mutate::StepContext;
use crate::ooxml::pptx::shapes::{Paragraphs, RunStyle, ShapeType};
use crate::ooxml::pptx::{RegionId, SlideEditor};

/// Case-insensitive substring match; `needle` is lowercase.
#[inline]
pub(crate) fn has(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

pub(crate) fn has_any(name: &str, needles: &[&str]) -> bool {
    let lower = name.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

pub(crate) fn is_title(name: &str) -> bool {
    has(name, "title") || name.starts_with("Title")
}

pub(crate) fn is_background(name: &str) -> bool {
    has_any(name, &["background", "bg"])
}

#[inline]
pub(crate) fn text_kind(t: ShapeType) -> bool {
    t.has_text_frame()
}

#[inline]
pub(crate) fn picture_kind(t: ShapeType) -> bool {
    t == ShapeType::Picture
}

#[inline]
pub(crate) fn table_kind(t: ShapeType) -> bool {
    t == ShapeType::Table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Need {
    Required,
    Optional,
}

/// Find a region, recording it as missing when there is none.
pub(crate) fn locate(
    slide: &SlideEditor<'_>,
    ctx: &mut StepContext<'_>,
    region: &str,
    need: Need,
    accept: impl Fn(ShapeType) -> bool,
    matches: impl Fn(&str) -> bool,
) -> Option<RegionId> {
    let found = slide.find(accept, matches);
    if found.is_none() {
        match need {
            Need::Required => ctx.required_missing(region),
            Need::Optional => ctx.region_missing(region),
        }
    }
    found
}

/// Replace the text of the first matching text region and style every run.
pub(crate) fn put_text(
    slide: &mut SlideEditor<'_>,
    ctx: &mut StepContext<'_>,
    region: &str,
    need: Need,
    matches: impl Fn(&str) -> bool,
    text: &str,
    style: &RunStyle,
) -> Result<Option<RegionId>> {
    let Some(id) = locate(slide, ctx, region, need, text_kind, matches) else {
        return Ok(None);
    };
    slide.set_text(id, text)?;
    if !style.is_empty() {
        slide.style_text(id, Paragraphs::All, style)?;
    }
    Ok(Some(id))
}

/// Show the image behind `url` in a picture region.
///
/// Returns false, with a warning recorded, when the image is unavailable or
/// is not a supported raster format.
pub(crate) fn put_picture(
    slide: &mut SlideEditor<'_>,
    ctx: &mut StepContext<'_>,
    id: RegionId,
    url: &str,
) -> Result<bool> {
    let Some(bytes) = ctx.image(url) else {
        return Ok(false);
    };
    match slide.replace_picture(id, bytes) {
        Ok(_) => Ok(true),
        Err(e @ Error::Validation(_)) => {
            ctx.asset_failed(url, e.to_string());
            Ok(false)
        },
        Err(e) => Err(e),
    }
}

/// Replace the image of the first matching picture region.
pub(crate) fn put_first_picture(
    slide: &mut SlideEditor<'_>,
    ctx: &mut StepContext<'_>,
    region: &str,
    matches: impl Fn(&str) -> bool,
    url: &str,
) -> Result<bool> {
    match locate(slide, ctx, region, Need::Optional, picture_kind, matches) {
        Some(id) => put_picture(slide, ctx, id, url),
        None => Ok(false),
    }
}

/// Zip image URLs over the matching picture regions in document order.
pub(crate) fn put_pictures(
    slide: &mut SlideEditor<'_>,
    ctx: &mut StepContext<'_>,
    region: &str,
    matches: impl Fn(&str) -> bool,
    urls: &[String],
) -> Result<usize> {
    let targets = slide.find_all(picture_kind, matches);
    if targets.is_empty() {
        ctx.region_missing(region);
        return Ok(0);
    }
    let mut replaced = 0;
    for (id, url) in targets.into_iter().zip(urls.iter().filter(|u| !u.is_empty())) {
        if put_picture(slide, ctx, id, url)? {
            replaced += 1;
        }
    }
    Ok(replaced)
}

/// Give every matching region a solid fill.
pub(crate) fn fill_all(
    slide: &mut SlideEditor<'_>,
    ctx: &mut StepContext<'_>,
    region: &str,
    matches: impl Fn(&str) -> bool,
    color: RGBColor,
) -> Result<usize> {
    let targets = slide.find_all(|_| true, matches);
    if targets.is_empty() {
        ctx.region_missing(region);
        return Ok(0);
    }
    let mut filled = 0;
    for id in targets {
        if slide.fill_shape(id, color)? {
            filled += 1;
        }
    }
    Ok(filled)
}
