/// Shapes on a slide.
///
/// This module provides the editing primitives for the shapes a template
/// exposes as named regions:
/// - Text shapes with text frames
/// - Pictures (images)
/// - Tables
pub mod base;
pub mod picture;
pub mod table;
pub mod textframe;

pub use base::{Region, ShapeType, set_solid_fill, shape_name};
pub use table::{Table, TableFill};
pub use textframe::{Paragraphs, RunStyle, TextFrame};
