/// PowerPoint (.pptx) presentation editing.
///
/// Opens a presentation package, resolves slide order, and edits one slide
/// at a time through [`SlideEditor`], touching only the parts that change.
pub mod format;
pub mod namespaces;
pub mod package;
pub mod shapes;
pub mod slide;

pub use format::ImageFormat;
pub use namespaces::Namespaces;
pub use package::Package;
pub use slide::{RegionId, SlideEditor};
