//! Layout and painting of shown cues

pub mod attributes;
pub mod backend;
pub mod converter;
pub mod line_builder;
pub mod renderer;
pub mod style;

pub use attributes::{AttributeType, Attributes};
pub use backend::{DrawBackend, FixedAdvanceFont, FontHandle, FontMetrics, Rect};
pub use converter::Converter;
pub use line_builder::{Line, LineBuilder, Token};
pub use renderer::Renderer;
pub use style::{ColorArgb, Style};
