//! Document model types.
//!
//! The model covers both ends of segmentation: the style spans and style
//! map that drive it, and the Document → Section → Title/Sentence tree it
//! produces.

mod document;
mod span;
mod style_map;

pub use document::{Document, Section, Sentence, StyleHistogram, TextElement, Title};
pub use span::{SpanCache, StyleSpan};
pub use style_map::{Role, StyleIndex, StyleMap, StyleRule};
