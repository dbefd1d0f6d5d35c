//! Layout extraction, span building and segmentation.

pub mod backend;
mod document_parser;
mod layout;
mod options;
mod segment;
mod source;
mod spans;

pub use backend::{LopdfBackend, PdfBackend};
pub use document_parser::DocumentParser;
pub use layout::{extract_page, extract_pages, PdfSource};
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use segment::{HistogramScope, SegmentOptions, Segmenter, StitchMode};
pub use source::{
    AnnotationKind, LayoutContainer, LayoutItem, LayoutLine, LayoutPage, LayoutSource,
    MemorySource,
};
pub use spans::{normalize_glyph, SpanBuilder};
