//! # pdfsect
//!
//! Style-driven section and sentence segmentation for PDF documents.
//!
//! The character stream of a PDF is flattened into one text buffer with
//! font spans. A style map names the fonts used for section titles; every
//! other span is body text, split into sentences at a period followed by a
//! space and an upper-case letter. The result is a
//! Document → Section → Title + Sentence tree.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsect::{parse_file, render, StyleMap};
//!
//! fn main() -> pdfsect::Result<()> {
//!     let map = StyleMap::from_path("styles.json")?;
//!     let doc = parse_file("paper.pdf", &map)?;
//!
//!     for section in &doc.sections {
//!         println!("{} ({} sentences)", section.title.content, section.sentences.len());
//!     }
//!     println!("{}", render::to_json(&doc, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Span building**: ligature repair, hyphenated line wraps rejoined
//! - **Style maps**: first-match font → role rules, loaded from JSON
//! - **Correction loop**: infers a missing title font from a reference word
//!   and re-segments from cached spans without extracting again
//! - **Parallel batches**: uses Rayon across documents

pub mod batch;
pub mod correct;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::Batch;
pub use correct::{
    CorrectionLoop, CorrectionOutcome, CorrectionPrompt, Unattended, DEFAULT_REFERENCE_WORD,
};
pub use error::{Error, Result};
pub use model::{
    Document, Role, Section, Sentence, SpanCache, StyleMap, StyleRule, StyleSpan, TextElement,
    Title,
};
pub use parser::{
    DocumentParser, ErrorMode, HistogramScope, LayoutPage, LayoutSource, PageSelection,
    ParseOptions, PdfSource, SegmentOptions, Segmenter, SpanBuilder, StitchMode,
};
pub use render::{JsonFormat, TextOptions};

use std::path::Path;

/// Parse and segment a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdfsect::{parse_file, StyleMap, StyleRule};
///
/// let map = StyleMap::from_rules(vec![StyleRule::title("Times-Bold")]);
/// let doc = parse_file("paper.pdf", &map).unwrap();
/// println!("Sections: {}", doc.section_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P, map: &StyleMap) -> Result<Document> {
    parse_file_with_options(path, map, &ParseOptions::default())
}

/// Parse and segment a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfsect::{parse_file_with_options, ParseOptions, SegmentOptions, StyleMap};
///
/// let map = StyleMap::from_path("styles.json").unwrap();
/// let options = ParseOptions::new()
///     .lenient()
///     .with_segment(SegmentOptions::new().require_title(true));
/// let doc = parse_file_with_options("paper.pdf", &map, &options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    map: &StyleMap,
    options: &ParseOptions,
) -> Result<Document> {
    let source = PdfSource::open(path, options)?;
    segment_source(source, map, &options.segment)
}

/// Parse and segment a PDF held in memory.
pub fn parse_bytes(name: &str, data: &[u8], map: &StyleMap) -> Result<Document> {
    let options = ParseOptions::default();
    let source = PdfSource::from_bytes(name, data.to_vec(), &options)?;
    segment_source(source, map, &options.segment)
}

/// Extract any layout source once and segment it.
pub fn segment_source<S: LayoutSource>(
    source: S,
    map: &StyleMap,
    options: &SegmentOptions,
) -> Result<Document> {
    DocumentParser::new(source).parse(map, options)
}

/// Segment a layout stream already in memory.
pub fn segment_pages(name: &str, pages: &[LayoutPage], map: &StyleMap) -> Document {
    let cache = SpanBuilder::build(pages);
    Segmenter::new(map).segment(name, &cache)
}

/// Builder for parsing PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfsect::{Pdfsect, StyleMap};
///
/// let doc = Pdfsect::new(StyleMap::from_path("styles.json")?)
///     .lenient()
///     .require_title()
///     .parse("paper.pdf")?;
/// # Ok::<(), pdfsect::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pdfsect {
    map: StyleMap,
    options: ParseOptions,
}

impl Pdfsect {
    /// Create a builder over a style map.
    pub fn new(map: StyleMap) -> Self {
        Self {
            map,
            options: ParseOptions::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Restrict extraction to the given pages.
    pub fn pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Drop body text that no title precedes.
    pub fn require_title(mut self) -> Self {
        self.options.segment = self.options.segment.require_title(true);
        self
    }

    /// Set the boundary stitching mode.
    pub fn stitch(mut self, mode: StitchMode) -> Self {
        self.options.segment = self.options.segment.with_stitch(mode);
        self
    }

    /// The style map in use.
    pub fn map(&self) -> &StyleMap {
        &self.map
    }

    /// The parse options in use.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a file.
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        parse_file_with_options(path, &self.map, &self.options)
    }

    /// Parse a file and render it as JSON.
    pub fn to_json<P: AsRef<Path>>(&self, path: P, format: JsonFormat) -> Result<String> {
        let doc = self.parse(path)?;
        render::to_json(&doc, format)
    }
}
