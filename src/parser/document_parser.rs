//! Per-document parser owning the layout source and the span cache.

use crate::error::{Error, Result};
use crate::model::{Document, SpanCache, StyleMap};

use super::segment::{SegmentOptions, Segmenter};
use super::source::LayoutSource;
use super::spans::SpanBuilder;

/// Parser for one document.
///
/// The layout source is extracted at most once; every later segmentation,
/// including correction rounds under an extended style map, replays the
/// cached spans.
pub struct DocumentParser<S: LayoutSource = Box<dyn LayoutSource>> {
    source: S,
    cache: Option<SpanCache>,
}

impl<S: LayoutSource> DocumentParser<S> {
    /// Create a parser over a layout source. Nothing is extracted yet.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Name of the document.
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Extract the layout stream and build the span cache, once.
    pub fn extract(&mut self) -> Result<&SpanCache> {
        if self.cache.is_none() {
            let pages = self.source.extract()?;
            let cache = SpanBuilder::build(&pages);
            log::debug!(
                "{}: {} pages, {} bytes of text in {} spans",
                self.source.name(),
                pages.len(),
                cache.text.len(),
                cache.spans.len()
            );
            self.cache = Some(cache);
        }
        self.cached()
            .ok_or_else(|| Error::MissingStream(self.name().to_string()))
    }

    /// Extract if needed, then segment under `map`.
    pub fn parse(&mut self, map: &StyleMap, options: &SegmentOptions) -> Result<Document> {
        let segmenter = Segmenter::with_options(map, *options);
        self.parse_with(&segmenter)
    }

    /// Extract if needed, then segment with a prepared segmenter.
    pub fn parse_with(&mut self, segmenter: &Segmenter) -> Result<Document> {
        self.extract()?;
        self.reparse(segmenter)
    }

    /// Segment again from the cache only.
    ///
    /// Fails with [`Error::MissingStream`] if the document was never
    /// extracted; the source is not consulted.
    pub fn reparse(&self, segmenter: &Segmenter) -> Result<Document> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| Error::MissingStream(self.name().to_string()))?;
        Ok(segmenter.segment(self.name(), cache))
    }

    /// The span cache, if the document has been extracted.
    pub fn cached(&self) -> Option<&SpanCache> {
        self.cache.as_ref()
    }

    /// Whether the document has been extracted.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// The underlying layout source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: LayoutSource> std::fmt::Debug for DocumentParser<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentParser")
            .field("name", &self.name())
            .field("cached", &self.is_cached())
            .finish()
    }
}
