//! Batch processing of many documents.
//!
//! Documents are independent: each parser owns its span cache and the style
//! map is shared read-only, so a batch runs on rayon's global thread pool
//! without locking. One failing document never aborts the batch.

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{Document, SpanCache, StyleMap};
use crate::parser::{DocumentParser, LayoutSource, ParseOptions, Segmenter};

/// A set of document parsers processed together.
pub struct Batch<S: LayoutSource = Box<dyn LayoutSource>> {
    parsers: Vec<DocumentParser<S>>,
    options: ParseOptions,
}

impl<S: LayoutSource> Batch<S> {
    /// Create a batch over layout sources.
    pub fn new(sources: impl IntoIterator<Item = S>, options: ParseOptions) -> Self {
        Self {
            parsers: sources.into_iter().map(DocumentParser::new).collect(),
            options,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Whether the batch has no documents.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// The document parsers, in input order.
    pub fn parsers(&self) -> &[DocumentParser<S>] {
        &self.parsers
    }

    /// Span cache of the document at `index`, if it has been extracted.
    pub fn cache(&self, index: usize) -> Option<&SpanCache> {
        self.parsers.get(index).and_then(DocumentParser::cached)
    }

    /// Extract (once) and segment every document.
    ///
    /// Results are returned in input order.
    pub fn parse(&mut self, map: &StyleMap) -> Vec<Result<Document>> {
        self.parse_with_progress(map, |_| {})
    }

    /// Like [`Batch::parse`], calling `progress` with each document's name
    /// once it is done.
    pub fn parse_with_progress<F>(&mut self, map: &StyleMap, progress: F) -> Vec<Result<Document>>
    where
        F: Fn(&str) + Sync + Send,
    {
        let segmenter = Segmenter::with_options(map, self.options.segment);
        let run = |parser: &mut DocumentParser<S>| {
            let result = parser.parse_with(&segmenter);
            if let Err(e) = &result {
                log::warn!("{}: {}", parser.name(), e);
            }
            progress(parser.name());
            result
        };

        if self.options.parallel {
            self.parsers.par_iter_mut().map(run).collect()
        } else {
            self.parsers.iter_mut().map(run).collect()
        }
    }

    /// Segment every document again from its cache under `map`.
    ///
    /// Documents that were never extracted yield
    /// [`Error::MissingStream`](crate::Error::MissingStream).
    pub fn reparse(&self, map: &StyleMap) -> Vec<Result<Document>> {
        self.reparse_with_progress(map, |_| {})
    }

    /// Like [`Batch::reparse`], with a progress callback.
    pub fn reparse_with_progress<F>(&self, map: &StyleMap, progress: F) -> Vec<Result<Document>>
    where
        F: Fn(&str) + Sync + Send,
    {
        let segmenter = Segmenter::with_options(map, self.options.segment);
        let run = |parser: &DocumentParser<S>| {
            let result = parser.reparse(&segmenter);
            progress(parser.name());
            result
        };

        if self.options.parallel {
            self.parsers.par_iter().map(run).collect()
        } else {
            self.parsers.iter().map(run).collect()
        }
    }
}

impl<S: LayoutSource> std::fmt::Debug for Batch<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("parsers", &self.parsers)
            .field("options", &self.options)
            .finish()
    }
}
