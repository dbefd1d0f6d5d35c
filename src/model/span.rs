//! Style spans over a flattened text buffer.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A contiguous run of the text buffer rendered in one font.
///
/// `start..end` is a half-open byte range into the owning buffer and always
/// falls on UTF-8 character boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSpan {
    /// Font name reported by the extractor
    #[serde(rename = "name")]
    pub font_name: String,
    /// First byte of the span
    pub start: usize,
    /// One past the last byte of the span
    pub end: usize,
}

impl StyleSpan {
    /// Create a span.
    pub fn new(font_name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            font_name: font_name.into(),
            start,
            end,
        }
    }

    /// Byte range covered by the span.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Flattened text of a document together with its style spans.
///
/// This is the parser cache: it is built once per document from the layout
/// stream and replayed by every later segmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanCache {
    /// Flattened text buffer
    pub text: String,
    /// Spans partitioning `text`, ordered by `start`
    pub spans: Vec<StyleSpan>,
}

impl SpanCache {
    /// Create a cache from a buffer and its spans.
    pub fn new(text: String, spans: Vec<StyleSpan>) -> Self {
        Self { text, spans }
    }

    /// Text covered by a span.
    pub fn span_text(&self, span: &StyleSpan) -> &str {
        &self.text[span.range()]
    }

    /// Whether the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check that the spans exactly partition the buffer.
    pub fn is_partition(&self) -> bool {
        if self.spans.is_empty() {
            return self.text.is_empty();
        }
        let mut cursor = 0;
        for span in &self.spans {
            if span.start != cursor || span.end < span.start {
                return false;
            }
            if !self.text.is_char_boundary(span.end) {
                return false;
            }
            cursor = span.end;
        }
        cursor == self.text.len()
    }
}
