//! Plain text rendering for segmented documents.

use crate::model::Document;

/// Options for plain text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Emit a line with each section title
    pub include_titles: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            include_titles: true,
        }
    }
}

impl TextOptions {
    /// Sentences only.
    pub fn sentences_only() -> Self {
        Self {
            include_titles: false,
        }
    }
}

/// Convert a document to plain text, one sentence per line and a blank
/// line between sections.
pub fn to_text(doc: &Document, options: &TextOptions) -> String {
    let output = if options.include_titles {
        doc.plain_text()
    } else {
        doc.sentences()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };
    output.trim().to_string()
}
