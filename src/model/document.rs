//! Document tree types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Character counts per font name.
pub type StyleHistogram = BTreeMap<String, usize>;

/// Shared shape of the text-bearing elements of a section.
pub trait TextElement {
    /// The reconstructed text.
    fn content(&self) -> &str;

    /// Whether the element carries no text.
    fn is_empty(&self) -> bool {
        self.content().trim().is_empty()
    }
}

/// A segmented document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the source, usually the file name.
    pub name: String,

    /// Sections in reading order
    #[serde(rename = "content")]
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new document without sections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of sentences across all sections.
    pub fn sentence_count(&self) -> usize {
        self.sections.iter().map(|s| s.sentences.len()).sum()
    }

    /// A document with no sections is a failed segmentation.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterate over all sentences in order.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sections.iter().flat_map(|s| s.sentences.iter())
    }

    /// Plain text: one title line per section followed by its sentences.
    pub fn plain_text(&self) -> String {
        self.sections
            .iter()
            .map(|section| section.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A titled run of sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title; empty when the section has none
    pub title: Title,

    /// Sentences in reading order
    pub sentences: Vec<Sentence>,
}

impl Section {
    /// Create a section.
    pub fn new(title: Title, sentences: Vec<Sentence>) -> Self {
        Self { title, sentences }
    }

    /// Create a section without a title.
    pub fn untitled(sentences: Vec<Sentence>) -> Self {
        Self::new(Title::default(), sentences)
    }

    /// Whether a title was detected for this section.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    fn plain_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.sentences.len() + 1);
        if self.has_title() {
            lines.push(self.title.content.trim().to_string());
        }
        lines.extend(self.sentences.iter().map(|s| s.content.clone()));
        lines.join("\n")
    }
}

/// A section title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    /// Font name the title was matched on
    pub style: String,

    /// Title text
    pub content: String,
}

impl Title {
    /// Create a title from matched font and text.
    pub fn new(style: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            content: content.into(),
        }
    }
}

impl TextElement for Title {
    fn content(&self) -> &str {
        &self.content
    }
}

/// A body sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Character counts per font, when known
    pub style: Option<StyleHistogram>,

    /// Sentence text
    pub content: String,
}

impl Sentence {
    /// Create a sentence with a font histogram.
    pub fn new(content: impl Into<String>, style: StyleHistogram) -> Self {
        Self {
            style: Some(style),
            content: content.into(),
        }
    }

    /// Create a sentence without style information.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            style: None,
            content: content.into(),
        }
    }

    /// The font contributing the most characters, if known.
    pub fn dominant_font(&self) -> Option<&str> {
        self.style.as_ref().and_then(|histogram| {
            histogram
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(font, _)| font.as_str())
        })
    }
}

impl TextElement for Sentence {
    fn content(&self) -> &str {
        &self.content
    }
}
