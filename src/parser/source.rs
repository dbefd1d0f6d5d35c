//! Layout extractor boundary.
//!
//! A layout source yields, per document, pages of line-like containers of
//! positioned glyphs and layout annotations in reading order. Geometry is not
//! part of the contract: only iteration order and font attribution matter.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of a layout annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Inter-word gap
    Space,
    /// End of a text line
    LineBreak,
}

/// One item of the layout stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutItem {
    /// A rendered glyph and the font it was drawn with.
    Glyph { text: String, font: String },
    /// A layout marker carrying no glyph and no font.
    Annotation { annotation: AnnotationKind },
}

impl LayoutItem {
    /// Create a glyph item.
    pub fn glyph(text: impl Into<String>, font: impl Into<String>) -> Self {
        LayoutItem::Glyph {
            text: text.into(),
            font: font.into(),
        }
    }

    /// Create a space annotation.
    pub fn space() -> Self {
        LayoutItem::Annotation {
            annotation: AnnotationKind::Space,
        }
    }

    /// Create a line-break annotation.
    pub fn line_break() -> Self {
        LayoutItem::Annotation {
            annotation: AnnotationKind::LineBreak,
        }
    }
}

/// A line of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub items: Vec<LayoutItem>,
}

impl LayoutLine {
    /// Create a line from items.
    pub fn new(items: Vec<LayoutItem>) -> Self {
        Self { items }
    }

    /// Whether the line has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A block of lines, e.g. one text box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutContainer {
    pub lines: Vec<LayoutLine>,
}

impl LayoutContainer {
    /// Create a container from lines.
    pub fn new(lines: Vec<LayoutLine>) -> Self {
        Self { lines }
    }
}

/// One page of the layout stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Page number (1-indexed)
    pub number: u32,
    pub containers: Vec<LayoutContainer>,
}

impl LayoutPage {
    /// Create a page.
    pub fn new(number: u32, containers: Vec<LayoutContainer>) -> Self {
        Self { number, containers }
    }

    /// Iterate over all items of the page in reading order.
    pub fn items(&self) -> impl Iterator<Item = &LayoutItem> {
        self.containers
            .iter()
            .flat_map(|c| c.lines.iter())
            .flat_map(|l| l.items.iter())
    }
}

/// Producer of layout streams.
///
/// Extraction is the expensive step of the pipeline; callers invoke it at
/// most once per document and replay the cached spans afterwards.
pub trait LayoutSource: Send + Sync {
    /// Identifier of the document, usually its file name.
    fn name(&self) -> &str;

    /// Extract the full layout stream of the document.
    fn extract(&self) -> Result<Vec<LayoutPage>>;
}

impl<S: LayoutSource + ?Sized> LayoutSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self) -> Result<Vec<LayoutPage>> {
        (**self).extract()
    }
}

/// A layout stream already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    pages: Vec<LayoutPage>,
}

impl MemorySource {
    /// Create a source from pages.
    pub fn new(name: impl Into<String>, pages: Vec<LayoutPage>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    /// Create a single-page, single-line source from items.
    pub fn from_items(name: impl Into<String>, items: Vec<LayoutItem>) -> Self {
        let page = LayoutPage::new(1, vec![LayoutContainer::new(vec![LayoutLine::new(items)])]);
        Self::new(name, vec![page])
    }
}

impl LayoutSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self) -> Result<Vec<LayoutPage>> {
        Ok(self.pages.clone())
    }
}
