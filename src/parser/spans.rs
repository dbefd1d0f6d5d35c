//! Style span builder.
//!
//! Flattens a layout stream into one text buffer and a list of coalesced
//! style spans. Ligatures are expanded and invisible markers removed before
//! a glyph reaches the buffer, and a hyphen that ends a line is removed when
//! the line break arrives, so span offsets never drift from the buffer.

use crate::model::{SpanCache, StyleSpan};

use super::source::{AnnotationKind, LayoutItem, LayoutPage};

/// Ligature glyphs and their expansions.
const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),  // ﬀ
    ('\u{FB01}', "fi"),  // ﬁ
    ('\u{FB02}', "fl"),  // ﬂ
    ('\u{FB03}', "ffi"), // ﬃ
    ('\u{FB04}', "ffl"), // ﬄ
    ('\u{FB05}', "st"),  // ﬅ (long s + t)
    ('\u{FB06}', "st"),  // ﬆ
];

/// Zero-width characters and the soft hyphen.
const INVISIBLE: &[char] = &[
    '\u{00AD}', // soft hyphen
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // zero width no-break space
];

/// Expand ligatures and drop invisible markers from one glyph's text.
pub fn normalize_glyph(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if INVISIBLE.contains(&c) {
            continue;
        }
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expansion)) => out.push_str(expansion),
            None => out.push(c),
        }
    }
    out
}

/// Incremental builder for a [`SpanCache`].
///
/// The last span is always the open one and always ends at the current end
/// of the buffer.
#[derive(Debug, Default)]
pub struct SpanBuilder {
    text: String,
    spans: Vec<StyleSpan>,
}

impl SpanBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache for a whole document.
    pub fn build(pages: &[LayoutPage]) -> SpanCache {
        let mut builder = Self::new();
        for page in pages {
            for item in page.items() {
                builder.push_item(item);
            }
        }
        builder.finish()
    }

    /// Feed one layout item.
    pub fn push_item(&mut self, item: &LayoutItem) {
        match item {
            LayoutItem::Glyph { text, font } => self.push_glyph(text, font),
            LayoutItem::Annotation { annotation } => self.push_annotation(*annotation),
        }
    }

    /// Append a glyph rendered in `font`.
    pub fn push_glyph(&mut self, text: &str, font: &str) {
        let token = normalize_glyph(text);
        if token.is_empty() {
            return;
        }
        self.text.push_str(&token);
        let end = self.text.len();

        match self.spans.last_mut() {
            // A lone space never breaks a span: it stays with the run before it.
            Some(open) if open.font_name == font || token == " " => open.end = end,
            _ => {
                // Whitespace seen before the first glyph belongs to the first span.
                let start = self.spans.last().map_or(0, |span| span.end);
                self.spans.push(StyleSpan::new(font, start, end));
            }
        }
    }

    /// Apply a layout annotation.
    pub fn push_annotation(&mut self, kind: AnnotationKind) {
        match kind {
            AnnotationKind::Space => self.push_space(),
            AnnotationKind::LineBreak => {
                if self.last_char() == Some('-') {
                    self.text.pop();
                    self.shrink_open_span();
                } else {
                    self.push_space();
                }
            }
        }
    }

    /// Close the open span and return the cache.
    pub fn finish(mut self) -> SpanCache {
        if self.spans.is_empty() {
            // Only annotations were seen: nothing can carry a font.
            self.text.clear();
        } else if let Some(open) = self.spans.last_mut() {
            open.end = self.text.len();
        }
        SpanCache::new(self.text, self.spans)
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last character of the buffer; `None` when the buffer is empty.
    fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    fn push_space(&mut self) {
        if self.last_char() == Some(' ') {
            return;
        }
        self.text.push(' ');
        if let Some(open) = self.spans.last_mut() {
            open.end = self.text.len();
        }
    }

    fn shrink_open_span(&mut self) {
        let len = self.text.len();
        while self.spans.last().is_some_and(|span| span.start >= len) {
            self.spans.pop();
        }
        if let Some(open) = self.spans.last_mut() {
            open.end = len;
        }
    }
}
