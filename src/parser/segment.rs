//! Segmentation of style spans into sections and sentences.
//!
//! Spans whose font maps to [`Role::Title`](crate::model::Role::Title) open
//! sections; every other span is body text, split into sentences at a period
//! followed by a space and an upper-case letter.

use std::mem;

use regex::Regex;

use crate::model::{
    Document, Section, Sentence, SpanCache, StyleHistogram, StyleIndex, StyleMap, StyleSpan, Title,
};

/// Period, space, upper-case letter.
const SENTENCE_END: &str = r"\. \p{Lu}";

/// When a body span is extended one character to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StitchMode {
    /// Every body span that does not follow a space
    Always,
    /// Only the first body span after a title run
    #[default]
    AfterTitle,
    /// Never
    Never,
}

/// Which characters a sentence's font histogram counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistogramScope {
    /// The run of the span the sentence ends in
    #[default]
    Run,
    /// Every span that contributed to the sentence
    Sentence,
}

/// Segmentation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentOptions {
    /// Recover a character lost where a span starts mid-word
    pub stitch: StitchMode,

    /// Drop text that no title precedes
    pub require_title: bool,

    /// What sentence histograms count
    pub histogram: HistogramScope,
}

impl SegmentOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary stitching mode.
    pub fn with_stitch(mut self, stitch: StitchMode) -> Self {
        self.stitch = stitch;
        self
    }

    /// Drop body text seen before the first title, so documents without
    /// any title match come out empty.
    pub fn require_title(mut self, require: bool) -> Self {
        self.require_title = require;
        self
    }

    /// Set what sentence histograms count.
    pub fn with_histogram(mut self, scope: HistogramScope) -> Self {
        self.histogram = scope;
        self
    }
}

/// Where the walk over spans currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    /// No span seen yet
    #[default]
    Idle,
    /// Inside a run of title spans
    InTitle,
    /// Inside body text with an open sentence
    InBody,
    /// Body text whose last sentence was just closed
    AtSentenceBoundary,
}

/// Per-call segmentation state. Never stored on the [`Segmenter`].
#[derive(Debug, Default)]
struct SegmentState {
    options: SegmentOptions,
    phase: Phase,
    title: Option<Title>,
    sentences: Vec<Sentence>,
    buffer: String,
    histogram: StyleHistogram,
    /// Font and length of the current span's share of the buffer
    run: Option<(String, usize)>,
    new_run: bool,
    sections: Vec<Section>,
}

impl SegmentState {
    fn new(options: SegmentOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// A title span closes the open section, if any; text before the first
    /// title carries into that title's section.
    fn title_span(&mut self, font: &str, text: &str) {
        if self.phase == Phase::InTitle {
            if let Some(title) = self.title.as_mut() {
                title.content.push_str(text);
                return;
            }
        }

        if self.title.is_some() {
            self.close_section();
        } else if self.options.require_title {
            self.drop_preamble();
        }
        self.title = Some(Title::new(font, text));
        self.phase = Phase::InTitle;
    }

    fn body_span(&mut self, font: &str, piece: &str, sentence_end: &Regex) {
        let base = self.junction_boundary(piece);
        self.new_run = true;
        self.phase = if self.buffer.is_empty() {
            Phase::AtSentenceBoundary
        } else {
            Phase::InBody
        };

        let mut cursor = base;
        for found in sentence_end.find_iter(&piece[base..]) {
            let period = base + found.start();
            self.append(&piece[cursor..=period], font);
            self.flush_sentence();
            self.phase = Phase::AtSentenceBoundary;
            cursor = period + 2;
        }

        if cursor < piece.len() {
            self.append(&piece[cursor..], font);
            self.phase = Phase::InBody;
        }
    }

    /// Detect a sentence end split across the previous span and this one.
    ///
    /// Returns how many bytes of `piece` the boundary consumes.
    fn junction_boundary(&mut self, piece: &str) -> usize {
        let starts_upper = |s: &str| s.chars().next().is_some_and(char::is_uppercase);

        let consumed = if self.buffer.ends_with(". ") && starts_upper(piece) {
            Some(0)
        } else if self.buffer.ends_with('.')
            && piece.starts_with(' ')
            && starts_upper(&piece[1..])
        {
            Some(1)
        } else {
            None
        };

        match consumed {
            Some(skip) => {
                self.flush_sentence();
                skip
            }
            None => 0,
        }
    }

    fn append(&mut self, text: &str, font: &str) {
        if text.is_empty() {
            return;
        }
        let count = text.chars().count();
        self.buffer.push_str(text);
        *self.histogram.entry(font.to_string()).or_default() += count;

        if self.new_run || self.run.is_none() {
            self.run = Some((font.to_string(), count));
        } else if let Some(run) = self.run.as_mut() {
            run.1 += count;
        }
        self.new_run = false;
    }

    fn flush_sentence(&mut self) {
        let histogram = match self.options.histogram {
            HistogramScope::Run => self
                .run
                .take()
                .map(|run| StyleHistogram::from([run]))
                .unwrap_or_default(),
            HistogramScope::Sentence => mem::take(&mut self.histogram),
        };

        let content = self.buffer.trim();
        if !content.is_empty() {
            self.sentences.push(Sentence::new(content, histogram));
        }
        self.buffer.clear();
        self.histogram.clear();
        self.run = None;
    }

    fn drop_preamble(&mut self) {
        if !self.sentences.is_empty() || !self.buffer.trim().is_empty() {
            log::debug!("dropping text before the first title");
        }
        self.sentences.clear();
        self.buffer.clear();
        self.histogram.clear();
        self.run = None;
    }

    fn close_section(&mut self) {
        self.flush_sentence();
        let sentences = mem::take(&mut self.sentences);

        match self.title.take() {
            Some(title) => self.sections.push(Section::new(title, sentences)),
            None if sentences.is_empty() || self.options.require_title => {}
            None => self.sections.push(Section::untitled(sentences)),
        }
    }
}

/// Segmentation engine for one version of a style map.
///
/// The engine holds only the style lookup and options; all state of a walk
/// lives inside [`Segmenter::segment`], so one engine can be shared across
/// documents and threads.
#[derive(Debug, Clone)]
pub struct Segmenter {
    index: StyleIndex,
    options: SegmentOptions,
    sentence_end: Regex,
}

impl Segmenter {
    /// Create an engine with default options.
    pub fn new(map: &StyleMap) -> Self {
        Self::with_options(map, SegmentOptions::default())
    }

    /// Create an engine with custom options.
    pub fn with_options(map: &StyleMap, options: SegmentOptions) -> Self {
        Self {
            index: map.index(),
            options,
            sentence_end: Regex::new(SENTENCE_END).expect("sentence boundary pattern is valid"),
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Segment a cached text buffer into a document named `name`.
    pub fn segment(&self, name: &str, cache: &SpanCache) -> Document {
        let mut state = SegmentState::new(self.options);

        for span in &cache.spans {
            if self.index.is_title(&span.font_name) {
                let text = cache.span_text(span);
                state.title_span(&span.font_name, text);
            } else {
                let after_title = state.phase == Phase::InTitle;
                let piece = self.body_text(cache, span, after_title);
                state.body_span(&span.font_name, piece, &self.sentence_end);
            }
        }

        let seen_any = state.phase != Phase::Idle;
        state.close_section();

        let mut document = Document::new(name);
        document.sections = state.sections;

        if seen_any && document.is_empty() {
            log::debug!("{}: no sections produced", name);
        } else {
            log::debug!(
                "{}: {} sections, {} sentences",
                name,
                document.section_count(),
                document.sentence_count()
            );
        }
        document
    }

    /// Text of a body span, extended left by one character when stitching
    /// applies and the span starts mid-word: neither its first character nor
    /// the one before it is whitespace.
    fn body_text<'c>(&self, cache: &'c SpanCache, span: &StyleSpan, after_title: bool) -> &'c str {
        let stitch = match self.options.stitch {
            StitchMode::Always => true,
            StitchMode::AfterTitle => after_title,
            StitchMode::Never => false,
        };

        let mut start = span.start;
        let starts_word = cache
            .span_text(span)
            .chars()
            .next()
            .map_or(true, char::is_whitespace);
        if stitch && start > 0 && !starts_word {
            if let Some(prev) = cache.text[..start].chars().next_back() {
                if prev != ' ' {
                    start -= prev.len_utf8();
                }
            }
        }
        &cache.text[start..span.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleRule;

    /// Build a cache from `(font, text)` runs laid end to end.
    fn cache(runs: &[(&str, &str)]) -> SpanCache {
        let mut text = String::new();
        let mut spans = Vec::new();
        for (font, run) in runs {
            let start = text.len();
            text.push_str(run);
            spans.push(StyleSpan::new(*font, start, text.len()));
        }
        SpanCache::new(text, spans)
    }

    fn title_map() -> StyleMap {
        StyleMap::from_rules(vec![StyleRule::title("Bold")])
    }

    fn contents(section: &Section) -> Vec<&str> {
        section.sentences.iter().map(|s| s.content.as_str()).collect()
    }

    #[test]
    fn test_two_sentences_in_one_span() {
        let doc = Segmenter::new(&title_map())
            .segment("doc", &cache(&[("Regular", "This is one. This is two.")]));

        assert_eq!(doc.section_count(), 1);
        assert!(!doc.sections[0].has_title());
        assert_eq!(contents(&doc.sections[0]), vec!["This is one.", "This is two."]);
    }

    #[test]
    fn test_lowercase_after_period_is_not_boundary() {
        let doc = Segmenter::new(&title_map())
            .segment("doc", &cache(&[("Regular", "See e.g. the results. Then more.")]));
        assert_eq!(
            contents(&doc.sections[0]),
            vec!["See e.g. the results.", "Then more."]
        );
    }

    #[test]
    fn test_section_grouping() {
        let doc = Segmenter::new(&title_map()).segment(
            "doc",
            &cache(&[
                ("Bold", "Intro"),
                ("Regular", " Hello world. "),
                ("Bold", "Methods"),
                ("Regular", " We did X."),
            ]),
        );

        assert_eq!(doc.section_count(), 2);
        assert_eq!(doc.sections[0].title.content, "Intro");
        assert_eq!(doc.sections[0].title.style, "Bold");
        assert_eq!(contents(&doc.sections[0]), vec!["Hello world."]);
        assert_eq!(doc.sections[1].title.content, "Methods");
        assert_eq!(contents(&doc.sections[1]), vec!["We did X."]);
    }

    #[test]
    fn test_title_never_split() {
        let doc = Segmenter::new(&title_map()).segment(
            "doc",
            &cache(&[("Bold", "Part one. Part Two"), ("Regular", " Body.")]),
        );
        assert_eq!(doc.sections[0].title.content, "Part one. Part Two");
        assert_eq!(contents(&doc.sections[0]), vec!["Body."]);
    }

    #[test]
    fn test_consecutive_title_runs_concatenate() {
        let doc = Segmenter::new(&StyleMap::from_rules(vec![
            StyleRule::title("Bold"),
            StyleRule::title("BoldItalic"),
        ]))
        .segment(
            "doc",
            &cache(&[
                ("Bold", "2 Related "),
                ("BoldItalic", "Work"),
                ("Regular", " Text."),
            ]),
        );
        assert_eq!(doc.section_count(), 1);
        assert_eq!(doc.sections[0].title.content, "2 Related Work");
        assert_eq!(doc.sections[0].title.style, "Bold");
    }

    #[test]
    fn test_title_font_in_body_opens_new_section() {
        let doc = Segmenter::new(&title_map()).segment(
            "doc",
            &cache(&[
                ("Bold", "Intro"),
                ("Regular", " We call this "),
                ("Bold", "important"),
                ("Regular", " here."),
            ]),
        );
        assert_eq!(doc.section_count(), 2);
        assert_eq!(contents(&doc.sections[0]), vec!["We call this"]);
        assert_eq!(doc.sections[1].title.content, "important");
    }

    #[test]
    fn test_sentence_spanning_spans() {
        let doc = Segmenter::new(&title_map()).segment(
            "doc",
            &cache(&[
                ("Regular", "A sentence with "),
                ("Italic", "emphasis "),
                ("Regular", "inside. Next one."),
            ]),
        );
        let sentences = &doc.sections[0].sentences;
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].content, "A sentence with emphasis inside.");

        // The first sentence ends in the last span's "inside." run.
        let style = sentences[0].style.as_ref().unwrap();
        assert_eq!(style.len(), 1);
        assert_eq!(style["Regular"], 7);
        assert_eq!(sentences[1].style.as_ref().unwrap()["Regular"], 9);
    }

    #[test]
    fn test_histogram_scope() {
        let runs = [
            ("Regular", "A long sentence with "),
            ("Italic", "emphasis"),
            ("Regular", " ends here. Next."),
        ];

        let doc = Segmenter::new(&title_map()).segment("doc", &cache(&runs));
        let first = &doc.sections[0].sentences[0];
        assert_eq!(first.content, "A long sentence with emphasis ends here.");
        let style = first.style.as_ref().unwrap();
        assert_eq!(style.len(), 1);
        assert_eq!(style["Regular"], 11);

        let options = SegmentOptions::new().with_histogram(HistogramScope::Sentence);
        let doc = Segmenter::with_options(&title_map(), options).segment("doc", &cache(&runs));
        let style = doc.sections[0].sentences[0].style.as_ref().unwrap();
        assert_eq!(style["Italic"], 8);
        assert_eq!(style["Regular"], 21 + 11);
    }

    #[test]
    fn test_boundary_at_span_junction() {
        let doc = Segmenter::new(&title_map()).segment(
            "doc",
            &cache(&[("Regular", "First ends. "), ("Italic", "Second starts.")]),
        );
        assert_eq!(
            contents(&doc.sections[0]),
            vec!["First ends.", "Second starts."]
        );

        let doc = Segmenter::new(&title_map()).segment(
            "doc",
            &cache(&[("Regular", "First ends."), ("Italic", " Second starts.")]),
        );
        assert_eq!(
            contents(&doc.sections[0]),
            vec!["First ends.", "Second starts."]
        );
    }

    #[test]
    fn test_stitch_after_title() {
        let runs = [("Bold", "Intro"), ("Regular", "duction text.")];

        let doc = Segmenter::new(&title_map()).segment("doc", &cache(&runs));
        assert_eq!(contents(&doc.sections[0]), vec!["oduction text."]);

        let options = SegmentOptions::new().with_stitch(StitchMode::Never);
        let doc = Segmenter::with_options(&title_map(), options).segment("doc", &cache(&runs));
        assert_eq!(contents(&doc.sections[0]), vec!["duction text."]);
    }

    #[test]
    fn test_stitch_skips_space_and_buffer_start() {
        let options = SegmentOptions::new().with_stitch(StitchMode::Always);
        let segmenter = Segmenter::with_options(&title_map(), options);

        let doc = segmenter.segment("doc", &cache(&[("Regular", "Starts here.")]));
        assert_eq!(contents(&doc.sections[0]), vec!["Starts here."]);

        let doc = segmenter.segment("doc", &cache(&[("Regular", "one "), ("Italic", "two.")]));
        assert_eq!(contents(&doc.sections[0]), vec!["one two."]);
    }

    #[test]
    fn test_preamble_before_first_title() {
        let runs = [
            ("Regular", "Journal header. Volume one. "),
            ("Bold", "Abstract "),
            ("Regular", "Summary."),
        ];

        // Text before the first title belongs to that title's section.
        let doc = Segmenter::new(&title_map()).segment("doc", &cache(&runs));
        assert_eq!(doc.section_count(), 1);
        assert_eq!(doc.sections[0].title.content, "Abstract ");
        assert_eq!(
            contents(&doc.sections[0]),
            vec!["Journal header.", "Volume one.", "Summary."]
        );

        let options = SegmentOptions::new().require_title(true);
        let doc = Segmenter::with_options(&title_map(), options).segment("doc", &cache(&runs));
        assert_eq!(doc.section_count(), 1);
        assert_eq!(doc.sections[0].title.content, "Abstract ");
        assert_eq!(contents(&doc.sections[0]), vec!["Summary."]);
    }

    #[test]
    fn test_second_title_closes_first_section() {
        let runs = [
            ("Regular", "Header. "),
            ("Bold", "One "),
            ("Regular", "First. "),
            ("Bold", "Two "),
            ("Regular", "Second."),
        ];
        let doc = Segmenter::new(&title_map()).segment("doc", &cache(&runs));

        assert_eq!(doc.section_count(), 2);
        assert_eq!(contents(&doc.sections[0]), vec!["Header.", "First."]);
        assert_eq!(contents(&doc.sections[1]), vec!["Second."]);
    }

    #[test]
    fn test_require_title_without_match_is_empty() {
        let options = SegmentOptions::new().require_title(true);
        let doc = Segmenter::with_options(&title_map(), options)
            .segment("doc", &cache(&[("Regular", "Only body. Text here.")]));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_title_without_body() {
        let doc = Segmenter::new(&title_map()).segment("doc", &cache(&[("Bold", "References")]));
        assert_eq!(doc.section_count(), 1);
        assert!(doc.sections[0].sentences.is_empty());
    }

    #[test]
    fn test_empty_cache() {
        let doc = Segmenter::new(&title_map()).segment("doc", &SpanCache::default());
        assert!(doc.is_empty());
        assert_eq!(doc.name, "doc");
    }

    #[test]
    fn test_unmapped_font_never_matches() {
        let map = StyleMap::from_rules(vec![StyleRule::title("NeverSeen")]);
        let doc = Segmenter::new(&map).segment("doc", &cache(&[("Bold", "Intro")]));
        assert!(!doc.sections[0].has_title());
        assert_eq!(contents(&doc.sections[0]), vec!["Intro"]);
    }

    #[test]
    fn test_non_title_roles_are_body() {
        let map = StyleMap::from_rules(vec![StyleRule::new("Small", "footnote")]);
        let doc = Segmenter::new(&map).segment("doc", &cache(&[("Small", "Note one. Note two.")]));
        assert_eq!(doc.sentence_count(), 2);
    }

    #[test]
    fn test_segmenter_is_reusable() {
        let segmenter = Segmenter::new(&title_map());
        let a = cache(&[("Bold", "A"), ("Regular", " Body a.")]);
        let b = cache(&[("Regular", "Body b. More b.")]);

        let first = segmenter.segment("a", &a);
        let _ = segmenter.segment("b", &b);
        assert_eq!(segmenter.segment("a", &a), first);
    }
}
