//! Style map correction from a reference word.
//!
//! A document whose segmentation produced no sections usually means its
//! title font is missing from the style map. The correction loop looks for
//! a known word (such as `ABSTRACT`) at the start of a span in the cached
//! text, maps that span's font to [`Role::Title`](crate::model::Role::Title)
//! in a copy of the map, and segments all documents again from their caches.

use crate::batch::Batch;
use crate::error::Result;
use crate::model::{Document, SpanCache, StyleMap, StyleRule};
use crate::parser::LayoutSource;

/// Reference word used when the caller supplies none.
pub const DEFAULT_REFERENCE_WORD: &str = "ABSTRACT";

/// Names of the documents whose segmentation produced no sections.
///
/// Documents that failed extraction are not segmentation failures and are
/// not listed.
pub fn failures(results: &[Result<Document>]) -> Vec<&str> {
    results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .filter(|doc| doc.is_empty())
        .map(|doc| doc.name.as_str())
        .collect()
}

/// Infer a title rule from the first span whose text, spaces removed,
/// starts with `reference_word`.
pub fn infer_rule(cache: &SpanCache, reference_word: &str) -> Option<StyleRule> {
    if reference_word.is_empty() {
        return None;
    }
    cache
        .spans
        .iter()
        .find(|span| {
            let text: String = cache.span_text(span).split(' ').collect();
            text.starts_with(reference_word)
        })
        .map(|span| StyleRule::title(span.font_name.as_str()))
}

/// Copy `map` and append every rule inferred from `caches`.
///
/// Fonts that already have a rule are skipped: an appended rule never wins
/// over an earlier one. Running the same correction twice therefore yields
/// the same map.
pub fn extend_map<'c>(
    map: &StyleMap,
    caches: impl IntoIterator<Item = &'c SpanCache>,
    reference_word: &str,
) -> StyleMap {
    let mut extended = map.clone();
    for cache in caches {
        if let Some(rule) = infer_rule(cache, reference_word) {
            if extended.role_for(&rule.style).is_some() {
                continue;
            }
            log::info!("inferred title font {:?} from {:?}", rule.style, reference_word);
            extended = extended.extended(rule);
        }
    }
    extended
}

/// Decisions the correction loop asks of its caller each round.
pub trait CorrectionPrompt {
    /// Whether to attempt a correction for the documents named in `failed`.
    fn should_continue(&mut self, failed: &[&str]) -> bool;

    /// The reference word to look for; `default` is the suggested value.
    fn reference_word(&mut self, default: &str) -> String;
}

/// Non-interactive policy: a fixed reference word and a bounded number of
/// rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unattended {
    /// Maximum number of correction rounds
    pub max_rounds: usize,
    /// Word looked up in every round
    pub reference_word: String,
    taken: usize,
}

impl Unattended {
    /// Allow up to `max_rounds` rounds with the default reference word.
    pub fn new(max_rounds: usize) -> Self {
        Self {
            max_rounds,
            reference_word: DEFAULT_REFERENCE_WORD.to_string(),
            taken: 0,
        }
    }

    /// Never correct.
    pub fn never() -> Self {
        Self::new(0)
    }

    /// Set the reference word.
    pub fn with_reference_word(mut self, word: impl Into<String>) -> Self {
        self.reference_word = word.into();
        self
    }
}

impl Default for Unattended {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CorrectionPrompt for Unattended {
    fn should_continue(&mut self, _failed: &[&str]) -> bool {
        if self.taken >= self.max_rounds {
            return false;
        }
        self.taken += 1;
        true
    }

    fn reference_word(&mut self, _default: &str) -> String {
        self.reference_word.clone()
    }
}

impl<P: CorrectionPrompt + ?Sized> CorrectionPrompt for &mut P {
    fn should_continue(&mut self, failed: &[&str]) -> bool {
        (**self).should_continue(failed)
    }

    fn reference_word(&mut self, default: &str) -> String {
        (**self).reference_word(default)
    }
}

/// Result of running the correction loop.
#[derive(Debug)]
pub struct CorrectionOutcome {
    /// Per-document results, in batch order
    pub results: Vec<Result<Document>>,
    /// The style map the results were segmented with
    pub map: StyleMap,
    /// Number of correction rounds attempted
    pub rounds: usize,
    /// Documents still without sections
    pub unresolved: Vec<String>,
}

impl CorrectionOutcome {
    /// Whether any round added rules to the map.
    pub fn map_changed(&self, original: &StyleMap) -> bool {
        self.map != *original
    }
}

/// Repeats correction rounds while failures remain and the prompt agrees.
#[derive(Debug)]
pub struct CorrectionLoop<P: CorrectionPrompt> {
    prompt: P,
}

impl<P: CorrectionPrompt> CorrectionLoop<P> {
    /// Create a loop driven by `prompt`.
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    /// Run the loop over a parsed batch.
    ///
    /// `results` must come from parsing `batch` under `map`. Each round
    /// re-segments every cached document under the extended map, so the
    /// returned map and results always agree. Extraction errors are kept as
    /// they were.
    pub fn run<S: LayoutSource>(
        &mut self,
        batch: &Batch<S>,
        map: StyleMap,
        results: Vec<Result<Document>>,
    ) -> CorrectionOutcome {
        self.run_with_progress(batch, map, results, |_| {})
    }

    /// Like [`CorrectionLoop::run`], reporting each re-segmented document.
    pub fn run_with_progress<S, F>(
        &mut self,
        batch: &Batch<S>,
        mut map: StyleMap,
        mut results: Vec<Result<Document>>,
        progress: F,
    ) -> CorrectionOutcome
    where
        S: LayoutSource,
        F: Fn(&str) + Sync + Send,
    {
        let mut rounds = 0;

        loop {
            let failed = failures(&results);
            if failed.is_empty() {
                break;
            }
            log::info!("{} documents without sections", failed.len());
            if !self.prompt.should_continue(&failed) {
                break;
            }

            rounds += 1;
            let word = self.prompt.reference_word(DEFAULT_REFERENCE_WORD);
            let caches = results
                .iter()
                .enumerate()
                .filter(|(_, r)| r.as_ref().is_ok_and(Document::is_empty))
                .filter_map(|(i, _)| batch.cache(i));
            let extended = extend_map(&map, caches, &word);

            if extended == map {
                log::info!("round {}: no span starts with {:?}", rounds, word);
                continue;
            }

            map = extended;
            let reparsed = batch.reparse_with_progress(&map, &progress);
            results = results
                .into_iter()
                .zip(reparsed)
                .map(|(old, new)| match old {
                    Err(e) => Err(e),
                    Ok(_) => new,
                })
                .collect();
        }

        let unresolved = failures(&results).into_iter().map(String::from).collect();
        CorrectionOutcome {
            results,
            map,
            rounds,
            unresolved,
        }
    }
}
