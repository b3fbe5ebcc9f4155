//! Search and ranking.
//!
//! This module filters the selectable choices against free-text input. Matching is delegated to
//! the [`nucleo`] fuzzy matcher; this layer adds the control-level policy around it:
//!
//! - a minimum needle length (the *search floor*, 2 graphemes by default) below which the caller
//!   should show every choice instead of searching
//! - a guard against re-running the same (trimmed) needle twice in a row
//! - multi-field matching with field priority (e.g. label before value)
//! - score normalisation to the `[0, 1]` range where **lower is better**, `0.0` being a perfect
//!   match
//!
//! The ranked [`SearchResult`]s are meant to be dispatched as
//! [`ChoiceAction::Filter`](crate::ChoiceAction::Filter).

use crate::ids::ChoiceId;
use crate::model::Choice;
use nucleo::{
    Config, Matcher, Utf32Str,
    pattern::{Atom, AtomKind, CaseMatching, Normalization},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

/// Default minimum needle length, in graphemes.
pub const DEFAULT_SEARCH_FLOOR: usize = 2;

/// A choice field that search (and alphabetical sorting) looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// The display label.
    Label,
    /// The underlying value.
    Value,
}

impl SearchField {
    /// Borrow this field from a choice.
    pub fn extract(self, choice: &Choice) -> &str {
        match self {
            SearchField::Label => &choice.label,
            SearchField::Value => &choice.value,
        }
    }
}

/// One ranked match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// The matching choice.
    pub id: ChoiceId,
    /// Normalised score in `[0, 1]`; lower is better.
    pub score: f64,
}

/// What the caller should do with a new input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// The needle is below the search floor: show every choice.
    ShowAll,
    /// The trimmed needle equals the last searched one: nothing to do.
    Unchanged,
    /// Run a search with this (trimmed) needle.
    Search(String),
}

/// Fuzzy search over choices.
pub struct SearchEngine {
    fields: Vec<SearchField>,
    floor: usize,
    result_limit: Option<usize>,
    last_needle: Option<String>,
    matcher: Matcher,
}

impl fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("fields", &self.fields)
            .field("floor", &self.floor)
            .field("result_limit", &self.result_limit)
            .field("last_needle", &self.last_needle)
            .finish_non_exhaustive()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(
            vec![SearchField::Label, SearchField::Value],
            DEFAULT_SEARCH_FLOOR,
            None,
        )
    }
}

impl SearchEngine {
    /// Create an engine matching `fields` in priority order.
    ///
    /// An empty field list falls back to matching the label.
    pub fn new(fields: Vec<SearchField>, floor: usize, result_limit: Option<usize>) -> Self {
        let fields = if fields.is_empty() {
            vec![SearchField::Label]
        } else {
            fields
        };
        Self {
            fields,
            floor: floor.max(1),
            result_limit,
            last_needle: None,
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    /// Decide how to react to `input`.
    pub fn prepare(&self, input: &str) -> SearchRequest {
        let needle = input.trim();
        if needle.graphemes(true).count() < self.floor {
            return SearchRequest::ShowAll;
        }
        if self.last_needle.as_deref() == Some(needle) {
            return SearchRequest::Unchanged;
        }
        SearchRequest::Search(needle.to_string())
    }

    /// Forget the last needle, so the next search always runs.
    pub fn reset(&mut self) {
        self.last_needle = None;
    }

    /// Rank `haystack` against `needle`.
    ///
    /// Results are ordered by score, then by the priority of the best-matching field, then by
    /// haystack order.
    pub fn search<'a, I>(&mut self, needle: &str, haystack: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = &'a Choice>,
    {
        let needle = needle.trim();
        self.last_needle = Some(needle.to_string());

        let atom = Atom::new(
            needle,
            CaseMatching::Smart,
            Normalization::Smart,
            AtomKind::Fuzzy,
            false,
        );
        let mut buf = Vec::new();
        let perfect = atom
            .score(Utf32Str::new(needle, &mut buf), &mut self.matcher)
            .unwrap_or(1)
            .max(1);

        let mut ranked: Vec<(f64, usize, usize, ChoiceId)> = Vec::new();
        for (position, choice) in haystack.into_iter().enumerate() {
            let mut best: Option<(u16, usize)> = None;
            for (priority, field) in self.fields.iter().enumerate() {
                let text = field.extract(choice);
                let Some(score) = atom.score(Utf32Str::new(text, &mut buf), &mut self.matcher)
                else {
                    continue;
                };
                if best.is_none_or(|(top, _)| score > top) {
                    best = Some((score, priority));
                }
            }
            if let Some((score, priority)) = best {
                ranked.push((normalise(score, perfect), priority, position, choice.id));
            }
        }

        ranked.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        if let Some(limit) = self.result_limit {
            ranked.truncate(limit);
        }

        log::debug!(
            target: "choices_core::search",
            "needle {needle:?} matched {} choice(s)",
            ranked.len()
        );
        ranked
            .into_iter()
            .map(|(score, _, _, id)| SearchResult { id, score })
            .collect()
    }
}

fn normalise(score: u16, perfect: u16) -> f64 {
    (1.0 - f64::from(score) / f64::from(perfect)).clamp(0.0, 1.0)
}

/// Order two scored choices; unscored choices sort last.
pub fn compare_scores(a: &Choice, b: &Choice) -> Ordering {
    match (a.score, b.score) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(labels: &[&str]) -> Vec<Choice> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                Choice::new(ChoiceId::next(i), label.to_lowercase(), Some(label.to_string()))
            })
            .collect()
    }

    #[test]
    fn test_prepare_respects_floor() {
        let engine = SearchEngine::default();
        assert_eq!(engine.prepare(""), SearchRequest::ShowAll);
        assert_eq!(engine.prepare("a"), SearchRequest::ShowAll);
        assert_eq!(engine.prepare("  a  "), SearchRequest::ShowAll);
        assert_eq!(engine.prepare("ap"), SearchRequest::Search("ap".to_string()));
    }

    #[test]
    fn test_prepare_skips_repeated_needle() {
        let haystack = choices(&["Apple"]);
        let mut engine = SearchEngine::default();
        engine.search("ap", &haystack);
        assert_eq!(engine.prepare("ap "), SearchRequest::Unchanged);
        assert_eq!(engine.prepare("apr"), SearchRequest::Search("apr".to_string()));
        engine.reset();
        assert_eq!(engine.prepare("ap"), SearchRequest::Search("ap".to_string()));
    }

    #[test]
    fn test_search_filters_and_scores() {
        let haystack = choices(&["Apple", "Banana", "Apricot"]);
        let mut engine = SearchEngine::new(vec![SearchField::Label], 2, None);
        let results = engine.search("ap", &haystack);
        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&ChoiceId(1)));
        assert!(ids.contains(&ChoiceId(3)));
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
        assert!(results.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_search_without_matches_is_empty() {
        let haystack = choices(&["Apple", "Banana"]);
        let mut engine = SearchEngine::default();
        assert!(engine.search("zz", &haystack).is_empty());
    }

    #[test]
    fn test_result_limit_truncates() {
        let haystack = choices(&["Apple", "Apricot", "Grape"]);
        let mut engine = SearchEngine::new(vec![SearchField::Label], 2, Some(1));
        assert_eq!(engine.search("ap", &haystack).len(), 1);
    }

    #[test]
    fn test_value_field_matches_when_label_does_not() {
        let haystack = vec![Choice::new(ChoiceId(1), "xq", Some("Quebec".to_string()))];
        let mut label_only = SearchEngine::new(vec![SearchField::Label], 2, None);
        assert!(label_only.search("xq", &haystack).is_empty());
        let mut both = SearchEngine::new(vec![SearchField::Value, SearchField::Label], 2, None);
        let results = both.search("xq", &haystack);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
    }
}
