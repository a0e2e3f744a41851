//! Compiled term index and the single-pass span scanner.

use std::cmp::Reverse;
use std::collections::HashSet;

use lens_core::Villain;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::HighlightError;

/// A piece of highlighted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span<'a> {
    Plain { text: &'a str },
    Match { text: &'a str, villain: &'a Villain },
}

impl<'a> Span<'a> {
    #[must_use]
    pub const fn text(&self) -> &'a str {
        match self {
            Self::Plain { text } | Self::Match { text, .. } => *text,
        }
    }

    #[must_use]
    pub const fn villain(&self) -> Option<&'a Villain> {
        match self {
            Self::Plain { .. } => None,
            Self::Match { villain, .. } => Some(*villain),
        }
    }
}

/// Case-insensitive alternation over villain names, longest first.
///
/// Each distinct name (compared case-insensitively) gets its own capture
/// group, in descending length order with ties kept in input order. The
/// regex engine's leftmost-first semantics then yields the earliest match,
/// and at that position the longest name.
#[derive(Debug, Clone)]
pub struct TermIndex<'t> {
    pattern: Option<Regex>,
    groups: Vec<&'t Villain>,
}

impl<'t> TermIndex<'t> {
    /// Build an index over `terms`.
    ///
    /// Names are escaped, never interpreted as patterns. Empty names are
    /// ignored. For duplicate names the first villain in `terms` is the one
    /// reported on matches.
    ///
    /// # Errors
    ///
    /// Returns [`HighlightError::Pattern`] if the alternation exceeds the
    /// regex engine's size limits.
    pub fn new(terms: &'t [Villain]) -> Result<Self, HighlightError> {
        let mut seen = HashSet::new();
        let mut groups = terms
            .iter()
            .filter(|villain| !villain.name.is_empty())
            .filter(|villain| seen.insert(villain.name.to_lowercase()))
            .collect::<Vec<_>>();

        if groups.is_empty() {
            return Ok(Self {
                pattern: None,
                groups,
            });
        }

        groups.sort_by_key(|villain| Reverse(villain.name.chars().count()));

        let alternation = groups
            .iter()
            .map(|villain| format!("({})", regex::escape(&villain.name)))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            pattern: Some(pattern),
            groups,
        })
    }

    /// Number of distinct names in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Partition `text` into plain and matched spans in one left-to-right scan.
    #[must_use]
    pub fn spans<'a>(&self, text: &'a str) -> Vec<Span<'a>>
    where
        't: 'a,
    {
        if text.is_empty() {
            return Vec::new();
        }
        let Some(pattern) = &self.pattern else {
            return vec![Span::Plain { text }];
        };

        let mut spans = Vec::new();
        let mut cursor = 0;
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(group) = (1..caps.len()).find(|&i| caps.get(i).is_some()) else {
                continue;
            };

            if whole.start() > cursor {
                spans.push(Span::Plain {
                    text: &text[cursor..whole.start()],
                });
            }
            spans.push(Span::Match {
                text: whole.as_str(),
                villain: self.groups[group - 1],
            });
            cursor = whole.end();
        }

        if cursor < text.len() {
            spans.push(Span::Plain {
                text: &text[cursor..],
            });
        }
        spans
    }
}

/// Build a throwaway index and scan `text` once.
///
/// # Errors
///
/// See [`TermIndex::new`].
pub fn highlight<'a>(
    text: &'a str,
    terms: &'a [Villain],
) -> Result<Vec<Span<'a>>, HighlightError> {
    Ok(TermIndex::new(terms)?.spans(text))
}

/// Concatenate span texts, dropping match markup.
#[must_use]
pub fn plain_text(spans: &[Span<'_>]) -> String {
    spans.iter().map(Span::text).collect()
}
