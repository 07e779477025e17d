use serde::Serialize;
use shelfmerge_core::OrderedSet;
use shelfmerge_core::config::{DEFAULT_AUTHOR_THRESHOLD, DEFAULT_TITLE_THRESHOLD};

use crate::normalize::{TitleNormalizer, normalize_string};
use crate::similarity::{dice, max_pairwise_similarity};

/// Which rule matched an incoming record to a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPathway {
    /// One normalized title is a prefix of the other and an author is shared.
    Prefix,
    /// Title and author similarity both reach their thresholds.
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub title: f64,
    pub author: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_THRESHOLD,
            author: DEFAULT_AUTHOR_THRESHOLD,
        }
    }
}

/// Comparison form of a title and its authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey {
    title: String,
    authors: OrderedSet<String>,
}

impl MatchKey {
    pub fn new<'a, I>(normalizer: &TitleNormalizer, title: &str, authors: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        Self {
            title: normalizer.normalize(title),
            authors: authors.into_iter().map(|a| normalize_string(a)).collect(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[String] {
        self.authors.as_slice()
    }

    /// Fold in the authors of a record that joined this cluster.
    pub fn absorb_authors(&mut self, other: &MatchKey) {
        self.authors.union_with(&other.authors);
    }
}

/// Decide whether `incoming` belongs to the cluster described by `existing`.
///
/// The prefix rule is tried first; the fuzzy rule only runs when it fails.
pub fn match_pathway(
    existing: &MatchKey,
    incoming: &MatchKey,
    thresholds: Thresholds,
) -> Option<MatchPathway> {
    if prefix_match(existing, incoming) {
        return Some(MatchPathway::Prefix);
    }
    if fuzzy_match(existing, incoming, thresholds) {
        return Some(MatchPathway::Fuzzy);
    }
    None
}

pub fn prefix_match(existing: &MatchKey, incoming: &MatchKey) -> bool {
    titles_share_prefix(&existing.title, &incoming.title) && authors_overlap(existing, incoming)
}

pub fn fuzzy_match(existing: &MatchKey, incoming: &MatchKey, thresholds: Thresholds) -> bool {
    if dice(&existing.title, &incoming.title) < thresholds.title {
        return false;
    }
    max_pairwise_similarity(existing.authors(), incoming.authors()) >= thresholds.author
}

fn titles_share_prefix(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.starts_with(b) || b.starts_with(a))
}

fn authors_overlap(existing: &MatchKey, incoming: &MatchKey) -> bool {
    incoming
        .authors
        .iter()
        .any(|author| existing.authors.contains(author))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(title: &str, authors: &[&str]) -> MatchKey {
        let authors: Vec<String> = authors.iter().map(|a| a.to_string()).collect();
        MatchKey::new(&TitleNormalizer::default(), title, &authors)
    }

    #[test]
    fn test_prefix_with_shared_author() {
        let existing = key("Deep Work", &["Cal Newport"]);
        let incoming = key("Deep Work: Rules for Focused Success", &["cal newport"]);
        assert_eq!(
            match_pathway(&existing, &incoming, Thresholds::default()),
            Some(MatchPathway::Prefix)
        );
        // prefix works in both directions
        assert!(prefix_match(&incoming, &existing));
    }

    #[test]
    fn test_prefix_requires_author_overlap() {
        let existing = key("Deep Work", &["Cal Newport"]);
        let incoming = key("Deep Work: Rules for Focused Success", &["Someone Else"]);
        assert!(!prefix_match(&existing, &incoming));
        assert_eq!(match_pathway(&existing, &incoming, Thresholds::default()), None);
    }

    #[test]
    fn test_fuzzy_tolerates_typo_and_author_formatting() {
        let existing = key("The Pragmatic Programmer", &["Andrew Hunt", "David Thomas"]);
        let incoming = key("The Pragmatic Programer", &["andrew hunt"]);
        assert!(!prefix_match(&existing, &incoming));
        assert_eq!(
            match_pathway(&existing, &incoming, Thresholds::default()),
            Some(MatchPathway::Fuzzy)
        );
    }

    #[test]
    fn test_fuzzy_respects_title_threshold() {
        let existing = key("The Hobbit", &["J.R.R. Tolkien"]);
        let incoming = key("The Hobitt", &["J. R. R. Tolkien"]);
        // title similarity is 0.875
        assert!(!fuzzy_match(&existing, &incoming, Thresholds::default()));
        let relaxed = Thresholds {
            title: 0.85,
            ..Thresholds::default()
        };
        assert!(fuzzy_match(&existing, &incoming, relaxed));
    }

    #[test]
    fn test_fuzzy_respects_author_threshold() {
        let existing = key("The Way of Kings", &["Brandon Sanderson"]);
        let incoming = key("The Way of Kinsg", &["Brandon Sandersen"]);
        // author similarity is ~0.867
        assert!(!fuzzy_match(
            &existing,
            &incoming,
            Thresholds {
                title: 0.8,
                author: 0.9
            }
        ));
        assert!(fuzzy_match(
            &existing,
            &incoming,
            Thresholds {
                title: 0.8,
                author: 0.85
            }
        ));
    }

    #[test]
    fn test_authorless_records_never_match() {
        let existing = key("Anonymous Classic", &[]);
        let incoming = key("Anonymous Classic", &[]);
        assert_eq!(match_pathway(&existing, &incoming, Thresholds::default()), None);
    }

    #[test]
    fn test_empty_normalized_title_is_not_a_prefix() {
        let existing = key("???", &["A"]);
        let incoming = key("Anything", &["A"]);
        assert!(!prefix_match(&existing, &incoming));
    }

    #[test]
    fn test_absorb_authors() {
        let mut existing = key("X", &["A"]);
        let incoming = key("X", &["B", "a"]);
        existing.absorb_authors(&incoming);
        assert_eq!(existing.authors(), &["a".to_string(), "b".to_string()]);
    }
}
