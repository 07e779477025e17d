use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use shelfmerge_core::config::DEFAULT_TITLE_SUFFIX_PATTERNS;

use crate::{DedupError, Result};

static DEFAULT_SUFFIX_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEFAULT_TITLE_SUFFIX_PATTERNS
        .iter()
        .map(|pattern| compile_suffix_pattern(pattern).expect("valid built-in title suffix regex"))
        .collect()
});

/// Lowercase and keep only alphanumeric characters.
pub fn normalize_string(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Reduces a title to its comparison form.
///
/// The title is lowercased, every configured series/edition annotation is
/// removed, and what remains is passed through [`normalize_string`].
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    suffix_patterns: Vec<Regex>,
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self {
            suffix_patterns: DEFAULT_SUFFIX_RES.clone(),
        }
    }
}

impl TitleNormalizer {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffix_patterns = patterns
            .into_iter()
            .map(|pattern| compile_suffix_pattern(pattern.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { suffix_patterns })
    }

    /// A normalizer that strips nothing but case and punctuation.
    pub fn without_patterns() -> Self {
        Self {
            suffix_patterns: Vec::new(),
        }
    }

    pub fn normalize(&self, title: &str) -> String {
        let mut lowered = title.to_lowercase();
        for pattern in &self.suffix_patterns {
            lowered = pattern.replace_all(&lowered, "").into_owned();
        }
        normalize_string(lowered.trim())
    }
}

fn compile_suffix_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| DedupError::InvalidPattern(pattern.to_string(), e))
}
