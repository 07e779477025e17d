use serde::Serialize;
use shelfmerge_core::{MergeConfig, MergedRecord, NormalizedRecord};

use crate::matcher::{MatchKey, MatchPathway, Thresholds, match_pathway};
use crate::merge::MergeRecord;
use crate::normalize::TitleNormalizer;
use crate::{DedupError, Result};

/// Counters describing one merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Records consumed.
    pub input: usize,
    /// Records without a usable title.
    pub dropped: usize,
    /// Distinct books produced.
    pub clusters: usize,
    pub prefix_matches: usize,
    pub fuzzy_matches: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<MergedRecord>,
    pub stats: MergeStats,
}

/// Deduplicates a stream of normalized records into merged books.
///
/// Records are processed in order. Each one is compared against the clusters
/// formed so far, oldest first, and joins the first cluster it matches; if
/// none matches it opens a new cluster. Cost grows with records × clusters.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMerger {
    thresholds: Thresholds,
    normalizer: TitleNormalizer,
}

struct Cluster {
    record: MergedRecord,
    key: MatchKey,
}

impl FuzzyMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration, rejecting out-of-range thresholds and
    /// malformed title patterns.
    pub fn from_config(config: &MergeConfig) -> Result<Self> {
        let thresholds = Thresholds {
            title: checked_threshold("title_threshold", config.title_threshold)?,
            author: checked_threshold("author_threshold", config.author_threshold)?,
        };
        let normalizer = TitleNormalizer::new(&config.title_suffix_patterns)?;
        Ok(Self {
            thresholds,
            normalizer,
        })
    }

    /// Out-of-range values are clamped to `[0, 1]`; NaN leaves the threshold unchanged.
    pub fn with_title_threshold(mut self, threshold: f64) -> Self {
        if !threshold.is_nan() {
            self.thresholds.title = threshold.clamp(0.0, 1.0);
        }
        self
    }

    pub fn with_author_threshold(mut self, threshold: f64) -> Self {
        if !threshold.is_nan() {
            self.thresholds.author = threshold.clamp(0.0, 1.0);
        }
        self
    }

    pub fn with_normalizer(mut self, normalizer: TitleNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Whether `incoming` would be folded into `existing`.
    pub fn is_match(&self, existing: &MergedRecord, incoming: &NormalizedRecord) -> bool {
        let Some(title) = incoming.usable_title() else {
            return false;
        };
        let existing_key = MatchKey::new(&self.normalizer, &existing.title, &existing.author);
        let incoming_key = MatchKey::new(&self.normalizer, title, &incoming.author);
        match_pathway(&existing_key, &incoming_key, self.thresholds).is_some()
    }

    pub fn merge<I>(&self, records: I) -> Vec<MergedRecord>
    where
        I: IntoIterator<Item = NormalizedRecord>,
    {
        self.merge_with_stats(records).records
    }

    pub fn merge_with_stats<I>(&self, records: I) -> MergeOutcome
    where
        I: IntoIterator<Item = NormalizedRecord>,
    {
        let mut clusters: Vec<Cluster> = Vec::new();
        let mut stats = MergeStats::default();

        for record in records {
            stats.input += 1;

            let Some(title) = record.usable_title().map(str::to_string) else {
                stats.dropped += 1;
                continue;
            };
            let key = MatchKey::new(&self.normalizer, &title, &record.author);

            let found = clusters.iter().enumerate().find_map(|(idx, cluster)| {
                match_pathway(&cluster.key, &key, self.thresholds).map(|pathway| (idx, pathway))
            });

            match found {
                Some((idx, pathway)) => {
                    match pathway {
                        MatchPathway::Prefix => stats.prefix_matches += 1,
                        MatchPathway::Fuzzy => stats.fuzzy_matches += 1,
                    }
                    let cluster = &mut clusters[idx];
                    cluster.record.merge_record(record);
                    cluster.key.absorb_authors(&key);
                }
                None => {
                    let mut merged = MergedRecord::new(title);
                    merged.merge_record(record);
                    clusters.push(Cluster {
                        record: merged,
                        key,
                    });
                }
            }
        }

        stats.clusters = clusters.len();
        MergeOutcome {
            records: clusters.into_iter().map(|cluster| cluster.record).collect(),
            stats,
        }
    }
}

/// Merge with default thresholds and title patterns.
pub fn merge_records<I>(records: I) -> Vec<MergedRecord>
where
    I: IntoIterator<Item = NormalizedRecord>,
{
    FuzzyMerger::default().merge(records)
}

fn checked_threshold(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DedupError::InvalidThreshold(name, value))
    }
}
