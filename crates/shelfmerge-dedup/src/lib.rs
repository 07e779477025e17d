//! shelfmerge dedup — fold per-source catalog records into one entry per book.

pub mod engine;
pub mod error;
pub mod matcher;
pub mod merge;
pub mod normalize;
pub mod similarity;

pub use engine::{FuzzyMerger, MergeOutcome, MergeStats, merge_records};
pub use error::{DedupError, Result};
pub use matcher::{MatchKey, MatchPathway, Thresholds};
pub use merge::{MergeRecord, merge_field_value};
pub use normalize::{TitleNormalizer, normalize_string};
