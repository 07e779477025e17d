use thiserror::Error;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("{0} must be within [0, 1], got {1}")]
    InvalidThreshold(&'static str, f64),

    #[error("invalid title pattern {0:?}: {1}")]
    InvalidPattern(String, #[source] regex::Error),
}

pub type Result<T> = std::result::Result<T, DedupError>;
