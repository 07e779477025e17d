use thiserror::Error;

/// All errors that can occur in shelfmerge-core.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(String),

    #[error("Invalid record in {source_name}: {reason}")]
    InvalidRecord { source_name: String, reason: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
