pub mod config;
pub mod error;
pub mod ingest;
pub mod models;

pub use config::{AppConfig, IngestConfig, MergeConfig};
pub use error::{Result, ShelfError};
pub use ingest::{FieldMap, load_directory, normalize_object};
pub use models::*;
