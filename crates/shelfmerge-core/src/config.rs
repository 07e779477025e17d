use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelfError};

pub const DEFAULT_TITLE_THRESHOLD: f64 = 0.95;
pub const DEFAULT_AUTHOR_THRESHOLD: f64 = 0.85;

/// Parenthetical series annotations removed from titles before comparison,
/// e.g. "(Crucial Questions Series Book 4)".
pub const DEFAULT_TITLE_SUFFIX_PATTERNS: &[&str] = &[
    r"\(\s*[^()]*\bseries\s+book\s+\d+\s*\)",
    r"\(\s*crucial questions\s*\)",
    r"\(\s*christ-centered exposition commentary\s*\)",
];

/// Root application configuration, loaded from `~/.config/shelfmerge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ingest: IngestConfig,
    pub merge: MergeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory scanned when no directory is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// File extensions treated as catalog exports.
    pub extensions: Vec<String>,
    /// Extra key renames, applied on top of the built-in table.
    pub field_map: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub title_threshold: f64,
    pub author_threshold: f64,
    /// Regular expressions, matched case-insensitively against the lowercased title.
    pub title_suffix_patterns: Vec<String>,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extensions: vec!["json".to_string()],
            field_map: BTreeMap::new(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            title_threshold: DEFAULT_TITLE_THRESHOLD,
            author_threshold: DEFAULT_AUTHOR_THRESHOLD,
            title_suffix_patterns: DEFAULT_TITLE_SUFFIX_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl MergeConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("title_threshold", self.title_threshold),
            ("author_threshold", self.author_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ShelfError::ConfigError(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/shelfmerge/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SHELFMERGE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("shelfmerge")
            .join("config.toml")
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.merge.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Directory to ingest: the configured one, else `~/Books/catalogs`.
    pub fn ingest_directory(&self) -> PathBuf {
        match &self.ingest.directory {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Books")
                .join("catalogs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.merge.title_threshold, 0.95);
        assert_eq!(cfg.merge.author_threshold, 0.85);
        assert_eq!(cfg.ingest.extensions, vec!["json"]);
        assert!(cfg.merge.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.merge.title_threshold = 0.9;
        cfg.ingest
            .field_map
            .insert("Series Name".to_string(), "series".to_string());
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.merge.title_threshold, 0.9);
        assert_eq!(
            loaded.ingest.field_map.get("Series Name").map(String::as_str),
            Some("series")
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[merge]\nauthor_threshold = 0.7\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.merge.author_threshold, 0.7);
        assert_eq!(loaded.merge.title_threshold, DEFAULT_TITLE_THRESHOLD);
        assert_eq!(
            loaded.merge.title_suffix_patterns.len(),
            DEFAULT_TITLE_SUFFIX_PATTERNS.len()
        );
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[merge]\ntitle_threshold = 1.5\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ShelfError::ConfigError(_)));
    }

    #[test]
    fn test_example_config_parses() {
        let cfg: AppConfig = toml::from_str(include_str!("../../../config.example.toml")).unwrap();
        assert!(cfg.merge.validate().is_ok());
        assert_eq!(cfg.merge.title_suffix_patterns.len(), 4);
        assert_eq!(
            cfg.ingest.field_map.get("Series Name").map(String::as_str),
            Some("series")
        );
        assert!(cfg.ingest.directory.is_none());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = AppConfig::load_from(Path::new("/tmp/nonexistent_shelfmerge_config.toml")).unwrap();
        assert_eq!(cfg.merge.title_threshold, DEFAULT_TITLE_THRESHOLD);
    }
}
