// src/config.rs

use crate::catalog::Division;
use crate::heuristics::inventory::DEFAULT_MAX_LINES;
use serde::Deserialize;
use std::{fs, io, path::Path};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "stock_report.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub source: SourceConfig,
    pub heuristics: HeuristicsConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub max_file_mb: u64,
    pub min_extraction_chars: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_file_mb: 50,
            min_extraction_chars: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub max_inventory_lines: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            max_inventory_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Divisions registered on top of the built-in catalog at start-up.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub divisions: Vec<Division>,
}

impl Config {
    /// Read the TOML file at `path`; a missing file means all defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.logging.filter, "info");
        assert_eq!(cfg.source.max_file_mb, 50);
        assert_eq!(cfg.source.min_extraction_chars, 10);
        assert_eq!(cfg.heuristics.max_inventory_lines, 50);
        assert!(cfg.catalog.divisions.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[source]
max_file_mb = 5

[[catalog.divisions]]
id = "cardio"
name = "Cardio Division"
brands = [{{ name = "TELMIKIND", aliases = ["TELMI"] }}]
"#
        )
        .unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.source.max_file_mb, 5);
        assert_eq!(cfg.source.min_extraction_chars, 10);
        assert_eq!(cfg.logging.filter, "info");

        let div = &cfg.catalog.divisions[0];
        assert_eq!(div.id, "cardio");
        assert_eq!(div.brands[0].name, "TELMIKIND");
        assert_eq!(div.brands[0].aliases, ["TELMI"]);
        assert_eq!(div.description, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[source\nmax_file_mb = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
